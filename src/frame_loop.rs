//! The frame loop
//!
//! Each iteration waits for the host's next animation frame, then runs one
//! complete frame synchronously. The `.await` on the scheduler is the only
//! suspension point, and the mesh and surface are borrowed only between two
//! awaits, so input handlers sharing the same `RefCell`s always run strictly
//! between frames.

use std::cell::RefCell;
use std::future::{self, Future};

use rand::Rng;

use crate::mesh::Mesh;
use crate::render::Surface;

/// Source of animation frame timestamps
pub trait FrameScheduler {
    /// Wait until the next frame should be drawn
    ///
    /// Resolves to a monotonically increasing timestamp in milliseconds, or
    /// `None` once the host stops producing frames.
    fn next_frame(&mut self) -> impl Future<Output = Option<f64>>;
}

/// Virtual clock producing frames at a fixed rate without waiting
#[derive(Debug, Clone)]
pub struct FixedRateScheduler {
    interval_ms: f64,
    next: f64,
    remaining: Option<u64>,
}

impl FixedRateScheduler {
    /// Unbounded scheduler at `fps` frames per second
    pub fn new(fps: f64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 60.0 };
        Self {
            interval_ms: 1000.0 / fps,
            next: 0.0,
            remaining: None,
        }
    }

    /// Stop after `frames` frames
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.remaining = Some(frames);
        self
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }
}

impl FrameScheduler for FixedRateScheduler {
    fn next_frame(&mut self) -> impl Future<Output = Option<f64>> {
        let frame = match self.remaining.as_mut() {
            Some(0) => None,
            Some(left) => {
                *left -= 1;
                Some(self.next)
            }
            None => Some(self.next),
        };
        if frame.is_some() {
            self.next += self.interval_ms;
        }
        future::ready(frame)
    }
}

/// Run frames until the scheduler stops, returning how many were drawn
///
/// A frame whose mesh or surface is still borrowed elsewhere is skipped
/// rather than interleaved.
pub async fn run_frames<R, S, F>(
    mesh: &RefCell<Mesh<R>>,
    surface: &RefCell<S>,
    scheduler: &mut F,
) -> u64
where
    R: Rng,
    S: Surface,
    F: FrameScheduler,
{
    let mut drawn = 0;

    while let Some(now) = scheduler.next_frame().await {
        let (Ok(mut mesh), Ok(mut surface)) = (mesh.try_borrow_mut(), surface.try_borrow_mut())
        else {
            tracing::warn!(now, "frame skipped: mesh busy");
            continue;
        };

        if let Some(pulse) = mesh.frame(now, &mut *surface) {
            tracing::debug!(origin = pulse.origin, now, "automatic pulse");
        }
        drawn += 1;
    }

    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SurfaceSize;
    use crate::render::tests::{DrawCall, RecordingSurface};
    use crate::settings::MeshSettings;

    #[test]
    fn fixed_rate_produces_evenly_spaced_timestamps() {
        let mut scheduler = FixedRateScheduler::new(50.0).with_limit(3);
        let mut cx = std::task::Context::from_waker(std::task::Waker::noop());
        let stamps: Vec<Option<f64>> = (0..4)
            .map(|_| {
                let mut fut = Box::pin(scheduler.next_frame());
                match fut.as_mut().poll(&mut cx) {
                    std::task::Poll::Ready(v) => v,
                    std::task::Poll::Pending => panic!("fixed rate frames are always ready"),
                }
            })
            .collect();

        assert_eq!(stamps, vec![Some(0.0), Some(20.0), Some(40.0), None]);
    }

    #[test]
    fn invalid_fps_falls_back_to_sixty() {
        let scheduler = FixedRateScheduler::new(0.0);
        assert!((scheduler.interval_ms() - 1000.0 / 60.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn runs_until_scheduler_stops() {
        let size = SurfaceSize::new(640.0, 480.0, 1.0);
        let mesh = RefCell::new(Mesh::seeded(MeshSettings::default(), size, 3));
        let surface = RefCell::new(RecordingSurface {
            size,
            ..Default::default()
        });
        let mut scheduler = FixedRateScheduler::new(60.0).with_limit(10);

        let drawn = run_frames(&mesh, &surface, &mut scheduler).await;

        assert_eq!(drawn, 10);
        assert_eq!(mesh.borrow().stats().frames, 10);
        assert_eq!(surface.borrow().calls.first(), Some(&DrawCall::Clear));
    }

    #[tokio::test]
    async fn auto_pulse_fires_on_schedule() {
        let size = SurfaceSize::new(640.0, 480.0, 1.0);
        let mesh = RefCell::new(Mesh::seeded(MeshSettings::default(), size, 8));
        let surface = RefCell::new(RecordingSurface::default());

        // 4000ms interval at 60fps: armed at frame 0, fires around frames 240 and 480
        let mut scheduler = FixedRateScheduler::new(60.0).with_limit(500);
        run_frames(&mesh, &surface, &mut scheduler).await;

        assert_eq!(mesh.borrow().stats().auto_pulses, 2);
    }

    #[tokio::test]
    async fn borrowed_mesh_skips_frames() {
        let size = SurfaceSize::new(640.0, 480.0, 1.0);
        let mesh = RefCell::new(Mesh::seeded(MeshSettings::default(), size, 3));
        let surface = RefCell::new(RecordingSurface::default());
        let mut scheduler = FixedRateScheduler::new(60.0).with_limit(5);

        let held = mesh.borrow();
        let drawn = run_frames(&mesh, &surface, &mut scheduler).await;
        assert_eq!(drawn, 0);
        assert_eq!(held.stats().frames, 0);
    }
}
