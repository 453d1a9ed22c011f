use tokio::time::{Duration, Instant, Interval, MissedTickBehavior};

use meshpulse::FrameScheduler;

/// Wall-clock frame scheduler for `--realtime` runs
pub struct IntervalScheduler {
    interval: Interval,
    start: Instant,
    remaining: u64,
}

impl IntervalScheduler {
    pub fn new(fps: f64, frames: u64) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 { fps } else { 60.0 };
        let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / fps));
        // A slow frame shouldn't cause a burst of catch-up frames
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            interval,
            start: Instant::now(),
            remaining: frames,
        }
    }
}

impl FrameScheduler for IntervalScheduler {
    async fn next_frame(&mut self) -> Option<f64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let at = self.interval.tick().await;
        Some(at.duration_since(self.start).as_secs_f64() * 1000.0)
    }
}
