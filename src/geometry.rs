//! Surface dimensions and area-scaled node counts
//!
//! This module contains pure calculation logic that can be unit tested
//! without browser dependencies.

use crate::settings::MeshSettings;

/// A point (or displacement) in CSS pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Drawing surface dimensions in CSS pixels plus the device pixel ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    /// Width in CSS pixels
    pub width: f64,
    /// Height in CSS pixels
    pub height: f64,
    /// Physical pixels per CSS pixel
    pub pixel_ratio: f64,
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
            pixel_ratio: 1.0,
        }
    }
}

impl SurfaceSize {
    /// Create a size, replacing unusable values with safe ones
    ///
    /// Negative or non-finite extents become `0.0`; a pixel ratio that is not
    /// finite and positive becomes `1.0`.
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        Self {
            width: non_negative(width),
            height: non_negative(height),
            pixel_ratio: if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
                pixel_ratio
            } else {
                1.0
            },
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Width of the backing store in physical pixels
    pub fn backing_width(&self) -> u32 {
        (self.width * self.pixel_ratio).round() as u32
    }

    /// Height of the backing store in physical pixels
    pub fn backing_height(&self) -> u32 {
        (self.height * self.pixel_ratio).round() as u32
    }

    /// Whether a point lies inside `[0, width] x [0, height]`
    pub fn contains(&self, p: Point) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }
}

fn non_negative(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

/// Number of nodes for a surface, scaled by area against the reference resolution
///
/// The result is always within `[min_nodes, reference_nodes]`, so tiny
/// surfaces still get a visible mesh and huge ones never exceed the cap.
pub fn node_count(width: f64, height: f64, settings: &MeshSettings) -> usize {
    let area = non_negative(width) * non_negative(height);
    let reference_area = settings.reference_width * settings.reference_height;
    let max = settings.reference_nodes;
    let min = settings.min_nodes.min(max);

    let scaled = if reference_area > 0.0 {
        (max as f64 * (area / reference_area)).round()
    } else {
        max as f64
    };

    // Saturating float -> int cast keeps enormous areas bounded
    (scaled as usize).clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> MeshSettings {
        MeshSettings::default()
    }

    #[test]
    fn reference_area_gives_reference_count() {
        let s = settings();
        assert_eq!(
            node_count(s.reference_width, s.reference_height, &s),
            s.reference_nodes
        );
    }

    #[test]
    fn half_area_gives_half_count() {
        let s = settings();
        assert_eq!(node_count(960.0, 1080.0, &s), 60);
    }

    #[test]
    fn count_stays_within_bounds_for_all_areas() {
        let s = settings();
        let sizes = [
            (0.0, 0.0),
            (1.0, 1.0),
            (320.0, 480.0),
            (1280.0, 720.0),
            (3840.0, 2160.0),
            (100_000.0, 100_000.0),
            (f64::MAX, f64::MAX),
        ];
        for (w, h) in sizes {
            let n = node_count(w, h, &s);
            assert!(
                (s.min_nodes..=s.reference_nodes).contains(&n),
                "{w}x{h} gave {n}"
            );
        }
    }

    #[test]
    fn degenerate_dimensions_give_minimum() {
        let s = settings();
        assert_eq!(node_count(-50.0, 400.0, &s), s.min_nodes);
        assert_eq!(node_count(f64::NAN, 400.0, &s), s.min_nodes);
    }

    #[test]
    fn surface_size_sanitizes_inputs() {
        let size = SurfaceSize::new(-1.0, f64::INFINITY, 0.0);
        assert_eq!(size.width, 0.0);
        assert_eq!(size.height, 0.0);
        assert_eq!(size.pixel_ratio, 1.0);
    }

    #[test]
    fn backing_store_scales_with_pixel_ratio() {
        let size = SurfaceSize::new(800.0, 600.0, 2.0);
        assert_eq!(size.backing_width(), 1600);
        assert_eq!(size.backing_height(), 1200);
    }

    #[test]
    fn contains_includes_edges() {
        let size = SurfaceSize::new(100.0, 50.0, 1.0);
        assert!(size.contains(Point::new(0.0, 0.0)));
        assert!(size.contains(Point::new(100.0, 50.0)));
        assert!(!size.contains(Point::new(100.1, 10.0)));
    }

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(Point::new(0.0, 0.0).distance_to(Point::new(3.0, 4.0)), 5.0);
    }
}
