//! meshpulse - an animated proximity mesh with pulse waves.
//!
//! Moving nodes are linked whenever they come within a fixed distance of each
//! other, and pulses of brightness hop across those links from a clicked (or
//! randomly chosen) node. This crate holds the host-independent simulation,
//! the drawing-surface abstraction and an SVG surface; browser bindings live in
//! `meshpulse-web`.

pub mod color;
pub mod field;
pub mod frame_loop;
pub mod geometry;
pub mod links;
pub mod mesh;
pub mod render;
pub mod settings;
pub mod svg;
pub mod wave;

pub use frame_loop::{FixedRateScheduler, FrameScheduler, run_frames};
pub use geometry::{Point, SurfaceSize, node_count};
pub use mesh::{Mesh, MeshStats, Pulse, Trigger};
pub use render::{Fill, GradientStop, Surface};
pub use settings::{MeshSettings, SettingsError};
pub use svg::SvgSurface;
