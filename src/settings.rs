//! Tuning constants for the mesh and their loading from YAML/JSON files

use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::color::Rgb;

/// Highest accepted `glow_fade`; brightness must strictly decay every frame
pub const MAX_GLOW_FADE: f64 = 0.9999;

/// Lowest accepted `hop_strength`; every hop keeps some power
pub const MIN_HOP_STRENGTH: f64 = 0.01;
/// Highest accepted `hop_strength`; every hop loses some power
pub const MAX_HOP_STRENGTH: f64 = 0.99;

/// Upper bound on `reference_nodes`; links are found by a pairwise scan every frame
pub const MAX_NODES: usize = 1000;

/// Errors that can occur while loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The file extension is not one of yaml, yml or json
    #[error("could not determine settings format from path: {0}")]
    UnknownExtension(String),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The YAML document could not be parsed
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The JSON document could not be parsed
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;

/// All tunable parameters of the mesh effect
///
/// Missing fields in a settings file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshSettings {
    /// Width of the resolution at which `reference_nodes` are shown
    pub reference_width: f64,
    /// Height of the reference resolution
    pub reference_height: f64,
    /// Node count at the reference resolution, also the upper bound
    #[serde(deserialize_with = "saturating_count")]
    pub reference_nodes: usize,
    /// Lower bound on the node count for small surfaces
    #[serde(deserialize_with = "saturating_count")]
    pub min_nodes: usize,

    /// Maximum distance at which two nodes are linked
    pub link_distance: f64,
    /// Per-axis speed cap in pixels per frame
    pub node_speed: f64,
    /// Core dot radius
    pub node_radius: f64,
    /// Base link opacity when nothing is lit
    pub line_opacity: f64,
    /// Per-frame multiplicative brightness decay
    pub glow_fade: f64,
    /// Brightness below this snaps to zero
    pub brightness_floor: f64,

    /// Interval between automatic pulses in milliseconds
    pub auto_pulse_ms: f64,
    /// Frames a pulse spends in transit on each hop
    #[serde(deserialize_with = "saturating_frames")]
    pub hop_frames: u32,
    /// Power multiplier applied on each hop
    pub hop_strength: f64,
    /// Clicks further than this from every node are ignored
    pub click_radius: f64,

    /// Node colors, assigned by cycling through the list
    pub palette: Vec<Rgb>,
    /// Color of links and halos
    pub glow_color: Rgb,
    /// Halos are drawn only above this brightness
    pub halo_threshold: f64,
    /// Node cores turn white above this brightness
    pub core_white_threshold: f64,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            reference_width: 1920.0,
            reference_height: 1080.0,
            reference_nodes: 120,
            min_nodes: 15,
            link_distance: 220.0,
            node_speed: 0.3,
            node_radius: 2.5,
            line_opacity: 0.25,
            glow_fade: 0.992,
            brightness_floor: 0.001,
            auto_pulse_ms: 4000.0,
            hop_frames: 25,
            hop_strength: 0.78,
            click_radius: 50.0,
            palette: default_palette(),
            glow_color: Rgb::new(0x00, 0xd4, 0xaa),
            halo_threshold: 0.05,
            core_white_threshold: 0.1,
        }
    }
}

fn default_palette() -> Vec<Rgb> {
    vec![
        Rgb::new(0x00, 0xd4, 0xaa),
        Rgb::new(0x00, 0xb8, 0x94),
        Rgb::new(0x00, 0xce, 0xc9),
    ]
}

/// Integer counts where negative values read as zero instead of failing
fn saturating_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let value = i64::deserialize(deserializer)?;
    Ok(usize::try_from(value.max(0)).unwrap_or(usize::MAX))
}

fn saturating_frames<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = i64::deserialize(deserializer)?;
    Ok(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
}

/// Clamp to `[min, max]`, mapping NaN to `min`
fn clamp_or(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() { min } else { value.clamp(min, max) }
}

impl MeshSettings {
    /// Load settings from a `.yaml`, `.yml` or `.json` file
    ///
    /// The result is already sanitized.
    pub fn from_path(path: &Path) -> SettingsResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or_else(|| SettingsError::UnknownExtension(path.display().to_string()))?;

        let text = fs::read_to_string(path)?;
        let settings = match ext.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&text)?,
            "json" => Self::from_json_str(&text)?,
            _ => return Err(SettingsError::UnknownExtension(path.display().to_string())),
        };
        tracing::debug!(path = %path.display(), "loaded mesh settings");
        Ok(settings)
    }

    /// Parse sanitized settings from a YAML document
    pub fn from_yaml_str(text: &str) -> SettingsResult<Self> {
        let settings: Self = serde_yaml::from_str(text)?;
        Ok(settings.sanitized())
    }

    /// Parse sanitized settings from a JSON document
    pub fn from_json_str(text: &str) -> SettingsResult<Self> {
        let settings: Self = serde_json::from_str(text)?;
        Ok(settings.sanitized())
    }

    /// Clamp every value into a range the simulation can run with
    ///
    /// Negative distances, speeds and intervals become zero, the decay factor
    /// is forced below 1, the hop factor into
    /// `[MIN_HOP_STRENGTH, MAX_HOP_STRENGTH]`, node counts into `[1, MAX_NODES]`
    /// with `min_nodes <= reference_nodes`, and an empty palette is replaced by
    /// the default one.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if !(self.reference_width.is_finite() && self.reference_width > 0.0) {
            self.reference_width = defaults.reference_width;
        }
        if !(self.reference_height.is_finite() && self.reference_height > 0.0) {
            self.reference_height = defaults.reference_height;
        }
        self.reference_nodes = self.reference_nodes.clamp(1, MAX_NODES);
        self.min_nodes = self.min_nodes.clamp(1, self.reference_nodes);

        self.link_distance = clamp_or(self.link_distance, 0.0, f64::MAX);
        self.node_speed = clamp_or(self.node_speed, 0.0, f64::MAX);
        self.node_radius = clamp_or(self.node_radius, 0.0, f64::MAX);
        self.line_opacity = clamp_or(self.line_opacity, 0.0, 1.0);
        self.glow_fade = clamp_or(self.glow_fade, 0.0, MAX_GLOW_FADE);
        self.brightness_floor = clamp_or(self.brightness_floor, 0.0, 1.0);

        self.auto_pulse_ms = clamp_or(self.auto_pulse_ms, 0.0, f64::MAX);
        self.hop_strength = clamp_or(self.hop_strength, MIN_HOP_STRENGTH, MAX_HOP_STRENGTH);
        self.click_radius = clamp_or(self.click_radius, 0.0, f64::MAX);

        if self.palette.is_empty() {
            self.palette = defaults.palette;
        }
        self.halo_threshold = clamp_or(self.halo_threshold, 0.0, 1.0);
        self.core_white_threshold = clamp_or(self.core_white_threshold, 0.0, 1.0);

        self
    }

    /// Render these settings as YAML
    pub fn to_yaml(&self) -> SettingsResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Render these settings as pretty-printed JSON
    pub fn to_json(&self) -> SettingsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
