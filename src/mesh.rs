//! The mesh driver
//!
//! `Mesh` owns every piece of simulation state and is the only thing hosts
//! talk to: they feed it timestamps, clicks and resizes, and hand it a surface
//! to draw on.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::field::NodeField;
use crate::geometry::{Point, SurfaceSize, node_count};
use crate::links::LinkGraph;
use crate::render::{MeshRenderer, RenderStyle, Surface};
use crate::settings::MeshSettings;
use crate::wave::WaveEngine;

/// What started a wave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// The periodic timer fired
    Auto,
    /// The user clicked near a node
    Manual,
}

/// A wave started during a tick or by input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pulse {
    pub origin: usize,
    pub trigger: Trigger,
}

/// Running counters, reported by the CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MeshStats {
    /// Frames ticked since creation
    pub frames: u64,
    pub auto_pulses: u64,
    pub manual_pulses: u64,
    /// Nodes in the current generation
    pub nodes: usize,
    /// Links in the most recent frame
    pub links: usize,
    /// Highest link count seen in any frame
    pub peak_links: usize,
    /// Whether a wave is still propagating
    pub wave_active: bool,
}

/// The animated mesh: nodes, links, wave and renderer behind one API
#[derive(Debug)]
pub struct Mesh<R: Rng = StdRng> {
    settings: MeshSettings,
    size: SurfaceSize,
    field: NodeField,
    graph: LinkGraph,
    waves: WaveEngine,
    renderer: MeshRenderer,
    rng: R,
    /// Timestamp of the last automatic pulse; `None` until the first tick
    last_auto_pulse: Option<f64>,
    stats: MeshStats,
}

impl Mesh<StdRng> {
    /// Mesh with a deterministic random source
    pub fn seeded(settings: MeshSettings, size: SurfaceSize, seed: u64) -> Self {
        Self::new(settings, size, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Mesh<R> {
    /// Create a mesh for a surface of `size`
    ///
    /// Settings are sanitized first; nodes are generated immediately.
    pub fn new(settings: MeshSettings, size: SurfaceSize, rng: R) -> Self {
        let settings = settings.sanitized();
        let mut mesh = Self {
            waves: WaveEngine::new(settings.hop_strength, settings.hop_frames),
            renderer: MeshRenderer::new(RenderStyle::from(&settings)),
            settings,
            size,
            field: NodeField::default(),
            graph: LinkGraph::default(),
            rng,
            last_auto_pulse: None,
            stats: MeshStats::default(),
        };
        mesh.regenerate();
        mesh
    }

    /// Regenerate the mesh for a new surface size
    ///
    /// All nodes are replaced, brightness is zeroed and any wave in flight is
    /// dropped since its node indices no longer mean anything.
    pub fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.regenerate();
        tracing::info!(
            width = size.width,
            height = size.height,
            nodes = self.field.len(),
            "mesh resized"
        );
    }

    fn regenerate(&mut self) {
        let count = node_count(self.size.width, self.size.height, &self.settings);
        self.field.initialize(
            count,
            self.size.width,
            self.size.height,
            self.settings.node_speed,
            &self.settings.palette,
            &mut self.rng,
        );
        self.waves.clear();
        self.graph.rebuild(self.field.nodes(), self.settings.link_distance);
        self.stats.nodes = count;
        self.stats.links = self.graph.len();
        self.stats.wave_active = false;
    }

    /// Start a wave at the node nearest to a click, if one is close enough
    ///
    /// Coordinates are surface-local CSS pixels. Returns the origin node.
    pub fn click(&mut self, x: f64, y: f64) -> Option<usize> {
        let Some(origin) = self
            .field
            .closest_node(Point::new(x, y), self.settings.click_radius)
        else {
            tracing::debug!(x, y, "click missed every node");
            return None;
        };

        self.start_wave(origin, Trigger::Manual).then_some(origin)
    }

    /// Start a wave at `origin`; out-of-range origins are ignored
    pub fn start_wave(&mut self, origin: usize, trigger: Trigger) -> bool {
        match self.waves.start(origin, self.field.len()) {
            Ok(()) => {
                match trigger {
                    Trigger::Auto => self.stats.auto_pulses += 1,
                    Trigger::Manual => self.stats.manual_pulses += 1,
                }
                self.stats.wave_active = true;
                tracing::debug!(origin, ?trigger, "wave started");
                true
            }
            Err(err) => {
                tracing::debug!(%err, "wave not started");
                false
            }
        }
    }

    /// Advance the simulation by one frame at timestamp `now` (milliseconds)
    ///
    /// Order: automatic trigger, node movement, link rebuild, wave step.
    /// Returns the automatic pulse fired during this tick, if any.
    pub fn tick(&mut self, now: f64) -> Option<Pulse> {
        let pulse = self.check_auto_pulse(now);

        self.field
            .advance(self.settings.glow_fade, self.settings.brightness_floor);
        self.graph
            .rebuild(self.field.nodes(), self.settings.link_distance);
        self.waves.step(&self.graph, self.field.brightness_mut());

        self.stats.frames += 1;
        self.stats.links = self.graph.len();
        self.stats.peak_links = self.stats.peak_links.max(self.graph.len());
        self.stats.wave_active = !self.waves.is_idle();

        pulse
    }

    /// Tick and then draw the frame
    pub fn frame<S: Surface + ?Sized>(&mut self, now: f64, surface: &mut S) -> Option<Pulse> {
        let pulse = self.tick(now);
        self.render(surface);
        pulse
    }

    /// Draw the current state without advancing it
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        self.renderer.render(surface, &self.field, &self.graph);
    }

    fn check_auto_pulse(&mut self, now: f64) -> Option<Pulse> {
        let Some(last) = self.last_auto_pulse else {
            // The first frame arms the timer
            self.last_auto_pulse = Some(now);
            return None;
        };
        if now - last < self.settings.auto_pulse_ms {
            return None;
        }

        self.last_auto_pulse = Some(now);
        if self.field.is_empty() {
            return None;
        }
        let origin = self.rng.random_range(0..self.field.len());
        self.start_wave(origin, Trigger::Auto).then_some(Pulse {
            origin,
            trigger: Trigger::Auto,
        })
    }

    pub fn settings(&self) -> &MeshSettings {
        &self.settings
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn field(&self) -> &NodeField {
        &self.field
    }

    pub fn graph(&self) -> &LinkGraph {
        &self.graph
    }

    pub fn waves(&self) -> &WaveEngine {
        &self.waves
    }

    pub fn stats(&self) -> &MeshStats {
        &self.stats
    }
}
