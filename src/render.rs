//! Drawing surface abstraction and the mesh renderer
//!
//! The renderer only reads simulation state. Every frame it clears the whole
//! surface and redraws links first (behind) and nodes on top.

use crate::color::{Rgb, WHITE};
use crate::field::NodeField;
use crate::geometry::{Point, SurfaceSize};
use crate::links::LinkGraph;
use crate::settings::MeshSettings;

/// One color stop of a radial gradient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// Position along the radius, `0.0` at the center and `1.0` at the rim
    pub offset: f64,
    pub color: Rgb,
    pub opacity: f64,
}

/// How a circle is filled
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    /// A single color
    Solid { color: Rgb, opacity: f64 },
    /// A radial gradient centered on the circle
    Radial(Vec<GradientStop>),
}

/// A 2D drawing surface
///
/// Coordinates are CSS pixels; implementations apply the device pixel ratio
/// themselves.
pub trait Surface {
    /// Current dimensions of the surface
    fn size(&self) -> SurfaceSize;

    /// Erase everything drawn so far
    fn clear(&mut self);

    /// Stroke a straight segment
    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Rgb, opacity: f64);

    /// Fill a circle
    fn fill_circle(&mut self, center: Point, radius: f64, fill: &Fill);
}

/// Visual parameters of the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub node_radius: f64,
    pub line_opacity: f64,
    pub glow_color: Rgb,
    pub halo_threshold: f64,
    pub core_white_threshold: f64,
}

impl From<&MeshSettings> for RenderStyle {
    fn from(settings: &MeshSettings) -> Self {
        Self {
            node_radius: settings.node_radius,
            line_opacity: settings.line_opacity,
            glow_color: settings.glow_color,
            halo_threshold: settings.halo_threshold,
            core_white_threshold: settings.core_white_threshold,
        }
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self::from(&MeshSettings::default())
    }
}

/// Draws nodes, links and glow onto a [`Surface`]
#[derive(Debug, Clone, Default)]
pub struct MeshRenderer {
    style: RenderStyle,
}

impl MeshRenderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Redraw the full frame
    pub fn render<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        field: &NodeField,
        graph: &LinkGraph,
    ) {
        surface.clear();
        self.render_links(surface, field, graph);
        self.render_nodes(surface, field);
    }

    /// Links brighten and thicken with the brighter of their endpoints
    fn render_links<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        field: &NodeField,
        graph: &LinkGraph,
    ) {
        let nodes = field.nodes();
        let brightness = field.brightness();

        for link in graph.links() {
            let (Some(a), Some(b)) = (nodes.get(link.a), nodes.get(link.b)) else {
                continue;
            };
            let glow = glow_at(brightness, link.a).max(glow_at(brightness, link.b));

            surface.stroke_line(
                a.position(),
                b.position(),
                1.0 + glow * 1.5,
                self.style.glow_color,
                self.style.line_opacity + glow * 0.5,
            );
        }
    }

    fn render_nodes<S: Surface + ?Sized>(&self, surface: &mut S, field: &NodeField) {
        let brightness = field.brightness();

        for (i, node) in field.nodes().iter().enumerate() {
            let glow = glow_at(brightness, i);
            let center = node.position();

            if glow > self.style.halo_threshold {
                surface.fill_circle(center, self.halo_radius(glow), &self.halo(glow));
            }

            let alpha = 0.6 + glow * 0.4;
            let core = if glow > self.style.core_white_threshold {
                Fill::Solid {
                    color: WHITE,
                    opacity: (0.9 + glow * 0.1) * alpha,
                }
            } else {
                Fill::Solid {
                    color: node.color,
                    opacity: alpha,
                }
            };
            surface.fill_circle(center, self.style.node_radius, &core);
        }
    }

    /// Halo radius grows with brightness
    pub fn halo_radius(&self, glow: f64) -> f64 {
        self.style.node_radius * (3.0 + glow * 4.0)
    }

    fn halo(&self, glow: f64) -> Fill {
        let color = self.style.glow_color;
        Fill::Radial(vec![
            GradientStop {
                offset: 0.0,
                color,
                opacity: 0.9 * glow,
            },
            GradientStop {
                offset: 0.4,
                color,
                opacity: 0.4 * glow,
            },
            GradientStop {
                offset: 1.0,
                color,
                opacity: 0.0,
            },
        ])
    }
}

fn glow_at(brightness: &[f64], index: usize) -> f64 {
    brightness.get(index).copied().unwrap_or(0.0)
}
