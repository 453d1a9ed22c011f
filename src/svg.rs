//! SVG drawing surface
//!
//! Collects draw calls as SVG elements and serializes the current frame as a
//! standalone document. Used by the CLI for headless output and by tests.

use askama::Template;

use crate::color::{Rgb, format_opacity};
use crate::geometry::{Point, SurfaceSize};
use crate::render::{Fill, Surface};

#[derive(Template)]
#[template(path = "frame.svg", escape = "none")]
struct FrameTemplate<'a> {
    width: &'a str,
    height: &'a str,
    background: Option<String>,
    defs: &'a [String],
    elements: &'a [String],
}

/// A [`Surface`] that records one frame as SVG markup
#[derive(Debug, Clone, Default)]
pub struct SvgSurface {
    size: SurfaceSize,
    background: Option<Rgb>,
    defs: Vec<String>,
    elements: Vec<String>,
    next_gradient: usize,
}

impl SvgSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    /// Paint the whole surface with `color` underneath the mesh
    pub fn with_background(mut self, color: Rgb) -> Self {
        self.background = Some(color);
        self
    }

    /// Change the surface dimensions (the mesh should be resized to match)
    pub fn set_size(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    /// SVG elements drawn since the last clear, in paint order
    pub fn elements(&self) -> &[String] {
        &self.elements
    }

    /// Serialize the current frame as an SVG document
    pub fn finish(&self) -> askama::Result<String> {
        let width = number(self.size.width);
        let height = number(self.size.height);
        FrameTemplate {
            width: &width,
            height: &height,
            background: self.background.map(|c| c.to_string()),
            defs: &self.defs,
            elements: &self.elements,
        }
        .render()
    }
}

impl Surface for SvgSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self) {
        self.defs.clear();
        self.elements.clear();
        self.next_gradient = 0;
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Rgb, opacity: f64) {
        self.elements.push(format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-opacity="{}" stroke-width="{}" stroke-linecap="round"/>"#,
            number(from.x),
            number(from.y),
            number(to.x),
            number(to.y),
            color,
            format_opacity(opacity),
            number(width),
        ));
    }

    fn fill_circle(&mut self, center: Point, radius: f64, fill: &Fill) {
        let (cx, cy, r) = (number(center.x), number(center.y), number(radius));

        match fill {
            Fill::Solid { color, opacity } => {
                self.elements.push(format!(
                    r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{color}" fill-opacity="{}"/>"#,
                    format_opacity(*opacity),
                ));
            }
            Fill::Radial(stops) => {
                let id = format!("halo-{}", self.next_gradient);
                self.next_gradient += 1;

                let mut def = format!(
                    r#"<radialGradient id="{id}" gradientUnits="userSpaceOnUse" cx="{cx}" cy="{cy}" r="{r}">"#
                );
                for stop in stops {
                    def.push_str(&format!(
                        r#"<stop offset="{}" stop-color="{}" stop-opacity="{}"/>"#,
                        number(stop.offset),
                        stop.color,
                        format_opacity(stop.opacity),
                    ));
                }
                def.push_str("</radialGradient>");
                self.defs.push(def);

                self.elements.push(format!(
                    r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="url(#{id})"/>"#
                ));
            }
        }
    }
}

/// Coordinates with at most two decimals and no trailing zeros
fn number(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let text = format!("{v:.2}");
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        &text
    };
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
