//! 2D Canvas surface
//!
//! Draws the mesh onto an HTML canvas. The backing store is sized in device
//! pixels while drawing happens in CSS pixels through a scale transform.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use meshpulse::color::Rgb;
use meshpulse::{Fill, GradientStop, Point, Surface, SurfaceSize};

/// Canvas-backed [`Surface`]
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    size: SurfaceSize,
}

impl CanvasSurface {
    /// Create a surface from a canvas element
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, String> {
        let ctx = canvas
            .get_context("2d")
            .map_err(|e| format!("Failed to get 2d context: {:?}", e))?
            .ok_or("2d context not available")?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| "Failed to cast to CanvasRenderingContext2d")?;

        let size = SurfaceSize::new(canvas.width() as f64, canvas.height() as f64, 1.0);

        Ok(Self { canvas, ctx, size })
    }

    /// Layout size of the canvas element in CSS pixels
    pub fn measure(&self, pixel_ratio: f64) -> SurfaceSize {
        SurfaceSize::new(
            self.canvas.offset_width() as f64,
            self.canvas.offset_height() as f64,
            pixel_ratio,
        )
    }

    /// Resize the backing store to `size` in device pixels
    pub fn resize(&mut self, size: SurfaceSize) {
        self.canvas.set_width(size.backing_width());
        self.canvas.set_height(size.backing_height());
        self.size = size;
    }

    fn radial_gradient(
        &self,
        center: Point,
        radius: f64,
        stops: &[GradientStop],
    ) -> Result<web_sys::CanvasGradient, JsValue> {
        let gradient = self
            .ctx
            .create_radial_gradient(center.x, center.y, 0.0, center.x, center.y, radius)?;
        for stop in stops {
            gradient.add_color_stop(stop.offset as f32, &stop.color.css_rgba(stop.opacity))?;
        }
        Ok(gradient)
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self) {
        let ratio = self.size.pixel_ratio;
        // Resetting the canvas width drops the transform, so set it every frame
        let _ = self.ctx.set_transform(ratio, 0.0, 0.0, ratio, 0.0, 0.0);
        self.ctx
            .clear_rect(0.0, 0.0, self.size.width, self.size.height);
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Rgb, opacity: f64) {
        self.ctx.begin_path();
        self.ctx.move_to(from.x, from.y);
        self.ctx.line_to(to.x, to.y);
        self.ctx.set_stroke_style_str(&color.css_rgba(opacity));
        self.ctx.set_line_width(width);
        self.ctx.stroke();
    }

    fn fill_circle(&mut self, center: Point, radius: f64, fill: &Fill) {
        match fill {
            Fill::Solid { color, opacity } => {
                self.ctx.set_fill_style_str(&color.css_rgba(*opacity));
            }
            Fill::Radial(stops) => match self.radial_gradient(center, radius, stops) {
                Ok(gradient) => self.ctx.set_fill_style_canvas_gradient(&gradient),
                Err(e) => {
                    tracing::debug!(?e, "gradient rejected");
                    return;
                }
            },
        }

        self.ctx.begin_path();
        self.ctx
            .arc(center.x, center.y, radius, 0.0, std::f64::consts::TAU)
            .ok();
        self.ctx.fill();
    }
}
