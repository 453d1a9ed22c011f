//! Browser host for the meshpulse background animation
//!
//! This crate provides WASM bindings that run the mesh on an HTML canvas,
//! driven by `requestAnimationFrame`, with click-to-pulse and window resize
//! handling.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlCanvasElement, MouseEvent, Window};

use meshpulse::{Mesh, MeshSettings, run_frames};

pub mod animation;
pub mod canvas2d;

use animation::AnimationFrames;
use canvas2d::CanvasSurface;

/// Initialize WASM panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// A running mesh, shared with the page's event handlers
#[wasm_bindgen]
pub struct MeshHandle {
    mesh: Rc<RefCell<Mesh>>,
}

#[wasm_bindgen]
impl MeshHandle {
    /// Start a pulse at the node nearest to canvas-local `(x, y)`
    ///
    /// Returns the origin node, or `undefined` if nothing was in reach or a
    /// frame is being drawn.
    pub fn pulse_at(&self, x: f64, y: f64) -> Option<u32> {
        let mut mesh = self.mesh.try_borrow_mut().ok()?;
        mesh.click(x, y).map(|origin| origin as u32)
    }

    /// Current counters as JSON
    pub fn stats_json(&self) -> Result<String, JsValue> {
        let mesh = self
            .mesh
            .try_borrow()
            .map_err(|_| JsValue::from_str("mesh is busy"))?;
        serde_json::to_string(mesh.stats()).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// Run the mesh on the canvas with id `canvas_id`
///
/// `settings_json` overrides the defaults; missing fields keep their default
/// values.
#[wasm_bindgen]
pub fn start(canvas_id: &str, settings_json: Option<String>) -> Result<MeshHandle, JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| format!("missing #{canvas_id}"))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| format!("#{canvas_id} is not a canvas"))?;

    let settings = match settings_json.as_deref() {
        Some(json) => {
            MeshSettings::from_json_str(json).map_err(|e| JsValue::from_str(&e.to_string()))?
        }
        None => MeshSettings::default(),
    };

    let mut surface = CanvasSurface::new(canvas.clone()).map_err(|e| JsValue::from_str(&e))?;
    let size = surface.measure(window.device_pixel_ratio());
    surface.resize(size);

    let seed = seed_from_unit(js_sys::Math::random(), js_sys::Math::random());
    let mesh = Rc::new(RefCell::new(Mesh::seeded(settings, size, seed)));
    let surface = Rc::new(RefCell::new(surface));

    listen_for_clicks(&canvas, &mesh)?;
    listen_for_resize(&window, &mesh, &surface)?;

    {
        let mesh = mesh.clone();
        let mut frames = AnimationFrames::new(window);
        spawn_local(async move {
            let drawn = run_frames(&*mesh, &*surface, &mut frames).await;
            tracing::info!(drawn, "animation stopped");
        });
    }

    Ok(MeshHandle { mesh })
}

fn listen_for_clicks(
    canvas: &HtmlCanvasElement,
    mesh: &Rc<RefCell<Mesh>>,
) -> Result<(), JsValue> {
    let target = canvas.clone();
    let mesh = mesh.clone();
    let closure = Closure::wrap(Box::new(move |event: MouseEvent| {
        let rect = target.get_bounding_client_rect();
        let x = event.client_x() as f64 - rect.left();
        let y = event.client_y() as f64 - rect.top();
        if let Ok(mut mesh) = mesh.try_borrow_mut() {
            mesh.click(x, y);
        }
    }) as Box<dyn FnMut(MouseEvent)>);

    canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    // Listeners live as long as the page
    closure.forget();
    Ok(())
}

fn listen_for_resize(
    window: &Window,
    mesh: &Rc<RefCell<Mesh>>,
    surface: &Rc<RefCell<CanvasSurface>>,
) -> Result<(), JsValue> {
    let source = window.clone();
    let mesh = mesh.clone();
    let surface = surface.clone();
    let closure = Closure::wrap(Box::new(move || {
        let (Ok(mut mesh), Ok(mut surface)) = (mesh.try_borrow_mut(), surface.try_borrow_mut())
        else {
            return;
        };
        let size = surface.measure(source.device_pixel_ratio());
        surface.resize(size);
        mesh.resize(size);
    }) as Box<dyn FnMut()>);

    window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Combine two uniform samples in `[0, 1)` into a 64-bit seed
fn seed_from_unit(high: f64, low: f64) -> u64 {
    let word = |v: f64| (v.clamp(0.0, 1.0) * u32::MAX as f64) as u64;
    (word(high) << 32) | word(low)
}
