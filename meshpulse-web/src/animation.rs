//! `requestAnimationFrame` as a [`FrameScheduler`]

use js_sys::Promise;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::Window;

use meshpulse::FrameScheduler;

/// Resolves once per browser animation frame with its timestamp
pub struct AnimationFrames {
    window: Window,
}

impl AnimationFrames {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl FrameScheduler for AnimationFrames {
    async fn next_frame(&mut self) -> Option<f64> {
        let window = self.window.clone();
        let promise = Promise::new(&mut |resolve, reject| {
            // The callback's first argument is the frame timestamp
            if window.request_animation_frame(&resolve).is_err() {
                let _ = reject.call0(&JsValue::UNDEFINED);
            }
        });

        JsFuture::from(promise).await.ok()?.as_f64()
    }
}
