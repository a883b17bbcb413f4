//! Snowfall - layered point-sprite snow that drifts with the pointer
//!
//! Five particle layers share one field of 10,000 points. Each layer spins
//! around Y at its own rate and cycles its hue; the camera eases toward the
//! pointer. Runs as a browser app (`wasm` feature) or a native window
//! (`native` feature); `core` holds everything that does not need a GPU.

pub mod config;
pub mod core;
pub mod time;

#[cfg(not(target_arch = "wasm32"))]
pub mod loader_native;
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod loader_wasm;

#[cfg(any(feature = "wasm", feature = "native"))]
pub mod app;
#[cfg(any(feature = "wasm", feature = "native"))]
pub mod snow;
#[cfg(any(feature = "wasm", feature = "native"))]
pub mod theme;

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
mod web {
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;

    use crate::app::SnowApp;
    use crate::config::SnowConfig;

    /// Config from the optional `window.__snowfall_config` JSON string.
    fn page_config() -> SnowConfig {
        let Some(json) = js_sys::eval("window.__snowfall_config")
            .ok()
            .and_then(|v| v.as_string())
        else {
            return SnowConfig::default();
        };
        SnowConfig::from_json(&json).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring invalid window.__snowfall_config");
            SnowConfig::default()
        })
    }

    #[wasm_bindgen(start)]
    pub fn main() {
        console_error_panic_hook::set_once();

        // Initialize tracing for browser console
        tracing_wasm::set_as_global_default();

        let web_options = eframe::WebOptions::default();
        let config = page_config();

        wasm_bindgen_futures::spawn_local(async move {
            let canvas = web_sys::window()
                .expect("no window")
                .document()
                .expect("no document")
                .get_element_by_id("canvas")
                .expect("no canvas element")
                .dyn_into::<web_sys::HtmlCanvasElement>()
                .expect("not a canvas element");

            eframe::WebRunner::new()
                .start(
                    canvas,
                    web_options,
                    Box::new(|cc| Ok(Box::new(SnowApp::new(cc, config)))),
                )
                .await
                .expect("Failed to start eframe");
        });
    }
}
