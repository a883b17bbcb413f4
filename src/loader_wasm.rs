//! Browser sprite loader
//!
//! Each sprite is fetched on the JS event loop via `spawn_local`; the
//! decoded image lands in the shared `SpriteStore` between frames.

use tracing::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use crate::core::sprite::{decode_sprite, SpriteId, SpriteLoader, SpriteStore};

/// Fire-and-forget `fetch` loader
pub struct WebSpriteLoader {
    store: SpriteStore,
}

impl WebSpriteLoader {
    pub fn new(store: SpriteStore) -> Self {
        Self { store }
    }
}

impl SpriteLoader for WebSpriteLoader {
    fn load(&mut self, id: SpriteId, path: &str) {
        self.store.mark_pending(id);

        let store = self.store.clone();
        let url = path.to_string();
        wasm_bindgen_futures::spawn_local(async move {
            match fetch_bytes(&url).await {
                Ok(bytes) => match decode_sprite(&bytes) {
                    Ok(image) => {
                        debug!(sprite = %id, width = image.width, height = image.height, "Sprite loaded");
                        store.resolve(id, image);
                    }
                    Err(e) => {
                        warn!(sprite = %id, url = %url, error = %e, "Sprite decode failed");
                        store.fail(id, e);
                    }
                },
                Err(e) => {
                    let msg = format!("{:?}", e);
                    warn!(sprite = %id, url = %url, error = %msg, "Sprite fetch failed");
                    store.fail(id, msg);
                }
            }
        });
    }
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_str(url)).await?.dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", response.status())));
    }
    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}
