//! Native sprite loader
//!
//! Reads and decodes each sprite on a background thread; the outcome lands
//! in the shared `SpriteStore` whenever it is ready.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::core::sprite::{decode_sprite, SpriteId, SpriteLoader, SpriteStore};

/// Fire-and-forget filesystem loader
pub struct NativeSpriteLoader {
    store: SpriteStore,
}

impl NativeSpriteLoader {
    pub fn new(store: SpriteStore) -> Self {
        Self { store }
    }
}

impl SpriteLoader for NativeSpriteLoader {
    fn load(&mut self, id: SpriteId, path: &str) {
        self.store.mark_pending(id);

        let store = self.store.clone();
        let path = PathBuf::from(path);

        let spawned = std::thread::Builder::new()
            .name(format!("sprite-{}", id.number()))
            .spawn(move || {
                let result = std::fs::read(&path)
                    .map_err(|e| e.to_string())
                    .and_then(|bytes| decode_sprite(&bytes));
                match result {
                    Ok(image) => {
                        debug!(sprite = %id, width = image.width, height = image.height, "Sprite loaded");
                        store.resolve(id, image);
                    }
                    Err(e) => {
                        warn!(sprite = %id, path = %path.display(), error = %e, "Sprite load failed");
                        store.fail(id, e);
                    }
                }
            });

        if let Err(e) = spawned {
            warn!(sprite = %id, error = %e, "Failed to spawn sprite loader thread");
            self.store.fail(id, e.to_string());
        }
    }
}
