//! Snowflake sprites: identifiers, async load bookkeeping, PNG decoding
//!
//! Loads are fire-and-forget. A loader writes the outcome into a shared
//! `SpriteStore`; the renderer polls the store each frame and uploads
//! whatever has resolved. A failed load stays `Failed` and renders as an
//! empty texture.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Number of distinct snowflake sprites.
pub const SPRITE_COUNT: usize = 5;

/// One of the five snowflake sprites, numbered 1..=5 like the asset files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SpriteId(u8);

impl SpriteId {
    pub const ALL: [SpriteId; SPRITE_COUNT] =
        [SpriteId(1), SpriteId(2), SpriteId(3), SpriteId(4), SpriteId(5)];

    /// Returns None outside 1..=5.
    pub const fn new(n: u8) -> Option<Self> {
        if n >= 1 && n as usize <= SPRITE_COUNT {
            Some(Self(n))
        } else {
            None
        }
    }

    pub const fn number(self) -> u8 {
        self.0
    }

    /// Zero-based slot index.
    pub const fn idx(self) -> usize {
        (self.0 - 1) as usize
    }

    /// Asset path relative to the assets directory.
    pub fn asset_path(self) -> String {
        format!("textures/sprites/snowflake{}.png", self.0)
    }

    /// Asset path joined onto `assets_dir`.
    pub fn url(self, assets_dir: &str) -> String {
        let base = assets_dir.trim_end_matches('/');
        if base.is_empty() {
            self.asset_path()
        } else {
            format!("{}/{}", base, self.asset_path())
        }
    }
}

impl fmt::Display for SpriteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "snowflake{}", self.0)
    }
}

/// Decoded RGBA8 sprite image.
#[derive(Clone, Debug, PartialEq)]
pub struct SpriteImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Decode PNG bytes into RGBA8.
pub fn decode_sprite(bytes: &[u8]) -> Result<SpriteImage, String> {
    let image = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
        .map_err(|e| e.to_string())?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(SpriteImage {
        width,
        height,
        rgba: image.into_raw(),
    })
}

/// Load state of one sprite.
#[derive(Clone, Debug, Default)]
pub enum SpriteSlot {
    #[default]
    Unrequested,
    Pending,
    Ready(Arc<SpriteImage>),
    Failed(String),
}

impl SpriteSlot {
    pub fn image(&self) -> Option<&Arc<SpriteImage>> {
        match self {
            SpriteSlot::Ready(image) => Some(image),
            _ => None,
        }
    }

    /// Terminal states: no further change will happen.
    pub fn is_settled(&self) -> bool {
        matches!(self, SpriteSlot::Ready(_) | SpriteSlot::Failed(_))
    }
}

/// Shared load state for all sprites. Loaders write, the renderer reads.
#[derive(Clone, Debug, Default)]
pub struct SpriteStore {
    slots: Arc<Mutex<[SpriteSlot; SPRITE_COUNT]>>,
}

impl SpriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: SpriteId) -> SpriteSlot {
        self.slots.lock()[id.idx()].clone()
    }

    pub fn mark_pending(&self, id: SpriteId) {
        self.slots.lock()[id.idx()] = SpriteSlot::Pending;
    }

    pub fn resolve(&self, id: SpriteId, image: SpriteImage) {
        self.slots.lock()[id.idx()] = SpriteSlot::Ready(Arc::new(image));
    }

    pub fn fail(&self, id: SpriteId, error: impl Into<String>) {
        self.slots.lock()[id.idx()] = SpriteSlot::Failed(error.into());
    }

    /// Number of sprites whose load has finished (either way).
    pub fn settled_count(&self) -> usize {
        self.slots.lock().iter().filter(|s| s.is_settled()).count()
    }
}

/// Starts an asynchronous sprite load. Must not block; the outcome is
/// written into the loader's `SpriteStore` whenever it arrives.
pub trait SpriteLoader {
    fn load(&mut self, id: SpriteId, path: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_png(width: u32, height: u32, pixel: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(pixel));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn sprite_id_range() {
        assert!(SpriteId::new(0).is_none());
        assert!(SpriteId::new(6).is_none());
        assert_eq!(SpriteId::new(3).map(SpriteId::idx), Some(2));
        assert_eq!(SpriteId::ALL.len(), SPRITE_COUNT);
    }

    #[test]
    fn sprite_urls() {
        let id = SpriteId::new(2).unwrap();
        assert_eq!(id.asset_path(), "textures/sprites/snowflake2.png");
        assert_eq!(id.url("./assets"), "./assets/textures/sprites/snowflake2.png");
        assert_eq!(id.url("./assets/"), "./assets/textures/sprites/snowflake2.png");
        assert_eq!(id.url(""), "textures/sprites/snowflake2.png");
    }

    #[test]
    fn decode_png_to_rgba() {
        let png = encode_png(4, 2, [255, 255, 255, 128]);
        let sprite = decode_sprite(&png).unwrap();
        assert_eq!((sprite.width, sprite.height), (4, 2));
        assert_eq!(sprite.rgba.len(), 4 * 2 * 4);
        assert_eq!(&sprite.rgba[..4], &[255, 255, 255, 128]);
    }

    #[test]
    fn decode_garbage_fails() {
        assert!(decode_sprite(b"not a png").is_err());
    }

    #[test]
    fn store_transitions() {
        let store = SpriteStore::new();
        let a = SpriteId::new(1).unwrap();
        let b = SpriteId::new(4).unwrap();

        assert!(matches!(store.get(a), SpriteSlot::Unrequested));
        store.mark_pending(a);
        store.mark_pending(b);
        assert!(matches!(store.get(a), SpriteSlot::Pending));
        assert_eq!(store.settled_count(), 0);

        store.resolve(a, SpriteImage { width: 1, height: 1, rgba: vec![0; 4] });
        store.fail(b, "404");
        assert!(store.get(a).image().is_some());
        assert!(matches!(store.get(b), SpriteSlot::Failed(ref e) if e == "404"));
        assert_eq!(store.settled_count(), 2);
    }

    #[test]
    fn store_clones_share_state() {
        let store = SpriteStore::new();
        let other = store.clone();
        let id = SpriteId::new(5).unwrap();
        other.fail(id, "gone");
        assert!(store.get(id).is_settled());
    }
}
