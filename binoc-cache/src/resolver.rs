use crate::image::ResolvedImage;
use binoc_core::{ImageReference, StimulusSequence};
use log::{error, warn};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

/// Bundled-asset lookup capability: raw bytes by key, or not found.
pub trait AssetStore {
    fn lookup(&self, key: &str) -> Option<Vec<u8>>;
}

/// In-memory asset store; the test double and the "no bundled assets"
/// default for file-only deployments.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, bytes: Vec<u8>) {
        self.entries.insert(key.into(), bytes);
    }
}

impl AssetStore for MemoryAssets {
    fn lookup(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }
}

/// Decoded images keyed by reference string.
///
/// Owned by one resolver, filled lazily, and never evicted behind the
/// caller's back: an image that is currently bound stays valid until an
/// explicit [`ImageCache::clear`] (rescan) or teardown.
#[derive(Debug, Default)]
pub struct ImageCache {
    map: HashMap<String, ResolvedImage>,
    black: Option<ResolvedImage>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared black fallback; never stored under a real key.
    pub fn black(&mut self) -> ResolvedImage {
        self.black.get_or_insert_with(ResolvedImage::black).clone()
    }

    pub fn get(&self, key: &str) -> Option<ResolvedImage> {
        self.map.get(key).cloned()
    }

    pub fn insert(&mut self, key: String, image: ResolvedImage) {
        self.map.insert(key, image);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

/// Turns an [`ImageReference`] into a loaded image, caching successes and
/// degrading every failure to black. Resolution never fails outward: a
/// missing or undecodable image costs a warning and a black slot, nothing
/// more.
#[derive(Debug)]
pub struct ImageResolver<A> {
    cache: ImageCache,
    assets: A,
}

impl<A: AssetStore> ImageResolver<A> {
    pub fn new(assets: A) -> Self {
        Self {
            cache: ImageCache::new(),
            assets,
        }
    }

    pub fn resolve(&mut self, reference: &ImageReference) -> ResolvedImage {
        let Some(key) = reference.cache_key() else {
            return self.cache.black();
        };
        if let Some(hit) = self.cache.get(&key) {
            return hit;
        }

        let loaded = match reference {
            ImageReference::FilePath(path) => self.load_file(path),
            ImageReference::BundleKey(bundle_key) => self.load_bundled(bundle_key),
            ImageReference::Empty => None,
        };

        match loaded {
            Some(image) => {
                self.cache.insert(key, image.clone());
                image
            }
            None => self.cache.black(),
        }
    }

    fn load_file(&self, path: &Path) -> Option<ResolvedImage> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("missing file: {}", path.display());
                return None;
            }
            Err(e) => {
                error!("read error ({}): {e}", path.display());
                return None;
            }
        };
        match ResolvedImage::decode(&bytes) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("decode failed ({}): {e}", path.display());
                None
            }
        }
    }

    fn load_bundled(&self, key: &str) -> Option<ResolvedImage> {
        let Some(bytes) = self.assets.lookup(key) else {
            warn!("bundled asset not found: {key}");
            return None;
        };
        match ResolvedImage::decode(&bytes) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("decode failed ({key}): {e}");
                None
            }
        }
    }

    /// Resolve every reference in the sequence up front so playback ticks
    /// stay within the frame budget.
    pub fn prewarm(&mut self, sequence: &StimulusSequence) {
        for item in sequence.items() {
            self.resolve(&item.left);
            self.resolve(&item.right);
        }
    }

    pub fn black(&mut self) -> ResolvedImage {
        self.cache.black()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached decode; the next resolve reloads from source.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
