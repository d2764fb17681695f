pub mod image;
pub mod resolver;

pub use crate::image::{DecodeError, ResolvedImage};
pub use resolver::{AssetStore, ImageCache, ImageResolver, MemoryAssets};
