use std::sync::Arc;
use thiserror::Error;
use tiny_skia::{IntSize, Pixmap};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("image has zero width or height")]
    EmptyImage,
}

/// A decoded stimulus image, shared between the cache and the eye slots.
///
/// Cloning is an `Arc` bump; two handles to the same decode compare equal
/// under [`ResolvedImage::ptr_eq`], which is what the overlay uses to make
/// re-binding the current pair a no-op.
#[derive(Debug, Clone)]
pub struct ResolvedImage(Arc<Pixmap>);

impl ResolvedImage {
    /// The 1×1 black fallback for empty, missing, or undecodable
    /// references. Callers get a fresh handle; the cache keeps one
    /// long-lived instance so fallbacks stay identity-comparable.
    pub fn black() -> Self {
        let mut pm = Pixmap::new(1, 1).expect("pixmap");
        pm.fill(tiny_skia::Color::BLACK);
        Self(Arc::new(pm))
    }

    /// Decode raw image bytes into a premultiplied RGBA pixel buffer.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let rgba = image::load_from_memory(bytes)?.into_rgba8();
        let (width, height) = rgba.dimensions();
        let size = IntSize::from_wh(width, height).ok_or(DecodeError::EmptyImage)?;

        // tiny-skia stores premultiplied alpha; image yields straight alpha.
        let mut data = rgba.into_raw();
        for px in data.chunks_exact_mut(4) {
            let a = px[3] as u16;
            if a < 255 {
                px[0] = (px[0] as u16 * a / 255) as u8;
                px[1] = (px[1] as u16 * a / 255) as u8;
                px[2] = (px[2] as u16 * a / 255) as u8;
            }
        }

        let pixmap = Pixmap::from_vec(data, size).ok_or(DecodeError::EmptyImage)?;
        Ok(Self(Arc::new(pixmap)))
    }

    /// Wrap an already-rendered pixel buffer (synthetic stimuli, tests).
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self(Arc::new(pixmap))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.0
    }

    /// Identity comparison: same underlying decode, not same pixels.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
