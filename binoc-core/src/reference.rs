use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a stimulus image comes from.
///
/// The authoring format carries a string plus an `is_file_path` flag; an
/// empty or whitespace-only string means "show black" regardless of the
/// flag, so emptiness is folded into the variant rather than re-checked
/// everywhere downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageReference {
    /// Absolute path on the local file system.
    FilePath(PathBuf),
    /// Key into the bundled-asset store (no extension).
    BundleKey(String),
    /// Nothing assigned; renders as black.
    Empty,
}

impl ImageReference {
    pub fn new(raw: &str, is_file_path: bool) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            ImageReference::Empty
        } else if is_file_path {
            ImageReference::FilePath(PathBuf::from(trimmed))
        } else {
            ImageReference::BundleKey(trimmed.to_string())
        }
    }

    /// Browse-mode selections are optional paths; `None` means black.
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(p) => ImageReference::FilePath(p.to_path_buf()),
            None => ImageReference::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ImageReference::Empty)
    }

    /// Key under which a resolved image is cached. File paths compare
    /// case-insensitively; bundle keys compare exactly. `Empty` never
    /// touches the cache.
    pub fn cache_key(&self) -> Option<String> {
        match self {
            ImageReference::FilePath(p) => Some(p.to_string_lossy().to_lowercase()),
            ImageReference::BundleKey(k) => Some(k.clone()),
            ImageReference::Empty => None,
        }
    }

    /// Display form for status lines and warnings.
    pub fn describe(&self) -> String {
        match self {
            ImageReference::FilePath(p) => p.display().to_string(),
            ImageReference::BundleKey(k) => k.clone(),
            ImageReference::Empty => "[BLACK]".to_string(),
        }
    }
}
