use anyhow::{Context, Result, bail};
use binoc_cache::AssetStore;
use binoc_core::{SetFile, StimulusSequence};
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File types picked up by a folder scan.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Scan `folder` for stimulus images, ordered case-insensitively.
pub fn list_files(folder: &Path, extensions: &[&str], recursive: bool) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect(folder, extensions, recursive, &mut files)?;
    files.sort_by_key(|p| p.to_string_lossy().to_lowercase());
    Ok(files)
}

fn collect(
    dir: &Path,
    extensions: &[&str],
    recursive: bool,
    out: &mut Vec<PathBuf>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            if recursive {
                collect(&path, extensions, recursive, out)?;
            }
            continue;
        }
        let ext = path
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_lowercase);
        if ext.is_some_and(|e| extensions.contains(&e.as_str())) {
            out.push(path);
        }
    }
    Ok(())
}

/// Load a stimulus-set document.
pub fn load_set(path: &Path) -> Result<StimulusSequence> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let set: SetFile =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    let sequence = StimulusSequence::from(set);
    if sequence.is_empty() {
        bail!("set {} has no stimuli", path.display());
    }
    Ok(sequence)
}

/// Bundled-asset lookup backed by a directory: a key maps to a file under
/// the root, with or without its extension spelled out.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetStore for DirAssets {
    fn lookup(&self, key: &str) -> Option<Vec<u8>> {
        let base = self.root.join(key);
        if let Ok(bytes) = fs::read(&base) {
            return Some(bytes);
        }
        for ext in IMAGE_EXTENSIONS {
            if let Ok(bytes) = fs::read(base.with_extension(ext)) {
                return Some(bytes);
            }
        }
        None
    }
}
