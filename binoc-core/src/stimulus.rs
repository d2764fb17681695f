use crate::reference::ImageReference;
use serde::{Deserialize, Serialize};

/// One binocular stimulus: an image per eye plus optional timing overrides.
/// Immutable once part of a sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct StimulusItem {
    pub left: ImageReference,
    pub right: ImageReference,
    /// Presentation duration in ms; `<= 0` means "use the set default".
    pub duration_ms: i64,
    /// Inter-stimulus interval in ms; `<= 0` means "use the set default".
    pub isi_ms: i64,
}

impl StimulusItem {
    pub fn new(left: ImageReference, right: ImageReference) -> Self {
        Self {
            left,
            right,
            duration_ms: 0,
            isi_ms: 0,
        }
    }

    pub fn with_timing(mut self, duration_ms: i64, isi_ms: i64) -> Self {
        self.duration_ms = duration_ms;
        self.isi_ms = isi_ms;
        self
    }
}

/// Raw authoring record, one entry in the JSON set file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StimulusRecord {
    pub left: String,
    pub left_is_file_path: bool,
    pub right: String,
    pub right_is_file_path: bool,
    pub duration_ms: i64,
    pub isi_ms: i64,
}

impl From<StimulusRecord> for StimulusItem {
    fn from(r: StimulusRecord) -> Self {
        StimulusItem {
            left: ImageReference::new(&r.left, r.left_is_file_path),
            right: ImageReference::new(&r.right, r.right_is_file_path),
            duration_ms: r.duration_ms,
            isi_ms: r.isi_ms,
        }
    }
}
