use crate::stimulus::{StimulusItem, StimulusRecord};
use serde::{Deserialize, Serialize};

/// An ordered set of binocular stimuli plus set-level defaults.
///
/// Presentation order is the item order unless `randomize` is set, in which
/// case the engine shuffles a permutation of indices at run start.
#[derive(Debug, Clone, PartialEq)]
pub struct StimulusSequence {
    items: Vec<StimulusItem>,
    pub default_duration_ms: i64,
    pub default_isi_ms: i64,
    pub randomize: bool,
}

impl StimulusSequence {
    pub fn new(items: Vec<StimulusItem>, default_duration_ms: i64, default_isi_ms: i64) -> Self {
        Self {
            items,
            default_duration_ms: default_duration_ms.max(0),
            default_isi_ms: default_isi_ms.max(0),
            randomize: false,
        }
    }

    pub fn with_randomize(mut self, randomize: bool) -> Self {
        self.randomize = randomize;
        self
    }

    pub fn items(&self) -> &[StimulusItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Effective presentation time in seconds: the per-item override when
    /// positive, the set default otherwise, never negative.
    pub fn effective_duration_secs(&self, item: &StimulusItem) -> f64 {
        let ms = if item.duration_ms > 0 {
            item.duration_ms
        } else {
            self.default_duration_ms
        };
        ms.max(0) as f64 / 1000.0
    }

    /// Effective inter-stimulus interval in seconds, same fallback rule.
    pub fn effective_isi_secs(&self, item: &StimulusItem) -> f64 {
        let ms = if item.isi_ms > 0 {
            item.isi_ms
        } else {
            self.default_isi_ms
        };
        ms.max(0) as f64 / 1000.0
    }
}

/// On-disk set document: a list of stimulus records plus the set-level
/// defaults and the randomize flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SetFile {
    pub stimuli: Vec<StimulusRecord>,
    pub default_duration_ms: i64,
    pub default_isi_ms: i64,
    pub randomize: bool,
}

impl Default for SetFile {
    fn default() -> Self {
        Self {
            stimuli: Vec::new(),
            default_duration_ms: 2000,
            default_isi_ms: 1000,
            randomize: false,
        }
    }
}

impl From<SetFile> for StimulusSequence {
    fn from(f: SetFile) -> Self {
        StimulusSequence::new(
            f.stimuli.into_iter().map(StimulusItem::from).collect(),
            f.default_duration_ms,
            f.default_isi_ms,
        )
        .with_randomize(f.randomize)
    }
}
