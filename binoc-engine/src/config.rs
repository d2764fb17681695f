/// Engine-level configuration.
///
/// The per-sequence defaults in [`binoc_core::StimulusSequence`] describe
/// the authored set; these values cover everything else: the timings used
/// for ad-hoc (saved-pair) playback and the run options.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Presentation duration for ad-hoc playback, in milliseconds.
    pub default_duration_ms: i64,
    /// Inter-stimulus interval for ad-hoc playback, in milliseconds.
    pub default_isi_ms: i64,
    /// Begin a loaded sequence immediately instead of waiting for an
    /// explicit start command.
    pub auto_start: bool,
    /// Cycle through the permutation indefinitely instead of completing.
    pub loop_playback: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: 2000,
            default_isi_ms: 1000,
            auto_start: true,
            loop_playback: false,
        }
    }
}
