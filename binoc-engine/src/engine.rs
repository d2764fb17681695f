use crate::browse::BrowseState;
use crate::config::EngineConfig;
use crate::cursor::{PlayCursor, PresentationPhase};
use crate::error::EngineError;
use crate::flash::FlashState;
use binoc_cache::{AssetStore, ImageResolver};
use binoc_compositor::StereoOverlay;
use binoc_core::{ImageReference, StimulusItem, StimulusSequence};
use log::{info, warn};
use rand::Rng;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No active run; whatever was bound last stays on the overlay.
    Idle,
    /// Manual-cursor mode: the cursor moves only on explicit command.
    Browsing,
    /// Autoplay through the permutation.
    Running,
}

/// Notifications produced by a tick, for shells that want to log or react.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The current item's presentation ended and its black gap began.
    IsiStarted { position: usize },
    /// The cursor moved on and the next pair is bound.
    Advanced { position: usize },
    /// The permutation is exhausted; the engine returned to idle.
    RunComplete,
}

/// The presentation engine: one state machine covering timed autoplay and
/// manual browsing, ticked once per rendered frame with a real-time delta.
pub struct PresentationEngine<A, R> {
    state: EngineState,
    config: EngineConfig,
    resolver: ImageResolver<A>,
    rng: R,
    overlay: StereoOverlay,
    flash: FlashState,
    sequence: Option<StimulusSequence>,
    pending: Option<StimulusSequence>,
    cursor: Option<PlayCursor>,
    browse: BrowseState,
}

impl<A: AssetStore, R: Rng> PresentationEngine<A, R> {
    pub fn new(config: EngineConfig, assets: A, rng: R) -> Self {
        Self {
            state: EngineState::Idle,
            config,
            resolver: ImageResolver::new(assets),
            rng,
            overlay: StereoOverlay::new(),
            flash: FlashState::new(),
            sequence: None,
            pending: None,
            cursor: None,
            browse: BrowseState::default(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn overlay(&self) -> &StereoOverlay {
        &self.overlay
    }

    /// Mutable access for the display shell (refresh-signal consumption).
    pub fn overlay_mut(&mut self) -> &mut StereoOverlay {
        &mut self.overlay
    }

    pub fn flash(&self) -> &FlashState {
        &self.flash
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn browse(&self) -> &BrowseState {
        &self.browse
    }

    pub fn cursor(&self) -> Option<&PlayCursor> {
        self.cursor.as_ref()
    }

    /// Hand the engine a sequence. Depending on configuration the run
    /// begins immediately or waits for [`start_pending`].
    ///
    /// [`start_pending`]: PresentationEngine::start_pending
    pub fn load(&mut self, sequence: StimulusSequence) -> Result<(), EngineError> {
        if sequence.is_empty() {
            return Err(EngineError::InvalidSequence);
        }
        self.pending = Some(sequence);
        if self.config.auto_start {
            self.start_pending()
        } else {
            Ok(())
        }
    }

    /// Start the pending sequence, or replay the last one.
    pub fn start_pending(&mut self) -> Result<(), EngineError> {
        let sequence = self
            .pending
            .take()
            .or_else(|| self.sequence.clone())
            .ok_or(EngineError::InvalidSequence)?;
        self.start(sequence)
    }

    /// Begin a run: build the permutation, bind the first pair, go live.
    pub fn start(&mut self, sequence: StimulusSequence) -> Result<(), EngineError> {
        if sequence.is_empty() {
            return Err(EngineError::InvalidSequence);
        }
        info!(
            "run started: {} items{}",
            sequence.len(),
            if sequence.randomize { ", shuffled" } else { "" }
        );
        self.cursor = Some(PlayCursor::new(
            sequence.len(),
            sequence.randomize,
            &mut self.rng,
        ));
        self.sequence = Some(sequence);
        self.flash.reset(&mut self.overlay);
        self.state = EngineState::Running;
        self.present_current();
        Ok(())
    }

    /// Advance presentation timing by one frame's real-time delta. Phase
    /// handling runs first, then the flash sub-timer on the same delta; the
    /// two never share an accumulator.
    pub fn tick(&mut self, delta_secs: f64) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        if self.state == EngineState::Running {
            let fired = self
                .cursor
                .as_mut()
                .and_then(|cursor| cursor.tick(delta_secs).then(|| cursor.phase()));
            match fired {
                Some(PresentationPhase::ShowingStimulus) => {
                    let isi_secs = self
                        .current_item()
                        .map(|(seq, item)| seq.effective_isi_secs(item))
                        .unwrap_or(0.0);
                    if isi_secs > 0.0 {
                        self.enter_isi(isi_secs, &mut events);
                    } else {
                        self.advance(&mut events);
                    }
                }
                Some(PresentationPhase::ShowingIsi) => self.advance(&mut events),
                None => {}
            }
        }
        self.flash.update(delta_secs, &mut self.overlay);
        events
    }

    /// Return to idle. Bound slots are left untouched; the next tick is a
    /// no-op.
    pub fn stop(&mut self) {
        if self.state == EngineState::Running {
            info!("run stopped");
        }
        self.state = EngineState::Idle;
        self.cursor = None;
    }

    fn current_item(&self) -> Option<(&StimulusSequence, &StimulusItem)> {
        let seq = self.sequence.as_ref()?;
        let idx = self.cursor.as_ref()?.current()?;
        seq.items().get(idx).map(|item| (seq, item))
    }

    fn enter_isi(&mut self, isi_secs: f64, events: &mut Vec<EngineEvent>) {
        let black = self.resolver.black();
        self.overlay.bind(black.clone(), black);
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.begin_isi(isi_secs);
            events.push(EngineEvent::IsiStarted {
                position: cursor.position(),
            });
        }
    }

    fn advance(&mut self, events: &mut Vec<EngineEvent>) {
        let wrap = self.config.loop_playback;
        let stepped = self.cursor.as_mut().is_some_and(|c| c.step(wrap));
        if stepped {
            self.present_current();
            if let Some(cursor) = self.cursor.as_ref() {
                events.push(EngineEvent::Advanced {
                    position: cursor.position(),
                });
            }
        } else {
            // run complete; the last-bound pair stays on screen
            info!("sequence complete");
            self.state = EngineState::Idle;
            self.cursor = None;
            events.push(EngineEvent::RunComplete);
        }
    }

    /// Resolve and bind the pair under the cursor, then arm its duration.
    fn present_current(&mut self) {
        let Some(seq) = self.sequence.as_ref() else {
            return;
        };
        let Some(idx) = self.cursor.as_ref().and_then(PlayCursor::current) else {
            return;
        };
        let Some(item) = seq.items().get(idx) else {
            return;
        };
        let duration_secs = seq.effective_duration_secs(item);
        let left = self.resolver.resolve(&item.left);
        let right = self.resolver.resolve(&item.right);
        self.overlay.bind(left, right);
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.begin_stimulus(duration_secs);
        }
    }

    /// Resolve every image in `sequence` ahead of a run so playback ticks
    /// never pay for a decode.
    pub fn prewarm(&mut self, sequence: &StimulusSequence) {
        self.resolver.prewarm(sequence);
    }

    // ---- flash parameters -------------------------------------------------

    pub fn set_flash_frequency(&mut self, hz: f32) {
        self.flash.set_frequency(&mut self.overlay, hz);
    }

    pub fn adjust_flash_frequency(&mut self, step_hz: f32) {
        let hz = self.flash.frequency_hz() + step_hz;
        self.flash.set_frequency(&mut self.overlay, hz);
        info!("flash frequency: {} Hz", self.flash.frequency_hz());
    }

    pub fn set_flash_enabled(&mut self, enabled: bool) {
        self.flash.set_enabled(&mut self.overlay, enabled);
    }

    /// Menu-style adjustment of the ad-hoc presentation duration, floored
    /// at 100 ms.
    pub fn adjust_default_duration(&mut self, step_ms: i64) {
        self.config.default_duration_ms = (self.config.default_duration_ms + step_ms).max(100);
        info!("default duration: {} ms", self.config.default_duration_ms);
    }

    // ---- manual-cursor mode ----------------------------------------------

    /// Switch to manual-cursor mode over a scanned file list. The overlay
    /// starts black; images appear as eyes are assigned.
    pub fn enter_browse(&mut self, files: Vec<PathBuf>) {
        self.state = EngineState::Browsing;
        self.cursor = None;
        self.browse.set_files(files);
        let black = self.resolver.black();
        self.overlay.bind(black.clone(), black);
        info!("browsing {} files", self.browse.file_count());
        self.log_hint();
    }

    /// Fresh scan result: new file list, cached decodes dropped so edits on
    /// disk become visible.
    pub fn rescan(&mut self, files: Vec<PathBuf>) {
        self.resolver.clear_cache();
        self.browse.set_files(files);
        info!("rescan: {} files", self.browse.file_count());
        self.log_hint();
    }

    pub fn move_cursor(&mut self, delta: i64) {
        if self.browse.move_cursor(delta).is_none() {
            info!("(no files)");
            return;
        }
        self.log_hint();
    }

    pub fn assign_left(&mut self, path: Option<PathBuf>) {
        info!("left <= {}", describe(path.as_deref()));
        self.browse.set_left(path);
        self.rebind_selection();
    }

    pub fn assign_right(&mut self, path: Option<PathBuf>) {
        info!("right <= {}", describe(path.as_deref()));
        self.browse.set_right(path);
        self.rebind_selection();
    }

    /// Assign the file under the cursor to the left eye.
    pub fn assign_current_to_left(&mut self) {
        self.assign_left(self.browse.current().map(Path::to_path_buf));
    }

    /// Assign the file under the cursor to the right eye.
    pub fn assign_current_to_right(&mut self) {
        self.assign_right(self.browse.current().map(Path::to_path_buf));
    }

    /// Save the current L/R selection as one ad-hoc sequence item.
    pub fn add_current_pair(&mut self) {
        let count = self.browse.save_pair();
        info!(
            "saved pair #{count}: L={} | R={}",
            describe(self.browse.left()),
            describe(self.browse.right())
        );
    }

    /// Play the saved pairs through the regular start/tick machinery, one
    /// item per pair, using the engine's own default timings.
    pub fn play_saved_pairs(&mut self) -> Result<(), EngineError> {
        if self.browse.saved().is_empty() {
            warn!("no saved pairs; assign eyes and add the pair first");
            return Err(EngineError::InvalidSequence);
        }
        let items: Vec<StimulusItem> = self
            .browse
            .saved()
            .iter()
            .map(|(l, r)| {
                StimulusItem::new(
                    ImageReference::from_path(l.as_deref()),
                    ImageReference::from_path(r.as_deref()),
                )
            })
            .collect();
        let sequence = StimulusSequence::new(
            items,
            self.config.default_duration_ms,
            self.config.default_isi_ms,
        );
        info!(
            "playing saved sequence ({} pairs) dur={}ms isi={}ms",
            sequence.len(),
            self.config.default_duration_ms,
            self.config.default_isi_ms
        );
        self.start(sequence)
    }

    fn rebind_selection(&mut self) {
        let left_ref = ImageReference::from_path(self.browse.left());
        let right_ref = ImageReference::from_path(self.browse.right());
        let left = self.resolver.resolve(&left_ref);
        let right = self.resolver.resolve(&right_ref);
        self.overlay.bind(left, right);
    }

    fn log_hint(&self) {
        match self.browse.current() {
            Some(path) => info!(
                "[{}/{}] {}",
                self.browse.index() + 1,
                self.browse.file_count(),
                path.display()
            ),
            None => info!("(empty folder)"),
        }
    }
}

fn describe(path: Option<&Path>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "[BLACK]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use binoc_cache::MemoryAssets;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io::Cursor;

    fn encode_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([90, 90, 200, 255]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("encode png");
        bytes
    }

    fn test_assets() -> MemoryAssets {
        let mut assets = MemoryAssets::new();
        assets.insert("a-left", encode_png(2, 2));
        assets.insert("a-right", encode_png(2, 2));
        assets.insert("b-left", encode_png(3, 3));
        assets.insert("b-right", encode_png(3, 3));
        assets
    }

    fn engine_with(config: EngineConfig) -> PresentationEngine<MemoryAssets, StdRng> {
        PresentationEngine::new(config, test_assets(), StdRng::seed_from_u64(7))
    }

    fn engine() -> PresentationEngine<MemoryAssets, StdRng> {
        engine_with(EngineConfig::default())
    }

    fn bundle_item(left: &str, right: &str) -> StimulusItem {
        StimulusItem::new(
            ImageReference::new(left, false),
            ImageReference::new(right, false),
        )
    }

    /// Two items, 2000 ms duration, 1000 ms ISI, presentation order.
    fn two_item_sequence() -> StimulusSequence {
        StimulusSequence::new(
            vec![
                bundle_item("a-left", "a-right"),
                bundle_item("b-left", "b-right"),
            ],
            2000,
            1000,
        )
    }

    fn overlay_is_black(engine: &PresentationEngine<MemoryAssets, StdRng>) -> bool {
        let overlay = engine.overlay();
        overlay.left().ptr_eq(overlay.right()) && overlay.left().width() == 1
    }

    #[test]
    fn start_rejects_an_empty_sequence() {
        let mut engine = engine();
        let empty = StimulusSequence::new(Vec::new(), 2000, 1000);
        assert_eq!(engine.start(empty), Err(EngineError::InvalidSequence));
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn start_binds_the_first_pair() {
        let mut engine = engine();
        engine.start(two_item_sequence()).expect("start");

        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(engine.overlay().left().width(), 2);
        assert!(!overlay_is_black(&engine));
        let cursor = engine.cursor().expect("cursor");
        assert_eq!(cursor.order(), &[0, 1]);
        assert_eq!(cursor.phase(), PresentationPhase::ShowingStimulus);
    }

    #[test]
    fn shuffled_start_builds_a_bijective_permutation() {
        let mut engine = engine();
        let items = (0..12)
            .map(|_| bundle_item("a-left", "a-right"))
            .collect::<Vec<_>>();
        let seq = StimulusSequence::new(items, 500, 0).with_randomize(true);
        engine.start(seq).expect("start");

        let mut order = engine.cursor().expect("cursor").order().to_vec();
        order.sort_unstable();
        assert_eq!(order, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn tick_walks_stimulus_isi_advance_and_completion() {
        let mut engine = engine();
        engine.start(two_item_sequence()).expect("start");

        // 2.0 s of stimulus ends; the 1.0 s black gap begins
        let events = engine.tick(2.0);
        assert_eq!(events, vec![EngineEvent::IsiStarted { position: 0 }]);
        assert_eq!(
            engine.cursor().expect("cursor").phase(),
            PresentationPhase::ShowingIsi
        );
        assert!(overlay_is_black(&engine));

        // gap ends; item 2 is bound
        let events = engine.tick(1.0);
        assert_eq!(events, vec![EngineEvent::Advanced { position: 1 }]);
        assert_eq!(
            engine.cursor().expect("cursor").phase(),
            PresentationPhase::ShowingStimulus
        );
        assert_eq!(engine.overlay().left().width(), 3);

        // item 2 plays out through its own gap, then the run completes
        let events = engine.tick(2.0);
        assert_eq!(events, vec![EngineEvent::IsiStarted { position: 1 }]);
        let events = engine.tick(1.0);
        assert_eq!(events, vec![EngineEvent::RunComplete]);
        assert_eq!(engine.state(), EngineState::Idle);

        // idle ticks are no-ops
        assert!(engine.tick(5.0).is_empty());
    }

    #[test]
    fn zero_isi_advances_directly() {
        let mut engine = engine();
        let seq = StimulusSequence::new(
            vec![
                bundle_item("a-left", "a-right"),
                bundle_item("b-left", "b-right"),
            ],
            2000,
            0,
        );
        engine.start(seq).expect("start");

        let events = engine.tick(2.0);
        assert_eq!(events, vec![EngineEvent::Advanced { position: 1 }]);
        assert!(!overlay_is_black(&engine));
    }

    #[test]
    fn completion_leaves_the_last_pair_bound() {
        let mut engine = engine();
        let seq = StimulusSequence::new(vec![bundle_item("a-left", "a-right")], 2000, 0);
        engine.start(seq).expect("start");

        let events = engine.tick(2.0);
        assert_eq!(events, vec![EngineEvent::RunComplete]);
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.overlay().left().width(), 2);
    }

    #[test]
    fn per_item_override_beats_the_default() {
        let mut engine = engine();
        let seq = StimulusSequence::new(
            vec![
                bundle_item("a-left", "a-right").with_timing(500, 0),
                bundle_item("b-left", "b-right"),
            ],
            2000,
            0,
        );
        engine.start(seq).expect("start");

        assert!(engine.tick(0.4).is_empty());
        let events = engine.tick(0.1);
        assert_eq!(events, vec![EngineEvent::Advanced { position: 1 }]);
    }

    #[test]
    fn stop_while_running_makes_tick_a_noop() {
        let mut engine = engine();
        engine.start(two_item_sequence()).expect("start");
        engine.stop();

        assert_eq!(engine.state(), EngineState::Idle);
        assert!(engine.tick(10.0).is_empty());
        // the bound pair is untouched
        assert_eq!(engine.overlay().left().width(), 2);
    }

    #[test]
    fn loop_playback_wraps_instead_of_completing() {
        let mut engine = engine_with(EngineConfig {
            loop_playback: true,
            ..EngineConfig::default()
        });
        let seq = StimulusSequence::new(
            vec![
                bundle_item("a-left", "a-right"),
                bundle_item("b-left", "b-right"),
            ],
            2000,
            0,
        );
        engine.start(seq).expect("start");

        assert_eq!(
            engine.tick(2.0),
            vec![EngineEvent::Advanced { position: 1 }]
        );
        assert_eq!(
            engine.tick(2.0),
            vec![EngineEvent::Advanced { position: 0 }]
        );
        assert_eq!(engine.state(), EngineState::Running);
    }

    #[test]
    fn load_honours_auto_start() {
        let mut auto = engine();
        auto.load(two_item_sequence()).expect("load");
        assert_eq!(auto.state(), EngineState::Running);

        let mut gated = engine_with(EngineConfig {
            auto_start: false,
            ..EngineConfig::default()
        });
        gated.load(two_item_sequence()).expect("load");
        assert_eq!(gated.state(), EngineState::Idle);
        gated.start_pending().expect("start");
        assert_eq!(gated.state(), EngineState::Running);
    }

    #[test]
    fn start_pending_replays_the_finished_run() {
        let mut engine = engine();
        let seq = StimulusSequence::new(vec![bundle_item("a-left", "a-right")], 2000, 0);
        engine.start(seq).expect("start");
        engine.tick(2.0);
        assert_eq!(engine.state(), EngineState::Idle);

        engine.start_pending().expect("replay");
        assert_eq!(engine.state(), EngineState::Running);
    }

    #[test]
    fn move_cursor_clamps_into_the_file_list() {
        let mut engine = engine();
        engine.enter_browse(vec![
            PathBuf::from("/stim/a.png"),
            PathBuf::from("/stim/b.png"),
            PathBuf::from("/stim/c.png"),
        ]);
        assert_eq!(engine.state(), EngineState::Browsing);

        engine.move_cursor(-100);
        assert_eq!(engine.browse().index(), 0);
        engine.move_cursor(100);
        assert_eq!(engine.browse().index(), 2);
    }

    #[test]
    fn play_saved_pairs_runs_with_engine_defaults() {
        let mut engine = engine();
        engine.enter_browse(Vec::new());

        assert_eq!(engine.play_saved_pairs(), Err(EngineError::InvalidSequence));

        // missing files degrade to black but still play
        engine.assign_left(Some(PathBuf::from("/nonexistent/l.png")));
        engine.assign_right(None);
        engine.add_current_pair();
        engine.add_current_pair();

        engine.play_saved_pairs().expect("play");
        assert_eq!(engine.state(), EngineState::Running);
        assert_eq!(engine.cursor().expect("cursor").order().len(), 2);

        // engine defaults: 2000 ms stimulus, 1000 ms gap
        assert_eq!(
            engine.tick(2.0),
            vec![EngineEvent::IsiStarted { position: 0 }]
        );
    }

    #[test]
    fn flash_adjustment_clamps_at_zero() {
        let mut engine = engine();
        engine.set_flash_frequency(2.0);
        engine.adjust_flash_frequency(-5.0);
        assert_eq!(engine.flash().frequency_hz(), 0.0);
        engine.adjust_flash_frequency(1.0);
        assert_eq!(engine.flash().frequency_hz(), 1.0);
    }

    #[test]
    fn flash_toggles_the_running_overlay() {
        let mut engine = engine();
        engine.start(two_item_sequence()).expect("start");
        engine.set_flash_frequency(2.0);

        for _ in 0..5 {
            engine.tick(0.1);
        }
        assert!(!engine.overlay().enabled());
        for _ in 0..5 {
            engine.tick(0.1);
        }
        assert!(engine.overlay().enabled());
    }

    #[test]
    fn adjust_default_duration_floors_at_100ms() {
        let mut engine = engine();
        engine.adjust_default_duration(-10_000);
        assert_eq!(engine.config().default_duration_ms, 100);
        engine.adjust_default_duration(400);
        assert_eq!(engine.config().default_duration_ms, 500);
    }
}
