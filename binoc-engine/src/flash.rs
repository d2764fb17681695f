use binoc_compositor::StereoOverlay;
use binoc_timing::IntervalTimer;

/// Rivalry-alternation flashing: a repeating timer that toggles visibility
/// of whatever pair is currently bound. Orthogonal to the play cursor — it
/// never changes which images are in the slots, only whether the pair is
/// shown or hidden as a whole.
#[derive(Debug, Clone)]
pub struct FlashState {
    enabled: bool,
    frequency_hz: f32,
    timer: IntervalTimer,
    visible: bool,
}

impl FlashState {
    pub fn new() -> Self {
        Self {
            enabled: true,
            frequency_hz: 0.0,
            timer: IntervalTimer::disarmed(),
            visible: true,
        }
    }

    pub fn frequency_hz(&self) -> f32 {
        self.frequency_hz
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The one clamp for the flash frequency lives here, at the mutation
    /// site; every adjustment path funnels through this setter. Dropping to
    /// zero mid-cycle forces the pair visible again so a run can never be
    /// left on a dark half-cycle.
    pub fn set_frequency(&mut self, overlay: &mut StereoOverlay, hz: f32) {
        self.frequency_hz = hz.max(0.0);
        if self.frequency_hz > 0.0 {
            self.timer.arm(1.0 / self.frequency_hz as f64);
        } else {
            self.timer = IntervalTimer::disarmed();
            self.visible = true;
            overlay.set_enabled(true);
        }
    }

    pub fn set_enabled(&mut self, overlay: &mut StereoOverlay, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.visible = true;
            overlay.set_enabled(true);
        }
    }

    /// Restore the visible half-cycle, as happens at every run start.
    pub fn reset(&mut self, overlay: &mut StereoOverlay) {
        self.visible = true;
        self.timer.reset();
        overlay.set_enabled(true);
    }

    pub fn update(&mut self, delta_secs: f64, overlay: &mut StereoOverlay) {
        if !self.enabled || self.frequency_hz <= 0.0 {
            return;
        }
        if self.timer.tick(delta_secs) {
            self.visible = !self.visible;
            overlay.set_enabled(self.visible);
        }
    }
}

impl Default for FlashState {
    fn default() -> Self {
        Self::new()
    }
}
