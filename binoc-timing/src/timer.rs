/// Cooperative elapsed-time timer driven by per-frame deltas.
///
/// One abstraction covers every counter in the system: the engine's phase
/// durations (one-shot, re-armed per phase), the flash sub-timer
/// (repeating), and input debounce (one-shot cooldown). Firing resets the
/// accumulator to zero; the remainder of an oversized delta is not carried
/// into the next interval.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalTimer {
    interval_secs: f64,
    elapsed_secs: f64,
    repeating: bool,
    armed: bool,
}

impl IntervalTimer {
    pub fn one_shot(interval_secs: f64) -> Self {
        Self {
            interval_secs: interval_secs.max(0.0),
            elapsed_secs: 0.0,
            repeating: false,
            armed: true,
        }
    }

    pub fn repeating(interval_secs: f64) -> Self {
        Self {
            repeating: true,
            ..Self::one_shot(interval_secs)
        }
    }

    /// A timer that never fires until armed.
    pub fn disarmed() -> Self {
        Self {
            interval_secs: 0.0,
            elapsed_secs: 0.0,
            repeating: false,
            armed: false,
        }
    }

    /// Re-arm with a new interval, restarting the accumulator.
    pub fn arm(&mut self, interval_secs: f64) {
        self.interval_secs = interval_secs.max(0.0);
        self.elapsed_secs = 0.0;
        self.armed = true;
    }

    /// Advance by `delta_secs` and report whether the interval elapsed.
    /// Negative deltas (a clock hiccup) are ignored.
    pub fn tick(&mut self, delta_secs: f64) -> bool {
        if !self.armed {
            return false;
        }
        self.elapsed_secs += delta_secs.max(0.0);
        if self.elapsed_secs >= self.interval_secs {
            self.elapsed_secs = 0.0;
            if !self.repeating {
                self.armed = false;
            }
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.elapsed_secs = 0.0;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn interval_secs(&self) -> f64 {
        self.interval_secs
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }
}
