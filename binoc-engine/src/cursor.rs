use binoc_timing::IntervalTimer;
use rand::Rng;
use rand::seq::SliceRandom;

/// What the currently armed phase timer is counting down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationPhase {
    ShowingStimulus,
    ShowingIsi,
}

/// Play position within a run: a permutation of sequence indices, the slot
/// under presentation, and the one-shot timer for the active phase.
#[derive(Debug, Clone)]
pub struct PlayCursor {
    order: Vec<usize>,
    position: usize,
    phase: PresentationPhase,
    timer: IntervalTimer,
}

impl PlayCursor {
    /// Identity order, or a Fisher–Yates shuffle when the set asks for it.
    pub fn new<R: Rng>(len: usize, randomize: bool, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        if randomize {
            order.shuffle(rng);
        }
        Self {
            order,
            position: 0,
            phase: PresentationPhase::ShowingStimulus,
            timer: IntervalTimer::disarmed(),
        }
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn phase(&self) -> PresentationPhase {
        self.phase
    }

    /// Sequence index under the cursor, `None` once the run walked off the
    /// end.
    pub fn current(&self) -> Option<usize> {
        self.order.get(self.position).copied()
    }

    pub fn begin_stimulus(&mut self, duration_secs: f64) {
        self.phase = PresentationPhase::ShowingStimulus;
        self.timer.arm(duration_secs);
    }

    pub fn begin_isi(&mut self, isi_secs: f64) {
        self.phase = PresentationPhase::ShowingIsi;
        self.timer.arm(isi_secs);
    }

    /// Move to the next slot. Returns `false` when the permutation is
    /// exhausted; in wrap mode the cursor cycles back to the front instead.
    pub fn step(&mut self, wrap: bool) -> bool {
        self.position += 1;
        if self.position >= self.order.len() {
            if wrap && !self.order.is_empty() {
                self.position = 0;
                true
            } else {
                false
            }
        } else {
            true
        }
    }

    pub fn tick(&mut self, delta_secs: f64) -> bool {
        self.timer.tick(delta_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn identity_order_when_not_randomized() {
        let mut rng = StdRng::seed_from_u64(1);
        let cursor = PlayCursor::new(5, false, &mut rng);
        assert_eq!(cursor.order(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn shuffled_order_is_a_bijection() {
        let mut rng = StdRng::seed_from_u64(0xBEEF);
        let cursor = PlayCursor::new(16, true, &mut rng);
        let mut sorted = cursor.order().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..16).collect::<Vec<_>>());
    }

    #[test]
    fn step_exhausts_or_wraps() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut cursor = PlayCursor::new(2, false, &mut rng);
        assert!(cursor.step(false));
        assert!(!cursor.step(false));
        assert_eq!(cursor.current(), None);

        let mut looped = PlayCursor::new(2, false, &mut rng);
        assert!(looped.step(true));
        assert!(looped.step(true));
        assert_eq!(looped.current(), Some(0));
    }
}
