use std::time::{Duration, Instant};

/// Real-time frame clock.
///
/// Presentation timing must keep running even when a host pauses or scales
/// its simulation time, so deltas come from a monotonic [`Instant`] rather
/// than from anything the caller could rescale. The clock also keeps a
/// sliding window of frame times for pacing diagnostics.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_times: Vec<Duration>,
    max_samples: usize,
}

/// Frame pacing statistics over the clock's sample window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    pub average_frame_secs: f64,
    pub jitter_secs: f64,
    pub min_frame_secs: f64,
    pub max_frame_secs: f64,
    pub effective_fps: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            frame_times: Vec::with_capacity(240),
            max_samples: 240,
        }
    }

    /// Seconds elapsed since the previous call; records the sample.
    pub fn delta_secs(&mut self) -> f64 {
        let now = Instant::now();
        let delta = now.duration_since(self.last);
        self.last = now;
        self.record(delta);
        delta.as_secs_f64()
    }

    fn record(&mut self, d: Duration) {
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.remove(0);
        }
        self.frame_times.push(d);
    }

    pub fn frame_count(&self) -> usize {
        self.frame_times.len()
    }

    /// Sleep precisely until roughly `target` has passed since the last
    /// delta, for hosts without vsync-driven redraws.
    pub fn pace(&self, target: Duration) {
        let elapsed = self.last.elapsed();
        if let Some(remaining) = target.checked_sub(elapsed) {
            spin_sleep::sleep(remaining);
        }
    }

    pub fn stats(&self) -> FrameStats {
        let times: Vec<f64> = self.frame_times.iter().map(|d| d.as_secs_f64()).collect();
        if times.is_empty() {
            return FrameStats {
                average_frame_secs: 0.0,
                jitter_secs: 0.0,
                min_frame_secs: 0.0,
                max_frame_secs: 0.0,
                effective_fps: 0.0,
            };
        }
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|t| (t - avg).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = times.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        FrameStats {
            average_frame_secs: avg,
            jitter_secs: var.sqrt(),
            min_frame_secs: min,
            max_frame_secs: max,
            effective_fps: if avg > 0.0 { 1.0 / avg } else { 0.0 },
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_are_zero() {
        let clock = FrameClock::new();
        let stats = clock.stats();
        assert_eq!(stats.average_frame_secs, 0.0);
        assert_eq!(stats.effective_fps, 0.0);
    }

    #[test]
    fn delta_is_monotonic_and_recorded() {
        let mut clock = FrameClock::new();
        let d1 = clock.delta_secs();
        let d2 = clock.delta_secs();
        assert!(d1 >= 0.0);
        assert!(d2 >= 0.0);
        assert_eq!(clock.frame_count(), 2);
    }

    #[test]
    fn sample_window_is_bounded() {
        let mut clock = FrameClock::new();
        for _ in 0..500 {
            clock.delta_secs();
        }
        assert_eq!(clock.frame_count(), 240);
    }
}
