//! Frame timing

use std::time::{Duration, Instant};

/// Measures the wall-clock time between consecutive frames
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seconds since the previous tick. The first tick returns zero.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Same as [`tick`](Self::tick) with an explicit timestamp.
    ///
    /// A timestamp earlier than the previous one yields zero.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let elapsed = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO);
        self.last = Some(now);
        elapsed.as_secs_f32()
    }

    /// Forget the previous tick, e.g. after the window regains focus
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick_at(Instant::now()), 0.0);
    }

    #[test]
    fn test_tick_measures_interval() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);
        let dt = clock.tick_at(start + Duration::from_millis(250));
        assert!((dt - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_backwards_timestamp_is_zero() {
        let mut clock = FrameClock::new();
        let start = Instant::now() + Duration::from_secs(1);
        clock.tick_at(start);
        assert_eq!(clock.tick_at(start - Duration::from_millis(10)), 0.0);
    }

    #[test]
    fn test_reset() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        clock.tick_at(start);
        clock.reset();
        assert_eq!(clock.tick_at(start + Duration::from_secs(3)), 0.0);
    }
}
