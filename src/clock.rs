use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic milliseconds since some fixed origin.
pub trait ClockSource {
    fn now_ms(&self) -> u64;
}

#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock for tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl ClockSource for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Sleeps away whatever is left of each frame at a fixed rate.
#[derive(Debug)]
pub struct FramePacer {
    frame: Duration,
    start: Instant,
}

impl FramePacer {
    pub fn new(tick_rate: u32) -> Self {
        Self {
            frame: Duration::from_secs(1) / tick_rate.max(1),
            start: Instant::now(),
        }
    }

    pub fn frame_duration(&self) -> Duration {
        self.frame
    }

    pub fn begin(&mut self) {
        self.start = Instant::now();
    }

    /// Time still owed to the current frame.
    pub fn remaining(&self) -> Duration {
        self.frame.saturating_sub(self.start.elapsed())
    }

    pub fn wait(&self) {
        let left = self.remaining();
        if !left.is_zero() {
            std::thread::sleep(left);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.now_ms(), 100);
        clock.advance(16);
        assert_eq!(clock.now_ms(), 116);
        clock.set(5000);
        assert_eq!(clock.now_ms(), 5000);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }

    #[test]
    fn pacer_frame_matches_tick_rate() {
        let pacer = FramePacer::new(60);
        assert_eq!(pacer.frame_duration(), Duration::from_secs(1) / 60);
        assert!(pacer.remaining() <= pacer.frame_duration());
    }
}
