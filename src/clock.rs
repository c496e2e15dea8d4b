use std::time::{Duration, Instant};

/// Animation clock anchored at a single start instant.
///
/// The start is captured once and never reset, so elapsed time is
/// monotonically non-decreasing for the life of the run.
#[derive(Clone, Copy, Debug)]
pub struct AnimationClock {
    start: Instant,
}

impl AnimationClock {
    /// Start a clock at the current instant.
    pub fn start() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self { start }
    }

    pub fn start_time(&self) -> Instant {
        self.start
    }

    /// Time since start. An instant earlier than the start yields zero.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.start)
    }

    /// Time since start in seconds.
    pub fn elapsed_secs(&self, now: Instant) -> f64 {
        self.elapsed(now).as_secs_f64()
    }
}
