use crate::config::DelayRange;
use rand::Rng;
use std::time::Duration;

/// Randomized pause taken before every page load, click and poem visit
#[derive(Debug, Clone, Copy)]
pub struct Throttle {
    range: DelayRange,
}

impl Throttle {
    pub fn new(range: DelayRange) -> Self {
        Self { range }
    }

    /// A throttle that never waits
    pub fn disabled() -> Self {
        Self::new(DelayRange::none())
    }

    /// Draw a pause uniformly from the configured range
    pub fn next_delay(&self) -> Duration {
        let (min, max) = (self.range.min(), self.range.max());
        if max <= min {
            return min;
        }
        rand::rng().random_range(min..=max)
    }

    /// Suspend the caller for a random pause
    pub async fn delay(&self) {
        let pause = self.next_delay();
        if pause.is_zero() {
            return;
        }
        ::log::trace!("Throttling for {:.2}s", pause.as_secs_f64());
        tokio::time::sleep(pause).await;
    }
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(DelayRange::default())
    }
}
