//! Dashboard counters.
//!
//! [`StatsReporter`] fetches the aggregate [`Stats`] and counts both figures
//! up from zero on a [`CounterDisplay`]. The animation is a plain iterator,
//! [`CounterAnimation`], so the sequence of shown values can be checked
//! without a clock.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::repository::{Stats, StatsSource};

/// Delay between animation frames.
pub const TICK: Duration = Duration::from_millis(20);

/// Number of frames a counter takes to reach its target.
pub const STEPS: u64 = 50;

/// Values a counter shows while counting up to `target`.
///
/// Each frame adds `ceil(target / 50)`; the last frame is clamped to the
/// target. A zero target yields a single `0`.
#[derive(Debug, Clone)]
pub struct CounterAnimation {
    target: u64,
    step: u64,
    current: u64,
    finished: bool,
}

impl CounterAnimation {
    /// Start an animation from zero towards `target`.
    #[must_use]
    pub fn new(target: u64) -> Self {
        Self {
            target,
            step: target.div_ceil(STEPS),
            current: 0,
            finished: false,
        }
    }

    /// Amount added per frame.
    #[must_use]
    pub fn step(&self) -> u64 {
        self.step
    }
}

impl Iterator for CounterAnimation {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.finished {
            return None;
        }
        self.current = self.current.saturating_add(self.step);
        if self.current >= self.target {
            self.current = self.target;
            self.finished = true;
        }
        Some(self.current)
    }
}

/// The two dashboard counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Counter {
    /// Registered donors.
    RegisteredDonors,
    /// Lives saved.
    LivesSaved,
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RegisteredDonors => write!(f, "Registered donors"),
            Self::LivesSaved => write!(f, "Lives saved"),
        }
    }
}

/// Somewhere to draw counter values.
pub trait CounterDisplay {
    /// Show `value` on `counter`.
    fn show(&mut self, counter: Counter, value: u64);
}

/// Fetches stats and animates them.
pub struct StatsReporter {
    source: Arc<dyn StatsSource>,
    tick: Duration,
}

impl fmt::Debug for StatsReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsReporter")
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl StatsReporter {
    /// Create a reporter reading from `source`.
    #[must_use]
    pub fn new(source: Arc<dyn StatsSource>) -> Self {
        Self { source, tick: TICK }
    }

    /// Override the frame delay.
    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Fetch the counters and animate both on `display`.
    ///
    /// A failed fetch is logged and leaves the display untouched; it is never
    /// reported to the caller as an error.
    pub async fn refresh(&self, display: &mut dyn CounterDisplay) -> Option<Stats> {
        let stats = match self.source.fetch_stats().await {
            Ok(stats) => stats,
            Err(err) => {
                warn!("Failed to fetch stats: {}", err);
                return None;
            }
        };
        debug!(
            "Animating stats: {} donors, {} lives",
            stats.registered_donors, stats.lives_saved
        );

        let mut donors = CounterAnimation::new(stats.registered_donors);
        let mut lives = CounterAnimation::new(stats.lives_saved);
        loop {
            tokio::time::sleep(self.tick).await;
            let (d, l) = (donors.next(), lives.next());
            if d.is_none() && l.is_none() {
                break;
            }
            if let Some(value) = d {
                display.show(Counter::RegisteredDonors, value);
            }
            if let Some(value) = l {
                display.show(Counter::LivesSaved, value);
            }
        }
        Some(stats)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::{Error, Result};
    use crate::logging::init_test_logging;

    struct FixedStats(Option<Stats>);

    #[async_trait]
    impl StatsSource for FixedStats {
        async fn fetch_stats(&self) -> Result<Stats> {
            self.0
                .ok_or_else(|| Error::server("fetch stats", "connection refused"))
        }
    }

    #[derive(Default)]
    struct Recorded(Vec<(Counter, u64)>);

    impl CounterDisplay for Recorded {
        fn show(&mut self, counter: Counter, value: u64) {
            self.0.push((counter, value));
        }
    }

    impl Recorded {
        fn values(&self, counter: Counter) -> Vec<u64> {
            self.0
                .iter()
                .filter(|(c, _)| *c == counter)
                .map(|(_, v)| *v)
                .collect()
        }
    }

    fn reporter(stats: Option<Stats>) -> StatsReporter {
        StatsReporter::new(Arc::new(FixedStats(stats))).with_tick(Duration::ZERO)
    }

    #[test]
    fn test_animation_reaches_target_in_fifty_steps() {
        let values: Vec<u64> = CounterAnimation::new(1200).collect();
        assert_eq!(values.len(), 50);
        assert_eq!(values[0], 24);
        assert_eq!(values.last(), Some(&1200));
    }

    #[test]
    fn test_animation_clamps_last_frame() {
        let anim = CounterAnimation::new(120);
        assert_eq!(anim.step(), 3);
        let values: Vec<u64> = anim.collect();
        assert_eq!(values.len(), 40);
        assert_eq!(values.last(), Some(&120));

        let values: Vec<u64> = CounterAnimation::new(101).collect();
        assert_eq!(values.len(), 34);
        assert_eq!(values[32], 99);
        assert_eq!(values[33], 101);
    }

    #[test]
    fn test_animation_small_target() {
        let values: Vec<u64> = CounterAnimation::new(3).collect();
        assert_eq!(values, [1, 2, 3]);
    }

    #[test]
    fn test_animation_zero_target() {
        let values: Vec<u64> = CounterAnimation::new(0).collect();
        assert_eq!(values, [0]);
    }

    #[test]
    fn test_animation_is_monotonic() {
        let values: Vec<u64> = CounterAnimation::new(9_999).collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_refresh_animates_both_counters() {
        let stats = Stats {
            registered_donors: 1200,
            lives_saved: 3600,
        };
        let mut display = Recorded::default();

        let fetched = reporter(Some(stats)).refresh(&mut display).await;

        assert_eq!(fetched, Some(stats));
        let donors = display.values(Counter::RegisteredDonors);
        let lives = display.values(Counter::LivesSaved);
        assert_eq!(donors.len(), 50);
        assert_eq!(lives.len(), 50);
        assert_eq!(donors.last(), Some(&1200));
        assert_eq!(lives.last(), Some(&3600));
    }

    #[tokio::test]
    async fn test_refresh_failure_leaves_display_untouched() {
        init_test_logging();
        let mut display = Recorded::default();

        let fetched = reporter(None).refresh(&mut display).await;

        assert_eq!(fetched, None);
        assert!(display.0.is_empty());
    }

    #[test]
    fn test_counter_labels() {
        assert_eq!(Counter::RegisteredDonors.to_string(), "Registered donors");
        assert_eq!(Counter::LivesSaved.to_string(), "Lives saved");
    }
}
