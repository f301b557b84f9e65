//! Poll rate tiers.
//!
//! A [`PollRate`] names how long a worker rests between two polls. Every tier except
//! [`PollRate::Custom`] maps to a fixed delay; `Custom` defers to a caller function, see
//! [`PollerBuilder::custom_rate`](crate::PollerBuilder::custom_rate).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::PollerError;

/// Delay used by [`PollRate::Custom`] when no custom rate function is installed.
pub const DEFAULT_CUSTOM_RATE: Duration = Duration::from_millis(5000);

/// Named delay tiers applied between successive polls of one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PollRate {
    /// 10 seconds.
    Draggy,
    /// 3 seconds.
    VerySlow,
    /// 500 milliseconds.
    Laggy,
    /// 100 milliseconds.
    Slow,
    /// 80 milliseconds.
    #[default]
    Medium,
    /// 50 milliseconds.
    Quick,
    /// 30 milliseconds.
    High,
    /// 1 millisecond.
    UltraHigh,
    /// No delay. Workers only yield between polls.
    Unlimited,
    /// Delay supplied by the caller's custom rate function.
    Custom,
}

impl PollRate {
    pub const ALL: [PollRate; 10] = [
        PollRate::Draggy,
        PollRate::VerySlow,
        PollRate::Laggy,
        PollRate::Slow,
        PollRate::Medium,
        PollRate::Quick,
        PollRate::High,
        PollRate::UltraHigh,
        PollRate::Unlimited,
        PollRate::Custom,
    ];

    /// The fixed delay of this tier, or `None` for [`PollRate::Custom`].
    pub const fn fixed_delay(self) -> Option<Duration> {
        let millis = match self {
            PollRate::Draggy => 10_000,
            PollRate::VerySlow => 3_000,
            PollRate::Laggy => 500,
            PollRate::Slow => 100,
            PollRate::Medium => 80,
            PollRate::Quick => 50,
            PollRate::High => 30,
            PollRate::UltraHigh => 1,
            PollRate::Unlimited => 0,
            PollRate::Custom => return None,
        };
        Some(Duration::from_millis(millis))
    }

    pub const fn name(self) -> &'static str {
        match self {
            PollRate::Draggy => "draggy",
            PollRate::VerySlow => "very-slow",
            PollRate::Laggy => "laggy",
            PollRate::Slow => "slow",
            PollRate::Medium => "medium",
            PollRate::Quick => "quick",
            PollRate::High => "high",
            PollRate::UltraHigh => "ultra-high",
            PollRate::Unlimited => "unlimited",
            PollRate::Custom => "custom",
        }
    }
}

/// Resolves `rate` to a concrete delay, asking `custom` only for [`PollRate::Custom`].
pub fn rate_for<F>(rate: PollRate, custom: F) -> Duration
where
    F: FnOnce() -> Duration,
{
    rate.fixed_delay().unwrap_or_else(custom)
}

impl fmt::Display for PollRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PollRate {
    type Err = PollerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        PollRate::ALL
            .into_iter()
            .find(|rate| rate.name() == wanted)
            .ok_or_else(|| PollerError::UnknownPollRate(s.to_string()))
    }
}
