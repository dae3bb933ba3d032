// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use crate::define_fn_wrapper;
use crate::rnd::Rnd;

/// The time unit used when none is configured.
const DEFAULT_UNIT: Duration = Duration::from_secs(1);

/// Jittered waits never go below this value.
const MIN_JITTERED_DELAY: Duration = Duration::from_millis(1);

/// Jitter spreads a delay uniformly over `delay ± delay / JITTER_DIVISOR`.
const JITTER_DIVISOR: f64 = 3.0;

define_fn_wrapper!(BackoffFn(Fn(attempt: u32) -> Duration));

/// Computes how long a lane waits after a failed attempt.
///
/// The argument passed to [`delay`](Self::delay) is the 1-based number of the attempt that just
/// failed. Every strategy is scaled by a time unit, which defaults to one second.
///
/// | Strategy | Wait after attempt `n` |
/// |---|---|
/// | [`constant`](Self::constant) | `unit` |
/// | [`linear`](Self::linear) | `n × unit` |
/// | [`exponential`](Self::exponential) | `2ⁿ × unit` |
/// | [`linear_jitter`](Self::linear_jitter) | `n × unit`, ±33 % |
/// | [`exponential_jitter`](Self::exponential_jitter) | `2ⁿ × unit`, ±33 % |
///
/// Jittered values are never shorter than one millisecond.
///
/// # Examples
///
/// ```
/// # use std::time::Duration;
/// # use relentless::Backoff;
/// let backoff = Backoff::exponential().unit(Duration::from_millis(10));
///
/// assert_eq!(backoff.delay(1), Duration::from_millis(20));
/// assert_eq!(backoff.delay(2), Duration::from_millis(40));
/// assert_eq!(backoff.delay(3), Duration::from_millis(80));
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize), serde(from = "BackoffConfig"))]
pub struct Backoff {
    strategy: Strategy,
    unit: Duration,
    rnd: Rnd,
}

#[derive(Debug, Clone)]
enum Strategy {
    Constant,
    Linear,
    Exponential,
    LinearJitter,
    ExponentialJitter,
    Custom(BackoffFn),
}

impl Backoff {
    /// Waits one unit after every failure.
    #[must_use]
    pub fn constant() -> Self {
        Self::with_strategy(Strategy::Constant)
    }

    /// Waits `n` units after the `n`-th failure.
    #[must_use]
    pub fn linear() -> Self {
        Self::with_strategy(Strategy::Linear)
    }

    /// Waits `2ⁿ` units after the `n`-th failure.
    #[must_use]
    pub fn exponential() -> Self {
        Self::with_strategy(Strategy::Exponential)
    }

    /// Like [`linear`](Self::linear), with ±33 % uniform jitter.
    #[must_use]
    pub fn linear_jitter() -> Self {
        Self::with_strategy(Strategy::LinearJitter)
    }

    /// Like [`exponential`](Self::exponential), with ±33 % uniform jitter.
    #[must_use]
    pub fn exponential_jitter() -> Self {
        Self::with_strategy(Strategy::ExponentialJitter)
    }

    /// Uses an arbitrary function of the failed attempt number.
    ///
    /// The configured unit is ignored; the function returns the final wait.
    ///
    /// ```
    /// # use std::time::Duration;
    /// # use relentless::Backoff;
    /// let backoff = Backoff::custom(|attempt| Duration::from_millis(u64::from(attempt) * 5));
    /// assert_eq!(backoff.delay(3), Duration::from_millis(15));
    /// ```
    #[must_use]
    pub fn custom(f: impl Fn(u32) -> Duration + Send + Sync + 'static) -> Self {
        Self::with_strategy(Strategy::Custom(BackoffFn::new(f)))
    }

    /// Sets the time unit the built-in strategies are scaled by.
    #[must_use]
    pub fn unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    /// Returns the configured time unit.
    #[must_use]
    pub fn time_unit(&self) -> Duration {
        self.unit
    }

    /// Returns the wait that follows the failure of attempt `attempt` (1-based).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        match &self.strategy {
            Strategy::Constant => self.unit,
            Strategy::Linear => self.unit.saturating_mul(attempt),
            Strategy::Exponential => mul_pow2(self.unit, attempt),
            Strategy::LinearJitter => apply_jitter(self.unit.saturating_mul(attempt), &self.rnd),
            Strategy::ExponentialJitter => apply_jitter(mul_pow2(self.unit, attempt), &self.rnd),
            Strategy::Custom(f) => f.call(attempt),
        }
    }

    fn with_strategy(strategy: Strategy) -> Self {
        Self {
            strategy,
            unit: DEFAULT_UNIT,
            rnd: Rnd::default(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_rnd(mut self, rnd: Rnd) -> Self {
        self.rnd = rnd;
        self
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::constant()
    }
}

fn mul_pow2(unit: Duration, exponent: u32) -> Duration {
    2_u32.checked_pow(exponent).map_or(Duration::MAX, |factor| unit.saturating_mul(factor))
}

/// Scales `delay` by a uniform factor in `[2/3, 4/3)`.
fn apply_jitter(delay: Duration, rnd: &Rnd) -> Duration {
    let factor = 1.0 + 2.0f64.mul_add(rnd.next_f64(), -1.0) / JITTER_DIVISOR;
    let jittered = Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(Duration::MAX);

    jittered.max(MIN_JITTERED_DELAY)
}

#[cfg(feature = "serde")]
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
enum StrategyName {
    Constant,
    Linear,
    Exponential,
    LinearJitter,
    ExponentialJitter,
}

#[cfg(feature = "serde")]
#[derive(Debug, serde::Deserialize)]
struct BackoffConfig {
    strategy: StrategyName,
    #[serde(default)]
    unit: Option<jiff::SignedDuration>,
}

#[cfg(feature = "serde")]
impl From<BackoffConfig> for Backoff {
    fn from(config: BackoffConfig) -> Self {
        let backoff = match config.strategy {
            StrategyName::Constant => Self::constant(),
            StrategyName::Linear => Self::linear(),
            StrategyName::Exponential => Self::exponential(),
            StrategyName::LinearJitter => Self::linear_jitter(),
            StrategyName::ExponentialJitter => Self::exponential_jitter(),
        };

        // negative units collapse to zero
        let unit = config
            .unit
            .map_or(DEFAULT_UNIT, |unit| Duration::try_from(unit).unwrap_or(Duration::ZERO));

        backoff.unit(unit)
    }
}
