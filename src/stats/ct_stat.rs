use serde::{Deserialize, Serialize};

/// What a [`CtStat`] does with its current level when cleared at the end of a warm-up period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelOnClear {
    /// Keep the last recorded value, so a steady-state level carries into the measured period. Right for anything
    /// that mirrors occupancy which the warm-up does not disturb, such as a queue length.
    #[default]
    Keep,
    /// Drop the level to zero, as if nothing had been recorded yet.
    Zero,
}

/// Time-weighted statistic over a step function of simulated time.
///
/// Every call to [`record()`] closes the current step at time `now`, adding `level * width` to the running integral,
/// and opens a new step at the recorded value. [`mean()`] divides the integral, including the still-open step, by the
/// time elapsed since the last clear.
///
/// [`record()`]: CtStat::record
/// [`mean()`]: CtStat::mean
#[derive(Debug, Clone, PartialEq)]
pub struct CtStat {
    area: f64,
    last_update: f64,
    last_value: f64,
    clear_time: f64,
    max: f64,
    min: f64,
    on_clear: LevelOnClear,
}

impl Default for CtStat {
    fn default() -> Self {
        Self::new(LevelOnClear::default())
    }
}

impl CtStat {
    /// An empty statistic at level zero, starting at time zero.
    pub fn new(on_clear: LevelOnClear) -> Self {
        Self {
            area: 0.0,
            last_update: 0.0,
            last_value: 0.0,
            clear_time: 0.0,
            max: f64::NEG_INFINITY,
            min: f64::INFINITY,
            on_clear,
        }
    }

    /// Record that the tracked quantity changed to `value` at time `now`. Call after the change has happened.
    pub fn record(&mut self, value: f64, now: f64) {
        self.area += self.last_value * (now - self.last_update);
        self.last_update = now;
        self.last_value = value;
        self.max = self.max.max(value);
        self.min = self.min.min(value);
    }

    /// Time-average level from the last clear through `now`, or `0.0` if no time has elapsed.
    pub fn mean(&self, now: f64) -> f64 {
        let elapsed = now - self.clear_time;
        if elapsed > 0.0 {
            (self.area + self.last_value * (now - self.last_update)) / elapsed
        } else {
            0.0
        }
    }

    /// Discard the accumulated area and restart measurement at `now`. The current level is kept or zeroed according
    /// to the statistic's [`LevelOnClear`] setting; the observed extremes restart from the surviving level.
    pub fn clear(&mut self, now: f64) {
        self.area = 0.0;
        self.last_update = now;
        self.clear_time = now;
        if self.on_clear == LevelOnClear::Zero {
            self.last_value = 0.0;
        }
        self.max = self.last_value;
        self.min = self.last_value;
    }

    /// Return to the freshly constructed state at time `now`, level included. Used between replications.
    pub fn reset(&mut self, now: f64) {
        *self = Self::new(self.on_clear);
        self.last_update = now;
        self.clear_time = now;
    }

    /// The most recently recorded value.
    pub fn level(&self) -> f64 {
        self.last_value
    }

    /// Largest value recorded since the last clear, or negative infinity if none.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Smallest value recorded since the last clear, or positive infinity if none.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Time of the last clear or reset.
    pub fn clear_time(&self) -> f64 {
        self.clear_time
    }

    /// This statistic's warm-up behavior.
    pub fn level_on_clear(&self) -> LevelOnClear {
        self.on_clear
    }
}
