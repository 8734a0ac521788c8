/// Observation-weighted statistic: running sample mean and variance of discrete observations, independent of
/// simulated time.
#[derive(Debug, Clone, PartialEq)]
pub struct DtStat {
    sum: f64,
    sum_of_squares: f64,
    count: u64,
    max: f64,
    min: f64,
}

impl Default for DtStat {
    fn default() -> Self {
        Self::new()
    }
}

impl DtStat {
    /// An empty statistic.
    pub fn new() -> Self {
        Self {
            sum: 0.0,
            sum_of_squares: 0.0,
            count: 0,
            max: f64::NEG_INFINITY,
            min: f64::INFINITY,
        }
    }

    /// Add one observation.
    pub fn record(&mut self, x: f64) {
        self.sum += x;
        self.sum_of_squares += x * x;
        self.count += 1;
        self.max = self.max.max(x);
        self.min = self.min.min(x);
    }

    /// Sample mean, or `0.0` with no observations.
    pub fn mean(&self) -> f64 {
        if self.count > 0 {
            self.sum / self.count as f64
        } else {
            0.0
        }
    }

    /// Sample standard deviation, or `0.0` with fewer than two observations.
    pub fn std_dev(&self) -> f64 {
        if self.count > 1 {
            let n = self.count as f64;
            // rounding can push the numerator a hair below zero for near-constant samples
            ((self.sum_of_squares - self.sum * self.sum / n) / (n - 1.0)).max(0.0).sqrt()
        } else {
            0.0
        }
    }

    /// Number of observations since the last clear.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sum of observations since the last clear.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Largest observation since the last clear, or negative infinity if none.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Smallest observation since the last clear, or positive infinity if none.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Forget every observation.
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
