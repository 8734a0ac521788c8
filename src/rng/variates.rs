use super::{StreamId, Streams};

/// Transforms from `Uniform(0, 1)` draws to the distributions models need. Every method consumes its draws from the
/// named stream only, in a fixed order, so results are reproducible given the stream's seed.
impl Streams {
    /// `Uniform(lower, upper)` from one draw.
    pub fn uniform(&mut self, lower: f64, upper: f64, stream: StreamId) -> f64 {
        lower + (upper - lower) * self.uniform01(stream)
    }

    /// Exponential with the given mean, by inversion of one draw.
    pub fn exponential(&mut self, mean: f64, stream: StreamId) -> f64 {
        -(1.0 - self.uniform01(stream)).ln() * mean
    }

    /// Erlang with `phases` phases and overall `mean`: the sum of `phases` exponential draws, each with mean
    /// `mean / phases`, taken from `stream` in order.
    pub fn erlang(&mut self, phases: u32, mean: f64, stream: StreamId) -> f64 {
        debug_assert!(phases > 0, "an Erlang variate needs at least one phase");
        let phase_mean = mean / f64::from(phases);
        (0..phases).fold(0.0, |sum, _| sum + self.exponential(phase_mean, stream))
    }

    /// Triangular with lower limit `a`, mode `b` and upper limit `c`, by inversion of one draw.
    pub fn triangular(&mut self, a: f64, b: f64, c: f64, stream: StreamId) -> f64 {
        debug_assert!(a <= b && b <= c && a < c, "triangular limits must satisfy a <= b <= c, a < c");
        let standard_mode = (b - a) / (c - a);
        let u = self.uniform01(stream);
        let standard = if u <= standard_mode {
            (standard_mode * u).sqrt()
        } else {
            1.0 - ((1.0 - standard_mode) * (1.0 - u)).sqrt()
        };
        a + (c - a) * standard
    }

    /// Normal with the given mean and variance, by the polar (Marsaglia) method. Pairs of draws are consumed until
    /// the point they define falls inside the unit disk.
    pub fn normal(&mut self, mean: f64, variance: f64, stream: StreamId) -> f64 {
        debug_assert!(variance >= 0.0, "variance must not be negative");
        let (v1, w) = loop {
            let v1 = 2.0 * self.uniform01(stream) - 1.0;
            let v2 = 2.0 * self.uniform01(stream) - 1.0;
            let w = v1 * v1 + v2 * v2;
            if w <= 1.0 {
                break (v1, w);
            }
        };
        let standard = v1 * (-2.0 * w.ln() / w).sqrt();
        mean + variance.sqrt() * standard
    }

    /// Lognormal whose own mean and variance are `mean_prime` and `variance_prime`. The underlying normal's
    /// parameters are moment-matched before drawing.
    pub fn lognormal(&mut self, mean_prime: f64, variance_prime: f64, stream: StreamId) -> f64 {
        let mean_squared = mean_prime * mean_prime;
        let mean = (mean_squared / (mean_squared + variance_prime).sqrt()).ln();
        let variance = (1.0 + variance_prime / mean_squared).ln();
        self.normal(mean, variance, stream).exp()
    }

    /// Zero-based index of the first entry of the cumulative distribution `cdf` that exceeds one draw.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDistribution`] if no entry exceeds the draw, which means `cdf` does not climb to 1.
    /// The draw is consumed either way.
    ///
    /// [`Error::InvalidDistribution`]: crate::Error::InvalidDistribution
    pub fn random_integer(&mut self, cdf: &[f64], stream: StreamId) -> crate::Result<usize> {
        let u = self.uniform01(stream);
        cdf.iter().position(|&cumulative| u < cumulative).ok_or_else(|| {
            crate::Error::InvalidDistribution(format!("cumulative probabilities {cdf:?} never exceed {u}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(index: usize) -> StreamId {
        StreamId::new(index).unwrap()
    }

    fn assert_near(expected: f64, actual: f64) {
        assert!(
            (expected - actual).abs() <= 1e-12 * expected.abs().max(1.0),
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn uniform_scales_one_draw() {
        let mut streams = Streams::new();
        assert_near(0.118_874_877_691_268_92, streams.uniform(0.1, 0.2, stream(2)));
    }

    #[test]
    fn exponential_matches_reference() {
        let mut streams = Streams::new();
        assert_near(1.797_297_866_425_796_4, streams.exponential(2.0, stream(3)));
        assert_eq!(1_273_201_645, streams.seed(stream(3)));
    }

    #[test]
    fn erlang_matches_reference() {
        let mut streams = Streams::new();
        assert_near(2.573_090_325_259_135, streams.erlang(2, 5.0, stream(4)));
        assert_eq!(451_306_677, streams.seed(stream(4)));
    }

    #[test]
    fn erlang_is_sum_of_phase_exponentials() {
        let mut erlang_streams = Streams::new();
        let mut exponential_streams = Streams::new();
        for _ in 0..50 {
            let erlang = erlang_streams.erlang(3, 6.0, stream(7));
            let sum: f64 = (0..3).map(|_| exponential_streams.exponential(2.0, stream(7))).sum();
            assert_eq!(sum, erlang, "Erlang draw differs from its phase sum");
        }
        assert_eq!(exponential_streams, erlang_streams);
    }

    #[test]
    fn normal_matches_reference() {
        let mut streams = Streams::new();
        assert_near(10.027_565_902_525_044, streams.normal(10.0, 4.0, stream(5)));
        assert_eq!(2_130_210_726, streams.seed(stream(5)));
    }

    #[test]
    fn triangular_matches_reference() {
        let mut streams = Streams::new();
        assert_near(2.306_197_280_578_147_4, streams.triangular(1.0, 2.0, 4.0, stream(6)));
    }

    #[test]
    fn triangular_stays_within_limits() {
        let mut streams = Streams::new();
        for _ in 0..1000 {
            let value = streams.triangular(-1.0, 0.0, 3.0, stream(11));
            assert!((-1.0..=3.0).contains(&value), "triangular draw {value} out of range");
        }
    }

    #[test]
    fn lognormal_matches_reference() {
        let mut streams = Streams::new();
        assert_near(2.599_574_032_711_62, streams.lognormal(3.0, 1.0, stream(7)));
    }

    #[test]
    fn random_integer_uses_cumulative_probabilities() {
        let mut streams = Streams::new();
        assert_eq!(1, streams.random_integer(&[0.2, 0.5, 1.0], stream(8)).unwrap());
        assert_eq!(0.605_096_280_574_798_6, streams.uniform01(stream(8)), "random_integer took more than one draw");
    }

    #[test]
    fn random_integer_rejects_short_cdf() {
        let mut streams = Streams::new();
        let result = streams.random_integer(&[0.0, 0.0], stream(8));
        assert!(matches!(result, Err(crate::Error::InvalidDistribution(_))));
    }

    #[test]
    fn sample_means_are_close_to_parameters() {
        let mut streams = Streams::new();
        let draws = 20_000;
        let exponential: f64 = (0..draws).map(|_| streams.exponential(4.0, stream(12))).sum::<f64>() / draws as f64;
        let normal: f64 = (0..draws).map(|_| streams.normal(-2.0, 9.0, stream(13))).sum::<f64>() / draws as f64;
        assert!((exponential - 4.0).abs() < 0.15, "exponential sample mean {exponential}");
        assert!((normal + 2.0).abs() < 0.1, "normal sample mean {normal}");
    }
}
