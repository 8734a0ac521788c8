//! Run-length configuration for a batch of replications.

use serde::{Deserialize, Serialize};

/// How long each replication runs, how much of it is discarded as warm-up, and how many replications make a batch.
///
/// Deserializable so that experiment settings can live next to the model in a file:
///
/// ```
/// let config: simkernel::RunConfig =
///     serde_json::from_str(r#"{ "run_length": 690.0, "warm_up": 90.0, "replications": 200 }"#).unwrap();
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Simulated time at which the end-of-run event fires.
    pub run_length: f64,
    /// Simulated time at which statistics are cleared, if at all.
    #[serde(default)]
    pub warm_up: Option<f64>,
    /// Number of replications run by [`Simulation::replicate()`](crate::Simulation::replicate).
    #[serde(default = "default_replications")]
    pub replications: usize,
}

fn default_replications() -> usize {
    1
}

impl RunConfig {
    /// A single replication of `run_length` time units with no warm-up.
    pub fn new(run_length: f64) -> Self {
        Self {
            run_length,
            warm_up: None,
            replications: default_replications(),
        }
    }

    /// Set the warm-up length.
    pub fn with_warm_up(mut self, warm_up: f64) -> Self {
        self.warm_up = Some(warm_up);
        self
    }

    /// Set the number of replications.
    pub fn with_replications(mut self, replications: usize) -> Self {
        self.replications = replications;
        self
    }

    /// Check that the run length is positive and finite, that any warm-up ends strictly before the run does, and that
    /// at least one replication is requested.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] describing the first problem found.
    ///
    /// [`Error::InvalidConfig`]: crate::Error::InvalidConfig
    pub fn validate(&self) -> crate::Result {
        if !(self.run_length.is_finite() && self.run_length > 0.0) {
            return Err(crate::Error::InvalidConfig(format!(
                "run length must be positive and finite, got {}",
                self.run_length
            )));
        }
        if let Some(warm_up) = self.warm_up {
            if !(warm_up.is_finite() && warm_up >= 0.0 && warm_up < self.run_length) {
                return Err(crate::Error::InvalidConfig(format!(
                    "warm-up must lie in [0, {}), got {warm_up}",
                    self.run_length
                )));
            }
        }
        if self.replications == 0 {
            return Err(crate::Error::InvalidConfig("at least one replication is required".into()));
        }
        Ok(())
    }
}
