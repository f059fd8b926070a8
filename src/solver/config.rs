//! GRASP solver configuration.

use serde::{Deserialize, Serialize};

use crate::error::{RideShareError, Result};

/// Weight of the shared-cost ratio in the savings objective.
pub const DEFAULT_ALPHA: f64 = 0.99;

/// Parameters of a GRASP run.
///
/// # Examples
///
/// ```
/// use u_rideshare::GraspConfig;
///
/// let config = GraspConfig::default()
///     .with_capacity(4)
///     .with_iterations(20)
///     .with_seed(42);
/// assert_eq!(config.beta, 5);
/// assert_eq!(config.capacity, 4);
/// assert!(config.validate().is_ok());
/// assert!(GraspConfig::default().with_gamma(0).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraspConfig {
    /// Candidate anchors per kind and percentage of the feasible insertions
    /// drawn from during construction.
    pub beta: u32,
    /// Percentage of the best-ranked unserved requests drawn from during
    /// construction.
    pub gamma: u32,
    /// Passenger limit per vehicle.
    pub capacity: u32,
    /// Number of construction restarts.
    pub iterations: usize,
    /// Local search rounds after each restart.
    pub search_iterations: usize,
    /// Objective weight, in `(0, 1]`.
    pub alpha: f64,
    /// RNG seed; drawn at random and logged when absent.
    pub seed: Option<u64>,
    /// Evaluate construction restarts on the rayon pool.
    pub parallel: bool,
    /// Stop starting restarts after this many milliseconds.
    pub time_limit_ms: Option<u64>,
}

impl Default for GraspConfig {
    fn default() -> Self {
        Self {
            beta: 5,
            gamma: 25,
            capacity: 3,
            iterations: 100,
            search_iterations: 50,
            alpha: DEFAULT_ALPHA,
            seed: None,
            parallel: true,
            time_limit_ms: None,
        }
    }
}

impl GraspConfig {
    /// Sets `beta`.
    pub fn with_beta(mut self, beta: u32) -> Self {
        self.beta = beta;
        self
    }

    /// Sets `gamma`.
    pub fn with_gamma(mut self, gamma: u32) -> Self {
        self.gamma = gamma;
        self
    }

    /// Sets the vehicle capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the number of construction restarts.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Sets the local search rounds per restart.
    pub fn with_search_iterations(mut self, search_iterations: usize) -> Self {
        self.search_iterations = search_iterations;
        self
    }

    /// Sets the objective weight.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Fixes the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel construction.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets a wall-clock limit.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`RideShareError::InvalidConfig`] naming the first bad
    /// parameter.
    pub fn validate(&self) -> Result<()> {
        let invalid = |parameter: &'static str, reason: &str| -> Result<()> {
            Err(RideShareError::InvalidConfig {
                parameter,
                reason: reason.to_string(),
            })
        };
        if !(1..=100).contains(&self.beta) {
            return invalid("beta", "must be a percentage between 1 and 100");
        }
        if !(1..=100).contains(&self.gamma) {
            return invalid("gamma", "must be a percentage between 1 and 100");
        }
        if self.capacity == 0 {
            return invalid("capacity", "must be positive");
        }
        if self.iterations == 0 {
            return invalid("iterations", "must be positive");
        }
        if self.search_iterations == 0 {
            return invalid("search_iterations", "must be positive");
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return invalid("alpha", "must lie in (0, 1]");
        }
        Ok(())
    }
}
