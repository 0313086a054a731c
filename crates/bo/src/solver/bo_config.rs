//! Bayesian optimization loop configuration.
use crate::errors::{BoError, Result};
use crate::types::{AcquisitionStrategy, MaximizerKind};

use serde::{Deserialize, Serialize};

/// Bayesian optimization loop configuration
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct BoConfig {
    /// Number of points of the initial design drawn uniformly over the domain
    pub(crate) n_initial: usize,
    /// Interval between two hyperparameters optimizations (as iteration number modulo)
    /// Note: passed to the candidate selection, the GP kernel is not tuned
    pub(crate) train_interval: usize,
    /// Number of random candidates scored by the acquisition maximizer
    pub(crate) n_samples: usize,
    /// Exploration parameter of the Expected Improvement
    pub(crate) xi: f64,
    /// Initial noise of the GP surrogate
    pub(crate) noise: f64,
    /// Length scale of the GP kernel (in normalized input space)
    pub(crate) length_scale: f64,
    /// Whether GP inputs are mapped onto the unit hypercube
    pub(crate) normalize_inputs: bool,
    /// Whether GP outputs are centered and scaled
    pub(crate) normalize_outputs: bool,
    /// Optional cap on the number of GP noise escalations
    pub(crate) max_noise_escalations: Option<usize>,
    /// Acquisition function scoring candidates
    pub(crate) acquisition: AcquisitionStrategy,
    /// Maximizer of the acquisition function
    pub(crate) maximizer: MaximizerKind,
    /// Optional seed for reproducible runs
    pub(crate) seed: Option<u64>,
}

impl Default for BoConfig {
    fn default() -> Self {
        BoConfig {
            n_initial: 3,
            train_interval: 1,
            n_samples: 100,
            xi: 0.,
            noise: 0.,
            length_scale: 1.,
            normalize_inputs: true,
            normalize_outputs: true,
            max_noise_escalations: None,
            acquisition: AcquisitionStrategy::default(),
            maximizer: MaximizerKind::default(),
            seed: None,
        }
    }
}

impl BoConfig {
    /// Sets the number of points of the initial design
    pub fn n_initial(mut self, n_initial: usize) -> Self {
        self.n_initial = n_initial;
        self
    }

    /// Sets the interval (as iteration number modulo) at which hyperparameters optimization is requested
    pub fn train_interval(mut self, train_interval: usize) -> Self {
        self.train_interval = train_interval;
        self
    }

    /// Sets the number of random candidates scored to choose the next point
    pub fn n_samples(mut self, n_samples: usize) -> Self {
        self.n_samples = n_samples;
        self
    }

    /// Sets the Expected Improvement exploration parameter
    pub fn xi(mut self, xi: f64) -> Self {
        self.xi = xi;
        self
    }

    /// Sets the initial noise of the GP surrogate
    pub fn noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    /// Sets the length scale of the default squared exponential kernel
    pub fn length_scale(mut self, length_scale: f64) -> Self {
        self.length_scale = length_scale;
        self
    }

    /// Whether GP inputs are normalized with the domain bounds
    pub fn normalize_inputs(mut self, normalize_inputs: bool) -> Self {
        self.normalize_inputs = normalize_inputs;
        self
    }

    /// Whether GP outputs are normalized
    pub fn normalize_outputs(mut self, normalize_outputs: bool) -> Self {
        self.normalize_outputs = normalize_outputs;
        self
    }

    /// Caps the number of GP noise escalations, unbounded by default
    pub fn max_noise_escalations(mut self, max_noise_escalations: usize) -> Self {
        self.max_noise_escalations = Some(max_noise_escalations);
        self
    }

    /// Sets the acquisition function
    pub fn acquisition(mut self, acquisition: AcquisitionStrategy) -> Self {
        self.acquisition = acquisition;
        self
    }

    /// Sets the acquisition maximizer
    pub fn maximizer(mut self, maximizer: MaximizerKind) -> Self {
        self.maximizer = maximizer;
        self
    }

    /// Allow to specify a seed for random number generator to allow
    /// reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate the configuration
    pub fn check(self) -> Result<ValidBoConfig> {
        if self.n_initial == 0 {
            return Err(BoError::InvalidConfigError(
                "n_initial should be at least 1".to_string(),
            ));
        }
        if self.train_interval == 0 {
            return Err(BoError::InvalidConfigError(
                "train_interval should be at least 1".to_string(),
            ));
        }
        if self.n_samples == 0 {
            return Err(BoError::InvalidArgument(
                "Random sampling requires at least one sample".to_string(),
            ));
        }
        if !self.xi.is_finite() || self.xi < 0. {
            return Err(BoError::InvalidConfigError(format!(
                "xi should be a finite positive value, got {}",
                self.xi
            )));
        }
        if !self.noise.is_finite() || self.noise < 0. {
            return Err(BoError::InvalidConfigError(format!(
                "noise should be a finite positive value, got {}",
                self.noise
            )));
        }
        if !self.length_scale.is_finite() || self.length_scale <= 0. {
            return Err(BoError::InvalidConfigError(format!(
                "length_scale should be strictly positive, got {}",
                self.length_scale
            )));
        }
        Ok(ValidBoConfig(self))
    }
}

/// A checked [`BoConfig`]
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ValidBoConfig(BoConfig);

impl std::ops::Deref for ValidBoConfig {
    type Target = BoConfig;

    fn deref(&self) -> &BoConfig {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BoConfig::default().check().unwrap();
        assert_eq!(config.n_initial, 3);
        assert_eq!(config.train_interval, 1);
        assert_eq!(config.n_samples, 100);
        assert_eq!(config.xi, 0.);
        assert_eq!(config.noise, 0.);
        assert!(config.normalize_inputs && config.normalize_outputs);
        assert_eq!(config.max_noise_escalations, None);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            BoConfig::default().n_initial(0).check(),
            Err(BoError::InvalidConfigError(_))
        ));
        assert!(matches!(
            BoConfig::default().train_interval(0).check(),
            Err(BoError::InvalidConfigError(_))
        ));
        assert!(matches!(
            BoConfig::default().n_samples(0).check(),
            Err(BoError::InvalidArgument(_))
        ));
        assert!(matches!(
            BoConfig::default().xi(-0.1).check(),
            Err(BoError::InvalidConfigError(_))
        ));
        assert!(matches!(
            BoConfig::default().noise(f64::NAN).check(),
            Err(BoError::InvalidConfigError(_))
        ));
        assert!(matches!(
            BoConfig::default().length_scale(0.).check(),
            Err(BoError::InvalidConfigError(_))
        ));
    }

    #[test]
    fn test_config_json() {
        let config = BoConfig::default().seed(42).max_noise_escalations(5);
        let json = serde_json::to_string(&config).unwrap();
        let back: BoConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
