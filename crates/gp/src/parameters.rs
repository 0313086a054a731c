use crate::errors::{GpError, Result};
use crate::kernels::Kernel;
use linfa::{Float, ParamGuard};

use ndarray::Array1;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// A set of validated GP parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct GpValidParams<F: Float, K: Kernel<F>> {
    /// Covariance kernel k(x, x')
    pub(crate) kernel: K,
    /// Initial regularization added to the covariance diagonal
    pub(crate) noise: F,
    /// Whether inputs are mapped onto the unit hypercube using `bounds`
    pub(crate) normalize_inputs: bool,
    /// Whether outputs are centered and scaled before fitting
    pub(crate) normalize_outputs: bool,
    /// Domain bounds (lower, upper) used by input normalization
    pub(crate) bounds: Option<(Array1<F>, Array1<F>)>,
    /// Optional cap on the number of noise escalations, unbounded when `None`
    pub(crate) max_noise_escalations: Option<usize>,
}

impl<F: Float, K: Kernel<F>> Default for GpValidParams<F, K> {
    fn default() -> GpValidParams<F, K> {
        GpValidParams {
            kernel: K::default(),
            noise: F::zero(),
            normalize_inputs: true,
            normalize_outputs: true,
            bounds: None,
            max_noise_escalations: None,
        }
    }
}

impl<F: Float, K: Kernel<F>> GpValidParams<F, K> {
    /// Get covariance kernel
    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Get initial noise
    pub fn noise(&self) -> F {
        self.noise
    }

    /// Get input normalization flag
    pub fn normalize_inputs(&self) -> bool {
        self.normalize_inputs
    }

    /// Get output normalization flag
    pub fn normalize_outputs(&self) -> bool {
        self.normalize_outputs
    }

    /// Get domain bounds
    pub fn bounds(&self) -> Option<&(Array1<F>, Array1<F>)> {
        self.bounds.as_ref()
    }

    /// Get the cap on noise escalations
    pub fn max_noise_escalations(&self) -> Option<usize> {
        self.max_noise_escalations
    }
}

#[derive(Clone, Debug)]
/// The set of hyperparameters that can be specified for the execution of
/// the [GP algorithm](struct.GaussianProcess.html).
pub struct GpParams<F: Float, K: Kernel<F>>(GpValidParams<F, K>);

impl<F: Float, K: Kernel<F>> GpParams<F, K> {
    /// A constructor for GP parameters given a kernel
    pub fn new(kernel: K) -> GpParams<F, K> {
        Self(GpValidParams {
            kernel,
            ..Default::default()
        })
    }

    /// A constructor for GP parameters from validated parameters
    pub fn new_from_valid(params: &GpValidParams<F, K>) -> Self {
        Self(params.clone())
    }

    /// Set kernel.
    pub fn kernel(mut self, kernel: K) -> Self {
        self.0.kernel = kernel;
        self
    }

    /// Set initial noise, the regularization added to the covariance diagonal.
    ///
    /// The model raises it on its own when the covariance is not positive definite.
    pub fn noise(mut self, noise: F) -> Self {
        self.0.noise = noise;
        self
    }

    /// Set input normalization (requires `bounds`)
    pub fn normalize_inputs(mut self, normalize: bool) -> Self {
        self.0.normalize_inputs = normalize;
        self
    }

    /// Set output normalization
    pub fn normalize_outputs(mut self, normalize: bool) -> Self {
        self.0.normalize_outputs = normalize;
        self
    }

    /// Set domain bounds used to normalize inputs
    pub fn bounds(mut self, lower: Array1<F>, upper: Array1<F>) -> Self {
        self.0.bounds = Some((lower, upper));
        self
    }

    /// Set a cap on noise escalations, `None` means unbounded
    pub fn max_noise_escalations(mut self, max: Option<usize>) -> Self {
        self.0.max_noise_escalations = max;
        self
    }
}

impl<F: Float, K: Kernel<F>> From<GpValidParams<F, K>> for GpParams<F, K> {
    fn from(valid: GpValidParams<F, K>) -> Self {
        GpParams(valid)
    }
}

impl<F: Float, K: Kernel<F>> ParamGuard for GpParams<F, K> {
    type Checked = GpValidParams<F, K>;
    type Error = GpError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        if self.0.noise < F::zero() || !self.0.noise.is_finite() {
            return Err(GpError::InvalidArgument(format!(
                "Noise should be a finite non negative value, got {}",
                self.0.noise
            )));
        }
        match &self.0.bounds {
            Some((lower, upper)) => {
                if lower.is_empty() || lower.len() != upper.len() {
                    return Err(GpError::InvalidArgument(format!(
                        "Bounds should be non empty with same length, got {} and {}",
                        lower.len(),
                        upper.len()
                    )));
                }
                if lower.iter().zip(upper.iter()).any(|(l, u)| !(l < u)) {
                    return Err(GpError::InvalidArgument(
                        "Lower bound should be strictly less than upper bound".to_string(),
                    ));
                }
            }
            None => {
                if self.0.normalize_inputs {
                    return Err(GpError::InvalidArgument(
                        "Input normalization requires domain bounds".to_string(),
                    ));
                }
            }
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
