use crate::covariance::CovarianceSolver;
use crate::errors::{GpError, Result};
use crate::kernels::Kernel;
use crate::normalization::*;
use crate::parameters::{GpParams, GpValidParams};

use linfa::prelude::{DatasetBase, Fit, Float};
use ndarray::{concatenate, Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use ndarray_stats::QuantileExt;

use log::{debug, warn};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Noise value used on the first escalation when the model starts without noise
pub const GP_NOISE_FIRST_ESCALATION: f64 = 0.1;

/// Capabilities of a surrogate model of the objective function
pub trait SurrogateModel<F: Float> {
    /// Train the model from scratch on `x` (n, nx) and `y` (n,)
    fn train(
        &mut self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<()>;

    /// Append `xnew` (m, nx) and `ynew` (m,) to the training data and retrain
    fn update(
        &mut self,
        xnew: &ArrayBase<impl Data<Elem = F>, Ix2>,
        ynew: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<()>;

    /// Predicted means and variances at `x` (n, nx)
    fn predict(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<(Array1<F>, Array1<F>)>;

    /// Best training point and its value (minimum, first occurrence wins)
    fn incumbent(&self) -> Result<(Array1<F>, F)>;
}

/// Gaussian process regression used as surrogate model in bayesian optimization.
///
/// The posterior mean and variance at `x` are given by
///
/// `m(x) = k_x^T (K + noise I)^-1 y`
///
/// `s2(x) = k(x, x) - k_x^T (K + noise I)^-1 k_x`
///
/// where `K` is the kernel matrix of training inputs and `k_x` the vector of
/// kernel values between `x` and training inputs.
///
/// Inputs can be mapped onto the unit hypercube given domain bounds and outputs
/// centered and scaled (see [`crate::normalization`]) before fitting. Predictions
/// are always returned in raw space.
///
/// # Noise escalation
///
/// When `K + noise I` is not positive definite (e.g. with duplicated training
/// points), training is retried with a larger noise: `0.1` when noise was null,
/// otherwise noise is multiplied by `sqrt(10)`. The loop is unbounded by default
/// and terminates since the matrix becomes diagonally dominant as noise grows;
/// a cap can be set with [`GpParams::max_noise_escalations`].
/// The escalated noise is kept by the model for later trainings.
///
/// # Example
///
/// ```
/// use bayesbox_gp::{GaussianProcess, SurrogateModel, kernels::SquaredExponentialKernel};
/// use linfa::ParamGuard;
/// use ndarray::array;
///
/// let xt = array![[0.0], [1.0], [2.0], [3.0], [4.0]];
/// let yt = array![0.0, 1.0, 1.5, 0.9, 1.0];
///
/// let params = GaussianProcess::params(SquaredExponentialKernel::default())
///     .bounds(array![0.0], array![4.0])
///     .check()
///     .expect("GP params validated");
/// let mut gp = GaussianProcess::new(params);
/// gp.train(&xt, &yt).expect("GP trained");
///
/// let (mean, var) = gp.predict(&array![[0.5], [3.5]]).expect("GP prediction");
/// assert_eq!(mean.len(), 2);
/// assert_eq!(var.len(), 2);
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct GaussianProcess<F: Float, K: Kernel<F>> {
    /// Parameters the model was built with
    params: GpValidParams<F, K>,
    /// Current noise, possibly escalated during training
    noise: F,
    /// Output mean used in normalization
    mean: F,
    /// Output spread used in normalization
    std: F,
    /// Normalized training data
    data: Option<(Array2<F>, Array1<F>)>,
    /// Factorized covariance of the last successful training
    solver: Option<CovarianceSolver<F, K>>,
}

impl<F: Float, K: Kernel<F>> fmt::Display for GaussianProcess<F, K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "GP(kernel={}, noise={}, trained={})",
            self.params.kernel,
            self.noise,
            self.is_trained()
        )
    }
}

impl<F: Float, K: Kernel<F>> GaussianProcess<F, K> {
    /// Gp parameters constructor
    pub fn params(kernel: K) -> GpParams<F, K> {
        GpParams::new(kernel)
    }

    /// Untrained model from validated parameters
    pub fn new(params: GpValidParams<F, K>) -> Self {
        GaussianProcess {
            noise: params.noise,
            params,
            mean: F::zero(),
            std: F::one(),
            data: None,
            solver: None,
        }
    }

    /// Current noise value, greater than the initial one after escalations
    pub fn noise(&self) -> F {
        self.noise
    }

    /// Whether the model went through one successful training
    pub fn is_trained(&self) -> bool {
        self.solver.is_some()
    }

    /// Output statistics `(mean, std)` of the last training
    pub fn output_stats(&self) -> (F, F) {
        (self.mean, self.std)
    }

    /// Parameters of the model
    pub fn params_ref(&self) -> &GpValidParams<F, K> {
        &self.params
    }

    /// Training data in raw space, `None` before training
    pub fn training_data(&self) -> Result<Option<(Array2<F>, Array1<F>)>> {
        match &self.data {
            Some((xn, yn)) => Ok(Some((self.raw_inputs(xn)?, self.raw_outputs(yn)))),
            None => Ok(None),
        }
    }

    fn scaled_inputs(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>> {
        match (&self.params.bounds, self.params.normalize_inputs) {
            (Some((lower, upper)), true) => normalize_inputs(x, lower, upper),
            _ => Ok(x.to_owned()),
        }
    }

    fn raw_inputs(&self, xn: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>> {
        match (&self.params.bounds, self.params.normalize_inputs) {
            (Some((lower, upper)), true) => denormalize_inputs(xn, lower, upper),
            _ => Ok(xn.to_owned()),
        }
    }

    fn raw_outputs(&self, yn: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array1<F> {
        if self.params.normalize_outputs {
            denormalize_outputs(yn, self.mean, self.std)
        } else {
            yn.to_owned()
        }
    }

    /// Builds the covariance solver, raising the noise while the covariance
    /// is not positive definite. Returns the solver with the noise that succeeded.
    fn factorize(
        &self,
        xn: &Array2<F>,
        yn: &Array1<F>,
    ) -> Result<(CovarianceSolver<F, K>, F)> {
        let mut noise = self.noise;
        let mut escalations = 0;
        loop {
            match CovarianceSolver::new(xn, yn, self.params.kernel, noise) {
                Ok(solver) => return Ok((solver, noise)),
                Err(GpError::SingularCovariance(msg)) => {
                    if let Some(max) = self.params.max_noise_escalations {
                        if escalations >= max {
                            return Err(GpError::SingularCovariance(format!(
                                "{msg} (after {escalations} noise escalations)"
                            )));
                        }
                    }
                    if noise == F::zero() {
                        noise = F::cast(GP_NOISE_FIRST_ESCALATION);
                        warn!("Noise of Gaussian Process += {}", GP_NOISE_FIRST_ESCALATION);
                    } else {
                        noise *= F::cast(10.).sqrt();
                        warn!("Noise of Gaussian Process *= sqrt(10) (noise={noise})");
                    }
                    escalations += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn check_training_data(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(GpError::InvalidArgument(format!(
                "The sizes of X and Y don't match: {} != {}",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() == 0 {
            return Err(GpError::InvalidArgument(
                "Cannot train on empty data".to_string(),
            ));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(GpError::InvalidArgument(
                "Training data should only contain finite values".to_string(),
            ));
        }
        if let Some((lower, _)) = &self.params.bounds {
            if lower.len() != x.ncols() {
                return Err(GpError::InvalidArgument(format!(
                    "Training inputs dimension {} does not match bounds dimension {}",
                    x.ncols(),
                    lower.len()
                )));
            }
        }
        Ok(())
    }
}

impl<F: Float, K: Kernel<F>> SurrogateModel<F> for GaussianProcess<F, K> {
    /// Model state is left unchanged on failure.
    fn train(
        &mut self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<()> {
        self.check_training_data(x, y)?;

        let xn = self.scaled_inputs(x)?;
        let (mean, std, yn) = if self.params.normalize_outputs {
            let (mean, std) = output_stats(y)?;
            (mean, std, normalize_outputs(y, mean, std)?)
        } else {
            (F::zero(), F::one(), y.to_owned())
        };

        let (solver, noise) = self.factorize(&xn, &yn)?;
        debug!("GP trained on {} points with noise={}", xn.nrows(), noise);

        self.noise = noise;
        self.mean = mean;
        self.std = std;
        self.data = Some((xn, yn));
        self.solver = Some(solver);
        Ok(())
    }

    fn update(
        &mut self,
        xnew: &ArrayBase<impl Data<Elem = F>, Ix2>,
        ynew: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<()> {
        match self.training_data()? {
            Some((x, y)) => {
                if x.ncols() != xnew.ncols() || xnew.nrows() != ynew.len() {
                    return Err(GpError::InvalidArgument(format!(
                        "Cannot append ({}, {}) points and {} values to ({}, {}) training inputs",
                        xnew.nrows(),
                        xnew.ncols(),
                        ynew.len(),
                        x.nrows(),
                        x.ncols()
                    )));
                }
                let x = concatenate![Axis(0), x, xnew.view()];
                let y = concatenate![Axis(0), y, ynew.view()];
                self.train(&x, &y)
            }
            None => self.train(xnew, ynew),
        }
    }

    fn predict(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<(Array1<F>, Array1<F>)> {
        let solver = self.solver.as_ref().ok_or(GpError::NotTrained)?;
        let xn = self.scaled_inputs(x)?;
        let (mean, var) = solver.predict_valvar(&xn)?;
        if self.params.normalize_outputs {
            let std2 = self.std * self.std;
            Ok((
                denormalize_outputs(&mean, self.mean, self.std),
                var.mapv(|v| v * std2),
            ))
        } else {
            Ok((mean, var))
        }
    }

    fn incumbent(&self) -> Result<(Array1<F>, F)> {
        let (xn, yn) = self.data.as_ref().ok_or(GpError::NotTrained)?;
        // strict minimum scan, first occurrence wins on ties
        let best = yn
            .argmin()
            .map_err(|err| GpError::InvalidArgument(format!("No incumbent: {err}")))?;
        let x = self.raw_inputs(&xn.row(best).insert_axis(Axis(0)))?;
        let y = if self.params.normalize_outputs {
            yn[best] * self.std + self.mean
        } else {
            yn[best]
        };
        Ok((x.row(0).to_owned(), y))
    }
}

impl<F: Float, K: Kernel<F>, D: Data<Elem = F>>
    Fit<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>, GpError> for GpValidParams<F, K>
{
    type Object = GaussianProcess<F, K>;

    /// Train a GP on the dataset
    fn fit(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>>,
    ) -> Result<Self::Object> {
        let mut gp = GaussianProcess::new(self.clone());
        gp.train(dataset.records(), dataset.targets())?;
        Ok(gp)
    }
}
