//! `BayesOpt` minimizes an expensive black-box objective over a box domain
//! with a Gaussian process surrogate and the Expected Improvement criterion.
//!
//! ```
//! use ndarray::{array, ArrayView1};
//! use bayesbox_bo::BoBuilder;
//!
//! fn quadratic(x: &ArrayView1<f64>) -> f64 {
//!     x[0] * x[0] + x[1] * x[1]
//! }
//!
//! let xlimits = array![[-3., 3.], [-3., 3.]];
//! let res = BoBuilder::optimize(quadratic)
//!     .configure(|config| config.n_initial(3).seed(42))
//!     .min_within(&xlimits)
//!     .expect("valid optimizer settings")
//!     .run(10)
//!     .expect("quadratic minimized");
//! println!("min f(x)={} at x={}", res.y_opt, res.x_opt);
//! ```
//!
//! Objectives carrying their own bounds or able to fail implement the
//! [`Objective`] trait and are optimized with `min()`. A run can also be
//! started from already evaluated points with [`BayesOpt::run_with_data`].
use crate::errors::{BoError, Result};
use crate::types::*;
use crate::utils::{find_best_index, IterationRecord};
use crate::{BoConfig, BoSolver, BoState, Domain};

use argmin::argmin_error;
use argmin::core::{Executor, State};
use bayesbox_gp::kernels::{Kernel, SquaredExponentialKernel};
use log::info;
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, Data, Ix2};
use serde::{de::DeserializeOwned, Serialize};

/// Bayesian optimizer builder allowing to specify the function to be minimized
/// and the configuration of the optimization loop.
pub struct BoBuilder<O> {
    objective: O,
    config: BoConfig,
}

impl<O> BoBuilder<O> {
    /// Objective to be minimized, either a function `f(x) -> y` to be bounded
    /// with `min_within()` or an [`Objective`] to be used with `min()`
    pub fn optimize(objective: O) -> Self {
        BoBuilder {
            objective,
            config: BoConfig::default(),
        }
    }

    /// Set configuration of the optimizer
    pub fn configure<F: FnOnce(BoConfig) -> BoConfig>(mut self, init: F) -> Self {
        self.config = init(self.config);
        self
    }
}

impl<O: Objective> BoBuilder<O> {
    /// Build an optimizer of the objective within its own bounds using
    /// a squared exponential kernel with the configured length scale.
    pub fn min(self) -> Result<BayesOpt<O, SquaredExponentialKernel<f64>>> {
        let kernel = SquaredExponentialKernel::new(self.config.length_scale);
        self.min_with_kernel(kernel)
    }

    /// Build an optimizer of the objective within its own bounds using the given kernel
    pub fn min_with_kernel<K: Kernel<f64>>(self, kernel: K) -> Result<BayesOpt<O, K>> {
        let config = self.config.check()?;
        let domain = Domain::new(self.objective.lower(), self.objective.upper())?;
        Ok(BayesOpt {
            solver: BoSolver::new(config, domain, kernel)?,
            objective: self.objective,
        })
    }
}

impl<F: Fn(&ArrayView1<f64>) -> f64> BoBuilder<F> {
    /// Build an optimizer to minimize the function within
    /// the continuous `xlimits` specified as [[lower, upper], ...] array where the
    /// number of rows gives the dimension of the inputs
    /// and the ith row is the interval of the ith component of the input x.
    pub fn min_within(
        self,
        xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    ) -> Result<BayesOpt<BoundedFn<F>, SquaredExponentialKernel<f64>>> {
        let domain = Domain::from_xlimits(xlimits)?;
        BoBuilder {
            objective: BoundedFn::new(
                self.objective,
                domain.lower().to_owned(),
                domain.upper().to_owned(),
            ),
            config: self.config,
        }
        .min()
    }
}

/// Bayesian optimizer structure used to parameterize the underlying `argmin::Solver`
/// and trigger the optimization using `argmin::Executor`.
pub struct BayesOpt<O: Objective, K: Kernel<f64>> {
    objective: O,
    solver: BoSolver<K>,
}

impl<O: Objective, K: Kernel<f64> + Serialize + DeserializeOwned> BayesOpt<O, K> {
    /// Runs the optimization for `num_iterations` objective evaluations,
    /// initial design included.
    pub fn run(&self, num_iterations: usize) -> Result<OptimResult> {
        self.run_with_data(num_iterations, None, None)
    }

    /// Runs the optimization starting from already evaluated points `x` (n, D)
    /// with values `y` (n,) instead of a random initial design.
    ///
    /// The main loop still starts at iteration `n_initial` whatever the number
    /// of given points.
    ///
    /// # Errors
    ///
    /// [`BoError::InvalidArgument`] when only one of `x` and `y` is given, when they
    /// are empty or when their shapes do not match the domain.
    pub fn run_with_data(
        &self,
        num_iterations: usize,
        x: Option<Array2<f64>>,
        y: Option<Array1<f64>>,
    ) -> Result<OptimResult> {
        let data = match (x, y) {
            (None, None) => None,
            (Some(x), Some(y)) => Some(self.check_seed(x, y)?),
            _ => {
                return Err(BoError::InvalidArgument(
                    "Seed data requires both points and values".to_string(),
                ))
            }
        };
        info!("{:?}", *self.solver.config);

        let recorder = self.solver.recorder();
        recorder.clear();
        let max_iters = num_iterations.saturating_sub(self.solver.config.n_initial) as u64;
        let exec = Executor::new(ObjFunc::new(&self.objective), self.solver.clone()).configure(
            |state: BoState<f64>| {
                let state = state.max_iters(max_iters);
                match data {
                    Some(data) => state.data(data),
                    None => state,
                }
            },
        );
        let result = exec.run().map_err(BoError::from_argmin)?;
        info!("{}", result);

        let (x_data, y_data) = result.state.data.clone().ok_or_else(|| {
            BoError::ArgminError(argmin_error!(PotentialBug, "BayesOpt: No data!"))
        })?;
        let best = find_best_index(&y_data).ok_or_else(|| {
            BoError::InvalidArgument("No comparable objective value was observed".to_string())
        })?;
        let res = OptimResult {
            x_opt: x_data.row(best).to_owned(),
            y_opt: y_data[best],
            x_data,
            y_data,
            records: recorder.records(),
            state: result.state,
        };
        info!(
            "Return {} as incumbent with value {} after {} evaluations",
            res.x_opt,
            res.y_opt,
            res.state.get_func_counts().get("cost_count").unwrap_or(&0)
        );
        Ok(res)
    }

    /// Records of the last run, available even when the run failed
    pub fn history(&self) -> Vec<IterationRecord> {
        self.solver.recorder().records()
    }

    fn check_seed(&self, x: Array2<f64>, y: Array1<f64>) -> Result<(Array2<f64>, Array1<f64>)> {
        if x.nrows() == 0 {
            return Err(BoError::InvalidArgument(
                "Seed data should contain at least one point".to_string(),
            ));
        }
        if x.nrows() != y.len() {
            return Err(BoError::InvalidArgument(format!(
                "Seed data mismatch: {} points for {} values",
                x.nrows(),
                y.len()
            )));
        }
        if x.ncols() != self.solver.domain().dim() {
            return Err(BoError::InvalidArgument(format!(
                "Seed points of dimension {} do not match domain dimension {}",
                x.ncols(),
                self.solver.domain().dim()
            )));
        }
        Ok((x, y))
    }
}
