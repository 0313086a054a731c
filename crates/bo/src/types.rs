use crate::errors::BoError;
use crate::utils::IterationRecord;
use crate::BoState;
use argmin::core::CostFunction;
use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Optimization result
#[derive(Clone, Debug)]
pub struct OptimResult {
    /// Optimum x value
    pub x_opt: Array1<f64>,
    /// Optimum y value (e.g. f(x_opt))
    pub y_opt: f64,
    /// History of successive x values
    pub x_data: Array2<f64>,
    /// History of successive y values (e.g f(x_data))
    pub y_data: Array1<f64>,
    /// Records of the iterations evaluated by this run
    pub records: Vec<IterationRecord>,
    /// BoSolver final state
    pub state: BoState<f64>,
}

impl OptimResult {
    /// Incumbent point after each recorded iteration
    pub fn incumbents(&self) -> Vec<Array1<f64>> {
        self.records.iter().map(|r| r.incumbent.clone()).collect()
    }

    /// Incumbent value after each recorded iteration
    pub fn incumbent_values(&self) -> Array1<f64> {
        self.records.iter().map(|r| r.incumbent_value).collect()
    }

    /// Elapsed time since the start of the run after each recorded iteration
    pub fn runtimes(&self) -> Vec<Duration> {
        self.records.iter().map(|r| r.runtime).collect()
    }

    /// Time spent choosing the candidate of each recorded iteration
    pub fn overheads(&self) -> Vec<Duration> {
        self.records
            .iter()
            .map(|r| r.optimization_overhead)
            .collect()
    }
}

/// Acquisition function used to score candidate points
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquisitionStrategy {
    /// Expected Improvement
    #[default]
    ExpectedImprovement,
}

/// Optimizer used to maximize the acquisition function
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaximizerKind {
    /// Best of uniform samples over the domain and gaussian samples around the incumbent
    #[default]
    RandomSampling,
}

/// An interface for the expensive black-box function to be minimized
/// over a box domain.
pub trait Objective {
    /// Objective value at `x`
    fn evaluate(&self, x: &ArrayView1<f64>) -> anyhow::Result<f64>;

    /// Lower bounds of the domain
    fn lower(&self) -> Array1<f64>;

    /// Upper bounds of the domain
    fn upper(&self) -> Array1<f64>;
}

/// An objective built from a plain function and domain bounds
#[derive(Clone)]
pub struct BoundedFn<F: Fn(&ArrayView1<f64>) -> f64> {
    f: F,
    lower: Array1<f64>,
    upper: Array1<f64>,
}

impl<F: Fn(&ArrayView1<f64>) -> f64> BoundedFn<F> {
    /// Objective `f` defined over `[lower, upper]`
    pub fn new(f: F, lower: Array1<f64>, upper: Array1<f64>) -> Self {
        BoundedFn { f, lower, upper }
    }
}

impl<F: Fn(&ArrayView1<f64>) -> f64> Objective for BoundedFn<F> {
    fn evaluate(&self, x: &ArrayView1<f64>) -> anyhow::Result<f64> {
        Ok((self.f)(x))
    }

    fn lower(&self) -> Array1<f64> {
        self.lower.clone()
    }

    fn upper(&self) -> Array1<f64> {
        self.upper.clone()
    }
}

/// A structure wrapping the objective for implementing
/// `argmin::CostFunction` to be used with argmin framework.
pub struct ObjFunc<'a, O: Objective> {
    fobj: &'a O,
}

impl<'a, O: Objective> ObjFunc<'a, O> {
    /// Constructor given the objective function
    pub fn new(fobj: &'a O) -> Self {
        ObjFunc { fobj }
    }
}

impl<O: Objective> CostFunction for ObjFunc<'_, O> {
    /// Type of the parameter vector
    type Param = Array1<f64>;
    /// Type of the return value computed by the cost function
    type Output = f64;

    /// Apply the cost function to a parameter `p`
    fn cost(&self, p: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        self.fobj
            .evaluate(&p.view())
            .map_err(|err| BoError::ObjectiveError(err).into())
    }
}
