//! Acquisition functions scoring how promising a candidate point is
//! given the surrogate model of the objective function
mod ei;

pub use ei::ExpectedImprovement;

use crate::errors::Result;
use bayesbox_gp::SurrogateModel;
use ndarray::ArrayView1;

/// A trait for acquisition function which maximum location will
/// determine the next most promising point expected to be the
/// optimum location of the objective function
pub trait AcquisitionFunction<'a> {
    /// Surrogate model the function scores against
    type Model: SurrogateModel<f64>;

    /// Name of the acquisition function
    fn name(&self) -> &'static str;

    /// Bind the function to `model`, typically after it was retrained
    fn update(&mut self, model: &'a Self::Model);

    /// Currently bound model if any
    fn model(&self) -> Option<&'a Self::Model>;

    /// Acquisition value at given point `x`
    fn compute(&self, x: &ArrayView1<f64>) -> Result<f64>;
}
