//! Optimizers used internally to maximize the acquisition function

mod random_sampling;

pub use random_sampling::*;

use crate::errors::Result;
use ndarray::Array1;
use ndarray_rand::rand::Rng;

/// Search for the point of the domain maximizing an acquisition function
pub trait Maximizer {
    /// Maximizer name
    fn name(&self) -> &'static str;

    /// Point of the domain with the largest acquisition value found
    fn maximize<R: Rng>(&self, rng: &mut R) -> Result<Array1<f64>>;
}
