//! This library implements [Gaussian Process](https://en.wikipedia.org/wiki/Gaussian_process) regression
//! used as the surrogate model of a bayesian optimization loop.
//!
//! The model is made of the following building blocks:
//! * [normalization]: pure transforms mapping inputs onto the unit hypercube and
//!   outputs to centered and scaled values,
//! * [kernels]: stationary covariance functions k(x, x') with a single length-scale,
//! * [CovarianceSolver]: Cholesky factorization of the regularized kernel matrix
//!   and the induced regression weights,
//! * [GaussianProcess]: owns the training data, recovers from singular covariance
//!   matrices by escalating its noise and exposes the [SurrogateModel] capabilities.
//!
//! GP models are parameterized by [GpParams] validated into [GpValidParams]
//! following [linfa](https://github.com/rust-ml/linfa) conventions.
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod algorithm;
mod covariance;
mod errors;
pub mod kernels;
pub mod normalization;
mod parameters;

pub use algorithm::*;
pub use covariance::*;
pub use errors::*;
pub use parameters::*;
