//! This library implements sequential bayesian optimization of expensive
//! black-box functions defined over a box domain.
//!
//! Starting from an initial design drawn uniformly over the domain, each iteration:
//! * trains a [Gaussian process](bayesbox_gp::GaussianProcess) surrogate on all
//!   observations made so far,
//! * scores candidates with the [Expected Improvement](criteria::ExpectedImprovement)
//!   acquisition function bound to the trained surrogate,
//! * picks the next point with the [random sampling](optimizers::RandomSampling) maximizer
//!   mixing uniform samples and samples around the incumbent,
//! * evaluates the objective at that point and updates the incumbent.
//!
//! The loop is implemented as an [argmin](https://www.argmin-rs.org/) solver ([BoSolver])
//! over the [BoState] iteration state and is usually run through the [BoBuilder] facade.
//!
//! ```
//! use ndarray::{array, ArrayView1};
//! use bayesbox_bo::BoBuilder;
//!
//! // smooth multimodal function of one variable
//! fn f(x: &ArrayView1<f64>) -> f64 {
//!     (x[0] - 1.5).powi(2) + (3. * x[0]).sin()
//! }
//!
//! let bo = BoBuilder::optimize(f)
//!     .configure(|config| config.n_initial(4).n_samples(200).seed(42))
//!     .min_within(&array![[-2., 4.]])
//!     .expect("valid optimizer settings");
//! let res = bo.run(12).expect("f minimized");
//!
//! assert_eq!(res.y_data.len(), 12);
//! assert!(res.incumbent_values().windows(2).into_iter().all(|w| w[1] <= w[0]));
//! ```
//!
//! Every evaluation is recorded as an [IterationRecord] (candidate, value, timings,
//! incumbent) readable from the result or, when the run failed, from [BayesOpt::history].
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod bo;
pub mod criteria;
mod domain;
mod errors;
pub mod optimizers;
mod solver;
mod types;
mod utils;

pub use crate::bo::*;
pub use crate::domain::*;
pub use crate::errors::*;
pub use crate::solver::*;
pub use crate::types::*;
pub use crate::utils::{find_best_index, norm_cdf, norm_pdf, IterationRecord, RunRecorder};
