use thiserror::Error;

/// A result type for bayesian optimization errors
pub type Result<T> = std::result::Result<T, BoError>;

/// An error for bayesian optimization algorithm
#[derive(Error, Debug)]
pub enum BoError {
    /// When caller input is malformed (bounds, sample budget, seed data)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// When configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfigError(String),
    /// When surrogate model training or prediction fails
    #[error(transparent)]
    GpError(#[from] bayesbox_gp::GpError),
    /// When the objective function fails to evaluate a point
    #[error("Objective evaluation failed: {0}")]
    ObjectiveError(anyhow::Error),
    /// When an Argmin framework is raised
    #[error(transparent)]
    ArgminError(#[from] argmin::core::Error),
}

impl BoError {
    /// Recover the optimization error boxed by the argmin executor
    pub(crate) fn from_argmin(err: argmin::core::Error) -> BoError {
        match err.downcast::<BoError>() {
            Ok(err) => err,
            Err(err) => BoError::ArgminError(err),
        }
    }
}
