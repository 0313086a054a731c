use thiserror::Error;

/// A result type for GP surrogate modeling
pub type Result<T> = std::result::Result<T, GpError>;

/// An error when using [`GaussianProcess`](crate::GaussianProcess) or its building blocks
#[derive(Error, Debug)]
pub enum GpError {
    /// When caller input is malformed (shapes, bounds, negative regularization)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// When output normalization is requested on constant training values
    #[error("Degenerate data: {0}")]
    DegenerateData(String),
    /// When the regularized covariance matrix is not positive definite
    #[error("Singular covariance: {0}")]
    SingularCovariance(String),
    /// When prediction is requested on a model never trained successfully
    #[error("Model is not trained")]
    NotTrained,
    /// When linear algebra computation fails
    #[error(transparent)]
    LinalgError(#[from] linfa_linalg::LinalgError),
    /// When a linfa error occurs
    #[error(transparent)]
    LinfaError(#[from] linfa::error::Error),
}
