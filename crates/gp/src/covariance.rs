//! Regularized kernel regression solved through a Cholesky factorization.
//!
//! Given knots `x_i`, targets `y_i`, a kernel `k` and a regularization `lambda >= 0`,
//! the solver factorizes `K + lambda I = L L^T` with `K[i, j] = k(x_i, x_j)`
//! and computes the weights `w` solving `(K + lambda I) w = y`.

use crate::errors::{GpError, Result};
use crate::kernels::Kernel;
use linfa::Float;
use linfa_linalg::{cholesky::*, triangular::*};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2, Zip};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Factorized covariance of the training points and the induced regression weights
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct CovarianceSolver<F: Float, K: Kernel<F>> {
    /// Training points (n, nx)
    knots: Array2<F>,
    kernel: K,
    /// Regularization added to the diagonal
    lambda: F,
    /// Lower triangular Cholesky factor of `K + lambda I`
    chol: Array2<F>,
    /// Regression weights (n,)
    weights: Array1<F>,
}

impl<F: Float, K: Kernel<F>> CovarianceSolver<F, K> {
    /// Factorizes the regularized covariance of `x` (n, nx) and solves against `y` (n,).
    ///
    /// # Errors
    ///
    /// * [`GpError::InvalidArgument`] when sizes mismatch, when there is no point
    ///   or when `lambda` is negative,
    /// * [`GpError::SingularCovariance`] when `K + lambda I` is not positive definite.
    pub fn new(
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        y: &ArrayBase<impl Data<Elem = F>, Ix1>,
        kernel: K,
        lambda: F,
    ) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(GpError::InvalidArgument(format!(
                "The sizes of X and Y don't match: {} != {}",
                x.nrows(),
                y.len()
            )));
        }
        if x.nrows() == 0 {
            return Err(GpError::InvalidArgument(
                "At least one training point is required".to_string(),
            ));
        }
        if lambda < F::zero() || !lambda.is_finite() {
            return Err(GpError::InvalidArgument(format!(
                "Invalid regularization parameter lambda = {lambda}"
            )));
        }

        let mut k = kernel.matrix(x, x);
        k.diag_mut().map_inplace(|v| *v += lambda);

        let chol = k.cholesky().map_err(|err| {
            GpError::SingularCovariance(format!(
                "Cholesky factorization failed with lambda = {lambda}: {err}"
            ))
        })?;
        // a null pivot is accepted by the factorization but leaves L singular
        if chol.diag().iter().any(|&d| !(d > F::zero()) || !d.is_finite()) {
            return Err(GpError::SingularCovariance(format!(
                "Null pivot in Cholesky factor with lambda = {lambda}"
            )));
        }
        let rhs = y.to_owned().insert_axis(Axis(1));
        let rho = chol.solve_triangular(&rhs, UPLO::Lower)?;
        let w = chol.t().solve_triangular(&rho, UPLO::Upper)?;
        let weights = w.column(0).to_owned();
        if weights.iter().any(|v| !v.is_finite()) {
            return Err(GpError::SingularCovariance(format!(
                "Ill-conditioned covariance with lambda = {lambda}"
            )));
        }

        Ok(CovarianceSolver {
            knots: x.to_owned(),
            kernel,
            lambda,
            chol,
            weights,
        })
    }

    /// Training points
    pub fn knots(&self) -> &Array2<F> {
        &self.knots
    }

    /// Regression weights
    pub fn weights(&self) -> &Array1<F> {
        &self.weights
    }

    /// Regularization term added to the covariance diagonal
    pub fn lambda(&self) -> F {
        self.lambda
    }

    fn cross_covariance(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array2<F>> {
        if x.ncols() != self.knots.ncols() {
            return Err(GpError::InvalidArgument(format!(
                "Expected points of dimension {}, got {}",
                self.knots.ncols(),
                x.ncols()
            )));
        }
        Ok(self.kernel.matrix(x, &self.knots))
    }

    /// Predicted means `sum_i w_i k(x, x_i)` at points `x` (n, nx)
    pub fn predict_mean(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array1<F>> {
        let kx = self.cross_covariance(x)?;
        Ok(kx.dot(&self.weights))
    }

    /// Predicted variances `k(x, x) - k_x^T (K + lambda I)^-1 k_x` at points `x` (n, nx)
    ///
    /// Values are not clamped: a slightly negative result reflects round-off.
    pub fn predict_variance(&self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array1<F>> {
        let kx = self.cross_covariance(x)?;
        self.variance_from(x, &kx)
    }

    /// Predicted means and variances at points `x` (n, nx)
    pub fn predict_valvar(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<(Array1<F>, Array1<F>)> {
        let kx = self.cross_covariance(x)?;
        let mean = kx.dot(&self.weights);
        let var = self.variance_from(x, &kx)?;
        Ok((mean, var))
    }

    fn variance_from(
        &self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        kx: &Array2<F>,
    ) -> Result<Array1<F>> {
        // With L z = k_x, k_x^T (L L^T)^-1 k_x = |z|^2
        let z = self.chol.solve_triangular(&kx.t(), UPLO::Lower)?;
        let explained = z.mapv(|v| v * v).sum_axis(Axis(0));
        let mut var = Array1::zeros(x.nrows());
        Zip::from(&mut var)
            .and(x.rows())
            .and(&explained)
            .for_each(|v, xi, &e| *v = self.kernel.value(&xi, &xi) - e);
        Ok(var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::SquaredExponentialKernel;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_weights_solve_system() {
        let x = array![[0.], [0.5], [1.5]];
        let y = array![1., -1., 2.];
        let kernel = SquaredExponentialKernel::default();
        let solver = CovarianceSolver::new(&x, &y, kernel, 0.01).unwrap();

        let mut k = kernel.matrix(&x, &x);
        k.diag_mut().map_inplace(|v| *v += 0.01);
        assert_abs_diff_eq!(k.dot(solver.weights()), y, epsilon = 1e-8);
    }

    #[test]
    fn test_interpolation_without_regularization() {
        let x = array![[0.], [1.], [2.5]];
        let y = array![0.3, -0.2, 1.1];
        let solver = CovarianceSolver::new(&x, &y, SquaredExponentialKernel::default(), 0.).unwrap();
        let (mean, var) = solver.predict_valvar(&x).unwrap();
        assert_abs_diff_eq!(mean, y, epsilon = 1e-8);
        assert_abs_diff_eq!(var, Array1::<f64>::zeros(3), epsilon = 1e-8);

        let far = solver.predict_variance(&array![[10.]]).unwrap();
        assert_abs_diff_eq!(far[0], 1., epsilon = 1e-6);
        let m = solver.predict_mean(&array![[10.]]).unwrap();
        assert_abs_diff_eq!(m[0], 0., epsilon = 1e-6);
    }

    #[test]
    fn test_singular_covariance() {
        let x = array![[1.], [1.]];
        let y = array![0., 0.];
        let res = CovarianceSolver::new(&x, &y, SquaredExponentialKernel::default(), 0.);
        assert!(matches!(res, Err(GpError::SingularCovariance(_))));

        let res = CovarianceSolver::new(&x, &y, SquaredExponentialKernel::default(), 0.1);
        assert!(res.is_ok());
    }

    #[test]
    fn test_invalid_arguments() {
        let kernel = SquaredExponentialKernel::default();
        let res = CovarianceSolver::new(&array![[0.], [1.]], &array![0.], kernel, 0.);
        assert!(matches!(res, Err(GpError::InvalidArgument(_))));
        let res = CovarianceSolver::new(&array![[0.], [1.]], &array![0., 1.], kernel, -1.);
        assert!(matches!(res, Err(GpError::InvalidArgument(_))));

        let solver = CovarianceSolver::new(&array![[0.], [1.]], &array![0., 1.], kernel, 0.).unwrap();
        assert!(matches!(
            solver.predict_mean(&array![[0., 1.]]),
            Err(GpError::InvalidArgument(_))
        ));
    }
}
