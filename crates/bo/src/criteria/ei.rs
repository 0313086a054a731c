use crate::criteria::AcquisitionFunction;
use crate::errors::{BoError, Result};
use crate::utils::{norm_cdf, norm_pdf};
use bayesbox_gp::{GpError, SurrogateModel};
use ndarray::{ArrayView1, Axis};

/// Expected Improvement under the gaussian posterior of the surrogate model
///
/// With `m` and `s` the predicted mean and standard deviation at `x` and
/// `eta` the incumbent value of the model:
///
/// `EI(x) = s (z Phi(z) + phi(z))` with `z = (eta - m - xi) / s`
///
/// where `Phi` and `phi` are the standard normal cdf and pdf, and `EI(x) = 0`
/// when there is no uncertainty at `x`. The `xi` parameter trades
/// exploitation for exploration as it grows.
#[derive(Clone, Debug)]
pub struct ExpectedImprovement<'a, M: SurrogateModel<f64>> {
    model: Option<&'a M>,
    xi: f64,
}

impl<'a, M: SurrogateModel<f64>> ExpectedImprovement<'a, M> {
    /// Unbound Expected Improvement with exploration parameter `xi`
    pub fn new(xi: f64) -> Self {
        ExpectedImprovement { model: None, xi }
    }

    /// Expected Improvement bound to `model`
    pub fn with_model(model: &'a M, xi: f64) -> Self {
        ExpectedImprovement {
            model: Some(model),
            xi,
        }
    }

    /// Exploration parameter
    pub fn xi(&self) -> f64 {
        self.xi
    }
}

impl<M: SurrogateModel<f64>> Default for ExpectedImprovement<'_, M> {
    fn default() -> Self {
        Self::new(0.)
    }
}

impl<'a, M: SurrogateModel<f64>> AcquisitionFunction<'a> for ExpectedImprovement<'a, M> {
    type Model = M;

    fn name(&self) -> &'static str {
        "EI"
    }

    fn update(&mut self, model: &'a M) {
        self.model = Some(model);
    }

    fn model(&self) -> Option<&'a M> {
        self.model
    }

    fn compute(&self, x: &ArrayView1<f64>) -> Result<f64> {
        let model = self.model.ok_or(BoError::GpError(GpError::NotTrained))?;
        let (m, v) = model.predict(&x.view().insert_axis(Axis(0)))?;
        let s = v[0].sqrt();
        // negative variances are round-off, NaN sqrt falls here too
        if !(s > 0.) {
            return Ok(0.);
        }
        let (_, eta) = model.incumbent()?;
        let z = (eta - m[0] - self.xi) / s;
        Ok((s * (z * norm_cdf(z) + norm_pdf(z))).max(0.))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use bayesbox_gp::kernels::SquaredExponentialKernel;
    use bayesbox_gp::GaussianProcess;
    use linfa::ParamGuard;
    use ndarray::{array, Array1};

    fn trained_gp() -> GaussianProcess<f64, SquaredExponentialKernel<f64>> {
        let params = GaussianProcess::params(SquaredExponentialKernel::new(0.2))
            .bounds(array![-3.], array![3.])
            .check()
            .unwrap();
        let mut gp = GaussianProcess::new(params);
        let xt = array![[-3.], [-1.], [0.5], [2.], [3.]];
        let yt = xt.column(0).mapv(|v| v * v);
        gp.train(&xt, &yt).unwrap();
        gp
    }

    #[test]
    fn test_unbound() {
        let ei = ExpectedImprovement::<GaussianProcess<f64, SquaredExponentialKernel<f64>>>::default();
        assert!(ei.compute(&array![0.].view()).is_err());
    }

    #[test]
    fn test_ei_non_negative() {
        let gp = trained_gp();
        for xi in [0., 0.01, 1.] {
            let ei = ExpectedImprovement::with_model(&gp, xi);
            for x in Array1::linspace(-3., 3., 61).iter() {
                let v = ei.compute(&array![*x].view()).unwrap();
                assert!(v >= 0., "EI({x}) = {v} with xi = {xi}");
            }
        }
    }

    #[test]
    fn test_ei_at_training_point() {
        let gp = trained_gp();
        let ei = ExpectedImprovement::with_model(&gp, 0.);
        // no uncertainty where the objective was observed
        let v = ei.compute(&array![2.].view()).unwrap();
        assert_abs_diff_eq!(v, 0., epsilon = 1e-6);
    }

    #[test]
    fn test_ei_closed_form() {
        let gp = trained_gp();
        let ei = ExpectedImprovement::with_model(&gp, 0.);
        let x = array![-2.];
        let (m, v) = gp.predict(&x.clone().insert_axis(Axis(0))).unwrap();
        let s = v[0].sqrt();
        let eta = 0.25;
        let z = (eta - m[0]) / s;
        let expected = s * (z * norm_cdf(z) + norm_pdf(z));
        assert_abs_diff_eq!(ei.compute(&x.view()).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_ei_update_rebinds_model() {
        let gp = trained_gp();
        let mut ei = ExpectedImprovement::new(0.);
        assert!(ei.model().is_none());
        ei.update(&gp);
        assert!(ei.model().is_some());
        assert_eq!(ei.name(), "EI");
        assert!(ei.compute(&array![-2.].view()).unwrap() > 0.);
    }
}
