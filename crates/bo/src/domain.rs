//! Bounded continuous search space.

use crate::errors::{BoError, Result};
use ndarray::{Array, Array1, Array2, ArrayBase, Axis, Data, DataMut, Ix1, Ix2, Zip};
use ndarray_rand::{rand::Rng, rand_distr::Uniform, RandomExt};
use serde::{Deserialize, Serialize};

/// Box domain `[lower_i, upper_i]` for each of the `D` components of a point,
/// with `lower_i < upper_i`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    lower: Array1<f64>,
    upper: Array1<f64>,
}

impl Domain {
    /// Domain from lower and upper bounds
    ///
    /// # Errors
    ///
    /// [`BoError::InvalidArgument`] when bounds are empty, have different lengths,
    /// are not finite or when `lower_i >= upper_i` for some component.
    pub fn new(lower: Array1<f64>, upper: Array1<f64>) -> Result<Self> {
        if lower.len() != upper.len() {
            return Err(BoError::InvalidArgument(format!(
                "Dimension mismatch between lower ({}) and upper ({}) bounds",
                lower.len(),
                upper.len()
            )));
        }
        if lower.is_empty() {
            return Err(BoError::InvalidArgument(
                "Domain should have at least one dimension".to_string(),
            ));
        }
        if let Some(i) = lower
            .iter()
            .zip(upper.iter())
            .position(|(l, u)| !(l.is_finite() && u.is_finite() && l < u))
        {
            return Err(BoError::InvalidArgument(format!(
                "Lower bound >= Upper bound or not finite for component {}: [{}, {}]",
                i, lower[i], upper[i]
            )));
        }
        Ok(Domain { lower, upper })
    }

    /// Domain from `xlimits` given as a (D, 2) array `[[lower_1, upper_1], ...]`
    pub fn from_xlimits(xlimits: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Result<Self> {
        if xlimits.ncols() != 2 {
            return Err(BoError::InvalidArgument(format!(
                "xlimits must have 2 columns (lower, upper), got {}",
                xlimits.ncols()
            )));
        }
        Domain::new(xlimits.column(0).to_owned(), xlimits.column(1).to_owned())
    }

    /// Dimension `D` of the points
    pub fn dim(&self) -> usize {
        self.lower.len()
    }

    /// Lower bounds
    pub fn lower(&self) -> &Array1<f64> {
        &self.lower
    }

    /// Upper bounds
    pub fn upper(&self) -> &Array1<f64> {
        &self.upper
    }

    /// Bounds as a (D, 2) array
    pub fn xlimits(&self) -> Array2<f64> {
        ndarray::stack![Axis(1), self.lower, self.upper]
    }

    /// Whether `x` lies within the domain bounds
    pub fn contains(&self, x: &ArrayBase<impl Data<Elem = f64>, Ix1>) -> bool {
        x.len() == self.dim()
            && Zip::from(x)
                .and(&self.lower)
                .and(&self.upper)
                .all(|&v, &l, &u| l <= v && v <= u)
    }

    /// Clamp each component of `x` into the domain bounds
    pub fn clamp(&self, x: &mut ArrayBase<impl DataMut<Elem = f64>, Ix1>) {
        Zip::from(x)
            .and(&self.lower)
            .and(&self.upper)
            .for_each(|v, &l, &u| *v = (*v).clamp(l, u));
    }

    /// `n` points (n, D) drawn uniformly at random over the domain
    pub fn sample_uniform<R: Rng>(&self, n: usize, rng: &mut R) -> Array2<f64> {
        let unit = Array::random_using((n, self.dim()), Uniform::new(0., 1.), rng);
        unit * &(&self.upper - &self.lower) + &self.lower
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use ndarray_rand::rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn test_invalid_domains() {
        assert!(matches!(
            Domain::new(array![0., 0.], array![1.]),
            Err(BoError::InvalidArgument(_))
        ));
        assert!(matches!(
            Domain::new(Array1::zeros(0), Array1::zeros(0)),
            Err(BoError::InvalidArgument(_))
        ));
        assert!(matches!(
            Domain::new(array![0., 1.], array![1., 1.]),
            Err(BoError::InvalidArgument(_))
        ));
        assert!(matches!(
            Domain::new(array![0., f64::NAN], array![1., 1.]),
            Err(BoError::InvalidArgument(_))
        ));
        assert!(matches!(
            Domain::from_xlimits(&array![[0., 1., 2.]]),
            Err(BoError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_sample_uniform() {
        let domain = Domain::from_xlimits(&array![[-3., 3.], [10., 11.]]).unwrap();
        assert_eq!(domain.dim(), 2);
        assert_eq!(domain.xlimits(), array![[-3., 3.], [10., 11.]]);

        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let x = domain.sample_uniform(50, &mut rng);
        assert_eq!(x.dim(), (50, 2));
        assert!(x.rows().into_iter().all(|row| domain.contains(&row)));
    }

    #[test]
    fn test_clamp() {
        let domain = Domain::new(array![0., -1.], array![1., 1.]).unwrap();
        let mut x = array![1.5, -0.5];
        assert!(!domain.contains(&x));
        domain.clamp(&mut x);
        assert_eq!(x, array![1., -0.5]);
        assert!(domain.contains(&x));
    }
}
