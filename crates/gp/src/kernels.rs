//! A module for stationary kernels used as covariance functions of the GP model.
//!
//! All kernels are isotropic and driven by a single length-scale `l`,
//! with `r = |a - b|` the euclidean distance between two points:
//! * squared exponential (gaussian): `exp(-r^2 / (2 l^2))`,
//! * absolute exponential: `exp(-r / l)`,
//! * matern 3/2: `(1 + sqrt(3) r / l) exp(-sqrt(3) r / l)`,
//! * matern 5/2: `(1 + sqrt(5) r / l + 5 r^2 / (3 l^2)) exp(-sqrt(5) r / l)`.
//!
//! Each kernel satisfies `k(a, a) = 1`.

use linfa::Float;
use ndarray::{Array2, ArrayBase, Data, Ix1, Ix2, Zip};
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;

/// A trait for a symmetric positive semi-definite similarity function `k(a, b)`
pub trait Kernel<F: Float>: Clone + Copy + Default + fmt::Debug + fmt::Display + Sync {
    /// Kernel value between points `a` and `b`
    fn value(
        &self,
        a: &ArrayBase<impl Data<Elem = F>, Ix1>,
        b: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> F;

    /// Kernel matrix `K[i, j] = k(xa_i, xb_j)` between rows of `xa` (na, nx) and `xb` (nb, nx)
    fn matrix(
        &self,
        xa: &ArrayBase<impl Data<Elem = F>, Ix2>,
        xb: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Array2<F> {
        let mut k = Array2::zeros((xa.nrows(), xb.nrows()));
        Zip::from(k.rows_mut()).and(xa.rows()).for_each(|mut ki, ai| {
            Zip::from(&mut ki)
                .and(xb.rows())
                .for_each(|kij, bj| *kij = self.value(&ai, &bj));
        });
        k
    }
}

fn distance<F: Float>(
    a: &ArrayBase<impl Data<Elem = F>, Ix1>,
    b: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> F {
    squared_distance(a, b).sqrt()
}

fn squared_distance<F: Float>(
    a: &ArrayBase<impl Data<Elem = F>, Ix1>,
    b: &ArrayBase<impl Data<Elem = F>, Ix1>,
) -> F {
    Zip::from(a)
        .and(b)
        .fold(F::zero(), |acc, &ai, &bi| acc + (ai - bi) * (ai - bi))
}

macro_rules! declare_kernel {
    ($kernel:ident, $name:literal, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, PartialEq)]
        #[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
        pub struct $kernel<F: Float> {
            /// Length-scale of the kernel
            pub length_scale: F,
        }

        impl<F: Float> $kernel<F> {
            /// Kernel with the given length-scale
            pub fn new(length_scale: F) -> Self {
                $kernel { length_scale }
            }
        }

        impl<F: Float> Default for $kernel<F> {
            fn default() -> Self {
                $kernel {
                    length_scale: F::one(),
                }
            }
        }

        impl<F: Float> fmt::Display for $kernel<F> {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}(l={})", $name, self.length_scale)
            }
        }

        impl<F: Float> TryFrom<String> for $kernel<F> {
            type Error = &'static str;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                if s == $name {
                    Ok(Self::default())
                } else {
                    Err(concat!("Bad string value for ", stringify!($kernel), ", should be '", $name, "'"))
                }
            }
        }
    };
}

declare_kernel!(
    SquaredExponentialKernel,
    "SquaredExponential",
    "Squared exponential (gaussian) kernel"
);
declare_kernel!(
    AbsoluteExponentialKernel,
    "AbsoluteExponential",
    "Absolute exponential kernel"
);
declare_kernel!(Matern32Kernel, "Matern32", "Matern 3/2 kernel");
declare_kernel!(Matern52Kernel, "Matern52", "Matern 5/2 kernel");

impl<F: Float> Kernel<F> for SquaredExponentialKernel<F> {
    fn value(
        &self,
        a: &ArrayBase<impl Data<Elem = F>, Ix1>,
        b: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> F {
        let l2 = self.length_scale * self.length_scale;
        F::exp(F::cast(-0.5) * squared_distance(a, b) / l2)
    }
}

impl<F: Float> Kernel<F> for AbsoluteExponentialKernel<F> {
    fn value(
        &self,
        a: &ArrayBase<impl Data<Elem = F>, Ix1>,
        b: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> F {
        F::exp(-distance(a, b) / self.length_scale)
    }
}

impl<F: Float> Kernel<F> for Matern32Kernel<F> {
    fn value(
        &self,
        a: &ArrayBase<impl Data<Elem = F>, Ix1>,
        b: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> F {
        let s = F::cast(3.).sqrt() * distance(a, b) / self.length_scale;
        (F::one() + s) * F::exp(-s)
    }
}

impl<F: Float> Kernel<F> for Matern52Kernel<F> {
    fn value(
        &self,
        a: &ArrayBase<impl Data<Elem = F>, Ix1>,
        b: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> F {
        let s = F::cast(5.).sqrt() * distance(a, b) / self.length_scale;
        (F::one() + s + s * s / F::cast(3.)) * F::exp(-s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use paste::paste;

    #[test]
    fn test_squared_exponential() {
        let k = SquaredExponentialKernel::default();
        let v: f64 = k.value(&array![0., 0.], &array![1., 1.]);
        assert_abs_diff_eq!(v, f64::exp(-1.), epsilon = 1e-12);

        let k = SquaredExponentialKernel::new(2.);
        let v: f64 = k.value(&array![0.], &array![2.]);
        assert_abs_diff_eq!(v, f64::exp(-0.5), epsilon = 1e-12);
    }

    #[test]
    fn test_matern32() {
        let k = Matern32Kernel::default();
        let v: f64 = k.value(&array![0.], &array![1.]);
        let s = 3f64.sqrt();
        assert_abs_diff_eq!(v, (1. + s) * f64::exp(-s), epsilon = 1e-12);
    }

    #[test]
    fn test_kernel_matrix() {
        let xa = array![[0.], [1.], [3.]];
        let xb = array![[0.], [2.]];
        let k = AbsoluteExponentialKernel::default().matrix(&xa, &xb);
        let expected = array![
            [1., f64::exp(-2.)],
            [f64::exp(-1.), f64::exp(-1.)],
            [f64::exp(-3.), f64::exp(-1.)]
        ];
        assert_abs_diff_eq!(k, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_kernel_from_string() {
        let k = SquaredExponentialKernel::<f64>::try_from("SquaredExponential".to_string());
        assert_eq!(k, Ok(SquaredExponentialKernel::default()));
        assert!(Matern52Kernel::<f64>::try_from("Matern32".to_string()).is_err());
    }

    macro_rules! test_kernel {
        ($kernel:ident) => {
            paste! {
                #[test]
                fn [<test_ $kernel:snake _properties>]() {
                    let k = $kernel::new(0.7);
                    let xt = array![[0.1, -0.3], [1.2, 0.4], [-2.0, 0.9], [0.5, 0.5]];
                    let m: Array2<f64> = k.matrix(&xt, &xt);
                    // unit diagonal, symmetric, values in (0, 1]
                    for i in 0..xt.nrows() {
                        assert_abs_diff_eq!(m[[i, i]], 1., epsilon = 1e-12);
                        for j in 0..xt.nrows() {
                            assert_abs_diff_eq!(m[[i, j]], m[[j, i]], epsilon = 1e-12);
                            assert!(m[[i, j]] > 0. && m[[i, j]] <= 1.);
                        }
                    }
                    // decreasing with distance
                    let near = k.value(&array![0., 0.], &array![0.1, 0.]);
                    let far = k.value(&array![0., 0.], &array![1., 0.]);
                    assert!(near > far);
                }
            }
        };
    }

    test_kernel!(SquaredExponentialKernel);
    test_kernel!(AbsoluteExponentialKernel);
    test_kernel!(Matern32Kernel);
    test_kernel!(Matern52Kernel);
}
