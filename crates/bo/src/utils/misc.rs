use libm::erfc;
use linfa::Float;
use ndarray::{ArrayBase, Data, Ix1};

const SQRT_2PI: f64 = 2.5066282746310007;

/// Cumulative distribution function of Standard Normal at x
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Probability density function of Standard Normal at x
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / SQRT_2PI
}

/// Index of the minimum of `y`, the first occurrence wins on ties.
/// NaN values are never selected, `None` when no value is comparable.
pub fn find_best_index<F: Float>(y: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Option<usize> {
    let mut best: Option<(usize, F)> = None;
    for (i, &v) in y.iter().enumerate() {
        match best {
            Some((_, b)) if !(v < b) => {}
            _ if v.is_nan() => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_norm_cdf_pdf() {
        assert_abs_diff_eq!(norm_cdf(0.), 0.5, epsilon = 1e-15);
        assert_abs_diff_eq!(norm_cdf(1.96), 0.9750021048517795, epsilon = 1e-12);
        assert_abs_diff_eq!(norm_cdf(-1.96), 1. - 0.9750021048517795, epsilon = 1e-12);
        assert_abs_diff_eq!(norm_pdf(0.), 1. / SQRT_2PI, epsilon = 1e-15);
        assert_abs_diff_eq!(norm_pdf(1.), 0.24197072451914337, epsilon = 1e-15);
    }

    #[test]
    fn test_find_best_index() {
        assert_eq!(find_best_index(&array![3., 1., 2., 1.]), Some(1));
        assert_eq!(find_best_index(&array![f64::NAN, 2., 0.5]), Some(2));
        assert_eq!(find_best_index(&array![f64::NAN]), None);
        assert_eq!(find_best_index(&ndarray::Array1::<f64>::zeros(0)), None);
    }
}
