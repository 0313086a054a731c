use crate::criteria::AcquisitionFunction;
use crate::domain::Domain;
use crate::errors::{BoError, Result};
use crate::optimizers::Maximizer;

use bayesbox_gp::{GpError, SurrogateModel};
use log::debug;
use ndarray::{concatenate, Array1, Array2, Axis};
use ndarray_rand::rand::Rng;
use ndarray_rand::rand_distr::Normal;
use ndarray_rand::RandomExt;

/// Share of the samples drawn uniformly over the whole domain
pub const EXPLORATION_RATIO: f64 = 0.7;
/// Standard deviation of the gaussian samples drawn around the incumbent
pub const EXPLOITATION_STDDEV: f64 = 0.1;

/// Maximize an acquisition function by evaluating it on random candidates.
///
/// `floor(0.7 * n_samples)` candidates are drawn uniformly over the domain,
/// the remaining ones are drawn from a gaussian centered on the incumbent
/// location of the surrogate model then clamped into the domain.
/// The candidate with the largest acquisition value is returned, the first one
/// in sampling order when several are equal.
pub struct RandomSampling<'b, A> {
    acquisition: &'b A,
    domain: &'b Domain,
    n_samples: usize,
}

impl<'b, A> RandomSampling<'b, A> {
    /// Random sampling maximizer of `acquisition` over `domain` using `n_samples` candidates
    ///
    /// # Errors
    ///
    /// [`BoError::InvalidArgument`] when `n_samples` is zero.
    pub fn new(acquisition: &'b A, domain: &'b Domain, n_samples: usize) -> Result<Self> {
        if n_samples == 0 {
            return Err(BoError::InvalidArgument(
                "Random sampling requires at least one sample".to_string(),
            ));
        }
        Ok(RandomSampling {
            acquisition,
            domain,
            n_samples,
        })
    }

    /// Number of candidates evaluated
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    fn candidates<'a, R: Rng>(&self, rng: &mut R) -> Result<Array2<f64>>
    where
        A: AcquisitionFunction<'a> + 'a,
    {
        let n_explore = (EXPLORATION_RATIO * self.n_samples as f64).floor() as usize;
        let n_exploit = self.n_samples - n_explore;

        let explore = self.domain.sample_uniform(n_explore, rng);

        let model = self.acquisition.model().ok_or(GpError::NotTrained)?;
        let (x_best, _) = model.incumbent()?;
        let normal = Normal::new(0., EXPLOITATION_STDDEV)
            .map_err(|err| BoError::InvalidArgument(err.to_string()))?;
        let mut exploit =
            Array2::random_using((n_exploit, self.domain.dim()), normal, rng) + &x_best;
        exploit
            .rows_mut()
            .into_iter()
            .for_each(|mut row| self.domain.clamp(&mut row));

        Ok(concatenate![Axis(0), explore, exploit])
    }
}

impl<'a, 'b, A: AcquisitionFunction<'a> + 'a> Maximizer for RandomSampling<'b, A> {
    fn name(&self) -> &'static str {
        "RandomSampling"
    }

    fn maximize<R: Rng>(&self, rng: &mut R) -> Result<Array1<f64>> {
        let candidates = self.candidates(rng)?;
        let mut best = (0, f64::NEG_INFINITY);
        for (i, x) in candidates.rows().into_iter().enumerate() {
            let value = self.acquisition.compute(&x)?;
            if value > best.1 {
                best = (i, value);
            }
        }
        debug!(
            "{} best {} = {} among {} candidates",
            self.name(),
            self.acquisition.name(),
            best.1,
            self.n_samples
        );
        Ok(candidates.row(best.0).to_owned())
    }
}
