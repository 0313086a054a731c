//! Bayesian optimization loop implemented as an argmin solver.
//!
//! An initial design is drawn uniformly over the domain and evaluated, then each
//! iteration trains the GP surrogate on all observations, binds the acquisition
//! function to it and evaluates the objective at the candidate returned by the
//! acquisition maximizer.
//!
//! The solver is meant to be driven by an argmin `Executor`, see [`crate::BayesOpt`]
//! for the usual entry point.
use crate::criteria::ExpectedImprovement;
use crate::domain::Domain;
use crate::errors::Result;
use crate::optimizers::{Maximizer, RandomSampling};
use crate::solver::{BoState, RunPhase, ValidBoConfig};
use crate::types::{AcquisitionStrategy, MaximizerKind};
use crate::utils::{find_best_index, IterationRecord, RunRecorder};

use argmin::argmin_error_closure;
use argmin::core::{CostFunction, Problem, Solver, State, TerminationStatus, KV};
use bayesbox_gp::kernels::Kernel;
use bayesbox_gp::{GaussianProcess, SurrogateModel};
use linfa::ParamGuard;
use log::{debug, info};
use ndarray::{concatenate, s, Array1, Array2, ArrayView1, Axis};
use ndarray_rand::rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use web_time::{Duration, Instant};

/// Implementation of the bayesian optimization loop as an argmin solver
#[derive(Clone, Serialize, Deserialize)]
pub struct BoSolver<K: Kernel<f64>> {
    pub(crate) config: ValidBoConfig,
    /// Search space of the objective
    pub(crate) domain: Domain,
    /// Surrogate of the objective, kept across iterations with its escalated noise
    pub(crate) model: GaussianProcess<f64, K>,
    #[serde(skip)]
    recorder: RunRecorder,
    #[serde(skip)]
    started: Option<Instant>,
}

impl<K: Kernel<f64>> BoSolver<K> {
    /// Solver minimizing over `domain` with a GP surrogate using `kernel`
    pub fn new(config: ValidBoConfig, domain: Domain, kernel: K) -> Result<Self> {
        let params = GaussianProcess::params(kernel)
            .noise(config.noise)
            .normalize_inputs(config.normalize_inputs)
            .normalize_outputs(config.normalize_outputs)
            .bounds(domain.lower().to_owned(), domain.upper().to_owned())
            .max_noise_escalations(config.max_noise_escalations)
            .check()?;
        Ok(BoSolver {
            config,
            domain,
            model: GaussianProcess::new(params),
            recorder: RunRecorder::new(),
            started: None,
        })
    }

    /// Records log shared with the caller
    pub fn recorder(&self) -> RunRecorder {
        self.recorder.clone()
    }

    /// Surrogate model as trained at the last iteration
    pub fn model(&self) -> &GaussianProcess<f64, K> {
        &self.model
    }

    /// Search space
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Choose the next point to evaluate given observations `(x_data, y_data)`.
    ///
    /// With less than 2 observations the point is drawn at random, otherwise
    /// the surrogate is trained on all observations and the acquisition function
    /// bound to it is maximized.
    pub fn choose_next<R: Rng>(
        &mut self,
        x_data: &Array2<f64>,
        y_data: &Array1<f64>,
        do_optimize: bool,
        rng: &mut R,
    ) -> Result<Array1<f64>> {
        if x_data.nrows() < 2 {
            debug!("Not enough observations to train the surrogate, draw next point at random");
            return Ok(self.domain.sample_uniform(1, rng).row(0).to_owned());
        }
        if do_optimize {
            debug!("Kernel hyperparameters kept as is: {}", self.model);
        }
        self.model.train(x_data, y_data)?;
        debug!("Surrogate trained: {}", self.model);

        match (self.config.acquisition, self.config.maximizer) {
            (AcquisitionStrategy::ExpectedImprovement, MaximizerKind::RandomSampling) => {
                let acquisition = ExpectedImprovement::with_model(&self.model, self.config.xi);
                RandomSampling::new(&acquisition, &self.domain, self.config.n_samples)?
                    .maximize(rng)
            }
        }
    }

    /// Evaluates the objective at `x`, returns the value and the time spent
    fn eval_obj<O: CostFunction<Param = Array1<f64>, Output = f64>>(
        &self,
        pb: &mut Problem<O>,
        x: &Array1<f64>,
    ) -> std::result::Result<(f64, Duration), argmin::core::Error> {
        let now = Instant::now();
        let y = pb.problem("cost_count", |problem| problem.cost(x))?;
        Ok((y, now.elapsed()))
    }

    /// Samples and evaluates the initial design, one point after the other
    fn initial_design<O: CostFunction<Param = Array1<f64>, Output = f64>>(
        &self,
        pb: &mut Problem<O>,
        rng: &mut Xoshiro256Plus,
    ) -> std::result::Result<(Array2<f64>, Array1<f64>), argmin::core::Error> {
        let n_initial = self.config.n_initial;
        info!("Compute initial design with {n_initial} points drawn uniformly");
        let now = Instant::now();
        let x_data = self.domain.sample_uniform(n_initial, rng);
        let overhead = now.elapsed() / n_initial as u32;

        let mut y_data = Array1::zeros(n_initial);
        for (i, x) in x_data.rows().into_iter().enumerate() {
            let x = x.to_owned();
            info!("Evaluate: {x}");
            let (y, time_func_eval) = self.eval_obj(pb, &x)?;
            info!("Configuration achieved a performance of {y}");
            y_data[i] = y;

            let best = find_best_index(&y_data.slice(s![..=i])).unwrap_or(i);
            self.record(
                i,
                x,
                y,
                overhead,
                time_func_eval,
                (x_data.row(best), y_data[best]),
            );
        }
        Ok((x_data, y_data))
    }

    fn record(
        &self,
        iteration: usize,
        candidate: Array1<f64>,
        value: f64,
        optimization_overhead: Duration,
        time_func_eval: Duration,
        incumbent: (ArrayView1<f64>, f64),
    ) {
        self.recorder.push(IterationRecord {
            iteration,
            candidate,
            value,
            optimization_overhead,
            time_func_eval,
            runtime: self.started.map(|t| t.elapsed()).unwrap_or_default(),
            incumbent: incumbent.0.to_owned(),
            incumbent_value: incumbent.1,
        });
    }
}

impl<O, K> Solver<O, BoState<f64>> for BoSolver<K>
where
    O: CostFunction<Param = Array1<f64>, Output = f64>,
    K: Kernel<f64>,
{
    const NAME: &'static str = "BayesOpt";

    fn init(
        &mut self,
        problem: &mut Problem<O>,
        state: BoState<f64>,
    ) -> std::result::Result<(BoState<f64>, Option<KV>), argmin::core::Error> {
        self.started = Some(Instant::now());
        let mut rng = if let Some(seed) = self.config.seed {
            Xoshiro256Plus::seed_from_u64(seed)
        } else {
            Xoshiro256Plus::from_entropy()
        };

        let mut state = state.phase(RunPhase::InitialDesign);
        let (x_data, y_data) = match state.take_data() {
            Some((x_data, y_data)) => {
                info!("Use specified initial design of {} points", x_data.nrows());
                (x_data, y_data)
            }
            None => self.initial_design(problem, &mut rng)?,
        };

        let mut initial_state = state
            .data((x_data, y_data))
            .rng(rng)
            .phase(RunPhase::SteadyState);
        initial_state.doe_size = initial_state.n_evals();
        debug!("Initial State = {initial_state:?}");

        Ok((initial_state, None))
    }

    fn next_iter(
        &mut self,
        problem: &mut Problem<O>,
        mut state: BoState<f64>,
    ) -> std::result::Result<(BoState<f64>, Option<KV>), argmin::core::Error> {
        let iteration = self.config.n_initial + state.get_iter() as usize;
        info!("Start iteration {iteration}");
        let do_optimize = iteration % self.config.train_interval == 0;

        let mut rng = state
            .take_rng()
            .ok_or_else(argmin_error_closure!(PotentialBug, "BoSolver: No rng!"))?;
        let (x_data, y_data) = state
            .take_data()
            .ok_or_else(argmin_error_closure!(PotentialBug, "BoSolver: No data!"))?;

        let now = Instant::now();
        let x_new = self.choose_next(&x_data, &y_data, do_optimize, &mut rng)?;
        let overhead = now.elapsed();
        info!("Optimization overhead was {:.6}s", overhead.as_secs_f64());
        info!("Next candidate {x_new}");

        let (y_new, time_func_eval) = self.eval_obj(problem, &x_new)?;
        info!("Configuration achieved a performance of {y_new}");

        let x_data = concatenate![Axis(0), x_data, x_new.view().insert_axis(Axis(0))];
        let y_data = concatenate![Axis(0), y_data, Array1::from_elem(1, y_new)];

        let best = find_best_index(&y_data).unwrap_or(y_data.len() - 1);
        info!(
            "Current incumbent {} with value {}",
            x_data.row(best),
            y_data[best]
        );
        self.record(
            iteration,
            x_new.clone(),
            y_new,
            overhead,
            time_func_eval,
            (x_data.row(best), y_data[best]),
        );

        let state = state
            .data((x_data, y_data))
            .rng(rng)
            .param(x_new)
            .cost(y_new);
        Ok((state, None))
    }

    fn terminate(&mut self, state: &BoState<f64>) -> TerminationStatus {
        debug!("Current Cost {:?}", state.get_cost());
        debug!("Best cost {:?}", state.get_best_cost());
        debug!("Best index {:?}", state.best_index);

        TerminationStatus::NotTerminated
    }
}
