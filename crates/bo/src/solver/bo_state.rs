//! Implementation of `argmin::IterState` for the bayesian optimization loop
use crate::utils::find_best_index;

use argmin::core::{ArgminFloat, Problem, State, TerminationReason, TerminationStatus};
use linfa::Float;
use ndarray::{Array1, Array2};
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Phases of an optimization run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// No observation yet
    Uninitialized,
    /// Initial design being sampled and evaluated
    InitialDesign,
    /// Main loop, one candidate chosen and evaluated per iteration
    SteadyState,
    /// Run completed or aborted
    Terminated,
}

/// Maintains the state from iteration to iteration of the [crate::BoSolver].
///
/// This struct is passed from one iteration of an algorithm to the next.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BoState<F: Float> {
    /// Current parameter vector
    pub param: Option<Array1<F>>,
    /// Current best parameter vector
    pub best_param: Option<Array1<F>>,

    /// Current cost function value
    pub cost: Option<F>,
    /// Current best cost function value
    pub best_cost: Option<F>,

    /// Current iteration
    pub iter: u64,
    /// Iteration number of last best cost
    pub last_best_iter: u64,
    /// Maximum number of iterations
    pub max_iters: u64,
    /// Evaluation counts
    pub counts: HashMap<String, u64>,
    /// Time required so far
    pub time: Option<web_time::Duration>,
    /// Optimization status
    pub termination_status: TerminationStatus,

    /// Run phase
    pub phase: RunPhase,
    /// Initial design size
    pub doe_size: usize,
    /// Observations (points, objective values) in evaluation order
    pub data: Option<(Array2<F>, Array1<F>)>,
    /// Previous index of best result in data
    pub prev_best_index: Option<usize>,
    /// Index of best result in data
    pub best_index: Option<usize>,

    /// Random number generator for reproducibility
    pub rng: Option<Xoshiro256Plus>,
}

impl<F> BoState<F>
where
    Self: State<Float = F>,
    F: Float,
{
    /// Set the last evaluated point
    ///
    /// # Example
    ///
    /// ```
    /// # use argmin::core::State;
    /// # use bayesbox_bo::BoState;
    /// # use ndarray::array;
    /// # let state: BoState<f64> = BoState::new();
    /// let state = state.param(array![0.0f64, 3.0f64]);
    /// # assert_eq!(state.param.as_ref().unwrap()[1], 3.0);
    /// ```
    #[must_use]
    pub fn param(mut self, param: Array1<F>) -> Self {
        self.param = Some(param);
        self
    }

    /// Set maximum number of iterations
    ///
    /// # Example
    ///
    /// ```
    /// # use bayesbox_bo::BoState;
    /// # use argmin::core::State;
    /// # let state: BoState<f64> = BoState::new();
    /// # assert_eq!(state.max_iters, u64::MAX);
    /// let state = state.max_iters(1000);
    /// # assert_eq!(state.max_iters, 1000);
    /// ```
    #[must_use]
    pub fn max_iters(mut self, iters: u64) -> Self {
        self.max_iters = iters;
        self
    }

    /// Set the objective value of the last evaluated point
    #[must_use]
    pub fn cost(mut self, cost: F) -> Self {
        self.cost = Some(cost);
        self
    }

    /// Set the observations
    #[must_use]
    pub fn data(mut self, data: (Array2<F>, Array1<F>)) -> Self {
        self.data = Some(data);
        self
    }

    /// Moves the observations out and replaces it internally with `None`.
    pub fn take_data(&mut self) -> Option<(Array2<F>, Array1<F>)> {
        self.data.take()
    }

    /// Set the random generator
    #[must_use]
    pub fn rng(mut self, rng: Xoshiro256Plus) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Moves the random generator out and replaces it internally with `None`.
    pub fn take_rng(&mut self) -> Option<Xoshiro256Plus> {
        self.rng.take()
    }

    /// Set the run phase
    #[must_use]
    pub fn phase(mut self, phase: RunPhase) -> Self {
        self.phase = phase;
        self
    }

    /// Number of observations evaluated so far
    pub fn n_evals(&self) -> usize {
        self.data.as_ref().map(|(x, _)| x.nrows()).unwrap_or(0)
    }
}

impl<F> State for BoState<F>
where
    F: Float + ArgminFloat,
{
    /// Type of parameter vector
    type Param = Array1<F>;
    /// Floating point precision
    type Float = F;

    /// Create new `BoState` instance
    ///
    /// # Example
    ///
    /// ```
    /// # use std::collections::HashMap;
    /// # use argmin::core::{State, TerminationStatus};
    /// use bayesbox_bo::{BoState, RunPhase};
    /// let state: BoState<f64> = BoState::new();
    ///
    /// # assert!(state.param.is_none());
    /// # assert!(state.best_param.is_none());
    /// # assert!(state.cost.is_none());
    /// # assert!(state.best_cost.is_none());
    /// # assert_eq!(state.get_target_cost(), f64::NEG_INFINITY);
    /// # assert!(state.rng.is_none());
    /// # assert_eq!(state.iter, 0);
    /// # assert_eq!(state.max_iters, u64::MAX);
    /// # assert_eq!(state.counts, HashMap::new());
    /// # assert_eq!(state.termination_status, TerminationStatus::NotTerminated);
    /// assert_eq!(state.phase, RunPhase::Uninitialized);
    /// ```
    fn new() -> Self {
        BoState {
            param: None,
            best_param: None,

            cost: None,
            best_cost: None,

            iter: 0,
            last_best_iter: 0,
            max_iters: u64::MAX,
            counts: HashMap::new(),
            time: Some(web_time::Duration::new(0, 0)),
            termination_status: TerminationStatus::NotTerminated,

            phase: RunPhase::Uninitialized,
            doe_size: 0,
            data: None,
            prev_best_index: None,
            best_index: None,

            rng: None,
        }
    }

    /// Recomputes the incumbent from all observations: strict minimum, the
    /// first occurrence wins on ties.
    ///
    /// # Example
    ///
    /// ```
    /// # use argmin::core::State;
    /// # use ndarray::array;
    /// # use bayesbox_bo::BoState;
    /// let mut state: BoState<f64> = BoState::new();
    /// let mut state = state.data((array![[1.0f64], [2.0], [3.0]], array![10.0, 0.5, 0.5]));
    /// state.update();
    /// assert_eq!(state.best_param.as_ref().unwrap()[0], 2.0);
    /// assert_eq!(state.best_cost, Some(0.5));
    /// ```
    fn update(&mut self) {
        if let Some((x_data, y_data)) = self.data.as_ref() {
            if let Some(best_index) = find_best_index(y_data) {
                std::mem::swap(&mut self.prev_best_index, &mut self.best_index);
                self.best_index = Some(best_index);

                self.best_param = Some(x_data.row(best_index).to_owned());
                self.best_cost = Some(y_data[best_index]);

                // best point in doe => self.last_best_iter remains 0
                if best_index >= self.doe_size && self.prev_best_index != Some(best_index) {
                    self.last_best_iter = self.iter + 1;
                }
            }
        }
    }

    fn get_param(&self) -> Option<&Array1<F>> {
        self.param.as_ref()
    }

    fn get_best_param(&self) -> Option<&Array1<F>> {
        self.best_param.as_ref()
    }

    /// Sets the termination status to [`Terminated`](`TerminationStatus::Terminated`) with the given reason
    ///
    /// # Example
    ///
    /// ```
    /// # use argmin::core::{State, TerminationReason, TerminationStatus};
    /// # use bayesbox_bo::{BoState, RunPhase};
    /// # let state: BoState<f64> = BoState::new();
    /// let state = state.terminate_with(TerminationReason::MaxItersReached);
    /// # assert_eq!(state.termination_status, TerminationStatus::Terminated(TerminationReason::MaxItersReached));
    /// assert_eq!(state.phase, RunPhase::Terminated);
    /// ```
    fn terminate_with(mut self, reason: TerminationReason) -> Self {
        self.termination_status = TerminationStatus::Terminated(reason);
        self.phase = RunPhase::Terminated;
        self
    }

    fn time(&mut self, time: Option<web_time::Duration>) -> &mut Self {
        self.time = time;
        self
    }

    fn get_cost(&self) -> Self::Float {
        self.cost.unwrap_or(F::infinity())
    }

    fn get_best_cost(&self) -> Self::Float {
        self.best_cost.unwrap_or(F::infinity())
    }

    /// No target cost, the run only stops on its evaluation budget
    fn get_target_cost(&self) -> Self::Float {
        F::neg_infinity()
    }

    fn get_iter(&self) -> u64 {
        self.iter
    }

    fn get_last_best_iter(&self) -> u64 {
        self.last_best_iter
    }

    fn get_max_iters(&self) -> u64 {
        self.max_iters
    }

    fn get_termination_status(&self) -> &TerminationStatus {
        &self.termination_status
    }

    fn get_termination_reason(&self) -> Option<&TerminationReason> {
        match &self.termination_status {
            TerminationStatus::Terminated(reason) => Some(reason),
            TerminationStatus::NotTerminated => None,
        }
    }

    fn get_time(&self) -> Option<web_time::Duration> {
        self.time
    }

    fn increment_iter(&mut self) {
        self.iter += 1;
    }

    /// Set all function evaluation counts to the evaluation counts of another `Problem`.
    fn func_counts<O>(&mut self, problem: &Problem<O>) {
        for (k, &v) in problem.counts.iter() {
            let count = self.counts.entry(k.to_string()).or_insert(0);
            *count = v
        }
    }

    fn get_func_counts(&self) -> &HashMap<String, u64> {
        &self.counts
    }

    fn is_best(&self) -> bool {
        // last_best_iter is 1-based while iter is 0-based
        self.last_best_iter == self.iter + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use ndarray_rand::rand::SeedableRng;

    #[test]
    fn test_update_keeps_first_minimum() {
        let mut state: BoState<f64> = BoState::new();
        state.doe_size = 2;
        let mut state = state.data((array![[0.], [1.]], array![3., 1.]));
        state.update();
        assert_eq!(state.best_index, Some(1));
        assert_eq!(state.last_best_iter, 0);

        // equal value found later does not replace the incumbent
        let (x, y) = state.take_data().unwrap();
        let mut state = state.data((
            ndarray::concatenate![ndarray::Axis(0), x, array![[2.]]],
            ndarray::concatenate![ndarray::Axis(0), y, array![1.]],
        ));
        state.update();
        assert_eq!(state.best_index, Some(1));
        assert_eq!(state.best_param, Some(array![1.]));
        assert_eq!(state.last_best_iter, 0);
        assert!(!state.is_best());
    }

    #[test]
    fn test_update_new_best_after_doe() {
        let mut state: BoState<f64> = BoState::new();
        state.doe_size = 2;
        let mut state = state.data((array![[0.], [1.], [2.]], array![3., 1., -1.]));
        state.iter = 0;
        state.update();
        assert_eq!(state.best_index, Some(2));
        assert_eq!(state.get_best_cost(), -1.);
        assert!(state.is_best());
    }

    #[test]
    fn test_serialize_state() {
        let mut state: BoState<f64> = BoState::new()
            .data((array![[0.5, 1.], [0.2, 0.3]], array![2., -1.]))
            .param(array![0.2, 0.3])
            .cost(-1.)
            .rng(Xoshiro256Plus::seed_from_u64(42))
            .phase(RunPhase::SteadyState);
        state.update();
        let json = serde_json::to_string(&state).unwrap();
        let back: BoState<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.phase, RunPhase::SteadyState);
        assert_eq!(back.n_evals(), 2);
        assert_eq!(back.best_index, Some(1));
        assert_eq!(back.best_cost, Some(-1.));
        assert_eq!(back.get_target_cost(), f64::NEG_INFINITY);
        assert!(back.rng.is_some());

        let json = serde_json::to_string(&BoState::<f64>::new()).unwrap();
        let back: BoState<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.phase, RunPhase::Uninitialized);
        assert!(back.rng.is_none());
    }
}
