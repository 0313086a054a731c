use std::sync::{Arc, Mutex, MutexGuard};

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use web_time::Duration;

/// What happened during one iteration of the optimization loop,
/// initial design evaluations included.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// Iteration index, starting at 0 with the initial design
    pub iteration: usize,
    /// Evaluated point
    pub candidate: Array1<f64>,
    /// Objective value at `candidate`
    pub value: f64,
    /// Time spent choosing the candidate
    pub optimization_overhead: Duration,
    /// Time spent evaluating the objective
    pub time_func_eval: Duration,
    /// Time elapsed since the run started
    pub runtime: Duration,
    /// Best point evaluated so far
    pub incumbent: Array1<f64>,
    /// Objective value at `incumbent`
    pub incumbent_value: f64,
}

/// Shared, append-only log of iteration records.
///
/// Clones share the same log so records pushed by the solver remain
/// readable by the caller even when the run aborts.
#[derive(Clone, Debug, Default)]
pub struct RunRecorder(Arc<Mutex<Vec<IterationRecord>>>);

impl RunRecorder {
    /// Empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, Vec<IterationRecord>> {
        // records are plain data, a poisoned lock still holds a consistent log
        match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Append a record
    pub fn push(&self, record: IterationRecord) {
        self.guard().push(record);
    }

    /// Copy of the records pushed so far
    pub fn records(&self) -> Vec<IterationRecord> {
        self.guard().clone()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    /// Whether no record was pushed
    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    /// Remove all records
    pub fn clear(&self) {
        self.guard().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn record(iteration: usize, value: f64) -> IterationRecord {
        IterationRecord {
            iteration,
            candidate: array![1., 2.],
            value,
            optimization_overhead: Duration::from_millis(3),
            time_func_eval: Duration::from_millis(10),
            runtime: Duration::from_millis(13),
            incumbent: array![1., 2.],
            incumbent_value: value,
        }
    }

    #[test]
    fn test_shared_records() {
        let recorder = RunRecorder::new();
        let other = recorder.clone();
        assert!(other.is_empty());
        recorder.push(record(0, 1.5));
        recorder.push(record(1, 0.5));
        assert_eq!(other.len(), 2);
        assert_eq!(other.records()[1].value, 0.5);
        other.clear();
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_record_json() {
        let json = serde_json::to_value(record(4, -2.)).unwrap();
        assert_eq!(json["iteration"], 4);
        assert_eq!(json["value"], -2.);
        assert_eq!(json["incumbent_value"], -2.);
        let back: IterationRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record(4, -2.));
    }
}
