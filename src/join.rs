//! Evaluation + setup join
//!
//! ```text
//! evaluations ──unique setup ids──> [≤100] [≤100] ... ──setup/list──> setups
//!      │                                                                 │
//!      └────────────── left join on setup_id (one row per evaluation) ───┘
//! ```
//!
//! The server caps how many setups one `setup/list` call may name, so ids go
//! out in chunks of [`SETUP_BATCH_SIZE`].

use std::collections::HashMap;

use serde_json::Value;

use crate::evaluation::{Evaluation, EvaluationMap};
use crate::frame::Row;
use crate::setup::{ParameterSetting, SetupRecord};

/// Most setup IDs named in a single `setup/list` call.
pub const SETUP_BATCH_SIZE: usize = 100;

/// Split IDs into consecutive chunks of at most `batch_size`.
///
/// # Panics
///
/// Panics if `batch_size` is zero.
#[must_use]
pub fn chunk_setup_ids(ids: &[u64], batch_size: usize) -> Vec<Vec<u64>> {
    assert!(batch_size > 0, "batch_size must be positive");
    ids.chunks(batch_size).map(<[u64]>::to_vec).collect()
}

/// An evaluation together with the parameter settings of its setup.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedEvaluation {
    evaluation: Evaluation,
    parameters: Vec<ParameterSetting>,
}

impl JoinedEvaluation {
    /// Pair an evaluation with its settings.
    #[must_use]
    pub fn new(evaluation: Evaluation, parameters: Vec<ParameterSetting>) -> Self {
        Self {
            evaluation,
            parameters,
        }
    }

    /// The evaluation.
    #[must_use]
    pub const fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    /// `(name, value)` settings of the evaluation's setup; empty when the
    /// setup was not found or has no parameters.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterSetting] {
        &self.parameters
    }

    /// Plain-mapping view: the evaluation row plus `parameters` as an array
    /// of `[name, value]` pairs.
    #[must_use]
    pub fn to_row(&self) -> Row {
        let mut row = self.evaluation.to_row();
        row.insert(
            "parameters".into(),
            Value::Array(self.parameters.iter().map(ParameterSetting::to_json).collect()),
        );
        row
    }
}

/// Left-join setups onto evaluations by setup ID.
///
/// The output has exactly one row per evaluation, in evaluation order. If a
/// setup ID occurs more than once in `setups`, the first occurrence wins.
#[must_use]
pub fn left_join(evaluations: &EvaluationMap, setups: &[SetupRecord]) -> Vec<JoinedEvaluation> {
    let mut by_setup: HashMap<u64, &SetupRecord> = HashMap::with_capacity(setups.len());
    for setup in setups {
        by_setup.entry(setup.setup_id()).or_insert(setup);
    }

    evaluations
        .iter()
        .map(|evaluation| {
            let parameters = by_setup
                .get(&evaluation.setup_id())
                .map(|setup| setup.settings())
                .unwrap_or_default();
            JoinedEvaluation::new(evaluation.clone(), parameters)
        })
        .collect()
}
