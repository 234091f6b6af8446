//! Evaluation Map - run-keyed, order-preserving result collection

use std::collections::HashMap;

use serde_json::{Map, Value};

use super::Evaluation;
use crate::paging::Paged;

/// Evaluations keyed by run ID, in server response order.
///
/// ## Duplicate run IDs
///
/// Inserting a run ID that is already present replaces the stored record but
/// keeps its original position, so a later duplicate in a response silently
/// overwrites the earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationMap {
    order: Vec<u64>,
    records: HashMap<u64, Evaluation>,
}

impl EvaluationMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct runs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the map holds no evaluations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Insert an evaluation, returning the record it replaced.
    pub fn insert(&mut self, evaluation: Evaluation) -> Option<Evaluation> {
        let run_id = evaluation.run_id();
        let previous = self.records.insert(run_id, evaluation);
        if previous.is_none() {
            self.order.push(run_id);
        }
        previous
    }

    /// Get an evaluation by run ID.
    #[must_use]
    pub fn get(&self, run_id: u64) -> Option<&Evaluation> {
        self.records.get(&run_id)
    }

    /// Whether a run ID is present.
    #[must_use]
    pub fn contains(&self, run_id: u64) -> bool {
        self.records.contains_key(&run_id)
    }

    /// Run IDs in order.
    #[must_use]
    pub fn run_ids(&self) -> &[u64] {
        &self.order
    }

    /// Evaluations in order.
    pub fn iter(&self) -> impl Iterator<Item = &Evaluation> + Clone + '_ {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Distinct setup IDs in first-seen order.
    #[must_use]
    pub fn unique_setup_ids(&self) -> Vec<u64> {
        let mut seen = std::collections::HashSet::new();
        self.iter()
            .map(Evaluation::setup_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Plain-mapping view: `(run_id, row)` pairs in order.
    #[must_use]
    pub fn to_dicts(&self) -> Vec<(u64, Map<String, Value>)> {
        self.iter().map(|e| (e.run_id(), e.to_row())).collect()
    }

    /// Consume the map into its evaluations, in order.
    #[must_use]
    pub fn into_vec(mut self) -> Vec<Evaluation> {
        self.order
            .iter()
            .filter_map(|id| self.records.remove(id))
            .collect()
    }
}

impl FromIterator<Evaluation> for EvaluationMap {
    fn from_iter<I: IntoIterator<Item = Evaluation>>(iter: I) -> Self {
        let mut map = Self::new();
        for evaluation in iter {
            map.insert(evaluation);
        }
        map
    }
}

impl Extend<Evaluation> for EvaluationMap {
    fn extend<I: IntoIterator<Item = Evaluation>>(&mut self, iter: I) {
        for evaluation in iter {
            self.insert(evaluation);
        }
    }
}

impl Paged for EvaluationMap {
    fn record_count(&self) -> usize {
        self.len()
    }

    fn absorb(&mut self, page: Self) {
        self.extend(page.into_vec());
    }

    fn truncate_to(&mut self, len: usize) {
        if len >= self.order.len() {
            return;
        }
        for id in self.order.drain(len..) {
            self.records.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(run_id: u64, setup_id: u64, value: f64) -> Evaluation {
        Evaluation::builder(run_id, "predictive_accuracy")
            .setup(setup_id)
            .value(value)
            .build()
    }

    #[test]
    fn test_preserves_insertion_order() {
        let map: EvaluationMap = [eval(5, 1, 0.1), eval(2, 1, 0.2), eval(9, 2, 0.3)]
            .into_iter()
            .collect();
        assert_eq!(map.run_ids(), &[5, 2, 9]);
        assert_eq!(map.unique_setup_ids(), vec![1, 2]);
    }

    #[test]
    fn test_duplicate_overwrites_in_place() {
        let mut map = EvaluationMap::new();
        map.insert(eval(1, 1, 0.1));
        map.insert(eval(2, 1, 0.2));
        let replaced = map.insert(eval(1, 7, 0.9));

        assert_eq!(replaced.map(|e| e.setup_id()), Some(1));
        assert_eq!(map.len(), 2);
        assert_eq!(map.run_ids(), &[1, 2]);
        assert_eq!(map.get(1).and_then(Evaluation::value), Some(0.9));
    }

    #[test]
    fn test_truncate() {
        let mut map: EvaluationMap = (1..=5).map(|i| eval(i, i, 0.0)).collect();
        map.truncate_to(2);
        assert_eq!(map.run_ids(), &[1, 2]);
        assert!(!map.contains(3));
    }
}
