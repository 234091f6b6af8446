//! Result analysis over listed evaluations
//!
//! Small summaries used when comparing flows on a task: best-k runs, the
//! empirical distribution of scores and per-flow statistics. Only evaluations
//! carrying a scalar value take part; NaN values are skipped.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

use serde::{Deserialize, Serialize};

use crate::evaluation::{Evaluation, EvaluationMap};
use crate::query::SortOrder;
use crate::{Error, Result};

/// Heap entry ranked by `key`, earlier positions winning ties.
#[derive(Debug, Clone, Copy)]
struct Ranked {
    key: f64,
    position: usize,
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .total_cmp(&other.key)
            .then_with(|| other.position.cmp(&self.position))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn rank_key(value: f64, order: SortOrder) -> f64 {
    match order {
        SortOrder::Descending => value,
        SortOrder::Ascending => -value,
    }
}

/// The `k` best evaluations by value, best first.
///
/// `Descending` selects the highest values, `Ascending` the lowest. Ties keep
/// listing order.
///
/// Time complexity: O(N log K); space O(K).
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `k` is zero.
pub fn top_k(evaluations: &EvaluationMap, k: usize, order: SortOrder) -> Result<Vec<&Evaluation>> {
    if k == 0 {
        return Err(Error::InvalidInput("k must be greater than 0".to_string()));
    }

    let scored: Vec<(&Evaluation, f64)> = evaluations
        .iter()
        .filter_map(|e| e.value().filter(|v| !v.is_nan()).map(|v| (e, v)))
        .collect();

    // Min-heap over rank: the weakest of the current best k sits on top.
    let mut heap: BinaryHeap<Reverse<Ranked>> = BinaryHeap::with_capacity(k);
    for (position, (_, value)) in scored.iter().enumerate() {
        let item = Ranked {
            key: rank_key(*value, order),
            position,
        };
        if heap.len() < k {
            heap.push(Reverse(item));
        } else if let Some(Reverse(weakest)) = heap.peek() {
            if item > *weakest {
                heap.pop();
                heap.push(Reverse(item));
            }
        }
    }

    // Ascending order of Reverse<_> is best first.
    Ok(heap
        .into_sorted_vec()
        .into_iter()
        .map(|Reverse(item)| scored[item.position].0)
        .collect())
}

/// One step of an empirical CDF.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CdfPoint {
    /// Observed value
    pub value: f64,
    /// Fraction of observations `<= value`
    pub probability: f64,
}

/// Empirical cumulative distribution of `values`, one point per distinct
/// value in ascending order. NaN values are ignored.
#[must_use]
pub fn empirical_cdf(values: &[f64]) -> Vec<CdfPoint> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);

    let n = sorted.len() as f64;
    let mut points: Vec<CdfPoint> = Vec::new();
    for (i, value) in sorted.iter().enumerate() {
        let probability = (i + 1) as f64 / n;
        match points.last_mut() {
            Some(last) if last.value == *value => last.probability = probability,
            _ => points.push(CdfPoint {
                value: *value,
                probability,
            }),
        }
    }
    points
}

/// Score statistics for one flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSummary {
    /// Flow ID
    pub flow_id: u64,
    /// Flow name
    pub flow_name: String,
    /// Number of evaluations with a value
    pub runs: usize,
    /// Lowest value
    pub min: f64,
    /// Median value
    pub median: f64,
    /// Highest value
    pub max: f64,
}

impl FlowSummary {
    fn best(&self, order: SortOrder) -> f64 {
        match order {
            SortOrder::Descending => self.max,
            SortOrder::Ascending => self.min,
        }
    }
}

/// Per-flow statistics for the `top_n` flows, ranked by their best value.
///
/// Ties between flows are broken by flow ID.
#[must_use]
pub fn flow_summaries(evaluations: &EvaluationMap, top_n: usize, order: SortOrder) -> Vec<FlowSummary> {
    let mut grouped: HashMap<u64, (&str, Vec<f64>)> = HashMap::new();
    for evaluation in evaluations.iter() {
        let Some(value) = evaluation.value().filter(|v| !v.is_nan()) else {
            continue;
        };
        grouped
            .entry(evaluation.flow_id())
            .or_insert_with(|| (evaluation.flow_name(), Vec::new()))
            .1
            .push(value);
    }

    let mut summaries: Vec<FlowSummary> = grouped
        .into_iter()
        .map(|(flow_id, (flow_name, mut values))| {
            values.sort_by(f64::total_cmp);
            FlowSummary {
                flow_id,
                flow_name: flow_name.to_string(),
                runs: values.len(),
                min: values[0],
                median: median_of_sorted(&values),
                max: values[values.len() - 1],
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        rank_key(b.best(order), order)
            .total_cmp(&rank_key(a.best(order), order))
            .then_with(|| a.flow_id.cmp(&b.flow_id))
    });
    summaries.truncate(top_n);
    summaries
}

/// Median of a non-empty sorted slice.
fn median_of_sorted(values: &[f64]) -> f64 {
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
