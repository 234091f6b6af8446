//! Fetch Evaluations Example
//!
//! Lists the best runs on a task, compares flows by their score distribution
//! and attaches hyperparameter settings to the top runs.
//!
//! Configure with `OPENML_SERVER` / `OPENML_APIKEY`; set `RUST_LOG=debug` to
//! see every request.
//!
//! Run with: cargo run --example fetch_evaluations

use anyhow::{Context, Result};
use openml_evaluations::analysis::{empirical_cdf, flow_summaries, top_k};
use openml_evaluations::frame::write_parquet;
use openml_evaluations::{EvaluationQuery, JoinedListing, OpenMlClient, SortOrder};
use tracing_subscriber::EnvFilter;

const TASK_ID: u64 = 59;
const METRIC: &str = "predictive_accuracy";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== OpenML Evaluations: task {TASK_ID} ===\n");

    let client = OpenMlClient::from_env().context("creating client")?;

    // -------------------------------------------------------------------------
    // 1. Available measures
    // -------------------------------------------------------------------------
    let measures = client.list_evaluation_measures()?;
    println!("1. {} evaluation measures, e.g. {:?}", measures.len(), &measures[..measures.len().min(5)]);

    // -------------------------------------------------------------------------
    // 2. All evaluations of the metric on the task
    // -------------------------------------------------------------------------
    let query = EvaluationQuery::new(METRIC)
        .tasks([TASK_ID])
        .sort_order(SortOrder::Descending);
    let evaluations = client.list_evaluations(&query)?;
    println!("\n2. {} evaluations of {METRIC}", evaluations.len());

    for evaluation in top_k(&evaluations, 5, SortOrder::Descending)? {
        println!(
            "   run {:>8}  {:.4}  {}",
            evaluation.run_id(),
            evaluation.value().unwrap_or(f64::NAN),
            evaluation.flow_name()
        );
    }

    // -------------------------------------------------------------------------
    // 3. Score distribution and per-flow comparison
    // -------------------------------------------------------------------------
    let values: Vec<f64> = evaluations.iter().filter_map(|e| e.value()).collect();
    let cdf = empirical_cdf(&values);
    if let Some(median) = cdf.iter().find(|p| p.probability >= 0.5) {
        println!("\n3. Median {METRIC}: {:.4}", median.value);
    }

    for summary in flow_summaries(&evaluations, 10, SortOrder::Descending) {
        println!(
            "   flow {:>6}  runs {:>4}  min {:.3}  median {:.3}  max {:.3}  {}",
            summary.flow_id, summary.runs, summary.min, summary.median, summary.max, summary.flow_name
        );
    }

    // -------------------------------------------------------------------------
    // 4. Hyperparameters of the top runs
    // -------------------------------------------------------------------------
    let top_query = query.clone().size(20);
    let joined = client.list_evaluations_setups(&top_query)?;
    println!("\n4. Parameters of the top {} runs", joined.len());
    for row in joined.iter().take(3) {
        let settings: Vec<String> = row
            .parameters()
            .iter()
            .map(|p| format!("{}={}", p.name, p.value.as_deref().unwrap_or("-")))
            .collect();
        println!("   run {}: {}", row.evaluation().run_id(), settings.join(", "));
    }

    if let JoinedListing::Frame(frame) = client.list_evaluations_setups_as(&top_query, "dataframe")? {
        let path = std::env::temp_dir().join(format!("openml_task_{TASK_ID}.parquet"));
        write_parquet(&frame, &path)?;
        println!("\n   Saved {} rows to {}", frame.num_rows(), path.display());
    }

    Ok(())
}
