//! Evaluation Record - one run scored by one metric

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Timestamp layout used by the server for `upload_time`.
pub const UPLOAD_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// JSON form of a measured float.
///
/// JSON has no NaN or infinity, so non-finite values are written as the
/// strings `"NaN"`, `"inf"` and `"-inf"` instead of collapsing to `null`.
#[must_use]
pub fn float_to_json(value: f64) -> Value {
    if value.is_nan() {
        json!("NaN")
    } else if value.is_infinite() {
        json!(if value > 0.0 { "inf" } else { "-inf" })
    } else {
        json!(value)
    }
}

/// The measured result of an evaluation.
///
/// The server reports either an aggregate value, per-fold values, or raw
/// array data for a record, never more than one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measurement {
    /// Aggregate scalar value
    Value(f64),
    /// Per-repeat, per-fold values, JSON decoded (nested arrays)
    PerFold(Value),
    /// Raw array data as sent by the server
    ArrayData(String),
}

/// Evaluation Record: the result of one run under one evaluation function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    run_id: u64,
    task_id: u64,
    setup_id: u64,
    flow_id: u64,
    flow_name: String,
    data_id: u64,
    data_name: String,
    function: String,
    upload_time: NaiveDateTime,
    uploader: Option<u64>,
    uploader_name: Option<String>,
    measurement: Option<Measurement>,
}

impl Evaluation {
    /// Create a builder with the required identifying fields.
    #[must_use]
    pub fn builder(run_id: u64, function: impl Into<String>) -> EvaluationBuilder {
        EvaluationBuilder::new(run_id, function)
    }

    /// Run ID.
    #[must_use]
    pub const fn run_id(&self) -> u64 {
        self.run_id
    }

    /// Task ID.
    #[must_use]
    pub const fn task_id(&self) -> u64 {
        self.task_id
    }

    /// Setup ID.
    #[must_use]
    pub const fn setup_id(&self) -> u64 {
        self.setup_id
    }

    /// Flow ID.
    #[must_use]
    pub const fn flow_id(&self) -> u64 {
        self.flow_id
    }

    /// Flow name.
    #[must_use]
    pub fn flow_name(&self) -> &str {
        &self.flow_name
    }

    /// Dataset ID.
    #[must_use]
    pub const fn data_id(&self) -> u64 {
        self.data_id
    }

    /// Dataset name.
    #[must_use]
    pub fn data_name(&self) -> &str {
        &self.data_name
    }

    /// Evaluation function (metric) name.
    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Upload timestamp (server local time, no zone).
    #[must_use]
    pub const fn upload_time(&self) -> NaiveDateTime {
        self.upload_time
    }

    /// Uploader ID, when the server reports it.
    #[must_use]
    pub const fn uploader(&self) -> Option<u64> {
        self.uploader
    }

    /// Uploader name, when the server reports it.
    #[must_use]
    pub fn uploader_name(&self) -> Option<&str> {
        self.uploader_name.as_deref()
    }

    /// The measured result, if any.
    #[must_use]
    pub const fn measurement(&self) -> Option<&Measurement> {
        self.measurement.as_ref()
    }

    /// Aggregate value, if that is what was measured.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self.measurement {
            Some(Measurement::Value(v)) => Some(v),
            _ => None,
        }
    }

    /// Per-fold values, if that is what was measured.
    #[must_use]
    pub fn values(&self) -> Option<&Value> {
        match &self.measurement {
            Some(Measurement::PerFold(v)) => Some(v),
            _ => None,
        }
    }

    /// Raw array data, if that is what was measured.
    #[must_use]
    pub fn array_data(&self) -> Option<&str> {
        match &self.measurement {
            Some(Measurement::ArrayData(d)) => Some(d),
            _ => None,
        }
    }

    /// Plain-mapping view with the column names of the tabular output.
    ///
    /// Absent measurements are `null`; `values` stays a JSON array; a
    /// non-finite `value` is encoded by [`float_to_json`].
    #[must_use]
    pub fn to_row(&self) -> Map<String, Value> {
        let mut row = Map::new();
        row.insert("run_id".into(), json!(self.run_id));
        row.insert("task_id".into(), json!(self.task_id));
        row.insert("setup_id".into(), json!(self.setup_id));
        row.insert("flow_id".into(), json!(self.flow_id));
        row.insert("flow_name".into(), json!(self.flow_name));
        row.insert("data_id".into(), json!(self.data_id));
        row.insert("data_name".into(), json!(self.data_name));
        row.insert("function".into(), json!(self.function));
        row.insert(
            "upload_time".into(),
            json!(self.upload_time.format(UPLOAD_TIME_FORMAT).to_string()),
        );
        row.insert(
            "value".into(),
            self.value().map_or(Value::Null, float_to_json),
        );
        row.insert("values".into(), self.values().cloned().unwrap_or(Value::Null));
        row.insert("array_data".into(), json!(self.array_data()));
        row
    }
}

/// Builder for `Evaluation`.
#[derive(Debug, Clone)]
pub struct EvaluationBuilder {
    record: Evaluation,
}

impl EvaluationBuilder {
    /// Create a builder with the run ID and function; other IDs default to zero.
    #[must_use]
    pub fn new(run_id: u64, function: impl Into<String>) -> Self {
        Self {
            record: Evaluation {
                run_id,
                task_id: 0,
                setup_id: 0,
                flow_id: 0,
                flow_name: String::new(),
                data_id: 0,
                data_name: String::new(),
                function: function.into(),
                upload_time: NaiveDateTime::default(),
                uploader: None,
                uploader_name: None,
                measurement: None,
            },
        }
    }

    /// Set the task ID.
    #[must_use]
    pub const fn task(mut self, task_id: u64) -> Self {
        self.record.task_id = task_id;
        self
    }

    /// Set the setup ID.
    #[must_use]
    pub const fn setup(mut self, setup_id: u64) -> Self {
        self.record.setup_id = setup_id;
        self
    }

    /// Set the flow ID and name.
    #[must_use]
    pub fn flow(mut self, flow_id: u64, flow_name: impl Into<String>) -> Self {
        self.record.flow_id = flow_id;
        self.record.flow_name = flow_name.into();
        self
    }

    /// Set the dataset ID and name.
    #[must_use]
    pub fn data(mut self, data_id: u64, data_name: impl Into<String>) -> Self {
        self.record.data_id = data_id;
        self.record.data_name = data_name.into();
        self
    }

    /// Set the upload timestamp.
    #[must_use]
    pub const fn upload_time(mut self, upload_time: NaiveDateTime) -> Self {
        self.record.upload_time = upload_time;
        self
    }

    /// Set the uploader ID and optional name.
    #[must_use]
    pub fn uploader(mut self, uploader: u64, name: Option<String>) -> Self {
        self.record.uploader = Some(uploader);
        self.record.uploader_name = name;
        self
    }

    /// Set the measured result.
    #[must_use]
    pub fn measurement(mut self, measurement: Measurement) -> Self {
        self.record.measurement = Some(measurement);
        self
    }

    /// Shorthand for `measurement(Measurement::Value(value))`.
    #[must_use]
    pub fn value(self, value: f64) -> Self {
        self.measurement(Measurement::Value(value))
    }

    /// Build the `Evaluation`.
    #[must_use]
    pub fn build(self) -> Evaluation {
        self.record
    }
}
