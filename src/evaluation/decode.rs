//! Schema-validated decoding of `evaluation/list` responses
//!
//! ```text
//! <oml:evaluations>
//!   <oml:evaluation>
//!     <oml:run_id>..</oml:run_id>   <oml:task_id>..</oml:task_id>
//!     <oml:setup_id>..</oml:setup_id> <oml:flow_id>..</oml:flow_id>
//!     <oml:flow_name>..</oml:flow_name> <oml:data_id>..</oml:data_id>
//!     <oml:data_name>..</oml:data_name> <oml:function>..</oml:function>
//!     <oml:upload_time>..</oml:upload_time>
//!     [<oml:uploader>..] [<oml:uploader_name>..]
//!     [<oml:value>..] | [<oml:values>..] | [<oml:array_data>..]
//!   </oml:evaluation>
//! </oml:evaluations>
//! ```

use chrono::NaiveDateTime;
use tracing::debug;

use super::record::UPLOAD_TIME_FORMAT;
use super::{Evaluation, EvaluationMap, Measurement};
use crate::xml::{open_document, FieldSet, XmlElement};
use crate::{Error, Result};

/// Root tag of an evaluation listing.
pub const EVALUATIONS_TAG: &str = "oml:evaluations";

const RECORD: &str = "evaluation";

const FIELDS: &[&str] = &[
    "run_id",
    "task_id",
    "setup_id",
    "flow_id",
    "flow_name",
    "data_id",
    "data_name",
    "function",
    "upload_time",
    "uploader",
    "uploader_name",
    "value",
    "values",
    "array_data",
];

/// Parse an `evaluation/list` response body.
///
/// # Errors
///
/// - [`Error::MissingTag`] if the root is not `oml:evaluations`
/// - [`Error::NoResult`] / [`Error::Server`] for error documents
/// - Schema errors from [`decode_evaluation`]
pub fn parse_evaluations(xml: &str) -> Result<EvaluationMap> {
    let root = open_document(xml, EVALUATIONS_TAG)?;
    decode_evaluations(&root)
}

/// Decode an `oml:evaluations` element.
///
/// A run ID seen twice keeps the position of its first occurrence and the
/// content of its last.
///
/// # Errors
///
/// Returns [`Error::UnexpectedField`] for children other than
/// `oml:evaluation`, and any error from [`decode_evaluation`].
pub fn decode_evaluations(root: &XmlElement) -> Result<EvaluationMap> {
    let mut evaluations = EvaluationMap::new();
    for child in root.children() {
        if !child.is_named("evaluation") {
            return Err(Error::UnexpectedField {
                record: "evaluations",
                field: child.name().to_string(),
            });
        }
        if let Some(previous) = evaluations.insert(decode_evaluation(child)?) {
            debug!(run_id = previous.run_id(), "Duplicate run id overwrites earlier record");
        }
    }
    Ok(evaluations)
}

/// Decode a single `oml:evaluation` element.
///
/// # Errors
///
/// - [`Error::MissingField`] for an absent required field
/// - [`Error::UnexpectedField`] for an unknown or repeated field
/// - [`Error::MalformedField`] for unparseable text, or when more than one of
///   `value`, `values`, `array_data` is present
pub fn decode_evaluation(element: &XmlElement) -> Result<Evaluation> {
    let fields = FieldSet::collect(RECORD, FIELDS, &[], element)?;

    let raw_time = fields.required("upload_time")?;
    let upload_time = NaiveDateTime::parse_from_str(raw_time, UPLOAD_TIME_FORMAT)
        .map_err(|e| fields.malformed("upload_time", raw_time, e))?;

    let mut builder = Evaluation::builder(fields.id("run_id")?, fields.required("function")?)
        .task(fields.id("task_id")?)
        .setup(fields.id("setup_id")?)
        .flow(fields.id("flow_id")?, fields.required("flow_name")?)
        .data(fields.id("data_id")?, fields.required("data_name")?)
        .upload_time(upload_time);

    if let Some(uploader) = fields.optional_id("uploader")? {
        builder = builder.uploader(uploader, fields.text("uploader_name").map(str::to_string));
    }
    if let Some(measurement) = decode_measurement(&fields)? {
        builder = builder.measurement(measurement);
    }
    Ok(builder.build())
}

fn decode_measurement(fields: &FieldSet<'_>) -> Result<Option<Measurement>> {
    let mut found: Option<(&'static str, Measurement)> = None;

    for name in ["value", "values", "array_data"] {
        let Some(raw) = fields.text(name) else {
            continue;
        };
        if let Some((first, _)) = &found {
            return Err(fields.malformed(name, raw, format!("conflicts with \"{first}\"")));
        }
        let measurement = match name {
            "value" => Measurement::Value(
                raw.parse::<f64>()
                    .map_err(|e| fields.malformed(name, raw, e))?,
            ),
            "values" => {
                let parsed: serde_json::Value =
                    serde_json::from_str(raw).map_err(|e| fields.malformed(name, raw, e))?;
                if !parsed.is_array() {
                    return Err(fields.malformed(name, raw, "expected a JSON array"));
                }
                Measurement::PerFold(parsed)
            }
            _ => Measurement::ArrayData(raw.to_string()),
        };
        found = Some((name, measurement));
    }

    Ok(found.map(|(_, measurement)| measurement))
}
