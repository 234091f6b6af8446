//! Tabular output (Arrow `RecordBatch`)
//!
//! ## Evaluation frame
//!
//! | column | type | nullable |
//! |---|---|---|
//! | `run_id`, `task_id`, `setup_id`, `flow_id` | `UInt64` | no |
//! | `flow_name` | `Utf8` | no |
//! | `data_id` | `UInt64` | no |
//! | `data_name`, `function`, `upload_time` | `Utf8` | no |
//! | `value` | `Float64` | yes |
//! | `values` | `Utf8` (JSON text) | yes |
//! | `array_data` | `Utf8` | yes |
//!
//! The joined frame appends `parameters: List<Struct<name, value>>`.
//!
//! Columns holding JSON text carry the field metadata `encoding = json`;
//! [`to_dicts`] decodes them, so the dict view of a frame equals the dict view
//! of the records it was built from.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int32Array, Int64Array, ListArray, StringArray,
    StructArray, UInt64Array,
};
use arrow::buffer::OffsetBuffer;
use arrow::compute::concat_batches;
use arrow::datatypes::{DataType, Field, FieldRef, Fields, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::evaluation::{float_to_json, Evaluation, EvaluationMap, UPLOAD_TIME_FORMAT};
use crate::join::JoinedEvaluation;
use crate::{Error, Result};

/// Field metadata key describing how a text column is encoded.
pub const ENCODING_KEY: &str = "encoding";

/// [`ENCODING_KEY`] value for JSON text columns.
pub const JSON_ENCODING: &str = "json";

/// A single row as a JSON object keyed by column name.
pub type Row = Map<String, Value>;

fn evaluation_fields() -> Vec<Field> {
    let json_metadata: HashMap<String, String> =
        HashMap::from([(ENCODING_KEY.to_string(), JSON_ENCODING.to_string())]);
    vec![
        Field::new("run_id", DataType::UInt64, false),
        Field::new("task_id", DataType::UInt64, false),
        Field::new("setup_id", DataType::UInt64, false),
        Field::new("flow_id", DataType::UInt64, false),
        Field::new("flow_name", DataType::Utf8, false),
        Field::new("data_id", DataType::UInt64, false),
        Field::new("data_name", DataType::Utf8, false),
        Field::new("function", DataType::Utf8, false),
        Field::new("upload_time", DataType::Utf8, false),
        Field::new("value", DataType::Float64, true),
        Field::new("values", DataType::Utf8, true).with_metadata(json_metadata),
        Field::new("array_data", DataType::Utf8, true),
    ]
}

fn parameter_item_field() -> FieldRef {
    let fields = Fields::from(vec![
        Field::new("name", DataType::Utf8, false),
        Field::new("value", DataType::Utf8, true),
    ]);
    Arc::new(Field::new("item", DataType::Struct(fields), false))
}

/// Schema of the evaluation frame.
#[must_use]
pub fn evaluation_schema() -> SchemaRef {
    Arc::new(Schema::new(evaluation_fields()))
}

/// Schema of the evaluation + setup frame.
#[must_use]
pub fn joined_schema() -> SchemaRef {
    let mut fields = evaluation_fields();
    fields.push(Field::new(
        "parameters",
        DataType::List(parameter_item_field()),
        false,
    ));
    Arc::new(Schema::new(fields))
}

fn evaluation_columns<'a>(
    evaluations: impl Iterator<Item = &'a Evaluation> + Clone,
) -> Result<Vec<ArrayRef>> {
    let ids = |f: fn(&Evaluation) -> u64| -> ArrayRef {
        Arc::new(UInt64Array::from(evaluations.clone().map(f).collect::<Vec<_>>()))
    };
    let texts = |f: fn(&Evaluation) -> &str| -> ArrayRef {
        Arc::new(StringArray::from(evaluations.clone().map(f).collect::<Vec<_>>()))
    };

    let upload_times: Vec<String> = evaluations
        .clone()
        .map(|e| e.upload_time().format(UPLOAD_TIME_FORMAT).to_string())
        .collect();
    let values = evaluations
        .clone()
        .map(|e| e.values().map(serde_json::to_string).transpose())
        .collect::<std::result::Result<Vec<Option<String>>, _>>()?;

    Ok(vec![
        ids(Evaluation::run_id),
        ids(Evaluation::task_id),
        ids(Evaluation::setup_id),
        ids(Evaluation::flow_id),
        texts(Evaluation::flow_name),
        ids(Evaluation::data_id),
        texts(Evaluation::data_name),
        texts(Evaluation::function),
        Arc::new(StringArray::from(upload_times)),
        Arc::new(Float64Array::from(
            evaluations.clone().map(Evaluation::value).collect::<Vec<_>>(),
        )),
        Arc::new(StringArray::from(values)),
        Arc::new(StringArray::from(
            evaluations.clone().map(Evaluation::array_data).collect::<Vec<_>>(),
        )),
    ])
}

/// Build the evaluation frame, one row per evaluation in map order.
///
/// An empty map yields an empty frame with the full schema.
///
/// # Errors
///
/// Returns [`Error::Arrow`] if the batch cannot be assembled.
pub fn evaluations_to_frame(evaluations: &EvaluationMap) -> Result<RecordBatch> {
    let columns = evaluation_columns(evaluations.iter())?;
    Ok(RecordBatch::try_new(evaluation_schema(), columns)?)
}

/// Build the joined frame, one row per joined evaluation.
///
/// # Errors
///
/// Returns [`Error::Arrow`] if the batch cannot be assembled.
pub fn joined_to_frame(rows: &[JoinedEvaluation]) -> Result<RecordBatch> {
    let mut columns = evaluation_columns(rows.iter().map(JoinedEvaluation::evaluation))?;

    let settings = rows.iter().flat_map(JoinedEvaluation::parameters);
    let names: Vec<&str> = settings.clone().map(|s| s.name.as_str()).collect();
    let values: Vec<Option<&str>> = settings.map(|s| s.value.as_deref()).collect();

    let item_field = parameter_item_field();
    let DataType::Struct(struct_fields) = item_field.data_type().clone() else {
        return Err(Error::InvalidInput("parameter item is not a struct".to_string()));
    };
    let items = StructArray::try_new(
        struct_fields,
        vec![
            Arc::new(StringArray::from(names)) as ArrayRef,
            Arc::new(StringArray::from(values)) as ArrayRef,
        ],
        None,
    )?;
    let offsets = OffsetBuffer::<i32>::from_lengths(rows.iter().map(|r| r.parameters().len()));
    columns.push(Arc::new(ListArray::try_new(
        item_field,
        offsets,
        Arc::new(items),
        None,
    )?));

    Ok(RecordBatch::try_new(joined_schema(), columns)?)
}

/// Row-indexed dict view of a frame (`{row: {column: value}}`).
///
/// Nulls become `null`, non-finite floats follow [`float_to_json`],
/// JSON-encoded text columns are decoded, lists become
/// arrays and structs become arrays of their field values.
///
/// # Errors
///
/// Returns [`Error::Json`] for invalid JSON text and [`Error::InvalidInput`]
/// for column types without a JSON mapping.
pub fn to_dicts(batch: &RecordBatch) -> Result<BTreeMap<usize, Row>> {
    let schema = batch.schema();
    let mut rows = BTreeMap::new();
    for row in 0..batch.num_rows() {
        let mut entry = Row::new();
        for (field, column) in schema.fields().iter().zip(batch.columns()) {
            entry.insert(field.name().clone(), cell(column.as_ref(), field, row)?);
        }
        rows.insert(row, entry);
    }
    Ok(rows)
}

fn downcast<'a, T: 'static>(column: &'a dyn Array, field: &Field) -> Result<&'a T> {
    column.as_any().downcast_ref::<T>().ok_or_else(|| {
        Error::InvalidInput(format!(
            "column {} does not match its declared type {:?}",
            field.name(),
            field.data_type()
        ))
    })
}

fn cell(column: &dyn Array, field: &Field, row: usize) -> Result<Value> {
    if column.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match field.data_type() {
        DataType::UInt64 => json!(downcast::<UInt64Array>(column, field)?.value(row)),
        DataType::Int64 => json!(downcast::<Int64Array>(column, field)?.value(row)),
        DataType::Int32 => json!(downcast::<Int32Array>(column, field)?.value(row)),
        DataType::Float64 => float_to_json(downcast::<Float64Array>(column, field)?.value(row)),
        DataType::Boolean => json!(downcast::<BooleanArray>(column, field)?.value(row)),
        DataType::Utf8 => {
            let text = downcast::<StringArray>(column, field)?.value(row);
            if field.metadata().get(ENCODING_KEY).map(String::as_str) == Some(JSON_ENCODING) {
                serde_json::from_str(text)?
            } else {
                json!(text)
            }
        }
        DataType::List(item_field) => {
            let items = downcast::<ListArray>(column, field)?.value(row);
            (0..items.len())
                .map(|i| cell(items.as_ref(), item_field, i))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)?
        }
        DataType::Struct(fields) => {
            let array = downcast::<StructArray>(column, field)?;
            fields
                .iter()
                .zip(array.columns())
                .map(|(f, c)| cell(c.as_ref(), f, row))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)?
        }
        other => {
            return Err(Error::InvalidInput(format!(
                "column {} has unsupported type {other:?}",
                field.name()
            )))
        }
    };
    Ok(value)
}

/// Write a frame to a Parquet file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be created and [`Error::Parquet`]
/// if encoding fails.
pub fn write_parquet<P: AsRef<Path>>(batch: &RecordBatch, path: P) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    debug!(path = %path.as_ref().display(), rows = batch.num_rows(), "Wrote frame");
    Ok(())
}

/// Read a frame previously written with [`write_parquet`].
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened and [`Error::Parquet`]
/// or [`Error::Arrow`] if it cannot be decoded.
pub fn read_parquet<P: AsRef<Path>>(path: P) -> Result<RecordBatch> {
    let file = File::open(path.as_ref())?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;

    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }
    Ok(concat_batches(&schema, &batches)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::Measurement;

    fn sample() -> EvaluationMap {
        [
            Evaluation::builder(1, "predictive_accuracy")
                .task(31)
                .setup(10)
                .flow(100, "weka.J48")
                .data(31, "credit-g")
                .value(0.71)
                .build(),
            Evaluation::builder(2, "predictive_accuracy")
                .task(31)
                .setup(11)
                .flow(101, "weka.NaiveBayes")
                .data(31, "credit-g")
                .measurement(Measurement::PerFold(json!([[0.7, 0.72]])))
                .build(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_frame_shape() {
        let frame = evaluations_to_frame(&sample()).unwrap();
        assert_eq!(frame.num_rows(), 2);
        assert_eq!(frame.num_columns(), 12);
        assert_eq!(frame.schema(), evaluation_schema());

        let values = frame
            .column(9)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert!((values.value(0) - 0.71).abs() < f64::EPSILON);
        assert!(values.is_null(1));
    }

    #[test]
    fn test_empty_frame_keeps_schema() {
        let frame = evaluations_to_frame(&EvaluationMap::new()).unwrap();
        assert_eq!(frame.num_rows(), 0);
        assert_eq!(frame.num_columns(), 12);
    }

    #[test]
    fn test_dicts_decode_json_columns() {
        let dicts = to_dicts(&evaluations_to_frame(&sample()).unwrap()).unwrap();
        assert_eq!(dicts[&1]["values"], json!([[0.7, 0.72]]));
        assert_eq!(dicts[&0]["values"], Value::Null);
        assert_eq!(dicts[&0]["flow_name"], json!("weka.J48"));
    }
}
