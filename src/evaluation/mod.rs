//! Evaluation records (`evaluation/list`, `evaluationmeasure/list`)
//!
//! ## Schema Overview
//!
//! ```text
//! EvaluationMap (run_id -> Evaluation, response order)
//!     Evaluation ── Measurement? (Value | PerFold | ArrayData)
//!         │
//!         └── setup_id ──> SetupRecord (see `setup`)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use openml_evaluations::evaluation::parse_evaluations;
//!
//! let xml = r#"<oml:evaluations xmlns:oml="http://openml.org/openml">
//!   <oml:evaluation>
//!     <oml:run_id>1</oml:run_id><oml:task_id>68</oml:task_id>
//!     <oml:setup_id>1</oml:setup_id><oml:flow_id>61</oml:flow_id>
//!     <oml:flow_name>weka.ZeroR(1)</oml:flow_name><oml:data_id>61</oml:data_id>
//!     <oml:data_name>iris</oml:data_name><oml:function>predictive_accuracy</oml:function>
//!     <oml:upload_time>2014-04-06 23:30:40</oml:upload_time>
//!     <oml:value>0.333333</oml:value>
//!   </oml:evaluation>
//! </oml:evaluations>"#;
//!
//! let evaluations = parse_evaluations(xml)?;
//! assert_eq!(evaluations.len(), 1);
//! assert_eq!(evaluations.get(1).and_then(|e| e.value()), Some(0.333333));
//! # Ok::<(), openml_evaluations::Error>(())
//! ```

mod collection;
mod decode;
mod measures;
mod record;

pub use collection::EvaluationMap;
pub use decode::{decode_evaluation, decode_evaluations, parse_evaluations, EVALUATIONS_TAG};
pub use measures::{parse_measures, MEASURES_ENDPOINT, MEASURES_TAG};
pub use record::{float_to_json, Evaluation, EvaluationBuilder, Measurement, UPLOAD_TIME_FORMAT};
