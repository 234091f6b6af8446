//! # openml-evaluations: OpenML Evaluation Listing Client
//!
//! **Version**: 0.1.0
//!
//! Lists run evaluations from an OpenML server by metric and filters, returns
//! them as typed records, plain mappings or Arrow frames, and joins them with
//! the hyperparameter settings of their setups.
//!
//! ## Design Principles
//!
//! - **Validate first**: output formats and filters are checked before any call
//! - **Typed core**: every listing is decoded into records; other shapes are
//!   conversions of those records
//! - **Bounded requests**: pagination honours `size`, setup lookups go out in
//!   chunks of at most 100 IDs
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use openml_evaluations::{EvaluationQuery, OpenMlClient, SortOrder};
//!
//! let client = OpenMlClient::from_env()?;
//! let query = EvaluationQuery::new("predictive_accuracy")
//!     .tasks([59])
//!     .sort_order(SortOrder::Descending)
//!     .size(10);
//!
//! for evaluation in client.list_evaluations(&query)?.iter() {
//!     println!("{} {:?}", evaluation.flow_name(), evaluation.value());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod analysis;
pub mod client;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod frame;
pub mod join;
pub mod output;
pub mod paging;
pub mod query;
pub mod setup;
pub mod transport;
pub mod xml;

pub use client::OpenMlClient;
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use evaluation::{Evaluation, EvaluationMap, Measurement};
pub use join::JoinedEvaluation;
pub use output::{EvaluationListing, JoinedListing, OutputFormat};
pub use query::{EvaluationQuery, SetupQuery, SortOrder};
pub use setup::{Parameter, ParameterSetting, SetupRecord};
pub use transport::{HttpResponse, HttpTransport, Transport};
