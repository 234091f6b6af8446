//! Output representations
//!
//! Fetching always yields typed records; the caller's [`OutputFormat`] only
//! picks which conversion runs afterwards.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use arrow::record_batch::RecordBatch;

use crate::evaluation::EvaluationMap;
use crate::frame::{self, Row};
use crate::join::JoinedEvaluation;
use crate::{Error, Result};

/// Requested result shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Typed records (`object`)
    Object,
    /// Plain mappings (`dict`)
    Dict,
    /// Arrow frame (`dataframe`)
    DataFrame,
}

impl OutputFormat {
    /// The literal callers use to select this format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Dict => "dict",
            Self::DataFrame => "dataframe",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "object" => Ok(Self::Object),
            "dict" => Ok(Self::Dict),
            "dataframe" => Ok(Self::DataFrame),
            other => Err(Error::InvalidOutputFormat(other.to_string())),
        }
    }
}

/// An evaluation listing in the requested shape.
#[derive(Debug, Clone)]
pub enum EvaluationListing {
    /// Typed records keyed by run ID
    Objects(EvaluationMap),
    /// `(run_id, row)` pairs in response order
    Dicts(Vec<(u64, Row)>),
    /// One row per evaluation
    Frame(RecordBatch),
}

impl EvaluationListing {
    /// Convert typed records into `format`.
    ///
    /// # Errors
    ///
    /// Returns frame-building errors for [`OutputFormat::DataFrame`].
    pub fn render(evaluations: EvaluationMap, format: OutputFormat) -> Result<Self> {
        Ok(match format {
            OutputFormat::Object => Self::Objects(evaluations),
            OutputFormat::Dict => Self::Dicts(evaluations.to_dicts()),
            OutputFormat::DataFrame => Self::Frame(frame::evaluations_to_frame(&evaluations)?),
        })
    }

    /// Number of evaluations.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Objects(map) => map.len(),
            Self::Dicts(rows) => rows.len(),
            Self::Frame(batch) => batch.num_rows(),
        }
    }

    /// Whether the listing is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The format this listing is in.
    #[must_use]
    pub const fn format(&self) -> OutputFormat {
        match self {
            Self::Objects(_) => OutputFormat::Object,
            Self::Dicts(_) => OutputFormat::Dict,
            Self::Frame(_) => OutputFormat::DataFrame,
        }
    }
}

/// An evaluation + setup listing in the requested shape.
#[derive(Debug, Clone)]
pub enum JoinedListing {
    /// Row-indexed mappings (`{row: {column: value}}`)
    Dicts(BTreeMap<usize, Row>),
    /// One row per evaluation, with a `parameters` column
    Frame(RecordBatch),
}

impl JoinedListing {
    /// Check `format` is supported by the join before any work is done.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOutputFormat`] for [`OutputFormat::Object`].
    pub fn check_format(format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Object => Err(Error::InvalidOutputFormat(format!(
                "{format} (the setup join supports only 'dataframe' or 'dict')"
            ))),
            OutputFormat::Dict | OutputFormat::DataFrame => Ok(()),
        }
    }

    /// Convert joined rows into `format`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOutputFormat`] for [`OutputFormat::Object`] and
    /// frame-building errors otherwise.
    pub fn render(rows: &[JoinedEvaluation], format: OutputFormat) -> Result<Self> {
        Self::check_format(format)?;
        let batch = frame::joined_to_frame(rows)?;
        Ok(match format {
            OutputFormat::Dict => Self::Dicts(frame::to_dicts(&batch)?),
            _ => Self::Frame(batch),
        })
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Dicts(rows) => rows.len(),
            Self::Frame(batch) => batch.num_rows(),
        }
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::Evaluation;

    #[test]
    fn test_parse_formats() {
        assert_eq!("object".parse::<OutputFormat>().unwrap(), OutputFormat::Object);
        assert_eq!("dict".parse::<OutputFormat>().unwrap(), OutputFormat::Dict);
        assert_eq!(
            "dataframe".parse::<OutputFormat>().unwrap(),
            OutputFormat::DataFrame
        );
        for bad in ["", "DataFrame", "json", "objects"] {
            assert!(matches!(
                bad.parse::<OutputFormat>(),
                Err(Error::InvalidOutputFormat(_))
            ));
        }
    }

    #[test]
    fn test_render_each_format() {
        let map: EvaluationMap = (1..=3)
            .map(|i| Evaluation::builder(i, "f").value(0.5).build())
            .collect();
        for format in [OutputFormat::Object, OutputFormat::Dict, OutputFormat::DataFrame] {
            let listing = EvaluationListing::render(map.clone(), format).unwrap();
            assert_eq!(listing.len(), 3);
            assert_eq!(listing.format(), format);
        }
    }

    #[test]
    fn test_join_rejects_object() {
        assert!(matches!(
            JoinedListing::render(&[], OutputFormat::Object),
            Err(Error::InvalidOutputFormat(_))
        ));
        assert!(JoinedListing::render(&[], OutputFormat::Dict).unwrap().is_empty());
    }
}
