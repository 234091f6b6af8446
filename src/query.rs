//! Query construction
//!
//! Listing endpoints take their filters as path segments:
//!
//! ```text
//! evaluation/list/function/predictive_accuracy/limit/100/offset/0/task/31,59/sort_order/desc
//! ```
//!
//! Segment order is fixed: paging (`limit`, `offset`), then scalar filters
//! (`tag`, `per_fold`), then id lists (`run`, `task`, `setup`, `flow`,
//! `uploader`), then `sort_order`.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Ascending order (smallest first)
    Ascending,
    /// Descending order (largest first)
    Descending,
}

impl SortOrder {
    /// Wire literal (`asc` / `desc`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(Error::InvalidInput(format!(
                "sort order must be \"asc\" or \"desc\", got {other:?}"
            ))),
        }
    }
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn push_ids(path: &mut String, segment: &str, ids: Option<&Vec<u64>>) -> Result<()> {
    if let Some(ids) = ids {
        if ids.is_empty() {
            return Err(Error::InvalidInput(format!(
                "the {segment} filter needs at least one id"
            )));
        }
        path.push_str(&format!("/{segment}/{}", join_ids(ids)));
    }
    Ok(())
}

fn check_segment(name: &str, value: &str) -> Result<()> {
    if value.is_empty() || value.contains('/') {
        return Err(Error::InvalidInput(format!(
            "{name} must be non-empty and must not contain '/', got {value:?}"
        )));
    }
    Ok(())
}

/// Filters for `evaluation/list`.
///
/// ```
/// use openml_evaluations::query::{EvaluationQuery, SortOrder};
///
/// let query = EvaluationQuery::new("predictive_accuracy")
///     .tasks([31, 59])
///     .sort_order(SortOrder::Descending);
/// assert_eq!(
///     query.page_path(100, 0).unwrap(),
///     "evaluation/list/function/predictive_accuracy/limit/100/offset/0/task/31,59/sort_order/desc"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EvaluationQuery {
    function: String,
    offset: Option<u64>,
    size: Option<u64>,
    runs: Option<Vec<u64>>,
    tasks: Option<Vec<u64>>,
    setups: Option<Vec<u64>>,
    flows: Option<Vec<u64>>,
    uploaders: Option<Vec<u64>>,
    tag: Option<String>,
    per_fold: Option<bool>,
    sort_order: Option<SortOrder>,
}

impl EvaluationQuery {
    /// Query all evaluations of one metric (evaluation function).
    #[must_use]
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            ..Self::default()
        }
    }

    /// Skip this many results, starting from the first.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Return at most this many results.
    #[must_use]
    pub const fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Restrict to these run ids.
    #[must_use]
    pub fn runs(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.runs = Some(ids.into_iter().collect());
        self
    }

    /// Restrict to these task ids.
    #[must_use]
    pub fn tasks(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.tasks = Some(ids.into_iter().collect());
        self
    }

    /// Restrict to these setup ids.
    #[must_use]
    pub fn setups(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.setups = Some(ids.into_iter().collect());
        self
    }

    /// Restrict to these flow ids.
    #[must_use]
    pub fn flows(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.flows = Some(ids.into_iter().collect());
        self
    }

    /// Restrict to these uploader ids.
    #[must_use]
    pub fn uploaders(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.uploaders = Some(ids.into_iter().collect());
        self
    }

    /// Restrict to runs carrying this tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Ask for per-fold values instead of aggregates.
    #[must_use]
    pub const fn per_fold(mut self, per_fold: bool) -> Self {
        self.per_fold = Some(per_fold);
        self
    }

    /// Order results by value.
    #[must_use]
    pub const fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = Some(order);
        self
    }

    /// Metric name.
    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Requested offset.
    #[must_use]
    pub const fn requested_offset(&self) -> Option<u64> {
        self.offset
    }

    /// Requested maximum result count.
    #[must_use]
    pub const fn requested_size(&self) -> Option<u64> {
        self.size
    }

    /// Check the filters form a valid request without building it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an empty metric or tag, a value
    /// containing `/`, or an empty id list.
    pub fn validate(&self) -> Result<()> {
        self.filter_path().map(|_| ())
    }

    /// Path for one page of results.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn page_path(&self, limit: u64, offset: u64) -> Result<String> {
        self.build(Some(limit), Some(offset))
    }

    /// Path carrying only the filters, no paging segments.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn filter_path(&self) -> Result<String> {
        self.build(None, None)
    }

    fn build(&self, limit: Option<u64>, offset: Option<u64>) -> Result<String> {
        check_segment("metric name", &self.function)?;
        let mut path = format!("evaluation/list/function/{}", self.function);

        if let Some(limit) = limit {
            path.push_str(&format!("/limit/{limit}"));
        }
        if let Some(offset) = offset {
            path.push_str(&format!("/offset/{offset}"));
        }
        if let Some(tag) = &self.tag {
            check_segment("tag", tag)?;
            path.push_str(&format!("/tag/{tag}"));
        }
        if let Some(per_fold) = self.per_fold {
            path.push_str(&format!("/per_fold/{per_fold}"));
        }
        push_ids(&mut path, "run", self.runs.as_ref())?;
        push_ids(&mut path, "task", self.tasks.as_ref())?;
        push_ids(&mut path, "setup", self.setups.as_ref())?;
        push_ids(&mut path, "flow", self.flows.as_ref())?;
        push_ids(&mut path, "uploader", self.uploaders.as_ref())?;
        if let Some(order) = self.sort_order {
            path.push_str(&format!("/sort_order/{order}"));
        }
        Ok(path)
    }
}

/// Filters for `setup/list`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetupQuery {
    setups: Option<Vec<u64>>,
    flow: Option<u64>,
    tag: Option<String>,
    offset: Option<u64>,
    size: Option<u64>,
}

impl SetupQuery {
    /// Query all setups.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to these setup ids.
    #[must_use]
    pub fn setups(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.setups = Some(ids.into_iter().collect());
        self
    }

    /// Restrict to setups of one flow.
    #[must_use]
    pub const fn flow(mut self, flow: u64) -> Self {
        self.flow = Some(flow);
        self
    }

    /// Restrict to setups carrying this tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Skip this many results.
    #[must_use]
    pub const fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Return at most this many results.
    #[must_use]
    pub const fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Requested offset.
    #[must_use]
    pub const fn requested_offset(&self) -> Option<u64> {
        self.offset
    }

    /// Requested maximum result count.
    #[must_use]
    pub const fn requested_size(&self) -> Option<u64> {
        self.size
    }

    /// Path for one page of results.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an empty id list or an invalid tag.
    pub fn page_path(&self, limit: u64, offset: u64) -> Result<String> {
        let mut path = String::from("setup/list");
        push_ids(&mut path, "setup", self.setups.as_ref())?;
        path.push_str(&format!("/limit/{limit}/offset/{offset}"));
        if let Some(flow) = self.flow {
            path.push_str(&format!("/flow/{flow}"));
        }
        if let Some(tag) = &self.tag {
            check_segment("tag", tag)?;
            path.push_str(&format!("/tag/{tag}"));
        }
        Ok(path)
    }
}
