//! OpenML API client
//!
//! ```text
//! EvaluationQuery ──page_path──> Transport ──XML──> parse_evaluations ──> EvaluationMap
//!                                                                             │
//!                                          OutputFormat ──> EvaluationListing ┘
//! ```
//!
//! Every operation validates its arguments before touching the network.
//! Setup lookups for the join run sequentially, one call per chunk.

use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::evaluation::{parse_evaluations, parse_measures, EvaluationMap, MEASURES_ENDPOINT};
use crate::join::{chunk_setup_ids, left_join, JoinedEvaluation, SETUP_BATCH_SIZE};
use crate::output::{EvaluationListing, JoinedListing, OutputFormat};
use crate::paging::{self, DEFAULT_BATCH_SIZE};
use crate::query::{EvaluationQuery, SetupQuery};
use crate::setup::{parse_setups, SetupRecord};
use crate::transport::{HttpTransport, Transport};
use crate::xml::{parse_document, server_error};
use crate::{Error, Result};

/// Client for the evaluation-related listing endpoints.
#[derive(Debug, Clone)]
pub struct OpenMlClient<T: Transport = HttpTransport> {
    transport: T,
    batch_size: u64,
}

impl OpenMlClient<HttpTransport> {
    /// Create a client talking HTTP with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for invalid settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(config)?))
    }

    /// Create a client configured from `OPENML_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for unparseable or invalid settings.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }
}

impl<T: Transport> OpenMlClient<T> {
    /// Create a client over an arbitrary transport.
    #[must_use]
    pub const fn with_transport(transport: T) -> Self {
        Self {
            transport,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the page size used for listings (minimum 1).
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// List evaluations matching `query` as typed records keyed by run ID.
    ///
    /// A query that matches nothing yields an empty map.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] for malformed filters (before any call)
    /// - [`Error::Server`] / [`Error::Http`] / [`Error::Transport`] for failed calls
    /// - Schema errors for malformed responses
    #[instrument(skip_all, fields(function = query.function()))]
    pub fn list_evaluations(&self, query: &EvaluationQuery) -> Result<EvaluationMap> {
        query.validate()?;
        let evaluations: EvaluationMap = paging::list_all(
            query.requested_offset(),
            query.requested_size(),
            self.batch_size,
            |limit, offset| {
                let body = self.fetch(&query.page_path(limit, offset)?)?;
                parse_evaluations(&body)
            },
        )?;

        info!(
            function = query.function(),
            count = evaluations.len(),
            "Listed evaluations"
        );
        Ok(evaluations)
    }

    /// List evaluations in the named output format (`object`, `dict` or
    /// `dataframe`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOutputFormat`] for an unknown format before any
    /// call; otherwise as [`list_evaluations`](Self::list_evaluations).
    pub fn list_evaluations_as(
        &self,
        query: &EvaluationQuery,
        format: &str,
    ) -> Result<EvaluationListing> {
        let format: OutputFormat = format.parse()?;
        EvaluationListing::render(self.list_evaluations(query)?, format)
    }

    /// Names of all evaluation measures known to the server, in server order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedShape`] if the response lacks a non-empty
    /// measure list, and transport or server errors for failed calls.
    #[instrument(skip_all)]
    pub fn list_evaluation_measures(&self) -> Result<Vec<String>> {
        let measures = parse_measures(&self.fetch(MEASURES_ENDPOINT)?)?;
        debug!(count = measures.len(), "Listed evaluation measures");
        Ok(measures)
    }

    /// List setups matching `query`.
    ///
    /// # Errors
    ///
    /// As [`list_evaluations`](Self::list_evaluations).
    #[instrument(skip_all)]
    pub fn list_setups(&self, query: &SetupQuery) -> Result<Vec<SetupRecord>> {
        query.page_path(1, 0)?;
        let setups = paging::list_all(
            query.requested_offset(),
            query.requested_size(),
            self.batch_size,
            |limit, offset| {
                let body = self.fetch(&query.page_path(limit, offset)?)?;
                parse_setups(&body)
            },
        )?;
        Ok(setups.into_inner())
    }

    /// List evaluations with the parameter settings of their setups attached.
    ///
    /// Setups are fetched in chunks of [`SETUP_BATCH_SIZE`] distinct IDs. When
    /// no evaluation matches, no setup call is made.
    ///
    /// # Errors
    ///
    /// As [`list_evaluations`](Self::list_evaluations), plus failures of the
    /// setup calls.
    #[instrument(skip_all, fields(function = query.function()))]
    pub fn list_evaluations_setups(&self, query: &EvaluationQuery) -> Result<Vec<JoinedEvaluation>> {
        let evaluations = self.list_evaluations(query)?;
        if evaluations.is_empty() {
            return Ok(Vec::new());
        }

        let setup_ids = evaluations.unique_setup_ids();
        let chunks = chunk_setup_ids(&setup_ids, SETUP_BATCH_SIZE);
        let mut setups = Vec::with_capacity(setup_ids.len());
        for (index, chunk) in chunks.iter().enumerate() {
            let found = self.list_setups(&SetupQuery::new().setups(chunk.iter().copied()))?;
            debug!(
                chunk = index,
                requested = chunk.len(),
                found = found.len(),
                "Fetched setup chunk"
            );
            setups.extend(found);
        }

        if setups.len() < setup_ids.len() {
            warn!(
                requested = setup_ids.len(),
                found = setups.len(),
                "Some setups were not returned; their evaluations carry no parameters"
            );
        }

        Ok(left_join(&evaluations, &setups))
    }

    /// Joined listing as a frame (`dataframe`) or row-indexed mappings
    /// (`dict`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOutputFormat`] for `object` or an unknown
    /// format before any call; otherwise as
    /// [`list_evaluations_setups`](Self::list_evaluations_setups).
    pub fn list_evaluations_setups_as(
        &self,
        query: &EvaluationQuery,
        format: &str,
    ) -> Result<JoinedListing> {
        let format: OutputFormat = format.parse()?;
        JoinedListing::check_format(format)?;
        let rows = self.list_evaluations_setups(query)?;
        JoinedListing::render(&rows, format)
    }

    /// Perform one call and return the body of a successful response.
    fn fetch(&self, endpoint: &str) -> Result<String> {
        debug!(endpoint, "GET");
        let response = self.transport.get(endpoint)?;
        if response.is_success() {
            return Ok(response.body);
        }

        match parse_document(&response.body).ok().and_then(|root| server_error(&root)) {
            Some(err) => {
                debug!(endpoint, status = response.status, error = %err, "Server returned error document");
                Err(err)
            }
            None => Err(Error::Http {
                status: response.status,
                body: response.body,
            }),
        }
    }
}
