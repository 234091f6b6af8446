//! Error types for openml-evaluations
//!
//! Every failure surfaces to the caller unrecovered. The only error the crate
//! itself absorbs is [`Error::NoResult`], which the paginator reads as the end
//! of a listing.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Server error codes that mean "the filter matched nothing".
///
/// 372 datasets, 482 tasks, 500 flows, 512 runs, 542 evaluations, 674 setups.
pub const NO_RESULT_CODES: [u32; 6] = [372, 482, 500, 512, 542, 674];

/// openml-evaluations error types
#[derive(Error, Debug)]
pub enum Error {
    /// Output format literal not recognized (or not supported by the operation)
    #[error(
        "Invalid output format selected: {0:?}\nOnly 'object', 'dataframe', or 'dict' applicable."
    )]
    InvalidOutputFormat(String),

    /// Caller supplied an argument that cannot form a valid request
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The response document is not rooted at the expected collection tag
    #[error("Error in return XML, does not contain \"{expected}\": {payload}")]
    MissingTag {
        /// Qualified tag name the response should have been rooted at
        expected: &'static str,
        /// Raw response payload, kept for diagnosis
        payload: String,
    },

    /// The document has the right root but the wrong structure beneath it
    #[error("Error in return XML, unexpected shape: {0}")]
    UnexpectedShape(String),

    /// A required field is absent from a record element
    #[error("Missing field \"{field}\" in {record} record")]
    MissingField {
        /// Record kind being decoded
        record: &'static str,
        /// Local name of the missing element
        field: &'static str,
    },

    /// A record element carries a child that is not part of its schema
    #[error("Unexpected field \"{field}\" in {record} record")]
    UnexpectedField {
        /// Record kind being decoded
        record: &'static str,
        /// Local name of the offending element
        field: String,
    },

    /// A field is present but its text does not parse
    #[error("Malformed field \"{field}\" in {record} record: {value:?} ({reason})")]
    MalformedField {
        /// Record kind being decoded
        record: &'static str,
        /// Local name of the malformed element
        field: &'static str,
        /// Raw text of the element
        value: String,
        /// Parser diagnostic
        reason: String,
    },

    /// The payload is not well-formed XML
    #[error("XML parse error: {0}")]
    Xml(String),

    /// The server answered with an error document
    #[error("Server error {code}: {message}{}", detail_suffix(.additional))]
    Server {
        /// Server error code
        code: u32,
        /// Server error message
        message: String,
        /// Additional server information, if any
        additional: Option<String>,
    },

    /// The server reported that the listing matched nothing
    #[error("No results (server code {code}): {message}")]
    NoResult {
        /// Server error code (one of [`NO_RESULT_CODES`])
        code: u32,
        /// Server error message
        message: String,
    },

    /// Non-success HTTP status without a parseable error document
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body
        body: String,
    },

    /// The request could not be performed
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON error (configuration, per-fold values)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow error while building or reading a frame
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error while persisting a frame
    #[error("Parquet error: {0}")]
    Parquet(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn detail_suffix(additional: &Option<String>) -> String {
    additional
        .as_deref()
        .map(|detail| format!(" - {detail}"))
        .unwrap_or_default()
}

impl From<parquet::errors::ParquetError> for Error {
    fn from(err: parquet::errors::ParquetError) -> Self {
        Self::Parquet(err.to_string())
    }
}

impl Error {
    /// Build the error for a server error document, classifying "no results".
    #[must_use]
    pub fn from_server(code: u32, message: String, additional: Option<String>) -> Self {
        if NO_RESULT_CODES.contains(&code) {
            Self::NoResult { code, message }
        } else {
            Self::Server {
                code,
                message,
                additional,
            }
        }
    }

    /// Whether this error means the listing was empty.
    #[must_use]
    pub const fn is_no_result(&self) -> bool {
        matches!(self, Self::NoResult { .. })
    }
}
