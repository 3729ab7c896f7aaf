//! Error types for the ledger client and export pipeline.

use serde::Deserialize;

/// All errors that can occur while talking to the ledger API or producing
/// an export.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// HTTP transport failed (timeout, TLS, body read).
    #[cfg(feature = "async")]
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The API could not be reached at all.
    #[cfg(feature = "async")]
    #[error(
        "cannot reach the API at {base_url}; make sure the ledger server is running and the configured URL matches its port"
    )]
    Unreachable {
        /// Base URL the client was configured with.
        base_url: String,
        /// Underlying connection error.
        #[source]
        source: reqwest::Error,
    },

    /// The configured base URL is not a valid URL.
    #[cfg(feature = "async")]
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),

    /// The server answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Normalized server error message.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A page violated the paging contract.
    #[error("malformed page {page}: {reason}")]
    MalformedPage {
        /// One-based page number.
        page: u32,
        /// What was wrong with it.
        reason: String,
    },

    /// Paging stopped before the reported total was reached.
    #[error("incomplete fetch: server reported {expected} transactions but only {received} were returned")]
    IncompleteFetch {
        /// Total reported by the server.
        expected: usize,
        /// Rows actually received.
        received: usize,
    },

    /// The fetch loop hit its page bound without converging.
    #[error("fetch did not converge within {limit} pages")]
    PageLimitExceeded {
        /// Maximum number of pages allowed for this fetch.
        limit: u32,
    },

    /// A running total left the range of the decimal type.
    #[error("{total} total overflowed while adding transaction {id}")]
    AmountOverflow {
        /// Which total overflowed (`income`, `outflow` or `net`).
        total: &'static str,
        /// Transaction being added, or the last one added for `net`.
        id: i64,
    },

    /// A transaction kind outside the closed set of known kinds.
    #[error("unknown transaction kind: {0:?}")]
    UnknownKind(String),

    /// Delimited-text encoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The document engine failed to produce a PDF.
    #[error("document error: {0}")]
    Document(String),

    /// Writing an export to its destination failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file sink could not accept the export.
    #[error("sink error: {0}")]
    Sink(String),

    /// No access token was configured.
    #[error("no API access token was provided")]
    MissingToken,

    /// An internal lock was poisoned by a panicking holder.
    #[error("internal state lock poisoned: {0}")]
    Poisoned(String),

    /// An export was requested while the session was not idle.
    #[error("export rejected: session is {state}")]
    ExportBusy {
        /// Human-readable name of the current session state.
        state: &'static str,
    },
}

#[cfg(feature = "async")]
impl From<reqwest::Error> for LedgerError {
    #[inline]
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err)
    }
}

/// Convenience alias for results with [`LedgerError`].
pub type Result<T> = core::result::Result<T, LedgerError>;

/// Error body returned by the ledger API.
///
/// The server uses several shapes. Fields are tried in the order
/// `message`, `errors`, `error`, and a field that is empty falls through
/// to the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiErrorBody {
    /// `"..."` or `["...", "..."]`.
    #[serde(default)]
    pub message: Option<MessageText>,
    /// Individual error strings.
    #[serde(default)]
    pub errors: Option<Vec<String>>,
    /// `"..."` or `{ "message": "..." }`.
    #[serde(default)]
    pub error: Option<NestedError>,
}

/// A `message` field that is either a single string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MessageText {
    /// Single message.
    Single(String),
    /// Several messages, e.g. from request validation.
    Many(Vec<String>),
}

/// An `error` field that is either a string or an object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum NestedError {
    /// Plain error string.
    Text(String),
    /// Error object with an optional message.
    Detail {
        /// Message carried by the object, if any.
        #[serde(default)]
        message: Option<String>,
    },
}

impl ApiErrorBody {
    /// Collapses the body into a single message, or `None` if it carries
    /// nothing usable.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        let message = self.message.map(|text| match text {
            MessageText::Single(text) => text,
            MessageText::Many(parts) => parts.join("; "),
        });
        let errors = self.errors.map(|parts| parts.join("; "));
        let error = self.error.and_then(|error| match error {
            NestedError::Text(text) => Some(text),
            NestedError::Detail { message } => message,
        });
        [message, errors, error]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
    }
}

/// Turns a raw error response body into the message shown to users.
///
/// Falls back to `Request failed with status <status>` when the body is
/// empty, not JSON, or of an unknown shape.
#[must_use]
pub fn normalize_api_error(status: u16, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(ApiErrorBody::into_message)
        .unwrap_or_else(|| format!("Request failed with status {status}"))
}
