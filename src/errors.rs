/*!
 * Error types for the pooltrans library.
 *
 * Errors are layered the same way requests flow through the client:
 * - `TransportError`: a fault reported by the HTTP layer of one endpoint
 * - `AttemptError`: why a single attempt on one endpoint failed (always retryable)
 * - `TranslationError`: what a caller of `translate` can observe
 * - `AppError`: top-level wrapper returned when building a service
 */

use thiserror::Error;

/// Faults raised by a transport while talking to the remote service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The request could not be sent or its body could not be read
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The connection to the service (or to the proxy) could not be established
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The transport gave up waiting for the service
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// A proxy descriptor could not be turned into a usable route
    #[error("Invalid proxy configuration: {0}")]
    InvalidProxy(String),

    /// The underlying HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Reasons a single attempt on one endpoint failed.
///
/// Every variant is retryable: the orchestrator moves on to the next endpoint.
#[derive(Error, Debug)]
pub enum AttemptError {
    /// The transport reported a non-successful exchange
    #[error("Response by translator service is not successful{}: {detail}", status_suffix(.status))]
    TransportFailure {
        /// HTTP status, when the service answered at all
        status: Option<u16>,
        /// Diagnostic text, usually the start of the response body
        detail: String,
        /// Underlying transport fault, when one was captured
        #[source]
        source: Option<TransportError>,
    },

    /// The response body did not have the expected shape
    #[error("Unexpected translation response: {0}")]
    MalformedResponse(String),

    /// The response was well-formed but carried no translated text
    #[error("Translation response contained no translated text")]
    EmptyTranslation,

    /// The request payload could not be encoded
    #[error("Failed to encode translation request: {0}")]
    Encoding(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    }
}

/// Errors surfaced to callers of `TranslationService::translate`
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The backend is known not to work for the requested target language
    #[error("{backend} translator is unavailable for language '{language}'")]
    UnsupportedLanguage {
        /// Backend identifier
        backend: String,
        /// Target language as requested by the caller
        language: String,
    },

    /// A language identifier could not be resolved
    #[error("Language error: {0}")]
    Language(String),

    /// Every endpoint in the pool was tried and failed
    #[error("Translation service exhausted after {attempts} attempt(s): {last}")]
    ServiceExhausted {
        /// Number of endpoints attempted
        attempts: usize,
        /// Failure of the last attempted endpoint
        #[source]
        last: Box<AttemptError>,
    },
}

impl TranslationError {
    /// Returns the underlying transport fault of the last attempt, if any
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            Self::ServiceExhausted { last, .. } => match last.as_ref() {
                AttemptError::TransportFailure { source, .. } => source.as_ref(),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error while building endpoint transports
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),
}
