/*!
 * HTTP transport boundary.
 *
 * The translator never talks to `reqwest` directly: each endpoint owns a
 * `Transport` built by a `TransportFactory`, which lets proxied endpoints
 * route through their proxy, keeps cookies per endpoint, and lets tests
 * swap the network for a scripted double.
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::ProxyConfig;
use crate::errors::TransportError;

pub mod http;
pub mod mock;

pub use self::http::{HttpSettings, HttpTransport, HttpTransportFactory};
pub use self::mock::{MockReply, MockTransport, MockTransportFactory, RecordedCall};

/// HTTP method of a transport request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Outcome of one network exchange
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// Whether the exchange succeeded (2xx status)
    pub success: bool,
    /// HTTP status, if the service answered
    pub status: Option<u16>,
    /// Raw body; on failure it may still hold diagnostic text
    pub body: String,
    /// Underlying transport fault, if one was captured
    pub error: Option<TransportError>,
}

impl HttpResponse {
    /// A 200 response carrying `body`
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            success: true,
            status: Some(200),
            body: body.into(),
            error: None,
        }
    }

    /// A response with a non-success status
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            success: (200..300).contains(&status),
            status: Some(status),
            body: body.into(),
            error: None,
        }
    }

    /// A failed exchange without any response from the service
    pub fn failed(error: TransportError) -> Self {
        Self {
            success: false,
            status: None,
            body: String::new(),
            error: Some(error),
        }
    }
}

/// Performs network requests on behalf of one endpoint
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Send `body` to `url`.
    ///
    /// Cookies previously accepted by this transport are always sent;
    /// cookies set by this response are stored only when `accept_cookie` is true.
    async fn request(&self, url: &str, method: HttpMethod, body: &str, accept_cookie: bool) -> HttpResponse;
}

/// Builds one transport per endpoint
pub trait TransportFactory: Send + Sync {
    /// Create a transport routed through `proxy`, or a direct one when `None`
    fn create(&self, proxy: Option<&ProxyConfig>) -> Result<Arc<dyn Transport>, TransportError>;
}

/// First `limit` characters of a body, for log lines and error details
pub fn body_snippet(body: &str, limit: usize) -> String {
    if body.chars().count() > limit {
        let mut snippet: String = body.chars().take(limit).collect();
        snippet.push_str("...");
        snippet
    } else {
        body.to_string()
    }
}
