/*!
 * Scripted transport for tests.
 *
 * A `MockTransportFactory` hands out one `MockTransport` per endpoint. Every
 * call lands in a log shared by all transports of the factory, so tests can
 * assert which endpoints were tried, in which order, and with which payload.
 * Replies are scripted per endpoint label (`host:port` or `direct`):
 * - a queue of one-shot replies, consumed in order
 * - a fallback reply used once the queue is empty
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::ProxyConfig;
use crate::errors::TransportError;
use super::{HttpMethod, HttpResponse, Transport, TransportFactory};

/// Scripted outcome of one call
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// 200 with the given body
    Body(String),
    /// Non-success status with the given body
    Status(u16, String),
    /// Transport fault, no response
    Fault(TransportError),
    /// Sleep, then answer with the inner reply
    Delayed(u64, Box<MockReply>),
}

impl MockReply {
    /// 200 response with a body
    pub fn body(body: impl Into<String>) -> Self {
        Self::Body(body.into())
    }

    /// A 503 with a short diagnostic body
    pub fn unavailable() -> Self {
        Self::Status(503, "Service Unavailable".to_string())
    }

    /// A connection failure
    pub fn connection_refused() -> Self {
        Self::Fault(TransportError::ConnectionError("connection refused".to_string()))
    }
}

/// One request seen by a mock transport
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Endpoint label of the transport that received the call
    pub endpoint: String,
    pub url: String,
    pub method: HttpMethod,
    pub body: String,
    pub accept_cookie: bool,
}

type CallLog = Arc<Mutex<Vec<RecordedCall>>>;

/// In-memory transport replaying scripted replies
#[derive(Debug)]
pub struct MockTransport {
    label: String,
    queue: Mutex<VecDeque<MockReply>>,
    fallback: MockReply,
    calls: CallLog,
}

impl MockTransport {
    /// Standalone transport answering every call with `fallback`
    pub fn new(label: impl Into<String>, fallback: MockReply) -> Self {
        Self {
            label: label.into(),
            queue: Mutex::new(VecDeque::new()),
            fallback,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a one-shot reply ahead of the fallback
    pub fn push_reply(&self, reply: MockReply) {
        self.queue.lock().push_back(reply);
    }

    /// Calls received so far
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    fn respond(reply: MockReply) -> std::pin::Pin<Box<dyn std::future::Future<Output = HttpResponse> + Send>> {
        Box::pin(async move {
            match reply {
                MockReply::Body(body) => HttpResponse::ok(body),
                MockReply::Status(status, body) => HttpResponse::status(status, body),
                MockReply::Fault(error) => HttpResponse::failed(error),
                MockReply::Delayed(delay_ms, inner) => {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    Self::respond(*inner).await
                }
            }
        })
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, url: &str, method: HttpMethod, body: &str, accept_cookie: bool) -> HttpResponse {
        self.calls.lock().push(RecordedCall {
            endpoint: self.label.clone(),
            url: url.to_string(),
            method,
            body: body.to_string(),
            accept_cookie,
        });

        let reply = self
            .queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        Self::respond(reply).await
    }
}

/// Factory of mock transports sharing one call log
#[derive(Debug)]
pub struct MockTransportFactory {
    default_reply: MockReply,
    replies: HashMap<String, MockReply>,
    queued: HashMap<String, Vec<MockReply>>,
    calls: CallLog,
}

impl MockTransportFactory {
    /// Every endpoint answers with `default_reply` unless scripted otherwise
    pub fn new(default_reply: MockReply) -> Self {
        Self {
            default_reply,
            replies: HashMap::new(),
            queued: HashMap::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fallback reply for the endpoint with `label`
    pub fn reply_for(mut self, label: impl Into<String>, reply: MockReply) -> Self {
        self.replies.insert(label.into(), reply);
        self
    }

    /// One-shot replies for the endpoint with `label`, consumed before its fallback
    pub fn queue_for(mut self, label: impl Into<String>, replies: Vec<MockReply>) -> Self {
        self.queued.entry(label.into()).or_default().extend(replies);
        self
    }

    /// Every call made through any transport of this factory, in order
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Endpoint labels in call order
    pub fn called_endpoints(&self) -> Vec<String> {
        self.calls.lock().iter().map(|call| call.endpoint.clone()).collect()
    }
}

impl TransportFactory for MockTransportFactory {
    fn create(&self, proxy: Option<&ProxyConfig>) -> Result<Arc<dyn Transport>, TransportError> {
        let label = proxy.map(|p| p.label()).unwrap_or_else(|| "direct".to_string());
        let fallback = self
            .replies
            .get(&label)
            .cloned()
            .unwrap_or_else(|| self.default_reply.clone());

        let transport = MockTransport {
            label: label.clone(),
            queue: Mutex::new(self.queued.get(&label).cloned().unwrap_or_default().into()),
            fallback,
            calls: Arc::clone(&self.calls),
        };

        Ok(Arc::new(transport))
    }
}
