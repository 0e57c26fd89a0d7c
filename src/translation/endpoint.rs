/*!
 * Endpoints and their session state.
 *
 * An endpoint is one network path to the service (direct, or through one
 * proxy). It owns a transport and a session whose sequence counter must
 * advance once per attempted request. The session sits behind an async
 * mutex that is held for a whole attempt, so two calls never interleave
 * ordinals on the same endpoint.
 */

use rand::Rng;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::app_config::ProxyConfig;
use crate::transport::Transport;

/// Session state carried across requests on one endpoint
#[derive(Debug)]
pub struct EndpointSession {
    sequence: u64,
}

impl EndpointSession {
    pub fn new(initial_sequence: u64) -> Self {
        Self {
            sequence: initial_sequence,
        }
    }

    /// Session starting at a random ordinal, as the web client does
    pub fn random() -> Self {
        let base: u64 = rand::rng().random_range(1_000..10_000);
        Self::new(base * 10_000 + 1)
    }

    /// Value the next request will use
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Consume the current value and move the counter forward by one
    ///
    /// Wraps at `u64::MAX`; configured starting values are capped well below it.
    pub fn advance(&mut self) -> u64 {
        let current = self.sequence;
        self.sequence = self.sequence.wrapping_add(1);
        current
    }
}

/// Where an endpoint sends its traffic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointRole {
    /// Through a configured proxy
    Proxied(ProxyConfig),
    /// Direct connection, tried last
    Primary,
}

/// One configured network path with its own session
pub struct Endpoint {
    role: EndpointRole,
    label: String,
    transport: Arc<dyn Transport>,
    session: Mutex<EndpointSession>,
}

impl Endpoint {
    /// The direct endpoint
    pub fn primary(transport: Arc<dyn Transport>, session: EndpointSession) -> Self {
        Self {
            role: EndpointRole::Primary,
            label: "direct".to_string(),
            transport,
            session: Mutex::new(session),
        }
    }

    /// An endpoint routed through `proxy`
    pub fn proxied(proxy: ProxyConfig, transport: Arc<dyn Transport>, session: EndpointSession) -> Self {
        Self {
            label: proxy.label(),
            role: EndpointRole::Proxied(proxy),
            transport,
            session: Mutex::new(session),
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self.role, EndpointRole::Primary)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Current counter value; waits while an attempt holds the endpoint
    pub async fn sequence(&self) -> u64 {
        self.session.lock().await.sequence()
    }

    /// Take exclusive use of this endpoint for one attempt
    pub async fn acquire(&self) -> EndpointLease<'_> {
        EndpointLease {
            endpoint: self,
            session: self.session.lock().await,
        }
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("label", &self.label)
            .field("primary", &self.is_primary())
            .finish_non_exhaustive()
    }
}

/// Exclusive access to one endpoint for the duration of an attempt
pub struct EndpointLease<'a> {
    endpoint: &'a Endpoint,
    session: MutexGuard<'a, EndpointSession>,
}

impl EndpointLease<'_> {
    pub fn label(&self) -> &str {
        self.endpoint.label()
    }

    pub fn transport(&self) -> &dyn Transport {
        self.endpoint.transport.as_ref()
    }

    pub fn session_mut(&mut self) -> &mut EndpointSession {
        &mut self.session
    }
}
