use log::debug;

use crate::app_config::ProxyConfig;
use crate::errors::TransportError;
use crate::transport::TransportFactory;
use super::endpoint::{Endpoint, EndpointSession};

/// Ordered set of endpoints: every proxy in configuration order, then the direct one.
///
/// Membership is fixed at construction; the pool is never empty.
#[derive(Debug)]
pub struct EndpointPool {
    endpoints: Vec<Endpoint>,
}

impl EndpointPool {
    /// Build one endpoint per proxy plus the primary endpoint.
    ///
    /// Each endpoint gets its own transport and session. With
    /// `initial_sequence` every session starts from that value, otherwise
    /// from a random ordinal.
    pub fn create(
        proxies: &[ProxyConfig],
        factory: &dyn TransportFactory,
        initial_sequence: Option<u64>,
    ) -> Result<Self, TransportError> {
        let session = || match initial_sequence {
            Some(value) => EndpointSession::new(value),
            None => EndpointSession::random(),
        };

        let mut endpoints = Vec::with_capacity(proxies.len() + 1);
        for proxy in proxies {
            let transport = factory.create(Some(proxy))?;
            endpoints.push(Endpoint::proxied(proxy.clone(), transport, session()));
        }
        endpoints.push(Endpoint::primary(factory.create(None)?, session()));

        debug!(
            "Endpoint pool ready: {}",
            endpoints.iter().map(|e| e.label()).collect::<Vec<_>>().join(", ")
        );

        Ok(Self { endpoints })
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Endpoints in attempt order (proxies first, primary last)
    pub fn attempt_order(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    /// The direct endpoint
    pub fn primary(&self) -> Option<&Endpoint> {
        self.endpoints.last().filter(|e| e.is_primary())
    }
}
