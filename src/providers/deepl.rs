use async_trait::async_trait;
use log::debug;

use crate::app_config::{BackendKind, ProxyConfig};
use crate::errors::{AttemptError, TransportError};
use crate::language_utils::LanguageDescriptor;
use crate::transport::{body_snippet, HttpMethod, TransportFactory};
use crate::translation::request::RequestBuilder;
use crate::translation::response;
use crate::translation::{EndpointLease, EndpointPool};
use super::Backend;

/// JSON-RPC job endpoint of the DeepL web translator
#[derive(Debug, Clone)]
pub struct DeeplBackend {
    /// JSON-RPC URL
    service_url: String,
    /// Fixed first sequence number, random per endpoint when `None`
    initial_sequence: Option<u64>,
}

impl DeeplBackend {
    pub fn new(service_url: impl Into<String>, initial_sequence: Option<u64>) -> Self {
        Self {
            service_url: service_url.into(),
            initial_sequence,
        }
    }
}

#[async_trait]
impl Backend for DeeplBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Deepl
    }

    fn build_endpoints(
        &self,
        proxies: &[ProxyConfig],
        factory: &dyn TransportFactory,
    ) -> Result<EndpointPool, TransportError> {
        EndpointPool::create(proxies, factory, self.initial_sequence)
    }

    async fn attempt(
        &self,
        lease: &mut EndpointLease<'_>,
        source_text: &str,
        source: &LanguageDescriptor,
        target: &LanguageDescriptor,
    ) -> Result<String, AttemptError> {
        let (request, body) = RequestBuilder::build(lease.session_mut(), source_text, source, target)?;
        debug!(
            "[{}] Sending request {} with {} job(s)",
            lease.label(),
            request.id,
            request.jobs.len()
        );

        let response = lease
            .transport()
            .request(&self.service_url, HttpMethod::Post, &body, true)
            .await;

        if !response.success {
            return Err(AttemptError::TransportFailure {
                status: response.status,
                detail: body_snippet(&response.body, 200),
                source: response.error,
            });
        }

        response::reassemble(&response.body, &request)
    }
}
