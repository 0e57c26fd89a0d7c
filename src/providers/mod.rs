/*!
 * Backend implementations for remote translation services.
 *
 * A backend knows how to lay out its endpoint pool and how to run one
 * translation attempt on a leased endpoint (request format, URL, response
 * parsing). The failover loop in `translation::core` is shared by all
 * backends.
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{BackendKind, ProxyConfig, TranslationConfig};
use crate::errors::{AttemptError, TransportError};
use crate::language_utils::LanguageDescriptor;
use crate::transport::TransportFactory;
use crate::translation::{EndpointLease, EndpointPool};

pub mod deepl;

pub use self::deepl::DeeplBackend;

/// Capability interface of a translation backend
#[async_trait]
pub trait Backend: Send + Sync + Debug {
    /// Which backend this is
    fn kind(&self) -> BackendKind;

    /// Build the endpoint pool this backend attempts requests on
    ///
    /// # Arguments
    /// * `proxies` - Proxy descriptors, one endpoint each
    /// * `factory` - Builds the transport of every endpoint
    fn build_endpoints(
        &self,
        proxies: &[ProxyConfig],
        factory: &dyn TransportFactory,
    ) -> Result<EndpointPool, TransportError>;

    /// Run one translation attempt on a leased endpoint
    ///
    /// # Returns
    /// * `Result<String, AttemptError>` - The reassembled text, or why this endpoint failed
    async fn attempt(
        &self,
        lease: &mut EndpointLease<'_>,
        source_text: &str,
        source: &LanguageDescriptor,
        target: &LanguageDescriptor,
    ) -> Result<String, AttemptError>;
}

/// Create the backend selected in the configuration
pub fn create_backend(config: &TranslationConfig) -> Arc<dyn Backend> {
    match config.backend {
        BackendKind::Deepl => Arc::new(DeeplBackend::new(
            config.service_url.clone(),
            config.initial_sequence,
        )),
    }
}
