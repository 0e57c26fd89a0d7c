/*!
 * Core translation service implementation.
 *
 * `TranslationService` owns the endpoint pool of one backend and runs the
 * failover loop: every endpoint is tried at most once per call, proxies
 * first and the direct endpoint last, until one returns a fully
 * reassembled translation.
 */

use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::Arc;

use crate::app_config::TranslationConfig;
use crate::errors::{AppError, AttemptError, TranslationError};
use crate::language_utils::{language_codes_match, IsoLanguageService, LanguageDescriptor, LanguageService};
use crate::providers::{create_backend, Backend};
use crate::transport::{HttpSettings, HttpTransportFactory, TransportFactory};
use super::pool::EndpointPool;

/// Phrase sent by `probe`
const PROBE_TEXT: &str = "Hello";

/// Outcome of probing one endpoint
#[derive(Debug)]
pub struct EndpointReport {
    /// Endpoint label (`host:port` or `direct`)
    pub endpoint: String,
    /// Whether this is the direct endpoint
    pub primary: bool,
    /// Translated probe text, or why the endpoint failed
    pub outcome: Result<String, AttemptError>,
}

/// Target languages a backend is known not to handle
#[derive(Debug, Clone, Default)]
pub struct UnsupportedLanguages {
    languages: Vec<String>,
}

impl UnsupportedLanguages {
    pub fn new(languages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            languages: languages.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `target` matches one of the listed languages, ignoring region
    pub fn contains(&self, target: &LanguageDescriptor) -> bool {
        self.languages
            .iter()
            .any(|language| language_codes_match(language, &target.iso_code))
    }
}

/// Multi-endpoint translation service
pub struct TranslationService {
    /// Backend doing the per-endpoint work
    backend: Arc<dyn Backend>,
    /// Endpoints in attempt order
    pool: EndpointPool,
    /// Language metadata lookup
    languages: Arc<dyn LanguageService>,
    /// Pre-flight rejection list of the backend
    unsupported: UnsupportedLanguages,
}

impl TranslationService {
    /// Create a service over real HTTP transports from the configuration
    pub fn new(config: &TranslationConfig) -> Result<Self, AppError> {
        let factory = HttpTransportFactory::new(HttpSettings::from_config(config));
        Self::with_factory(config, &factory)
    }

    /// Create a service whose endpoint transports come from `factory`
    pub fn with_factory(config: &TranslationConfig, factory: &dyn TransportFactory) -> Result<Self, AppError> {
        let backend = create_backend(config);
        let pool = backend.build_endpoints(&config.proxies, factory)?;
        let unsupported = UnsupportedLanguages::new(config.unsupported_for(backend.kind()).iter().cloned());

        info!(
            "{} translator ready with {} endpoint(s)",
            backend.kind().display_name(),
            pool.len()
        );

        Ok(Self::with_parts(backend, pool, Arc::new(IsoLanguageService), unsupported))
    }

    /// Assemble a service from prepared parts
    pub fn with_parts(
        backend: Arc<dyn Backend>,
        pool: EndpointPool,
        languages: Arc<dyn LanguageService>,
        unsupported: UnsupportedLanguages,
    ) -> Self {
        Self {
            backend,
            pool,
            languages,
            unsupported,
        }
    }

    pub fn pool(&self) -> &EndpointPool {
        &self.pool
    }

    fn describe(&self, language_id: &str) -> Result<LanguageDescriptor, TranslationError> {
        self.languages
            .describe(language_id)
            .map_err(|e| TranslationError::Language(e.to_string()))
    }

    /// Translate `source_text` from `source_lang` to `target_lang`.
    ///
    /// Endpoints are tried in pool order, each at most once. Only a fully
    /// reassembled translation is returned; when every endpoint fails the
    /// last failure is reported inside `ServiceExhausted`.
    pub async fn translate(
        &self,
        source_text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        let source = self.describe(source_lang)?;
        let target = self.describe(target_lang)?;

        if self.unsupported.contains(&target) {
            return Err(TranslationError::UnsupportedLanguage {
                backend: self.backend.kind().display_name().to_string(),
                language: target_lang.to_string(),
            });
        }

        if source_text.trim().is_empty() {
            return Ok(String::new());
        }

        let mut attempts = 0;
        let mut last_error = None;

        for endpoint in self.pool.attempt_order() {
            attempts += 1;
            let mut lease = endpoint.acquire().await;
            debug!("Attempt {}/{} on endpoint {}", attempts, self.pool.len(), lease.label());

            match self.backend.attempt(&mut lease, source_text, &source, &target).await {
                Ok(text) => {
                    if attempts > 1 {
                        info!("Endpoint {} succeeded after {} failed attempt(s)", lease.label(), attempts - 1);
                    }
                    return Ok(text);
                }
                Err(e) => {
                    warn!("Endpoint {} failed (attempt {}/{}): {}", lease.label(), attempts, self.pool.len(), e);
                    last_error = Some(e);
                }
            }
        }

        let last = last_error.unwrap_or_else(|| AttemptError::TransportFailure {
            status: None,
            detail: "endpoint pool is empty".to_string(),
            source: None,
        });

        Err(TranslationError::ServiceExhausted {
            attempts,
            last: Box::new(last),
        })
    }

    /// Send a short phrase through every endpoint concurrently.
    ///
    /// Each probe consumes one sequence number on its endpoint.
    pub async fn probe(&self, source_lang: &str, target_lang: &str) -> Result<Vec<EndpointReport>, TranslationError> {
        let source = self.describe(source_lang)?;
        let target = self.describe(target_lang)?;

        let probes = self.pool.attempt_order().map(|endpoint| {
            let source = &source;
            let target = &target;
            async move {
                let mut lease = endpoint.acquire().await;
                let outcome = self.backend.attempt(&mut lease, PROBE_TEXT, source, target).await;
                EndpointReport {
                    endpoint: endpoint.label().to_string(),
                    primary: endpoint.is_primary(),
                    outcome,
                }
            }
        });

        Ok(join_all(probes).await)
    }
}
