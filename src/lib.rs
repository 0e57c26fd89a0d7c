/*!
 * # pooltrans - pooled client for a job-based translation service
 *
 * Translates text through a remote JSON-RPC translation service, spreading
 * requests over a pool of endpoints (one per configured proxy plus a direct
 * connection) and failing over between them until one succeeds.
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: Endpoint pool, request building and failover:
 *   - `translation::core`: The failover service
 *   - `translation::request`: Request construction
 *   - `translation::response`: Response reassembly
 * - `providers`: Backend implementations (`providers::deepl`)
 * - `transport`: HTTP transports per endpoint, plus an in-memory mock
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod translation;
pub mod transport;

// Re-export main types for easier usage
pub use app_config::{Config, ProxyConfig, TranslationConfig};
pub use errors::{AttemptError, TranslationError, TransportError};
pub use translation::TranslationService;
