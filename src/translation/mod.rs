/*!
 * Multi-endpoint translation over a job-based JSON-RPC service.
 *
 * - `endpoint`: One route to the service with its own session counter
 * - `pool`: Ordered endpoints, proxies first and the direct one last
 * - `request`: Segmentation and request construction
 * - `response`: Response parsing and reassembly
 * - `core`: The failover service tying them together
 */

// Re-export main types for easier usage
pub use self::core::{EndpointReport, TranslationService, UnsupportedLanguages};
pub use self::endpoint::{Endpoint, EndpointLease, EndpointRole, EndpointSession};
pub use self::pool::EndpointPool;
pub use self::request::{RequestBuilder, TranslationJob, TranslationRequest};

// Submodules
pub mod core;
pub mod endpoint;
pub mod pool;
pub mod request;
pub mod response;
