use async_trait::async_trait;
use log::{debug, error};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{self, HeaderValue};
use reqwest::{Client, Proxy, Url};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::{ProxyConfig, TranslationConfig};
use crate::errors::TransportError;
use super::{body_snippet, HttpMethod, HttpResponse, Transport, TransportFactory};

/// Client settings shared by every endpoint transport
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Request timeout
    pub timeout: Duration,
    /// User agent header
    pub user_agent: String,
}

impl HttpSettings {
    /// Settings taken from the translation configuration
    pub fn from_config(config: &TranslationConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// `reqwest` transport for a single endpoint, with its own cookie jar
#[derive(Debug)]
pub struct HttpTransport {
    /// HTTP client, routed through the endpoint's proxy if it has one
    client: Client,
    /// Cookies accepted on this endpoint
    cookies: Arc<Jar>,
    /// Label for log lines
    label: String,
}

impl HttpTransport {
    /// Create a transport routed through `proxy`, or a direct one
    pub fn new(proxy: Option<&ProxyConfig>, settings: &HttpSettings) -> Result<Self, TransportError> {
        let mut builder = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent.as_str())
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60));

        let label = match proxy {
            Some(proxy) => {
                let mut route = Proxy::all(proxy.url())
                    .map_err(|e| TransportError::InvalidProxy(format!("{}: {}", proxy.label(), e)))?;
                if let Some(username) = &proxy.username {
                    route = route.basic_auth(username, proxy.password.as_deref().unwrap_or_default());
                }
                builder = builder.proxy(route);
                proxy.label()
            }
            // The direct endpoint must not pick up proxies from the environment
            None => {
                builder = builder.no_proxy();
                "direct".to_string()
            }
        };

        let client = builder
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            cookies: Arc::new(Jar::default()),
            label,
        })
    }

    fn classify(error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            TransportError::Timeout(error.to_string())
        } else if error.is_connect() {
            TransportError::ConnectionError(error.to_string())
        } else {
            TransportError::RequestFailed(error.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(&self, url: &str, method: HttpMethod, body: &str, accept_cookie: bool) -> HttpResponse {
        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(e) => return HttpResponse::failed(TransportError::RequestFailed(format!("Invalid URL {}: {}", url, e))),
        };

        let mut request = match method {
            HttpMethod::Get => self.client.get(url.clone()),
            HttpMethod::Post => self
                .client
                .post(url.clone())
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.to_string()),
        };

        if let Some(cookie) = self.cookies.cookies(&url) {
            request = request.header(header::COOKIE, cookie);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("[{}] Request to {} failed: {}", self.label, url, e);
                return HttpResponse::failed(Self::classify(&e));
            }
        };

        let status = response.status();
        if accept_cookie {
            let mut set_cookies = response.headers().get_all(header::SET_COOKIE).iter();
            self.cookies.set_cookies(&mut set_cookies as &mut dyn Iterator<Item = &HeaderValue>, &url);
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                error!("[{}] Failed to read response body: {}", self.label, e);
                let mut failed = HttpResponse::failed(Self::classify(&e));
                failed.status = Some(status.as_u16());
                return failed;
            }
        };

        if !status.is_success() {
            debug!("[{}] Service answered {}: {}", self.label, status, body_snippet(&text, 200));
        }

        HttpResponse::status(status.as_u16(), text)
    }
}

/// Factory for `HttpTransport`s sharing the same settings
#[derive(Debug, Clone)]
pub struct HttpTransportFactory {
    settings: HttpSettings,
}

impl HttpTransportFactory {
    pub fn new(settings: HttpSettings) -> Self {
        Self { settings }
    }
}

impl TransportFactory for HttpTransportFactory {
    fn create(&self, proxy: Option<&ProxyConfig>) -> Result<Arc<dyn Transport>, TransportError> {
        Ok(Arc::new(HttpTransport::new(proxy, &self.settings)?))
    }
}
