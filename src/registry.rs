use crate::{
    codec::{JsonCodec, ValueCodec},
    descriptor::{Interface, ServiceDescriptor},
    endpoint::EndpointMapper,
    error::ConfigurationError,
    net::client::HttpTransport,
    proxy::Proxy,
};
use parking_lot::{Mutex, RwLock};
use reqwest::Url;
use std::{collections::HashMap, sync::Arc};
use tracing::debug;

/// Builds proxies and caches one per interface.
///
/// Create one at startup and share it by reference or `Arc`. Proxies live as
/// long as the registry, or until [`reset`](ProxyRegistry::reset).
pub struct ProxyRegistry {
    proxies: Mutex<HashMap<String, Arc<Proxy>>>,
    mapper: RwLock<EndpointMapper>,
    transport: Arc<HttpTransport>,
    codec: Arc<dyn ValueCodec>,
}

impl ProxyRegistry {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ConfigurationError> {
        Self::builder().base_url(base_url).build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Resolves a declared interface into its typed client.
    pub fn resolve<S: Interface>(&self) -> Result<S, ConfigurationError> {
        if let Some(proxy) = self.proxies.lock().get(S::KEY) {
            debug!(key = S::KEY, "proxy cache hit");
            return Ok(S::from_proxy(Arc::clone(proxy)));
        }
        self.resolve_descriptor(S::descriptor()).map(S::from_proxy)
    }

    /// Returns the cached proxy for `descriptor.key()`, building it first if
    /// this is the first resolution.
    ///
    /// Construction holds the cache lock, so concurrent first resolutions of
    /// one interface all get the same proxy.
    pub fn resolve_descriptor(
        &self,
        descriptor: ServiceDescriptor,
    ) -> Result<Arc<Proxy>, ConfigurationError> {
        let mut proxies = self.proxies.lock();
        if let Some(proxy) = proxies.get(descriptor.key()) {
            debug!(key = descriptor.key(), "proxy cache hit");
            return Ok(Arc::clone(proxy));
        }
        descriptor.validate()?;
        debug!(
            key = descriptor.key(),
            methods = descriptor.methods().len(),
            "building proxy"
        );
        let key = descriptor.key().to_owned();
        let mapper = self.mapper.read().clone();
        let proxy = Arc::new(Proxy::build(
            descriptor,
            &mapper,
            &self.transport,
            &self.codec,
        ));
        proxies.insert(key, Arc::clone(&proxy));
        Ok(proxy)
    }

    /// Whether a proxy for `key` has been built.
    pub fn is_cached(&self, key: &str) -> bool {
        self.proxies.lock().contains_key(key)
    }

    /// Replaces the endpoint mapping for proxies built from now on.
    /// Already cached proxies keep their URLs.
    pub fn set_endpoint_mapper(&self, mapper: EndpointMapper) {
        *self.mapper.write() = mapper;
    }

    /// Forgets every cached proxy. Handles already given out keep working.
    pub fn reset(&self) {
        self.proxies.lock().clear();
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }
}

/// Configuration for a [`ProxyRegistry`].
#[derive(Default)]
pub struct RegistryBuilder {
    base_url: Option<String>,
    mapper: Option<EndpointMapper>,
    codec: Option<Arc<dyn ValueCodec>>,
    client: Option<reqwest::Client>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix of every request URL, e.g. `http://localhost:8080`.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn endpoint_mapper(mut self, mapper: EndpointMapper) -> Self {
        self.mapper = Some(mapper);
        self
    }

    pub fn codec(mut self, codec: impl ValueCodec + 'static) -> Self {
        self.codec = Some(Arc::new(codec));
        self
    }

    /// HTTP client for non-blocking calls.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Fails unless the base URL is an absolute `http` or `https` URL.
    pub fn build(self) -> Result<ProxyRegistry, ConfigurationError> {
        let base_url = self.base_url.ok_or(ConfigurationError::MissingBaseUrl)?;
        check_base_url(&base_url)?;
        let client = self.client.unwrap_or_default();
        Ok(ProxyRegistry {
            proxies: Mutex::new(HashMap::new()),
            mapper: RwLock::new(self.mapper.unwrap_or_default()),
            transport: Arc::new(HttpTransport::new(base_url, client)),
            codec: self.codec.unwrap_or_else(|| Arc::new(JsonCodec)),
        })
    }
}

fn check_base_url(base_url: &str) -> Result<(), ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidBaseUrl {
        url: base_url.to_owned(),
        reason,
    };
    let url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(invalid(format!("unsupported scheme {other:?}"))),
    }
}
