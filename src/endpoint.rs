use std::{fmt, sync::Arc};

/// Maps `(service name, wire method name)` to a request path.
///
/// Stubs read the mapper once, when they are built.
#[derive(Clone)]
pub struct EndpointMapper(Arc<dyn Fn(&str, &str) -> String + Send + Sync>);

impl EndpointMapper {
    pub fn new<F>(map: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(map))
    }

    pub fn path(&self, service: &str, method: &str) -> String {
        (self.0)(service, method)
    }
}

impl Default for EndpointMapper {
    fn default() -> Self {
        Self::new(default_path)
    }
}

impl fmt::Debug for EndpointMapper {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("EndpointMapper")
    }
}

/// `/{service}/{method}`
pub fn default_path(service: &str, method: &str) -> String {
    format!("/{service}/{method}")
}

/// Joins a base URL and a mapped path without doubling the slash.
pub(crate) fn join(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
