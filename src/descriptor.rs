use crate::{error::ConfigurationError, proxy::Proxy, types::Type};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, sync::Arc};

/// A service interface that can be turned into a proxy.
///
/// Usually implemented by [`service!`](crate::service); implement it by hand
/// to wrap a descriptor assembled at runtime.
pub trait Interface: Sized {
    /// Cache key; must equal `descriptor().key()`.
    const KEY: &'static str;

    fn descriptor() -> ServiceDescriptor;

    fn from_proxy(proxy: Arc<Proxy>) -> Self;

    fn proxy(&self) -> &Arc<Proxy>;
}

/// Name, cache key and ordered methods of one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    name: String,
    key: String,
    methods: Vec<MethodDescriptor>,
}

impl ServiceDescriptor {
    /// `key` must be unique per interface; a module path works well.
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            methods: Vec::new(),
        }
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn methods(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.name.is_empty() {
            return Err(ConfigurationError::EmptyServiceName);
        }
        if self.methods.is_empty() {
            return Err(ConfigurationError::NoMethods {
                service: self.name.clone(),
            });
        }
        let mut seen = BTreeSet::new();
        for method in &self.methods {
            if !seen.insert(method.wire_name()) {
                return Err(ConfigurationError::DuplicateMethod {
                    service: self.name.clone(),
                    method: method.wire_name(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    name: String,
    params: Vec<Type>,
    returns: Type,
    is_async: bool,
}

impl MethodDescriptor {
    /// A declared return type of [`Type::Async`] makes the method non-blocking.
    pub fn new(
        name: impl Into<String>,
        params: impl IntoIterator<Item = Type>,
        returns: Type,
    ) -> Self {
        let (returns, is_async) = match returns {
            Type::Async(inner) => (*inner, true),
            other => (other, false),
        };
        Self {
            name: name.into(),
            params: params.into_iter().collect(),
            returns,
            is_async,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The method segment used on the wire.
    pub fn wire_name(&self) -> String {
        capitalized(&self.name)
    }

    pub fn params(&self) -> &[Type] {
        &self.params
    }

    pub fn returns(&self) -> &Type {
        &self.returns
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }
}

/// Upper-cases the first character and leaves the rest alone.
pub fn capitalized(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
