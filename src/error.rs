use crate::types::TypeMismatch;
use std::fmt;
use thiserror::Error;

/// The registry or an interface description can't be used to make proxies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no base URL configured")]
    MissingBaseUrl,

    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("service name must not be empty")]
    EmptyServiceName,

    #[error("interface {service} does not have any methods")]
    NoMethods { service: String },

    #[error("interface {service} declares {method} more than once")]
    DuplicateMethod { service: String, method: String },
}

/// The HTTP exchange itself failed.
///
/// `status` is `None` when no response arrived at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub status: Option<u16>,
    pub status_text: String,
    pub body: String,
}

impl TransportError {
    pub(crate) fn from_status(
        status: u16,
        status_text: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            status: Some(status),
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    pub(crate) fn connection(diagnostic: impl Into<String>) -> Self {
        Self {
            status: None,
            status_text: diagnostic.into(),
            body: String::new(),
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "Error: {status} {}\n{}", self.status_text, self.body),
            None => write!(f, "Error: {}", self.status_text),
        }
    }
}

impl std::error::Error for TransportError {}

/// The remote method body raised an exception.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApplicationError {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum CallError {
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    #[error("remote exception: {0}")]
    Application(#[from] ApplicationError),

    #[error("{method} takes {expected} arguments, {given} given")]
    Arity {
        method: String,
        expected: usize,
        given: usize,
    },

    #[error("argument {position} of {method}: {mismatch}")]
    Argument {
        method: String,
        position: usize,
        mismatch: TypeMismatch,
    },

    #[error("serializing arguments: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("decoding response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("return type mismatch: {0}")]
    Return(TypeMismatch),

    #[error("no method named {0}")]
    UnknownMethod(String),

    #[error("{method} is {actual}, not {requested}")]
    DispatchMode {
        method: String,
        actual: &'static str,
        requested: &'static str,
    },

    #[error("blocking method {method} called on a current-thread runtime")]
    BlockingInRuntime { method: String },
}

impl CallError {
    pub fn is_transport(&self) -> bool {
        matches!(self, CallError::Transport(_))
    }

    pub fn is_application(&self) -> bool {
        matches!(self, CallError::Application(_))
    }

    /// The remote exception message, if this is an application error.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            CallError::Application(e) => Some(&e.message),
            _ => None,
        }
    }
}

pub type CallResult<T> = Result<T, CallError>;
