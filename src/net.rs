pub mod client;

use crate::error::{ApplicationError, CallError, TransportError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Set (truthy) on a response object when the remote method threw.
pub const EXCEPTION_FIELD: &str = "$exception";
/// The thrown exception's message.
pub const EXCEPTION_MESSAGE_FIELD: &str = "$exceptionMessage";

/// Request body: the encoded arguments in declaration order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RequestEnvelope {
    /// `[a1, a2, ...]`, sent by blocking stubs.
    Positional(Vec<Value>),
    /// `{"Type": "Array", "Value": [a1, a2, ...]}`, sent by non-blocking stubs.
    Tagged(Tagged),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "Type", content = "Value")]
pub enum Tagged {
    Array(Vec<Value>),
}

impl RequestEnvelope {
    pub fn positional(args: Vec<Value>) -> Self {
        RequestEnvelope::Positional(args)
    }

    pub fn tagged(args: Vec<Value>) -> Self {
        RequestEnvelope::Tagged(Tagged::Array(args))
    }

    pub fn args(&self) -> &[Value] {
        match self {
            RequestEnvelope::Positional(args) | RequestEnvelope::Tagged(Tagged::Array(args)) => {
                args
            }
        }
    }

    pub fn to_body(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// What a finished HTTP exchange amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    ApplicationError(String),
    TransportError(TransportError),
}

impl Outcome {
    /// Classifies a raw response. Bodies of non-(200|304) responses are not parsed.
    pub fn from_response(
        status: u16,
        status_text: &str,
        body: &str,
    ) -> Result<Outcome, serde_json::Error> {
        if !matches!(status, 200 | 304) {
            return Ok(Outcome::TransportError(TransportError::from_status(
                status,
                status_text,
                body,
            )));
        }
        let json: Value = serde_json::from_str(body)?;
        Ok(Self::from_json(json))
    }

    pub fn from_json(json: Value) -> Outcome {
        let raised = json
            .as_object()
            .and_then(|obj| obj.get(EXCEPTION_FIELD))
            .map_or(false, truthy);
        if !raised {
            return Outcome::Success(json);
        }
        let message = match json.get(EXCEPTION_MESSAGE_FIELD) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Outcome::ApplicationError(message)
    }

    pub fn into_result(self) -> Result<Value, CallError> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::ApplicationError(message) => Err(ApplicationError { message }.into()),
            Outcome::TransportError(err) => Err(err.into()),
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
