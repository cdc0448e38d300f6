use crate::types::{Type, TypeMismatch};
use serde_json::Value;

/// Type-directed conversion between caller values and wire values.
///
/// Every argument passes through [`encode`](ValueCodec::encode) against its
/// declared parameter type, and every successful response passes through
/// [`decode`](ValueCodec::decode) against the declared return type.
pub trait ValueCodec: Send + Sync {
    fn encode(&self, value: Value, declared: &Type) -> Result<Value, TypeMismatch>;

    fn decode(&self, value: Value, declared: &Type) -> Result<Value, TypeMismatch>;
}

/// Plain JSON, checked structurally against the declared type.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl JsonCodec {
    fn check(value: Value, declared: &Type) -> Result<Value, TypeMismatch> {
        if declared.admits(&value) {
            Ok(value)
        } else {
            Err(TypeMismatch::new(value, declared.clone()))
        }
    }
}

impl ValueCodec for JsonCodec {
    fn encode(&self, value: Value, declared: &Type) -> Result<Value, TypeMismatch> {
        Self::check(value, declared)
    }

    fn decode(&self, value: Value, declared: &Type) -> Result<Value, TypeMismatch> {
        Self::check(value, declared)
    }
}
