use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DelugeError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcRequest {
    pub method: String,
    pub params: Vec<Value>,
    pub id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Option<Value>,
}

impl RpcResponse {
    /// Parses a response body, turning embedded protocol errors into [`DelugeError::Rpc`].
    ///
    /// A body that is itself a JSON string is the degenerate error shape some
    /// daemon versions produce, so it is reported as an error too.
    pub fn from_body(body: Value) -> Result<Self> {
        if let Value::String(message) = &body {
            return Err(DelugeError::Rpc {
                message: message.clone(),
                code: None,
            });
        }

        let response: RpcResponse = serde_json::from_value(body)?;
        match &response.error {
            Some(error) if !error.is_null() => Err(DelugeError::from_rpc_error(error)),
            _ => Ok(response),
        }
    }
}

/// A successful reply with the HTTP metadata kept around for callers that
/// need it (e.g. reading `set-cookie` after a login).
#[derive(Debug, Clone)]
pub struct RpcReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: RpcResponse,
}

impl RpcReply {
    pub fn result(&self) -> &Value {
        &self.body.result
    }

    pub fn into_result(self) -> Value {
        self.body.result
    }

    /// First `set-cookie` header of the reply, if any.
    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get_all(reqwest::header::SET_COOKIE)
            .iter()
            .next()
            .and_then(|value| value.to_str().ok())
    }
}

/// JavaScript-style truthiness, which is what the daemon's loosely typed
/// results are checked against.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
