//! Handler return values and the finished response.

use axum::http::{HeaderMap, StatusCode};
use serde_json::{Map, Value};

/// Key in an api reply that selects the HTTP status.
pub const STATUS_CODE_KEY: &str = "code";

/// What a handler (or a responding middleware) produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Reply {
    /// Nothing; in the api space this means "no such resource".
    #[default]
    Empty,
    Text(String),
    Json(Value),
}

impl Reply {
    pub fn is_empty(&self) -> bool {
        matches!(self, Reply::Empty | Reply::Json(Value::Null))
    }

    /// Body for the standard space, written the way `echo` would print it.
    pub fn into_text(self) -> String {
        match self {
            Reply::Empty => String::new(),
            Reply::Text(text) => text,
            Reply::Json(Value::String(text)) => text,
            Reply::Json(Value::Bool(true)) => "1".to_string(),
            Reply::Json(Value::Bool(false) | Value::Null) => String::new(),
            Reply::Json(value) => value.to_string(),
        }
    }

    /// Status and JSON body for the api space.
    ///
    /// An object's `code` member picks the status and is removed from the body.
    pub fn into_api(self, default_status: StatusCode) -> (StatusCode, String) {
        let value = match self {
            Reply::Empty => Value::Null,
            Reply::Text(text) => Value::String(text),
            Reply::Json(value) => value,
        };

        match value {
            Value::Object(mut fields) => {
                let status = fields
                    .remove(STATUS_CODE_KEY)
                    .and_then(|code| code.as_u64())
                    .and_then(|code| u16::try_from(code).ok())
                    .and_then(|code| StatusCode::from_u16(code).ok())
                    .unwrap_or(default_status);
                (status, Value::Object(fields).to_string())
            }
            other => (default_status, other.to_string()),
        }
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::Empty
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Json(value)
    }
}

impl From<Map<String, Value>> for Reply {
    fn from(fields: Map<String, Value>) -> Self {
        Reply::Json(Value::Object(fields))
    }
}

impl<T: Into<Reply>> From<Option<T>> for Reply {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// A finished response, independent of any HTTP server.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
