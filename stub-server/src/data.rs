use serde_json::Value;
use std::collections::HashMap;

/// A request as the stub server received it.
#[derive(Debug, Clone)]
pub struct RequestData {
    pub uri: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RequestData {
    /// The request path without the query string.
    pub fn path(&self) -> &str {
        self.uri.split('?').next().unwrap_or_default()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponseData {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl ResponseData {
    /// A response carrying `body` serialized as JSON.
    pub fn json(status_code: u16, body: &Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert(
            String::from("content-type"),
            String::from("application/json; charset=utf-8"),
        );

        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    /// A plain text response.
    pub fn text<S: Into<String>>(status_code: u16, body: S) -> Self {
        let mut headers = HashMap::new();
        headers.insert(
            String::from("content-type"),
            String::from("text/plain; charset=utf-8"),
        );

        Self {
            status_code,
            headers,
            body: body.into(),
        }
    }
}
