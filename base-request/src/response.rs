use crate::error::Error;
use reqwest::blocking::{RequestBuilder, Response};
use serde_json::Value;
use std::fmt::Display;

/// Request body sent with POST and PUT.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Form(Vec<(String, String)>),
}

impl Payload {
    /// Build a form-encoded payload from key/value pairs.
    pub fn form<K: Into<String>, V: Into<String>, I: IntoIterator<Item = (K, V)>>(
        pairs: I,
    ) -> Self {
        Payload::Form(
            pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub(crate) fn attach(&self, builder: RequestBuilder) -> RequestBuilder {
        match self {
            Payload::Json(value) => builder.json(value),
            Payload::Form(pairs) => builder.form(pairs),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

/// A fully read response together with the request line that produced it.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub method: String,
    pub url: String,
    pub status_code: u16,
    pub reason: String,
    pub text: String,
}

impl ApiResponse {
    pub(crate) fn read(method: &str, response: Response) -> Result<Self, Error> {
        let url = response.url().to_string();
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let text = response.text()?;

        Ok(ApiResponse {
            method: method.to_string(),
            url,
            status_code: status.as_u16(),
            reason,
            text,
        })
    }

    /// Decode the body as JSON.
    pub fn json(&self) -> Result<Value, Error> {
        Ok(serde_json::from_str(&self.text)?)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Print the exchange to stdout the way the suite reports every call.
    pub fn echo(&self) {
        for line in self.echo_lines() {
            println!("{}", line);
        }
    }

    /// Lines printed by [`ApiResponse::echo`]: method, URL, status, reason, raw body,
    /// the pretty-printed JSON body and a separator.
    pub fn echo_lines(&self) -> Vec<String> {
        let pretty = serde_json::from_str::<Value>(&self.text)
            .ok()
            .and_then(|json| serde_json::to_string_pretty(&json).ok())
            .unwrap_or_else(|| String::from("<body is not JSON>"));

        vec![
            format!("{:?}", format!("{} example", self.method)),
            format!("{:?}", self.url),
            self.status_code.to_string(),
            format!("{:?}", self.reason),
            format!("{:?}", self.text),
            pretty,
            format!("{:?}", "**********"),
        ]
    }
}

/// The kind of mutating call an outcome belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Updated,
    Deleted,
}

impl Mutation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mutation::Updated => "Updated",
            Mutation::Deleted => "Deleted",
        }
    }
}

impl Display for Mutation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a PUT or DELETE issued through the wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub kind: Mutation,
    pub status_code: u16,
    pub body: Option<Value>,
}

impl MutationOutcome {
    pub(crate) fn new(kind: Mutation, response: &ApiResponse) -> Self {
        MutationOutcome {
            kind,
            status_code: response.status_code,
            body: response.json().ok(),
        }
    }

    /// `"Updated"` or `"Deleted"`, whatever the server answered.
    pub fn label(&self) -> &'static str {
        self.kind.as_str()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

impl Display for MutationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}
