//! Typed access to the club REST API.
//!
//! [`Remote`] is the transport seam: one method that turns an [`ApiRequest`]
//! into JSON or an [`HttpError`]. [`ClubApi`] layers one typed method per
//! endpoint on top of any transport and is the only place responses are
//! parsed.

mod endpoints;
pub mod http;

pub use endpoints::*;
pub use reqwest::Method;

use serde::Serialize;
use serde_json::Value;

use crate::error::HttpError;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, HttpError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Flattens a search struct into query pairs, dropping unset and blank fields.
    pub fn criteria<C: Serialize>(mut self, criteria: &C) -> Result<Self, HttpError> {
        if let Value::Object(fields) = serde_json::to_value(criteria)? {
            for (key, value) in fields {
                let rendered = match value {
                    Value::Null => continue,
                    Value::String(s) if s.trim().is_empty() => continue,
                    Value::String(s) => s.trim().to_string(),
                    other => other.to_string(),
                };
                self.query.push((key, rendered));
            }
        }
        Ok(self)
    }
}

pub trait Remote {
    async fn send(&self, request: ApiRequest) -> Result<Value, HttpError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::MemberSearch;

    #[test]
    fn criteria_skip_blank_fields() {
        let request = ApiRequest::get("clubs/1/members/search")
            .criteria(&MemberSearch {
                first_name: Some("  ada ".to_string()),
                major: Some("   ".to_string()),
                graduation_year: Some(2026),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(
            request.query,
            vec![
                ("first_name".to_string(), "ada".to_string()),
                ("graduation_year".to_string(), "2026".to_string()),
            ]
        );
    }
}
