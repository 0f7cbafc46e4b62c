use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use shared::envelope::ErrorBody;

use super::{ApiRequest, Remote};
use crate::error::HttpError;

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// [`Remote`] over HTTP with reqwest.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    settings: Settings,
    client: reqwest::Client,
}

impl HttpRemote {
    pub fn new(client: reqwest::Client, settings: Settings) -> Self {
        Self { client, settings }
    }

    pub fn from_settings(settings: Settings) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self::new(client, settings))
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Remote for HttpRemote {
    async fn send(&self, request: ApiRequest) -> Result<Value, HttpError> {
        let url = self.url(&request.path);
        let mut builder = self.client.request(request.method.clone(), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|err| {
            tracing::warn!("{} {url} failed to send: {err}", request.method);
            HttpError::NetworkUnavailable(err.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| HttpError::NetworkUnavailable(err.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|body| body.error)
                .unwrap_or_else(|_| format!("Request failed with status {}", status.as_u16()));
            tracing::warn!("{} {url} rejected with {status}: {message}", request.method);
            return Err(HttpError::ServerRejected {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_doubled_slashes() {
        let remote = HttpRemote::new(
            reqwest::Client::new(),
            Settings {
                base_url: "http://localhost:5001/api/".to_string(),
                timeout_secs: 1,
            },
        );
        assert_eq!(remote.url("/clubs/4/members"), "http://localhost:5001/api/clubs/4/members");
        assert_eq!(remote.url("roles/"), "http://localhost:5001/api/roles/");
    }
}
