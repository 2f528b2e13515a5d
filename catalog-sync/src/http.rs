//! Shared HTTP plumbing for the catalog, Rawls and TDR clients.

use crate::auth::AccessToken;
use catalog_sync_common::errors::SyncError;
use catalog_sync_common::types::Service;
use reqwest::Method;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

pub const CLIENT_USER_AGENT: &str = concat!("catalog-sync/", env!("CARGO_PKG_VERSION"));

/// What was sent, with the token masked. Printed when a request fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl fmt::Display for RequestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Request:")?;
        writeln!(f, "\t{} {}", self.method, self.url)?;
        for (name, value) in &self.headers {
            writeln!(f, "\t{name}: {value}")?;
        }
        match &self.body {
            Some(body) => write!(f, "\t{body}"),
            None => write!(f, "\t(no body)"),
        }
    }
}

/// A response with its body read and the request it answered.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub service: Service,
    pub status: u16,
    pub body: String,
    pub request: RequestSummary,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `message` field of a JSON error body, or the raw body.
    pub fn error_message(&self) -> String {
        serde_json::from_str::<Value>(&self.body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| {
                let trimmed = self.body.trim();
                if trimmed.is_empty() {
                    "(empty response body)".to_string()
                } else {
                    trimmed.chars().take(500).collect()
                }
            })
    }

    /// Turn a non-2xx response into [`SyncError::Status`].
    pub fn error_for_status(self) -> Result<Self, SyncError> {
        if self.is_success() {
            return Ok(self);
        }
        warn!(
            service = %self.service,
            method = %self.request.method,
            url = %self.request.url,
            status = self.status,
            "request failed"
        );
        Err(self.to_error())
    }

    pub fn to_error(&self) -> SyncError {
        SyncError::Status {
            service: self.service,
            method: self.request.method.clone(),
            url: self.request.url.clone(),
            status: self.status,
            message: self.error_message(),
        }
    }

    /// Multi-line failure report: the error and the redacted request.
    pub fn failure_dump(&self) -> String {
        format!(
            "{} returned {}: {}\n{}",
            self.service,
            self.status,
            self.error_message(),
            self.request
        )
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, SyncError> {
        serde_json::from_str(&self.body).map_err(|e| SyncError::InvalidResponse {
            service: self.service,
            url: self.request.url.clone(),
            message: e.to_string(),
        })
    }
}

/// Authenticated JSON client bound to one service root.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    service: Service,
    base_url: String,
    token: AccessToken,
}

impl ApiClient {
    pub fn new(
        service: Service,
        base_url: &str,
        token: AccessToken,
        timeout: Duration,
    ) -> Result<Self, SyncError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(CLIENT_USER_AGENT)
            .build()
            .map_err(|e| SyncError::Transport {
                service,
                method: "-".to_string(),
                url: base_url.clone(),
                message: e.to_string(),
            })?;
        Ok(Self {
            http,
            service,
            base_url,
            token,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and read the whole response. Only transport failures
    /// are errors here; the caller decides what a status means.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<ApiResponse, SyncError> {
        let url = self.url(path);
        let body_text = body.map(Value::to_string);
        let request = RequestSummary {
            method: method.to_string(),
            url: url.clone(),
            headers: vec![
                (AUTHORIZATION.to_string(), "Bearer ***".to_string()),
                (ACCEPT.to_string(), "application/json".to_string()),
                (CONTENT_TYPE.to_string(), "application/json".to_string()),
                (USER_AGENT.to_string(), CLIENT_USER_AGENT.to_string()),
            ],
            body: body_text.clone(),
        };

        debug!(service = %self.service, method = %method, url = %url, "sending request");

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(AUTHORIZATION, self.token.header_value())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json");
        if let Some(text) = body_text {
            builder = builder.body(text);
        }

        let transport_error = |e: reqwest::Error| SyncError::Transport {
            service: self.service,
            method: method.to_string(),
            url: url.clone(),
            message: e.to_string(),
        };
        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(transport_error)?;

        debug!(
            service = %self.service,
            method = %method,
            url = %url,
            status,
            "received response"
        );

        Ok(ApiResponse {
            service: self.service,
            status,
            body: text,
            request,
        })
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse, SyncError> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<ApiResponse, SyncError> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: &Value) -> Result<ApiResponse, SyncError> {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse, SyncError> {
        self.send(Method::DELETE, path, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client(url: &str) -> ApiClient {
        ApiClient::new(
            Service::Catalog,
            url,
            AccessToken::new("tok-secret"),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_send_sets_headers_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v1/datasets")
            .match_header("authorization", "Bearer tok-secret")
            .match_header("content-type", "application/json")
            .match_header("user-agent", Matcher::Regex("^catalog-sync/".to_string()))
            .match_body(Matcher::Json(json!({"a": 1})))
            .with_status(200)
            .with_body(r#"{"id":"c1"}"#)
            .create_async()
            .await;

        let api = client(&format!("{}/", server.url()));
        let response = api.post("/api/v1/datasets", &json!({"a": 1})).await.unwrap();

        mock.assert_async().await;
        assert!(response.is_success());
        assert_eq!(response.json::<Value>().unwrap()["id"], "c1");
        assert_eq!(response.request.url, format!("{}/api/v1/datasets", server.url()));
    }

    #[tokio::test]
    async fn test_error_status_carries_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/datasets/missing")
            .with_status(404)
            .with_body(r#"{"message":"Dataset not found: missing","statusCode":404}"#)
            .create_async()
            .await;

        let response = client(&server.url())
            .get("/api/v1/datasets/missing")
            .await
            .unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(response.error_message(), "Dataset not found: missing");

        let err = response.error_for_status().unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("Dataset not found"));
    }

    #[tokio::test]
    async fn test_failure_dump_is_redacted() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("PUT", "/api/v1/datasets/c1")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let response = client(&server.url())
            .put("/api/v1/datasets/c1", &json!({"dct:title": "t"}))
            .await
            .unwrap();
        let dump = response.failure_dump();
        assert!(dump.contains("catalog returned 500: internal error"));
        assert!(dump.contains("PUT "));
        assert!(dump.contains("Bearer ***"));
        assert!(dump.contains(r#"{"dct:title":"t"}"#));
        assert!(!dump.contains("tok-secret"));
    }

    #[tokio::test]
    async fn test_invalid_json_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/datasets")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let response = client(&server.url()).get("/api/v1/datasets").await.unwrap();
        let err = response.json::<Value>().unwrap_err();
        assert!(matches!(err, SyncError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_transport_error() {
        // Nothing listens on port 9 of the loopback interface.
        let err = client("http://127.0.0.1:9").get("/x").await.unwrap_err();
        assert!(matches!(err, SyncError::Transport { .. }));
    }
}
