use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::ports::{RepositoryError, RepositoryResult, SessionStore};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Thin wrapper over reqwest: one logical operation, one HTTP round-trip.
/// Attaches the bearer token from the injected session store when one is
/// held. No retries, no queueing, no caching.
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<dyn SessionStore>) -> RepositoryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("promanage-cli/0.1.0")
            .build()
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> RepositoryResult<T> {
        let response = self.send(self.builder(Method::GET, path).await).await?;
        self.handle_response(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> RepositoryResult<T> {
        let response = self
            .send(self.builder(Method::POST, path).await.json(body))
            .await?;
        self.handle_response(response).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> RepositoryResult<T> {
        let response = self
            .send(self.builder(Method::PUT, path).await.json(body))
            .await?;
        self.handle_response(response).await
    }

    /// DELETE acknowledgments carry no payload worth keeping.
    pub async fn delete(&self, path: &str) -> RepositoryResult<()> {
        let response = self.send(self.builder(Method::DELETE, path).await).await?;
        self.check_status(response).await?;
        Ok(())
    }

    async fn builder(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .client
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json");

        // A session-store read failure just means the request goes out
        // unauthenticated; the backend's 401 reports it either way.
        match self.session.token().await {
            Ok(Some(token)) => builder = builder.bearer_auth(token),
            Ok(None) => {}
            Err(e) => tracing::warn!("Could not read session token: {e}"),
        }

        builder
    }

    async fn send(&self, builder: RequestBuilder) -> RepositoryResult<Response> {
        builder
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> RepositoryResult<T> {
        let body = self.check_status(response).await?;

        tracing::debug!("API response: {body}");

        serde_json::from_str(&body)
            .map_err(|e| RepositoryError::Serialization(format!("Failed to parse response: {e}")))
    }

    /// Returns the body on success; otherwise maps the status and the
    /// backend's `{"detail": ...}` payload to a typed error.
    async fn check_status(&self, response: Response) -> RepositoryResult<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        if status.is_success() {
            return Ok(body);
        }

        let message = extract_error_message(&body)
            .unwrap_or_else(|| format!("HTTP error, status: {status}"));

        tracing::debug!("API error ({status}): {message}");

        match status.as_u16() {
            401 => Err(RepositoryError::Authentication(message)),
            404 => Err(RepositoryError::NotFound(message)),
            _ => Err(RepositoryError::Api(message)),
        }
    }
}

/// FastAPI error payloads put a human-readable message under `detail`;
/// validation errors put a structure there instead.
fn extract_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::session::MemorySessionStore;

    #[tokio::test]
    async fn requests_carry_json_content_type_and_bearer_token() {
        let session = Arc::new(MemorySessionStore::with_token("tok"));
        let client = ApiClient::new(DEFAULT_SERVER_URL, session).unwrap();

        let request = client
            .builder(Method::GET, "/projects")
            .await
            .build()
            .unwrap();

        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(request.headers()[reqwest::header::AUTHORIZATION], "Bearer tok");
    }

    #[tokio::test]
    async fn requests_without_a_session_go_out_unauthenticated() {
        let session = Arc::new(MemorySessionStore::new());
        let client = ApiClient::new(DEFAULT_SERVER_URL, session).unwrap();

        let request = client
            .builder(Method::DELETE, "/projects/p1")
            .await
            .build()
            .unwrap();

        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert!(!request.headers().contains_key(reqwest::header::AUTHORIZATION));
    }

    #[test]
    fn extracts_string_detail() {
        let body = r#"{"detail": "Credenciales incorrectas"}"#;
        assert_eq!(
            extract_error_message(body),
            Some("Credenciales incorrectas".to_string())
        );
    }

    #[test]
    fn stringifies_structured_detail() {
        let body = r#"{"detail": [{"loc": ["body", "name"], "msg": "field required"}]}"#;
        let message = extract_error_message(body).unwrap();
        assert!(message.contains("field required"));
    }

    #[test]
    fn missing_detail_yields_none() {
        assert_eq!(extract_error_message(""), None);
        assert_eq!(extract_error_message("{}"), None);
        assert_eq!(extract_error_message("not json"), None);
    }
}
