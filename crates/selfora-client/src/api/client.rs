use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, StatusCode};
use selfora_shared::{
    api::{ApiResponse, CreatePageRequest, UpdatePageRequest},
    Page,
};

use super::auth::AuthTokens;

/// Default backend address when `SELFORA_API_URL` is not set.
const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Bounded per-request timeout; expiry surfaces as `ApiError::Network`.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not authenticated")]
    Unauthorized,
    #[error("Access forbidden")]
    Forbidden,
    #[error("Resource not found")]
    NotFound,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Option<AuthTokens>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens: None,
        }
    }

    /// Build a client from `SELFORA_API_URL` (with `.env` support).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let base_url =
            std::env::var("SELFORA_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(&base_url)
    }

    /// Load tokens from disk
    pub fn load_tokens(&mut self) -> Result<bool> {
        self.tokens = AuthTokens::load()?;
        Ok(self.tokens.is_some())
    }

    pub fn set_tokens(&mut self, tokens: Option<AuthTokens>) {
        self.tokens = tokens;
    }

    /// Check if a bearer token is present
    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_some()
    }

    /// Build URL for endpoint
    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Bearer header if a token is stored. Requests without one are still
    /// sent; the backend decides what unauthenticated callers may see.
    fn auth_header(&self) -> Option<String> {
        self.tokens
            .as_ref()
            .map(|t| format!("Bearer {}", t.access_token))
    }

    // ============ Request Helpers ============

    async fn get(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let mut req = self.client.get(self.url(path));
        if let Some(auth) = self.auth_header() {
            req = req.header("Authorization", auth);
        }
        req.send().await.map_err(ApiError::Network)
    }

    async fn post<T: serde::Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, ApiError> {
        let mut req = self.client.post(self.url(path)).json(body);
        if let Some(auth) = self.auth_header() {
            req = req.header("Authorization", auth);
        }
        req.send().await.map_err(ApiError::Network)
    }

    async fn post_empty(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let mut req = self.client.post(self.url(path));
        if let Some(auth) = self.auth_header() {
            req = req.header("Authorization", auth);
        }
        req.send().await.map_err(ApiError::Network)
    }

    async fn patch<T: serde::Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, ApiError> {
        let mut req = self.client.patch(self.url(path)).json(body);
        if let Some(auth) = self.auth_header() {
            req = req.header("Authorization", auth);
        }
        req.send().await.map_err(ApiError::Network)
    }

    async fn delete(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let mut req = self.client.delete(self.url(path));
        if let Some(auth) = self.auth_header() {
            req = req.header("Authorization", auth);
        }
        req.send().await.map_err(ApiError::Network)
    }

    /// Unwrap the `{ success, data, message }` envelope
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        match status {
            StatusCode::OK | StatusCode::CREATED => {
                let envelope: ApiResponse<T> =
                    response.json().await.map_err(ApiError::Network)?;
                if envelope.success {
                    Ok(envelope.data)
                } else {
                    Err(ApiError::Server(
                        envelope.message.unwrap_or_else(|| "request failed".to_string()),
                    ))
                }
            }
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let text = response.text().await.unwrap_or_default();
                Err(ApiError::Validation(text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ApiError::Server(format!("{}: {}", status, text)))
            }
        }
    }

    /// Handle empty response
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();

        match status {
            StatusCode::OK | StatusCode::NO_CONTENT => Ok(()),
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let text = response.text().await.unwrap_or_default();
                Err(ApiError::Validation(text))
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                Err(ApiError::Server(format!("{}: {}", status, text)))
            }
        }
    }

    // ============ Pages ============

    pub async fn list_pages(&self, workspace_id: &str) -> Result<Vec<Page>, ApiError> {
        let response = self.get(&format!("/pages/?workspace={}", workspace_id)).await?;
        self.handle_response(response).await
    }

    pub async fn create_page(&self, req: &CreatePageRequest) -> Result<Page, ApiError> {
        let response = self.post("/pages/", req).await?;
        self.handle_response(response).await
    }

    pub async fn update_page(
        &self,
        page_id: &str,
        req: &UpdatePageRequest,
    ) -> Result<Page, ApiError> {
        let response = self.patch(&format!("/pages/{}/", page_id), req).await?;
        self.handle_response(response).await
    }

    pub async fn delete_page(&self, page_id: &str) -> Result<(), ApiError> {
        let response = self.delete(&format!("/pages/{}/", page_id)).await?;
        self.handle_empty_response(response).await
    }

    pub async fn duplicate_page(&self, page_id: &str) -> Result<Page, ApiError> {
        let response = self.post_empty(&format!("/pages/{}/duplicate/", page_id)).await?;
        self.handle_response(response).await
    }

    pub async fn recent_pages(&self) -> Result<Vec<Page>, ApiError> {
        let response = self.get("/pages/recent/").await?;
        self.handle_response(response).await
    }
}
