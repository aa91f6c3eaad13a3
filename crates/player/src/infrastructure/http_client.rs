//! Lobby API client over reqwest.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response};
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::ports::outbound::{ApiError, RawApiPort};

/// `RawApiPort` speaking JSON over HTTP to the lobby service.
#[derive(Clone)]
pub struct HttpApiAdapter {
    client: Client,
    base_url: Url,
}

impl HttpApiAdapter {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let builder = Client::builder().timeout(config.request_timeout);
        Self::from_builder(builder, config.api_url.clone())
    }

    fn from_builder(builder: ClientBuilder, base_url: Url) -> Result<Self, ApiError> {
        let client = builder
            .build()
            .map_err(|e| ApiError::RequestFailed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::RequestFailed(format!("invalid path {path}: {e}")))
    }
}

#[async_trait]
impl RawApiPort for HttpApiAdapter {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        read_json(response).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let url = self.endpoint(path)?;
        tracing::debug!(%url, "POST");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        read_json(response).await
    }
}

/// Map a response to its JSON body. An empty 2xx body reads as `Null`.
async fn read_json(response: Response) -> Result<Value, ApiError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

    if !status.is_success() {
        tracing::warn!(status = status.as_u16(), "Lobby request rejected");
        return Err(ApiError::HttpError {
            status: status.as_u16(),
            body: text,
        });
    }

    parse_body(&text)
}

fn parse_body(text: &str) -> Result<Value, ApiError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| ApiError::ParseError(e.to_string()))
}
