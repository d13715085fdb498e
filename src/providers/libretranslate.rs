use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{TranslationProvider, USER_AGENT};

/// Client for a LibreTranslate-compatible translation API
#[derive(Debug)]
pub struct LibreTranslate {
    /// HTTP client for API requests
    client: Client,
    /// Base URL of the API, without the `/translate` path
    endpoint: String,
    /// API key, empty for self-hosted instances
    api_key: String,
}

/// Translate request body
#[derive(Debug, Serialize)]
pub struct TranslateRequest<'a> {
    /// Text to translate
    q: &'a str,
    /// Source language, "auto" lets the server detect it
    source: &'a str,
    /// Target language code
    target: &'a str,
    /// Input format, "text" or "html"
    format: &'a str,
    /// API key for hosted instances
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

/// Successful translate response
#[derive(Debug, Deserialize)]
pub struct TranslateResponse {
    /// The translated text
    #[serde(rename = "translatedText")]
    pub translated_text: String,
}

/// Error body returned on non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl LibreTranslate {
    /// Create a new client
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout: Option<Duration>) -> Self {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Self {
            client: builder.build().unwrap_or_default(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    fn translate_url(&self) -> String {
        format!("{}/translate", self.endpoint.trim_end_matches('/'))
    }
}

/// Extract the translation from a successful response body
pub fn parse_translate_response(body: &str) -> Result<String, ProviderError> {
    let response: TranslateResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::ParseError(format!("{} in body: {}", e, truncate(body, 200))))?;

    let text = response.translated_text.trim();
    if text.is_empty() {
        return Err(ProviderError::ParseError("empty translation".to_string()));
    }
    Ok(text.to_string())
}

/// Map a non-2xx response onto the provider error taxonomy
pub fn error_from_status(status: u16, body: &str) -> ProviderError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error)
        .unwrap_or_else(|_| truncate(body, 200));

    if status == StatusCode::TOO_MANY_REQUESTS.as_u16() {
        ProviderError::RateLimitExceeded(message)
    } else {
        ProviderError::ApiError { status_code: status, message }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    }
}

#[async_trait]
impl TranslationProvider for LibreTranslate {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, ProviderError> {
        let request = TranslateRequest {
            q: text,
            source: "auto",
            target: target_language,
            format: "text",
            api_key: (!self.api_key.is_empty()).then_some(self.api_key.as_str()),
        };

        debug!("LibreTranslate: '{}' -> {}", text, target_language);

        let response = self.client.post(self.translate_url())
            .json(&request)
            .send()
            .await
            .map_err(ProviderError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ProviderError::from_transport)?;

        if !status.is_success() {
            return Err(error_from_status(status.as_u16(), &body));
        }

        parse_translate_response(&body)
    }
}
