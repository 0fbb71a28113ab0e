//! Shared HTTP plumbing for the lookup tools.

use std::time::Duration;

use assistant_core::ToolError;
use serde_json::Value;
use url::Url;

use crate::config::ToolsConfig;

/// Thin wrapper over one `reqwest::Client`, built once and cloned into every
/// HTTP-backed tool. Each request is attempted exactly once.
#[derive(Debug, Clone)]
pub struct LookupClient {
    client: reqwest::Client,
}

impl LookupClient {
    pub fn new(config: &ToolsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn get_json(&self, url: Url) -> Result<Value, ToolError> {
        let response = self.send(url).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| ToolError::execution(format!("Invalid JSON response: {}", e)))
    }

    /// Downloads a text document, reading at most `max_bytes` of its body.
    ///
    /// Non-text content types and bodies announced larger than `max_bytes`
    /// are refused before the body is read. Returns the decoded text and
    /// whether the body was cut at the cap.
    pub async fn get_page(&self, url: Url, max_bytes: usize) -> Result<(String, bool), ToolError> {
        let host = url.host_str().unwrap_or_default().to_string();
        let mut response = self.send(url).await?;

        if let Some(content_type) = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        {
            if !is_textual(content_type) {
                return Err(ToolError::execution(format!(
                    "Unsupported content type '{}' from {}",
                    content_type, host
                )));
            }
        }

        if let Some(length) = response.content_length() {
            if length > max_bytes as u64 {
                return Err(ToolError::execution(format!(
                    "Response from {} is too large ({} bytes, limit {})",
                    host, length, max_bytes
                )));
            }
        }

        let mut body = Vec::new();
        let mut truncated = false;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| request_error(&host, e))?
        {
            let room = max_bytes - body.len();
            if chunk.len() > room {
                body.extend_from_slice(&chunk[..room]);
                truncated = true;
                break;
            }
            body.extend_from_slice(&chunk);
        }

        if truncated {
            log::debug!("Stopped reading {} after {} bytes", host, max_bytes);
        }
        Ok((String::from_utf8_lossy(&body).into_owned(), truncated))
    }

    async fn send(&self, url: Url) -> Result<reqwest::Response, ToolError> {
        let host = url.host_str().unwrap_or_default().to_string();
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| request_error(&host, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::execution(format!(
                "HTTP {} from {}",
                status, host
            )));
        }

        Ok(response)
    }
}

fn request_error(host: &str, error: reqwest::Error) -> ToolError {
    if error.is_timeout() {
        ToolError::execution(format!("Request to {} timed out", host))
    } else {
        ToolError::execution(format!("Request to {} failed: {}", host, error))
    }
}

fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/") || mime == "application/xhtml+xml" || mime == "application/xml"
}

/// Joins `segments` onto `base` and appends `query`, percent-encoding both.
pub fn build_url(base: &str, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ToolError> {
    let mut url = Url::parse(base)
        .map_err(|e| ToolError::execution(format!("Invalid service URL '{}': {}", base, e)))?;

    if !segments.is_empty() {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| ToolError::execution(format!("Service URL '{}' cannot be a base", base)))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }

    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }

    Ok(url)
}

/// Renders a JSON scalar for speech-friendly output (`"N/A"` when absent).
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => "N/A".to_string(),
        Some(other) => other.to_string(),
    }
}
