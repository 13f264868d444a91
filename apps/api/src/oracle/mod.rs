/// Oracle client: the single point of entry for all calls to the external
/// natural-language oracle service.
///
/// ARCHITECTURAL RULE: no other module may call the oracle API directly.
/// The oracle is treated as untrusted and unreliable; callers must validate
/// its output and carry a fallback path.
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ORACLE_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ORACLE_API_VERSION: &str = "2023-06-01";
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 1024;
const MAX_RETRIES: u32 = 2;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("oracle unavailable after {retries} retries")]
    Unavailable { retries: u32 },

    #[error("oracle returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct OracleRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<OracleMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct OracleMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct OracleResponse {
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

impl OracleResponse {
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct OracleApiError {
    error: OracleApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OracleApiErrorBody {
    message: String,
}

/// Wraps the oracle HTTP API with a request timeout, bounded retries, and a
/// structured-output helper. The timeout is mandatory: a slow oracle must
/// degrade the request, never hang it.
#[derive(Clone)]
pub struct OracleClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OracleClient {
    pub fn new(api_key: String, timeout: std::time::Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            base_url: ORACLE_API_URL.to_string(),
        }
    }

    /// Points the client at a different endpoint. Used by tests to exercise
    /// the unreachable-oracle path.
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Makes a raw oracle call. Retries on 429 and 5xx with backoff.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<OracleResponse, OracleError> {
        let request_body = OracleRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![OracleMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut last_error: Option<OracleError> = None;

        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "oracle call attempt {} failed, retrying after {}ms",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.base_url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ORACLE_API_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(OracleError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("oracle API returned {}: {}", status, body);
                last_error = Some(OracleError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<OracleApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(OracleError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let oracle_response: OracleResponse = response.json().await?;
            debug!("oracle call succeeded");
            return Ok(oracle_response);
        }

        Err(last_error.unwrap_or(OracleError::Unavailable {
            retries: MAX_RETRIES,
        }))
    }

    /// Calls the oracle and deserializes the text response as JSON. The
    /// prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, OracleError> {
        let response = self.call(prompt, system).await?;
        let text = response.text().ok_or(OracleError::EmptyContent)?;
        let text = strip_json_fences(text);
        serde_json::from_str(text).map_err(OracleError::Parse)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from oracle output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
