//! Client for the external explanation service.
//!
//! The service turns a file's source into a three-tier explanation (a
//! child-level analogy, an intermediate description, a technical one).
//! The contract at this boundary is always-text: a missing credential or a
//! failed request comes back as a short human-readable string, never as an
//! error the caller has to handle.

use std::env;
use std::path::Path;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::debug;

/// Only the head of the file is sent to the service.
pub const MAX_SOURCE_CHARS: usize = 3000;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin HTTP client for the explanation service.
#[derive(Debug, Clone)]
pub struct ExplainClient {
    api_key: Option<String>,
    endpoint: String,
    model: String,
    http: reqwest::Client,
}

impl ExplainClient {
    /// Build a client from the environment.
    ///
    /// Reads `OPENAI_API_KEY` for the credential, with `ATLAS_EXPLAIN_URL`
    /// and `ATLAS_EXPLAIN_MODEL` as optional overrides.
    pub fn from_env() -> Self {
        Self::new(env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()))
    }

    /// Build a client with an explicit (possibly absent) credential.
    pub fn new(api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            api_key,
            endpoint: env::var("ATLAS_EXPLAIN_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.into()),
            model: env::var("ATLAS_EXPLAIN_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into()),
            http,
        }
    }

    /// Explain a file. Always returns text.
    pub async fn explain_file(&self, path: &Path, source: &str) -> String {
        let Some(api_key) = &self.api_key else {
            return "Explanation unavailable: no API key configured (set OPENAI_API_KEY)."
                .to_string();
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let head = truncate_source(source);

        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You explain source code at three levels. Answer with exactly \
                                three labeled sections: 'Like I'm five:' (a child-level \
                                analogy), 'Getting warmer:' (an intermediate description), \
                                and 'Technical:' (a precise technical description)."
                },
                {
                    "role": "user",
                    "content": format!("Explain the file `{name}`:\n\n```\n{head}\n```")
                }
            ]
        });

        match self.request(api_key, &body).await {
            Ok(text) => text,
            Err(message) => {
                debug!(path = %path.display(), error = %message, "explanation request failed");
                format!("Explanation unavailable: {message}")
            }
        }
    }

    async fn request(&self, api_key: &str, body: &Value) -> Result<String, String> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| err.to_string())?;

        if !response.status().is_success() {
            return Err(format!("service returned {}", response.status()));
        }

        let value: Value = response.json().await.map_err(|err| err.to_string())?;
        value["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| "malformed service response".to_string())
    }
}

fn truncate_source(source: &str) -> String {
    source.chars().take(MAX_SOURCE_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_keeps_first_3000_chars() {
        let long = "x".repeat(5000);
        assert_eq!(truncate_source(&long).len(), MAX_SOURCE_CHARS);
        assert_eq!(truncate_source("short"), "short");
    }

    #[tokio::test]
    async fn missing_credential_returns_text_not_error() {
        let client = ExplainClient::new(None);
        let text = client
            .explain_file(Path::new("src/app.ts"), "const x = 1;")
            .await;
        assert!(text.contains("no API key"));
    }

    #[tokio::test]
    async fn unreachable_service_returns_text_not_error() {
        let mut client = ExplainClient::new(Some("test-key".to_string()));
        client.endpoint = "http://127.0.0.1:9".to_string();
        let text = client
            .explain_file(Path::new("src/app.ts"), "const x = 1;")
            .await;
        assert!(text.starts_with("Explanation unavailable:"));
    }
}
