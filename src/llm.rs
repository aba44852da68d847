//! Pluggable text-generation capability.
//!
//! The rest of the crate only knows [`TextGenerator`]: a blocking
//! string-to-string capability. Two backends implement it:
//!
//! - [`OllamaGenerator`] — local inference via an Ollama server's chat API.
//! - [`RemoteGenerator`] — a remote HTTP inference endpoint with
//!   bearer-token authentication and a `{"inputs": ...}` payload.
//!
//! The backend is selected once from configuration ([`LlmConfig::from_env`])
//! at composition time; business logic never branches on the provider.
//! Both backends share a fixed 60 second transport timeout — callers that
//! need a bound on the blocking call get it here, not in the core.

use std::time::Duration;

use anyhow::{Result, bail};
use serde_json::{Value, json};
use thiserror::Error;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b-instruct";

/// Blocking text-generation capability: one prompt in, one text out.
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Failure taxonomy for a generation call. Callers at the delegator
/// boundary convert these into displayable text; they never cross the
/// crate's public explanation contract as errors.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("request to {endpoint} failed: {reason}")]
    Transport { endpoint: String, reason: String },
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },
}

/// Provider selection plus the per-provider settings, read from the
/// environment: `LLM_PROVIDER` (`ollama`, the default, or `remote`),
/// `OLLAMA_ENDPOINT`/`OLLAMA_MODEL` for local inference, and
/// `LLM_ENDPOINT`/`LLM_API_KEY` for the remote provider.
#[derive(Debug, Clone)]
pub enum LlmConfig {
    Ollama { endpoint: String, model: String },
    Remote { endpoint: String, api_key: String },
}

impl LlmConfig {
    pub fn from_env() -> Result<Self> {
        let provider =
            std::env::var("LLM_PROVIDER").unwrap_or_else(|_| "ollama".to_string());
        match provider.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(LlmConfig::Ollama {
                endpoint: std::env::var("OLLAMA_ENDPOINT")
                    .unwrap_or_else(|_| DEFAULT_OLLAMA_ENDPOINT.to_string()),
                model: std::env::var("OLLAMA_MODEL")
                    .unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string()),
            }),
            "remote" => {
                let endpoint = std::env::var("LLM_ENDPOINT").unwrap_or_default();
                let api_key = std::env::var("LLM_API_KEY").unwrap_or_default();
                if endpoint.is_empty() || api_key.is_empty() {
                    bail!("Remote provider requires LLM_ENDPOINT and LLM_API_KEY to be set");
                }
                Ok(LlmConfig::Remote { endpoint, api_key })
            }
            other => bail!("Invalid LLM_PROVIDER '{other}'. Use 'ollama' or 'remote'"),
        }
    }

    pub fn into_generator(self) -> Box<dyn TextGenerator> {
        match self {
            LlmConfig::Ollama { endpoint, model } => {
                Box::new(OllamaGenerator::new(endpoint, model))
            }
            LlmConfig::Remote { endpoint, api_key } => {
                Box::new(RemoteGenerator::new(endpoint, api_key))
            }
        }
    }
}

fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(REQUEST_TIMEOUT)
        .build()
}

fn post_json(
    agent: &ureq::Agent,
    url: &str,
    bearer: Option<&str>,
    payload: Value,
) -> Result<Value, GenerateError> {
    let mut request = agent.post(url);
    if let Some(token) = bearer {
        request = request.set("Authorization", &format!("Bearer {token}"));
    }
    let response = match request.send_json(payload) {
        Ok(response) => response,
        Err(ureq::Error::Status(status, response)) => {
            return Err(GenerateError::Status {
                endpoint: url.to_string(),
                status,
                body: response.into_string().unwrap_or_default(),
            });
        }
        Err(err) => {
            return Err(GenerateError::Transport {
                endpoint: url.to_string(),
                reason: err.to_string(),
            });
        }
    };
    response
        .into_json()
        .map_err(|err| GenerateError::MalformedResponse {
            endpoint: url.to_string(),
            reason: err.to_string(),
        })
}

/// Local inference through an Ollama server's `/api/chat` endpoint.
pub struct OllamaGenerator {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(endpoint: String, model: String) -> Self {
        Self {
            agent: agent(),
            endpoint,
            model,
        }
    }
}

impl TextGenerator for OllamaGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!("{}/api/chat", self.endpoint.trim_end_matches('/'));
        let payload = json!({
            "model": self.model,
            "stream": false,
            "messages": [{ "role": "user", "content": prompt }],
        });
        let body = post_json(&self.agent, &url, None, payload)?;
        extract_chat_content(&body, &url)
    }
}

fn extract_chat_content(body: &Value, endpoint: &str) -> Result<String, GenerateError> {
    body.pointer("/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GenerateError::MalformedResponse {
            endpoint: endpoint.to_string(),
            reason: "missing message.content field".to_string(),
        })
}

/// Remote HTTP inference endpoint with bearer-token authentication.
pub struct RemoteGenerator {
    agent: ureq::Agent,
    endpoint: String,
    api_key: String,
}

impl RemoteGenerator {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            agent: agent(),
            endpoint,
            api_key,
        }
    }
}

impl TextGenerator for RemoteGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let payload = json!({ "inputs": prompt });
        let body = post_json(&self.agent, &self.endpoint, Some(&self.api_key), payload)?;
        Ok(extract_generated_text(body))
    }
}

/// Remote endpoints commonly answer `[{"generated_text": ...}]`; any other
/// JSON body is passed through stringified rather than rejected.
fn extract_generated_text(body: Value) -> String {
    if let Some(text) = body
        .get(0)
        .and_then(|first| first.get("generated_text"))
        .and_then(Value::as_str)
    {
        return text.to_string();
    }
    body.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_content_is_extracted() {
        let body = json!({ "message": { "role": "assistant", "content": "hello" } });
        assert_eq!(
            extract_chat_content(&body, "http://localhost:11434/api/chat").unwrap(),
            "hello"
        );
    }

    #[test]
    fn chat_without_content_is_malformed() {
        let body = json!({ "done": true });
        let err = extract_chat_content(&body, "http://x/api/chat").unwrap_err();
        assert!(matches!(err, GenerateError::MalformedResponse { .. }));
        assert!(err.to_string().contains("message.content"));
    }

    #[test]
    fn generated_text_array_is_unwrapped() {
        let body = json!([{ "generated_text": "answer" }]);
        assert_eq!(extract_generated_text(body), "answer");
    }

    #[test]
    fn unexpected_remote_body_is_stringified() {
        let body = json!({ "error": "model loading" });
        assert_eq!(extract_generated_text(body), r#"{"error":"model loading"}"#);
    }
}
