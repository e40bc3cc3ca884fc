//! Gemini-backed implementation of the extraction fallback.
//!
//! This client is only ever consulted when structural extraction finds
//! nothing; the pipeline treats every failure here as "zero transactions",
//! so errors are reported but never fatal. Callers own the timeout policy
//! around the single blocking call.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use teller_extract::TextCompletion;
use tracing::debug;

const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Build a client from `GEMINI_API_KEY` or `GOOGLE_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .context("GEMINI_API_KEY or GOOGLE_API_KEY must be set for the Gemini fallback")?;
        Ok(Self::new(api_key))
    }

    fn complete_blocking(&self, instruction: &str, text: &str) -> Result<String> {
        // Hosts often call this from inside a tokio runtime; block_on from
        // a nested runtime panics, so reuse the running handle when there
        // is one.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| {
                handle.block_on(self.complete_async(instruction, text))
            })
        } else {
            let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
            rt.block_on(self.complete_async(instruction, text))
        }
    }

    async fn complete_async(&self, instruction: &str, text: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Part {
            text: String,
        }

        #[derive(Serialize)]
        struct Content {
            parts: Vec<Part>,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig {
            temperature: f64,
            response_mime_type: String,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Req {
            contents: Vec<Content>,
            generation_config: GenerationConfig,
        }

        #[derive(Deserialize)]
        struct Resp {
            candidates: Option<Vec<Candidate>>,
        }

        #[derive(Deserialize)]
        struct Candidate {
            content: Option<RespContent>,
        }

        #[derive(Deserialize)]
        struct RespContent {
            parts: Option<Vec<RespPart>>,
        }

        #[derive(Deserialize)]
        struct RespPart {
            text: Option<String>,
        }

        let body = Req {
            contents: vec![Content {
                parts: vec![
                    Part { text: instruction.to_string() },
                    Part { text: text.to_string() },
                ],
            }],
            // Deterministic JSON output; this is extraction, not chat.
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json".to_string(),
            },
        };

        let url = format!("{API_BASE}/{}:generateContent?key={}", self.model, self.api_key);

        debug!(model = %self.model, chars = text.len(), "submitting fallback extraction request");
        let client = reqwest::Client::new();
        let resp = client.post(&url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            bail!("gemini request failed: {status}: {detail}");
        }

        let parsed: Resp = resp.json().await.context("decoding gemini response")?;
        let reply: String = parsed
            .candidates
            .unwrap_or_default()
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts.unwrap_or_default())
            .filter_map(|p| p.text)
            .collect();

        if reply.trim().is_empty() {
            bail!("gemini returned no text candidates");
        }
        Ok(reply)
    }
}

impl TextCompletion for GeminiClient {
    fn complete(&self, instruction: &str, text: &str) -> Result<String> {
        self.complete_blocking(instruction, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_construction() {
        let c = GeminiClient::new("key");
        assert_eq!(c.model, DEFAULT_MODEL);
        let c = GeminiClient::with_model("key", "gemini-2.5-pro");
        assert_eq!(c.model, "gemini-2.5-pro");
    }
}
