//! Ollama HTTP bridge.
//!
//! Implements the `Embedder` and `Generator` traits by calling an
//! external Ollama server's `/api/embed` and `/api/generate` endpoints.

use serde::{Deserialize, Serialize};
use ureq::Agent;

use super::{Embedder, Generator};
use crate::error::EngineError;

/// Configuration for both Ollama bridges.
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server (e.g. `http://localhost:11434`).
    pub base_url: String,
    pub embedding_model: String,
    pub generation_model: String,
    /// Embedding request timeout in seconds.
    pub embed_timeout_secs: u64,
    /// Generation request timeout in seconds.
    pub generate_timeout_secs: u64,
    /// Sampling temperature passed through to generation.
    pub temperature: f64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            generation_model: "llama3.2:1b".to_string(),
            embed_timeout_secs: 30,
            generate_timeout_secs: 120,
            temperature: 0.2,
        }
    }
}

fn agent_with_timeout(timeout_secs: u64) -> Agent {
    let config = Agent::config_builder()
        .timeout_global(Some(std::time::Duration::from_secs(timeout_secs)))
        .build();
    Agent::new_with_config(config)
}

// ── Embedding ─────────────────────────────────────────────────────────────

/// Request body for the `/api/embed` endpoint.
#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

pub struct OllamaEmbedder {
    url: String,
    model: String,
    agent: Agent,
}

impl OllamaEmbedder {
    pub fn new(config: &OllamaConfig) -> Self {
        Self {
            url: format!("{}/api/embed", config.base_url.trim_end_matches('/')),
            model: config.embedding_model.clone(),
            agent: agent_with_timeout(config.embed_timeout_secs),
        }
    }
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EngineError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        tracing::debug!(
            batch_size = texts.len(),
            url = %self.url,
            "Sending embedding request"
        );

        let body = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        let response: EmbedResponse = self
            .agent
            .post(&self.url)
            .send_json(&body)
            .map_err(|e| EngineError::EmbeddingUnavailable(format!("embed request failed: {}", e)))?
            .body_mut()
            .read_json()
            .map_err(|e| {
                EngineError::EmbeddingUnavailable(format!("embed response parse error: {}", e))
            })?;

        if response.embeddings.len() != texts.len() {
            return Err(EngineError::EmbeddingUnavailable(format!(
                "sent {} texts but received {} vectors",
                texts.len(),
                response.embeddings.len()
            )));
        }

        tracing::debug!(
            batch_size = texts.len(),
            embedding_dim = response.embeddings.first().map_or(0, |e| e.len()),
            "Embeddings received"
        );

        Ok(response.embeddings)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ── Generation ────────────────────────────────────────────────────────────

/// Request body for the `/api/generate` endpoint (non-streaming).
#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f64,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

pub struct OllamaGenerator {
    url: String,
    model: String,
    temperature: f64,
    agent: Agent,
}

impl OllamaGenerator {
    pub fn new(config: &OllamaConfig) -> Self {
        Self {
            url: format!("{}/api/generate", config.base_url.trim_end_matches('/')),
            model: config.generation_model.clone(),
            temperature: config.temperature,
            agent: agent_with_timeout(config.generate_timeout_secs),
        }
    }
}

impl Generator for OllamaGenerator {
    fn generate(&self, prompt: &str) -> Result<String, EngineError> {
        tracing::debug!(
            prompt_chars = prompt.len(),
            url = %self.url,
            "Sending generation request"
        );

        let body = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.temperature,
            },
        };

        let response: GenerateResponse = self
            .agent
            .post(&self.url)
            .send_json(&body)
            .map_err(|e| {
                EngineError::GenerationUnavailable(format!("generate request failed: {}", e))
            })?
            .body_mut()
            .read_json()
            .map_err(|e| {
                EngineError::GenerationUnavailable(format!(
                    "generate response parse error: {}",
                    e
                ))
            })?;

        Ok(response.response)
    }
}
