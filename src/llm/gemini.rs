//! Gemini LLM provider implementation
//!
//! Uses the blocking reqwest client. Callers inside the async runtime must run
//! these calls on the blocking pool.

use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use super::ContentGenerator;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model every session is bound to
pub const GEMINI_MODEL: &str = "gemini-2.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, all parts joined
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Authenticated handle for one API key and one model
pub struct GeminiSession {
    client: reqwest::blocking::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl GeminiSession {
    pub fn new(api_key: String, model: &str) -> Result<Self> {
        Self::with_api_base(GEMINI_API_BASE, api_key, model)
    }

    /// Session against a non-default endpoint
    pub fn with_api_base(api_base: &str, api_key: String, model: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key,
            model: model.to_string(),
        })
    }
}

impl ContentGenerator for GeminiSession {
    fn generate_content(&self, prompt: &str) -> Result<Option<String>> {
        // key travels in a header so it never shows up in URL-bearing errors
        let url = format!("{}/models/{}:generateContent", self.api_base, self.model);

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .map_err(reqwest::Error::without_url)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(anyhow!("Gemini API error {}: {}", status, error_text));
        }

        let data: GenerateContentResponse =
            response.json().map_err(reqwest::Error::without_url)?;
        Ok(data.text())
    }
}
