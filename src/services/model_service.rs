use crate::error::Result;
use reqwest::Client;
use serde_json::Value as JsonValue;
use std::time::Duration;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Thin client over the Gemini generateContent endpoint. The model is
/// treated as a black-box text completion: one prompt in, raw text out,
/// with no structured-output guarantee.
#[derive(Clone)]
pub struct ModelService {
    client: Client,
    api_key: String,
    model: String,
}

impl ModelService {
    pub fn new(api_key: String, model: String, client: Client) -> Self {
        Self {
            client,
            api_key,
            model,
        }
    }

    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/{}:generateContent", GEMINI_BASE_URL, self.model);
        let payload = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let res = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&payload)
            .timeout(Duration::from_secs(120))
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Gemini API Error {}: {}", status, text).into());
        }

        let body: JsonValue = res.json().await?;

        extract_candidate_text(&body)
            .ok_or_else(|| anyhow::anyhow!("Invalid Gemini response format").into())
    }
}

fn extract_candidate_text(body: &JsonValue) -> Option<String> {
    body.get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plucks_first_candidate_text() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "[]" }] }
            }]
        });
        assert_eq!(extract_candidate_text(&body).as_deref(), Some("[]"));
    }

    #[test]
    fn rejects_bodies_without_candidates() {
        assert!(extract_candidate_text(&json!({"error": {"code": 429}})).is_none());
        assert!(extract_candidate_text(&json!({"candidates": []})).is_none());
    }
}
