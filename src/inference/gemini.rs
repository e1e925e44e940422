//! Gemini `generateContent` backend.

use log::error;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::inference::{InferenceBackend, InferenceError};
use crate::pipeline::encoder::EncodedImage;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Blocking client for the Gemini `generateContent` endpoint.
///
/// Deliberately unbounded: no timeout, no retry, one request per call. A
/// hung service hangs the caller; anyone needing cancellation wraps the
/// [`InferenceBackend`] seam instead.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    pub fn with_model(api_key: &str, model: &str) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .expect("reqwest client build never fails with valid TLS config");
        Self {
            client,
            base_url: GEMINI_BASE_URL.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

/// Request body: the instruction text first, then the images in their
/// given order as inline data parts.
pub(crate) fn build_request_body(prompt: &str, images: &[EncodedImage]) -> Value {
    let mut parts = Vec::with_capacity(images.len() + 1);
    parts.push(json!({ "text": prompt }));
    for image in images {
        parts.push(json!({
            "inline_data": {
                "mime_type": image.media_type,
                "data": image.data,
            }
        }));
    }
    json!({ "contents": [{ "parts": parts }] })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// First candidate's text, verbatim — an empty reply is still a reply
/// and must stay distinguishable from a transport failure. Only a
/// response with no candidate content at all is malformed.
fn extract_text(response: GenerateContentResponse) -> Result<String, InferenceError> {
    let content = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .ok_or_else(|| {
            InferenceError::Malformed("response carries no candidate content".to_string())
        })?;

    Ok(content.parts.into_iter().filter_map(|p| p.text).collect())
}

impl InferenceBackend for GeminiClient {
    fn invoke(&self, prompt: &str, images: &[EncodedImage]) -> Result<String, InferenceError> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let body = build_request_body(prompt, images);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(InferenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.bytes()?;
        let parsed: GenerateContentResponse = serde_json::from_slice(&raw).map_err(|e| {
            error!(
                "unparseable generateContent response: {}",
                String::from_utf8_lossy(&raw)
            );
            InferenceError::Malformed(e.to_string())
        })?;
        extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_image(data: &str) -> EncodedImage {
        EncodedImage {
            media_type: "image/jpeg",
            data: data.to_string(),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let images = vec![sample_image("AAAA"), sample_image("BBBB")];
        let body = build_request_body("read my lips", &images);

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts.as_array().unwrap().len(), 3);
        assert_eq!(parts[0]["text"], "read my lips");
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[1]["inline_data"]["data"], "AAAA");
        assert_eq!(parts[2]["inline_data"]["data"], "BBBB");
    }

    #[test]
    fn test_extract_text_from_first_candidate() {
        let parsed: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    { "content": { "parts": [ { "text": "bom " }, { "text": "dia" } ] } },
                    { "content": { "parts": [ { "text": "ignored" } ] } }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(extract_text(parsed).unwrap(), "bom dia");
    }

    #[test]
    fn test_extract_text_rejects_empty_candidates() {
        let parsed: GenerateContentResponse = serde_json::from_str(r#"{ "candidates": [] }"#).unwrap();
        assert!(matches!(
            extract_text(parsed),
            Err(InferenceError::Malformed(_))
        ));
    }

    #[test]
    fn test_extract_text_rejects_missing_content() {
        let parsed: GenerateContentResponse =
            serde_json::from_str(r#"{ "candidates": [ {} ] }"#).unwrap();
        assert!(extract_text(parsed).is_err());
    }

    #[test]
    fn test_extract_text_keeps_empty_reply_verbatim() {
        let parsed: GenerateContentResponse = serde_json::from_str(
            r#"{ "candidates": [ { "content": { "parts": [ { "text": "" } ] } } ] }"#,
        )
        .unwrap();
        assert_eq!(extract_text(parsed).unwrap(), "");
    }
}
