use anyhow::{anyhow, Result};
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::{ModelChoice, CONFIG};
use crate::llm::media::ImagePayload;
use crate::utils::http::get_http_client;
use crate::utils::timing::log_llm_timing;
use crate::vibes::prompts::{CAPTION_SYSTEM_PROMPT, CAPTION_USER_PROMPT};

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Option<Vec<GeminiPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

fn redact_api_key(text: &str) -> String {
    let key = CONFIG.gemini_api_key.trim();
    if key.is_empty() {
        return text.to_string();
    }
    text.replace(key, "[redacted]")
}

pub(crate) fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

pub(crate) fn summarize_error_body(body: &str) -> (Option<String>, String) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return (None, "empty response body".to_string());
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let message = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string())
            .or_else(|| {
                value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(|v| v.to_string())
            });
        return (message, truncate_for_log(&value.to_string(), 2000));
    }

    (None, truncate_for_log(trimmed, 2000))
}

fn extract_text_from_response(response: GeminiResponse) -> String {
    let mut text_parts = Vec::new();
    for candidate in response.candidates.unwrap_or_default() {
        if let Some(content) = candidate.content {
            for part in content.parts.unwrap_or_default() {
                if let Some(text) = part.text {
                    if !text.trim().is_empty() {
                        text_parts.push(text);
                    }
                }
            }
        }
    }
    text_parts.join("\n")
}

fn build_payload(system_prompt: &str, parts: Vec<Value>) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": system_prompt }] },
        "contents": [{ "role": "user", "parts": parts }],
        "generationConfig": {
            "temperature": CONFIG.gemini_temperature,
            "topK": CONFIG.gemini_top_k,
            "topP": CONFIG.gemini_top_p,
            "maxOutputTokens": CONFIG.gemini_max_output_tokens,
        },
    })
}

// One attempt per request; a failure here is absorbed by the caller's
// stage fallback rather than retried.
async fn call_gemini_api(model_id: &str, payload: &Value) -> Result<GeminiResponse> {
    let client = get_http_client();
    let url = format!(
        "{}/models/{}:generateContent?key={}",
        CONFIG.gemini_api_url.trim_end_matches('/'),
        model_id,
        CONFIG.gemini_api_key
    );

    let response = match client.post(&url).json(payload).send().await {
        Ok(response) => response,
        Err(err) => {
            let err_text = redact_api_key(&err.to_string());
            warn!(
                "Gemini request failed to send: {} (timeout={}, connect={})",
                err_text,
                err.is_timeout(),
                err.is_connect()
            );
            return Err(anyhow!("Gemini request failed: {}", err_text));
        }
    };

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let (message, body_summary) = summarize_error_body(&body);
        warn!("Gemini API error: status={}, body={}", status, body_summary);
        let detail = message.unwrap_or(body_summary);
        return Err(anyhow!(
            "Gemini request failed with status {}: {}",
            status,
            detail
        ));
    }

    let value = response.json::<GeminiResponse>().await?;
    Ok(value)
}

/// Vision stage: caption the uploaded image with the flash model.
pub async fn caption_image(image: &ImagePayload) -> Result<String> {
    let encoded = general_purpose::STANDARD.encode(&image.bytes);
    let parts = vec![
        json!({ "text": CAPTION_USER_PROMPT }),
        json!({
            "inlineData": {
                "mimeType": image.mime_type,
                "data": encoded
            }
        }),
    ];
    let payload = build_payload(CAPTION_SYSTEM_PROMPT, parts);
    let model_id = CONFIG.gemini_model.clone();

    log_llm_timing("gemini", &model_id, "caption_image", || async {
        let response = call_gemini_api(&model_id, &payload).await?;
        let text = extract_text_from_response(response);
        debug!(
            target: "llm.gemini",
            "caption response: {}",
            truncate_for_log(&text, 200)
        );
        Ok(text)
    })
    .await
}

/// Plain text generation against an explicitly chosen model.
pub async fn generate_text(
    model: ModelChoice,
    system_prompt: &str,
    user_prompt: &str,
) -> Result<String> {
    let parts = vec![json!({ "text": user_prompt })];
    let payload = build_payload(system_prompt, parts);
    let model_id = model.model_id(&CONFIG).to_string();
    let operation = format!("generate_text:{}", model.label());

    log_llm_timing("gemini", &model_id, &operation, || async {
        let response = call_gemini_api(&model_id, &payload).await?;
        Ok(extract_text_from_response(response))
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_text_parts_and_skips_blanks() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "parts": [
                        { "text": "first" },
                        { "text": "   " },
                        { "inlineData": { "mimeType": "image/png", "data": "aa" } },
                        { "text": "second" }
                    ]
                }
            }]
        }))
        .unwrap();
        assert_eq!(extract_text_from_response(response), "first\nsecond");
    }

    #[test]
    fn empty_candidates_yield_empty_text() {
        let response: GeminiResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(extract_text_from_response(response), "");
    }

    #[test]
    fn error_body_summary_prefers_the_error_message() {
        let (message, _) =
            summarize_error_body(r#"{"error": {"message": "quota exhausted", "code": 429}}"#);
        assert_eq!(message.as_deref(), Some("quota exhausted"));
    }

    #[test]
    fn truncation_marks_long_values() {
        let long = "x".repeat(300);
        let truncated = truncate_for_log(&long, 100);
        assert!(truncated.ends_with("(truncated)"));
        assert!(truncate_for_log("short", 100) == "short");
    }
}
