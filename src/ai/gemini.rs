//! Gemini REST backend for the design studio.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::ai::prompts::{render_prompt, review_prompt};
use crate::ai::{AiError, DesignReview, DesignStudio, RenderedImage};
use crate::config::{CarConfig, StudioSettings};

pub struct GeminiStudio {
    settings: StudioSettings,
    agent: ureq::Agent,
}

impl GeminiStudio {
    pub fn new(settings: StudioSettings) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(settings.request_timeout)
            .build();
        Self { settings, agent }
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.base_url.trim_end_matches('/'),
            model
        )
    }

    fn generate(
        &self,
        model: &str,
        body: &Value,
        unavailable: fn(String) -> AiError,
    ) -> Result<GenerateContentResponse, AiError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .ok_or(AiError::MissingApiKey)?;

        let response = self
            .agent
            .post(&self.endpoint(model))
            .set("x-goog-api-key", api_key)
            .send_json(body)
            .map_err(|err| unavailable(err.to_string()))?;

        response
            .into_json::<GenerateContentResponse>()
            .map_err(|err| unavailable(format!("unreadable response: {err}")))
    }
}

impl DesignStudio for GeminiStudio {
    fn review_design(&self, config: &CarConfig) -> Result<DesignReview, AiError> {
        let body = review_request(&review_prompt(config));
        let response = self.generate(
            &self.settings.review_model,
            &body,
            AiError::ReviewUnavailable,
        )?;
        parse_review(&response)
    }

    fn render_design(&self, config: &CarConfig) -> Result<Option<RenderedImage>, AiError> {
        let body = render_request(&render_prompt(config), &self.settings.render_aspect_ratio);
        let response = self.generate(
            &self.settings.render_model,
            &body,
            AiError::RenderUnavailable,
        )?;
        extract_image(&response)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    pub data: String,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| content.parts.as_slice())
            .unwrap_or_default()
    }
}

pub fn review_request(prompt: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "rating": { "type": "NUMBER", "description": "A score from 1-10" },
                    "critique": { "type": "STRING" },
                    "suggestedEnhancements": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" }
                    },
                    "marketSegment": { "type": "STRING" }
                },
                "required": ["rating", "critique", "suggestedEnhancements", "marketSegment"]
            }
        }
    })
}

pub fn render_request(prompt: &str, aspect_ratio: &str) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "imageConfig": { "aspectRatio": aspect_ratio }
        }
    })
}

pub fn parse_review(response: &GenerateContentResponse) -> Result<DesignReview, AiError> {
    let text: String = response
        .first_parts()
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect();

    let text = text.trim();
    if text.is_empty() {
        return Err(AiError::ReviewUnavailable(
            "no response from the AI designer".to_string(),
        ));
    }

    serde_json::from_str(text)
        .map_err(|err| AiError::ReviewUnavailable(format!("malformed review: {err}")))
}

/// Decode the first inline image of the first candidate. Text-only answers
/// yield `Ok(None)`.
pub fn extract_image(response: &GenerateContentResponse) -> Result<Option<RenderedImage>, AiError> {
    let Some(inline) = response
        .first_parts()
        .iter()
        .find_map(|part| part.inline_data.as_ref())
    else {
        return Ok(None);
    };

    let bytes = STANDARD
        .decode(inline.data.trim())
        .map_err(|err| AiError::RenderUnavailable(format!("bad image payload: {err}")))?;
    let decoded = image::load_from_memory(&bytes)
        .map_err(|err| AiError::RenderUnavailable(format!("undecodable image: {err}")))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();

    Ok(Some(RenderedImage {
        width,
        height,
        rgba: decoded.into_raw(),
        mime_type: if inline.mime_type.is_empty() {
            "image/png".to_string()
        } else {
            inline.mime_type.clone()
        },
    }))
}
