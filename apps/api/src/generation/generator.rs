//! Caption generation: two alternative captions for a prompt.
//!
//! Flow: build prompt → primary provider (option A, option B) →
//!       on any failure, fallback provider (option A, option B) → return.
//!
//! A reply that is not valid JSON still counts as a generated option: the raw
//! text becomes the caption and the hashtag list is empty.

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::generation::prompts::{
    CAPTION_PROMPT_TEMPLATE, CAPTION_SYSTEM, POST_CONTEXT, STORY_CONTEXT, VERSION_A_NOTE,
    VERSION_B_NOTE,
};
use crate::llm_client::{strip_json_fences, ChatModel, LlmError};
use crate::models::post::{ContentOption, ContentType};

/// Output of one generation request.
#[derive(Debug, Clone)]
pub struct GeneratedContent {
    pub option_a: ContentOption,
    pub option_b: ContentOption,
    /// Provider that served both options ("openai" | "google").
    pub ai_model: &'static str,
    /// Wall time from the first provider call to the successful return.
    pub response_time_ms: i32,
}

/// Loose shape of a model reply; `hashtags` may be missing or null.
#[derive(Debug, Deserialize)]
struct RawOption {
    caption: String,
    #[serde(default)]
    hashtags: Option<Vec<String>>,
}

/// Two-provider caption generator. Both options of a request always come from
/// the same provider.
#[derive(Clone)]
pub struct ContentGenerator {
    primary: Arc<dyn ChatModel>,
    fallback: Arc<dyn ChatModel>,
}

impl ContentGenerator {
    pub fn new(primary: Arc<dyn ChatModel>, fallback: Arc<dyn ChatModel>) -> Self {
        Self { primary, fallback }
    }

    /// Generates options A and B, falling back to the second provider if the
    /// first fails on either option.
    pub async fn generate_content(
        &self,
        prompt: &str,
        content_type: ContentType,
    ) -> Result<GeneratedContent, AppError> {
        let started = Instant::now();

        let primary_error = match generate_pair(self.primary.as_ref(), prompt, content_type).await {
            Ok((option_a, option_b)) => {
                return Ok(self.finish(self.primary.as_ref(), option_a, option_b, started));
            }
            Err(e) => e,
        };

        warn!(
            "{} generation failed, falling back to {}: {primary_error}",
            self.primary.provider(),
            self.fallback.provider()
        );

        match generate_pair(self.fallback.as_ref(), prompt, content_type).await {
            Ok((option_a, option_b)) => {
                Ok(self.finish(self.fallback.as_ref(), option_a, option_b, started))
            }
            Err(fallback_error) => {
                error!(
                    "Both AI providers failed: {}: {primary_error}; {}: {fallback_error}",
                    self.primary.provider(),
                    self.fallback.provider()
                );
                Err(AppError::Llm(format!(
                    "Failed to generate content with both AI providers \
                     ({}: {primary_error}; {}: {fallback_error})",
                    self.primary.provider(),
                    self.fallback.provider()
                )))
            }
        }
    }

    fn finish(
        &self,
        model: &dyn ChatModel,
        option_a: ContentOption,
        option_b: ContentOption,
        started: Instant,
    ) -> GeneratedContent {
        let response_time_ms = i32::try_from(started.elapsed().as_millis()).unwrap_or(i32::MAX);
        info!(
            "Generated two options with {} in {}ms",
            model.provider(),
            response_time_ms
        );
        GeneratedContent {
            option_a,
            option_b,
            ai_model: model.provider(),
            response_time_ms,
        }
    }
}

/// Generates option A then option B with one provider. Stops at the first failure.
async fn generate_pair(
    model: &dyn ChatModel,
    prompt: &str,
    content_type: ContentType,
) -> Result<(ContentOption, ContentOption), LlmError> {
    let option_a = generate_option(model, prompt, content_type, VERSION_A_NOTE).await?;
    let option_b = generate_option(model, prompt, content_type, VERSION_B_NOTE).await?;
    Ok((option_a, option_b))
}

async fn generate_option(
    model: &dyn ChatModel,
    prompt: &str,
    content_type: ContentType,
    version_note: &str,
) -> Result<ContentOption, LlmError> {
    let full_prompt = build_caption_prompt(prompt, content_type, version_note);
    let reply = model.complete(&full_prompt, CAPTION_SYSTEM).await?;
    Ok(parse_option(&reply))
}

pub fn content_type_context(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Post => POST_CONTEXT,
        ContentType::Story => STORY_CONTEXT,
    }
}

/// Fills the caption template. The user prompt is suffixed with the version note.
pub fn build_caption_prompt(prompt: &str, content_type: ContentType, version_note: &str) -> String {
    CAPTION_PROMPT_TEMPLATE
        .replace("{content_type}", content_type_context(content_type))
        .replace("{prompt}", &format!("{prompt} ({version_note})"))
}

/// Parses a model reply into a `ContentOption`. Non-JSON replies become a bare caption.
pub fn parse_option(reply: &str) -> ContentOption {
    match serde_json::from_str::<RawOption>(strip_json_fences(reply)) {
        Ok(raw) => ContentOption {
            caption: raw.caption.trim().to_string(),
            hashtags: normalize_hashtags(raw.hashtags.unwrap_or_default()),
        },
        Err(e) => {
            warn!("Failed to parse AI response as JSON, using raw text as caption: {e}");
            ContentOption {
                caption: reply.trim().to_string(),
                hashtags: Vec::new(),
            }
        }
    }
}

/// Strips leading `#` and surrounding whitespace; drops empty tags.
fn normalize_hashtags(hashtags: Vec<String>) -> Vec<String> {
    hashtags
        .into_iter()
        .map(|tag| tag.trim().trim_start_matches('#').trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
