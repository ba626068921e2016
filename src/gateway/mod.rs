/// AI gateway
///
/// Stateless request/response calls against the generative AI service:
/// - Prompt enhancement (text model)
/// - Masked image editing, fanned out into parallel variations (image model)
/// - Video prompt generation from an image (text/vision model)
///
/// No caching, no retries. Every failure is logged with its detail and
/// surfaced as one user-readable message per operation.

pub mod backend;
pub mod prompts;
pub mod wire;

use futures::future::join_all;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::state::data::PortableImage;
use backend::{BackendError, GenerativeBackend, HttpBackend};
use wire::{Content, GenerateContentRequest, GenerationConfig, Part};

/// User-readable failure per operation family
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Failed to enhance prompt. The AI service might be unavailable.")]
    Enhance,
    #[error("Failed to generate images. The AI service might be unavailable or the request was blocked.")]
    Edit,
    #[error("Failed to generate video prompt. The AI service might be unavailable.")]
    VideoPrompt,
}

const DEFAULT_RESULT_MEDIA_TYPE: &str = "image/png";

/// Client for the three AI operations
#[derive(Debug)]
pub struct Gateway<B = HttpBackend> {
    backend: B,
    image_model: String,
    text_model: String,
}

impl Gateway<HttpBackend> {
    pub fn from_config(config: &AppConfig) -> Result<Self, BackendError> {
        Ok(Self::with_backend(
            HttpBackend::new(config)?,
            &config.image_model,
            &config.text_model,
        ))
    }
}

impl<B: GenerativeBackend> Gateway<B> {
    pub fn with_backend(backend: B, image_model: &str, text_model: &str) -> Self {
        Self {
            backend,
            image_model: image_model.to_string(),
            text_model: text_model.to_string(),
        }
    }

    /// Rewrite a prompt to be more vivid.
    ///
    /// Empty/whitespace prompts are returned unchanged without a request.
    /// One layer of surrounding double quotes is stripped from the answer.
    pub async fn enhance_prompt(&self, prompt: &str) -> Result<String, GatewayError> {
        if prompt.trim().is_empty() {
            return Ok(prompt.to_string());
        }

        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(prompts::enhance_request_text(prompt))])],
            system_instruction: Some(Content::system(prompts::ENHANCE_SYSTEM_INSTRUCTION)),
            generation_config: None,
        };

        let response = self
            .backend
            .generate_content(&self.text_model, &request)
            .await
            .map_err(|e| {
                error!("❌ Prompt enhancement failed: {}", e);
                GatewayError::Enhance
            })?;

        let text = response.text().ok_or_else(|| {
            error!("❌ Prompt enhancement returned no text");
            GatewayError::Enhance
        })?;

        Ok(strip_wrapping_quotes(text.trim()).to_string())
    }

    /// Generate `count` independent masked edits of `original`.
    ///
    /// All requests are issued concurrently. A failed slot (error or no image
    /// in the response) is dropped; survivors keep their request order and are
    /// named after their 1-based slot. An empty result is not an error here.
    pub async fn edit_image(
        &self,
        original: &PortableImage,
        mask: &PortableImage,
        prompt: &str,
        count: usize,
    ) -> Result<Vec<PortableImage>, GatewayError> {
        let (Some(original_data), Some(mask_data)) = (original.payload(), mask.payload()) else {
            error!("❌ Edit inputs are not valid data URIs");
            return Err(GatewayError::Edit);
        };

        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::inline(original.media_type.as_str(), original_data),
                Part::inline(mask.media_type.as_str(), mask_data),
                Part::text(prompts::edit_instruction(prompt)),
            ])],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: vec!["IMAGE".to_string(), "TEXT".to_string()],
            }),
        };

        info!("🍌 Requesting {} variation(s) of {}", count, original.name);

        let slots = (0..count).map(|index| {
            let request = &request;
            async move {
                match self.backend.generate_content(&self.image_model, request).await {
                    Ok(response) => match response.first_inline_data() {
                        Some(inline) => {
                            let media_type = if inline.mime_type.is_empty() {
                                DEFAULT_RESULT_MEDIA_TYPE
                            } else {
                                inline.mime_type.as_str()
                            };
                            Some(PortableImage::from_base64(
                                format!("edited-{}-{}", index + 1, original.name),
                                media_type,
                                &inline.data,
                            ))
                        }
                        None => {
                            warn!("⚠️  Variation {} returned no image", index + 1);
                            None
                        }
                    },
                    Err(e) => {
                        warn!("⚠️  Variation {} failed: {}", index + 1, e);
                        None
                    }
                }
            }
        });

        let results: Vec<PortableImage> = join_all(slots).await.into_iter().flatten().collect();

        info!("✅ {} of {} variation(s) succeeded", results.len(), count);
        Ok(results)
    }

    /// Describe `image` as a cinematic text-to-video prompt.
    pub async fn generate_video_prompt_from_image(&self, image: &PortableImage) -> Result<String, GatewayError> {
        let data = image.payload().ok_or_else(|| {
            error!("❌ Video prompt input is not a valid data URI");
            GatewayError::VideoPrompt
        })?;

        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::inline(image.media_type.as_str(), data),
                Part::text(prompts::VIDEO_PROMPT_REQUEST_TEXT),
            ])],
            system_instruction: Some(Content::system(prompts::VIDEO_PROMPT_SYSTEM_INSTRUCTION)),
            generation_config: None,
        };

        let response = self
            .backend
            .generate_content(&self.text_model, &request)
            .await
            .map_err(|e| {
                error!("❌ Video prompt generation failed: {}", e);
                GatewayError::VideoPrompt
            })?;

        let text = response.text().ok_or_else(|| {
            error!("❌ Video prompt generation returned no text");
            GatewayError::VideoPrompt
        })?;

        Ok(text.trim().to_string())
    }
}

fn strip_wrapping_quotes(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::tests::sample_image;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use wire::{Candidate, GenerateContentResponse};

    /// Replays canned outcomes in request order and records every call
    #[derive(Default)]
    struct FakeBackend {
        outcomes: Mutex<VecDeque<Result<GenerateContentResponse, BackendError>>>,
        calls: Mutex<Vec<(String, GenerateContentRequest)>>,
    }

    impl FakeBackend {
        fn with(outcomes: Vec<Result<GenerateContentResponse, BackendError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::default(),
            }
        }

        fn calls(&self) -> Vec<(String, GenerateContentRequest)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GenerativeBackend for FakeBackend {
        async fn generate_content(
            &self,
            model: &str,
            request: &GenerateContentRequest,
        ) -> Result<GenerateContentResponse, BackendError> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), request.clone()));
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(BackendError::Decode("no canned outcome".into())))
        }
    }

    fn reply(parts: Vec<Part>) -> Result<GenerateContentResponse, BackendError> {
        Ok(GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    role: Some("model".into()),
                    parts,
                }),
            }],
        })
    }

    fn failure() -> Result<GenerateContentResponse, BackendError> {
        Err(BackendError::Status {
            status: 503,
            body: "overloaded".into(),
        })
    }

    fn gateway(outcomes: Vec<Result<GenerateContentResponse, BackendError>>) -> Gateway<FakeBackend> {
        Gateway::with_backend(FakeBackend::with(outcomes), "image-model", "text-model")
    }

    #[tokio::test]
    async fn test_enhance_empty_prompt_is_passthrough() {
        let gw = gateway(vec![]);
        assert_eq!(gw.enhance_prompt("   ").await.unwrap(), "   ");
        assert!(gw.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_enhance_strips_one_layer_of_quotes() {
        let gw = gateway(vec![reply(vec![Part::text("  \"\"a glowing cat\"\"  \n")])]);
        let enhanced = gw.enhance_prompt("cat").await.unwrap();
        assert_eq!(enhanced, "\"a glowing cat\"");

        let calls = gw.backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "text-model");
        let request = &calls[0].1;
        assert_eq!(
            request.contents[0].parts[0].text.as_deref(),
            Some("User prompt to enhance: \"cat\"")
        );
        assert!(request.system_instruction.is_some());
    }

    #[tokio::test]
    async fn test_enhance_failure_is_generic() {
        let gw = gateway(vec![failure()]);
        assert_eq!(gw.enhance_prompt("cat").await, Err(GatewayError::Enhance));

        let gw = gateway(vec![reply(vec![])]);
        assert_eq!(gw.enhance_prompt("cat").await, Err(GatewayError::Enhance));
    }

    #[tokio::test]
    async fn test_edit_keeps_surviving_slots_in_request_order() {
        let gw = gateway(vec![
            reply(vec![Part::inline("image/png", "AAA1")]),
            failure(),
            reply(vec![Part::text("I can't do that")]),
            reply(vec![Part::text("sure"), Part::inline("", "AAA4")]),
        ]);
        let original = sample_image(4, 4);
        let mask = sample_image(4, 4);

        let results = gw.edit_image(&original, &mask, "add a hat", 4).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "edited-1-photo.png");
        assert_eq!(results[0].encoded_data, "data:image/png;base64,AAA1");
        assert_eq!(results[1].name, "edited-4-photo.png");
        assert_eq!(results[1].media_type, "image/png");
        assert_eq!(gw.backend.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_edit_request_shape() {
        let gw = gateway(vec![reply(vec![Part::inline("image/png", "AAAA")])]);
        let original = sample_image(4, 4);
        let mask = sample_image(2, 2);

        gw.edit_image(&original, &mask, "make it snow", 1).await.unwrap();

        let calls = gw.backend.calls();
        assert_eq!(calls[0].0, "image-model");
        let parts = &calls[0].1.contents[0].parts;
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].inline_data.as_ref().unwrap().data, original.payload().unwrap());
        assert_eq!(parts[1].inline_data.as_ref().unwrap().data, mask.payload().unwrap());
        assert!(parts[2].text.as_ref().unwrap().contains("\"make it snow\""));
        assert_eq!(
            calls[0].1.generation_config.as_ref().unwrap().response_modalities,
            vec!["IMAGE".to_string(), "TEXT".to_string()]
        );
    }

    #[tokio::test]
    async fn test_edit_all_slots_failing_is_empty_not_error() {
        let gw = gateway(vec![failure(), failure()]);
        let image = sample_image(2, 2);
        let results = gw.edit_image(&image, &image, "x", 2).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_edit_rejects_malformed_input() {
        let gw = gateway(vec![]);
        let mut broken = sample_image(2, 2);
        broken.encoded_data = "not a data uri".into();

        let result = gw.edit_image(&broken, &sample_image(2, 2), "x", 1).await;
        assert_eq!(result, Err(GatewayError::Edit));
        assert!(gw.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_video_prompt_is_trimmed_verbatim() {
        let gw = gateway(vec![reply(vec![Part::text("\n \"A slow dolly shot...\" \n")])]);
        let prompt = gw
            .generate_video_prompt_from_image(&sample_image(2, 2))
            .await
            .unwrap();
        assert_eq!(prompt, "\"A slow dolly shot...\"");

        let calls = gw.backend.calls();
        let request = &calls[0].1;
        assert_eq!(calls[0].0, "text-model");
        assert!(request.contents[0].parts[0].inline_data.is_some());
        assert_eq!(
            request.contents[0].parts[1].text.as_deref(),
            Some(prompts::VIDEO_PROMPT_REQUEST_TEXT)
        );
    }

    #[tokio::test]
    async fn test_video_prompt_failure_is_generic() {
        let gw = gateway(vec![failure()]);
        assert_eq!(
            gw.generate_video_prompt_from_image(&sample_image(2, 2)).await,
            Err(GatewayError::VideoPrompt)
        );
    }

    #[test]
    fn test_strip_wrapping_quotes() {
        assert_eq!(strip_wrapping_quotes("\"hi\""), "hi");
        assert_eq!(strip_wrapping_quotes("hi"), "hi");
        assert_eq!(strip_wrapping_quotes("\""), "\"");
        assert_eq!(strip_wrapping_quotes("\"half"), "\"half");
    }
}
