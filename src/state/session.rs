/// Application controller
///
/// Sequences the user journey START → MASKING → GENERATING → COMPARING and
/// owns the session data. Every asynchronous result is tagged with the epoch
/// it was issued under; the epoch advances on upload, generate, refine and
/// reset, so late responses from an abandoned flow are dropped.
use tracing::{debug, info, warn};

use super::data::{AppState, PortableImage};
use crate::gateway::GatewayError;

pub const MIN_VARIATIONS: u8 = 1;
pub const MAX_VARIATIONS: u8 = 4;

pub const MISSING_INPUT_ERROR: &str = "Please upload an image, provide a prompt, and mask an area.";
pub const MASK_UNAVAILABLE_ERROR: &str = "Could not generate mask. Please try again.";
pub const NO_IMAGES_ERROR: &str =
    "The AI did not return any images. It might be a safety policy violation or an issue with the prompt.";

/// Top-level session data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub state: AppState,
    pub original_image: Option<PortableImage>,
    /// Only `Some` while COMPARING
    pub edited_images: Option<Vec<PortableImage>>,
    pub prompt: String,
    pub variation_count: u8,
    pub error_message: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            state: AppState::Start,
            original_image: None,
            edited_images: None,
            prompt: String::new(),
            variation_count: MIN_VARIATIONS,
            error_message: None,
        }
    }
}

/// Everything the gateway needs for one generation batch
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub epoch: u64,
    pub original: PortableImage,
    pub mask: PortableImage,
    pub prompt: String,
    pub count: usize,
}

/// Owner of the session; all mutation goes through its transitions
#[derive(Debug, Default)]
pub struct Controller {
    session: Session,
    epoch: u64,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> AppState {
        self.session.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn enter_masking(&mut self, image: PortableImage) {
        self.epoch += 1;
        self.session.original_image = Some(image);
        self.session.edited_images = None;
        self.session.prompt.clear();
        self.session.error_message = None;
        self.session.state = AppState::Masking;
    }

    /// START → MASKING with a freshly uploaded image.
    ///
    /// Returns false (no change) outside START.
    pub fn upload(&mut self, image: PortableImage) -> bool {
        if self.session.state != AppState::Start {
            warn!("⚠️  Upload ignored in state {:?}", self.session.state);
            return false;
        }
        info!("📥 Uploaded {}", image.name);
        self.enter_masking(image);
        true
    }

    /// Prompt edits are only accepted while masking.
    pub fn set_prompt(&mut self, prompt: String) {
        if self.session.state == AppState::Masking {
            self.session.prompt = prompt;
        }
    }

    pub fn set_variation_count(&mut self, count: u8) {
        if self.session.state == AppState::Masking {
            self.session.variation_count = count.clamp(MIN_VARIATIONS, MAX_VARIATIONS);
        }
    }

    /// MASKING → GENERATING.
    ///
    /// `mask` is the export taken at click time. When a precondition fails the
    /// error message is set and the state stays MASKING. A second call while
    /// GENERATING is rejected without touching the session.
    pub fn generate(&mut self, mask: Option<PortableImage>) -> Option<GenerationRequest> {
        if self.session.state != AppState::Masking {
            debug!("Generate ignored in state {:?}", self.session.state);
            return None;
        }

        let prompt = self.session.prompt.trim().to_string();
        let Some(original) = self.session.original_image.clone().filter(|_| !prompt.is_empty()) else {
            self.session.error_message = Some(MISSING_INPUT_ERROR.to_string());
            return None;
        };

        let Some(mask) = mask else {
            self.session.error_message = Some(MASK_UNAVAILABLE_ERROR.to_string());
            return None;
        };

        self.epoch += 1;
        self.session.state = AppState::Generating;
        self.session.error_message = None;

        info!(
            "🚀 Generating {} variation(s) for {}",
            self.session.variation_count, original.name
        );

        Some(GenerationRequest {
            epoch: self.epoch,
            original,
            mask,
            prompt,
            count: self.session.variation_count as usize,
        })
    }

    /// GENERATING → COMPARING on results, GENERATING → MASKING on failure.
    ///
    /// Returns false when the result is stale (issued under an older epoch)
    /// and was dropped.
    pub fn finish_generation(&mut self, epoch: u64, result: Result<Vec<PortableImage>, GatewayError>) -> bool {
        if epoch != self.epoch || self.session.state != AppState::Generating {
            info!("🗑️  Dropping stale generation result (epoch {} vs {})", epoch, self.epoch);
            return false;
        }

        match result {
            Ok(images) if !images.is_empty() => {
                info!("✅ Received {} variation(s)", images.len());
                self.session.edited_images = Some(images);
                self.session.error_message = None;
                self.session.state = AppState::Comparing;
            }
            Ok(_) => {
                warn!("⚠️  Generation returned no images");
                self.session.error_message = Some(NO_IMAGES_ERROR.to_string());
                self.session.state = AppState::Masking;
            }
            Err(e) => {
                warn!("⚠️  Generation failed: {}", e);
                self.session.error_message = Some(e.to_string());
                self.session.state = AppState::Masking;
            }
        }
        true
    }

    /// Apply an enhanced prompt if the flow that asked for it is still current.
    pub fn apply_enhanced_prompt(&mut self, epoch: u64, prompt: String) -> bool {
        if epoch != self.epoch || self.session.state != AppState::Masking {
            info!("🗑️  Dropping stale enhanced prompt");
            return false;
        }
        self.session.prompt = prompt;
        true
    }

    /// COMPARING → MASKING with `image` as the new original.
    ///
    /// The previous original is dropped from the session.
    pub fn refine(&mut self, image: PortableImage) -> bool {
        if self.session.state != AppState::Comparing {
            warn!("⚠️  Refine ignored in state {:?}", self.session.state);
            return false;
        }
        info!("🔁 Refining {}", image.name);
        self.enter_masking(image);
        true
    }

    /// Any state → START with every field cleared.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.session = Session::default();
        info!("🔄 Session reset");
    }
}

/// Prompt enhancement indicator and its scoped error
///
/// Never touches `AppState`; the enhanced text itself goes through
/// [`Controller::apply_enhanced_prompt`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PromptAssist {
    pub in_flight: bool,
    pub error: Option<String>,
}

impl PromptAssist {
    /// Mark a request as started; false if one is already running.
    pub fn begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        self.error = None;
        true
    }

    pub fn finish(&mut self, error: Option<String>) {
        self.in_flight = false;
        self.error = error;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
