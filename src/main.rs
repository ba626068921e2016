use iced::widget::image::Handle;
use iced::{event, window, Element, Event, Size, Subscription, Task, Theme};
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageLevel};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// Declare the application modules
mod codec;
mod config;
mod gateway;
mod mask;
mod state;
mod ui;

use codec::upload::{load_upload, UPLOAD_EXTENSIONS};
use config::AppConfig;
use gateway::{Gateway, GatewayError};
use mask::{MaskSurface, Tool};
use state::comparator::Comparator;
use state::data::{AppState, PortableImage};
use state::session::{Controller, PromptAssist};
use state::settings::Preferences;
use ui::mask_canvas::StrokeInput;

/// Horizontal padding around the masking surface
const CONTENT_PADDING: f32 = 24.0;
/// How long the "copied" check mark stays visible
const COPY_INDICATOR_DURATION: Duration = Duration::from_secs(2);

/// Main application state
struct NanoBananaEditor {
    /// Session state machine
    controller: Controller,
    /// Paint/erase surface for the current original image
    surface: MaskSurface,
    /// Present only while COMPARING
    comparator: Option<Comparator>,
    /// Prompt enhancement indicator
    assist: PromptAssist,
    /// An upload is being decoded
    uploading: bool,
    preferences: Preferences,
    preferences_path: Option<PathBuf>,
    gateway: Arc<Gateway>,
    /// Width available to the masking surface
    container_width: f32,
    /// Display handles, rebuilt only when the pixels change
    base_handle: Option<Handle>,
    overlay_handle: Option<Handle>,
    overlay_revision: u64,
    result_handles: Vec<Option<Handle>>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Upload Image"
    OpenFile,
    /// A file was dropped onto the window
    FileDropped(PathBuf),
    /// Background upload decoding finished (tagged with the issuing epoch)
    UploadLoaded(u64, Result<PortableImage, String>),
    WindowResized(Size),
    /// Redraw tick while the overlay handle is out of date
    Frame,
    DismissWelcome,

    ToolSelected(Tool),
    BrushWidthChanged(f32),
    Stroke(StrokeInput),
    ClearMask,
    PromptChanged(String),
    EnhancePrompt,
    PromptEnhanced(u64, Result<String, GatewayError>),
    VariationCountChanged(u8),
    Generate,
    GenerationFinished(u64, Result<Vec<PortableImage>, GatewayError>),

    SelectResult(usize),
    Refine,
    Download,
    Downloaded(Result<PathBuf, String>),
    GenerateVideoPrompt,
    VideoPromptFinished {
        epoch: u64,
        token: u64,
        result: Result<String, GatewayError>,
    },
    CopyVideoPrompt,
    CopyIndicatorExpired { epoch: u64, token: u64 },

    /// "Start Over" from any screen
    Reset,
}

impl NanoBananaEditor {
    /// Create a new instance of the application
    fn new(config: AppConfig, gateway: Gateway) -> (Self, Task<Message>) {
        let preferences_path = Preferences::default_path();
        let preferences = preferences_path
            .as_deref()
            .map(Preferences::load)
            .unwrap_or_default();

        info!("🍌 Nano Banana Editor initialized ({:?})", config);

        (
            NanoBananaEditor {
                controller: Controller::new(),
                surface: MaskSurface::new(),
                comparator: None,
                assist: PromptAssist::default(),
                uploading: false,
                preferences,
                preferences_path,
                gateway: Arc::new(gateway),
                container_width: config.default_canvas_width,
                base_handle: None,
                overlay_handle: None,
                overlay_revision: 0,
                result_handles: Vec::new(),
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFile => {
                if self.controller.state() != AppState::Start || self.uploading {
                    return Task::none();
                }

                // Show the native file picker dialog
                let file = FileDialog::new()
                    .set_title("Select an Image to Edit")
                    .add_filter("Images", &UPLOAD_EXTENSIONS)
                    .pick_file();

                match file {
                    Some(path) => self.start_upload(path),
                    None => Task::none(),
                }
            }
            Message::FileDropped(path) => {
                if self.controller.state() != AppState::Start || self.uploading {
                    return Task::none();
                }
                self.start_upload(path)
            }
            Message::UploadLoaded(epoch, result) => {
                if epoch != self.controller.epoch() {
                    info!("🗑️  Dropping upload from a previous session");
                    return Task::none();
                }
                self.uploading = false;
                self.finish_upload(result);
                Task::none()
            }
            Message::WindowResized(size) => {
                self.container_width = (size.width - 2.0 * CONTENT_PADDING).max(1.0);
                Task::none()
            }
            Message::DismissWelcome => {
                self.preferences.onboarding_complete = true;
                if let Some(path) = &self.preferences_path {
                    if let Err(e) = self.preferences.save(path) {
                        warn!("⚠️  Could not save preferences: {}", e);
                    }
                }
                Task::none()
            }

            Message::ToolSelected(tool) => {
                self.surface.set_tool(tool);
                Task::none()
            }
            Message::BrushWidthChanged(width) => {
                self.surface.set_brush_width(width);
                Task::none()
            }
            Message::Stroke(input) => {
                if self.controller.state() != AppState::Masking {
                    self.surface.end_stroke();
                    return Task::none();
                }
                // The overlay handle catches up on the next frame
                match input {
                    StrokeInput::Began(point) => self.surface.begin_stroke(point.into()),
                    StrokeInput::Moved(point) => self.surface.continue_stroke(point.into()),
                    StrokeInput::Ended => {
                        self.surface.end_stroke();
                        self.refresh_overlay_handle();
                    }
                }
                Task::none()
            }
            Message::Frame => {
                self.refresh_overlay_handle();
                Task::none()
            }
            Message::ClearMask => {
                self.surface.clear();
                self.refresh_overlay_handle();
                Task::none()
            }
            Message::PromptChanged(prompt) => {
                self.controller.set_prompt(prompt);
                Task::none()
            }
            Message::EnhancePrompt => {
                if self.controller.state() != AppState::Masking || !self.assist.begin() {
                    return Task::none();
                }

                let epoch = self.controller.epoch();
                let prompt = self.controller.session().prompt.clone();
                let gateway = Arc::clone(&self.gateway);

                Task::perform(
                    async move { gateway.enhance_prompt(&prompt).await },
                    move |result| Message::PromptEnhanced(epoch, result),
                )
            }
            Message::PromptEnhanced(epoch, result) => {
                if epoch != self.controller.epoch() {
                    info!("🗑️  Dropping stale enhanced prompt");
                    return Task::none();
                }
                match result {
                    Ok(prompt) => {
                        self.controller.apply_enhanced_prompt(epoch, prompt);
                        self.assist.finish(None);
                    }
                    Err(e) => self.assist.finish(Some(e.to_string())),
                }
                Task::none()
            }
            Message::VariationCountChanged(count) => {
                self.controller.set_variation_count(count);
                Task::none()
            }
            Message::Generate => {
                if self.assist.in_flight {
                    return Task::none();
                }

                // Mask is taken at click time
                let mask = self.surface.produce_mask();
                let Some(request) = self.controller.generate(mask) else {
                    return Task::none();
                };

                let epoch = request.epoch;
                let gateway = Arc::clone(&self.gateway);

                Task::perform(
                    async move {
                        gateway
                            .edit_image(&request.original, &request.mask, &request.prompt, request.count)
                            .await
                    },
                    move |result| Message::GenerationFinished(epoch, result),
                )
            }
            Message::GenerationFinished(epoch, result) => {
                if !self.controller.finish_generation(epoch, result) {
                    return Task::none();
                }

                if self.controller.state() == AppState::Comparing {
                    let session = self.controller.session();
                    let results = session.edited_images.clone().unwrap_or_default();
                    let original_name = session
                        .original_image
                        .as_ref()
                        .map(|image| image.name.clone())
                        .unwrap_or_default();

                    self.result_handles = results.iter().map(image_handle).collect();
                    self.comparator = Comparator::new(results, original_name);
                }
                Task::none()
            }

            Message::SelectResult(index) => {
                if let Some(comparator) = self.comparator.as_mut() {
                    comparator.select(index);
                }
                Task::none()
            }
            Message::Refine => {
                let Some(selected) = self.comparator.as_ref().map(|c| c.selected().clone()) else {
                    return Task::none();
                };
                if !self.controller.refine(selected.clone()) {
                    return Task::none();
                }

                self.comparator = None;
                self.result_handles.clear();
                self.assist.reset();
                if let Err(e) = self.surface.initialize(&selected, self.container_width) {
                    // Generate will report the missing mask
                    error!("❌ Could not decode {} for refining: {}", selected.name, e);
                    self.surface.unload();
                }
                self.refresh_surface_handles();
                Task::none()
            }
            Message::Download => {
                let Some(comparator) = self.comparator.as_ref() else {
                    return Task::none();
                };

                // Show the native save dialog
                let destination = FileDialog::new()
                    .set_title("Save Edited Image")
                    .set_file_name(comparator.download_name())
                    .add_filter("PNG", &["png"])
                    .save_file();

                match destination {
                    Some(path) => Task::perform(
                        codec::export::save_png(path, comparator.selected().clone()),
                        |result| Message::Downloaded(result.map_err(|e| e.to_string())),
                    ),
                    None => Task::none(),
                }
            }
            Message::Downloaded(Ok(path)) => {
                info!("✅ Downloaded to {}", path.display());
                Task::none()
            }
            Message::Downloaded(Err(message)) => {
                error!("❌ Download failed: {}", message);
                alert(MessageLevel::Error, "Download", "Failed to save the image.");
                Task::none()
            }
            Message::GenerateVideoPrompt => {
                let Some((token, image)) = self.comparator.as_mut().and_then(|c| c.request_video_prompt()) else {
                    return Task::none();
                };

                let epoch = self.controller.epoch();
                let gateway = Arc::clone(&self.gateway);

                Task::perform(
                    async move { gateway.generate_video_prompt_from_image(&image).await },
                    move |result| Message::VideoPromptFinished { epoch, token, result },
                )
            }
            Message::VideoPromptFinished { epoch, token, result } => {
                if epoch != self.controller.epoch() {
                    info!("🗑️  Dropping video prompt from a previous session");
                    return Task::none();
                }
                if let Some(comparator) = self.comparator.as_mut() {
                    comparator.finish_video_prompt(token, result);
                }
                Task::none()
            }
            Message::CopyVideoPrompt => {
                let Some(comparator) = self.comparator.as_mut() else {
                    return Task::none();
                };
                let Some(text) = comparator.prompt_to_copy().map(str::to_string) else {
                    return Task::none();
                };

                let copied = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text));
                match copied {
                    Ok(()) => {
                        let epoch = self.controller.epoch();
                        let token = comparator.mark_copied();
                        Task::perform(tokio::time::sleep(COPY_INDICATOR_DURATION), move |_| {
                            Message::CopyIndicatorExpired { epoch, token }
                        })
                    }
                    Err(e) => {
                        warn!("⚠️  Clipboard write failed: {}", e);
                        alert(MessageLevel::Error, "Copy", "Failed to copy prompt.");
                        Task::none()
                    }
                }
            }
            Message::CopyIndicatorExpired { epoch, token } => {
                if epoch == self.controller.epoch() {
                    if let Some(comparator) = self.comparator.as_mut() {
                        comparator.expire_copied(token);
                    }
                }
                Task::none()
            }

            Message::Reset => {
                self.controller.reset();
                self.surface.unload();
                self.comparator = None;
                self.assist.reset();
                self.uploading = false;
                self.result_handles.clear();
                self.refresh_surface_handles();
                Task::none()
            }
        }
    }

    /// Decode an upload in the background; one at a time.
    fn start_upload(&mut self, path: PathBuf) -> Task<Message> {
        info!("📂 Loading {}", path.display());
        self.uploading = true;

        let epoch = self.controller.epoch();
        Task::perform(load_upload(path), move |result| {
            Message::UploadLoaded(epoch, result.map_err(|e| e.to_string()))
        })
    }

    /// START → MASKING once the upload decoded; rejections leave everything untouched.
    fn finish_upload(&mut self, result: Result<PortableImage, String>) {
        let image = match result {
            Ok(image) => image,
            Err(message) => {
                warn!("⚠️  Upload rejected: {}", message);
                alert(MessageLevel::Warning, "Upload", &message);
                return;
            }
        };

        if self.controller.state() != AppState::Start {
            return;
        }

        // The surface must accept the pixels before the session changes
        if let Err(e) = self.surface.initialize(&image, self.container_width) {
            warn!("⚠️  Could not decode {}: {}", image.name, e);
            alert(MessageLevel::Warning, "Upload", &codec::CodecError::UnsupportedMediaType.to_string());
            return;
        }
        self.controller.upload(image);
        self.assist.reset();
        self.refresh_surface_handles();
    }

    fn refresh_surface_handles(&mut self) {
        self.base_handle = self
            .surface
            .base_pixels()
            .map(|pixels| Handle::from_rgba(pixels.width(), pixels.height(), pixels.as_raw().clone()));
        self.overlay_revision = u64::MAX;
        self.refresh_overlay_handle();
    }

    fn refresh_overlay_handle(&mut self) {
        if self.overlay_revision == self.surface.revision() {
            return;
        }
        self.overlay_revision = self.surface.revision();
        self.overlay_handle = self
            .surface
            .overlay_pixels()
            .map(|pixels| Handle::from_rgba(pixels.width(), pixels.height(), pixels.as_raw().clone()));
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        ui::screens::view(self)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    /// Window events the app reacts to
    fn subscription(&self) -> Subscription<Message> {
        let window_events = event::listen_with(|event, _status, _window| match event {
            Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
            Event::Window(window::Event::Resized(size)) => Some(Message::WindowResized(size)),
            _ => None,
        });

        // Coalesce overlay rebuilds to one per frame while strokes are landing
        if self.overlay_revision != self.surface.revision() {
            Subscription::batch([window_events, window::frames().map(|_| Message::Frame)])
        } else {
            window_events
        }
    }
}

/// Encoded result bytes as a display handle; undecodable payloads get none.
fn image_handle(image: &PortableImage) -> Option<Handle> {
    match image.bytes() {
        Ok(bytes) => Some(Handle::from_bytes(bytes)),
        Err(e) => {
            warn!("⚠️  Cannot display {}: {}", image.name, e);
            None
        }
    }
}

/// Blocking native message box
#[cfg(not(test))]
fn alert(level: MessageLevel, title: &str, description: &str) {
    MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(description)
        .set_buttons(MessageButtons::Ok)
        .show();
}

// No dialogs in headless tests
#[cfg(test)]
fn alert(_level: MessageLevel, title: &str, description: &str) {
    info!("{}: {}", title, description);
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Missing credentials are fatal: no window without them
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let gateway = match Gateway::from_config(&config) {
        Ok(gateway) => gateway,
        Err(e) => {
            error!("❌ Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    iced::application(
        "Nano Banana Editor",
        NanoBananaEditor::update,
        NanoBananaEditor::view,
    )
    .theme(NanoBananaEditor::theme)
    .subscription(NanoBananaEditor::subscription)
    .centered()
    .run_with(move || NanoBananaEditor::new(config, gateway))
}
