/// Result comparator state
///
/// Tracks which variation is selected and the artifacts derived from it
/// (video prompt, copy indicator). Derived state belongs to one selection:
/// it is wiped on every selection change, and late results for an older
/// selection are discarded via the selection token.
use tracing::{debug, info};

use super::data::PortableImage;
use crate::codec::export::download_file_name;
use crate::gateway::GatewayError;

/// Derived artifacts for the current selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedPrompt {
    pub text: Option<String>,
    pub in_flight: bool,
    pub error: Option<String>,
    /// Copy indicator token; `Some` while the check mark is showing
    pub copied: Option<u64>,
}

#[derive(Debug)]
pub struct Comparator {
    results: Vec<PortableImage>,
    /// Name of the image the results were derived from
    original_name: String,
    selected: usize,
    /// Changes on every selection so in-flight work can be recognized as stale
    selection_token: u64,
    derived: DerivedPrompt,
    copy_counter: u64,
}

impl Comparator {
    /// Returns `None` for an empty result set.
    pub fn new(results: Vec<PortableImage>, original_name: impl Into<String>) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        Some(Self {
            results,
            original_name: original_name.into(),
            selected: 0,
            selection_token: 0,
            derived: DerivedPrompt::default(),
            copy_counter: 0,
        })
    }

    pub fn results(&self) -> &[PortableImage] {
        &self.results
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> &PortableImage {
        &self.results[self.selected]
    }

    pub fn derived(&self) -> &DerivedPrompt {
        &self.derived
    }

    /// Select another variation, clearing everything derived from the old one.
    pub fn select(&mut self, index: usize) {
        if index >= self.results.len() || index == self.selected {
            return;
        }
        self.selected = index;
        self.selection_token += 1;
        self.derived = DerivedPrompt::default();
        debug!("Selected variation {}", index + 1);
    }

    /// Start (or restart) video prompt generation for the current selection.
    ///
    /// Returns the token to hand back with the result, or `None` while a
    /// request is already in flight.
    pub fn request_video_prompt(&mut self) -> Option<(u64, PortableImage)> {
        if self.derived.in_flight {
            return None;
        }
        self.derived = DerivedPrompt {
            in_flight: true,
            ..DerivedPrompt::default()
        };
        Some((self.selection_token, self.selected().clone()))
    }

    /// Store a video prompt result. Results for an older selection are dropped.
    pub fn finish_video_prompt(&mut self, token: u64, result: Result<String, GatewayError>) -> bool {
        if token != self.selection_token {
            info!("🗑️  Dropping video prompt for a previous selection");
            return false;
        }

        self.derived.in_flight = false;
        match result {
            Ok(text) => {
                self.derived.text = Some(text);
                self.derived.error = None;
            }
            Err(e) => {
                self.derived.text = None;
                self.derived.error = Some(e.to_string());
            }
        }
        true
    }

    /// Text to put on the clipboard, if a prompt exists.
    pub fn prompt_to_copy(&self) -> Option<&str> {
        self.derived.text.as_deref()
    }

    /// Show the copy indicator; returns the token that expires it.
    pub fn mark_copied(&mut self) -> u64 {
        self.copy_counter += 1;
        self.derived.copied = Some(self.copy_counter);
        self.copy_counter
    }

    /// Hide the copy indicator unless a newer copy replaced it.
    pub fn expire_copied(&mut self, token: u64) {
        if self.derived.copied == Some(token) {
            self.derived.copied = None;
        }
    }

    /// Save-dialog file name for the selected variation
    pub fn download_name(&self) -> String {
        download_file_name(&self.original_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(n: usize) -> Vec<PortableImage> {
        (1..=n)
            .map(|i| PortableImage::from_base64(format!("edited-{}-cat.jpg", i), "image/png", "AAAA"))
            .collect()
    }

    fn comparator(n: usize) -> Comparator {
        Comparator::new(results(n), "cat.jpg").unwrap()
    }

    #[test]
    fn test_empty_results_rejected() {
        assert!(Comparator::new(vec![], "cat.jpg").is_none());
    }

    #[test]
    fn test_first_result_selected() {
        let c = comparator(3);
        assert_eq!(c.selected_index(), 0);
        assert_eq!(c.selected().name, "edited-1-cat.jpg");
        assert_eq!(c.derived(), &DerivedPrompt::default());
    }

    #[test]
    fn test_selection_change_clears_derived_prompt_and_error() {
        let mut c = comparator(2);
        let (token, _) = c.request_video_prompt().unwrap();
        c.finish_video_prompt(token, Ok("A slow pan".into()));
        assert!(c.derived().text.is_some());

        c.select(1);
        assert_eq!(c.derived(), &DerivedPrompt::default());

        let (token, _) = c.request_video_prompt().unwrap();
        c.finish_video_prompt(token, Err(GatewayError::VideoPrompt));
        assert!(c.derived().error.is_some());

        c.select(0);
        assert_eq!(c.derived(), &DerivedPrompt::default());
    }

    #[test]
    fn test_prompt_for_previous_selection_is_dropped() {
        let mut c = comparator(2);
        let (token, image) = c.request_video_prompt().unwrap();
        assert_eq!(image.name, "edited-1-cat.jpg");

        c.select(1);
        assert!(!c.finish_video_prompt(token, Ok("stale".into())));
        assert!(c.derived().text.is_none());
        assert!(!c.derived().in_flight);
    }

    #[test]
    fn test_regenerate_replaces_text() {
        let mut c = comparator(1);
        let (token, _) = c.request_video_prompt().unwrap();
        c.finish_video_prompt(token, Ok("first".into()));

        let (token, _) = c.request_video_prompt().unwrap();
        assert!(c.derived().in_flight);
        assert!(c.derived().text.is_none());
        c.finish_video_prompt(token, Ok("second".into()));
        assert_eq!(c.prompt_to_copy(), Some("second"));
    }

    #[test]
    fn test_no_duplicate_request_while_in_flight() {
        let mut c = comparator(1);
        assert!(c.request_video_prompt().is_some());
        assert!(c.request_video_prompt().is_none());
    }

    #[test]
    fn test_select_out_of_range_is_ignored() {
        let mut c = comparator(2);
        c.select(5);
        assert_eq!(c.selected_index(), 0);
    }

    #[test]
    fn test_copy_indicator_expiry() {
        let mut c = comparator(1);
        let first = c.mark_copied();
        let second = c.mark_copied();

        // An older timer must not hide a newer indicator
        c.expire_copied(first);
        assert_eq!(c.derived().copied, Some(second));
        c.expire_copied(second);
        assert_eq!(c.derived().copied, None);
    }

    #[test]
    fn test_download_name_uses_original() {
        assert_eq!(comparator(1).download_name(), "nano-banana-edit-cat.png");
    }
}
