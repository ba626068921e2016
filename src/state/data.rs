/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the codec layer, the AI gateway and the UI layer.

/// A self-describing image: display name, data URI and media type.
///
/// Created on upload, on mask export and for every AI-returned variation.
/// Never mutated after construction; components pass clones around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortableImage {
    /// Display/download name only (e.g., "holiday.jpg")
    pub name: String,
    /// `data:<media type>;base64,<payload>`
    pub encoded_data: String,
    /// e.g., "image/png"
    pub media_type: String,
}

impl PortableImage {
    /// Build from an already base64-encoded payload.
    pub fn from_base64(name: impl Into<String>, media_type: impl Into<String>, payload: &str) -> Self {
        let media_type = media_type.into();
        Self {
            name: name.into(),
            encoded_data: format!("data:{};base64,{}", media_type, payload),
            media_type,
        }
    }

    /// The base64 payload without the `data:` prefix, if the URI is well formed.
    pub fn payload(&self) -> Option<&str> {
        crate::codec::parse_data_uri(&self.encoded_data)
            .ok()
            .map(|(_, payload)| payload)
    }
}

/// Top-level screens of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    /// Waiting for an upload
    #[default]
    Start,
    /// Painting a mask and writing a prompt
    Masking,
    /// A generation batch is in flight
    Generating,
    /// Browsing the returned variations
    Comparing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base64_builds_data_uri() {
        let img = PortableImage::from_base64("a.png", "image/png", "QUJD");
        assert_eq!(img.encoded_data, "data:image/png;base64,QUJD");
        assert_eq!(img.payload(), Some("QUJD"));
    }

    #[test]
    fn test_default_state_is_start() {
        assert_eq!(AppState::default(), AppState::Start);
    }
}
