use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Small persisted user preferences
///
/// Stored as JSON in the user's data directory:
/// - Linux: ~/.local/share/nano-banana-editor/preferences.json
/// - macOS: ~/Library/Application Support/nano-banana-editor/preferences.json
/// - Windows: %APPDATA%\nano-banana-editor\preferences.json
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Preferences {
    /// Set once the welcome banner has been dismissed
    #[serde(default)]
    pub onboarding_complete: bool,
}

impl Preferences {
    /// Default location of the preferences file
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::data_dir().or_else(dirs::home_dir)?;
        path.push("nano-banana-editor");
        path.push("preferences.json");
        Some(path)
    }

    /// Convert to JSON string for storage
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read preferences; a missing or corrupt file yields defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json).unwrap_or_else(|e| {
                warn!("⚠️  Ignoring corrupt preferences at {}: {}", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Write preferences, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)?;
        info!("📁 Preferences saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load(&dir.path().join("nope.json"));
        assert!(!prefs.onboarding_complete);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let prefs = Preferences {
            onboarding_complete: true,
        };
        prefs.save(&path).unwrap();

        assert_eq!(Preferences::load(&path), prefs);
    }

    #[test]
    fn test_corrupt_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{not json").unwrap();

        assert_eq!(Preferences::load(&path), Preferences::default());
    }

    #[test]
    fn test_unknown_fields_tolerated() {
        let prefs = Preferences::from_json(r#"{"theme": "dark"}"#).unwrap();
        assert!(!prefs.onboarding_complete);
    }
}
