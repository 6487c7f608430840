use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::util::is_identifier;

pub const DEFAULT_ANCHOR: &str = "context.t";

/// What the engine looks for in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatcherConfig {
    /// Namespace access that precedes every message path.
    #[serde(default = "default_anchor")]
    pub anchor: String,
    /// `import '<package:...suffix>'` statements that enable matching.
    #[serde(default = "default_import_suffixes")]
    pub import_suffixes: Vec<String>,
    /// Literal strings that enable matching wherever they occur.
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,
}

fn default_anchor() -> String {
    DEFAULT_ANCHOR.to_string()
}

fn default_import_suffixes() -> Vec<String> {
    vec![
        "strings.g.dart".to_string(),
        "translations.g.dart".to_string(),
    ]
}

fn default_markers() -> Vec<String> {
    vec!["@inlang/paraglide-js".to_string()]
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            anchor: default_anchor(),
            import_suffixes: default_import_suffixes(),
            markers: default_markers(),
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let segments: Vec<&str> = self.anchor.split('.').collect();
        if segments.len() < 2 || !segments.iter().all(|s| is_identifier(s)) {
            return Err(ConfigError::InvalidAnchor(self.anchor.clone()));
        }
        if self.import_suffixes.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::EmptyMarker("importSuffixes"));
        }
        if self.markers.iter().any(|s| s.is_empty()) {
            return Err(ConfigError::EmptyMarker("markers"));
        }
        if self.import_suffixes.is_empty() && self.markers.is_empty() {
            return Err(ConfigError::NoMarkers);
        }
        Ok(())
    }
}

/// Server-side settings that are not part of the matching itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerSettings {
    #[serde(default = "default_document_selectors")]
    pub document_selectors: Vec<String>,
    /// File extensions (without dot) visited by the workspace scan.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_document_selectors() -> Vec<String> {
    vec!["dart".to_string()]
}

fn default_extensions() -> Vec<String> {
    vec!["dart".to_string()]
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            document_selectors: default_document_selectors(),
            extensions: default_extensions(),
        }
    }
}
