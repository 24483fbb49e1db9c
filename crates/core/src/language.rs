//! Language vocabulary and request-level language resolution
//!
//! The engine operates over a small, fixed set of languages. French is the
//! working language of the model; Wolof is the bridge language and goes
//! through translation before and after processing.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Supported languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    French,
    Wolof,
    English,
    Arabic,
    Spanish,
}

impl Language {
    /// Get ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Self::French => "fr",
            Self::Wolof => "wo",
            Self::English => "en",
            Self::Arabic => "ar",
            Self::Spanish => "es",
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::French => "French",
            Self::Wolof => "Wolof",
            Self::English => "English",
            Self::Arabic => "Arabic",
            Self::Spanish => "Spanish",
        }
    }

    /// Parse from string (case-insensitive)
    ///
    /// Accepts short codes, English names, and the French spellings used by
    /// callers of the public API.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "fr" | "fra" | "fre" | "french" | "francais" | "français" => Some(Self::French),
            "wo" | "wol" | "wolof" => Some(Self::Wolof),
            "en" | "eng" | "english" | "anglais" => Some(Self::English),
            "ar" | "ara" | "arabic" | "arabe" => Some(Self::Arabic),
            "es" | "spa" | "spanish" | "espagnol" | "español" => Some(Self::Spanish),
            _ => None,
        }
    }

    /// Parse an override value from a request or admin setting
    ///
    /// Empty strings, "auto" and "none" mean "no override". Unknown values
    /// also resolve to no override so that a bad client value degrades to
    /// detection instead of rejecting the request.
    pub fn parse_override(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.to_lowercase().as_str() {
            "auto" | "none" => None,
            other => Self::from_str_loose(other),
        }
    }

    /// Get all supported languages
    pub fn all() -> &'static [Language] {
        &[
            Self::French,
            Self::Wolof,
            Self::English,
            Self::Arabic,
            Self::Spanish,
        ]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Resolve the effective language for a request.
///
/// Priority: per-request override (non-empty, non-"auto"), then the
/// process-wide operator override, then the detected language.
pub fn resolve_language(
    per_request: Option<&str>,
    global: Option<Language>,
    detected: Language,
) -> Language {
    if let Some(requested) = per_request.and_then(Language::parse_override) {
        return requested;
    }
    if let Some(forced) = global {
        return forced;
    }
    detected
}

/// Process-wide forced language, settable through the admin surface.
///
/// Reads and writes are plain last-write-wins assignments. Requests read a
/// snapshot once at entry and use it for their whole lifetime, so a change
/// mid-request only affects subsequent requests.
#[derive(Debug, Default)]
pub struct GlobalLanguageOverride {
    forced: RwLock<Option<Language>>,
}

impl GlobalLanguageOverride {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current override. `None` means auto-detect.
    pub fn get(&self) -> Option<Language> {
        *self.forced.read()
    }

    /// Set or clear the override. Passing `None` restores auto-detection.
    pub fn set(&self, language: Option<Language>) {
        *self.forced.write() = language;
        match language {
            Some(lang) => tracing::info!(language = lang.code(), "Global forced language set"),
            None => tracing::info!("Global forced language cleared (auto-detect)"),
        }
    }

    /// Language codes accepted by the admin surface.
    pub fn available_codes() -> Vec<&'static str> {
        let mut codes = vec!["none"];
        codes.extend(Language::all().iter().map(|l| l.code()));
        codes
    }
}
