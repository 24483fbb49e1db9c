//! LAfricaMobile provider integration
//!
//! One authenticated HTTP client shared by three capabilities: Wolof
//! speech-to-text, Wolof text-to-speech, and translation between Wolof and
//! the model's working language. Each capability is exposed through the
//! corresponding core trait so the speech gateway and translation bridge
//! can treat this vendor like any other provider in a fallback chain.

mod client;
mod providers;

pub use client::{lam_language_code, LamClient, LamClientConfig};
pub use providers::{LamSpeechToText, LamTextToSpeech, LamTranslator};
