//! Speech gateway for the Tontouma conversational engine
//!
//! Transcription and synthesis behind per-language provider chains. The
//! bridge language gets its specialized provider first with the general
//! provider as fallback; every other language goes straight to the general
//! provider. Provider failures never cross the gateway boundary.

pub mod artifacts;
pub mod gateway;
pub mod lid;
pub mod providers;

pub use artifacts::FsAudioStore;
pub use gateway::{SpeechError, SpeechGateway, Transcription};
pub use lid::{HttpLanguageClassifier, HttpLidConfig};
pub use providers::{transcription_hint, HttpSpeechConfig, HttpStt, HttpTts};
