//! Provider and collaborator contracts

pub mod retrieve;
pub mod speech;
pub mod store;
pub mod translate;

pub use retrieve::{Embedder, KnowledgeIndex, Passage};
pub use speech::{LanguageGuess, LanguageIdentifier, SpeechToText, TextToSpeech};
pub use store::{AudioStore, EntityDirectory, Instance, SessionStore};
pub use translate::Translator;
