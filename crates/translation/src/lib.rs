//! Translation bridge for the Tontouma conversational engine
//!
//! Only the bridge language (Wolof in this deployment) is translated; every
//! other supported language is handed to the model as-is.

mod bridge;
mod fallback;
mod noop;

pub use bridge::TranslationBridge;
pub use fallback::FallbackTranslator;
pub use noop::NoopTranslator;
