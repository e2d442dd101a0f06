pub mod chat;
pub mod error;
pub mod extractor;
pub mod gemini;
pub mod generator;
pub mod json;
pub mod mock;
pub mod prompts;

pub use chat::{ChatCompleter, ChatCompletionClient, ChatMessage, Role};
pub use error::GatewayError;
pub use extractor::{Extraction, MeetingExtractor};
pub use gemini::GeminiClient;
pub use generator::{ScriptedGenerator, TextGenerator};
