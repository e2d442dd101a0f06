pub mod bundles;
pub mod chat;

pub use bundles::{BundleQuery, QueryError};
pub use chat::{AskRequest, ChatAnswer, ChatError, ChatService, ContextPreview};
