//! Chat grounded on a stored run.
//!
//! The run's summary bullets and transcript are folded into one system
//! message placed ahead of the caller's conversation.

use meetmap_core::error::{ErrorCode, MeetmapError};
use serde::{Deserialize, Serialize};
use slm::{ChatCompleter, ChatMessage, GatewayError, Role};
use std::sync::Arc;
use storage::{BundleStore, RunContext, StoreError};
use thiserror::Error;
use tracing::info;

pub const SYSTEM_PROMPT: &str =
    "You are Friendli. Answer concisely using the meeting context provided.";
pub const MAX_CONTEXT_BULLETS: usize = 60;
pub const DEFAULT_CONTEXT_CHARS: usize = 18_000;
const TRUNCATION_MARKER: &str = "\n...[truncated]";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("No run folder with transcript.txt under {0}")]
    NoRun(String),
    #[error("Found run folder, but no transcript/summary inside")]
    EmptyRun,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Chat gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

impl MeetmapError for ChatError {
    fn error_code(&self) -> ErrorCode {
        match self {
            ChatError::NoRun(_) => ErrorCode::NotFound,
            ChatError::EmptyRun => ErrorCode::InvalidArgument,
            ChatError::Store(err) => err.error_code(),
            ChatError::Gateway(err) => err.error_code(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAnswer {
    pub answer: String,
}

/// What the chat endpoint would ground on, without calling the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPreview {
    pub selected_run: Option<String>,
    pub bullets_count: usize,
    pub transcript_chars: usize,
    pub data_dir: String,
    pub hint: String,
}

pub struct ChatService {
    store: Arc<BundleStore>,
    completer: Arc<dyn ChatCompleter>,
    context_chars: usize,
}

impl ChatService {
    pub fn new(store: Arc<BundleStore>, completer: Arc<dyn ChatCompleter>) -> Self {
        Self {
            store,
            completer,
            context_chars: DEFAULT_CONTEXT_CHARS,
        }
    }

    pub fn with_context_chars(mut self, context_chars: usize) -> Self {
        self.context_chars = context_chars;
        self
    }

    pub async fn ask(
        &self,
        messages: Vec<ChatMessage>,
        run: Option<&str>,
    ) -> Result<ChatAnswer, ChatError> {
        let context = self
            .store
            .load_run_context(run)
            .await?
            .ok_or_else(|| ChatError::NoRun(self.data_dir()))?;
        if context.transcript.is_empty() && context.bullets.is_empty() {
            return Err(ChatError::EmptyRun);
        }

        let mut conversation = Vec::with_capacity(messages.len() + 1);
        conversation.push(ChatMessage::new(
            Role::System,
            system_context(&context, self.context_chars),
        ));
        conversation.extend(messages);

        info!(
            run = %context.run,
            messages = conversation.len(),
            "forwarding grounded chat"
        );
        let answer = self.completer.complete(&conversation).await?;
        Ok(ChatAnswer { answer })
    }

    pub async fn preview(&self, run: Option<&str>) -> Result<ContextPreview, ChatError> {
        let context = self.store.load_run_context(run).await?;
        let (selected_run, bullets_count, transcript_chars) = match context {
            Some(ctx) => (
                Some(ctx.run),
                ctx.bullets.len(),
                ctx.transcript.chars().count(),
            ),
            None => (None, 0, 0),
        };

        Ok(ContextPreview {
            selected_run,
            bullets_count,
            transcript_chars,
            data_dir: self.data_dir(),
            hint: "Use ?run=<folderName> to target a specific subfolder of the data directory"
                .to_string(),
        })
    }

    fn data_dir(&self) -> String {
        self.store.root().display().to_string()
    }
}

/// Build the system message: prompt, run name, bullets, trimmed transcript.
pub fn system_context(context: &RunContext, max_chars: usize) -> String {
    let mut parts = vec![
        SYSTEM_PROMPT.to_string(),
        format!("Run folder: {}", context.run),
    ];
    if !context.bullets.is_empty() {
        let bullets: Vec<&str> = context
            .bullets
            .iter()
            .take(MAX_CONTEXT_BULLETS)
            .map(String::as_str)
            .collect();
        parts.push(format!("Meeting Summary:\n- {}", bullets.join("\n- ")));
    }
    if !context.transcript.is_empty() {
        parts.push(format!(
            "Transcript (trimmed):\n{}",
            trim_chars(&context.transcript, max_chars)
        ));
    }
    parts.join("\n\n")
}

/// Strip surrounding whitespace and cap at `max` characters.
pub fn trim_chars(text: &str, max: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
    }
}
