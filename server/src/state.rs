use ingestion::TranscriptPipeline;
use meetmap_core::config::AppConfig;
use query::{BundleQuery, ChatService};
use slm::{ChatCompleter, ChatCompletionClient, GatewayError, GeminiClient, MeetingExtractor};
use std::sync::Arc;
use storage::BundleStore;

pub struct AppState {
    pub pipeline: TranscriptPipeline,
    pub bundles: BundleQuery,
    pub chat: ChatService,
}

impl AppState {
    pub fn new(
        store: Arc<BundleStore>,
        extractor: MeetingExtractor,
        completer: Arc<dyn ChatCompleter>,
        context_chars: usize,
    ) -> Self {
        Self {
            pipeline: TranscriptPipeline::new(store.clone(), extractor),
            bundles: BundleQuery::new(store.clone()),
            chat: ChatService::new(store, completer).with_context_chars(context_chars),
        }
    }

    /// Wire the store and both model backends from configuration. Without an
    /// LLM key extraction runs in mock mode.
    pub fn from_config(config: &AppConfig) -> Result<Self, GatewayError> {
        let store = Arc::new(BundleStore::new(&config.storage.data_dir));

        let extractor = match GeminiClient::from_config(&config.llm)? {
            Some(client) => {
                tracing::info!(endpoint = client.endpoint(), "extraction backend configured");
                MeetingExtractor::new(Arc::new(client))
            }
            None => {
                tracing::warn!("no LLM API key set, extraction will return mock data");
                MeetingExtractor::mock()
            }
        };

        if config.chat.api_key().is_none() {
            tracing::warn!("no chat API key set, chat requests will fail");
        }
        let completer = Arc::new(ChatCompletionClient::from_config(&config.chat)?);

        Ok(Self::new(
            store,
            extractor,
            completer,
            config.chat.context_chars,
        ))
    }
}
