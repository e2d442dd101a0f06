use crate::error::GatewayError;
use crate::generator::TextGenerator;
use crate::json::extract_json_or;
use crate::mock::{
    mock_graph, mock_graph_value, mock_summary, mock_summary_value, mock_tasks, mock_tasks_value,
};
use crate::prompts::{graph_prompt, summary_prompt, tasks_prompt};
use meetmap_core::model::{CollabGraph, SummaryBlock, TaskList};
use meetmap_core::normalize;
use std::sync::Arc;
use tracing::info;

/// Everything extracted from one transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub graph: CollabGraph,
    pub summary: SummaryBlock,
    pub tasks: TaskList,
}

/// Runs the graph, summary and task prompts over a transcript.
///
/// Without a generator every result is canned mock data.
#[derive(Clone, Default)]
pub struct MeetingExtractor {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl MeetingExtractor {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    pub fn mock() -> Self {
        Self { generator: None }
    }

    pub fn is_mock(&self) -> bool {
        self.generator.is_none()
    }

    pub async fn run(&self, transcript: &str) -> Result<Extraction, GatewayError> {
        let Some(generator) = &self.generator else {
            info!("no model configured, returning mock extraction");
            return Ok(Extraction {
                graph: mock_graph(),
                summary: mock_summary(),
                tasks: mock_tasks(),
            });
        };

        let graph_text = generator.generate(&graph_prompt(transcript)).await?;
        let summary_text = generator.generate(&summary_prompt(transcript)).await?;
        let tasks_text = generator.generate(&tasks_prompt(transcript)).await?;

        let graph = normalize(&extract_json_or(&graph_text, mock_graph_value));
        let summary = SummaryBlock::from_value(&extract_json_or(&summary_text, mock_summary_value));
        let tasks = TaskList::from_value(&extract_json_or(&tasks_text, mock_tasks_value));

        info!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            bullets = summary.bullets.len(),
            tasks = tasks.items.len(),
            "extraction complete"
        );

        Ok(Extraction {
            graph,
            summary,
            tasks,
        })
    }
}
