use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A participant in the collaboration graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(default = "default_weight")]
    pub size: f64,
    #[serde(default)]
    pub group: Option<String>,
}

/// A unit of work attached to an interaction between two people.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeTask {
    pub title: String,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub snippets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub tasks: Vec<EdgeTask>,
}

/// Who interacted with whom in a meeting.
///
/// `matrix[i][j]` is the interaction weight between `nodes[i]` and `nodes[j]`
/// by position, independent of the id strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollabGraph {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub matrix: Vec<Vec<f64>>,
}

impl CollabGraph {
    /// Edge endpoint ids that do not name any node in the graph, in first-seen order.
    pub fn unresolved_endpoints(&self) -> Vec<&str> {
        let known: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for edge in &self.edges {
            for endpoint in [edge.source.as_str(), edge.target.as_str()] {
                if !known.contains(endpoint) && seen.insert(endpoint) {
                    out.push(endpoint);
                }
            }
        }
        out
    }

    pub fn matrix_matches_nodes(&self) -> bool {
        let n = self.nodes.len();
        self.matrix.len() == n && self.matrix.iter().all(|row| row.len() == n)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SummaryBlock {
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    #[serde(default)]
    pub owner: Option<String>,
    pub description: String,
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub source_snippet: Option<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TaskList {
    #[serde(default)]
    pub items: Vec<TaskItem>,
}

/// Everything persisted for one processed run, keyed by its `YYYY-MM-DD` folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunBundle {
    pub date_dir: String,
    pub star_connect: CollabGraph,
    pub summary: SummaryBlock,
    pub tasks: TaskList,
}

fn default_weight() -> f64 {
    1.0
}
