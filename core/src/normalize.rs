//! Graph normalization.
//!
//! Turns the loosely structured JSON a language model returns into a
//! [`CollabGraph`] whose node ids are unique, whose edge endpoints are
//! resolved against those ids, and whose matrix is always a 2D float array.
//! [`normalize`] is total: malformed regions of the input degrade to defaults
//! instead of producing an error.

use crate::coerce::{coerce_f64, first_truthy, is_digits, list_of, scalar_text, text_of};
use crate::model::{CollabGraph, Edge, EdgeTask, Node};
use crate::slug::slugify;
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

pub const DEFAULT_WEIGHT: f64 = 1.0;
pub const DEFAULT_TASK_TITLE: &str = "task";

/// Normalize an arbitrary JSON value into a well-formed collaboration graph.
pub fn normalize(raw: &Value) -> CollabGraph {
    let empty = Map::new();
    let raw = raw.as_object().unwrap_or(&empty);

    let (nodes, table) = build_nodes(list_of(raw.get("nodes")));

    let edges = list_of(raw.get("edges"))
        .iter()
        .filter_map(|entry| build_edge(entry, &table, &nodes))
        .collect();

    let matrix = resolve_matrix(raw.get("matrix"), nodes.len());

    CollabGraph {
        nodes,
        edges,
        matrix,
    }
}

/// Normalize the task entries attached to an edge.
///
/// Bare strings become titles, objects are read field by field, anything
/// else is dropped.
pub fn normalize_tasks(raw: Option<&Value>) -> Vec<EdgeTask> {
    list_of(raw)
        .iter()
        .filter_map(|entry| match entry {
            Value::String(title) => Some(EdgeTask {
                title: title.clone(),
                details: None,
                snippets: Vec::new(),
            }),
            Value::Object(map) => Some(task_from_object(map)),
            _ => None,
        })
        .collect()
}

fn task_from_object(map: &Map<String, Value>) -> EdgeTask {
    let title = first_truthy(map, &["title", "task"])
        .map(text_of)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TASK_TITLE.to_string());

    let details = first_truthy(map, &["details", "desc"])
        .map(text_of)
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    let snippets = list_of(map.get("snippets"))
        .iter()
        .filter_map(scalar_text)
        .collect();

    EdgeTask {
        title,
        details,
        snippets,
    }
}

// ---------------------------------------------------------------------------
// Node identity
// ---------------------------------------------------------------------------

/// A form under which an edge may refer to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RefKey {
    /// Positional index, or an integral raw id.
    Index(i64),
    /// Non-integral numeric raw id, keyed by its bit pattern.
    Float(u64),
    /// Raw string id, or the original label of a bare-string node.
    Text(String),
}

impl RefKey {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(RefKey::Index(i))
                } else {
                    let f = n.as_f64()?;
                    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                        Some(RefKey::Index(f as i64))
                    } else {
                        Some(RefKey::Float(f.to_bits()))
                    }
                }
            }
            Value::String(s) => Some(RefKey::Text(s.clone())),
            _ => None,
        }
    }

    fn index(idx: usize) -> Self {
        RefKey::Index(idx as i64)
    }
}

/// Exact-match lookup from raw reference forms to node positions.
/// Later registrations win, so a positional index beats an earlier raw id
/// with the same number.
#[derive(Debug, Default)]
struct ResolutionTable {
    entries: HashMap<RefKey, usize>,
}

impl ResolutionTable {
    fn register(&mut self, key: RefKey, position: usize) {
        self.entries.insert(key, position);
    }

    fn lookup(&self, reference: &Value) -> Option<usize> {
        RefKey::from_value(reference).and_then(|key| self.entries.get(&key).copied())
    }
}

struct NodeDraft {
    node: Node,
    keys: Vec<RefKey>,
}

fn build_nodes(entries: &[Value]) -> (Vec<Node>, ResolutionTable) {
    let drafts: Vec<NodeDraft> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| match entry {
            Value::Object(map) => draft_from_object(idx, map),
            other => draft_from_label(idx, other),
        })
        .collect();

    let mut table = ResolutionTable::default();
    let mut nodes = Vec::with_capacity(drafts.len());
    for (position, draft) in drafts.into_iter().enumerate() {
        for key in draft.keys {
            table.register(key, position);
        }
        nodes.push(draft.node);
    }

    disambiguate_ids(&mut nodes);
    (nodes, table)
}

fn draft_from_object(idx: usize, map: &Map<String, Value>) -> NodeDraft {
    let label = first_truthy(map, &["label", "name", "id"])
        .map(text_of)
        .unwrap_or_else(|| placeholder_label(idx));

    let raw_id = map.get("id");
    let candidate = match raw_id {
        Some(value) => text_of(value).trim().to_string(),
        None => idx.to_string(),
    };
    let id = if candidate.is_empty() || is_digits(&candidate) {
        slug_for(&label, idx)
    } else {
        candidate
    };

    let size = map
        .get("size")
        .map_or(DEFAULT_WEIGHT, |v| coerce_f64(v).unwrap_or(DEFAULT_WEIGHT));
    let group = map
        .get("group")
        .filter(|g| !g.is_null())
        .map(|g| text_of(g).trim().to_string());

    let mut keys = Vec::with_capacity(2);
    match raw_id {
        Some(value) => keys.extend(RefKey::from_value(value)),
        None => keys.push(RefKey::index(idx)),
    }
    keys.push(RefKey::index(idx));

    NodeDraft {
        node: Node {
            id,
            label,
            size,
            group,
        },
        keys,
    }
}

fn draft_from_label(idx: usize, entry: &Value) -> NodeDraft {
    let trimmed = text_of(entry).trim().to_string();
    let label = if trimmed.is_empty() {
        placeholder_label(idx)
    } else {
        trimmed
    };
    let id = slug_for(&label, idx);

    NodeDraft {
        keys: vec![RefKey::index(idx), RefKey::Text(label.clone())],
        node: Node {
            id,
            label,
            size: DEFAULT_WEIGHT,
            group: None,
        },
    }
}

/// A slug of the label; digit-only results would shadow positional
/// references, so they fall back to `person-{idx}`.
fn slug_for(label: &str, idx: usize) -> String {
    let slug = slugify(label);
    if is_digits(&slug) {
        format!("person-{idx}")
    } else {
        slug
    }
}

fn placeholder_label(idx: usize) -> String {
    format!("Person {idx}")
}

/// Rename later duplicates by appending their position. The first
/// occurrence keeps the clean id.
fn disambiguate_ids(nodes: &mut [Node]) {
    let mut seen: HashSet<String> = HashSet::with_capacity(nodes.len());
    for (position, node) in nodes.iter_mut().enumerate() {
        if seen.contains(&node.id) {
            let base = format!("{}-{}", node.id, position);
            let mut candidate = base.clone();
            let mut attempt = 1;
            while seen.contains(&candidate) {
                candidate = format!("{base}-{attempt}");
                attempt += 1;
            }
            node.id = candidate;
        }
        seen.insert(node.id.clone());
    }
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

fn build_edge(entry: &Value, table: &ResolutionTable, nodes: &[Node]) -> Option<Edge> {
    match entry {
        Value::Object(map) => Some(Edge {
            source: resolve_reference(map.get("source"), table, nodes),
            target: resolve_reference(map.get("target"), table, nodes),
            weight: map
                .get("weight")
                .map_or(DEFAULT_WEIGHT, |v| coerce_f64(v).unwrap_or(DEFAULT_WEIGHT)),
            tasks: normalize_tasks(map.get("tasks")),
        }),
        Value::Array(pair) if pair.len() >= 2 => Some(Edge {
            source: resolve_reference(Some(&pair[0]), table, nodes),
            target: resolve_reference(Some(&pair[1]), table, nodes),
            weight: DEFAULT_WEIGHT,
            tasks: Vec::new(),
        }),
        _ => None,
    }
}

/// Resolve an edge endpoint in three tiers: exact raw/index match,
/// case-insensitive id or label match, then a synthesized slug.
fn resolve_reference(reference: Option<&Value>, table: &ResolutionTable, nodes: &[Node]) -> String {
    let reference = reference.unwrap_or(&Value::Null);

    if let Some(position) = table.lookup(reference) {
        return nodes[position].id.clone();
    }

    let wanted = text_of(reference).trim().to_lowercase();
    if let Some(node) = nodes
        .iter()
        .find(|n| n.id.to_lowercase() == wanted || n.label.to_lowercase() == wanted)
    {
        return node.id.clone();
    }

    let synthesized = slugify(&wanted);
    tracing::debug!(reference = %wanted, id = %synthesized, "synthesized edge endpoint");
    synthesized
}

// ---------------------------------------------------------------------------
// Matrix
// ---------------------------------------------------------------------------

/// Use the supplied matrix when it is square and every cell is
/// float-coercible; otherwise an `n`×`n` zero matrix. A square matrix of a
/// different size than `n` is kept as is.
fn resolve_matrix(raw: Option<&Value>, n: usize) -> Vec<Vec<f64>> {
    coerce_matrix(list_of(raw)).unwrap_or_else(|| vec![vec![0.0; n]; n])
}

fn coerce_matrix(rows: &[Value]) -> Option<Vec<Vec<f64>>> {
    if rows.is_empty() {
        return None;
    }
    let size = rows.len();
    rows.iter()
        .map(|row| -> Option<Vec<f64>> {
            let cells = row.as_array().filter(|cells| cells.len() == size)?;
            cells.iter().map(coerce_f64).collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(graph: &CollabGraph) -> Vec<&str> {
        graph.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn test_bare_label_nodes_and_pair_edges() {
        let graph = normalize(&json!({
            "nodes": ["Ashu", "Dave"],
            "edges": [["Ashu", "Dave"]]
        }));

        assert_eq!(ids(&graph), vec!["ashu", "dave"]);
        assert_eq!(graph.nodes[0].label, "Ashu");
        assert_eq!(graph.nodes[0].size, 1.0);
        assert_eq!(
            graph.edges,
            vec![Edge {
                source: "ashu".to_string(),
                target: "dave".to_string(),
                weight: 1.0,
                tasks: vec![],
            }]
        );
        assert_eq!(graph.matrix, vec![vec![0.0, 0.0], vec![0.0, 0.0]]);
    }

    #[test]
    fn test_non_object_input_is_empty_graph() {
        for raw in [json!(null), json!([1, 2]), json!("nodes"), json!(42)] {
            let graph = normalize(&raw);
            assert!(graph.nodes.is_empty());
            assert!(graph.edges.is_empty());
            assert!(graph.matrix.is_empty());
        }
    }

    #[test]
    fn test_duplicate_labels_get_positional_suffix() {
        let graph = normalize(&json!({
            "nodes": [{"label": "Sam"}, {"label": "Sam"}]
        }));
        assert_eq!(ids(&graph), vec!["sam", "sam-1"]);
    }

    #[test]
    fn test_suffix_collision_with_later_clean_id_stays_unique() {
        let graph = normalize(&json!({
            "nodes": ["Sam", "Sam", "sam-1"]
        }));
        let got = ids(&graph);
        let unique: HashSet<&str> = got.iter().copied().collect();
        assert_eq!(unique.len(), 3);
        assert_eq!(got[0], "sam");
        assert_eq!(got[1], "sam-1");
    }

    #[test]
    fn test_label_falls_back_through_name_id_and_placeholder() {
        let graph = normalize(&json!({
            "nodes": [
                {"name": "Priya"},
                {"id": "george"},
                {"label": "", "name": null},
            ]
        }));
        assert_eq!(graph.nodes[0].label, "Priya");
        assert_eq!(graph.nodes[0].id, "priya");
        assert_eq!(graph.nodes[1].label, "george");
        assert_eq!(graph.nodes[1].id, "george");
        assert_eq!(graph.nodes[2].label, "Person 2");
        assert_eq!(graph.nodes[2].id, "person-2");
    }

    #[test]
    fn test_numeric_ids_are_replaced_by_label_slug() {
        let graph = normalize(&json!({
            "nodes": [
                {"id": 7, "label": "Ashu"},
                {"id": "12", "label": "Dave"},
                {"id": 3},
            ]
        }));
        assert_eq!(graph.nodes[0].id, "ashu");
        assert_eq!(graph.nodes[1].id, "dave");
        // label "3" slugs to digits too, so the position is used instead
        assert_eq!(graph.nodes[2].id, "person-2");
        assert!(graph
            .nodes
            .iter()
            .all(|n| !n.id.chars().all(|c| c.is_ascii_digit())));
    }

    #[test]
    fn test_digit_labels_in_bare_list_do_not_become_digit_ids() {
        let graph = normalize(&json!({"nodes": ["42", 7]}));
        assert_eq!(ids(&graph), vec!["person-0", "person-1"]);
        assert_eq!(graph.nodes[1].label, "7");
    }

    #[test]
    fn test_explicit_string_ids_are_kept_verbatim() {
        let graph = normalize(&json!({
            "nodes": [{"id": "  Ashu K ", "label": "Ashu"}]
        }));
        assert_eq!(graph.nodes[0].id, "Ashu K");
    }

    #[test]
    fn test_edges_resolve_raw_ids_and_positions() {
        let graph = normalize(&json!({
            "nodes": [
                {"id": 10, "label": "Ashu"},
                {"id": "d1", "label": "Dave"},
            ],
            "edges": [
                {"source": 10, "target": "d1"},
                {"source": 1, "target": 0},
            ]
        }));
        assert_eq!(graph.edges[0].source, "ashu");
        assert_eq!(graph.edges[0].target, "d1");
        assert_eq!(graph.edges[1].source, "d1");
        assert_eq!(graph.edges[1].target, "ashu");
    }

    #[test]
    fn test_position_lookup_points_at_disambiguated_id() {
        let graph = normalize(&json!({
            "nodes": ["Sam", "Sam"],
            "edges": [[0, 1]]
        }));
        assert_eq!(graph.edges[0].source, "sam");
        assert_eq!(graph.edges[0].target, "sam-1");
    }

    #[test]
    fn test_edges_resolve_case_insensitively_by_label_or_id() {
        let graph = normalize(&json!({
            "nodes": [{"id": "a1", "label": "Ashu"}, {"id": "d1", "label": "Dave"}],
            "edges": [{"source": "ASHU", "target": " D1 "}]
        }));
        assert_eq!(graph.edges[0].source, "a1");
        assert_eq!(graph.edges[0].target, "d1");
    }

    #[test]
    fn test_unresolved_endpoints_are_synthesized() {
        let graph = normalize(&json!({
            "nodes": ["Ashu"],
            "edges": [
                {"source": "Ashu", "target": "George Smith"},
                {"target": "Ashu"},
            ]
        }));
        assert_eq!(graph.edges[0].target, "george-smith");
        assert_eq!(graph.edges[1].source, "node");
        assert_eq!(graph.unresolved_endpoints(), vec!["george-smith", "node"]);
        assert_eq!(graph.nodes.len(), 1);
    }

    #[test]
    fn test_malformed_edges_are_dropped() {
        let graph = normalize(&json!({
            "nodes": ["A", "B"],
            "edges": [["A"], "A-B", 5, null, ["A", "B", "extra"]]
        }));
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.edges[0].source, "a");
        assert_eq!(graph.edges[0].target, "b");
    }

    #[test]
    fn test_weight_and_size_fall_back_to_one() {
        let graph = normalize(&json!({
            "nodes": [
                {"label": "A", "size": "2.5"},
                {"label": "B", "size": "big"},
                {"label": "C", "size": null},
            ],
            "edges": [
                {"source": "A", "target": "B", "weight": 3},
                {"source": "A", "target": "C", "weight": "heavy"},
                {"source": "B", "target": "C", "weight": "NaN"},
            ]
        }));
        let sizes: Vec<f64> = graph.nodes.iter().map(|n| n.size).collect();
        assert_eq!(sizes, vec![2.5, 1.0, 1.0]);
        let weights: Vec<f64> = graph.edges.iter().map(|e| e.weight).collect();
        assert_eq!(weights, vec![3.0, 1.0, 1.0]);
    }

    #[test]
    fn test_group_is_stringified_and_trimmed() {
        let graph = normalize(&json!({
            "nodes": [
                {"label": "A", "group": 2},
                {"label": "B", "group": " infra "},
                {"label": "C", "group": null},
            ]
        }));
        assert_eq!(graph.nodes[0].group.as_deref(), Some("2"));
        assert_eq!(graph.nodes[1].group.as_deref(), Some("infra"));
        assert_eq!(graph.nodes[2].group, None);
    }

    #[test]
    fn test_bare_string_task_becomes_title_only() {
        let graph = normalize(&json!({
            "nodes": ["Ashu", "Dave"],
            "edges": [{"source": "Ashu", "target": "Dave", "tasks": ["sync with Dave"]}]
        }));
        assert_eq!(
            graph.edges[0].tasks,
            vec![EdgeTask {
                title: "sync with Dave".to_string(),
                details: None,
                snippets: vec![],
            }]
        );
    }

    #[test]
    fn test_object_tasks_read_alternate_keys() {
        let tasks = normalize_tasks(Some(&json!([
            {"task": " integrate logs ", "desc": "collector", "snippets": ["a", 2, null]},
            {"details": "   ", "snippets": "not a list"},
            42,
            null,
        ])));
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "integrate logs");
        assert_eq!(tasks[0].details.as_deref(), Some("collector"));
        assert_eq!(tasks[0].snippets, vec!["a".to_string(), "2".to_string()]);
        assert_eq!(tasks[1].title, "task");
        assert_eq!(tasks[1].details, None);
        assert!(tasks[1].snippets.is_empty());
    }

    #[test]
    fn test_supplied_matrix_is_used_verbatim() {
        let graph = normalize(&json!({
            "nodes": ["A", "B"],
            "matrix": [[0, "2"], [2.5, true]]
        }));
        assert_eq!(graph.matrix, vec![vec![0.0, 2.0], vec![2.5, 1.0]]);
    }

    #[test]
    fn test_mismatched_matrix_is_passed_through() {
        let graph = normalize(&json!({
            "nodes": ["A", "B"],
            "matrix": [[0, 1, 2], [1, 0, 3], [2, 3, 0]]
        }));
        assert_eq!(
            graph.matrix,
            vec![vec![0.0, 1.0, 2.0], vec![1.0, 0.0, 3.0], vec![2.0, 3.0, 0.0]]
        );
        assert!(!graph.matrix_matches_nodes());
    }

    #[test]
    fn test_malformed_matrix_becomes_zero_square() {
        for matrix in [
            json!([[0, 1], "row"]),
            json!([[0, "x"], [1, 0]]),
            json!([[0, null]]),
            json!([[1, 2], [3]]),
            json!([[1, 2, 3]]),
            json!("matrix"),
            json!([]),
        ] {
            let graph = normalize(&json!({"nodes": ["A", "B", "C"], "matrix": matrix}));
            assert_eq!(graph.matrix, vec![vec![0.0; 3]; 3]);
        }
    }

    #[test]
    fn test_normalize_is_stable_on_its_own_output() {
        let first = normalize(&json!({
            "nodes": [
                {"id": 1, "label": "Ashu", "size": 3},
                {"label": "Sam"},
                {"label": "Sam", "group": "ops"},
                "José",
            ],
            "edges": [
                {"source": 0, "target": 2, "weight": "2", "tasks": ["review"]},
                ["José", "Ashu"],
                {"source": "Sam", "target": "nobody"},
            ],
            "matrix": [[1, 2], ["bad"]]
        }));
        let second = normalize(&serde_json::to_value(&first).unwrap());
        assert_eq!(first, second);
    }
}
