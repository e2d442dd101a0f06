//! Canned extraction results, used when no model key is configured and as
//! the fallback for output that holds no parseable JSON.

use meetmap_core::model::{CollabGraph, SummaryBlock, TaskList};
use meetmap_core::normalize;
use serde_json::{json, Value};

pub fn mock_graph_value() -> Value {
    json!({
        "nodes": [
            {"id": "ashu", "label": "Ashu", "size": 3.0},
            {"id": "dave", "label": "Dave", "size": 2.0},
            {"id": "priya", "label": "Priya", "size": 2.0},
        ],
        "edges": [
            {
                "source": "ashu",
                "target": "dave",
                "weight": 2.0,
                "tasks": [{
                    "title": "integrate logs",
                    "details": "Ashu uses Dave's collector",
                    "snippets": ["sync with ashu about integrating logs"],
                }],
            },
            {
                "source": "priya",
                "target": "ashu",
                "weight": 1.0,
                "tasks": [{
                    "title": "UI handoff",
                    "details": null,
                    "snippets": ["pair with ananya on redesign"],
                }],
            },
        ],
        "matrix": [[0, 2, 1], [2, 0, 0], [1, 0, 0]],
    })
}

pub fn mock_summary_value() -> Value {
    json!({
        "bullets": [
            "DB migrations pending staging slot",
            "Fraud model awaits logs from Dave",
            "Dashboard redesign; requirements from George",
        ]
    })
}

pub fn mock_tasks_value() -> Value {
    json!({
        "items": [
            {
                "owner": "Ashu",
                "description": "sync with Dave on log integration",
                "due": "today 4:30pm",
                "priority": "normal",
                "source_snippet": "dave will sync with ashu",
                "assignees": ["Ashu", "Dave"],
            },
            {
                "owner": "Charlie",
                "description": "run DB migrations on staging",
                "due": "after 3pm",
                "priority": "high",
                "source_snippet": "Diana opens slot after 3 PM",
                "assignees": ["Charlie"],
            },
        ]
    })
}

pub fn mock_graph() -> CollabGraph {
    normalize(&mock_graph_value())
}

pub fn mock_summary() -> SummaryBlock {
    SummaryBlock::from_value(&mock_summary_value())
}

pub fn mock_tasks() -> TaskList {
    TaskList::from_value(&mock_tasks_value())
}
