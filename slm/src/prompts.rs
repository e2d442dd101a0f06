//! Prompts for the three extraction tasks run over a transcript.

pub fn graph_prompt(transcript: &str) -> String {
    format!(
        r#"
You extract a collaboration graph and adjacency matrix from an unstructured morning meeting transcript.
Return ONLY valid JSON with keys:
- nodes: [{{id,label,size,group}}]
- edges: [{{source,target,weight,tasks:[{{title,details,snippets}}]}}]
- matrix: 2D array of numbers; matrix[i][j] is interaction weight between nodes[i] and nodes[j].
Rules:
- Identify people by how they self-introduce ("ashu here", "george here").
- Create an edge when work is requested, co-owned, or referenced.
- weight ~ frequency/strength of interaction (1-5).
- tasks: short actionable titles with up to 2 supporting snippets from transcript.
Transcript:
"""{transcript}"""
JSON:
"#
    )
}

pub fn summary_prompt(transcript: &str) -> String {
    format!(
        r#"
Summarize the meeting in at most 8 bullets. Focus on decisions, blockers, risks, and key dates.
Return ONLY JSON: {{ "bullets": [ "...", "..."] }}
Transcript:
"""{transcript}"""
JSON:
"#
    )
}

pub fn tasks_prompt(transcript: &str) -> String {
    format!(
        r#"
Extract a task list from the transcript. Normalize owners' names if possible.
Return ONLY JSON:
{{
  "items":[
    {{"owner":"Ashu","description":"review fraud detection inputs","due":"today 4:30pm","priority":"normal","source_snippet":"...","assignees":["Ashu"]}}
  ]
}}
Include owner when clear; else leave null. Include due dates/times in natural text if mentioned.
Transcript:
"""{transcript}"""
JSON:
"#
    )
}
