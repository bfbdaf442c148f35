//! Wire envelopes for the task store plus the extraction result type.

use serde::{Deserialize, Serialize};

use taskflow_core::Task;
use taskflow_extract::ExtractMode;

/// Collection responses: `{ "todos": [...], "count": n }`. The extract
/// endpoint sends the same shape without `count`.
#[derive(Debug, Deserialize)]
pub(crate) struct TodosEnvelope {
    pub todos: Vec<Task>,
    #[serde(default)]
    pub count: usize,
}

/// Single-record responses: `{ "todo": {...}, "message": "..." }`. The
/// message is advisory and ignored here.
#[derive(Debug, Deserialize)]
pub(crate) struct TodoEnvelope {
    pub todo: Task,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExtractRequest<'a> {
    pub text: &'a str,
    pub mode: ExtractMode,
}

/// Which engine produced an extraction result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// The hosted extractor behind `/ai/extract`.
    Remote,
    /// The in-process keyword engine.
    Local,
}

impl Engine {
    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Remote => "remote",
            Engine::Local => "local",
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Extraction output, labelled with the engine that produced it so the UI
/// can say so.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub tasks: Vec<Task>,
    pub engine: Engine,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_todos_envelope_count_is_optional() {
        let with_count: TodosEnvelope =
            serde_json::from_str(r#"{"todos":[],"count":0}"#).unwrap();
        assert_eq!(with_count.count, 0);

        let without: TodosEnvelope = serde_json::from_str(r#"{"todos":[]}"#).unwrap();
        assert!(without.todos.is_empty());
    }

    #[test]
    fn test_todo_envelope_ignores_message() {
        let envelope: TodoEnvelope = serde_json::from_str(
            r#"{"todo":{"id":"t1","title":"Buy milk"},"message":"Todo created successfully"}"#,
        )
        .unwrap();
        assert_eq!(envelope.todo.title, "Buy milk");
    }

    #[test]
    fn test_extract_request_wire_shape() {
        let body = serde_json::to_value(ExtractRequest {
            text: "Call the dentist",
            mode: ExtractMode::Notes,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"text": "Call the dentist", "mode": "notes"})
        );
    }
}
