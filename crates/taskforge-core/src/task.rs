//! Task data model.
//!
//! A task is a typed, parameterised unit of work. Tasks are immutable once
//! submitted; the planner and the queue operations are the only places that
//! inspect them after submission.

use crate::now_ms;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a task.
pub type TaskId = String;

/// The kind of work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Search,
    Analysis,
    Generation,
    Validation,
    Coordination,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Search => "search",
            TaskType::Analysis => "analysis",
            TaskType::Generation => "generation",
            TaskType::Validation => "validation",
            TaskType::Coordination => "coordination",
        }
    }

    /// All task types, for agents declaring the full capability set.
    pub fn all() -> Vec<TaskType> {
        vec![
            TaskType::Search,
            TaskType::Analysis,
            TaskType::Generation,
            TaskType::Validation,
            TaskType::Coordination,
        ]
    }
}

/// A unit of work submitted to the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier
    pub id: TaskId,
    /// Human-readable name
    pub name: String,
    /// What the task is supposed to accomplish
    pub description: String,
    /// Task type, matched against agent capabilities
    pub task_type: TaskType,
    /// Pinned executor; when set the planner skips agent selection
    pub agent_id: Option<String>,
    /// Agents a coordination task wants to involve
    #[serde(default)]
    pub required_agents: Vec<String>,
    /// IDs of tasks that must complete before this one
    #[serde(default)]
    pub dependencies: Vec<TaskId>,
    /// Task-specific parameters (queries, prompts, payloads, ...)
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
    /// Priority, 1 (lowest) to 10 (highest)
    pub priority: u8,
    /// Per-execution deadline in milliseconds
    pub timeout_ms: Option<u64>,
    /// Upper bound on retry attempts for retryable failures
    pub retry_count: Option<u32>,
    /// Creation timestamp (ms since epoch)
    pub created_at: i64,
    /// Last update timestamp (ms since epoch)
    pub updated_at: i64,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, name: impl Into<String>, task_type: TaskType) -> Self {
        let now = now_ms();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            task_type,
            agent_id: None,
            required_agents: Vec::new(),
            dependencies: Vec::new(),
            parameters: HashMap::new(),
            priority: 5,
            timeout_ms: None,
            retry_count: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    pub fn with_dependency(mut self, dep_id: impl Into<TaskId>) -> Self {
        self.dependencies.push(dep_id.into());
        self
    }

    pub fn with_required_agent(mut self, agent_id: impl Into<String>) -> Self {
        self.required_agents.push(agent_id.into());
        self
    }

    /// Clamped to the 1-10 range.
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority.clamp(1, 10);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = Some(retry_count);
        self
    }

    pub fn param(&self, key: &str) -> Option<&serde_json::Value> {
        self.parameters.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let task = Task::new("t1", "Search docs", TaskType::Search);
        assert_eq!(task.priority, 5);
        assert!(task.agent_id.is_none());
        assert!(task.dependencies.is_empty());
        assert!(task.timeout_ms.is_none());
    }

    #[test]
    fn test_priority_clamped() {
        let task = Task::new("t1", "t", TaskType::Search).with_priority(42);
        assert_eq!(task.priority, 10);
        let task = Task::new("t2", "t", TaskType::Search).with_priority(0);
        assert_eq!(task.priority, 1);
    }

    #[test]
    fn test_params_and_dependencies() {
        let task = Task::new("t1", "t", TaskType::Analysis)
            .with_param("data", serde_json::json!([1, 2, 3]))
            .with_dependency("t0");
        assert_eq!(task.param("data"), Some(&serde_json::json!([1, 2, 3])));
        assert_eq!(task.dependencies, vec!["t0".to_string()]);
    }

    #[test]
    fn test_task_type_serde_tag() {
        let json = serde_json::to_string(&TaskType::Generation).unwrap();
        assert_eq!(json, "\"generation\"");
    }
}
