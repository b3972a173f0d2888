//! Execution records.
//!
//! A [`TaskExecution`] is the persisted trail of one attempt to run a task:
//! terminal status, result or error, and a chronological log. Records are
//! append-only once they reach a terminal status; retries append log entries
//! instead of rewriting history.

use crate::now_ms;
use crate::task::TaskId;
use serde::{Deserialize, Serialize};

/// Unique identifier for an execution record.
pub type ExecutionId = String;

/// Lifecycle of an execution: Pending -> Running -> terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed | ExecutionStatus::Failed | ExecutionStatus::Cancelled
        )
    }
}

/// Severity of an execution log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// One entry in an execution's log trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLog {
    pub timestamp: i64,
    pub level: LogLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// The record of one attempt to run a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskExecution {
    pub id: ExecutionId,
    pub task_id: TaskId,
    pub agent_id: String,
    pub status: ExecutionStatus,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
    pub logs: Vec<ExecutionLog>,
}

impl TaskExecution {
    pub fn new(id: impl Into<ExecutionId>, task_id: impl Into<TaskId>, agent_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            task_id: task_id.into(),
            agent_id: agent_id.into(),
            status: ExecutionStatus::Pending,
            started_at: now_ms(),
            completed_at: None,
            result: None,
            error: None,
            logs: Vec::new(),
        }
    }

    /// Append a log entry, preserving everything already recorded.
    pub fn log(&mut self, level: LogLevel, message: impl Into<String>, data: Option<serde_json::Value>) {
        self.logs.push(ExecutionLog {
            timestamp: now_ms(),
            level,
            message: message.into(),
            data,
        });
    }

    /// Wall-clock duration, available once the execution completed.
    pub fn duration_ms(&self) -> Option<i64> {
        self.completed_at.map(|done| done - self.started_at)
    }

    pub(crate) fn mark_completed(&mut self, result: serde_json::Value) {
        self.status = ExecutionStatus::Completed;
        self.completed_at = Some(now_ms());
        self.result = Some(result);
        self.error = None;
    }

    pub(crate) fn mark_failed(&mut self, error: impl Into<String>) {
        self.status = ExecutionStatus::Failed;
        self.completed_at = Some(now_ms());
        self.error = Some(error.into());
    }

    pub(crate) fn mark_cancelled(&mut self, reason: &str) {
        self.status = ExecutionStatus::Cancelled;
        self.completed_at = Some(now_ms());
        self.log(LogLevel::Info, reason.to_string(), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_execution_is_pending() {
        let exec = TaskExecution::new("exec-1", "task-1", "agent-1");
        assert_eq!(exec.status, ExecutionStatus::Pending);
        assert!(!exec.status.is_terminal());
        assert!(exec.completed_at.is_none());
    }

    #[test]
    fn test_terminal_transitions() {
        let mut exec = TaskExecution::new("exec-1", "task-1", "agent-1");
        exec.mark_failed("boom");
        assert_eq!(exec.status, ExecutionStatus::Failed);
        assert!(exec.status.is_terminal());
        assert_eq!(exec.error.as_deref(), Some("boom"));

        // A successful retry overwrites the failure but keeps the record id
        exec.mark_completed(serde_json::json!({"ok": true}));
        assert_eq!(exec.status, ExecutionStatus::Completed);
        assert!(exec.error.is_none());
        assert_eq!(exec.id, "exec-1");
    }

    #[test]
    fn test_logs_append_in_order() {
        let mut exec = TaskExecution::new("exec-1", "task-1", "agent-1");
        exec.log(LogLevel::Info, "first", None);
        exec.log(LogLevel::Error, "second", Some(serde_json::json!({"attempt": 1})));
        assert_eq!(exec.logs.len(), 2);
        assert_eq!(exec.logs[0].message, "first");
        assert_eq!(exec.logs[1].level, LogLevel::Error);
    }

    #[test]
    fn test_status_serde_tag() {
        let json = serde_json::to_string(&ExecutionStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }
}
