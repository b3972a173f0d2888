//! Execution record persistence boundary.
//!
//! The orchestrator treats the store as an opaque durable sink: records are
//! saved on every status transition and read back by the analytics
//! components. Two implementations ship with the crate; embedding
//! applications substitute their own (database, remote service) behind the
//! same trait.

use crate::execution::{ExecutionId, TaskExecution};
use crate::task::TaskId;
use anyhow::{Context, Result};
use dashmap::DashMap;
use std::collections::HashMap;
use std::fs::{File, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;

/// Durable store for execution records.
#[async_trait::async_trait]
pub trait ExecutionStore: Send + Sync {
    /// Persist a record; saving the same id again overwrites the stored copy.
    async fn save_execution(&self, execution: &TaskExecution) -> Result<()>;

    async fn get_execution(&self, id: &ExecutionId) -> Result<Option<TaskExecution>>;

    async fn executions_for_task(&self, task_id: &TaskId) -> Result<Vec<TaskExecution>>;

    async fn all_executions(&self) -> Result<Vec<TaskExecution>>;
}

/// Process-local store used by default and in tests.
#[derive(Default)]
pub struct InMemoryExecutionStore {
    records: DashMap<ExecutionId, TaskExecution>,
}

impl InMemoryExecutionStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }
}

#[async_trait::async_trait]
impl ExecutionStore for InMemoryExecutionStore {
    async fn save_execution(&self, execution: &TaskExecution) -> Result<()> {
        self.records.insert(execution.id.clone(), execution.clone());
        Ok(())
    }

    async fn get_execution(&self, id: &ExecutionId) -> Result<Option<TaskExecution>> {
        Ok(self.records.get(id).map(|entry| entry.value().clone()))
    }

    async fn executions_for_task(&self, task_id: &TaskId) -> Result<Vec<TaskExecution>> {
        Ok(self
            .records
            .iter()
            .filter(|entry| &entry.value().task_id == task_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    async fn all_executions(&self) -> Result<Vec<TaskExecution>> {
        Ok(self.records.iter().map(|entry| entry.value().clone()).collect())
    }
}

/// Append-only JSON-lines store.
///
/// Every save appends one line; reads replay the file keeping the last
/// record per execution id, so a record saved on each status transition
/// collapses to its final state.
pub struct JsonlExecutionStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonlExecutionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn read_latest(&self) -> Result<HashMap<ExecutionId, TaskExecution>> {
        let mut latest = HashMap::new();
        if !self.path.exists() {
            return Ok(latest);
        }

        let file = File::open(&self.path)
            .with_context(|| format!("failed to open execution log {}", self.path.display()))?;
        let reader = BufReader::new(file);
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: TaskExecution = serde_json::from_str(&line)
                .with_context(|| format!("corrupt execution record in {}", self.path.display()))?;
            latest.insert(record.id.clone(), record);
        }
        Ok(latest)
    }
}

#[async_trait::async_trait]
impl ExecutionStore for JsonlExecutionStore {
    async fn save_execution(&self, execution: &TaskExecution) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            create_dir_all(parent)
                .with_context(|| format!("failed to create store directory {}", parent.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open execution log {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);
        let line = serde_json::to_string(execution)?;
        writeln!(writer, "{}", line)
            .with_context(|| format!("failed to append execution record to {}", self.path.display()))?;
        writer.flush()?;
        Ok(())
    }

    async fn get_execution(&self, id: &ExecutionId) -> Result<Option<TaskExecution>> {
        Ok(self.read_latest()?.remove(id))
    }

    async fn executions_for_task(&self, task_id: &TaskId) -> Result<Vec<TaskExecution>> {
        Ok(self
            .read_latest()?
            .into_values()
            .filter(|record| &record.task_id == task_id)
            .collect())
    }

    async fn all_executions(&self) -> Result<Vec<TaskExecution>> {
        Ok(self.read_latest()?.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::{ExecutionStatus, LogLevel};

    fn record(id: &str, task_id: &str) -> TaskExecution {
        let mut exec = TaskExecution::new(id, task_id, "agent-1");
        exec.log(LogLevel::Info, "created", None);
        exec
    }

    #[tokio::test]
    async fn test_memory_round_trip() {
        let store = InMemoryExecutionStore::new();
        let mut exec = record("exec-1", "task-1");
        exec.mark_completed(serde_json::json!({"answer": 42}));
        store.save_execution(&exec).await.unwrap();

        let loaded = store.get_execution(&"exec-1".to_string()).await.unwrap().unwrap();
        assert_eq!(loaded.id, exec.id);
        assert_eq!(loaded.status, ExecutionStatus::Completed);
        assert_eq!(loaded.result, exec.result);
        assert_eq!(loaded.logs, exec.logs);
    }

    #[tokio::test]
    async fn test_jsonl_round_trip_and_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlExecutionStore::new(dir.path().join("executions.jsonl"));

        let mut exec = record("exec-1", "task-1");
        store.save_execution(&exec).await.unwrap();

        exec.mark_failed("connection refused");
        store.save_execution(&exec).await.unwrap();

        let all = store.all_executions().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, ExecutionStatus::Failed);
        assert_eq!(all[0].error.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_jsonl_filter_by_task() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlExecutionStore::new(dir.path().join("executions.jsonl"));

        store.save_execution(&record("exec-1", "task-a")).await.unwrap();
        store.save_execution(&record("exec-2", "task-b")).await.unwrap();
        store.save_execution(&record("exec-3", "task-a")).await.unwrap();

        let for_a = store.executions_for_task(&"task-a".to_string()).await.unwrap();
        assert_eq!(for_a.len(), 2);
    }

    #[tokio::test]
    async fn test_jsonl_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlExecutionStore::new(dir.path().join("never-written.jsonl"));
        assert!(store.all_executions().await.unwrap().is_empty());
    }
}
