//! Execution time prediction from historical records.
//!
//! Estimates come from the median duration of completed executions matching
//! the same agent or the same task; the median keeps one slow outlier from
//! skewing scheduling decisions. With no history the task's declared timeout
//! (or the 60 s default) is used at low confidence.

use crate::execution::ExecutionStatus;
use crate::store::ExecutionStore;
use crate::task::Task;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

const CACHE_TTL: Duration = Duration::from_secs(5 * 60);
const DEFAULT_ESTIMATE_MS: u64 = 60_000;

/// Outcome of a prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionTimePrediction {
    /// Predicted duration in milliseconds
    pub estimated_ms: u64,
    /// 0-1, log-scaled with sample count
    pub confidence: f64,
    pub sample_count: usize,
    pub min_ms: u64,
    pub max_ms: u64,
    pub average_ms: u64,
}

/// Derives duration estimates from the execution store.
pub struct ExecutionTimePredictor {
    store: Arc<dyn ExecutionStore>,
    cache: DashMap<String, (ExecutionTimePrediction, Instant)>,
}

impl ExecutionTimePredictor {
    pub fn new(store: Arc<dyn ExecutionStore>) -> Self {
        Self {
            store,
            cache: DashMap::new(),
        }
    }

    /// Predict how long the task will run. Store failures degrade to the
    /// default estimate rather than surfacing.
    pub async fn predict(&self, task: &Task) -> ExecutionTimePrediction {
        let key = cache_key(task);
        if let Some(entry) = self.cache.get(&key) {
            let (prediction, stored_at) = entry.value();
            if stored_at.elapsed() < CACHE_TTL {
                return prediction.clone();
            }
        }

        let prediction = self.calculate(task).await;
        self.cache.insert(key, (prediction.clone(), Instant::now()));
        prediction
    }

    /// Predict a batch, returning (task id, prediction) pairs.
    pub async fn predict_many(&self, tasks: &[Task]) -> Vec<(String, ExecutionTimePrediction)> {
        let mut predictions = Vec::with_capacity(tasks.len());
        for task in tasks {
            predictions.push((task.id.clone(), self.predict(task).await));
        }
        predictions
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    async fn calculate(&self, task: &Task) -> ExecutionTimePrediction {
        let executions = match self.store.all_executions().await {
            Ok(executions) => executions,
            Err(error) => {
                warn!(task_id = %task.id, %error, "prediction store read failed, using default");
                return default_prediction(task);
            }
        };

        let mut durations: Vec<u64> = executions
            .iter()
            .filter(|exec| exec.status == ExecutionStatus::Completed)
            .filter(|exec| {
                let same_agent = task
                    .agent_id
                    .as_deref()
                    .is_some_and(|agent_id| exec.agent_id == agent_id);
                same_agent || exec.task_id == task.id
            })
            .filter_map(|exec| exec.duration_ms())
            .filter(|&ms| ms > 0)
            .map(|ms| ms as u64)
            .collect();

        if durations.is_empty() {
            return default_prediction(task);
        }

        durations.sort_unstable();
        let sample_count = durations.len();
        let min_ms = durations[0];
        let max_ms = durations[sample_count - 1];
        let average_ms = durations.iter().sum::<u64>() / sample_count as u64;
        let median_ms = if sample_count % 2 == 0 {
            (durations[sample_count / 2 - 1] + durations[sample_count / 2]) / 2
        } else {
            durations[sample_count / 2]
        };
        let confidence = (((sample_count + 1) as f64).ln() / 10f64.ln()).min(1.0);

        ExecutionTimePrediction {
            estimated_ms: median_ms,
            confidence,
            sample_count,
            min_ms,
            max_ms,
            average_ms,
        }
    }
}

fn cache_key(task: &Task) -> String {
    format!(
        "prediction:{}:{}:{}",
        task.id,
        task.agent_id.as_deref().unwrap_or("auto"),
        task.task_type.as_str()
    )
}

fn default_prediction(task: &Task) -> ExecutionTimePrediction {
    let estimate = task.timeout_ms.unwrap_or(DEFAULT_ESTIMATE_MS);
    ExecutionTimePrediction {
        estimated_ms: estimate,
        confidence: 0.1,
        sample_count: 0,
        min_ms: estimate / 2,
        max_ms: estimate * 2,
        average_ms: estimate,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::TaskExecution;
    use crate::store::InMemoryExecutionStore;
    use crate::task::TaskType;

    async fn seed(store: &InMemoryExecutionStore, id: &str, task_id: &str, agent_id: &str, ms: i64) {
        let mut exec = TaskExecution::new(id, task_id, agent_id);
        exec.status = ExecutionStatus::Completed;
        exec.completed_at = Some(exec.started_at + ms);
        store.save_execution(&exec).await.unwrap();
    }

    #[tokio::test]
    async fn test_default_prediction_without_history() {
        let store = Arc::new(InMemoryExecutionStore::new());
        let predictor = ExecutionTimePredictor::new(store);
        let task = Task::new("t1", "t", TaskType::Search).with_timeout_ms(10_000);

        let prediction = predictor.predict(&task).await;
        assert_eq!(prediction.estimated_ms, 10_000);
        assert_eq!(prediction.sample_count, 0);
        assert!(prediction.confidence < 0.2);
        assert_eq!(prediction.min_ms, 5_000);
        assert_eq!(prediction.max_ms, 20_000);
    }

    #[tokio::test]
    async fn test_median_over_task_history() {
        let store = Arc::new(InMemoryExecutionStore::new());
        seed(&store, "e1", "t1", "a1", 100).await;
        seed(&store, "e2", "t1", "a1", 200).await;
        seed(&store, "e3", "t1", "a1", 900).await;

        let predictor = ExecutionTimePredictor::new(store);
        let task = Task::new("t1", "t", TaskType::Search);

        let prediction = predictor.predict(&task).await;
        assert_eq!(prediction.estimated_ms, 200);
        assert_eq!(prediction.sample_count, 3);
        assert_eq!(prediction.min_ms, 100);
        assert_eq!(prediction.max_ms, 900);
        assert_eq!(prediction.average_ms, 400);
    }

    #[tokio::test]
    async fn test_agent_history_matches_when_pinned() {
        let store = Arc::new(InMemoryExecutionStore::new());
        seed(&store, "e1", "other-task", "a1", 300).await;
        seed(&store, "e2", "other-task", "a1", 500).await;

        let predictor = ExecutionTimePredictor::new(store);
        let task = Task::new("t-new", "t", TaskType::Search).with_agent("a1");

        let prediction = predictor.predict(&task).await;
        assert_eq!(prediction.sample_count, 2);
        assert_eq!(prediction.estimated_ms, 400);
    }

    #[tokio::test]
    async fn test_confidence_grows_with_samples() {
        let store = Arc::new(InMemoryExecutionStore::new());
        seed(&store, "e1", "t1", "a1", 100).await;
        let predictor = ExecutionTimePredictor::new(store.clone());

        let task = Task::new("t1", "t", TaskType::Search);
        let small = predictor.predict(&task).await;

        for i in 0..20 {
            seed(&store, &format!("x{i}"), "t1", "a1", 100).await;
        }
        predictor.clear_cache();
        let large = predictor.predict(&task).await;
        assert!(large.confidence > small.confidence);
        assert!(large.confidence <= 1.0);
    }

    #[tokio::test]
    async fn test_cache_serves_stale_reads_within_ttl() {
        let store = Arc::new(InMemoryExecutionStore::new());
        seed(&store, "e1", "t1", "a1", 100).await;
        let predictor = ExecutionTimePredictor::new(store.clone());

        let task = Task::new("t1", "t", TaskType::Search);
        let first = predictor.predict(&task).await;

        // New history is invisible until the cache entry expires or is cleared
        seed(&store, "e2", "t1", "a1", 9_000).await;
        let second = predictor.predict(&task).await;
        assert_eq!(first, second);

        predictor.clear_cache();
        let third = predictor.predict(&task).await;
        assert_ne!(first.estimated_ms, third.estimated_ms);
    }
}
