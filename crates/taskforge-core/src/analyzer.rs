//! Execution history analytics.
//!
//! Aggregates per-agent statistics from the execution store and derives a
//! recommendation score the planner uses for adaptive agent selection. Also
//! surfaces recurring failure patterns for operator inspection.

use crate::execution::{ExecutionStatus, TaskExecution};
use crate::store::ExecutionStore;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

const CACHE_TTL: Duration = Duration::from_secs(5 * 60);
const RECENT_WINDOW: usize = 10;
const TIME_NORMALISATION_MS: f64 = 10.0 * 60.0 * 1000.0;

/// Aggregated execution statistics for one agent.
#[derive(Debug, Clone, Serialize)]
pub struct AgentExecutionStats {
    pub agent_id: String,
    pub total_executions: usize,
    pub completed_executions: usize,
    pub failed_executions: usize,
    pub cancelled_executions: usize,
    /// 0-1 over all executions
    pub success_rate: f64,
    pub average_execution_ms: u64,
    pub min_execution_ms: u64,
    pub max_execution_ms: u64,
    pub median_execution_ms: u64,
    /// 0-1 over the most recent executions
    pub recent_success_rate: f64,
    pub recent_average_ms: u64,
}

/// An agent ranked for selection.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRecommendation {
    pub agent_id: String,
    /// 0-1, higher is better
    pub score: f64,
    pub reasons: Vec<String>,
    pub stats: AgentExecutionStats,
}

/// A recurring failure signature.
#[derive(Debug, Clone, Serialize)]
pub struct FailurePattern {
    pub pattern: String,
    pub count: usize,
    pub last_occurred: i64,
}

/// Reads execution history back from the store and scores agents.
pub struct ExecutionAnalyzer {
    store: Arc<dyn ExecutionStore>,
    cache: DashMap<String, (Vec<AgentExecutionStats>, Instant)>,
}

impl ExecutionAnalyzer {
    pub fn new(store: Arc<dyn ExecutionStore>) -> Self {
        Self {
            store,
            cache: DashMap::new(),
        }
    }

    /// Per-agent statistics, optionally restricted to one agent. Store
    /// failures degrade to an empty result.
    pub async fn agent_stats(&self, agent_id: Option<&str>) -> Vec<AgentExecutionStats> {
        let cache_key = format!("stats:{}", agent_id.unwrap_or("all"));
        if let Some(entry) = self.cache.get(&cache_key) {
            let (stats, stored_at) = entry.value();
            if stored_at.elapsed() < CACHE_TTL {
                return stats.clone();
            }
        }

        let executions = match self.store.all_executions().await {
            Ok(executions) => executions,
            Err(error) => {
                warn!(%error, "analyzer store read failed");
                return Vec::new();
            }
        };

        let mut by_agent: HashMap<String, Vec<&TaskExecution>> = HashMap::new();
        for exec in executions
            .iter()
            .filter(|e| agent_id.is_none_or(|id| e.agent_id == id))
        {
            by_agent.entry(exec.agent_id.clone()).or_default().push(exec);
        }

        let stats: Vec<AgentExecutionStats> = by_agent
            .into_iter()
            .map(|(agent_id, executions)| calculate_stats(agent_id, executions))
            .collect();

        self.cache.insert(cache_key, (stats.clone(), Instant::now()));
        stats
    }

    /// All agents with history, ranked by recommendation score (descending).
    pub async fn recommend_agents(&self) -> Vec<AgentRecommendation> {
        let mut recommendations: Vec<AgentRecommendation> = self
            .agent_stats(None)
            .await
            .into_iter()
            .map(|stats| AgentRecommendation {
                agent_id: stats.agent_id.clone(),
                score: recommendation_score(&stats),
                reasons: recommendation_reasons(&stats),
                stats,
            })
            .collect();

        recommendations.sort_by(|a, b| b.score.total_cmp(&a.score));
        recommendations
    }

    /// Top recurring error-message prefixes among failed executions,
    /// optionally restricted to one agent. At most ten patterns, most
    /// frequent first.
    pub async fn failure_patterns(&self, agent_id: Option<&str>) -> Vec<FailurePattern> {
        let executions = match self.store.all_executions().await {
            Ok(executions) => executions,
            Err(error) => {
                warn!(%error, "analyzer store read failed");
                return Vec::new();
            }
        };

        let mut patterns: HashMap<String, (usize, i64)> = HashMap::new();
        for exec in executions.iter().filter(|e| {
            e.status == ExecutionStatus::Failed && agent_id.is_none_or(|id| e.agent_id == id)
        }) {
            let Some(error) = &exec.error else { continue };
            let prefix: String = error.lines().next().unwrap_or("").chars().take(100).collect();
            let occurred = exec.completed_at.unwrap_or(exec.started_at);
            let entry = patterns.entry(prefix).or_insert((0, occurred));
            entry.0 += 1;
            entry.1 = entry.1.max(occurred);
        }

        let mut ranked: Vec<FailurePattern> = patterns
            .into_iter()
            .map(|(pattern, (count, last_occurred))| FailurePattern {
                pattern,
                count,
                last_occurred,
            })
            .collect();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(10);
        ranked
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

fn calculate_stats(agent_id: String, executions: Vec<&TaskExecution>) -> AgentExecutionStats {
    let total = executions.len();
    let completed = count_status(&executions, ExecutionStatus::Completed);
    let failed = count_status(&executions, ExecutionStatus::Failed);
    let cancelled = count_status(&executions, ExecutionStatus::Cancelled);
    let success_rate = if total > 0 {
        completed as f64 / total as f64
    } else {
        0.0
    };

    let mut durations: Vec<u64> = executions
        .iter()
        .filter(|e| e.status == ExecutionStatus::Completed)
        .filter_map(|e| e.duration_ms())
        .filter(|&ms| ms > 0)
        .map(|ms| ms as u64)
        .collect();
    durations.sort_unstable();

    let (average_ms, min_ms, max_ms, median_ms) = if durations.is_empty() {
        (0, 0, 0, 0)
    } else {
        let n = durations.len();
        let average = durations.iter().sum::<u64>() / n as u64;
        let median = if n % 2 == 0 {
            (durations[n / 2 - 1] + durations[n / 2]) / 2
        } else {
            durations[n / 2]
        };
        (average, durations[0], durations[n - 1], median)
    };

    // Recency window: most recently started executions
    let mut by_recency = executions;
    by_recency.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    by_recency.truncate(RECENT_WINDOW);

    let recent_total = by_recency.len();
    let recent_completed = count_status(&by_recency, ExecutionStatus::Completed);
    let recent_success_rate = if recent_total > 0 {
        recent_completed as f64 / recent_total as f64
    } else {
        0.0
    };
    let recent_durations: Vec<u64> = by_recency
        .iter()
        .filter(|e| e.status == ExecutionStatus::Completed)
        .filter_map(|e| e.duration_ms())
        .filter(|&ms| ms > 0)
        .map(|ms| ms as u64)
        .collect();
    let recent_average_ms = if recent_durations.is_empty() {
        0
    } else {
        recent_durations.iter().sum::<u64>() / recent_durations.len() as u64
    };

    AgentExecutionStats {
        agent_id,
        total_executions: total,
        completed_executions: completed,
        failed_executions: failed,
        cancelled_executions: cancelled,
        success_rate,
        average_execution_ms: average_ms,
        min_execution_ms: min_ms,
        max_execution_ms: max_ms,
        median_execution_ms: median_ms,
        recent_success_rate,
        recent_average_ms,
    }
}

fn count_status(executions: &[&TaskExecution], status: ExecutionStatus) -> usize {
    executions.iter().filter(|e| e.status == status).count()
}

/// Weighted blend: overall success 40%, recent success 30%, speed 20%,
/// track-record volume 10%.
fn recommendation_score(stats: &AgentExecutionStats) -> f64 {
    let success_score = stats.success_rate * 0.4;
    let recent_score = stats.recent_success_rate * 0.3;
    let time_score = if stats.average_execution_ms > 0 {
        (1.0 - stats.average_execution_ms as f64 / TIME_NORMALISATION_MS).max(0.0) * 0.2
    } else {
        0.1
    };
    let volume_score = (stats.total_executions as f64 / 100.0).min(1.0) * 0.1;
    success_score + recent_score + time_score + volume_score
}

fn recommendation_reasons(stats: &AgentExecutionStats) -> Vec<String> {
    let mut reasons = Vec::new();

    if stats.success_rate >= 0.9 {
        reasons.push(format!("high success rate: {:.1}%", stats.success_rate * 100.0));
    } else if stats.success_rate >= 0.7 {
        reasons.push(format!("good success rate: {:.1}%", stats.success_rate * 100.0));
    }

    if stats.recent_success_rate >= 0.9 {
        reasons.push(format!(
            "strong recent record: {:.1}%",
            stats.recent_success_rate * 100.0
        ));
    }

    if stats.average_execution_ms > 0 && stats.average_execution_ms < 30_000 {
        reasons.push(format!(
            "fast execution: {:.1}s average",
            stats.average_execution_ms as f64 / 1000.0
        ));
    }

    if stats.total_executions >= 50 {
        reasons.push(format!("extensive history: {} executions", stats.total_executions));
    }

    if reasons.is_empty() {
        reasons.push("limited execution history".to_string());
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryExecutionStore;

    async fn seed(
        store: &InMemoryExecutionStore,
        id: &str,
        agent_id: &str,
        status: ExecutionStatus,
        duration_ms: i64,
        error: Option<&str>,
    ) {
        let mut exec = TaskExecution::new(id, "task-1", agent_id);
        exec.status = status;
        exec.completed_at = Some(exec.started_at + duration_ms);
        exec.error = error.map(String::from);
        store.save_execution(&exec).await.unwrap();
    }

    #[tokio::test]
    async fn test_stats_aggregation() {
        let store = Arc::new(InMemoryExecutionStore::new());
        seed(&store, "e1", "a1", ExecutionStatus::Completed, 100, None).await;
        seed(&store, "e2", "a1", ExecutionStatus::Completed, 300, None).await;
        seed(&store, "e3", "a1", ExecutionStatus::Failed, 50, Some("boom")).await;
        seed(&store, "e4", "a1", ExecutionStatus::Cancelled, 10, None).await;

        let analyzer = ExecutionAnalyzer::new(store);
        let stats = analyzer.agent_stats(Some("a1")).await;
        assert_eq!(stats.len(), 1);

        let s = &stats[0];
        assert_eq!(s.total_executions, 4);
        assert_eq!(s.completed_executions, 2);
        assert_eq!(s.failed_executions, 1);
        assert_eq!(s.cancelled_executions, 1);
        assert!((s.success_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(s.median_execution_ms, 200);
        assert_eq!(s.average_execution_ms, 200);
        assert_eq!(s.min_execution_ms, 100);
        assert_eq!(s.max_execution_ms, 300);
    }

    #[tokio::test]
    async fn test_recommendation_prefers_higher_success() {
        let store = Arc::new(InMemoryExecutionStore::new());
        for i in 0..10 {
            seed(&store, &format!("g{i}"), "good", ExecutionStatus::Completed, 100, None).await;
        }
        for i in 0..10 {
            let status = if i < 3 {
                ExecutionStatus::Completed
            } else {
                ExecutionStatus::Failed
            };
            seed(&store, &format!("b{i}"), "bad", status, 100, Some("err")).await;
        }

        let analyzer = ExecutionAnalyzer::new(store);
        let recommendations = analyzer.recommend_agents().await;
        assert_eq!(recommendations[0].agent_id, "good");
        assert!(recommendations[0].score > recommendations[1].score);
    }

    #[tokio::test]
    async fn test_failure_patterns_ranked_by_count() {
        let store = Arc::new(InMemoryExecutionStore::new());
        for i in 0..3 {
            seed(
                &store,
                &format!("f{i}"),
                "a1",
                ExecutionStatus::Failed,
                10,
                Some("connection refused\nstack trace"),
            )
            .await;
        }
        seed(&store, "f9", "a1", ExecutionStatus::Failed, 10, Some("invalid input")).await;

        let analyzer = ExecutionAnalyzer::new(store);
        let patterns = analyzer.failure_patterns(None).await;
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].pattern, "connection refused");
        assert_eq!(patterns[0].count, 3);
    }

    #[tokio::test]
    async fn test_no_history_scores_empty() {
        let store = Arc::new(InMemoryExecutionStore::new());
        let analyzer = ExecutionAnalyzer::new(store);
        assert!(analyzer.recommend_agents().await.is_empty());
    }
}
