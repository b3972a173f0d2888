//! Task planning: agent assignment and dependency-aware staging.
//!
//! The planner turns one task into an [`ExecutionPlan`] (which agent runs
//! it) and a task set into a [`FullExecutionPlan`] (which tasks may run
//! together, and in what order within a stage). Stage extraction is a
//! Kahn-style layering; in-stage ordering favours tasks heading the longest
//! predicted dependency chain.

use crate::agent::{Agent, AgentRole};
use crate::analyzer::ExecutionAnalyzer;
use crate::error::TaskForgeError;
use crate::predictor::ExecutionTimePredictor;
use crate::registry::AgentRegistry;
use crate::task::{Task, TaskId, TaskType};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Minimum analyzer score for adaptive agent selection.
const ADAPTIVE_SCORE_THRESHOLD: f64 = 0.3;

/// Task type to preferred agent role.
static PREFERRED_ROLES: Lazy<HashMap<TaskType, AgentRole>> = Lazy::new(|| {
    HashMap::from([
        (TaskType::Search, AgentRole::Searcher),
        (TaskType::Analysis, AgentRole::Analyzer),
        (TaskType::Generation, AgentRole::Generator),
        (TaskType::Validation, AgentRole::Validator),
        (TaskType::Coordination, AgentRole::Coordinator),
    ])
});

/// Assignment for a single task.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionPlan {
    pub task_id: TaskId,
    pub assigned_agent_id: String,
    pub dependencies: Vec<TaskId>,
    pub estimated_duration_ms: Option<u64>,
}

/// Tasks safe to run concurrently.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionStage {
    pub stage_number: usize,
    pub tasks: Vec<Task>,
}

/// Ordered stages for a task set.
#[derive(Debug, Clone, Serialize)]
pub struct FullExecutionPlan {
    pub stages: Vec<ExecutionStage>,
    pub total_estimated_duration_ms: Option<u64>,
}

/// Result of dependency validation; the input is never mutated.
#[derive(Debug, Clone)]
pub struct DependencyValidation {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Plans agent assignment and execution order.
pub struct TaskPlanner {
    registry: Arc<AgentRegistry>,
    analyzer: Arc<ExecutionAnalyzer>,
    predictor: Arc<ExecutionTimePredictor>,
}

impl TaskPlanner {
    pub fn new(
        registry: Arc<AgentRegistry>,
        analyzer: Arc<ExecutionAnalyzer>,
        predictor: Arc<ExecutionTimePredictor>,
    ) -> Self {
        Self {
            registry,
            analyzer,
            predictor,
        }
    }

    /// Assign an agent to the task.
    ///
    /// Selection cascade: pinned agent id, then historically best-scoring
    /// capable agent, then the role preferred for the task type, then any
    /// capable agent, then a general-purpose agent.
    pub async fn create_plan(&self, task: &Task) -> Result<ExecutionPlan, TaskForgeError> {
        let assigned = match &task.agent_id {
            Some(agent_id) => {
                if !self.registry.contains(agent_id) {
                    return Err(TaskForgeError::AgentNotFound(format!(
                        "pinned agent '{agent_id}' for task '{}'",
                        task.id
                    )));
                }
                agent_id.clone()
            }
            None => self.select_agent(task).await.ok_or_else(|| {
                TaskForgeError::AgentNotFound(format!("no agent can execute task '{}'", task.id))
            })?,
        };

        let prediction = self.predictor.predict(task).await;
        debug!(
            task_id = %task.id,
            agent_id = %assigned,
            estimated_ms = prediction.estimated_ms,
            "task planned"
        );

        Ok(ExecutionPlan {
            task_id: task.id.clone(),
            assigned_agent_id: assigned,
            dependencies: task.dependencies.clone(),
            estimated_duration_ms: Some(prediction.estimated_ms),
        })
    }

    async fn select_agent(&self, task: &Task) -> Option<String> {
        let capable: Vec<Arc<dyn Agent>> = self.registry.agents_with_capability(task.task_type);

        // (a) adaptive: best historical score above the threshold
        let capable_ids: HashSet<&str> = capable.iter().map(|a| a.spec().id.as_str()).collect();
        for recommendation in self.analyzer.recommend_agents().await {
            if recommendation.score > ADAPTIVE_SCORE_THRESHOLD
                && capable_ids.contains(recommendation.agent_id.as_str())
            {
                debug!(
                    agent_id = %recommendation.agent_id,
                    score = recommendation.score,
                    "adaptive agent selection"
                );
                return Some(recommendation.agent_id);
            }
        }

        // (b) preferred role for the task type
        if let Some(role) = PREFERRED_ROLES.get(&task.task_type)
            && let Some(agent) = self
                .registry
                .agents_with_role(*role)
                .into_iter()
                .find(|agent| agent.can_execute(task))
        {
            return Some(agent.spec().id.clone());
        }

        // (c) any capable agent
        if let Some(agent) = capable.first() {
            return Some(agent.spec().id.clone());
        }

        // (d) general-purpose fallback
        self.registry
            .agents_with_role(AgentRole::General)
            .first()
            .map(|agent| agent.spec().id.clone())
    }

    /// Build a staged plan for a task set.
    ///
    /// Stages come from repeated extraction of dependency-satisfied tasks.
    /// When no task is extractable but tasks remain, a cycle is assumed and
    /// the remainder is forced into one final stage; the cycle itself is not
    /// diagnosed further.
    pub async fn create_execution_plan(
        &self,
        tasks: &[Task],
    ) -> Result<FullExecutionPlan, TaskForgeError> {
        if tasks.is_empty() {
            return Ok(FullExecutionPlan {
                stages: Vec::new(),
                total_estimated_duration_ms: Some(0),
            });
        }

        let predicted: HashMap<TaskId, u64> = self
            .predictor
            .predict_many(tasks)
            .await
            .into_iter()
            .map(|(id, prediction)| (id, prediction.estimated_ms))
            .collect();
        let critical = critical_path_scores(tasks, &predicted);

        let mut remaining: Vec<&Task> = tasks.iter().collect();
        let mut done: HashSet<&str> = HashSet::new();
        let mut stages: Vec<ExecutionStage> = Vec::new();

        while !remaining.is_empty() {
            let (ready, blocked): (Vec<&Task>, Vec<&Task>) = remaining
                .into_iter()
                .partition(|task| task.dependencies.iter().all(|dep| done.contains(dep.as_str())));

            if ready.is_empty() {
                // Suspected cycle (or dangling reference): best-effort final stage
                warn!(
                    remaining = blocked.len(),
                    "no dependency-satisfied tasks remain, forcing final stage"
                );
                let mut forced: Vec<Task> = blocked.into_iter().cloned().collect();
                forced.sort_by_key(|task| predicted.get(&task.id).copied().unwrap_or(u64::MAX));
                stages.push(ExecutionStage {
                    stage_number: stages.len(),
                    tasks: forced,
                });
                break;
            }

            let mut stage_tasks: Vec<Task> = ready.iter().map(|t| (*t).clone()).collect();
            stage_tasks.sort_by(|a, b| {
                let cp_a = critical.get(&a.id).copied().unwrap_or(0);
                let cp_b = critical.get(&b.id).copied().unwrap_or(0);
                cp_b.cmp(&cp_a).then_with(|| {
                    let p_a = predicted.get(&a.id).copied().unwrap_or(u64::MAX);
                    let p_b = predicted.get(&b.id).copied().unwrap_or(u64::MAX);
                    p_a.cmp(&p_b)
                })
            });

            for task in &ready {
                done.insert(task.id.as_str());
            }
            stages.push(ExecutionStage {
                stage_number: stages.len(),
                tasks: stage_tasks,
            });
            remaining = blocked;
        }

        let total: u64 = stages
            .iter()
            .map(|stage| {
                stage
                    .tasks
                    .iter()
                    .map(|task| predicted.get(&task.id).copied().unwrap_or(0))
                    .max()
                    .unwrap_or(0)
            })
            .sum();

        debug!(stage_count = stages.len(), total_estimated_ms = total, "execution plan built");

        Ok(FullExecutionPlan {
            stages,
            total_estimated_duration_ms: Some(total),
        })
    }

    /// Check that every dependency id references a task in the same set.
    pub fn validate_dependencies(&self, tasks: &[Task]) -> DependencyValidation {
        let ids: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        let mut errors = Vec::new();

        for task in tasks {
            for dep in &task.dependencies {
                if !ids.contains(dep.as_str()) {
                    errors.push(format!(
                        "task '{}' depends on '{}' which is not in the submitted set",
                        task.id, dep
                    ));
                }
            }
        }

        DependencyValidation {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Longest predicted chain starting at each task (the task plus everything
/// that transitively depends on it). Tasks heading long chains sort first
/// within a stage.
fn critical_path_scores(tasks: &[Task], predicted: &HashMap<TaskId, u64>) -> HashMap<TaskId, u64> {
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();
    for task in tasks {
        for dep in &task.dependencies {
            dependents.entry(dep.as_str()).or_default().push(task.id.as_str());
        }
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        InProgress,
        Done,
    }

    fn visit(
        id: &str,
        dependents: &HashMap<&str, Vec<&str>>,
        predicted: &HashMap<TaskId, u64>,
        marks: &mut HashMap<String, Mark>,
        scores: &mut HashMap<TaskId, u64>,
    ) -> u64 {
        match marks.get(id) {
            Some(Mark::Done) => return scores.get(id).copied().unwrap_or(0),
            // Cycle: cut the edge instead of recursing forever
            Some(Mark::InProgress) => return 0,
            None => {}
        }
        marks.insert(id.to_string(), Mark::InProgress);

        let own = predicted.get(id).copied().unwrap_or(0);
        let downstream = dependents
            .get(id)
            .map(|children| {
                children
                    .iter()
                    .map(|child| visit(child, dependents, predicted, marks, scores))
                    .max()
                    .unwrap_or(0)
            })
            .unwrap_or(0);

        marks.insert(id.to_string(), Mark::Done);
        scores.insert(id.to_string(), own + downstream);
        own + downstream
    }

    let mut marks = HashMap::new();
    let mut scores = HashMap::new();
    for task in tasks {
        visit(&task.id, &dependents, predicted, &mut marks, &mut scores);
    }
    scores
}
