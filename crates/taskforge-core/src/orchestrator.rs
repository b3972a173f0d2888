//! The scheduler: admission control, queueing, timeout/cancellation and
//! retry orchestration.
//!
//! Every submission becomes a [`TaskExecution`] walking
//! Pending -> Running -> {Completed | Failed | Cancelled}. Admission is
//! gated first by the optional global concurrency cap, then by the assigned
//! agent's own cap; callers that miss a slot suspend on a wait-queue and are
//! granted the slot by whichever execution releases it. Queue order is
//! decided at dispatch time by the configured strategy, so a higher-priority
//! task can overtake one queued earlier.

use crate::a2a::A2aManager;
use crate::agent::{Agent, RetryPolicy, TaskContext};
use crate::analyzer::ExecutionAnalyzer;
use crate::error::{ErrorClassifier, ErrorKind, TaskForgeError, classify_message};
use crate::execution::{ExecutionId, ExecutionStatus, LogLevel, TaskExecution};
use crate::metrics;
use crate::planner::TaskPlanner;
use crate::predictor::ExecutionTimePredictor;
use crate::registry::AgentRegistry;
use crate::store::ExecutionStore;
use crate::task::{Task, TaskId};
use dashmap::DashMap;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

const DEFAULT_AGENT_CONCURRENCY: usize = 10;

/// Policy for ordering queued-but-not-yet-dispatched tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStrategy {
    /// Queue order preserved (default)
    Fifo,
    /// Descending task priority
    Priority,
    /// Ascending predicted duration
    ShortestJobFirst,
    /// Placeholder for a future fairness policy; currently dispatches FIFO
    RoundRobin,
}

impl Default for QueueStrategy {
    fn default() -> Self {
        QueueStrategy::Fifo
    }
}

/// Orchestrator behaviour settings.
///
/// The per-execution deadline is not configured here: it comes from the task
/// or, failing that, the assigned agent's `default_timeout_ms`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrchestratorConfig {
    /// Cap on globally Running executions; None disables the global gate
    pub global_max_concurrent_tasks: Option<usize>,
    #[serde(default)]
    pub queue_strategy: QueueStrategy,
    /// Whether the resource monitor may adjust the global cap
    #[serde(default)]
    pub enable_dynamic_adjustment: bool,
}

/// Snapshot of scheduler load.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorStatus {
    /// Executions currently Running
    pub running: usize,
    /// Submissions waiting for a slot
    pub queued: usize,
    /// Execution records still in Pending status
    pub pending: usize,
    pub per_agent: HashMap<String, AgentLoad>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AgentLoad {
    pub running: usize,
    pub queued: usize,
}

/// A queued submission, as reported by introspection.
#[derive(Debug, Clone, Serialize)]
pub struct QueuedTaskInfo {
    pub execution_id: ExecutionId,
    pub task_id: TaskId,
    pub agent_id: String,
    pub enqueued_at: i64,
    /// True when held in the shared global queue rather than an agent queue
    pub global: bool,
}

enum Dispatch {
    Run,
    Cancelled,
}

struct Waiter {
    execution_id: ExecutionId,
    task: Task,
    agent_id: String,
    enqueued_at: i64,
    grant: oneshot::Sender<Dispatch>,
}

#[derive(Default)]
struct SchedulerState {
    global_running: usize,
    agent_running: HashMap<String, usize>,
    global_queue: VecDeque<Waiter>,
    agent_queues: HashMap<String, VecDeque<Waiter>>,
}

impl SchedulerState {
    fn queued_count(&self) -> usize {
        self.global_queue.len() + self.agent_queues.values().map(VecDeque::len).sum::<usize>()
    }
}

enum AttemptOutcome {
    Completed(serde_json::Value),
    Failed(String),
    Cancelled,
}

/// The orchestration engine.
pub struct AgentOrchestrator {
    registry: Arc<AgentRegistry>,
    planner: TaskPlanner,
    store: Arc<dyn ExecutionStore>,
    predictor: Arc<ExecutionTimePredictor>,
    a2a: Arc<A2aManager>,
    executions: DashMap<ExecutionId, TaskExecution>,
    cancellations: DashMap<ExecutionId, oneshot::Sender<()>>,
    scheduler: Mutex<SchedulerState>,
    config: RwLock<OrchestratorConfig>,
    classifier: Arc<ErrorClassifier>,
}

impl AgentOrchestrator {
    pub fn new(
        registry: Arc<AgentRegistry>,
        store: Arc<dyn ExecutionStore>,
        predictor: Arc<ExecutionTimePredictor>,
        analyzer: Arc<ExecutionAnalyzer>,
        a2a: Arc<A2aManager>,
        config: OrchestratorConfig,
    ) -> Self {
        let planner = TaskPlanner::new(registry.clone(), analyzer, predictor.clone());
        Self {
            registry,
            planner,
            store,
            predictor,
            a2a,
            executions: DashMap::new(),
            cancellations: DashMap::new(),
            scheduler: Mutex::new(SchedulerState::default()),
            config: RwLock::new(config),
            classifier: Arc::new(classify_message),
        }
    }

    /// Swap the error classifier (typed error wrapping, host heuristics, ...).
    pub fn with_classifier(
        mut self,
        classifier: impl Fn(&str) -> ErrorKind + Send + Sync + 'static,
    ) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn planner(&self) -> &TaskPlanner {
        &self.planner
    }

    /// Submit one task and drive it to a terminal execution record.
    ///
    /// Suspends while waiting for a concurrency slot. Task-level failures
    /// come back as a Failed record; only submission-time problems (no
    /// agent, store unavailable) surface as errors.
    #[instrument(skip(self, task), fields(task_id = %task.id))]
    pub async fn execute_task(&self, task: Task) -> Result<TaskExecution, TaskForgeError> {
        let plan = self.planner.create_plan(&task).await?;
        let execution_id = format!("exec-{}", Uuid::new_v4());
        let mut execution =
            TaskExecution::new(&execution_id, &task.id, &plan.assigned_agent_id);
        self.store
            .save_execution(&execution)
            .await
            .map_err(TaskForgeError::Other)?;
        self.executions.insert(execution_id.clone(), execution.clone());

        let agent = self
            .registry
            .get(&plan.assigned_agent_id)
            .ok_or_else(|| TaskForgeError::AgentNotFound(plan.assigned_agent_id.clone()))?;

        if !agent.can_execute(&task) {
            execution.mark_failed(format!(
                "agent '{}' cannot execute task type {}",
                plan.assigned_agent_id,
                task.task_type.as_str()
            ));
            self.finish(&mut execution).await;
            return Ok(execution);
        }

        // Admission: global gate first, then the agent's own cap
        if let Some(grant) = self.admit(&agent, &task, &execution_id).await {
            execution.log(LogLevel::Info, "queued awaiting concurrency slot", None);
            self.executions.insert(execution_id.clone(), execution.clone());
            match grant.await {
                Ok(Dispatch::Run) => {}
                Ok(Dispatch::Cancelled) | Err(_) => {
                    execution.mark_cancelled("cancelled while queued");
                    self.finish(&mut execution).await;
                    return Ok(execution);
                }
            }
        }

        execution.status = ExecutionStatus::Running;
        execution.started_at = crate::now_ms();
        execution.log(LogLevel::Info, "execution started", None);
        self.sync(&execution);
        self.persist_quiet(&execution).await;

        match self.run_attempt(&agent, &task, &execution_id).await {
            AttemptOutcome::Completed(result) => {
                execution.mark_completed(result);
                execution.log(LogLevel::Info, "task completed", None);
            }
            AttemptOutcome::Cancelled => {
                execution.mark_cancelled("cancelled by caller");
            }
            AttemptOutcome::Failed(reason) => {
                let kind = (self.classifier)(&reason);
                execution.log(
                    LogLevel::Error,
                    format!("task execution failed: {reason}"),
                    Some(serde_json::json!({ "kind": kind.as_str() })),
                );
                execution.mark_failed(reason);
                self.sync(&execution);
                self.persist_quiet(&execution).await;

                let retries = task.retry_count.unwrap_or(0);
                if kind.is_retryable() && retries > 0 {
                    self.retry_loop(&agent, &task, &mut execution, retries).await;
                }
            }
        }

        self.finish(&mut execution).await;
        self.release_and_dispatch(&plan.assigned_agent_id).await;
        Ok(execution)
    }

    /// Submit a dependency-validated batch, stage by stage.
    ///
    /// All tasks within a stage run concurrently and the whole stage is
    /// awaited before the next one starts. A failure inside a stage is
    /// logged but later stages still run.
    pub async fn execute_tasks(
        &self,
        tasks: Vec<Task>,
    ) -> Result<Vec<TaskExecution>, TaskForgeError> {
        let validation = self.planner.validate_dependencies(&tasks);
        if !validation.valid {
            return Err(TaskForgeError::InvalidDependencies(
                validation.errors.join(", "),
            ));
        }

        let plan = self.planner.create_execution_plan(&tasks).await?;
        let mut results = Vec::with_capacity(tasks.len());

        for stage in plan.stages {
            info!(
                stage = stage.stage_number,
                task_count = stage.tasks.len(),
                "executing stage"
            );

            let stage_results = join_all(
                stage
                    .tasks
                    .iter()
                    .map(|task| self.execute_task(task.clone())),
            )
            .await;

            let mut failed = 0usize;
            for result in stage_results {
                let execution = result?;
                if execution.status == ExecutionStatus::Failed {
                    failed += 1;
                }
                results.push(execution);
            }
            if failed > 0 {
                warn!(
                    stage = stage.stage_number,
                    failed, "stage finished with failures, continuing"
                );
            }
        }

        Ok(results)
    }

    /// Cancel a Pending or Running execution. Terminal executions are left
    /// untouched; cancelling twice is a no-op on the second call.
    pub async fn cancel_execution(&self, execution_id: &str) -> Result<(), TaskForgeError> {
        if let Some((_, cancel)) = self.cancellations.remove(execution_id) {
            info!(execution_id = %execution_id, "cancelling running execution");
            let _ = cancel.send(());
            return Ok(());
        }

        let waiter = {
            let mut state = self.scheduler.lock().await;
            remove_waiter(&mut state, execution_id)
        };
        if let Some(waiter) = waiter {
            info!(execution_id = %execution_id, "cancelling queued execution");
            let _ = waiter.grant.send(Dispatch::Cancelled);
            return Ok(());
        }

        if self.executions.contains_key(execution_id) {
            Ok(())
        } else {
            Err(TaskForgeError::UnknownExecution(execution_id.to_string()))
        }
    }

    pub fn get_execution(&self, execution_id: &str) -> Option<TaskExecution> {
        self.executions.get(execution_id).map(|entry| entry.value().clone())
    }

    pub fn get_all_executions(&self) -> Vec<TaskExecution> {
        self.executions.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn get_executions_by_task_id(&self, task_id: &str) -> Vec<TaskExecution> {
        self.executions
            .iter()
            .filter(|entry| entry.value().task_id == task_id)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Running/queued/pending counts and per-agent load.
    pub async fn status(&self) -> OrchestratorStatus {
        let state = self.scheduler.lock().await;
        let mut per_agent: HashMap<String, AgentLoad> = HashMap::new();
        for (agent_id, running) in &state.agent_running {
            per_agent.entry(agent_id.clone()).or_default().running = *running;
        }
        for (agent_id, queue) in &state.agent_queues {
            per_agent.entry(agent_id.clone()).or_default().queued = queue.len();
        }
        for waiter in &state.global_queue {
            per_agent.entry(waiter.agent_id.clone()).or_default().queued += 1;
        }

        let pending = self
            .executions
            .iter()
            .filter(|entry| entry.value().status == ExecutionStatus::Pending)
            .count();

        OrchestratorStatus {
            running: state.global_running,
            queued: state.queued_count(),
            pending,
            per_agent,
        }
    }

    /// Contents of the global and per-agent queues.
    pub async fn queued_tasks(&self) -> Vec<QueuedTaskInfo> {
        let state = self.scheduler.lock().await;
        let mut queued = Vec::with_capacity(state.queued_count());
        for waiter in &state.global_queue {
            queued.push(waiter_info(waiter, true));
        }
        for queue in state.agent_queues.values() {
            for waiter in queue {
                queued.push(waiter_info(waiter, false));
            }
        }
        queued
    }

    /// Cancel one queued (not yet running) submission. Returns whether a
    /// queued entry was found.
    pub async fn remove_from_queue(&self, execution_id: &str) -> bool {
        let waiter = {
            let mut state = self.scheduler.lock().await;
            remove_waiter(&mut state, execution_id)
        };
        match waiter {
            Some(waiter) => {
                let _ = waiter.grant.send(Dispatch::Cancelled);
                true
            }
            None => false,
        }
    }

    /// Cancel all queued submissions; their pending futures resolve as
    /// Cancelled.
    pub async fn clear_queue(&self) -> usize {
        let waiters: Vec<Waiter> = {
            let mut state = self.scheduler.lock().await;
            let mut drained: Vec<Waiter> = state.global_queue.drain(..).collect();
            for (_, mut queue) in state.agent_queues.drain() {
                drained.extend(queue.drain(..));
            }
            drained
        };
        let cleared = waiters.len();
        for waiter in waiters {
            let _ = waiter.grant.send(Dispatch::Cancelled);
        }
        cleared
    }

    pub fn current_config(&self) -> OrchestratorConfig {
        self.config.read().expect("config lock poisoned").clone()
    }

    /// Replace the runtime configuration and re-dispatch in case the global
    /// cap grew.
    pub async fn update_config(&self, config: OrchestratorConfig) {
        {
            let mut current = self.config.write().expect("config lock poisoned");
            *current = config;
        }
        let mut state = self.scheduler.lock().await;
        self.dispatch_locked(&mut state).await;
    }

    /// Adjust only the global concurrency cap (resource monitor path).
    pub async fn set_global_concurrency(&self, cap: usize) {
        let mut config = self.current_config();
        if config.global_max_concurrent_tasks == Some(cap) {
            return;
        }
        debug!(cap, "global concurrency cap adjusted");
        config.global_max_concurrent_tasks = Some(cap);
        self.update_config(config).await;
    }

    // ---- internals ----

    async fn admit(
        &self,
        agent: &Arc<dyn Agent>,
        task: &Task,
        execution_id: &str,
    ) -> Option<oneshot::Receiver<Dispatch>> {
        let agent_id = agent.spec().id.clone();
        let agent_cap = agent.spec().config.max_concurrent_tasks;
        let global_cap = self.current_config().global_max_concurrent_tasks;

        let mut state = self.scheduler.lock().await;
        let agent_running = state.agent_running.get(&agent_id).copied().unwrap_or(0);

        if global_cap.is_some_and(|cap| state.global_running >= cap) {
            debug!(execution_id = %execution_id, "global cap reached, queueing");
            let (grant, rx) = oneshot::channel();
            state.global_queue.push_back(Waiter {
                execution_id: execution_id.to_string(),
                task: task.clone(),
                agent_id,
                enqueued_at: crate::now_ms(),
                grant,
            });
            return Some(rx);
        }

        if agent_running >= agent_cap {
            debug!(execution_id = %execution_id, agent_id = %agent_id, "agent cap reached, queueing");
            let (grant, rx) = oneshot::channel();
            state
                .agent_queues
                .entry(agent_id.clone())
                .or_default()
                .push_back(Waiter {
                    execution_id: execution_id.to_string(),
                    task: task.clone(),
                    agent_id,
                    enqueued_at: crate::now_ms(),
                    grant,
                });
            return Some(rx);
        }

        state.global_running += 1;
        *state.agent_running.entry(agent_id).or_insert(0) += 1;
        None
    }

    /// One attempt: the agent call raced against the deadline and the
    /// cancellation channel.
    async fn run_attempt(
        &self,
        agent: &Arc<dyn Agent>,
        task: &Task,
        execution_id: &str,
    ) -> AttemptOutcome {
        let timeout_ms = task
            .timeout_ms
            .unwrap_or(agent.spec().config.default_timeout_ms);

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        self.cancellations.insert(execution_id.to_string(), cancel_tx);
        let context = TaskContext::new(execution_id, self.a2a.clone());

        let outcome = tokio::select! {
            result = agent.execute_task(task, &context) => match result {
                Ok(value) => AttemptOutcome::Completed(value),
                Err(error) => AttemptOutcome::Failed(error.reason),
            },
            _ = tokio::time::sleep(Duration::from_millis(timeout_ms)) => {
                AttemptOutcome::Failed(format!("timed out after {timeout_ms}ms"))
            }
            _ = cancel_rx => AttemptOutcome::Cancelled,
        };

        self.cancellations.remove(execution_id);
        outcome
    }

    /// Backoff-retry loop run synchronously after a retryable failure; the
    /// concurrency slot stays held throughout.
    async fn retry_loop(
        &self,
        agent: &Arc<dyn Agent>,
        task: &Task,
        execution: &mut TaskExecution,
        max_retries: u32,
    ) {
        let policy = RetryPolicy {
            max_retries,
            ..agent.spec().config.retry_policy.clone()
        };
        let mut exhausted = true;

        for attempt in 0..policy.max_retries {
            tokio::time::sleep(policy.delay_for_attempt(attempt)).await;

            info!(
                execution_id = %execution.id,
                attempt = attempt + 1,
                max_retries = policy.max_retries,
                "retrying task"
            );
            execution.log(
                LogLevel::Info,
                format!("retry attempt {}/{}", attempt + 1, policy.max_retries),
                None,
            );
            execution.status = ExecutionStatus::Running;
            self.sync(execution);
            metrics::record_retry();

            match self.run_attempt(agent, task, &execution.id).await {
                AttemptOutcome::Completed(result) => {
                    execution.mark_completed(result);
                    execution.log(
                        LogLevel::Info,
                        format!("retry succeeded on attempt {}", attempt + 1),
                        None,
                    );
                    exhausted = false;
                    break;
                }
                AttemptOutcome::Cancelled => {
                    execution.mark_cancelled("cancelled by caller");
                    exhausted = false;
                    break;
                }
                AttemptOutcome::Failed(reason) => {
                    let kind = (self.classifier)(&reason);
                    execution.log(
                        LogLevel::Error,
                        format!("retry attempt {} failed: {reason}", attempt + 1),
                        Some(serde_json::json!({ "kind": kind.as_str() })),
                    );
                    execution.mark_failed(reason);
                    if !kind.is_retryable() {
                        exhausted = false;
                        break;
                    }
                }
            }
        }

        if exhausted && execution.status == ExecutionStatus::Failed {
            execution.mark_failed(format!(
                "retry limit reached ({} attempts)",
                policy.max_retries
            ));
        }
    }

    /// Final bookkeeping for a terminal record.
    async fn finish(&self, execution: &mut TaskExecution) {
        self.sync(execution);
        self.persist_quiet(execution).await;
        if let Some(duration) = execution.duration_ms() {
            metrics::record_execution(status_label(execution.status), duration.max(0) as u64);
        }
    }

    async fn release_and_dispatch(&self, agent_id: &str) {
        let mut state = self.scheduler.lock().await;
        state.global_running = state.global_running.saturating_sub(1);
        if let Some(running) = state.agent_running.get_mut(agent_id) {
            *running = running.saturating_sub(1);
            if *running == 0 {
                state.agent_running.remove(agent_id);
            }
        }
        self.dispatch_locked(&mut state).await;
    }

    /// Grant slots to queued waiters while capacity lasts. Queue order is
    /// recomputed here, at dispatch time, per the configured strategy.
    async fn dispatch_locked(&self, state: &mut SchedulerState) {
        let config = self.current_config();

        loop {
            let global_free = config
                .global_max_concurrent_tasks
                .map_or(usize::MAX, |cap| cap.saturating_sub(state.global_running));
            if global_free == 0 {
                break;
            }

            let mut granted = false;

            // Agent queues first
            let agent_ids: Vec<String> = state.agent_queues.keys().cloned().collect();
            for agent_id in agent_ids {
                let cap = self.agent_cap(&agent_id);
                let running = state.agent_running.get(&agent_id).copied().unwrap_or(0);
                if running >= cap {
                    continue;
                }
                let Some(queue) = state.agent_queues.get_mut(&agent_id) else {
                    continue;
                };
                self.reorder(queue, config.queue_strategy).await;
                if let Some(waiter) = queue.pop_front() {
                    if queue.is_empty() {
                        state.agent_queues.remove(&agent_id);
                    }
                    if self.grant(state, waiter) {
                        granted = true;
                        break;
                    }
                }
            }
            if granted {
                continue;
            }

            // Then the global queue: each waiter re-checked against its own
            // agent's cap, since queued tasks map to different agents
            self.reorder(&mut state.global_queue, config.queue_strategy).await;
            let position = state.global_queue.iter().position(|waiter| {
                let cap = self.agent_cap(&waiter.agent_id);
                let running = state.agent_running.get(&waiter.agent_id).copied().unwrap_or(0);
                running < cap
            });
            match position {
                Some(index) => {
                    if let Some(waiter) = state.global_queue.remove(index)
                        && self.grant(state, waiter)
                    {
                        continue;
                    }
                }
                None => break,
            }
        }
    }

    /// Reserve the slot and hand it to the waiter. A waiter whose submission
    /// future was dropped gives the slot back.
    fn grant(&self, state: &mut SchedulerState, waiter: Waiter) -> bool {
        state.global_running += 1;
        *state.agent_running.entry(waiter.agent_id.clone()).or_insert(0) += 1;
        let agent_id = waiter.agent_id.clone();
        if waiter.grant.send(Dispatch::Run).is_err() {
            state.global_running = state.global_running.saturating_sub(1);
            if let Some(running) = state.agent_running.get_mut(&agent_id) {
                *running = running.saturating_sub(1);
            }
            return false;
        }
        true
    }

    async fn reorder(&self, queue: &mut VecDeque<Waiter>, strategy: QueueStrategy) {
        match strategy {
            QueueStrategy::Fifo | QueueStrategy::RoundRobin => {}
            QueueStrategy::Priority => {
                queue
                    .make_contiguous()
                    .sort_by(|a, b| b.task.priority.cmp(&a.task.priority));
            }
            QueueStrategy::ShortestJobFirst => {
                let mut estimates: HashMap<ExecutionId, u64> = HashMap::new();
                for waiter in queue.iter() {
                    let prediction = self.predictor.predict(&waiter.task).await;
                    estimates.insert(waiter.execution_id.clone(), prediction.estimated_ms);
                }
                queue.make_contiguous().sort_by_key(|waiter| {
                    estimates.get(&waiter.execution_id).copied().unwrap_or(u64::MAX)
                });
            }
        }
    }

    fn agent_cap(&self, agent_id: &str) -> usize {
        self.registry
            .get(agent_id)
            .map(|agent| agent.spec().config.max_concurrent_tasks)
            .unwrap_or(DEFAULT_AGENT_CONCURRENCY)
    }

    fn sync(&self, execution: &TaskExecution) {
        self.executions.insert(execution.id.clone(), execution.clone());
    }

    async fn persist_quiet(&self, execution: &TaskExecution) {
        if let Err(error) = self.store.save_execution(execution).await {
            warn!(execution_id = %execution.id, %error, "failed to persist execution record");
        }
    }
}

fn remove_waiter(state: &mut SchedulerState, execution_id: &str) -> Option<Waiter> {
    if let Some(index) = state
        .global_queue
        .iter()
        .position(|w| w.execution_id == execution_id)
    {
        return state.global_queue.remove(index);
    }
    for queue in state.agent_queues.values_mut() {
        if let Some(index) = queue.iter().position(|w| w.execution_id == execution_id) {
            return queue.remove(index);
        }
    }
    None
}

fn waiter_info(waiter: &Waiter, global: bool) -> QueuedTaskInfo {
    QueuedTaskInfo {
        execution_id: waiter.execution_id.clone(),
        task_id: waiter.task.id.clone(),
        agent_id: waiter.agent_id.clone(),
        enqueued_at: waiter.enqueued_at,
        global,
    }
}

fn status_label(status: ExecutionStatus) -> &'static str {
    match status {
        ExecutionStatus::Pending => "pending",
        ExecutionStatus::Running => "running",
        ExecutionStatus::Completed => "completed",
        ExecutionStatus::Failed => "failed",
        ExecutionStatus::Cancelled => "cancelled",
    }
}
