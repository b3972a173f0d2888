//! TaskForge core: the orchestration engine for a multi-agent task system.
//!
//! This crate provides task planning (dependency staging, critical-path
//! ordering), the scheduler (admission control, per-agent and global
//! concurrency limits, timeout/cancellation, retry-with-backoff), adaptive
//! agent selection from execution history, resource-driven concurrency
//! throttling, inter-agent messaging and declarative task chains.

mod a2a;
mod agent;
mod analyzer;
mod chain;
mod config;
mod context;
mod error;
mod execution;
mod metrics;
mod monitor;
mod orchestrator;
mod planner;
mod predictor;
mod registry;
mod store;
mod task;
mod templates;

pub use a2a::{A2aManager, A2aMessage, A2aMessageType};
pub use agent::{Agent, AgentConfig, AgentRole, AgentSpec, RetryPolicy, TaskContext};
pub use analyzer::{AgentExecutionStats, AgentRecommendation, ExecutionAnalyzer, FailurePattern};
pub use chain::{
    ChainCondition, ChainExecutionResult, ChainNode, ChainRunner, ConditionOp, TaskChain,
};
pub use config::{ConfigLoader, LoggingConfig, Settings};
pub use context::{ContextBuilder, OrchestratorContext};
pub use error::{ErrorClassifier, ErrorKind, TaskError, TaskForgeError, classify_message};
pub use execution::{ExecutionId, ExecutionLog, ExecutionStatus, LogLevel, TaskExecution};
pub use monitor::{ResourceMonitor, ResourceMonitorConfig, ResourceUsage};
pub use orchestrator::{
    AgentLoad, AgentOrchestrator, OrchestratorConfig, OrchestratorStatus, QueueStrategy,
    QueuedTaskInfo,
};
pub use planner::{
    DependencyValidation, ExecutionPlan, ExecutionStage, FullExecutionPlan, TaskPlanner,
};
pub use predictor::{ExecutionTimePrediction, ExecutionTimePredictor};
pub use registry::AgentRegistry;
pub use store::{ExecutionStore, InMemoryExecutionStore, JsonlExecutionStore};
pub use task::{Task, TaskId, TaskType};
pub use templates::{
    TaskTemplate, TemplateOverrides, search_analysis_chain, standard_templates, task_from_template,
};

/// Current Unix timestamp in milliseconds.
pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
