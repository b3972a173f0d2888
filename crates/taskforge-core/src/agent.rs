//! Agent contract and descriptors.
//!
//! An agent is a capability provider registered with the orchestrator. The
//! core never inspects agent internals: everything flows through the
//! [`Agent`] trait and the declared [`AgentSpec`], so capability checks read
//! the stored set instead of probing the implementation.

use crate::a2a::{A2aManager, A2aMessage};
use crate::error::TaskError;
use crate::execution::ExecutionId;
use crate::task::{Task, TaskType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Functional role an agent advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Searcher,
    Analyzer,
    Generator,
    Validator,
    Coordinator,
    General,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Searcher => "searcher",
            AgentRole::Analyzer => "analyzer",
            AgentRole::Generator => "generator",
            AgentRole::Validator => "validator",
            AgentRole::Coordinator => "coordinator",
            AgentRole::General => "general",
        }
    }
}

/// Retry backoff parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay_ms: 1000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Delay before the given zero-based retry attempt.
    pub fn delay_for_attempt(&self, attempt: u32) -> std::time::Duration {
        let millis = self.retry_delay_ms as f64 * self.backoff_multiplier.powi(attempt as i32);
        std::time::Duration::from_millis(millis as u64)
    }
}

/// Per-agent execution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Concurrency cap for this agent's executions
    pub max_concurrent_tasks: usize,
    /// Deadline applied when the task declares none
    pub default_timeout_ms: u64,
    pub retry_policy: RetryPolicy,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 10,
            default_timeout_ms: 60_000,
            retry_policy: RetryPolicy::default(),
        }
    }
}

/// Static description of a registered agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub id: String,
    pub name: String,
    pub description: String,
    pub role: AgentRole,
    /// Task types this agent can execute
    pub capabilities: Vec<TaskType>,
    /// Names of tools the agent may call
    #[serde(default)]
    pub tools: Vec<String>,
    /// Backing model identifier
    pub model_type: String,
    pub system_prompt: String,
    pub config: AgentConfig,
    pub created_at: i64,
    pub updated_at: i64,
}

impl AgentSpec {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: AgentRole) -> Self {
        let now = crate::now_ms();
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            role,
            capabilities: Vec::new(),
            tools: Vec::new(),
            model_type: "stub".to_string(),
            system_prompt: String::new(),
            config: AgentConfig::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_capability(mut self, capability: TaskType) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn with_capabilities(mut self, capabilities: Vec<TaskType>) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

/// Runtime context handed to an agent for one execution.
#[derive(Clone)]
pub struct TaskContext {
    pub execution_id: ExecutionId,
    /// Messaging handle for mid-execution agent-to-agent exchanges
    pub a2a: Arc<A2aManager>,
}

impl TaskContext {
    pub fn new(execution_id: impl Into<ExecutionId>, a2a: Arc<A2aManager>) -> Self {
        Self {
            execution_id: execution_id.into(),
            a2a,
        }
    }
}

/// Capability contract every executor implements.
#[async_trait::async_trait]
pub trait Agent: Send + Sync {
    /// Static descriptor: id, role, capabilities, config.
    fn spec(&self) -> &AgentSpec;

    /// Execute one task. Errors are classified and recorded by the
    /// orchestrator; implementations never need to catch their own failures.
    async fn execute_task(&self, task: &Task, context: &TaskContext)
    -> Result<serde_json::Value, TaskError>;

    /// React to an inter-agent message, optionally producing a reply.
    async fn handle_message(&self, message: &A2aMessage) -> Option<A2aMessage>;

    /// Whether this agent declares the task's type as a capability.
    fn can_execute(&self, task: &Task) -> bool {
        self.spec().capabilities.contains(&task.task_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_backoff() {
        let policy = RetryPolicy {
            max_retries: 3,
            retry_delay_ms: 100,
            backoff_multiplier: 2.0,
        };
        assert_eq!(policy.delay_for_attempt(0).as_millis(), 100);
        assert_eq!(policy.delay_for_attempt(1).as_millis(), 200);
        assert_eq!(policy.delay_for_attempt(2).as_millis(), 400);
    }

    #[test]
    fn test_agent_config_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.max_concurrent_tasks, 10);
        assert_eq!(config.default_timeout_ms, 60_000);
    }

    #[test]
    fn test_spec_builder() {
        let spec = AgentSpec::new("a1", "Agent One", AgentRole::Searcher)
            .with_capability(TaskType::Search)
            .with_capability(TaskType::Coordination);
        assert_eq!(spec.capabilities.len(), 2);
        assert_eq!(spec.role, AgentRole::Searcher);
    }
}
