//! Validation agent: consistency checks over a target value.

use crate::default_message_reply;
use taskforge_core::{
    A2aMessage, Agent, AgentConfig, AgentRole, AgentSpec, RetryPolicy, Task, TaskContext,
    TaskError, TaskType,
};

/// Checks a target value and reports whether it passes.
pub struct ValidationAgent {
    spec: AgentSpec,
}

impl ValidationAgent {
    pub fn new() -> Self {
        Self {
            spec: AgentSpec::new("validation-agent", "Validation agent", AgentRole::Validator)
                .with_description("Validates task outputs and data consistency")
                .with_capability(TaskType::Validation)
                .with_system_prompt(
                    "You are a validation specialist. Check the target for consistency problems.",
                )
                .with_config(AgentConfig {
                    max_concurrent_tasks: 5,
                    default_timeout_ms: 30_000,
                    retry_policy: RetryPolicy {
                        max_retries: 1,
                        retry_delay_ms: 500,
                        backoff_multiplier: 2.0,
                    },
                }),
        }
    }

    pub fn with_spec(spec: AgentSpec) -> Self {
        Self { spec }
    }
}

impl Default for ValidationAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Agent for ValidationAgent {
    fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    async fn execute_task(
        &self,
        task: &Task,
        context: &TaskContext,
    ) -> Result<serde_json::Value, TaskError> {
        let target = task
            .param("target")
            .or_else(|| task.param("data"))
            .ok_or_else(|| TaskError::from_message("validation target missing from parameters"))?
            .clone();

        tracing::info!(execution_id = %context.execution_id, "validation agent executing");
        tokio::time::sleep(std::time::Duration::from_millis(25)).await;

        Ok(serde_json::json!({
            "target": target,
            "valid": true,
            "issues": [],
            "message": "validation executed (stub)",
        }))
    }

    async fn handle_message(&self, message: &A2aMessage) -> Option<A2aMessage> {
        default_message_reply(&self.spec.id, message)
    }
}
