//! Generation agent: prompt-driven content production.

use crate::default_message_reply;
use taskforge_core::{
    A2aMessage, Agent, AgentConfig, AgentRole, AgentSpec, RetryPolicy, Task, TaskContext,
    TaskError, TaskType,
};

/// Produces content from a prompt or instruction.
pub struct GenerationAgent {
    spec: AgentSpec,
}

impl GenerationAgent {
    pub fn new() -> Self {
        Self {
            spec: AgentSpec::new("generation-agent", "Generation agent", AgentRole::Generator)
                .with_description("Generates content from prompts")
                .with_capability(TaskType::Generation)
                .with_system_prompt(
                    "You are a content generation specialist. Produce high quality output for the prompt.",
                )
                .with_config(AgentConfig {
                    max_concurrent_tasks: 2,
                    default_timeout_ms: 120_000,
                    retry_policy: RetryPolicy {
                        max_retries: 2,
                        retry_delay_ms: 2000,
                        backoff_multiplier: 2.0,
                    },
                }),
        }
    }

    pub fn with_spec(spec: AgentSpec) -> Self {
        Self { spec }
    }
}

impl Default for GenerationAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Agent for GenerationAgent {
    fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    async fn execute_task(
        &self,
        task: &Task,
        context: &TaskContext,
    ) -> Result<serde_json::Value, TaskError> {
        let prompt = task
            .param("prompt")
            .or_else(|| task.param("instruction"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| TaskError::from_message("generation prompt missing from parameters"))?;

        tracing::info!(
            execution_id = %context.execution_id,
            prompt_len = prompt.len(),
            "generation agent executing"
        );

        // A real integration calls the configured model here
        tokio::time::sleep(std::time::Duration::from_millis(25)).await;
        let generated = format!("generated content for: {prompt}");

        Ok(serde_json::json!({
            "prompt": prompt,
            "generated": generated,
            "model_type": self.spec.model_type,
        }))
    }

    async fn handle_message(&self, message: &A2aMessage) -> Option<A2aMessage> {
        default_message_reply(&self.spec.id, message)
    }
}
