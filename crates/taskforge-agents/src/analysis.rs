//! Analysis agent: synthesis over supplied data.

use crate::default_message_reply;
use taskforge_core::{
    A2aMessage, Agent, AgentConfig, AgentRole, AgentSpec, RetryPolicy, Task, TaskContext,
    TaskError, TaskType,
};

/// Summarises and extracts findings from task data.
pub struct AnalysisAgent {
    spec: AgentSpec,
}

impl AnalysisAgent {
    pub fn new() -> Self {
        Self {
            spec: AgentSpec::new("analysis-agent", "Analysis agent", AgentRole::Analyzer)
                .with_description("Analyzes content and extracts key findings")
                .with_capability(TaskType::Analysis)
                .with_system_prompt(
                    "You are an analysis specialist. Synthesize the supplied data into findings.",
                )
                .with_config(AgentConfig {
                    max_concurrent_tasks: 3,
                    default_timeout_ms: 60_000,
                    retry_policy: RetryPolicy {
                        max_retries: 2,
                        retry_delay_ms: 1000,
                        backoff_multiplier: 2.0,
                    },
                }),
        }
    }

    pub fn with_spec(spec: AgentSpec) -> Self {
        Self { spec }
    }
}

impl Default for AnalysisAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Agent for AnalysisAgent {
    fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    async fn execute_task(
        &self,
        task: &Task,
        context: &TaskContext,
    ) -> Result<serde_json::Value, TaskError> {
        let data = task
            .param("data")
            .ok_or_else(|| TaskError::from_message("analysis data missing from parameters"))?
            .clone();
        let analysis_type = task
            .param("analysis_type")
            .and_then(|v| v.as_str())
            .unwrap_or("general");

        tracing::info!(
            execution_id = %context.execution_id,
            analysis_type = %analysis_type,
            "analysis agent executing"
        );

        tokio::time::sleep(std::time::Duration::from_millis(25)).await;

        Ok(serde_json::json!({
            "data": data,
            "analysis_type": analysis_type,
            "findings": [],
            "message": "analysis executed (stub)",
        }))
    }

    async fn handle_message(&self, message: &A2aMessage) -> Option<A2aMessage> {
        default_message_reply(&self.spec.id, message)
    }
}
