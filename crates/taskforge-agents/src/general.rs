//! General-purpose agent covering every task type.
//!
//! The fallback executor the planner reaches for when no specialist fits.
//! Coordination tasks are the interesting part: the agent collects
//! confirmations from the required agents over A2A before reporting.

use crate::default_message_reply;
use taskforge_core::{
    A2aMessage, Agent, AgentConfig, AgentRole, AgentSpec, RetryPolicy, Task, TaskContext,
    TaskError, TaskType,
};

/// Handles any task type with stubbed execution.
pub struct GeneralAgent {
    spec: AgentSpec,
}

impl GeneralAgent {
    pub fn new() -> Self {
        Self {
            spec: AgentSpec::new("general-agent", "General agent", AgentRole::General)
                .with_description("General-purpose agent able to execute any task type")
                .with_capabilities(TaskType::all())
                .with_system_prompt(
                    "You are a general-purpose agent. Execute the task and return a useful result. \
                     Coordinate with other agents when the task requires it.",
                )
                .with_config(AgentConfig {
                    max_concurrent_tasks: 3,
                    default_timeout_ms: 30_000,
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

    async fn coordinate(
        &self,
        task: &Task,
        context: &TaskContext,
    ) -> Result<serde_json::Value, TaskError> {
        let mut targets: Vec<String> = task
            .param("target_agents")
            .and_then(|v| v.as_array())
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();
        if targets.is_empty() {
            targets = task.required_agents.clone();
        }
        if targets.is_empty() {
            return Err(TaskError::from_message(
                "coordination target agents missing from parameters",
            ));
        }

        let mut confirmations = Vec::with_capacity(targets.len());
        for target in &targets {
            let confirmed = context
                .a2a
                .request_confirmation(
                    &self.spec.id,
                    target,
                    &format!("can you assist with task \"{}\"?", task.name),
                    Some(task.id.clone()),
                )
                .await
                .map_err(|err| TaskError::from_message(err.to_string()))?;
            confirmations.push(serde_json::json!({ "agent_id": target, "confirmed": confirmed }));
        }

        Ok(serde_json::json!({
            "target_agents": targets,
            "confirmations": confirmations,
            "message": "coordination executed",
        }))
    }
}

impl Default for GeneralAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Agent for GeneralAgent {
    fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    async fn execute_task(
        &self,
        task: &Task,
        context: &TaskContext,
    ) -> Result<serde_json::Value, TaskError> {
        tracing::info!(
            execution_id = %context.execution_id,
            task_type = task.task_type.as_str(),
            "general agent executing"
        );

        match task.task_type {
            TaskType::Search => {
                let query = task
                    .param("query")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| TaskError::from_message("search query missing from parameters"))?;
                tokio::time::sleep(std::time::Duration::from_millis(25)).await;
                Ok(serde_json::json!({ "query": query, "results": [], "message": "search executed (stub)" }))
            }
            TaskType::Analysis => {
                let data = task
                    .param("data")
                    .ok_or_else(|| TaskError::from_message("analysis data missing from parameters"))?
                    .clone();
                tokio::time::sleep(std::time::Duration::from_millis(25)).await;
                Ok(serde_json::json!({ "data": data, "findings": [], "message": "analysis executed (stub)" }))
            }
            TaskType::Generation => {
                let prompt = task
                    .param("prompt")
                    .or_else(|| task.param("instruction"))
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| {
                        TaskError::from_message("generation prompt missing from parameters")
                    })?;
                tokio::time::sleep(std::time::Duration::from_millis(25)).await;
                Ok(serde_json::json!({
                    "prompt": prompt,
                    "generated": format!("generated content for: {prompt}"),
                }))
            }
            TaskType::Validation => {
                let target = task
                    .param("target")
                    .or_else(|| task.param("data"))
                    .ok_or_else(|| {
                        TaskError::from_message("validation target missing from parameters")
                    })?
                    .clone();
                tokio::time::sleep(std::time::Duration::from_millis(25)).await;
                Ok(serde_json::json!({ "target": target, "valid": true, "message": "validation executed (stub)" }))
            }
            TaskType::Coordination => self.coordinate(task, context).await,
        }
    }

    async fn handle_message(&self, message: &A2aMessage) -> Option<A2aMessage> {
        default_message_reply(&self.spec.id, message)
    }
}
