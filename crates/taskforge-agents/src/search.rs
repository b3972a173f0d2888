//! Search agent: knowledge retrieval tasks.

use crate::default_message_reply;
use taskforge_core::{
    A2aMessage, Agent, AgentConfig, AgentRole, AgentSpec, RetryPolicy, Task, TaskContext,
    TaskError, TaskType,
};

/// Retrieves entries matching a query.
pub struct SearchAgent {
    spec: AgentSpec,
}

impl SearchAgent {
    pub fn new() -> Self {
        Self {
            spec: AgentSpec::new("search-agent", "Search agent", AgentRole::Searcher)
                .with_description("Searches the knowledge base for relevant entries")
                .with_capability(TaskType::Search)
                .with_system_prompt(
                    "You are a search specialist. Retrieve the most relevant entries for the query.",
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
}

impl Default for SearchAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Agent for SearchAgent {
    fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    async fn execute_task(
        &self,
        task: &Task,
        context: &TaskContext,
    ) -> Result<serde_json::Value, TaskError> {
        let query = task
            .param("query")
            .or_else(|| task.param("search_query"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| TaskError::from_message("search query missing from parameters"))?;
        let limit = task.param("limit").and_then(|v| v.as_u64()).unwrap_or(10);

        tracing::info!(
            execution_id = %context.execution_id,
            query = %query,
            limit,
            "search agent executing"
        );

        // Simulate retrieval latency; a real integration queries the
        // embedding store here
        tokio::time::sleep(std::time::Duration::from_millis(25)).await;

        Ok(serde_json::json!({
            "query": query,
            "limit": limit,
            "results": [],
            "message": "search executed (stub)",
        }))
    }

    async fn handle_message(&self, message: &A2aMessage) -> Option<A2aMessage> {
        default_message_reply(&self.spec.id, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use taskforge_core::{A2aManager, AgentRegistry};

    fn context() -> TaskContext {
        let registry = Arc::new(AgentRegistry::new());
        TaskContext::new("exec-test", Arc::new(A2aManager::new(registry)))
    }

    #[tokio::test]
    async fn test_executes_search_with_query() {
        let agent = SearchAgent::new();
        let task = Task::new("t1", "search", TaskType::Search)
            .with_param("query", serde_json::json!("rust orchestration"));

        let result = agent.execute_task(&task, &context()).await.unwrap();
        assert_eq!(result["query"], "rust orchestration");
    }

    #[tokio::test]
    async fn test_missing_query_is_validation_error() {
        let agent = SearchAgent::new();
        let task = Task::new("t1", "search", TaskType::Search);

        let err = agent.execute_task(&task, &context()).await.unwrap_err();
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_capability_is_search_only() {
        let agent = SearchAgent::new();
        assert!(agent.can_execute(&Task::new("t", "t", TaskType::Search)));
        assert!(!agent.can_execute(&Task::new("t", "t", TaskType::Generation)));
    }
}
