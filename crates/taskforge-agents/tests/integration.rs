//! Full-engine tests with the concrete agent set registered.

use std::sync::Arc;

use taskforge_agents::{
    AnalysisAgent, GeneralAgent, GenerationAgent, SearchAgent, ValidationAgent,
};
use taskforge_core::{
    ExecutionStatus, OrchestratorContext, Task, TaskType, search_analysis_chain,
};

fn full_context() -> OrchestratorContext {
    let context = OrchestratorContext::builder().build();
    context.registry().register(Arc::new(SearchAgent::new()));
    context.registry().register(Arc::new(AnalysisAgent::new()));
    context.registry().register(Arc::new(GenerationAgent::new()));
    context.registry().register(Arc::new(ValidationAgent::new()));
    context.registry().register(Arc::new(GeneralAgent::new()));
    context
}

#[tokio::test]
async fn test_planner_routes_by_preferred_role() {
    let context = full_context();

    let search = Task::new("t-search", "find notes", TaskType::Search)
        .with_param("query", serde_json::json!("meeting notes"));
    let execution = context.orchestrator().execute_task(search).await.unwrap();

    assert_eq!(execution.status, ExecutionStatus::Completed);
    assert_eq!(execution.agent_id, "search-agent");
}

#[tokio::test]
async fn test_dependent_batch_runs_in_order() {
    let context = full_context();

    let search = Task::new("search-1", "search", TaskType::Search)
        .with_param("query", serde_json::json!("orchestration"));
    let analysis = Task::new("analysis-1", "analyze", TaskType::Analysis)
        .with_param("data", serde_json::json!("search output"))
        .with_dependency("search-1");

    let results = context
        .orchestrator()
        .execute_tasks(vec![analysis, search])
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|e| e.status == ExecutionStatus::Completed));

    let search_exec = results.iter().find(|e| e.task_id == "search-1").unwrap();
    let analysis_exec = results.iter().find(|e| e.task_id == "analysis-1").unwrap();
    assert_eq!(search_exec.agent_id, "search-agent");
    assert_eq!(analysis_exec.agent_id, "analysis-agent");
    assert!(analysis_exec.started_at >= search_exec.completed_at.unwrap());
}

#[tokio::test]
async fn test_coordination_confirms_with_specialists() {
    let context = full_context();

    let coordination = Task::new("coord-1", "sync specialists", TaskType::Coordination)
        .with_agent("general-agent")
        .with_required_agent("search-agent")
        .with_required_agent("validation-agent");

    let execution = context
        .orchestrator()
        .execute_task(coordination)
        .await
        .unwrap();
    assert_eq!(execution.status, ExecutionStatus::Completed);

    let confirmations = execution.result.as_ref().unwrap()["confirmations"]
        .as_array()
        .unwrap()
        .clone();
    assert_eq!(confirmations.len(), 2);
    assert!(confirmations.iter().all(|c| c["confirmed"] == true));

    // Both sides of each confirmation round-trip are in the message history
    let history = context.a2a().history_for_agent("search-agent").await;
    assert!(history.len() >= 2);
}

#[tokio::test]
async fn test_validation_error_not_retried() {
    let context = full_context();

    // Missing query: the search agent raises a validation failure, which the
    // retry budget must not consume
    let bad = Task::new("bad-1", "no query", TaskType::Search).with_retry_count(3);
    let execution = context.orchestrator().execute_task(bad).await.unwrap();

    assert_eq!(execution.status, ExecutionStatus::Failed);
    assert!(execution.error.as_deref().unwrap().contains("missing"));
    let retry_logs = execution
        .logs
        .iter()
        .filter(|l| l.message.contains("retry attempt"))
        .count();
    assert_eq!(retry_logs, 0);
}

#[tokio::test]
async fn test_search_analysis_chain_end_to_end() {
    let context = full_context();

    let chain = search_analysis_chain("quarterly report");
    let chain_id = chain.id.clone();
    context.chains().register_chain(chain);

    let result = context.chains().execute_chain(&chain_id).await.unwrap();
    assert_eq!(result.status, ExecutionStatus::Completed);
    assert_eq!(
        result.execution_path,
        vec!["search", "has-results", "analyze"]
    );
    assert_eq!(result.node_results["search"].agent_id, "search-agent");
    assert_eq!(result.node_results["analyze"].agent_id, "analysis-agent");
}

#[tokio::test]
async fn test_execution_history_feeds_analyzer() {
    let context = full_context();

    for i in 0..3 {
        let task = Task::new(format!("s{i}"), "search", TaskType::Search)
            .with_param("query", serde_json::json!("anything"));
        context.orchestrator().execute_task(task).await.unwrap();
    }

    context.analyzer().clear_cache();
    let stats = context.analyzer().agent_stats(Some("search-agent")).await;
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].total_executions, 3);
    assert!(stats[0].success_rate > 0.99);
}
