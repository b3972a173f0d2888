//! End-to-end orchestration showcase.
//!
//! Run with: cargo run --example orchestrator_demo

use std::sync::Arc;

use taskforge_core::{
    A2aMessage, A2aMessageType, Agent, AgentRole, AgentSpec, OrchestratorConfig,
    OrchestratorContext, QueueStrategy, Task, TaskContext, TaskError, TaskType,
    search_analysis_chain,
};

/// Demo agent answering every task type with a canned payload.
struct DemoAgent {
    spec: AgentSpec,
}

impl DemoAgent {
    fn new(id: &str, role: AgentRole, capabilities: Vec<TaskType>) -> Self {
        Self {
            spec: AgentSpec::new(id, id, role).with_capabilities(capabilities),
        }
    }
}

#[async_trait::async_trait]
impl Agent for DemoAgent {
    fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    async fn execute_task(
        &self,
        task: &Task,
        _context: &TaskContext,
    ) -> Result<serde_json::Value, TaskError> {
        tokio::time::sleep(std::time::Duration::from_millis(80)).await;
        Ok(serde_json::json!({
            "task": task.name,
            "agent": self.spec.id,
            "results": ["demo output"],
            "data": "demo",
        }))
    }

    async fn handle_message(&self, message: &A2aMessage) -> Option<A2aMessage> {
        match message.message_type {
            A2aMessageType::Confirmation => {
                Some(message.reply(&self.spec.id, serde_json::json!({ "confirmed": true })))
            }
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("═══════════════════════════════════════════════════");
    println!("  TaskForge Demo: planning, scheduling, chains");
    println!("═══════════════════════════════════════════════════\n");

    let context = OrchestratorContext::builder()
        .with_orchestrator_config(OrchestratorConfig {
            global_max_concurrent_tasks: Some(4),
            queue_strategy: QueueStrategy::Priority,
            enable_dynamic_adjustment: false,
        })
        .build();

    context.registry().register(Arc::new(DemoAgent::new(
        "searcher",
        AgentRole::Searcher,
        vec![TaskType::Search],
    )));
    context.registry().register(Arc::new(DemoAgent::new(
        "analyzer",
        AgentRole::Analyzer,
        vec![TaskType::Analysis],
    )));
    context.registry().register(Arc::new(DemoAgent::new(
        "generalist",
        AgentRole::General,
        TaskType::all(),
    )));

    // Demo 1: dependency-staged batch
    println!("Demo 1: staged batch (search -> analysis, plus a parallel branch)\n");

    let tasks = vec![
        Task::new("search-news", "Search recent notes", TaskType::Search)
            .with_param("query", serde_json::json!("release retrospective"))
            .with_priority(8),
        Task::new("search-archive", "Search archive", TaskType::Search)
            .with_param("query", serde_json::json!("postmortems"))
            .with_priority(5),
        Task::new("synthesize", "Synthesize findings", TaskType::Analysis)
            .with_param("data", serde_json::json!("search output"))
            .with_dependency("search-news")
            .with_dependency("search-archive"),
    ];

    let plan = context.orchestrator().planner().create_execution_plan(&tasks).await?;
    println!("  stages: {}", plan.stages.len());
    for stage in &plan.stages {
        let ids: Vec<&str> = stage.tasks.iter().map(|t| t.id.as_str()).collect();
        println!("  stage {}: {ids:?}", stage.stage_number);
    }

    let results = context.orchestrator().execute_tasks(tasks).await?;
    for execution in &results {
        println!(
            "  {} -> {:?} on {} ({}ms)",
            execution.task_id,
            execution.status,
            execution.agent_id,
            execution.duration_ms().unwrap_or(0)
        );
    }

    // Demo 2: declarative chain
    println!("\nDemo 2: search -> condition -> analysis chain\n");

    let chain = search_analysis_chain("knowledge graph cleanup");
    let chain_id = chain.id.clone();
    context.chains().register_chain(chain);
    let outcome = context.chains().execute_chain(&chain_id).await?;
    println!("  status: {:?}", outcome.status);
    println!("  path:   {:?}", outcome.execution_path);

    // Demo 3: execution analytics
    println!("\nDemo 3: per-agent statistics\n");

    context.analyzer().clear_cache();
    for stats in context.analyzer().agent_stats(None).await {
        println!(
            "  {}: {} runs, {:.0}% success, median {}ms",
            stats.agent_id,
            stats.total_executions,
            stats.success_rate * 100.0,
            stats.median_execution_ms
        );
    }

    context.shutdown();
    println!("\nAll demos completed.");
    Ok(())
}
