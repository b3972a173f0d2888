//! Task and chain templates.
//!
//! Templates capture recurring task shapes (knowledge search, content
//! analysis, text generation) so embedding applications can instantiate
//! tasks without repeating parameter wiring.

use crate::chain::{ChainCondition, ChainNode, ConditionOp, TaskChain};
use crate::error::TaskForgeError;
use crate::now_ms;
use crate::task::{Task, TaskType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// A reusable task shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub task_type: TaskType,
    pub default_parameters: HashMap<String, serde_json::Value>,
    /// Parameters that must be present after merging overrides
    pub required_parameters: Vec<String>,
    pub default_priority: u8,
    pub default_timeout_ms: Option<u64>,
    pub default_retry_count: Option<u32>,
    pub category: String,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Caller-provided deviations from a template.
#[derive(Debug, Clone, Default)]
pub struct TemplateOverrides {
    pub name: Option<String>,
    pub description: Option<String>,
    pub parameters: HashMap<String, serde_json::Value>,
    pub priority: Option<u8>,
    pub timeout_ms: Option<u64>,
    pub retry_count: Option<u32>,
    pub agent_id: Option<String>,
    pub dependencies: Vec<String>,
}

/// Instantiate a task from a template, validating required parameters after
/// the override merge.
pub fn task_from_template(
    template: &TaskTemplate,
    overrides: TemplateOverrides,
) -> Result<Task, TaskForgeError> {
    let mut parameters = template.default_parameters.clone();
    parameters.extend(overrides.parameters);

    for required in &template.required_parameters {
        if !parameters.contains_key(required) {
            return Err(TaskForgeError::InvalidConfiguration(format!(
                "required parameter '{required}' missing for template '{}'",
                template.id
            )));
        }
    }

    let mut task = Task::new(
        format!("task-{}", Uuid::new_v4()),
        overrides.name.unwrap_or_else(|| template.name.clone()),
        template.task_type,
    )
    .with_description(
        overrides
            .description
            .unwrap_or_else(|| template.description.clone()),
    )
    .with_priority(overrides.priority.unwrap_or(template.default_priority));

    task.parameters = parameters;
    task.timeout_ms = overrides.timeout_ms.or(template.default_timeout_ms);
    task.retry_count = overrides.retry_count.or(template.default_retry_count);
    task.agent_id = overrides.agent_id;
    task.dependencies = overrides.dependencies;
    Ok(task)
}

/// The built-in template set.
pub fn standard_templates() -> Vec<TaskTemplate> {
    let now = now_ms();
    vec![
        TaskTemplate {
            id: "template-knowledge-search".to_string(),
            name: "Knowledge search".to_string(),
            description: "Search the knowledge base for relevant entries".to_string(),
            task_type: TaskType::Search,
            default_parameters: HashMap::from([(
                "limit".to_string(),
                serde_json::json!(10),
            )]),
            required_parameters: vec!["query".to_string()],
            default_priority: 8,
            default_timeout_ms: Some(30_000),
            default_retry_count: Some(2),
            category: "search".to_string(),
            tags: vec!["search".to_string(), "knowledge".to_string()],
            created_at: now,
            updated_at: now,
        },
        TaskTemplate {
            id: "template-content-analysis".to_string(),
            name: "Content analysis".to_string(),
            description: "Analyze content and extract key findings".to_string(),
            task_type: TaskType::Analysis,
            default_parameters: HashMap::from([(
                "analysis_type".to_string(),
                serde_json::json!("general"),
            )]),
            required_parameters: vec!["data".to_string()],
            default_priority: 6,
            default_timeout_ms: Some(60_000),
            default_retry_count: Some(1),
            category: "analysis".to_string(),
            tags: vec!["analysis".to_string()],
            created_at: now,
            updated_at: now,
        },
        TaskTemplate {
            id: "template-text-generation".to_string(),
            name: "Text generation".to_string(),
            description: "Generate content from a prompt".to_string(),
            task_type: TaskType::Generation,
            default_parameters: HashMap::new(),
            required_parameters: vec!["prompt".to_string()],
            default_priority: 5,
            default_timeout_ms: Some(120_000),
            default_retry_count: Some(2),
            category: "generation".to_string(),
            tags: vec!["generation".to_string()],
            created_at: now,
            updated_at: now,
        },
    ]
}

/// Canonical search-then-analyze chain: run a search, and only analyze when
/// it produced any results.
pub fn search_analysis_chain(query: &str) -> TaskChain {
    let search_task = Task::new(
        format!("task-{}", Uuid::new_v4()),
        "Knowledge search",
        TaskType::Search,
    )
    .with_param("query", serde_json::json!(query))
    .with_param("limit", serde_json::json!(10))
    .with_priority(8);

    let analysis_task = Task::new(
        format!("task-{}", Uuid::new_v4()),
        "Analyze search results",
        TaskType::Analysis,
    )
    .with_param("data", serde_json::json!("search results"))
    .with_priority(6);

    TaskChain::new(format!("chain-{}", Uuid::new_v4()), "search-analysis")
        .with_description("Search the knowledge base, then analyze the hits")
        .with_node(ChainNode::Task {
            id: "search".to_string(),
            task: search_task,
            next: Some("has-results".to_string()),
        })
        .with_node(ChainNode::Condition {
            id: "has-results".to_string(),
            condition: ChainCondition {
                op: ConditionOp::Exists,
                field: "results".to_string(),
                value: serde_json::Value::Null,
            },
            true_branch: Some("analyze".to_string()),
            false_branch: None,
        })
        .with_node(ChainNode::Task {
            id: "analyze".to_string(),
            task: analysis_task,
            next: None,
        })
        .with_start("search")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_instantiation_merges_overrides() {
        let templates = standard_templates();
        let search = &templates[0];

        let task = task_from_template(
            search,
            TemplateOverrides {
                parameters: HashMap::from([("query".to_string(), serde_json::json!("rust"))]),
                priority: Some(9),
                ..TemplateOverrides::default()
            },
        )
        .unwrap();

        assert_eq!(task.task_type, TaskType::Search);
        assert_eq!(task.priority, 9);
        assert_eq!(task.param("limit"), Some(&serde_json::json!(10)));
        assert_eq!(task.param("query"), Some(&serde_json::json!("rust")));
        assert_eq!(task.timeout_ms, Some(30_000));
    }

    #[test]
    fn test_missing_required_parameter_rejected() {
        let templates = standard_templates();
        let err = task_from_template(&templates[0], TemplateOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("query"));
    }

    #[test]
    fn test_search_analysis_chain_shape() {
        let chain = search_analysis_chain("embedded orchestration");
        assert_eq!(chain.start_node, "search");
        assert_eq!(chain.nodes.len(), 3);
        assert!(matches!(
            chain.nodes.get("has-results"),
            Some(ChainNode::Condition { .. })
        ));
    }
}
