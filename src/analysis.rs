use crate::process::{EventKind, NodeKind, ProcessGraph, TaskKind};
use crate::risk::{ClassifiedEndpoint, RiskLevel};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPattern {
    AuthenticationFlow,
    PaymentFlow,
    AccountManagement,
    DataAccess,
    CustomWorkflow,
}

impl WorkflowPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowPattern::AuthenticationFlow => "authentication_flow",
            WorkflowPattern::PaymentFlow => "payment_flow",
            WorkflowPattern::AccountManagement => "account_management",
            WorkflowPattern::DataAccess => "data_access",
            WorkflowPattern::CustomWorkflow => "custom_workflow",
        }
    }
}

impl fmt::Display for WorkflowPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checked in order; the first pattern with at least [`PATTERN_MIN_TASKS`]
/// matching tasks labels the workflow.
const WORKFLOW_TAXONOMY: &[(WorkflowPattern, &[&str])] = &[
    (
        WorkflowPattern::AuthenticationFlow,
        &["auth", "login", "token", "credential"],
    ),
    (
        WorkflowPattern::PaymentFlow,
        &["payment", "transfer", "money", "amount"],
    ),
    (
        WorkflowPattern::AccountManagement,
        &["account", "balance", "card", "profile"],
    ),
    (
        WorkflowPattern::DataAccess,
        &["read", "get", "retrieve", "fetch"],
    ),
];

const PATTERN_MIN_TASKS: usize = 2;

const ERROR_KEYWORDS: &[&str] = &["error", "exception", "catch", "finally"];

/// Security-relevant reading of one process and its classified endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessLogicAnalysis {
    pub process_id: String,
    pub workflow_pattern: WorkflowPattern,
    pub critical_operations: Vec<String>,
    pub authentication_flows: Vec<String>,
    pub authorization_checkpoints: Vec<String>,
    pub validation_points: Vec<String>,
    pub error_handling_scenarios: Vec<String>,
    pub bottlenecks: Vec<String>,
}

pub fn analyze(graph: &ProcessGraph, endpoints: &[ClassifiedEndpoint]) -> BusinessLogicAnalysis {
    BusinessLogicAnalysis {
        process_id: graph.process_id.clone(),
        workflow_pattern: workflow_pattern(graph),
        critical_operations: critical_operations(graph, endpoints),
        authentication_flows: endpoints
            .iter()
            .filter(|e| e.risk.requires_auth)
            .map(ClassifiedEndpoint::signature)
            .collect(),
        authorization_checkpoints: endpoints
            .iter()
            .filter(|e| e.risk.business_criticality.is_elevated())
            .map(ClassifiedEndpoint::signature)
            .collect(),
        validation_points: endpoints
            .iter()
            .filter(|e| !e.parameters.is_empty())
            .map(|e| format!("{} (parameters: {})", e.signature(), e.parameters.join(", ")))
            .collect(),
        error_handling_scenarios: error_handling_scenarios(graph),
        bottlenecks: bottlenecks(graph, endpoints),
    }
}

pub fn workflow_pattern(graph: &ProcessGraph) -> WorkflowPattern {
    let names: Vec<String> = graph
        .tasks()
        .map(|t| t.name.to_lowercase())
        .filter(|n| !n.is_empty())
        .unique()
        .collect();

    WORKFLOW_TAXONOMY
        .iter()
        .find(|(_, keywords)| {
            names
                .iter()
                .filter(|name| keywords.iter().any(|kw| name.contains(*kw)))
                .count()
                >= PATTERN_MIN_TASKS
        })
        .map(|(pattern, _)| *pattern)
        .unwrap_or(WorkflowPattern::CustomWorkflow)
}

fn critical_operations(graph: &ProcessGraph, endpoints: &[ClassifiedEndpoint]) -> Vec<String> {
    let risky = endpoints
        .iter()
        .filter(|e| e.risk.risk_level.is_elevated())
        .map(ClassifiedEndpoint::signature);
    let automated = graph
        .tasks()
        .filter(|t| {
            matches!(
                t.task_kind(),
                Some(TaskKind::ServiceTask | TaskKind::BusinessRuleTask)
            )
        })
        .filter(|t| !t.name.is_empty())
        .map(|t| t.name.clone());

    risky.chain(automated).unique().collect()
}

fn error_handling_scenarios(graph: &ProcessGraph) -> Vec<String> {
    let named = graph
        .tasks()
        .filter(|t| {
            let name = t.name.to_lowercase();
            ERROR_KEYWORDS.iter().any(|kw| name.contains(*kw))
        })
        .map(|t| t.name.clone());
    let boundaries = graph
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Event(EventKind::BoundaryEvent))
        .filter(|n| n.event_definitions.iter().any(|d| d == "error"))
        .map(|n| format!("{} (error boundary)", n.label()));

    named.chain(boundaries).unique().collect()
}

fn bottlenecks(graph: &ProcessGraph, endpoints: &[ClassifiedEndpoint]) -> Vec<String> {
    let critical = endpoints
        .iter()
        .filter(|e| e.risk.business_criticality == RiskLevel::Critical)
        .map(|e| format!("Critical API: {}", e.signature()));
    let joins = graph
        .nodes
        .iter()
        .filter(|n| n.incoming.len() > 1)
        .map(|n| format!("Join point: {} ({} incoming)", n.label(), n.incoming.len()));

    critical.chain(joins).unique().collect()
}
