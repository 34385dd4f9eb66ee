//! Tests for business-logic analysis, test case synthesis and assessment points.
mod common;
use common::*;
use kensa::analysis::{analyze, workflow_pattern};
use kensa::prelude::*;
use kensa::synth::{assessment_points, synthesize, synthesize_all, test_id};
use serde_json::json;
use std::collections::BTreeSet;

fn banking_analysis() -> ProcessAnalysis {
    banking_analyzer()
        .analyze_document(BANKING_BPMN, "banking.bpmn")
        .unwrap()
        .remove(0)
}

/// One classified endpoint for a single-task process against a one-entry contract.
fn endpoint_for(label: &str, template: &str, verb: &str) -> ClassifiedEndpoint {
    let analyzer = Analyzer::builder(contract_with(&[(template, verb)])).build();
    let xml = linear_process("p", &[("t1", label)]);
    let mut analyses = analyzer.analyze_document(&xml, "inline").unwrap();
    analyses.remove(0).endpoints.remove(0)
}

#[test]
fn test_workflow_pattern_detection() {
    let auth = ProcessParser::parse_first_process(BANKING_BPMN).unwrap();
    assert_eq!(workflow_pattern(&auth), WorkflowPattern::AuthenticationFlow);

    let payment = ProcessParser::parse_first_process(&linear_process(
        "p",
        &[("a", "Enter amount"), ("b", "Send money")],
    ))
    .unwrap();
    assert_eq!(workflow_pattern(&payment), WorkflowPattern::PaymentFlow);

    // Two tasks with the same name count once.
    let repeated = ProcessParser::parse_first_process(&linear_process(
        "p",
        &[("a", "Fetch report"), ("b", "Fetch report"), ("c", "Archive")],
    ))
    .unwrap();
    assert_eq!(workflow_pattern(&repeated), WorkflowPattern::CustomWorkflow);

    let data = ProcessParser::parse_first_process(&linear_process(
        "p",
        &[("a", "Fetch report"), ("b", "Read archive")],
    ))
    .unwrap();
    assert_eq!(workflow_pattern(&data), WorkflowPattern::DataAccess);
}

#[test]
fn test_business_logic_of_banking_process() {
    let analysis = banking_analysis().business_analysis;

    assert_eq!(analysis.process_id, "BankingProcess");
    assert_eq!(analysis.workflow_pattern, WorkflowPattern::AuthenticationFlow);
    assert_eq!(
        analysis.critical_operations,
        vec!["GET /accounts/{accountId}/balances", "Send notification"]
    );
    assert_eq!(analysis.authentication_flows, vec!["POST /auth/login"]);
    assert!(analysis.authorization_checkpoints.is_empty());
    assert_eq!(
        analysis.validation_points,
        vec!["GET /accounts/{accountId}/balances (parameters: accountId)"]
    );
    assert_eq!(
        analysis.error_handling_scenarios,
        vec!["Handle payment error", "Payment failed (error boundary)"]
    );
    assert_eq!(
        analysis.bottlenecks,
        vec![
            "Join point: Send notification (2 incoming)",
            "Join point: Done (2 incoming)"
        ]
    );
}

#[test]
fn test_elevated_endpoints_become_critical_operations() {
    let analyzer = Analyzer::builder(contract_with(&[("/customers/{id}/cards", "put")]))
        .with_risk_rule(RiskRule {
            name: "vault".to_string(),
            keywords: vec!["vault".to_string()],
            increment: 1,
            owasp: vec![],
            requires_auth: false,
        })
        .build();
    let xml = linear_process(
        "p",
        &[("t1", "Vault customer card token via PUT /customers/{id}/cards")],
    );
    let graph = ProcessParser::parse_first_process(&xml).unwrap();
    let analysis = analyzer.analyze_graph(&graph, "inline");
    let endpoint = &analysis.endpoints[0];
    assert_eq!(endpoint.risk.risk_level, RiskLevel::Critical);

    let business = analyze(&graph, &analysis.endpoints);
    assert_eq!(business.critical_operations, vec!["PUT /customers/{id}/cards"]);
    assert_eq!(business.authorization_checkpoints, vec!["PUT /customers/{id}/cards"]);
    assert_eq!(
        business.bottlenecks,
        vec!["Critical API: PUT /customers/{id}/cards"]
    );
}

#[test]
fn test_low_risk_endpoint_gets_baseline_tests() {
    let endpoint = endpoint_for("GET /status", "/status", "get");
    let tests = synthesize(&endpoint);

    let kinds: Vec<TestKind> = tests.iter().map(|t| t.kind).collect();
    assert_eq!(kinds, vec![TestKind::HappyPath, TestKind::Validation]);

    let happy = &tests[0];
    assert_eq!(happy.test_type, TestType::HappyPath);
    assert_eq!(happy.expected.status, 200);
    assert_eq!(happy.name, "Happy Path - GET /status");
    assert_eq!(happy.business_scenario, "GET /status");
    assert_eq!(happy.source_node_id, "t1");
    assert_eq!(happy.input, json!({}));
    assert!(happy.security_vectors.is_empty());

    let validation = &tests[1];
    assert_eq!(validation.expected.status, 400);
    assert_eq!(
        validation.security_vectors,
        vec![OwaspCategory::A03.label()]
    );
}

#[test]
fn test_auth_tests_only_for_auth_or_token_names() {
    let with_token = synthesize(&endpoint_for(
        "Refresh token via POST /sessions",
        "/sessions",
        "post",
    ));
    let kinds: BTreeSet<TestKind> = with_token.iter().map(|t| t.kind).collect();
    assert!(kinds.contains(&TestKind::AuthInvalid));
    assert!(kinds.contains(&TestKind::AuthMissing));

    let missing = with_token.iter().find(|t| t.kind == TestKind::AuthMissing).unwrap();
    assert_eq!(missing.test_type, TestType::Negative);
    assert_eq!(missing.expected.status, 401);

    // Only the task name is read; here it happens to embed an /auth path.
    let by_path = synthesize(&endpoint_for(
        "Open session via POST /auth/sessions",
        "/auth/sessions",
        "post",
    ));
    assert!(by_path.iter().any(|t| t.kind == TestKind::AuthInvalid));
    let plain = synthesize(&endpoint_for("Open session via POST /sessions", "/sessions", "post"));
    assert!(!plain.iter().any(|t| t.kind == TestKind::AuthInvalid));
}

#[test]
fn test_high_risk_sensitive_endpoint_gets_full_suite() {
    let endpoint = endpoint_for(
        "Update customer card token via PUT /customers/{id}/cards",
        "/customers/{id}/cards",
        "put",
    );
    assert_eq!(endpoint.risk.risk_level, RiskLevel::High);
    assert_eq!(endpoint.risk.data_sensitivity, DataSensitivity::High);

    let tests = synthesize(&endpoint);
    let kinds: Vec<TestKind> = tests.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TestKind::HappyPath,
            TestKind::AuthInvalid,
            TestKind::AuthMissing,
            TestKind::Validation,
            TestKind::AccessControl,
            TestKind::Injection,
            TestKind::AuthFail,
            TestKind::RateLimit,
            TestKind::DataValidation,
        ]
    );

    let statuses: Vec<u16> = tests.iter().map(|t| t.expected.status).collect();
    assert_eq!(statuses, vec![200, 401, 401, 400, 403, 400, 401, 429, 400]);

    let ids: BTreeSet<&str> = tests.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids.len(), tests.len(), "ids must be unique within one operation");
}

#[test]
fn test_ids_are_stable_across_runs() {
    let endpoint = endpoint_for("Transfer funds via POST /payments", "/payments", "post");
    let first = synthesize(&endpoint);
    let second = synthesize(&endpoint);

    assert_eq!(first[0].id, second[0].id);
    assert_eq!(first, second);
    assert_eq!(first[0].id, test_id(TestKind::HappyPath, "/payments", HttpMethod::Post));
    assert!(first[0].id.starts_with("happy_path_"));
}

#[test]
fn test_same_operation_from_two_tasks_is_emitted_once() {
    let analyzer = Analyzer::builder(contract_with(&[("/orders", "get")])).build();
    let xml = linear_process("p", &[("t1", "GET /orders"), ("t2", "List again via GET /orders")]);
    let analysis = analyzer.analyze_document(&xml, "inline").unwrap().remove(0);

    assert_eq!(analysis.endpoints.len(), 2);
    assert_eq!(analysis.security_tests.len(), 2);
    assert!(analysis.security_tests.iter().all(|t| t.source_node_id == "t1"));

    let doubled = synthesize_all(&analysis.endpoints);
    assert_eq!(doubled, analysis.security_tests);
}

#[test]
fn test_happy_path_payload_follows_request_schema() {
    let analysis = banking_analysis();
    let transfer = analysis
        .security_tests
        .iter()
        .find(|t| t.kind == TestKind::HappyPath && t.source_node_id == "Task_Transfer")
        .unwrap();

    assert_eq!(
        transfer.input,
        json!({"amount": 123, "creditorIban": "test_creditorIban", "instant": true})
    );
}

#[test]
fn test_banking_test_counts() {
    let analysis = banking_analysis();

    let count = |task: &str| {
        analysis
            .security_tests
            .iter()
            .filter(|t| t.source_node_id == task)
            .count()
    };
    assert_eq!(count("Task_Login"), 5);
    assert_eq!(count("Task_Balance"), 3);
    assert_eq!(count("Task_Transfer"), 3);
    assert_eq!(count("Task_Token"), 0);
    assert_eq!(analysis.summary.total_security_tests, 11);
}

#[test]
fn test_one_assessment_point_per_category() {
    let analysis = banking_analysis();
    let expected: usize = analysis
        .endpoints
        .iter()
        .map(|e| e.risk.owasp_categories.len())
        .sum();
    assert_eq!(analysis.security_assessment_points.len(), expected);
    assert_eq!(expected, 5);

    let points = assessment_points(&analysis.endpoints);
    assert_eq!(points, analysis.security_assessment_points);

    let login = points
        .iter()
        .find(|p| p.process_step == "Login via POST /auth/login")
        .unwrap();
    assert_eq!(login.operation, "POST /auth/login");
    assert_eq!(login.owasp_category, OwaspCategory::A07);
    assert_eq!(login.description, "Security testing required for Login via POST /auth/login");
    assert_eq!(login.test_vectors.len(), 4);
    assert_eq!(login.mitigations.len(), 4);
    assert!(login.id.starts_with("asp_"));

    let ids: BTreeSet<&str> = points.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids.len(), points.len());
}
