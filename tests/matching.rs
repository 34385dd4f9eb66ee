//! Tests for extracting HTTP calls from task labels and resolving them against a contract.
mod common;
use common::*;
use kensa::contract::normalize_path;
use kensa::endpoint::{extract_operations, parse_label};
use kensa::prelude::*;

fn banking_operations() -> Vec<ApiOperation> {
    let graph = ProcessParser::parse_first_process(BANKING_BPMN).unwrap();
    extract_operations(&graph)
}

#[test]
fn test_extractor_finds_every_labelled_call() {
    let operations = banking_operations();
    let signatures: Vec<String> = operations.iter().map(ApiOperation::signature).collect();

    assert_eq!(
        signatures,
        vec![
            "POST /auth/login",
            "GET /accounts/{accountId}/balances",
            "POST /payments",
            "POST /auth/bank-token",
        ]
    );

    let balance = &operations[1];
    assert_eq!(balance.source_node_id, "Task_Balance");
    assert_eq!(balance.source_process_id, "BankingProcess");
    assert_eq!(balance.path_parameters, vec!["accountId".to_string()]);
    assert_eq!(balance.sequence_index, 2);
}

#[test]
fn test_extractor_ignores_events_and_unnamed_tasks() {
    let xml = r#"<definitions><process id="p">
        <startEvent id="s" name="GET /not-a-task" />
        <task id="t1" />
        <task id="t2" name="   " />
        <task id="t3" name="Review the order" />
        <userTask id="t4" name="delete /orders/{orderId}" />
    </process></definitions>"#;

    let graph = ProcessParser::parse_first_process(xml).unwrap();
    let operations = extract_operations(&graph);
    assert_eq!(operations.len(), 1);
    assert_eq!(operations[0].method, HttpMethod::Delete);
    assert_eq!(operations[0].path_template, "/orders/{orderId}");
}

#[test]
fn test_label_verb_priority_is_fixed() {
    // PUT comes before PATCH and DELETE in the priority order, wherever it appears.
    let (method, path) = parse_label("PATCH /a or PUT /b").unwrap();
    assert_eq!((method, path.as_str()), (HttpMethod::Put, "/b"));

    let (method, _) = parse_label("delete /x then post /y").unwrap();
    assert_eq!(method, HttpMethod::Post);
}

#[test]
fn test_contract_match_for_templated_path() {
    let matcher = ContractMatcher::new(banking_contract());
    let operations = banking_operations();

    let matched = matcher.resolve(&operations[1]).expect("balance call is in the contract");
    assert_eq!(matched.contract_path, "/accounts/{accountId}/balances");
    assert_eq!(matched.description, "Read account balances");
    // Operation-level parameters only; path-item parameters are ignored.
    assert_eq!(matched.parameters, vec!["accountId".to_string()]);
    assert!(matched.request_schema.is_none());
}

#[test]
fn test_operation_without_contract_entry_is_dropped() {
    let matcher = ContractMatcher::new(banking_contract());
    let operations = banking_operations();

    let token = operations
        .iter()
        .find(|op| op.source_node_id == "Task_Token")
        .unwrap();
    assert!(matcher.resolve(token).is_none());

    let resolved = matcher.resolve_all(&operations);
    let tasks: Vec<&str> = resolved
        .iter()
        .map(|m| m.operation.source_node_id.as_str())
        .collect();
    assert_eq!(tasks, vec!["Task_Login", "Task_Balance", "Task_Transfer"]);
}

#[test]
fn test_matching_requires_the_verb() {
    let matcher = ContractMatcher::new(contract_with(&[("/orders", "get")]));
    let graph = ProcessParser::parse_first_process(&linear_process(
        "p",
        &[("t1", "POST /orders"), ("t2", "GET /orders")],
    ))
    .unwrap();

    let resolved = matcher.resolve_all(&extract_operations(&graph));
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].operation.method, HttpMethod::Get);
}

#[test]
fn test_concrete_path_matches_template() {
    let matcher = ContractMatcher::new(contract_with(&[("/orders/{orderId}/items", "get")]));
    let graph = ProcessParser::parse_first_process(&linear_process(
        "p",
        &[("t1", "GET //orders/42/items"), ("t2", "GET /orders/42/items/7")],
    ))
    .unwrap();

    let resolved = matcher.resolve_all(&extract_operations(&graph));
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].contract_path, "/orders/{orderId}/items");
    // No declared parameters and no placeholders in the label.
    assert!(resolved[0].parameters.is_empty());
}

#[test]
fn test_exact_template_beats_placeholder_template() {
    let matcher = ContractMatcher::new(contract_with(&[
        ("/orders/{orderId}", "get"),
        ("/orders/latest", "get"),
    ]));
    let graph =
        ProcessParser::parse_first_process(&linear_process("p", &[("t1", "GET /orders/latest")]))
            .unwrap();

    let resolved = matcher.resolve_all(&extract_operations(&graph));
    assert_eq!(resolved[0].contract_path, "/orders/latest");
}

#[test]
fn test_placeholder_path_prefers_placeholder_template() {
    let matcher = ContractMatcher::new(contract_with(&[
        ("/accounts/{accountId}", "get"),
        ("/accounts/search", "get"),
    ]));
    let graph = ProcessParser::parse_first_process(&linear_process(
        "p",
        &[("t1", "Read account via GET /accounts/{id}")],
    ))
    .unwrap();

    let resolved = matcher.resolve_all(&extract_operations(&graph));
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].contract_path, "/accounts/{accountId}");
    assert_eq!(resolved[0].description, "get /accounts/{accountId}");
}

#[test]
fn test_concrete_path_still_reaches_placeholder_template() {
    let matcher = ContractMatcher::new(contract_with(&[("/accounts/{accountId}", "get")]));
    let graph =
        ProcessParser::parse_first_process(&linear_process("p", &[("t1", "GET /accounts/42")]))
            .unwrap();

    let resolved = matcher.resolve_all(&extract_operations(&graph));
    assert_eq!(resolved[0].contract_path, "/accounts/{accountId}");
}

#[test]
fn test_placeholders_fill_in_missing_parameters() {
    let matcher = ContractMatcher::new(contract_with(&[("/customers/{customerId}", "put")]));
    let graph = ProcessParser::parse_first_process(&linear_process(
        "p",
        &[("t1", "Update via PUT /customers/{id}")],
    ))
    .unwrap();

    let resolved = matcher.resolve_all(&extract_operations(&graph));
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].parameters, vec!["id".to_string()]);
    assert_eq!(resolved[0].description, "put /customers/{customerId}");
}

#[test]
fn test_empty_contract_matches_nothing() {
    let matcher = ContractMatcher::new(ApiContract::empty());
    assert!(matcher.resolve_all(&banking_operations()).is_empty());
}

#[test]
fn test_normalize_path_collapses_slashes() {
    assert_eq!(normalize_path("/a//b"), "a/b");
    assert_eq!(normalize_path("a/b"), "a/b");
    assert_eq!(normalize_path("  /a/b "), "a/b");
}

#[test]
fn test_contract_loading_falls_back_to_empty() {
    let dir = tempfile::tempdir().unwrap();

    let missing = ApiContract::load_or_empty(&dir.path().join("missing.json"));
    assert!(missing.is_empty());

    let broken = write_fixture(dir.path(), "broken.json", "{ nope");
    assert!(ApiContract::load_or_empty(&broken).is_empty());
    assert!(matches!(
        ApiContract::from_file(&broken),
        Err(ContractError::Json(_))
    ));

    let good = write_fixture(dir.path(), "openapi.json", BANKING_CONTRACT);
    let contract = ApiContract::load_or_empty(&good);
    assert_eq!(contract.len(), 4);
    assert_eq!(
        contract.templates().collect::<Vec<_>>(),
        vec![
            "/accounts/{accountId}/balances",
            "/auth/login",
            "/customers/{customerId}/profile",
            "/payments",
        ]
    );
}
