use super::payload::payload_from_schema;
use crate::endpoint::HttpMethod;
use crate::risk::{ClassifiedEndpoint, DataSensitivity, OwaspCategory};
use itertools::Itertools;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    HappyPath,
    Security,
    Negative,
    Performance,
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TestType::HappyPath => "happy_path",
            TestType::Security => "security",
            TestType::Negative => "negative",
            TestType::Performance => "performance",
        })
    }
}

/// The template a test case was built from. Each kind owns one id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestKind {
    HappyPath,
    AuthInvalid,
    AuthMissing,
    Validation,
    AccessControl,
    Injection,
    AuthFail,
    RateLimit,
    DataValidation,
}

impl TestKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            TestKind::HappyPath => "happy_path",
            TestKind::AuthInvalid => "auth_invalid",
            TestKind::AuthMissing => "auth_missing",
            TestKind::Validation => "validation",
            TestKind::AccessControl => "access_control",
            TestKind::Injection => "injection",
            TestKind::AuthFail => "auth_fail",
            TestKind::RateLimit => "rate_limit",
            TestKind::DataValidation => "data_validation",
        }
    }

    pub fn test_type(&self) -> TestType {
        match self {
            TestKind::HappyPath => TestType::HappyPath,
            TestKind::AuthMissing => TestType::Negative,
            TestKind::RateLimit => TestType::Performance,
            _ => TestType::Security,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            TestKind::HappyPath => "Happy Path",
            TestKind::AuthInvalid => "Invalid Authentication Token",
            TestKind::AuthMissing => "Missing Authentication",
            TestKind::Validation => "Input Validation - SQL Injection",
            TestKind::AccessControl => "Broken Access Control - Unauthorized Role",
            TestKind::Injection => "Injection Attack - SQL Injection",
            TestKind::AuthFail => "Authentication Failure - Weak Credential",
            TestKind::RateLimit => "High Risk - Rate Limiting Probe",
            TestKind::DataValidation => "High Sensitivity Data - XSS Input Validation",
        }
    }

    pub fn expected_status(&self) -> u16 {
        match self {
            TestKind::HappyPath => 200,
            TestKind::AuthInvalid | TestKind::AuthMissing | TestKind::AuthFail => 401,
            TestKind::AccessControl => 403,
            TestKind::RateLimit => 429,
            TestKind::Validation | TestKind::Injection | TestKind::DataValidation => 400,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedOutcome {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// A generated test description. Nothing here is ever executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub name: String,
    pub test_type: TestType,
    pub kind: TestKind,
    pub method: HttpMethod,
    pub path: String,
    pub input: Value,
    pub expected: ExpectedOutcome,
    pub security_vectors: Vec<String>,
    pub business_scenario: String,
    pub source_node_id: String,
}

/// First eight hex digits of the MD5 of `input`.
pub fn short_digest(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(8);
    hex
}

/// `<kind prefix>_<digest of "path_METHOD">`. Stable across runs.
pub fn test_id(kind: TestKind, path: &str, method: HttpMethod) -> String {
    format!("{}_{}", kind.prefix(), short_digest(&format!("{}_{}", path, method)))
}

const SQL_INJECTION: &str = "'; DROP TABLE users; --";
const XSS_PAYLOAD: &str = "<script>alert('xss')</script>";

fn build(
    endpoint: &ClassifiedEndpoint,
    kind: TestKind,
    input: Value,
    vectors: Vec<String>,
) -> TestCase {
    let name = match kind {
        TestKind::HappyPath => format!("{} - {}", kind.title(), endpoint.task_name),
        _ => kind.title().to_string(),
    };
    TestCase {
        id: test_id(kind, &endpoint.path, endpoint.method),
        name,
        test_type: kind.test_type(),
        kind,
        method: endpoint.method,
        path: endpoint.path.clone(),
        input,
        expected: ExpectedOutcome {
            status: kind.expected_status(),
            body: None,
        },
        security_vectors: vectors,
        business_scenario: endpoint.task_name.clone(),
        source_node_id: endpoint.task_id.clone(),
    }
}

/// Every test case for one endpoint, in template order.
pub fn synthesize(endpoint: &ClassifiedEndpoint) -> Vec<TestCase> {
    let mut cases = Vec::new();
    let auth_label = OwaspCategory::A07.label();
    let injection_label = OwaspCategory::A03.label();

    cases.push(build(
        endpoint,
        TestKind::HappyPath,
        payload_from_schema(endpoint.request_schema.as_ref()),
        Vec::new(),
    ));

    let task_name = endpoint.task_name.to_lowercase();
    if task_name.contains("auth") || task_name.contains("token") {
        cases.push(build(
            endpoint,
            TestKind::AuthInvalid,
            json!({ "headers": { "Authorization": "Bearer invalid_token" } }),
            vec![auth_label.clone()],
        ));
        cases.push(build(
            endpoint,
            TestKind::AuthMissing,
            json!({}),
            vec![auth_label.clone()],
        ));
    }

    cases.push(build(
        endpoint,
        TestKind::Validation,
        json!({ "query": SQL_INJECTION }),
        vec![injection_label.clone()],
    ));

    for category in &endpoint.risk.owasp_categories {
        let (kind, input) = match category {
            OwaspCategory::A01 => (
                TestKind::AccessControl,
                json!({ "headers": { "Authorization": "Bearer user_token" } }),
            ),
            OwaspCategory::A03 => (TestKind::Injection, json!({ "query": SQL_INJECTION })),
            OwaspCategory::A07 => (TestKind::AuthFail, json!({ "password": "123" })),
            _ => continue,
        };
        cases.push(build(endpoint, kind, input, vec![category.label()]));
    }

    if endpoint.risk.risk_level.is_elevated() {
        cases.push(build(
            endpoint,
            TestKind::RateLimit,
            json!({ "headers": { "Authorization": "Bearer valid_token" } }),
            vec!["Rate Limiting Bypass".to_string()],
        ));
        if endpoint.risk.data_sensitivity == DataSensitivity::High {
            cases.push(build(
                endpoint,
                TestKind::DataValidation,
                json!({ "personal_data": XSS_PAYLOAD }),
                vec!["XSS".to_string(), "Input Validation".to_string()],
            ));
        }
    }
    cases
}

/// Test cases for all endpoints of one process. An id seen before (the same
/// operation reached from two tasks) is kept only once, first occurrence wins.
pub fn synthesize_all(endpoints: &[ClassifiedEndpoint]) -> Vec<TestCase> {
    endpoints
        .iter()
        .flat_map(synthesize)
        .unique_by(|case| case.id.clone())
        .collect()
}
