use super::cases::short_digest;
use crate::risk::{ClassifiedEndpoint, OwaspCategory, RiskLevel};
use serde::{Deserialize, Serialize};

/// One (endpoint, OWASP category) pair that needs security review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityAssessmentPoint {
    pub id: String,
    pub process_step: String,
    /// `"METHOD path"`.
    pub operation: String,
    pub risk_level: RiskLevel,
    pub owasp_category: OwaspCategory,
    pub description: String,
    pub test_vectors: Vec<String>,
    pub mitigations: Vec<String>,
}

fn test_vectors(category: OwaspCategory) -> &'static [&'static str] {
    match category {
        OwaspCategory::A01 => &[
            "Test with insufficient privileges",
            "Test with expired token",
            "Test with manipulated JWT",
            "Test direct object references",
        ],
        OwaspCategory::A02 => &[
            "Check transport encryption on the endpoint",
            "Look for sensitive fields returned in clear text",
            "Test with downgraded TLS settings",
            "Inspect tokens for weak signing algorithms",
        ],
        OwaspCategory::A03 => &[
            "SQL injection payloads",
            "NoSQL injection payloads",
            "XSS payloads",
            "Command injection payloads",
        ],
        OwaspCategory::A07 => &[
            "Weak password attempts",
            "Brute force attacks",
            "Session hijacking",
            "Authentication bypass attempts",
        ],
        _ => &[],
    }
}

fn mitigations(category: OwaspCategory) -> &'static [&'static str] {
    match category {
        OwaspCategory::A01 => &[
            "Implement proper access controls",
            "Use role-based permissions",
            "Validate user permissions on each request",
            "Implement principle of least privilege",
        ],
        OwaspCategory::A02 => &[
            "Enforce TLS for all traffic",
            "Encrypt sensitive data at rest",
            "Use vetted algorithms and key sizes",
            "Never log card or account numbers",
        ],
        OwaspCategory::A03 => &[
            "Use parameterized queries",
            "Implement input validation",
            "Use output encoding",
            "Implement WAF protection",
        ],
        OwaspCategory::A07 => &[
            "Implement strong password policies",
            "Use multi-factor authentication",
            "Implement account lockout mechanisms",
            "Use secure session management",
        ],
        _ => &[],
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// One point per distinct category of each endpoint.
pub fn assessment_points(endpoints: &[ClassifiedEndpoint]) -> Vec<SecurityAssessmentPoint> {
    endpoints
        .iter()
        .flat_map(|endpoint| {
            endpoint
                .risk
                .owasp_categories
                .iter()
                .map(move |&category| SecurityAssessmentPoint {
                    id: format!(
                        "asp_{}",
                        short_digest(&format!(
                            "{}_{}_{}",
                            endpoint.path,
                            endpoint.method,
                            category.label()
                        ))
                    ),
                    process_step: endpoint.task_name.clone(),
                    operation: endpoint.signature(),
                    risk_level: endpoint.risk.risk_level,
                    owasp_category: category,
                    description: format!("Security testing required for {}", endpoint.task_name),
                    test_vectors: to_strings(test_vectors(category)),
                    mitigations: to_strings(mitigations(category)),
                })
        })
        .collect()
}
