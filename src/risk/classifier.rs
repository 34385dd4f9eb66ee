use super::rules::{COMPLIANCE_KEYWORDS, RiskRule, SENSITIVITY_KEYWORDS, default_rules};
use crate::contract::ContractMatch;
use crate::endpoint::HttpMethod;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

/// Qualitative risk tier, ordered `Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    pub fn from_score(score: u32) -> Self {
        match score {
            8.. => RiskLevel::Critical,
            5..=7 => RiskLevel::High,
            3..=4 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }

    /// High or critical.
    pub fn is_elevated(&self) -> bool {
        *self >= RiskLevel::High
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSensitivity {
    Low,
    Medium,
    High,
}

impl fmt::Display for DataSensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataSensitivity::Low => "low",
            DataSensitivity::Medium => "medium",
            DataSensitivity::High => "high",
        })
    }
}

/// OWASP Top 10 (2021) categories. Serialized by their full label; the short
/// code is accepted when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OwaspCategory {
    #[serde(rename = "A01:2021 - Broken Access Control", alias = "A01")]
    A01,
    #[serde(rename = "A02:2021 - Cryptographic Failures", alias = "A02")]
    A02,
    #[serde(rename = "A03:2021 - Injection", alias = "A03")]
    A03,
    #[serde(rename = "A04:2021 - Insecure Design", alias = "A04")]
    A04,
    #[serde(rename = "A05:2021 - Security Misconfiguration", alias = "A05")]
    A05,
    #[serde(rename = "A06:2021 - Vulnerable and Outdated Components", alias = "A06")]
    A06,
    #[serde(
        rename = "A07:2021 - Identification and Authentication Failures",
        alias = "A07"
    )]
    A07,
    #[serde(rename = "A08:2021 - Software and Data Integrity Failures", alias = "A08")]
    A08,
    #[serde(
        rename = "A09:2021 - Security Logging and Monitoring Failures",
        alias = "A09"
    )]
    A09,
    #[serde(rename = "A10:2021 - Server-Side Request Forgery", alias = "A10")]
    A10,
}

impl OwaspCategory {
    pub fn code(&self) -> &'static str {
        match self {
            OwaspCategory::A01 => "A01",
            OwaspCategory::A02 => "A02",
            OwaspCategory::A03 => "A03",
            OwaspCategory::A04 => "A04",
            OwaspCategory::A05 => "A05",
            OwaspCategory::A06 => "A06",
            OwaspCategory::A07 => "A07",
            OwaspCategory::A08 => "A08",
            OwaspCategory::A09 => "A09",
            OwaspCategory::A10 => "A10",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            OwaspCategory::A01 => "Broken Access Control",
            OwaspCategory::A02 => "Cryptographic Failures",
            OwaspCategory::A03 => "Injection",
            OwaspCategory::A04 => "Insecure Design",
            OwaspCategory::A05 => "Security Misconfiguration",
            OwaspCategory::A06 => "Vulnerable and Outdated Components",
            OwaspCategory::A07 => "Identification and Authentication Failures",
            OwaspCategory::A08 => "Software and Data Integrity Failures",
            OwaspCategory::A09 => "Security Logging and Monitoring Failures",
            OwaspCategory::A10 => "Server-Side Request Forgery",
        }
    }

    /// `"A01:2021 - Broken Access Control"`, identical to the serialized form.
    pub fn label(&self) -> String {
        format!("{}:2021 - {}", self.code(), self.title())
    }
}

impl fmt::Display for OwaspCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:2021 - {}", self.code(), self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub risk_level: RiskLevel,
    pub business_criticality: RiskLevel,
    pub score: u32,
    pub owasp_categories: BTreeSet<OwaspCategory>,
    pub requires_auth: bool,
    pub data_sensitivity: DataSensitivity,
    pub compliance_requirements: BTreeSet<String>,
}

/// Keyword scoring over a task name and its API path.
#[derive(Debug, Clone)]
pub struct RiskClassifier {
    rules: Vec<RiskRule>,
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self {
            rules: default_rules(),
        }
    }
}

impl RiskClassifier {
    pub fn with_rules(rules: Vec<RiskRule>) -> Self {
        Self { rules }
    }

    /// Appends rules after the built-in table.
    pub fn extend_rules(mut self, rules: impl IntoIterator<Item = RiskRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn rules(&self) -> &[RiskRule] {
        &self.rules
    }

    pub fn classify(&self, name: &str, path: &str) -> RiskProfile {
        let name = name.to_lowercase();
        let path = path.to_lowercase();

        let mut score: u32 = 0;
        let mut owasp_categories = BTreeSet::new();
        let mut requires_auth = false;
        for rule in self.rules.iter().filter(|r| r.fires(&name, &path)) {
            score = score.saturating_add(rule.increment);
            owasp_categories.extend(rule.owasp.iter().copied());
            requires_auth |= rule.requires_auth;
        }

        let risk_level = RiskLevel::from_score(score);
        RiskProfile {
            risk_level,
            business_criticality: risk_level,
            score,
            owasp_categories,
            requires_auth,
            data_sensitivity: data_sensitivity(&path),
            compliance_requirements: compliance_requirements(&path),
        }
    }
}

static DEFAULT_CLASSIFIER: Lazy<RiskClassifier> = Lazy::new(RiskClassifier::default);

/// Classifies with the built-in rule table.
pub fn classify(name: &str, path: &str) -> RiskProfile {
    DEFAULT_CLASSIFIER.classify(name, path)
}

/// Path-only lookup; `path` is expected lower-cased.
pub fn data_sensitivity(path: &str) -> DataSensitivity {
    SENSITIVITY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| path.contains(*kw)))
        .map(|(tier, _)| *tier)
        .unwrap_or(DataSensitivity::Low)
}

/// Path-only lookup; `path` is expected lower-cased.
pub fn compliance_requirements(path: &str) -> BTreeSet<String> {
    COMPLIANCE_KEYWORDS
        .iter()
        .filter(|(keywords, _)| keywords.iter().any(|kw| path.contains(*kw)))
        .flat_map(|(_, tags)| tags.iter().map(|t| t.to_string()))
        .collect()
}

/// A contract-backed operation together with its risk profile. This is the
/// `endpoints[]` record of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedEndpoint {
    pub method: HttpMethod,
    /// The path as written in the task label.
    pub path: String,
    pub contract_path: String,
    pub task_id: String,
    pub task_name: String,
    pub process_id: String,
    pub sequence_index: usize,
    pub description: String,
    pub parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_schema: Option<Value>,
    #[serde(flatten)]
    pub risk: RiskProfile,
}

impl ClassifiedEndpoint {
    pub fn new(matched: ContractMatch, classifier: &RiskClassifier) -> Self {
        let ContractMatch {
            operation,
            contract_path,
            description,
            parameters,
            request_schema,
        } = matched;
        let risk = classifier.classify(&operation.source_node_name, &operation.path_template);
        Self {
            method: operation.method,
            path: operation.path_template,
            contract_path,
            task_id: operation.source_node_id,
            task_name: operation.source_node_name,
            process_id: operation.source_process_id,
            sequence_index: operation.sequence_index,
            description,
            parameters,
            request_schema,
            risk,
        }
    }

    /// `"METHOD path"`.
    pub fn signature(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}
