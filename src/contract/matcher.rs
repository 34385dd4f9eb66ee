use super::document::ApiContract;
use crate::endpoint::{ApiOperation, path_placeholders};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

static REPEATED_SLASHES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/{2,}").expect("slash pattern is valid"));
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^{}]*\}").expect("placeholder pattern is valid"));

/// Collapses repeated `/` and strips the leading one. Idempotent.
pub fn normalize_path(path: &str) -> String {
    let collapsed = REPEATED_SLASHES.replace_all(path.trim(), "/");
    collapsed
        .strip_prefix('/')
        .unwrap_or(collapsed.as_ref())
        .to_string()
}

/// A normalized path compiled into a full-match regex, with every `{...}`
/// placeholder standing for one path segment.
#[derive(Debug, Clone)]
pub struct PathPattern {
    normalized: String,
    regex: Regex,
}

impl PathPattern {
    pub fn compile(path: &str) -> Result<Self, regex::Error> {
        let normalized = normalize_path(path);
        let mut pattern = String::from("^");
        let mut last = 0;
        for placeholder in PLACEHOLDER.find_iter(&normalized) {
            pattern.push_str(&regex::escape(&normalized[last..placeholder.start()]));
            pattern.push_str("[^/]+");
            last = placeholder.end();
        }
        pattern.push_str(&regex::escape(&normalized[last..]));
        pattern.push('$');

        Ok(Self {
            regex: Regex::new(&pattern)?,
            normalized,
        })
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// The normalized path with every placeholder name erased, so
    /// `accounts/{id}` and `accounts/{accountId}` share a shape.
    pub fn shape(&self) -> String {
        PLACEHOLDER.replace_all(&self.normalized, "{}").into_owned()
    }

    /// True when either side's pattern fully matches the other's normalized text.
    pub fn matches(&self, other: &PathPattern) -> bool {
        self.regex.is_match(&other.normalized) || other.regex.is_match(&self.normalized)
    }
}

/// A task operation resolved against the contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractMatch {
    pub operation: ApiOperation,
    pub contract_path: String,
    pub description: String,
    /// The contract's parameters, or the inferred placeholders when the
    /// contract declares none.
    pub parameters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_schema: Option<Value>,
}

/// Resolves operations against a contract. Template patterns are compiled
/// once, in lexicographic template order.
pub struct ContractMatcher {
    contract: ApiContract,
    templates: Vec<(String, PathPattern)>,
}

impl ContractMatcher {
    pub fn new(contract: ApiContract) -> Self {
        let templates = contract
            .templates()
            .filter_map(|template| match PathPattern::compile(template) {
                Ok(pattern) => Some((template.to_string(), pattern)),
                Err(e) => {
                    warn!(template, error = %e, "Skipping contract template");
                    None
                }
            })
            .collect();
        Self {
            contract,
            templates,
        }
    }

    pub fn contract(&self) -> &ApiContract {
        &self.contract
    }

    /// Finds the contract template and verb backing `operation`.
    ///
    /// Candidates are tried in three tiers: exact normalized text, then the
    /// same shape with placeholder names ignored, then any placeholder match.
    /// Within a tier the first template in lexicographic order declaring the
    /// verb wins.
    pub fn resolve(&self, operation: &ApiOperation) -> Option<ContractMatch> {
        let extracted = match PathPattern::compile(&operation.path_template) {
            Ok(pattern) => pattern,
            Err(e) => {
                debug!(path = %operation.path_template, error = %e, "Unusable extracted path");
                return None;
            }
        };

        let shape = extracted.shape();
        let tier = |pattern: &PathPattern| {
            if pattern.normalized() == extracted.normalized() {
                Some(0)
            } else if pattern.shape() == shape {
                Some(1)
            } else if pattern.matches(&extracted) {
                Some(2)
            } else {
                None
            }
        };
        let candidates = self
            .templates
            .iter()
            .filter_map(|(template, pattern)| tier(pattern).map(|t| (t, template)))
            .sorted_by_key(|(t, _)| *t);

        let found = candidates.into_iter().find_map(|(_, template)| {
            self.contract
                .operation(template, operation.method)
                .map(|spec| (template, spec))
        });

        let Some((template, spec)) = found else {
            debug!(
                node = %operation.source_node_id,
                operation = %operation.signature(),
                "No contract operation backs this task"
            );
            return None;
        };

        let parameters = if spec.parameters.is_empty() {
            path_placeholders(&operation.path_template)
        } else {
            spec.parameters.clone()
        };

        Some(ContractMatch {
            operation: operation.clone(),
            contract_path: template.clone(),
            description: spec.description.clone(),
            parameters,
            request_schema: spec.request_schema.clone(),
        })
    }

    pub fn resolve_all(&self, operations: &[ApiOperation]) -> Vec<ContractMatch> {
        operations.iter().filter_map(|op| self.resolve(op)).collect()
    }
}
