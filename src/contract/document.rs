use crate::endpoint::HttpMethod;
use crate::error::ContractError;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// A single verb entry under a contract path template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationSpec {
    pub description: String,
    /// Declared parameter names, in declaration order.
    pub parameters: Vec<String>,
    /// `requestBody.content."application/json".schema`, when declared.
    pub request_schema: Option<Value>,
}

/// The subset of an OpenAPI document the matcher needs: path templates and
/// the verbs declared under each of them.
///
/// Templates are kept sorted so that matching is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiContract {
    paths: BTreeMap<String, BTreeMap<HttpMethod, OperationSpec>>,
}

impl ApiContract {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ContractError> {
        let document: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&document))
    }

    pub fn from_file(path: &Path) -> Result<Self, ContractError> {
        let content = std::fs::read_to_string(path).map_err(|source| ContractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Loads the contract, falling back to an empty one when the file is missing
    /// or unreadable. With an empty contract every operation stays unmatched.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(contract) => {
                info!(
                    path = %path.display(),
                    templates = contract.len(),
                    "Loaded API contract"
                );
                contract
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Using an empty API contract");
                Self::empty()
            }
        }
    }

    fn from_value(document: &Value) -> Self {
        let mut paths = BTreeMap::new();
        let Some(items) = document.get("paths").and_then(Value::as_object) else {
            warn!("Contract document has no 'paths' object");
            return Self { paths };
        };

        for (template, item) in items {
            let Some(item) = item.as_object() else {
                warn!(template = %template, "Skipping path item that is not an object");
                continue;
            };
            let mut operations = BTreeMap::new();
            for (key, operation) in item {
                // `parameters`, `summary`, `servers` and friends live next to the verbs.
                let Some(method) = HttpMethod::from_contract_key(key) else {
                    continue;
                };
                match parse_operation(operation) {
                    Some(spec) => {
                        operations.insert(method, spec);
                    }
                    None => warn!(
                        template = %template,
                        verb = key.as_str(),
                        "Skipping malformed operation object"
                    ),
                }
            }
            paths.insert(template.clone(), operations);
        }
        Self { paths }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Path templates in lexicographic order.
    pub fn templates(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    pub fn operation(&self, template: &str, method: HttpMethod) -> Option<&OperationSpec> {
        self.paths.get(template).and_then(|ops| ops.get(&method))
    }
}

fn parse_operation(operation: &Value) -> Option<OperationSpec> {
    let operation = operation.as_object()?;

    let description = operation
        .get("description")
        .or_else(|| operation.get("summary"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let parameters = operation
        .get("parameters")
        .and_then(Value::as_array)
        .map(|params| {
            params
                .iter()
                .filter_map(|p| p.get("name").and_then(Value::as_str))
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let request_schema = operation
        .get("requestBody")
        .and_then(|body| body.get("content"))
        .and_then(|content| content.get("application/json"))
        .and_then(|media| media.get("schema"))
        .cloned();

    Some(OperationSpec {
        description,
        parameters,
        request_schema,
    })
}
