use crate::process::ProcessGraph;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Priority order used when a label mentions more than one verb.
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// The key under which a contract path item declares this verb.
    pub fn contract_key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
        }
    }

    pub fn from_contract_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.contract_key() == key)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP call named inside a task label, e.g. `"Check balance via GET /accounts/{id}"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiOperation {
    pub method: HttpMethod,
    pub path_template: String,
    /// `{name}` placeholders found in the path, in order of appearance.
    pub path_parameters: Vec<String>,
    pub source_node_id: String,
    pub source_node_name: String,
    pub source_process_id: String,
    /// Sequence-flow distance from a root node. Only used to order output.
    pub sequence_index: usize,
}

impl ApiOperation {
    /// `"METHOD path"` as rendered in analyses and reports.
    pub fn signature(&self) -> String {
        format!("{} {}", self.method, self.path_template)
    }
}

static VERB_PATTERNS: Lazy<Vec<(HttpMethod, Regex)>> = Lazy::new(|| {
    HttpMethod::ALL
        .into_iter()
        .map(|method| {
            let pattern = format!(r"(?i)\b{}\s+([/\w\-\{{\}}\.]+)", method.as_str());
            (method, Regex::new(&pattern).expect("verb pattern is valid"))
        })
        .collect()
});

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}/]+)\}").expect("placeholder pattern is valid"));

/// Finds the first verb (in [`HttpMethod::ALL`] order) followed by a path token.
pub fn parse_label(label: &str) -> Option<(HttpMethod, String)> {
    VERB_PATTERNS.iter().find_map(|(method, regex)| {
        regex
            .captures(label)
            .and_then(|caps| caps.get(1))
            .map(|path| (*method, path.as_str().to_string()))
    })
}

/// Names of the `{...}` placeholders in a path template.
pub fn path_placeholders(path: &str) -> Vec<String> {
    PLACEHOLDER
        .captures_iter(path)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Scans every named task of a graph for an embedded HTTP call.
///
/// Tasks without a name, and non-task nodes, never yield an operation.
pub fn extract_operations(graph: &ProcessGraph) -> Vec<ApiOperation> {
    let depths = graph.sequence_depths();

    graph
        .tasks()
        .filter(|node| !node.name.trim().is_empty())
        .filter_map(|node| {
            let Some((method, path)) = parse_label(&node.name) else {
                debug!(node = %node.id, name = %node.name, "Task label names no HTTP call");
                return None;
            };
            Some(ApiOperation {
                path_parameters: path_placeholders(&path),
                method,
                path_template: path,
                source_node_id: node.id.clone(),
                source_node_name: node.name.clone(),
                source_process_id: graph.process_id.clone(),
                sequence_index: depths.get(&node.id).copied().unwrap_or_default(),
            })
        })
        .collect()
}
