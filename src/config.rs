use crate::error::ConfigError;
use crate::report::RecommendationThresholds;
use crate::risk::RiskRule;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Knobs for a batch run. Every field has a default, so a config file only
/// needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Extension (without the dot) of the process files picked up from directories.
    pub file_extension: String,
    /// Descend into subdirectories when an input is a directory.
    pub recursive: bool,
    pub critical_ratio_threshold: f64,
    pub auth_ratio_threshold: f64,
    /// Applied after the built-in scoring table.
    pub extra_risk_rules: Vec<RiskRule>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        let thresholds = RecommendationThresholds::default();
        Self {
            file_extension: "bpmn".to_string(),
            recursive: true,
            critical_ratio_threshold: thresholds.critical_ratio,
            auth_ratio_threshold: thresholds.auth_ratio,
            extra_risk_rules: Vec::new(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.file_extension.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "file_extension".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        for (field, value) in [
            ("critical_ratio_threshold", self.critical_ratio_threshold),
            ("auth_ratio_threshold", self.auth_ratio_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field: field.to_string(),
                    message: format!("expected a ratio between 0 and 1, got {}", value),
                });
            }
        }
        for rule in &self.extra_risk_rules {
            if rule.keywords.is_empty() {
                return Err(ConfigError::Invalid {
                    field: "extra_risk_rules".to_string(),
                    message: format!("rule '{}' has no keywords", rule.name),
                });
            }
            // An empty keyword is a substring of every name.
            if rule.keywords.iter().any(|kw| kw.trim().is_empty()) {
                return Err(ConfigError::Invalid {
                    field: "extra_risk_rules".to_string(),
                    message: format!("rule '{}' has a blank keyword", rule.name),
                });
            }
        }
        Ok(())
    }

    pub fn thresholds(&self) -> RecommendationThresholds {
        RecommendationThresholds {
            critical_ratio: self.critical_ratio_threshold,
            auth_ratio: self.auth_ratio_threshold,
        }
    }

    /// The extension as it appears on disk, without a leading dot.
    pub fn extension(&self) -> &str {
        self.file_extension.trim().trim_start_matches('.')
    }
}
