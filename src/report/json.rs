use super::summary::BatchReport;
use crate::error::ReportError;
use std::path::Path;

/// Pretty-printed JSON, the source of truth every other format derives from.
pub fn to_json(report: &BatchReport) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

pub fn from_json(json: &str) -> Result<BatchReport, ReportError> {
    Ok(serde_json::from_str(json)?)
}

pub fn write_json(report: &BatchReport, path: &Path) -> Result<(), ReportError> {
    let json = to_json(report)?;
    super::write_output(path, &json)
}

pub fn read_json(path: &Path) -> Result<BatchReport, ReportError> {
    let content = std::fs::read_to_string(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    from_json(&content)
}
