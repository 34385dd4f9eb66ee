use super::summary::{BatchReport, ProcessAnalysis};
use crate::error::ReportError;
use crate::risk::RiskLevel;
use std::fmt::{self, Write};
use std::path::Path;

/// Renders the human-readable narrative of a report. Everything shown here is
/// also present in the JSON form.
pub fn render_markdown(report: &BatchReport) -> String {
    let mut output = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut output, report);
    output
}

pub fn write_markdown(report: &BatchReport, path: &Path) -> Result<(), ReportError> {
    super::write_output(path, &render_markdown(report))
}

fn risk_marker(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Critical | RiskLevel::High => "🔴",
        RiskLevel::Medium => "🟡",
        RiskLevel::Low => "🟢",
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn write_report(out: &mut String, report: &BatchReport) -> fmt::Result {
    let summary = &report.summary;

    writeln!(out, "# BPMN Security Analysis Report")?;
    writeln!(out)?;
    writeln!(out, "## Executive Summary")?;
    writeln!(out)?;
    writeln!(out, "- Files Analyzed: {}", report.files_analyzed)?;
    writeln!(out, "- Files Failed: {}", summary.files_failed)?;
    writeln!(out, "- Processes: {}", summary.total_processes)?;
    writeln!(out, "- API Endpoints Found: {}", summary.total_api_endpoints)?;
    writeln!(out, "- Security Tests Generated: {}", summary.total_security_tests)?;
    writeln!(out, "- Critical Endpoints: {}", summary.total_critical_endpoints)?;
    writeln!(
        out,
        "- Endpoints Requiring Authentication: {:.2}%",
        summary.auth_required_percentage
    )?;

    if !summary.method_distribution.is_empty() {
        let methods: Vec<String> = summary
            .method_distribution
            .iter()
            .map(|(method, count)| format!("{} {}", method, count))
            .collect();
        writeln!(out, "- Methods: {}", methods.join(", "))?;
    }

    writeln!(out)?;
    writeln!(out, "## Process Analysis")?;
    if report.analyses.is_empty() {
        writeln!(out)?;
        writeln!(out, "No processes were analyzed.")?;
    }
    for (i, analysis) in report.analyses.iter().enumerate() {
        write_process(out, i + 1, analysis)?;
    }

    writeln!(out)?;
    writeln!(out, "## Risk Distribution")?;
    writeln!(out)?;
    writeln!(out, "| Risk Level | Endpoints |")?;
    writeln!(out, "|------------|-----------|")?;
    for level in RiskLevel::ALL.iter().rev() {
        let count = summary.risk_distribution.get(level).copied().unwrap_or(0);
        writeln!(out, "| {} | {} |", capitalize(level.as_str()), count)?;
    }

    writeln!(out)?;
    writeln!(out, "## OWASP Top 10 2021 Coverage")?;
    writeln!(out)?;
    if summary.owasp_coverage.is_empty() {
        writeln!(out, "No OWASP categories were triggered.")?;
    } else {
        writeln!(out, "| Category | Endpoints |")?;
        writeln!(out, "|----------|-----------|")?;
        for (category, count) in &summary.owasp_coverage {
            writeln!(out, "| {} | {} |", category, count)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "## Security Recommendations")?;
    writeln!(out)?;
    if summary.recommendations.is_empty() {
        writeln!(out, "No recommendations.")?;
    }
    for recommendation in &summary.recommendations {
        writeln!(out, "- {}", recommendation)?;
    }

    if !report.diagnostics.is_empty() {
        writeln!(out)?;
        writeln!(out, "## Diagnostics")?;
        writeln!(out)?;
        for diagnostic in &report.diagnostics {
            writeln!(out, "- `{}`: {}", diagnostic.file_path, diagnostic.message)?;
        }
    }
    Ok(())
}

fn write_process(out: &mut String, index: usize, analysis: &ProcessAnalysis) -> fmt::Result {
    let title = if analysis.process_name.is_empty() {
        &analysis.process_id
    } else {
        &analysis.process_name
    };
    writeln!(out)?;
    writeln!(out, "### Process {}: {} (`{}`)", index, title, analysis.file_path)?;
    writeln!(out)?;
    writeln!(
        out,
        "Workflow pattern: `{}`",
        analysis.business_analysis.workflow_pattern
    )?;

    let mut endpoints: Vec<_> = analysis.endpoints.iter().collect();
    endpoints.sort_by_key(|e| e.sequence_index);
    if !endpoints.is_empty() {
        writeln!(out)?;
        writeln!(out, "#### API Endpoints")?;
        writeln!(out)?;
        for endpoint in endpoints {
            writeln!(
                out,
                "- {} [{}] {} - {} ({})",
                risk_marker(endpoint.risk.risk_level),
                endpoint.method,
                endpoint.path,
                capitalize(endpoint.risk.risk_level.as_str()),
                endpoint.task_name
            )?;
        }
    }

    if !analysis.security_tests.is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "#### Security Tests Generated: {}",
            analysis.security_tests.len()
        )?;
        writeln!(out)?;
        for test in &analysis.security_tests {
            writeln!(out, "- `{}` {} ({})", test.id, test.name, test.test_type)?;
        }
    }
    Ok(())
}
