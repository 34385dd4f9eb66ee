use crate::analysis::{BusinessLogicAnalysis, WorkflowPattern};
use crate::endpoint::HttpMethod;
use crate::process::ProcessGraph;
use crate::risk::{ClassifiedEndpoint, DataSensitivity, OwaspCategory, RiskLevel};
use crate::synth::{SecurityAssessmentPoint, TestCase};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Everything derived from one BPMN process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessAnalysis {
    pub file_path: String,
    pub process_id: String,
    pub process_name: String,
    /// The parsed process itself: nodes with their positions, flows, lanes,
    /// pool and data objects.
    pub bpmn_structure: ProcessGraph,
    pub endpoints: Vec<ClassifiedEndpoint>,
    pub business_analysis: BusinessLogicAnalysis,
    pub security_tests: Vec<TestCase>,
    pub security_assessment_points: Vec<SecurityAssessmentPoint>,
    pub summary: ProcessSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSummary {
    pub total_tasks: usize,
    pub total_gateways: usize,
    pub total_events: usize,
    pub total_flows: usize,
    pub dangling_flows: usize,
    pub total_api_endpoints: usize,
    pub risk_distribution: BTreeMap<RiskLevel, usize>,
    pub owasp_coverage: BTreeMap<OwaspCategory, usize>,
    pub critical_operations_count: usize,
    pub total_security_tests: usize,
    pub auth_required_endpoints: usize,
    pub high_sensitivity_endpoints: usize,
    pub workflow_pattern: WorkflowPattern,
    pub compliance_requirements: BTreeSet<String>,
}

impl ProcessSummary {
    pub fn new(
        graph: &ProcessGraph,
        endpoints: &[ClassifiedEndpoint],
        analysis: &BusinessLogicAnalysis,
        tests: &[TestCase],
    ) -> Self {
        Self {
            total_tasks: graph.tasks().count(),
            total_gateways: graph.gateway_count(),
            total_events: graph.event_count(),
            total_flows: graph.flows.len(),
            dangling_flows: graph.dangling_flows().len(),
            total_api_endpoints: endpoints.len(),
            risk_distribution: risk_distribution(endpoints),
            owasp_coverage: owasp_coverage(endpoints),
            critical_operations_count: analysis.critical_operations.len(),
            total_security_tests: tests.len(),
            auth_required_endpoints: endpoints.iter().filter(|e| e.risk.requires_auth).count(),
            high_sensitivity_endpoints: endpoints
                .iter()
                .filter(|e| e.risk.data_sensitivity == DataSensitivity::High)
                .count(),
            workflow_pattern: analysis.workflow_pattern,
            compliance_requirements: endpoints
                .iter()
                .flat_map(|e| e.risk.compliance_requirements.iter().cloned())
                .collect(),
        }
    }
}

fn risk_distribution<'a>(
    endpoints: impl IntoIterator<Item = &'a ClassifiedEndpoint>,
) -> BTreeMap<RiskLevel, usize> {
    let mut distribution = BTreeMap::new();
    for endpoint in endpoints {
        *distribution.entry(endpoint.risk.risk_level).or_insert(0) += 1;
    }
    distribution
}

fn owasp_coverage<'a>(
    endpoints: impl IntoIterator<Item = &'a ClassifiedEndpoint>,
) -> BTreeMap<OwaspCategory, usize> {
    let mut coverage = BTreeMap::new();
    for endpoint in endpoints {
        for category in &endpoint.risk.owasp_categories {
            *coverage.entry(*category).or_insert(0) += 1;
        }
    }
    coverage
}

/// A file that could not be analyzed. The batch carries on without it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiagnostic {
    pub file_path: String,
    pub message: String,
}

/// Ratios above/below which the batch summary emits a recommendation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationThresholds {
    /// Fires when high+critical endpoints exceed this share of the total.
    pub critical_ratio: f64,
    /// Fires when auth-requiring endpoints fall below this share of the total.
    pub auth_ratio: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            critical_ratio: 0.3,
            auth_ratio: 0.5,
        }
    }
}

pub const CRITICAL_RATIO_RECOMMENDATION: &str =
    "High percentage of critical endpoints detected. Consider implementing additional security controls.";
pub const AUTH_COVERAGE_RECOMMENDATION: &str =
    "Consider implementing authentication for more endpoints to improve security posture.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub files_processed: usize,
    pub files_failed: usize,
    pub total_processes: usize,
    pub total_api_endpoints: usize,
    pub method_distribution: BTreeMap<HttpMethod, usize>,
    pub auth_required_percentage: f64,
    pub owasp_coverage: BTreeMap<OwaspCategory, usize>,
    pub risk_distribution: BTreeMap<RiskLevel, usize>,
    pub total_security_tests: usize,
    /// High and critical endpoints.
    pub total_critical_endpoints: usize,
    pub recommendations: Vec<String>,
}

impl BatchSummary {
    pub fn new(
        analyses: &[ProcessAnalysis],
        files_processed: usize,
        files_failed: usize,
        thresholds: RecommendationThresholds,
    ) -> Self {
        let endpoints: Vec<&ClassifiedEndpoint> =
            analyses.iter().flat_map(|a| a.endpoints.iter()).collect();
        let total = endpoints.len();

        let mut method_distribution = BTreeMap::new();
        for endpoint in &endpoints {
            *method_distribution.entry(endpoint.method).or_insert(0) += 1;
        }
        let auth = endpoints.iter().filter(|e| e.risk.requires_auth).count();
        let critical = endpoints
            .iter()
            .filter(|e| e.risk.risk_level.is_elevated())
            .count();

        Self {
            files_processed,
            files_failed,
            total_processes: analyses.len(),
            total_api_endpoints: total,
            method_distribution,
            auth_required_percentage: percentage(auth, total),
            owasp_coverage: owasp_coverage(endpoints.iter().copied()),
            risk_distribution: risk_distribution(endpoints.iter().copied()),
            total_security_tests: analyses.iter().map(|a| a.security_tests.len()).sum(),
            total_critical_endpoints: critical,
            recommendations: recommendations(&endpoints, thresholds),
        }
    }
}

/// Share of `part` in `total` as a percentage with two decimals; 0 for an empty total.
fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 10_000.0).round() / 100.0
}

pub fn recommendations(
    endpoints: &[&ClassifiedEndpoint],
    thresholds: RecommendationThresholds,
) -> Vec<String> {
    let total = endpoints.len() as f64;
    let critical = endpoints
        .iter()
        .filter(|e| e.risk.risk_level.is_elevated())
        .count() as f64;
    let auth = endpoints.iter().filter(|e| e.risk.requires_auth).count() as f64;

    let mut out = Vec::new();
    if critical > total * thresholds.critical_ratio {
        out.push(CRITICAL_RATIO_RECOMMENDATION.to_string());
    }
    if auth < total * thresholds.auth_ratio {
        out.push(AUTH_COVERAGE_RECOMMENDATION.to_string());
    }

    let exposed: BTreeSet<String> = endpoints
        .iter()
        .filter(|e| e.risk.data_sensitivity == DataSensitivity::High && !e.risk.requires_auth)
        .map(|e| e.signature())
        .collect();
    if !exposed.is_empty() {
        out.push(format!(
            "{} high-sensitivity endpoint(s) do not require authentication: {}",
            exposed.len(),
            exposed.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }
    out
}

/// The complete result of a batch run. This is what the JSON output holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub files_analyzed: usize,
    pub analyses: Vec<ProcessAnalysis>,
    pub diagnostics: Vec<FileDiagnostic>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn new(
        files_analyzed: usize,
        analyses: Vec<ProcessAnalysis>,
        diagnostics: Vec<FileDiagnostic>,
        thresholds: RecommendationThresholds,
    ) -> Self {
        let failed = diagnostics.len();
        let summary = BatchSummary::new(
            &analyses,
            files_analyzed.saturating_sub(failed),
            failed,
            thresholds,
        );
        Self {
            files_analyzed,
            analyses,
            diagnostics,
            summary,
        }
    }

    pub fn total_endpoints(&self) -> usize {
        self.summary.total_api_endpoints
    }
}

/// Whether a batch produced any endpoints at all.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Findings(BatchReport),
    NothingFound(BatchReport),
}

impl BatchOutcome {
    pub fn from_report(report: BatchReport) -> Self {
        if report.total_endpoints() > 0 {
            BatchOutcome::Findings(report)
        } else {
            BatchOutcome::NothingFound(report)
        }
    }

    pub fn report(&self) -> &BatchReport {
        match self {
            BatchOutcome::Findings(report) | BatchOutcome::NothingFound(report) => report,
        }
    }

    pub fn into_report(self) -> BatchReport {
        match self {
            BatchOutcome::Findings(report) | BatchOutcome::NothingFound(report) => report,
        }
    }

    pub fn has_findings(&self) -> bool {
        matches!(self, BatchOutcome::Findings(_))
    }
}
