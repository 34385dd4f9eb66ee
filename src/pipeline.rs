use crate::analysis;
use crate::config::AnalyzerConfig;
use crate::contract::{ApiContract, ContractMatcher};
use crate::endpoint::extract_operations;
use crate::error::{DiscoveryError, ProcessParseError};
use crate::process::{ProcessGraph, ProcessParser};
use crate::report::{BatchOutcome, BatchReport, FileDiagnostic, ProcessAnalysis, ProcessSummary};
use crate::risk::{ClassifiedEndpoint, RiskClassifier, RiskRule};
use crate::synth::{assessment_points, synthesize_all};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

pub struct AnalyzerBuilder {
    contract: ApiContract,
    config: AnalyzerConfig,
    extra_rules: Vec<RiskRule>,
}

impl AnalyzerBuilder {
    pub fn new(contract: ApiContract) -> Self {
        Self {
            contract,
            config: AnalyzerConfig::default(),
            extra_rules: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    /// Adds a scoring rule on top of the built-in table and any rules from the config.
    pub fn with_risk_rule(mut self, rule: RiskRule) -> Self {
        self.extra_rules.push(rule);
        self
    }

    pub fn build(self) -> Analyzer {
        let classifier = RiskClassifier::default()
            .extend_rules(self.config.extra_risk_rules.iter().cloned())
            .extend_rules(self.extra_rules);
        Analyzer {
            matcher: ContractMatcher::new(self.contract),
            classifier,
            config: self.config,
        }
    }
}

/// Runs BPMN documents through extraction, contract matching, risk
/// classification and test synthesis. The contract is read-only for the
/// lifetime of the analyzer.
pub struct Analyzer {
    matcher: ContractMatcher,
    classifier: RiskClassifier,
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn builder(contract: ApiContract) -> AnalyzerBuilder {
        AnalyzerBuilder::new(contract)
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn classifier(&self) -> &RiskClassifier {
        &self.classifier
    }

    /// Analyzes one already-parsed process.
    pub fn analyze_graph(&self, graph: &ProcessGraph, file_label: &str) -> ProcessAnalysis {
        let operations = extract_operations(graph);
        let endpoints: Vec<ClassifiedEndpoint> = self
            .matcher
            .resolve_all(&operations)
            .into_iter()
            .map(|matched| ClassifiedEndpoint::new(matched, &self.classifier))
            .collect();

        let business_analysis = analysis::analyze(graph, &endpoints);
        let security_tests = synthesize_all(&endpoints);
        let security_assessment_points = assessment_points(&endpoints);
        let summary = ProcessSummary::new(graph, &endpoints, &business_analysis, &security_tests);

        debug!(
            process = %graph.process_id,
            operations = operations.len(),
            endpoints = endpoints.len(),
            tests = security_tests.len(),
            "Analyzed process"
        );

        ProcessAnalysis {
            file_path: file_label.to_string(),
            process_id: graph.process_id.clone(),
            process_name: graph.process_name.clone(),
            bpmn_structure: graph.clone(),
            endpoints,
            business_analysis,
            security_tests,
            security_assessment_points,
            summary,
        }
    }

    /// Parses a BPMN document and analyzes every process in it.
    pub fn analyze_document(
        &self,
        xml: &str,
        file_label: &str,
    ) -> Result<Vec<ProcessAnalysis>, ProcessParseError> {
        let graphs = ProcessParser::parse_str(xml)?;
        Ok(graphs
            .iter()
            .map(|graph| self.analyze_graph(graph, file_label))
            .collect())
    }

    #[instrument(skip(self, path), fields(file = %path.display()))]
    pub fn analyze_file(&self, path: &Path) -> Result<Vec<ProcessAnalysis>, ProcessParseError> {
        let graphs = ProcessParser::parse_file(path)?;
        let label = path.display().to_string();
        Ok(graphs
            .iter()
            .map(|graph| self.analyze_graph(graph, &label))
            .collect())
    }

    /// Expands the inputs into a sorted, de-duplicated list of files.
    ///
    /// Files given explicitly are taken as they are; directories contribute the
    /// files carrying the configured extension.
    pub fn discover_files(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>, DiscoveryError> {
        let mut files = BTreeSet::new();
        let extension = self.config.extension();

        for input in inputs {
            if input.is_file() {
                files.insert(input.clone());
                continue;
            }
            if !input.is_dir() {
                return Err(DiscoveryError::NotFound(input.clone()));
            }

            let mut walker = WalkDir::new(input).follow_links(false);
            if !self.config.recursive {
                walker = walker.max_depth(1);
            }
            for entry in walker {
                let entry = entry.map_err(|e| DiscoveryError::Walk {
                    path: input.clone(),
                    message: e.to_string(),
                })?;
                let matches_extension = entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
                if entry.file_type().is_file() && matches_extension {
                    files.insert(entry.into_path());
                }
            }
        }
        Ok(files.into_iter().collect())
    }

    /// Analyzes files one after another. A file that fails to parse becomes a
    /// diagnostic and the batch continues.
    pub fn analyze_files(&self, files: &[PathBuf]) -> BatchOutcome {
        let mut analyses = Vec::new();
        let mut diagnostics = Vec::new();

        for path in files {
            match self.analyze_file(path) {
                Ok(found) => {
                    info!(
                        file = %path.display(),
                        processes = found.len(),
                        endpoints = found.iter().map(|a| a.endpoints.len()).sum::<usize>(),
                        "Analyzed BPMN file"
                    );
                    analyses.extend(found);
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping BPMN file");
                    diagnostics.push(FileDiagnostic {
                        file_path: path.display().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        let report = BatchReport::new(files.len(), analyses, diagnostics, self.config.thresholds());
        info!(
            files = report.files_analyzed,
            failed = report.summary.files_failed,
            endpoints = report.summary.total_api_endpoints,
            tests = report.summary.total_security_tests,
            "Batch finished"
        );
        BatchOutcome::from_report(report)
    }

    pub fn analyze_paths(&self, inputs: &[PathBuf]) -> Result<BatchOutcome, DiscoveryError> {
        let files = self.discover_files(inputs)?;
        if files.is_empty() {
            warn!("No BPMN files found in the given inputs");
        }
        Ok(self.analyze_files(&files))
    }
}
