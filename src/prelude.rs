//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types of the kensa crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use kensa::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let contract = ApiContract::from_file(Path::new("openapi.json"))?;
//! let analyzer = Analyzer::builder(contract).build();
//!
//! let xml = std::fs::read_to_string("payment.bpmn")?;
//! for analysis in analyzer.analyze_document(&xml, "payment.bpmn")? {
//!     println!(
//!         "{}: {} endpoints, {} tests",
//!         analysis.process_id,
//!         analysis.endpoints.len(),
//!         analysis.security_tests.len()
//!     );
//! }
//! # Ok(())
//! # }
//! ```

// Pipeline
pub use crate::config::AnalyzerConfig;
pub use crate::pipeline::{Analyzer, AnalyzerBuilder};

// Stages
pub use crate::analysis::{BusinessLogicAnalysis, WorkflowPattern};
pub use crate::contract::{ApiContract, ContractMatch, ContractMatcher};
pub use crate::endpoint::{ApiOperation, HttpMethod};
pub use crate::process::{ProcessGraph, ProcessParser};
pub use crate::risk::{
    ClassifiedEndpoint, DataSensitivity, OwaspCategory, RiskClassifier, RiskLevel, RiskProfile,
    RiskRule,
};
pub use crate::synth::{SecurityAssessmentPoint, TestCase, TestKind, TestType};

// Reports
pub use crate::report::{
    BatchOutcome, BatchReport, BatchSummary, FileDiagnostic, ProcessAnalysis, ProcessSummary,
    read_json, render_markdown, write_json, write_markdown,
};

// Error types
pub use crate::error::{ConfigError, ContractError, DiscoveryError, ProcessParseError, ReportError};

pub use std::path::Path;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
