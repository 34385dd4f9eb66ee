//! # Kensa - Security Test Derivation from Business Processes
//!
//! **Kensa** reads BPMN process models, finds the HTTP calls their tasks name,
//! resolves those calls against an OpenAPI contract and derives a set of
//! security test scenarios for every operation the workflow exercises.
//!
//! ## Core Workflow
//!
//! 1.  **Parse**: `ProcessParser` turns a BPMN document into one `ProcessGraph` per `<process>`.
//! 2.  **Extract**: task labels such as `"Check balance via GET /accounts/{id}"` become `ApiOperation`s.
//! 3.  **Match**: the `ContractMatcher` resolves each operation against the contract's path templates. Operations the contract does not know are dropped.
//! 4.  **Classify**: keyword rules assign a risk tier, OWASP categories, data sensitivity and compliance tags.
//! 5.  **Synthesize**: every endpoint gets happy-path, negative, security and performance test descriptions with stable ids.
//! 6.  **Report**: results are aggregated into a `BatchReport`, written as JSON and rendered as Markdown.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kensa::prelude::*;
//! use std::path::PathBuf;
//!
//! fn main() -> Result<()> {
//!     let contract = ApiContract::load_or_empty(Path::new("openapi.json"));
//!     let analyzer = Analyzer::builder(contract)
//!         .with_config(AnalyzerConfig::default())
//!         .build();
//!
//!     let outcome = analyzer.analyze_paths(&[PathBuf::from("processes/")])?;
//!     let report = outcome.report();
//!
//!     write_json(report, Path::new("analysis.json"))?;
//!     println!("{}", render_markdown(report));
//!
//!     if let BatchOutcome::NothingFound(_) = outcome {
//!         println!("-> No contract-backed API calls were found.");
//!     }
//!     Ok(())
//! }
//! ```

pub mod analysis;
pub mod config;
pub mod contract;
pub mod endpoint;
pub mod error;
pub mod pipeline;
pub mod prelude;
pub mod process;
pub mod report;
pub mod risk;
pub mod synth;
