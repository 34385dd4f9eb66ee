use clap::{Parser, Subcommand};
use kensa::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Derives security test scenarios from BPMN processes and an OpenAPI contract
#[derive(Parser, Debug)]
#[command(name = "kensa", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze BPMN files or directories
    Analyze {
        /// BPMN files or directories containing them
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// OpenAPI contract (JSON). Without it every operation stays unmatched
        #[arg(short, long)]
        contract: Option<PathBuf>,

        /// Analyzer configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the full JSON report here
        #[arg(long)]
        json: Option<PathBuf>,

        /// Write the Markdown report here
        #[arg(long)]
        markdown: Option<PathBuf>,

        /// Only look at the top level of input directories
        #[arg(long)]
        no_recursive: bool,

        /// File extension picked up from directories
        #[arg(long)]
        extension: Option<String>,
    },
    /// Re-render the Markdown report from a JSON report
    Render {
        /// JSON report produced by `analyze`
        json: PathBuf,

        /// Output file. Printed to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Process exit codes: findings, a clean run with nothing found, or a failure.
const EXIT_FINDINGS: u8 = 0;
const EXIT_FAILURE: u8 = 1;
const EXIT_NOTHING_FOUND: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: could not install logger: {}", e);
    }

    let result = match cli.command {
        Command::Analyze {
            inputs,
            contract,
            config,
            json,
            markdown,
            no_recursive,
            extension,
        } => run_analyze(AnalyzeArgs {
            inputs,
            contract,
            config,
            json,
            markdown,
            no_recursive,
            extension,
        }),
        Command::Render { json, output } => run_render(json, output),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("\nError: {}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

struct AnalyzeArgs {
    inputs: Vec<PathBuf>,
    contract: Option<PathBuf>,
    config: Option<PathBuf>,
    json: Option<PathBuf>,
    markdown: Option<PathBuf>,
    no_recursive: bool,
    extension: Option<String>,
}

fn run_analyze(args: AnalyzeArgs) -> Result<u8> {
    let mut config = match &args.config {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::default(),
    };
    if args.no_recursive {
        config.recursive = false;
    }
    if let Some(extension) = args.extension {
        config.file_extension = extension;
    }
    config.validate()?;

    let contract = match &args.contract {
        Some(path) => ApiContract::load_or_empty(path),
        None => {
            warn!("No contract given, every operation will be unmatched");
            ApiContract::empty()
        }
    };

    let analyzer = Analyzer::builder(contract).with_config(config).build();
    let outcome = analyzer.analyze_paths(&args.inputs)?;
    let report = outcome.report();

    if let Some(path) = &args.json {
        write_json(report, path)?;
    }
    if let Some(path) = &args.markdown {
        write_markdown(report, path)?;
    }
    if args.json.is_none() && args.markdown.is_none() {
        print!("{}", render_markdown(report));
    }

    let summary = &report.summary;
    info!(
        "{} endpoints, {} tests, {} critical, {} file(s) failed",
        summary.total_api_endpoints,
        summary.total_security_tests,
        summary.total_critical_endpoints,
        summary.files_failed
    );

    Ok(match outcome {
        BatchOutcome::Findings(_) => EXIT_FINDINGS,
        BatchOutcome::NothingFound(_) => {
            info!("No contract-backed API calls were found");
            EXIT_NOTHING_FOUND
        }
    })
}

fn run_render(json: PathBuf, output: Option<PathBuf>) -> Result<u8> {
    let report = read_json(&json)?;
    match output {
        Some(path) => write_markdown(&report, &path)?,
        None => print!("{}", render_markdown(&report)),
    }
    Ok(EXIT_FINDINGS)
}
