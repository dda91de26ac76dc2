use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use codelens_lib::commands::input::{load_sources, parse_request, Request};
use codelens_lib::{
    aggregate_with, load_settings, AnalysisError, FileAnalyzer, FileOutcome, HeuristicComplexity,
    PatternRegistry,
};
use serde::Serialize;
use serde_json::json;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "codelens")]
#[command(version)]
#[command(about = "rule-based code quality, security and technical debt analysis", long_about = None)]
struct Cli {
    /// settings file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// number of files analyzed in parallel (0 = available cores)
    #[arg(short, long, global = true)]
    workers: Option<u64>,

    /// skip the built-in complexity heuristics
    #[arg(long, global = true)]
    no_complexity: bool,

    /// single-line JSON output
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// analyze one file
    File { path: PathBuf },
    /// analyze every file matched by the patterns (directories are walked)
    Project {
        #[arg(required = true)]
        patterns: Vec<String>,
    },
    /// analyze a JSON request: {path, content} or {files: [{name, content}]}; `-` reads stdin
    Request { input: String },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let compact = cli.compact;

    let output = match run(cli).await {
        Ok(report) => json!({ "success": true, "report": report }),
        Err(e) => json!({ "success": false, "error": format!("{e:#}") }),
    };
    let failed = output["success"] == json!(false);

    let rendered = if compact {
        serde_json::to_string(&output)
    } else {
        serde_json::to_string_pretty(&output)
    };
    match rendered {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("failed to render output: {e}");
            std::process::exit(1);
        }
    }
    if failed {
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<serde_json::Value> {
    let overrides = match cli.workers {
        Some(workers) => json!({ "workers": workers }),
        None => json!({}),
    };
    let settings = load_settings(cli.config.as_deref(), &overrides)?;
    let registry = Arc::new(PatternRegistry::new()?);

    let mut analyzer = FileAnalyzer::new(registry, settings);
    if !cli.no_complexity {
        analyzer = analyzer.with_complexity_provider(Arc::new(HeuristicComplexity));
    }
    let analyzer = Arc::new(analyzer);

    match cli.command {
        Command::File { path } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let outcome = analyzer
                .analyze_file(&path.to_string_lossy(), &content)
                .await;
            single_file(outcome)
        }
        Command::Project { patterns } => {
            let loaded = load_sources(&patterns)?;
            if loaded.is_empty() {
                return Err(AnalysisError::EmptyProject.into());
            }
            let mut outcomes = analyzer.analyze_files(loaded.files, None).await;
            outcomes.extend(loaded.unreadable);
            to_value(&aggregate_with(&outcomes, analyzer.settings())?)
        }
        Command::Request { input } => {
            let raw = if input == "-" {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("failed to read request from stdin")?;
                buf
            } else {
                std::fs::read_to_string(&input)
                    .with_context(|| format!("failed to read {input}"))?
            };
            match parse_request(&raw)? {
                Request::File(file) => single_file(analyzer.analyze_file(&file.path, &file.content).await),
                Request::Project(project) => to_value(&analyzer.analyze_project(project.files).await?),
            }
        }
    }
}

/// A lone file that could not be analyzed fails the whole run.
fn single_file(outcome: FileOutcome) -> Result<serde_json::Value> {
    match outcome {
        FileOutcome::Failed(failure) => Err(anyhow!(failure.error)),
        analyzed => to_value(&analyzed),
    }
}

fn to_value<T: Serialize>(value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value).context("failed to serialize report")
}
