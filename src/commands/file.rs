use crate::analysis::complexity::ComplexityProvider;
use crate::analysis::debt::score_debt;
use crate::analysis::enrichment::{enrich, EnrichmentProvider};
use crate::analysis::language::detect_language;
use crate::analysis::metrics::calculate_metrics;
use crate::analysis::registry::PatternRegistry;
use crate::analysis::scanner::scan;
use crate::commands::input::SourceFile;
use crate::commands::project::aggregate_with;
use crate::commands::settings::AnalyzerSettings;
use crate::error::{AnalysisError, Result};
use crate::models::file_report::{Enrichment, FileOutcome, FileReport};
use crate::models::project_report::ProjectReport;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

pub const EMPTY_CONTENT: &str = "empty content";
pub const ABORTED: &str = "analysis aborted";

/// Runs metrics, scanning and debt scoring over one file at a time. Providers
/// are optional and injected per analyzer.
#[derive(Clone)]
pub struct FileAnalyzer {
    registry: Arc<PatternRegistry>,
    settings: AnalyzerSettings,
    complexity: Option<Arc<dyn ComplexityProvider>>,
    enrichment: Option<Arc<dyn EnrichmentProvider>>,
}

impl FileAnalyzer {
    pub fn new(registry: Arc<PatternRegistry>, settings: AnalyzerSettings) -> Self {
        Self {
            registry,
            settings,
            complexity: None,
            enrichment: None,
        }
    }

    pub fn with_complexity_provider(mut self, provider: Arc<dyn ComplexityProvider>) -> Self {
        self.complexity = Some(provider);
        self
    }

    pub fn with_enrichment_provider(mut self, provider: Arc<dyn EnrichmentProvider>) -> Self {
        self.enrichment = Some(provider);
        self
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// Synchronous core. Enrichment is always `not_available` here.
    pub fn analyze_source(&self, path: &str, content: &str) -> FileOutcome {
        if content.is_empty() {
            warn!("skipping {path}: {EMPTY_CONTENT}");
            return FileOutcome::failure(path, EMPTY_CONTENT);
        }

        let language = detect_language(path);
        let metrics = calculate_metrics(content, language, self.complexity.as_deref());
        let patterns = scan(content, self.registry.code_patterns());
        let security_issues = scan(content, self.registry.security_rules());
        let performance_issues = scan(content, self.registry.performance_rules());
        let debt = score_debt(content);

        debug!(
            "analyzed {path} ({language}): {} lines, {} patterns, {} security, {} performance, debt {}",
            metrics.total_lines,
            patterns.len(),
            security_issues.len(),
            performance_issues.len(),
            debt.overall_score
        );

        FileOutcome::Analyzed(Box::new(FileReport {
            path: path.to_string(),
            analyzed_at: chrono::Utc::now().to_rfc3339(),
            detected_language: language.to_string(),
            metrics,
            patterns,
            security_issues,
            performance_issues,
            debt,
            enrichment: Enrichment::not_available(),
        }))
    }

    /// Core analysis plus enrichment, when enabled.
    pub async fn analyze_file(&self, path: &str, content: &str) -> FileOutcome {
        let mut outcome = self.analyze_source(path, content);
        self.attach_enrichment(&mut outcome, content).await;
        outcome
    }

    async fn attach_enrichment(&self, outcome: &mut FileOutcome, content: &str) {
        if !self.settings.enrichment_enabled {
            return;
        }
        if let FileOutcome::Analyzed(report) = outcome {
            report.enrichment = enrich(
                self.enrichment.clone(),
                content,
                self.settings.enrichment_max_length,
                self.settings.enrichment_timeout,
            )
            .await;
        }
    }

    /// Analyzes `files` on at most `settings.workers` blocking workers.
    ///
    /// Outcomes come back in input order. Once `abort` is raised no further
    /// files are dispatched; those are reported as failed outcomes.
    pub async fn analyze_files(
        self: &Arc<Self>,
        files: Vec<SourceFile>,
        abort: Option<Arc<AtomicBool>>,
    ) -> Vec<FileOutcome> {
        let names: Vec<String> = files.iter().map(|f| f.name.clone()).collect();
        let mut slots: Vec<Option<FileOutcome>> = vec![None; files.len()];
        let semaphore = Arc::new(Semaphore::new(self.settings.workers.max(1)));
        let mut join_set = JoinSet::new();
        let mut task_index = HashMap::new();

        for (index, file) in files.into_iter().enumerate() {
            let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                break;
            };
            if abort.as_ref().is_some_and(|flag| flag.load(Ordering::SeqCst)) {
                info!("abort requested, {} files left undispatched", names.len() - index);
                break;
            }

            let analyzer = Arc::clone(self);
            let handle = join_set.spawn(async move {
                let outcome = analyzer.run_one(file).await;
                drop(permit);
                outcome
            });
            task_index.insert(handle.id(), index);
        }

        while let Some(joined) = join_set.join_next_with_id().await {
            let (id, joined) = match joined {
                Ok((id, outcome)) => (id, Ok(outcome)),
                Err(e) => (e.id(), Err(e)),
            };
            if let Some(&index) = task_index.get(&id) {
                slots[index] = Some(settle(&names[index], joined));
            }
        }

        slots
            .into_iter()
            .zip(names)
            .map(|(slot, name)| slot.unwrap_or_else(|| FileOutcome::failure(&name, ABORTED)))
            .collect()
    }

    async fn run_one(self: Arc<Self>, file: SourceFile) -> FileOutcome {
        let name = file.name.clone();
        let analyzer = Arc::clone(&self);
        let core = tokio::task::spawn_blocking(move || {
            let outcome = analyzer.analyze_source(&file.name, &file.content);
            (outcome, file)
        })
        .await;

        match core {
            Ok((mut outcome, file)) => {
                self.attach_enrichment(&mut outcome, &file.content).await;
                outcome
            }
            Err(e) => settle(&name, Err(e)),
        }
    }

    /// Raw path: analyzes every file, waits for all of them, then aggregates.
    pub async fn analyze_project(self: &Arc<Self>, files: Vec<SourceFile>) -> Result<ProjectReport> {
        if files.is_empty() {
            return Err(AnalysisError::EmptyProject);
        }

        let count = files.len();
        let outcomes = self.analyze_files(files, None).await;
        info!("analyzed {count} files, aggregating project report");
        aggregate_with(&outcomes, &self.settings)
    }
}

/// A task that died before producing an outcome still gets one, under its own path.
fn settle(name: &str, joined: std::result::Result<FileOutcome, JoinError>) -> FileOutcome {
    joined.unwrap_or_else(|e| {
        warn!("analysis of {name} panicked: {e}");
        FileOutcome::failure(name, format!("analysis task failed: {e}"))
    })
}
