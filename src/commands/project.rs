use crate::analysis::language::UNKNOWN_LANGUAGE;
use crate::commands::settings::AnalyzerSettings;
use crate::error::{AnalysisError, Result};
use crate::models::file_report::{FileOutcome, FileReport};
use crate::models::pattern::{PatternMatch, ProjectIssue, Severity};
use crate::models::project_report::*;
use log::{info, warn};

const TOP_ISSUES: usize = 5;
const MAX_RECOMMENDATIONS: usize = 10;

/// Precomputed path with default settings.
pub fn aggregate(outcomes: &[FileOutcome]) -> Result<ProjectReport> {
    aggregate_with(outcomes, &AnalyzerSettings::default())
}

/// Reduces finished file outcomes into one project report. Failed outcomes are
/// listed in the overview and excluded from every sum.
pub fn aggregate_with(outcomes: &[FileOutcome], settings: &AnalyzerSettings) -> Result<ProjectReport> {
    if outcomes.is_empty() {
        return Err(AnalysisError::EmptyProject);
    }

    let reports: Vec<&FileReport> = outcomes.iter().filter_map(FileOutcome::report).collect();
    let names: Vec<String> = outcomes.iter().map(|o| o.path().to_lowercase()).collect();

    let overview = build_overview(outcomes, &reports);
    let quality_summary = summarize_quality(&reports);
    let security_assessment = assess_security(&reports, settings.rank_issues_by_severity);
    let performance_assessment = assess_performance(&reports, settings.rank_issues_by_severity);
    let maintainability = score_maintainability(&reports);
    let recommendations = recommend(&overview, &security_assessment, &performance_assessment);

    info!(
        "project: {}/{} files analyzed, quality {} ({:?}), security {}",
        overview.analyzed_files,
        overview.total_files,
        quality_summary.overall_quality_score,
        quality_summary.quality_rating,
        security_assessment.security_score
    );

    Ok(ProjectReport {
        overview,
        architecture_patterns: detect_architecture(&names),
        quality_summary,
        security_assessment,
        performance_assessment,
        maintainability,
        recommendations,
        analyzed_at: chrono::Utc::now().to_rfc3339(),
    })
}

fn build_overview(outcomes: &[FileOutcome], reports: &[&FileReport]) -> ProjectOverview {
    let excluded_files: Vec<ExcludedFile> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            FileOutcome::Failed(failure) => Some(ExcludedFile {
                path: failure.path.clone(),
                error: failure.error.clone(),
            }),
            FileOutcome::Analyzed(_) => None,
        })
        .collect();
    for excluded in &excluded_files {
        warn!("excluded {}: {}", excluded.path, excluded.error);
    }

    // Vec keeps first-seen order for the tie-break.
    let mut language_distribution: Vec<LanguageShare> = Vec::new();
    for report in reports {
        match language_distribution
            .iter_mut()
            .find(|share| share.language == report.detected_language)
        {
            Some(share) => share.file_count += 1,
            None => language_distribution.push(LanguageShare {
                language: report.detected_language.clone(),
                file_count: 1,
            }),
        }
    }

    let mut primary: Option<&LanguageShare> = None;
    for share in &language_distribution {
        if primary.map_or(true, |best| share.file_count > best.file_count) {
            primary = Some(share);
        }
    }
    let primary_language = primary
        .map(|share| share.language.clone())
        .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string());

    let total_lines_of_code: usize = reports.iter().map(|r| r.metrics.total_lines).sum();

    ProjectOverview {
        total_files: outcomes.len(),
        analyzed_files: reports.len(),
        excluded_files,
        total_lines_of_code,
        primary_language,
        file_types: language_distribution.iter().map(|s| s.language.clone()).collect(),
        language_distribution,
        project_size: ProjectSize::from_total_lines(total_lines_of_code),
    }
}

/// Name-based checks, each independent of the others.
fn detect_architecture(names: &[String]) -> Vec<ArchitecturePattern> {
    let any = |needle: &str| names.iter().any(|name| name.contains(needle));
    let count = |needle: &str| names.iter().filter(|name| name.contains(needle)).count();

    let mut patterns = Vec::new();
    if any("controller") && any("model") && any("view") {
        patterns.push(architecture(
            "Model-View-Controller (MVC)",
            0.8,
            "Traditional MVC architecture pattern detected",
        ));
    }
    if any("service") && count("api") > 2 {
        patterns.push(architecture(
            "Microservices Architecture",
            0.7,
            "Multiple service components suggest microservices pattern",
        ));
    }
    if any("repository") {
        patterns.push(architecture(
            "Repository Pattern",
            0.9,
            "Data access abstraction through repository pattern",
        ));
    }
    patterns
}

fn architecture(name: &str, confidence: f64, description: &str) -> ArchitecturePattern {
    ArchitecturePattern {
        name: name.to_string(),
        confidence,
        description: description.to_string(),
    }
}

fn average_debt(reports: &[&FileReport]) -> f64 {
    if reports.is_empty() {
        return 0.0;
    }
    let total: u64 = reports.iter().map(|r| u64::from(r.debt.overall_score)).sum();
    total as f64 / reports.len() as f64
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn overall_quality_score(security_issues: usize, performance_issues: usize, average_debt: f64) -> f64 {
    let security_penalty = (security_issues as f64 * 5.0).min(30.0);
    let performance_penalty = (performance_issues as f64 * 3.0).min(20.0);
    let debt_penalty = (average_debt * 0.4).min(40.0);
    round1((100.0 - security_penalty - performance_penalty - debt_penalty).max(0.0))
}

fn summarize_quality(reports: &[&FileReport]) -> QualitySummary {
    let security_issues_count = reports.iter().map(|r| r.security_issues.len()).sum();
    let performance_issues_count = reports.iter().map(|r| r.performance_issues.len()).sum();
    let average_technical_debt = average_debt(reports);

    let known: Vec<f64> = reports
        .iter()
        .filter_map(|r| r.metrics.average_complexity)
        .collect();
    let average_complexity =
        (!known.is_empty()).then(|| round1(known.iter().sum::<f64>() / known.len() as f64));

    let overall_quality_score =
        overall_quality_score(security_issues_count, performance_issues_count, average_technical_debt);

    QualitySummary {
        total_functions: reports.iter().map(|r| r.metrics.function_count).sum(),
        total_classes: reports.iter().map(|r| r.metrics.class_count).sum(),
        security_issues_count,
        performance_issues_count,
        technical_debt_score: reports.iter().map(|r| u64::from(r.debt.overall_score)).sum(),
        average_technical_debt,
        average_complexity,
        analyzed_files: reports.len(),
        overall_quality_score,
        quality_rating: Rating::for_quality(overall_quality_score),
    }
}

/// Issues in discovery order: file order, then the order the scanner produced.
fn collect_issues<'a>(
    reports: &[&'a FileReport],
    select: impl Fn(&'a FileReport) -> &'a [PatternMatch],
) -> Vec<ProjectIssue> {
    reports
        .iter()
        .flat_map(|&report| {
            select(report).iter().map(move |issue| ProjectIssue {
                file: report.path.clone(),
                issue: issue.clone(),
            })
        })
        .collect()
}

fn top_issues(mut issues: Vec<ProjectIssue>, rank_by_severity: bool) -> Vec<ProjectIssue> {
    if rank_by_severity {
        // sort_by_key is stable, discovery order survives within a severity.
        issues.sort_by_key(|issue| std::cmp::Reverse(issue.issue.severity));
    }
    issues.truncate(TOP_ISSUES);
    issues
}

fn count_severity(issues: &[ProjectIssue], severity: Severity) -> usize {
    issues
        .iter()
        .filter(|issue| issue.issue.severity == Some(severity))
        .count()
}

pub fn security_score(high: usize, medium: usize, low: usize) -> u32 {
    let penalty = high * 20 + medium * 10 + low * 5;
    100usize.saturating_sub(penalty) as u32
}

fn assess_security(reports: &[&FileReport], rank_by_severity: bool) -> SecurityAssessment {
    let issues = collect_issues(reports, |r| r.security_issues.as_slice());
    let high_severity_issues = count_severity(&issues, Severity::High);
    let medium_severity_issues = count_severity(&issues, Severity::Medium);
    let low_severity_issues = count_severity(&issues, Severity::Low);
    let score = security_score(high_severity_issues, medium_severity_issues, low_severity_issues);

    SecurityAssessment {
        total_issues: issues.len(),
        high_severity_issues,
        medium_severity_issues,
        low_severity_issues,
        security_score: score,
        security_rating: Rating::for_security(f64::from(score)),
        top_issues: top_issues(issues, rank_by_severity),
    }
}

fn assess_performance(reports: &[&FileReport], rank_by_severity: bool) -> PerformanceAssessment {
    let issues = collect_issues(reports, |r| r.performance_issues.as_slice());
    let performance_score = 100usize.saturating_sub(issues.len() * 10) as u32;

    PerformanceAssessment {
        total_performance_issues: issues.len(),
        critical_issues: count_severity(&issues, Severity::High),
        performance_score,
        top_issues: top_issues(issues, rank_by_severity),
    }
}

fn score_maintainability(reports: &[&FileReport]) -> Maintainability {
    let average = average_debt(reports);
    let score = round1((100.0 - average).max(0.0));

    Maintainability {
        maintainability_score: score,
        maintainability_rating: Rating::for_quality(score),
        average_technical_debt: round1(average),
        files_analyzed: reports.len(),
    }
}

fn recommend(
    overview: &ProjectOverview,
    security: &SecurityAssessment,
    performance: &PerformanceAssessment,
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if security.total_issues > 0 {
        out.push(recommendation(
            "Security",
            Severity::High,
            "Address Security Issues",
            format!(
                "Found {} security issues ({} high severity) that need attention.",
                security.total_issues, security.high_severity_issues
            ),
        ));
    }
    if performance.total_performance_issues > 0 {
        out.push(recommendation(
            "Performance",
            Severity::Medium,
            "Optimize Performance Bottlenecks",
            format!(
                "Found {} performance issues that could impact application speed.",
                performance.total_performance_issues
            ),
        ));
    }
    if matches!(overview.project_size, ProjectSize::Large | ProjectSize::VeryLarge) {
        out.push(recommendation(
            "Architecture",
            Severity::Medium,
            "Consider Code Modularization",
            "Large codebase detected. Consider breaking down into smaller, more manageable modules.",
        ));
    }
    out.push(recommendation(
        "Testing",
        Severity::Medium,
        "Implement Comprehensive Testing",
        "Add unit tests, integration tests, and automated testing to improve code reliability.",
    ));
    out.push(recommendation(
        "Documentation",
        Severity::Low,
        "Improve Code Documentation",
        "Add comprehensive documentation, API docs, and inline comments for better maintainability.",
    ));

    out.truncate(MAX_RECOMMENDATIONS);
    out
}

fn recommendation(
    category: &str,
    priority: Severity,
    title: &str,
    description: impl Into<String>,
) -> Recommendation {
    Recommendation {
        category: category.to_string(),
        priority,
        title: title.to_string(),
        description: description.into(),
    }
}
