use crate::models::pattern::PatternMatch;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionComplexity {
    pub function_name: String,
    pub complexity: usize,
    pub line_number: usize,
}

/// Line and structure counts for one file.
///
/// The complexity fields stay `None` when no complexity provider ran or it
/// failed; `None` means "unknown", never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetrics {
    pub total_lines: usize,
    pub code_lines: usize,
    pub comment_lines: usize,
    pub blank_lines: usize,
    pub function_count: usize,
    pub class_count: usize,
    pub import_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_complexity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_complexity: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintainability_index: Option<f64>,
    #[serde(default)]
    pub complex_functions: Vec<FunctionComplexity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DebtRating {
    Low,
    Medium,
    High,
    Critical,
}

impl DebtRating {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s < 20 => DebtRating::Low,
            s if s < 50 => DebtRating::Medium,
            s if s < 80 => DebtRating::High,
            _ => DebtRating::Critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtIndicators {
    pub deferred_work_markers: usize,
    pub duplicate_line_groups: usize,
    pub long_function_count: usize,
    pub magic_number_count: usize,
    pub deep_nesting_count: usize,
    pub overall_score: u32,
    pub rating: DebtRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentStatus {
    Analyzed,
    NotAvailable,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeQuality {
    Complex,
    Good,
    Moderate,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrichment {
    pub status: EnrichmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    pub summary: String,
    pub code_quality: CodeQuality,
    pub recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Enrichment {
    pub fn not_available() -> Self {
        Self {
            status: EnrichmentStatus::NotAvailable,
            label: None,
            confidence: None,
            summary: String::new(),
            code_quality: CodeQuality::Unknown,
            recommendations: Vec::new(),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: EnrichmentStatus::Error,
            error: Some(error.into()),
            ..Self::not_available()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub path: String,
    pub analyzed_at: String,
    pub detected_language: String,
    pub metrics: FileMetrics,
    pub patterns: Vec<PatternMatch>,
    pub security_issues: Vec<PatternMatch>,
    pub performance_issues: Vec<PatternMatch>,
    pub debt: DebtIndicators,
    pub enrichment: Enrichment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileErrorReport {
    pub path: String,
    pub analyzed_at: String,
    pub error: String,
}

/// Result of analyzing one file: a full report or an error report, never a
/// partially populated mix of both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileOutcome {
    Analyzed(Box<FileReport>),
    Failed(FileErrorReport),
}

impl FileOutcome {
    pub fn path(&self) -> &str {
        match self {
            FileOutcome::Analyzed(report) => &report.path,
            FileOutcome::Failed(failure) => &failure.path,
        }
    }

    pub fn report(&self) -> Option<&FileReport> {
        match self {
            FileOutcome::Analyzed(report) => Some(report),
            FileOutcome::Failed(_) => None,
        }
    }

    pub fn failure(path: &str, error: impl Into<String>) -> Self {
        FileOutcome::Failed(FileErrorReport {
            path: path.to_string(),
            analyzed_at: chrono::Utc::now().to_rfc3339(),
            error: error.into(),
        })
    }
}
