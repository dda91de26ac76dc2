use crate::models::pattern::{ProjectIssue, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectSize {
    Small,
    Medium,
    Large,
    #[serde(rename = "Very Large")]
    VeryLarge,
}

impl ProjectSize {
    pub fn from_total_lines(total_lines: usize) -> Self {
        match total_lines {
            n if n < 1_000 => ProjectSize::Small,
            n if n < 10_000 => ProjectSize::Medium,
            n if n < 100_000 => ProjectSize::Large,
            _ => ProjectSize::VeryLarge,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Rating {
    /// Buckets shared by the quality and maintainability scores.
    pub fn for_quality(score: f64) -> Self {
        match score {
            s if s >= 80.0 => Rating::Excellent,
            s if s >= 60.0 => Rating::Good,
            s if s >= 40.0 => Rating::Fair,
            _ => Rating::Poor,
        }
    }

    pub fn for_security(score: f64) -> Self {
        match score {
            s if s >= 90.0 => Rating::Excellent,
            s if s >= 70.0 => Rating::Good,
            s if s >= 50.0 => Rating::Fair,
            _ => Rating::Poor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageShare {
    pub language: String,
    pub file_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedFile {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectOverview {
    pub total_files: usize,
    pub analyzed_files: usize,
    pub excluded_files: Vec<ExcludedFile>,
    pub total_lines_of_code: usize,
    pub primary_language: String,
    pub language_distribution: Vec<LanguageShare>,
    pub project_size: ProjectSize,
    pub file_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitecturePattern {
    pub name: String,
    pub confidence: f64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualitySummary {
    pub total_functions: usize,
    pub total_classes: usize,
    pub security_issues_count: usize,
    pub performance_issues_count: usize,
    pub technical_debt_score: u64,
    pub average_technical_debt: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_complexity: Option<f64>,
    pub analyzed_files: usize,
    pub overall_quality_score: f64,
    pub quality_rating: Rating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityAssessment {
    pub total_issues: usize,
    pub high_severity_issues: usize,
    pub medium_severity_issues: usize,
    pub low_severity_issues: usize,
    pub security_score: u32,
    pub security_rating: Rating,
    pub top_issues: Vec<ProjectIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceAssessment {
    pub total_performance_issues: usize,
    pub critical_issues: usize,
    pub performance_score: u32,
    pub top_issues: Vec<ProjectIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Maintainability {
    pub maintainability_score: f64,
    pub maintainability_rating: Rating,
    pub average_technical_debt: f64,
    pub files_analyzed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub category: String,
    pub priority: Severity,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    pub overview: ProjectOverview,
    pub architecture_patterns: Vec<ArchitecturePattern>,
    pub quality_summary: QualitySummary,
    pub security_assessment: SecurityAssessment,
    pub performance_assessment: PerformanceAssessment,
    pub maintainability: Maintainability,
    pub recommendations: Vec<Recommendation>,
    pub analyzed_at: String,
}
