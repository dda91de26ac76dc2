use crate::analysis::complexity::ComplexityProvider;
use crate::analysis::language::{class_marker, function_marker, import_marker, CommentStyle};
use crate::models::file_report::{FileMetrics, FunctionComplexity};
use log::warn;

const COMPLEX_FUNCTION_THRESHOLD: usize = 10;

/// Line and structure counts for `source`. Complexity figures are filled in
/// only when `complexity` is supplied and reports at least one function.
pub fn calculate_metrics(
    source: &str,
    language: &str,
    complexity: Option<&dyn ComplexityProvider>,
) -> FileMetrics {
    let style = CommentStyle::for_language(language);
    let mut metrics = FileMetrics::default();

    for line in source.lines() {
        metrics.total_lines += 1;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            metrics.blank_lines += 1;
            continue;
        }
        if style.is_comment(trimmed) {
            metrics.comment_lines += 1;
            continue;
        }

        metrics.code_lines += 1;
        if function_marker().is_match(line) {
            metrics.function_count += 1;
        }
        if class_marker().is_match(line) {
            metrics.class_count += 1;
        }
        if import_marker().is_match(line) {
            metrics.import_count += 1;
        }
    }

    if let Some(provider) = complexity {
        match provider.analyze(source) {
            Ok(functions) => apply_complexity(&mut metrics, functions),
            Err(e) => warn!("complexity provider failed, leaving complexity unset: {e}"),
        }
    }

    metrics
}

fn apply_complexity(metrics: &mut FileMetrics, functions: Vec<FunctionComplexity>) {
    if functions.is_empty() {
        return;
    }

    let total: usize = functions.iter().map(|f| f.complexity).sum();
    let average = total as f64 / functions.len() as f64;
    metrics.average_complexity = Some(average);
    metrics.max_complexity = functions.iter().map(|f| f.complexity).max();
    metrics.maintainability_index = Some(maintainability_index(average, metrics.code_lines));
    metrics.complex_functions = functions
        .into_iter()
        .filter(|f| f.complexity > COMPLEX_FUNCTION_THRESHOLD)
        .collect();
}

/// Halstead-free maintainability index, rescaled to 0–100.
pub fn maintainability_index(average_complexity: f64, code_lines: usize) -> f64 {
    let loc = code_lines.max(1) as f64;
    let raw = 171.0 - 0.23 * average_complexity - 16.2 * loc.ln();
    (raw * 100.0 / 171.0).clamp(0.0, 100.0)
}
