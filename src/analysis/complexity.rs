use crate::analysis::language::{function_marker, indent_width};
use crate::error::EnrichmentError;
use crate::models::file_report::FunctionComplexity;

/// Source of per-function cyclomatic complexity. Implementations may wrap an
/// external analyzer; failures are swallowed by the metrics calculator.
pub trait ComplexityProvider: Send + Sync {
    fn analyze(&self, source: &str) -> Result<Vec<FunctionComplexity>, EnrichmentError>;
}

const BRANCHING_KEYWORDS: &[&str] = &[
    "if ", "elif ", "else if ", "for ", "while ", "switch ", "match ", "case ", "catch ",
    "except ", "&& ", "|| ", " and ", " or ",
];

/// Analyze cyclomatic complexity using line-based heuristics.
/// Functions are delimited by braces when the declaration (or, Allman style,
/// the next non-blank line) opens one and by indentation otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicComplexity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Body {
    /// Declaration without `{` or trailing `:`; decided by the next non-blank line.
    Undecided,
    Braced(i32),
    Indented,
}

struct OpenFunction {
    name: String,
    line_number: usize,
    complexity: usize,
    indent: usize,
    body: Body,
}

impl ComplexityProvider for HeuristicComplexity {
    fn analyze(&self, source: &str) -> Result<Vec<FunctionComplexity>, EnrichmentError> {
        Ok(analyze_complexity(source))
    }
}

pub fn analyze_complexity(source: &str) -> Vec<FunctionComplexity> {
    let mut functions = Vec::new();
    let mut current: Option<OpenFunction> = None;

    for (index, line) in source.lines().enumerate() {
        let trimmed = line.trim();

        if let Some(func) = current.as_mut() {
            if func.body == Body::Undecided && !trimmed.is_empty() {
                func.body = if trimmed.starts_with('{') {
                    Body::Braced(0)
                } else {
                    Body::Indented
                };
            }
            let ends_by_dedent = func.body == Body::Indented
                && !trimmed.is_empty()
                && indent_width(line) <= func.indent;
            if ends_by_dedent {
                functions.extend(current.take().map(OpenFunction::finish));
            }
        }

        if current.is_none() && function_marker().is_match(line) {
            current = Some(OpenFunction {
                name: extract_function_name(trimmed),
                line_number: index + 1,
                complexity: 1,
                indent: indent_width(line),
                body: declared_body(line, trimmed),
            });
        }

        let Some(func) = current.as_mut() else { continue };

        // Count branching nodes
        for keyword in BRANCHING_KEYWORDS {
            if trimmed.contains(keyword) {
                func.complexity += 1;
            }
        }
        // Ternary operators
        if trimmed.contains(" ? ") && trimmed.contains(" : ") {
            func.complexity += 1;
        }

        if let Body::Braced(depth) = func.body {
            let opens = line.matches('{').count() as i32;
            let closes = line.matches('}').count() as i32;
            let depth = depth + opens - closes;
            func.body = Body::Braced(depth);
            if depth <= 0 {
                functions.extend(current.take().map(OpenFunction::finish));
            }
        }
    }

    // If still in a function at EOF (e.g., Python), record it
    functions.extend(current.map(OpenFunction::finish));

    functions
}

fn declared_body(line: &str, trimmed: &str) -> Body {
    if trimmed.ends_with(':') {
        Body::Indented
    } else if line.contains('{') {
        Body::Braced(0)
    } else {
        Body::Undecided
    }
}

impl OpenFunction {
    fn finish(self) -> FunctionComplexity {
        FunctionComplexity {
            function_name: self.name,
            complexity: self.complexity,
            line_number: self.line_number,
        }
    }
}

fn extract_function_name(line: &str) -> String {
    let before_paren = line.split('(').next().unwrap_or("");
    before_paren
        .split_whitespace()
        .last()
        .map(|name| name.trim_end_matches(':').to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
