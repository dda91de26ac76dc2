use crate::analysis::blocks::BlockTracker;
use crate::analysis::language::{function_marker, leading_whitespace};
use crate::models::file_report::{DebtIndicators, DebtRating};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

const DEFERRED_WEIGHT: usize = 5;
const DUPLICATE_WEIGHT: usize = 10;
const LONG_FUNCTION_WEIGHT: usize = 8;
const MAGIC_NUMBER_WEIGHT: usize = 2;
const DEEP_NESTING_WEIGHT: usize = 15;
const MAX_SCORE: usize = 100;

const LONG_FUNCTION_LINES: usize = 20;
const DUPLICATE_MIN_CHARS: usize = 20;
const INDENT_UNIT: usize = 4;
const DEEP_NESTING_LEVEL: usize = 4;

static DEFERRED_MARKER: OnceLock<Regex> = OnceLock::new();
static MAGIC_NUMBER: OnceLock<Regex> = OnceLock::new();

fn deferred_marker() -> &'static Regex {
    DEFERRED_MARKER
        .get_or_init(|| Regex::new(r"(?i)(?:#|//|/\*).*(?:TODO|FIXME|HACK)").expect("valid regex"))
}

fn magic_number() -> &'static Regex {
    MAGIC_NUMBER.get_or_init(|| Regex::new(r"\b\d{3,}\b").expect("valid regex"))
}

/// Technical debt indicators using line-by-line heuristics.
pub fn score_debt(source: &str) -> DebtIndicators {
    let lines: Vec<&str> = source.lines().collect();

    let mut deferred_work_markers = 0;
    let mut magic_number_count = 0;
    let mut deep_nesting_count = 0;
    let mut long_functions = BlockTracker::new(function_marker(), LONG_FUNCTION_LINES);

    for (i, line) in lines.iter().enumerate() {
        // TODO/FIXME/HACK behind a comment marker
        if deferred_marker().is_match(line) {
            deferred_work_markers += 1;
        }

        magic_number_count += magic_number().find_iter(line).count();

        if leading_whitespace(line) / INDENT_UNIT > DEEP_NESTING_LEVEL {
            deep_nesting_count += 1;
        }

        long_functions.feed(i, line);
    }

    let duplicate_line_groups = count_duplicate_lines(&lines);
    let long_function_count = long_functions.finish().len();

    let weighted = deferred_work_markers * DEFERRED_WEIGHT
        + duplicate_line_groups * DUPLICATE_WEIGHT
        + long_function_count * LONG_FUNCTION_WEIGHT
        + magic_number_count * MAGIC_NUMBER_WEIGHT
        + deep_nesting_count * DEEP_NESTING_WEIGHT;
    let overall_score = weighted.min(MAX_SCORE) as u32;

    DebtIndicators {
        deferred_work_markers,
        duplicate_line_groups,
        long_function_count,
        magic_number_count,
        deep_nesting_count,
        overall_score,
        rating: DebtRating::from_score(overall_score),
    }
}

/// Every occurrence of a substantial line that appears more than once counts,
/// then the total is halved so a pair is not counted twice.
fn count_duplicate_lines(lines: &[&str]) -> usize {
    let substantial: Vec<&str> = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| l.chars().count() > DUPLICATE_MIN_CHARS)
        .collect();

    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for line in &substantial {
        *occurrences.entry(*line).or_insert(0) += 1;
    }

    let duplicated = substantial
        .iter()
        .filter(|line| occurrences.get(*line).copied().unwrap_or(0) > 1)
        .count();
    duplicated / 2
}
