use crate::analysis::blocks::BlockTracker;
use crate::analysis::registry::{Matcher, PatternRule};
use crate::models::pattern::PatternMatch;

pub const MAX_MATCHED_TEXT: usize = 100;
const CONTEXT_RADIUS: usize = 2;

struct RawMatch {
    line: usize,
    rule: usize,
    text: String,
}

/// Applies `rules` to `source` line by line.
///
/// Each rule yields at most one match per line (the first position that
/// satisfies it). Results are ordered by line, then by the rule's position in
/// `rules`.
pub fn scan(source: &str, rules: &[PatternRule]) -> Vec<PatternMatch> {
    let lines: Vec<&str> = source.lines().collect();
    let line_break = if source.contains("\r\n") { "\r\n" } else { "\n" };

    let mut trackers: Vec<Option<BlockTracker>> = rules
        .iter()
        .map(|rule| match &rule.matcher {
            Matcher::Block { opener, min_lines } => Some(BlockTracker::new(opener, *min_lines)),
            _ => None,
        })
        .collect();

    let mut raw = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        for (rule_index, rule) in rules.iter().enumerate() {
            match &rule.matcher {
                Matcher::Line(re) => {
                    if let Some(m) = re.find(line) {
                        raw.push(RawMatch {
                            line: index,
                            rule: rule_index,
                            text: m.as_str().to_string(),
                        });
                    }
                }
                Matcher::Pair { head, follow } => {
                    let Some(h) = head.find(line) else { continue };
                    let Some(next) = lines.get(index + 1) else { continue };
                    if let Some(f) = follow.find(next) {
                        raw.push(RawMatch {
                            line: index,
                            rule: rule_index,
                            text: format!("{}{}{}", &line[h.start()..], line_break, &next[..f.end()]),
                        });
                    }
                }
                Matcher::Block { .. } => {
                    if let Some(tracker) = trackers[rule_index].as_mut() {
                        tracker.feed(index, line);
                    }
                }
            }
        }
    }

    for (rule_index, tracker) in trackers.into_iter().enumerate() {
        let Some(tracker) = tracker else { continue };
        for start in tracker.finish() {
            raw.push(RawMatch {
                line: start,
                rule: rule_index,
                text: lines[start].trim().to_string(),
            });
        }
    }

    raw.sort_by_key(|m| (m.line, m.rule));

    raw.into_iter()
        .map(|m| {
            let rule = &rules[m.rule];
            PatternMatch {
                rule_name: rule.name.to_string(),
                category: rule.category,
                line_number: m.line + 1,
                matched_text: truncate_text(&m.text, MAX_MATCHED_TEXT),
                severity: Some(rule.severity),
                description: Some(rule.description.to_string()),
                suggestion: rule.suggestion.map(str::to_string),
                context: context_window(&lines, m.line, line_break),
            }
        })
        .collect()
}

/// Keeps the first `max_chars` characters, marking the cut with `...`.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn context_window(lines: &[&str], index: usize, line_break: &str) -> String {
    let start = index.saturating_sub(CONTEXT_RADIUS);
    let end = (index + CONTEXT_RADIUS).min(lines.len().saturating_sub(1));
    lines[start..=end].join(line_break)
}
