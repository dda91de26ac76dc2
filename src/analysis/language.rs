use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

pub const UNKNOWN_LANGUAGE: &str = "Unknown";

/// Function-like block openers across the supported language families.
/// Keyword languages (`def`, `fn`, `func`, `fun`, `function`) plus Java/C#
/// style methods that start with an access modifier.
pub const FUNCTION_OPENER: &str = r"^\s*(?:(?:export|pub(?:\([\w:]+\))?|async|static|unsafe|const|inline|override|suspend|internal)\s+)*(?:def|fn|func|fun|function)\s+\w+|^\s*(?:public|private|protected)\s+(?:[\w<>\[\],?]+\s+)*\w+\s*\(";

pub const CLASS_OPENER: &str = r"^\s*(?:(?:export|default|pub(?:\([\w:]+\))?|public|private|protected|internal|abstract|final|sealed|static|data|open)\s+)*(?:class|struct|interface|trait|object)\s+\w+|^\s*type\s+\w+\s+(?:struct|interface)\b";

const IMPORT_MARKER: &str = r"^\s*(?:import\b|from\s+\S+\s+import\b|#\s*include\b|using\s+[\w.]+\s*;|(?:pub\s+)?use\s+[\w:{]|@import\b)|\brequire(?:_once)?\s*\(";

static FUNCTION_RE: OnceLock<Regex> = OnceLock::new();
static CLASS_RE: OnceLock<Regex> = OnceLock::new();
static IMPORT_RE: OnceLock<Regex> = OnceLock::new();

pub fn function_marker() -> &'static Regex {
    FUNCTION_RE.get_or_init(|| Regex::new(FUNCTION_OPENER).expect("valid regex"))
}

pub fn class_marker() -> &'static Regex {
    CLASS_RE.get_or_init(|| Regex::new(CLASS_OPENER).expect("valid regex"))
}

pub fn import_marker() -> &'static Regex {
    IMPORT_RE.get_or_init(|| Regex::new(IMPORT_MARKER).expect("valid regex"))
}

pub fn detect_language(path: &str) -> &'static str {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("py") => "Python",
        Some("java") => "Java",
        Some("js") => "JavaScript",
        Some("ts") => "TypeScript",
        Some("jsx") => "React JSX",
        Some("tsx") => "React TSX",
        Some("cpp") => "C++",
        Some("c") => "C",
        Some("cs") => "C#",
        Some("go") => "Go",
        Some("rs") => "Rust",
        Some("php") => "PHP",
        Some("rb") => "Ruby",
        Some("scala") => "Scala",
        Some("kt") => "Kotlin",
        _ => UNKNOWN_LANGUAGE,
    }
}

/// Line-comment convention of a language family. Unknown languages fall back
/// to `#`, which is an approximation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    Hash,
    Slash,
}

impl CommentStyle {
    pub fn for_language(language: &str) -> Self {
        match language {
            "JavaScript" | "TypeScript" | "React JSX" | "React TSX" | "Java" | "C" | "C++"
            | "C#" | "Go" | "Rust" | "PHP" | "Scala" | "Kotlin" => CommentStyle::Slash,
            _ => CommentStyle::Hash,
        }
    }

    /// `line` must already be trimmed.
    pub fn is_comment(self, line: &str) -> bool {
        match self {
            CommentStyle::Hash => line.starts_with('#'),
            CommentStyle::Slash => {
                line.starts_with("//") || line.starts_with("/*") || line.starts_with('*')
            }
        }
    }
}

/// Leading-whitespace width in columns, tabs counted as four.
pub fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Number of leading whitespace characters, every character counted once.
pub fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}
