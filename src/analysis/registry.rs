use crate::analysis::language::{CLASS_OPENER, FUNCTION_OPENER};
use crate::error::{AnalysisError, Result};
use crate::models::pattern::{PatternCategory, Severity};
use regex::{Regex, RegexBuilder};

/// Declarative form of a rule, compiled into a [`PatternRule`] once at
/// startup. New rules are added by appending to one of the catalogs below.
#[derive(Debug, Clone, Copy)]
pub struct RuleSpec {
    pub name: &'static str,
    pub category: PatternCategory,
    pub severity: Severity,
    pub description: &'static str,
    pub suggestion: Option<&'static str>,
    pub case_insensitive: bool,
    pub matcher: MatcherSpec,
}

#[derive(Debug, Clone, Copy)]
pub enum MatcherSpec {
    Line(&'static str),
    /// `head` on one line immediately followed by `follow` on the next.
    Pair {
        head: &'static str,
        follow: &'static str,
    },
    /// Block started by `opener` whose body spans at least `min_lines` lines.
    Block {
        opener: &'static str,
        min_lines: usize,
    },
}

#[derive(Debug, Clone)]
pub enum Matcher {
    Line(Regex),
    Pair { head: Regex, follow: Regex },
    Block { opener: Regex, min_lines: usize },
}

#[derive(Debug, Clone)]
pub struct PatternRule {
    pub name: &'static str,
    pub category: PatternCategory,
    pub severity: Severity,
    pub description: &'static str,
    pub suggestion: Option<&'static str>,
    pub case_insensitive: bool,
    pub matcher: Matcher,
}

pub const DESIGN_PATTERNS: &[RuleSpec] = &[
    RuleSpec {
        name: "Singleton Pattern",
        category: PatternCategory::DesignPattern,
        severity: Severity::Low,
        description: "Class holds a single shared instance",
        suggestion: None,
        case_insensitive: false,
        matcher: MatcherSpec::Pair {
            head: r"class\s+\w+",
            follow: r"_instance\s*=\s*None",
        },
    },
    RuleSpec {
        name: "Factory Pattern",
        category: PatternCategory::DesignPattern,
        severity: Severity::Low,
        description: "Creation logic is wrapped in a factory function",
        suggestion: None,
        case_insensitive: false,
        matcher: MatcherSpec::Line(r"\b(?:def|fn|func|fun|function)\s+create_?\w+\s*\("),
    },
    RuleSpec {
        name: "Observer Pattern",
        category: PatternCategory::DesignPattern,
        severity: Severity::Low,
        description: "Publish/subscribe style notification",
        suggestion: None,
        case_insensitive: true,
        matcher: MatcherSpec::Line(r"notify|observer|subscribe"),
    },
    RuleSpec {
        name: "Strategy Pattern",
        category: PatternCategory::DesignPattern,
        severity: Severity::Low,
        description: "Interchangeable behaviour behind an execute entry point",
        suggestion: None,
        case_insensitive: false,
        matcher: MatcherSpec::Line(r"\b(?:def|fn|func|fun|function)\s+execute\s*\("),
    },
];

pub const ANTI_PATTERNS: &[RuleSpec] = &[
    RuleSpec {
        name: "God Class",
        category: PatternCategory::AntiPattern,
        severity: Severity::High,
        description: "Class body spans 100 or more lines",
        suggestion: Some("Split the class along its responsibilities"),
        case_insensitive: false,
        matcher: MatcherSpec::Block {
            opener: CLASS_OPENER,
            min_lines: 100,
        },
    },
    RuleSpec {
        name: "Long Method",
        category: PatternCategory::AntiPattern,
        severity: Severity::Medium,
        description: "Function body spans 30 or more lines",
        suggestion: Some("Extract smaller functions"),
        case_insensitive: false,
        matcher: MatcherSpec::Block {
            opener: FUNCTION_OPENER,
            min_lines: 30,
        },
    },
    RuleSpec {
        name: "Magic Numbers",
        category: PatternCategory::AntiPattern,
        severity: Severity::Low,
        description: "Unnamed numeric literal",
        suggestion: Some("Replace with a named constant"),
        case_insensitive: false,
        matcher: MatcherSpec::Line(r"\b\d{2,}\b"),
    },
];

pub const SECURITY_RULES: &[RuleSpec] = &[
    RuleSpec {
        name: "SQL Injection",
        category: PatternCategory::Security,
        severity: Severity::High,
        description: "Potential SQL injection vulnerability",
        suggestion: Some("Use parameterized queries or prepared statements"),
        case_insensitive: true,
        matcher: MatcherSpec::Line(r#"(?:execute|query)\s*\(\s*["'].*\+.*["']"#),
    },
    RuleSpec {
        name: "XSS Vulnerability",
        category: PatternCategory::Security,
        severity: Severity::Medium,
        description: "Potential XSS vulnerability through innerHTML",
        suggestion: Some("Assign textContent or sanitize the markup first"),
        case_insensitive: false,
        matcher: MatcherSpec::Line(r"innerHTML\s*=\s*.*\+"),
    },
    RuleSpec {
        name: "Hardcoded Credentials",
        category: PatternCategory::Security,
        severity: Severity::High,
        description: "Hardcoded credentials found",
        suggestion: Some("Load secrets from the environment or a secret store"),
        case_insensitive: true,
        matcher: MatcherSpec::Line(r#"(?:password|api_key|secret)\s*=\s*["'][^"']+["']"#),
    },
    RuleSpec {
        name: "Insecure Random",
        category: PatternCategory::Security,
        severity: Severity::Low,
        description: "Using insecure random number generation",
        suggestion: Some("Use a cryptographically secure random source"),
        case_insensitive: false,
        matcher: MatcherSpec::Line(r"Math\.random\(\)"),
    },
];

pub const PERFORMANCE_RULES: &[RuleSpec] = &[
    RuleSpec {
        name: "N+1 Query",
        category: PatternCategory::Performance,
        severity: Severity::Medium,
        description: "Potential N+1 query problem",
        suggestion: Some("Consider using batch queries or eager loading"),
        case_insensitive: false,
        matcher: MatcherSpec::Pair {
            head: r"for\s+.*in.*:\s*$",
            follow: r"\.query\(",
        },
    },
    RuleSpec {
        name: "Nested Loops",
        category: PatternCategory::Performance,
        severity: Severity::Low,
        description: "Nested loops may cause performance issues",
        suggestion: Some("Consider using more efficient algorithms or data structures"),
        case_insensitive: false,
        matcher: MatcherSpec::Pair {
            head: r"for\s+.*in.*:\s*$",
            follow: r"^\s*for\s+.*in.*:",
        },
    },
    RuleSpec {
        name: "Synchronous IO",
        category: PatternCategory::Performance,
        severity: Severity::Medium,
        description: "Synchronous IO operation",
        suggestion: Some("Consider using async/await or threading for IO operations"),
        case_insensitive: false,
        matcher: MatcherSpec::Line(r"(?:requests\.get|urllib\.urlopen)\("),
    },
];

/// Compiled, read-only rule catalogs. Build once and share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    code_patterns: Vec<PatternRule>,
    anti_start: usize,
    security: Vec<PatternRule>,
    performance: Vec<PatternRule>,
}

impl PatternRegistry {
    pub fn new() -> Result<Self> {
        let mut code_patterns = compile_all(DESIGN_PATTERNS)?;
        let anti_start = code_patterns.len();
        code_patterns.extend(compile_all(ANTI_PATTERNS)?);

        Ok(Self {
            code_patterns,
            anti_start,
            security: compile_all(SECURITY_RULES)?,
            performance: compile_all(PERFORMANCE_RULES)?,
        })
    }

    pub fn rules(&self, category: PatternCategory) -> &[PatternRule] {
        match category {
            PatternCategory::DesignPattern => &self.code_patterns[..self.anti_start],
            PatternCategory::AntiPattern => &self.code_patterns[self.anti_start..],
            PatternCategory::Security => &self.security,
            PatternCategory::Performance => &self.performance,
        }
    }

    /// Design patterns followed by anti-patterns, in registry order.
    pub fn code_patterns(&self) -> &[PatternRule] {
        &self.code_patterns
    }

    pub fn security_rules(&self) -> &[PatternRule] {
        &self.security
    }

    pub fn performance_rules(&self) -> &[PatternRule] {
        &self.performance
    }

    pub fn rule_count(&self) -> usize {
        self.code_patterns.len() + self.security.len() + self.performance.len()
    }
}

pub fn compile_all(specs: &[RuleSpec]) -> Result<Vec<PatternRule>> {
    specs.iter().map(compile).collect()
}

pub fn compile(spec: &RuleSpec) -> Result<PatternRule> {
    let build = |pattern: &str| {
        RegexBuilder::new(pattern)
            .case_insensitive(spec.case_insensitive)
            .build()
            .map_err(|source| AnalysisError::InvalidRule {
                name: spec.name,
                source,
            })
    };

    let matcher = match spec.matcher {
        MatcherSpec::Line(pattern) => Matcher::Line(build(pattern)?),
        MatcherSpec::Pair { head, follow } => Matcher::Pair {
            head: build(head)?,
            follow: build(follow)?,
        },
        MatcherSpec::Block { opener, min_lines } => Matcher::Block {
            opener: build(opener)?,
            min_lines,
        },
    };

    Ok(PatternRule {
        name: spec.name,
        category: spec.category,
        severity: spec.severity,
        description: spec.description,
        suggestion: spec.suggestion,
        case_insensitive: spec.case_insensitive,
        matcher,
    })
}
