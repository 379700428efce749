use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Severity bucket assigned to one log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Panic,
    Debug,
    Normal,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("invalid built-in rule pattern"))
        .collect()
}

// Bare tokens carry \b boundaries; bracketed and key=value tokens match as written.
static ERROR_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\[ERROR\]",
        r"\[error\]",
        r"level=error",
        r"\bERROR\b",
        r"\bERR\b",
        r"\bFATAL\b",
    ])
});

static WARNING_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\[WARN\]",
        r"\[WARNING\]",
        r"\[warn\]",
        r"level=warn",
        r"\bWARN\b",
        r"\bWARNING\b",
    ])
});

static PANIC_RULES: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"\bpanic:", r"\bPANIC\b", r"runtime error:"]));

static DEBUG_RULES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\[DEBUG\]",
        r"\[debug\]",
        r"level=debug",
        r"\bDEBUG\b",
        r"\bTRACE\b",
    ])
});

/// Classify a raw log line by its plain-text content.
///
/// Rule groups are evaluated in fixed priority order and the first group
/// with any matching pattern wins; a line matching none is Normal.
pub fn classify(line: &str) -> Severity {
    let groups: [(&[Regex], Severity); 4] = [
        (ERROR_RULES.as_slice(), Severity::Error),
        (WARNING_RULES.as_slice(), Severity::Warning),
        (PANIC_RULES.as_slice(), Severity::Panic),
        (DEBUG_RULES.as_slice(), Severity::Debug),
    ];
    for (rules, severity) in groups {
        if rules.iter().any(|re| re.is_match(line)) {
            return severity;
        }
    }
    Severity::Normal
}

const ERROR_LEVELS: [&str; 3] = ["error", "critical", "fatal"];
const WARNING_LEVELS: [&str; 3] = ["warn", "warning", "panic"];
const DEBUG_LEVELS: [&str; 1] = ["debug"];

/// Structured-log override: decode the whole line as one JSON object and
/// map its `level` field to a severity.
///
/// Returns None when the line is not a JSON object, leaving the plain-text
/// verdict in place. When it is, the returned severity always replaces the
/// plain-text one, even when the level is absent or unrecognized (Normal).
pub fn try_override(line: &str) -> Option<Severity> {
    let value: Value = serde_json::from_str(line.trim()).ok()?;
    let record = value.as_object()?;
    let level = record
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("level"))
        .and_then(|(_, v)| v.as_str());

    let Some(level) = level else {
        return Some(Severity::Normal);
    };
    let level = level.to_ascii_lowercase();
    if ERROR_LEVELS.iter().any(|t| level.contains(t)) {
        Some(Severity::Error)
    } else if WARNING_LEVELS.iter().any(|t| level.contains(t)) {
        Some(Severity::Warning)
    } else if DEBUG_LEVELS.iter().any(|t| level.contains(t)) {
        Some(Severity::Debug)
    } else {
        Some(Severity::Normal)
    }
}

/// Final severity for a line: structured override when present, plain-text
/// classification otherwise.
pub fn severity_of(line: &str) -> Severity {
    try_override(line).unwrap_or_else(|| classify(line))
}
