use crossterm::style::{Color, Stylize};
use regex::Regex;
use std::fmt::Write;

use crate::classify::{Severity, severity_of};

/// Display format for extracted timestamps.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Background color used for keyword match spans.
pub const HIGHLIGHT_COLOR: Color = Color::Magenta;

/// Per-run rendering configuration, immutable during a streaming session.
#[derive(Debug, Default)]
pub struct RenderContext {
    pub show_timestamps: bool,
    pub show_pod_name: bool,
    pub keyword: Option<Regex>,
    pub keyword_only: bool,
}

/// Split a leading timestamp token off the line and reformat it for display.
///
/// The first space-delimited token is parsed as RFC3339 with fractional
/// seconds. A token that fails to parse is kept verbatim as the timestamp;
/// the remainder is still the post-split rest of the line.
pub fn extract_timestamp(line: &str, enabled: bool) -> (Option<String>, &str) {
    if !enabled {
        return (None, line);
    }
    let (candidate, rest) = line.split_once(' ').unwrap_or((line, ""));
    let timestamp = match chrono::DateTime::parse_from_rfc3339(candidate) {
        Ok(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
        Err(_) => candidate.to_string(),
    };
    (Some(timestamp), rest)
}

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warning | Severity::Panic => Color::Yellow,
        Severity::Debug => Color::Cyan,
        Severity::Normal => Color::White,
    }
}

/// Recompose a line as alternating base-colored gaps and highlighted match
/// spans, in a single pass over all non-overlapping keyword matches.
///
/// Stripping the color codes from the result reproduces the input exactly.
pub fn highlight(text: &str, keyword: Option<&Regex>, base: Color, mark: Color) -> String {
    let Some(re) = keyword else {
        return text.with(base).to_string();
    };

    let mut out = String::new();
    let mut cursor = 0;
    let mut matched = false;
    for m in re.find_iter(text) {
        if m.start() == m.end() {
            continue;
        }
        matched = true;
        if m.start() > cursor {
            let _ = write!(out, "{}", text[cursor..m.start()].with(base));
        }
        let _ = write!(out, "{}", m.as_str().on(mark));
        cursor = m.end();
    }
    if !matched {
        return text.with(base).to_string();
    }
    if cursor < text.len() {
        let _ = write!(out, "{}", text[cursor..].with(base));
    }
    out
}

/// Compose one output line: pod prefix, dim timestamp, then the colored and
/// highlighted line body. Returns None when keyword-only mode suppresses
/// the line.
pub fn render(line: &str, ctx: &RenderContext, pod: Option<(&str, Color)>) -> Option<String> {
    let (timestamp, rest) = extract_timestamp(line, ctx.show_timestamps);
    let severity = severity_of(rest);

    if ctx.keyword_only
        && let Some(re) = &ctx.keyword
        && !re.is_match(rest)
    {
        return None;
    }

    let base = severity_color(severity);
    let body = highlight(rest, ctx.keyword.as_ref(), base, HIGHLIGHT_COLOR);

    let mut out = String::new();
    if let Some((name, color)) = pod {
        let _ = write!(out, "{} ", format!("[{}]", name).with(color));
    }
    if let Some(ts) = timestamp
        && !ts.is_empty()
    {
        let _ = write!(out, "{} ", ts.with(Color::DarkGrey).dim());
    }
    out.push_str(&body);
    Some(out)
}
