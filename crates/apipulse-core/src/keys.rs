//! Composite keys identifying aggregated telemetry rows.
//!
//! Keys are immutable value types compared and hashed by value. Constructors
//! normalize their inputs (method uppercasing, length caps, truncation) so two
//! observations of the same logical event always land on the same row.

/// Consumer identifier length cap.
const MAX_CONSUMER_IDENTIFIER_LEN: usize = 128;
/// Consumer name/group length cap.
const MAX_CONSUMER_FIELD_LEN: usize = 64;
/// Server error message length cap.
const MAX_ERROR_MSG_LEN: usize = 2048;
/// Server error stack trace length cap.
const MAX_STACKTRACE_LEN: usize = 65536;

const MSG_TRUNC_SUFFIX: &str = "... (truncated)";
const STACKTRACE_TRUNC_PREFIX: &str = "... (truncated) ...";

/// Identifies one row in the request counter table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    /// Consumer identifier, if the request was attributed to one.
    pub consumer: Option<String>,
    /// HTTP method, uppercased.
    pub method: String,
    /// Templated route pattern (path parameters unresolved).
    pub path: String,
    /// Response status code.
    pub status_code: u16,
}

impl RequestKey {
    pub fn new(consumer: Option<String>, method: &str, path: &str, status_code: u16) -> Self {
        Self {
            consumer,
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            status_code,
        }
    }
}

/// Identifies one distinct client validation failure signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ValidationErrorKey {
    pub consumer: Option<String>,
    /// HTTP method, uppercased.
    pub method: String,
    /// Templated route pattern.
    pub path: String,
    /// Location of the offending field, e.g. `["body", "name"]`.
    pub loc: Vec<String>,
    /// Human-readable error message.
    pub msg: String,
    /// Machine-readable error type, e.g. `"missing"`.
    pub error_type: String,
}

impl ValidationErrorKey {
    pub fn new(
        consumer: Option<String>,
        method: &str,
        path: &str,
        loc: &[&str],
        msg: &str,
        error_type: &str,
    ) -> Self {
        Self {
            consumer,
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.to_string(),
            error_type: error_type.to_string(),
        }
    }
}

/// Identifies one distinct server error (5xx) signature.
///
/// Message and stack trace are truncated at construction so adversarial error
/// payloads cannot blow up row size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerErrorKey {
    pub consumer: Option<String>,
    /// HTTP method, uppercased.
    pub method: String,
    /// Templated route pattern.
    pub path: String,
    /// Error type name, e.g. `"sqlx::Error"`.
    pub error_type: String,
    /// Error message, truncated to 2048 chars.
    pub msg: String,
    /// Stack trace, truncated to 65536 chars keeping the most recent frames.
    pub stacktrace: String,
}

impl ServerErrorKey {
    pub fn new(
        consumer: Option<String>,
        method: &str,
        path: &str,
        error_type: &str,
        msg: &str,
        stacktrace: &str,
    ) -> Self {
        Self {
            consumer,
            method: method.to_ascii_uppercase(),
            path: path.to_string(),
            error_type: error_type.to_string(),
            msg: truncate_msg(msg),
            stacktrace: truncate_stacktrace(stacktrace),
        }
    }
}

/// An identified API consumer (e.g. an API key holder).
///
/// Field lengths are capped at construction; an identifier that is empty after
/// trimming yields no consumer at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consumer {
    pub identifier: String,
    pub name: Option<String>,
    pub group: Option<String>,
}

impl Consumer {
    pub fn new(identifier: &str, name: Option<&str>, group: Option<&str>) -> Option<Self> {
        let identifier = clip(identifier.trim(), MAX_CONSUMER_IDENTIFIER_LEN);
        if identifier.is_empty() {
            return None;
        }
        Some(Self {
            identifier,
            name: clip_opt(name),
            group: clip_opt(group),
        })
    }

    /// Consumer carrying only an identifier, as extracted from a request.
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        Self::new(identifier, None, None)
    }
}

fn clip(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

fn clip_opt(s: Option<&str>) -> Option<String> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    Some(clip(s, MAX_CONSUMER_FIELD_LEN))
}

/// Truncate an error message to the cap, marking the cut at the end.
fn truncate_msg(msg: &str) -> String {
    let msg = msg.trim();
    if msg.chars().count() <= MAX_ERROR_MSG_LEN {
        return msg.to_string();
    }
    let cutoff = MAX_ERROR_MSG_LEN - MSG_TRUNC_SUFFIX.len();
    let mut out: String = msg.chars().take(cutoff).collect();
    out.push_str(MSG_TRUNC_SUFFIX);
    out
}

/// Truncate a stack trace to the cap, keeping whole lines from the end (the
/// most recent frames) and marking the cut at the top.
fn truncate_stacktrace(stacktrace: &str) -> String {
    let stacktrace = stacktrace.trim();
    if stacktrace.len() <= MAX_STACKTRACE_LEN {
        return stacktrace.to_string();
    }
    let cutoff = MAX_STACKTRACE_LEN - STACKTRACE_TRUNC_PREFIX.len() - 1;
    let mut kept: Vec<&str> = Vec::new();
    let mut length = 0;
    for line in stacktrace.lines().rev() {
        if length + line.len() + 1 > cutoff {
            break;
        }
        kept.push(line);
        length += line.len() + 1;
    }
    kept.push(STACKTRACE_TRUNC_PREFIX);
    kept.reverse();
    kept.join("\n")
}
