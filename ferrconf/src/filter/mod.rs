//! Context-scoped extraction from raw CLI text.
//!
//! These functions work on retrieved "show" output directly, without building
//! a [`Configuration`](crate::Configuration) tree. Scoping is structural: each
//! context step narrows the text to the indented body of the matched line, so
//! a line living only in a parent submode can never leak into a narrower
//! lookup.
//!
//! # Example
//!
//! ```
//! use ferrconf::filter::{CliFilter, Filtered};
//! use regex::Regex;
//!
//! let output = "router ospf 1\n  vrf red\n    log-adjacency-changes detail\n";
//! let found = CliFilter::new()
//!     .context(Regex::new("router ospf 1").unwrap())
//!     .context("vrf red")
//!     .value(Regex::new(r"^log-adjacency-changes\s*(\S*)$").unwrap())
//!     .apply(output);
//!
//! assert_eq!(found, Some(Filtered::Lines(vec!["detail".to_string()])));
//! ```

mod pattern;

pub use pattern::{ContextMatcher, compile_pattern};

use std::borrow::Cow;
use std::fmt;

use log::{debug, trace};
use regex::Regex;
use serde::Serialize;

use crate::error::Result;

/// Unindented line that closes a submode body in running-config output.
const TERMINATOR: &str = "!";

/// Result of a [`filter_cli`] lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Filtered {
    /// The scoped text itself (no value pattern was given).
    Text(String),

    /// Matching lines, or the single capture group of each match.
    Lines(Vec<String>),

    /// One entry per match, holding every capture group in order.
    Captures(Vec<Vec<String>>),
}

impl Filtered {
    /// Get the scoped text, if no value pattern was applied.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Filtered::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Get the matched lines or single-group captures.
    pub fn as_lines(&self) -> Option<&[String]> {
        match self {
            Filtered::Lines(lines) => Some(lines),
            _ => None,
        }
    }

    /// Get the multi-group captures.
    pub fn as_captures(&self) -> Option<&[Vec<String>]> {
        match self {
            Filtered::Captures(captures) => Some(captures),
            _ => None,
        }
    }

    /// The first scalar value: the first line, or the first group of the
    /// first match.
    pub fn first(&self) -> Option<&str> {
        match self {
            Filtered::Text(text) => text.lines().next(),
            Filtered::Lines(lines) => lines.first().map(String::as_str),
            Filtered::Captures(captures) => captures.first()?.first().map(String::as_str),
        }
    }

    /// Consume into the list of matched lines or single-group captures.
    pub fn into_lines(self) -> Option<Vec<String>> {
        match self {
            Filtered::Lines(lines) => Some(lines),
            _ => None,
        }
    }
}

/// Width of a line's leading whitespace. Blank lines count as unindented.
fn indentation(line: &str) -> usize {
    let content = line.trim_start();
    if content.is_empty() {
        0
    } else {
        line.len() - content.len()
    }
}

fn strip_indent(line: &str, width: usize) -> &str {
    line.get(width..).unwrap_or_else(|| line.trim_start())
}

/// Find the submode body opened by the first line matching `context`.
///
/// The body is the run of following lines indented deeper than the matched
/// line. It ends at the first line indented no deeper (blank lines included),
/// at a bare `!` line, or at the end of the text. Indented `!` lines closing
/// nested submodes stay in the body. The common indentation of the body is
/// stripped so the result can be narrowed again.
///
/// Returns `None` if no line matches or the matched line has no body.
pub fn find_subconfig<M: ContextMatcher + ?Sized>(text: &str, context: &M) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.iter().position(|line| context.matches_line(line))?;
    let base = indentation(lines[start]);

    let body: Vec<&str> = lines[start + 1..]
        .iter()
        .copied()
        .take_while(|line| line.trim_end() != TERMINATOR && indentation(line) > base)
        .collect();

    let width = body.iter().map(|line| indentation(line)).min()?;
    Some(
        body.iter()
            .map(|line| strip_indent(line, width))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// Narrow `cli_output` through each `context` pattern in turn, then
/// optionally pull values out of the scoped mode with `value`.
///
/// Without `value` the scoped text is returned. With `value`, only the lines
/// belonging to the scoped mode itself are tested (deeper submodes are not):
/// - no capture groups: the full matching lines,
/// - one group: the captured substrings,
/// - several groups: one `Vec` of all groups per match.
///
/// Returns `None` when a context step finds nothing, the scoped text is
/// empty, or `value` matches nothing.
pub fn filter_cli(cli_output: &str, context: &[Regex], value: Option<&Regex>) -> Option<Filtered> {
    lookup(cli_output, context, value)
}

fn lookup<M: ContextMatcher>(
    cli_output: &str,
    context: &[M],
    value: Option<&Regex>,
) -> Option<Filtered> {
    let scoped = narrow(cli_output, context)?;
    match value {
        None => Some(Filtered::Text(scoped.into_owned())),
        Some(value) => extract(&scoped, value),
    }
}

fn narrow<'a, M: ContextMatcher>(cli_output: &'a str, context: &[M]) -> Option<Cow<'a, str>> {
    let mut scoped = Cow::Borrowed(cli_output);
    for (step, matcher) in context.iter().enumerate() {
        match find_subconfig(&scoped, matcher) {
            Some(body) => scoped = Cow::Owned(body),
            None => {
                debug!("Context step {} matched no submode body", step);
                return None;
            }
        }
    }

    if scoped.trim().is_empty() {
        return None;
    }
    Some(scoped)
}

/// Lines belonging to the scoped mode itself, indentation stripped.
///
/// A line belongs to the mode when it is indented no deeper than every
/// mode line before it, the same rule the parser uses to close open lines.
/// Lines nested under an earlier line are skipped.
fn mode_lines(scoped: &str) -> Vec<&str> {
    let mut floor = usize::MAX;
    let mut lines = Vec::new();
    for line in scoped.lines().filter(|line| !line.trim().is_empty()) {
        let width = indentation(line);
        if width <= floor {
            floor = width;
            lines.push(strip_indent(line, width));
        }
    }
    lines
}

fn extract(scoped: &str, value: &Regex) -> Option<Filtered> {
    let lines = mode_lines(scoped);

    let groups = value.captures_len() - 1;
    let (filtered, found) = match groups {
        0 => {
            let matched: Vec<String> = lines
                .into_iter()
                .filter(|line| value.is_match(line))
                .map(str::to_string)
                .collect();
            let found = matched.len();
            (Filtered::Lines(matched), found)
        }
        1 => {
            let captured: Vec<String> = lines
                .into_iter()
                .flat_map(|line| value.captures_iter(line))
                .map(|caps| group(&caps, 1))
                .collect();
            let found = captured.len();
            (Filtered::Lines(captured), found)
        }
        _ => {
            let captured: Vec<Vec<String>> = lines
                .into_iter()
                .flat_map(|line| value.captures_iter(line))
                .map(|caps| (1..=groups).map(|i| group(&caps, i)).collect())
                .collect();
            let found = captured.len();
            (Filtered::Captures(captured), found)
        }
    };
    trace!("Value pattern '{}' matched {} times", value.as_str(), found);

    if found == 0 { None } else { Some(filtered) }
}

/// An optional group that did not take part in the match yields "".
fn group(caps: &regex::Captures<'_>, index: usize) -> String {
    caps.get(index)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Builder for a reusable context/value lookup.
///
/// Context steps may be regexes or exact command text (anything implementing
/// [`ContextMatcher`]).
#[derive(Default)]
pub struct CliFilter {
    context: Vec<Box<dyn ContextMatcher>>,
    value: Option<Regex>,
}

impl CliFilter {
    /// Create a filter with no context and no value pattern.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a filter from pattern strings (see [`compile_pattern`]).
    pub fn from_patterns(context: &[&str], value: Option<&str>) -> Result<Self> {
        let mut filter = Self::new();
        for pattern in context {
            filter = filter.context(compile_pattern(pattern)?);
        }
        if let Some(pattern) = value {
            filter = filter.value(compile_pattern(pattern)?);
        }
        Ok(filter)
    }

    /// Add a context step.
    pub fn context(mut self, matcher: impl ContextMatcher + 'static) -> Self {
        self.context.push(Box::new(matcher));
        self
    }

    /// Set the value pattern.
    pub fn value(mut self, value: Regex) -> Self {
        self.value = Some(value);
        self
    }

    /// Run the lookup against `cli_output`.
    pub fn apply(&self, cli_output: &str) -> Option<Filtered> {
        lookup(cli_output, &self.context, self.value.as_ref())
    }
}

impl ContextMatcher for Box<dyn ContextMatcher> {
    fn matches_line(&self, line: &str) -> bool {
        (**self).matches_line(line)
    }
}

impl fmt::Debug for CliFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliFilter")
            .field("context", &format_args!("<{} steps>", self.context.len()))
            .field("value", &self.value.as_ref().map(Regex::as_str))
            .finish()
    }
}
