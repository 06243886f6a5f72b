//! Indentation parser.
//!
//! Converts command text into a [`Configuration`] using the width of each
//! line's leading spaces as its nesting signal.

use log::{debug, trace, warn};
use memchr::memchr;

use super::{ConfigLine, Configuration};
use crate::error::{ParseError, Result};

/// Commands that only leave a submode.
const MODE_EXITS: &[&str] = &["exit", "end"];

/// Parser settings.
///
/// The defaults keep every non-blank line, which is what [`parse`] uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Lines whose trimmed text starts with this marker are dropped.
    pub comment_marker: Option<String>,

    /// Drop bare `exit` / `end` lines.
    pub skip_mode_exits: bool,
}

impl ParseOptions {
    /// Create parser options that keep every non-blank line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop lines starting with `marker` (e.g. `!` in running-config dumps).
    pub fn with_comment_marker(mut self, marker: impl Into<String>) -> Self {
        self.comment_marker = Some(marker.into());
        self
    }

    /// Drop bare `exit` / `end` lines.
    pub fn with_mode_exits(mut self, skip: bool) -> Self {
        self.skip_mode_exits = skip;
        self
    }

    fn skips(&self, text: &str) -> bool {
        if let Some(ref marker) = self.comment_marker {
            if !marker.is_empty() && text.starts_with(marker.as_str()) {
                return true;
            }
        }
        self.skip_mode_exits && MODE_EXITS.contains(&text)
    }
}

/// Parse indentation-structured command text with default options.
///
/// # Example
///
/// ```
/// let config = ferrconf::parse("interface loopback0\n  description uplink\n").unwrap();
/// assert_eq!(config.len(), 1);
/// assert_eq!(config.lines()[0].children[0].text(), "description uplink");
/// ```
pub fn parse(text: &str) -> Result<Configuration> {
    parse_with(text, &ParseOptions::default())
}

/// Parse indentation-structured command text.
///
/// Blank lines are dropped. A tab anywhere in a line's leading whitespace is
/// rejected with [`ParseError::IndentTab`]. A line attaches under the nearest
/// preceding line with a smaller indentation, however large the jump.
pub fn parse_with(text: &str, options: &ParseOptions) -> Result<Configuration> {
    let mut roots: Vec<ConfigLine> = Vec::new();
    // Open ancestor chain; the last element is the innermost open line.
    let mut stack: Vec<ConfigLine> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let content = line.trim_start();
        if content.trim_end().is_empty() {
            continue;
        }

        let indent = &line[..line.len() - content.len()];
        if memchr(b'\t', indent.as_bytes()).is_some() {
            warn!("Rejecting tab indentation at line {}", index + 1);
            return Err(ParseError::IndentTab {
                line: index + 1,
                content: line.to_string(),
            }
            .into());
        }

        let content = content.trim_end();
        if options.skips(content) {
            trace!("Skipping line {}: '{}'", index + 1, content);
            continue;
        }

        let depth = indent.bytes().filter(|b| *b == b' ').count();
        while stack.last().is_some_and(|open| open.depth >= depth) {
            close_innermost(&mut stack, &mut roots);
        }
        stack.push(ConfigLine::new(content, depth));
    }

    while !stack.is_empty() {
        close_innermost(&mut stack, &mut roots);
    }

    debug!("Parsed {} top-level configuration lines", roots.len());
    Ok(Configuration::with_source(roots, text))
}

/// Pop the innermost open line and attach it to its parent (or the roots).
fn close_innermost(stack: &mut Vec<ConfigLine>, roots: &mut Vec<ConfigLine>) {
    if let Some(done) = stack.pop() {
        match stack.last_mut() {
            Some(parent) => parent.children.push(done),
            None => roots.push(done),
        }
    }
}
