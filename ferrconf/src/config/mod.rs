//! Configuration tree model.
//!
//! A [`Configuration`] is an ordered forest of [`ConfigLine`]s built from
//! indentation-structured command text. Trees are never mutated after
//! construction; the diff engine and the minimal-change builder always return
//! new values.

mod diff;
pub mod minimal;
mod parser;

pub use minimal::{MinimalMap, build_min_config_hash, config_hash_to_str, minimal_diff};
pub use parser::{ParseOptions, parse, parse_with};

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StructuralError};

/// Leading token that turns a command into a removal.
pub const NEGATION_PREFIX: &str = "no ";

/// The text of one command, tagged by whether it is a negation.
///
/// `Negative` holds the text following the `no ` token, so `no foo` and
/// `foo` can never compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// A command that sets something.
    Positive(String),
    /// A `no ...` command that removes or resets something.
    Negative(String),
}

impl Command {
    /// Classify trimmed command text.
    pub fn parse(text: &str) -> Self {
        match text.strip_prefix(NEGATION_PREFIX) {
            Some(rest) if !rest.trim().is_empty() => Command::Negative(rest.to_string()),
            _ => Command::Positive(text.to_string()),
        }
    }

    /// The full command text as it is sent to a device.
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Command::Positive(text) => Cow::Borrowed(text),
            Command::Negative(text) => Cow::Owned(format!("{}{}", NEGATION_PREFIX, text)),
        }
    }

    /// Check if this is a negation command.
    pub fn is_negated(&self) -> bool {
        matches!(self, Command::Negative(_))
    }

    /// Check if the full text equals `text` without allocating.
    pub fn is(&self, text: &str) -> bool {
        match self {
            Command::Positive(own) => own == text,
            Command::Negative(own) => text
                .strip_prefix(NEGATION_PREFIX)
                .is_some_and(|rest| rest == own),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Positive(text) => f.write_str(text),
            Command::Negative(text) => write!(f, "{}{}", NEGATION_PREFIX, text),
        }
    }
}

/// One command line and the submode body nested under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigLine {
    /// The command, without indentation.
    pub command: Command,

    /// Indentation width the line was parsed at.
    pub depth: usize,

    /// Lines nested under this one, in source order.
    pub children: Vec<ConfigLine>,
}

impl ConfigLine {
    /// Create a childless line.
    pub fn new(text: &str, depth: usize) -> Self {
        Self {
            command: Command::parse(text),
            depth,
            children: Vec::new(),
        }
    }

    /// Add a nested line.
    pub fn with_child(mut self, child: ConfigLine) -> Self {
        self.children.push(child);
        self
    }

    /// The full command text.
    pub fn text(&self) -> Cow<'_, str> {
        self.command.text()
    }

    /// Check if the line is a `no ...` command.
    pub fn negated(&self) -> bool {
        self.command.is_negated()
    }

    /// Check if the line has no submode body.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Count this line and every line below it.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ConfigLine::count).sum::<usize>()
    }

    fn validate(&self, path: &mut Vec<String>) -> std::result::Result<(), StructuralError> {
        let text = self.text();
        path.push(text.to_string());

        if text.trim().is_empty() {
            return Err(StructuralError::EmptyCommand {
                path: path.join(" > "),
            });
        }
        if text.trim() != text || text.contains(['\n', '\r']) {
            return Err(StructuralError::MalformedCommand {
                path: path.join(" > "),
                text: text.to_string(),
            });
        }

        for child in &self.children {
            if child.depth <= self.depth {
                path.push(child.text().to_string());
                return Err(StructuralError::UnindentedChild {
                    path: path.join(" > "),
                    parent_depth: self.depth,
                    child_depth: child.depth,
                });
            }
            child.validate(path)?;
        }

        path.pop();
        Ok(())
    }
}

/// Rendering settings for turning trees back into text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Spaces per nesting level.
    pub indent: usize,
}

impl RenderOptions {
    /// Create render options with the default two-space indent.
    pub fn new() -> Self {
        Self { indent: 2 }
    }

    /// Set the number of spaces per nesting level.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed configuration: an ordered forest of command lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    lines: Vec<ConfigLine>,

    /// Raw text this configuration was parsed from.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    source: String,
}

impl Configuration {
    /// Build a configuration from already-constructed lines.
    pub fn new(lines: Vec<ConfigLine>) -> Self {
        Self {
            lines,
            source: String::new(),
        }
    }

    pub(crate) fn with_source(lines: Vec<ConfigLine>, source: impl Into<String>) -> Self {
        Self {
            lines,
            source: source.into(),
        }
    }

    /// Top-level lines in order.
    pub fn lines(&self) -> &[ConfigLine] {
        &self.lines
    }

    /// The raw text this configuration was parsed from (empty if built in code).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of top-level lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the configuration has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterate over top-level lines.
    pub fn iter(&self) -> std::slice::Iter<'_, ConfigLine> {
        self.lines.iter()
    }

    /// Check if a top-level line has exactly this command text.
    pub fn contains_command(&self, text: &str) -> bool {
        self.lines.iter().any(|line| line.command.is(text))
    }

    /// Descend through submodes by exact command text and return the body of
    /// the last one. An empty path returns the top level.
    pub fn mode(&self, path: &[&str]) -> Option<&[ConfigLine]> {
        let mut level: &[ConfigLine] = &self.lines;
        for text in path {
            level = &level.iter().find(|line| line.command.is(text))?.children;
        }
        Some(level)
    }

    /// Check that every node carries a single trimmed command and that every
    /// child is indented deeper than its parent.
    pub fn validate(&self) -> Result<()> {
        let mut path = Vec::new();
        for line in &self.lines {
            line.validate(&mut path)?;
        }
        Ok(())
    }

    /// Check if everything in `self` is already present in `other`.
    pub fn is_satisfied_by(&self, other: &Configuration) -> Result<bool> {
        Ok(self.compare_with(other)?.is_empty())
    }

    /// Render as indented text, two spaces per level.
    pub fn render(&self) -> String {
        self.render_with(&RenderOptions::default())
    }

    /// Render as indented text with custom options.
    pub fn render_with(&self, options: &RenderOptions) -> String {
        let mut out = String::new();
        render_lines(&self.lines, 0, options.indent, &mut out);
        out
    }
}

fn render_lines(lines: &[ConfigLine], level: usize, indent: usize, out: &mut String) {
    for line in lines {
        out.extend(std::iter::repeat_n(' ', level * indent));
        out.push_str(&line.text());
        out.push('\n');
        render_lines(&line.children, level + 1, indent, out);
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<'a> IntoIterator for &'a Configuration {
    type Item = &'a ConfigLine;
    type IntoIter = std::slice::Iter<'a, ConfigLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_command_negation() {
        assert_eq!(
            Command::parse("no shutdown"),
            Command::Negative("shutdown".to_string())
        );
        assert_eq!(
            Command::parse("shutdown"),
            Command::Positive("shutdown".to_string())
        );

        // Only the lowercase single leading token negates
        assert!(!Command::parse("No shutdown").is_negated());
        assert!(!Command::parse("notify all").is_negated());
        assert!(!Command::parse("no").is_negated());

        assert_ne!(Command::parse("no foo"), Command::parse("foo"));
        assert_eq!(Command::parse("no foo").text(), "no foo");
    }

    #[test]
    fn test_command_is() {
        let cmd = Command::parse("no interface loopback12");
        assert!(cmd.is("no interface loopback12"));
        assert!(!cmd.is("interface loopback12"));

        let cmd = Command::parse("interface loopback12");
        assert!(cmd.is("interface loopback12"));
        assert!(!cmd.is("no interface loopback12"));
    }

    #[test]
    fn test_mode_navigation() {
        let config = parse("router ospf foo\n  vrf red\n    area 0\nlogging on\n").unwrap();

        let top = config.mode(&[]).unwrap();
        assert_eq!(top.len(), 2);

        let vrf = config.mode(&["router ospf foo", "vrf red"]).unwrap();
        assert_eq!(vrf.len(), 1);
        assert_eq!(vrf[0].text(), "area 0");

        assert!(config.mode(&["router ospf foo", "vrf blue"]).is_none());
        assert!(config.contains_command("logging on"));
        assert!(!config.contains_command("vrf red"));
    }

    #[test]
    fn test_render_nesting() {
        let config = parse("a\n    b\n        c\nd\n").unwrap();
        assert_eq!(config.render(), "a\n  b\n    c\nd\n");
        assert_eq!(
            config.render_with(&RenderOptions::new().with_indent(1)),
            "a\n b\n  c\nd\n"
        );
        assert_eq!(config.to_string(), config.render());
    }

    #[test]
    fn test_validate_rejects_empty_command() {
        let config = Configuration::new(vec![
            ConfigLine::new("interface loopback0", 0).with_child(ConfigLine::new("", 2)),
        ]);
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::EmptyCommand { ref path }) if path == "interface loopback0 > "
        ));
    }

    #[test]
    fn test_validate_rejects_unindented_child() {
        let config = Configuration::new(vec![
            ConfigLine::new("router bgp 1", 2).with_child(ConfigLine::new("neighbor 1.1.1.1", 2)),
        ]);
        match config.validate() {
            Err(Error::Structural(StructuralError::UnindentedChild {
                parent_depth,
                child_depth,
                ..
            })) => {
                assert_eq!(parent_depth, 2);
                assert_eq!(child_depth, 2);
            }
            other => panic!("expected UnindentedChild, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_rejects_multiline_command() {
        let config = Configuration::new(vec![ConfigLine::new("a\nb", 0)]);
        assert!(matches!(
            config.validate(),
            Err(Error::Structural(StructuralError::MalformedCommand { .. }))
        ));
    }

    #[test]
    fn test_serde_shape() {
        let config = parse("no ip domain-lookup\nhostname r1\n").unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["lines"][0]["command"]["Negative"], "ip domain-lookup");
        assert_eq!(json["lines"][1]["command"]["Positive"], "hostname r1");
        assert_eq!(json["lines"][1]["depth"], 0);
    }
}
