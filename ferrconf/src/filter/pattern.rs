//! Pattern matching utilities for context and value lookups.

use regex::{Regex, RegexBuilder};

/// Trait for matching a context line - regex by default, exact text for `str`.
pub trait ContextMatcher: Send + Sync {
    /// Check if a raw line (indentation included) opens the wanted context.
    fn matches_line(&self, line: &str) -> bool;
}

/// Unanchored regex search over the raw line.
impl ContextMatcher for Regex {
    fn matches_line(&self, line: &str) -> bool {
        self.is_match(line)
    }
}

/// Exact command text, ignoring surrounding whitespace.
impl ContextMatcher for str {
    fn matches_line(&self, line: &str) -> bool {
        line.trim() == self.trim()
    }
}

impl ContextMatcher for String {
    fn matches_line(&self, line: &str) -> bool {
        self.as_str().matches_line(line)
    }
}

impl<T: ContextMatcher + ?Sized> ContextMatcher for &T {
    fn matches_line(&self, line: &str) -> bool {
        (**self).matches_line(line)
    }
}

/// Compile a pattern string into a regex.
///
/// - `/body/flags` compiles `body`, with flags `i` (case-insensitive),
///   `m` (`.` matches newlines) and `x` (ignore whitespace).
/// - Anything else is literal command text that must match a whole line,
///   surrounding whitespace ignored.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    if let Some((body, flags)) = split_delimited(pattern) {
        return RegexBuilder::new(body)
            .case_insensitive(flags.contains('i'))
            .dot_matches_new_line(flags.contains('m'))
            .ignore_whitespace(flags.contains('x'))
            .build();
    }

    Regex::new(&format!(r"^\s*{}\s*$", regex::escape(pattern.trim())))
}

fn split_delimited(pattern: &str) -> Option<(&str, &str)> {
    let rest = pattern.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    let flags = &rest[end + 1..];
    if flags.chars().all(|c| matches!(c, 'i' | 'm' | 'x')) {
        Some((&rest[..end], flags))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_context_matcher() {
        let pattern = Regex::new(r"router ospf bar").unwrap();
        assert!(pattern.matches_line("router ospf bar"));
        assert!(pattern.matches_line("  router ospf bar"));
        assert!(!pattern.matches_line("router ospf baz"));
    }

    #[test]
    fn test_str_context_matcher() {
        assert!("vrf red".matches_line("    vrf red"));
        assert!(!"vrf red".matches_line("  vrf redder"));
        assert!(String::from("vrf red").matches_line("vrf red  "));
    }

    #[test]
    fn test_compile_delimited() {
        let pattern = compile_pattern("/^log-adjacency-changes.*$/").unwrap();
        assert!(pattern.is_match("log-adjacency-changes detail"));
        assert!(!pattern.is_match("  log-adjacency-changes"));

        let pattern = compile_pattern("/^VRF RED$/i").unwrap();
        assert!(pattern.is_match("vrf red"));
    }

    #[test]
    fn test_compile_literal() {
        let pattern = compile_pattern("ip route 10.0.0.0/8 null0").unwrap();
        assert!(pattern.is_match("  ip route 10.0.0.0/8 null0"));
        assert!(!pattern.is_match("ip route 10.0.0.0/8 null0 tag 5"));
        assert!(!pattern.is_match("ip route 10.0.0.0x8 null0"));

        // Trailing text after the last slash is not a flag set
        let pattern = compile_pattern("/usr/bin").unwrap();
        assert!(pattern.is_match("/usr/bin"));
    }

    #[test]
    fn test_compile_invalid() {
        assert!(compile_pattern("/(unclosed/").is_err());
    }
}
