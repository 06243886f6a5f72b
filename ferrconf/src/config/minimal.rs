//! Minimal-change builder.
//!
//! Reduces a superset diff to the commands that really have to be sent and
//! renders them back to indented text.
//!
//! # Example
//!
//! ```
//! use ferrconf::{config_hash_to_str, minimal_diff, parse};
//!
//! let running = parse("interface loopback10\n  description foo\ninterface loopback11\n").unwrap();
//! let desired = parse("interface loopback10\n  description 10\ninterface loopback11\n").unwrap();
//!
//! let min = minimal_diff(&desired, &running).unwrap();
//! assert_eq!(config_hash_to_str(&min), "interface loopback10\n  description 10\n");
//! ```

use std::fmt;

use indexmap::IndexMap;
use indexmap::map::{Entry, Iter};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use super::{Command, ConfigLine, Configuration, RenderOptions};
use crate::error::Result;

/// Ordered nested mapping of command text to the commands nested under it.
///
/// A leaf command maps to an empty map. Iteration follows insertion order,
/// which is the order commands must be sent in. Equality is ordered too.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MinimalMap {
    entries: IndexMap<String, MinimalMap>,
}

impl MinimalMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command with its nested body.
    pub fn with(mut self, command: impl Into<String>, body: MinimalMap) -> Self {
        self.insert(command, body);
        self
    }

    /// Add a leaf command.
    pub fn with_leaf(self, command: impl Into<String>) -> Self {
        self.with(command, MinimalMap::new())
    }

    /// Insert a command, merging its body into an existing entry of the same text.
    pub fn insert(&mut self, command: impl Into<String>, body: MinimalMap) {
        match self.entries.entry(command.into()) {
            Entry::Occupied(mut existing) => existing.get_mut().merge(body),
            Entry::Vacant(slot) => {
                slot.insert(body);
            }
        }
    }

    fn merge(&mut self, other: MinimalMap) {
        for (command, body) in other.entries {
            self.insert(command, body);
        }
    }

    fn insert_line(&mut self, line: &ConfigLine) {
        let body = self.entries.entry(line.text().into_owned()).or_default();
        for child in &line.children {
            body.insert_line(child);
        }
    }

    /// Get the body nested under a command.
    pub fn get(&self, command: &str) -> Option<&MinimalMap> {
        self.entries.get(command)
    }

    /// Check if the map holds a command at this level.
    pub fn contains_key(&self, command: &str) -> bool {
        self.entries.contains_key(command)
    }

    /// Number of commands at this level.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over commands at this level in order.
    pub fn iter(&self) -> Iter<'_, String, MinimalMap> {
        self.entries.iter()
    }

    /// Every command in send order, flattened without indentation.
    pub fn commands(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_commands(&mut out);
        out
    }

    fn collect_commands<'a>(&'a self, out: &mut Vec<&'a str>) {
        for (command, body) in &self.entries {
            out.push(command);
            body.collect_commands(out);
        }
    }

    /// Render as indented text, two spaces per level.
    pub fn render(&self) -> String {
        self.render_with(&RenderOptions::default())
    }

    /// Render as indented text with custom options.
    pub fn render_with(&self, options: &RenderOptions) -> String {
        let mut out = String::new();
        self.render_level(0, options.indent, &mut out);
        out
    }

    fn render_level(&self, level: usize, indent: usize, out: &mut String) {
        for (command, body) in &self.entries {
            out.extend(std::iter::repeat_n(' ', level * indent));
            out.push_str(command);
            out.push('\n');
            body.render_level(level + 1, indent, out);
        }
    }
}

impl PartialEq for MinimalMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(other.entries.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
    }
}

impl Eq for MinimalMap {}

impl From<&Configuration> for MinimalMap {
    /// Repeated sibling commands collapse into one key at the first
    /// occurrence, with their bodies merged in order.
    fn from(config: &Configuration) -> Self {
        let mut map = MinimalMap::new();
        for line in config.lines() {
            map.insert_line(line);
        }
        map
    }
}

impl<'a> IntoIterator for &'a MinimalMap {
    type Item = (&'a String, &'a MinimalMap);
    type IntoIter = Iter<'a, String, MinimalMap>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for MinimalMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Reduce `superset` (usually `desired.compare_with(running)`) to the
/// commands that must be sent to reach `desired`.
///
/// For each superset entry:
/// - a `no ...` command present in `desired` is kept as-is,
/// - a command whose body is identical in `desired` is kept whole,
/// - a command whose body differs keeps only the nested entries that survive
///   the same reduction, and is dropped if none do,
/// - anything not in `desired` is dropped.
pub fn build_min_config_hash(superset: &Configuration, desired: &Configuration) -> Result<MinimalMap> {
    superset.validate()?;
    desired.validate()?;

    let min = reduce(&MinimalMap::from(superset), &MinimalMap::from(desired));
    debug!(
        "Reduced {} superset commands to {} top-level commands",
        superset.len(),
        min.len()
    );
    Ok(min)
}

fn reduce(superset: &MinimalMap, desired: &MinimalMap) -> MinimalMap {
    let mut min = MinimalMap::new();

    for (command, body) in superset {
        let Some(wanted) = desired.get(command) else {
            trace!("Dropping '{}': not in desired config", command);
            continue;
        };

        if Command::parse(command).is_negated() || body == wanted {
            min.insert(command.clone(), body.clone());
            continue;
        }

        let nested = reduce(body, wanted);
        if nested.is_empty() {
            trace!("Dropping '{}': nothing left to change below it", command);
        } else {
            min.insert(command.clone(), nested);
        }
    }

    min
}

/// Render a minimal map as indented command text.
pub fn config_hash_to_str(hash: &MinimalMap) -> String {
    hash.render()
}

/// Compute the minimal command set that converges `running` to `desired`.
pub fn minimal_diff(desired: &Configuration, running: &Configuration) -> Result<MinimalMap> {
    let superset = desired.compare_with(running)?;
    build_min_config_hash(&superset, desired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse;
    use crate::error::{Error, StructuralError};

    const RUNNING: &str = "\
interface loopback10
  description foo
interface loopback11
interface loopback12
interface loopback13
";

    const DESIRED: &str = "\
interface loopback10
  description 10
interface loopback11
no interface loopback12
interface loopback13
";

    #[test]
    fn test_loopback_minimal_change() {
        let running = parse(RUNNING).unwrap();
        let desired = parse(DESIRED).unwrap();

        let superset = desired.compare_with(&running).unwrap();
        let min = build_min_config_hash(&superset, &desired).unwrap();

        assert_eq!(
            config_hash_to_str(&min),
            "interface loopback10\n  description 10\nno interface loopback12\n"
        );
        assert_eq!(
            min.commands(),
            vec!["interface loopback10", "description 10", "no interface loopback12"]
        );
        assert!(!min.contains_key("interface loopback11"));
        assert!(!min.contains_key("interface loopback13"));
    }

    #[test]
    fn test_differing_body_keeps_only_changed_children() {
        let superset = parse("interface lo0\n  description new\n  mtu 9000\n").unwrap();
        let desired = parse("interface lo0\n  description new\n  shutdown\n").unwrap();

        let min = build_min_config_hash(&superset, &desired).unwrap();
        assert_eq!(min.render(), "interface lo0\n  description new\n");
    }

    #[test]
    fn test_not_in_desired_dropped() {
        let superset = parse("hostname r1\nip routing\n").unwrap();
        let desired = parse("ip routing\n").unwrap();
        let min = build_min_config_hash(&superset, &desired).unwrap();
        assert_eq!(min, MinimalMap::new().with_leaf("ip routing"));
    }

    #[test]
    fn test_negation_kept_with_its_body() {
        let superset = parse("no router ospf 1\n  area 0\n").unwrap();
        let desired = parse("no router ospf 1\n").unwrap();
        let min = build_min_config_hash(&superset, &desired).unwrap();
        assert_eq!(min.render(), "no router ospf 1\n  area 0\n");
    }

    #[test]
    fn test_empty_reduction_dropped() {
        let superset = parse("interface lo0\n  mtu 9000\n").unwrap();
        let desired = parse("interface lo0\n  shutdown\n").unwrap();
        assert!(build_min_config_hash(&superset, &desired).unwrap().is_empty());
    }

    #[test]
    fn test_duplicates_merge_into_one_key() {
        let config = parse("interface lo0\n  a\nhostname r1\ninterface lo0\n  b\n").unwrap();
        let map = MinimalMap::from(&config);
        assert_eq!(map.render(), "interface lo0\n  a\n  b\nhostname r1\n");
    }

    #[test]
    fn test_equality_is_ordered() {
        let ab = MinimalMap::new().with_leaf("a").with_leaf("b");
        let ba = MinimalMap::new().with_leaf("b").with_leaf("a");
        assert_ne!(ab, ba);
        assert_eq!(ab, MinimalMap::new().with_leaf("a").with_leaf("b"));
    }

    #[test]
    fn test_render_indent_option() {
        let map = MinimalMap::new().with("router ospf 1", MinimalMap::new().with_leaf("area 0"));
        assert_eq!(
            map.render_with(&RenderOptions::new().with_indent(4)),
            "router ospf 1\n    area 0\n"
        );
        assert_eq!(config_hash_to_str(&MinimalMap::new()), "");
    }

    #[test]
    fn test_round_trip() {
        let map = MinimalMap::new()
            .with(
                "router ospf 1",
                MinimalMap::new()
                    .with("vrf red", MinimalMap::new().with_leaf("area 1"))
                    .with_leaf("area 0"),
            )
            .with_leaf("no ip domain-lookup");

        let reparsed = parse(&config_hash_to_str(&map)).unwrap();
        assert_eq!(MinimalMap::from(&reparsed), map);
    }

    #[test]
    fn test_serde_json_object() {
        let map = MinimalMap::new()
            .with("interface lo0", MinimalMap::new().with_leaf("shutdown"))
            .with_leaf("hostname r1");
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"interface lo0":{"shutdown":{}},"hostname r1":{}}"#);

        let back: MinimalMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_structural_error_propagates() {
        let broken = Configuration::new(vec![ConfigLine::new("  padded", 0)]);
        let desired = parse("hostname r1\n").unwrap();
        assert!(matches!(
            build_min_config_hash(&broken, &desired),
            Err(Error::Structural(StructuralError::MalformedCommand { .. }))
        ));
        assert!(matches!(
            build_min_config_hash(&desired, &broken),
            Err(Error::Structural(StructuralError::MalformedCommand { .. }))
        ));
    }
}
