//! Diff engine: which part of one configuration is missing from another.

use log::{debug, trace};

use super::{ConfigLine, Configuration};
use crate::error::Result;

impl Configuration {
    /// Return the part of `self` that is not already present, in the same
    /// submode context, in `other`.
    ///
    /// An empty result means `other` already satisfies `self`. Retained
    /// submode bodies keep their parent command so the result can be sent
    /// as-is to enter each submode.
    ///
    /// When `other` repeats a submode command at one level, the repeated
    /// blocks count as a single submode whose body is every occurrence's
    /// body in order, the same way a device accumulates a submode that is
    /// entered twice.
    ///
    /// Both trees are validated first; a malformed tree is an error, never an
    /// empty diff.
    ///
    /// # Example
    ///
    /// ```
    /// let desired = ferrconf::parse("interface lo0\n  description core\n").unwrap();
    /// let running = ferrconf::parse("interface lo0\n  shutdown\n").unwrap();
    ///
    /// let missing = desired.compare_with(&running).unwrap();
    /// assert_eq!(missing.render(), "interface lo0\n  description core\n");
    /// ```
    pub fn compare_with(&self, other: &Configuration) -> Result<Configuration> {
        self.validate()?;
        other.validate()?;

        let theirs: Vec<&ConfigLine> = other.lines().iter().collect();
        let missing = diff_level(self.lines(), &theirs);

        debug!(
            "Compared {} top-level lines: {} not satisfied",
            self.len(),
            missing.len()
        );
        Ok(Configuration::new(missing))
    }
}

fn diff_level(mine: &[ConfigLine], theirs: &[&ConfigLine]) -> Vec<ConfigLine> {
    let mut missing = Vec::new();

    for line in mine {
        let matches: Vec<&ConfigLine> = theirs
            .iter()
            .copied()
            .filter(|other| other.command == line.command)
            .collect();

        if matches.is_empty() {
            trace!("Missing: '{}'", line.command);
            missing.push(line.clone());
            continue;
        }

        if line.is_leaf() {
            trace!("Satisfied: '{}'", line.command);
            continue;
        }

        let body: Vec<&ConfigLine> = matches
            .iter()
            .flat_map(|other| other.children.iter())
            .collect();
        let children = diff_level(&line.children, &body);

        if children.is_empty() {
            trace!("Satisfied submode: '{}'", line.command);
        } else {
            missing.push(ConfigLine {
                command: line.command.clone(),
                depth: line.depth,
                children,
            });
        }
    }

    missing
}
