//! # Ferrconf
//!
//! Configuration-text tree model and diff engine for network device
//! automation.
//!
//! Ferrconf takes the indentation-structured command text network devices
//! speak (`show running-config` output, operator-authored config snippets)
//! and answers two questions: what has to be pushed to a device to reach a
//! desired state, and what value does a retrieved block of CLI output hold.
//!
//! ## Features
//!
//! - Indentation parser with strict tab rejection
//! - Context-aware diff of desired vs. running configuration
//! - Reduction to the minimal ordered command set, rendered back to text
//! - Structural value extraction from raw CLI output by submode context
//!
//! Everything is pure and synchronous: no transport, no I/O, no shared state.
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrconf::{config_hash_to_str, minimal_diff, parse};
//!
//! fn main() -> Result<(), ferrconf::Error> {
//!     let running = parse(
//!         "interface loopback10\n  description foo\ninterface loopback12\n",
//!     )?;
//!     let desired = parse(
//!         "interface loopback10\n  description 10\nno interface loopback12\n",
//!     )?;
//!
//!     let min = minimal_diff(&desired, &running)?;
//!     assert_eq!(
//!         config_hash_to_str(&min),
//!         "interface loopback10\n  description 10\nno interface loopback12\n"
//!     );
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod filter;

// Re-export main types for convenience
pub use config::{
    Command, ConfigLine, Configuration, MinimalMap, ParseOptions, RenderOptions,
    build_min_config_hash, config_hash_to_str, minimal_diff, parse, parse_with,
};
pub use error::{Error, ParseError, Result, StructuralError};
pub use filter::{CliFilter, ContextMatcher, Filtered, compile_pattern, filter_cli, find_subconfig};
