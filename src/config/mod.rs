//! Configuration loading and parsing for tinyconfig.
//!
//! This module handles:
//! - `key = value` line parsing
//! - Layered merging of defaults, files and environment overrides
//! - Typed access to the merged values

pub mod cascade;
pub mod parser;
pub mod types;

pub use cascade::{
	CONFIG_ENV_VAR_KEY, Loader, env_filename, load_config, read_config_file, resolve_path,
};
pub use parser::{merge_lines_into, merge_str_into, parse_line, parse_str};
pub use types::{ConfigMap, ConfigValue, LayerKind, LayerReport, LayerStatus, LoadedConfig};
