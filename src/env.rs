//! Environment access and `TINYCONFIG_OVERRIDE_` overrides.
//!
//! The loader never touches `std::env` directly; it goes through the
//! [`Environment`] trait so tests and embedders can supply their own.

use crate::config::parser::merge_str_into;
use crate::config::types::ConfigMap;

/// Prefix marking an environment variable as a config override.
pub const OVERRIDE_PREFIX: &str = "TINYCONFIG_OVERRIDE_";

/// Source of environment variables.
pub trait Environment {
	/// Look up a single variable.
	fn var(&self, name: &str) -> Option<String>;

	/// All variables, in enumeration order.
	fn vars(&self) -> Vec<(String, String)>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
	fn var(&self, name: &str) -> Option<String> {
		std::env::var(name).ok()
	}

	fn vars(&self) -> Vec<(String, String)> {
		// Non-UTF-8 entries can't hold config text; skip them.
		std::env::vars_os()
			.filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
			.collect()
	}
}

/// An in-memory environment that keeps insertion order.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
	vars: Vec<(String, String)>,
}

impl MapEnv {
	pub fn new() -> Self {
		Self::default()
	}

	/// Set a variable, replacing an existing one in place.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
		let name = name.into();
		let value = value.into();
		match self.vars.iter_mut().find(|(n, _)| *n == name) {
			Some(entry) => entry.1 = value,
			None => self.vars.push((name, value)),
		}
	}

	pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.set(name, value);
		self
	}

	pub fn remove(&mut self, name: &str) {
		self.vars.retain(|(n, _)| n != name);
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		let mut env = MapEnv::new();
		for (name, value) in iter {
			env.set(name, value);
		}
		env
	}
}

impl Environment for MapEnv {
	fn var(&self, name: &str) -> Option<String> {
		self.vars
			.iter()
			.find(|(n, _)| n == name)
			.map(|(_, v)| v.clone())
	}

	fn vars(&self) -> Vec<(String, String)> {
		self.vars.clone()
	}
}

/// Build the config line contributed by one override variable.
///
/// `suffix` is the variable name with [`OVERRIDE_PREFIX`] removed. The line is
/// normally `suffix=value`, which is the raw `NAME=VALUE` entry with the prefix
/// stripped. When the suffix is empty, or the value is already a full line
/// for the same key (`TINYCONFIG_OVERRIDE_port=port=80`), the value is used
/// as the line.
pub fn override_line(suffix: &str, value: &str) -> String {
	let value_is_line = match value.split_once('=') {
		Some((key, _)) => suffix.trim().is_empty() || key.trim() == suffix.trim(),
		None => false,
	};

	if value_is_line {
		value.to_string()
	} else {
		format!("{suffix}={value}")
	}
}

/// Collect the override lines present in `env`, in enumeration order.
pub fn override_lines(env: &dyn Environment) -> Vec<String> {
	env.vars()
		.into_iter()
		.filter_map(|(name, value)| {
			let suffix = name.strip_prefix(OVERRIDE_PREFIX)?;
			let line = override_line(suffix, &value);
			tracing::info!(variable = %name, line = %line, "Env override");
			Some(line)
		})
		.collect()
}

/// Merge every override in `env` into `config`.
///
/// Overrides are applied as one block of config text, so later-enumerated
/// duplicates win. Never fails; malformed lines are ignored like any other.
/// Returns the number of key assignments made.
pub fn apply_env_overrides(config: &mut ConfigMap, env: &dyn Environment) -> usize {
	let lines = override_lines(env);
	if lines.is_empty() {
		return 0;
	}

	merge_str_into(&lines.join("\n"), config)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::parser::parse_str;

	#[test]
	fn test_override_value_as_full_line() {
		let mut config = ConfigMap::new();
		assert_eq!(config.float("sigma_3"), 0.0);

		let env = MapEnv::new().with("TINYCONFIG_OVERRIDE_sigma_3", "sigma_3=3.2");
		apply_env_overrides(&mut config, &env);

		assert_eq!(config.float("sigma_3"), 3.2);
	}

	#[test]
	fn test_override_suffix_names_key() {
		let mut config = parse_str("port = 80");
		let env = MapEnv::new().with("TINYCONFIG_OVERRIDE_port", "8080");
		apply_env_overrides(&mut config, &env);

		assert_eq!(config.int("port"), 8080);
	}

	#[test]
	fn test_override_value_with_equals_for_other_key() {
		let mut config = ConfigMap::new();
		let env = MapEnv::new().with("TINYCONFIG_OVERRIDE_query", "a=b");
		apply_env_overrides(&mut config, &env);

		assert_eq!(config.string("query"), "a=b");
		assert!(!config.contains_key("a"));
	}

	#[test]
	fn test_override_bare_prefix_uses_value_as_line() {
		let mut config = ConfigMap::new();
		let env = MapEnv::new().with("TINYCONFIG_OVERRIDE_", "mode = fast");
		apply_env_overrides(&mut config, &env);

		assert_eq!(config.string("mode"), "fast");
	}

	#[test]
	fn test_unrelated_variables_are_ignored() {
		let mut config = parse_str("home = /srv");
		let env = MapEnv::new()
			.with("HOME", "/root")
			.with("TINYCONFIG_OTHER_home", "/tmp");
		let entries = apply_env_overrides(&mut config, &env);

		assert_eq!(entries, 0);
		assert_eq!(config.string("home"), "/srv");
	}

	#[test]
	fn test_later_overrides_win() {
		let mut config = ConfigMap::new();
		let env = MapEnv::new()
			.with("TINYCONFIG_OVERRIDE_a", "level=1")
			.with("TINYCONFIG_OVERRIDE_b", "level=2");
		apply_env_overrides(&mut config, &env);

		// Neither value repeats its own suffix, so each is keyed by suffix.
		assert_eq!(config.string("a"), "level=1");
		assert_eq!(config.string("b"), "level=2");

		let env = MapEnv::new()
			.with("TINYCONFIG_OVERRIDE_", "level=1")
			.with("TINYCONFIG_OVERRIDE_level", "level=2");
		apply_env_overrides(&mut config, &env);
		assert_eq!(config.int("level"), 2);
	}

	#[test]
	fn test_override_lines_are_separate() {
		let env = MapEnv::new()
			.with("TINYCONFIG_OVERRIDE_a", "1")
			.with("TINYCONFIG_OVERRIDE_b", "2");
		assert_eq!(override_lines(&env), vec!["a=1", "b=2"]);

		let mut config = ConfigMap::new();
		assert_eq!(apply_env_overrides(&mut config, &env), 2);
		assert_eq!(config.int("a"), 1);
		assert_eq!(config.int("b"), 2);
	}

	#[test]
	fn test_override_comment_is_stripped() {
		let mut config = ConfigMap::new();
		let env = MapEnv::new().with("TINYCONFIG_OVERRIDE_retries", "3 // from CI");
		apply_env_overrides(&mut config, &env);
		assert_eq!(config.int("retries"), 3);
	}

	#[test]
	fn test_map_env_set_replaces_in_place() {
		let mut env: MapEnv = [("A", "1"), ("B", "2")].into_iter().collect();
		env.set("A", "3");
		assert_eq!(env.var("A"), Some("3".to_string()));
		assert_eq!(env.vars()[0].0, "A");

		env.remove("A");
		assert_eq!(env.var("A"), None);
	}

	#[test]
	fn test_process_env_reads_path() {
		#[cfg(unix)]
		{
			assert!(ProcessEnv.var("PATH").is_some());
			assert!(ProcessEnv.vars().iter().any(|(name, _)| name == "PATH"));
		}
	}
}
