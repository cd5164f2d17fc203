use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// One config value, interpreted four ways at parse time.
///
/// The zero value (`ConfigValue::default()`) is `""`, `0`, `false` and `0.0`;
/// that is what lookups of absent keys produce.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigValue {
	#[serde(rename = "string")]
	string_value: String,

	#[serde(rename = "int")]
	int_value: i64,

	#[serde(rename = "bool")]
	bool_value: bool,

	#[serde(rename = "float")]
	float_value: f64,
}

impl ConfigValue {
	/// Interpret a raw value.
	///
	/// The literals `true` and `false` become `"1"` and `"0"` before the
	/// numeric parses, and the substituted text is what gets stored as the
	/// string value. Anything that is not a number parses to zero; every value
	/// other than `false` is truthy.
	///
	/// Numbers use Rust's decimal grammar: hex floats such as `0x1p-2` are
	/// not recognised and read as `0.0`.
	pub fn parse(raw: &str) -> Self {
		let raw = raw.trim();
		let (value, bool_value) = match raw {
			"true" => ("1", true),
			"false" => ("0", false),
			other => (other, true),
		};

		ConfigValue {
			string_value: value.to_string(),
			int_value: value.parse().unwrap_or(0),
			bool_value,
			float_value: value.parse().unwrap_or(0.0),
		}
	}

	pub fn as_str(&self) -> &str {
		&self.string_value
	}

	pub fn as_int(&self) -> i64 {
		self.int_value
	}

	pub fn as_bool(&self) -> bool {
		self.bool_value
	}

	pub fn as_float(&self) -> f64 {
		self.float_value
	}
}

/// Merged key-value configuration.
///
/// Later inserts for the same key replace earlier ones. Iteration is sorted by
/// key so output is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ConfigMap {
	entries: BTreeMap<String, ConfigValue>,
}

impl ConfigMap {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<&ConfigValue> {
		self.entries.get(key)
	}

	/// Insert or overwrite a value, returning the previous one.
	pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) -> Option<ConfigValue> {
		self.entries.insert(key.into(), value)
	}

	pub fn contains_key(&self, key: &str) -> bool {
		self.entries.contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	/// String value of `key`, or `""` if absent.
	pub fn string(&self, key: &str) -> &str {
		self.get(key).map(ConfigValue::as_str).unwrap_or("")
	}

	/// Integer value of `key`, or `0` if absent.
	pub fn int(&self, key: &str) -> i64 {
		self.get(key).map(ConfigValue::as_int).unwrap_or(0)
	}

	/// Boolean value of `key`, or `false` if absent.
	pub fn bool(&self, key: &str) -> bool {
		self.get(key).map(ConfigValue::as_bool).unwrap_or(false)
	}

	/// Float value of `key`, or `0.0` if absent.
	pub fn float(&self, key: &str) -> f64 {
		self.get(key).map(ConfigValue::as_float).unwrap_or(0.0)
	}

	/// Split the string value of `key` on `,`.
	///
	/// An absent key yields an empty list; a present but empty value yields
	/// one empty element, same as `str::split`.
	pub fn list(&self, key: &str) -> Vec<&str> {
		match self.get(key) {
			Some(value) => value.as_str().split(',').collect(),
			None => Vec::new(),
		}
	}
}

impl<'a> IntoIterator for &'a ConfigMap {
	type Item = (&'a String, &'a ConfigValue);
	type IntoIter = std::collections::btree_map::Iter<'a, String, ConfigValue>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.iter()
	}
}

/// Which layer of the merge a report entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
	Defaults,
	File,
	EnvFile,
	EnvOverrides,
}

impl LayerKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			LayerKind::Defaults => "defaults",
			LayerKind::File => "file",
			LayerKind::EnvFile => "env-file",
			LayerKind::EnvOverrides => "env-overrides",
		}
	}
}

/// Outcome of one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerStatus {
	/// Layer merged; `entries` is the number of key assignments it made.
	Applied { entries: usize },

	/// The file does not exist. Not an error.
	NotFound,

	/// Reading failed part way; anything merged before the failure is kept.
	Failed(String),

	/// Layer was not attempted.
	Skipped(String),
}

impl fmt::Display for LayerStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LayerStatus::Applied { entries } => write!(f, "applied ({entries} entries)"),
			LayerStatus::NotFound => write!(f, "not found"),
			LayerStatus::Failed(message) => write!(f, "failed: {message}"),
			LayerStatus::Skipped(reason) => write!(f, "skipped: {reason}"),
		}
	}
}

/// Report entry for one layer of a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerReport {
	pub kind: LayerKind,

	/// Resolved path, for file layers that got far enough to have one.
	pub path: Option<PathBuf>,

	pub status: LayerStatus,
}

/// Result of a load: the merged config plus what each layer did.
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
	/// The merged configuration.
	pub config: ConfigMap,

	/// Layers in the order they were considered.
	pub layers: Vec<LayerReport>,
}
