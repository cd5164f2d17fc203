use crate::config::types::{ConfigMap, ConfigValue};
use std::convert::Infallible;
use std::io::BufRead;

/// Parse a single config line into a key and its value.
///
/// Returns `None` for full-line `#` comments, lines without `=`, and lines
/// whose key is empty. Everything from the first `//` onward is dropped
/// before the line is split at its first `=`.
pub fn parse_line(line: &str) -> Option<(&str, ConfigValue)> {
	if line.starts_with('#') {
		return None;
	}

	let line = match line.find("//") {
		Some(idx) => &line[..idx],
		None => line,
	};

	let (key, raw_value) = line.split_once('=')?;
	let key = key.trim();
	if key.is_empty() {
		return None;
	}

	Some((key, ConfigValue::parse(raw_value)))
}

/// Read lines from `reader` and upsert every entry into `config`.
///
/// Returns the number of key assignments made. On a read error the entries
/// merged before the failure stay in `config`.
pub fn merge_lines_into<R: BufRead>(reader: R, config: &mut ConfigMap) -> std::io::Result<usize> {
	merge_each(reader.lines(), config)
}

/// Merge in-memory config text into `config`.
pub fn merge_str_into(text: &str, config: &mut ConfigMap) -> usize {
	match merge_each(text.lines().map(Ok::<_, Infallible>), config) {
		Ok(entries) => entries,
		Err(never) => match never {},
	}
}

fn merge_each<S, E>(
	lines: impl IntoIterator<Item = Result<S, E>>,
	config: &mut ConfigMap,
) -> Result<usize, E>
where
	S: AsRef<str>,
{
	let mut entries = 0;

	for line in lines {
		let line = line?;
		if let Some((key, value)) = parse_line(line.as_ref()) {
			tracing::debug!(key, value = value.as_str(), "Setting config");
			config.insert(key, value);
			entries += 1;
		}
	}

	Ok(entries)
}

/// Parse config text into a fresh map (useful for testing).
pub fn parse_str(text: &str) -> ConfigMap {
	let mut config = ConfigMap::new();
	merge_str_into(text, &mut config);
	config
}
