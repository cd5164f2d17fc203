use crate::config::parser::merge_lines_into;
use crate::config::types::{ConfigMap, LayerKind, LayerReport, LayerStatus, LoadedConfig};
use crate::env::{Environment, ProcessEnv, apply_env_overrides};
use crate::error::{Result, TinyConfigError};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Config key whose value names the environment variable that selects a
/// secondary config file.
pub const CONFIG_ENV_VAR_KEY: &str = "configEnvVar";

/// Builder for a layered config load.
///
/// Layers are merged in this order, each overwriting keys it also defines:
/// 1. The defaults text
/// 2. The config file, if a file name was given
/// 3. A secondary file, if the merged config has a `configEnvVar` key naming
///    a non-empty environment variable `V`; the file name is derived with
///    [`env_filename`]
/// 4. `TINYCONFIG_OVERRIDE_` environment overrides
///
/// Only a failure to parse the defaults is an error. Missing or unreadable
/// files are logged and recorded in the layer report.
pub struct Loader {
	defaults: String,
	file: String,
	base_dir: Option<PathBuf>,
	env: Box<dyn Environment>,
}

impl Loader {
	pub fn new(defaults: impl Into<String>) -> Self {
		Loader {
			defaults: defaults.into(),
			file: String::new(),
			base_dir: None,
			env: Box::new(ProcessEnv),
		}
	}

	/// Config file name. Empty means defaults and overrides only.
	pub fn file(mut self, name: impl Into<String>) -> Self {
		self.file = name.into();
		self
	}

	/// Directory relative file names resolve against.
	///
	/// Without one, the directory of the running executable is used.
	pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.base_dir = Some(dir.into());
		self
	}

	pub fn environment<E: Environment + 'static>(mut self, env: E) -> Self {
		self.env = Box::new(env);
		self
	}

	/// Run every layer and return the merged config with its layer report.
	pub fn load(&self) -> Result<LoadedConfig> {
		let mut loaded = LoadedConfig::default();

		let entries = merge_lines_into(self.defaults.as_bytes(), &mut loaded.config)
			.map_err(|source| TinyConfigError::DefaultsParseError { source })?;
		loaded.layers.push(LayerReport {
			kind: LayerKind::Defaults,
			path: None,
			status: LayerStatus::Applied { entries },
		});

		if self.file.is_empty() {
			tracing::info!("No config file specified, using defaults");
			loaded.layers.push(LayerReport {
				kind: LayerKind::File,
				path: None,
				status: LayerStatus::Skipped("no config file specified".to_string()),
			});
		} else {
			self.merge_file(LayerKind::File, &self.file, &mut loaded);
			self.merge_env_file(&mut loaded);
		}

		let entries = apply_env_overrides(&mut loaded.config, self.env.as_ref());
		loaded.layers.push(LayerReport {
			kind: LayerKind::EnvOverrides,
			path: None,
			status: LayerStatus::Applied { entries },
		});

		Ok(loaded)
	}

	fn merge_env_file(&self, loaded: &mut LoadedConfig) {
		let var_name = match loaded.config.get(CONFIG_ENV_VAR_KEY) {
			Some(value) if !value.as_str().is_empty() => value.as_str().to_string(),
			_ => {
				loaded.layers.push(LayerReport {
					kind: LayerKind::EnvFile,
					path: None,
					status: LayerStatus::Skipped(format!("no {CONFIG_ENV_VAR_KEY} key")),
				});
				return;
			}
		};
		tracing::info!(var = %var_name, "Found {}", CONFIG_ENV_VAR_KEY);

		match self.env.var(&var_name).filter(|value| !value.is_empty()) {
			Some(token) => {
				tracing::info!(var = %var_name, value = %token, "Found {} value", CONFIG_ENV_VAR_KEY);
				let name = env_filename(&self.file, &token);
				self.merge_file(LayerKind::EnvFile, &name, loaded);
			}
			None => {
				tracing::debug!(var = %var_name, "Environment variable not set");
				loaded.layers.push(LayerReport {
					kind: LayerKind::EnvFile,
					path: None,
					status: LayerStatus::Skipped(format!("{var_name} is not set")),
				});
			}
		}
	}

	fn merge_file(&self, kind: LayerKind, name: &str, loaded: &mut LoadedConfig) {
		let path = match resolve_path(self.base_dir.as_deref(), name) {
			Ok(path) => path,
			Err(e) => {
				tracing::warn!(file = name, "Can't use config file, using defaults: {}", describe(&e));
				loaded.layers.push(LayerReport {
					kind,
					path: None,
					status: LayerStatus::Failed(describe(&e)),
				});
				return;
			}
		};

		let status = match read_config_file(&path, &mut loaded.config) {
			Ok(Some(entries)) => LayerStatus::Applied { entries },
			Ok(None) => {
				tracing::info!(path = %path.display(), "Config file does not exist, using defaults");
				LayerStatus::NotFound
			}
			Err(e) => {
				tracing::warn!(path = %path.display(), "Can't use config file: {}", describe(&e));
				LayerStatus::Failed(describe(&e))
			}
		};

		loaded.layers.push(LayerReport {
			kind,
			path: Some(path),
			status,
		});
	}
}

/// Load `filename` over `defaults` using the process environment, resolving
/// the file next to the running executable.
pub fn load_config(filename: &str, defaults: &str) -> Result<ConfigMap> {
	Loader::new(defaults)
		.file(filename)
		.load()
		.map(|loaded| loaded.config)
}

/// Merge a config file into `config`.
///
/// Returns `Ok(None)` if the file does not exist and `Ok(Some(entries))` once
/// it has been merged. A read error part way through leaves the entries
/// merged so far in place.
pub fn read_config_file(path: &Path, config: &mut ConfigMap) -> Result<Option<usize>> {
	let file = match File::open(path) {
		Ok(file) => file,
		Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(None),
		Err(source) => {
			return Err(TinyConfigError::ConfigReadError {
				path: path.to_path_buf(),
				source,
			});
		}
	};

	tracing::info!(path = %path.display(), "Reading config file");

	merge_lines_into(BufReader::new(file), config)
		.map(Some)
		.map_err(|source| TinyConfigError::ConfigReadError {
			path: path.to_path_buf(),
			source,
		})
}

/// Resolve a config file name against `base_dir`, or against the directory of
/// the running executable when no base is given. Absolute names are kept.
pub fn resolve_path(base_dir: Option<&Path>, filename: &str) -> Result<PathBuf> {
	let path = Path::new(filename);
	if path.is_absolute() {
		return Ok(path.to_path_buf());
	}

	match base_dir {
		Some(dir) => Ok(dir.join(path)),
		None => Ok(executable_dir()?.join(path)),
	}
}

fn executable_dir() -> Result<PathBuf> {
	let exe = std::env::current_exe()
		.map_err(|source| TinyConfigError::ExecutableDirNotFound { source: Some(source) })?;

	exe.parent()
		.map(Path::to_path_buf)
		.ok_or(TinyConfigError::ExecutableDirNotFound { source: None })
}

/// Derive the secondary file name for `token`.
///
/// `config.txt` + `PROD` gives `config_PROD.txt`; a name without `.` gets the
/// suffix appended. The split is at the first `.`.
pub fn env_filename(base: &str, token: &str) -> String {
	match base.split_once('.') {
		Some((stem, ext)) => format!("{stem}_{token}.{ext}"),
		None => format!("{base}_{token}"),
	}
}

/// Render an error with its source chain on one line.
fn describe(err: &TinyConfigError) -> String {
	let mut message = err.to_string();
	let mut source = std::error::Error::source(err);
	while let Some(cause) = source {
		message.push_str(": ");
		message.push_str(&cause.to_string());
		source = cause.source();
	}
	message
}
