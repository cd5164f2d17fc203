use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use regex::Regex;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use tinyconfig::config::{ConfigMap, LayerStatus, LoadedConfig, Loader};

#[derive(Parser)]
#[command(name = "tinyconfig")]
#[command(
	author,
	version,
	about = "Layered key-value config loader: defaults, config files, and environment overrides"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	/// Config file name, resolved against --base-dir
	#[arg(short, long, global = true, value_name = "NAME")]
	file: Option<String>,

	/// File whose contents are the default config text
	#[arg(long, global = true, value_name = "PATH")]
	defaults: Option<PathBuf>,

	/// Extra default config line (repeatable), applied after --defaults
	#[arg(short = 'D', long = "define", global = true, value_name = "LINE")]
	defines: Vec<String>,

	/// Directory config files are resolved against [default: executable directory]
	#[arg(long, global = true, value_name = "DIR")]
	base_dir: Option<PathBuf>,

	/// Enable verbose logging (sets log level to DEBUG)
	#[arg(short, long, global = true)]
	verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Display the merged configuration
	Show {
		/// Only show keys matching this regex
		#[arg(long, value_name = "REGEX")]
		filter: Option<String>,

		/// Output format
		#[arg(long, value_enum, default_value_t = Format::Text)]
		format: Format,
	},
	/// Print one value of the merged configuration
	Get {
		/// Key to look up
		key: String,

		/// Interpretation to print
		#[arg(long = "as", value_enum, default_value_t = ValueKind::String)]
		kind: ValueKind,
	},
	/// Show which layers were loaded and from where
	Layers,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
	Text,
	Toml,
}

#[derive(Clone, Copy, ValueEnum)]
enum ValueKind {
	String,
	Int,
	Bool,
	Float,
}

fn main() -> ExitCode {
	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	let loaded = load(&cli)?;

	match cli.command {
		Commands::Show { ref filter, format } => {
			handle_show(&loaded.config, filter.as_deref(), format)
		}
		Commands::Get { ref key, kind } => handle_get(&loaded.config, key, kind),
		Commands::Layers => handle_layers(&loaded),
	}
}

fn init_logging(verbose: bool) {
	// RUST_LOG always applies; the level here is only the fallback for
	// targets RUST_LOG doesn't cover.
	let level = if verbose { Level::DEBUG } else { Level::WARN };
	let filter = EnvFilter::builder()
		.with_default_directive(level.into())
		.from_env_lossy();
	let _ = tracing_subscriber::registry()
		.with(fmt::layer().with_writer(std::io::stderr))
		.with(filter)
		.try_init();
}

fn load(cli: &Cli) -> Result<LoadedConfig> {
	let mut defaults = match cli.defaults {
		Some(ref path) => std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read defaults file {}", path.display()))?,
		None => String::new(),
	};
	for line in &cli.defines {
		if !defaults.is_empty() && !defaults.ends_with('\n') {
			defaults.push('\n');
		}
		defaults.push_str(line);
	}

	let mut loader = Loader::new(defaults).file(cli.file.clone().unwrap_or_default());
	if let Some(ref dir) = cli.base_dir {
		loader = loader.base_dir(expand_home(dir)?);
	}

	loader.load().context("Failed to load configuration")
}

/// Expand a leading `~` to the user's home directory.
fn expand_home(path: &std::path::Path) -> Result<PathBuf> {
	match path.strip_prefix("~") {
		Ok(rest) => {
			let home = dirs::home_dir().context("Failed to resolve home directory")?;
			Ok(home.join(rest))
		}
		Err(_) => Ok(path.to_path_buf()),
	}
}

fn handle_show(config: &ConfigMap, filter: Option<&str>, format: Format) -> Result<ExitCode> {
	let filter = filter
		.map(Regex::new)
		.transpose()
		.context("Invalid --filter pattern")?;

	let mut selected = ConfigMap::new();
	for (key, value) in config {
		if filter.as_ref().is_none_or(|re| re.is_match(key)) {
			selected.insert(key.clone(), value.clone());
		}
	}

	match format {
		Format::Text => {
			for (key, value) in &selected {
				println!("{} = {}", key, value.as_str());
			}
		}
		Format::Toml => {
			let rendered = toml::to_string(&selected).context("Failed to render config as TOML")?;
			print!("{}", rendered);
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_get(config: &ConfigMap, key: &str, kind: ValueKind) -> Result<ExitCode> {
	if !config.contains_key(key) {
		tracing::debug!(key, "Key not set, printing zero value");
	}

	match kind {
		ValueKind::String => println!("{}", config.string(key)),
		ValueKind::Int => println!("{}", config.int(key)),
		ValueKind::Bool => println!("{}", config.bool(key)),
		ValueKind::Float => println!("{}", config.float(key)),
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_layers(loaded: &LoadedConfig) -> Result<ExitCode> {
	println!("Layers (in merge order):\n");

	for layer in &loaded.layers {
		match layer.path {
			Some(ref path) => println!("  {:<14} {}", layer.kind.as_str(), path.display()),
			None => println!("  {}", layer.kind.as_str()),
		}
		println!("    {}", layer.status);
	}

	let failed = loaded
		.layers
		.iter()
		.filter(|layer| matches!(layer.status, LayerStatus::Failed(_)))
		.count();
	println!("\n{} keys loaded", loaded.config.len());
	if failed > 0 {
		println!("{} layer(s) failed to load", failed);
	}

	Ok(ExitCode::SUCCESS)
}
