//! Tinyconfig - layered key-value configuration loader.
//!
//! This library provides:
//! - A line-oriented `key = value` parser with `#` and `//` comments
//! - Eager four-way interpretation of every value (string, int, bool, float)
//! - Layered merging: defaults, a config file, an environment-selected
//!   secondary file, and `TINYCONFIG_OVERRIDE_` environment overrides
//!
//! # Example
//!
//! ```no_run
//! use tinyconfig::config::Loader;
//!
//! let defaults = "port = 8080\ndebug = false\n";
//! let loaded = Loader::new(defaults)
//!     .file("config.txt")
//!     .base_dir("/etc/myapp")
//!     .load()
//!     .unwrap();
//!
//! let port = loaded.config.int("port");
//! let debug = loaded.config.bool("debug");
//! println!("port={port} debug={debug}");
//! ```

pub mod config;
pub mod env;
pub mod error;

pub use config::{ConfigMap, ConfigValue, Loader, load_config};
pub use error::{Result, TinyConfigError};
