//! Configuration discovery and loading for lintconf.
//!
//! This module handles:
//! - Config file discovery by walking up the directory tree
//! - Change-aware loading of TOML, JSON, and YAML config sources
//! - Layering base, file, default, ignore, and override configs

pub mod layers;
pub mod locate;
pub mod module;
pub mod parser;
pub mod types;

pub use layers::{LayerBuilder, rebase_ignore_patterns};
pub use locate::{LocationResolver, find_config_file};
pub use module::{FileModuleExecutor, ModuleExecutor, SourceModuleLoader};
pub use parser::{ConfigFormat, parse_config_file, parse_config_str};
pub use types::{
	CONFIG_FILE_NAMES, ConfigFileSetting, ExportedConfig, LoaderOptions, RawLayer,
	ResolvedLocation, default_configs,
};
