//! Lintconf - config-file discovery, layering, and caching for lint runs.
//!
//! This library provides:
//! - Config file discovery by walking up from the directory under analysis
//! - Change-aware loading of TOML, JSON, and YAML config sources
//! - Layering of base, file, default, CLI ignore, and override configs
//! - Per-directory and single-shared-location caching loaders
//!
//! # Example
//!
//! ```no_run
//! use lintconf::config::LoaderOptions;
//! use lintconf::loader::ConfigLoader;
//!
//! # async fn run() -> lintconf::Result<()> {
//! let cwd = std::env::current_dir().unwrap();
//! let loader = ConfigLoader::new(LoaderOptions::new(&cwd));
//!
//! let file = cwd.join("src/index.js");
//! let configs = loader.load_config_array_for_file(&file).await?;
//! if let Some(config) = configs.config_for_file(&file) {
//!     println!("{} rules enabled", config.rules.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod normalize;
pub mod paths;

pub use error::{LintconfError, Result};
