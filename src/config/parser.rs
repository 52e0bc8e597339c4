use crate::config::types::ExportedConfig;
use crate::error::{LintconfError, Result};
use serde_json::Value;
use std::path::Path;

/// Textual formats a config source may be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
	Toml,
	Json,
	Yaml,
}

impl ConfigFormat {
	/// Detect the format from the file extension.
	pub fn from_path(path: &Path) -> Result<Self> {
		let extension = path
			.extension()
			.and_then(|ext| ext.to_str())
			.map(str::to_ascii_lowercase);

		match extension.as_deref() {
			Some("toml") => Ok(ConfigFormat::Toml),
			Some("json") => Ok(ConfigFormat::Json),
			Some("yaml" | "yml") => Ok(ConfigFormat::Yaml),
			_ => Err(LintconfError::UnsupportedFormat {
				path: path.to_path_buf(),
			}),
		}
	}
}

/// Read and evaluate a config file, returning its exported value.
pub async fn parse_config_file(path: &Path) -> Result<ExportedConfig> {
	let format = ConfigFormat::from_path(path)?;
	let content =
		tokio::fs::read_to_string(path)
			.await
			.map_err(|source| LintconfError::ConfigReadError {
				path: path.to_path_buf(),
				source,
			})?;

	parse_config_str(&content, format, path)
}

/// Parse a config from a string (useful for testing).
pub fn parse_config_str(content: &str, format: ConfigFormat, path: &Path) -> Result<ExportedConfig> {
	let document: Value = match format {
		ConfigFormat::Toml => {
			let table: toml::Table =
				toml::from_str(content).map_err(|source| LintconfError::TomlParseError {
					path: path.to_path_buf(),
					source,
				})?;
			// TOML tables always convert to JSON objects
			serde_json::to_value(table).map_err(|source| LintconfError::JsonParseError {
				path: path.to_path_buf(),
				source,
			})?
		}
		ConfigFormat::Json => {
			serde_json::from_str(content).map_err(|source| LintconfError::JsonParseError {
				path: path.to_path_buf(),
				source,
			})?
		}
		ConfigFormat::Yaml => {
			// An empty YAML document exports an empty layer
			if content.trim().is_empty() {
				Value::Object(Default::default())
			} else {
				serde_yaml::from_str(content).map_err(|source| LintconfError::YamlParseError {
					path: path.to_path_buf(),
					source,
				})?
			}
		}
	};

	Ok(ExportedConfig::from_document(document))
}
