use std::path::PathBuf;

/// Library-level structured errors for lintconf.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum LintconfError {
	#[error("Could not find a config file in {start} or any parent directory")]
	ConfigFileMissing { start: PathBuf },

	#[error("Invalid argument: {argument} must be a non-empty path")]
	InvalidArgument { argument: &'static str },

	#[error("No cached {what} for {directory}")]
	NotFound {
		directory: PathBuf,
		what: &'static str,
	},

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse TOML config file: {path}")]
	TomlParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Failed to parse JSON config file: {path}")]
	JsonParseError {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("Failed to parse YAML config file: {path}")]
	YamlParseError {
		path: PathBuf,
		#[source]
		source: serde_yaml::Error,
	},

	#[error("Unsupported config file format: {path}")]
	UnsupportedFormat { path: PathBuf },

	#[error("Invalid config layer at index {index}: {message}")]
	InvalidLayer { index: usize, message: String },

	#[error("Invalid rule id: {rule}")]
	InvalidRuleId { rule: String },

	#[error("Invalid severity for rule {rule}: {value}")]
	InvalidSeverity { rule: String, value: String },

	#[error("Invalid glob pattern: {pattern}")]
	InvalidGlob {
		pattern: String,
		#[source]
		source: globset::Error,
	},
}

/// Result type alias using LintconfError.
pub type Result<T> = std::result::Result<T, LintconfError>;
