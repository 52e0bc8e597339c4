use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// File names searched for in every directory, in priority order.
pub const CONFIG_FILE_NAMES: [&str; 3] = [
	"lintconf.config.toml",
	"lintconf.config.json",
	"lintconf.config.yaml",
];

/// A single raw configuration layer, prior to normalization.
pub type RawLayer = Value;

/// How the loader finds the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ConfigFileSetting {
	/// Search upward from the directory under analysis.
	#[default]
	Search,

	/// Use this file for every directory. Relative paths resolve against `cwd`.
	Path(PathBuf),

	/// Do not use a config file at all.
	Disabled,
}

/// Immutable inputs to a config loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
	/// Root for resolving relative paths and for rebasing CLI ignore patterns.
	pub cwd: PathBuf,

	/// Explicit config file, disable flag, or search.
	pub config_file: ConfigFileSetting,

	/// Whether the built config array enforces ignore filtering.
	pub ignore_enabled: bool,

	/// Lowest-precedence seed layers.
	pub base_config: Vec<RawLayer>,

	/// Layers appended after the file-derived layers.
	pub default_configs: Vec<RawLayer>,

	/// Ignore globs from the command line, relative to `cwd`.
	pub ignore_patterns: Vec<String>,

	/// Highest-precedence layers.
	pub override_config: Vec<RawLayer>,
}

impl LoaderOptions {
	/// Options that search for a config file from `cwd` with the stock defaults.
	pub fn new(cwd: impl Into<PathBuf>) -> Self {
		Self {
			cwd: cwd.into(),
			config_file: ConfigFileSetting::Search,
			ignore_enabled: true,
			base_config: Vec::new(),
			default_configs: default_configs(),
			ignore_patterns: Vec::new(),
			override_config: Vec::new(),
		}
	}

	pub fn with_config_file(mut self, config_file: ConfigFileSetting) -> Self {
		self.config_file = config_file;
		self
	}

	pub fn with_ignore_enabled(mut self, enabled: bool) -> Self {
		self.ignore_enabled = enabled;
		self
	}

	pub fn with_base_config(mut self, layers: Vec<RawLayer>) -> Self {
		self.base_config = layers;
		self
	}

	pub fn with_default_configs(mut self, layers: Vec<RawLayer>) -> Self {
		self.default_configs = layers;
		self
	}

	pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
		self.ignore_patterns = patterns;
		self
	}

	pub fn with_override_config(mut self, layers: Vec<RawLayer>) -> Self {
		self.override_config = layers;
		self
	}
}

/// The stock default layers: ignore dependency and VCS directories.
pub fn default_configs() -> Vec<RawLayer> {
	vec![json!({ "ignores": ["**/node_modules/", ".git/"] })]
}

/// Where the config for a directory comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
	/// The config file in effect, or `None` when config files are disabled.
	pub source_path: Option<PathBuf>,

	/// Directory that relative paths in the config are interpreted against.
	pub base_path: PathBuf,
}

impl ResolvedLocation {
	pub fn source_path(&self) -> Option<&Path> {
		self.source_path.as_deref()
	}
}

/// The value exported by a config source file.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportedConfig {
	Single(RawLayer),
	Sequence(Vec<RawLayer>),
}

impl ExportedConfig {
	/// Classify a parsed document.
	///
	/// A top-level array is a sequence. So is an object whose only key is
	/// `configs` holding an array, which is how TOML spells a sequence.
	pub fn from_document(document: Value) -> Self {
		match document {
			Value::Array(items) => ExportedConfig::Sequence(items),
			Value::Object(mut map) if map.len() == 1 => match map.remove("configs") {
				Some(Value::Array(items)) => ExportedConfig::Sequence(items),
				Some(other) => {
					map.insert("configs".to_string(), other);
					ExportedConfig::Single(Value::Object(map))
				}
				None => ExportedConfig::Single(Value::Object(map)),
			},
			other => ExportedConfig::Single(other),
		}
	}

	/// The exported layers in order.
	pub fn into_layers(self) -> Vec<RawLayer> {
		match self {
			ExportedConfig::Single(layer) => vec![layer],
			ExportedConfig::Sequence(layers) => layers,
		}
	}
}
