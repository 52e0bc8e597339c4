use crate::config::types::RawLayer;
use crate::error::{LintconfError, Result};
use crate::normalize::matcher::PatternList;
use crate::normalize::{LayerNormalizer, PendingLayers};
use crate::paths;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

static RULE_ID: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(@?[A-Za-z0-9_.-]+/)*[A-Za-z0-9_.-]+$").expect("rule id pattern is valid")
});

/// One normalized config layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FlatConfig {
	/// Optional label, shown in diagnostics.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,

	/// Globs this layer applies to. Empty means every file.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub files: Vec<String>,

	/// Globs excluded from this layer, or from the whole run when the layer
	/// has nothing else in it.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub ignores: Vec<String>,

	/// Rule id to severity, optionally followed by rule options.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub rules: BTreeMap<String, Value>,

	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub settings: Map<String, Value>,

	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub language_options: Map<String, Value>,

	#[serde(default, skip_serializing_if = "Map::is_empty")]
	pub linter_options: Map<String, Value>,
}

impl FlatConfig {
	/// A layer with only `ignores` (and maybe `name`) ignores files globally.
	pub fn is_global_ignore(&self) -> bool {
		!self.ignores.is_empty()
			&& self.files.is_empty()
			&& self.rules.is_empty()
			&& self.settings.is_empty()
			&& self.language_options.is_empty()
			&& self.linter_options.is_empty()
	}

	/// Validate rule ids and severities.
	pub fn validate(&self) -> Result<()> {
		for (rule, setting) in &self.rules {
			if !RULE_ID.is_match(rule) {
				return Err(LintconfError::InvalidRuleId { rule: rule.clone() });
			}
			validate_severity(rule, setting)?;
		}
		Ok(())
	}

	fn merge_from(&mut self, other: &FlatConfig) {
		for (rule, setting) in &other.rules {
			self.rules.insert(rule.clone(), setting.clone());
		}
		for (key, value) in &other.settings {
			self.settings.insert(key.clone(), value.clone());
		}
		for (key, value) in &other.language_options {
			self.language_options.insert(key.clone(), value.clone());
		}
		for (key, value) in &other.linter_options {
			self.linter_options.insert(key.clone(), value.clone());
		}
	}
}

fn validate_severity(rule: &str, setting: &Value) -> Result<()> {
	let severity = match setting {
		Value::Array(items) => items.first(),
		other => Some(other),
	};

	let valid = match severity {
		Some(Value::String(s)) => matches!(s.as_str(), "off" | "warn" | "error"),
		Some(Value::Number(n)) => matches!(n.as_u64(), Some(0..=2)),
		_ => false,
	};

	if valid {
		Ok(())
	} else {
		Err(LintconfError::InvalidSeverity {
			rule: rule.to_string(),
			value: setting.to_string(),
		})
	}
}

#[derive(Debug, Clone)]
struct Entry {
	config: FlatConfig,
	files: PatternList,
	ignores: PatternList,
}

/// The normalized, immutable result of building a layer sequence.
#[derive(Debug, Clone)]
pub struct ConfigArray {
	base_path: PathBuf,
	ignore_enabled: bool,
	entries: Vec<Entry>,
	global_ignores: PatternList,
}

impl ConfigArray {
	pub fn base_path(&self) -> &Path {
		&self.base_path
	}

	pub fn ignore_enabled(&self) -> bool {
		self.ignore_enabled
	}

	/// The normalized layers in precedence order.
	pub fn configs(&self) -> impl Iterator<Item = &FlatConfig> {
		self.entries.iter().map(|entry| &entry.config)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Whether `path` is excluded from linting.
	///
	/// Relative paths are taken relative to the base path. Paths outside the
	/// base path are always ignored while ignoring is enabled.
	pub fn is_file_ignored(&self, path: &Path) -> bool {
		if !self.ignore_enabled {
			return false;
		}
		match self.relative_to_base(path) {
			Some(relative) => self.global_ignores.excludes_file(&relative),
			None => true,
		}
	}

	/// The merged config that applies to `path`, or `None` if it is ignored.
	pub fn config_for_file(&self, path: &Path) -> Option<FlatConfig> {
		let relative = self.relative_to_base(path)?;
		if self.ignore_enabled && self.global_ignores.excludes_file(&relative) {
			return None;
		}

		let mut merged = FlatConfig::default();
		for entry in &self.entries {
			if entry.config.is_global_ignore() {
				continue;
			}
			if !entry.files.is_empty() && !entry.files.matches_file(&relative) {
				continue;
			}
			if !entry.ignores.is_empty() && entry.ignores.excludes_file(&relative) {
				continue;
			}
			merged.merge_from(&entry.config);
		}
		Some(merged)
	}

	fn relative_to_base(&self, path: &Path) -> Option<String> {
		let absolute = paths::resolve(&self.base_path, path);
		let relative = absolute.strip_prefix(&self.base_path).ok()?;

		let parts: Vec<_> = relative
			.components()
			.map(|c| match c {
				Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
				_ => None,
			})
			.collect::<Option<_>>()?;

		if parts.is_empty() {
			return None;
		}
		Some(parts.join("/"))
	}
}

/// Default normalizer for flat config layers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatNormalizer;

impl FlatNormalizer {
	fn normalize_layer(index: usize, layer: RawLayer) -> Result<Entry> {
		if !layer.is_object() {
			return Err(LintconfError::InvalidLayer {
				index,
				message: format!("expected an object, found {}", value_kind(&layer)),
			});
		}

		let config: FlatConfig = serde_json::from_value(layer).map_err(|e| {
			LintconfError::InvalidLayer {
				index,
				message: e.to_string(),
			}
		})?;
		config.validate()?;

		Ok(Entry {
			files: PatternList::compile(&config.files)?,
			ignores: PatternList::compile(&config.ignores)?,
			config,
		})
	}
}

#[async_trait]
impl LayerNormalizer for FlatNormalizer {
	async fn normalize(&self, pending: PendingLayers) -> Result<ConfigArray> {
		let base_path = pending.base_path().to_path_buf();
		let ignore_enabled = pending.ignore_enabled();

		let entries = pending
			.into_layers()
			.into_iter()
			.enumerate()
			.map(|(index, layer)| Self::normalize_layer(index, layer))
			.collect::<Result<Vec<_>>>()?;

		let global_patterns: Vec<String> = entries
			.iter()
			.filter(|entry| entry.config.is_global_ignore())
			.flat_map(|entry| entry.config.ignores.iter().cloned())
			.collect();

		Ok(ConfigArray {
			base_path,
			ignore_enabled,
			global_ignores: PatternList::compile(&global_patterns)?,
			entries,
		})
	}
}

fn value_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
