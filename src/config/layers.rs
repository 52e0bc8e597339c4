use crate::config::module::SourceModuleLoader;
use crate::config::types::LoaderOptions;
use crate::error::Result;
use crate::normalize::{ConfigArray, LayerNormalizer, PendingLayers};
use crate::paths;
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Assembles the layer sequence for one config location.
///
/// Layers are pushed lowest precedence first:
/// 1. `base_config`
/// 2. the layers exported by the config file, if any
/// 3. `default_configs`
/// 4. CLI ignore patterns, rebased onto the base path
/// 5. `override_config`
#[derive(Clone)]
pub struct LayerBuilder {
	modules: SourceModuleLoader,
	normalizer: Arc<dyn LayerNormalizer>,
}

impl std::fmt::Debug for LayerBuilder {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LayerBuilder")
			.field("modules", &self.modules)
			.finish_non_exhaustive()
	}
}

impl LayerBuilder {
	pub fn new(modules: SourceModuleLoader, normalizer: Arc<dyn LayerNormalizer>) -> Self {
		Self {
			modules,
			normalizer,
		}
	}

	/// Build and normalize the config array for `source_path`.
	pub async fn build(
		&self,
		source_path: Option<&Path>,
		base_path: &Path,
		options: &LoaderOptions,
	) -> Result<ConfigArray> {
		let mut pending = PendingLayers::new(base_path, options.ignore_enabled);
		pending.extend(options.base_config.iter().cloned());

		if let Some(source_path) = source_path {
			let exported = self.modules.load(source_path).await?;
			pending.extend(exported.into_layers());
		}

		pending.extend(options.default_configs.iter().cloned());

		if !options.ignore_patterns.is_empty() {
			let patterns = rebase_ignore_patterns(&options.ignore_patterns, base_path, &options.cwd);
			pending.push(json!({ "ignores": patterns }));
		}

		pending.extend(options.override_config.iter().cloned());

		debug!(
			base_path = %base_path.display(),
			layers = pending.layers().len(),
			"Normalizing config layers"
		);
		self.normalizer.normalize(pending).await
	}
}

/// Rewrite cwd-relative ignore patterns so they match relative to `base_path`.
///
/// Patterns are returned unchanged when the two directories are the same. A
/// leading `!` is kept in front of the rewritten pattern.
pub fn rebase_ignore_patterns(patterns: &[String], base_path: &Path, cwd: &Path) -> Vec<String> {
	let relative = paths::relative_posix(base_path, cwd);
	if relative.is_empty() {
		return patterns.to_vec();
	}

	patterns
		.iter()
		.map(|pattern| match pattern.strip_prefix('!') {
			Some(rest) => format!("!{}", paths::join_posix(&relative, rest)),
			None => paths::join_posix(&relative, pattern),
		})
		.collect()
}
