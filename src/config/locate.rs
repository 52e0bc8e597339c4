use crate::config::types::{CONFIG_FILE_NAMES, ConfigFileSetting, ResolvedLocation};
use crate::error::{LintconfError, Result};
use crate::paths;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Decides which config file governs a directory.
#[derive(Debug, Clone)]
pub struct LocationResolver {
	cwd: PathBuf,
	config_file: ConfigFileSetting,
}

impl LocationResolver {
	pub fn new(cwd: &Path, config_file: &ConfigFileSetting) -> Self {
		Self {
			cwd: cwd.to_path_buf(),
			config_file: config_file.clone(),
		}
	}

	/// Resolve the config location for an absolute `directory`.
	///
	/// An explicit config path or the disable flag wins over the search and
	/// ignores `directory`. Otherwise the search walks up from `directory`.
	pub async fn resolve(&self, directory: &Path) -> Result<ResolvedLocation> {
		match &self.config_file {
			ConfigFileSetting::Path(path) => {
				let source_path = paths::resolve(&self.cwd, path);
				debug!(config_file = %source_path.display(), "Using explicit config file");
				Ok(ResolvedLocation {
					source_path: Some(source_path),
					base_path: self.cwd.clone(),
				})
			}
			ConfigFileSetting::Disabled => {
				debug!("Config file lookup disabled");
				Ok(ResolvedLocation {
					source_path: None,
					base_path: self.cwd.clone(),
				})
			}
			ConfigFileSetting::Search => {
				let source_path = find_config_file(directory).await?.ok_or_else(|| {
					LintconfError::ConfigFileMissing {
						start: directory.to_path_buf(),
					}
				})?;
				let base_path = source_path
					.parent()
					.map(Path::to_path_buf)
					.unwrap_or_else(|| directory.to_path_buf());
				debug!(
					config_file = %source_path.display(),
					base_path = %base_path.display(),
					"Found config file"
				);
				Ok(ResolvedLocation {
					source_path: Some(source_path),
					base_path,
				})
			}
		}
	}
}

/// Walk up from `start_dir` looking for the first candidate config file.
///
/// Each directory is checked for every name in [`CONFIG_FILE_NAMES`] before
/// moving to its parent. Returns `None` once the filesystem root is passed.
pub async fn find_config_file(start_dir: &Path) -> Result<Option<PathBuf>> {
	let mut current_dir = Some(start_dir);

	while let Some(dir) = current_dir {
		trace!(directory = %dir.display(), "Searching for config file");

		for name in CONFIG_FILE_NAMES {
			let candidate = dir.join(name);
			if is_file(&candidate).await? {
				return Ok(Some(candidate));
			}
		}

		current_dir = dir.parent();
	}

	Ok(None)
}

async fn is_file(path: &Path) -> Result<bool> {
	match tokio::fs::metadata(path).await {
		Ok(metadata) => Ok(metadata.is_file()),
		Err(err)
			if matches!(
				err.kind(),
				std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory
			) =>
		{
			Ok(false)
		}
		Err(source) => Err(LintconfError::ConfigReadError {
			path: path.to_path_buf(),
			source,
		}),
	}
}
