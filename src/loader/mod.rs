//! Cached config lookup for files and directories.
//!
//! This module handles:
//! - Memoizing resolved config locations and built config arrays
//! - The per-directory and single-shared-location loader variants
//! - A trait object over both variants for callers that pick one at runtime

pub mod cache;
pub mod cached;

pub use cache::{KeyPolicy, KeyedCache, PerDirectory, SharedLocation};
pub use cached::{CachedConfigLoader, ConfigLoader, LegacyConfigLoader};

use crate::config::types::LoaderOptions;
use crate::error::Result;
use crate::normalize::ConfigArray;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Which caching topology a loader uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoaderKind {
	/// Resolve the config file separately for every directory.
	#[default]
	PerDirectory,

	/// Resolve once and reuse that config for every path.
	Legacy,
}

/// The operations shared by [`ConfigLoader`] and [`LegacyConfigLoader`].
#[async_trait]
pub trait ConfigLookup: Send + Sync {
	async fn find_config_file_for_file(&self, file: &Path) -> Result<Option<PathBuf>>;

	async fn find_config_file_for_directory(&self, directory: &Path) -> Result<Option<PathBuf>>;

	async fn load_config_array_for_file(&self, file: &Path) -> Result<Arc<ConfigArray>>;

	async fn load_config_array_for_directory(&self, directory: &Path) -> Result<Arc<ConfigArray>>;

	fn get_cached_config_array_for_file(&self, file: &Path) -> Result<Arc<ConfigArray>>;

	fn get_cached_config_array_for_directory(&self, directory: &Path) -> Result<Arc<ConfigArray>>;
}

#[async_trait]
impl<P: KeyPolicy> ConfigLookup for CachedConfigLoader<P> {
	async fn find_config_file_for_file(&self, file: &Path) -> Result<Option<PathBuf>> {
		CachedConfigLoader::find_config_file_for_file(self, file).await
	}

	async fn find_config_file_for_directory(&self, directory: &Path) -> Result<Option<PathBuf>> {
		CachedConfigLoader::find_config_file_for_directory(self, directory).await
	}

	async fn load_config_array_for_file(&self, file: &Path) -> Result<Arc<ConfigArray>> {
		CachedConfigLoader::load_config_array_for_file(self, file).await
	}

	async fn load_config_array_for_directory(&self, directory: &Path) -> Result<Arc<ConfigArray>> {
		CachedConfigLoader::load_config_array_for_directory(self, directory).await
	}

	fn get_cached_config_array_for_file(&self, file: &Path) -> Result<Arc<ConfigArray>> {
		CachedConfigLoader::get_cached_config_array_for_file(self, file)
	}

	fn get_cached_config_array_for_directory(&self, directory: &Path) -> Result<Arc<ConfigArray>> {
		CachedConfigLoader::get_cached_config_array_for_directory(self, directory)
	}
}

/// Create a loader of the requested kind.
pub fn create_config_loader(options: LoaderOptions, kind: LoaderKind) -> Arc<dyn ConfigLookup> {
	match kind {
		LoaderKind::PerDirectory => Arc::new(ConfigLoader::new(options)),
		LoaderKind::Legacy => Arc::new(LegacyConfigLoader::new(options)),
	}
}
