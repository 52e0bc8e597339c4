//! Change-aware loading of config source files.
//!
//! A [`ModuleExecutor`] evaluates a source file and keeps its own cache keyed
//! by path alone. [`SourceModuleLoader`] sits in front of it and asks for a
//! fresh evaluation whenever the file's modification time differs from the
//! last one it saw.
//!
//! The modification-time map is process-wide and keyed by executor as well as
//! path, since a timestamp only vouches for the export cached by the executor
//! that recorded it. It gains one entry per executor and source path ever
//! loaded and is never pruned, so a long-running process that visits many
//! short-lived config files will keep their entries until exit.

use crate::config::parser::parse_config_file;
use crate::config::types::ExportedConfig;
use crate::error::{LintconfError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use std::time::SystemTime;
use tracing::debug;

/// Identifies an executor by the address of its shared allocation.
type ExecutorKey = usize;

static MODIFICATION_TIMES: LazyLock<Mutex<HashMap<(ExecutorKey, PathBuf), SystemTime>>> =
	LazyLock::new(|| Mutex::new(HashMap::new()));

/// Evaluates a config source file and returns its exported value.
#[async_trait]
pub trait ModuleExecutor: Send + Sync {
	/// Import the module at `path`.
	///
	/// With `fresh == false` a previously cached export may be returned. With
	/// `fresh == true` the file must be evaluated again, and the new export
	/// replaces the cached one rather than sitting beside it.
	async fn import(&self, path: &Path, fresh: bool) -> Result<ExportedConfig>;
}

/// Default executor: parses TOML, JSON, or YAML sources from disk.
///
/// Holds at most one cached export per path.
#[derive(Debug, Default)]
pub struct FileModuleExecutor {
	cache: Mutex<HashMap<PathBuf, ExportedConfig>>,
}

impl FileModuleExecutor {
	pub fn new() -> Self {
		Self::default()
	}

	/// The process-wide executor used by default.
	pub fn shared() -> Arc<FileModuleExecutor> {
		static SHARED: LazyLock<Arc<FileModuleExecutor>> =
			LazyLock::new(|| Arc::new(FileModuleExecutor::new()));
		Arc::clone(&SHARED)
	}

	/// Number of cached exports.
	pub fn cached_len(&self) -> usize {
		self.cache
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.len()
	}
}

#[async_trait]
impl ModuleExecutor for FileModuleExecutor {
	async fn import(&self, path: &Path, fresh: bool) -> Result<ExportedConfig> {
		if !fresh {
			let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
			if let Some(exported) = cache.get(path) {
				return Ok(exported.clone());
			}
		}

		let exported = parse_config_file(path).await?;
		self.cache
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.insert(path.to_path_buf(), exported.clone());
		Ok(exported)
	}
}

/// Loads config source files, re-evaluating them only after they change.
#[derive(Clone)]
pub struct SourceModuleLoader {
	executor: Arc<dyn ModuleExecutor>,
}

impl std::fmt::Debug for SourceModuleLoader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SourceModuleLoader").finish_non_exhaustive()
	}
}

impl Default for SourceModuleLoader {
	fn default() -> Self {
		Self::new(FileModuleExecutor::shared())
	}
}

impl SourceModuleLoader {
	pub fn new(executor: Arc<dyn ModuleExecutor>) -> Self {
		Self { executor }
	}

	/// Whether `path` must be re-evaluated given its current modification time.
	///
	/// Only times recorded through this loader's executor count. Another
	/// executor having seen `modified` says nothing about what this one holds.
	pub fn should_force_reload(&self, path: &Path, modified: SystemTime) -> bool {
		let times = MODIFICATION_TIMES
			.lock()
			.unwrap_or_else(PoisonError::into_inner);
		times.get(&(self.executor_key(), path.to_path_buf())) != Some(&modified)
	}

	fn record_modification_time(&self, path: &Path, modified: SystemTime) {
		MODIFICATION_TIMES
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.insert((self.executor_key(), path.to_path_buf()), modified);
	}

	// A dropped executor's address may be reused, but a new executor has an
	// empty cache and evaluates the file on a miss regardless of `fresh`.
	fn executor_key(&self) -> ExecutorKey {
		Arc::as_ptr(&self.executor).cast::<()>() as usize
	}

	/// Load the exported value of the config file at `path`.
	pub async fn load(&self, path: &Path) -> Result<ExportedConfig> {
		let metadata =
			tokio::fs::metadata(path)
				.await
				.map_err(|source| LintconfError::ConfigReadError {
					path: path.to_path_buf(),
					source,
				})?;
		let modified = metadata
			.modified()
			.map_err(|source| LintconfError::ConfigReadError {
				path: path.to_path_buf(),
				source,
			})?;

		let fresh = self.should_force_reload(path, modified);
		if fresh {
			debug!(config_file = %path.display(), "Loading config file");
		}

		let exported = self.executor.import(path, fresh).await?;
		self.record_modification_time(path, modified);
		Ok(exported)
	}
}
