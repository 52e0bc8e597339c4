use crate::config::layers::LayerBuilder;
use crate::config::locate::LocationResolver;
use crate::config::module::SourceModuleLoader;
use crate::config::types::{LoaderOptions, ResolvedLocation};
use crate::error::{LintconfError, Result};
use crate::loader::cache::{KeyPolicy, KeyedCache, PerDirectory, SharedLocation};
use crate::normalize::{ConfigArray, FlatNormalizer, LayerNormalizer};
use crate::paths;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Resolves and caches config arrays for files and directories.
///
/// Locations are cached under the key chosen by `P`. Built arrays are cached
/// by config file path, so every directory governed by the same file shares
/// one `Arc<ConfigArray>`.
pub struct CachedConfigLoader<P: KeyPolicy> {
	options: LoaderOptions,
	resolver: LocationResolver,
	builder: LayerBuilder,
	locations: KeyedCache<P::Key, ResolvedLocation>,
	arrays: KeyedCache<Option<PathBuf>, Arc<ConfigArray>>,
	_policy: PhantomData<P>,
}

/// Looks up the config file for each directory separately.
pub type ConfigLoader = CachedConfigLoader<PerDirectory>;

/// Pins the first resolved config for the loader's whole lifetime.
///
/// Only suitable when every path passed in shares one config.
pub type LegacyConfigLoader = CachedConfigLoader<SharedLocation>;

impl<P: KeyPolicy> std::fmt::Debug for CachedConfigLoader<P> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CachedConfigLoader")
			.field("options", &self.options)
			.field("locations", &self.locations)
			.finish_non_exhaustive()
	}
}

impl<P: KeyPolicy> CachedConfigLoader<P> {
	/// A loader using the shared file executor and the flat normalizer.
	pub fn new(options: LoaderOptions) -> Self {
		Self::with_collaborators(options, SourceModuleLoader::default(), Arc::new(FlatNormalizer))
	}

	pub fn with_collaborators(
		options: LoaderOptions,
		modules: SourceModuleLoader,
		normalizer: Arc<dyn LayerNormalizer>,
	) -> Self {
		Self {
			resolver: LocationResolver::new(&options.cwd, &options.config_file),
			builder: LayerBuilder::new(modules, normalizer),
			locations: KeyedCache::new(),
			arrays: KeyedCache::new(),
			options,
			_policy: PhantomData,
		}
	}

	pub fn options(&self) -> &LoaderOptions {
		&self.options
	}

	/// Config file governing `file`, or `None` when config files are disabled.
	pub async fn find_config_file_for_file(&self, file: impl AsRef<Path>) -> Result<Option<PathBuf>> {
		let directory = self.directory_of_file(file.as_ref())?;
		self.source_path_for(&directory).await
	}

	/// Config file governing `directory`, or `None` when config files are disabled.
	pub async fn find_config_file_for_directory(
		&self,
		directory: impl AsRef<Path>,
	) -> Result<Option<PathBuf>> {
		let directory = self.absolute(directory.as_ref(), "directory path")?;
		self.source_path_for(&directory).await
	}

	pub async fn load_config_array_for_file(&self, file: impl AsRef<Path>) -> Result<Arc<ConfigArray>> {
		let directory = self.directory_of_file(file.as_ref())?;
		self.config_array_for(&directory).await
	}

	pub async fn load_config_array_for_directory(
		&self,
		directory: impl AsRef<Path>,
	) -> Result<Arc<ConfigArray>> {
		let directory = self.absolute(directory.as_ref(), "directory path")?;
		self.config_array_for(&directory).await
	}

	/// The array already built for `file`'s directory. Never touches the disk.
	pub fn get_cached_config_array_for_file(&self, file: impl AsRef<Path>) -> Result<Arc<ConfigArray>> {
		let directory = self.directory_of_file(file.as_ref())?;
		self.cached_config_array_for(&directory)
	}

	/// The array already built for `directory`. Never touches the disk.
	pub fn get_cached_config_array_for_directory(
		&self,
		directory: impl AsRef<Path>,
	) -> Result<Arc<ConfigArray>> {
		let directory = self.absolute(directory.as_ref(), "directory path")?;
		self.cached_config_array_for(&directory)
	}

	fn absolute(&self, path: &Path, argument: &'static str) -> Result<PathBuf> {
		paths::require_path(path, argument)?;
		Ok(paths::resolve(&self.options.cwd, path))
	}

	fn directory_of_file(&self, file: &Path) -> Result<PathBuf> {
		let file = self.absolute(file, "file path")?;
		Ok(file.parent().map(Path::to_path_buf).unwrap_or(file))
	}

	async fn location_for(&self, directory: &Path) -> Result<ResolvedLocation> {
		self.locations
			.get_or_try_init(P::location_key(directory), move || async move {
				debug!(directory = %directory.display(), "Resolving config location");
				self.resolver.resolve(directory).await
			})
			.await
	}

	async fn source_path_for(&self, directory: &Path) -> Result<Option<PathBuf>> {
		Ok(self.location_for(directory).await?.source_path)
	}

	async fn config_array_for(&self, directory: &Path) -> Result<Arc<ConfigArray>> {
		let location = self.location_for(directory).await?;
		self.arrays
			.get_or_try_init(location.source_path.clone(), move || async move {
				debug!(
					config_file = ?location.source_path,
					"Building config array"
				);
				self.builder
					.build(location.source_path(), &location.base_path, &self.options)
					.await
					.map(Arc::new)
			})
			.await
	}

	fn cached_config_array_for(&self, directory: &Path) -> Result<Arc<ConfigArray>> {
		let location = self
			.locations
			.get(&P::location_key(directory))
			.ok_or_else(|| LintconfError::NotFound {
				directory: directory.to_path_buf(),
				what: "config location",
			})?;

		self.arrays
			.get(&location.source_path)
			.ok_or_else(|| LintconfError::NotFound {
				directory: directory.to_path_buf(),
				what: "config array",
			})
	}
}
