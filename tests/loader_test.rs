use async_trait::async_trait;
use lintconf::LintconfError;
use lintconf::config::{
	ConfigFileSetting, ExportedConfig, FileModuleExecutor, LoaderOptions, ModuleExecutor,
	SourceModuleLoader,
};
use lintconf::loader::{ConfigLoader, ConfigLookup, LegacyConfigLoader, LoaderKind, create_config_loader};
use lintconf::normalize::FlatNormalizer;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, SystemTime};

/// Counts every import, fresh or cached.
#[derive(Default)]
struct CountingExecutor {
	inner: FileModuleExecutor,
	imports: AtomicUsize,
}

#[async_trait]
impl ModuleExecutor for CountingExecutor {
	async fn import(&self, path: &Path, fresh: bool) -> lintconf::Result<ExportedConfig> {
		self.imports.fetch_add(1, Ordering::SeqCst);
		self.inner.import(path, fresh).await
	}
}

fn counting_loader(options: LoaderOptions) -> (ConfigLoader, Arc<CountingExecutor>) {
	let executor = Arc::new(CountingExecutor::default());
	let loader = ConfigLoader::with_collaborators(
		options,
		SourceModuleLoader::new(executor.clone()),
		Arc::new(FlatNormalizer),
	);
	(loader, executor)
}

fn set_mtime(path: &Path, time: SystemTime) {
	fs::File::options()
		.write(true)
		.open(path)
		.unwrap()
		.set_modified(time)
		.unwrap();
}

#[tokio::test]
async fn test_directories_sharing_a_config_share_one_array() {
	let temp_dir = tempfile::tempdir().unwrap();
	let root = temp_dir.path();
	fs::create_dir_all(root.join("a/b")).unwrap();
	fs::create_dir_all(root.join("c")).unwrap();
	fs::write(root.join("lintconf.config.toml"), "[rules]\nsemi = \"error\"\n").unwrap();

	let (loader, executor) = counting_loader(LoaderOptions::new(root));

	let first = loader.load_config_array_for_directory(root.join("a/b")).await.unwrap();
	let second = loader.load_config_array_for_directory(root.join("c")).await.unwrap();
	let third = loader.load_config_array_for_file(root.join("a/x.js")).await.unwrap();

	assert!(Arc::ptr_eq(&first, &second));
	assert!(Arc::ptr_eq(&first, &third));
	assert_eq!(executor.imports.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_nested_config_takes_over_below_it() {
	let temp_dir = tempfile::tempdir().unwrap();
	let root = temp_dir.path();
	fs::create_dir_all(root.join("pkg/src")).unwrap();
	fs::write(root.join("lintconf.config.json"), "{}").unwrap();
	fs::write(root.join("pkg/lintconf.config.yaml"), "rules:\n  semi: \"off\"\n").unwrap();

	let loader = ConfigLoader::new(LoaderOptions::new(root));

	let outer = loader.find_config_file_for_directory(root).await.unwrap();
	let inner = loader.find_config_file_for_file(root.join("pkg/src/a.js")).await.unwrap();
	assert_eq!(outer, Some(root.join("lintconf.config.json")));
	assert_eq!(inner, Some(root.join("pkg/lintconf.config.yaml")));

	let inner_array = loader.load_config_array_for_directory("pkg/src").await.unwrap();
	assert_eq!(inner_array.base_path(), root.join("pkg"));
}

#[tokio::test]
async fn test_explicit_config_applies_to_every_directory() {
	let loader = ConfigLoader::new(
		LoaderOptions::new("/proj/sub")
			.with_config_file(ConfigFileSetting::Path("../lintconf.config.toml".into())),
	);

	for dir in ["/", "/proj", "/somewhere/else", "relative/dir"] {
		let found = loader.find_config_file_for_directory(dir).await.unwrap();
		assert_eq!(found.as_deref(), Some(Path::new("/proj/lintconf.config.toml")));
	}
}

#[tokio::test]
async fn test_disabled_config_has_no_file_layers() {
	let temp_dir = tempfile::tempdir().unwrap();
	fs::write(
		temp_dir.path().join("lintconf.config.json"),
		r#"{ "name": "should-not-load" }"#,
	)
	.unwrap();

	let (loader, executor) = counting_loader(
		LoaderOptions::new(temp_dir.path())
			.with_config_file(ConfigFileSetting::Disabled)
			.with_default_configs(vec![json!({ "name": "defaults" })]),
	);

	assert_eq!(loader.find_config_file_for_directory(".").await.unwrap(), None);

	let array = loader.load_config_array_for_directory(".").await.unwrap();
	let names: Vec<_> = array.configs().filter_map(|c| c.name.clone()).collect();
	assert_eq!(names, vec!["defaults".to_string()]);
	assert_eq!(executor.imports.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_repeat_loads_do_not_reimport() {
	let temp_dir = tempfile::tempdir().unwrap();
	fs::write(temp_dir.path().join("lintconf.config.json"), "{}").unwrap();

	let (loader, executor) = counting_loader(LoaderOptions::new(temp_dir.path()));

	let first = loader.load_config_array_for_directory(".").await.unwrap();
	let second = loader.load_config_array_for_directory(".").await.unwrap();

	assert!(Arc::ptr_eq(&first, &second));
	assert_eq!(executor.imports.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_new_loader_sees_edited_config() {
	let temp_dir = tempfile::tempdir().unwrap();
	let config_path = temp_dir.path().join("lintconf.config.json");
	let executor = Arc::new(FileModuleExecutor::new());
	let base_time = SystemTime::UNIX_EPOCH + Duration::from_secs(2_000_000);

	fs::write(&config_path, r#"{ "rules": { "semi": "error" } }"#).unwrap();
	set_mtime(&config_path, base_time);

	let load = |executor: Arc<FileModuleExecutor>| {
		let loader = ConfigLoader::with_collaborators(
			LoaderOptions::new(temp_dir.path()),
			SourceModuleLoader::new(executor),
			Arc::new(FlatNormalizer),
		);
		async move {
			let array = loader.load_config_array_for_directory(".").await.unwrap();
			array
				.config_for_file(&loader.options().cwd.join("a.js"))
				.unwrap()
				.rules["semi"]
				.clone()
		}
	};

	assert_eq!(load(executor.clone()).await, json!("error"));

	fs::write(&config_path, r#"{ "rules": { "semi": "off" } }"#).unwrap();
	set_mtime(&config_path, base_time + Duration::from_secs(5));

	assert_eq!(load(executor.clone()).await, json!("off"));
	assert_eq!(executor.cached_len(), 1);
}

#[tokio::test]
async fn test_cli_ignore_patterns_are_rebased() {
	let temp_dir = tempfile::tempdir().unwrap();
	let root = temp_dir.path();
	let sub = root.join("sub");
	fs::create_dir_all(&sub).unwrap();
	fs::write(root.join("lintconf.config.json"), "{}").unwrap();

	let loader = ConfigLoader::new(
		LoaderOptions::new(&sub)
			.with_ignore_patterns(vec!["dist/**".to_string(), "!dist/keep.js".to_string()]),
	);

	let array = loader.load_config_array_for_directory(".").await.unwrap();
	let ignore_layer = array
		.configs()
		.find(|c| c.ignores.iter().any(|p| p.contains("dist")))
		.unwrap();
	assert_eq!(ignore_layer.ignores, vec!["sub/dist/**", "!sub/dist/keep.js"]);

	assert!(array.is_file_ignored(&sub.join("dist/bundle.js")));
	assert!(!array.is_file_ignored(&sub.join("dist/keep.js")));
	assert!(!array.is_file_ignored(&root.join("dist/bundle.js")));
}

#[tokio::test]
async fn test_cached_accessor_requires_prior_resolution() {
	let temp_dir = tempfile::tempdir().unwrap();
	fs::create_dir_all(temp_dir.path().join("a/b")).unwrap();
	fs::write(temp_dir.path().join("lintconf.config.json"), "{}").unwrap();

	let loader = ConfigLoader::new(LoaderOptions::new(temp_dir.path()));

	assert!(matches!(
		loader.get_cached_config_array_for_directory("a"),
		Err(LintconfError::NotFound { .. })
	));

	let built = loader.load_config_array_for_directory("a").await.unwrap();
	let cached = loader.get_cached_config_array_for_file("a/index.js").unwrap();
	assert!(Arc::ptr_eq(&built, &cached));

	// Locations are cached per directory, so a child is still unknown
	assert!(matches!(
		loader.get_cached_config_array_for_directory("a/b"),
		Err(LintconfError::NotFound { .. })
	));
}

#[tokio::test]
async fn test_search_exhaustion_is_config_file_missing() {
	let temp_dir = tempfile::tempdir().unwrap();
	let start = temp_dir.path().join("a/b/c");
	fs::create_dir_all(&start).unwrap();

	let loader = ConfigLoader::new(LoaderOptions::new(temp_dir.path()));

	match loader.find_config_file_for_directory(&start).await.unwrap_err() {
		LintconfError::ConfigFileMissing { start: reported } => assert_eq!(reported, start),
		other => panic!("Expected ConfigFileMissing, got {other:?}"),
	}

	// A failure is not cached: adding the file makes the next call succeed
	fs::write(temp_dir.path().join("a/lintconf.config.toml"), "").unwrap();
	let found = loader.find_config_file_for_directory(&start).await.unwrap();
	assert_eq!(found, Some(temp_dir.path().join("a/lintconf.config.toml")));
}

#[tokio::test]
async fn test_empty_file_path_is_invalid_argument() {
	let loader = ConfigLoader::new(LoaderOptions::new("/proj"));

	assert!(matches!(
		loader.find_config_file_for_file("").await,
		Err(LintconfError::InvalidArgument { .. })
	));
}

#[tokio::test]
async fn test_failed_build_does_not_poison_other_keys() {
	let temp_dir = tempfile::tempdir().unwrap();
	let root = temp_dir.path();
	fs::create_dir_all(root.join("good")).unwrap();
	fs::create_dir_all(root.join("bad")).unwrap();
	fs::write(root.join("good/lintconf.config.json"), "{}").unwrap();
	fs::write(root.join("bad/lintconf.config.json"), r#"{ "unknown": true }"#).unwrap();

	let loader = ConfigLoader::new(LoaderOptions::new(root));

	let good = loader.load_config_array_for_directory("good").await.unwrap();
	assert!(matches!(
		loader.load_config_array_for_directory("bad").await,
		Err(LintconfError::InvalidLayer { .. })
	));

	let cached = loader.get_cached_config_array_for_directory("good").unwrap();
	assert!(Arc::ptr_eq(&good, &cached));
	assert!(matches!(
		loader.get_cached_config_array_for_directory("bad"),
		Err(LintconfError::NotFound { .. })
	));
}

#[tokio::test]
async fn test_concurrent_loads_build_once() {
	let temp_dir = tempfile::tempdir().unwrap();
	fs::write(temp_dir.path().join("lintconf.config.json"), "{}").unwrap();

	let (loader, executor) = counting_loader(LoaderOptions::new(temp_dir.path()));

	let (a, b, c) = tokio::join!(
		loader.load_config_array_for_directory("."),
		loader.load_config_array_for_directory("."),
		loader.load_config_array_for_file("index.js"),
	);

	let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
	assert!(Arc::ptr_eq(&a, &b));
	assert!(Arc::ptr_eq(&a, &c));
	assert_eq!(executor.imports.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_legacy_loader_pins_first_location() {
	let temp_dir = tempfile::tempdir().unwrap();
	let root = temp_dir.path();
	fs::create_dir_all(root.join("pkg")).unwrap();
	fs::write(root.join("lintconf.config.json"), "{}").unwrap();
	fs::write(root.join("pkg/lintconf.config.json"), "{}").unwrap();

	let loader = LegacyConfigLoader::new(LoaderOptions::new(root));

	let first = loader.find_config_file_for_directory(root).await.unwrap();
	let second = loader.find_config_file_for_directory(root.join("pkg")).await.unwrap();
	assert_eq!(first, Some(root.join("lintconf.config.json")));
	assert_eq!(second, first);

	let outer = loader.load_config_array_for_directory(root).await.unwrap();
	let inner = loader.load_config_array_for_file(root.join("pkg/a.js")).await.unwrap();
	assert!(Arc::ptr_eq(&outer, &inner));
}

#[tokio::test]
async fn test_create_config_loader_kinds() {
	let temp_dir = tempfile::tempdir().unwrap();
	let root = temp_dir.path();
	fs::create_dir_all(root.join("pkg")).unwrap();
	fs::write(root.join("lintconf.config.json"), "{}").unwrap();
	fs::write(root.join("pkg/lintconf.config.json"), "{}").unwrap();

	let per_directory: Arc<dyn ConfigLookup> =
		create_config_loader(LoaderOptions::new(root), LoaderKind::PerDirectory);
	let legacy: Arc<dyn ConfigLookup> =
		create_config_loader(LoaderOptions::new(root), LoaderKind::Legacy);

	for loader in [&per_directory, &legacy] {
		let found = loader.find_config_file_for_directory(root).await.unwrap();
		assert_eq!(found, Some(root.join("lintconf.config.json")));
	}

	let pkg = root.join("pkg");
	assert_eq!(
		per_directory.find_config_file_for_directory(&pkg).await.unwrap(),
		Some(pkg.join("lintconf.config.json"))
	);
	assert_eq!(
		legacy.find_config_file_for_directory(&pkg).await.unwrap(),
		Some(root.join("lintconf.config.json"))
	);
}
