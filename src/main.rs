use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use lintconf::LintconfError;
use lintconf::config::{CONFIG_FILE_NAMES, ConfigFileSetting, LoaderOptions};
use lintconf::loader::{ConfigLookup, LoaderKind, create_config_loader};
use lintconf::logging::init_tracing;

const INIT_TEMPLATE: &str = r#"# lintconf configuration
#
# Layers listed under [[configs]] apply in order; later layers win.

[[configs]]
name = "project/ignores"
ignores = ["dist/", "coverage/"]

[[configs]]
name = "project/rules"
files = ["**/*.js"]

[configs.rules]
no-unused-vars = "warn"
eqeqeq = ["error", "always"]
"#;

#[derive(Parser)]
#[command(name = "lintconf")]
#[command(
	author,
	version,
	about = "Resolve and inspect layered lint configuration"
)]
#[command(arg_required_else_help = true)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Use this config file instead of searching for one
	#[arg(
		short = 'c',
		long = "config",
		value_name = "PATH",
		global = true,
		conflicts_with = "no_config_lookup"
	)]
	config: Option<PathBuf>,

	/// Do not use any config file
	#[arg(long, global = true)]
	no_config_lookup: bool,

	/// Ignore files matching this pattern, relative to the current directory
	#[arg(long = "ignore-pattern", value_name = "PATTERN", global = true)]
	ignore_patterns: Vec<String>,

	/// Disable ignore filtering
	#[arg(long, global = true)]
	no_ignore: bool,

	/// Resolve the config once and reuse it for every path
	#[arg(long, global = true)]
	legacy: bool,

	/// Log config resolution to stderr
	#[arg(long, global = true)]
	debug: bool,

	/// Create a template lintconf.config.toml in the current directory
	#[arg(long)]
	init: bool,

	/// Overwrite existing lintconf.config.toml when using --init
	#[arg(long, requires = "init")]
	force: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Print the config file governing a file or directory
	Find { path: PathBuf },

	/// Print the merged config for a file as JSON
	PrintConfig { file: PathBuf },

	/// Report whether each file is ignored or linted
	Check {
		#[arg(required = true)]
		paths: Vec<PathBuf>,
	},
}

#[tokio::main]
async fn main() -> ExitCode {
	match run().await {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

async fn run() -> Result<ExitCode> {
	let cli = Cli::parse();
	init_tracing(if cli.debug { "lintconf=debug" } else { "warn" });

	if cli.init {
		return handle_init(cli.force);
	}

	let Some(command) = cli.command.as_ref() else {
		return Ok(ExitCode::SUCCESS);
	};

	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let loader = create_config_loader(loader_options(&cli, cwd.clone()), loader_kind(&cli));

	match command {
		Commands::Find { path } => handle_find(loader.as_ref(), path).await,
		Commands::PrintConfig { file } => handle_print_config(loader.as_ref(), &cwd, file).await,
		Commands::Check { paths } => handle_check(loader.as_ref(), &cwd, paths).await,
	}
}

fn loader_options(cli: &Cli, cwd: PathBuf) -> LoaderOptions {
	let config_file = if cli.no_config_lookup {
		ConfigFileSetting::Disabled
	} else if let Some(ref path) = cli.config {
		ConfigFileSetting::Path(path.clone())
	} else {
		ConfigFileSetting::Search
	};

	LoaderOptions::new(cwd)
		.with_config_file(config_file)
		.with_ignore_enabled(!cli.no_ignore)
		.with_ignore_patterns(cli.ignore_patterns.clone())
}

fn loader_kind(cli: &Cli) -> LoaderKind {
	if cli.legacy {
		LoaderKind::Legacy
	} else {
		LoaderKind::PerDirectory
	}
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(CONFIG_FILE_NAMES[0]);

	if config_path.exists() && !force {
		anyhow::bail!(
			"{} already exists. Use --force to overwrite.",
			config_path.display()
		);
	}

	std::fs::write(&config_path, INIT_TEMPLATE)
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created {}", config_path.display());
	Ok(ExitCode::SUCCESS)
}

async fn handle_find(loader: &dyn ConfigLookup, path: &Path) -> Result<ExitCode> {
	let is_dir = tokio::fs::metadata(path)
		.await
		.map(|m| m.is_dir())
		.unwrap_or(false);

	let found = if is_dir {
		loader.find_config_file_for_directory(path).await
	} else {
		loader.find_config_file_for_file(path).await
	};
	let found = found.with_context(|| format!("Failed to find config for {}", path.display()))?;

	match found {
		Some(config_file) => println!("{}", config_file.display()),
		None => println!("(none)"),
	}
	Ok(ExitCode::SUCCESS)
}

async fn handle_print_config(loader: &dyn ConfigLookup, cwd: &Path, file: &Path) -> Result<ExitCode> {
	let configs = loader
		.load_config_array_for_file(file)
		.await
		.with_context(|| format!("Failed to load configuration for {}", file.display()))?;

	match configs.config_for_file(&cwd.join(file)) {
		Some(config) => {
			let rendered =
				serde_json::to_string_pretty(&config).context("Failed to render configuration")?;
			println!("{rendered}");
		}
		None => println!("(ignored)"),
	}
	Ok(ExitCode::SUCCESS)
}

async fn handle_check(loader: &dyn ConfigLookup, cwd: &Path, paths: &[PathBuf]) -> Result<ExitCode> {
	for path in paths {
		// Files in an already-seen directory reuse the built array
		let configs = match loader.get_cached_config_array_for_file(path) {
			Ok(configs) => configs,
			Err(LintconfError::NotFound { .. }) => loader
				.load_config_array_for_file(path)
				.await
				.with_context(|| format!("Failed to load configuration for {}", path.display()))?,
			Err(e) => return Err(e.into()),
		};

		let status = if configs.is_file_ignored(&cwd.join(path)) {
			"ignored"
		} else {
			"linted"
		};
		println!("{}: {}", path.display(), status);
	}
	Ok(ExitCode::SUCCESS)
}
