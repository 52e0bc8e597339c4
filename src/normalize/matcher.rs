use crate::error::{LintconfError, Result};
use globset::{GlobBuilder, GlobMatcher};

/// A compiled glob from a `files` or `ignores` list.
#[derive(Debug, Clone)]
struct CompiledPattern {
	/// Pattern started with `!`.
	negated: bool,

	/// Pattern ended with `/` and only matches directories.
	dir_only: bool,

	matcher: GlobMatcher,
}

/// An ordered list of glob patterns, matched against `/`-separated paths
/// relative to a config's base path.
#[derive(Debug, Clone, Default)]
pub struct PatternList {
	patterns: Vec<CompiledPattern>,
}

impl PatternList {
	/// Compile a list of patterns.
	pub fn compile(patterns: &[String]) -> Result<Self> {
		patterns
			.iter()
			.map(|p| compile_pattern(p))
			.collect::<Result<Vec<_>>>()
			.map(|patterns| PatternList { patterns })
	}

	pub fn is_empty(&self) -> bool {
		self.patterns.is_empty()
	}

	/// The verdict of the last pattern matching `relative`, if any.
	///
	/// `Some(true)` means a positive pattern matched last, `Some(false)`
	/// means a negated one did.
	fn decide(&self, relative: &str, is_dir: bool) -> Option<bool> {
		self.patterns
			.iter()
			.rev()
			.find(|p| (!p.dir_only || is_dir) && p.matcher.is_match(relative))
			.map(|p| !p.negated)
	}

	/// Whether any positive pattern matches the file at `relative`.
	pub fn matches_file(&self, relative: &str) -> bool {
		self.decide(relative, false) == Some(true)
	}

	/// Whether the file at `relative` is excluded by this list.
	///
	/// A file inside an excluded directory stays excluded even if a later
	/// negated pattern names the file itself.
	pub fn excludes_file(&self, relative: &str) -> bool {
		let mut prefix_end = 0;
		while let Some(offset) = relative[prefix_end..].find('/') {
			let dir = &relative[..prefix_end + offset];
			if self.decide(dir, true) == Some(true) {
				return true;
			}
			prefix_end += offset + 1;
		}

		self.decide(relative, false) == Some(true)
	}
}

fn compile_pattern(pattern: &str) -> Result<CompiledPattern> {
	let (negated, rest) = match pattern.strip_prefix('!') {
		Some(rest) => (true, rest),
		None => (false, pattern),
	};
	let rest = rest.strip_prefix("./").unwrap_or(rest);
	let rest = rest.strip_prefix('/').unwrap_or(rest);
	let (dir_only, glob) = match rest.strip_suffix('/') {
		Some(glob) => (true, glob),
		None => (false, rest),
	};

	let matcher = GlobBuilder::new(glob)
		.literal_separator(true)
		.build()
		.map_err(|source| LintconfError::InvalidGlob {
			pattern: pattern.to_string(),
			source,
		})?
		.compile_matcher();

	Ok(CompiledPattern {
		negated,
		dir_only,
		matcher,
	})
}
