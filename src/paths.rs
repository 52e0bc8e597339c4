//! Lexical path helpers shared by the resolver and the layer builder.

use crate::error::{LintconfError, Result};
use std::path::{Component, Path, PathBuf};

/// Reject empty path arguments.
pub fn require_path(path: &Path, argument: &'static str) -> Result<()> {
	if path.as_os_str().is_empty() {
		return Err(LintconfError::InvalidArgument { argument });
	}
	Ok(())
}

/// Resolve `path` against `cwd` and normalize the result.
///
/// Absolute paths replace `cwd` entirely. Symlinks are not followed.
pub fn resolve(cwd: &Path, path: &Path) -> PathBuf {
	normalize(&cwd.join(path))
}

/// Collapse `.` and `..` components without touching the filesystem.
pub fn normalize(path: &Path) -> PathBuf {
	let mut out = PathBuf::new();
	for component in path.components() {
		match component {
			Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
			Component::CurDir => {}
			Component::ParentDir => {
				// `..` at the root stays at the root
				if matches!(out.components().next_back(), Some(Component::Normal(_))) {
					out.pop();
				} else if !out.has_root() {
					out.push("..");
				}
			}
			Component::Normal(part) => out.push(part),
		}
	}
	out
}

/// Relative path from `from` to `to`, joined with forward slashes.
///
/// Returns an empty string when both paths are equal.
pub fn relative_posix(from: &Path, to: &Path) -> String {
	let from: Vec<_> = from.components().collect();
	let to: Vec<_> = to.components().collect();

	let common = from
		.iter()
		.zip(to.iter())
		.take_while(|(a, b)| a == b)
		.count();

	let mut parts: Vec<String> = Vec::new();
	parts.extend(from[common..].iter().map(|_| "..".to_string()));
	parts.extend(
		to[common..]
			.iter()
			.map(|c| c.as_os_str().to_string_lossy().into_owned()),
	);
	parts.join("/")
}

/// Join two forward-slash path fragments the way `path.posix.join` would.
pub fn join_posix(prefix: &str, rest: &str) -> String {
	let mut segments: Vec<&str> = Vec::new();
	for segment in prefix.split('/').chain(rest.split('/')) {
		match segment {
			"" | "." => {}
			".." if segments.last().is_some_and(|last| *last != "..") => {
				segments.pop();
			}
			_ => segments.push(segment),
		}
	}

	let mut joined = segments.join("/");
	if rest.ends_with('/') && !joined.is_empty() {
		joined.push('/');
	}
	joined
}
