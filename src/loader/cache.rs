use crate::error::Result;
use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

/// Derives the location cache key for a directory.
pub trait KeyPolicy: Send + Sync + 'static {
	type Key: Eq + Hash + Clone + Debug + Send + Sync;

	fn location_key(directory: &Path) -> Self::Key;
}

/// One cached location per absolute directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerDirectory;

impl KeyPolicy for PerDirectory {
	type Key = PathBuf;

	fn location_key(directory: &Path) -> PathBuf {
		directory.to_path_buf()
	}
}

/// A single location shared by every directory. The first resolution wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct SharedLocation;

impl KeyPolicy for SharedLocation {
	type Key = ();

	fn location_key(_directory: &Path) {}
}

/// A memoizing map where each key is initialized at most once.
///
/// Concurrent callers for the same key share one in-flight initialization.
/// A failed initialization leaves the key empty so a later call can retry.
/// Entries are never replaced or evicted.
#[derive(Debug)]
pub struct KeyedCache<K, V> {
	cells: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> Default for KeyedCache<K, V> {
	fn default() -> Self {
		Self {
			cells: Mutex::new(HashMap::new()),
		}
	}
}

impl<K, V> KeyedCache<K, V>
where
	K: Eq + Hash + Clone,
	V: Clone,
{
	pub fn new() -> Self {
		Self::default()
	}

	/// The settled value for `key`, without waiting on in-flight work.
	pub fn get(&self, key: &K) -> Option<V> {
		let cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
		cells.get(key).and_then(|cell| cell.get().cloned())
	}

	/// Return the value for `key`, running `init` if it has not settled yet.
	pub async fn get_or_try_init<F, Fut>(&self, key: K, init: F) -> Result<V>
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = Result<V>>,
	{
		let cell = {
			let mut cells = self.cells.lock().unwrap_or_else(PoisonError::into_inner);
			Arc::clone(cells.entry(key).or_default())
		};
		cell.get_or_try_init(init).await.cloned()
	}
}
