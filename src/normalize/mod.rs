//! Normalization of a layer sequence into a final config array.
//!
//! This module handles:
//! - Collecting raw layers in precedence order
//! - Validating each layer against the flat config schema
//! - Matching files against `files` and `ignores` globs

pub mod flat;
pub mod matcher;

pub use flat::{ConfigArray, FlatConfig, FlatNormalizer};
pub use matcher::PatternList;

use crate::config::types::RawLayer;
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Raw layers waiting to be normalized. Later layers take precedence.
#[derive(Debug, Clone)]
pub struct PendingLayers {
	base_path: PathBuf,
	ignore_enabled: bool,
	layers: Vec<RawLayer>,
}

impl PendingLayers {
	pub fn new(base_path: &Path, ignore_enabled: bool) -> Self {
		Self {
			base_path: base_path.to_path_buf(),
			ignore_enabled,
			layers: Vec::new(),
		}
	}

	pub fn push(&mut self, layer: RawLayer) {
		self.layers.push(layer);
	}

	pub fn extend(&mut self, layers: impl IntoIterator<Item = RawLayer>) {
		self.layers.extend(layers);
	}

	pub fn base_path(&self) -> &Path {
		&self.base_path
	}

	pub fn ignore_enabled(&self) -> bool {
		self.ignore_enabled
	}

	pub fn layers(&self) -> &[RawLayer] {
		&self.layers
	}

	pub fn into_layers(self) -> Vec<RawLayer> {
		self.layers
	}
}

/// Turns pending layers into a validated, immutable config array.
#[async_trait]
pub trait LayerNormalizer: Send + Sync {
	async fn normalize(&self, pending: PendingLayers) -> Result<ConfigArray>;
}
