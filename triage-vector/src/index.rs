// ---------------------------------------------------------------------------
// CaseIndex — in-memory case vector index with on-disk snapshots
// ---------------------------------------------------------------------------
//
// Writes happen once at process start (bulk load or snapshot reopen);
// after that the index is read-mostly and `search` takes `&self`, so a
// shared reference can serve any number of concurrent callers without
// locking. Magnitudes are cached at insert time.
// ---------------------------------------------------------------------------

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::cosine::{cosine_distance, magnitude};
use crate::error::IndexError;
use crate::filter::FilterExpr;
use crate::persistence;
use crate::types::{CaseVector, ScoredHit};

#[derive(Debug)]
pub struct CaseIndex {
	entries: Vec<CaseVector>,
	by_id: HashMap<String, usize>,
	magnitudes: Vec<f64>,
	dimension: Option<usize>,
	model: String,
	dir: Option<PathBuf>,
	restored: bool,
}

impl CaseIndex {
	/// Create an empty in-memory index with no backing directory.
	pub fn new(model: &str) -> Self {
		Self {
			entries: Vec::new(),
			by_id: HashMap::new(),
			magnitudes: Vec::new(),
			dimension: None,
			model: model.to_string(),
			dir: None,
			restored: false,
		}
	}

	/// Open an index backed by `dir`. If the directory holds a snapshot it
	/// is restored without re-embedding; its manifest must name the same
	/// embedding model the caller configured. Otherwise the index starts
	/// empty and `was_restored` reports false.
	pub fn open(dir: &Path, model: &str) -> Result<Self, IndexError> {
		let mut index = Self::new(model);
		index.dir = Some(dir.to_path_buf());

		match persistence::load_snapshot(dir)? {
			None => Ok(index),
			Some(snapshot) => {
				if snapshot.model != model {
					return Err(IndexError::ModelMismatch {
						stored: snapshot.model,
						configured: model.to_string(),
					});
				}
				if snapshot.dimension > 0 {
					index.dimension = Some(snapshot.dimension);
				}
				for vector in snapshot.vectors {
					index.insert(vector)?;
				}
				index.restored = true;
				tracing::debug!(
					cases = index.len(),
					dir = %dir.display(),
					"Restored index snapshot"
				);
				Ok(index)
			}
		}
	}

	/// Whether `open` found and restored a persisted snapshot.
	pub fn was_restored(&self) -> bool {
		self.restored
	}

	pub fn model(&self) -> &str {
		&self.model
	}

	pub fn dimension(&self) -> Option<usize> {
		self.dimension
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn ids(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|e| e.id.as_str())
	}

	// -- Writes (startup only) ----------------------------------------------

	/// Insert or replace by id. Re-inserting an existing id overwrites the
	/// stored entry in place; the index never grows from a re-load.
	pub fn upsert(&mut self, vector: CaseVector) -> Result<(), IndexError> {
		self.insert(vector)
	}

	pub fn upsert_batch(&mut self, vectors: Vec<CaseVector>) -> Result<(), IndexError> {
		for vector in vectors {
			self.insert(vector)?;
		}
		Ok(())
	}

	fn insert(&mut self, vector: CaseVector) -> Result<(), IndexError> {
		if vector.id.trim().is_empty() {
			return Err(IndexError::InvalidVector("empty id".into()));
		}
		if vector.embedding.is_empty() {
			return Err(IndexError::InvalidVector(format!(
				"empty embedding for '{}'",
				vector.id
			)));
		}
		match self.dimension {
			None => self.dimension = Some(vector.embedding.len()),
			Some(dim) if dim != vector.embedding.len() => {
				return Err(IndexError::InvalidVector(format!(
					"dimension mismatch for '{}': index holds {}-d vectors, got {}",
					vector.id,
					dim,
					vector.embedding.len()
				)));
			}
			Some(_) => {}
		}

		let mag = magnitude(&vector.embedding);
		match self.by_id.get(&vector.id) {
			Some(&slot) => {
				self.entries[slot] = vector;
				self.magnitudes[slot] = mag;
			}
			None => {
				self.by_id.insert(vector.id.clone(), self.entries.len());
				self.entries.push(vector);
				self.magnitudes.push(mag);
			}
		}
		Ok(())
	}

	/// Write a snapshot to the backing directory. A no-op for purely
	/// in-memory indexes.
	pub fn persist(&self) -> Result<(), IndexError> {
		let Some(dir) = &self.dir else {
			tracing::debug!("Index has no backing directory; skipping snapshot");
			return Ok(());
		};
		persistence::save_snapshot(
			dir,
			&self.model,
			self.dimension.unwrap_or(0),
			&self.entries,
		)
	}

	// -- Search -------------------------------------------------------------

	/// Nearest-neighbor search, optionally narrowed by an exact-match
	/// metadata filter. Hits come back ascending by distance, at most `k`.
	/// A zero-magnitude query or an empty index yields no hits — never an
	/// error.
	pub fn search(
		&self,
		query: &[f32],
		k: usize,
		filter: Option<&FilterExpr>,
	) -> Vec<ScoredHit> {
		let query_mag = magnitude(query);
		if query_mag == 0.0 || k == 0 {
			return Vec::new();
		}

		let mut hits: Vec<ScoredHit> = Vec::new();
		for (slot, entry) in self.entries.iter().enumerate() {
			if let Some(f) = filter {
				if !f.matches(&entry.metadata) {
					continue;
				}
			}
			hits.push(ScoredHit {
				id: entry.id.clone(),
				text: entry.text.clone(),
				metadata: entry.metadata.clone(),
				distance: cosine_distance(
					query,
					&entry.embedding,
					query_mag,
					self.magnitudes[slot],
				),
			});
		}

		hits.sort_by(|a, b| {
			a.distance
				.partial_cmp(&b.distance)
				.unwrap_or(Ordering::Equal)
		});
		hits.truncate(k);
		hits
	}
}
