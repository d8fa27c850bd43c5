use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single indexed case: the concatenated problem/root-cause/solution
/// text that was embedded, its vector, and the exact-match metadata copied
/// from the source record. Owned exclusively by the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseVector {
	pub id: String,
	pub text: String,
	pub embedding: Vec<f32>,
	pub metadata: HashMap<String, String>,
}

/// A ranked search result.
///
/// `distance` is cosine distance normalized into [0, 1] (negative
/// similarity clamps to zero before inversion), so `1.0 - distance` is a
/// valid similarity for every stored vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredHit {
	pub id: String,
	pub text: String,
	pub metadata: HashMap<String, String>,
	pub distance: f64,
}

impl ScoredHit {
	pub fn similarity(&self) -> f64 {
		1.0 - self.distance
	}
}
