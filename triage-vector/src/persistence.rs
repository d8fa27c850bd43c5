// ---------------------------------------------------------------------------
// On-disk snapshot format
// ---------------------------------------------------------------------------
//
// A snapshot is a directory containing `index.gz`: gzipped JSON
//
//   { "version": 1, "model": "<embedding model>", "dimension": N,
//     "entries": { "<id>": "<base64 binary entry>", ... } }
//
// Each binary entry:
//   [4B text-len BE][text UTF-8]
//   [4B emb-b64-len BE][embedding base64 of f32 LE]
//   [4B meta-json-len BE][metadata JSON UTF-8]
//
// The `model` field pins the embedding model the vectors were produced
// with; an index built with one model is invalid input for another.
// Corrupt or truncated data is an error, never silently skipped.
// ---------------------------------------------------------------------------

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use crate::error::IndexError;
use crate::types::CaseVector;

pub const INDEX_FILE: &str = "index.gz";
pub const FORMAT_VERSION: u32 = 1;

/// Everything restored from a snapshot directory.
#[derive(Debug)]
pub struct Snapshot {
	pub model: String,
	pub dimension: usize,
	pub vectors: Vec<CaseVector>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
	version: u32,
	model: String,
	dimension: usize,
	/// Each value is a base64-encoded binary entry.
	entries: HashMap<String, String>,
}

// ---------------------------------------------------------------------------
// Embedding codec — base64 of f32 little-endian bytes
// ---------------------------------------------------------------------------

pub fn encode_embedding(embedding: &[f32]) -> String {
	let bytes: Vec<u8> = embedding.iter().flat_map(|f| f.to_le_bytes()).collect();
	STANDARD.encode(&bytes)
}

pub fn decode_embedding(encoded: &str) -> Result<Vec<f32>, IndexError> {
	let bytes = STANDARD
		.decode(encoded)
		.map_err(|e| IndexError::Corruption(format!("invalid embedding base64: {}", e)))?;
	if bytes.len() % 4 != 0 {
		return Err(IndexError::Corruption(
			"embedding byte length is not a multiple of 4".into(),
		));
	}
	Ok(bytes
		.chunks_exact(4)
		.map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
		.collect())
}

// ---------------------------------------------------------------------------
// Per-entry binary codec
// ---------------------------------------------------------------------------

fn push_field(buf: &mut Vec<u8>, field: &[u8]) {
	buf.extend_from_slice(&(field.len() as u32).to_be_bytes());
	buf.extend_from_slice(field);
}

fn take_field<'a>(data: &'a [u8], offset: &mut usize, what: &str) -> Result<&'a [u8], IndexError> {
	let header_end = *offset + 4;
	if header_end > data.len() {
		return Err(IndexError::Corruption(format!("truncated {} length", what)));
	}
	let len = u32::from_be_bytes([
		data[*offset],
		data[*offset + 1],
		data[*offset + 2],
		data[*offset + 3],
	]) as usize;
	let end = header_end + len;
	if end > data.len() {
		return Err(IndexError::Corruption(format!("truncated {} data", what)));
	}
	*offset = end;
	Ok(&data[header_end..end])
}

fn field_str<'a>(raw: &'a [u8], what: &str) -> Result<&'a str, IndexError> {
	std::str::from_utf8(raw)
		.map_err(|e| IndexError::Corruption(format!("invalid UTF-8 in {}: {}", what, e)))
}

pub fn serialize_entry(vector: &CaseVector) -> Result<Vec<u8>, IndexError> {
	let emb_b64 = encode_embedding(&vector.embedding);
	let meta_json = serde_json::to_string(&vector.metadata)
		.map_err(|e| IndexError::Serialization(format!("metadata encode: {}", e)))?;

	let mut buf = Vec::with_capacity(12 + vector.text.len() + emb_b64.len() + meta_json.len());
	push_field(&mut buf, vector.text.as_bytes());
	push_field(&mut buf, emb_b64.as_bytes());
	push_field(&mut buf, meta_json.as_bytes());
	Ok(buf)
}

pub fn deserialize_entry(id: &str, data: &[u8]) -> Result<CaseVector, IndexError> {
	let mut offset = 0;

	let text = field_str(take_field(data, &mut offset, "text")?, "text")?.to_string();
	let embedding = decode_embedding(field_str(
		take_field(data, &mut offset, "embedding")?,
		"embedding",
	)?)?;
	let meta_json = field_str(take_field(data, &mut offset, "metadata")?, "metadata")?;
	let metadata: HashMap<String, String> = serde_json::from_str(meta_json)
		.map_err(|e| IndexError::Corruption(format!("invalid metadata JSON: {}", e)))?;

	Ok(CaseVector {
		id: id.to_string(),
		text,
		embedding,
		metadata,
	})
}

// ---------------------------------------------------------------------------
// Directory I/O
// ---------------------------------------------------------------------------

/// Write a snapshot of all vectors into `dir/index.gz`, creating the
/// directory if needed.
pub fn save_snapshot(
	dir: &Path,
	model: &str,
	dimension: usize,
	vectors: &[CaseVector],
) -> Result<(), IndexError> {
	std::fs::create_dir_all(dir)?;

	let mut entries = HashMap::with_capacity(vectors.len());
	for vector in vectors {
		entries.insert(vector.id.clone(), STANDARD.encode(serialize_entry(vector)?));
	}

	let file = IndexFile {
		version: FORMAT_VERSION,
		model: model.to_string(),
		dimension,
		entries,
	};
	let json = serde_json::to_vec(&file)
		.map_err(|e| IndexError::Serialization(format!("index encode: {}", e)))?;

	let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
	encoder.write_all(&json)?;
	let compressed = encoder.finish()?;

	std::fs::write(dir.join(INDEX_FILE), compressed)?;
	tracing::debug!(count = vectors.len(), dir = %dir.display(), "Snapshot written");
	Ok(())
}

/// Load a snapshot from `dir`, if one exists. `Ok(None)` means the
/// directory has no index file — the caller starts empty.
pub fn load_snapshot(dir: &Path) -> Result<Option<Snapshot>, IndexError> {
	let path = dir.join(INDEX_FILE);
	if !path.exists() {
		return Ok(None);
	}

	let raw = std::fs::read(&path)?;
	let mut decoder = GzDecoder::new(raw.as_slice());
	let mut json = Vec::new();
	decoder
		.read_to_end(&mut json)
		.map_err(|e| IndexError::Corruption(format!("gzip decode: {}", e)))?;

	let file: IndexFile = serde_json::from_slice(&json)
		.map_err(|e| IndexError::Corruption(format!("invalid index JSON: {}", e)))?;
	if file.version != FORMAT_VERSION {
		return Err(IndexError::UnsupportedVersion(file.version));
	}

	let mut vectors = Vec::with_capacity(file.entries.len());
	for (id, b64) in &file.entries {
		let binary = STANDARD.decode(b64).map_err(|e| {
			IndexError::Corruption(format!("invalid base64 for entry '{}': {}", id, e))
		})?;
		vectors.push(deserialize_entry(id, &binary)?);
	}

	Ok(Some(Snapshot {
		model: file.model,
		dimension: file.dimension,
		vectors,
	}))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn vector(id: &str, text: &str, embedding: &[f32]) -> CaseVector {
		let mut metadata = HashMap::new();
		metadata.insert("model_type".to_string(), "X300-Pro".to_string());
		CaseVector {
			id: id.to_string(),
			text: text.to_string(),
			embedding: embedding.to_vec(),
			metadata,
		}
	}

	#[test]
	fn embedding_codec_roundtrip() {
		let original = vec![1.0f32, -0.5, 0.0, 3.14159, -1e10, 1e-10];
		let decoded = decode_embedding(&encode_embedding(&original)).unwrap();
		assert_eq!(original.len(), decoded.len());
		for (a, b) in original.iter().zip(decoded.iter()) {
			assert!((a - b).abs() < 1e-6);
		}
	}

	#[test]
	fn embedding_codec_rejects_misaligned_bytes() {
		let b64 = STANDARD.encode([1u8, 2, 3]);
		assert!(matches!(
			decode_embedding(&b64),
			Err(IndexError::Corruption(_))
		));
	}

	#[test]
	fn entry_roundtrip() {
		let v = vector("case-1", "boot loop after update", &[0.1, 0.2, 0.3]);
		let decoded = deserialize_entry("case-1", &serialize_entry(&v).unwrap()).unwrap();
		assert_eq!(decoded.id, "case-1");
		assert_eq!(decoded.text, "boot loop after update");
		assert_eq!(decoded.metadata.get("model_type").unwrap(), "X300-Pro");
		assert_eq!(decoded.embedding.len(), 3);
	}

	#[test]
	fn truncated_entry_is_corruption() {
		let v = vector("case-1", "text", &[0.5]);
		let bytes = serialize_entry(&v).unwrap();
		let err = deserialize_entry("case-1", &bytes[..bytes.len() - 3]).unwrap_err();
		assert!(matches!(err, IndexError::Corruption(_)));
	}

	#[test]
	fn snapshot_roundtrip() {
		let dir = tempfile::tempdir().unwrap();
		let vectors = vec![
			vector("a", "first case", &[1.0, 0.0]),
			vector("b", "second case", &[0.0, 1.0]),
		];
		save_snapshot(dir.path(), "nomic-embed-text", 2, &vectors).unwrap();

		let snapshot = load_snapshot(dir.path()).unwrap().unwrap();
		assert_eq!(snapshot.model, "nomic-embed-text");
		assert_eq!(snapshot.dimension, 2);
		assert_eq!(snapshot.vectors.len(), 2);
		let mut ids: Vec<&str> = snapshot.vectors.iter().map(|v| v.id.as_str()).collect();
		ids.sort();
		assert_eq!(ids, vec!["a", "b"]);
	}

	#[test]
	fn missing_snapshot_is_none() {
		let dir = tempfile::tempdir().unwrap();
		assert!(load_snapshot(dir.path()).unwrap().is_none());
	}

	#[test]
	fn garbage_file_is_corruption() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join(INDEX_FILE), b"not a gzip stream").unwrap();
		assert!(matches!(
			load_snapshot(dir.path()),
			Err(IndexError::Corruption(_))
		));
	}

	#[test]
	fn future_version_is_rejected() {
		let dir = tempfile::tempdir().unwrap();
		let json = serde_json::json!({
			"version": 99,
			"model": "m",
			"dimension": 2,
			"entries": {},
		});
		let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(json.to_string().as_bytes()).unwrap();
		std::fs::write(dir.path().join(INDEX_FILE), encoder.finish().unwrap()).unwrap();
		assert!(matches!(
			load_snapshot(dir.path()),
			Err(IndexError::UnsupportedVersion(99))
		));
	}
}
