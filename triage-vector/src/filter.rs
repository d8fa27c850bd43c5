// ---------------------------------------------------------------------------
// Filter expressions — exact-match constraints over case metadata
// ---------------------------------------------------------------------------
//
// Similarity-search backends are picky about filter shape: an empty filter
// map is rejected outright, a single constraint must be passed bare, and
// only two or more constraints may be wrapped in an AND combinator.
// `from_constraints` encodes that three-way rule in one place so callers
// never hand the search layer an invalid shape.
// ---------------------------------------------------------------------------

use std::collections::HashMap;

/// A conjunction of exact-match constraints on case metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
	/// `metadata[key] == value`
	Eq { key: String, value: String },
	/// Every clause must match. Only constructed for two or more clauses.
	And(Vec<FilterExpr>),
}

impl FilterExpr {
	pub fn eq(key: impl Into<String>, value: impl Into<String>) -> Self {
		Self::Eq {
			key: key.into(),
			value: value.into(),
		}
	}

	/// Encode a constraint list into the backend-safe filter shape:
	/// zero constraints yield no filter at all, one yields the bare
	/// clause, two or more are wrapped in an explicit AND.
	pub fn from_constraints(constraints: Vec<(String, String)>) -> Option<FilterExpr> {
		let mut clauses: Vec<FilterExpr> = constraints
			.into_iter()
			.map(|(key, value)| FilterExpr::Eq { key, value })
			.collect();

		match clauses.len() {
			0 => None,
			1 => Some(clauses.remove(0)),
			_ => Some(FilterExpr::And(clauses)),
		}
	}

	/// Evaluate the expression against a metadata map.
	pub fn matches(&self, metadata: &HashMap<String, String>) -> bool {
		match self {
			Self::Eq { key, value } => metadata.get(key).is_some_and(|v| v == value),
			Self::And(clauses) => clauses.iter().all(|c| c.matches(metadata)),
		}
	}

	/// Render the `$eq` / `$and` wire shape for logs and diagnostics.
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			Self::Eq { key, value } => {
				let mut eq = serde_json::Map::new();
				eq.insert(
					"$eq".to_string(),
					serde_json::Value::String(value.clone()),
				);
				let mut outer = serde_json::Map::new();
				outer.insert(key.clone(), serde_json::Value::Object(eq));
				serde_json::Value::Object(outer)
			}
			Self::And(clauses) => {
				let rendered: Vec<serde_json::Value> =
					clauses.iter().map(|c| c.to_json()).collect();
				let mut outer = serde_json::Map::new();
				outer.insert("$and".to_string(), serde_json::Value::Array(rendered));
				serde_json::Value::Object(outer)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn meta(pairs: &[(&str, &str)]) -> HashMap<String, String> {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[test]
	fn zero_constraints_yield_no_filter() {
		assert_eq!(FilterExpr::from_constraints(vec![]), None);
	}

	#[test]
	fn single_constraint_is_bare_eq() {
		let f = FilterExpr::from_constraints(vec![("model_type".into(), "X300-Pro".into())]);
		assert_eq!(f, Some(FilterExpr::eq("model_type", "X300-Pro")));
	}

	#[test]
	fn multiple_constraints_wrap_in_and() {
		let f = FilterExpr::from_constraints(vec![
			("model_type".into(), "X300-Pro".into()),
			("sw_version".into(), "V2.3.1".into()),
		])
		.unwrap();
		match f {
			FilterExpr::And(clauses) => assert_eq!(clauses.len(), 2),
			other => panic!("expected And, got {:?}", other),
		}
	}

	#[test]
	fn eq_matches_exact_value_only() {
		let f = FilterExpr::eq("model_type", "X300-Pro");
		assert!(f.matches(&meta(&[("model_type", "X300-Pro")])));
		assert!(!f.matches(&meta(&[("model_type", "Y100")])));
		assert!(!f.matches(&meta(&[("sw_version", "X300-Pro")])));
	}

	#[test]
	fn and_requires_every_clause() {
		let f = FilterExpr::from_constraints(vec![
			("model_type".into(), "X300-Pro".into()),
			("sw_version".into(), "V2.3.1".into()),
		])
		.unwrap();
		assert!(f.matches(&meta(&[
			("model_type", "X300-Pro"),
			("sw_version", "V2.3.1"),
			("country", "USA"),
		])));
		assert!(!f.matches(&meta(&[
			("model_type", "X300-Pro"),
			("sw_version", "V1.0.0"),
		])));
		assert!(!f.matches(&meta(&[("model_type", "X300-Pro")])));
	}

	#[test]
	fn json_shape_single_clause_is_unwrapped() {
		let f = FilterExpr::eq("model_type", "X300-Pro");
		assert_eq!(
			f.to_json(),
			serde_json::json!({ "model_type": { "$eq": "X300-Pro" } })
		);
	}

	#[test]
	fn json_shape_conjunction_uses_and() {
		let f = FilterExpr::from_constraints(vec![
			("model_type".into(), "X300-Pro".into()),
			("sw_version".into(), "V2.3.1".into()),
		])
		.unwrap();
		assert_eq!(
			f.to_json(),
			serde_json::json!({ "$and": [
				{ "model_type": { "$eq": "X300-Pro" } },
				{ "sw_version": { "$eq": "V2.3.1" } },
			] })
		);
	}
}
