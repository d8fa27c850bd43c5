/// Compute the magnitude (L2 norm) of an embedding.
pub fn magnitude(embedding: &[f32]) -> f64 {
	embedding
		.iter()
		.map(|&v| {
			let vf = v as f64;
			vf * vf
		})
		.sum::<f64>()
		.sqrt()
}

/// Cosine distance in [0, 1] using precomputed magnitudes.
///
/// Dimension mismatches and zero-magnitude vectors score as maximally
/// distant (1.0). Negative cosine similarity clamps to zero before the
/// inversion, keeping `1.0 - distance` a usable similarity.
pub fn cosine_distance(a: &[f32], b: &[f32], mag_a: f64, mag_b: f64) -> f64 {
	if a.len() != b.len() || a.is_empty() {
		return 1.0;
	}

	let denom = mag_a * mag_b;
	if denom == 0.0 {
		return 1.0;
	}

	let dot: f64 = a
		.iter()
		.zip(b.iter())
		.map(|(&x, &y)| (x as f64) * (y as f64))
		.sum();

	let similarity = dot / denom;
	if !similarity.is_finite() {
		return 1.0;
	}

	1.0 - similarity.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn identical_vectors_have_zero_distance() {
		let v = vec![1.0f32, 2.0, 3.0];
		let mag = magnitude(&v);
		let d = cosine_distance(&v, &v, mag, mag);
		assert!(d.abs() < 1e-10);
	}

	#[test]
	fn orthogonal_vectors_are_maximally_distant() {
		let a = vec![1.0f32, 0.0];
		let b = vec![0.0f32, 1.0];
		let d = cosine_distance(&a, &b, magnitude(&a), magnitude(&b));
		assert!((d - 1.0).abs() < 1e-10);
	}

	#[test]
	fn opposite_vectors_clamp_to_max_distance() {
		let a = vec![1.0f32, 0.0];
		let b = vec![-1.0f32, 0.0];
		let d = cosine_distance(&a, &b, magnitude(&a), magnitude(&b));
		assert_eq!(d, 1.0);
	}

	#[test]
	fn mismatched_lengths_are_maximally_distant() {
		assert_eq!(cosine_distance(&[1.0], &[1.0, 2.0], 1.0, 1.0), 1.0);
	}

	#[test]
	fn zero_magnitude_is_maximally_distant() {
		let a = vec![0.0f32, 0.0];
		let b = vec![1.0f32, 2.0];
		let d = cosine_distance(&a, &b, magnitude(&a), magnitude(&b));
		assert_eq!(d, 1.0);
	}

	#[test]
	fn magnitude_basic() {
		let v = vec![3.0f32, 4.0];
		assert!((magnitude(&v) - 5.0).abs() < 1e-10);
	}

	#[test]
	fn magnitude_empty() {
		assert_eq!(magnitude(&[]), 0.0);
	}

	#[test]
	fn distance_stays_in_unit_interval() {
		let a = vec![0.3f32, -0.7, 0.2];
		let b = vec![-0.1f32, 0.9, 0.4];
		let d = cosine_distance(&a, &b, magnitude(&a), magnitude(&b));
		assert!((0.0..=1.0).contains(&d));
	}
}
