use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{ModelError, Result};

/// Input parameters for generating every approximation of a corpus.
///
/// # Responsibilities
/// - Track output sizes for character, n-gram and word approximations
/// - Track the generalized n-gram order and its sentence-start marker
/// - Own the random seed, so a run can be replayed exactly
///
/// # Invariants
/// - `ngram_order` is always >= 1
/// - `start_marker` is never empty
#[derive(Clone, Debug)]
pub struct GenerationInput {
	/// Number of characters in each fixed-order character approximation.
	pub char_length: usize,

	/// Character budget of the n-gram approximation.
	pub ngram_length: usize,

	/// Character budget of each word approximation (words plus separators).
	pub word_budget: usize,

	/// Seed of the random source; `None` draws a fresh seed per run.
	pub seed: Option<u64>,

	/// Order `n` of the generalized n-gram model.
	ngram_order: usize,

	/// Context prefix marking a sentence boundary.
	start_marker: String,
}

impl Default for GenerationInput {
	fn default() -> Self {
		Self {
			char_length: 100,
			ngram_length: 500,
			word_budget: 100,
			seed: None,
			ngram_order: 7,
			start_marker: ". ".to_owned(),
		}
	}
}

impl GenerationInput {
	pub fn ngram_order(&self) -> usize {
		self.ngram_order
	}

	/// Sets the generalized n-gram order.
	///
	/// # Errors
	/// Returns `InvalidParameter` if `n == 0`.
	pub fn set_ngram_order(&mut self, n: usize) -> Result<()> {
		if n == 0 {
			return Err(ModelError::InvalidParameter("n-gram order must be at least 1".to_owned()));
		}
		self.ngram_order = n;
		Ok(())
	}

	pub fn start_marker(&self) -> &str {
		&self.start_marker
	}

	/// Sets the sentence-start marker used to seed the n-gram model.
	///
	/// # Errors
	/// Returns `InvalidParameter` if the marker is empty.
	pub fn set_start_marker(&mut self, marker: &str) -> Result<()> {
		if marker.is_empty() {
			return Err(ModelError::InvalidParameter("start marker cannot be empty".to_owned()));
		}
		self.start_marker = marker.to_owned();
		Ok(())
	}

	/// Creates the random source for a run.
	///
	/// Seeded deterministically when `seed` is set, from the thread-local
	/// generator otherwise.
	pub fn rng(&self) -> ChaCha8Rng {
		match self.seed {
			Some(seed) => ChaCha8Rng::seed_from_u64(seed),
			None => ChaCha8Rng::from_rng(&mut rand::rng()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::Rng;

	#[test]
	fn test_defaults() {
		let input = GenerationInput::default();
		assert_eq!(input.ngram_order(), 7);
		assert_eq!(input.start_marker(), ". ");
		assert_eq!(input.char_length, 100);
		assert_eq!(input.ngram_length, 500);
	}

	#[test]
	fn test_invalid_values_rejected() {
		let mut input = GenerationInput::default();
		assert!(matches!(input.set_ngram_order(0), Err(ModelError::InvalidParameter(_))));
		assert_eq!(input.ngram_order(), 7);
		assert!(input.set_start_marker("").is_err());
		input.set_ngram_order(3).unwrap();
		input.set_start_marker("\n").unwrap();
		assert_eq!(input.ngram_order(), 3);
		assert_eq!(input.start_marker(), "\n");
	}

	#[test]
	fn test_seeded_rng_is_reproducible() {
		let input = GenerationInput { seed: Some(42), ..Default::default() };
		let a: u64 = input.rng().random();
		let b: u64 = input.rng().random();
		assert_eq!(a, b);
	}
}
