use log::{debug, warn};
use rand::Rng;
use rand::prelude::IteratorRandom;

use crate::error::{ModelError, Result};
use super::distribution::DistributionTable;
use super::frequency::{FrequencyTable, Seeding};

/// Character n-gram model of arbitrary order.
///
/// The context of each prediction is the literal trailing substring of
/// `n-1` characters. Rows are sparse: only contexts observed in the corpus
/// exist, and each holds only the characters observed after it.
///
/// # Responsibilities
/// - Build the model from a character sequence
/// - Locate a starting context (random, or at a sentence boundary)
/// - Generate text from a starting context up to a character budget
///
/// # Invariants
/// - `n` is always >= 1
/// - Each context is a lowercase substring of exactly `n-1` characters
#[derive(Clone, Debug)]
pub struct NGramModel {
	/// The order of the model (number of characters in the n-gram)
	n: usize,

	table: DistributionTable<char>,
}

impl NGramModel {
	/// Builds an n-gram model from a lowercased character sequence.
	///
	/// # Errors
	/// - `InvalidOrder` if `n == 0` or the corpus is not longer than `n-1`
	/// - `EmptyCorpus` if the corpus is empty and `n >= 2`
	pub fn new(chars: &[char], n: usize) -> Result<Self> {
		if n == 0 {
			return Err(ModelError::InvalidOrder { order: 0, length: chars.len() });
		}
		let counts = FrequencyTable::count_parallel(chars, n - 1, Seeding::Sparse)?;
		let table = DistributionTable::from_frequencies(counts)?;
		debug!("{}-gram model: {} contexts", n, table.len());
		Ok(Self { n, table })
	}

	pub fn n(&self) -> usize {
		self.n
	}

	pub fn table(&self) -> &DistributionTable<char> {
		&self.table
	}

	/// Returns a random known context.
	///
	/// Returns `None` if the model has no contexts.
	pub fn random_context<R: Rng>(&self, rng: &mut R) -> Option<String> {
		self.table.contexts().choose(rng).map(|context| context.iter().collect())
	}

	/// Finds a context suitable for starting a sentence.
	///
	/// A random context beginning with `marker` is chosen; the marker is
	/// stripped and the first known context (in lexicographic order)
	/// starting with the remainder is returned.
	///
	/// # Errors
	/// Returns `ContextNotFound` if no context starts with `marker`,
	/// or none starts with the remainder.
	pub fn find_start<R: Rng>(&self, marker: &str, rng: &mut R) -> Result<String> {
		let marker = Self::key(marker);
		let candidate = self
			.table
			.contexts()
			.filter(|context| context.starts_with(&marker))
			.choose(rng)
			.ok_or_else(|| ModelError::ContextNotFound { context: marker.iter().collect() })?;

		let remainder = &candidate[marker.len()..];
		self.table
			.contexts()
			.find(|context| context.starts_with(remainder))
			.map(|context| context.iter().collect())
			.ok_or_else(|| ModelError::ContextNotFound { context: remainder.iter().collect() })
	}

	/// Generates text starting with `start` until it exceeds `budget` characters.
	///
	/// The returned text includes `start`. Nothing is generated when
	/// `start` already exceeds the budget.
	///
	/// # Errors
	/// Returns `ContextNotFound` if the trailing window reaches an unknown context.
	pub fn generate<R: Rng>(&self, start: &str, budget: usize, rng: &mut R) -> Result<String> {
		let seed = Self::key(start);
		if seed.len() < self.n - 1 {
			warn!("start {:?} shorter than the {}-gram context", start, self.n);
		}
		let length = budget.saturating_add(1).saturating_sub(seed.len());

		let mut text: String = seed.iter().collect();
		for next in self.table.sampler(&seed, length, rng) {
			text.push(next?);
		}
		Ok(text)
	}

	/// Predicts the next character after `prefix`.
	///
	/// Only the last `n-1` characters of `prefix` are considered.
	///
	/// # Errors
	/// Returns `ContextNotFound` if that context is unknown, or if `prefix`
	/// is shorter than `n-1` characters.
	pub fn predict<R: Rng>(&self, prefix: &str, rng: &mut R) -> Result<char> {
		let key = Self::key(prefix);
		let skip = key.len().saturating_sub(self.n - 1);
		self.table.sample(&key[skip..], rng)
	}

	fn key(text: &str) -> Vec<char> {
		text.chars().flat_map(char::to_lowercase).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand_chacha::ChaCha8Rng;

	const TEXT: &str = "the cat sat. the dog ran. a cat ran. the end. ";

	fn chars(text: &str) -> Vec<char> {
		text.chars().collect()
	}

	fn known(model: &NGramModel, context: &str) -> bool {
		model.table().row(&NGramModel::key(context)).is_some()
	}

	#[test]
	fn test_zero_order_rejected() {
		assert!(matches!(NGramModel::new(&chars("abc"), 0), Err(ModelError::InvalidOrder { .. })));
	}

	#[test]
	fn test_contexts_have_n_minus_one_chars() {
		let model = NGramModel::new(&chars(TEXT), 4).unwrap();
		assert_eq!(model.n(), 4);
		assert!(model.table().contexts().all(|c| c.len() == 3));
		assert!(known(&model, "THE"));
		assert!(!known(&model, "xyz"));
	}

	#[test]
	fn test_find_start_after_sentence_boundary() {
		let model = NGramModel::new(&chars(TEXT), 5).unwrap();
		let mut rng = ChaCha8Rng::seed_from_u64(5);
		for _ in 0..20 {
			let start = model.find_start(". ", &mut rng).unwrap();
			assert_eq!(start.chars().count(), 4);
			assert!(known(&model, &start));
			assert!(start == "the " || start == "a ca", "unexpected start {:?}", start);
		}
	}

	#[test]
	fn test_find_start_without_marker() {
		let model = NGramModel::new(&chars("no boundary here"), 3).unwrap();
		let mut rng = ChaCha8Rng::seed_from_u64(5);
		assert!(matches!(
			model.find_start(". ", &mut rng),
			Err(ModelError::ContextNotFound { .. })
		));
	}

	#[test]
	fn test_generate_respects_budget() {
		let text = TEXT.repeat(3);
		let model = NGramModel::new(&chars(&text), 3).unwrap();
		let mut rng = ChaCha8Rng::seed_from_u64(9);
		let out = model.generate("th", 60, &mut rng).unwrap();
		assert!(out.starts_with("th"));
		assert_eq!(out.chars().count(), 61);
		assert_eq!(model.generate("three", 2, &mut rng).unwrap(), "three");
	}

	#[test]
	fn test_predict_uses_trailing_context() {
		let model = NGramModel::new(&chars("abcabc"), 3).unwrap();
		let mut rng = ChaCha8Rng::seed_from_u64(1);
		assert_eq!(model.predict("zzab", &mut rng).unwrap(), 'c');
		assert!(matches!(model.predict("zz", &mut rng), Err(ModelError::ContextNotFound { .. })));
	}

	#[test]
	fn test_predict_reports_dead_ends() {
		let model = NGramModel::new(&chars("abc"), 2).unwrap();
		let mut rng = ChaCha8Rng::seed_from_u64(1);
		assert!(matches!(model.predict("c", &mut rng), Err(ModelError::ContextNotFound { .. })));
		assert!(matches!(model.predict("", &mut rng), Err(ModelError::ContextNotFound { .. })));
	}

	#[test]
	fn test_generate_unbounded_budget() {
		let model = NGramModel::new(&chars("abc"), 2).unwrap();
		let mut rng = ChaCha8Rng::seed_from_u64(1);
		assert!(matches!(
			model.generate("a", usize::MAX, &mut rng),
			Err(ModelError::ContextNotFound { .. })
		));
	}

	#[test]
	fn test_random_context_is_known() {
		let model = NGramModel::new(&chars(TEXT), 3).unwrap();
		let mut rng = ChaCha8Rng::seed_from_u64(2);
		let context = model.random_context(&mut rng).unwrap();
		assert!(known(&model, &context));
	}
}
