//! Frequency models and their generators.
//!
//! Data flows one way through this module:
//! corpus symbols → `FrequencyTable` → `DistributionTable` → `Sampler`.
//!
//! - Per-context transition counts (`State`, `FrequencyTable`)
//! - Normalized conditional distributions (`DistributionTable`)
//! - Lazy roulette-wheel generation (`Sampler`)
//! - Substring-keyed generalized n-gram model (`NGramModel`)
//! - The full family of approximations for a corpus (`ShannonModels`)
//! - Generation parameters (`GenerationInput`)

use std::fmt::Debug;

/// Builds every approximation model from a single corpus snapshot
/// and generates their synthetic texts.
pub mod builder;

/// Normalized per-context probability rows and roulette-wheel draws.
pub mod distribution;

/// Frequency counter: sliding-window transition counts per context.
pub mod frequency;

/// Generation parameters with validated setters.
pub mod generation_input;

/// Generalized character n-gram model keyed by literal substrings.
///
/// Supports arbitrary order and sentence-start seed search.
pub mod ngram_model;

/// Lazy, finite sequence generator over a distribution table.
pub mod sampler;

/// Raw transition counts for a single context.
mod state;

pub use state::State;

/// An atomic unit being modeled: a character or a word.
///
/// Symbols are totally ordered so that every table iterates in the same
/// (lexicographic) order, which keeps sampling reproducible under a fixed seed.
pub trait Symbol: Ord + Clone + Debug + Send + Sync {
	/// Renders a context (sequence of symbols) as display text.
	fn render(context: &[Self]) -> String;
}

impl Symbol for char {
	fn render(context: &[Self]) -> String {
		context.iter().collect()
	}
}

impl Symbol for String {
	fn render(context: &[Self]) -> String {
		context.join(" ")
	}
}
