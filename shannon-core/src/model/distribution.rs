use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};
use rand::Rng;

use crate::error::{ModelError, Result};
use super::frequency::FrequencyTable;
use super::sampler::Sampler;
use super::Symbol;

/// Conditional probability distribution of a single context.
///
/// Entries are kept in symbol order. Zero-probability entries from
/// alphabet-seeded rows are preserved but can never be drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct Row<S> {
	entries: Vec<(S, f64)>,
}

impl<S: Symbol> Row<S> {
	/// Probability of `symbol` (zero when absent).
	pub fn probability(&self, symbol: &S) -> f64 {
		self.entries
			.iter()
			.find(|(s, _)| s == symbol)
			.map_or(0.0, |(_, p)| *p)
	}

	/// Entries in symbol order.
	pub fn iter(&self) -> impl Iterator<Item = (&S, f64)> {
		self.entries.iter().map(|(s, p)| (s, *p))
	}

	/// Symbols with a strictly positive probability.
	pub fn support(&self) -> impl Iterator<Item = &S> {
		self.entries.iter().filter(|(_, p)| *p > 0.0).map(|(s, _)| s)
	}

	pub fn sum(&self) -> f64 {
		self.entries.iter().map(|(_, p)| p).sum()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Selects a symbol by inverse-CDF (roulette-wheel) lookup.
	///
	/// `p` is a uniform draw in `[0, 1)`. Entries are walked in symbol order
	/// accumulating probabilities; the first symbol whose cumulative sum
	/// exceeds `p` is returned.
	///
	/// When rounding leaves the row summing to slightly less than `p`, the
	/// last symbol with a positive probability is returned instead.
	/// Returns `None` only if no entry has a positive probability.
	pub fn draw(&self, p: f64) -> Option<&S> {
		let mut cumulative = 0.0;
		let mut fallback: Option<&S> = None;
		for (symbol, probability) in &self.entries {
			if *probability <= 0.0 {
				continue;
			}
			cumulative += probability;
			if p < cumulative {
				return Some(symbol);
			}
			fallback = Some(symbol);
		}

		if let Some(symbol) = fallback {
			warn!("draw {} beyond cumulative mass {}, falling back to {:?}", p, cumulative, symbol);
		}
		fallback
	}
}

/// Normalized conditional distributions keyed by context.
///
/// Same shape as the `FrequencyTable` it was built from: each row's
/// counts divided by the row total.
///
/// # Invariants
/// - Every row sums to 1.0 (within floating-point tolerance)
/// - Never mutated once built
#[derive(Clone, Debug, PartialEq)]
pub struct DistributionTable<S> {
	order: usize,
	rows: BTreeMap<Vec<S>, Row<S>>,
}

impl<S: Symbol> DistributionTable<S> {
	/// Normalizes every row of `table`.
	///
	/// # Errors
	/// Returns `DivisionByZero` for the first row whose total count is zero.
	/// Callers holding alphabet-seeded rows that were never observed should
	/// call [`FrequencyTable::prune_empty`] first.
	pub fn from_frequencies(table: FrequencyTable<S>) -> Result<Self> {
		let mut rows = BTreeMap::new();
		for (context, state) in table.iter() {
			let total = state.total();
			if total == 0 {
				return Err(ModelError::DivisionByZero { context: S::render(context) });
			}
			let entries = state
				.transitions()
				.map(|(symbol, count)| (symbol.clone(), count as f64 / total as f64))
				.collect();
			rows.insert(context.to_vec(), Row { entries });
		}

		debug!("order {}: normalized {} rows", table.order(), rows.len());
		Ok(Self { order: table.order(), rows })
	}

	/// Builds the context-free distribution giving every symbol the same probability.
	///
	/// Duplicate symbols are counted once.
	///
	/// # Errors
	/// Returns `EmptyCorpus` if `symbols` is empty.
	pub fn uniform(symbols: &[S]) -> Result<Self> {
		let distinct: BTreeSet<&S> = symbols.iter().collect();
		if distinct.is_empty() {
			return Err(ModelError::EmptyCorpus { order: 0 });
		}

		let probability = 1.0 / distinct.len() as f64;
		let entries = distinct.into_iter().map(|s| (s.clone(), probability)).collect();
		let mut rows = BTreeMap::new();
		rows.insert(Vec::new(), Row { entries });
		Ok(Self { order: 0, rows })
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub fn row(&self, context: &[S]) -> Option<&Row<S>> {
		self.rows.get(context)
	}

	/// Rows in context order.
	pub fn iter(&self) -> impl Iterator<Item = (&[S], &Row<S>)> {
		self.rows.iter().map(|(context, row)| (context.as_slice(), row))
	}

	/// Known contexts in lexicographic order.
	pub fn contexts(&self) -> impl Iterator<Item = &[S]> {
		self.rows.keys().map(Vec::as_slice)
	}

	/// Symbols drawable from the context-free row (order 0 only).
	pub fn support(&self) -> Vec<S> {
		let unconditional: &[S] = &[];
		self.rows
			.get(unconditional)
			.map(|row| row.support().cloned().collect())
			.unwrap_or_default()
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// Draws one symbol following `context`.
	///
	/// # Errors
	/// Returns `ContextNotFound` if the context has no row.
	pub fn sample<R: Rng>(&self, context: &[S], rng: &mut R) -> Result<S> {
		let not_found = || ModelError::ContextNotFound { context: S::render(context) };
		let row = self.row(context).ok_or_else(not_found)?;
		row.draw(rng.random::<f64>()).cloned().ok_or_else(not_found)
	}

	/// Returns a sampler producing up to `length` symbols after `seed`.
	pub fn sampler<R: Rng>(&self, seed: &[S], length: usize, rng: R) -> Sampler<'_, S, R> {
		Sampler::new(self, seed, length, rng)
	}
}
