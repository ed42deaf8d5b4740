use std::collections::VecDeque;

use rand::Rng;

use crate::error::{ModelError, Result};
use super::distribution::DistributionTable;
use super::Symbol;

/// Lazy generator walking a sliding context window over a distribution table.
///
/// Each step draws a uniform value, selects the next symbol from the row
/// matching the current window, then slides the window: the oldest symbol
/// is dropped and the new one appended (order 0 keeps an empty window).
///
/// The sequence is finite (at most `length` symbols) and cannot be
/// restarted. It ends early, after yielding a single `ContextNotFound`,
/// when the window reaches a context absent from the table.
///
/// # Seed policy
/// - Seeds longer than the order contribute only their trailing symbols
/// - Seeds shorter than the order never match a row (`ContextNotFound`)
/// - The seed itself is not part of the produced sequence
pub struct Sampler<'a, S, R> {
	table: &'a DistributionTable<S>,
	window: VecDeque<S>,
	remaining: usize,
	rng: R,
	finished: bool,
}

impl<'a, S: Symbol, R: Rng> Sampler<'a, S, R> {
	pub fn new(table: &'a DistributionTable<S>, seed: &[S], length: usize, rng: R) -> Self {
		let skip = seed.len().saturating_sub(table.order());
		Self {
			table,
			window: seed[skip..].iter().cloned().collect(),
			remaining: length,
			rng,
			finished: false,
		}
	}

	fn step(&mut self) -> Result<S> {
		let context = self.window.make_contiguous();
		let row = self
			.table
			.row(context)
			.ok_or_else(|| ModelError::ContextNotFound { context: S::render(context) })?;

		let p: f64 = self.rng.random();
		let next = row
			.draw(p)
			.cloned()
			.ok_or_else(|| ModelError::ContextNotFound { context: S::render(context) })?;

		if self.table.order() > 0 {
			self.window.pop_front();
			self.window.push_back(next.clone());
		}
		Ok(next)
	}
}

impl<S: Symbol, R: Rng> Iterator for Sampler<'_, S, R> {
	type Item = Result<S>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.finished || self.remaining == 0 {
			return None;
		}

		let result = self.step();
		match result {
			Ok(_) => self.remaining -= 1,
			Err(_) => self.finished = true,
		}
		Some(result)
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		if self.finished {
			(0, Some(0))
		} else {
			(0, Some(self.remaining))
		}
	}
}
