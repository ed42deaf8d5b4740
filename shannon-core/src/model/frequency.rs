use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::mpsc;
use std::thread;

use log::{debug, trace};

use crate::error::{ModelError, Result};
use super::state::State;
use super::Symbol;

/// Number of windows under which counting always stays on the calling thread.
const PARALLEL_THRESHOLD: usize = 1 << 16;

/// How rows are created when a context is first observed.
#[derive(Debug)]
pub enum Seeding<'a, S> {
	/// Rows only hold symbols actually observed after the context.
	Sparse,
	/// Rows are pre-filled with every symbol of the alphabet at count zero.
	Dense(&'a [S]),
}

impl<S: Symbol> Seeding<'_, S> {
	fn new_state(&self) -> State<S> {
		match self {
			Seeding::Sparse => State::new(),
			Seeding::Dense(alphabet) => State::seeded(alphabet),
		}
	}
}

/// Raw occurrence counts keyed by context.
///
/// Every context is a sequence of exactly `order` symbols, so all orders
/// share the same flat two-level shape: context → (symbol → count).
/// Order 0 has a single row under the empty context.
///
/// # Invariants
/// - Every key has length `order`
/// - Rows only exist for contexts observed in the corpus (unless inserted explicitly)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrequencyTable<S> {
	order: usize,
	states: BTreeMap<Vec<S>, State<S>>,
}

impl<S: Symbol> FrequencyTable<S> {
	/// Creates a table of the given order with no rows.
	pub fn empty(order: usize) -> Self {
		Self { order, states: BTreeMap::new() }
	}

	/// Counts every window of length `order + 1` in `symbols`.
	///
	/// The first `order` symbols of each window form the context key,
	/// the last one is the counted outcome.
	///
	/// # Errors
	/// - `EmptyCorpus` if `symbols` is empty and `order >= 1`
	/// - `InvalidOrder` if `order >= symbols.len()` otherwise
	pub fn count(symbols: &[S], order: usize, seeding: Seeding<S>) -> Result<Self> {
		Self::check_window(symbols, order)?;
		let table = Self::count_windows(symbols, order, &seeding, 0..symbols.len() - order);
		debug!("order {}: {} contexts counted", order, table.len());
		Ok(table)
	}

	/// Same result as [`FrequencyTable::count`], with large inputs split
	/// into chunks counted on separate threads and merged.
	///
	/// Chunks are ranges of window start positions, so every window is
	/// counted exactly once even though neighbouring chunks read
	/// overlapping symbols.
	pub fn count_parallel(symbols: &[S], order: usize, seeding: Seeding<S>) -> Result<Self> {
		Self::check_window(symbols, order)?;
		let windows = symbols.len() - order;
		if windows < PARALLEL_THRESHOLD {
			return Self::count(symbols, order, seeding);
		}

		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = windows.div_ceil(chunks);

		let mut final_table = Self::empty(order);
		thread::scope(|scope| -> Result<()> {
			let (tx, rx) = mpsc::channel();
			for start in (0..windows).step_by(chunk_size) {
				let tx = tx.clone();
				let end = (start + chunk_size).min(windows);
				let seeding = &seeding;
				scope.spawn(move || {
					trace!("counting windows {}..{}", start, end);
					let partial = Self::count_windows(symbols, order, seeding, start..end);
					// The receiver outlives every sender inside this scope
					let _ = tx.send(partial);
				});
			}
			drop(tx);

			for partial in rx.iter() {
				final_table.merge(&partial)?;
			}
			Ok(())
		})?;

		debug!("order {}: {} contexts counted on {} threads", order, final_table.len(), chunks);
		Ok(final_table)
	}

	fn check_window(symbols: &[S], order: usize) -> Result<()> {
		if symbols.is_empty() && order >= 1 {
			return Err(ModelError::EmptyCorpus { order });
		}
		if order >= symbols.len() {
			return Err(ModelError::InvalidOrder { order, length: symbols.len() });
		}
		Ok(())
	}

	fn count_windows(symbols: &[S], order: usize, seeding: &Seeding<S>, starts: Range<usize>) -> Self {
		let mut table = Self::empty(order);
		for i in starts {
			let context = &symbols[i..i + order];
			let next = symbols[i + order].clone();

			// Get or create the state for this context
			if let Some(state) = table.states.get_mut(context) {
				state.add_transition(next);
			} else {
				let mut state = seeding.new_state();
				state.add_transition(next);
				table.states.insert(context.to_vec(), state);
			}
		}
		table
	}

	/// Merges another table of the same order into this one.
	///
	/// # Errors
	/// Returns `InvalidParameter` if the orders differ.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.order != other.order {
			return Err(ModelError::InvalidParameter(format!(
				"order mismatch: {} vs {}",
				self.order, other.order
			)));
		}

		for (context, state) in &other.states {
			if let Some(existing) = self.states.get_mut(context) {
				existing.merge(state);
			} else {
				self.states.insert(context.clone(), state.clone());
			}
		}
		Ok(())
	}

	/// Inserts (or replaces) the row for `context`.
	///
	/// # Errors
	/// Returns `InvalidOrder` if the context length differs from the table order.
	pub fn insert_state(&mut self, context: Vec<S>, state: State<S>) -> Result<()> {
		if context.len() != self.order {
			return Err(ModelError::InvalidOrder { order: self.order, length: context.len() });
		}
		self.states.insert(context, state);
		Ok(())
	}

	/// Drops every row whose total count is zero.
	pub fn prune_empty(&mut self) {
		self.states.retain(|_, state| state.total() > 0);
	}

	pub fn order(&self) -> usize {
		self.order
	}

	pub fn get(&self, context: &[S]) -> Option<&State<S>> {
		self.states.get(context)
	}

	/// Rows in context order.
	pub fn iter(&self) -> impl Iterator<Item = (&[S], &State<S>)> {
		self.states.iter().map(|(context, state)| (context.as_slice(), state))
	}

	/// Sum of every count in every row.
	pub fn total(&self) -> usize {
		self.states.values().map(State::total).sum()
	}

	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}
}
