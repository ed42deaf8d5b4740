use std::collections::BTreeMap;

/// Transition counts observed after a single context.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their number of observations.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during counting
/// - Merge with another state for the same context (parallel counting)
///
/// ## Invariants
/// - Every transition observed in the corpus has a strictly positive count
/// - Zero counts only appear when the state was seeded with an alphabet
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State<S> {
	/// Outgoing transitions indexed by the next symbol.
	/// Example: { 'e' => 42, 'a' => 3 }
	transitions: BTreeMap<S, usize>,
}

impl<S: Ord + Clone> State<S> {
	/// Creates a new empty (sparse) state.
	pub fn new() -> Self {
		Self { transitions: BTreeMap::new() }
	}

	/// Creates a state holding every symbol of `alphabet` with a zero count.
	pub fn seeded(alphabet: &[S]) -> Self {
		Self {
			transitions: alphabet.iter().map(|symbol| (symbol.clone(), 0)).collect(),
		}
	}

	/// Records one occurrence of a transition toward `next`.
	pub fn add_transition(&mut self, next: S) {
		*self.transitions.entry(next).or_insert(0) += 1;
	}

	/// Sum of all occurrence counts.
	pub fn total(&self) -> usize {
		self.transitions.values().sum()
	}

	/// Occurrence count of `symbol` (zero when never observed).
	pub fn count(&self, symbol: &S) -> usize {
		self.transitions.get(symbol).copied().unwrap_or(0)
	}

	/// Transitions in symbol order.
	pub fn transitions(&self) -> impl Iterator<Item = (&S, usize)> {
		self.transitions.iter().map(|(symbol, count)| (symbol, *count))
	}

	pub fn len(&self) -> usize {
		self.transitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.transitions.is_empty()
	}

	/// Merges another state for the same context into this one.
	///
	/// Transition occurrence counts are summed.
	pub fn merge(&mut self, other: &Self) {
		for (next, occurrence) in &other.transitions {
			*self.transitions.entry(next.clone()).or_insert(0) += *occurrence;
		}
	}
}

impl<S: Ord + Clone> Default for State<S> {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_add_transition() {
		let mut state = State::new();
		state.add_transition('a');
		state.add_transition('b');
		state.add_transition('a');
		assert_eq!(state.count(&'a'), 2);
		assert_eq!(state.count(&'b'), 1);
		assert_eq!(state.count(&'z'), 0);
		assert_eq!(state.total(), 3);
	}

	#[test]
	fn test_seeded_keeps_full_alphabet() {
		let mut state = State::seeded(&['a', 'b', 'c']);
		assert_eq!(state.len(), 3);
		assert_eq!(state.total(), 0);
		state.add_transition('b');
		assert_eq!(state.len(), 3);
		assert_eq!(state.total(), 1);
	}

	#[test]
	fn test_merge_sums_counts() {
		let mut left = State::new();
		left.add_transition('x');
		let mut right = State::new();
		right.add_transition('x');
		right.add_transition('y');
		left.merge(&right);
		assert_eq!(left.count(&'x'), 2);
		assert_eq!(left.count(&'y'), 1);
	}

	#[test]
	fn test_transitions_are_ordered() {
		let mut state = State::new();
		for c in ['q', 'a', 'm'] {
			state.add_transition(c);
		}
		let order: Vec<char> = state.transitions().map(|(c, _)| *c).collect();
		assert_eq!(order, vec!['a', 'm', 'q']);
	}
}
