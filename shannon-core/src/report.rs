use serde::Serialize;

use crate::error::{ModelError, Result};
use crate::model::Symbol;
use crate::model::distribution::DistributionTable;
use crate::model::frequency::FrequencyTable;

/// Count and probability of a single symbol.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SymbolStat {
	pub symbol: String,
	pub count: usize,
	pub probability: f64,
}

/// Context-free probability report (letters or words).
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ProbabilityReport {
	pub total: usize,
	pub entries: Vec<SymbolStat>,
}

impl ProbabilityReport {
	/// Builds the report from an order-0 frequency table.
	///
	/// # Errors
	/// - `InvalidParameter` if the table is not context-free
	/// - `DivisionByZero` if the table holds no occurrence
	pub fn from_counts<S: Symbol>(table: &FrequencyTable<S>) -> Result<Self> {
		if table.order() != 0 {
			return Err(ModelError::InvalidParameter(format!(
				"probability report needs an order-0 table, got order {}",
				table.order()
			)));
		}
		let total = table.total();
		if total == 0 {
			return Err(ModelError::DivisionByZero { context: String::new() });
		}

		let entries = table
			.iter()
			.flat_map(|(_, state)| state.transitions())
			.map(|(symbol, count)| SymbolStat {
				symbol: S::render(std::slice::from_ref(symbol)),
				count,
				probability: count as f64 / total as f64,
			})
			.collect();
		Ok(Self { total, entries })
	}
}

/// Conditional probabilities of one context.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ContextReport {
	pub context: String,
	pub transitions: Vec<(String, f64)>,
}

/// Context → symbol → probability listing of a distribution table.
///
/// Zero-probability entries of alphabet-seeded rows are left out.
pub fn transition_report<S: Symbol>(table: &DistributionTable<S>) -> Vec<ContextReport> {
	table
		.iter()
		.map(|(context, row)| ContextReport {
			context: S::render(context),
			transitions: row
				.iter()
				.filter(|(_, probability)| *probability > 0.0)
				.map(|(symbol, probability)| (S::render(std::slice::from_ref(symbol)), probability))
				.collect(),
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::frequency::Seeding;

	#[test]
	fn test_word_report() {
		let words: Vec<String> = "the cat the dog the cat".split(' ').map(str::to_owned).collect();
		let table = FrequencyTable::count(&words, 0, Seeding::Sparse).unwrap();
		let report = ProbabilityReport::from_counts(&table).unwrap();
		assert_eq!(report.total, 6);
		let the = report.entries.iter().find(|e| e.symbol == "the").unwrap();
		assert_eq!(the.count, 3);
		assert!((the.probability - 0.5).abs() < 1e-12);
	}

	#[test]
	fn test_report_requires_order_zero() {
		let chars: Vec<char> = "abc".chars().collect();
		let table = FrequencyTable::count(&chars, 1, Seeding::Sparse).unwrap();
		assert!(matches!(
			ProbabilityReport::from_counts(&table),
			Err(ModelError::InvalidParameter(_))
		));
	}

	#[test]
	fn test_transition_report_skips_zero_entries() {
		let chars: Vec<char> = "abab".chars().collect();
		let table = FrequencyTable::count(&chars, 1, Seeding::Dense(&['a', 'b', 'c'])).unwrap();
		let table = DistributionTable::from_frequencies(table).unwrap();
		let report = transition_report(&table);
		assert_eq!(report.len(), 2);
		assert_eq!(report[0].context, "a");
		assert_eq!(report[0].transitions, vec![("b".to_owned(), 1.0)]);
	}
}
