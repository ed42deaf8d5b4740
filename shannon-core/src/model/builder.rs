use log::{debug, warn};
use rand::Rng;
use rand::prelude::IteratorRandom;

use crate::corpus::Corpus;
use crate::error::{ModelError, Result};
use super::distribution::DistributionTable;
use super::frequency::{FrequencyTable, Seeding};
use super::generation_input::GenerationInput;
use super::ngram_model::NGramModel;
use super::Symbol;

/// One step of Shannon's series of approximations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Approximation {
	/// Every character equally likely.
	UniformLetters,
	/// Characters drawn independently with their corpus frequency.
	Letters,
	/// Character conditioned on the previous one.
	Digram,
	/// Character conditioned on the previous two.
	Trigram,
	/// Character conditioned on the previous three.
	Tetragram,
	/// Character conditioned on the previous `n-1`.
	NGram,
	/// Every word equally likely.
	UniformWords,
	/// Words drawn independently with their corpus frequency.
	Words,
	/// Word conditioned on the previous one.
	WordTransitions,
}

impl Approximation {
	/// Every approximation, in generation order.
	pub const ALL: [Approximation; 9] = [
		Approximation::UniformLetters,
		Approximation::Letters,
		Approximation::Digram,
		Approximation::Trigram,
		Approximation::Tetragram,
		Approximation::NGram,
		Approximation::UniformWords,
		Approximation::Words,
		Approximation::WordTransitions,
	];

	pub fn title(&self) -> &'static str {
		match self {
			Approximation::UniformLetters | Approximation::UniformWords => "0th-order",
			Approximation::Letters | Approximation::Words => "1st-order",
			Approximation::Digram => "digram",
			Approximation::Trigram => "trigram",
			Approximation::Tetragram => "tetragram",
			Approximation::NGram => "ngram",
			Approximation::WordTransitions => "2nd-order",
		}
	}

	pub fn is_word(&self) -> bool {
		matches!(
			self,
			Approximation::UniformWords | Approximation::Words | Approximation::WordTransitions
		)
	}
}

/// Every model of a corpus, built from a single snapshot.
///
/// Each model is built independently: a model that cannot be built (for
/// instance a tetragram over a three-character corpus) keeps its error
/// while the others stay usable.
///
/// # Invariants
/// - The alphabet seeding every fixed-order row is the support of the
///   context-free letter model
/// - No table is mutated after construction
#[derive(Debug)]
pub struct ShannonModels {
	alphabet: Vec<char>,
	vocabulary: Vec<String>,
	letter_count: usize,
	word_count: usize,
	letter_counts: Result<FrequencyTable<char>>,
	word_counts: Result<FrequencyTable<String>>,
	uniform_letters: Result<DistributionTable<char>>,
	letters: Result<DistributionTable<char>>,
	digram: Result<DistributionTable<char>>,
	trigram: Result<DistributionTable<char>>,
	tetragram: Result<DistributionTable<char>>,
	ngram: Result<NGramModel>,
	uniform_words: Result<DistributionTable<String>>,
	words: Result<DistributionTable<String>>,
	word_transitions: Result<DistributionTable<String>>,
}

impl ShannonModels {
	/// Builds every model of `corpus`, with a generalized n-gram of order `ngram_order`.
	pub fn build(corpus: &Corpus, ngram_order: usize) -> Self {
		let chars = corpus.chars();
		let alphabet = corpus.alphabet();
		let words = corpus.words();
		let vocabulary = corpus.vocabulary();

		let letter_counts = FrequencyTable::count_parallel(&chars, 0, Seeding::Sparse);
		let letters = letter_counts.clone().and_then(DistributionTable::from_frequencies);
		let word_counts = FrequencyTable::count_parallel(&words, 0, Seeding::Sparse);
		let word_model = word_counts.clone().and_then(DistributionTable::from_frequencies);

		let models = Self {
			letter_count: chars.len(),
			word_count: words.len(),
			uniform_letters: DistributionTable::uniform(&alphabet),
			letters,
			digram: Self::fixed_order(&chars, 1, &alphabet),
			trigram: Self::fixed_order(&chars, 2, &alphabet),
			tetragram: Self::fixed_order(&chars, 3, &alphabet),
			ngram: NGramModel::new(&chars, ngram_order),
			uniform_words: DistributionTable::uniform(&vocabulary),
			words: word_model,
			word_transitions: FrequencyTable::count_parallel(&words, 1, Seeding::Sparse)
				.and_then(DistributionTable::from_frequencies),
			letter_counts,
			word_counts,
			alphabet,
			vocabulary,
		};

		debug!(
			"built models: {} letters, {} symbols, {} words, {} distinct words",
			models.letter_count,
			models.alphabet.len(),
			models.word_count,
			models.vocabulary.len()
		);
		models
	}

	/// Counts and normalizes a character model whose rows hold the full alphabet.
	fn fixed_order(chars: &[char], order: usize, alphabet: &[char]) -> Result<DistributionTable<char>> {
		let counts = FrequencyTable::count_parallel(chars, order, Seeding::Dense(alphabet))?;
		DistributionTable::from_frequencies(counts)
	}

	pub fn alphabet(&self) -> &[char] {
		&self.alphabet
	}

	pub fn vocabulary(&self) -> &[String] {
		&self.vocabulary
	}

	pub fn letter_count(&self) -> usize {
		self.letter_count
	}

	pub fn word_count(&self) -> usize {
		self.word_count
	}

	pub fn letter_counts(&self) -> std::result::Result<&FrequencyTable<char>, &ModelError> {
		self.letter_counts.as_ref()
	}

	pub fn word_counts(&self) -> std::result::Result<&FrequencyTable<String>, &ModelError> {
		self.word_counts.as_ref()
	}

	/// Character model for `approximation`, `None` for word and n-gram approximations.
	pub fn character_model(
		&self,
		approximation: Approximation,
	) -> Option<std::result::Result<&DistributionTable<char>, &ModelError>> {
		let model = match approximation {
			Approximation::UniformLetters => &self.uniform_letters,
			Approximation::Letters => &self.letters,
			Approximation::Digram => &self.digram,
			Approximation::Trigram => &self.trigram,
			Approximation::Tetragram => &self.tetragram,
			_ => return None,
		};
		Some(model.as_ref())
	}

	/// Word model for `approximation`, `None` for character approximations.
	pub fn word_model(
		&self,
		approximation: Approximation,
	) -> Option<std::result::Result<&DistributionTable<String>, &ModelError>> {
		let model = match approximation {
			Approximation::UniformWords => &self.uniform_words,
			Approximation::Words => &self.words,
			Approximation::WordTransitions => &self.word_transitions,
			_ => return None,
		};
		Some(model.as_ref())
	}

	pub fn ngram(&self) -> std::result::Result<&NGramModel, &ModelError> {
		self.ngram.as_ref()
	}

	/// Generates the text of every approximation, in [`Approximation::ALL`] order.
	///
	/// Fixed-order character approximations are chained: each starts from
	/// the tail of the previous approximation's output, or from a random
	/// known context when that tail was never observed. The word transition
	/// approximation starts from the last word of the frequency-weighted one.
	/// A failure only affects the approximation it occurred in.
	pub fn generate<R: Rng>(&self, input: &GenerationInput, rng: &mut R) -> Vec<(Approximation, Result<String>)> {
		let mut outputs = Vec::with_capacity(Approximation::ALL.len());

		let mut previous: Vec<char> = Vec::new();
		for approximation in [
			Approximation::UniformLetters,
			Approximation::Letters,
			Approximation::Digram,
			Approximation::Trigram,
			Approximation::Tetragram,
		] {
			let result = self.letters_text(approximation, &previous, input.char_length, rng);
			previous = match &result {
				Ok(text) => text.chars().collect(),
				Err(_) => Vec::new(),
			};
			outputs.push((approximation, result));
		}

		let ngram = self
			.ngram
			.as_ref()
			.map_err(Clone::clone)
			.and_then(|model| {
				let start = match model.find_start(input.start_marker(), rng) {
					Ok(start) => start,
					Err(e) => {
						warn!("{}, starting the n-gram from a random context", e);
						model.random_context(rng).ok_or(e)?
					}
				};
				model.generate(&start, input.ngram_length, rng)
			});
		outputs.push((Approximation::NGram, ngram));

		let mut previous: Vec<String> = Vec::new();
		for approximation in [
			Approximation::UniformWords,
			Approximation::Words,
			Approximation::WordTransitions,
		] {
			let result = self.words_text(approximation, &previous, input.word_budget, rng);
			previous = match &result {
				Ok(words) => words.clone(),
				Err(_) => Vec::new(),
			};
			outputs.push((approximation, result.map(|words| words.join(" "))));
		}

		outputs
	}

	/// Generates `length` characters (starting context included).
	///
	/// A starting context longer than `length` is cut to its first `length`
	/// characters.
	fn letters_text<R: Rng>(
		&self,
		approximation: Approximation,
		previous: &[char],
		length: usize,
		rng: &mut R,
	) -> Result<String> {
		let table = match self.character_model(approximation) {
			Some(model) => model.map_err(Clone::clone)?,
			None => return Err(ModelError::InvalidParameter(format!("{:?} is not a character model", approximation))),
		};

		let seed = Self::starting_context(table, previous, rng)?;
		if seed.len() >= length {
			return Ok(seed[..length].iter().collect());
		}
		let mut text: String = seed.iter().collect();
		for next in table.sampler(&seed, length - seed.len(), &mut *rng) {
			text.push(next?);
		}
		Ok(text)
	}

	/// Generates words until their text, one separating space per word
	/// included, reaches `budget` characters.
	fn words_text<R: Rng>(
		&self,
		approximation: Approximation,
		previous: &[String],
		budget: usize,
		rng: &mut R,
	) -> Result<Vec<String>> {
		let table = match self.word_model(approximation) {
			Some(model) => model.map_err(Clone::clone)?,
			None => return Err(ModelError::InvalidParameter(format!("{:?} is not a word model", approximation))),
		};

		let seed = Self::starting_context(table, previous, rng)?;
		let mut used: usize = seed.iter().map(|word| word.chars().count() + 1).sum();
		let mut words = seed.clone();
		let mut sampler = table.sampler(&seed, usize::MAX, &mut *rng);
		while used < budget {
			let word = match sampler.next() {
				Some(next) => next?,
				None => break,
			};
			used += word.chars().count() + 1;
			words.push(word);
		}
		Ok(words)
	}

	/// Picks the context a chained approximation starts from.
	///
	/// The trailing `order` symbols of `previous` are used when they form a
	/// known context; otherwise a random known context is drawn.
	fn starting_context<S: Symbol, R: Rng>(
		table: &DistributionTable<S>,
		previous: &[S],
		rng: &mut R,
	) -> Result<Vec<S>> {
		let order = table.order();
		if previous.len() >= order {
			let tail = &previous[previous.len() - order..];
			if table.row(tail).is_some() {
				return Ok(tail.to_vec());
			}
			warn!("order {}: context {:?} unknown, reseeding", order, S::render(tail));
		}

		table
			.contexts()
			.choose(rng)
			.map(<[S]>::to_vec)
			.ok_or_else(|| ModelError::ContextNotFound { context: String::new() })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand_chacha::ChaCha8Rng;

	const TEXT: &str = "It was the best of times, it was the worst of times. \
		It was the age of wisdom, it was the age of foolishness. \
		It was the epoch of belief, it was the epoch of incredulity. It was the best";

	fn input() -> GenerationInput {
		let mut input = GenerationInput::default();
		input.seed = Some(17);
		input.ngram_length = 80;
		input.set_ngram_order(4).unwrap();
		input
	}

	#[test]
	fn test_every_model_built() {
		let models = ShannonModels::build(&Corpus::new(TEXT), 4);
		for approximation in Approximation::ALL {
			if approximation == Approximation::NGram {
				assert!(models.ngram().is_ok());
			} else if approximation.is_word() {
				assert!(models.word_model(approximation).unwrap().is_ok());
			} else {
				assert!(models.character_model(approximation).unwrap().is_ok());
			}
		}
		assert_eq!(models.word_count(), 40);
	}

	#[test]
	fn test_fixed_rows_hold_alphabet() {
		let models = ShannonModels::build(&Corpus::new(TEXT), 4);
		let alphabet = models.alphabet().len();
		let trigram = models.character_model(Approximation::Trigram).unwrap().unwrap();
		assert!(trigram.iter().all(|(_, row)| row.len() == alphabet));
		let letters = models.character_model(Approximation::Letters).unwrap().unwrap();
		assert_eq!(letters.support(), models.alphabet());
	}

	#[test]
	fn test_generate_every_approximation() {
		let models = ShannonModels::build(&Corpus::new(TEXT), 4);
		let input = input();
		let mut rng = input.rng();
		let outputs = models.generate(&input, &mut rng);
		assert_eq!(outputs.len(), Approximation::ALL.len());

		for (approximation, result) in &outputs {
			let text = result.as_ref().unwrap();
			match approximation {
				Approximation::NGram => assert!(text.chars().count() <= input.ngram_length + 1),
				a if a.is_word() => {
					let words: Vec<&str> = text.split(' ').collect();
					assert!(words.iter().all(|w| models.vocabulary().contains(&w.to_string())));
				}
				_ => assert_eq!(text.chars().count(), input.char_length),
			}
		}
	}

	#[test]
	fn test_word_output_stops_at_budget() {
		let models = ShannonModels::build(&Corpus::new(TEXT), 4);
		for budget in [1, 30, 100] {
			let mut input = input();
			input.word_budget = budget;
			let outputs = models.generate(&input, &mut input.rng());
			for (approximation, result) in outputs.iter().filter(|(a, _)| a.is_word()) {
				let sizes: Vec<usize> = result.as_ref().unwrap().split(' ').map(|w| w.chars().count() + 1).collect();
				let used: usize = sizes.iter().sum();
				let last = sizes[sizes.len() - 1];
				assert!(used >= budget, "{:?}: {} < {}", approximation, used, budget);
				assert!(used - last < budget, "{:?}: overshoots {}", approximation, budget);
			}
		}
	}

	#[test]
	fn test_short_char_length_cuts_starting_context() {
		let models = ShannonModels::build(&Corpus::new(TEXT), 4);
		for length in [0, 1, 2] {
			let mut input = input();
			input.char_length = length;
			let outputs = models.generate(&input, &mut input.rng());
			for (approximation, result) in outputs.iter().take(5) {
				assert_eq!(result.as_ref().unwrap().chars().count(), length, "{:?}", approximation);
			}
		}
	}

	#[test]
	fn test_ngram_without_sentence_start() {
		let models = ShannonModels::build(&Corpus::new("the cat sat on the mat the cat sat on the mat the"), 3);
		let input = input();
		let outputs = models.generate(&input, &mut input.rng());
		let (approximation, ngram) = &outputs[5];
		assert_eq!(*approximation, Approximation::NGram);
		assert!(!ngram.as_ref().unwrap().is_empty());
	}

	#[test]
	fn test_generate_is_reproducible() {
		let models = ShannonModels::build(&Corpus::new(TEXT), 4);
		let input = input();
		let first: Vec<String> = models
			.generate(&input, &mut input.rng())
			.into_iter()
			.map(|(_, r)| r.unwrap())
			.collect();
		let second: Vec<String> = models
			.generate(&input, &mut input.rng())
			.into_iter()
			.map(|(_, r)| r.unwrap())
			.collect();
		assert_eq!(first, second);
	}

	#[test]
	fn test_failures_stay_local() {
		let models = ShannonModels::build(&Corpus::new("abc"), 7);
		assert!(models.character_model(Approximation::Digram).unwrap().is_ok());
		assert!(matches!(
			models.character_model(Approximation::Tetragram).unwrap(),
			Err(ModelError::InvalidOrder { order: 3, length: 3 })
		));
		assert!(models.ngram().is_err());

		let outputs = models.generate(&GenerationInput::default(), &mut ChaCha8Rng::seed_from_u64(1));
		let uniform = &outputs[0];
		assert_eq!(uniform.0, Approximation::UniformLetters);
		assert_eq!(uniform.1.as_ref().unwrap().chars().count(), 100);
		assert!(outputs.iter().any(|(a, r)| *a == Approximation::Tetragram && r.is_err()));
	}

	#[test]
	fn test_starting_context_prefers_previous_tail() {
		let chars: Vec<char> = "abcabd".chars().collect();
		let counts = FrequencyTable::count(&chars, 2, Seeding::Sparse).unwrap();
		let table = DistributionTable::from_frequencies(counts).unwrap();
		let mut rng = ChaCha8Rng::seed_from_u64(4);

		let seed = ShannonModels::starting_context(&table, &['x', 'b', 'c'], &mut rng).unwrap();
		assert_eq!(seed, vec!['b', 'c']);

		let seed = ShannonModels::starting_context(&table, &['z', 'z'], &mut rng).unwrap();
		assert!(table.row(&seed).is_some());
	}
}
