use std::collections::BTreeSet;
use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::io::{get_filename, read_corpus};

/// Immutable snapshot of the source text.
///
/// Every model built for a run is derived from the same `Corpus`, so the
/// alphabet used to seed the fixed-order rows always matches the support
/// of the context-free letter model.
///
/// # Segmentation
/// - Characters: every character (whitespace and punctuation included),
///   lowercased.
/// - Words: whitespace-delimited runs, lowercased.
#[derive(Clone, Debug)]
pub struct Corpus {
	name: Option<String>,
	text: String,
}

impl Corpus {
	/// Snapshots an in-memory text.
	pub fn new(text: impl Into<String>) -> Self {
		Self { name: None, text: text.into() }
	}

	/// Loads a corpus from a text file.
	///
	/// The corpus name is the file name without extension.
	pub fn from_file<P: AsRef<Path>>(filepath: P) -> Result<Self> {
		let text = read_corpus(&filepath)?;
		let name = get_filename(&filepath)?;
		debug!("loaded corpus '{}' ({} bytes)", name, text.len());
		Ok(Self { name: Some(name), text })
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn text(&self) -> &str {
		&self.text
	}

	/// Returns the lowercased character sequence.
	///
	/// Characters whose lowercase form spans several code points are
	/// expanded in place.
	pub fn chars(&self) -> Vec<char> {
		self.text.chars().flat_map(char::to_lowercase).collect()
	}

	/// Returns the lowercased word sequence.
	pub fn words(&self) -> Vec<String> {
		self.text.split_whitespace().map(str::to_lowercase).collect()
	}

	/// Distinct lowercase characters, sorted.
	pub fn alphabet(&self) -> Vec<char> {
		self.text
			.chars()
			.flat_map(char::to_lowercase)
			.collect::<BTreeSet<_>>()
			.into_iter()
			.collect()
	}

	/// Distinct lowercase words, sorted.
	pub fn vocabulary(&self) -> Vec<String> {
		self.words().into_iter().collect::<BTreeSet<_>>().into_iter().collect()
	}

	pub fn letter_count(&self) -> usize {
		self.text.chars().flat_map(char::to_lowercase).count()
	}

	pub fn word_count(&self) -> usize {
		self.text.split_whitespace().count()
	}

	pub fn is_empty(&self) -> bool {
		self.text.is_empty()
	}
}
