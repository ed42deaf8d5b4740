use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::io;

/// Reads a whole UTF-8 text file into memory.
///
/// Line endings are kept as-is: every character, newlines included,
/// is a symbol of the corpus.
pub(crate) fn read_corpus<P: AsRef<Path>>(filename: P) -> io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents)
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/text.txt"` → `"text"`
/// - `"text.txt"` → `"text"`
pub(crate) fn get_filename<P: AsRef<Path>>(path: P) -> io::Result<String> {
	path.as_ref()
		.file_stem()
		.and_then(|s| s.to_str())
		.map(|s| s.to_owned())
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Invalid filename"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_get_filename() {
		assert_eq!(get_filename("./data/text.txt").unwrap(), "text");
		assert_eq!(get_filename("text.txt").unwrap(), "text");
		assert!(get_filename("/").is_err());
	}

	#[test]
	fn test_read_missing_file() {
		let err = read_corpus("./definitely/not/here.txt").unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::NotFound);
	}
}
