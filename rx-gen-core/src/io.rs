use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Marks a comment line in pattern files.
const COMMENT_CHAR: char = '#';

/// Reads a pattern file and returns its patterns, in file order.
///
/// - One pattern per line (`\n` / `\r\n`)
/// - Blank lines and lines starting with `#` are skipped
/// - Trailing whitespace is removed; leading whitespace is kept as part of
///   the pattern
pub fn read_patterns<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(parse_patterns(&contents))
}

fn parse_patterns(contents: &str) -> Vec<String> {
	contents
		.lines()
		.map(str::trim_end)
		.filter(|line| !line.is_empty() && !line.starts_with(COMMENT_CHAR))
		.map(str::to_owned)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn comments_and_blank_lines_are_skipped() {
		let contents = "# ids\n[a-z]{2,5}\n\n   \n[a-c]+  \r\n#last\n x\n";
		assert_eq!(parse_patterns(contents), vec!["[a-z]{2,5}", "[a-c]+", " x"]);
	}

	#[test]
	fn missing_file_is_an_error() {
		assert!(read_patterns("./does/not/exist.txt").is_err());
	}
}
