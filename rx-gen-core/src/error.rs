//! Errors raised while building automata and generating strings.

use thiserror::Error;

/// Every failure the generator can report.
///
/// None of these are transient: they reflect a programming or configuration
/// error, so callers are expected to propagate them rather than retry.
#[derive(Debug, Error)]
pub enum GenError {
	/// A required argument is missing or inconsistent (absent pattern,
	/// absent randomness source, `min > max`, ...).
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),

	/// The walk reached a non-accepting state without outgoing transitions.
	///
	/// This means the automaton is malformed (or its language is empty).
	#[error("Automaton consistency error: state {state} is a dead end")]
	Consistency { state: usize },

	/// The pattern could not be parsed or compiled into an automaton.
	#[error("Pattern error: {0}")]
	Pattern(String),

	/// Reading a pattern file failed.
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl From<regex_syntax::Error> for GenError {
	fn from(error: regex_syntax::Error) -> Self {
		GenError::Pattern(error.to_string())
	}
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GenError>;
