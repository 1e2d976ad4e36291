use std::fmt;

use regex_syntax::ParserBuilder;
use regex_syntax::hir::Hir;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Parser flags selecting which syntax is enabled, plus the size budget
/// of automaton construction.
///
/// Every flag maps to the `regex-syntax` parser option of the same name.
/// Missing fields take their default value when deserialized.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct SyntaxOptions {
	/// `(?i)` for the whole pattern.
	pub case_insensitive: bool,

	/// `(?m)`: `^`/`$` also match around line feeds.
	pub multi_line: bool,

	/// `(?s)`: `.` also matches `\n`.
	pub dot_matches_new_line: bool,

	/// `(?U)`. Greediness has no effect on generation but is accepted.
	pub swap_greed: bool,

	/// `(?x)`: whitespace and `#` comments in the pattern are ignored.
	pub ignore_whitespace: bool,

	/// `(?u)`: Unicode-aware classes. When disabled, `.` and `\w` are ASCII.
	pub unicode: bool,

	/// Maximum number of states an automaton build may create.
	pub state_limit: usize,
}

impl Default for SyntaxOptions {
	fn default() -> Self {
		Self {
			case_insensitive: false,
			multi_line: false,
			dot_matches_new_line: false,
			swap_greed: false,
			ignore_whitespace: false,
			unicode: true,
			state_limit: 10_000,
		}
	}
}

impl SyntaxOptions {
	fn parser(&self) -> ParserBuilder {
		let mut builder = ParserBuilder::new();
		builder
			.case_insensitive(self.case_insensitive)
			.multi_line(self.multi_line)
			.dot_matches_new_line(self.dot_matches_new_line)
			.swap_greed(self.swap_greed)
			.ignore_whitespace(self.ignore_whitespace)
			.unicode(self.unicode);
		builder
	}
}

/// The syntax-tree form of one or more patterns.
///
/// The tree is kept (rather than only the compiled automaton) because
/// patterns are combined here, then the automaton is rebuilt from the
/// combined expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression {
	/// A single parsed pattern and its source text.
	Pattern { source: String, hir: Hir },

	/// Strings accepted by both sides.
	Intersection(Box<Expression>, Box<Expression>),
}

impl Expression {
	/// Parses `pattern` with the given options.
	///
	/// # Errors
	/// Returns `GenError::Pattern` if the pattern is malformed.
	pub fn parse(pattern: &str, options: &SyntaxOptions) -> Result<Self> {
		let hir = options.parser().build().parse(pattern)?;
		Ok(Expression::Pattern {
			source: pattern.to_owned(),
			hir,
		})
	}

	/// Combines two expressions into their language intersection.
	pub fn intersect(left: Expression, right: Expression) -> Expression {
		Expression::Intersection(Box::new(left), Box::new(right))
	}

	/// Replaces `self` with the intersection of `self` and `other`.
	pub fn intersect_with(&mut self, other: Expression) {
		let current = std::mem::replace(
			self,
			Expression::Pattern {
				source: String::new(),
				hir: Hir::empty(),
			},
		);
		*self = Expression::intersect(current, other);
	}

	/// Number of source patterns combined in this expression.
	pub fn pattern_count(&self) -> usize {
		match self {
			Expression::Pattern { .. } => 1,
			Expression::Intersection(left, right) => left.pattern_count() + right.pattern_count(),
		}
	}
}

impl fmt::Display for Expression {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Expression::Pattern { source, .. } => write!(f, "{}", source),
			Expression::Intersection(left, right) => write!(f, "({}) & ({})", left, right),
		}
	}
}
