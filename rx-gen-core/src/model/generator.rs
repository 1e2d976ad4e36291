use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use log::{debug, trace, warn};

use crate::error::{GenError, Result};
use crate::io;
use crate::model::automaton::Automaton;
use crate::model::bounds::LengthBounds;
use crate::model::expression::{Expression, SyntaxOptions};
use crate::model::nfa::{END_ANCHOR, START_ANCHOR};
use crate::model::sampler::{RandomSource, sample};
use crate::model::state::Transition;

/// Generates strings matching one or more patterns.
///
/// # Responsibilities
/// - Keep the (possibly combined) pattern expression
/// - Build the automaton lazily and rebuild it after every `add_pattern`
/// - Walk the automaton randomly within the configured length bounds
///
/// The randomness source is borrowed for the generator's whole lifetime:
/// seeding it identically reproduces the same sequence of strings.
///
/// A generator is not meant to be shared between threads; use one
/// generator (and one randomness source) per thread instead.
pub struct Generator<'r, R: RandomSource + ?Sized> {
	expression: Expression,
	options: SyntaxOptions,
	bounds: LengthBounds,
	automaton: Option<Automaton>,
	random: &'r mut R,
}

impl<'r, R: RandomSource + ?Sized> Generator<'r, R> {
	/// Creates an unbounded generator for `pattern` with default syntax options.
	///
	/// # Errors
	/// Returns `GenError::Pattern` if the pattern does not parse.
	pub fn new(pattern: &str, random: &'r mut R) -> Result<Self> {
		Self::builder().pattern(pattern).random(random).build()
	}

	/// Creates a generator for `pattern` with optional length bounds.
	///
	/// # Errors
	/// - `GenError::InvalidArgument` if `min > max`
	/// - `GenError::Pattern` if the pattern does not parse
	pub fn with_bounds(pattern: &str, random: &'r mut R, min: Option<usize>, max: Option<usize>) -> Result<Self> {
		let bounds = LengthBounds::new(min, max)?;
		Self::builder().pattern(pattern).random(random).bounds(bounds).build()
	}

	/// Creates a generator accepting only strings matched by every pattern
	/// of a pattern file (see `io::read_patterns` for the format).
	///
	/// # Errors
	/// - I/O errors while reading the file
	/// - `GenError::InvalidArgument` if the file holds no pattern
	/// - `GenError::Pattern` if any pattern does not parse
	pub fn from_file<P: AsRef<Path>>(filepath: P, random: &'r mut R, bounds: LengthBounds) -> Result<Self> {
		let patterns = io::read_patterns(&filepath)?;
		let (first, rest) = patterns.split_first().ok_or_else(|| {
			GenError::InvalidArgument(format!("No pattern found in {}", filepath.as_ref().display()))
		})?;

		let mut generator = Self::builder()
			.pattern(first.as_str())
			.random(random)
			.bounds(bounds)
			.build()?;
		generator.add_patterns(rest.iter().map(String::as_str))?;
		Ok(generator)
	}

	/// Returns a builder to configure bounds and syntax options.
	pub fn builder() -> GeneratorBuilder<'r, R> {
		GeneratorBuilder::new()
	}

	/// Restricts the generated language to strings also matched by `pattern`.
	///
	/// The pattern is parsed with this generator's syntax options and
	/// intersected with the current expression; the cached automaton is
	/// dropped and rebuilt on the next generation.
	///
	/// # Errors
	/// Returns `GenError::Pattern` if the pattern does not parse. The
	/// generator is left unchanged in that case.
	pub fn add_pattern(&mut self, pattern: &str) -> Result<()> {
		let added = Expression::parse(pattern, &self.options)?;
		self.expression.intersect_with(added);
		if self.automaton.take().is_some() {
			debug!("Automaton invalidated, expression is now '{}'", self.expression);
		}
		Ok(())
	}

	/// Calls `add_pattern` for every pattern, stopping at the first error.
	pub fn add_patterns<'p, I>(&mut self, patterns: I) -> Result<()>
	where
		I: IntoIterator<Item = &'p str>,
	{
		for pattern in patterns {
			self.add_pattern(pattern)?;
		}
		Ok(())
	}

	/// Current combined expression.
	pub fn expression(&self) -> &Expression {
		&self.expression
	}

	/// Configured length bounds.
	pub fn bounds(&self) -> LengthBounds {
		self.bounds
	}

	/// Changes the minimum length.
	///
	/// # Errors
	/// Returns `GenError::InvalidArgument` (and keeps the previous minimum)
	/// if it would exceed the maximum.
	pub fn set_min_length(&mut self, min: Option<usize>) -> Result<()> {
		self.bounds.set_min(min)
	}

	/// Changes the maximum length.
	///
	/// # Errors
	/// Returns `GenError::InvalidArgument` (and keeps the previous maximum)
	/// if it would fall below the minimum.
	pub fn set_max_length(&mut self, max: Option<usize>) -> Result<()> {
		self.bounds.set_max(max)
	}

	/// Syntax options used for every pattern of this generator.
	pub fn options(&self) -> &SyntaxOptions {
		&self.options
	}

	/// Whether the automaton is currently built.
	pub fn is_built(&self) -> bool {
		self.automaton.is_some()
	}

	/// Returns the automaton, building it first if needed.
	///
	/// # Errors
	/// Returns `GenError::Pattern` if the expression cannot be compiled.
	pub fn automaton(&mut self) -> Result<&Automaton> {
		Self::cached(&mut self.automaton, &self.expression, &self.options)
	}

	fn cached<'a>(
		slot: &'a mut Option<Automaton>,
		expression: &Expression,
		options: &SyntaxOptions,
	) -> Result<&'a Automaton> {
		let automaton = match slot.take() {
			Some(automaton) => automaton,
			None => Automaton::build(expression, options)?,
		};
		Ok(slot.insert(automaton))
	}

	/// Generates one string matching every pattern.
	///
	/// # Behavior
	/// - Walks from the initial state, one character per transition.
	/// - On an accepting state, option `0` means "stop here"; it is not
	///   offered while the minimum length is not reached.
	/// - With a maximum length, transitions from which no accepting state can
	///   be reached within the remaining length are not offered. Once the
	///   maximum is reached an accepting state always stops.
	/// - Below the minimum length, transitions whose longest route to
	///   acceptance ends before the minimum are not offered either, unless
	///   no other transition is left.
	/// - Every step draws two values: one for the option, one for the
	///   character. Stopping draws the option only.
	/// - One leading `^` and one trailing `$` are trimmed from the result.
	///
	/// # Errors
	/// - `GenError::Pattern` if the automaton cannot be built
	/// - `GenError::Consistency` if the walk reaches a non-accepting state
	///   without transitions (e.g. patterns with no common string)
	///
	/// # Notes
	/// - If the bounds cannot be met (say `a{5}` with a maximum of 3), the
	///   walk still ends on an accepting state, following the shortest route
	///   once no transition fits: the result always matches. A warning is
	///   logged for such results.
	pub fn generate(&mut self) -> Result<String> {
		let automaton = Self::cached(&mut self.automaton, &self.expression, &self.options)?;

		let mut buffer = String::new();
		let mut len = 0;
		let mut current = automaton.initial();
		let mut viable: Vec<&Transition> = Vec::new();

		loop {
			let state = automaton.state(current);
			let transitions = state.sorted_transitions();
			if transitions.is_empty() && !state.is_accept() {
				return Err(GenError::Consistency { state: current });
			}

			// len + 1 + shortest(target) <= max
			viable.clear();
			match self.bounds.remaining(len) {
				Some(remaining) => viable.extend(
					transitions
						.iter()
						.filter(|t| automaton.state(t.to()).shortest() < remaining),
				),
				None => viable.extend(transitions.iter()),
			}

			// len + 1 + longest(target) >= min
			if let Some(min) = self.bounds.min().filter(|&min| len < min) {
				let long_enough = |t: &&Transition| automaton.state(t.to()).longest().saturating_add(len + 1) >= min;
				if viable.iter().any(long_enough) {
					viable.retain(long_enough);
				}
			}

			let next = if viable.is_empty() && !state.is_accept() {
				// Unreachable bounds: take the shortest way out. The option
				// draw is still consumed.
				sample(&mut *self.random, 0, 0);
				transitions
					.iter()
					.min_by_key(|t| automaton.state(t.to()).shortest())
					.ok_or(GenError::Consistency { state: current })?
			} else {
				let stop = usize::from(state.is_accept());
				let opts = viable.len() + stop;
				let lo = if stop == 1 && !viable.is_empty() && !self.bounds.can_stop(len) { 1 } else { 0 };
				let option = sample(&mut *self.random, lo, (opts - 1) as u32) as usize;
				if stop == 1 && option == 0 {
					break;
				}
				viable[option - stop]
			};

			let codepoint = sample(&mut *self.random, next.min(), next.max());
			let c = char::from_u32(codepoint).ok_or(GenError::Consistency { state: current })?;
			buffer.push(c);
			len += 1;
			current = next.to();
		}

		if !self.bounds.contains(len) {
			warn!(
				"Length bounds cannot be met for '{}', generated {} characters",
				self.expression, len
			);
		}
		let result = Self::trim_anchors(buffer);
		trace!("Generated '{}' for '{}'", result, self.expression);
		Ok(result)
	}

	/// Generates `count` strings.
	pub fn generate_many(&mut self, count: usize) -> Result<Vec<String>> {
		(0..count).map(|_| self.generate()).collect()
	}

	/// Generates `count` strings while avoiding duplicates.
	///
	/// # Behavior
	/// - Each string is retried up to `nb_try` times while it was already produced.
	/// - The last attempt is kept when every retry produced a duplicate, so
	///   small languages still yield `count` strings.
	pub fn generate_distinct(&mut self, count: usize, nb_try: usize) -> Result<Vec<String>> {
		let mut seen: HashSet<String> = HashSet::with_capacity(count);
		let mut values = Vec::with_capacity(count);

		for _ in 0..count {
			let mut value = self.generate()?;
			let mut tries = nb_try;
			while tries > 0 && seen.contains(&value) {
				value = self.generate()?;
				tries -= 1;
			}
			seen.insert(value.clone());
			values.push(value);
		}

		Ok(values)
	}

	/// Removes one leading `^` and one trailing `$`.
	fn trim_anchors(mut buffer: String) -> String {
		if buffer.starts_with(START_ANCHOR) {
			buffer.remove(0);
		}
		if buffer.ends_with(END_ANCHOR) {
			buffer.pop();
		}
		buffer
	}
}

impl<R: RandomSource + ?Sized> fmt::Debug for Generator<'_, R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Generator")
			.field("expression", &self.expression.to_string())
			.field("options", &self.options)
			.field("bounds", &self.bounds)
			.field("built", &self.automaton.is_some())
			.finish()
	}
}

/// Step-by-step configuration of a `Generator`.
///
/// Both the pattern and the randomness source are required; bounds and
/// syntax options are optional.
pub struct GeneratorBuilder<'r, R: RandomSource + ?Sized> {
	pattern: Option<String>,
	random: Option<&'r mut R>,
	min: Option<usize>,
	max: Option<usize>,
	options: SyntaxOptions,
}

impl<'r, R: RandomSource + ?Sized> Default for GeneratorBuilder<'r, R> {
	fn default() -> Self {
		Self::new()
	}
}

impl<'r, R: RandomSource + ?Sized> GeneratorBuilder<'r, R> {
	/// Creates an empty builder.
	pub fn new() -> Self {
		Self {
			pattern: None,
			random: None,
			min: None,
			max: None,
			options: SyntaxOptions::default(),
		}
	}

	/// Sets the pattern (required).
	pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
		self.pattern = Some(pattern.into());
		self
	}

	/// Sets the randomness source (required).
	pub fn random(mut self, random: &'r mut R) -> Self {
		self.random = Some(random);
		self
	}

	/// Sets the minimum length.
	pub fn min_length(mut self, min: usize) -> Self {
		self.min = Some(min);
		self
	}

	/// Sets the maximum length.
	pub fn max_length(mut self, max: usize) -> Self {
		self.max = Some(max);
		self
	}

	/// Sets both bounds at once, replacing any previous value.
	pub fn bounds(mut self, bounds: LengthBounds) -> Self {
		self.min = bounds.min();
		self.max = bounds.max();
		self
	}

	/// Sets the syntax options.
	pub fn options(mut self, options: SyntaxOptions) -> Self {
		self.options = options;
		self
	}

	/// Validates the configuration and creates the generator.
	///
	/// No automaton is built here; that happens on the first generation.
	///
	/// # Errors
	/// - `GenError::InvalidArgument` if the pattern or the randomness source is missing
	/// - `GenError::InvalidArgument` if `min > max`
	/// - `GenError::Pattern` if the pattern does not parse
	pub fn build(self) -> Result<Generator<'r, R>> {
		let pattern = self
			.pattern
			.ok_or_else(|| GenError::InvalidArgument("A pattern is required".to_owned()))?;
		let random = self
			.random
			.ok_or_else(|| GenError::InvalidArgument("A randomness source is required".to_owned()))?;
		let bounds = LengthBounds::new(self.min, self.max)?;
		let expression = Expression::parse(&pattern, &self.options)?;

		Ok(Generator {
			expression,
			options: self.options,
			bounds,
			automaton: None,
			random,
		})
	}
}
