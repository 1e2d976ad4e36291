use crate::error::{GenError, Result};

/// Optional inclusive limits on the number of generated characters.
///
/// Lengths are measured on the in-progress buffer, before the boundary
/// `^`/`$` symbols are trimmed.
///
/// # Invariants
/// - `min <= max` whenever both are set (enforced by every constructor and setter)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LengthBounds {
	min: Option<usize>,
	max: Option<usize>,
}

impl LengthBounds {
	/// Creates bounds, rejecting `min > max`.
	///
	/// # Errors
	/// Returns `GenError::InvalidArgument` if both are set and `min > max`.
	pub fn new(min: Option<usize>, max: Option<usize>) -> Result<Self> {
		let bounds = Self { min, max };
		bounds.validate()?;
		Ok(bounds)
	}

	/// No limit on either side.
	pub fn unbounded() -> Self {
		Self::default()
	}

	/// Minimum length, if any.
	pub fn min(&self) -> Option<usize> {
		self.min
	}

	/// Maximum length, if any.
	pub fn max(&self) -> Option<usize> {
		self.max
	}

	/// Sets the minimum length.
	///
	/// # Errors
	/// Returns an error (and keeps the previous value) if the new minimum
	/// exceeds the current maximum.
	pub fn set_min(&mut self, min: Option<usize>) -> Result<()> {
		Self { min, max: self.max }.validate()?;
		self.min = min;
		Ok(())
	}

	/// Sets the maximum length.
	///
	/// # Errors
	/// Returns an error (and keeps the previous value) if the current minimum
	/// exceeds the new maximum.
	pub fn set_max(&mut self, max: Option<usize>) -> Result<()> {
		Self { min: self.min, max }.validate()?;
		self.max = max;
		Ok(())
	}

	/// Whether a buffer of `len` characters may end here.
	pub fn can_stop(&self, len: usize) -> bool {
		self.min.is_none_or(|min| len >= min)
	}

	/// Characters that may still be appended to a buffer of `len` characters,
	/// `None` when unbounded.
	pub fn remaining(&self, len: usize) -> Option<usize> {
		self.max.map(|max| max.saturating_sub(len))
	}

	/// Whether `len` lies within the bounds.
	pub fn contains(&self, len: usize) -> bool {
		self.can_stop(len) && self.max.is_none_or(|max| len <= max)
	}

	fn validate(&self) -> Result<()> {
		match (self.min, self.max) {
			(Some(min), Some(max)) if min > max => Err(GenError::InvalidArgument(format!(
				"min length {} is greater than max length {}",
				min, max
			))),
			_ => Ok(()),
		}
	}
}
