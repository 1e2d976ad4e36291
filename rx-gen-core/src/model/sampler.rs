use rand::{Rng, RngCore};

/// A stateful source of uniform values in `[0, 1)`.
///
/// The generator borrows its source instead of owning it, so the caller
/// controls seeding and can share one source across successive generators.
///
/// Any `rand` generator (`StdRng`, `ThreadRng`, ...) is a `RandomSource`.
pub trait RandomSource {
	/// Returns the next uniform value in `[0, 1)`.
	fn next_f64(&mut self) -> f64;
}

impl<T: RngCore> RandomSource for T {
	fn next_f64(&mut self) -> f64 {
		self.random::<f64>()
	}
}

/// A `RandomSource` replaying a fixed cycle of draws.
///
/// Useful to reproduce a walk exactly, independently of any `rand`
/// algorithm.
///
/// # Invariants
/// - `values` is never empty
/// - Every value lies in `[0, 1)`
#[derive(Clone, Debug)]
pub struct ReplaySource {
	values: Vec<f64>,
	position: usize,
}

impl ReplaySource {
	/// Creates a source cycling through `values`.
	///
	/// Values outside `[0, 1)` are clamped into it; an empty list behaves
	/// like a single `0.0`.
	pub fn new(values: Vec<f64>) -> Self {
		let mut values: Vec<f64> = values
			.into_iter()
			.map(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0 - f64::EPSILON) })
			.collect();
		if values.is_empty() {
			values.push(0.0);
		}
		Self { values, position: 0 }
	}

	/// Number of draws consumed so far.
	pub fn consumed(&self) -> usize {
		self.position
	}
}

impl RandomSource for ReplaySource {
	fn next_f64(&mut self) -> f64 {
		let value = self.values[self.position % self.values.len()];
		self.position += 1;
		value
	}
}

/// Draws an integer in the inclusive range `[lo, hi]`.
///
/// Consumes exactly one value `u` from `random` and returns
/// `lo + round(u * (hi - lo))`.
///
/// # Notes
/// - The rounding slightly favors inner values over the two endpoints,
///   which get half a bucket each. The formula is kept as is so a known
///   sequence of draws always reproduces the same output.
/// - When `hi <= lo` the range collapses to `lo` (the draw is still consumed).
pub fn sample<R: RandomSource + ?Sized>(random: &mut R, lo: u32, hi: u32) -> u32 {
	let u = random.next_f64();
	if hi <= lo {
		return lo;
	}
	let span = (hi - lo) as f64;
	let offset = (u * span).round() as u32;
	// min() covers sources returning 1.0
	lo + offset.min(hi - lo)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	#[test]
	fn sample_stays_in_range() {
		let mut rng = StdRng::seed_from_u64(7);
		for (lo, hi) in [(0, 0), (0, 1), (3, 9), (97, 122), (0, 0x10FFFF)] {
			for _ in 0..500 {
				let v = sample(&mut rng, lo, hi);
				assert!(v >= lo && v <= hi, "{v} not in [{lo}, {hi}]");
			}
		}
	}

	#[test]
	fn single_value_range_consumes_one_draw() {
		let mut source = ReplaySource::new(vec![0.9, 0.1]);
		assert_eq!(sample(&mut source, 5, 5), 5);
		assert_eq!(source.consumed(), 1);
	}

	#[test]
	fn collapsed_range_returns_lower_bound() {
		let mut source = ReplaySource::new(vec![0.99]);
		assert_eq!(sample(&mut source, 0, 0), 0);
		assert_eq!(sample(&mut source, 1, 0), 1);
	}

	#[test]
	fn rounding_formula_is_preserved() {
		let mut source = ReplaySource::new(vec![0.0, 0.24, 0.26, 0.5, 0.74, 0.76, 0.99]);
		let drawn: Vec<u32> = (0..7).map(|_| sample(&mut source, 10, 12)).collect();
		assert_eq!(drawn, vec![10, 10, 11, 11, 11, 12, 12]);
	}

	#[test]
	fn replay_source_cycles_and_clamps() {
		let mut source = ReplaySource::new(vec![0.25, 3.0, -1.0]);
		assert_eq!(source.next_f64(), 0.25);
		assert!(source.next_f64() < 1.0);
		assert_eq!(source.next_f64(), 0.0);
		assert_eq!(source.next_f64(), 0.25);
		assert_eq!(source.consumed(), 4);
	}
}
