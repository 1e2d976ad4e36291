/// Index of a state inside its `Automaton`.
pub type StateId = usize;

/// An outgoing edge of a `State`.
///
/// Any codepoint in the inclusive range `[min, max]` leads to `to`.
/// The range never contains surrogate codepoints, so every value in it
/// converts to a `char`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Transition {
	min: u32,
	max: u32,
	to: StateId,
}

impl Transition {
	pub(crate) fn new(min: u32, max: u32, to: StateId) -> Self {
		debug_assert!(min <= max);
		Self { min, max, to }
	}

	/// Lowest codepoint of the range (inclusive).
	pub fn min(&self) -> u32 {
		self.min
	}

	/// Highest codepoint of the range (inclusive).
	pub fn max(&self) -> u32 {
		self.max
	}

	/// Target state.
	pub fn to(&self) -> StateId {
		self.to
	}

	/// Whether `c` is inside the range.
	pub fn contains(&self, c: u32) -> bool {
		self.min <= c && c <= self.max
	}
}

/// A node of a deterministic automaton.
///
/// ## Invariants
/// - Transitions are disjoint and sorted ascending by `min` (then `max`),
///   so an index into `sorted_transitions` is stable across calls
/// - Every transition leads to a state from which acceptance is reachable
/// - `shortest` is the length of the shortest path to an accepting state
///   (0 for accepting states)
/// - `longest` is the length of the longest such path, `usize::MAX` when a
///   cycle is reachable
#[derive(Clone, Debug)]
pub struct State {
	accept: bool,
	transitions: Vec<Transition>,
	shortest: usize,
	longest: usize,
}

impl State {
	pub(crate) fn new(accept: bool) -> Self {
		Self {
			accept,
			transitions: Vec::new(),
			shortest: usize::MAX,
			longest: 0,
		}
	}

	/// Whether a walk may terminate here.
	pub fn is_accept(&self) -> bool {
		self.accept
	}

	/// Outgoing transitions in canonical order.
	pub fn sorted_transitions(&self) -> &[Transition] {
		&self.transitions
	}

	/// Number of characters on the shortest path to an accepting state.
	pub fn shortest(&self) -> usize {
		self.shortest
	}

	/// Number of characters on the longest path to an accepting state,
	/// `usize::MAX` if the paths are unbounded.
	pub fn longest(&self) -> usize {
		self.longest
	}

	/// Returns the transition matching `c`, if any.
	///
	/// Transitions are disjoint and sorted, so a binary search is enough.
	pub fn step(&self, c: u32) -> Option<&Transition> {
		let index = self.transitions.partition_point(|t| t.max < c);
		self.transitions.get(index).filter(|t| t.contains(c))
	}

	pub(crate) fn set_shortest(&mut self, shortest: usize) {
		self.shortest = shortest;
	}

	pub(crate) fn set_longest(&mut self, longest: usize) {
		self.longest = longest;
	}

	pub(crate) fn retain_transitions<F: FnMut(&Transition) -> bool>(&mut self, keep: F) {
		self.transitions.retain(keep);
	}

	pub(crate) fn remap_targets(&mut self, map: &[Option<StateId>]) {
		for t in &mut self.transitions {
			if let Some(to) = map[t.to] {
				t.to = to;
			}
		}
	}

	/// Replaces the transitions, sorting them and merging adjacent ranges
	/// that lead to the same target.
	///
	/// The input ranges must already be disjoint.
	pub(crate) fn set_transitions(&mut self, mut transitions: Vec<Transition>) {
		transitions.sort_by_key(|t| (t.min, t.max));

		let mut merged: Vec<Transition> = Vec::with_capacity(transitions.len());
		for t in transitions {
			match merged.last_mut() {
				Some(last) if last.to == t.to && last.max.checked_add(1) == Some(t.min) => {
					last.max = t.max;
				}
				_ => merged.push(t),
			}
		}
		self.transitions = merged;
	}
}
