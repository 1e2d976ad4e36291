use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use log::debug;

use super::expression::{Expression, SyntaxOptions};
use super::nfa::Nfa;
use super::state::{State, StateId, Transition};
use crate::error::{GenError, Result};

/// An immutable deterministic acceptor built from an `Expression`.
///
/// # Responsibilities
/// - Compile a pattern expression (parsing is done by `Expression`)
/// - Combine two automata into their language intersection
/// - Expose states and their transitions in canonical order for the walk
///
/// # Invariants
/// - States are disjoint-range deterministic: at most one transition per codepoint
/// - No dead ends: every transition leads to a state that can reach acceptance
/// - The initial state is the only state allowed to violate the above, and only
///   when the language is empty (it is then non-accepting with no transitions)
#[derive(Clone, Debug)]
pub struct Automaton {
	states: Vec<State>,
	initial: StateId,
}

impl Automaton {
	/// Builds the automaton for `expression`.
	///
	/// Deterministic for a fixed expression.
	///
	/// # Errors
	/// - `GenError::Pattern` for unsupported syntax (word boundaries, ...)
	/// - `GenError::Pattern` when more than `options.state_limit` states are needed
	pub fn build(expression: &Expression, options: &SyntaxOptions) -> Result<Self> {
		let automaton = match expression {
			Expression::Pattern { hir, .. } => {
				let nfa = Nfa::compile(hir)?;
				Self::determinize(&nfa, options.state_limit)?
			}
			Expression::Intersection(left, right) => {
				let left = Self::build(left, options)?;
				let right = Self::build(right, options)?;
				left.intersect(&right, options.state_limit)?
			}
		};
		debug!("Built automaton for '{}': {} states", expression, automaton.len());
		Ok(automaton)
	}

	/// The state every walk starts from.
	pub fn initial_state(&self) -> &State {
		&self.states[self.initial]
	}

	/// Id of the initial state.
	pub fn initial(&self) -> StateId {
		self.initial
	}

	/// Returns a state by id.
	///
	/// # Panics
	/// If `id` does not come from this automaton.
	pub fn state(&self, id: StateId) -> &State {
		&self.states[id]
	}

	/// Number of states.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	/// Whether the automaton has no state at all (never true once built).
	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Whether the accepted language is empty.
	pub fn is_empty_language(&self) -> bool {
		self.initial_state().shortest() == usize::MAX
	}

	/// Whether `input` is accepted, i.e. the whole string labels a path from
	/// the initial state to an accepting one.
	pub fn accepts(&self, input: &str) -> bool {
		let mut current = self.initial_state();
		for c in input.chars() {
			match current.step(c as u32) {
				Some(t) => current = &self.states[t.to()],
				None => return false,
			}
		}
		current.is_accept()
	}

	/// Subset construction over codepoint ranges.
	///
	/// For each set of NFA nodes, the outgoing ranges are cut at every range
	/// boundary, so each elementary interval leads to exactly one target set.
	fn determinize(nfa: &Nfa, limit: usize) -> Result<Self> {
		let mut sets: HashMap<Vec<usize>, StateId> = HashMap::new();
		let mut states: Vec<State> = Vec::new();
		let mut queue: VecDeque<(StateId, Vec<usize>)> = VecDeque::new();

		let initial_set = nfa.closure(&[nfa.start]);
		let accept = initial_set.binary_search(&nfa.accept).is_ok();
		Self::intern(&mut sets, &mut states, &mut queue, initial_set, accept, limit)?;

		while let Some((id, set)) = queue.pop_front() {
			let mut ranges: Vec<(u32, u32, usize)> = set
				.iter()
				.flat_map(|&node| nfa.nodes[node].ranges.iter().copied())
				.collect();
			if ranges.is_empty() {
				continue;
			}
			ranges.sort_unstable();

			let mut bounds: Vec<u32> = ranges.iter().flat_map(|&(min, max, _)| [min, max + 1]).collect();
			bounds.sort_unstable();
			bounds.dedup();

			let mut transitions = Vec::new();
			let mut active: Vec<(u32, usize)> = Vec::new();
			let mut next = 0;
			for window in bounds.windows(2) {
				let (lo, hi) = (window[0], window[1] - 1);
				while next < ranges.len() && ranges[next].0 == lo {
					active.push((ranges[next].1, ranges[next].2));
					next += 1;
				}
				active.retain(|&(max, _)| max >= lo);
				if active.is_empty() {
					continue;
				}

				let targets: Vec<usize> = active.iter().map(|&(_, to)| to).collect();
				let target_set = nfa.closure(&targets);
				let accept = target_set.binary_search(&nfa.accept).is_ok();
				let to = Self::intern(&mut sets, &mut states, &mut queue, target_set, accept, limit)?;
				transitions.push(Transition::new(lo, hi, to));
			}
			states[id].set_transitions(transitions);
		}

		Ok(Self::finalize(states, 0))
	}

	/// Returns the state id for `key`, creating and queueing it on first sight.
	fn intern<K: Hash + Eq + Clone>(
		index: &mut HashMap<K, StateId>,
		states: &mut Vec<State>,
		queue: &mut VecDeque<(StateId, K)>,
		key: K,
		accept: bool,
		limit: usize,
	) -> Result<StateId> {
		if let Some(&id) = index.get(&key) {
			return Ok(id);
		}
		if states.len() >= limit {
			return Err(GenError::Pattern(format!("automaton exceeds {} states", limit)));
		}
		let id = states.len();
		states.push(State::new(accept));
		index.insert(key.clone(), id);
		queue.push_back((id, key));
		Ok(id)
	}

	/// Product construction: a pair of states accepts when both do, and
	/// transitions follow the overlap of both sides' ranges.
	///
	/// # Errors
	/// `GenError::Pattern` when more than `limit` pairs are reachable.
	pub fn intersect(&self, other: &Automaton, limit: usize) -> Result<Automaton> {
		let mut pairs: HashMap<(StateId, StateId), StateId> = HashMap::new();
		let mut states: Vec<State> = Vec::new();
		let mut queue: VecDeque<(StateId, (StateId, StateId))> = VecDeque::new();

		let accept = |(left, right): (StateId, StateId)| {
			self.states[left].is_accept() && other.states[right].is_accept()
		};

		let start = (self.initial, other.initial);
		Self::intern(&mut pairs, &mut states, &mut queue, start, accept(start), limit)?;

		while let Some((id, (left, right))) = queue.pop_front() {
			let a = self.states[left].sorted_transitions();
			let b = other.states[right].sorted_transitions();
			let (mut i, mut j) = (0, 0);
			let mut transitions = Vec::new();
			while i < a.len() && j < b.len() {
				let lo = a[i].min().max(b[j].min());
				let hi = a[i].max().min(b[j].max());
				if lo <= hi {
					let pair = (a[i].to(), b[j].to());
					let to = Self::intern(&mut pairs, &mut states, &mut queue, pair, accept(pair), limit)?;
					transitions.push(Transition::new(lo, hi, to));
				}
				if a[i].max() < b[j].max() {
					i += 1;
				} else {
					j += 1;
				}
			}
			states[id].set_transitions(transitions);
		}

		Ok(Self::finalize(states, 0))
	}

	/// Computes distances to acceptance and removes dead states.
	///
	/// The initial state is always kept so the automaton stays walkable
	/// (an empty language leaves it without transitions).
	fn finalize(mut states: Vec<State>, initial: StateId) -> Automaton {
		let shortest = Self::shortest_paths(&states);
		let live: Vec<bool> = shortest.iter().map(|&d| d != usize::MAX).collect();

		let mut map: Vec<Option<StateId>> = vec![None; states.len()];
		let mut next = 0;
		for id in 0..states.len() {
			if live[id] || id == initial {
				map[id] = Some(next);
				next += 1;
			}
		}

		for (id, state) in states.iter_mut().enumerate() {
			state.set_shortest(shortest[id]);
			state.retain_transitions(|t| live[t.to()]);
			state.remap_targets(&map);
		}

		let mut kept: Vec<State> = states
			.into_iter()
			.enumerate()
			.filter(|(id, _)| map[*id].is_some())
			.map(|(_, state)| state)
			.collect();

		let longest = Self::longest_paths(&kept);
		for (state, longest) in kept.iter_mut().zip(longest) {
			state.set_longest(longest);
		}

		Automaton {
			states: kept,
			initial: map[initial].unwrap_or(0),
		}
	}

	/// Breadth-first search from accepting states over reversed edges.
	fn shortest_paths(states: &[State]) -> Vec<usize> {
		let mut reverse: Vec<Vec<StateId>> = vec![Vec::new(); states.len()];
		for (from, state) in states.iter().enumerate() {
			for t in state.sorted_transitions() {
				reverse[t.to()].push(from);
			}
		}

		let mut distance = vec![usize::MAX; states.len()];
		let mut queue = VecDeque::new();
		for (id, state) in states.iter().enumerate() {
			if state.is_accept() {
				distance[id] = 0;
				queue.push_back(id);
			}
		}
		while let Some(id) = queue.pop_front() {
			for &from in &reverse[id] {
				if distance[from] == usize::MAX {
					distance[from] = distance[id] + 1;
					queue.push_back(from);
				}
			}
		}
		distance
	}

	/// Longest distance to acceptance, by depth-first search in post-order.
	///
	/// Expects dead states to be pruned already: every path then ends on an
	/// accepting state, so reaching a cycle means unbounded lengths.
	fn longest_paths(states: &[State]) -> Vec<usize> {
		#[derive(Clone, Copy, PartialEq, Eq)]
		enum Mark {
			Unseen,
			Open,
			Done,
		}

		let mut longest = vec![0; states.len()];
		let mut marks = vec![Mark::Unseen; states.len()];
		let mut stack: Vec<(StateId, usize)> = Vec::new();

		for root in 0..states.len() {
			if marks[root] != Mark::Unseen {
				continue;
			}
			marks[root] = Mark::Open;
			stack.push((root, 0));

			while let Some(top) = stack.last_mut() {
				let (id, index) = *top;
				let transitions = states[id].sorted_transitions();
				if let Some(t) = transitions.get(index) {
					top.1 += 1;
					let to = t.to();
					match marks[to] {
						Mark::Unseen => {
							marks[to] = Mark::Open;
							stack.push((to, 0));
						}
						// back edge
						Mark::Open => longest[id] = usize::MAX,
						Mark::Done => longest[id] = longest[id].max(longest[to].saturating_add(1)),
					}
				} else {
					stack.pop();
					marks[id] = Mark::Done;
					if let Some(&(parent, _)) = stack.last() {
						longest[parent] = longest[parent].max(longest[id].saturating_add(1));
					}
				}
			}
		}
		longest
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn build(pattern: &str) -> Automaton {
		let options = SyntaxOptions::default();
		Automaton::build(&Expression::parse(pattern, &options).unwrap(), &options).unwrap()
	}

	fn build_all(patterns: &[&str]) -> Automaton {
		let options = SyntaxOptions::default();
		let mut expressions = patterns.iter().map(|p| Expression::parse(p, &options).unwrap());
		let first = expressions.next().unwrap();
		let combined = expressions.fold(first, Expression::intersect);
		Automaton::build(&combined, &options).unwrap()
	}

	#[test]
	fn accepts_matches_the_language() {
		let automaton = build("ab*c|d");
		for ok in ["ac", "abc", "abbbbc", "d"] {
			assert!(automaton.accepts(ok), "{ok}");
		}
		for ko in ["", "a", "ab", "dd", "abcd", "x"] {
			assert!(!automaton.accepts(ko), "{ko}");
		}
	}

	#[test]
	fn transitions_are_sorted_and_disjoint() {
		let automaton = build("[x-z]|[a-c]q|[b-e]r|.");
		for id in 0..automaton.len() {
			let transitions = automaton.state(id).sorted_transitions();
			for pair in transitions.windows(2) {
				assert!(pair[0].max() < pair[1].min());
			}
		}
	}

	#[test]
	fn shortest_distances_are_computed() {
		let automaton = build("abc(d*)");
		assert_eq!(automaton.initial_state().shortest(), 3);
		assert!(!automaton.initial_state().is_accept());
	}

	#[test]
	fn longest_distances_are_computed() {
		let automaton = build("a|bbbb");
		assert_eq!(automaton.initial_state().longest(), 4);
		let leaf = automaton.initial_state().step('a' as u32).unwrap().to();
		assert_eq!(automaton.state(leaf).longest(), 0);

		assert_eq!(build("x(y|z)*w").initial_state().longest(), usize::MAX);
		assert_eq!(build("[a-c]{3}").initial_state().longest(), 3);
	}

	#[test]
	fn anchors_become_literal_symbols() {
		let automaton = build("^ab$");
		assert!(automaton.accepts("^ab$"));
		assert!(!automaton.accepts("ab"));
	}

	#[test]
	fn intersection_keeps_common_strings_only() {
		let automaton = build_all(&["[a-z]{2,5}", "[a-c]+"]);
		assert!(automaton.accepts("ab"));
		assert!(automaton.accepts("cabca"));
		assert!(!automaton.accepts("a"));
		assert!(!automaton.accepts("abcabc"));
		assert!(!automaton.accepts("ad"));
	}

	#[test]
	fn disjoint_intersection_is_empty() {
		let automaton = build_all(&["a+", "b+"]);
		assert!(automaton.is_empty_language());
		assert!(automaton.initial_state().sorted_transitions().is_empty());
		assert_eq!(automaton.len(), 1);
	}

	#[test]
	fn no_dead_ends_after_intersection() {
		let automaton = build_all(&["(ab|ac)d*", "a[bc]d"]);
		for id in 0..automaton.len() {
			let state = automaton.state(id);
			assert!(state.is_accept() || !state.sorted_transitions().is_empty());
			assert_ne!(state.shortest(), usize::MAX);
		}
	}

	#[test]
	fn state_limit_is_enforced() {
		let options = SyntaxOptions {
			state_limit: 4,
			..SyntaxOptions::default()
		};
		let expression = Expression::parse("abcdefgh", &options).unwrap();
		assert!(matches!(Automaton::build(&expression, &options), Err(GenError::Pattern(_))));
	}

	#[test]
	fn build_is_deterministic() {
		let a = build("(foo|bar)[0-9]{1,3}");
		let b = build("(foo|bar)[0-9]{1,3}");
		assert_eq!(a.len(), b.len());
		for id in 0..a.len() {
			assert_eq!(a.state(id).sorted_transitions(), b.state(id).sorted_transitions());
			assert_eq!(a.state(id).is_accept(), b.state(id).is_accept());
		}
	}
}
