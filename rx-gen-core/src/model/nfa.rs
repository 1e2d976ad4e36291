use regex_syntax::hir::{Class, Hir, HirKind, Look, Repetition};

use crate::error::{GenError, Result};

const SURROGATE_MIN: u32 = 0xD800;
const SURROGATE_MAX: u32 = 0xDFFF;

/// Hard cap on NFA nodes, reached by large counted repetitions.
const MAX_NODES: usize = 1 << 20;

/// Symbol emitted for start anchors.
pub(crate) const START_ANCHOR: char = '^';

/// Symbol emitted for end anchors.
pub(crate) const END_ANCHOR: char = '$';

/// A Thompson NFA node: epsilon edges plus codepoint-range edges.
#[derive(Debug, Default)]
pub(crate) struct Node {
	pub(crate) epsilons: Vec<usize>,
	pub(crate) ranges: Vec<(u32, u32, usize)>,
}

/// Thompson NFA over codepoint ranges, with a single start and a single
/// accepting node.
#[derive(Debug)]
pub(crate) struct Nfa {
	pub(crate) nodes: Vec<Node>,
	pub(crate) start: usize,
	pub(crate) accept: usize,
}

impl Nfa {
	/// Compiles a syntax tree.
	///
	/// # Errors
	/// - Look-arounds other than line/text anchors are unsupported.
	/// - Counted repetitions expanding past the node cap are rejected.
	pub(crate) fn compile(hir: &Hir) -> Result<Self> {
		let mut nfa = Nfa {
			nodes: Vec::new(),
			start: 0,
			accept: 0,
		};
		let (start, accept) = nfa.fragment(hir)?;
		nfa.start = start;
		nfa.accept = accept;
		Ok(nfa)
	}

	/// Epsilon closure of `seeds`, sorted and deduplicated.
	pub(crate) fn closure(&self, seeds: &[usize]) -> Vec<usize> {
		let mut seen = vec![false; self.nodes.len()];
		let mut stack: Vec<usize> = seeds.to_vec();
		let mut set = Vec::new();
		while let Some(id) = stack.pop() {
			if seen[id] {
				continue;
			}
			seen[id] = true;
			set.push(id);
			stack.extend(self.nodes[id].epsilons.iter().copied());
		}
		set.sort_unstable();
		set
	}

	fn node(&mut self) -> Result<usize> {
		if self.nodes.len() >= MAX_NODES {
			return Err(GenError::Pattern(format!(
				"pattern too large: more than {} NFA nodes",
				MAX_NODES
			)));
		}
		self.nodes.push(Node::default());
		Ok(self.nodes.len() - 1)
	}

	fn epsilon(&mut self, from: usize, to: usize) {
		self.nodes[from].epsilons.push(to);
	}

	/// Adds a range edge, split around the surrogate block so every
	/// codepoint on the edge is a valid `char`.
	fn range(&mut self, from: usize, min: u32, max: u32, to: usize) {
		if min < SURROGATE_MIN {
			self.nodes[from].ranges.push((min, max.min(SURROGATE_MIN - 1), to));
		}
		if max > SURROGATE_MAX {
			self.nodes[from].ranges.push((min.max(SURROGATE_MAX + 1), max, to));
		}
	}

	fn sequence(&mut self, codepoints: &[u32]) -> Result<(usize, usize)> {
		let start = self.node()?;
		let mut current = start;
		for &c in codepoints {
			let next = self.node()?;
			self.range(current, c, c, next);
			current = next;
		}
		Ok((start, current))
	}

	/// Compiles `hir` into a fragment `(start, end)`; `end` has no
	/// outgoing edge yet.
	fn fragment(&mut self, hir: &Hir) -> Result<(usize, usize)> {
		match hir.kind() {
			HirKind::Empty => {
				let node = self.node()?;
				Ok((node, node))
			}
			HirKind::Literal(literal) => {
				let codepoints: Vec<u32> = match std::str::from_utf8(&literal.0) {
					Ok(s) => s.chars().map(|c| c as u32).collect(),
					// (?-u) literals: one codepoint per byte
					Err(_) => literal.0.iter().map(|&b| b as u32).collect(),
				};
				self.sequence(&codepoints)
			}
			HirKind::Class(class) => {
				let start = self.node()?;
				let end = self.node()?;
				match class {
					Class::Unicode(unicode) => {
						for r in unicode.ranges() {
							self.range(start, r.start() as u32, r.end() as u32, end);
						}
					}
					Class::Bytes(bytes) => {
						for r in bytes.ranges() {
							self.range(start, r.start() as u32, r.end() as u32, end);
						}
					}
				}
				Ok((start, end))
			}
			HirKind::Look(look) => match look {
				Look::Start | Look::StartLF | Look::StartCRLF => self.sequence(&[START_ANCHOR as u32]),
				Look::End | Look::EndLF | Look::EndCRLF => self.sequence(&[END_ANCHOR as u32]),
				other => Err(GenError::Pattern(format!("unsupported look-around: {:?}", other))),
			},
			HirKind::Capture(capture) => self.fragment(&capture.sub),
			HirKind::Concat(children) => {
				let start = self.node()?;
				let mut end = start;
				for child in children {
					let (s, e) = self.fragment(child)?;
					self.epsilon(end, s);
					end = e;
				}
				Ok((start, end))
			}
			HirKind::Alternation(children) => {
				let start = self.node()?;
				let end = self.node()?;
				for child in children {
					let (s, e) = self.fragment(child)?;
					self.epsilon(start, s);
					self.epsilon(e, end);
				}
				Ok((start, end))
			}
			HirKind::Repetition(repetition) => self.repetition(repetition),
		}
	}

	/// Expands `sub{min,max}` into `min` mandatory copies followed either by
	/// a loop (unbounded) or by `max - min` nested optional copies.
	fn repetition(&mut self, repetition: &Repetition) -> Result<(usize, usize)> {
		let start = self.node()?;
		let mut end = start;

		for _ in 0..repetition.min {
			let (s, e) = self.fragment(&repetition.sub)?;
			self.epsilon(end, s);
			end = e;
		}

		match repetition.max {
			None => {
				let hub = self.node()?;
				let (s, e) = self.fragment(&repetition.sub)?;
				self.epsilon(end, hub);
				self.epsilon(hub, s);
				self.epsilon(e, hub);
				end = hub;
			}
			Some(max) => {
				let exit = self.node()?;
				for _ in repetition.min..max {
					let (s, e) = self.fragment(&repetition.sub)?;
					self.epsilon(end, exit);
					self.epsilon(end, s);
					end = e;
				}
				self.epsilon(end, exit);
				end = exit;
			}
		}

		Ok((start, end))
	}
}
