//! Top-level module for regex-driven string generation.
//!
//! This module provides:
//! - Pattern expressions and syntax options (`Expression`, `SyntaxOptions`)
//! - Deterministic automata built from expressions (`Automaton`, `State`, `Transition`)
//! - The randomness abstraction and numeric sampler (`RandomSource`, `sample`)
//! - Length constraints (`LengthBounds`)
//! - A high-level generation interface (`Generator`)

/// High-level interface generating strings that match one or more patterns.
///
/// Owns the combined pattern expression and a lazily built automaton, and
/// performs the bounded random walk.
pub mod generator;

/// Deterministic automaton: construction, intersection and membership test.
pub mod automaton;

/// Parsed pattern expressions and the parser options.
pub mod expression;

/// States and transitions of an automaton.
pub mod state;

/// Randomness source trait and the integer sampler shared by the walk.
pub mod sampler;

/// Optional minimum/maximum length of generated strings.
pub mod bounds;

/// Thompson NFA compiled from a syntax tree, input of the subset construction.
/// This module is not exposed publicly.
mod nfa;
