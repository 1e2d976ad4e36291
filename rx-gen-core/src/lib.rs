//! Regex-driven random string generation library.
//!
//! This crate produces strings guaranteed to match a regular expression,
//! the inverse of a matcher. It provides:
//! - Compilation of patterns into deterministic automata
//! - Pattern composition by language intersection
//! - Random, length-bounded and reproducible generation
//! - Pattern file loading
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use rx_gen_core::model::generator::Generator;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut generator = Generator::with_bounds("[a-z]{2,5}", &mut rng, None, Some(4)).unwrap();
//! generator.add_pattern("[a-c]+").unwrap();
//! let value = generator.generate().unwrap();
//! assert!((2..=4).contains(&value.len()));
//! assert!(value.chars().all(|c| ('a'..='c').contains(&c)));
//! ```

/// Automata, sampling and generation logic.
///
/// This module exposes the generator interface along with the automaton
/// types needed to inspect what it walks.
pub mod model;

/// Errors returned by every fallible operation.
pub mod error;

/// I/O utilities (pattern files).
pub mod io;

pub use error::{GenError, Result};
pub use model::bounds::LengthBounds;
pub use model::expression::SyntaxOptions;
pub use model::generator::{Generator, GeneratorBuilder};
pub use model::sampler::{RandomSource, ReplaySource};
