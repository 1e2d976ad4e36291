//! End-to-end generation scenarios with seeded randomness.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rx_gen_core::model::automaton::Automaton;
use rx_gen_core::model::expression::Expression;
use rx_gen_core::{GenError, Generator, GeneratorBuilder, LengthBounds, ReplaySource, SyntaxOptions};

const RUNS: usize = 300;

fn acceptor(pattern: &str) -> Automaton {
	let options = SyntaxOptions::default();
	Automaton::build(&Expression::parse(pattern, &options).unwrap(), &options).unwrap()
}

#[test]
fn class_repeated_three_times() {
	let mut rng = StdRng::seed_from_u64(100);
	let mut generator = Generator::new("[a-c]{3}", &mut rng).unwrap();
	for value in generator.generate_many(RUNS).unwrap() {
		assert_eq!(value.chars().count(), 3);
		assert!(value.chars().all(|c| matches!(c, 'a' | 'b' | 'c')), "{value}");
	}
}

#[test]
fn star_with_maximum() {
	let mut rng = StdRng::seed_from_u64(101);
	let mut generator = Generator::with_bounds("a*", &mut rng, None, Some(5)).unwrap();
	let values = generator.generate_many(RUNS).unwrap();
	for value in &values {
		assert!(value.len() <= 5, "{value}");
		assert!(value.chars().all(|c| c == 'a'), "{value}");
	}
	// Both ends of the range show up over enough runs.
	assert!(values.iter().any(|v| v.is_empty()));
	assert!(values.iter().any(|v| v.len() == 5));
}

#[test]
fn alternation_with_minimum() {
	let mut rng = StdRng::seed_from_u64(102);
	let mut generator = Generator::with_bounds("a|b", &mut rng, Some(1), None).unwrap();
	let values = generator.generate_many(RUNS).unwrap();
	assert!(values.iter().all(|v| v == "a" || v == "b"));
	assert!(values.iter().any(|v| v == "a"));
	assert!(values.iter().any(|v| v == "b"));
}

#[test]
fn intersection_narrows_the_language() {
	let mut rng = StdRng::seed_from_u64(103);
	let mut generator = Generator::new("[a-z]{2,5}", &mut rng).unwrap();
	generator.add_pattern("[a-c]+").unwrap();
	for value in generator.generate_many(RUNS).unwrap() {
		assert!((2..=5).contains(&value.chars().count()), "{value}");
		assert!(value.chars().all(|c| matches!(c, 'a' | 'b' | 'c')), "{value}");
	}
}

#[test]
fn chained_additions_match_every_pattern() {
	let patterns = ["[a-z0-9]{4,8}", ".*[0-9].*", "[a-m0-4]+", "(..)+"];
	let mut rng = StdRng::seed_from_u64(104);
	let mut generator = Generator::new(patterns[0], &mut rng).unwrap();
	generator.add_patterns(patterns[1..].iter().copied()).unwrap();

	let acceptors: Vec<Automaton> = patterns.iter().map(|p| acceptor(p)).collect();
	for value in generator.generate_many(RUNS).unwrap() {
		for (pattern, automaton) in patterns.iter().zip(&acceptors) {
			assert!(automaton.accepts(&value), "'{value}' should match {pattern}");
		}
	}
}

#[test]
fn missing_randomness_source_is_invalid() {
	let result = GeneratorBuilder::<StdRng>::new().pattern("[a-c]{3}").build();
	assert!(matches!(result, Err(GenError::InvalidArgument(_))));
}

#[test]
fn malformed_pattern_is_a_pattern_error() {
	let mut rng = StdRng::seed_from_u64(105);
	assert!(matches!(Generator::new("a{2", &mut rng), Err(GenError::Pattern(_))));
	assert!(matches!(Generator::new(r"\bword", &mut rng).and_then(|mut g| g.generate()), Err(GenError::Pattern(_))));
}

#[test]
fn anchored_pattern_length_is_loosened_by_trimming() {
	let mut rng = StdRng::seed_from_u64(106);
	let mut generator = Generator::with_bounds("^x{1,6}$", &mut rng, Some(3), Some(6)).unwrap();
	for value in generator.generate_many(RUNS).unwrap() {
		assert!(!value.contains('^') && !value.contains('$'), "{value}");
		assert!((1..=6).contains(&value.len()), "{value}");
	}
}

#[test]
fn replayed_draws_give_the_same_strings() {
	let draws = vec![0.13, 0.72, 0.05, 0.99, 0.41, 0.66, 0.28, 0.87];
	let mut first_source = ReplaySource::new(draws.clone());
	let mut second_source = ReplaySource::new(draws);

	let first = Generator::new("(foo|ba[rz])[0-9]{0,3}", &mut first_source)
		.unwrap()
		.generate_many(20)
		.unwrap();
	let second = Generator::new("(foo|ba[rz])[0-9]{0,3}", &mut second_source)
		.unwrap()
		.generate_many(20)
		.unwrap();
	assert_eq!(first, second);
}

#[test]
fn unicode_classes_yield_valid_characters() {
	let mut rng = StdRng::seed_from_u64(107);
	let mut generator = Generator::with_bounds(r"\p{Greek}+|.", &mut rng, None, Some(10)).unwrap();
	let automaton = acceptor(r"\p{Greek}+|.");
	for value in generator.generate_many(RUNS).unwrap() {
		assert!(automaton.accepts(&value), "{value:?}");
	}
}

#[test]
fn byte_classes_map_to_latin1() {
	let mut rng = StdRng::seed_from_u64(108);
	let options = SyntaxOptions {
		unicode: false,
		..SyntaxOptions::default()
	};
	let mut generator = Generator::builder()
		.pattern(r"[a-f]{3}\w")
		.random(&mut rng)
		.options(options)
		.build()
		.unwrap();
	for value in generator.generate_many(RUNS).unwrap() {
		assert_eq!(value.len(), 4);
		assert!(value.is_ascii(), "{value}");
	}
}

#[test]
fn pattern_file_patterns_are_intersected() {
	let path = std::env::temp_dir().join(format!("rx-gen-patterns-{}.txt", std::process::id()));
	std::fs::write(&path, "# identifiers\n[a-z][a-z0-9]*\n\n.{3,6}\n.*7.*\n").unwrap();

	let mut rng = StdRng::seed_from_u64(109);
	let mut generator = Generator::from_file(&path, &mut rng, LengthBounds::unbounded()).unwrap();
	assert_eq!(generator.expression().pattern_count(), 3);
	for value in generator.generate_many(100).unwrap() {
		assert!((3..=6).contains(&value.len()), "{value}");
		assert!(value.contains('7'), "{value}");
		assert!(value.chars().next().is_some_and(|c| c.is_ascii_lowercase()), "{value}");
	}
	std::fs::remove_file(&path).unwrap();
}

#[test]
fn empty_pattern_file_is_invalid() {
	let path = std::env::temp_dir().join(format!("rx-gen-empty-{}.txt", std::process::id()));
	std::fs::write(&path, "# nothing here\n\n").unwrap();
	let mut rng = StdRng::seed_from_u64(110);
	let result = Generator::from_file(&path, &mut rng, LengthBounds::unbounded());
	assert!(matches!(result, Err(GenError::InvalidArgument(_))));
	std::fs::remove_file(&path).unwrap();
}
