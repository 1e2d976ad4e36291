use rand::SeedableRng;
use rand::rngs::StdRng;
use rx_gen_core::{GenError, Generator, LengthBounds, SyntaxOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG=debug to see automaton builds and invalidations
    env_logger::init();

    // Any rand generator can be used; a seeded one makes the output reproducible
    let mut rng = StdRng::seed_from_u64(2024);

    // A generator only needs a pattern and a randomness source
    let mut app = Generator::new("[a-c]{3}", &mut rng)?;
    println!("[a-c]{{3}}: {}", app.generate_many(5)?.join(", "));

    // Length bounds are optional; 'max' keeps unbounded repetitions short
    let mut stars = Generator::with_bounds("(ab|c)*", &mut rng, Some(2), Some(6))?;
    println!("(ab|c)* in [2, 6]: {}", stars.generate_many(5)?.join(", "));

    // Patterns can be combined: every generated string matches all of them.
    // The automaton is rebuilt lazily after each addition
    let mut words = Generator::new("[a-z]{2,5}", &mut rng)?;
    words.add_pattern("[a-c]+")?;
    println!("[a-z]{{2,5}} & [a-c]+: {}", words.generate_many(5)?.join(", "));

    // Syntax options select the parser flags and the automaton size budget
    let options = SyntaxOptions {
        case_insensitive: true,
        ..SyntaxOptions::default()
    };
    let mut hello = Generator::builder()
        .pattern("hello( world)?")
        .random(&mut rng)
        .options(options)
        .build()?;
    println!("(?i)hello( world)?: {}", hello.generate_distinct(5, 20)?.join(", "));

    // Anchors are accepted and trimmed from the output
    let mut anchored = Generator::new("^[0-9]{4}$", &mut rng)?;
    println!("^[0-9]{{4}}$: {}", anchored.generate()?);

    // Patterns can also be loaded from a file, one per line, all intersected
    match Generator::from_file("./data/patterns.txt", &mut rng, LengthBounds::unbounded()) {
        Ok(mut codes) => println!("data/patterns.txt: {}", codes.generate_many(5)?.join(", ")),
        Err(GenError::Io(e)) => println!("data/patterns.txt not loaded: {}", e),
        Err(e) => return Err(e.into()),
    }

    // Patterns without a common string cannot be generated
    let mut impossible = Generator::new("a+", &mut rng)?;
    impossible.add_pattern("b+")?;
    match impossible.generate() {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("a+ & b+: {}", e),
    }

    // Inconsistent bounds are rejected when the generator is created
    match Generator::with_bounds("a*", &mut rng, Some(5), Some(2)) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("min 5, max 2: {}", e),
    }

    Ok(())
}
