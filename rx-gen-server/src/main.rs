use actix_cors::Cors;
use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};

use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use rx_gen_core::{GenError, Generator, LengthBounds, SyntaxOptions};

/// Upper limit on strings generated per request.
const MAX_COUNT: usize = 1000;

/// Default bind address, overridden by `RX_GEN_ADDR`.
const DEFAULT_ADDR: &str = "127.0.0.1:5000";

/// Struct representing query parameters for the `GET /v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	pattern: String,
	min: Option<usize>,
	max: Option<usize>,
	count: Option<usize>,
	seed: Option<u64>,
}

/// JSON body of the `POST /v1/generate` endpoint
///
/// Every pattern is intersected with the first one.
#[derive(Deserialize)]
struct GenerateRequest {
	patterns: Vec<String>,
	min_length: Option<usize>,
	max_length: Option<usize>,
	count: Option<usize>,
	seed: Option<u64>,
	#[serde(default)]
	options: SyntaxOptions,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct GenerateResponse {
	values: Vec<String>,
}

/// Everything needed to run one generation, whatever the endpoint.
struct Job<'a> {
	patterns: &'a [String],
	bounds: LengthBounds,
	count: usize,
	seed: Option<u64>,
	options: SyntaxOptions,
}

impl Job<'_> {
	/// Builds a fresh generator and randomness source, then generates `count` strings.
	///
	/// Each request gets its own generator: generators are not shared
	/// between worker threads.
	fn run(&self) -> Result<Vec<String>, GenError> {
		if self.count > MAX_COUNT {
			return Err(GenError::InvalidArgument(format!("count must be at most {}", MAX_COUNT)));
		}
		let (first, rest) = self
			.patterns
			.split_first()
			.ok_or_else(|| GenError::InvalidArgument("At least one pattern is required".to_owned()))?;

		let mut rng = match self.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		};
		let mut generator = Generator::builder()
			.pattern(first.as_str())
			.random(&mut rng)
			.bounds(self.bounds)
			.options(self.options.clone())
			.build()?;
		generator.add_patterns(rest.iter().map(String::as_str))?;
		generator.generate_many(self.count)
	}
}

/// Maps a generation error onto an HTTP response.
fn error_response(e: GenError) -> HttpResponse {
	match e {
		GenError::InvalidArgument(_) | GenError::Pattern(_) => HttpResponse::BadRequest().body(e.to_string()),
		GenError::Consistency { .. } => HttpResponse::UnprocessableEntity().body(e.to_string()),
		GenError::Io(_) => {
			error!("Unexpected I/O error: {}", e);
			HttpResponse::InternalServerError().body(e.to_string())
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates strings matching `pattern` and returns them one per line.
#[get("/v1/generate")]
async fn get_generated(query: web::Query<GenerateParams>) -> impl Responder {
	let bounds = match LengthBounds::new(query.min, query.max) {
		Ok(b) => b,
		Err(e) => return error_response(e),
	};
	let patterns = [query.pattern.clone()];
	let job = Job {
		patterns: &patterns,
		bounds,
		count: query.count.unwrap_or(1),
		seed: query.seed,
		options: SyntaxOptions::default(),
	};

	match job.run() {
		Ok(values) => HttpResponse::Ok().body(values.join("\n")),
		Err(e) => error_response(e),
	}
}

/// HTTP POST endpoint `/v1/generate`
///
/// Accepts several patterns and syntax options as JSON, answers with JSON.
#[post("/v1/generate")]
async fn post_generated(request: web::Json<GenerateRequest>) -> impl Responder {
	let bounds = match LengthBounds::new(request.min_length, request.max_length) {
		Ok(b) => b,
		Err(e) => return error_response(e),
	};
	let job = Job {
		patterns: &request.patterns,
		bounds,
		count: request.count.unwrap_or(1),
		seed: request.seed,
		options: request.options.clone(),
	};

	match job.run() {
		Ok(values) => HttpResponse::Ok().json(GenerateResponse { values }),
		Err(e) => error_response(e),
	}
}

#[get("/v1/health")]
async fn get_health() -> impl Responder {
	HttpResponse::Ok().body("ok")
}

/// Main entry point for the server.
///
/// Starts an Actix-web HTTP server exposing the generation endpoints.
///
/// # Notes
/// - The server binds to `RX_GEN_ADDR`, or 127.0.0.1:5000 by default.
/// - Log level is controlled by `RUST_LOG`.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let addr = std::env::var("RX_GEN_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_owned());
	info!("Listening on {}", addr);

	HttpServer::new(|| {
		App::new()
			.wrap(Cors::permissive())
			.service(get_generated)
			.service(post_generated)
			.service(get_health)
	})
		.bind(addr)?
		.run()
		.await
}
