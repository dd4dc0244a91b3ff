use std::env;
use std::path::PathBuf;
use std::sync::RwLock;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};

use serde::Deserialize;
use markov_text_core::model::markov_text::SOURCE_EXTENSION;
use markov_text_core::model::DEFAULT_NUM_GRAMS;
use markov_text_core::{GenerationInput, MarkovError, MarkovText, TrainedModel};

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	model: Option<String>, // none -> any loaded model
	max_tokens: Option<usize>,
	seed: Option<u64>
}

/// Struct representing query parameters for the `/v1/train` endpoint
#[derive(Deserialize)]
struct TrainQuery {
	names: Option<String>,
	num_grams: Option<usize>
}

/// Server settings, read from the environment.
#[derive(Clone, Debug)]
struct ServerConfig {
	/// `MARKOV_TEXT_BIND`, defaults to `127.0.0.1:5000`
	bind: String,
	/// `MARKOV_TEXT_DATA`, defaults to `./data`
	data_folder: PathBuf,
}

impl ServerConfig {
	fn from_env() -> Self {
		Self {
			bind: env::var("MARKOV_TEXT_BIND").unwrap_or_else(|_| "127.0.0.1:5000".to_owned()),
			data_folder: env::var("MARKOV_TEXT_DATA").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("./data")),
		}
	}
}

struct SharedData {
	registry: RwLock<MarkovText>,
	config: ServerConfig
}

impl GenerateParams {
	/// Builds the generation settings from the query.
	fn generation_input(&self) -> Result<GenerationInput, MarkovError> {
		let mut input = GenerationInput::new();
		if let Some(max_tokens) = self.max_tokens {
			input.set_max_tokens(max_tokens)?;
		}
		input.seed = self.seed;
		Ok(input)
	}
}

/// Maps a core error to the matching HTTP response.
fn error_response(error: &MarkovError) -> HttpResponse {
	let body = match error {
		MarkovError::SourceRead { source, .. } => format!("{error}: {source}"),
		_ => error.to_string(),
	};
	match error {
		MarkovError::InvalidConfig(_) | MarkovError::InsufficientData { .. } => HttpResponse::BadRequest().body(body),
		MarkovError::NotTrained(_) | MarkovError::SourceRead { .. } => HttpResponse::NotFound().body(body),
		MarkovError::EmptyModel | MarkovError::LookupConsistency(_) => {
			log::error!("generation failed: {body}");
			HttpResponse::InternalServerError().body(body)
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates a text from a trained model based on query parameters.
/// Returns the generated text as the response body.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<SharedData>, query: web::Query<GenerateParams>) -> impl Responder {
	let input = match query.generation_input() {
		Ok(input) => input,
		Err(e) => return error_response(&e)
	};

	let registry = match data.registry.read() {
		Ok(r) => r,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match registry.generate(query.model.as_deref(), &input) {
		Ok(result) => HttpResponse::Ok().body(result),
		Err(e) => error_response(&e),
	}
}

/// Lists the corpora of the data folder that can be trained.
#[get("/v1/models")]
async fn get_models(data: web::Data<SharedData>) -> impl Responder {
	match MarkovText::available_sources(&data.config.data_folder) {
		Ok(files) => {
			let suffix = format!(".{SOURCE_EXTENSION}");
			let names: Vec<&str> = files.iter().map(|f| f.trim_end_matches(suffix.as_str())).collect();
			HttpResponse::Ok().body(names.join("\n"))
		}
		Err(e) => error_response(&e)
	}
}

#[get("/v1/loaded_models")]
async fn get_loaded_models(data: web::Data<SharedData>) -> impl Responder {
	let registry = match data.registry.read() {
		Ok(r) => r,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().body(registry.model_names().join("\n"))
}

/// Returns a JSON summary of a trained model.
#[get("/v1/models/{name}")]
async fn get_model_summary(data: web::Data<SharedData>, name: web::Path<String>) -> impl Responder {
	let registry = match data.registry.read() {
		Ok(r) => r,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match registry.get(&name) {
		Ok(model) => HttpResponse::Ok().json(model.summary()),
		Err(e) => error_response(&e)
	}
}

/// HTTP PUT endpoint `/v1/train`
///
/// Trains the named corpora of the data folder and registers them.
/// Training runs on the blocking pool; the registry is only locked to
/// insert the finished models.
#[put("/v1/train")]
async fn put_train(data: web::Data<SharedData>, query: web::Query<TrainQuery>) -> impl Responder {
	let query_names = match &query.names {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty model name"),
	};
	let num_grams = query.num_grams.unwrap_or(DEFAULT_NUM_GRAMS);

	let paths: Vec<PathBuf> = query_names
		.split(',')
		.map(|s| s.trim())
		.filter(|s| !s.is_empty())
		.map(|name| data.config.data_folder.join(format!("{name}.{SOURCE_EXTENSION}")))
		.collect();

	let trained = web::block(move || {
		paths
			.iter()
			.map(|path| TrainedModel::train(path, num_grams))
			.collect::<Result<Vec<_>, _>>()
	})
	.await;

	let models = match trained {
		Ok(Ok(models)) => models,
		Ok(Err(e)) => return error_response(&e),
		Err(_) => return HttpResponse::InternalServerError().body("Training task failed"),
	};

	let mut registry = match data.registry.write() {
		Ok(r) => r,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	for model in models {
		if let Err(e) = registry.insert(model) {
			return error_response(&e);
		}
	}

	HttpResponse::Ok().body("Models trained successfully")
}

/// Main entry point for the server.
///
/// Trains every corpus of the data folder (if any), shares the registry
/// behind a `RwLock` and starts an Actix-web HTTP server.
///
/// # Notes
/// - Generation only takes a read lock, concurrent requests do not wait
///   on each other.
/// - A data folder that cannot be loaded is logged and the server starts
///   with no model.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let config = ServerConfig::from_env();
	let registry = match MarkovText::load_folder(&config.data_folder, DEFAULT_NUM_GRAMS) {
		Ok(registry) => registry,
		Err(e) => {
			log::warn!("starting without models: {e}");
			MarkovText::new()
		}
	};
	log::info!("loaded models: {:?}", registry.model_names());

	let bind = config.bind.clone();
	let shared_data = web::Data::new(SharedData {
		registry: RwLock::new(registry),
		config,
	});

	log::info!("listening on {bind}");
	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.wrap(Cors::default().allow_any_origin().allowed_methods(vec!["GET", "PUT"]))
			.app_data(shared_data.clone())
			.service(get_generated)
			.service(get_models)
			.service(get_loaded_models)
			.service(get_model_summary)
			.service(put_train)
	})
		.bind(bind)?
		.run()
		.await
}
