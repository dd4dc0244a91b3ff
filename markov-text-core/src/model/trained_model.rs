use std::path::Path;

use rand::Rng;

use serde::Serialize;

use super::generation_input::GenerationInput;
use super::ngram_model::NGramModel;
use super::{generator, reconstructor, tokenizer, Token};
use crate::error::Result;
use crate::io::{get_filename, read_file};

/// The result of a training run: an immutable probability table and
/// the metadata of the corpus it was learned from.
///
/// Generation only reads the table, so a `TrainedModel` can be shared
/// between threads and used for concurrent generations, each with its
/// own RNG.
#[derive(Clone, Debug)]
pub struct TrainedModel {
	name: String,
	token_count: usize,
	table: NGramModel,
}

/// Serializable overview of a trained model.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ModelSummary {
	pub name: String,
	pub num_grams: usize,
	pub tokens: usize,
	pub ngrams: usize,
	pub starting_ngrams: usize,
}

impl TrainedModel {
	/// Trains a model on the text file at `path`.
	///
	/// The model is named after the file stem (`data/alice.txt` → `alice`).
	///
	/// # Errors
	/// - `SourceRead` if the file is missing, unreadable or empty.
	/// - `InvalidConfig` / `InsufficientData` from the table construction.
	pub fn train<P: AsRef<Path>>(path: P, num_grams: usize) -> Result<Self> {
		let text = read_file(&path)?;
		let name = get_filename(&path).unwrap_or_else(|_| path.as_ref().display().to_string());
		Self::from_text(name, &text, num_grams)
	}

	/// Trains a model on an in-memory corpus.
	pub fn from_text(name: impl Into<String>, text: &str, num_grams: usize) -> Result<Self> {
		let name = name.into();
		let tokens = tokenizer::tokenize(text);
		let table = NGramModel::build(&tokens, num_grams)?;

		log::info!(
			"trained '{name}': {} tokens, {} distinct {num_grams}-grams, {} sentence starts",
			tokens.len(),
			table.len(),
			table.starting_ngrams().len()
		);

		Ok(Self { name, token_count: tokens.len(), table })
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Number of tokens in the training sequence, `END_OF_TEXT` included.
	pub fn token_count(&self) -> usize {
		self.token_count
	}

	/// The probability table.
	pub fn table(&self) -> &NGramModel {
		&self.table
	}

	pub fn summary(&self) -> ModelSummary {
		ModelSummary {
			name: self.name.clone(),
			num_grams: self.table.n(),
			tokens: self.token_count,
			ngrams: self.table.len(),
			starting_ngrams: self.table.starting_ngrams().len(),
		}
	}

	/// Generates a text according to `input`.
	pub fn generate(&self, input: &GenerationInput) -> Result<String> {
		let mut rng = input.rng();
		let max_tokens = input.resolve_max_tokens(&mut rng);
		self.generate_with(max_tokens, &mut rng)
	}

	/// Generates a text with an explicit budget and RNG.
	pub fn generate_with<R: Rng + ?Sized>(&self, max_tokens: usize, rng: &mut R) -> Result<String> {
		let tokens = self.generate_tokens(max_tokens, rng)?;
		Ok(reconstructor::reconstruct(&tokens))
	}

	/// Runs the random walk and returns the truncated tokens, before
	/// reconstruction.
	pub fn generate_tokens<R: Rng + ?Sized>(&self, max_tokens: usize, rng: &mut R) -> Result<Vec<Token>> {
		generator::generate(&self.table, max_tokens, rng)
	}
}
