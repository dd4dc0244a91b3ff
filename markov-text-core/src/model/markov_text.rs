use std::collections::HashMap;
use std::path::Path;

use rand::seq::IteratorRandom;

use super::generation_input::GenerationInput;
use super::trained_model::TrainedModel;
use crate::error::{MarkovError, Result};
use crate::io;

/// Extension of the corpora picked up by [`MarkovText::load_folder`].
pub const SOURCE_EXTENSION: &str = "txt";

/// Registry of named trained models.
///
/// # Responsibilities
/// - Train models from text files and keep them by name (file stem)
/// - Train every corpus of a folder at once
/// - Generate text from a given model, or from a randomly picked one
#[derive(Debug, Default)]
pub struct MarkovText {
	models: HashMap<String, TrainedModel>,
}

impl MarkovText {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Trains every `.txt` file of `folder` and registers the models.
	///
	/// # Errors
	/// - `SourceRead` if the folder cannot be listed.
	/// - Any training error of one of the files (nothing is registered then).
	pub fn load_folder<P: AsRef<Path>>(folder: P, num_grams: usize) -> Result<Self> {
		let folder = io::normalize_folder(folder.as_ref());
		let mut registry = Self::new();

		for file in Self::available_sources(&folder)? {
			registry.train(folder.join(&file), num_grams)?;
		}

		Ok(registry)
	}

	/// Lists the corpora (file names) of `folder` that can be trained.
	pub fn available_sources<P: AsRef<Path>>(folder: P) -> Result<Vec<String>> {
		let folder = folder.as_ref();
		io::list_files(folder, SOURCE_EXTENSION)
			.map_err(|source| MarkovError::SourceRead { path: folder.to_path_buf(), source })
	}

	/// Trains a model on `path` and registers it under the file stem.
	///
	/// Re-training a name replaces the previous model.
	pub fn train<P: AsRef<Path>>(&mut self, path: P, num_grams: usize) -> Result<&TrainedModel> {
		self.insert(TrainedModel::train(path, num_grams)?)
	}

	/// Registers an already trained model.
	pub fn insert(&mut self, model: TrainedModel) -> Result<&TrainedModel> {
		let name = model.name().to_owned();
		if self.models.insert(name.clone(), model).is_some() {
			log::info!("replaced model '{name}'");
		}
		self.get(&name)
	}

	/// Returns the names of the trained models, sorted.
	pub fn model_names(&self) -> Vec<String> {
		let mut names: Vec<String> = self.models.keys().cloned().collect();
		names.sort();
		names
	}

	pub fn is_empty(&self) -> bool {
		self.models.is_empty()
	}

	/// Returns the model registered as `name`.
	///
	/// # Errors
	/// Returns `NotTrained` if no such model exists.
	pub fn get(&self, name: &str) -> Result<&TrainedModel> {
		self.models.get(name).ok_or_else(|| MarkovError::NotTrained(name.to_owned()))
	}

	/// Generates a text from the model `name`, or from a uniformly picked
	/// model when `name` is `None`.
	///
	/// # Errors
	/// - `NotTrained` if the model does not exist or nothing is trained.
	/// - Any generation error of the model.
	pub fn generate(&self, name: Option<&str>, input: &GenerationInput) -> Result<String> {
		let model = match name {
			Some(name) => self.get(name)?,
			None => {
				let mut rng = input.rng();
				let mut models: Vec<&TrainedModel> = self.models.values().collect();
				models.sort_by(|a, b| a.name().cmp(b.name()));
				models
					.into_iter()
					.choose(&mut rng)
					.ok_or_else(|| MarkovError::NotTrained("<any>".to_owned()))?
			}
		};
		model.generate(input)
	}
}
