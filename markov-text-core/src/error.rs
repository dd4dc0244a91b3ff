//! Error types for training and generation

use std::io;
use std::path::PathBuf;

use crate::model::Token;

/// Errors that can occur while training a model or generating text from it.
#[derive(Debug, thiserror::Error)]
pub enum MarkovError {
	/// The training source is missing, unreadable or empty.
	#[error("failed to read training source '{}'", .path.display())]
	SourceRead {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// Too few tokens to form a single observation.
	#[error("not enough tokens ({tokens}) to build a {num_grams}-gram model")]
	InsufficientData { tokens: usize, num_grams: usize },

	#[error("model has no sentence-starting n-gram to seed generation")]
	EmptyModel,

	/// The trailing window of a generated sequence is not a key of the table.
	#[error("n-gram {0:?} is not present in the model")]
	LookupConsistency(Vec<Token>),

	#[error("model '{0}' has not been trained")]
	NotTrained(String),
}

pub type Result<T> = std::result::Result<T, MarkovError>;
