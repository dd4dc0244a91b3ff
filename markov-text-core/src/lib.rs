//! Word-level n-gram Markov text generation library.
//!
//! This crate provides a small Markov chain text generator including:
//! - Tokenization of a raw corpus into words and punctuation marks
//! - A probability table mapping each n-gram to its observed next tokens
//! - A weighted random walk seeded from sentence-starting n-grams
//! - Reconstruction of generated tokens into readable prose
//!
//! Only the high-level API is exposed publicly. Low-level components
//! are kept internal to ensure consistency and prevent misuse.

/// Core n-gram models and generation logic.
pub mod model;

/// Error type shared by training and generation.
pub mod error;

/// I/O utilities (file loading, path helpers).
///
/// Not exposed
pub(crate) mod io;

pub use error::{MarkovError, Result};
pub use model::generation_input::GenerationInput;
pub use model::markov_text::MarkovText;
pub use model::trained_model::TrainedModel;
