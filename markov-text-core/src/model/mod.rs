//! Top-level module for the Markov text generation system.
//!
//! This module provides a word-level n-gram generator, including:
//! - Corpus tokenization (`tokenizer`)
//! - The n-gram probability table (`NGramModel`)
//! - Internal per-n-gram state management (`State`)
//! - The weighted random walk (`generator`)
//! - Prose reconstruction of generated tokens (`reconstructor`)
//! - Trained models and a registry of them (`TrainedModel`, `MarkovText`)
//! - Generation configuration (`GenerationInput`)

use std::ops::Range;

/// An atomic unit of text: a lowercase word, a punctuation mark or the end-of-text sentinel.
pub type Token = String;

/// Reserved token appended once at the end of every training sequence.
pub const END_OF_TEXT: &str = "|*END*OF*TEXT*|";

/// Punctuation marks that close a sentence.
pub const END_PUNCTUATION: [&str; 3] = [".", "!", "?"];

/// Punctuation marks split from the word they follow during tokenization.
pub const PUNCTUATION: [char; 8] = [',', '.', '!', '?', ':', '—', '-', '"'];

/// Order of the model when the caller does not pick one.
pub const DEFAULT_NUM_GRAMS: usize = 2;

/// Range `max_tokens` is drawn from when a generation call does not set it.
pub const DEFAULT_MAX_TOKENS_RANGE: Range<usize> = 10..40;

/// Returns `true` if `token` closes a sentence.
pub(crate) fn is_end_punctuation(token: &str) -> bool {
	END_PUNCTUATION.contains(&token)
}

/// Splits raw text into tokens.
///
/// Lowercases, normalizes quotes, and separates punctuation from the word
/// before it. Always ends with `END_OF_TEXT`.
pub mod tokenizer;

/// Word-level n-gram probability table.
///
/// Handles observation counting over a token sequence (in parallel),
/// merging of partial tables and probabilistic next-token prediction.
pub mod ngram_model;

/// Internal representation of a single n-gram state.
///
/// Tracks outgoing transitions and supports weighted random sampling.
/// This module is not exposed publicly.
mod state;

/// Weighted random walk over a `NGramModel`.
pub mod generator;

/// Joins generated tokens back into prose.
pub mod reconstructor;

/// Immutable trained model: the result of a training run.
pub mod trained_model;

/// Registry of named trained models.
pub mod markov_text;

/// Per-call generation settings.
pub mod generation_input;
