use rand::Rng;

use super::ngram_model::NGramModel;
use super::{is_end_punctuation, Token, END_OF_TEXT};
use crate::error::{MarkovError, Result};

/// Performs a weighted random walk over `model`.
///
/// # Behavior
/// - Starts from a uniformly drawn sentence-starting n-gram.
/// - Appends up to `max_tokens` tokens, each drawn from the distribution of
///   the trailing n-gram of the sequence.
/// - Stops extending as soon as `END_OF_TEXT` enters the trailing window.
/// - Truncates after the last end punctuation mark (see [`truncate_at_sentence_end`]).
///
/// # Errors
/// - `EmptyModel` if no n-gram starts a sentence.
/// - `LookupConsistency` if the trailing window is not a key of the table.
pub fn generate<R: Rng + ?Sized>(model: &NGramModel, max_tokens: usize, rng: &mut R) -> Result<Vec<Token>> {
	let seed = model.random_seed(rng).ok_or(MarkovError::EmptyModel)?;
	let n = model.n();

	let mut generated: Vec<Token> = seed.to_vec();
	for _ in 0..max_tokens {
		let window = &generated[generated.len() - n..];
		if window.iter().any(|token| token == END_OF_TEXT) {
			break;
		}

		let next_token = model
			.predict(window, rng)
			.ok_or_else(|| MarkovError::LookupConsistency(window.to_vec()))?
			.to_owned();
		generated.push(next_token);
	}
	log::debug!("walked {} tokens (budget {max_tokens})", generated.len() - n);

	truncate_at_sentence_end(&mut generated);
	Ok(generated)
}

/// Cuts `tokens` right after its last end punctuation mark.
///
/// If there is none the sequence is kept whole. A trailing `END_OF_TEXT`
/// is always dropped.
pub fn truncate_at_sentence_end(tokens: &mut Vec<Token>) {
	if let Some(last_end) = tokens.iter().rposition(|token| is_end_punctuation(token)) {
		tokens.truncate(last_end + 1);
	}
	if tokens.last().is_some_and(|token| token == END_OF_TEXT) {
		tokens.pop();
	}
}
