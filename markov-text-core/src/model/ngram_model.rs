use std::collections::HashMap;
use std::ops::Range;
use std::sync::mpsc;
use std::thread;

use rand::Rng;
use rand::seq::IndexedRandom;

use super::state::State;
use super::{is_end_punctuation, Token};
use crate::error::{MarkovError, Result};

/// Number of chunks handed out per CPU when building in parallel.
const CHUNKS_PER_CPU: usize = 8;

/// Represents a word-level n-gram model: the probability table.
///
/// The `NGramModel` stores one state per distinct n-gram seen in the
/// training tokens and allows probabilistic prediction of the next token.
///
/// # Responsibilities
/// - Build the table from a token sequence (in parallel)
/// - Accumulate transition counts for each state
/// - Track which n-grams start a sentence
/// - Predict the next token given an n-gram
/// - Merge with another n-gram model of the same order `n`
///
/// # Invariants
/// - `n` is always >= 1
/// - Each state in `states` corresponds to a unique n-gram of length `n`
/// - Every state has at least one transition
/// - `starts` is sorted and lists exactly the sentence-starting keys
#[derive(Clone, Debug, Default)]
pub struct NGramModel {
	/// The order of the model (number of tokens in the n-gram)
	n: usize,

	/// Mapping from an n-gram to its corresponding state
	states: HashMap<Vec<Token>, State>,

	/// Sentence-starting n-grams, sorted so seeded draws are reproducible
	starts: Vec<Vec<Token>>,
}

impl NGramModel {
	/// Builds the table from a token sequence, using one worker per chunk
	/// (`num_cpus * 8` chunks at most).
	///
	/// # Errors
	/// - `InvalidConfig` if `n == 0`.
	/// - `InsufficientData` if `n >= tokens.len()`: no observation can be formed.
	pub fn build(tokens: &[Token], n: usize) -> Result<Self> {
		Self::build_with_workers(tokens, n, num_cpus::get() * CHUNKS_PER_CPU)
	}

	/// Same as [`NGramModel::build`] with an explicit number of workers.
	///
	/// # Behavior
	/// - Splits the observation indices `0..tokens.len() - n` into `workers` chunks.
	/// - Spawns a thread per chunk building a partial model.
	/// - Merges all partial models; the result does not depend on `workers`.
	pub fn build_with_workers(tokens: &[Token], n: usize, workers: usize) -> Result<Self> {
		if n == 0 {
			return Err(MarkovError::InvalidConfig("num_grams must be >= 1".to_owned()));
		}
		if n >= tokens.len() {
			return Err(MarkovError::InsufficientData { tokens: tokens.len(), num_grams: n });
		}

		let observations = tokens.len() - n;
		let workers = workers.clamp(1, observations);
		let chunk_size = observations.div_ceil(workers);
		log::debug!("building {n}-gram table: {observations} observations, {workers} workers");

		let partial_models: Vec<Self> = thread::scope(|scope| {
			let (tx, rx) = mpsc::channel();
			for start in (0..observations).step_by(chunk_size) {
				let tx = tx.clone();
				let end = (start + chunk_size).min(observations);

				scope.spawn(move || {
					let partial_model = Self::observe(tokens, n, start..end);
					// The receiver outlives every worker of the scope
					tx.send(partial_model).expect("Failed to send from thread");
				});
			}
			drop(tx);
			rx.iter().collect()
		});

		let mut final_model = Self::empty(n);
		for partial_model in &partial_models {
			final_model.merge_states(partial_model).map_err(MarkovError::InvalidConfig)?;
		}
		final_model.index_starts();

		Ok(final_model)
	}

	fn empty(n: usize) -> Self {
		Self { n, states: HashMap::new(), starts: Vec::new() }
	}

	/// Records the observations of `indices` into a new partial model.
	///
	/// The n-gram at index 0 always starts a sentence: a text begins with one.
	fn observe(tokens: &[Token], n: usize, indices: Range<usize>) -> Self {
		let mut model = Self::empty(n);

		for i in indices {
			let key = &tokens[i..i + n];
			let next_token = &tokens[i + n];
			let sentence_start = i == 0 || is_end_punctuation(&tokens[i - 1]);

			match model.states.get_mut(key) {
				Some(state) => state.add_transition(next_token, sentence_start),
				None => {
					let mut state = State::new(key);
					state.add_transition(next_token, sentence_start);
					model.states.insert(key.to_vec(), state);
				}
			}
		}

		model
	}

	/// Rebuilds the sorted list of sentence-starting n-grams.
	fn index_starts(&mut self) {
		self.starts = self
			.states
			.values()
			.filter(|state| state.is_sentence_start())
			.map(|state| state.key().to_vec())
			.collect();
		self.starts.sort();
	}

	/// Order of the model.
	pub fn n(&self) -> usize {
		self.n
	}

	/// Number of distinct n-grams.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	/// Iterates over every distinct n-gram of the table.
	pub fn ngrams(&self) -> impl Iterator<Item = &[Token]> {
		self.states.keys().map(Vec::as_slice)
	}

	/// Returns the candidate next tokens of `key` with their probabilities,
	/// or `None` if `key` is unknown.
	pub fn transitions(&self, key: &[Token]) -> Option<Vec<(&str, f64)>> {
		Some(self.states.get(key)?.probabilities().collect())
	}

	/// Number of times `key` was observed during training.
	pub fn count(&self, key: &[Token]) -> usize {
		self.states.get(key).map_or(0, State::count)
	}

	/// Returns `true` if `key` was seen at the start of a sentence.
	pub fn is_sentence_start(&self, key: &[Token]) -> bool {
		self.states.get(key).is_some_and(State::is_sentence_start)
	}

	/// Sentence-starting n-grams, sorted.
	pub fn starting_ngrams(&self) -> &[Vec<Token>] {
		&self.starts
	}

	/// Returns a uniformly drawn sentence-starting n-gram.
	///
	/// Useful for starting a generation sequence.
	/// Returns `None` if no n-gram starts a sentence.
	pub fn random_seed<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&[Token]> {
		self.starts.choose(rng).map(Vec::as_slice)
	}

	/// Predicts the next token given an n-gram.
	///
	/// Returns `None` if the n-gram is unknown.
	pub fn predict<R: Rng + ?Sized>(&self, key: &[Token], rng: &mut R) -> Option<&str> {
		self.states.get(key)?.predict(rng)
	}

	/// Merges another n-gram model into this one.
	///
	/// # Notes
	/// - Both models must have the same order `n`.
	/// - Occurrence counts for matching states and transitions are summed.
	///
	/// # Errors
	/// Returns an error if the model orders do not match.
	pub fn merge(&mut self, other: &Self) -> std::result::Result<(), String> {
		self.merge_states(other)?;
		self.index_starts();
		Ok(())
	}

	/// Sums the states of `other` into this model without re-indexing the
	/// sentence starts.
	fn merge_states(&mut self, other: &Self) -> std::result::Result<(), String> {
		if self.n != other.n {
			return Err(format!("N mismatch: {} != {}", self.n, other.n));
		}

		for (key, state) in &other.states {
			if let Some(existing) = self.states.get_mut(key) {
				existing.merge(state)?;
			} else {
				self.states.insert(key.clone(), state.clone());
			}
		}

		Ok(())
	}

	/// Drops the state of `key`, leaving a table with a dangling successor.
	#[cfg(test)]
	pub(crate) fn remove_state(&mut self, key: &[Token]) {
		self.states.remove(key);
		self.index_starts();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::model::tokenizer::tokenize;
	use crate::model::END_OF_TEXT;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn key(tokens: &[&str]) -> Vec<Token> {
		tokens.iter().map(|t| t.to_string()).collect()
	}

	fn sorted(mut transitions: Vec<(&str, f64)>) -> Vec<(String, f64)> {
		transitions.sort_by(|a, b| a.0.cmp(b.0));
		transitions.into_iter().map(|(t, p)| (t.to_owned(), p)).collect()
	}

	#[test]
	fn test_unigram_example() {
		let tokens = tokenize("The cat sat. The dog ran.");
		let model = NGramModel::build(&tokens, 1).unwrap();

		assert_eq!(
			sorted(model.transitions(&key(&["the"])).unwrap()),
			vec![("cat".to_owned(), 0.5), ("dog".to_owned(), 0.5)]
		);
		assert_eq!(sorted(model.transitions(&key(&["sat"])).unwrap()), vec![(".".to_owned(), 1.0)]);
		assert_eq!(sorted(model.transitions(&key(&["ran"])).unwrap()), vec![(".".to_owned(), 1.0)]);
		assert_eq!(model.starting_ngrams(), &[key(&["the"])]);
		assert_eq!(model.count(&key(&["the"])), 2);
	}

	#[test]
	fn test_sentinel_only_as_next_token() {
		let tokens = tokenize("One two. Three four.");
		let model = NGramModel::build(&tokens, 2).unwrap();

		assert!(model.ngrams().all(|ngram| !ngram.iter().any(|t| t == END_OF_TEXT)));
		assert_eq!(
			sorted(model.transitions(&key(&["four", "."])).unwrap()),
			vec![(END_OF_TEXT.to_owned(), 1.0)]
		);
	}

	#[test]
	fn test_first_ngram_starts_a_sentence() {
		let tokens = tokenize("no punctuation at all here");
		let model = NGramModel::build(&tokens, 2).unwrap();
		assert_eq!(model.starting_ngrams(), &[key(&["no", "punctuation"])]);
	}

	#[test]
	fn test_sentence_start_after_every_end_mark() {
		let tokens = tokenize("Go now! Why not? Fine. Done");
		let model = NGramModel::build(&tokens, 1).unwrap();
		assert_eq!(
			model.starting_ngrams(),
			&[key(&["done"]), key(&["fine"]), key(&["go"]), key(&["why"])]
		);
		assert!(!model.is_sentence_start(&key(&["now"])));
	}

	#[test]
	fn test_insufficient_data() {
		let tokens = tokenize("hello");
		match NGramModel::build(&tokens, 2) {
			Err(MarkovError::InsufficientData { tokens, num_grams }) => {
				assert_eq!(tokens, 2);
				assert_eq!(num_grams, 2);
			}
			other => panic!("unexpected result: {other:?}"),
		}
	}

	#[test]
	fn test_zero_grams_is_invalid() {
		let tokens = tokenize("hello world");
		assert!(matches!(NGramModel::build(&tokens, 0), Err(MarkovError::InvalidConfig(_))));
	}

	#[test]
	fn test_worker_count_does_not_change_result() {
		let text = "The cat sat on the mat. The dog sat on the log! Did the cat see the dog? \
			The cat did. The dog did not, and the mat was empty.";
		let tokens = tokenize(text);
		let reference = NGramModel::build_with_workers(&tokens, 2, 1).unwrap();

		for workers in [2, 3, 7, 64, 1000] {
			let model = NGramModel::build_with_workers(&tokens, 2, workers).unwrap();
			assert_eq!(model.len(), reference.len());
			assert_eq!(model.starting_ngrams(), reference.starting_ngrams());
			for ngram in reference.ngrams() {
				assert_eq!(model.transitions(ngram), reference.transitions(ngram));
				assert_eq!(model.count(ngram), reference.count(ngram));
			}
		}
	}

	#[test]
	fn test_random_seed_is_a_start() {
		let tokens = tokenize("A b. C d. E f.");
		let model = NGramModel::build(&tokens, 2).unwrap();
		let mut rng = StdRng::seed_from_u64(3);
		for _ in 0..20 {
			let seed = model.random_seed(&mut rng).unwrap();
			assert!(model.is_sentence_start(seed));
		}
	}

	#[test]
	fn test_merge_indexes_starts() {
		let mut model = NGramModel::build(&tokenize("Go home. Stay here."), 1).unwrap();
		let other = NGramModel::build(&tokenize("Run away! Come back."), 1).unwrap();
		model.merge(&other).unwrap();
		assert_eq!(
			model.starting_ngrams(),
			&[key(&["come"]), key(&["go"]), key(&["run"]), key(&["stay"])]
		);
	}

	#[test]
	fn test_merge_order_mismatch() {
		let mut one = NGramModel::build(&tokenize("a b c"), 1).unwrap();
		let two = NGramModel::build(&tokenize("a b c"), 2).unwrap();
		assert!(one.merge(&two).is_err());
	}
}
