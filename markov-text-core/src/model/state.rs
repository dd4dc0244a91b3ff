use std::collections::BTreeMap;

use rand::Rng;

use super::Token;

/// Represents a state in an n-gram model.
///
/// A `State` corresponds to one n-gram (`key`) and stores all observed
/// transitions from this n-gram to the next token.
///
/// Conceptually, this is a node in a Markov chain where outgoing edges
/// are weighted by their empirical probability.
///
/// ## Responsibilities:
/// - Accumulate transition occurrences during learning
/// - Remember whether the n-gram was seen at the start of a sentence
/// - Predict the next token using weighted random sampling
/// - Merge with another state having the same key (parallel learning support)
///
/// ## Invariants
/// - All transitions belong to the same `key`
/// - Each transition occurrence count is strictly positive
/// - Each next token has exactly one transition entry
#[derive(Clone, Debug, PartialEq)]
pub struct State {
	/// Identifier of the state (the n-gram itself).
	key: Vec<Token>,
	/// Outgoing transitions indexed by the next token.
	/// The value represents how many times this transition was observed.
	/// Example: { "cat" => 42, "dog" => 3 }
	transitions: BTreeMap<Token, usize>,
	/// Total number of observations of `key`.
	total: usize,
	/// Set once any observation of `key` directly followed end punctuation.
	sentence_start: bool,
}

impl State {
	/// Creates a new empty state for the given n-gram.
	pub fn new(key: &[Token]) -> Self {
		Self {
			key: key.to_vec(),
			transitions: BTreeMap::new(),
			total: 0,
			sentence_start: false,
		}
	}

	/// Records an occurrence of a transition toward `next_token`.
	///
	/// - If the transition already exists, its occurrence count is increased.
	/// - Otherwise, a new transition is created with an initial count of 1.
	pub fn add_transition(&mut self, next_token: &str, sentence_start: bool) {
		match self.transitions.get_mut(next_token) {
			Some(occurrence) => *occurrence += 1,
			None => {
				self.transitions.insert(next_token.to_owned(), 1);
			}
		}
		self.total += 1;
		self.sentence_start |= sentence_start;
	}

	pub fn key(&self) -> &[Token] {
		&self.key
	}

	pub fn is_sentence_start(&self) -> bool {
		self.sentence_start
	}

	/// Total number of observations of this n-gram.
	pub fn count(&self) -> usize {
		self.total
	}

	/// Returns each next token with its empirical probability
	/// `count(key, token) / count(key)`, ordered by token.
	pub fn probabilities(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
		let total = self.total as f64;
		self.transitions
			.iter()
			.map(move |(token, occurrence)| (token.as_str(), *occurrence as f64 / total))
	}

	/// Predicts the next token using weighted random sampling.
	///
	/// Probabilities are used as weights and do not need to sum to exactly
	/// 1.0: the draw is made against their actual sum.
	///
	/// Returns `None` if the state has no transitions.
	pub fn predict<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&str> {
		let weights: Vec<(&str, f64)> = self.probabilities().collect();
		let total: f64 = weights.iter().map(|(_, weight)| weight).sum();
		if total <= 0.0 {
			return None;
		}

		let mut r = rng.random_range(0.0..total);

		let mut fallback = None;
		for (token, weight) in weights {
			if r < weight {
				return Some(token);
			}
			r -= weight;
			fallback = Some(token);
		}

		// Rounding may leave `r` just above the last bucket.
		fallback
	}

	/// Merges another state into this one.
	///
	/// Both states must represent the same n-gram (`key`).
	/// Transition occurrence counts are summed and the sentence-start
	/// flags are combined.
	///
	/// # Errors
	/// Returns an error if the state keys do not match.
	pub fn merge(&mut self, other: &Self) -> Result<(), String> {
		if self.key != other.key {
			return Err(format!("Key mismatch: {:?} != {:?}", self.key, other.key));
		}

		for (next_token, occurrence) in &other.transitions {
			*self.transitions.entry(next_token.clone()).or_insert(0) += *occurrence;
		}
		self.total += other.total;
		self.sentence_start |= other.sentence_start;

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn key(tokens: &[&str]) -> Vec<Token> {
		tokens.iter().map(|t| t.to_string()).collect()
	}

	#[test]
	fn test_repeated_transition_keeps_one_entry() {
		let mut state = State::new(&key(&["the"]));
		state.add_transition("cat", false);
		state.add_transition("cat", false);
		state.add_transition("dog", true);

		let probabilities: Vec<_> = state.probabilities().collect();
		assert_eq!(probabilities.len(), 2);
		assert_eq!(probabilities[0].0, "cat");
		assert!((probabilities[0].1 - 2.0 / 3.0).abs() < 1e-12);
		assert_eq!(state.count(), 3);
		assert!(state.is_sentence_start());
	}

	#[test]
	fn test_predict_single_transition() {
		let mut state = State::new(&key(&["sat"]));
		state.add_transition(".", false);
		let mut rng = StdRng::seed_from_u64(7);
		for _ in 0..20 {
			assert_eq!(state.predict(&mut rng), Some("."));
		}
	}

	#[test]
	fn test_predict_empty_state() {
		let state = State::new(&key(&["nothing"]));
		assert_eq!(state.predict(&mut StdRng::seed_from_u64(1)), None);
	}

	#[test]
	fn test_predict_follows_weights() {
		let mut state = State::new(&key(&["a"]));
		for _ in 0..9 {
			state.add_transition("often", false);
		}
		state.add_transition("rarely", false);

		let mut rng = StdRng::seed_from_u64(42);
		let often = (0..2000).filter(|_| state.predict(&mut rng) == Some("often")).count();
		assert!(often > 1600 && often < 1990, "often drawn {often} times");
	}

	#[test]
	fn test_merge() {
		let mut left = State::new(&key(&["the"]));
		left.add_transition("cat", false);
		let mut right = State::new(&key(&["the"]));
		right.add_transition("cat", true);
		right.add_transition("dog", false);

		left.merge(&right).unwrap();
		assert_eq!(left.count(), 3);
		assert!(left.is_sentence_start());
		assert_eq!(left.probabilities().count(), 2);
	}

	#[test]
	fn test_merge_key_mismatch() {
		let mut left = State::new(&key(&["the"]));
		let right = State::new(&key(&["a"]));
		assert!(left.merge(&right).is_err());
	}
}
