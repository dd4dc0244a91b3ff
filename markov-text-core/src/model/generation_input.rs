use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::DEFAULT_MAX_TOKENS_RANGE;
use crate::error::{MarkovError, Result};

/// Input parameters for a single generation call.
///
/// # Fields
/// - `max_tokens`: token budget of the random walk. When `None`, a budget is
///   drawn once per call from `DEFAULT_MAX_TOKENS_RANGE`.
/// - `seed`: when set, the call uses a seeded RNG and is reproducible.
///
/// # Invariants
/// - `max_tokens`, when set, is strictly positive
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationInput {
	max_tokens: Option<usize>,
	pub seed: Option<u64>,
}

impl GenerationInput {
	/// Creates an input with a random budget and no seed.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the configured token budget, if any.
	pub fn max_tokens(&self) -> Option<usize> {
		self.max_tokens
	}

	/// Sets the token budget.
	///
	/// # Errors
	/// Returns an error if `max_tokens` is 0.
	pub fn set_max_tokens(&mut self, max_tokens: usize) -> Result<()> {
		if max_tokens == 0 {
			return Err(MarkovError::InvalidConfig("max_tokens must be > 0".to_owned()));
		}
		self.max_tokens = Some(max_tokens);
		Ok(())
	}

	/// Builds the RNG of the call: seeded when `seed` is set, from the OS otherwise.
	pub(crate) fn rng(&self) -> StdRng {
		match self.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		}
	}

	/// Returns the configured budget or draws one from `DEFAULT_MAX_TOKENS_RANGE`.
	pub(crate) fn resolve_max_tokens<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
		self.max_tokens
			.unwrap_or_else(|| rng.random_range(DEFAULT_MAX_TOKENS_RANGE))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_zero_max_tokens_rejected() {
		let mut input = GenerationInput::new();
		assert!(input.set_max_tokens(0).is_err());
		assert_eq!(input.max_tokens(), None);
		input.set_max_tokens(12).unwrap();
		assert_eq!(input.max_tokens(), Some(12));
	}

	#[test]
	fn test_default_budget_in_range() {
		let input = GenerationInput::new();
		let mut rng = StdRng::seed_from_u64(5);
		for _ in 0..200 {
			assert!(DEFAULT_MAX_TOKENS_RANGE.contains(&input.resolve_max_tokens(&mut rng)));
		}
	}

	#[test]
	fn test_seeded_rng_is_reproducible() {
		let input = GenerationInput { max_tokens: None, seed: Some(99) };
		let first: u64 = input.rng().random();
		let second: u64 = input.rng().random();
		assert_eq!(first, second);
	}
}
