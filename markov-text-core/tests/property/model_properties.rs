use std::collections::HashSet;

use markov_text_core::model::ngram_model::NGramModel;
use markov_text_core::model::tokenizer::tokenize;
use markov_text_core::model::{END_OF_TEXT, generator};
use markov_text_core::TrainedModel;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Sentences made of a small vocabulary so n-grams repeat often.
fn corpus() -> impl Strategy<Value = String> {
	prop::collection::vec(
		(prop::collection::vec("(the|a|cat|dog|sat|ran|on|mat|log|and)", 1..8), "[.!?,]"),
		1..12,
	)
	.prop_map(|sentences| {
		sentences
			.into_iter()
			.map(|(words, mark)| format!("{}{}", words.join(" "), mark))
			.collect::<Vec<_>>()
			.join(" ")
	})
}

proptest! {
	#[test]
	fn probabilities_sum_to_one(text in corpus(), n in 1usize..4) {
		let tokens = tokenize(&text);
		prop_assume!(n < tokens.len());
		let model = NGramModel::build(&tokens, n).unwrap();

		for ngram in model.ngrams() {
			let transitions = model.transitions(ngram).unwrap();
			prop_assert!(!transitions.is_empty());
			let sum: f64 = transitions.iter().map(|(_, p)| p).sum();
			prop_assert!((sum - 1.0).abs() < 1e-9, "sum {} for {:?}", sum, ngram);
			prop_assert!(transitions.iter().all(|(_, p)| *p > 0.0));
		}
	}

	#[test]
	fn each_observed_pair_has_one_entry(text in corpus(), n in 1usize..4) {
		let tokens = tokenize(&text);
		prop_assume!(n < tokens.len());
		let model = NGramModel::build(&tokens, n).unwrap();

		let observed: HashSet<(Vec<String>, String)> = (0..tokens.len() - n)
			.map(|i| (tokens[i..i + n].to_vec(), tokens[i + n].clone()))
			.collect();

		let mut entries = 0;
		for ngram in model.ngrams() {
			for (next_token, _) in model.transitions(ngram).unwrap() {
				prop_assert!(observed.contains(&(ngram.to_vec(), next_token.to_owned())));
				entries += 1;
			}
		}
		prop_assert_eq!(entries, observed.len());
	}

	#[test]
	fn generation_respects_budget(text in corpus(), max_tokens in 0usize..60, seed in any::<u64>()) {
		let tokens = tokenize(&text);
		let model = NGramModel::build(&tokens, 1).unwrap();
		let generated = generator::generate(&model, max_tokens, &mut StdRng::seed_from_u64(seed)).unwrap();

		prop_assert!(generated.len() <= max_tokens + 1);
		prop_assert!(!generated.iter().any(|t| t == END_OF_TEXT));
	}

	#[test]
	fn reconstructed_text_hides_sentinel(text in corpus(), seed in any::<u64>()) {
		let model = TrainedModel::from_text("prop", &text, 2);
		prop_assume!(model.is_ok());
		let model = model.unwrap();
		let generated = model.generate_with(30, &mut StdRng::seed_from_u64(seed)).unwrap();
		prop_assert!(!generated.contains(END_OF_TEXT));
	}
}
