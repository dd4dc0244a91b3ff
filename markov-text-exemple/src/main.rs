use std::env;

use markov_text_core::model::DEFAULT_NUM_GRAMS;
use markov_text_core::{GenerationInput, MarkovError, MarkovText};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Usage: markov-text-exemple [corpus.txt] [num_grams]
    let mut args = env::args().skip(1);
    let corpus = args.next().unwrap_or_else(|| "./data/corpus.txt".to_owned());
    let num_grams = match args.next() {
        Some(n) => n.parse()?,
        None => DEFAULT_NUM_GRAMS,
    };

    // Train a model on the corpus; the model is named after the file
    let mut app = MarkovText::new();
    let name = app.train(&corpus, num_grams)?.name().to_owned();
    println!("Trained '{}' ({}-grams)", name, num_grams);

    // Generating from a model that was never trained is an error
    match app.generate(Some("unknown"), &GenerationInput::new()) {
        Err(MarkovError::NotTrained(_)) => println!("Model 'unknown' has not been trained"),
        _ => println!("Should not happen"),
    }

    // A budget of 0 tokens is invalid
    let mut input = GenerationInput::new();
    match input.set_max_tokens(0) {
        Ok(_) => println!("Should not happen"),
        Err(_) => println!("max_tokens 0 is invalid, must be > 0"),
    }

    // Without max_tokens, each call draws its own budget in [10, 40)
    for i in 0..5 {
        println!("Generated text {}: {}", i + 1, app.generate(Some(&name), &input)?);
    }

    // With a seed and a budget, the output is reproducible
    input.set_max_tokens(30)?;
    input.seed = Some(42);
    let first = app.generate(Some(&name), &input)?;
    let second = app.generate(Some(&name), &input)?;
    println!("Seeded text: {}", first);
    println!("Same seed, same text: {}", first == second);

    // The probability table can be inspected through the model summary
    println!("{:?}", app.get(&name)?.summary());

    Ok(())
}
