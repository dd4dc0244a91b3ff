use super::{Token, END_OF_TEXT, PUNCTUATION};

/// Mis-transcribed quote and dash sequences, as they look once lowercased,
/// and their replacement.
const MOJIBAKE: [(&str, &str); 3] = [("ōć£", "\""), ("ōćø", "\""), ("ōćö", "—")];

/// Typographic double quotes folded into a straight quote.
const CURLY_QUOTES: [char; 2] = ['“', '”'];

/// Turns raw text into a flat sequence of tokens.
///
/// # Behavior
/// - Lowercases the whole text and turns line breaks into spaces.
/// - Replaces known mis-transcribed quotes and dashes.
/// - Inserts a space before every punctuation mark so it splits into its
///   own token. Nothing is inserted after it: `"hello` stays one token.
/// - Splits on spaces, drops empty strings and appends `END_OF_TEXT`.
pub fn tokenize(raw_text: &str) -> Vec<Token> {
	let mut text = raw_text.to_lowercase().replace(['\n', '\r'], " ");

	for (broken, fixed) in MOJIBAKE {
		text = text.replace(broken, fixed);
	}
	text = text.replace(CURLY_QUOTES, "\"");

	let mut spaced = String::with_capacity(text.len() + text.len() / 8);
	for c in text.chars() {
		if PUNCTUATION.contains(&c) {
			spaced.push(' ');
		}
		spaced.push(c);
	}

	let mut tokens: Vec<Token> = spaced
		.split(' ')
		.filter(|token| !token.is_empty())
		.map(str::to_owned)
		.collect();
	tokens.push(END_OF_TEXT.to_owned());
	tokens
}
