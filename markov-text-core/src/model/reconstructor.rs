use std::sync::LazyLock;

use regex::Regex;

use super::{Token, PUNCTUATION};

const END_MARKS: [char; 3] = ['.', '!', '?'];

/// A quote directly followed by a letter or digit.
static OPENING_QUOTE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r#""[\p{L}\p{N}]"#).ok());

/// A quote directly preceded by a non-whitespace character.
static CLOSING_QUOTE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r#"\S""#).ok());

fn matches(regex: &LazyLock<Option<Regex>>, text: &str) -> bool {
	regex.as_ref().is_some_and(|re| re.is_match(text))
}

/// Which side of a quoted passage a lone quote sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteSide {
	Opening,
	Closing,
}

/// Joins generated tokens back into prose.
///
/// # Behavior
/// - Joins with single spaces and glues punctuation back onto the
///   preceding word (`"this , and"` → `"this, and"`). Quotes included:
///   `said "hello` becomes `said"hello`.
/// - Balances a single stray `"` (see [`balance_quote`]).
/// - Capitalizes the first letter.
pub fn reconstruct(tokens: &[Token]) -> String {
	let mut text = tokens.join(" ");

	for mark in PUNCTUATION {
		text = text.replace(&format!(" {mark}"), &mark.to_string());
	}

	capitalize(&balance_quote(text))
}

/// Adds the missing half of a lone double quote.
///
/// - Opening quote: a closing quote goes right after the first end
///   punctuation mark following it, or at the very end.
/// - Closing quote: an opening quote goes right before the last end
///   punctuation mark preceding it, or at the very beginning.
///
/// Zero, two or more quotes are left as they are. A lone quote that is
/// neither opening nor closing is logged and left unbalanced.
pub fn balance_quote(text: String) -> String {
	if text.matches('"').count() != 1 {
		return text;
	}
	let Some(quote) = text.find('"') else {
		return text;
	};

	let side = if matches(&OPENING_QUOTE, &text) {
		QuoteSide::Opening
	} else if matches(&CLOSING_QUOTE, &text) {
		QuoteSide::Closing
	} else {
		log::warn!("cannot tell which side of a quotation this quote is on: {text:?}");
		return text;
	};

	let insert_position = match side {
		QuoteSide::Opening => text[quote..]
			.find(END_MARKS)
			.map_or(text.len(), |offset| quote + offset + 1),
		QuoteSide::Closing => text[..quote].rfind(END_MARKS).unwrap_or(0),
	};

	let mut balanced = text;
	balanced.insert(insert_position, '"');
	balanced
}

/// Uppercases the first letter of `text`, leaving the rest untouched.
fn capitalize(text: &str) -> String {
	match text.char_indices().find(|(_, c)| c.is_alphabetic()) {
		Some((index, c)) => format!("{}{}{}", &text[..index], c.to_uppercase(), &text[index + c.len_utf8()..]),
		None => text.to_owned(),
	}
}
