//! Text cleanup and chunking for speech requests.
//!
//! The endpoint accepts at most [`MAX_CHUNK_CHARS`] characters per request.
//! Longer text is split at punctuation first, then at spaces, and only cut
//! mid-word when a run of text has no spaces at all.

use crate::{Error, Result};

/// Maximum number of characters sent in a single request.
pub const MAX_CHUNK_CHARS: usize = 100;

/// Punctuation that ends a token and is kept with it.
const TONE_MARKS: &[char] = &['?', '!', '？', '！'];

/// Punctuation that ends a token and is dropped.
const SEPARATORS: &[char] = &[
    '¡', '¿', '(', ')', '[', ']', '…', '‥', '،', ';', ':', '—', '。', '，', '、', '：', '\n',
];

/// Splits `text` into request-sized chunks.
///
/// Fails with [`Error::InvalidInput`] when the text is empty or contains only
/// punctuation and whitespace.
pub fn chunks(text: &str) -> Result<Vec<String>> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::invalid_input("No text to speak"));
    }

    let text = text.replace("-\n", "");

    let chunks: Vec<String> = if text.chars().count() <= MAX_CHUNK_CHARS {
        clean(vec![text])
    } else {
        clean(tokenize(&text))
            .iter()
            .flat_map(|token| minimize(token, MAX_CHUNK_CHARS))
            .filter(|chunk| !chunk.is_empty())
            .collect()
    };

    if chunks.is_empty() {
        return Err(Error::invalid_input("No text to send to TTS API"));
    }

    Ok(chunks)
}

/// Splits at sentence and clause punctuation.
fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if TONE_MARKS.contains(&c) {
            current.push(c);
            tokens.push(std::mem::take(&mut current));
        } else if SEPARATORS.contains(&c) {
            tokens.push(std::mem::take(&mut current));
        } else if matches!(c, '.' | ',') && !chars.peek().is_some_and(char::is_ascii_digit) {
            tokens.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }

    tokens.push(current);
    tokens
}

/// Trims tokens and drops the ones without speakable characters.
fn clean(tokens: Vec<String>) -> Vec<String> {
    tokens
        .into_iter()
        .map(|token| token.trim().to_string())
        .filter(|token| token.chars().any(char::is_alphanumeric))
        .collect()
}

/// Splits a token into pieces of at most `max` characters at spaces.
fn minimize(token: &str, max: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest = token;

    loop {
        rest = rest.strip_prefix(' ').unwrap_or(rest);

        let limit = match rest.char_indices().nth(max) {
            Some((index, _)) => index,
            None => {
                pieces.push(rest.to_string());
                return pieces;
            }
        };

        let split = match rest[..limit].rfind(' ') {
            Some(index) if index > 0 => index,
            _ => limit,
        };

        pieces.push(rest[..split].to_string());
        rest = &rest[split..];
    }
}
