//! Response Parsing Module
//!
//! Turns raw model text into JSON. Models tend to wrap JSON in markdown
//! fences or surround it with prose, so both are stripped before decoding.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::{AiError, Result};

// == Strip Fences ==
/// Removes markdown code fence markers and surrounding whitespace.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Upper bound on balanced objects tried before giving up on candidates.
const MAX_CANDIDATES: usize = 32;

// == Balanced Objects ==
/// Balanced `{...}` substrings in order of their opening brace.
///
/// Single forward pass with a stack of open positions. Braces inside JSON
/// string literals are ignored; quotes outside any object are prose and do
/// not open a string. Unclosed objects and stray `}` yield nothing.
fn object_candidates(text: &str) -> Vec<&str> {
    let mut open: Vec<usize> = Vec::new();
    let mut found: Vec<(usize, usize)> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (pos, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push(pos),
            '}' => {
                if let Some(start) = open.pop() {
                    found.push((start, pos + ch.len_utf8()));
                }
            }
            _ => {}
        }
    }

    found.sort_unstable_by_key(|(start, _)| *start);
    found
        .into_iter()
        .map(|(start, end)| &text[start..end])
        .collect()
}

// == Parse Response ==
/// Decodes model output as `T`.
///
/// Tries the first balanced object that decodes (up to a bounded number),
/// then the whole cleaned text. Any failure is an [`AiError::InvalidResponse`].
pub fn parse_response<T: DeserializeOwned>(text: &str) -> Result<T> {
    let cleaned = strip_code_fences(text);

    for candidate in object_candidates(&cleaned).into_iter().take(MAX_CANDIDATES) {
        if let Ok(value) = serde_json::from_str(candidate) {
            return Ok(value);
        }
    }

    serde_json::from_str(&cleaned).map_err(|err| {
        warn!("Failed to parse model response as JSON: {}", text);
        AiError::InvalidResponse(err.to_string())
    })
}
