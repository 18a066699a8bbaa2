//! Token budgeting for text sent to the LLM.
//!
//! Counts use the `cl100k_base` encoding, which is the GPT-4 tokenizer.

use tiktoken_rs::CoreBPE;

use crate::core::error::{AppError, Result};

/// How extracted text and the incident narrative are bounded before prompting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenPolicy {
    /// Cut every text to at most this many tokens
    Capped(usize),
    /// Pass text through untouched
    Uncapped,
}

pub struct Tokenizer {
    bpe: CoreBPE,
}

impl Tokenizer {
    pub fn new() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base()
            .map_err(|e| AppError::Internal(format!("Failed to load tokenizer: {}", e)))?;
        Ok(Self { bpe })
    }

    pub fn count_tokens(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }

    /// Truncate `text` to `max_tokens` tokens.
    ///
    /// Text at or under the budget is returned unchanged. When the cut would
    /// split a multi-byte character the prefix is shortened until it decodes.
    pub fn truncate(&self, text: &str, max_tokens: usize) -> String {
        let tokens = self.bpe.encode_with_special_tokens(text);
        if tokens.len() <= max_tokens {
            return text.to_string();
        }

        let mut end = max_tokens;
        while end > 0 {
            match self.bpe.decode(tokens[..end].to_vec()) {
                Ok(decoded) => return decoded,
                Err(_) => end -= 1,
            }
        }
        String::new()
    }

    /// Apply a [`TokenPolicy`] to `text`
    pub fn apply(&self, policy: TokenPolicy, text: &str) -> String {
        match policy {
            TokenPolicy::Capped(max_tokens) => self.truncate(text, max_tokens),
            TokenPolicy::Uncapped => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_text() -> String {
        "The quick brown fox jumps over the lazy dog. ".repeat(400)
    }

    #[test]
    fn test_truncate_cuts_to_exact_budget() {
        let tokenizer = Tokenizer::new().unwrap();
        let text = long_text();
        assert!(tokenizer.count_tokens(&text) > 1000);

        let truncated = tokenizer.truncate(&text, 1000);
        assert_eq!(tokenizer.count_tokens(&truncated), 1000);
        assert!(text.starts_with(&truncated));
    }

    #[test]
    fn test_truncate_short_text_unchanged() {
        let tokenizer = Tokenizer::new().unwrap();
        let text = "Rear-ended at a red light on Camelback Road.";
        assert_eq!(tokenizer.truncate(text, 1000), text);

        // Exactly at budget is also unchanged
        let budget = tokenizer.count_tokens(text);
        assert_eq!(tokenizer.truncate(text, budget), text);
    }

    #[test]
    fn test_truncate_is_idempotent() {
        let tokenizer = Tokenizer::new().unwrap();
        let once = tokenizer.truncate(&long_text(), 250);
        assert_eq!(tokenizer.truncate(&once, 250), once);
    }

    #[test]
    fn test_uncapped_policy_passes_through() {
        let tokenizer = Tokenizer::new().unwrap();
        let text = long_text();
        assert_eq!(tokenizer.apply(TokenPolicy::Uncapped, &text), text);
        assert_eq!(
            tokenizer.count_tokens(&tokenizer.apply(TokenPolicy::Capped(10), &text)),
            10
        );
    }
}
