// Chirp body validation and profanity masking

use crate::chirps::error::ChirpError;

/// Longest accepted chirp, counted in characters
pub const MAX_CHIRP_LENGTH: usize = 140;

const DENYLIST: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];
const MASK: &str = "****";

/// Replaces every whitespace-separated token that matches the denylist
/// (ignoring case) with a fixed mask. Tokens are re-joined with single spaces.
/// Punctuation is part of the token, so "sharbert!" is left alone.
pub fn mask_profanity(body: &str) -> String {
    body.split_whitespace()
        .map(|word| {
            let lowered = word.to_lowercase();
            if DENYLIST.contains(&lowered.as_str()) {
                MASK
            } else {
                word
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rejects over-long bodies and returns the masked text
pub fn clean_chirp_body(body: &str) -> Result<String, ChirpError> {
    if body.chars().count() > MAX_CHIRP_LENGTH {
        return Err(ChirpError::Validation("Chirp is too long".to_string()));
    }
    Ok(mask_profanity(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_masks_lowercase_word() {
        assert_eq!(
            mask_profanity("This is a kerfuffle opinion I need to share with the world"),
            "This is a **** opinion I need to share with the world"
        );
    }

    #[test]
    fn test_masks_case_insensitively() {
        assert_eq!(
            mask_profanity("This is a SHARBERT opinion I need to share with the world"),
            "This is a **** opinion I need to share with the world"
        );
        assert_eq!(mask_profanity("Fornax"), "****");
    }

    #[test]
    fn test_punctuation_prevents_match_and_whitespace_collapses() {
        assert_eq!(
            mask_profanity("This is a SHARBERT!    opinion I need to share with the world"),
            "This is a SHARBERT! opinion I need to share with the world"
        );
    }

    #[test]
    fn test_substrings_are_not_masked() {
        assert_eq!(mask_profanity("kerfuffles happen"), "kerfuffles happen");
    }

    #[test]
    fn test_length_boundary() {
        let at_limit = "a".repeat(MAX_CHIRP_LENGTH);
        assert_eq!(clean_chirp_body(&at_limit).unwrap(), at_limit);

        let over_limit = "a".repeat(MAX_CHIRP_LENGTH + 1);
        assert!(matches!(
            clean_chirp_body(&over_limit),
            Err(ChirpError::Validation(_))
        ));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 140 two-byte characters
        let body = "é".repeat(MAX_CHIRP_LENGTH);
        assert!(clean_chirp_body(&body).is_ok());
    }

    proptest! {
        #[test]
        fn prop_clean_words_pass_through(words in prop::collection::vec("[a-z]{1,8}", 1..10)) {
            prop_assume!(words.iter().all(|w| !DENYLIST.contains(&w.as_str())));
            let body = words.join(" ");
            prop_assert_eq!(mask_profanity(&body), body);
        }

        #[test]
        fn prop_denylisted_words_never_survive(
            prefix in "[0-9]{1,8}",
            index in 0usize..DENYLIST.len(),
            upper in any::<bool>()
        ) {
            let bad = if upper { DENYLIST[index].to_uppercase() } else { DENYLIST[index].to_string() };
            let masked = mask_profanity(&format!("{} {}", prefix, bad));
            prop_assert!(!masked.to_lowercase().contains(DENYLIST[index]));
            prop_assert!(masked.ends_with(MASK));
        }
    }
}
