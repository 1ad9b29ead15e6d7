//! Identifier and placeholder conventions.
//!
//! Items are labelled with user-chosen identifiers ("Student A", "S-12") rather
//! than real names, and generated text carries a literal placeholder token the
//! user substitutes after export. Neither convention is enforced by default:
//! there is no PII detection here. `IdentifierPolicy::Strict` is an opt-in
//! heuristic that catches the most common slip (typing a full name).

use serde::{Deserialize, Serialize};

/// Literal token left in generated text for manual substitution.
pub const PLACEHOLDER_TOKEN: &str = "[Student Name]";

/// Longest identifier accepted under the strict policy.
pub const MAX_STRICT_IDENTIFIER_LEN: usize = 40;

/// Whether `text` still contains the placeholder token.
pub fn contains_placeholder(text: &str) -> bool {
    text.contains(PLACEHOLDER_TOKEN)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierPolicy {
    /// Any identifier, including a blank one.
    #[default]
    Permissive,
    /// Additionally rejects identifiers shaped like a personal name.
    Strict,
}

impl IdentifierPolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            IdentifierPolicy::Strict
        } else {
            IdentifierPolicy::Permissive
        }
    }

    /// Check one identifier. The error string is the rejection reason.
    pub fn check(&self, identifier: &str) -> Result<(), String> {
        if *self == IdentifierPolicy::Permissive {
            return Ok(());
        }
        let trimmed = identifier.trim();
        if trimmed.is_empty() {
            return Err("identifier cannot be empty".to_string());
        }
        if trimmed.chars().count() > MAX_STRICT_IDENTIFIER_LEN {
            return Err(format!(
                "identifier longer than {} characters",
                MAX_STRICT_IDENTIFIER_LEN
            ));
        }
        if looks_like_full_name(trimmed) {
            return Err(
                "identifier looks like a personal name; use a label such as 'Student A'"
                    .to_string(),
            );
        }
        Ok(())
    }
}

/// Two or more alphabetic words, each starting upper-case and continuing
/// lower-case. "Student A" passes: a single letter is not a name word.
fn looks_like_full_name(identifier: &str) -> bool {
    let words: Vec<&str> = identifier.split_whitespace().collect();
    if words.len() < 2 {
        return false;
    }
    words.iter().all(|word| {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) if first.is_uppercase() => {
                let rest: Vec<char> = chars.collect();
                !rest.is_empty()
                    && rest
                        .iter()
                        .all(|c| c.is_lowercase() || *c == '\'' || *c == '-')
            }
            _ => false,
        }
    }) && !words.iter().any(|w| GENERIC_LABEL_WORDS.contains(w))
}

const GENERIC_LABEL_WORDS: &[&str] = &["Student", "Learner", "Pupil", "Group", "Period", "Class"];
