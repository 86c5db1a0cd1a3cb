//! Chat-handle grammar validation.
//!
//! User identifiers look like `@localpart:domain`. The grammar follows the
//! chat protocol's user-identifier appendix: a restricted character set, one
//! `@` sigil, exactly one `:` separator, a syntactically valid trailing
//! domain, and a 255-character overall limit.
//!
//! Validation is pure: no lookups, no side effects.

use thiserror::Error;

/// Maximum length of a handle, sigil and domain included.
const MAX_HANDLE_LENGTH: usize = 255;

/// Reasons a candidate string is not a valid chat handle.
///
/// Each variant names the single grammar rule that was violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandleError {
    #[error("a chat handle cannot be an empty string")]
    Empty,

    #[error("a chat handle cannot contain spaces")]
    ContainsSpace,

    #[error("a chat handle cannot contain more than one @ symbol")]
    TooManyAtSigns,

    #[error("a chat handle must contain exactly one : symbol")]
    BadColonCount,

    #[error("the chat handle contains illegal characters: {0}")]
    IllegalCharacters(String),

    #[error("the domain portion of the chat handle is not valid")]
    InvalidDomain,

    #[error("a chat handle cannot be longer than {MAX_HANDLE_LENGTH} characters")]
    TooLong,
}

/// Validate a candidate chat handle, optionally fixing a missing `@` sigil.
///
/// Returns the handle that passed validation, which differs from the input
/// only when `fix_missing_sigil` prepended the sigil.
///
/// # Errors
///
/// Returns the [`HandleError`] naming the first violated rule, in this order:
/// emptiness, embedded space, sigil count, colon count, character set, domain
/// syntax, overall length.
pub fn validate_chat_handle(
    candidate: &str,
    fix_missing_sigil: bool,
) -> Result<String, HandleError> {
    if candidate.is_empty() {
        return Err(HandleError::Empty);
    }
    if candidate.contains(' ') {
        return Err(HandleError::ContainsSpace);
    }

    let handle = if !candidate.starts_with('@') && fix_missing_sigil {
        format!("@{candidate}")
    } else {
        candidate.to_string()
    };

    if handle.matches('@').count() > 1 {
        return Err(HandleError::TooManyAtSigns);
    }
    if handle.matches(':').count() != 1 {
        return Err(HandleError::BadColonCount);
    }

    let illegal: String = handle
        .chars()
        .filter(|c| !is_allowed_char(*c))
        .collect();
    if !illegal.is_empty() {
        return Err(HandleError::IllegalCharacters(illegal));
    }

    // Exactly one colon, so the split yields a trailing domain segment.
    let domain = handle.split(':').nth(1).unwrap_or("");
    if !is_valid_domain(domain) {
        return Err(HandleError::InvalidDomain);
    }

    if handle.len() > MAX_HANDLE_LENGTH {
        return Err(HandleError::TooLong);
    }

    Ok(handle)
}

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_lowercase()
        || c.is_ascii_digit()
        || matches!(c, '-' | '.' | '=' | '_' | '/' | '+' | '@' | ':')
}

/// Syntactic domain check: dot-separated labels of at most 63 characters,
/// alphanumeric with interior hyphens, an alphabetic final label of at least
/// two characters, and at most 253 characters overall.
fn is_valid_domain(domain: &str) -> bool {
    if domain.is_empty() || domain.len() > 253 {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    for label in &labels {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        if label.starts_with('-') || label.ends_with('-') {
            return false;
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return false;
        }
    }

    let tld = labels[labels.len() - 1];
    tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_well_formed_handle() {
        let handle = validate_chat_handle("@brodie:example.org", false).unwrap();
        assert_eq!(handle, "@brodie:example.org");
    }

    #[test]
    fn accepts_multi_label_domain() {
        let handle =
            validate_chat_handle("@brodie:matrixbots.tinystage.test", false).unwrap();
        assert_eq!(handle, "@brodie:matrixbots.tinystage.test");
    }

    #[test]
    fn rejects_empty_string() {
        assert_eq!(
            validate_chat_handle("", true),
            Err(HandleError::Empty)
        );
    }

    #[test]
    fn rejects_embedded_space() {
        assert_eq!(
            validate_chat_handle("@bro die:example.org", false),
            Err(HandleError::ContainsSpace)
        );
    }

    #[test]
    fn fixes_missing_sigil_when_asked() {
        let handle = validate_chat_handle("brodie:example.org", true).unwrap();
        assert_eq!(handle, "@brodie:example.org");
    }

    #[test]
    fn leaves_missing_sigil_alone_otherwise() {
        // Without the fix the handle still parses; it simply keeps its shape.
        let handle = validate_chat_handle("brodie:example.org", false).unwrap();
        assert_eq!(handle, "brodie:example.org");
    }

    #[test]
    fn rejects_double_at() {
        assert_eq!(
            validate_chat_handle("@@brodie:example.org", false),
            Err(HandleError::TooManyAtSigns)
        );
    }

    #[test]
    fn rejects_missing_colon() {
        assert_eq!(
            validate_chat_handle("@brodie", false),
            Err(HandleError::BadColonCount)
        );
    }

    #[test]
    fn rejects_two_colons() {
        assert_eq!(
            validate_chat_handle("@brodie:example.org:8448", false),
            Err(HandleError::BadColonCount)
        );
    }

    #[test]
    fn rejects_uppercase_characters() {
        assert_eq!(
            validate_chat_handle("@Brodie:example.org", false),
            Err(HandleError::IllegalCharacters("B".to_string()))
        );
    }

    #[test]
    fn rejects_bad_domain() {
        assert_eq!(
            validate_chat_handle("@brodie:example", false),
            Err(HandleError::InvalidDomain)
        );
        assert_eq!(
            validate_chat_handle("@brodie:-bad.org", false),
            Err(HandleError::InvalidDomain)
        );
    }

    #[test]
    fn rejects_overlong_handle() {
        let localpart = "a".repeat(250);
        let candidate = format!("@{localpart}:example.org");
        assert_eq!(
            validate_chat_handle(&candidate, false),
            Err(HandleError::TooLong)
        );
    }

    proptest! {
        /// Handles already satisfying the grammar pass through unchanged.
        #[test]
        fn valid_handles_round_trip(
            local in "[a-z0-9=_/+.-]{1,24}",
            label in "[a-z][a-z0-9]{0,10}",
            tld in "[a-z]{2,6}",
        ) {
            let candidate = format!("@{local}:{label}.{tld}");
            let validated = validate_chat_handle(&candidate, false).unwrap();
            prop_assert_eq!(validated, candidate);
        }

        /// The sigil fix never changes anything beyond the first character.
        #[test]
        fn sigil_fix_only_prepends(
            local in "[a-z0-9]{1,24}",
            tld in "[a-z]{2,6}",
        ) {
            let candidate = format!("{local}:example.{tld}");
            let validated = validate_chat_handle(&candidate, true).unwrap();
            prop_assert_eq!(validated, format!("@{candidate}"));
        }
    }
}
