//! Conditional item/variant matching for room associations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Restricts a room association to particular tickets.
///
/// - No fields set: matches anything.
/// - Item only: matches any variant of that item.
/// - Item and variant: exact match.
///
/// Item and variant identifiers are compared as strings; callers normalize
/// the ticketing platform's numeric identifiers into their decimal string
/// form before matching, so numeric and string spellings never mix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterCondition {
    /// Ticket item identifier, normalized decimal string.
    #[serde(default)]
    pub item: Option<String>,

    /// Ticket variant identifier, normalized decimal string.
    #[serde(default)]
    pub variant: Option<String>,
}

impl FilterCondition {
    /// The unconditioned filter: matches every item/variant pair.
    pub fn any() -> Self {
        Self::default()
    }

    /// Match any variant of one item.
    pub fn for_item(item: impl Into<String>) -> Self {
        Self {
            item: Some(item.into()),
            variant: None,
        }
    }

    /// Match one exact item/variant pair.
    pub fn for_variant(item: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            item: Some(item.into()),
            variant: Some(variant.into()),
        }
    }

    /// True when no field restricts the match.
    pub fn is_unconditioned(&self) -> bool {
        self.item.is_none() && self.variant.is_none()
    }

    /// Whether a ticket with the given item/variant satisfies this condition.
    pub fn matches(&self, item: &str, variant: Option<&str>) -> bool {
        if let Some(want_item) = &self.item {
            if want_item != item {
                return false;
            }
        }
        if let Some(want_variant) = &self.variant {
            match variant {
                Some(v) if v == want_variant => {}
                _ => return false,
            }
        }
        true
    }
}

impl fmt::Display for FilterCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.item, &self.variant) {
            (None, None) => write!(f, "any ticket"),
            (Some(item), None) => write!(f, "item {item}"),
            (Some(item), Some(variant)) => write!(f, "item {item} variant {variant}"),
            (None, Some(variant)) => write!(f, "variant {variant}"),
        }
    }
}
