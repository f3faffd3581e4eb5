//! Object name and content-type validation.
//!
//! Every backend calls these before touching storage, so rejection behavior is
//! identical across backends.
//!
//! - Name: one or more `/`-separated segments of `[A-Za-z0-9-_.]`. Segments made
//!   only of dots (`.`, `..`) are refused so a name never leaves its root.
//! - Content type: empty, or `[a-z-]+/[a-z0-9-+.]+`.

use crate::error::{StoreError, StoreResult};

/// Separator between name segments.
pub const NAME_SEPARATOR: char = '/';

/// Check an object name against the name grammar.
#[must_use]
pub fn validate_name(name: &str) -> bool {
    if name.trim().is_empty() {
        return false;
    }

    name.split(NAME_SEPARATOR).all(is_valid_segment)
}

/// Check a content type against the content-type grammar.
///
/// An empty string is valid and means "use the backend default".
#[must_use]
pub fn validate_content_type(content_type: &str) -> bool {
    if content_type.is_empty() {
        return true;
    }

    let Some((kind, subtype)) = content_type.split_once('/') else {
        return false;
    };

    !kind.is_empty()
        && kind.chars().all(|c| c.is_ascii_lowercase() || c == '-')
        && !subtype.is_empty()
        && subtype.chars().all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '+' | '.')
        })
}

/// Validate a name.
///
/// # Errors
///
/// Returns `StoreError::InvalidName` if the name is not valid.
pub fn ensure_name(name: &str) -> StoreResult<()> {
    if validate_name(name) {
        Ok(())
    } else {
        Err(StoreError::invalid_name(name))
    }
}

/// Validate an optional content type.
///
/// # Errors
///
/// Returns `StoreError::InvalidContentType` if the content type is not valid.
pub fn ensure_content_type(content_type: Option<&str>) -> StoreResult<()> {
    match content_type {
        Some(ct) if !validate_content_type(ct) => Err(StoreError::invalid_content_type(ct)),
        _ => Ok(()),
    }
}

/// Content type to persist: the caller's value, or `default` when none/blank.
#[must_use]
pub fn effective_content_type<'a>(content_type: Option<&'a str>, default: &'a str) -> &'a str {
    content_type
        .filter(|ct| !ct.trim().is_empty())
        .unwrap_or(default)
}

/// Split a validated name into its segments.
pub(crate) fn segments(name: &str) -> impl Iterator<Item = &str> {
    name.split(NAME_SEPARATOR)
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment.chars().all(|c| c == '.')
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_generated_names_are_valid(
            segments in prop::collection::vec("[A-Za-z0-9_-][A-Za-z0-9._-]{0,15}", 1..5),
        ) {
            let name = segments.join("/");
            prop_assert!(validate_name(&name));
        }
    }

    proptest! {
        #[test]
        fn prop_names_with_foreign_chars_are_invalid(
            prefix in "[a-z]{0,8}",
            bad in "[ !@#$%^&*()=+\\[\\]{};:'\",<>?|`~]",
            suffix in "[a-z]{0,8}",
        ) {
            let name = format!("{prefix}{bad}{suffix}");
            prop_assert!(!validate_name(&name));
        }
    }

    proptest! {
        #[test]
        fn prop_lowercase_content_types_are_valid(ct in "[a-z-]{1,12}/[a-z0-9+.-]{1,24}") {
            prop_assert!(validate_content_type(&ct));
        }
    }

    proptest! {
        #[test]
        fn prop_uppercase_content_types_are_invalid(
            kind in "[a-z]{0,4}[A-Z][a-z]{0,4}",
            subtype in "[a-z]{1,8}",
        ) {
            let ct = format!("{kind}/{subtype}");
            prop_assert!(!validate_content_type(&ct));
        }
    }
}
