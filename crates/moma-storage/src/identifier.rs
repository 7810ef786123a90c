//! Reversible identifier sanitization.
//!
//! Store label and relationship identifiers are restricted to
//! `[A-Za-z0-9_]` and may not start with a digit. Vocabulary-qualified
//! tokens such as `cr:FileObject` or `source/fileObject` are escaped on
//! write and restored on read:
//!
//! * `_` becomes `__`
//! * any other character outside `[A-Za-z0-9]` becomes `_uXXXX_` (upper-case
//!   hex code point, at least four digits)
//! * a leading digit is escaped the same way
//!
//! `unsanitize(sanitize(t)) == t` holds for every token.

use std::fmt;

use moma_core::Label;

use crate::error::StorageError;

/// Escapes a token into store identifier syntax.
pub fn sanitize(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    for (i, c) in token.chars().enumerate() {
        match c {
            '_' => out.push_str("__"),
            c if c.is_ascii_digit() && i == 0 => push_escaped(&mut out, c),
            c if c.is_ascii_alphanumeric() => out.push(c),
            c => push_escaped(&mut out, c),
        }
    }
    out
}

fn push_escaped(out: &mut String, c: char) {
    out.push_str(&format!("_u{:04X}_", c as u32));
}

/// Reverses [`sanitize`].
pub fn unsanitize(identifier: &str) -> Result<String, StorageError> {
    let invalid = |reason: &str| StorageError::InvalidIdentifier {
        token: identifier.to_string(),
        reason: reason.to_string(),
    };

    let mut out = String::with_capacity(identifier.len());
    let mut chars = identifier.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '_' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('_') => out.push('_'),
            Some('u') => {
                let mut hex = String::new();
                loop {
                    match chars.next() {
                        Some('_') => break,
                        Some(h) if h.is_ascii_hexdigit() => hex.push(h),
                        _ => return Err(invalid("unterminated escape")),
                    }
                }
                let code = u32::from_str_radix(&hex, 16).map_err(|_| invalid("empty escape"))?;
                let decoded = char::from_u32(code).ok_or_else(|| invalid("escape is not a character"))?;
                out.push(decoded);
            }
            _ => return Err(invalid("dangling underscore")),
        }
    }
    Ok(out)
}

/// A sanitized store identifier (node label or relationship type).
///
/// The only ways to build one are from a registered [`Label`] or through
/// [`Identifier::new`], which escapes the token. Store queries never see
/// raw user text in identifier position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    /// Sanitizes an arbitrary non-empty token.
    pub fn new(token: &str) -> Result<Self, StorageError> {
        if token.is_empty() {
            return Err(StorageError::InvalidIdentifier {
                token: String::new(),
                reason: "empty token".to_string(),
            });
        }
        Ok(Identifier(sanitize(token)))
    }

    /// Wraps an identifier read back from the store.
    pub(crate) fn from_stored(raw: String) -> Self {
        Identifier(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The original token.
    pub fn token(&self) -> Result<String, StorageError> {
        unsanitize(&self.0)
    }
}

impl From<Label> for Identifier {
    fn from(label: Label) -> Self {
        Identifier(sanitize(label.as_str()))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
