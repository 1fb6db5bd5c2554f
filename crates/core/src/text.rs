//! Validated text primitives.

/// Errors raised while constructing validated text.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// Nothing but whitespace was supplied.
    #[error("must not be empty")]
    Empty,
}

/// A string holding at least one non-whitespace character, kept exactly as supplied.
///
/// Patient names, cities and identifiers are all carried as `NonEmptyText` once validated, so
/// downstream code never has to re-check for blank values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Wraps `input` without altering it.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] when `input` is empty or only whitespace.
    pub fn new(input: impl Into<String>) -> Result<Self, TextError> {
        let input = input.into();
        if input.trim().is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(input))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
