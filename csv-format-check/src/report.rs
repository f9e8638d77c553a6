//! Check result types.

use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};

use crate::error::CheckErrorKind;
use crate::messages;

/// One problem found in a CSV file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FormatCheckErrorMessage {
    row_number: Option<u64>,
    error_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<CheckErrorKind>,
}

impl FormatCheckErrorMessage {
    /// An error about the file as a whole, not tied to any row.
    ///
    /// An empty `error_message` is replaced by [`messages::UNSPECIFIED_ERROR`];
    /// the same holds for [`at_row`](Self::at_row).
    #[must_use]
    pub fn file_level(error_message: impl Into<String>) -> Self {
        Self::new(None, error_message.into())
    }

    /// An error about a specific row (1-indexed).
    #[must_use]
    pub fn at_row(row_number: u64, error_message: impl Into<String>) -> Self {
        Self::new(Some(row_number), error_message.into())
    }

    fn new(row_number: Option<u64>, mut error_message: String) -> Self {
        if error_message.is_empty() {
            messages::UNSPECIFIED_ERROR.clone_into(&mut error_message);
        }
        Self {
            row_number,
            error_message,
            kind: None,
        }
    }

    /// Tag the message with its failure category.
    #[must_use]
    pub fn with_kind(mut self, kind: CheckErrorKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Row the error refers to, or `None` for file-level errors.
    #[must_use]
    pub fn row_number(&self) -> Option<u64> {
        self.row_number
    }

    /// The user-facing text; never empty.
    #[must_use]
    pub fn error_message(&self) -> &str {
        &self.error_message
    }

    /// Failure category, set by the base checks; format-specific checks
    /// usually leave it unset.
    #[must_use]
    pub fn kind(&self) -> Option<CheckErrorKind> {
        self.kind
    }

    /// Format the error for human-readable output.
    ///
    /// Row errors: `row {n}: {message}`; file errors: `{message}`.
    #[must_use]
    pub fn format_human_readable(&self) -> String {
        match self.row_number {
            Some(row) => format!("row {row}: {}", self.error_message),
            None => self.error_message.clone(),
        }
    }
}

/// Outcome of one validation run.
///
/// Errors are only ever appended. A fresh result is built for every run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvFormatCheckResult {
    errors: Vec<FormatCheckErrorMessage>,
}

impl CsvFormatCheckResult {
    /// A result holding exactly one error.
    #[must_use]
    pub fn with_error(error: FormatCheckErrorMessage) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Whether any error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Errors in the order they were reported.
    #[must_use]
    pub fn errors(&self) -> &[FormatCheckErrorMessage] {
        &self.errors
    }

    /// Number of recorded errors.
    #[must_use]
    pub fn errors_count(&self) -> usize {
        self.errors.len()
    }

    /// Append an error.
    pub fn add_error(&mut self, error: FormatCheckErrorMessage) {
        self.errors.push(error);
    }

    /// Append an error about the file as a whole.
    pub fn add_file_error(&mut self, error_message: impl Into<String>) {
        self.add_error(FormatCheckErrorMessage::file_level(error_message));
    }

    /// Append an error about row `row_number` (1-indexed).
    pub fn add_row_error(&mut self, row_number: u64, error_message: impl Into<String>) {
        self.add_error(FormatCheckErrorMessage::at_row(row_number, error_message));
    }
}

impl Serialize for CsvFormatCheckResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CsvFormatCheckResult", 2)?;
        state.serialize_field("has_errors", &self.has_errors())?;
        state.serialize_field("errors", &self.errors)?;
        state.end()
    }
}
