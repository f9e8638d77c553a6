//! User-facing error texts produced by the base checks.

use crate::records::MAX_RECORD_COUNT;

/// Reported when the file has no bytes or its first line is empty.
pub const EMPTY_FILE: &str = "The file is empty. At least one row is required.";

/// Reported when the encoding is neither UTF-8 nor Shift-JIS.
pub const INVALID_ENCODING: &str =
    "Invalid character code. The file must be encoded in UTF-8 (with or without BOM) or Shift-JIS.";

/// Reported in place of everything else when a check fails outright.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred while checking the file.";

/// Stands in for an empty message passed to an error constructor.
pub const UNSPECIFIED_ERROR: &str = "An unspecified format error was found.";

/// Reported when the file has more than [`MAX_RECORD_COUNT`] lines.
#[must_use]
pub fn record_count_exceeded() -> String {
    format!("The record count exceeds the limit of {MAX_RECORD_COUNT}.")
}
