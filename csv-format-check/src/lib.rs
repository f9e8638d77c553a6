//! # csv-format-check
//!
//! Baseline checks for uploaded CSV files, run before any format-specific
//! processing.
//!
//! Every file goes through the same three checks, in this order, and the
//! first failure is the only error reported:
//!
//! 1. the file is not empty and its first line is not blank,
//! 2. the content is UTF-8 (with or without BOM) or Shift-JIS,
//! 3. the file has at most [`MAX_RECORD_COUNT`] lines.
//!
//! Format-specific rules plug in through [`FormatChecker`] and only run once
//! the basic checks pass.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use csv_format_check::{CsvFormatChecker, NoSpecificChecks};
//!
//! # async fn example() -> std::io::Result<()> {
//! let file = tokio::fs::File::open("upload.csv").await?;
//! let mut checker = CsvFormatChecker::new(file, NoSpecificChecks);
//! let result = checker.check_format().await;
//! for error in result.errors() {
//!     println!("{}", error.format_human_readable());
//! }
//! # Ok(())
//! # }
//! ```

mod basic;
mod checker;
mod encoding;
mod error;
mod messages;
mod records;
mod report;
mod stream;

pub use basic::{is_empty_file, perform_basic_checks};
pub use checker::{CsvFormatChecker, FormatChecker, NoSpecificChecks};
pub use encoding::{
    ACCEPTED_ENCODINGS, ChardetngDetector, CharsetDetector, DETECTION_CHUNK_SIZE, EncodingVerdict,
    detect_charset, is_valid_encoding, resolve_charset,
};
pub use error::{CheckError, CheckErrorKind};
pub use messages::{
    EMPTY_FILE, INVALID_ENCODING, UNEXPECTED_ERROR, UNSPECIFIED_ERROR, record_count_exceeded,
};
pub use records::{MAX_RECORD_COUNT, count_records_up_to, is_valid_record_count};
pub use report::{CsvFormatCheckResult, FormatCheckErrorMessage};
pub use stream::{CsvSource, CsvStream, UTF8_BOM};
