//! Checks every CSV file must pass, whatever its format.
//!
//! Order is fixed: emptiness, then encoding, then record count. The first
//! failing check produces the only error of the run.

use std::io;

use tracing::{debug, info};

use crate::encoding::{CharsetDetector, is_valid_encoding};
use crate::error::{CheckError, CheckErrorKind};
use crate::messages;
use crate::records::is_valid_record_count;
use crate::report::{CsvFormatCheckResult, FormatCheckErrorMessage};
use crate::stream::{CsvSource, CsvStream};

/// Whether the stream has no bytes, or its first line is empty.
///
/// Leaves the stream at offset 0.
///
/// # Errors
///
/// Returns an error if reading or seeking the stream fails.
pub async fn is_empty_file<R: CsvSource>(stream: &mut CsvStream<R>) -> io::Result<bool> {
    if stream.byte_len().await? == 0 {
        return Ok(true);
    }
    stream
        .rewound(async |s: &mut CsvStream<R>| {
            let first_line = s.read_line().await?;
            Ok::<_, io::Error>(first_line.is_none_or(|line| line.is_empty()))
        })
        .await
}

/// Run the emptiness, encoding and record-count checks in order.
///
/// Returns an empty result when all pass, otherwise a result holding the
/// single file-level error of the first failing check.
///
/// # Errors
///
/// Returns an error if reading or seeking the stream fails.
pub async fn perform_basic_checks<R, D>(
    stream: &mut CsvStream<R>,
    detector: D,
) -> Result<CsvFormatCheckResult, CheckError>
where
    R: CsvSource,
    D: CharsetDetector,
{
    debug!("checking for empty file");
    if is_empty_file(stream).await? {
        return Ok(failed(CheckErrorKind::Structural, messages::EMPTY_FILE));
    }

    debug!("checking character encoding");
    let verdict = is_valid_encoding(stream, detector).await?;
    debug!(valid = verdict.valid, encoding = ?verdict.encoding, "{}", verdict.message);
    if !verdict.valid {
        return Ok(failed(CheckErrorKind::Encoding, messages::INVALID_ENCODING));
    }

    debug!("checking record count");
    if !is_valid_record_count(stream).await? {
        return Ok(failed(
            CheckErrorKind::Volume,
            messages::record_count_exceeded(),
        ));
    }

    debug!("basic checks passed");
    Ok(CsvFormatCheckResult::default())
}

fn failed(kind: CheckErrorKind, message: impl Into<String>) -> CsvFormatCheckResult {
    let error = FormatCheckErrorMessage::file_level(message).with_kind(kind);
    info!(%kind, message = error.error_message(), "basic check failed");
    CsvFormatCheckResult::with_error(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::encoding::ChardetngDetector;
    use crate::records::MAX_RECORD_COUNT;

    fn stream(bytes: impl Into<Vec<u8>>) -> CsvStream<Cursor<Vec<u8>>> {
        CsvStream::new(Cursor::new(bytes.into()))
    }

    async fn run(bytes: impl Into<Vec<u8>>) -> CsvFormatCheckResult {
        let mut s = stream(bytes);
        let result = perform_basic_checks(&mut s, ChardetngDetector::default())
            .await
            .unwrap();
        assert!(s.is_at_start());
        result
    }

    fn only_kind(result: &CsvFormatCheckResult) -> Option<CheckErrorKind> {
        assert_eq!(result.errors_count(), 1, "{result:?}");
        result.errors()[0].kind()
    }

    #[tokio::test]
    async fn test_zero_length_is_empty() {
        let result = run(Vec::<u8>::new()).await;
        assert_eq!(only_kind(&result), Some(CheckErrorKind::Structural));
        assert_eq!(result.errors()[0].row_number(), None);
        assert_eq!(result.errors()[0].error_message(), messages::EMPTY_FILE);
    }

    #[tokio::test]
    async fn test_blank_first_line_is_empty() {
        let result = run(b"\nid,name\n1,alice\n".to_vec()).await;
        assert_eq!(only_kind(&result), Some(CheckErrorKind::Structural));
    }

    #[tokio::test]
    async fn test_bom_only_is_empty() {
        let result = run(b"\xEF\xBB\xBF".to_vec()).await;
        assert_eq!(only_kind(&result), Some(CheckErrorKind::Structural));

        let result = run(b"\xEF\xBB\xBF\r\nid\r\n".to_vec()).await;
        assert_eq!(only_kind(&result), Some(CheckErrorKind::Structural));
    }

    #[tokio::test]
    async fn test_emptiness_checked_before_encoding() {
        // Not valid in any accepted encoding, but the empty first line wins.
        let result = run(b"\n\xE9\xFF\xFE".to_vec()).await;
        assert_eq!(only_kind(&result), Some(CheckErrorKind::Structural));
    }

    #[tokio::test]
    async fn test_bad_encoding_reported() {
        let result = run(b"caf\xE9,na\xEFve,\xE0 la carte\n".to_vec()).await;
        assert_eq!(only_kind(&result), Some(CheckErrorKind::Encoding));
        assert!(result.errors()[0].error_message().contains("Invalid character code"));
    }

    #[tokio::test]
    async fn test_encoding_checked_before_record_count() {
        let mut bytes = "a,b\n".repeat(MAX_RECORD_COUNT + 1).into_bytes();
        bytes.extend_from_slice(b"caf\xE9,\xE0 la carte\n");
        let result = run(bytes).await;
        assert_eq!(only_kind(&result), Some(CheckErrorKind::Encoding));
    }

    #[tokio::test]
    async fn test_too_many_records() {
        let result = run("a,b\n".repeat(MAX_RECORD_COUNT + 1)).await;
        assert_eq!(only_kind(&result), Some(CheckErrorKind::Volume));
        assert!(result.errors()[0].error_message().contains("exceeds the limit of 40000"));
    }

    #[tokio::test]
    async fn test_valid_file_passes() {
        let result = run(b"id,name\r\n1,alice\r\n2,bob\r\n".to_vec()).await;
        assert!(!result.has_errors(), "{result:?}");
    }

    #[tokio::test]
    async fn test_is_empty_file_false_for_content() {
        let mut s = stream(b"id\n".to_vec());
        assert!(!is_empty_file(&mut s).await.unwrap());
        assert!(s.is_at_start());
    }
}
