//! Record-count ceiling.

use std::io;

use crate::stream::{CsvSource, CsvStream};

/// Maximum number of lines a file may contain.
pub const MAX_RECORD_COUNT: usize = 40_000;

/// Count lines from offset 0, stopping as soon as the count exceeds `limit`.
///
/// Returns at most `limit + 1`. Leaves the stream at offset 0.
///
/// # Errors
///
/// Returns an error if reading or seeking the stream fails.
pub async fn count_records_up_to<R: CsvSource>(
    stream: &mut CsvStream<R>,
    limit: usize,
) -> io::Result<usize> {
    stream
        .rewound(async |s: &mut CsvStream<R>| {
            let mut count = 0;
            while count <= limit && s.read_line().await?.is_some() {
                count += 1;
            }
            Ok::<_, io::Error>(count)
        })
        .await
}

/// Check that the stream holds no more than [`MAX_RECORD_COUNT`] lines.
///
/// Reading stops at the first line past the ceiling.
///
/// # Errors
///
/// Returns an error if reading or seeking the stream fails.
pub async fn is_valid_record_count<R: CsvSource>(stream: &mut CsvStream<R>) -> io::Result<bool> {
    let count = count_records_up_to(stream, MAX_RECORD_COUNT).await?;
    Ok(count <= MAX_RECORD_COUNT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn lines(n: usize) -> CsvStream<Cursor<Vec<u8>>> {
        CsvStream::new(Cursor::new("1,abc\n".repeat(n).into_bytes()))
    }

    #[tokio::test]
    async fn test_limit_is_inclusive() {
        let mut s = lines(MAX_RECORD_COUNT);
        assert!(is_valid_record_count(&mut s).await.unwrap());
        assert!(s.is_at_start());
    }

    #[tokio::test]
    async fn test_one_over_limit_fails() {
        let mut s = lines(MAX_RECORD_COUNT + 1);
        assert!(!is_valid_record_count(&mut s).await.unwrap());
        assert!(s.is_at_start());
    }

    #[tokio::test]
    async fn test_counting_stops_after_limit() {
        let mut s = lines(100);
        assert_eq!(count_records_up_to(&mut s, 3).await.unwrap(), 4);
        assert_eq!(count_records_up_to(&mut s, 1_000).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn test_last_line_without_newline_counts() {
        let mut s = CsvStream::new(Cursor::new(b"a\r\nb\r\nc".to_vec()));
        assert_eq!(count_records_up_to(&mut s, 10).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_blank_lines_count() {
        let mut s = CsvStream::new(Cursor::new(b"a\n\n\nb\n".to_vec()));
        assert_eq!(count_records_up_to(&mut s, 10).await.unwrap(), 4);
    }
}
