//! Seekable stream adapter shared by every check.
//!
//! All checks read the same source one after another, so each of them must
//! start from offset 0 and leave the stream there. `CsvStream::rewound` is the
//! one place that enforces this: it resets before running a read operation and
//! resets again on every exit path.

use std::io::{self, SeekFrom};

use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt, BufReader,
};

/// UTF-8 byte-order mark.
pub const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// A readable, seekable byte source holding a whole CSV file.
pub trait CsvSource: AsyncRead + AsyncSeek + Unpin {}

impl<T: AsyncRead + AsyncSeek + Unpin> CsvSource for T {}

/// Buffered reader over a [`CsvSource`] with explicit rewind primitives.
#[derive(Debug)]
pub struct CsvStream<R> {
    reader: BufReader<R>,
    at_start: bool,
}

impl<R: CsvSource> CsvStream<R> {
    /// Wrap `source`. The source is assumed to be at offset 0; call
    /// [`reset_to_start`](Self::reset_to_start) if that is not guaranteed.
    #[must_use]
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
            at_start: true,
        }
    }

    /// Whether the next read starts at offset 0.
    ///
    /// Becomes `false` as soon as anything is read, including reads whose
    /// future was dropped before completing.
    #[must_use]
    pub fn is_at_start(&self) -> bool {
        self.at_start
    }

    /// Seek back to offset 0, discarding buffered bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying seek fails.
    pub async fn reset_to_start(&mut self) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(0)).await?;
        self.at_start = true;
        Ok(())
    }

    /// Total length of the stream in bytes. Leaves the stream at offset 0.
    ///
    /// # Errors
    ///
    /// Returns an error if seeking fails.
    pub async fn byte_len(&mut self) -> io::Result<u64> {
        self.at_start = false;
        let end = self.reader.seek(SeekFrom::End(0)).await?;
        self.reset_to_start().await?;
        Ok(end)
    }

    /// Read up to `buf.len()` raw bytes. Returns 0 once the stream is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    pub async fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.at_start = false;
        self.reader.read(buf).await
    }

    /// Buffer everything from the current position to the end.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    pub async fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        self.at_start = false;
        let mut content = Vec::new();
        self.reader.read_to_end(&mut content).await?;
        Ok(content)
    }

    /// Read the next line, decoded as UTF-8 with invalid sequences replaced.
    ///
    /// `\n`, `\r\n` and a lone `\r` all end a line and are not included. A
    /// UTF-8 BOM at the very start of the stream is skipped. Returns `None`
    /// when no bytes are left, so a trailing line break does not yield an
    /// extra empty line.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let strip_bom = self.at_start;
        self.at_start = false;

        let mut line = Vec::new();
        if !self.read_line_bytes(&mut line).await? {
            return Ok(None);
        }

        let bytes = if strip_bom {
            line.strip_prefix(&UTF8_BOM[..]).unwrap_or(&line[..])
        } else {
            &line[..]
        };
        Ok(Some(String::from_utf8_lossy(bytes).into_owned()))
    }

    /// Append the next line's bytes to `line`, without its terminator.
    /// Returns `false` if the stream was already exhausted.
    async fn read_line_bytes(&mut self, line: &mut Vec<u8>) -> io::Result<bool> {
        let mut read_any = false;
        loop {
            let available = self.reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(read_any);
            }
            read_any = true;

            if let Some(pos) = available.iter().position(|&b| b == b'\n' || b == b'\r') {
                let terminator = available[pos];
                line.extend_from_slice(&available[..pos]);
                self.reader.consume(pos + 1);
                if terminator == b'\r' {
                    let next = self.reader.fill_buf().await?;
                    if next.first() == Some(&b'\n') {
                        self.reader.consume(1);
                    }
                }
                return Ok(true);
            }

            let len = available.len();
            line.extend_from_slice(available);
            self.reader.consume(len);
        }
    }

    /// Run `op` against the stream from offset 0 and rewind afterwards.
    ///
    /// The stream is reset before `op` runs and again after it finishes,
    /// whether it succeeded or not. An error from `op` takes precedence over
    /// an error from the final reset.
    ///
    /// # Errors
    ///
    /// Returns the error from `op`, or from either reset.
    pub async fn rewound<T, E, F>(&mut self, op: F) -> Result<T, E>
    where
        F: AsyncFnOnce(&mut Self) -> Result<T, E>,
        E: From<io::Error>,
    {
        self.reset_to_start().await?;
        let outcome = op(&mut *self).await;
        let reset = self.reset_to_start().await;
        let value = outcome?;
        reset?;
        Ok(value)
    }

    /// Release the underlying source.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}
