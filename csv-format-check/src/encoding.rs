//! Character-encoding detection.
//!
//! A UTF-8 BOM is accepted without further inspection. Anything else is fed
//! to a statistical [`CharsetDetector`] and the reported charset is resolved
//! through `encoding_rs` labels.

use std::io;

use encoding_rs::{Encoding, ISO_2022_JP, UTF_8};
use serde::Serialize;
use tracing::debug;

use crate::stream::{CsvSource, CsvStream, UTF8_BOM};

/// Size of the chunks handed to the charset detector.
pub const DETECTION_CHUNK_SIZE: usize = 4096;

/// Lower-cased canonical encoding names that pass the check.
pub const ACCEPTED_ENCODINGS: &[&str] = &["utf-8", "shift_jis"];

/// Statistical charset detection engine.
///
/// A detector is used for exactly one stream: the checker creates a fresh
/// one per run.
pub trait CharsetDetector {
    /// Feed the next chunk of input. Returns `true` once the detector has
    /// reached a conclusion and wants no more input.
    fn feed(&mut self, chunk: &[u8]) -> bool;

    /// Signal end of input and report the detected charset name, if any.
    fn finish(self) -> Option<String>;
}

/// [`CharsetDetector`] backed by `chardetng`.
pub struct ChardetngDetector {
    inner: chardetng::EncodingDetector,
    non_ascii_seen: bool,
    escape_seen: bool,
}

impl Default for ChardetngDetector {
    fn default() -> Self {
        Self {
            inner: chardetng::EncodingDetector::new(),
            non_ascii_seen: false,
            escape_seen: false,
        }
    }
}

impl CharsetDetector for ChardetngDetector {
    fn feed(&mut self, chunk: &[u8]) -> bool {
        self.non_ascii_seen |= self.inner.feed(chunk, false);
        self.escape_seen |= chunk.contains(&0x1B);
        // chardetng only decides once it has seen everything.
        false
    }

    fn finish(mut self) -> Option<String> {
        self.inner.feed(&[], true);
        let guess = self.inner.guess(None, true);
        // Plain ASCII is valid UTF-8; chardetng would report its legacy fallback.
        if !self.non_ascii_seen && !self.escape_seen && guess != ISO_2022_JP {
            return Some(UTF_8.name().to_owned());
        }
        Some(guess.name().to_owned())
    }
}

/// Outcome of the encoding check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodingVerdict {
    /// Whether the encoding is one of [`ACCEPTED_ENCODINGS`].
    pub valid: bool,
    /// Describes what was detected, for logs and diagnostics.
    pub message: String,
    /// Canonical name of the resolved encoding, if one was resolved.
    pub encoding: Option<String>,
}

impl EncodingVerdict {
    fn utf8_bom() -> Self {
        Self {
            valid: true,
            message: "UTF-8 byte-order mark found".to_owned(),
            encoding: Some(UTF_8.name().to_owned()),
        }
    }

    fn undetectable() -> Self {
        Self {
            valid: false,
            message: "Character encoding could not be determined".to_owned(),
            encoding: None,
        }
    }

    fn unresolved(label: &str) -> Self {
        Self {
            valid: false,
            message: format!("Detected charset '{label}' is not a known encoding"),
            encoding: None,
        }
    }

    fn resolved(encoding: &'static Encoding) -> Self {
        let name = encoding.name();
        let valid = ACCEPTED_ENCODINGS.contains(&name.to_ascii_lowercase().as_str());
        let message = if valid {
            format!("Detected encoding {name}")
        } else {
            format!("Detected encoding {name} is not supported")
        };
        Self {
            valid,
            message,
            encoding: Some(name.to_owned()),
        }
    }
}

/// Map a detector's charset report to a verdict.
#[must_use]
pub fn resolve_charset(charset: Option<&str>) -> EncodingVerdict {
    let Some(label) = charset else {
        return EncodingVerdict::undetectable();
    };
    match Encoding::for_label(label.trim().as_bytes()) {
        Some(encoding) => EncodingVerdict::resolved(encoding),
        None => EncodingVerdict::unresolved(label),
    }
}

/// Check that the stream is UTF-8 (with or without BOM) or Shift-JIS.
///
/// Leaves the stream at offset 0.
///
/// # Errors
///
/// Returns an error if reading or seeking the stream fails.
pub async fn is_valid_encoding<R, D>(
    stream: &mut CsvStream<R>,
    detector: D,
) -> io::Result<EncodingVerdict>
where
    R: CsvSource,
    D: CharsetDetector,
{
    if stream.rewound(async |s: &mut CsvStream<R>| starts_with_bom(s).await).await? {
        debug!("UTF-8 BOM present, skipping charset detection");
        return Ok(EncodingVerdict::utf8_bom());
    }

    let content = stream
        .rewound(async |s: &mut CsvStream<R>| s.read_to_end().await)
        .await?;
    let charset = detect_charset(&content, detector);
    debug!(charset = ?charset, bytes = content.len(), "charset detection finished");
    Ok(resolve_charset(charset.as_deref()))
}

async fn starts_with_bom<R: CsvSource>(stream: &mut CsvStream<R>) -> io::Result<bool> {
    let mut head = [0u8; UTF8_BOM.len()];
    let mut filled = 0;
    while filled < head.len() {
        let n = stream.read_chunk(&mut head[filled..]).await?;
        if n == 0 {
            return Ok(false);
        }
        filled += n;
    }
    Ok(head == UTF8_BOM)
}

/// Feed `content` to `detector` chunk by chunk until it is confident or the
/// input runs out.
#[must_use]
pub fn detect_charset<D: CharsetDetector>(content: &[u8], mut detector: D) -> Option<String> {
    for chunk in content.chunks(DETECTION_CHUNK_SIZE) {
        if detector.feed(chunk) {
            break;
        }
    }
    detector.finish()
}
