//! Entry point tying the basic checks to format-specific checks.

use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, error, warn};

use crate::basic::perform_basic_checks;
use crate::encoding::{ChardetngDetector, CharsetDetector};
use crate::error::{CheckError, CheckErrorKind};
use crate::messages;
use crate::report::{CsvFormatCheckResult, FormatCheckErrorMessage};
use crate::stream::{CsvSource, CsvStream};

/// Format-specific checks for one CSV dialect.
///
/// Only runs after the basic checks passed, so implementations can assume a
/// non-empty file in an accepted encoding within the record ceiling.
#[async_trait]
pub trait FormatChecker<R>: Send + Sync
where
    R: CsvSource + Send,
{
    /// Append any problems found to `result`.
    ///
    /// The stream is at offset 0 on entry and may be read freely; the
    /// caller rewinds it afterwards.
    ///
    /// # Errors
    ///
    /// An error aborts the run; the caller reports it as a single
    /// unexpected-error entry instead of anything appended so far.
    async fn perform_specific_checks(
        &self,
        stream: &mut CsvStream<R>,
        result: &mut CsvFormatCheckResult,
    ) -> Result<(), CheckError>;
}

/// Dialect with no checks beyond the basic ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpecificChecks;

#[async_trait]
impl<R> FormatChecker<R> for NoSpecificChecks
where
    R: CsvSource + Send,
{
    async fn perform_specific_checks(
        &self,
        _stream: &mut CsvStream<R>,
        _result: &mut CsvFormatCheckResult,
    ) -> Result<(), CheckError> {
        Ok(())
    }
}

/// Owns a CSV stream for its whole lifetime and checks it.
///
/// Dropping the checker drops (and so closes) the stream.
pub struct CsvFormatChecker<R, F, D = ChardetngDetector> {
    stream: CsvStream<R>,
    checks: F,
    detector: PhantomData<fn() -> D>,
}

impl<R, F> CsvFormatChecker<R, F, ChardetngDetector>
where
    R: CsvSource + Send,
    F: FormatChecker<R>,
{
    /// Checker using `chardetng` for encoding detection.
    #[must_use]
    pub fn new(source: R, checks: F) -> Self {
        Self::with_detector(source, checks)
    }
}

impl<R, F, D> CsvFormatChecker<R, F, D>
where
    R: CsvSource + Send,
    F: FormatChecker<R>,
    D: CharsetDetector + Default,
{
    /// Checker using `D` for encoding detection; a fresh `D` is built per run.
    #[must_use]
    pub fn with_detector(source: R, checks: F) -> Self {
        Self {
            stream: CsvStream::new(source),
            checks,
            detector: PhantomData,
        }
    }

    /// Validate the stream.
    ///
    /// Runs the basic checks and, only if they report nothing, the
    /// format-specific checks against a fresh result. Never fails: any error,
    /// including a panic inside a check, becomes a single file-level
    /// "unexpected error" entry. The stream is back at offset 0 when this
    /// returns.
    pub async fn check_format(&mut self) -> CsvFormatCheckResult {
        let outcome = AssertUnwindSafe(self.run_checks())
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(CheckError::from_panic(&*payload)));

        if let Err(e) = self.stream.reset_to_start().await {
            warn!(error = %e, "failed to rewind CSV stream after checking");
        }

        match outcome {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "unexpected failure while checking CSV format");
                CsvFormatCheckResult::with_error(
                    FormatCheckErrorMessage::file_level(messages::UNEXPECTED_ERROR)
                        .with_kind(CheckErrorKind::Unexpected),
                )
            }
        }
    }

    async fn run_checks(&mut self) -> Result<CsvFormatCheckResult, CheckError> {
        let basic = perform_basic_checks(&mut self.stream, D::default()).await?;
        if basic.has_errors() {
            debug!("skipping format-specific checks");
            return Ok(basic);
        }

        let mut result = CsvFormatCheckResult::default();
        self.stream.reset_to_start().await?;
        self.checks
            .perform_specific_checks(&mut self.stream, &mut result)
            .await?;
        debug!(errors = result.errors_count(), "format-specific checks finished");
        Ok(result)
    }

    /// Release the underlying source.
    #[must_use]
    pub fn into_source(self) -> R {
        self.stream.into_inner()
    }
}
