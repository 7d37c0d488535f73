//! Recognition engine abstraction.
//!
//! The extractor talks to the engine through the [`OcrEngine`] trait so tests
//! can script recognition output. The production implementation drives the
//! `tesseract` executable over stdin/stdout, which avoids linking against the
//! native library.

use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use thiserror::Error;

/// Assumed visual layout of the input image.
///
/// Affects how the engine groups characters into words and lines. Receipts
/// photographed at an angle often recognize better under one assumption than
/// another, which is why extraction runs several passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentationMode {
    /// Let the engine pick its own layout analysis.
    Automatic,
    /// A single uniform block of text.
    UniformBlock,
    /// A single column of text of variable sizes.
    SingleColumn,
    /// Sparse, scattered text.
    SparseText,
}

impl SegmentationMode {
    /// Tesseract `--psm` value for this mode, if any.
    #[must_use]
    pub const fn psm(self) -> Option<&'static str> {
        match self {
            Self::Automatic => None,
            Self::UniformBlock => Some("6"),
            Self::SingleColumn => Some("4"),
            Self::SparseText => Some("11"),
        }
    }
}

/// Errors from a recognition pass.
#[derive(Debug, Error)]
pub enum OcrError {
    /// The engine executable could not be found or started.
    #[error("recognition engine unavailable: {0}")]
    Unavailable(String),

    /// The engine ran but reported a failure.
    #[error("recognition failed: {0}")]
    Recognition(String),

    /// I/O error while feeding the engine or reading its output.
    #[error("recognition i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// A text recognition engine.
///
/// `recognize` takes PNG-encoded image bytes and returns the recognized text.
/// An empty or whitespace-only string is a valid result (no text found), not
/// an error.
pub trait OcrEngine: Send + Sync {
    /// Recognize text in a PNG-encoded image under the given layout assumption.
    fn recognize(&self, png: &[u8], mode: SegmentationMode) -> Result<String, OcrError>;
}

/// [`OcrEngine`] implementation that shells out to the `tesseract` binary.
#[derive(Debug, Clone)]
pub struct TesseractCommand {
    program: PathBuf,
    language: String,
}

impl TesseractCommand {
    /// Create an engine driving the given `tesseract` executable.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            language: "eng".to_owned(),
        }
    }

    /// Override the recognition language (default `eng`).
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}

impl Default for TesseractCommand {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

impl OcrEngine for TesseractCommand {
    fn recognize(&self, png: &[u8], mode: SegmentationMode) -> Result<String, OcrError> {
        let mut command = Command::new(&self.program);
        command
            .args(["stdin", "stdout"])
            .args(["-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(psm) = mode.psm() {
            command.args(["--psm", psm]);
        }

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                OcrError::Unavailable(format!("{} not found", self.program.display()))
            } else {
                OcrError::Io(e)
            }
        })?;

        // stdin is piped above, so take() always succeeds
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(png)?;
        }

        let output = child.wait_with_output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(stderr.trim().to_owned()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_psm_values() {
        assert_eq!(SegmentationMode::Automatic.psm(), None);
        assert_eq!(SegmentationMode::UniformBlock.psm(), Some("6"));
        assert_eq!(SegmentationMode::SingleColumn.psm(), Some("4"));
        assert_eq!(SegmentationMode::SparseText.psm(), Some("11"));
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let engine = TesseractCommand::new("definitely-not-a-real-ocr-binary");
        let result = engine.recognize(&[], SegmentationMode::Automatic);
        assert!(matches!(result, Err(OcrError::Unavailable(_))));
    }
}
