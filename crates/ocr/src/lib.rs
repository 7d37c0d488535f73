//! Treasury OCR - Receipt field extraction.
//!
//! Given a raster image of a receipt, produces a best-effort structured guess
//! of the total price, the transaction date and the transaction time, plus the
//! raw recognized text for manual correction.
//!
//! # Strategy
//!
//! Receipts are photographed under uncontrolled lighting and angle by
//! non-technical users, so extraction optimizes for recall, not precision:
//!
//! 1. Normalize the image (grayscale, contrast stretch, sharpen).
//! 2. Run recognition three times under different page-segmentation
//!    assumptions; engines under the wrong assumption silently drop lines.
//! 3. If every pass comes back blank, retry once against the unprocessed
//!    image.
//! 4. Pick the longest non-empty result as the representative text and apply
//!    pattern-matching heuristics per field.
//!
//! Any engine failure degrades to three absent fields plus a diagnostic raw
//! text. The admin corrects wrong or missing values by hand afterwards, so a
//! wrong guess is acceptable; a blocked upload is not.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod engine;
pub mod parse;
pub mod preprocess;

use std::io::Cursor;
use std::sync::Arc;

use image::{DynamicImage, GrayImage, ImageFormat};
use thiserror::Error;

pub use engine::{OcrEngine, OcrError, SegmentationMode, TesseractCommand};

/// Segmentation modes for the three passes over the processed image.
const PASS_MODES: [SegmentationMode; 3] = [
    SegmentationMode::UniformBlock,
    SegmentationMode::SingleColumn,
    SegmentationMode::SparseText,
];

/// Internal extraction failure. Never surfaces to callers of
/// [`ReceiptExtractor::extract`]; it is folded into the diagnostic raw text.
#[derive(Debug, Error)]
enum ExtractError {
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
    #[error(transparent)]
    Ocr(#[from] OcrError),
}

/// Best-effort structured fields recovered from a receipt image.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedReceipt {
    /// Total price, when a plausible amount was found.
    pub price: Option<f64>,
    /// Transaction date, verbatim as it appeared in the text.
    pub date: Option<String>,
    /// Transaction time, verbatim as it appeared in the text.
    pub time: Option<String>,
    /// Representative recognized text, or a diagnostic message when
    /// recognition failed or found nothing.
    pub raw_text: String,
}

/// Receipt field extractor over a pluggable recognition engine.
#[derive(Clone)]
pub struct ReceiptExtractor {
    engine: Arc<dyn OcrEngine>,
}

impl ReceiptExtractor {
    /// Create an extractor over the given engine.
    #[must_use]
    pub fn new(engine: Arc<dyn OcrEngine>) -> Self {
        Self { engine }
    }

    /// Create an extractor driving a `tesseract` executable.
    #[must_use]
    pub fn tesseract(program: impl Into<std::path::PathBuf>) -> Self {
        Self::new(Arc::new(TesseractCommand::new(program)))
    }

    /// Extract price, date and time from an encoded receipt image.
    ///
    /// Never fails: engine errors and undecodable images yield absent fields
    /// and a diagnostic raw text. This call blocks on the recognition passes;
    /// run it on a blocking-friendly thread in async contexts.
    #[must_use]
    pub fn extract(&self, image_bytes: &[u8]) -> ExtractedReceipt {
        match self.recognize(image_bytes) {
            Ok(text) if text.trim().is_empty() => {
                tracing::debug!("no text recognized in receipt image");
                ExtractedReceipt {
                    price: None,
                    date: None,
                    time: None,
                    raw_text: "no text recognized in image".to_owned(),
                }
            }
            Ok(text) => ExtractedReceipt {
                price: parse::extract_price(&text),
                date: parse::extract_date(&text),
                time: parse::extract_time(&text),
                raw_text: text,
            },
            Err(e) => {
                tracing::warn!("receipt extraction failed: {e}");
                ExtractedReceipt {
                    price: None,
                    date: None,
                    time: None,
                    raw_text: format!("OCR failed: {e}"),
                }
            }
        }
    }

    /// Run the multi-pass recognition strategy and return the representative
    /// text (possibly empty when nothing was recognized).
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, ExtractError> {
        let original = image::load_from_memory(image_bytes)?;
        let processed = preprocess::prepare(&original);
        let processed_png = encode_gray_png(&processed)?;

        let mut results = Vec::with_capacity(PASS_MODES.len() + 1);
        for mode in PASS_MODES {
            results.push(self.engine.recognize(&processed_png, mode)?);
        }

        // All passes blank: one last try against the unprocessed image.
        if results.iter().all(|text| text.trim().is_empty()) {
            let original_png = encode_png(&original)?;
            results.push(
                self.engine
                    .recognize(&original_png, SegmentationMode::Automatic)?,
            );
        }

        Ok(pick_longest(&results).unwrap_or_default())
    }
}

/// Select the representative text: longest by trimmed character count among
/// non-empty candidates; ties resolve to the first candidate encountered.
fn pick_longest(candidates: &[String]) -> Option<String> {
    let mut best: Option<&String> = None;
    for candidate in candidates {
        let len = candidate.trim().chars().count();
        if len == 0 {
            continue;
        }
        match best {
            Some(current) if candidate.trim().chars().count() <= current.trim().chars().count() => {}
            _ => best = Some(candidate),
        }
    }
    best.cloned()
}

fn encode_gray_png(image: &GrayImage) -> Result<Vec<u8>, ExtractError> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}

fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, ExtractError> {
    let mut buffer = Vec::new();
    image.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Engine scripted to return a fixed output per pass, in call order.
    struct ScriptedEngine {
        outputs: Mutex<Vec<Result<String, OcrError>>>,
        calls: Mutex<Vec<SegmentationMode>>,
    }

    impl ScriptedEngine {
        fn new(outputs: Vec<Result<String, OcrError>>) -> Self {
            Self {
                outputs: Mutex::new(outputs),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl OcrEngine for ScriptedEngine {
        fn recognize(&self, _png: &[u8], mode: SegmentationMode) -> Result<String, OcrError> {
            self.calls.lock().expect("lock poisoned").push(mode);
            let mut outputs = self.outputs.lock().expect("lock poisoned");
            if outputs.is_empty() {
                Ok(String::new())
            } else {
                outputs.remove(0)
            }
        }
    }

    fn extractor_with(outputs: Vec<Result<String, OcrError>>) -> (ReceiptExtractor, Arc<ScriptedEngine>) {
        let engine = Arc::new(ScriptedEngine::new(outputs));
        (ReceiptExtractor::new(engine.clone()), engine)
    }

    fn tiny_png() -> Vec<u8> {
        let img = DynamicImage::new_luma8(8, 8);
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .expect("png encode");
        buffer
    }

    #[test]
    fn test_extracts_fields_from_representative_text() {
        let (extractor, _) = extractor_with(vec![
            Ok("Total: $45.00\n12/31/2023 2:30 PM".to_owned()),
            Ok(String::new()),
            Ok(String::new()),
        ]);

        let result = extractor.extract(&tiny_png());
        assert_eq!(result.price, Some(45.0));
        assert_eq!(result.date.as_deref(), Some("12/31/2023"));
        assert_eq!(result.time.as_deref(), Some("2:30 PM"));
        assert!(result.raw_text.contains("Total"));
    }

    #[test]
    fn test_picks_longest_trimmed_candidate() {
        let (extractor, _) = extractor_with(vec![
            Ok("short".to_owned()),
            Ok("a much longer recognition result".to_owned()),
            Ok("medium length text".to_owned()),
        ]);

        let result = extractor.extract(&tiny_png());
        assert_eq!(result.raw_text, "a much longer recognition result");
    }

    #[test]
    fn test_tie_resolves_to_first_candidate() {
        let (extractor, _) = extractor_with(vec![
            Ok("aaaa".to_owned()),
            Ok("bbbb".to_owned()),
            Ok("cc".to_owned()),
        ]);

        let result = extractor.extract(&tiny_png());
        assert_eq!(result.raw_text, "aaaa");
    }

    #[test]
    fn test_trimmed_length_decides() {
        // Padded whitespace must not count toward length.
        let (extractor, _) = extractor_with(vec![
            Ok("   ab   ".to_owned()),
            Ok("abcd".to_owned()),
            Ok(String::new()),
        ]);

        let result = extractor.extract(&tiny_png());
        assert_eq!(result.raw_text, "abcd");
    }

    #[test]
    fn test_blank_passes_fall_back_to_unprocessed_image() {
        let (extractor, engine) = extractor_with(vec![
            Ok(String::new()),
            Ok("   \n ".to_owned()),
            Ok(String::new()),
            Ok("Total 9.99".to_owned()),
        ]);

        let result = extractor.extract(&tiny_png());
        assert_eq!(result.price, Some(9.99));

        let calls = engine.calls.lock().expect("lock poisoned");
        assert_eq!(
            calls.as_slice(),
            &[
                SegmentationMode::UniformBlock,
                SegmentationMode::SingleColumn,
                SegmentationMode::SparseText,
                SegmentationMode::Automatic,
            ]
        );
    }

    #[test]
    fn test_no_fallback_when_a_pass_found_text() {
        let (extractor, engine) = extractor_with(vec![
            Ok("something".to_owned()),
            Ok(String::new()),
            Ok(String::new()),
        ]);

        extractor.extract(&tiny_png());
        assert_eq!(engine.calls.lock().expect("lock poisoned").len(), 3);
    }

    #[test]
    fn test_nothing_recognized_yields_diagnostic() {
        let (extractor, _) = extractor_with(vec![
            Ok(String::new()),
            Ok(String::new()),
            Ok(String::new()),
            Ok("  ".to_owned()),
        ]);

        let result = extractor.extract(&tiny_png());
        assert_eq!(result.price, None);
        assert_eq!(result.date, None);
        assert_eq!(result.time, None);
        assert!(!result.raw_text.trim().is_empty());
    }

    #[test]
    fn test_engine_failure_yields_diagnostic() {
        let (extractor, _) = extractor_with(vec![Err(OcrError::Unavailable(
            "tesseract not found".to_owned(),
        ))]);

        let result = extractor.extract(&tiny_png());
        assert_eq!(result.price, None);
        assert_eq!(result.date, None);
        assert_eq!(result.time, None);
        assert!(result.raw_text.contains("OCR failed"));
        assert!(result.raw_text.contains("tesseract not found"));
    }

    #[test]
    fn test_undecodable_image_yields_diagnostic() {
        let (extractor, engine) = extractor_with(vec![]);

        let result = extractor.extract(b"not an image");
        assert_eq!(result.price, None);
        assert!(result.raw_text.starts_with("OCR failed"));
        assert!(engine.calls.lock().expect("lock poisoned").is_empty());
    }

    #[test]
    fn test_pick_longest_empty_input() {
        assert_eq!(pick_longest(&[]), None);
        assert_eq!(pick_longest(&["  ".to_owned(), String::new()]), None);
    }
}
