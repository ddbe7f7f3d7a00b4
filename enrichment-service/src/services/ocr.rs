//! Optical character recognition for receipt images.
//!
//! `TesseractOcr` shells out to the `tesseract` CLI and reads the text from
//! stdout; `MockOcr` returns canned text per file name.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Failed to start OCR engine {bin}: {source}")]
    Spawn {
        bin: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("No OCR text configured for {0}")]
    NotConfigured(String),
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// Raw text recognized in the image at `path`.
    async fn extract_text(&self, path: &Path) -> Result<String, OcrError>;
}

/// Runs `tesseract <image> stdout`.
pub struct TesseractOcr {
    bin: PathBuf,
}

impl TesseractOcr {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    #[instrument(skip(self), fields(image = %path.display()))]
    async fn extract_text(&self, path: &Path) -> Result<String, OcrError> {
        let output = Command::new(&self.bin)
            .arg(path)
            .arg("stdout")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| OcrError::Spawn {
                bin: self.bin.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(chars = text.len(), "OCR text extracted");
        Ok(text)
    }
}

/// Canned OCR results keyed by image file name.
#[derive(Default)]
pub struct MockOcr {
    texts: HashMap<String, Result<String, String>>,
    fallback: Option<String>,
}

impl MockOcr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, file_name: impl Into<String>, text: impl Into<String>) -> Self {
        self.texts.insert(file_name.into(), Ok(text.into()));
        self
    }

    pub fn with_failure(mut self, file_name: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.texts.insert(file_name.into(), Err(stderr.into()));
        self
    }

    /// Text returned for images without a canned entry.
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }
}

#[async_trait]
impl OcrEngine for MockOcr {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn extract_text(&self, path: &Path) -> Result<String, OcrError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        match self.texts.get(&file_name) {
            Some(Ok(text)) => Ok(text.clone()),
            Some(Err(stderr)) => Err(OcrError::Failed {
                status: "exit status: 1".to_string(),
                stderr: stderr.clone(),
            }),
            None => self
                .fallback
                .clone()
                .ok_or(OcrError::NotConfigured(file_name)),
        }
    }
}

/// Remove the currency symbols OCR reliably gets wrong in receipts.
pub fn strip_currency_symbols(text: &str) -> String {
    text.replace(['\u{20b9}', '\u{00a3}'], "")
}

/// Whether `path` names an image the OCR step should read.
pub fn is_receipt_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| matches!(ext.as_str(), "png" | "jpg" | "jpeg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_symbols_are_stripped() {
        assert_eq!(
            strip_currency_symbols("Amount: ₹1,250.00 (£12)"),
            "Amount: 1,250.00 (12)"
        );
    }

    #[test]
    fn image_detection_ignores_case() {
        assert!(is_receipt_image(Path::new("receipt.PNG")));
        assert!(is_receipt_image(Path::new("scan.jpeg")));
        assert!(is_receipt_image(Path::new("a/b/photo.Jpg")));
        assert!(!is_receipt_image(Path::new("statement.pdf")));
        assert!(!is_receipt_image(Path::new("png")));
    }

    #[tokio::test]
    async fn mock_returns_canned_text_by_file_name() {
        let ocr = MockOcr::new().with_text("receipt.png", "Transaction ID: T1");
        let text = ocr
            .extract_text(Path::new("/tmp/unit/receipt.png"))
            .await
            .unwrap();
        assert_eq!(text, "Transaction ID: T1");

        let missing = ocr.extract_text(Path::new("/tmp/unit/other.png")).await;
        assert!(matches!(missing, Err(OcrError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn missing_tesseract_binary_is_a_spawn_error() {
        let ocr = TesseractOcr::new("/nonexistent/bin/tesseract");
        let result = ocr.extract_text(Path::new("receipt.png")).await;
        assert!(matches!(result, Err(OcrError::Spawn { .. })));
    }
}
