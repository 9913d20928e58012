use image::{GrayImage, ImageOutputFormat};
use log::debug;
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

use crate::core::config::PipelineConfig;
use crate::core::process::{CancelFlag, ToolCommand, ToolError};

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("{0}")]
    Engine(String),
    #[error("OCR timed out after {0:?}")]
    Timeout(Duration),
    #[error("OCR cancelled")]
    Cancelled,
}

impl From<ToolError> for OcrError {
    fn from(e: ToolError) -> Self {
        match e {
            ToolError::Spawn(e) => OcrError::Engine(format!("failed to launch OCR engine: {}", e)),
            ToolError::Io(e) => OcrError::Engine(format!("OCR engine i/o error: {}", e)),
            ToolError::TimedOut(after) => OcrError::Timeout(after),
            ToolError::Cancelled => OcrError::Cancelled,
        }
    }
}

/// Opaque `image -> text` recognition, restricted to one language per call.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &GrayImage, language: &str) -> Result<String, OcrError>;
}

/// Runs the `tesseract` CLI, piping the binarized frame in as PNG.
pub struct TesseractEngine {
    bin: String,
    timeout: Option<Duration>,
    thread_limit: usize,
    cancel: Option<CancelFlag>,
}

impl TesseractEngine {
    pub fn new() -> Self {
        Self::from_config(&PipelineConfig::default())
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            bin: config.tesseract_bin.clone(),
            timeout: config.ocr_timeout(),
            thread_limit: num_cpus::get().min(4),
            cancel: None,
        }
    }

    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &GrayImage, language: &str) -> Result<String, OcrError> {
        let png = encode_png(image)?;
        debug!(
            "🔤 tesseract: {}x{} frame, {} bytes, lang={}",
            image.width(),
            image.height(),
            png.len(),
            language
        );

        let output = ToolCommand::new(&self.bin)
            .args(["stdin", "stdout", "-l", language])
            .env("OMP_THREAD_LIMIT", self.thread_limit.to_string())
            .stdin_bytes(png)
            .timeout(self.timeout)
            .cancel_flag(self.cancel.clone())
            .run()?;

        if !output.success() {
            return Err(OcrError::Engine(format!(
                "tesseract exited with {}: {}",
                output.status,
                output.stderr_tail()
            )));
        }
        Ok(output.stdout_text())
    }
}

fn encode_png(image: &GrayImage) -> Result<Vec<u8>, OcrError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .map_err(|e| OcrError::Engine(format!("PNG encode failed: {}", e)))?;
    Ok(buffer.into_inner())
}

/// Test double: answers from a script (in call order) or from a closure over
/// the preprocessed image.
pub struct MockOcrEngine {
    script: Mutex<VecDeque<String>>,
    pattern: Option<Box<dyn Fn(&GrayImage) -> String + Send + Sync>>,
    languages: Mutex<Vec<String>>,
}

impl MockOcrEngine {
    pub fn with_script<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(texts.into_iter().map(Into::into).collect()),
            pattern: None,
            languages: Mutex::new(Vec::new()),
        }
    }

    pub fn with_pattern<F>(pattern: F) -> Self
    where
        F: Fn(&GrayImage) -> String + Send + Sync + 'static,
    {
        Self {
            script: Mutex::new(VecDeque::new()),
            pattern: Some(Box::new(pattern)),
            languages: Mutex::new(Vec::new()),
        }
    }

    /// Languages seen so far, one entry per call.
    pub fn calls(&self) -> Vec<String> {
        self.languages.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl OcrEngine for MockOcrEngine {
    fn recognize(&self, image: &GrayImage, language: &str) -> Result<String, OcrError> {
        if let Ok(mut langs) = self.languages.lock() {
            langs.push(language.to_string());
        }
        if let Some(pattern) = &self.pattern {
            return Ok(pattern(image));
        }
        let next = self
            .script
            .lock()
            .map_err(|_| OcrError::Engine("mock script lock poisoned".into()))?
            .pop_front();
        Ok(next.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_script_runs_in_order_then_empty() {
        let engine = MockOcrEngine::with_script(["first", "second"]);
        let img = GrayImage::new(2, 2);
        assert_eq!(engine.recognize(&img, "eng").unwrap(), "first");
        assert_eq!(engine.recognize(&img, "eng").unwrap(), "second");
        assert_eq!(engine.recognize(&img, "eng").unwrap(), "");
        assert_eq!(engine.calls(), vec!["eng", "eng", "eng"]);
    }

    #[test]
    fn test_mock_pattern_sees_image() {
        let engine = MockOcrEngine::with_pattern(|img| format!("{}x{}", img.width(), img.height()));
        let img = GrayImage::new(3, 5);
        assert_eq!(engine.recognize(&img, "deu").unwrap(), "3x5");
    }

    #[test]
    fn test_encode_png_signature() {
        let png = encode_png(&GrayImage::new(4, 4)).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn test_missing_tesseract_is_engine_error() {
        let config = PipelineConfig {
            tesseract_bin: "no-such-tesseract-binary".to_string(),
            ..Default::default()
        };
        let engine = TesseractEngine::from_config(&config);
        let err = engine.recognize(&GrayImage::new(4, 4), "eng").unwrap_err();
        assert!(matches!(err, OcrError::Engine(_)));
    }
}
