use log::{debug, info};

use crate::core::config::PipelineConfig;
use crate::core::error::{ScanError, ScanResult};
use crate::core::ocr::engine::{OcrEngine, OcrError};
use crate::core::ocr::preprocess::{preprocess, DEFAULT_THRESHOLD};
use crate::core::process::CancelFlag;
use crate::core::video::Frame;

/// 帧文字识别：解码 → 二值化 → OCR
pub struct TextRecognizer {
    engine: Box<dyn OcrEngine>,
    language: String,
    threshold: u8,
}

impl TextRecognizer {
    pub fn new(engine: Box<dyn OcrEngine>) -> Self {
        Self {
            engine,
            language: "eng".to_string(),
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn from_config(engine: Box<dyn OcrEngine>, config: &PipelineConfig) -> Self {
        Self {
            engine,
            language: config.language.clone(),
            threshold: config.threshold,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Text for one frame; empty is a valid answer. A frame that can't be
    /// decoded fails the run.
    pub fn recognize(&self, frame: &Frame) -> ScanResult<String> {
        let image = image::open(&frame.path)
            .map_err(|e| ScanError::recognition(&frame.path, format!("decode failed: {}", e)))?;
        let binary = preprocess(&image, self.threshold);

        let text = self
            .engine
            .recognize(&binary, &self.language)
            .map_err(|e| match e {
                OcrError::Engine(reason) => ScanError::recognition(&frame.path, reason),
                OcrError::Timeout(after) => ScanError::Timeout {
                    tool: "ocr".to_string(),
                    after,
                },
                OcrError::Cancelled => ScanError::Cancelled,
            })?;

        debug!(
            "🔤 Frame {} @ {}ms: {} chars",
            frame.index,
            frame.timestamp_ms(),
            text.trim().len()
        );
        Ok(text)
    }

    /// Recognizes frames one at a time in the given order, checking `cancel`
    /// before each frame.
    pub fn recognize_all(&self, frames: &[Frame], cancel: &CancelFlag) -> ScanResult<Vec<String>> {
        let mut texts = Vec::with_capacity(frames.len());
        for frame in frames {
            if cancel.is_cancelled() {
                return Err(ScanError::Cancelled);
            }
            texts.push(self.recognize(frame)?);
        }
        let non_empty = texts.iter().filter(|t| !t.trim().is_empty()).count();
        info!("🔤 OCR done: {}/{} frames carried text", non_empty, frames.len());
        Ok(texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ocr::engine::MockOcrEngine;
    use image::{Rgb, RgbImage};
    use std::path::{Path, PathBuf};

    fn write_frame(dir: &Path, index: u64, fill: u8) -> Frame {
        let path = dir.join(format!("frame_{:06}.png", index));
        RgbImage::from_pixel(8, 8, Rgb([fill, fill, fill]))
            .save(&path)
            .unwrap();
        Frame::new(index, 1.0, path)
    }

    #[test]
    fn test_engine_receives_binarized_frame() {
        let tmp = tempfile::tempdir().unwrap();
        let bright = write_frame(tmp.path(), 1, 200);
        let dim = write_frame(tmp.path(), 2, 100);

        let engine = MockOcrEngine::with_pattern(|img| {
            if img.as_raw().iter().all(|&v| v == 255) {
                "white".to_string()
            } else if img.as_raw().iter().all(|&v| v == 0) {
                "black".to_string()
            } else {
                "mixed".to_string()
            }
        });
        let recognizer = TextRecognizer::new(Box::new(engine));

        assert_eq!(recognizer.recognize(&bright).unwrap(), "white");
        assert_eq!(recognizer.recognize(&dim).unwrap(), "black");
    }

    #[test]
    fn test_configured_language_is_passed_through() {
        let tmp = tempfile::tempdir().unwrap();
        let frame = write_frame(tmp.path(), 1, 200);
        let config = PipelineConfig {
            language: "fra".to_string(),
            ..Default::default()
        };
        let recognizer =
            TextRecognizer::from_config(Box::new(MockOcrEngine::with_script(["x"])), &config);
        assert_eq!(recognizer.language(), "fra");
        assert_eq!(recognizer.recognize(&frame).unwrap(), "x");
    }

    #[test]
    fn test_undecodable_frame_is_recognition_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("frame_000001.png");
        std::fs::write(&path, b"garbage, not a png").unwrap();
        let frame = Frame::new(1, 1.0, path.clone());

        let recognizer = TextRecognizer::new(Box::new(MockOcrEngine::with_script(["unused"])));
        match recognizer.recognize(&frame).unwrap_err() {
            ScanError::Recognition { path: p, .. } => assert_eq!(p, path),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_text_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let frames = vec![write_frame(tmp.path(), 1, 10), write_frame(tmp.path(), 2, 10)];
        let recognizer = TextRecognizer::new(Box::new(MockOcrEngine::with_script(["", "Jane Doe"])));

        let texts = recognizer.recognize_all(&frames, &CancelFlag::new()).unwrap();
        assert_eq!(texts, vec!["".to_string(), "Jane Doe".to_string()]);
    }

    #[test]
    fn test_cancel_stops_before_next_frame() {
        let tmp = tempfile::tempdir().unwrap();
        let frames = vec![write_frame(tmp.path(), 1, 10)];
        let cancel = CancelFlag::new();
        cancel.cancel();

        let engine = MockOcrEngine::with_script(["never"]);
        let recognizer = TextRecognizer::new(Box::new(engine));
        assert!(matches!(
            recognizer.recognize_all(&frames, &cancel),
            Err(ScanError::Cancelled)
        ));
    }

    #[test]
    fn test_missing_frame_file_is_recognition_failure() {
        let frame = Frame::new(1, 1.0, PathBuf::from("/nonexistent/frame_000001.png"));
        let recognizer = TextRecognizer::new(Box::new(MockOcrEngine::with_script(["x"])));
        assert!(matches!(
            recognizer.recognize(&frame),
            Err(ScanError::Recognition { .. })
        ));
    }
}
