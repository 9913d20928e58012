use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{ScanError, ScanResult};
use crate::core::matching::ReferenceMode;

/// Which entity model the extractor consults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NerBackend {
    /// JSON-over-HTTP entity service (e.g. a spaCy server).
    Http { endpoint: String },
    /// Offline tagger: runs of capitalized words on one line.
    CapitalizedRuns,
}

impl Default for NerBackend {
    fn default() -> Self {
        NerBackend::CapitalizedRuns
    }
}

/// Per-run pipeline settings. Nothing here is process-global; every run gets
/// its own copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Parent of the per-run `<uuid>/` workspaces.
    pub work_root: PathBuf,
    /// Frames exported per second of video.
    pub sampling_rate: f64,
    /// OCR language code.
    pub language: String,
    /// Global binary threshold cutoff (pixels above become white).
    pub threshold: u8,
    pub reference_mode: ReferenceMode,
    pub ner: NerBackend,
    pub ffmpeg_bin: String,
    pub ffprobe_bin: String,
    pub tesseract_bin: String,
    pub ffmpeg_timeout_secs: u64,
    pub ocr_timeout_secs: u64,
    pub ner_timeout_secs: u64,
    /// Also persist the raw extracted-name list next to the report.
    pub write_extracted_names: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_root: std::env::temp_dir().join("credit_scan"),
            sampling_rate: 1.0,
            language: "eng".to_string(),
            threshold: 150,
            reference_mode: ReferenceMode::Tokens,
            ner: NerBackend::default(),
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            tesseract_bin: "tesseract".to_string(),
            ffmpeg_timeout_secs: 600,
            ocr_timeout_secs: 30,
            ner_timeout_secs: 120,
            write_extracted_names: false,
        }
    }
}

impl PipelineConfig {
    /// Rolling credits scroll past faster than static captions.
    pub fn for_rolling_credits() -> Self {
        Self {
            sampling_rate: 2.0,
            ffmpeg_timeout_secs: 1200,
            ..Default::default()
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ScanResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(ScanError::fs(path))?;
        let config: PipelineConfig = serde_json::from_str(&raw)
            .map_err(|e| ScanError::Input(format!("invalid config {:?}: {}", path, e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ScanResult<()> {
        if !self.sampling_rate.is_finite() || self.sampling_rate <= 0.0 {
            return Err(ScanError::Input(format!(
                "sampling rate must be a positive number, got {}",
                self.sampling_rate
            )));
        }
        if self.language.trim().is_empty() {
            return Err(ScanError::Input("OCR language must not be empty".into()));
        }
        if let NerBackend::Http { endpoint } = &self.ner {
            if endpoint.trim().is_empty() {
                return Err(ScanError::Input("NER endpoint must not be empty".into()));
            }
        }
        Ok(())
    }

    pub fn ffmpeg_timeout(&self) -> Option<Duration> {
        secs_to_timeout(self.ffmpeg_timeout_secs)
    }

    pub fn ocr_timeout(&self) -> Option<Duration> {
        secs_to_timeout(self.ocr_timeout_secs)
    }

    pub fn ner_timeout(&self) -> Option<Duration> {
        secs_to_timeout(self.ner_timeout_secs)
    }
}

// 0 disables the limit
fn secs_to_timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sampling_rate, 1.0);
        assert_eq!(config.threshold, 150);
        assert_eq!(config.language, "eng");
        assert_eq!(config.ocr_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_rejects_bad_sampling_rate() {
        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let config = PipelineConfig {
                sampling_rate: rate,
                ..Default::default()
            };
            assert!(config.validate().unwrap_err().is_input_error());
        }
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{
            "sampling_rate": 0.5,
            "ner": { "kind": "http", "endpoint": "http://localhost:8080/ner" },
            "ocr_timeout_secs": 0
        }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.sampling_rate, 0.5);
        assert_eq!(
            config.ner,
            NerBackend::Http {
                endpoint: "http://localhost:8080/ner".to_string()
            }
        );
        assert_eq!(config.ocr_timeout(), None);
        assert_eq!(config.language, "eng");
        assert_eq!(config.reference_mode, ReferenceMode::Tokens);
    }

    #[test]
    fn test_rolling_credits_preset() {
        let config = PipelineConfig::for_rolling_credits();
        assert_eq!(config.sampling_rate, 2.0);
        assert!(config.validate().is_ok());
    }
}
