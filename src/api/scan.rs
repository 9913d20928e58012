//! 片尾人名扫描器

use log::info;
use std::path::{Path, PathBuf};

use crate::api::models::ScanSummary;
use crate::core::config::PipelineConfig;
use crate::core::error::ScanResult;
use crate::core::pipeline::{ScanPipeline, VideoSource};

/// 片尾人名扫描器 - 抽帧 + OCR + NER + 名单比对
///
/// ```ignore
/// let scanner = CreditScanner::create(PipelineConfig::default())?;
/// let summary = scanner.scan_file("credits.mp4", Path::new("names.txt"))?;
/// println!("{:?}", summary.rows);
/// ```
pub struct CreditScanner {
    pipeline: ScanPipeline,
}

impl CreditScanner {
    /// Scanner backed by ffmpeg, tesseract and the configured entity model.
    pub fn create(config: PipelineConfig) -> ScanResult<Self> {
        crate::init_logging();
        let pipeline = ScanPipeline::from_config(config)?;
        info!("🎬 CreditScanner: created");
        Ok(Self { pipeline })
    }

    /// Scanner over a pre-assembled pipeline (custom engines).
    pub fn with_pipeline(pipeline: ScanPipeline) -> Self {
        Self { pipeline }
    }

    pub fn config(&self) -> &PipelineConfig {
        self.pipeline.config()
    }

    /// 扫描本地视频文件
    pub fn scan_file(&self, video: impl Into<PathBuf>, reference: &Path) -> ScanResult<ScanSummary> {
        let outcome = self.pipeline.run(VideoSource::Path(video.into()), reference)?;
        Ok(outcome.into())
    }

    /// 扫描上传的视频字节流
    pub fn scan_upload(
        &self,
        filename: impl Into<String>,
        data: Vec<u8>,
        reference: &Path,
    ) -> ScanResult<ScanSummary> {
        let source = VideoSource::Upload {
            filename: filename.into(),
            data,
        };
        let outcome = self.pipeline.run(source, reference)?;
        Ok(outcome.into())
    }

    /// Aborts the scan in progress (between frames, or by killing the running
    /// tool). Sticky: later scans on this scanner fail with `Cancelled`.
    pub fn cancel(&self) {
        info!("🛑 CreditScanner: cancel requested");
        self.pipeline.cancel_flag().cancel();
    }
}

impl Drop for CreditScanner {
    fn drop(&mut self) {
        info!("🗑️ CreditScanner: released");
    }
}
