//! 视频抽帧（ffmpeg，固定采样率）

use log::{debug, info, warn};
use std::path::Path;
use std::time::Duration;

use crate::core::config::PipelineConfig;
use crate::core::error::{ScanError, ScanResult};
use crate::core::process::{CancelFlag, ToolCommand};
use crate::core::video::frame::{collect_frames, Frame, FRAME_FILE_PATTERN};

pub trait FrameSampler: Send + Sync {
    /// Decomposes `video` into numbered stills under `frames_dir`, returned in
    /// ascending index order.
    fn sample(&self, video: &Path, frames_dir: &Path, sampling_rate: f64) -> ScanResult<Vec<Frame>>;
}

pub struct FfmpegSampler {
    ffmpeg_bin: String,
    ffprobe_bin: String,
    timeout: Option<Duration>,
    cancel: Option<CancelFlag>,
}

impl FfmpegSampler {
    pub fn new() -> Self {
        Self::from_config(&PipelineConfig::default())
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            ffmpeg_bin: config.ffmpeg_bin.clone(),
            ffprobe_bin: config.ffprobe_bin.clone(),
            timeout: config.ffmpeg_timeout(),
            cancel: None,
        }
    }

    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn is_available(&self) -> bool {
        ToolCommand::new(&self.ffmpeg_bin)
            .arg("-version")
            .timeout(Some(Duration::from_secs(10)))
            .run()
            .map(|o| o.success())
            .unwrap_or(false)
    }

    /// Container duration in seconds, or `None` when ffprobe can't tell.
    pub fn probe_duration(&self, video: &Path) -> Option<f64> {
        let output = ToolCommand::new(&self.ffprobe_bin)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "csv=p=0"])
            .arg(video)
            .timeout(self.timeout)
            .cancel_flag(self.cancel.clone())
            .run()
            .ok()?;
        if !output.success() {
            debug!("ffprobe failed: {}", output.stderr_tail());
            return None;
        }
        output.stdout_text().trim().parse::<f64>().ok()
    }
}

impl Default for FfmpegSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSampler for FfmpegSampler {
    fn sample(&self, video: &Path, frames_dir: &Path, sampling_rate: f64) -> ScanResult<Vec<Frame>> {
        validate_request(video, sampling_rate)?;
        std::fs::create_dir_all(frames_dir).map_err(ScanError::fs(frames_dir))?;

        if let Some(duration) = self.probe_duration(video) {
            info!(
                "🎬 {:?}: {:.1}s, expecting ~{} frames at {} fps",
                video,
                duration,
                (duration * sampling_rate).round() as u64,
                sampling_rate
            );
        }

        let output = ToolCommand::new(&self.ffmpeg_bin)
            .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
            .arg(video)
            .arg("-vf")
            .arg(format!("fps={}", sampling_rate))
            .arg(frames_dir.join(FRAME_FILE_PATTERN))
            .timeout(self.timeout)
            .cancel_flag(self.cancel.clone())
            .run()
            .map_err(|e| e.into_scan_error(&self.ffmpeg_bin, ScanError::Extraction))?;

        if !output.success() {
            let diagnostic = output.stderr_tail();
            warn!("❌ ffmpeg exited with {}: {}", output.status, diagnostic);
            return Err(ScanError::Extraction(format!(
                "ffmpeg exited with {}: {}",
                output.status, diagnostic
            )));
        }

        let frames = collect_frames(frames_dir, sampling_rate)?;
        info!("🖼️ Extracted {} frames to {:?}", frames.len(), frames_dir);
        Ok(frames)
    }
}

pub(crate) fn validate_request(video: &Path, sampling_rate: f64) -> ScanResult<()> {
    if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
        return Err(ScanError::Input(format!(
            "sampling rate must be a positive number, got {}",
            sampling_rate
        )));
    }
    if !video.is_file() {
        return Err(ScanError::Input(format!("video not found: {:?}", video)));
    }
    Ok(())
}
