use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::error::{ScanError, ScanResult};

/// Output pattern handed to the frame exporter.
pub const FRAME_FILE_PATTERN: &str = "frame_%06d.png";

static FRAME_FILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^frame_(\d+)\.png$").expect("static regex"));

/// 采样帧（按 index 排序，而非文件名）
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// 1-based position in the sampled sequence
    pub index: u64,
    pub timestamp: Duration,
    pub path: PathBuf,
}

impl Frame {
    pub fn new(index: u64, sampling_rate: f64, path: PathBuf) -> Self {
        let secs = index.saturating_sub(1) as f64 / sampling_rate;
        // tiny rates overflow Duration; saturate instead
        let timestamp = Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX);
        Self {
            index,
            timestamp,
            path,
        }
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp.as_millis() as u64
    }

    /// Parses the sequence index out of an exporter file name.
    pub fn index_from_file_name(name: &str) -> Option<u64> {
        FRAME_FILE_RE
            .captures(name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

/// Lists exported frames in `dir`, sorted by their numeric index. Files that
/// don't follow the exporter pattern are ignored.
pub fn collect_frames(dir: &Path, sampling_rate: f64) -> ScanResult<Vec<Frame>> {
    let mut frames = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(ScanError::fs(dir))? {
        let path = entry.map_err(ScanError::fs(dir))?.path();
        if !path.is_file() {
            continue;
        }
        let index = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(Frame::index_from_file_name);
        if let Some(index) = index {
            frames.push(Frame::new(index, sampling_rate, path));
        }
    }
    frames.sort_by_key(|f| f.index);
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = Frame::new(3, 1.0, PathBuf::from("frame_000003.png"));
        assert_eq!(frame.index, 3);
        assert_eq!(frame.timestamp_ms(), 2000);

        let frame = Frame::new(5, 2.0, PathBuf::from("frame_000005.png"));
        assert_eq!(frame.timestamp_ms(), 2000);
    }

    #[test]
    fn test_tiny_rate_saturates_timestamp() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["frame_000001.png", "frame_000002.png"] {
            std::fs::write(tmp.path().join(name), b"x").unwrap();
        }

        let frames = collect_frames(tmp.path(), 1e-20).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].timestamp, Duration::ZERO);
        assert_eq!(frames[1].timestamp, Duration::MAX);
    }

    #[test]
    fn test_index_from_file_name() {
        assert_eq!(Frame::index_from_file_name("frame_000042.png"), Some(42));
        assert_eq!(Frame::index_from_file_name("frame_7.png"), Some(7));
        assert_eq!(Frame::index_from_file_name("frame_abc.png"), None);
        assert_eq!(Frame::index_from_file_name("frame_000001.jpg"), None);
        assert_eq!(Frame::index_from_file_name("thumb_000001.png"), None);
    }

    #[test]
    fn test_collect_orders_numerically_not_lexically() {
        let tmp = tempfile::tempdir().unwrap();
        // mixed widths: lexical order would put 10 before 9
        for name in ["frame_10.png", "frame_9.png", "frame_0001.png", "notes.txt"] {
            std::fs::write(tmp.path().join(name), b"x").unwrap();
        }

        let frames = collect_frames(tmp.path(), 1.0).unwrap();
        let indices: Vec<u64> = frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![1, 9, 10]);
    }

    #[test]
    fn test_collect_missing_dir_is_filesystem_error() {
        let err = collect_frames(Path::new("/nonexistent/credit_scan/frames"), 1.0).unwrap_err();
        assert!(matches!(err, ScanError::Filesystem { .. }));
    }
}
