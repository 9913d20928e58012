pub mod config;
pub mod error;
pub mod matching;
pub mod ner;
pub mod ocr;
pub mod pipeline;
pub mod process;
pub mod report;
pub mod video;
pub mod workspace;

pub use config::{NerBackend, PipelineConfig};
pub use error::{ScanError, ScanResult};
pub use pipeline::{ScanOutcome, ScanPipeline, VideoSource};
