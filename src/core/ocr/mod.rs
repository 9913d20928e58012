//! 帧文字识别：固定预处理 + 外部 OCR 引擎

pub mod engine;
pub mod preprocess;
pub mod recognizer;

pub use engine::{MockOcrEngine, OcrEngine, OcrError, TesseractEngine};
pub use preprocess::{binarize, luminance, preprocess, DEFAULT_THRESHOLD};
pub use recognizer::TextRecognizer;
