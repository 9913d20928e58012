//! One scan run: sample → OCR each frame → NER over the joined text →
//! match → report. Strictly sequential; every transient file lives in the
//! run's own workspace.

use log::{debug, info};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::config::PipelineConfig;
use crate::core::error::{ScanError, ScanResult};
use crate::core::matching::{MatchRecord, NameMatcher, ReferenceNames};
use crate::core::ner::{self, EntityExtractor, NerModel};
use crate::core::ocr::{OcrEngine, TesseractEngine, TextRecognizer};
use crate::core::process::CancelFlag;
use crate::core::report::{ReportWriter, EXTRACTED_NAMES_FILE_NAME, REPORT_FILE_NAME};
use crate::core::video::sampler::validate_request;
use crate::core::video::{FfmpegSampler, FrameSampler};
use crate::core::workspace::RunWorkspace;

/// Where the video for a run comes from.
#[derive(Debug, Clone)]
pub enum VideoSource {
    /// An existing file, read in place.
    Path(PathBuf),
    /// Uploaded bytes, staged into the run's uploads area first.
    Upload { filename: String, data: Vec<u8> },
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub run_id: String,
    pub frame_count: usize,
    pub extracted_names: Vec<String>,
    pub matches: Vec<MatchRecord>,
    /// Deduplicated, sorted report rows.
    pub rows: Vec<String>,
    pub report_path: PathBuf,
    pub extracted_names_path: Option<PathBuf>,
}

pub struct ScanPipeline {
    config: PipelineConfig,
    sampler: Box<dyn FrameSampler>,
    recognizer: TextRecognizer,
    extractor: EntityExtractor,
    matcher: NameMatcher,
    cancel: CancelFlag,
}

impl ScanPipeline {
    /// ffmpeg + tesseract + the configured entity model.
    pub fn from_config(config: PipelineConfig) -> ScanResult<Self> {
        config.validate()?;
        let cancel = CancelFlag::new();
        let sampler = FfmpegSampler::from_config(&config).with_cancel_flag(cancel.clone());
        let ocr = TesseractEngine::from_config(&config).with_cancel_flag(cancel.clone());
        let model = ner::model_from_config(&config)?;

        let mut pipeline = Self::with_components(config, Box::new(sampler), Box::new(ocr), model);
        pipeline.cancel = cancel;
        Ok(pipeline)
    }

    pub fn with_components(
        config: PipelineConfig,
        sampler: Box<dyn FrameSampler>,
        ocr: Box<dyn OcrEngine>,
        model: Box<dyn NerModel>,
    ) -> Self {
        let recognizer = TextRecognizer::from_config(ocr, &config);
        Self {
            config,
            sampler,
            recognizer,
            extractor: EntityExtractor::new(model),
            matcher: NameMatcher::new(),
            cancel: CancelFlag::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Flag that aborts the run in progress. Tools built by `from_config`
    /// watch it too.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Loads the reference list from `reference_path`, then runs.
    pub fn run(&self, video: VideoSource, reference_path: &Path) -> ScanResult<ScanOutcome> {
        let reference = ReferenceNames::load(reference_path, self.config.reference_mode)?;
        self.run_with_reference(video, &reference)
    }

    pub fn run_with_reference(
        &self,
        video: VideoSource,
        reference: &ReferenceNames,
    ) -> ScanResult<ScanOutcome> {
        self.config.validate()?;
        if let VideoSource::Path(path) = &video {
            validate_request(path, self.config.sampling_rate)?;
        }

        let workspace = RunWorkspace::create(&self.config.work_root)?;
        let run_id = workspace.run_id().to_string();

        let video_path = match video {
            VideoSource::Path(path) => path,
            VideoSource::Upload { filename, data } => workspace.stage_upload(&filename, &data)?,
        };

        self.check_cancelled()?;
        let frames = self
            .sampler
            .sample(&video_path, workspace.frames_dir(), self.config.sampling_rate)?;

        let texts = self.recognizer.recognize_all(&frames, &self.cancel)?;
        workspace.purge_frames()?;

        let corpus = texts.join("\n");
        debug!("📜 Corpus: {} chars from {} frames", corpus.len(), frames.len());

        self.check_cancelled()?;
        let extracted_names = self.extractor.extract(&corpus)?;
        let matches = self.matcher.match_names(reference, &extracted_names);

        let report_path = workspace.outputs_dir().join(REPORT_FILE_NAME);
        let rows = ReportWriter::rows(matches.iter().map(|m| m.name.as_str()));
        ReportWriter::write(&report_path, rows.iter().map(String::as_str))?;

        let extracted_names_path = if self.config.write_extracted_names {
            let path = workspace.outputs_dir().join(EXTRACTED_NAMES_FILE_NAME);
            ReportWriter::write_extracted_names(&path, &extracted_names)?;
            Some(path)
        } else {
            None
        };

        workspace.finish()?;
        info!(
            "🎯 Run {}: {} frames, {} names, {} matches, {} report rows",
            run_id,
            frames.len(),
            extracted_names.len(),
            matches.len(),
            rows.len()
        );

        Ok(ScanOutcome {
            run_id,
            frame_count: frames.len(),
            extracted_names,
            matches,
            rows,
            report_path,
            extracted_names_path,
        })
    }

    fn check_cancelled(&self) -> ScanResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }
        Ok(())
    }
}
