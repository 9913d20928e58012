use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::core::error::{ScanError, ScanResult};

/// How reference lines are held once loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
    /// Duplicate lines collapse (set semantics).
    #[default]
    Tokens,
    /// Lines kept as an ordered list, duplicates included.
    FullNames,
}

/// Reference names, trimmed and lower-cased at load time. Immutable for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceNames {
    mode: ReferenceMode,
    entries: Vec<String>,
}

impl ReferenceNames {
    pub fn from_lines<I, S>(lines: I, mode: ReferenceMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let cleaned = lines
            .into_iter()
            .map(|l| l.as_ref().trim().to_lowercase())
            .filter(|l| !l.is_empty());

        let entries = match mode {
            ReferenceMode::Tokens => cleaned.collect::<BTreeSet<_>>().into_iter().collect(),
            ReferenceMode::FullNames => cleaned.collect(),
        };
        Self { mode, entries }
    }

    /// Reads a line-oriented reference file. A missing file is an input error.
    pub fn load(path: impl AsRef<Path>, mode: ReferenceMode) -> ScanResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ScanError::Input(format!("reference file not found: {:?}", path)));
        }
        let raw = std::fs::read_to_string(path).map_err(ScanError::fs(path))?;
        let names = Self::from_lines(raw.lines(), mode);
        info!("📋 Loaded {} reference entries from {:?} ({:?})", names.len(), path, mode);
        Ok(names)
    }

    pub fn mode(&self) -> ReferenceMode {
        self.mode
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
