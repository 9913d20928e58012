//! Run-scoped working directories.
//!
//! Every run owns `<work_root>/<run-id>/{uploads,frames,outputs}`. Dropping a
//! workspace that was never finished removes the whole run directory, so a
//! failed run leaves nothing behind. `finish` keeps only `outputs/`.

use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::core::error::{ScanError, ScanResult};

pub struct RunWorkspace {
    run_id: Uuid,
    root: PathBuf,
    uploads: PathBuf,
    frames: PathBuf,
    outputs: PathBuf,
    finished: bool,
}

impl RunWorkspace {
    pub fn create(work_root: &Path) -> ScanResult<Self> {
        let run_id = Uuid::new_v4();
        let root = work_root.join(run_id.to_string());
        let uploads = root.join("uploads");
        let frames = root.join("frames");
        let outputs = root.join("outputs");

        for dir in [&uploads, &frames, &outputs] {
            fs::create_dir_all(dir).map_err(ScanError::fs(dir))?;
        }

        info!("📁 Run {} workspace at {:?}", run_id, root);
        Ok(Self {
            run_id,
            root,
            uploads,
            frames,
            outputs,
            finished: false,
        })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads
    }

    pub fn frames_dir(&self) -> &Path {
        &self.frames
    }

    pub fn outputs_dir(&self) -> &Path {
        &self.outputs
    }

    /// Writes uploaded video bytes into `uploads/`, keeping only the base name
    /// of the caller's filename.
    pub fn stage_upload(&self, filename: &str, data: &[u8]) -> ScanResult<PathBuf> {
        let base = Path::new(filename)
            .file_name()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| ScanError::Input(format!("invalid upload filename {:?}", filename)))?;
        if data.is_empty() {
            return Err(ScanError::Input(format!("uploaded video {:?} is empty", filename)));
        }

        let target = self.uploads.join(base);
        fs::write(&target, data).map_err(ScanError::fs(&target))?;
        debug!("📥 Staged {} bytes to {:?}", data.len(), target);
        Ok(target)
    }

    /// Deletes every exported frame; the directory itself stays.
    pub fn purge_frames(&self) -> ScanResult<()> {
        let entries = fs::read_dir(&self.frames).map_err(ScanError::fs(&self.frames))?;
        let mut removed = 0usize;
        for entry in entries {
            let path = entry.map_err(ScanError::fs(&self.frames))?.path();
            if path.is_file() {
                fs::remove_file(&path).map_err(ScanError::fs(&path))?;
                removed += 1;
            }
        }
        debug!("🧹 Purged {} frame files", removed);
        Ok(())
    }

    /// Marks the run successful: uploads and frames go, outputs stay.
    pub fn finish(mut self) -> ScanResult<PathBuf> {
        self.finished = true;
        for dir in [&self.uploads, &self.frames] {
            if dir.exists() {
                fs::remove_dir_all(dir).map_err(ScanError::fs(dir))?;
            }
        }
        info!("✅ Run {} finished, outputs kept at {:?}", self.run_id, self.outputs);
        Ok(self.outputs.clone())
    }
}

impl Drop for RunWorkspace {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        match fs::remove_dir_all(&self.root) {
            Ok(()) => info!("🗑️ Run {} aborted, removed {:?}", self.run_id, self.root),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("⚠️ Could not remove run dir {:?}: {}", self.root, e),
        }
    }
}
