//! Store snapshot persistence
//!
//! The engine keeps instances, approvals and escalations in memory. The
//! daemon writes a JSON snapshot after every sweep and reloads it on
//! start. Writes go to a sibling temp file first and are renamed into
//! place so a crash never leaves a half-written snapshot.

use crate::error::{DaemonError, DaemonResult};
use grc_workflow_engine::StoreSnapshot;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// JSON snapshot file
#[derive(Debug, Clone)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot; `None` when no file exists yet
    pub fn load(&self) -> DaemonResult<Option<StoreSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let snapshot = serde_json::from_reader(reader).map_err(|e| {
            DaemonError::State(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(Some(snapshot))
    }

    pub fn save(&self, snapshot: &StoreSnapshot) -> DaemonResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.tmp_path();
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut writer, snapshot)
                .map_err(|e| DaemonError::State(e.to_string()))?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        tracing::debug!(
            path = %self.path.display(),
            instances = snapshot.instances.len(),
            "State saved"
        );
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
