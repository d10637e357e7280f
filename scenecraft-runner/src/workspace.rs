//! Per-run working directories
//!
//! Every execution attempt gets a fresh directory under the work root, named
//! `<unix-timestamp>_<8 hex chars>`. The directory is created exclusively so
//! two runs can never share one.

use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// File name the script is written to inside the run directory
pub const SCRIPT_FILE_NAME: &str = "scene_script.py";

const CREATE_ATTEMPTS: usize = 5;

/// A run directory holding one script
#[derive(Debug, Clone)]
pub struct RunWorkspace {
    id: String,
    dir: PathBuf,
    script_path: PathBuf,
}

impl RunWorkspace {
    /// Creates a fresh run directory under `root` and writes the script into it
    ///
    /// # Arguments
    /// * `root` - Parent directory, created if missing
    /// * `code` - Script source
    pub fn create(root: &Path, code: &str) -> Result<Self> {
        std::fs::create_dir_all(root)
            .with_context(|| format!("Failed to create work root {}", root.display()))?;

        let (id, dir) = create_unique_dir(root)?;
        let script_path = dir.join(SCRIPT_FILE_NAME);

        std::fs::write(&script_path, code)
            .with_context(|| format!("Failed to write script {}", script_path.display()))?;

        debug!("Created run directory {}", dir.display());

        Ok(Self {
            id,
            dir,
            script_path,
        })
    }

    /// Run identifier, also the directory name
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }
}

fn create_unique_dir(root: &Path) -> Result<(String, PathBuf)> {
    for _ in 0..CREATE_ATTEMPTS {
        let id = new_run_id();
        let dir = root.join(&id);

        match std::fs::create_dir(&dir) {
            Ok(()) => return Ok((id, dir)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to create run directory {}", dir.display()));
            }
        }
    }

    anyhow::bail!(
        "Failed to create a unique run directory under {}",
        root.display()
    )
}

fn new_run_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{}", chrono::Utc::now().timestamp(), &suffix[..8])
}
