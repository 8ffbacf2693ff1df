use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory unusable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Creates `dir` when missing and checks that files can be created in it.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    let unusable = |err: io::Error| PersistError::OutputDir(format!("{}: {err}", dir.display()));
    fs::create_dir_all(dir).map_err(unusable)?;
    if !dir.is_dir() {
        return Err(PersistError::OutputDir(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    staging_file(dir).map_err(unusable)?;
    Ok(())
}

/// Output folder for processed images and zips.
///
/// Bytes are staged in a hidden `.wm-*.part` file next to the target and
/// renamed over it, so readers only ever see complete files. The rename
/// replaces an older file of the same name in one step; two downloads
/// finishing together under one name both succeed and the later one wins.
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn save(&self, file_name: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        let mut staged = staging_file(&self.dir)?;
        staged.write_all(content)?;
        staged.as_file().sync_all()?;

        let target = self.dir.join(file_name);
        staged.persist(&target).map_err(|err| PersistError::Io(err.error))?;
        Ok(target)
    }
}

fn staging_file(dir: &Path) -> io::Result<NamedTempFile> {
    Builder::new().prefix(".wm-").suffix(".part").tempfile_in(dir)
}
