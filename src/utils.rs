use indicatif::{ProgressBar, ProgressStyle};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::types::TaskDocument;

/// Parse a JSON file directly from a buffered file stream.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = fs::File::open(path).map_err(|e| ConvertError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ConvertError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read one task export.
pub fn read_task_document(path: &Path) -> Result<TaskDocument> {
    read_json(path)
}

/// Read the label rename table (source name -> target name).
pub fn read_rename_map(path: &Path) -> Result<HashMap<String, String>> {
    read_json(path)
}

/// Progress over task files; the message shows the task currently being written
pub fn create_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tasks {msg}",
            )
            .progress_chars("=> "),
    );
    pb
}

/// Create a directory and its parents if absent and return its path
pub fn ensure_directory(path: &Path) -> Result<PathBuf> {
    fs::create_dir_all(path).map_err(|e| ConvertError::io(path, e))?;
    Ok(path.to_path_buf())
}

/// Prepare the destination root, optionally wiping what a previous run left there
pub fn prepare_output_root(path: &Path, remove_olds: bool) -> Result<PathBuf> {
    if remove_olds && path.exists() {
        log::warn!("Removing previous output under {}", path.display());
        fs::remove_dir_all(path).map_err(|e| ConvertError::io(path, e))?;
    }
    ensure_directory(path)
}
