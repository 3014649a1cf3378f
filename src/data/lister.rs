//! Data directory listing

use serde::Serialize;
use std::path::Path;
use tokio::fs;

use crate::error::DataError;

/// `{"data_files": [...]}`
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DataFilesEnvelope {
    pub data_files: Vec<String>,
}

/// List every entry of `dir` in the order the filesystem returns them.
///
/// Each name is prefixed with `prefix` (empty for bare names). Entries are not
/// filtered by extension or type.
pub async fn list_data_files(dir: &Path, prefix: &str) -> Result<DataFilesEnvelope, DataError> {
    let fs_error = |source| DataError::Filesystem {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir).await.map_err(fs_error)?;
    let mut data_files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(fs_error)? {
        let name = entry.file_name();
        data_files.push(format!("{prefix}{}", name.to_string_lossy()));
    }

    Ok(DataFilesEnvelope { data_files })
}
