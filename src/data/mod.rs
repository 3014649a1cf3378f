//! Data directory access
//!
//! Listing the data directory and turning one of its CSV files into JSON rows.
//! Both read the filesystem fresh on every call.

pub mod lister;
pub mod transcoder;

pub use lister::list_data_files;
pub use transcoder::transcode;

#[cfg(test)]
pub mod testutil {
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Drop a data file into a scratch directory
    pub trait WriteDataFile {
        fn write(&self, name: &str, content: impl AsRef<[u8]>) -> PathBuf;
    }

    impl WriteDataFile for TempDir {
        fn write(&self, name: &str, content: impl AsRef<[u8]>) -> PathBuf {
            let file = self.path().join(name);
            std::fs::write(&file, content).unwrap();
            file
        }
    }
}
