use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::{
    collections::BTreeMap,
    fs,
    path::PathBuf,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("error while writing artifact")]
    IoError(#[from] std::io::Error),
    #[error("visualization payload is not valid base64")]
    DecodeError(#[from] base64::DecodeError),
    #[error("error while serializing document")]
    SerializationError(#[from] serde_json::Error),
}

type Result<T> = std::result::Result<T, ArtifactError>;

/// Write-only destination for debug artifacts.
///
/// Names are unique per frame, so a sink never has to deal with overwrites.
pub trait ArtifactSink {
    /// Decode a base64 visualization and store it under `file_name`
    fn write_image(&mut self, file_name: &str, encoded: &str) -> Result<PathBuf>;
    fn write_document(&mut self, file_name: &str, contents: &str) -> Result<PathBuf>;
}

/// Artifacts as files in one directory
#[derive(Debug, Clone)]
pub struct DirectoryArtifactSink {
    root: PathBuf,
}

impl DirectoryArtifactSink {
    /// Creates `root` if needed
    pub fn create(root: impl Into<PathBuf>) -> Result<DirectoryArtifactSink> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(DirectoryArtifactSink { root })
    }
}

impl ArtifactSink for DirectoryArtifactSink {
    fn write_image(&mut self, file_name: &str, encoded: &str) -> Result<PathBuf> {
        let bytes = STANDARD.decode(encoded)?;
        let path = self.root.join(file_name);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    fn write_document(&mut self, file_name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.root.join(file_name);
        fs::write(&path, contents)?;
        Ok(path)
    }
}

/// Keeps artifacts in memory, keyed by file name
#[derive(Debug, Clone, Default)]
pub struct MemoryArtifactSink {
    pub images: BTreeMap<String, Vec<u8>>,
    pub documents: BTreeMap<String, String>,
}

impl ArtifactSink for MemoryArtifactSink {
    fn write_image(&mut self, file_name: &str, encoded: &str) -> Result<PathBuf> {
        let bytes = STANDARD.decode(encoded)?;
        self.images.insert(file_name.to_owned(), bytes);
        Ok(PathBuf::from(file_name))
    }

    fn write_document(&mut self, file_name: &str, contents: &str) -> Result<PathBuf> {
        self.documents
            .insert(file_name.to_owned(), contents.to_owned());
        Ok(PathBuf::from(file_name))
    }
}
