use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Every failure aborts the run; variants carry the offending path for the final log line.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json parse error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("image error at {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("label id {label_id} in {path} is out of range ({label_count} labels)")]
    UnknownLabelId {
        path: PathBuf,
        label_id: usize,
        label_count: usize,
    },
    #[error("image {image} in {path} has an empty size {height}x{width}")]
    InvalidImageSize {
        path: PathBuf,
        image: String,
        height: u32,
        width: u32,
    },
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }
}
