//! Datumaro to YOLO dataset converter
//!
//! This library turns Datumaro JSON task exports into a per-image YOLO label
//! layout split into `train` and `eval`, with class filtering and renaming,
//! box clipping, and redaction of `to_delete` regions.

pub mod annotation;
pub mod config;
pub mod conversion;
pub mod dataset;
pub mod error;
pub mod io;
pub mod materializer;
pub mod resolver;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use annotation::{AnnotationRecord, BoundingBox, ClassAssignment};
pub use config::{Args, MaterializeOptions};
pub use dataset::{ImageTask, TaskDataset};
pub use error::{ConvertError, Result};
pub use materializer::{materialize, process_dataset, DatasetMaterializer, SplitCounter};
pub use resolver::{ClassIndex, ExclusionList, LabelResolver};
pub use types::{ProcessingStats, Split, TO_DELETE_NAME};
