use serde::Deserialize;
use std::fmt;

/// Class name marking a region to be blacked out of the output image
pub const TO_DELETE_NAME: &str = "to_delete";

/// Extensions the `image` crate decodes and encodes for the redacted copy
pub const IMAGE_EXTENSIONS: [&str; 7] = ["bmp", "jpeg", "jpg", "png", "tif", "tiff", "webp"];

pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
}

// One Datumaro task export. Only the keys needed for boxes and labels are modelled.
#[derive(Debug, Deserialize, Clone)]
pub struct TaskDocument {
    pub categories: Categories,
    pub items: Vec<Item>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Categories {
    pub label: LabelCategories,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LabelCategories {
    pub labels: Vec<LabelEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LabelEntry {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Item {
    pub image: ItemImage,
    pub annotations: Vec<RawAnnotation>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ItemImage {
    pub path: String,
    /// `[height, width]`
    pub size: [u32; 2],
}

/// A box in source pixel coordinates, origin top-left
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct RawAnnotation {
    /// `[x, y, w, h]`
    pub bbox: [f64; 4],
    pub label_id: usize,
}

/// The partition a task file is assigned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Eval,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Eval => "eval",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub task_files: usize,
    pub train_files: usize,
    pub eval_files: usize,
    pub images: usize,
    pub label_lines: usize,
    pub excluded_boxes: usize,
    pub to_delete_boxes: usize,
    pub symlinked_images: usize,
    pub copied_images: usize,
    pub redacted_images: usize,
    pub kept_images: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_split(&mut self, split: Split) {
        self.task_files += 1;
        match split {
            Split::Train => self.train_files += 1,
            Split::Eval => self.eval_files += 1,
        }
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!(
            "Task files processed: {} (train: {}, eval: {})",
            self.task_files,
            self.train_files,
            self.eval_files
        );
        log::info!("Images processed: {}", self.images);
        log::info!("Label lines written: {}", self.label_lines);
        log::info!(
            "Boxes dropped: {} excluded, {} to_delete",
            self.excluded_boxes,
            self.to_delete_boxes
        );
        log::info!(
            "Images: {} symlinked, {} copied, {} redacted, {} already present",
            self.symlinked_images,
            self.copied_images,
            self.redacted_images,
            self.kept_images
        );
    }
}
