//! Parsing of one task export into per-image records.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::annotation::{AnnotationRecord, ClassAssignment};
use crate::error::{ConvertError, Result};
use crate::resolver::{ExclusionList, LabelResolver};
use crate::types::{Item, TaskDocument};
use crate::utils::read_task_document;

/// One annotated image and its boxes in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTask {
    pub image_path: PathBuf,
    /// `(height, width)`
    pub image_size: (u32, u32),
    pub records: Vec<AnnotationRecord>,
}

impl ImageTask {
    pub fn contains_to_delete(&self) -> bool {
        self.records.iter().any(AnnotationRecord::is_to_delete)
    }

    pub fn to_delete_records(&self) -> impl Iterator<Item = &AnnotationRecord> {
        self.records.iter().filter(|r| r.is_to_delete())
    }

    /// File name of the source image, used unchanged in the destination
    pub fn image_name(&self) -> Option<&std::ffi::OsStr> {
        self.image_path.file_name()
    }

    pub fn load_image(&self) -> Result<image::DynamicImage> {
        image::open(&self.image_path).map_err(|source| ConvertError::Image {
            path: self.image_path.clone(),
            source,
        })
    }
}

/// All images of one task export plus its label id -> name table.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDataset {
    pub image_tasks: Vec<ImageTask>,
    pub category_names: Vec<String>,
}

impl TaskDataset {
    /// Load and resolve the task export at `json_path`.
    pub fn parse(
        json_path: &Path,
        resolver: &LabelResolver,
        exclusions: &mut ExclusionList,
    ) -> Result<Self> {
        let document = read_task_document(json_path)?;
        Self::from_document(json_path, document, resolver, exclusions)
    }

    /// Resolve an already deserialized export. `json_path` locates the image
    /// directory and is reported in errors.
    pub fn from_document(
        json_path: &Path,
        document: TaskDocument,
        resolver: &LabelResolver,
        exclusions: &mut ExclusionList,
    ) -> Result<Self> {
        let category_names: Vec<String> = document
            .categories
            .label
            .labels
            .into_iter()
            .map(|label| label.name)
            .collect();
        let image_dir = image_dir_for(json_path);

        let mut image_tasks = Vec::with_capacity(document.items.len());
        for item in &document.items {
            image_tasks.push(build_image_task(
                json_path,
                &image_dir,
                item,
                &category_names,
                resolver,
                exclusions,
            )?);
        }

        Ok(Self {
            image_tasks,
            category_names,
        })
    }

    pub fn category_name(&self, label_id: usize) -> Option<&str> {
        self.category_names.get(label_id).map(String::as_str)
    }

    pub fn category_id_mapping(&self) -> BTreeMap<usize, String> {
        self.category_names.iter().cloned().enumerate().collect()
    }

    pub fn len(&self) -> usize {
        self.image_tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image_tasks.is_empty()
    }
}

/// Images of `<dir>/annotations/<stem>.json` live in `<dir>/annotations/../images/<stem>/`.
pub fn image_dir_for(json_path: &Path) -> PathBuf {
    let parent = json_path.parent().unwrap_or_else(|| Path::new(""));
    let stem = json_path.file_stem().unwrap_or_default();
    parent.join("..").join("images").join(stem)
}

fn build_image_task(
    json_path: &Path,
    image_dir: &Path,
    item: &Item,
    category_names: &[String],
    resolver: &LabelResolver,
    exclusions: &mut ExclusionList,
) -> Result<ImageTask> {
    let [height, width] = item.image.size;
    if height == 0 || width == 0 {
        return Err(ConvertError::InvalidImageSize {
            path: json_path.to_path_buf(),
            image: item.image.path.clone(),
            height,
            width,
        });
    }

    let mut records = Vec::with_capacity(item.annotations.len());
    for raw in &item.annotations {
        let raw_name = category_names
            .get(raw.label_id)
            .ok_or_else(|| ConvertError::UnknownLabelId {
                path: json_path.to_path_buf(),
                label_id: raw.label_id,
                label_count: category_names.len(),
            })?;
        let (class_name, class_index) = resolver.resolve(raw_name, exclusions);
        records.push(AnnotationRecord::build(
            raw,
            (height, width),
            ClassAssignment {
                class_name,
                class_index,
            },
        ));
    }

    Ok(ImageTask {
        image_path: image_dir.join(&item.image.path),
        image_size: (height, width),
        records,
    })
}
