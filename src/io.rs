use glob::{glob, Pattern};
use image::{GenericImage, Rgba};
use log::{debug, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::conversion::{convert_to_yolo_format, label_path_for};
use crate::dataset::ImageTask;
use crate::error::{ConvertError, Result};
use crate::types::is_image_extension;

/// Find every task export below `src_root`, in lexicographic path order.
pub fn collect_task_files(src_root: &Path) -> Result<Vec<PathBuf>> {
    // The root is a literal path; brackets or wildcards in it must not act as pattern syntax
    let json_pattern = format!("{}/**/*.json", Pattern::escape(&src_root.to_string_lossy()));
    let mut json_paths = Vec::new();
    for entry in glob(&json_pattern)? {
        let path = entry.map_err(|e| {
            let path = e.path().to_path_buf();
            ConvertError::io(path, e.into_error())
        })?;
        if path.is_file() {
            json_paths.push(path);
        }
    }
    json_paths.sort();
    Ok(json_paths)
}

/// Write the label file for `image_task` next to `image_output_path`.
/// Returns the number of lines written.
pub fn write_label_file(image_task: &ImageTask, image_output_path: &Path) -> Result<usize> {
    let label_output_path = label_path_for(image_output_path);
    let yolo_data = convert_to_yolo_format(image_task);

    let file =
        File::create(&label_output_path).map_err(|e| ConvertError::io(&label_output_path, e))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(yolo_data.as_bytes())
        .and_then(|_| writer.flush())
        .map_err(|e| ConvertError::io(&label_output_path, e))?;

    Ok(yolo_data.lines().count())
}

/// What to do with a destination image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageAction {
    /// Link to the source image
    Symlink,
    /// Write a copy with every `to_delete` region zeroed
    RedactedCopy,
    /// Leave the existing destination untouched
    Keep,
}

/// Decision table over the four inputs of image materialization.
pub fn decide_image_action(
    soft_link: bool,
    hard_link_for_deleted: bool,
    contains_to_delete: bool,
    destination_exists: bool,
) -> ImageAction {
    match (soft_link, hard_link_for_deleted, contains_to_delete, destination_exists) {
        (_, _, _, true) => ImageAction::Keep,
        (true, true, true, false) => ImageAction::RedactedCopy,
        (true, _, _, false) => ImageAction::Symlink,
        (false, _, _, false) => ImageAction::RedactedCopy,
    }
}

/// Outcome of materializing one image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialized {
    Symlinked,
    Copied,
    Redacted,
    Kept,
}

/// Produce `image_output_path` from the source image of `image_task`.
pub fn materialize_image(
    image_task: &ImageTask,
    image_output_path: &Path,
    soft_link: bool,
    hard_link_for_deleted: bool,
) -> Result<Materialized> {
    // symlink_metadata also sees dangling links
    let destination_exists = fs::symlink_metadata(image_output_path).is_ok();
    let action = decide_image_action(
        soft_link,
        hard_link_for_deleted,
        image_task.contains_to_delete(),
        destination_exists,
    );
    debug!("{:?} -> {:?}", image_task.image_path, action);

    match action {
        ImageAction::Keep => Ok(Materialized::Kept),
        ImageAction::Symlink => {
            link_image(&image_task.image_path, image_output_path)?;
            Ok(Materialized::Symlinked)
        }
        ImageAction::RedactedCopy if !image_task.contains_to_delete() => {
            fs::copy(&image_task.image_path, image_output_path)
                .map_err(|e| ConvertError::io(&image_task.image_path, e))?;
            Ok(Materialized::Copied)
        }
        ImageAction::RedactedCopy => {
            write_redacted_copy(image_task, image_output_path)?;
            Ok(Materialized::Redacted)
        }
    }
}

fn link_image(source: &Path, destination: &Path) -> Result<()> {
    let source = std::path::absolute(source).map_err(|e| ConvertError::io(source, e))?;
    #[cfg(unix)]
    let linked = std::os::unix::fs::symlink(&source, destination);
    #[cfg(windows)]
    let linked = std::os::windows::fs::symlink_file(&source, destination);
    linked.map_err(|e| ConvertError::io(destination, e))
}

fn write_redacted_copy(image_task: &ImageTask, image_output_path: &Path) -> Result<()> {
    let mut image = image_task.load_image()?;
    for record in image_task.to_delete_records() {
        let (xmin, ymin, xmax, ymax) = record.pixel_bounds();
        zero_region(&mut image, xmin, ymin, xmax, ymax);
    }
    image
        .save(image_output_path)
        .map_err(|source| ConvertError::Image {
            path: image_output_path.to_path_buf(),
            source,
        })
}

/// Paint the pixels in `[xmin, xmax) x [ymin, ymax)` opaque black, clamped to the image.
pub fn zero_region<I: GenericImage>(image: &mut I, xmin: u32, ymin: u32, xmax: u32, ymax: u32)
where
    I::Pixel: From<Rgba<u8>>,
{
    let xmax = xmax.min(image.width());
    let ymax = ymax.min(image.height());
    for y in ymin..ymax {
        for x in xmin..xmax {
            image.put_pixel(x, y, I::Pixel::from(Rgba([0, 0, 0, 255])));
        }
    }
}

/// Warn about source images whose extension is not a known image format.
pub fn check_image_extension(image_path: &Path) {
    let known = image_path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(is_image_extension);
    if !known {
        warn!("Unrecognized image extension: {}", image_path.display());
    }
}

/// Create the dataset.yaml file for YOLO training
pub fn create_dataset_yaml(dst_root: &Path, target_names: &[String]) -> Result<PathBuf> {
    let dataset_yaml_path = dst_root.join("dataset.yaml");
    let absolute_path = fs::canonicalize(dst_root).map_err(|e| ConvertError::io(dst_root, e))?;
    let mut yaml_content = format!(
        "path: {}\ntrain: train\nval: eval\ntest:\n",
        absolute_path.to_string_lossy()
    );
    yaml_content.push_str("\nnames:\n");
    for (id, label) in target_names.iter().enumerate() {
        yaml_content.push_str(&format!("    {}: {}\n", id, label));
    }

    let file =
        File::create(&dataset_yaml_path).map_err(|e| ConvertError::io(&dataset_yaml_path, e))?;
    let mut dataset_yaml = BufWriter::new(file);
    dataset_yaml
        .write_all(yaml_content.as_bytes())
        .and_then(|_| dataset_yaml.flush())
        .map_err(|e| ConvertError::io(&dataset_yaml_path, e))?;
    Ok(dataset_yaml_path)
}
