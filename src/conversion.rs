use std::path::{Path, PathBuf};

use crate::dataset::ImageTask;

/// Convert an image's records to YOLO bbox lines.
///
/// Excluded and `to_delete` records produce no line; the rest keep source order.
pub fn convert_to_yolo_format(image_task: &ImageTask) -> String {
    let mut yolo_data = String::with_capacity(image_task.records.len() * 48);

    for record in &image_task.records {
        if !record.is_labelled() {
            continue;
        }
        let class_id = match record.class_index().target() {
            Some(class_id) => class_id,
            None => continue,
        };
        let (x_center, y_center, width, height) = record.normalized();
        yolo_data.push_str(&format!(
            "{} {:.6} {:.6} {:.6} {:.6}\n",
            class_id, x_center, y_center, width, height
        ));
    }

    yolo_data
}

/// Label file next to the destination image: same stem, `.txt` extension.
pub fn label_path_for(image_output_path: &Path) -> PathBuf {
    image_output_path.with_extension("txt")
}
