//! Dataset materialization: split assignment, label files and images.

use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::{Args, MaterializeOptions};
use crate::dataset::TaskDataset;
use crate::error::{ConvertError, Result};
use crate::io::{
    check_image_extension, collect_task_files, create_dataset_yaml, materialize_image,
    write_label_file, Materialized,
};
use crate::resolver::{ExclusionList, LabelResolver};
use crate::types::{ProcessingStats, Split};
use crate::utils::{create_progress_bar, ensure_directory, prepare_output_root, read_rename_map};

/// Split of the file at 1-based `position`: every `interval`-th file is eval.
pub fn split_for_position(position: usize, interval: usize) -> Split {
    if interval > 0 && position % interval == 0 {
        Split::Eval
    } else {
        Split::Train
    }
}

/// Sequential split assignment over the files of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitCounter {
    position: usize,
    interval: usize,
}

impl SplitCounter {
    pub fn new(interval: usize) -> Self {
        Self {
            position: 0,
            interval,
        }
    }

    /// Advance to the next file and return its split.
    pub fn next_split(&mut self) -> Split {
        self.position += 1;
        split_for_position(self.position, self.interval)
    }

    /// Number of files assigned so far
    pub fn position(&self) -> usize {
        self.position
    }
}

/// Task id of `<root>/<task_id>/<subdir>/<file>.json`: the JSON file's grandparent name.
pub fn task_id_for(json_path: &Path) -> String {
    json_path
        .parent()
        .and_then(Path::parent)
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Writes parsed task exports into `<dst_root>/<split>/<task_id>/`.
#[derive(Debug)]
pub struct DatasetMaterializer {
    dst_root: PathBuf,
    options: MaterializeOptions,
    counter: SplitCounter,
    stats: ProcessingStats,
}

impl DatasetMaterializer {
    pub fn new(dst_root: impl Into<PathBuf>, options: MaterializeOptions) -> Self {
        Self {
            dst_root: dst_root.into(),
            counter: SplitCounter::new(options.testing_interval),
            options,
            stats: ProcessingStats::new(),
        }
    }

    pub fn into_stats(self) -> ProcessingStats {
        self.stats
    }

    /// Materialize the next task file. Calls must follow the sorted file order;
    /// each call advances the split counter.
    pub fn materialize(&mut self, json_path: &Path, task_dataset: &TaskDataset) -> Result<Split> {
        let split = self.counter.next_split();
        self.stats.record_split(split);

        let dst_dir = ensure_directory(
            &self
                .dst_root
                .join(split.as_str())
                .join(task_id_for(json_path)),
        )?;

        for image_task in &task_dataset.image_tasks {
            let image_name = image_task.image_name().ok_or_else(|| {
                ConvertError::io(
                    &image_task.image_path,
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        "image path has no file name",
                    ),
                )
            })?;
            check_image_extension(&image_task.image_path);
            let image_output_path = dst_dir.join(image_name);

            self.stats.images += 1;
            self.stats.label_lines += write_label_file(image_task, &image_output_path)?;
            for record in &image_task.records {
                if record.is_to_delete() {
                    self.stats.to_delete_boxes += 1;
                } else if record.class_index().is_excluded() {
                    self.stats.excluded_boxes += 1;
                }
            }

            match materialize_image(
                image_task,
                &image_output_path,
                self.options.soft_link,
                self.options.hard_link_for_deleted,
            )? {
                Materialized::Symlinked => self.stats.symlinked_images += 1,
                Materialized::Copied => self.stats.copied_images += 1,
                Materialized::Redacted => self.stats.redacted_images += 1,
                Materialized::Kept => self.stats.kept_images += 1,
            }
        }

        Ok(split)
    }
}

/// Materialize already parsed task exports in the given order.
pub fn materialize<'a, I>(
    task_datasets: I,
    dst_root: &Path,
    options: MaterializeOptions,
) -> Result<ProcessingStats>
where
    I: IntoIterator<Item = (&'a Path, &'a TaskDataset)>,
{
    let mut materializer = DatasetMaterializer::new(dst_root, options);
    for (json_path, task_dataset) in task_datasets {
        materializer.materialize(json_path, task_dataset)?;
    }
    Ok(materializer.into_stats())
}

/// Main dataset pipeline: parse every task export under `src_root` in sorted
/// order and materialize it before moving to the next one.
pub fn process_dataset(args: &Args) -> Result<ProcessingStats> {
    let rename_map = match &args.mapping_dict_path {
        Some(path) => read_rename_map(path)?,
        None => HashMap::new(),
    };
    let resolver = LabelResolver::new(args.target_names.clone(), rename_map);
    let mut exclusions = ExclusionList::new(args.not_using_labels.iter().cloned());

    prepare_output_root(&args.dst_path, args.remove_olds)?;

    let json_paths = collect_task_files(&args.src_path)?;
    info!("Found {} task files.", json_paths.len());

    let pb = create_progress_bar(json_paths.len() as u64);
    let mut materializer = DatasetMaterializer::new(&args.dst_path, MaterializeOptions::from(args));
    for json_path in &json_paths {
        pb.set_message(task_id_for(json_path));
        let task_dataset = TaskDataset::parse(json_path, &resolver, &mut exclusions)?;
        let split = materializer.materialize(json_path, &task_dataset)?;
        debug!(
            "{} -> {} ({} images)",
            json_path.display(),
            split,
            task_dataset.len()
        );
        pb.inc(1);
    }
    pb.finish_with_message("Task processing complete");

    info!("Creating dataset.yaml file...");
    create_dataset_yaml(&args.dst_path, resolver.target_names())?;
    info!("Excluded labels: {:?}", exclusions.names());

    Ok(materializer.into_stats())
}
