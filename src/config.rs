use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for converting Datumaro task exports into a YOLO dataset.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Source root; every JSON file below it is treated as one annotation task
    #[arg(long = "src_path")]
    pub src_path: PathBuf,

    /// Destination root of the generated dataset
    #[arg(long = "dst_path")]
    pub dst_path: PathBuf,

    /// Every Nth task file (in sorted order) goes to the eval split
    #[arg(long = "testing_interval", default_value_t = 5, value_parser = validate_interval)]
    pub testing_interval: usize,

    /// Remove the destination root before writing
    #[arg(long = "remove_olds")]
    pub remove_olds: bool,

    /// Symlink source images instead of copying them. Recommended when the
    /// sources live on a local SSD; use copies for NAS, cloud or HDD sources.
    #[arg(long = "soft_link")]
    pub soft_link: bool,

    /// Write a redacted copy instead of a symlink for images containing to_delete regions
    #[arg(long = "hard_link_for_images_contains_deleted")]
    pub hard_link_for_images_contains_deleted: bool,

    /// Labels to drop, separated by ',' (ex: --not_using_labels credit_card,basket)
    #[arg(
        long = "not_using_labels",
        value_delimiter = ',',
        default_value = "credit_card,basket"
    )]
    pub not_using_labels: Vec<String>,

    /// Ordered target label list, separated by ','; the order defines class indices
    #[arg(long = "target_names", value_delimiter = ',', default_value = "head")]
    pub target_names: Vec<String>,

    /// JSON file mapping source label names to target names
    #[arg(long = "mapping_dict_path")]
    pub mapping_dict_path: Option<PathBuf>,
}

/// Options consumed by the materializer, independent of the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterializeOptions {
    pub testing_interval: usize,
    pub soft_link: bool,
    pub hard_link_for_deleted: bool,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            testing_interval: 5,
            soft_link: false,
            hard_link_for_deleted: false,
        }
    }
}

impl From<&Args> for MaterializeOptions {
    fn from(args: &Args) -> Self {
        Self {
            testing_interval: args.testing_interval,
            soft_link: args.soft_link,
            hard_link_for_deleted: args.hard_link_for_images_contains_deleted,
        }
    }
}

// The interval must be a positive integer
pub fn validate_interval(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(val) if val >= 1 => Ok(val),
        _ => Err("INTERVAL must be an integer >= 1".to_string()),
    }
}
