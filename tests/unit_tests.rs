use std::collections::HashMap;
use std::path::{Path, PathBuf};

use datumaro2yolo::config::validate_interval;
use datumaro2yolo::conversion::{convert_to_yolo_format, label_path_for};
use datumaro2yolo::dataset::image_dir_for;
use datumaro2yolo::io::{decide_image_action, zero_region, ImageAction};
use datumaro2yolo::materializer::{split_for_position, task_id_for};
use datumaro2yolo::types::{is_image_extension, RawAnnotation};
use datumaro2yolo::{
    AnnotationRecord, BoundingBox, ClassAssignment, ClassIndex, ExclusionList, ImageTask,
    LabelResolver, Split, SplitCounter,
};

const EPS: f64 = 1e-9;

fn default_exclusions() -> ExclusionList {
    ExclusionList::new(["credit_card", "basket"])
}

fn record(
    bbox: [f64; 4],
    image_size: (u32, u32),
    name: &str,
    index: ClassIndex,
) -> AnnotationRecord {
    AnnotationRecord::build(
        &RawAnnotation { bbox, label_id: 0 },
        image_size,
        ClassAssignment {
            class_name: name.to_string(),
            class_index: index,
        },
    )
}

#[test]
fn test_validate_interval() {
    assert_eq!(validate_interval("5"), Ok(5));
    assert_eq!(validate_interval("1"), Ok(1));
    assert!(validate_interval("0").is_err());
    assert!(validate_interval("-3").is_err());
    assert!(validate_interval("abc").is_err());
}

#[test]
fn test_bounding_box_example() {
    let r = record([10.0, 10.0, 100.0, 50.0], (200, 300), "head", ClassIndex::Target(0));
    assert_eq!(
        r.bbox,
        BoundingBox {
            xmin: 10.0,
            ymin: 10.0,
            xmax: 110.0,
            ymax: 60.0
        }
    );
    let (cx, cy, w, h) = r.normalized();
    assert!((cx - 0.2).abs() < EPS);
    assert!((cy - 0.175).abs() < EPS);
    assert!((w - 1.0 / 3.0).abs() < EPS);
    assert!((h - 0.25).abs() < EPS);
    assert_eq!(r.width(), 100.0);
    assert_eq!(r.height(), 50.0);
    assert_eq!(r.area(), 5000.0);
}

#[test]
fn test_bounding_box_is_clipped() {
    let b = BoundingBox::from_xywh_clipped([-20.0, 190.0, 400.0, 50.0], 300, 200);
    assert_eq!(b.xmin, 0.0);
    assert_eq!(b.ymin, 190.0);
    assert_eq!(b.xmax, 300.0);
    assert_eq!(b.ymax, 200.0);
}

#[test]
fn test_box_outside_image_collapses() {
    let b = BoundingBox::from_xywh_clipped([500.0, 500.0, 10.0, 10.0], 300, 200);
    assert_eq!(b.xmin, 300.0);
    assert_eq!(b.xmax, 300.0);
    assert_eq!(b.ymin, 200.0);
    assert_eq!(b.ymax, 200.0);
    assert_eq!(b.area(), 0.0);
}

#[test]
fn test_clip_and_normalize_invariants() {
    let (im_w, im_h) = (64u32, 48u32);
    let coords = [-100.0, -1.0, 0.0, 10.5, 47.0, 63.9, 200.0];
    let sizes = [-5.0, 0.0, 1.0, 30.0, 500.0];
    for &x in &coords {
        for &y in &coords {
            for &w in &sizes {
                for &h in &sizes {
                    let r = record([x, y, w, h], (im_h, im_w), "head", ClassIndex::Target(0));
                    let b = r.bbox;
                    assert!(0.0 <= b.xmin && b.xmin <= b.xmax && b.xmax <= im_w as f64);
                    assert!(0.0 <= b.ymin && b.ymin <= b.ymax && b.ymax <= im_h as f64);
                    let (cx, cy, nw, nh) = r.normalized();
                    for v in [cx, cy, nw, nh] {
                        assert!((0.0..=1.0).contains(&v), "{:?} -> {}", (x, y, w, h), v);
                    }
                }
            }
        }
    }
}

#[test]
fn test_pixel_bounds_truncate() {
    let r = record([1.7, 2.2, 3.9, 4.5], (10, 10), "to_delete", ClassIndex::Excluded);
    assert_eq!(r.pixel_bounds(), (1, 2, 5, 6));
}

#[test]
fn test_resolve_target_and_rename() {
    let mut rename_map = HashMap::new();
    rename_map.insert("face".to_string(), "head".to_string());
    let resolver = LabelResolver::new(vec!["head".to_string(), "hand".to_string()], rename_map);
    let mut exclusions = default_exclusions();

    assert_eq!(
        resolver.resolve("face", &mut exclusions),
        ("head".to_string(), ClassIndex::Target(0))
    );
    assert_eq!(
        resolver.resolve("hand", &mut exclusions),
        ("hand".to_string(), ClassIndex::Target(1))
    );
    assert_eq!(exclusions.len(), 2);
}

#[test]
fn test_resolve_excluded_names() {
    let resolver = LabelResolver::new(
        vec!["head".to_string(), "basket".to_string()],
        HashMap::new(),
    );
    let mut exclusions = default_exclusions();

    // In the exclusion list, even though it is a target
    let (_, index) = resolver.resolve("basket", &mut exclusions);
    assert_eq!(index, ClassIndex::Excluded);

    let (name, index) = resolver.resolve("credit_card", &mut exclusions);
    assert_eq!(name, "credit_card");
    assert_eq!(index, ClassIndex::Excluded);
    assert_eq!(exclusions.len(), 2);

    // Not a target: excluded and accumulated
    let (_, index) = resolver.resolve("dog", &mut exclusions);
    assert_eq!(index, ClassIndex::Excluded);
    assert!(exclusions.contains("dog"));
    assert_eq!(exclusions.len(), 3);
}

#[test]
fn test_exclusion_accumulates_once() {
    let resolver = LabelResolver::new(vec!["head".to_string()], HashMap::new());
    let mut exclusions = ExclusionList::default();

    for _ in 0..1000 {
        let (_, index) = resolver.resolve("wallet", &mut exclusions);
        assert!(index.is_excluded());
    }
    assert_eq!(exclusions.names(), &["wallet".to_string()]);
    assert!(!exclusions.insert("wallet".to_string()));
}

#[test]
fn test_split_assignment() {
    for position in 1..=4 {
        assert_eq!(split_for_position(position, 5), Split::Train);
    }
    assert_eq!(split_for_position(5, 5), Split::Eval);
    assert_eq!(split_for_position(10, 5), Split::Eval);
    assert_eq!(split_for_position(3, 1), Split::Eval);

    let mut counter = SplitCounter::new(3);
    let splits: Vec<Split> = (0..6).map(|_| counter.next_split()).collect();
    assert_eq!(
        splits,
        vec![
            Split::Train,
            Split::Train,
            Split::Eval,
            Split::Train,
            Split::Train,
            Split::Eval
        ]
    );
    assert_eq!(counter.position(), 6);
}

#[test]
fn test_decide_image_action() {
    use ImageAction::*;
    // (soft_link, hard_link_for_deleted, contains_to_delete, destination_exists)
    let cases = [
        ((true, false, false, false), Symlink),
        ((true, false, true, false), Symlink),
        ((true, true, false, false), Symlink),
        ((true, true, true, false), RedactedCopy),
        ((false, false, false, false), RedactedCopy),
        ((false, true, true, false), RedactedCopy),
        ((false, false, true, true), Keep),
        ((true, true, true, true), Keep),
        ((true, false, false, true), Keep),
    ];
    for ((soft, hard, contains, exists), expected) in cases {
        assert_eq!(
            decide_image_action(soft, hard, contains, exists),
            expected,
            "{:?}",
            (soft, hard, contains, exists)
        );
    }
}

#[test]
fn test_convert_to_yolo_format() {
    let image_task = ImageTask {
        image_path: PathBuf::from("images/default/frame.png"),
        image_size: (200, 300),
        records: vec![
            record([10.0, 10.0, 100.0, 50.0], (200, 300), "head", ClassIndex::Target(0)),
            record([0.0, 0.0, 20.0, 20.0], (200, 300), "credit_card", ClassIndex::Excluded),
            record([50.0, 50.0, 10.0, 10.0], (200, 300), "to_delete", ClassIndex::Excluded),
            record([0.0, 0.0, 300.0, 200.0], (200, 300), "hand", ClassIndex::Target(1)),
        ],
    };

    let yolo_data = convert_to_yolo_format(&image_task);
    assert_eq!(
        yolo_data,
        "0 0.200000 0.175000 0.333333 0.250000\n1 0.500000 0.500000 1.000000 1.000000\n"
    );
    let labelled = image_task.records.iter().filter(|r| r.is_labelled()).count();
    assert_eq!(yolo_data.lines().count(), labelled);
    assert!(image_task.contains_to_delete());
}

#[test]
fn test_to_delete_in_targets_is_not_labelled() {
    let r = record([0.0, 0.0, 5.0, 5.0], (10, 10), "to_delete", ClassIndex::Target(1));
    assert!(r.is_to_delete());
    assert!(!r.is_labelled());
}

#[test]
fn test_label_path_uses_stem() {
    assert_eq!(label_path_for(Path::new("out/a.png")), PathBuf::from("out/a.txt"));
    assert_eq!(label_path_for(Path::new("out/b.jpeg")), PathBuf::from("out/b.txt"));
    assert_eq!(label_path_for(Path::new("out/c.d.bmp")), PathBuf::from("out/c.d.txt"));
    assert_eq!(label_path_for(Path::new("out/noext")), PathBuf::from("out/noext.txt"));
}

#[test]
fn test_task_layout_paths() {
    let json_path = Path::new("/data/extract/31/1234/annotations/default.json");
    assert_eq!(task_id_for(json_path), "1234");
    assert_eq!(
        image_dir_for(json_path),
        PathBuf::from("/data/extract/31/1234/annotations/../images/default")
    );
}

#[test]
fn test_zero_region() {
    let mut img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        6,
        6,
        image::Rgb([255, 255, 255]),
    ));
    zero_region(&mut img, 1, 2, 3, 10);

    let rgb = img.to_rgb8();
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let inside = (1..3).contains(&x) && (2..6).contains(&y);
        let expected = if inside { [0, 0, 0] } else { [255, 255, 255] };
        assert_eq!(pixel.0, expected, "pixel ({}, {})", x, y);
    }
}

#[test]
fn test_redacted_rgba_stays_opaque() {
    let mut img = image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        4,
        4,
        image::Rgba([200, 100, 50, 255]),
    ));
    zero_region(&mut img, 0, 0, 2, 2);

    let rgba = img.to_rgba8();
    assert_eq!(rgba.get_pixel(1, 1).0, [0, 0, 0, 255]);
    assert_eq!(rgba.get_pixel(3, 3).0, [200, 100, 50, 255]);
}

#[test]
fn test_is_image_extension() {
    assert!(is_image_extension("png"));
    assert!(is_image_extension("JPG"));
    assert!(!is_image_extension("txt"));
}
