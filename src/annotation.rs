use crate::resolver::ClassIndex;
use crate::types::{RawAnnotation, TO_DELETE_NAME};

/// Pixel-space box clipped to its image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// Build from `[x, y, w, h]` and clamp into `[0, width] x [0, height]`.
    /// A box lying entirely outside the image collapses to zero area.
    pub fn from_xywh_clipped(bbox: [f64; 4], image_width: u32, image_height: u32) -> Self {
        let [x, y, w, h] = bbox;
        let (im_w, im_h) = (image_width as f64, image_height as f64);
        Self {
            xmin: x.clamp(0.0, im_w),
            ymin: y.clamp(0.0, im_h),
            xmax: (x + w).clamp(0.0, im_w),
            ymax: (y + h).clamp(0.0, im_h),
        }
        .ordered()
    }

    // Negative widths or heights in the source would leave max < min after clamping
    fn ordered(self) -> Self {
        Self {
            xmin: self.xmin.min(self.xmax),
            ymin: self.ymin.min(self.ymax),
            xmax: self.xmin.max(self.xmax),
            ymax: self.ymin.max(self.ymax),
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

/// Renamed class name together with its resolved output index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassAssignment {
    pub class_name: String,
    pub class_index: ClassIndex,
}

impl ClassAssignment {
    pub fn is_to_delete(&self) -> bool {
        self.class_name == TO_DELETE_NAME
    }
}

/// One clipped, classified box of an image.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub bbox: BoundingBox,
    pub class: ClassAssignment,
    pub category_id: usize,
    image_width: u32,
    image_height: u32,
}

impl AnnotationRecord {
    /// `image_size` is `(height, width)`, both non-zero.
    pub fn build(raw: &RawAnnotation, image_size: (u32, u32), class: ClassAssignment) -> Self {
        let (image_height, image_width) = image_size;
        Self {
            bbox: BoundingBox::from_xywh_clipped(raw.bbox, image_width, image_height),
            class,
            category_id: raw.label_id,
            image_width,
            image_height,
        }
    }

    /// Center-based `(cx, cy, w, h)` as fractions of the image size.
    pub fn normalized(&self) -> (f64, f64, f64, f64) {
        let im_w = self.image_width as f64;
        let im_h = self.image_height as f64;
        let b = &self.bbox;
        (
            (b.xmin + b.xmax) / (2.0 * im_w),
            (b.ymin + b.ymax) / (2.0 * im_h),
            b.width() / im_w,
            b.height() / im_h,
        )
    }

    pub fn width(&self) -> f64 {
        self.bbox.width()
    }

    pub fn height(&self) -> f64 {
        self.bbox.height()
    }

    pub fn area(&self) -> f64 {
        self.bbox.area()
    }

    /// Truncated integer `(xmin, ymin, xmax, ymax)` covering the box.
    pub fn pixel_bounds(&self) -> (u32, u32, u32, u32) {
        let b = &self.bbox;
        (b.xmin as u32, b.ymin as u32, b.xmax as u32, b.ymax as u32)
    }

    pub fn class_index(&self) -> ClassIndex {
        self.class.class_index
    }

    pub fn is_to_delete(&self) -> bool {
        self.class.is_to_delete()
    }

    /// Whether this record produces a line in the label file
    pub fn is_labelled(&self) -> bool {
        !self.is_to_delete() && !self.class.class_index.is_excluded()
    }
}
