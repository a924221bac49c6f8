use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box in pixel space.
///
/// `min` is the top-left corner and `max` the bottom-right corner, with the
/// image origin at the top-left and Y growing downward.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bbox {
    /// Top-left corner.
    pub min: Vec2,
    /// Bottom-right corner.
    pub max: Vec2,
}

impl Bbox {
    /// Creates a bounding box from its two corners.
    ///
    /// ```
    /// use glam::Vec2;
    /// use seascan_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(10.0, 5.0));
    /// assert_eq!(bbox.area(), 50.0);
    /// ```
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Creates a bounding box from corner coordinates `x1, y1, x2, y2`.
    pub fn from_xyxy(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self::new(Vec2::new(x1, y1), Vec2::new(x2, y2))
    }

    /// Creates a bounding box from a YOLO-style center point and size.
    ///
    /// Negative sizes are clamped to zero, so a malformed proposal turns into
    /// a degenerate box instead of one with swapped corners.
    ///
    /// ```
    /// use glam::Vec2;
    /// use seascan_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::from_center_size(Vec2::new(100.0, 200.0), Vec2::new(50.0, 80.0));
    /// assert_eq!(bbox.min, Vec2::new(75.0, 160.0));
    /// assert_eq!(bbox.max, Vec2::new(125.0, 240.0));
    /// ```
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half_size = size.max(Vec2::ZERO) / 2.0;

        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Area of the box, zero for degenerate boxes.
    pub fn area(&self) -> f32 {
        let length = (self.max - self.min).max(Vec2::ZERO);

        length.x * length.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Returns true when the box encloses no area.
    pub fn is_degenerate(&self) -> bool {
        !(self.area() > 0.0)
    }

    /// Area of the axis-aligned overlap of two boxes.
    ///
    /// A non-positive overlap width or height yields zero.
    ///
    /// ```
    /// use seascan_core::analysis::bbox::Bbox;
    /// let a = Bbox::from_xyxy(0.0, 0.0, 10.0, 10.0);
    /// let b = Bbox::from_xyxy(5.0, 5.0, 15.0, 15.0);
    /// assert_eq!(a.intersection(&b), 25.0);
    /// ```
    pub fn intersection(&self, other: &Self) -> f32 {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);

        if max.x > min.x && max.y > min.y {
            (max.x - min.x) * (max.y - min.y)
        } else {
            0.
        }
    }

    /// Union area of two boxes: both areas minus their overlap.
    pub fn union_area(&self, other: &Self) -> f32 {
        self.area() + other.area() - self.intersection(other)
    }

    /// Intersection over Union of two boxes.
    ///
    /// Returns 0.0 when the union is empty, so two degenerate boxes never
    /// divide by zero.
    ///
    /// ```
    /// use seascan_core::analysis::bbox::Bbox;
    /// let a = Bbox::from_xyxy(0.0, 0.0, 10.0, 10.0);
    /// let b = Bbox::from_xyxy(5.0, 5.0, 15.0, 15.0);
    /// assert!((a.iou(&b) - 25.0 / 175.0).abs() < 1e-6);
    /// ```
    pub fn iou(&self, other: &Self) -> f32 {
        let intersection_area = self.intersection(other);
        let union_area = self.area() + other.area() - intersection_area;

        if union_area > 0.0 {
            intersection_area / union_area
        } else {
            0.0
        }
    }

    /// Scales X and Y coordinates independently.
    pub fn scale(&self, factor: Vec2) -> Self {
        Self {
            min: self.min * factor,
            max: self.max * factor,
        }
    }

    /// Corner coordinates as `[x1, y1, x2, y2]`.
    pub fn to_xyxy(&self) -> [f32; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }
}
