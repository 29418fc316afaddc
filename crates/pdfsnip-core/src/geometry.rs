//! Geometry primitives shared across the crate.
//!
//! All page-space coordinates use a top-left origin with y growing downward,
//! measured in PDF points (1/72 inch). PDF-native (bottom-left, y-up)
//! coordinates are converted at the parsing boundary and never appear here.

/// A 2D point in page space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A 2D affine transformation matrix in PDF order `[a b c d e f]`.
///
/// Points transform as row vectors: `x' = a·x + c·y + e`, `y' = b·x + d·y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ctm {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Ctm {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// The identity matrix.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// A pure translation by `(tx, ty)`.
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Matrix product `self × other` (row-vector convention).
    ///
    /// The resulting matrix applies `self` first, then `other`.
    pub fn concat(&self, other: &Ctm) -> Ctm {
        Ctm {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point through this matrix.
    pub fn transform_point(&self, p: Point) -> Point {
        Point {
            x: p.x * self.a + p.y * self.c + self.e,
            y: p.x * self.b + p.y * self.d + self.f,
        }
    }

    /// Length of the transformed unit vertical vector.
    ///
    /// For an unrotated matrix this is `|d|`; used to recover the effective
    /// on-page size of text rendered through this matrix.
    pub fn vertical_scale(&self) -> f64 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    /// Whether the matrix only scales and translates (no rotation or skew)
    /// with non-negative scale factors.
    pub fn is_upright(&self) -> bool {
        self.b == 0.0 && self.c == 0.0 && self.a > 0.0 && self.d > 0.0
    }
}

/// Bounding box with top-left origin coordinate system.
///
/// - `x0`: left edge
/// - `top`: top edge (distance from top of page)
/// - `x1`: right edge
/// - `bottom`: bottom edge (distance from top of page)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Width of the bounding box.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the bounding box.
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Compute the union of two bounding boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            top: self.top.min(other.top),
            x1: self.x1.max(other.x1),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// The smallest box containing a set of points. Returns `None` for an
    /// empty set.
    pub fn around_points(points: &[Point]) -> Option<BBox> {
        let first = points.first()?;
        let mut bbox = BBox::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            bbox.x0 = bbox.x0.min(p.x);
            bbox.top = bbox.top.min(p.y);
            bbox.x1 = bbox.x1.max(p.x);
            bbox.bottom = bbox.bottom.max(p.y);
        }
        Some(bbox)
    }

    /// Shift the box by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> BBox {
        BBox {
            x0: self.x0 + dx,
            top: self.top + dy,
            x1: self.x1 + dx,
            bottom: self.bottom + dy,
        }
    }
}

/// Width or height below this many points counts as an empty region.
///
/// The threshold lives in page space, so it is independent of zoom: a
/// hair-thin sliver selected at high magnification is still refused.
pub const EMPTY_EPSILON_PTS: f64 = 0.01;

/// A rectangular export region in page space, in points.
///
/// Corners are stored normalized (`x0 <= x1`, `y0 <= y1`). A region is only
/// considered usable once clamped to its page and checked against
/// [`EMPTY_EPSILON_PTS`]; [`crate::view::viewport_to_page`] performs both.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClipRegion {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl ClipRegion {
    /// Create a region from two opposite corners, normalizing their order.
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Clamp both corners independently to `[0, page_width] × [0, page_height]`.
    pub fn clamped_to(&self, page_width: f64, page_height: f64) -> ClipRegion {
        ClipRegion {
            x0: self.x0.clamp(0.0, page_width),
            y0: self.y0.clamp(0.0, page_height),
            x1: self.x1.clamp(0.0, page_width),
            y1: self.y1.clamp(0.0, page_height),
        }
    }

    /// Whether the region is too thin in either direction to export.
    pub fn is_degenerate(&self) -> bool {
        self.width() <= EMPTY_EPSILON_PTS || self.height() <= EMPTY_EPSILON_PTS
    }

    /// Whether `bbox` overlaps this region at all.
    pub fn intersects(&self, bbox: &BBox) -> bool {
        bbox.x1 >= self.x0 && bbox.x0 <= self.x1 && bbox.bottom >= self.y0 && bbox.top <= self.y1
    }
}
