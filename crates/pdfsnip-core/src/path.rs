//! Vector path model and construction.
//!
//! Paths are stored with all coordinates already in page space; the
//! [`PathBuilder`] applies the current transformation matrix as segments
//! are appended, so nothing downstream needs to re-transform them.

use crate::geometry::{BBox, Ctm, Point};

/// A segment of a vector path.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathSegment {
    /// Move to a new point (starts a new subpath).
    MoveTo(Point),
    /// Straight line from the current point to the target.
    LineTo(Point),
    /// Cubic Bezier curve with two control points and an endpoint.
    CurveTo {
        cp1: Point,
        cp2: Point,
        end: Point,
    },
    /// Close the current subpath (line back to the subpath start).
    ClosePath,
}

impl PathSegment {
    fn map_points(&self, f: impl Fn(Point) -> Point) -> PathSegment {
        match self {
            PathSegment::MoveTo(p) => PathSegment::MoveTo(f(*p)),
            PathSegment::LineTo(p) => PathSegment::LineTo(f(*p)),
            PathSegment::CurveTo { cp1, cp2, end } => PathSegment::CurveTo {
                cp1: f(*cp1),
                cp2: f(*cp2),
                end: f(*end),
            },
            PathSegment::ClosePath => PathSegment::ClosePath,
        }
    }
}

/// A complete path consisting of segments.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    pub segments: Vec<PathSegment>,
}

/// Tolerance for the axis-aligned rectangle test.
const RECT_EPS: f64 = 1e-6;

impl Path {
    /// Shift every coordinate by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> Path {
        self.transform(&Ctm::translation(dx, dy))
    }

    /// Map every coordinate through a matrix.
    pub fn transform(&self, m: &Ctm) -> Path {
        Path {
            segments: self
                .segments
                .iter()
                .map(|s| s.map_points(|p| m.transform_point(p)))
                .collect(),
        }
    }

    /// Bounding box over all anchor and control points.
    ///
    /// Curves lie within the convex hull of their control points, so the
    /// result always contains the drawn geometry (it may overestimate for
    /// curves, which errs on the side of keeping content when culling).
    pub fn bbox(&self) -> Option<BBox> {
        let mut points = Vec::new();
        for seg in &self.segments {
            match seg {
                PathSegment::MoveTo(p) | PathSegment::LineTo(p) => points.push(*p),
                PathSegment::CurveTo { cp1, cp2, end } => {
                    points.push(*cp1);
                    points.push(*cp2);
                    points.push(*end);
                }
                PathSegment::ClosePath => {}
            }
        }
        BBox::around_points(&points)
    }

    /// If the path is a single axis-aligned rectangle, return its box.
    ///
    /// Recognizes the `moveto + 3 lineto (+ closepath)` shape that the
    /// `re` operator produces, in either winding direction. Anything else,
    /// including rectangles with rotated corners, returns `None`.
    pub fn as_axis_aligned_rect(&self) -> Option<BBox> {
        let segs = &self.segments;
        if !(segs.len() == 4 || (segs.len() == 5 && segs[4] == PathSegment::ClosePath)) {
            return None;
        }

        let corner = |seg: &PathSegment| match seg {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => Some(*p),
            _ => None,
        };
        let p0 = corner(&segs[0])?;
        let p1 = corner(&segs[1])?;
        let p2 = corner(&segs[2])?;
        let p3 = corner(&segs[3])?;
        if !matches!(segs[0], PathSegment::MoveTo(_)) {
            return None;
        }
        for seg in &segs[1..4] {
            if !matches!(seg, PathSegment::LineTo(_)) {
                return None;
            }
        }

        let eq = |a: f64, b: f64| (a - b).abs() < RECT_EPS;
        let horizontal_first = eq(p0.y, p1.y) && eq(p1.x, p2.x) && eq(p2.y, p3.y) && eq(p3.x, p0.x);
        let vertical_first = eq(p0.x, p1.x) && eq(p1.y, p2.y) && eq(p2.x, p3.x) && eq(p3.y, p0.y);
        if !(horizontal_first || vertical_first) {
            return None;
        }

        BBox::around_points(&[p0, p1, p2, p3])
    }
}

/// Builder for constructing paths from content stream path operators.
///
/// Coordinates are transformed through the CTM before storage.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    segments: Vec<PathSegment>,
    current_point: Option<Point>,
    subpath_start: Option<Point>,
    ctm: Ctm,
}

impl PathBuilder {
    /// Create a new PathBuilder with the given CTM.
    pub fn new(ctm: Ctm) -> Self {
        Self {
            segments: Vec::new(),
            current_point: None,
            subpath_start: None,
            ctm,
        }
    }

    /// Update the CTM used for subsequent segments.
    pub fn set_ctm(&mut self, ctm: Ctm) {
        self.ctm = ctm;
    }

    /// `m` operator: move to a new point, starting a new subpath.
    pub fn move_to(&mut self, x: f64, y: f64) {
        let p = self.ctm.transform_point(Point::new(x, y));
        self.segments.push(PathSegment::MoveTo(p));
        self.current_point = Some(p);
        self.subpath_start = Some(p);
    }

    /// `l` operator: straight line from the current point to `(x, y)`.
    pub fn line_to(&mut self, x: f64, y: f64) {
        let p = self.ctm.transform_point(Point::new(x, y));
        self.segments.push(PathSegment::LineTo(p));
        self.current_point = Some(p);
    }

    /// `c` operator: cubic Bezier curve with three coordinate pairs.
    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        let cp1 = self.ctm.transform_point(Point::new(x1, y1));
        let cp2 = self.ctm.transform_point(Point::new(x2, y2));
        let end = self.ctm.transform_point(Point::new(x3, y3));
        self.segments.push(PathSegment::CurveTo { cp1, cp2, end });
        self.current_point = Some(end);
    }

    /// `v` operator: cubic Bezier where the first control point equals the
    /// current point.
    pub fn curve_to_v(&mut self, x2: f64, y2: f64, x3: f64, y3: f64) {
        let Some(cp1) = self.current_point else {
            return;
        };
        let cp2 = self.ctm.transform_point(Point::new(x2, y2));
        let end = self.ctm.transform_point(Point::new(x3, y3));
        self.segments.push(PathSegment::CurveTo { cp1, cp2, end });
        self.current_point = Some(end);
    }

    /// `y` operator: cubic Bezier where the last control point equals the
    /// endpoint.
    pub fn curve_to_y(&mut self, x1: f64, y1: f64, x3: f64, y3: f64) {
        let cp1 = self.ctm.transform_point(Point::new(x1, y1));
        let end = self.ctm.transform_point(Point::new(x3, y3));
        self.segments
            .push(PathSegment::CurveTo { cp1, cp2: end, end });
        self.current_point = Some(end);
    }

    /// `h` operator: close the current subpath.
    pub fn close_path(&mut self) {
        self.segments.push(PathSegment::ClosePath);
        if let Some(start) = self.subpath_start {
            self.current_point = Some(start);
        }
    }

    /// `re` operator: append a rectangle as moveto + 3 lineto + closepath.
    pub fn rectangle(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.move_to(x, y);
        self.line_to(x + width, y);
        self.line_to(x + width, y + height);
        self.line_to(x, y + height);
        self.close_path();
    }

    /// Get the current point (already CTM-transformed).
    pub fn current_point(&self) -> Option<Point> {
        self.current_point
    }

    /// Check if the builder has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Take the accumulated segments as a [`Path`] and reset the builder.
    pub fn take_and_reset(&mut self) -> Path {
        let segments = std::mem::take(&mut self.segments);
        self.current_point = None;
        self.subpath_start = None;
        Path { segments }
    }
}
