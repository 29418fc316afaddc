//! Drag-selection state machine.
//!
//! Tracks one rectangle being dragged out in viewport pixels. The rectangle
//! is re-normalized on every update, so a drag toward the upper-left is
//! indistinguishable from one toward the lower-right once committed.

/// Minimum viewport area, in square pixels, for a committed selection.
///
/// A drag smaller than a 4×4 pixel square is treated as an accidental
/// click and commits nothing.
pub const MIN_COMMIT_AREA_PX: f64 = 16.0;

/// A normalized rectangle in viewport pixels.
///
/// `x0 <= x1` and `y0 <= y1` always hold; construction goes through
/// [`SelectionRect::from_corners`], which sorts the coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SelectionRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl SelectionRect {
    /// Build a normalized rectangle from two opposite corners in any order.
    pub fn from_corners(ax: f64, ay: f64, bx: f64, by: f64) -> Self {
        Self {
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
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
}

/// Lifecycle of a single drag selection.
///
/// `begin` starts a drag and discards any previous selection, `update`
/// replaces the in-progress rectangle, `commit` freezes it if large enough,
/// and `cancel` clears everything (called on page change or escape).
#[derive(Debug, Clone, Default)]
pub struct Selection {
    anchor: Option<(f64, f64)>,
    pending: Option<SelectionRect>,
    committed: Option<SelectionRect>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a drag at the given viewport point.
    pub fn begin(&mut self, x: f64, y: f64) {
        self.anchor = Some((x, y));
        self.pending = Some(SelectionRect::from_corners(x, y, x, y));
        self.committed = None;
    }

    /// Move the drag to a new point, replacing the in-progress rectangle.
    ///
    /// Returns the updated rectangle, or `None` when no drag is in
    /// progress (stray pointer events are ignored).
    pub fn update(&mut self, x: f64, y: f64) -> Option<&SelectionRect> {
        let (ax, ay) = self.anchor?;
        self.pending = Some(SelectionRect::from_corners(ax, ay, x, y));
        self.pending.as_ref()
    }

    /// End the drag, freezing the rectangle if its area exceeds
    /// [`MIN_COMMIT_AREA_PX`].
    ///
    /// A sub-threshold drag leaves no selection active, which downstream
    /// surfaces as a disabled export action.
    pub fn commit(&mut self) -> Option<SelectionRect> {
        self.anchor = None;
        let rect = self.pending.take()?;
        if rect.area() > MIN_COMMIT_AREA_PX {
            self.committed = Some(rect);
            Some(rect)
        } else {
            self.committed = None;
            None
        }
    }

    /// Discard both the in-progress and the committed rectangle.
    pub fn cancel(&mut self) {
        self.anchor = None;
        self.pending = None;
        self.committed = None;
    }

    /// The committed selection, if one exists.
    pub fn committed(&self) -> Option<&SelectionRect> {
        self.committed.as_ref()
    }

    /// Whether a drag is currently in progress.
    pub fn is_dragging(&self) -> bool {
        self.anchor.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- SelectionRect normalization ---

    #[test]
    fn test_from_corners_already_ordered() {
        let r = SelectionRect::from_corners(10.0, 20.0, 110.0, 70.0);
        assert_eq!(r.x0, 10.0);
        assert_eq!(r.y0, 20.0);
        assert_eq!(r.x1, 110.0);
        assert_eq!(r.y1, 70.0);
    }

    #[test]
    fn test_from_corners_reversed() {
        let r = SelectionRect::from_corners(110.0, 70.0, 10.0, 20.0);
        assert_eq!(r.x0, 10.0);
        assert_eq!(r.y0, 20.0);
        assert_eq!(r.x1, 110.0);
        assert_eq!(r.y1, 70.0);
    }

    #[test]
    fn test_from_corners_mixed() {
        // Drag down-left: x reversed, y ordered
        let r = SelectionRect::from_corners(110.0, 20.0, 10.0, 70.0);
        assert_eq!(r.x0, 10.0);
        assert_eq!(r.y0, 20.0);
    }

    #[test]
    fn test_rect_dimensions() {
        let r = SelectionRect::from_corners(0.0, 0.0, 8.0, 4.0);
        assert_eq!(r.width(), 8.0);
        assert_eq!(r.height(), 4.0);
        assert_eq!(r.area(), 32.0);
    }

    // --- Drag lifecycle ---

    #[test]
    fn test_begin_update_commit() {
        let mut sel = Selection::new();
        sel.begin(100.0, 100.0);
        assert!(sel.is_dragging());

        sel.update(150.0, 120.0);
        let rect = sel.update(200.0, 180.0).copied().unwrap();
        assert_eq!(rect, SelectionRect::from_corners(100.0, 100.0, 200.0, 180.0));

        let committed = sel.commit().unwrap();
        assert_eq!(committed, rect);
        assert!(!sel.is_dragging());
        assert_eq!(sel.committed(), Some(&rect));
    }

    #[test]
    fn test_update_overwrites_without_history() {
        let mut sel = Selection::new();
        sel.begin(0.0, 0.0);
        sel.update(500.0, 500.0);
        let rect = sel.update(10.0, 10.0).copied().unwrap();
        // Only the latest point counts
        assert_eq!(rect, SelectionRect::from_corners(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_drag_toward_upper_left_normalizes() {
        let mut sel = Selection::new();
        sel.begin(200.0, 180.0);
        sel.update(100.0, 100.0);
        let rect = sel.commit().unwrap();
        assert_eq!(rect, SelectionRect::from_corners(100.0, 100.0, 200.0, 180.0));
    }

    #[test]
    fn test_update_without_begin_is_ignored() {
        let mut sel = Selection::new();
        assert!(sel.update(50.0, 50.0).is_none());
        assert!(sel.commit().is_none());
    }

    // --- Commit threshold ---

    #[test]
    fn test_click_without_drag_commits_nothing() {
        let mut sel = Selection::new();
        sel.begin(100.0, 100.0);
        assert!(sel.commit().is_none());
        assert!(sel.committed().is_none());
    }

    #[test]
    fn test_tiny_drag_commits_nothing() {
        let mut sel = Selection::new();
        sel.begin(100.0, 100.0);
        sel.update(103.0, 103.0); // 9 px², below the threshold
        assert!(sel.commit().is_none());
        assert!(sel.committed().is_none());
        assert!(!sel.is_dragging());
    }

    #[test]
    fn test_threshold_area_is_exclusive() {
        let mut sel = Selection::new();
        sel.begin(0.0, 0.0);
        sel.update(4.0, 4.0); // exactly 16 px²
        assert!(sel.commit().is_none());

        sel.begin(0.0, 0.0);
        sel.update(4.1, 4.0);
        assert!(sel.commit().is_some());
    }

    #[test]
    fn test_sub_threshold_commit_clears_previous_selection() {
        let mut sel = Selection::new();
        sel.begin(0.0, 0.0);
        sel.update(100.0, 100.0);
        sel.commit().unwrap();

        // An accidental click afterwards must not leave the stale
        // selection exposed.
        sel.begin(300.0, 300.0);
        assert!(sel.commit().is_none());
        assert!(sel.committed().is_none());
    }

    // --- Cancel ---

    #[test]
    fn test_cancel_clears_in_progress_drag() {
        let mut sel = Selection::new();
        sel.begin(0.0, 0.0);
        sel.update(100.0, 100.0);
        sel.cancel();
        assert!(!sel.is_dragging());
        assert!(sel.commit().is_none());
    }

    #[test]
    fn test_cancel_clears_committed_selection() {
        let mut sel = Selection::new();
        sel.begin(0.0, 0.0);
        sel.update(100.0, 100.0);
        sel.commit().unwrap();

        sel.cancel();
        assert!(sel.committed().is_none());
    }

    #[test]
    fn test_new_drag_replaces_committed_selection() {
        let mut sel = Selection::new();
        sel.begin(0.0, 0.0);
        sel.update(100.0, 100.0);
        sel.commit().unwrap();

        sel.begin(10.0, 10.0);
        assert!(sel.committed().is_none());
        sel.update(60.0, 60.0);
        let rect = sel.commit().unwrap();
        assert_eq!(rect, SelectionRect::from_corners(10.0, 10.0, 60.0, 60.0));
    }
}
