//! One interpreted page and its clipping entry points.

use pdfsnip_core::{
    ClipRegion, ClippedPage, ExportOptions, PageContent, PageGeometry, Rotation, SelectionRect,
    SnipError, ViewState, export, viewport_to_page,
};

/// One page of an opened document, with its content interpreted into page
/// space: points, top-left origin, y-down.
///
/// A `Page` is independent of the [`Pdf`](crate::Pdf) it came from and of
/// any view state; clipping and export take what they need as arguments.
#[derive(Debug)]
pub struct Page {
    index: usize,
    rotation: Rotation,
    content: PageContent,
}

impl Page {
    pub(crate) fn new(index: usize, rotation_degrees: u16, content: PageContent) -> Self {
        Self {
            index,
            rotation: Rotation::from_degrees(i32::from(rotation_degrees)).unwrap_or_default(),
            content,
        }
    }

    /// Zero-based index of this page in the document.
    pub fn page_number(&self) -> usize {
        self.index
    }

    /// Page width in points.
    pub fn width(&self) -> f64 {
        self.content.width
    }

    /// Page height in points.
    pub fn height(&self) -> f64 {
        self.content.height
    }

    /// The page's intrinsic viewing rotation from its /Rotate entry.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Everything drawn on the page, in paint order.
    pub fn content(&self) -> &PageContent {
        &self.content
    }

    /// Non-fatal problems encountered while reading the page.
    pub fn warnings(&self) -> &[String] {
        &self.content.warnings
    }

    /// View state a viewer would start from: this page at its intrinsic
    /// rotation, no zoom, no pan.
    pub fn initial_view(&self) -> ViewState {
        let mut view = ViewState::new();
        view.page_index = self.index;
        view.set_rotation(self.rotation);
        view
    }

    /// The page's dimensions and rendered pixel size under a view.
    pub fn geometry(&self, view: &ViewState) -> PageGeometry {
        PageGeometry::new(self.content.width, self.content.height, view)
    }

    /// Extract the content inside a page-space region.
    ///
    /// See [`ClippedPage::extract`] for clamping and culling semantics.
    ///
    /// # Errors
    ///
    /// Returns [`SnipError::EmptyRegion`] when the region clamps to
    /// (near-)zero area.
    pub fn clip(&self, region: ClipRegion) -> Result<ClippedPage, SnipError> {
        ClippedPage::extract(&self.content, region)
    }

    /// Extract the content under a viewport-space rectangle.
    ///
    /// Converts the rectangle through `view` with [`viewport_to_page`] and
    /// clips to the resulting region.
    ///
    /// # Errors
    ///
    /// Returns [`SnipError::EmptyRegion`] when the rectangle misses the
    /// page or collapses to (near-)zero area in page space.
    pub fn clip_viewport(
        &self,
        rect: &SelectionRect,
        view: &ViewState,
    ) -> Result<ClippedPage, SnipError> {
        let region = viewport_to_page(rect, view, &self.geometry(view))?;
        self.clip(region)
    }

    /// Clip a page-space region and serialize it in one call.
    ///
    /// Equivalent to [`clip`](Self::clip) followed by
    /// [`export`](pdfsnip_core::export).
    pub fn export_region(
        &self,
        region: ClipRegion,
        options: &ExportOptions,
    ) -> Result<String, SnipError> {
        export(&self.clip(region)?, options)
    }
}
