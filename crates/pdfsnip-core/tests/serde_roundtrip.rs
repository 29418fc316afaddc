//! Serde round-trip tests for the public data types.
//!
//! One representative value per type family: serialize to JSON,
//! deserialize back, assert equality. Field-name assertions pin the
//! wire shape callers depend on.

#![cfg(feature = "serde")]

use pdfsnip_core::*;

fn roundtrip<T>(value: &T)
where
    T: serde::Serialize + serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    let json = serde_json::to_string(value).expect("serialize failed");
    let restored: T = serde_json::from_str(&json).expect("deserialize failed");
    assert_eq!(*value, restored, "round-trip mismatch for JSON: {json}");
}

// --- Geometry ---

#[test]
fn test_serde_geometry_types() {
    roundtrip(&Point::new(3.5, -2.25));
    roundtrip(&Ctm::new(2.0, 0.0, 0.0, -2.0, 10.0, 792.0));
    roundtrip(&BBox::new(10.0, 20.0, 300.0, 400.0));
    roundtrip(&ClipRegion::new(100.0, 100.0, 300.0, 200.0));
}

#[test]
fn test_bbox_json_field_names() {
    let json: serde_json::Value = serde_json::to_value(BBox::new(1.0, 2.0, 3.0, 4.0)).unwrap();
    assert_eq!(json["x0"], 1.0);
    assert_eq!(json["top"], 2.0);
    assert_eq!(json["x1"], 3.0);
    assert_eq!(json["bottom"], 4.0);
}

// --- View and selection ---

#[test]
fn test_serde_view_state() {
    let mut view = ViewState::new();
    view.page_index = 2;
    view.set_zoom(1.5);
    view.set_pan(12.0, 34.0);
    view.set_rotation(Rotation::R90);
    roundtrip(&view);
    roundtrip(&PageGeometry::new(612.0, 792.0, &view));
}

#[test]
fn test_serde_rotation_variants() {
    roundtrip(&Rotation::R0);
    roundtrip(&Rotation::R270);
}

#[test]
fn test_serde_selection_rect() {
    roundtrip(&SelectionRect::from_corners(400.0, 300.0, 100.0, 100.0));
}

// --- Content model ---

fn sample_painted_path() -> PaintedPath {
    let mut builder = PathBuilder::new(Ctm::identity());
    builder.rectangle(10.0, 20.0, 30.0, 40.0);
    builder.fill(&GraphicsState::default()).expect("non-empty path")
}

fn sample_text_run() -> TextRun {
    TextRun {
        font: "Helvetica".to_string(),
        size: 12.0,
        h_scale: 1.0,
        matrix: Ctm::new(1.0, 0.0, 0.0, -1.0, 100.0, 92.0),
        fill_color: Color::black(),
        fill_alpha: 1.0,
        glyphs: vec![Glyph {
            code: 65,
            text: "A".to_string(),
            dx: 0.0,
            kern: 0.0,
            advance: 7.2,
            gid: Some(36),
            outline: None,
        }],
    }
}

#[test]
fn test_serde_painted_path() {
    roundtrip(&sample_painted_path());
}

#[test]
fn test_serde_dashed_stroke() {
    let state = GraphicsState {
        line_width: 2.0,
        dash_pattern: DashPattern::new(vec![3.0, 1.0], 0.5),
        ..GraphicsState::default()
    };
    let mut builder = PathBuilder::new(Ctm::identity());
    builder.move_to(0.0, 0.0);
    builder.line_to(50.0, 0.0);
    let stroked = builder.stroke(&state).expect("non-empty path");
    assert!(!stroked.dash_pattern.is_solid());
    roundtrip(&stroked);
}

#[test]
fn test_serde_path_segments() {
    let path = Path {
        segments: vec![
            PathSegment::MoveTo(Point::new(0.0, 0.0)),
            PathSegment::LineTo(Point::new(10.0, 0.0)),
            PathSegment::CurveTo {
                cp1: Point::new(10.0, 5.0),
                cp2: Point::new(5.0, 10.0),
                end: Point::new(0.0, 10.0),
            },
            PathSegment::ClosePath,
        ],
    };
    roundtrip(&path);
}

#[test]
fn test_serde_color_variants() {
    roundtrip(&Color::Gray(0.5));
    roundtrip(&Color::Rgb(1.0, 0.0, 0.25));
    roundtrip(&Color::Cmyk(0.1, 0.2, 0.3, 0.4));
}

#[test]
fn test_serde_text_run() {
    roundtrip(&sample_text_run());
}

#[test]
fn test_serde_placed_image() {
    roundtrip(&PlacedImage {
        name: "Im0".to_string(),
        matrix: Ctm::new(100.0, 0.0, 0.0, 50.0, 10.0, 20.0),
        width_px: 4,
        height_px: 2,
        alpha: 1.0,
        data: ImageData {
            format: ImageFormat::Jpeg,
            bytes: vec![0xff, 0xd8, 0xff, 0xd9],
        },
    });
}

#[test]
fn test_serde_page_content_with_items() {
    let mut content = PageContent::new(612.0, 792.0);
    content.items.push(PageItem::Path(sample_painted_path()));
    content.items.push(PageItem::Text(sample_text_run()));
    content.warnings.push("inline image skipped".to_string());
    roundtrip(&content);
}

#[test]
fn test_serde_clipped_page() {
    roundtrip(&ClippedPage {
        width: 200.0,
        height: 100.0,
        items: vec![PageItem::Path(sample_painted_path())],
    });
}
