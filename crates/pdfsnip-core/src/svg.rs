//! SVG serialization of clipped pages.
//!
//! Produces a standalone SVG 1.1 document sized to the clipped region.
//! The region boundary is emitted as a `<clipPath>` around all content, so
//! objects that straddle the boundary are trimmed at vector precision by
//! the viewer instead of being cut here.
//!
//! Output is deterministic: element order follows paint order, numbers are
//! formatted to a fixed precision, and nothing date- or environment-
//! dependent is written.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::clipped::ClippedPage;
use crate::content::{PageItem, PlacedImage, TextRun};
use crate::geometry::{Ctm, Point};
use crate::painting::{Color, FillRule, PaintedPath};
use crate::path::{Path, PathSegment};

/// Serialize a clipped page to SVG text.
pub fn serialize(page: &ClippedPage) -> String {
    let mut svg = String::new();
    let w = fmt_num(page.width);
    let h = fmt_num(page.height);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" \
         xmlns:xlink=\"http://www.w3.org/1999/xlink\" version=\"1.1\" \
         width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n"
    ));
    svg.push_str("  <defs>\n");
    svg.push_str("    <clipPath id=\"page-clip\">\n");
    svg.push_str(&format!(
        "      <rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\"/>\n"
    ));
    svg.push_str("    </clipPath>\n");
    svg.push_str("  </defs>\n");
    svg.push_str("  <g clip-path=\"url(#page-clip)\">\n");

    for item in &page.items {
        match item {
            PageItem::Path(painted) => write_path(&mut svg, painted),
            PageItem::Text(run) => write_text(&mut svg, run),
            PageItem::Image(image) => write_image(&mut svg, image),
        }
    }

    svg.push_str("  </g>\n");
    svg.push_str("</svg>\n");
    svg
}

/// Format a coordinate with up to three decimal places, trimmed.
fn fmt_num(value: f64) -> String {
    let mut s = format!("{value:.3}");
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" { "0".to_string() } else { s }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn color_value(color: Color) -> String {
    let (r, g, b) = color.to_rgb();
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("rgb({},{},{})", channel(r), channel(g), channel(b))
}

fn matrix_value(m: &Ctm) -> String {
    format!(
        "matrix({} {} {} {} {} {})",
        fmt_num(m.a),
        fmt_num(m.b),
        fmt_num(m.c),
        fmt_num(m.d),
        fmt_num(m.e),
        fmt_num(m.f)
    )
}

fn path_data(path: &Path) -> String {
    let mut d = String::new();
    for seg in &path.segments {
        if !d.is_empty() {
            d.push(' ');
        }
        match seg {
            PathSegment::MoveTo(p) => {
                d.push_str(&format!("M {} {}", fmt_num(p.x), fmt_num(p.y)));
            }
            PathSegment::LineTo(p) => {
                d.push_str(&format!("L {} {}", fmt_num(p.x), fmt_num(p.y)));
            }
            PathSegment::CurveTo { cp1, cp2, end } => {
                d.push_str(&format!(
                    "C {} {} {} {} {} {}",
                    fmt_num(cp1.x),
                    fmt_num(cp1.y),
                    fmt_num(cp2.x),
                    fmt_num(cp2.y),
                    fmt_num(end.x),
                    fmt_num(end.y)
                ));
            }
            PathSegment::ClosePath => d.push('Z'),
        }
    }
    d
}

fn write_path(svg: &mut String, painted: &PaintedPath) {
    let mut attrs = format!("d=\"{}\"", path_data(&painted.path));

    if painted.fill {
        attrs.push_str(&format!(" fill=\"{}\"", color_value(painted.fill_color)));
        if painted.fill_rule == FillRule::EvenOdd {
            attrs.push_str(" fill-rule=\"evenodd\"");
        }
        if painted.fill_alpha < 1.0 {
            attrs.push_str(&format!(" fill-opacity=\"{}\"", fmt_num(painted.fill_alpha)));
        }
    } else {
        attrs.push_str(" fill=\"none\"");
    }

    if painted.stroke {
        attrs.push_str(&format!(
            " stroke=\"{}\" stroke-width=\"{}\"",
            color_value(painted.stroke_color),
            fmt_num(painted.line_width)
        ));
        if painted.stroke_alpha < 1.0 {
            attrs.push_str(&format!(
                " stroke-opacity=\"{}\"",
                fmt_num(painted.stroke_alpha)
            ));
        }
        if !painted.dash_pattern.is_solid() {
            let dashes: Vec<String> = painted
                .dash_pattern
                .dash_array
                .iter()
                .map(|v| fmt_num(*v))
                .collect();
            attrs.push_str(&format!(" stroke-dasharray=\"{}\"", dashes.join(" ")));
            if painted.dash_pattern.dash_phase != 0.0 {
                attrs.push_str(&format!(
                    " stroke-dashoffset=\"{}\"",
                    fmt_num(painted.dash_pattern.dash_phase)
                ));
            }
        }
    }

    svg.push_str(&format!("    <path {attrs}/>\n"));
}

/// Uniform scale of a matrix that keeps text upright in SVG space, if any.
fn upright_scale(m: &Ctm) -> Option<f64> {
    if m.is_upright() && (m.a - m.d).abs() < 1e-9 {
        Some(m.a)
    } else {
        None
    }
}

fn write_text(svg: &mut String, run: &TextRun) {
    if run.glyphs.is_empty() {
        return;
    }

    // Character positions and content. A glyph that decodes to several
    // characters gets interpolated positions; one that decodes to nothing
    // is shown as U+FFFD so the export never silently drops a glyph.
    let mut local_xs: Vec<f64> = Vec::new();
    let mut content = String::new();
    for glyph in &run.glyphs {
        let chars: Vec<char> = glyph.text.chars().collect();
        if chars.is_empty() {
            local_xs.push(glyph.dx);
            content.push('\u{FFFD}');
            continue;
        }
        let step = glyph.advance / chars.len() as f64;
        for (i, c) in chars.iter().enumerate() {
            local_xs.push(glyph.dx + step * i as f64);
            content.push(*c);
        }
    }

    // Text space is y-up while SVG glyphs render y-down, so fold a flip
    // into the run matrix before deciding how to emit it.
    let m = Ctm::new(1.0, 0.0, 0.0, -1.0, 0.0, 0.0).concat(&run.matrix);

    let mut attrs = String::new();
    match upright_scale(&m) {
        Some(scale) => {
            let xs: Vec<String> = local_xs
                .iter()
                .map(|x| fmt_num(run.matrix.transform_point(Point::new(*x, 0.0)).x))
                .collect();
            let baseline = run.matrix.transform_point(Point::new(0.0, 0.0));
            attrs.push_str(&format!(
                "x=\"{}\" y=\"{}\" font-size=\"{}\"",
                xs.join(" "),
                fmt_num(baseline.y),
                fmt_num(run.size * scale)
            ));
        }
        None => {
            let xs: Vec<String> = local_xs.iter().map(|x| fmt_num(*x)).collect();
            attrs.push_str(&format!(
                "transform=\"{}\" x=\"{}\" y=\"0\" font-size=\"{}\"",
                matrix_value(&m),
                xs.join(" "),
                fmt_num(run.size)
            ));
        }
    }

    attrs.push_str(&format!(
        " font-family=\"{}\" fill=\"{}\"",
        escape_xml(&run.font),
        color_value(run.fill_color)
    ));
    if run.fill_alpha < 1.0 {
        attrs.push_str(&format!(" fill-opacity=\"{}\"", fmt_num(run.fill_alpha)));
    }

    svg.push_str(&format!("    <text {attrs}>{}</text>\n", escape_xml(&content)));
}

fn write_image(svg: &mut String, image: &PlacedImage) {
    // The placement matrix maps the unit square with a y-up interior; SVG
    // draws image pixels y-down from the top-left, so flip the interior
    // before composing.
    let m = Ctm::new(1.0, 0.0, 0.0, -1.0, 0.0, 1.0).concat(&image.matrix);

    let mut attrs = String::new();
    if m.b == 0.0 && m.c == 0.0 && m.a > 0.0 && m.d > 0.0 {
        attrs.push_str(&format!(
            "x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"",
            fmt_num(m.e),
            fmt_num(m.f),
            fmt_num(m.a),
            fmt_num(m.d)
        ));
    } else {
        attrs.push_str(&format!(
            "transform=\"{}\" x=\"0\" y=\"0\" width=\"1\" height=\"1\"",
            matrix_value(&m)
        ));
    }
    attrs.push_str(" preserveAspectRatio=\"none\"");
    if image.alpha < 1.0 {
        attrs.push_str(&format!(" opacity=\"{}\"", fmt_num(image.alpha)));
    }

    let href = format!(
        "data:{};base64,{}",
        image.data.format.mime_type(),
        BASE64.encode(&image.data.bytes)
    );
    svg.push_str(&format!("    <image {attrs} xlink:href=\"{href}\"/>\n"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Glyph, ImageData, ImageFormat};
    use crate::painting::{DashPattern, GraphicsState};
    use crate::path::PathBuilder;

    fn empty_page(w: f64, h: f64) -> ClippedPage {
        ClippedPage {
            width: w,
            height: h,
            items: vec![],
        }
    }

    fn page_with(items: Vec<PageItem>) -> ClippedPage {
        ClippedPage {
            width: 200.0,
            height: 100.0,
            items,
        }
    }

    fn glyph(text: &str, dx: f64, advance: f64) -> Glyph {
        Glyph {
            code: 0,
            text: text.to_string(),
            dx,
            kern: 0.0,
            advance,
            gid: None,
            outline: None,
        }
    }

    fn upright_run(text_glyphs: Vec<Glyph>) -> TextRun {
        TextRun {
            font: "Helvetica".to_string(),
            size: 12.0,
            h_scale: 1.0,
            matrix: Ctm::new(1.0, 0.0, 0.0, -1.0, 20.0, 50.0),
            fill_color: Color::black(),
            fill_alpha: 1.0,
            glyphs: text_glyphs,
        }
    }

    // --- document skeleton ---

    #[test]
    fn test_skeleton_and_viewbox() {
        let svg = serialize(&empty_page(200.0, 100.0));

        assert!(svg.contains("xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("version=\"1.1\""));
        assert!(svg.contains("width=\"200\" height=\"100\""));
        assert!(svg.contains("viewBox=\"0 0 200 100\""));
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_clip_path_bounds_content() {
        let svg = serialize(&empty_page(200.0, 100.0));

        assert!(svg.contains("<clipPath id=\"page-clip\">"));
        assert!(svg.contains("<rect x=\"0\" y=\"0\" width=\"200\" height=\"100\"/>"));
        assert!(svg.contains("<g clip-path=\"url(#page-clip)\">"));
    }

    #[test]
    fn test_empty_page_has_empty_body() {
        let svg = serialize(&empty_page(80.0, 80.0));

        assert!(!svg.contains("<path"));
        assert!(!svg.contains("<text"));
        assert!(!svg.contains("<image"));
    }

    #[test]
    fn test_fractional_dimensions_are_trimmed() {
        let svg = serialize(&empty_page(66.666666, 133.3333333));
        assert!(svg.contains("viewBox=\"0 0 66.667 133.333\""));
    }

    // --- number formatting ---

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(612.0), "612");
        assert_eq!(fmt_num(66.666666), "66.667");
        assert_eq!(fmt_num(12.5), "12.5");
        assert_eq!(fmt_num(-3.0), "-3");
        assert_eq!(fmt_num(-0.0001), "0");
        assert_eq!(fmt_num(0.0), "0");
    }

    // --- paths ---

    fn filled_rect() -> PaintedPath {
        let mut builder = PathBuilder::new(Ctm::identity());
        builder.rectangle(0.0, 0.0, 100.0, 50.0);
        builder.fill(&GraphicsState::default()).unwrap()
    }

    #[test]
    fn test_filled_path_markup() {
        let svg = serialize(&page_with(vec![PageItem::Path(filled_rect())]));

        assert!(svg.contains("d=\"M 0 0 L 100 0 L 100 50 L 0 50 Z\""));
        assert!(svg.contains("fill=\"rgb(0,0,0)\""));
        assert!(!svg.contains("stroke="));
    }

    #[test]
    fn test_stroke_only_path_markup() {
        let mut builder = PathBuilder::new(Ctm::identity());
        builder.move_to(0.0, 0.0);
        builder.line_to(50.0, 50.0);
        let painted = builder
            .stroke(&GraphicsState {
                line_width: 2.0,
                stroke_color: Color::Rgb(1.0, 0.0, 0.0),
                ..Default::default()
            })
            .unwrap();
        let svg = serialize(&page_with(vec![PageItem::Path(painted)]));

        assert!(svg.contains("fill=\"none\""));
        assert!(svg.contains("stroke=\"rgb(255,0,0)\""));
        assert!(svg.contains("stroke-width=\"2\""));
    }

    #[test]
    fn test_even_odd_fill_rule() {
        let mut builder = PathBuilder::new(Ctm::identity());
        builder.rectangle(0.0, 0.0, 10.0, 10.0);
        let painted = builder.fill_even_odd(&GraphicsState::default()).unwrap();
        let svg = serialize(&page_with(vec![PageItem::Path(painted)]));

        assert!(svg.contains("fill-rule=\"evenodd\""));
    }

    #[test]
    fn test_dash_pattern_markup() {
        let mut builder = PathBuilder::new(Ctm::identity());
        builder.move_to(0.0, 0.0);
        builder.line_to(50.0, 0.0);
        let painted = builder
            .stroke(&GraphicsState {
                dash_pattern: DashPattern::new(vec![4.0, 2.0], 1.0),
                ..Default::default()
            })
            .unwrap();
        let svg = serialize(&page_with(vec![PageItem::Path(painted)]));

        assert!(svg.contains("stroke-dasharray=\"4 2\""));
        assert!(svg.contains("stroke-dashoffset=\"1\""));
    }

    #[test]
    fn test_fill_opacity_markup() {
        let mut builder = PathBuilder::new(Ctm::identity());
        builder.rectangle(0.0, 0.0, 10.0, 10.0);
        let painted = builder
            .fill(&GraphicsState {
                fill_alpha: 0.5,
                ..Default::default()
            })
            .unwrap();
        let svg = serialize(&page_with(vec![PageItem::Path(painted)]));

        assert!(svg.contains("fill-opacity=\"0.5\""));
    }

    #[test]
    fn test_gray_luma_maps_to_rgb_bytes() {
        let mut builder = PathBuilder::new(Ctm::identity());
        builder.rectangle(0.0, 0.0, 10.0, 10.0);
        let painted = builder
            .fill(&GraphicsState {
                fill_color: Color::Rgb(1.0, 0.0, 0.0).to_gray(),
                ..Default::default()
            })
            .unwrap();
        let svg = serialize(&page_with(vec![PageItem::Path(painted)]));

        // 0.299 of full red rounds to 76 per channel
        assert!(svg.contains("fill=\"rgb(76,76,76)\""));
    }

    #[test]
    fn test_curve_markup() {
        let mut builder = PathBuilder::new(Ctm::identity());
        builder.move_to(0.0, 0.0);
        builder.curve_to(10.0, 20.0, 30.0, 40.0, 50.0, 60.0);
        let painted = builder.stroke(&GraphicsState::default()).unwrap();
        let svg = serialize(&page_with(vec![PageItem::Path(painted)]));

        assert!(svg.contains("C 10 20 30 40 50 60"));
    }

    // --- text ---

    #[test]
    fn test_upright_text_uses_position_lists() {
        let run = upright_run(vec![glyph("H", 0.0, 10.0), glyph("i", 10.0, 4.0)]);
        let svg = serialize(&page_with(vec![PageItem::Text(run)]));

        assert!(svg.contains("<text x=\"20 30\" y=\"50\" font-size=\"12\""));
        assert!(svg.contains("font-family=\"Helvetica\""));
        assert!(svg.contains(">Hi</text>"));
        assert!(!svg.contains("transform="));
    }

    #[test]
    fn test_rotated_text_uses_transform() {
        let mut run = upright_run(vec![glyph("A", 0.0, 10.0)]);
        // 90 degree rotation in page space
        run.matrix = Ctm::new(0.0, 1.0, 1.0, 0.0, 40.0, 40.0);
        let svg = serialize(&page_with(vec![PageItem::Text(run)]));

        assert!(svg.contains("transform=\"matrix("));
        assert!(svg.contains("font-size=\"12\""));
    }

    #[test]
    fn test_scaled_text_effective_size() {
        let mut run = upright_run(vec![glyph("A", 0.0, 10.0)]);
        run.matrix = Ctm::new(2.0, 0.0, 0.0, -2.0, 0.0, 90.0);
        let svg = serialize(&page_with(vec![PageItem::Text(run)]));

        assert!(svg.contains("font-size=\"24\""));
    }

    #[test]
    fn test_text_content_is_escaped() {
        let run = upright_run(vec![glyph("a", 0.0, 5.0), glyph("&", 5.0, 5.0), glyph("<", 10.0, 5.0)]);
        let svg = serialize(&page_with(vec![PageItem::Text(run)]));

        assert!(svg.contains(">a&amp;&lt;</text>"));
    }

    #[test]
    fn test_multi_char_glyph_interpolates_positions() {
        // A ligature decoding to two characters
        let run = upright_run(vec![glyph("fi", 0.0, 8.0), glyph("n", 8.0, 6.0)]);
        let svg = serialize(&page_with(vec![PageItem::Text(run)]));

        assert!(svg.contains("x=\"20 24 28\""));
        assert!(svg.contains(">fin</text>"));
    }

    #[test]
    fn test_unmapped_glyph_is_visible_placeholder() {
        let run = upright_run(vec![glyph("", 0.0, 10.0)]);
        let svg = serialize(&page_with(vec![PageItem::Text(run)]));

        assert!(svg.contains(">\u{FFFD}</text>"));
    }

    // --- images ---

    fn jpeg_image(matrix: Ctm) -> PlacedImage {
        PlacedImage {
            name: "Im0".to_string(),
            matrix,
            width_px: 2,
            height_px: 2,
            alpha: 1.0,
            data: ImageData {
                format: ImageFormat::Jpeg,
                bytes: vec![0xff, 0xd8, 0xff, 0xd9],
            },
        }
    }

    #[test]
    fn test_axis_aligned_image_markup() {
        // Unit square mapped to a 120x80 footprint with top-left (10, 20)
        let image = jpeg_image(Ctm::new(120.0, 0.0, 0.0, -80.0, 10.0, 100.0));
        let svg = serialize(&page_with(vec![PageItem::Image(image)]));

        assert!(svg.contains("<image x=\"10\" y=\"20\" width=\"120\" height=\"80\""));
        assert!(svg.contains("preserveAspectRatio=\"none\""));
        assert!(svg.contains("xlink:href=\"data:image/jpeg;base64,/9j/2Q==\""));
    }

    #[test]
    fn test_rotated_image_uses_transform() {
        let image = jpeg_image(Ctm::new(0.0, 100.0, -80.0, 0.0, 90.0, 10.0));
        let svg = serialize(&page_with(vec![PageItem::Image(image)]));

        assert!(svg.contains("<image transform=\"matrix("));
        assert!(svg.contains("width=\"1\" height=\"1\""));
    }

    #[test]
    fn test_image_opacity() {
        let mut image = jpeg_image(Ctm::new(10.0, 0.0, 0.0, -10.0, 0.0, 10.0));
        image.alpha = 0.25;
        let svg = serialize(&page_with(vec![PageItem::Image(image)]));

        assert!(svg.contains("opacity=\"0.25\""));
    }

    // --- ordering ---

    #[test]
    fn test_items_serialize_in_paint_order() {
        let run = upright_run(vec![glyph("A", 0.0, 10.0)]);
        let svg = serialize(&page_with(vec![
            PageItem::Path(filled_rect()),
            PageItem::Text(run),
        ]));

        let path_at = svg.find("<path").unwrap();
        let text_at = svg.find("<text").unwrap();
        assert!(path_at < text_at);
    }

    #[test]
    fn test_serialization_is_stable() {
        let page = page_with(vec![PageItem::Path(filled_rect())]);
        assert_eq!(serialize(&page), serialize(&page));
    }
}
