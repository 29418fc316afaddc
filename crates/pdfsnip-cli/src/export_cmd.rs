use std::fs;
use std::path::Path;

use pdfsnip::{ClipRegion, ClippedPage, ExportOptions, Page, Rotation, SelectionRect, export};

use crate::cli::ExportArgs;
use crate::region::{parse_pair, parse_region};
use crate::shared::{load_page, open_pdf};

pub fn run(args: &ExportArgs) -> Result<(), i32> {
    let pdf = open_pdf(&args.file)?;
    let page = load_page(&pdf, args.page)?;

    for warning in page.warnings() {
        eprintln!("Warning: {warning}");
    }

    let corners = parse_region(&args.region).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;

    let options = ExportOptions::default()
        .with_preserve_text(!args.flatten_text)
        .with_remove_kerning(args.remove_kerning)
        .with_remove_white_background(args.remove_white_bg)
        .with_grayscale(args.grayscale);

    let svg = if args.viewport {
        let clipped = clip_viewport_rect(&page, args, &corners)?;
        export(&clipped, &options).map_err(|e| {
            eprintln!("Error: {e}");
            1
        })?
    } else {
        let region = ClipRegion::new(corners[0], corners[1], corners[2], corners[3]);
        page.export_region(region, &options).map_err(|e| {
            eprintln!("Error: {e}");
            1
        })?
    };

    write_output(&svg, args)
}

/// Convert a viewport-space rectangle through the requested view and clip.
///
/// The view starts from the page's intrinsic rotation; `--rotation`
/// overrides it, and `--zoom` is clamped to the viewer's limits.
fn clip_viewport_rect(
    page: &Page,
    args: &ExportArgs,
    corners: &[f64; 4],
) -> Result<ClippedPage, i32> {
    let mut view = page.initial_view();

    if let Some(degrees) = args.rotation {
        let rotation = Rotation::from_degrees(degrees).ok_or_else(|| {
            eprintln!("Error: rotation must be 0, 90, 180, or 270 degrees");
            1
        })?;
        view.set_rotation(rotation);
    }

    view.set_zoom(args.zoom);

    if let Some(ref spec) = args.pan {
        let (x, y) = parse_pair(spec).map_err(|e| {
            eprintln!("Error: {e}");
            1
        })?;
        view.set_pan(x, y);
    }

    let rect = SelectionRect::from_corners(corners[0], corners[1], corners[2], corners[3]);
    page.clip_viewport(&rect, &view).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })
}

fn write_output(svg: &str, args: &ExportArgs) -> Result<(), i32> {
    if args.clipboard {
        return copy_to_clipboard(svg);
    }

    match args.output.as_deref() {
        Some(path) if path != Path::new("-") => fs::write(path, svg).map_err(|e| {
            eprintln!("Error: failed to write {}: {e}", path.display());
            1
        }),
        _ => {
            println!("{svg}");
            Ok(())
        }
    }
}

#[cfg(feature = "clipboard")]
fn copy_to_clipboard(svg: &str) -> Result<(), i32> {
    let mut clipboard = arboard::Clipboard::new().map_err(|e| {
        eprintln!("Error: clipboard unavailable: {e}");
        1
    })?;
    clipboard.set_text(svg).map_err(|e| {
        eprintln!("Error: failed to copy to clipboard: {e}");
        1
    })
}

#[cfg(not(feature = "clipboard"))]
fn copy_to_clipboard(_svg: &str) -> Result<(), i32> {
    eprintln!("Error: clipboard support was not compiled in (rebuild with the 'clipboard' feature)");
    Err(1)
}
