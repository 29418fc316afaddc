use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Clip a rectangular region of a PDF page and export it as standalone SVG.
#[derive(Debug, Parser)]
#[command(name = "pdfsnip", about, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Export a rectangular region of one page as an SVG document
    Export(ExportArgs),

    /// Show page count and per-page dimensions
    Info {
        /// Path to the PDF file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
}

/// Arguments for the `export` subcommand.
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Path to the PDF file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Page to clip from (1-indexed)
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Region corners, in page points unless --viewport is given
    #[arg(long, value_name = "X0,Y0,X1,Y1", allow_hyphen_values = true)]
    pub region: String,

    /// Interpret the region as viewport pixels under the given view
    #[arg(long)]
    pub viewport: bool,

    /// Viewport zoom factor, clamped to [0.1, 10]
    #[arg(long, default_value_t = 1.0, requires = "viewport")]
    pub zoom: f64,

    /// Viewport pan offset in render-space pixels
    #[arg(long, value_name = "X,Y", requires = "viewport", allow_hyphen_values = true)]
    pub pan: Option<String>,

    /// Display rotation in degrees (0, 90, 180, or 270; default: the page's own)
    #[arg(long, value_name = "DEG", requires = "viewport")]
    pub rotation: Option<i32>,

    /// Output file, or '-' for stdout (the default)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Copy the SVG to the system clipboard instead of writing it out
    #[arg(long, conflicts_with = "output")]
    pub clipboard: bool,

    /// Convert text runs to filled glyph outlines
    #[arg(long)]
    pub flatten_text: bool,

    /// Zero out manual kerning adjustments between glyphs
    #[arg(long)]
    pub remove_kerning: bool,

    /// Drop a full-page white background fill
    #[arg(long)]
    pub remove_white_bg: bool,

    /// Collapse all fill and stroke colors to grays of equal luminance
    #[arg(long)]
    pub grayscale: bool,
}
