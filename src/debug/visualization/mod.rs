// src/debug/visualization/mod.rs
pub mod svg;

pub use self::svg::{ExportError, SvgExportOptions, render_footprint_svg, save_footprint_svg};
