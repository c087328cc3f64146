// src/debug/visualization/svg.rs
//! SVG-Export eines Laufs zur visuellen Kontrolle.
//!
//! Die y-Achse wird gespiegelt, damit projizierte Koordinaten (Norden oben)
//! nicht auf dem Kopf stehen. Gezeichnet wird relativ zur linken oberen Ecke
//! der Darstellungsgrenzen, sonst verlieren große Rechts-/Hochwerte in `f32`
//! ihre Nachkommastellen.

use crate::math::{
    geometry::polygon::{Polygon, Ring},
    types::{Bounds2D, Point2D},
};
use crate::range::RangeFootprint;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use svg::{
    Document,
    node::element::{Circle, Group, Path as SvgPath, Rectangle, path::Data},
};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error while writing SVG: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output file {0:?} already exists and overwrite is disabled")]
    AlreadyExists(PathBuf),
}

/// Darstellungs- und Schreiboptionen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgExportOptions {
    /// Vorhandene Datei ersetzen
    pub overwrite: bool,
    /// Kantenlänge der Grafik in Pixeln
    pub pixel_size: f64,
    /// Zwischenstufen zeichnen, falls das Ergebnis sie enthält
    pub draw_stages: bool,
}

impl Default for SvgExportOptions {
    fn default() -> Self {
        Self {
            overwrite: false,
            pixel_size: 800.0,
            draw_stages: true,
        }
    }
}

impl SvgExportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn with_pixel_size(mut self, pixel_size: f64) -> Self {
        self.pixel_size = pixel_size;
        self
    }

    pub fn with_stages(mut self, draw_stages: bool) -> Self {
        self.draw_stages = draw_stages;
        self
    }
}

/// Bildet Weltkoordinaten auf die Zeichenfläche ab und hält die
/// relativen Strichstärken.
struct Canvas {
    bounds: Bounds2D,
    stroke_normal: f64,
    stroke_thin: f64,
    point_radius: f64,
}

impl Canvas {
    fn new(bounds: Bounds2D) -> Self {
        let extent = (bounds.width() + bounds.height()) / 2.0;
        Self {
            bounds,
            stroke_normal: extent * 0.004,
            stroke_thin: extent * 0.0015,
            point_radius: extent * 0.006,
        }
    }

    fn map(&self, p: Point2D) -> (f32, f32) {
        (
            (p.x - self.bounds.min.x) as f32,
            (self.bounds.max.y - p.y) as f32,
        )
    }

    fn ring_data(&self, data: Data, ring: &Ring) -> Data {
        let mut vertices = ring.vertices().iter().map(|&p| self.map(p));
        let Some(first) = vertices.next() else {
            return data;
        };
        vertices
            .fold(data.move_to(first), |d, v| d.line_to(v))
            .close()
    }

    /// Ein `<path>` pro Teil; Löcher als Unterpfade mit even-odd-Füllung.
    fn polygon(&self, polygon: &Polygon, fill: &str, stroke: &str, width: f64) -> SvgPath {
        let data = polygon
            .rings()
            .fold(Data::new(), |d, ring| self.ring_data(d, ring));
        SvgPath::new()
            .set("d", data)
            .set("fill", fill)
            .set("fill-rule", "evenodd")
            .set("stroke", stroke)
            .set("stroke-width", width)
    }

    fn layer<'a>(
        &self,
        class: &str,
        polygons: impl IntoIterator<Item = &'a Polygon>,
        fill: &str,
        stroke: &str,
        width: f64,
    ) -> Group {
        polygons
            .into_iter()
            .fold(Group::new().set("class", class), |g, p| {
                g.add(self.polygon(p, fill, stroke, width))
            })
    }

    fn points(&self, class: &str, points: &[Point2D], fill: &str) -> Group {
        points
            .iter()
            .filter(|p| p.is_finite())
            .fold(Group::new().set("class", class), |g, &p| {
                let (cx, cy) = self.map(p);
                g.add(
                    Circle::new()
                        .set("cx", cx)
                        .set("cy", cy)
                        .set("r", self.point_radius)
                        .set("fill", fill)
                        .set("stroke", "#333333")
                        .set("stroke-width", self.stroke_thin),
                )
            })
    }
}

fn display_bounds(points: &[Point2D], result: &RangeFootprint) -> Bounds2D {
    let mut bounds = Bounds2D::from_points_iter(points.iter().copied().filter(|p| p.is_finite()))
        .unwrap_or_else(Bounds2D::empty)
        .union(&result.footprint.bounds());
    if let Some(stages) = &result.stages {
        bounds = stages
            .buffered
            .iter()
            .fold(bounds, |acc, p| acc.union(&p.bounds()))
            .union(&stages.smoothed.bounds());
    }
    if bounds.is_empty() {
        return Bounds2D::from_points(Point2D::ZERO, Point2D::ONE);
    }
    // 5 % Rand; ein einzelner Punkt bekommt eine Einheit
    let extent = bounds.width().max(bounds.height());
    let margin = if extent > 0.0 { extent * 0.05 } else { 1.0 };
    bounds.expand(margin)
}

/// Zeichnet Eingabepunkte, optional die Zwischenstufen und den Umriss.
pub fn render_footprint_svg(
    points: &[Point2D],
    result: &RangeFootprint,
    options: &SvgExportOptions,
) -> Document {
    let bounds = display_bounds(points, result);
    let canvas = Canvas::new(bounds);

    let mut document = Document::new()
        .set("width", options.pixel_size)
        .set("height", options.pixel_size)
        .set(
            "viewBox",
            format!("0 0 {} {}", bounds.width(), bounds.height()),
        )
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", bounds.width())
                .set("height", bounds.height())
                .set("fill", "#f0f0f0"),
        );

    if let Some(stages) = result.stages.as_ref().filter(|_| options.draw_stages) {
        document = document
            .add(canvas.layer(
                "buffered",
                &stages.buffered,
                "rgba(255, 220, 150, 0.3)",
                "#ffaa00",
                canvas.stroke_thin,
            ))
            .add(canvas.layer(
                "aggregates",
                stages.aggregates.iter().map(|a| &a.polygon),
                "none",
                "#888888",
                canvas.stroke_thin,
            ))
            .add(canvas.layer(
                "dissolved",
                &stages.dissolved,
                "none",
                "#00aa00",
                canvas.stroke_thin,
            ));
    }

    document
        .add(canvas.layer(
            "footprint",
            &result.footprint,
            "rgba(200, 150, 255, 0.6)",
            "#5500aa",
            canvas.stroke_normal,
        ))
        .add(canvas.points("input-points", points, "#aaccff"))
}

/// Schreibt die Grafik nach `path`.
///
/// # Errors
/// `AlreadyExists` wenn die Datei existiert und `overwrite` nicht gesetzt ist.
pub fn save_footprint_svg(
    path: impl AsRef<Path>,
    points: &[Point2D],
    result: &RangeFootprint,
    options: &SvgExportOptions,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    if path.exists() && !options.overwrite {
        return Err(ExportError::AlreadyExists(path.to_path_buf()));
    }
    let document = render_footprint_svg(points, result, options);
    svg::save(path, &document)?;
    info!("Debug SVG '{}' wurde erstellt.", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::{RangeConfig, RangeEstimator};

    fn scenario() -> (Vec<Point2D>, RangeFootprint) {
        let points = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(0.0, 1.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(50.0, 50.0),
        ];
        let config = RangeConfig::new()
            .with_min_search_distance(0.5)
            .with_buffer_distance(2.0)
            .keep_intermediates(true);
        let result = RangeEstimator::new(config)
            .unwrap()
            .estimate(&points, None)
            .unwrap();
        (points, result)
    }

    #[test]
    fn test_render_contains_all_layers() {
        let (points, result) = scenario();
        let text = render_footprint_svg(&points, &result, &SvgExportOptions::default()).to_string();
        assert!(text.contains("class=\"footprint\""));
        assert!(text.contains("class=\"buffered\""));
        assert!(text.contains("viewBox"));
        assert_eq!(text.matches("<circle").count(), points.len());
    }

    #[test]
    fn test_render_without_stages() {
        let (points, result) = scenario();
        let options = SvgExportOptions::new().with_stages(false);
        let text = render_footprint_svg(&points, &result, &options).to_string();
        assert!(!text.contains("class=\"buffered\""));
        assert!(text.contains("class=\"footprint\""));
    }

    #[test]
    fn test_y_axis_is_flipped() {
        let canvas = Canvas::new(Bounds2D::from_points(Point2D::ZERO, Point2D::new(10.0, 10.0)));
        assert_eq!(canvas.map(Point2D::new(2.0, 0.0)), (2.0, 10.0));
        assert_eq!(canvas.map(Point2D::new(2.0, 10.0)), (2.0, 0.0));
    }

    #[test]
    fn test_projected_coordinates_keep_precision() {
        let bounds = Bounds2D::from_points(
            Point2D::new(500_000.0, 7_000_000.0),
            Point2D::new(500_100.0, 7_000_100.0),
        );
        let canvas = Canvas::new(bounds);
        assert_eq!(canvas.map(Point2D::new(500_000.25, 7_000_099.5)), (0.25, 0.5));
        assert_eq!(canvas.map(Point2D::new(500_100.0, 7_000_000.0)), (100.0, 100.0));
    }

    #[test]
    fn test_view_box_starts_at_origin() {
        let (points, result) = scenario();
        let text = render_footprint_svg(&points, &result, &SvgExportOptions::default()).to_string();
        assert!(text.contains("viewBox=\"0 0 "));
    }

    #[test]
    fn test_save_respects_overwrite_flag() {
        let (points, result) = scenario();
        let path = std::env::temp_dir().join(format!(
            "occurrence_range_footprint_{}.svg",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        save_footprint_svg(&path, &points, &result, &SvgExportOptions::default()).unwrap();
        assert!(path.exists());

        let err = save_footprint_svg(&path, &points, &result, &SvgExportOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExportError::AlreadyExists(_)));

        let options = SvgExportOptions::new().with_overwrite(true);
        save_footprint_svg(&path, &points, &result, &options).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("<svg"));
        std::fs::remove_file(&path).unwrap();
    }
}
