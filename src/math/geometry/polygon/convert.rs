// src/math/geometry/polygon/convert.rs

//! Conversions between the crate's polygon types and `geo` geometries.
//!
//! `geo` stores rings explicitly closed; the crate's `Ring` keeps them
//! implicitly closed. Rings that collapse below three distinct vertices on
//! the way back are dropped, together with their part if it is an exterior.

use super::{
    core::{MultiPolygon, Polygon},
    ring::Ring,
};
use crate::math::types::{from_coord, to_coord};
use geo::{LineString, MultiPolygon as GeoMultiPolygon, Polygon as GeoPolygon};

impl From<&Ring> for LineString<f64> {
    fn from(ring: &Ring) -> Self {
        LineString::new(ring.closed_vertices().map(to_coord).collect())
    }
}

impl From<&Polygon> for GeoPolygon<f64> {
    fn from(polygon: &Polygon) -> Self {
        GeoPolygon::new(
            polygon.exterior().into(),
            polygon.holes().iter().map(LineString::from).collect(),
        )
    }
}

impl From<&MultiPolygon> for GeoMultiPolygon<f64> {
    fn from(multi: &MultiPolygon) -> Self {
        GeoMultiPolygon::new(multi.iter().map(GeoPolygon::from).collect())
    }
}

fn ring_from_line_string(line: &LineString<f64>) -> Option<Ring> {
    Ring::new(line.coords().copied().map(from_coord).collect()).ok()
}

impl Polygon {
    /// `None` wenn der äußere Ring degeneriert ist.
    pub fn from_geo(polygon: &GeoPolygon<f64>) -> Option<Self> {
        let exterior = ring_from_line_string(polygon.exterior())?;
        let holes = polygon
            .interiors()
            .iter()
            .filter_map(ring_from_line_string)
            .collect();
        Some(Polygon::new(exterior, holes))
    }
}

impl MultiPolygon {
    pub fn from_geo(multi: &GeoMultiPolygon<f64>) -> Self {
        multi.iter().filter_map(Polygon::from_geo).collect()
    }
}
