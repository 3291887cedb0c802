//! Boundary geometry in GPS space: rings, polygons and multipolygons of `LonLat` points, with
//! ray-casting containment tests and GeoJSON / WKT encodings.
//!
//! Everything here is plain data plus pure functions. Nothing is cached and nothing is projected;
//! longitude is always x and latitude is always y.

#[macro_use]
extern crate anyhow;

mod geometry;
mod gps;
mod polygon;
mod ring;

pub use crate::geometry::Geometry;
pub use crate::gps::{GPSBounds, LonLat};
pub use crate::polygon::{MultiPolygon, Polygon};
pub use crate::ring::Ring;
