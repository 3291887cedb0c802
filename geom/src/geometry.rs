use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{GPSBounds, LonLat, MultiPolygon, Polygon};

/// The shape of a region boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Polygon(Polygon),
    MultiPolygon(MultiPolygon),
}

impl Geometry {
    /// Ray casting against outer rings only; see `Polygon::contains_pt`.
    pub fn contains_pt(&self, pt: LonLat) -> bool {
        match self {
            Geometry::Polygon(p) => p.contains_pt(pt),
            Geometry::MultiPolygon(mp) => mp.contains_pt(pt),
        }
    }

    pub fn get_bounds(&self) -> GPSBounds {
        match self {
            Geometry::Polygon(p) => p.get_bounds(),
            Geometry::MultiPolygon(mp) => mp.get_bounds(),
        }
    }

    pub fn to_geojson(&self) -> geojson::Geometry {
        geojson::Geometry::new(match self {
            Geometry::Polygon(p) => geojson::Value::Polygon(p.to_geojson()),
            Geometry::MultiPolygon(mp) => geojson::Value::MultiPolygon(mp.to_geojson()),
        })
    }

    pub fn from_geojson(geom: &geojson::Geometry) -> Result<Geometry> {
        match &geom.value {
            geojson::Value::Polygon(rings) => Ok(Geometry::Polygon(Polygon::from_geojson(rings)?)),
            geojson::Value::MultiPolygon(polygons) => Ok(Geometry::MultiPolygon(
                MultiPolygon::from_geojson(polygons)?,
            )),
            _ => bail!("Expected a Polygon or MultiPolygon geometry"),
        }
    }

    /// The stored form of a region's boundary: a GeoJSON geometry object as a JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_geojson())?)
    }

    pub fn from_json_str(raw: &str) -> Result<Geometry> {
        match raw.parse::<geojson::GeoJson>()? {
            geojson::GeoJson::Geometry(geom) => Geometry::from_geojson(&geom),
            geojson::GeoJson::Feature(feature) => match feature.geometry {
                Some(geom) => Geometry::from_geojson(&geom),
                None => bail!("Feature has no geometry"),
            },
            geojson::GeoJson::FeatureCollection(_) => {
                bail!("Expected a single geometry, got a FeatureCollection")
            }
        }
    }

    /// Well-known text, for SQL spatial stores: `POLYGON((lon lat, ...))` or
    /// `MULTIPOLYGON(((lon lat, ...)), ...)`.
    pub fn to_wkt(&self) -> String {
        match self {
            Geometry::Polygon(p) => format!("POLYGON{}", p.to_wkt()),
            Geometry::MultiPolygon(mp) => {
                let polygons: Vec<String> = mp.polygons.iter().map(|p| p.to_wkt()).collect();
                format!("MULTIPOLYGON({})", polygons.join(", "))
            }
        }
    }
}

impl From<Polygon> for Geometry {
    fn from(p: Polygon) -> Geometry {
        Geometry::Polygon(p)
    }
}

impl From<MultiPolygon> for Geometry {
    fn from(mp: MultiPolygon) -> Geometry {
        Geometry::MultiPolygon(mp)
    }
}
