//! Regions and the points that get assigned to them.
//!
//! Regions are stored with their boundary as a GeoJSON string. Assignment decodes every boundary
//! once, then gives each point the first region (in storage order) whose boundary contains it.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod assign;
mod cache;
mod import;
mod report;
mod repository;

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use geom::{Geometry, LonLat};
use util::Timer;

pub use crate::assign::{
    assign_points, decode_regions, first_containing_region, Assignment, AssignmentStats,
    DecodedRegion,
};
pub use crate::cache::PointCache;
pub use crate::import::{assign_all, import_and_assign, ImportOptions};
pub use crate::report::{AssignmentReport, ImportCounts};
pub use crate::repository::{JsonDirRepository, MemoryRepository, RegionRepository};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct RegionID(pub usize);

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct PointID(pub usize);

impl fmt::Display for RegionID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Region #{}", self.0)
    }
}

impl fmt::Display for PointID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Point #{}", self.0)
    }
}

/// A stored region. The boundary stays encoded until something needs it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionID,
    pub name: String,
    /// A GeoJSON Polygon or MultiPolygon, as a JSON string
    pub geometry: String,
}

impl Region {
    pub fn decode_geometry(&self) -> Result<Geometry> {
        Geometry::from_json_str(&self.geometry)
    }
}

/// Something with a location, like a tower, that belongs in at most one region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointEntity {
    pub id: PointID,
    pub latitude: f64,
    pub longitude: f64,
    pub region: Option<RegionID>,
}

impl PointEntity {
    pub fn pt(&self) -> LonLat {
        LonLat::new(self.longitude, self.latitude)
    }
}

/// A boundary waiting to be imported as a region.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionFeature {
    pub name: String,
    pub geometry: Geometry,
}

/// Reads region boundaries from a GeoJSON file. See `parse_region_features`.
pub fn load_region_features(path: &str, name_key: &str, timer: &mut Timer) -> Result<Vec<RegionFeature>> {
    timer.start(format!("read {}", path));
    let raw = fs_err::read_to_string(path);
    timer.stop(format!("read {}", path));
    parse_region_features(&raw?, name_key, timer)
}

/// Extracts named Polygon and MultiPolygon features from a GeoJSON Feature or FeatureCollection,
/// in file order. The name comes from the `name_key` property. Features without a name or a usable
/// boundary are skipped with a warning.
pub fn parse_region_features(
    raw: &str,
    name_key: &str,
    timer: &mut Timer,
) -> Result<Vec<RegionFeature>> {
    let features = match raw.parse::<geojson::GeoJson>()? {
        geojson::GeoJson::Feature(feature) => vec![feature],
        geojson::GeoJson::FeatureCollection(collection) => collection.features,
        geojson::GeoJson::Geometry(_) => bail!("Expected GeoJSON features, got a bare geometry"),
    };

    let mut results = Vec::new();
    for (idx, feature) in features.into_iter().enumerate() {
        let name = match feature.property(name_key).and_then(|v| v.as_str()) {
            Some(name) => name.to_string(),
            None => {
                timer.warn(format!("Feature {} has no {} property, skipping", idx, name_key));
                continue;
            }
        };
        let geometry = match feature.geometry.as_ref().map(Geometry::from_geojson) {
            Some(Ok(geometry)) => geometry,
            Some(Err(err)) => {
                timer.warn(format!("Skipping {}: {}", name, err));
                continue;
            }
            None => {
                timer.warn(format!("Skipping {}: no geometry", name));
                continue;
            }
        };
        results.push(RegionFeature { name, geometry });
    }
    info!("Loaded {} region boundaries", results.len());
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_geoboundaries_style_features() {
        let raw = r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"shapeName": "Essex", "shapeISO": "GB-ESS"},
             "geometry": {"type": "Polygon", "coordinates": [[[0, 51], [1, 51], [1, 52], [0, 51]]]}},
            {"type": "Feature", "properties": {"name": "wrong key"},
             "geometry": {"type": "Polygon", "coordinates": [[[0, 51], [1, 51], [1, 52], [0, 51]]]}},
            {"type": "Feature", "properties": {"shapeName": "A point"},
             "geometry": {"type": "Point", "coordinates": [0, 51]}},
            {"type": "Feature", "properties": {"shapeName": "Open"},
             "geometry": {"type": "Polygon", "coordinates": [[[0, 51], [1, 51], [1, 52]]]}},
            {"type": "Feature", "properties": {"shapeName": "Kent"},
             "geometry": {"type": "MultiPolygon", "coordinates": [[[[0, 51], [1, 51], [1, 52], [0, 51]]]]}}
        ]}"#;
        let mut timer = Timer::throwaway();
        let features = parse_region_features(raw, "shapeName", &mut timer).unwrap();
        let names: Vec<&str> = features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Essex", "Kent"]);
        assert_eq!(timer.warnings().len(), 3);
    }

    #[test]
    fn missing_file_closes_its_span() {
        let mut timer = Timer::throwaway();
        timer.start("wrapper");
        assert!(load_region_features("/does/not/exist.geojson", "name", &mut timer).is_err());
        timer.stop("wrapper");
    }

    #[test]
    fn bare_geometry_is_rejected() {
        let raw = r#"{"type": "Polygon", "coordinates": [[[0, 51], [1, 51], [1, 52], [0, 51]]]}"#;
        assert!(parse_region_features(raw, "name", &mut Timer::throwaway()).is_err());
    }
}
