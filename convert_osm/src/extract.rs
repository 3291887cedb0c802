use anyhow::Result;
use serde_json::{Map, Value};

use geom::Geometry;
use util::{prettyprint_usize, skip_fail, Timer};

use crate::osm::{RelationID, ADMIN_LEVEL, NAME};
use crate::reader::Document;
use crate::{multipoly_geometry, Options};

/// A named boundary built from one relation.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundaryFeature {
    pub name: String,
    pub admin_level: String,
    pub osm_id: RelationID,
    pub geometry: Geometry,
}

impl BoundaryFeature {
    pub fn to_geojson(&self) -> geojson::Feature {
        let mut properties = Map::new();
        properties.insert("name".to_string(), Value::String(self.name.clone()));
        properties.insert(
            "admin_level".to_string(),
            Value::String(self.admin_level.clone()),
        );
        properties.insert("osm_id".to_string(), Value::from(self.osm_id.0));
        geojson::Feature {
            bbox: None,
            geometry: Some(self.geometry.to_geojson()),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

pub struct Extract {
    pub features: Vec<BoundaryFeature>,
    /// Named relations that didn't produce any geometry
    pub skipped: Vec<(RelationID, String)>,
}

impl Extract {
    pub fn to_geojson(&self) -> geojson::FeatureCollection {
        geojson::FeatureCollection {
            bbox: None,
            features: self.features.iter().map(|f| f.to_geojson()).collect(),
            foreign_members: None,
        }
    }
}

/// Build a boundary for every named relation in the document, in document order. A relation that
/// doesn't yield any geometry is recorded and skipped.
pub fn extract_regions(doc: &Document, opts: &Options, timer: &mut Timer) -> Extract {
    let mut out = Extract {
        features: Vec::new(),
        skipped: Vec::new(),
    };

    timer.start_iter("build relation geometry", doc.relations.len());
    for (id, rel) in &doc.relations {
        timer.next();
        let name = skip_fail!(rel.tags.get(NAME));
        if name.chars().count() < opts.min_name_len {
            continue;
        }
        if let Some(ref level) = opts.admin_level {
            if !rel.tags.is(ADMIN_LEVEL, level) {
                continue;
            }
        }

        match multipoly_geometry(*id, rel, doc) {
            Some(geometry) => {
                debug!("Built {} for {}", name, id);
                out.features.push(BoundaryFeature {
                    name: name.clone(),
                    // Overpass queries for regions ask for level 6 when nothing else is said
                    admin_level: rel
                        .tags
                        .get(ADMIN_LEVEL)
                        .cloned()
                        .unwrap_or_else(|| "6".to_string()),
                    osm_id: *id,
                    geometry,
                });
            }
            None => {
                timer.warn(format!("Skipped {} ({}), no valid geometry", name, id));
                out.skipped.push((*id, name.clone()));
            }
        }
    }

    info!(
        "Converted {} regions, skipped {}",
        prettyprint_usize(out.features.len()),
        prettyprint_usize(out.skipped.len())
    );
    out
}

pub fn write_geojson(path: &str, extract: &Extract) -> Result<()> {
    let raw = serde_json::to_string_pretty(&extract.to_geojson())?;
    fs_err::write(path, raw)?;
    info!("Wrote {} regions to {}", extract.features.len(), path);
    Ok(())
}
