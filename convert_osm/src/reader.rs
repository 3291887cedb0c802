use std::collections::{BTreeMap, HashSet};

use anyhow::Result;
use serde::Deserialize;

use geom::LonLat;
use util::{prettyprint_usize, Tags, Timer};

use crate::osm::{NodeID, RelationID, WayID};

// Parses the JSON produced by the Overpass API, either from `out body; >; out skel qt;` (ways
// reference nodes listed elsewhere in the response) or from `out geom;` (ways and relation members
// carry their own coordinates).
//
// Broken references are kept as-is here; the geometry builder decides what to skip.

pub struct Document {
    pub nodes: BTreeMap<NodeID, LonLat>,
    pub ways: BTreeMap<WayID, Way>,
    /// In the order they appeared in the response, which becomes the order regions are tested in.
    pub relations: Vec<(RelationID, Relation)>,
}

pub struct Way {
    pub nodes: Vec<NodeID>,
    /// Present when the response was produced with `out geom`
    pub pts: Option<Vec<LonLat>>,
}

pub struct Relation {
    pub tags: Tags,
    pub members: Vec<Member>,
}

pub struct Member {
    pub role: String,
    pub id: OsmID,
    /// Relations fetched with `out geom` embed each way member's coordinates
    pub pts: Option<Vec<LonLat>>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OsmID {
    Node(NodeID),
    Way(WayID),
    Relation(RelationID),
}

#[derive(Deserialize)]
struct RawResponse {
    #[serde(default)]
    elements: Vec<RawElement>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum RawElement {
    Node {
        id: i64,
        lat: Option<f64>,
        lon: Option<f64>,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        geometry: Option<Vec<Option<RawLatLon>>>,
    },
    Relation {
        id: i64,
        #[serde(default)]
        members: Vec<RawMember>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    // Areas, counts, and anything else Overpass can emit
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct RawMember {
    #[serde(rename = "type")]
    member_type: String,
    #[serde(rename = "ref")]
    id: i64,
    #[serde(default)]
    role: String,
    geometry: Option<Vec<Option<RawLatLon>>>,
}

#[derive(Deserialize)]
struct RawLatLon {
    lat: f64,
    lon: f64,
}

// Overpass uses null for points outside the query's bounding box. Treat that as no inline geometry
// at all, so the caller falls back to looking up nodes.
fn inline_pts(raw: Option<Vec<Option<RawLatLon>>>) -> Option<Vec<LonLat>> {
    raw?.into_iter()
        .map(|pt| pt.map(|pt| LonLat::new(pt.lon, pt.lat)))
        .collect()
}

impl Document {
    pub fn read_file(path: &str, timer: &mut Timer) -> Result<Document> {
        timer.start(format!("read {}", path));
        let raw = fs_err::read_to_string(path);
        timer.stop(format!("read {}", path));
        Document::read(&raw?, timer)
    }

    pub fn read(raw: &str, timer: &mut Timer) -> Result<Document> {
        timer.start("parse Overpass JSON");
        let response: serde_json::Result<RawResponse> = serde_json::from_str(raw);
        timer.stop("parse Overpass JSON");
        let response = response?;

        let mut doc = Document {
            nodes: BTreeMap::new(),
            ways: BTreeMap::new(),
            relations: Vec::new(),
        };
        let mut seen_relations = HashSet::new();

        timer.start_iter("scrape objects", response.elements.len());
        for elem in response.elements {
            timer.next();
            match elem {
                RawElement::Node { id, lat, lon } => {
                    let id = NodeID(id);
                    let (lon, lat) = match (lon, lat) {
                        (Some(lon), Some(lat)) => (lon, lat),
                        _ => {
                            debug!("{} has no coordinates, skipping", id);
                            continue;
                        }
                    };
                    if doc.nodes.contains_key(&id) {
                        timer.warn(format!("Duplicate {}, keeping the first", id));
                        continue;
                    }
                    doc.nodes.insert(id, LonLat::new(lon, lat));
                }
                RawElement::Way {
                    id,
                    nodes,
                    geometry,
                } => {
                    let id = WayID(id);
                    if doc.ways.contains_key(&id) {
                        timer.warn(format!("Duplicate {}, keeping the first", id));
                        continue;
                    }
                    doc.ways.insert(
                        id,
                        Way {
                            nodes: nodes.into_iter().map(NodeID).collect(),
                            pts: inline_pts(geometry),
                        },
                    );
                }
                RawElement::Relation { id, members, tags } => {
                    let id = RelationID(id);
                    if !seen_relations.insert(id) {
                        timer.warn(format!("Duplicate {}, keeping the first", id));
                        continue;
                    }
                    let mut parsed = Vec::new();
                    for m in members {
                        let member_id = match m.member_type.as_str() {
                            "node" => OsmID::Node(NodeID(m.id)),
                            "way" => OsmID::Way(WayID(m.id)),
                            "relation" => OsmID::Relation(RelationID(m.id)),
                            x => {
                                debug!("{} has a member of unknown type {}", id, x);
                                continue;
                            }
                        };
                        parsed.push(Member {
                            role: m.role,
                            id: member_id,
                            pts: inline_pts(m.geometry),
                        });
                    }
                    doc.relations.push((
                        id,
                        Relation {
                            tags: Tags::new(tags),
                            members: parsed,
                        },
                    ));
                }
                RawElement::Other => {}
            }
        }

        info!(
            "Overpass response has {} nodes, {} ways, {} relations",
            prettyprint_usize(doc.nodes.len()),
            prettyprint_usize(doc.ways.len()),
            prettyprint_usize(doc.relations.len())
        );
        Ok(doc)
    }

    /// Resolve the points of a way. Coordinates embedded in the relation member win, then
    /// coordinates embedded in the way, then the node table. Any dangling node reference makes the
    /// whole way unusable.
    pub fn way_pts(&self, id: WayID, member_pts: Option<&Vec<LonLat>>) -> Result<Vec<LonLat>> {
        if let Some(pts) = member_pts {
            return Ok(pts.clone());
        }
        let way = match self.ways.get(&id) {
            Some(way) => way,
            None => bail!("{} isn't in the document", id),
        };
        if let Some(ref pts) = way.pts {
            return Ok(pts.clone());
        }
        let mut pts = Vec::new();
        for n in &way.nodes {
            match self.nodes.get(n) {
                Some(pt) => pts.push(*pt),
                None => bail!("{} references missing {}", id, n),
            }
        }
        Ok(pts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
      "version": 0.6,
      "elements": [
        {"type": "node", "id": 1, "lat": 0.0, "lon": 0.0},
        {"type": "node", "id": 2, "lat": 0.0, "lon": 1.0},
        {"type": "node", "id": 3, "lat": 1.0, "lon": 1.0},
        {"type": "node", "id": 4},
        {"type": "way", "id": 10, "nodes": [1, 2, 3]},
        {"type": "way", "id": 11, "nodes": [3, 99]},
        {"type": "way", "id": 12, "nodes": [1, 2],
         "geometry": [{"lat": 5.0, "lon": 6.0}, {"lat": 7.0, "lon": 8.0}]},
        {"type": "way", "id": 13, "nodes": [1, 2], "geometry": [null, {"lat": 7.0, "lon": 8.0}]},
        {"type": "area", "id": 3600000001},
        {"type": "relation", "id": 100, "tags": {"name": "Suffolk", "admin_level": "6"},
         "members": [
           {"type": "way", "ref": 10, "role": "outer"},
           {"type": "way", "ref": 12, "role": "",
            "geometry": [{"lat": 50.0, "lon": 0.5}, {"lat": 51.0, "lon": 0.5}]},
           {"type": "node", "ref": 1, "role": "admin_centre"},
           {"type": "changeset", "ref": 5, "role": ""}
         ]}
      ]
    }"#;

    #[test]
    fn parse_overpass_json() {
        let doc = Document::read(RESPONSE, &mut Timer::throwaway()).unwrap();
        // Node 4 has no coordinates
        assert_eq!(doc.nodes.len(), 3);
        assert_eq!(doc.ways.len(), 4);
        assert_eq!(doc.relations.len(), 1);

        let (id, rel) = &doc.relations[0];
        assert_eq!(*id, RelationID(100));
        assert!(rel.tags.is("name", "Suffolk"));
        assert_eq!(rel.members.len(), 3);
        assert_eq!(rel.members[0].id, OsmID::Way(WayID(10)));
        assert_eq!(rel.members[1].role, "");
        assert_eq!(rel.members[2].id, OsmID::Node(NodeID(1)));
    }

    #[test]
    fn resolve_way_points() {
        let doc = Document::read(RESPONSE, &mut Timer::throwaway()).unwrap();
        assert_eq!(
            doc.way_pts(WayID(10), None).unwrap(),
            vec![
                LonLat::new(0.0, 0.0),
                LonLat::new(1.0, 0.0),
                LonLat::new(1.0, 1.0)
            ]
        );
        // Dangling node
        assert!(doc.way_pts(WayID(11), None).is_err());
        // Missing way
        assert!(doc.way_pts(WayID(404), None).is_err());
        // Inline way geometry beats the node table
        assert_eq!(
            doc.way_pts(WayID(12), None).unwrap(),
            vec![LonLat::new(6.0, 5.0), LonLat::new(8.0, 7.0)]
        );
        // Partial inline geometry falls back to the nodes
        assert_eq!(doc.way_pts(WayID(13), None).unwrap().len(), 2);
        assert_eq!(doc.way_pts(WayID(13), None).unwrap()[0], LonLat::new(0.0, 0.0));
        // Member geometry beats everything
        let rel = &doc.relations[0].1;
        assert_eq!(
            doc.way_pts(WayID(12), rel.members[1].pts.as_ref()).unwrap(),
            vec![LonLat::new(0.5, 50.0), LonLat::new(0.5, 51.0)]
        );
    }

    #[test]
    fn garbage_is_an_error() {
        let mut timer = Timer::throwaway();
        timer.start("wrapper");
        assert!(Document::read("<osm></osm>", &mut timer).is_err());
        assert!(Document::read_file("/does/not/exist.json", &mut timer).is_err());
        // Nothing from the failed calls is left open
        timer.stop("wrapper");
    }
}
