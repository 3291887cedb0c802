//! Utilities for extracting concrete geometry from OSM boundary relations.

use geom::{Geometry, MultiPolygon, Polygon};

use crate::osm::{RelationID, Role};
use crate::reader::{Document, OsmID, Relation};
use crate::ring_assembly::{assemble, WaySegment};

/// Resolve every way member of a relation to points, split by role. Ways that can't be resolved
/// or have fewer than 2 points are skipped; the rest of the relation is still usable.
pub fn get_multipolygon_members(
    id: RelationID,
    rel: &Relation,
    doc: &Document,
) -> (Vec<WaySegment>, Vec<WaySegment>) {
    let mut outer = Vec::new();
    let mut inner = Vec::new();
    for member in &rel.members {
        let w = match member.id {
            OsmID::Way(w) => w,
            _ => continue,
        };
        let role = match Role::parse(&member.role) {
            Some(role) => role,
            None => {
                debug!("{} has unhandled member role {}, ignoring it", id, member.role);
                continue;
            }
        };
        let pts = match doc.way_pts(w, member.pts.as_ref()) {
            Ok(pts) => pts,
            Err(err) => {
                warn!("Skipping a way of {}: {}", id, err);
                continue;
            }
        };
        if pts.len() < 2 {
            warn!("Skipping {} of {}, it only has {} points", w, id, pts.len());
            continue;
        }
        let segment = WaySegment::new(w, pts);
        match role {
            Role::Outer => outer.push(segment),
            Role::Inner => inner.push(segment),
        }
    }
    (outer, inner)
}

/// Build the boundary of a relation. `None` means there's no usable outer ring.
///
/// One outer ring makes a polygon with every inner ring as a hole. Several outer rings make a
/// multipolygon, and since OSM doesn't say which hole belongs to which outer ring, every polygon
/// gets the full set of holes.
pub fn multipoly_geometry(id: RelationID, rel: &Relation, doc: &Document) -> Option<Geometry> {
    let (outer, inner) = get_multipolygon_members(id, rel, doc);
    if outer.is_empty() {
        return None;
    }

    let mut outer_rings = assemble(&outer);
    let inner_rings = assemble(&inner);
    match outer_rings.len() {
        0 => {
            debug!("{} has {} outer ways, but none close up", id, outer.len());
            None
        }
        1 => Some(Geometry::Polygon(Polygon::with_holes(
            outer_rings.pop().unwrap(),
            inner_rings,
        ))),
        _ => Some(Geometry::MultiPolygon(MultiPolygon::new(
            outer_rings
                .into_iter()
                .map(|ring| Polygon::with_holes(ring, inner_rings.clone()))
                .collect(),
        ))),
    }
}
