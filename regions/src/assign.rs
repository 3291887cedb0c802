use geom::{Geometry, LonLat};
use util::{prettyprint_usize, Timer};

use crate::{PointEntity, PointID, Region, RegionID};

/// A region with its boundary already parsed.
pub struct DecodedRegion {
    pub id: RegionID,
    pub name: String,
    pub geometry: Geometry,
}

/// Parses every region's boundary once. Regions whose boundary can't be parsed are left out, so
/// they never match anything, and are returned separately.
pub fn decode_regions(
    regions: &[Region],
    timer: &mut Timer,
) -> (Vec<DecodedRegion>, Vec<RegionID>) {
    let mut decoded = Vec::new();
    let mut failed = Vec::new();
    timer.start_iter("decode region boundaries", regions.len());
    for region in regions {
        timer.next();
        match region.decode_geometry() {
            Ok(geometry) => decoded.push(DecodedRegion {
                id: region.id,
                name: region.name.clone(),
                geometry,
            }),
            Err(err) => {
                timer.warn(format!(
                    "Skipping {} ({}), bad boundary: {}",
                    region.name, region.id, err
                ));
                failed.push(region.id);
            }
        }
    }
    (decoded, failed)
}

/// The first region, in the given order, whose boundary contains the point.
pub fn first_containing_region(regions: &[DecodedRegion], pt: LonLat) -> Option<RegionID> {
    regions
        .iter()
        .find(|r| r.geometry.contains_pt(pt))
        .map(|r| r.id)
}

/// How one assignment run changed things, compared to what each point had before.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssignmentStats {
    /// Had no region, now has one
    pub newly_assigned: usize,
    /// Had a region, now has a different one
    pub reassigned: usize,
    /// Has the same region as before
    pub unchanged: usize,
    /// No region contains the point
    pub unassigned: usize,
}

impl AssignmentStats {
    pub fn total(&self) -> usize {
        self.newly_assigned + self.reassigned + self.unchanged + self.unassigned
    }
}

pub struct Assignment {
    /// One entry per input point, in input order
    pub results: Vec<(PointID, Option<RegionID>)>,
    pub stats: AssignmentStats,
    pub regions_skipped: Vec<RegionID>,
}

impl Assignment {
    /// Only the results that differ from what the points had, which is all that needs writing.
    pub fn changes(&self, points: &[PointEntity]) -> Vec<(PointID, Option<RegionID>)> {
        self.results
            .iter()
            .zip(points)
            .filter(|((_, region), point)| *region != point.region)
            .map(|(result, _)| *result)
            .collect()
    }
}

/// Work out the region of every point. Each point gets the first region (in slice order) that
/// contains it, or none. This only depends on the boundaries, their order, and the point itself,
/// so running it twice gives the same answer. A point that no longer falls in any region ends up
/// unassigned, even if it had a region before.
pub fn assign_points(regions: &[Region], points: &[PointEntity], timer: &mut Timer) -> Assignment {
    let (decoded, regions_skipped) = decode_regions(regions, timer);

    let mut results = Vec::with_capacity(points.len());
    let mut stats = AssignmentStats::default();
    timer.start_iter("assign points to regions", points.len());
    for point in points {
        timer.next();
        let found = first_containing_region(&decoded, point.pt());
        match (point.region, found) {
            (_, None) => stats.unassigned += 1,
            (None, Some(_)) => stats.newly_assigned += 1,
            (Some(old), Some(new)) if old == new => stats.unchanged += 1,
            (Some(_), Some(_)) => stats.reassigned += 1,
        }
        results.push((point.id, found));
    }

    info!(
        "Checked {} points against {} regions: {} newly assigned, {} reassigned, {} unchanged, {} \
         unassigned",
        prettyprint_usize(points.len()),
        prettyprint_usize(decoded.len()),
        prettyprint_usize(stats.newly_assigned),
        prettyprint_usize(stats.reassigned),
        prettyprint_usize(stats.unchanged),
        prettyprint_usize(stats.unassigned)
    );
    Assignment {
        results,
        stats,
        regions_skipped,
    }
}
