use std::fmt;

use geom::GPSBounds;
use util::prettyprint_usize;

use crate::{AssignmentStats, PointEntity, Region};

/// How many features an import stored, and how many it couldn't.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportCounts {
    pub imported: usize,
    pub failed: usize,
}

/// What an import and assignment run did, plus a summary of where the points ended up.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignmentReport {
    /// Only set when the run imported regions
    pub import: Option<ImportCounts>,
    /// Stored regions whose boundary couldn't be parsed during assignment
    pub regions_skipped: usize,
    pub points_checked: usize,
    pub stats: AssignmentStats,
    /// Regions with at least one point, most points first. Ties keep region order.
    pub leaderboard: Vec<(String, usize)>,
    pub total_points: usize,
    pub total_assigned: usize,
    pub assigned_bounds: GPSBounds,
    pub unassigned_bounds: GPSBounds,
}

impl AssignmentReport {
    /// Summarizes the final state of every point. The import counts and skipped regions are left
    /// for the caller to fill in.
    pub fn new(regions: &[Region], points: &[PointEntity], stats: AssignmentStats) -> AssignmentReport {
        let mut counts = vec![0; regions.len()];
        let mut assigned_bounds = GPSBounds::new();
        let mut unassigned_bounds = GPSBounds::new();
        let mut total_assigned = 0;
        for point in points {
            match point.region {
                Some(id) => {
                    total_assigned += 1;
                    assigned_bounds.update(point.pt());
                    if let Some(idx) = regions.iter().position(|r| r.id == id) {
                        counts[idx] += 1;
                    }
                }
                None => unassigned_bounds.update(point.pt()),
            }
        }

        let mut leaderboard: Vec<(String, usize)> = regions
            .iter()
            .zip(counts)
            .filter(|(_, count)| *count > 0)
            .map(|(r, count)| (r.name.clone(), count))
            .collect();
        // Stable, so ties stay in region order
        leaderboard.sort_by(|a, b| b.1.cmp(&a.1));

        AssignmentReport {
            import: None,
            regions_skipped: 0,
            points_checked: stats.total(),
            stats,
            leaderboard,
            total_points: points.len(),
            total_assigned,
            assigned_bounds,
            unassigned_bounds,
        }
    }
}

impl fmt::Display for AssignmentReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(import) = self.import {
            writeln!(
                f,
                "Regions imported: {} ({} failed)",
                prettyprint_usize(import.imported),
                prettyprint_usize(import.failed)
            )?;
        }
        if self.regions_skipped > 0 {
            writeln!(
                f,
                "Regions skipped (bad boundary): {}",
                prettyprint_usize(self.regions_skipped)
            )?;
        }
        writeln!(f, "Points checked: {}", prettyprint_usize(self.points_checked))?;
        writeln!(f, "  Newly assigned: {}", prettyprint_usize(self.stats.newly_assigned))?;
        writeln!(f, "  Reassigned: {}", prettyprint_usize(self.stats.reassigned))?;
        writeln!(f, "  Unchanged: {}", prettyprint_usize(self.stats.unchanged))?;
        writeln!(f, "  Unassigned: {}", prettyprint_usize(self.stats.unassigned))?;

        writeln!(f, "Points per region:")?;
        for (rank, (name, count)) in self.leaderboard.iter().enumerate() {
            writeln!(f, "  {:>3}. {:<30} {}", rank + 1, name, prettyprint_usize(*count))?;
        }
        writeln!(
            f,
            "Assigned {} of {} points",
            prettyprint_usize(self.total_assigned),
            prettyprint_usize(self.total_points)
        )?;
        if !self.assigned_bounds.is_empty() {
            writeln!(f, "Assigned points span {}", self.assigned_bounds)?;
        }
        if !self.unassigned_bounds.is_empty() {
            writeln!(f, "Unassigned points span {}", self.unassigned_bounds)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use geom::LonLat;

    use super::*;
    use crate::{PointID, RegionID};

    fn region(id: usize, name: &str) -> Region {
        Region {
            id: RegionID(id),
            name: name.to_string(),
            geometry: String::new(),
        }
    }

    fn point(id: usize, lon: f64, lat: f64, region: Option<usize>) -> PointEntity {
        PointEntity {
            id: PointID(id),
            latitude: lat,
            longitude: lon,
            region: region.map(RegionID),
        }
    }

    #[test]
    fn leaderboard_order() {
        let regions = vec![
            region(10, "Essex"),
            region(11, "Kent"),
            region(12, "Empty"),
            region(13, "Suffolk"),
        ];
        let points = vec![
            point(0, 0.5, 51.8, Some(10)),
            point(1, 1.0, 51.2, Some(11)),
            point(2, 1.1, 51.3, Some(11)),
            point(3, 1.2, 52.2, Some(13)),
            point(4, 1.3, 52.3, Some(13)),
            point(5, -1.0, 50.0, None),
        ];
        let report = AssignmentReport::new(&regions, &points, AssignmentStats::default());
        assert_eq!(
            report.leaderboard,
            vec![
                ("Kent".to_string(), 2),
                ("Suffolk".to_string(), 2),
                ("Essex".to_string(), 1),
            ]
        );
        assert_eq!(report.total_assigned, 5);
        assert_eq!(report.total_points, 6);
        assert!(report.assigned_bounds.contains(LonLat::new(1.0, 52.0)));
        assert!(!report.assigned_bounds.contains(LonLat::new(-1.0, 50.0)));
        assert_eq!(report.unassigned_bounds.min_lon, -1.0);
    }

    #[test]
    fn display_skips_empty_sections() {
        let report = AssignmentReport::new(&[], &[], AssignmentStats::default());
        let out = report.to_string();
        assert!(out.contains("Points checked: 0"));
        assert!(!out.contains("span"));
        assert!(!out.contains("bad boundary"));
        // Nothing was imported, so there's nothing to say about it
        assert!(!out.contains("Regions imported"));
    }

    #[test]
    fn display_import_counts() {
        let mut report = AssignmentReport::new(&[], &[], AssignmentStats::default());
        report.import = Some(ImportCounts {
            imported: 1200,
            failed: 3,
        });
        assert!(report
            .to_string()
            .starts_with("Regions imported: 1,200 (3 failed)\n"));
    }
}
