use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{GPSBounds, LonLat};

/// A closed loop of GPS points: at least 4 of them, with the first equal to the last.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    // first equals last
    pts: Vec<LonLat>,
}

impl Ring {
    pub fn new(pts: Vec<LonLat>) -> Result<Ring> {
        if pts.len() < 4 {
            bail!("Can't make a ring with only {} points", pts.len());
        }
        if pts[0] != *pts.last().unwrap() {
            bail!(
                "Can't make a ring with mismatching first/last points {} and {}",
                pts[0],
                pts.last().unwrap()
            );
        }
        Ok(Ring { pts })
    }

    pub fn points(&self) -> &Vec<LonLat> {
        &self.pts
    }

    pub fn get_bounds(&self) -> GPSBounds {
        GPSBounds::from(&self.pts)
    }

    /// Crossing-number test: cast a ray from `pt` towards +x and count how many edges it crosses.
    ///
    /// A point exactly on an edge or vertex may land either way, but always the same way for the
    /// same inputs.
    pub fn contains_pt(&self, pt: LonLat) -> bool {
        let (x, y) = (pt.x(), pt.y());
        let mut inside = false;
        let mut j = self.pts.len() - 1;
        for i in 0..self.pts.len() {
            let (xi, yi) = (self.pts[i].x(), self.pts[i].y());
            let (xj, yj) = (self.pts[j].x(), self.pts[j].y());
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    pub(crate) fn to_geojson(&self) -> Vec<Vec<f64>> {
        self.pts.iter().map(|pt| pt.to_position()).collect()
    }

    pub(crate) fn from_geojson(raw: &[Vec<f64>]) -> Result<Ring> {
        let mut pts = Vec::new();
        for pos in raw {
            match LonLat::from_position(pos) {
                Some(pt) => pts.push(pt),
                None => bail!("Position {:?} needs at least 2 values", pos),
            }
        }
        Ring::new(pts)
    }

    /// `(lon lat, lon lat, ...)`
    pub(crate) fn to_wkt(&self) -> String {
        let pts: Vec<String> = self
            .pts
            .iter()
            .map(|pt| format!("{} {}", pt.x(), pt.y()))
            .collect();
        format!("({})", pts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Ring {
        Ring::new(vec![
            LonLat::new(0.0, 0.0),
            LonLat::new(4.0, 0.0),
            LonLat::new(4.0, 4.0),
            LonLat::new(0.0, 4.0),
            LonLat::new(0.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_degenerate_rings() {
        assert!(Ring::new(vec![
            LonLat::new(0.0, 0.0),
            LonLat::new(1.0, 0.0),
            LonLat::new(0.0, 0.0),
        ])
        .is_err());
        assert!(Ring::new(vec![
            LonLat::new(0.0, 0.0),
            LonLat::new(1.0, 0.0),
            LonLat::new(1.0, 1.0),
            LonLat::new(0.0, 1.0),
        ])
        .is_err());
    }

    #[test]
    fn ray_cast_square() {
        let ring = square();
        assert!(ring.contains_pt(LonLat::new(2.0, 2.0)));
        assert!(!ring.contains_pt(LonLat::new(5.0, 5.0)));
        assert!(!ring.contains_pt(LonLat::new(-1.0, 2.0)));
        assert!(!ring.contains_pt(LonLat::new(2.0, 4.5)));
    }

    #[test]
    fn on_edge_is_deterministic() {
        let ring = square();
        let first = ring.contains_pt(LonLat::new(4.0, 2.0));
        for _ in 0..10 {
            assert_eq!(ring.contains_pt(LonLat::new(4.0, 2.0)), first);
        }
    }

    #[test]
    fn concave_ring() {
        // A U shape opening upwards
        let ring = Ring::new(vec![
            LonLat::new(0.0, 0.0),
            LonLat::new(3.0, 0.0),
            LonLat::new(3.0, 3.0),
            LonLat::new(2.0, 3.0),
            LonLat::new(2.0, 1.0),
            LonLat::new(1.0, 1.0),
            LonLat::new(1.0, 3.0),
            LonLat::new(0.0, 3.0),
            LonLat::new(0.0, 0.0),
        ])
        .unwrap();
        assert!(ring.contains_pt(LonLat::new(0.5, 2.0)));
        assert!(ring.contains_pt(LonLat::new(2.5, 2.0)));
        assert!(ring.contains_pt(LonLat::new(1.5, 0.5)));
        assert!(!ring.contains_pt(LonLat::new(1.5, 2.0)));
    }

    #[test]
    fn wkt_body() {
        assert_eq!(
            square().to_wkt(),
            "(0 0, 4 0, 4 4, 0 4, 0 0)".to_string()
        );
    }
}
