use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::{GPSBounds, LonLat, Ring};

/// One outer ring plus zero or more holes. The holes are assumed to lie inside the outer ring;
/// nothing checks that.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub outer: Ring,
    pub holes: Vec<Ring>,
}

impl Polygon {
    pub fn new(outer: Ring) -> Polygon {
        Polygon {
            outer,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(outer: Ring, holes: Vec<Ring>) -> Polygon {
        Polygon { outer, holes }
    }

    /// The first ring is the outer one, the rest are holes.
    pub fn from_rings(mut rings: Vec<Ring>) -> Result<Polygon> {
        if rings.is_empty() {
            bail!("A polygon needs at least one ring");
        }
        let outer = rings.remove(0);
        Ok(Polygon::with_holes(outer, rings))
    }

    /// Only the outer ring is tested. A point inside a hole still counts as inside the polygon.
    // TODO Subtract holes once hole-aware tower assignment is confirmed to be wanted.
    pub fn contains_pt(&self, pt: LonLat) -> bool {
        self.outer.contains_pt(pt)
    }

    pub fn get_bounds(&self) -> GPSBounds {
        self.outer.get_bounds()
    }

    pub(crate) fn to_geojson(&self) -> Vec<Vec<Vec<f64>>> {
        let mut rings = vec![self.outer.to_geojson()];
        rings.extend(self.holes.iter().map(|ring| ring.to_geojson()));
        rings
    }

    pub(crate) fn from_geojson(raw: &[Vec<Vec<f64>>]) -> Result<Polygon> {
        let mut rings = Vec::new();
        for pts in raw {
            rings.push(Ring::from_geojson(pts)?);
        }
        Polygon::from_rings(rings)
    }

    /// `((outer), (hole), ...)`
    pub(crate) fn to_wkt(&self) -> String {
        let mut rings = vec![self.outer.to_wkt()];
        rings.extend(self.holes.iter().map(|ring| ring.to_wkt()));
        format!("({})", rings.join(", "))
    }
}

/// Several polygons, in source order. They may overlap; containment just asks whether any of them
/// contains the point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiPolygon {
    pub polygons: Vec<Polygon>,
}

impl MultiPolygon {
    pub fn new(polygons: Vec<Polygon>) -> MultiPolygon {
        MultiPolygon { polygons }
    }

    /// Tests each outer ring in order and stops at the first hit. Holes are ignored, like
    /// `Polygon::contains_pt`.
    pub fn contains_pt(&self, pt: LonLat) -> bool {
        self.polygons.iter().any(|p| p.contains_pt(pt))
    }

    pub fn get_bounds(&self) -> GPSBounds {
        let mut b = GPSBounds::new();
        for p in &self.polygons {
            b.union(&p.get_bounds());
        }
        b
    }

    pub(crate) fn to_geojson(&self) -> Vec<Vec<Vec<Vec<f64>>>> {
        self.polygons.iter().map(|p| p.to_geojson()).collect()
    }

    pub(crate) fn from_geojson(raw: &[Vec<Vec<Vec<f64>>>]) -> Result<MultiPolygon> {
        let mut polygons = Vec::new();
        for (idx, rings) in raw.iter().enumerate() {
            polygons.push(
                Polygon::from_geojson(rings)
                    .map_err(|err| anyhow!("polygon {} of multipolygon: {}", idx, err))?,
            );
        }
        Ok(MultiPolygon::new(polygons))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x1: f64, y1: f64, x2: f64, y2: f64) -> Ring {
        Ring::new(vec![
            LonLat::new(x1, y1),
            LonLat::new(x2, y1),
            LonLat::new(x2, y2),
            LonLat::new(x1, y2),
            LonLat::new(x1, y1),
        ])
        .unwrap()
    }

    #[test]
    fn holes_are_not_subtracted() {
        let poly = Polygon::with_holes(
            square(0.0, 0.0, 10.0, 10.0),
            vec![square(4.0, 4.0, 6.0, 6.0)],
        );
        // Inside the hole, but the outer ring still wins.
        assert!(poly.contains_pt(LonLat::new(5.0, 5.0)));
        assert!(poly.contains_pt(LonLat::new(1.0, 1.0)));
        assert!(!poly.contains_pt(LonLat::new(11.0, 1.0)));
    }

    #[test]
    fn multipolygon_checks_every_outer_ring() {
        let multi = MultiPolygon::new(vec![
            Polygon::new(square(0.0, 0.0, 1.0, 1.0)),
            Polygon::new(square(5.0, 5.0, 6.0, 6.0)),
        ]);
        assert!(multi.contains_pt(LonLat::new(5.5, 5.5)));
        assert!(multi.contains_pt(LonLat::new(0.5, 0.5)));
        assert!(!multi.contains_pt(LonLat::new(3.0, 3.0)));

        let b = multi.get_bounds();
        assert_eq!((b.min_lon, b.max_lon), (0.0, 6.0));
    }

    #[test]
    fn from_rings_needs_an_outer() {
        assert!(Polygon::from_rings(Vec::new()).is_err());
        let poly = Polygon::from_rings(vec![
            square(0.0, 0.0, 10.0, 10.0),
            square(1.0, 1.0, 2.0, 2.0),
        ])
        .unwrap();
        assert_eq!(poly.holes.len(), 1);
    }
}
