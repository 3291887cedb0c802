use std::fmt;

use serde::{Deserialize, Serialize};

/// A GPS coordinate in decimal degrees. Longitude is x, latitude is y, matching GeoJSON order.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct LonLat {
    pub longitude: f64,
    pub latitude: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> LonLat {
        LonLat {
            longitude: lon,
            latitude: lat,
        }
    }

    pub fn x(&self) -> f64 {
        self.longitude
    }

    pub fn y(&self) -> f64 {
        self.latitude
    }

    /// Parses a GeoJSON position, `[lon, lat]` with optional extra dimensions ignored.
    pub fn from_position(pos: &[f64]) -> Option<LonLat> {
        if pos.len() < 2 {
            return None;
        }
        Some(LonLat::new(pos[0], pos[1]))
    }

    pub fn to_position(&self) -> Vec<f64> {
        vec![self.longitude, self.latitude]
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "LonLat({0}, {1})", self.longitude, self.latitude)
    }
}

/// An axis-aligned envelope around some GPS points.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GPSBounds {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl GPSBounds {
    /// An empty envelope; `update` grows it.
    pub fn new() -> GPSBounds {
        GPSBounds {
            min_lon: f64::MAX,
            min_lat: f64::MAX,
            max_lon: f64::MIN,
            max_lat: f64::MIN,
        }
    }

    pub fn from(pts: &[LonLat]) -> GPSBounds {
        let mut b = GPSBounds::new();
        for pt in pts {
            b.update(*pt);
        }
        b
    }

    pub fn update(&mut self, pt: LonLat) {
        self.min_lon = self.min_lon.min(pt.longitude);
        self.max_lon = self.max_lon.max(pt.longitude);
        self.min_lat = self.min_lat.min(pt.latitude);
        self.max_lat = self.max_lat.max(pt.latitude);
    }

    pub fn union(&mut self, other: &GPSBounds) {
        if other.is_empty() {
            return;
        }
        self.update(LonLat::new(other.min_lon, other.min_lat));
        self.update(LonLat::new(other.max_lon, other.max_lat));
    }

    pub fn is_empty(&self) -> bool {
        self.min_lon > self.max_lon
    }

    /// Inclusive on every edge.
    pub fn contains(&self, pt: LonLat) -> bool {
        pt.longitude >= self.min_lon
            && pt.longitude <= self.max_lon
            && pt.latitude >= self.min_lat
            && pt.latitude <= self.max_lat
    }
}

impl Default for GPSBounds {
    fn default() -> Self {
        GPSBounds::new()
    }
}

impl fmt::Display for GPSBounds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "(empty)");
        }
        write!(
            f,
            "lon {} to {}, lat {} to {}",
            self.min_lon, self.max_lon, self.min_lat, self.max_lat
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_grow_and_contain() {
        let mut b = GPSBounds::new();
        assert!(b.is_empty());
        assert!(!b.contains(LonLat::new(0.0, 0.0)));

        b.update(LonLat::new(-1.0, 50.0));
        b.update(LonLat::new(1.5, 52.0));
        assert!(!b.is_empty());
        assert!(b.contains(LonLat::new(0.0, 51.0)));
        assert!(b.contains(LonLat::new(1.5, 52.0)));
        assert!(!b.contains(LonLat::new(2.0, 51.0)));

        let mut other = GPSBounds::from(&[LonLat::new(3.0, 49.0)]);
        other.union(&GPSBounds::new());
        b.union(&other);
        assert_eq!(b.max_lon, 3.0);
        assert_eq!(b.min_lat, 49.0);
    }

    #[test]
    fn positions() {
        assert_eq!(
            LonLat::from_position(&[0.5, 52.25, 10.0]),
            Some(LonLat::new(0.5, 52.25))
        );
        assert_eq!(LonLat::from_position(&[0.5]), None);
        assert_eq!(LonLat::new(0.5, 52.25).to_position(), vec![0.5, 52.25]);
    }
}
