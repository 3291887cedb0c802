//! Turn OpenStreetMap administrative boundary relations, as returned by the Overpass API, into
//! polygon and multipolygon region boundaries.

#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod extract;
pub mod osm;
mod osm_geom;
pub mod reader;
mod ring_assembly;

pub use crate::extract::{extract_regions, write_geojson, BoundaryFeature, Extract};
pub use crate::osm_geom::{get_multipolygon_members, multipoly_geometry};
pub use crate::reader::Document;
pub use crate::ring_assembly::{assemble, assemble_rings, RingAssembly, WaySegment};

/// Which relations become regions.
#[derive(Clone, Debug)]
pub struct Options {
    /// Only keep relations tagged with this `admin_level`. `None` keeps all of them.
    pub admin_level: Option<String>,
    /// Names shorter than this are junk
    pub min_name_len: usize,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            admin_level: None,
            min_name_len: 2,
        }
    }
}
