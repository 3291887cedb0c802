//! OSM identifiers and member roles.

use std::fmt;

use serde::{Deserialize, Serialize};

// These are common OSM keys. Keys used in just one or two places don't really need to be defined
// here.
pub const NAME: &str = "name";
pub const ADMIN_LEVEL: &str = "admin_level";

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct NodeID(pub i64);
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct WayID(pub i64);
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct RelationID(pub i64);

impl fmt::Display for NodeID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "https://www.openstreetmap.org/node/{}", self.0)
    }
}
impl fmt::Display for WayID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "https://www.openstreetmap.org/way/{}", self.0)
    }
}
impl fmt::Display for RelationID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "https://www.openstreetmap.org/relation/{}", self.0)
    }
}

/// How a way contributes to a multipolygon relation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Role {
    Outer,
    Inner,
}

impl Role {
    /// An untagged member counts as outer. Anything else besides "outer" and "inner" (like
    /// "subarea" or "admin_centre") isn't part of the boundary.
    pub fn parse(role: &str) -> Option<Role> {
        match role {
            "outer" | "" => Some(Role::Outer),
            "inner" => Some(Role::Inner),
            _ => None,
        }
    }
}
