use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key/value tags attached to an OSM element or a GeoJSON feature.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    pub fn new(map: BTreeMap<String, String>) -> Tags {
        Tags(map)
    }

    pub fn empty() -> Tags {
        Tags(BTreeMap::new())
    }

    pub fn get(&self, k: &str) -> Option<&String> {
        self.0.get(k)
    }

    pub fn is(&self, k: &str, v: &str) -> bool {
        self.0.get(k).map(|x| x.as_str()) == Some(v)
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, k: K, v: V) {
        self.0.insert(k.into(), v.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_compares_values() {
        let mut tags = Tags::empty();
        tags.insert("boundary", "administrative");
        tags.insert("admin_level", "6");
        assert!(tags.is("admin_level", "6"));
        assert!(!tags.is("admin_level", "8"));
        assert!(!tags.is("name", "Suffolk"));
        assert!(tags.is("boundary", "administrative"));
    }
}
