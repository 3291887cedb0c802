use serde::Deserialize;
use std::fs;

/// Settings from `boundaries.toml` in the working directory. Command-line flags win over these.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundariesConfiguration {
    /// Which GeoJSON property holds a region's name
    pub name_key: String,
    pub batch_size: usize,
    pub admin_level: Option<String>,
    pub min_name_len: usize,
    /// How long the point list read for assignment stays cached
    pub point_cache_seconds: u64,
}

#[derive(Deserialize)]
struct RawBoundariesConfiguration {
    pub name_key: Option<String>,
    pub batch_size: Option<usize>,
    pub admin_level: Option<String>,
    pub min_name_len: Option<usize>,
    pub point_cache_seconds: Option<u64>,
}

pub fn load_configuration() -> BoundariesConfiguration {
    match fs::read_to_string("boundaries.toml") {
        Ok(text) => parse_configuration(&text),
        Err(_) => default_configuration(),
    }
}

fn parse_configuration(text: &str) -> BoundariesConfiguration {
    match toml::from_str::<RawBoundariesConfiguration>(text) {
        Ok(config) => fill_in_defaults(config),
        Err(err) => {
            warn!("Ignoring boundaries.toml: {}", err);
            default_configuration()
        }
    }
}

fn default_configuration() -> BoundariesConfiguration {
    BoundariesConfiguration {
        name_key: String::from("name"),
        batch_size: 500,
        admin_level: None,
        min_name_len: 2,
        point_cache_seconds: 300,
    }
}

fn fill_in_defaults(config: RawBoundariesConfiguration) -> BoundariesConfiguration {
    let mut result = default_configuration();

    result.name_key = config.name_key.unwrap_or(result.name_key);
    result.batch_size = config.batch_size.unwrap_or(result.batch_size);
    result.min_name_len = config.min_name_len.unwrap_or(result.min_name_len);
    result.point_cache_seconds = config
        .point_cache_seconds
        .unwrap_or(result.point_cache_seconds);

    result.admin_level = config.admin_level;

    result
}
