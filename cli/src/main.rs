//! Builds region boundaries from OpenStreetMap and sorts points, like cell towers, into them.

#[macro_use]
extern crate log;

mod configuration;

use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;
use structopt::StructOpt;

use geom::LonLat;
use regions::{ImportOptions, JsonDirRepository, PointCache, RegionRepository};
use util::{prettyprint_usize, Timer};

use crate::configuration::{load_configuration, BoundariesConfiguration};

#[derive(StructOpt)]
#[structopt(name = "boundaries", about = "Region boundaries and point assignment")]
enum Command {
    /// Turn an Overpass JSON response with boundary relations into a GeoJSON file of regions
    BuildRegions {
        /// The path to an Overpass JSON response, from `out geom;` or `out body; >; out skel qt;`
        #[structopt(long)]
        input: String,
        /// The GeoJSON file to write
        #[structopt(long)]
        output: String,
        /// Only keep relations with this admin_level tag
        #[structopt(long)]
        admin_level: Option<String>,
    },
    /// Store the regions from a GeoJSON file, then assign every point to one
    ImportRegions {
        /// The path to a GeoJSON FeatureCollection of Polygons and MultiPolygons
        #[structopt(long)]
        regions: String,
        /// The directory holding regions.json and points.json
        #[structopt(long)]
        store: String,
        /// The feature property with the region name. Use `shapeName` for geoBoundaries files.
        #[structopt(long)]
        name_key: Option<String>,
        /// Delete all stored regions first
        #[structopt(long)]
        replace_regions: bool,
        /// Forget every point's region first
        #[structopt(long)]
        clear_assignments: bool,
        /// Only assign points that don't have a region yet
        #[structopt(long)]
        only_unassigned: bool,
    },
    /// Assign points against the regions already stored
    AssignPoints {
        /// The directory holding regions.json and points.json
        #[structopt(long)]
        store: String,
        /// Only assign points that don't have a region yet
        #[structopt(long)]
        only_unassigned: bool,
    },
    /// Add points from a JSON list of `{"latitude": ..., "longitude": ...}` objects
    AddPoints {
        /// The directory holding regions.json and points.json
        #[structopt(long)]
        store: String,
        /// The JSON file of points
        #[structopt(long)]
        input: String,
    },
    /// List every region in a GeoJSON file containing a point, to debug surprising assignments
    TestPoint {
        /// The path to a GeoJSON FeatureCollection of regions
        #[structopt(long)]
        regions: String,
        #[structopt(long, allow_hyphen_values = true)]
        lon: f64,
        #[structopt(long, allow_hyphen_values = true)]
        lat: f64,
        /// The feature property with the region name
        #[structopt(long)]
        name_key: Option<String>,
    },
    /// Print every region in a GeoJSON file as well-known text, for SQL spatial stores
    #[structopt(name = "to-wkt")]
    ToWKT {
        /// The path to a GeoJSON FeatureCollection of regions
        #[structopt(long)]
        regions: String,
        /// The feature property with the region name
        #[structopt(long)]
        name_key: Option<String>,
    },
}

fn main() -> Result<()> {
    util::setup_logger();
    let config = load_configuration();

    match Command::from_args() {
        Command::BuildRegions {
            input,
            output,
            admin_level,
        } => build_regions(&config, input, output, admin_level)?,
        Command::ImportRegions {
            regions,
            store,
            name_key,
            replace_regions,
            clear_assignments,
            only_unassigned,
        } => {
            let opts = ImportOptions {
                replace_regions,
                clear_assignments,
                only_unassigned,
                batch_size: config.batch_size,
            };
            import_regions(&config, regions, store, name_key, opts)?
        }
        Command::AssignPoints {
            store,
            only_unassigned,
        } => {
            let opts = ImportOptions {
                only_unassigned,
                batch_size: config.batch_size,
                ..Default::default()
            };
            let mut timer = Timer::new("assign points");
            let mut repo = JsonDirRepository::open(store)?;
            let mut cache = point_cache(&config);
            println!(
                "{}",
                regions::assign_all(&mut repo, &mut cache, &opts, &mut timer)?
            );
        }
        Command::AddPoints { store, input } => add_points(store, input)?,
        Command::TestPoint {
            regions,
            lon,
            lat,
            name_key,
        } => test_point(&config, regions, LonLat::new(lon, lat), name_key)?,
        Command::ToWKT { regions, name_key } => to_wkt(&config, regions, name_key)?,
    }
    Ok(())
}

fn build_regions(
    config: &BoundariesConfiguration,
    input: String,
    output: String,
    admin_level: Option<String>,
) -> Result<()> {
    let mut timer = Timer::new(format!("build regions from {}", input));
    let opts = convert_osm::Options {
        admin_level: admin_level.or_else(|| config.admin_level.clone()),
        min_name_len: config.min_name_len,
    };
    let doc = convert_osm::Document::read_file(&input, &mut timer)?;
    let extract = convert_osm::extract_regions(&doc, &opts, &mut timer);
    for (id, name) in &extract.skipped {
        println!("Skipped {} ({})", name, id);
    }
    convert_osm::write_geojson(&output, &extract)?;
    println!(
        "Wrote {} regions to {}",
        prettyprint_usize(extract.features.len()),
        output
    );
    Ok(())
}

fn import_regions(
    config: &BoundariesConfiguration,
    path: String,
    store: String,
    name_key: Option<String>,
    opts: ImportOptions,
) -> Result<()> {
    let mut timer = Timer::new(format!("import regions from {}", path));
    let name_key = name_key.unwrap_or_else(|| config.name_key.clone());
    let features = regions::load_region_features(&path, &name_key, &mut timer)?;
    let mut repo = JsonDirRepository::open(store)?;
    let mut cache = point_cache(config);
    let report = regions::import_and_assign(&mut repo, &mut cache, &features, &opts, &mut timer)?;
    println!("{}", report);
    Ok(())
}

#[derive(Deserialize)]
struct InputPoint {
    latitude: f64,
    longitude: f64,
}

fn point_cache(config: &BoundariesConfiguration) -> PointCache {
    PointCache::new(Duration::from_secs(config.point_cache_seconds))
}

fn add_points(store: String, input: String) -> Result<()> {
    let points: Vec<InputPoint> = serde_json::from_str(&fs_err::read_to_string(&input)?)?;
    let pts: Vec<LonLat> = points
        .iter()
        .map(|pt| LonLat::new(pt.longitude, pt.latitude))
        .collect();
    let mut repo = JsonDirRepository::open(store)?;
    let mut timer = Timer::new(format!("add points from {}", input));
    timer.start("store points");
    let stored = repo.insert_points(&pts);
    timer.stop("store points");
    println!("Added {} points", prettyprint_usize(stored?.len()));
    Ok(())
}

fn test_point(
    config: &BoundariesConfiguration,
    path: String,
    pt: LonLat,
    name_key: Option<String>,
) -> Result<()> {
    let mut timer = Timer::new(format!("test {}", pt));
    let name_key = name_key.unwrap_or_else(|| config.name_key.clone());
    let features = regions::load_region_features(&path, &name_key, &mut timer)?;

    let mut first = None;
    for feature in &features {
        let bounds = feature.geometry.get_bounds();
        if feature.geometry.contains_pt(pt) {
            println!("Inside {} (bounds {})", feature.name, bounds);
            if first.is_none() {
                first = Some(feature.name.clone());
            }
        } else if bounds.contains(pt) {
            println!("Within the bounds of {}, but not inside", feature.name);
        }
    }
    match first {
        Some(name) => println!("{} would be assigned to {}", pt, name),
        None => println!("{} isn't in any of {} regions", pt, features.len()),
    }
    Ok(())
}

fn to_wkt(config: &BoundariesConfiguration, path: String, name_key: Option<String>) -> Result<()> {
    let mut timer = Timer::new(format!("convert {} to WKT", path));
    let name_key = name_key.unwrap_or_else(|| config.name_key.clone());
    for feature in regions::load_region_features(&path, &name_key, &mut timer)? {
        println!("{}\t{}", feature.name, feature.geometry.to_wkt());
    }
    Ok(())
}
