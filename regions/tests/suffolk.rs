use std::time::Duration;

use convert_osm::{extract_regions, write_geojson, Document, Options};
use geom::LonLat;
use regions::{
    assign_all, import_and_assign, load_region_features, ImportCounts, ImportOptions,
    JsonDirRepository, PointCache, RegionRepository,
};
use util::Timer;

// Cambridgeshire comes first and touches Suffolk. Suffolk's mainland is its second outer ring,
// glued from three ways (one backwards); the first is a small island off the coast.
const OVERPASS: &str = r#"{"elements": [
  {"type": "relation", "id": 1, "tags": {"name": "Cambridgeshire", "admin_level": "6"}, "members": [
    {"type": "way", "ref": 100, "role": "outer", "geometry": [
      {"lat": 52.0, "lon": -0.5}, {"lat": 52.0, "lon": 0.3}, {"lat": 52.5, "lon": 0.3},
      {"lat": 52.5, "lon": -0.5}, {"lat": 52.0, "lon": -0.5}]}
  ]},
  {"type": "relation", "id": 2, "tags": {"name": "Suffolk", "admin_level": "6"}, "members": [
    {"type": "way", "ref": 200, "role": "outer", "geometry": [
      {"lat": 51.9, "lon": 1.8}, {"lat": 51.9, "lon": 1.9}, {"lat": 51.95, "lon": 1.9},
      {"lat": 51.9, "lon": 1.8}]},
    {"type": "way", "ref": 201, "role": "outer", "geometry": [
      {"lat": 52.0, "lon": 0.3}, {"lat": 52.0, "lon": 1.7}]},
    {"type": "way", "ref": 202, "role": "outer", "geometry": [
      {"lat": 52.5, "lon": 0.3}, {"lat": 52.5, "lon": 1.7}, {"lat": 52.0, "lon": 1.7}]},
    {"type": "way", "ref": 203, "role": "outer", "geometry": [
      {"lat": 52.5, "lon": 0.3}, {"lat": 52.0, "lon": 0.3}]},
    {"type": "node", "ref": 9, "role": "admin_centre"}
  ]},
  {"type": "relation", "id": 3, "tags": {"name": "Norfolk", "admin_level": "6"}, "members": [
    {"type": "way", "ref": 300, "role": "outer", "geometry": [
      {"lat": 52.5, "lon": 0.3}, {"lat": 52.5, "lon": 1.7}, {"lat": 53.0, "lon": 1.7},
      {"lat": 53.0, "lon": 0.3}, {"lat": 52.5, "lon": 0.3}]}
  ]}
]}"#;

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("regions_it_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn tower_lands_in_suffolk() {
    let dir = scratch_dir("suffolk");
    let mut timer = Timer::throwaway();

    let doc = Document::read(OVERPASS, &mut timer).unwrap();
    let extract = extract_regions(&doc, &Options::default(), &mut timer);
    assert_eq!(extract.features.len(), 3);
    let geojson_path = dir.join("regions.geojson");
    let geojson_path = geojson_path.to_str().unwrap();
    write_geojson(geojson_path, &extract).unwrap();

    let features = load_region_features(geojson_path, "name", &mut timer).unwrap();
    let names: Vec<&str> = features.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Cambridgeshire", "Suffolk", "Norfolk"]);

    let mut repo = JsonDirRepository::open(dir.join("store")).unwrap();
    let tower = repo.insert_point(LonLat::new(0.5097699, 52.2512476)).unwrap();
    let norfolk_tower = repo.insert_point(LonLat::new(1.0, 52.75)).unwrap();
    let at_sea = repo.insert_point(LonLat::new(3.0, 52.0)).unwrap();

    let mut cache = PointCache::new(Duration::from_secs(60));
    let report = import_and_assign(
        &mut repo,
        &mut cache,
        &features,
        &ImportOptions::default(),
        &mut timer,
    )
    .unwrap();
    assert_eq!(
        report.import,
        Some(ImportCounts {
            imported: 3,
            failed: 0
        })
    );
    assert_eq!(report.stats.newly_assigned, 2);
    assert_eq!(report.stats.unassigned, 1);

    // Reopen, to check it all made it to disk
    let repo = JsonDirRepository::open(dir.join("store")).unwrap();
    let regions = repo.regions().unwrap();
    let region_name = |id| {
        let point = repo.points().unwrap().into_iter().find(|p| p.id == id).unwrap();
        point
            .region
            .map(|r| regions.iter().find(|x| x.id == r).unwrap().name.clone())
    };
    assert_eq!(region_name(tower), Some("Suffolk".to_string()));
    assert_eq!(region_name(norfolk_tower), Some("Norfolk".to_string()));
    assert_eq!(region_name(at_sea), None);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn rerun_is_idempotent() {
    let dir = scratch_dir("rerun");
    let mut timer = Timer::throwaway();
    let doc = Document::read(OVERPASS, &mut timer).unwrap();
    let extract = extract_regions(&doc, &Options::default(), &mut timer);
    let geojson_path = dir.join("regions.geojson");
    let geojson_path = geojson_path.to_str().unwrap();
    write_geojson(geojson_path, &extract).unwrap();
    let features = load_region_features(geojson_path, "name", &mut timer).unwrap();

    let mut repo = JsonDirRepository::open(dir.join("store")).unwrap();
    let pts: Vec<LonLat> = (0..20)
        .flat_map(|i| {
            let lon = -0.4 + 0.1 * i as f64;
            vec![LonLat::new(lon, 52.25), LonLat::new(lon, 52.75)]
        })
        .collect();
    assert_eq!(repo.insert_points(&pts).unwrap().len(), 40);
    let opts = ImportOptions {
        batch_size: 7,
        ..Default::default()
    };
    let mut cache = PointCache::new(Duration::from_secs(60));
    let first = import_and_assign(&mut repo, &mut cache, &features, &opts, &mut timer).unwrap();
    let after_first = repo.points().unwrap();
    assert!(first.stats.newly_assigned > 0);

    let second = assign_all(&mut repo, &mut cache, &opts, &mut timer).unwrap();
    assert_eq!(second.import, None);
    assert_eq!(second.stats.newly_assigned, 0);
    assert_eq!(second.stats.reassigned, 0);
    assert_eq!(
        second.stats.unchanged,
        first.stats.newly_assigned
    );
    assert_eq!(repo.points().unwrap(), after_first);
    assert_eq!(second.leaderboard, first.leaderboard);

    let _ = std::fs::remove_dir_all(&dir);
}
