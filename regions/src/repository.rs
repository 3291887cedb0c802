use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use geom::LonLat;

use crate::{PointEntity, PointID, Region, RegionID};

/// Where regions and points live. The assigner only ever reads both tables and writes back
/// assignments; everything else is for importing and resetting.
pub trait RegionRepository {
    /// Every region, in insertion order. This order decides which region wins when boundaries
    /// overlap.
    fn regions(&self) -> Result<Vec<Region>>;
    /// Stores `(name, geometry)` pairs in order, as one write. IDs come back in the same order.
    fn insert_regions(&mut self, regions: &[(String, String)]) -> Result<Vec<RegionID>>;
    /// Existing point assignments aren't touched.
    fn clear_regions(&mut self) -> Result<()>;

    /// Every point, ordered by ID.
    fn points(&self) -> Result<Vec<PointEntity>>;
    /// Stores unassigned points in order, as one write. IDs come back in the same order.
    fn insert_points(&mut self, pts: &[LonLat]) -> Result<Vec<PointID>>;
    /// Overwrites the region of each listed point. Fails without writing anything if a point
    /// doesn't exist.
    fn save_assignments(&mut self, assignments: &[(PointID, Option<RegionID>)]) -> Result<()>;
    /// Returns how many points had a region before.
    fn clear_assignments(&mut self) -> Result<usize>;

    fn insert_region(&mut self, name: &str, geometry: &str) -> Result<RegionID> {
        match self
            .insert_regions(&[(name.to_string(), geometry.to_string())])?
            .pop()
        {
            Some(id) => Ok(id),
            None => bail!("Storing {} didn't produce an ID", name),
        }
    }

    fn insert_point(&mut self, pt: LonLat) -> Result<PointID> {
        match self.insert_points(&[pt])?.pop() {
            Some(id) => Ok(id),
            None => bail!("Storing {} didn't produce an ID", pt),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
struct RegionTable {
    next_id: usize,
    regions: Vec<Region>,
}

#[derive(Clone, Default, Serialize, Deserialize)]
struct PointTable {
    next_id: usize,
    // IDs only grow, so this stays sorted by ID
    points: Vec<PointEntity>,
}

impl PointTable {
    fn get_mut(&mut self, id: PointID) -> Option<&mut PointEntity> {
        match self.points.binary_search_by_key(&id, |p| p.id) {
            Ok(idx) => Some(&mut self.points[idx]),
            Err(_) => None,
        }
    }

    fn contains(&self, id: PointID) -> bool {
        self.points.binary_search_by_key(&id, |p| p.id).is_ok()
    }
}

/// Keeps everything in memory. IDs are never reused, even after `clear_regions`.
#[derive(Default)]
pub struct MemoryRepository {
    regions: RegionTable,
    points: PointTable,
}

impl MemoryRepository {
    pub fn new() -> MemoryRepository {
        MemoryRepository::default()
    }
}

impl RegionRepository for MemoryRepository {
    fn regions(&self) -> Result<Vec<Region>> {
        Ok(self.regions.regions.clone())
    }

    fn insert_regions(&mut self, regions: &[(String, String)]) -> Result<Vec<RegionID>> {
        let mut ids = Vec::with_capacity(regions.len());
        for (name, geometry) in regions {
            let id = RegionID(self.regions.next_id);
            self.regions.next_id += 1;
            self.regions.regions.push(Region {
                id,
                name: name.clone(),
                geometry: geometry.clone(),
            });
            ids.push(id);
        }
        Ok(ids)
    }

    fn clear_regions(&mut self) -> Result<()> {
        self.regions.regions.clear();
        Ok(())
    }

    fn points(&self) -> Result<Vec<PointEntity>> {
        Ok(self.points.points.clone())
    }

    fn insert_points(&mut self, pts: &[LonLat]) -> Result<Vec<PointID>> {
        let mut ids = Vec::with_capacity(pts.len());
        for pt in pts {
            let id = PointID(self.points.next_id);
            self.points.next_id += 1;
            self.points.points.push(PointEntity {
                id,
                latitude: pt.latitude,
                longitude: pt.longitude,
                region: None,
            });
            ids.push(id);
        }
        Ok(ids)
    }

    fn save_assignments(&mut self, assignments: &[(PointID, Option<RegionID>)]) -> Result<()> {
        for (id, _) in assignments {
            if !self.points.contains(*id) {
                bail!("Can't assign {}, it doesn't exist", id);
            }
        }
        for (id, region) in assignments {
            if let Some(point) = self.points.get_mut(*id) {
                point.region = *region;
            }
        }
        Ok(())
    }

    fn clear_assignments(&mut self) -> Result<usize> {
        let mut cleared = 0;
        for point in &mut self.points.points {
            if point.region.take().is_some() {
                cleared += 1;
            }
        }
        Ok(cleared)
    }
}

/// Stores the two tables as `regions.json` and `points.json` in a directory. Every call that
/// changes a table rewrites that table's file once, through a temporary file and a rename. If the
/// write fails, the change is undone in memory too.
pub struct JsonDirRepository {
    dir: PathBuf,
    inner: MemoryRepository,
    writes: usize,
}

impl JsonDirRepository {
    const REGIONS: &'static str = "regions.json";
    const POINTS: &'static str = "points.json";

    /// Opens the store in `dir`, creating the directory if needed. Missing files start empty.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<JsonDirRepository> {
        let dir = dir.as_ref().to_path_buf();
        fs_err::create_dir_all(&dir)?;
        let regions = maybe_read_json(&dir.join(Self::REGIONS))?.unwrap_or_default();
        let points = maybe_read_json(&dir.join(Self::POINTS))?.unwrap_or_default();
        let repo = JsonDirRepository {
            dir,
            inner: MemoryRepository { regions, points },
            writes: 0,
        };
        info!(
            "Opened {} with {} regions and {} points",
            repo.dir.display(),
            repo.inner.regions.regions.len(),
            repo.inner.points.points.len()
        );
        Ok(repo)
    }

    fn update_regions<T, F: FnOnce(&mut MemoryRepository) -> Result<T>>(
        &mut self,
        f: F,
    ) -> Result<T> {
        let before = self.inner.regions.clone();
        let result = f(&mut self.inner)
            .and_then(|x| write_json(&self.dir.join(Self::REGIONS), &self.inner.regions).map(|_| x));
        match result {
            Ok(x) => {
                self.writes += 1;
                debug!("{} writes to {} so far", self.writes, self.dir.display());
                Ok(x)
            }
            Err(err) => {
                self.inner.regions = before;
                Err(err)
            }
        }
    }

    fn update_points<T, F: FnOnce(&mut MemoryRepository) -> Result<T>>(
        &mut self,
        f: F,
    ) -> Result<T> {
        let before = self.inner.points.clone();
        let result = f(&mut self.inner)
            .and_then(|x| write_json(&self.dir.join(Self::POINTS), &self.inner.points).map(|_| x));
        match result {
            Ok(x) => {
                self.writes += 1;
                debug!("{} writes to {} so far", self.writes, self.dir.display());
                Ok(x)
            }
            Err(err) => {
                self.inner.points = before;
                Err(err)
            }
        }
    }
}

impl RegionRepository for JsonDirRepository {
    fn regions(&self) -> Result<Vec<Region>> {
        self.inner.regions()
    }

    fn insert_regions(&mut self, regions: &[(String, String)]) -> Result<Vec<RegionID>> {
        self.update_regions(|inner| inner.insert_regions(regions))
    }

    fn clear_regions(&mut self) -> Result<()> {
        self.update_regions(|inner| inner.clear_regions())
    }

    fn points(&self) -> Result<Vec<PointEntity>> {
        self.inner.points()
    }

    fn insert_points(&mut self, pts: &[LonLat]) -> Result<Vec<PointID>> {
        self.update_points(|inner| inner.insert_points(pts))
    }

    fn save_assignments(&mut self, assignments: &[(PointID, Option<RegionID>)]) -> Result<()> {
        self.update_points(|inner| inner.save_assignments(assignments))
    }

    fn clear_assignments(&mut self) -> Result<usize> {
        self.update_points(|inner| inner.clear_assignments())
    }
}

fn maybe_read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs_err::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&raw)?))
}

fn write_json<T: Serialize>(path: &Path, obj: &T) -> Result<()> {
    let raw = serde_json::to_string_pretty(obj)?;
    let tmp = path.with_extension("json.tmp");
    fs_err::write(&tmp, raw)?;
    fs_err::rename(&tmp, path)?;
    debug!("Wrote {}", path.display());
    Ok(())
}
