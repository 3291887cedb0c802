use std::time::{Duration, Instant};

use anyhow::Result;

use crate::{PointEntity, RegionRepository};

/// Remembers the full point list for a while, so repeated lookups don't reload it each time.
/// Anything that changes points should call `invalidate`.
pub struct PointCache {
    ttl: Duration,
    loaded: Option<(Instant, Vec<PointEntity>)>,
}

impl PointCache {
    pub fn new(ttl: Duration) -> PointCache {
        PointCache { ttl, loaded: None }
    }

    pub fn get_or_load(&mut self, repo: &dyn RegionRepository) -> Result<&[PointEntity]> {
        let stale = match self.loaded {
            Some((at, _)) => at.elapsed() >= self.ttl,
            None => true,
        };
        if stale {
            let points = repo.points()?;
            debug!("Cached {} points", points.len());
            self.loaded = Some((Instant::now(), points));
        }
        Ok(self
            .loaded
            .as_ref()
            .map(|(_, points)| points.as_slice())
            .unwrap_or(&[]))
    }

    pub fn invalidate(&mut self) {
        self.loaded = None;
    }
}
