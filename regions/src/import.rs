use anyhow::Result;

use util::{prettyprint_usize, Timer};

use crate::{
    assign_points, AssignmentReport, ImportCounts, PointCache, PointID, RegionFeature,
    RegionID, RegionRepository,
};

#[derive(Clone, Debug)]
pub struct ImportOptions {
    /// Delete every existing region before importing
    pub replace_regions: bool,
    /// Forget every point's region before assigning
    pub clear_assignments: bool,
    /// Only look at points without a region
    pub only_unassigned: bool,
    /// How many assignments go into one write. A failure partway keeps the batches already
    /// written.
    pub batch_size: usize,
}

impl Default for ImportOptions {
    fn default() -> ImportOptions {
        ImportOptions {
            replace_regions: false,
            clear_assignments: false,
            only_unassigned: false,
            batch_size: 500,
        }
    }
}

/// Store every feature as a region in one write, then assign points against every stored
/// region. A feature whose boundary can't be encoded is counted and skipped; the rest of the
/// import carries on.
pub fn import_and_assign(
    repo: &mut dyn RegionRepository,
    cache: &mut PointCache,
    features: &[RegionFeature],
    opts: &ImportOptions,
    timer: &mut Timer,
) -> Result<AssignmentReport> {
    if opts.replace_regions {
        repo.clear_regions()?;
        info!("Removed existing regions");
    }

    let mut encoded = Vec::with_capacity(features.len());
    let mut failed = 0;
    timer.start_iter("encode region boundaries", features.len());
    for feature in features {
        timer.next();
        match feature.geometry.to_json_string() {
            Ok(geometry) => encoded.push((feature.name.clone(), geometry)),
            Err(err) => {
                timer.warn(format!("Couldn't import {}: {}", feature.name, err));
                failed += 1;
            }
        }
    }

    timer.start("store regions");
    let stored = repo.insert_regions(&encoded);
    timer.stop("store regions");
    let ids = stored?;
    for ((name, _), id) in encoded.iter().zip(&ids) {
        debug!("Imported {} as {}", name, id);
    }
    info!(
        "Imported {} regions, {} failed",
        prettyprint_usize(ids.len()),
        prettyprint_usize(failed)
    );

    let mut report = assign_all(repo, cache, opts, timer)?;
    report.import = Some(ImportCounts {
        imported: ids.len(),
        failed,
    });
    Ok(report)
}

/// Assign points against the regions already stored, then summarize the result. Points are read
/// through the cache, which is invalidated once assignments are written.
pub fn assign_all(
    repo: &mut dyn RegionRepository,
    cache: &mut PointCache,
    opts: &ImportOptions,
    timer: &mut Timer,
) -> Result<AssignmentReport> {
    if opts.clear_assignments {
        let cleared = repo.clear_assignments();
        cache.invalidate();
        info!("Cleared {} existing assignments", prettyprint_usize(cleared?));
    }

    let regions = repo.regions()?;
    let mut points = cache.get_or_load(&*repo)?.to_vec();
    if opts.only_unassigned {
        points.retain(|p| p.region.is_none());
    }
    let assignment = assign_points(&regions, &points, timer);

    let changes = assignment.changes(&points);
    timer.start("save assignments");
    let saved = save_in_batches(repo, &changes, opts.batch_size);
    timer.stop("save assignments");
    cache.invalidate();
    saved?;
    info!("Saved {} changed assignments", prettyprint_usize(changes.len()));

    let mut report = AssignmentReport::new(&regions, cache.get_or_load(&*repo)?, assignment.stats);
    report.regions_skipped = assignment.regions_skipped.len();
    Ok(report)
}

fn save_in_batches(
    repo: &mut dyn RegionRepository,
    changes: &[(PointID, Option<RegionID>)],
    batch_size: usize,
) -> Result<()> {
    for (idx, batch) in changes.chunks(batch_size.max(1)).enumerate() {
        repo.save_assignments(batch)?;
        debug!("Saved batch {} ({} assignments)", idx + 1, batch.len());
    }
    Ok(())
}
