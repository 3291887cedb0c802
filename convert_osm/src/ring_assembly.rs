//! Glue the unordered, inconsistently oriented ways of a boundary relation back into closed rings.

use std::collections::BTreeSet;

use geom::{LonLat, Ring};

use crate::osm::WayID;

/// One way's worth of points. The ID is only used for logging.
#[derive(Clone, Debug, PartialEq)]
pub struct WaySegment {
    pub id: WayID,
    pub pts: Vec<LonLat>,
}

impl WaySegment {
    pub fn new(id: WayID, pts: Vec<LonLat>) -> WaySegment {
        WaySegment { id, pts }
    }

    fn first_pt(&self) -> LonLat {
        self.pts[0]
    }

    fn last_pt(&self) -> LonLat {
        *self.pts.last().unwrap()
    }
}

/// Greedily chain segments end-to-end into rings. Each segment is used at most once.
///
/// A chain starts from the first unused segment and keeps appending any unused segment that starts
/// or ends where the chain currently ends, reversing it if needed. When nothing else attaches, a
/// chain with more than 3 points is closed (if it isn't already) and becomes a ring; shorter chains
/// are thrown away. Separate chains are never merged with each other, so an island just turns into
/// its own ring.
///
/// Closing is purely "do the endpoints match"; self-intersections and the like aren't detected.
pub fn assemble_rings(segments: &[WaySegment]) -> Vec<RingAssembly> {
    let mut assembler = RingAssembler::new(segments);
    let mut results = Vec::new();
    while let Some(chain) = assembler.next_chain() {
        if chain.pts.len() <= 3 {
            debug!(
                "Dropping a chain of {} points built from {:?}",
                chain.pts.len(),
                chain.ways.iter().map(|id| id.0).collect::<Vec<_>>()
            );
            continue;
        }
        let mut pts = chain.pts;
        if pts[0] != *pts.last().unwrap() {
            pts.push(pts[0]);
        }
        match Ring::new(pts) {
            Ok(ring) => results.push(RingAssembly {
                ring,
                ways: chain.ways,
            }),
            // Can't happen after forcing closure on 4+ points, but don't panic over it
            Err(err) => warn!("Couldn't close a ring from {:?}: {}", chain.ways, err),
        }
    }
    results
}

/// Just the rings from `assemble_rings`.
pub fn assemble(segments: &[WaySegment]) -> Vec<Ring> {
    assemble_rings(segments)
        .into_iter()
        .map(|r| r.ring)
        .collect()
}

/// A ring plus the ways that went into it, in the order they were glued.
#[derive(Debug)]
pub struct RingAssembly {
    pub ring: Ring,
    pub ways: Vec<WayID>,
}

struct Chain {
    pts: Vec<LonLat>,
    ways: Vec<WayID>,
}

struct RingAssembler<'a> {
    segments: &'a [WaySegment],
    // Indices into segments, scanned in input order
    unused: BTreeSet<usize>,
}

impl<'a> RingAssembler<'a> {
    fn new(segments: &'a [WaySegment]) -> RingAssembler<'a> {
        let mut unused = BTreeSet::new();
        for (idx, seg) in segments.iter().enumerate() {
            if seg.pts.len() < 2 {
                debug!("Skipping {}, it only has {} points", seg.id, seg.pts.len());
                continue;
            }
            unused.insert(idx);
        }
        RingAssembler { segments, unused }
    }

    fn next_chain(&mut self) -> Option<Chain> {
        let seed_idx = self.unused.pop_first()?;
        let seed = &self.segments[seed_idx];
        let mut chain = Chain {
            pts: seed.pts.clone(),
            ways: vec![seed.id],
        };

        // Bounded, so nothing weird in the input can loop forever
        for _ in 0..self.segments.len() {
            let glue_pt = *chain.pts.last().unwrap();
            let found = self.unused.iter().find_map(|idx| {
                let seg = &self.segments[*idx];
                if seg.first_pt() == glue_pt {
                    Some((*idx, false))
                } else if seg.last_pt() == glue_pt {
                    Some((*idx, true))
                } else {
                    None
                }
            });
            let (idx, reverse) = match found {
                Some(x) => x,
                None => break,
            };
            self.unused.remove(&idx);
            let seg = &self.segments[idx];
            // Skip the junction point; it's already the end of the chain
            if reverse {
                chain.pts.extend(seg.pts.iter().rev().skip(1));
            } else {
                chain.pts.extend(seg.pts.iter().skip(1));
            }
            chain.ways.push(seg.id);
        }

        Some(chain)
    }
}
