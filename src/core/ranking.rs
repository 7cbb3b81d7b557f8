use std::cmp::Ordering;
use std::collections::HashSet;

use crate::core::distance::distance_between;
use crate::models::{Candidate, GeoPoint, RankedResult};

/// Attach a distance to every candidate of a batch.
///
/// Distances are only computed when both the user and the candidate have
/// coordinates.
pub fn rank_batch<C: Candidate>(batch: Vec<C>, origin: Option<GeoPoint>) -> Vec<RankedResult<C>> {
    batch
        .into_iter()
        .map(|candidate| {
            let distance_km = match (origin, candidate.location()) {
                (Some(from), Some(to)) => Some(distance_between(from, to)),
                _ => None,
            };
            RankedResult {
                candidate,
                distance_km,
            }
        })
        .collect()
}

/// Ascending distance, missing distances treated as infinitely far
#[inline]
pub fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable sort by ascending distance
pub fn sort_by_distance<C>(results: &mut [RankedResult<C>]) {
    results.sort_by(|a, b| compare_distance(a.distance_km, b.distance_km));
}

/// Result list with a quota and a seen-id set that spans every stage
#[derive(Debug)]
pub struct ResultSet<C> {
    results: Vec<RankedResult<C>>,
    seen: HashSet<i32>,
    limit: usize,
}

impl<C: Candidate> ResultSet<C> {
    pub fn new(limit: usize) -> Self {
        Self {
            results: Vec::with_capacity(limit.min(64)),
            seen: HashSet::new(),
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.results.len() >= self.limit
    }

    /// Free slots left under the quota
    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.results.len())
    }

    /// Ids collected so far, for provider-side exclusion
    pub fn seen_ids(&self) -> Vec<i32> {
        self.seen.iter().copied().collect()
    }

    /// Append a batch in order until the quota is reached.
    ///
    /// Inactive or already collected candidates are skipped even if the
    /// provider let them through. Returns how many were added.
    pub fn extend(&mut self, batch: Vec<RankedResult<C>>) -> usize {
        let mut added = 0;
        for ranked in batch {
            if self.is_full() {
                break;
            }
            if !ranked.candidate.is_active() {
                continue;
            }
            if self.seen.insert(ranked.candidate.id()) {
                self.results.push(ranked);
                added += 1;
            }
        }
        added
    }

    pub fn into_results(self) -> Vec<RankedResult<C>> {
        self.results
    }

    /// Reorder everything collected so far by ascending distance
    pub fn sort_by_distance(&mut self) {
        sort_by_distance(&mut self.results);
    }
}
