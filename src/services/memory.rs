use async_trait::async_trait;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::convert::Infallible;

use crate::core::provider::{CandidateProvider, RatingsSource};
use crate::models::{Candidate, CandidateKind, RatingSummary};

/// Candidate pool held entirely in memory
///
/// Backs tests and benchmarks, and works as a drop-in provider for small
/// fixed datasets.
#[derive(Debug, Clone)]
pub struct InMemoryPool<C> {
    candidates: Vec<C>,
}

impl<C> InMemoryPool<C>
where
    C: Candidate + Clone,
{
    pub fn new(candidates: Vec<C>) -> Self {
        Self { candidates }
    }

    fn eligible<'a>(
        &'a self,
        exclude: &'a [i32],
    ) -> impl Iterator<Item = &'a C> + 'a {
        self.candidates
            .iter()
            .filter(move |c| c.is_active() && !exclude.contains(&c.id()))
    }
}

#[async_trait]
impl<C> CandidateProvider for InMemoryPool<C>
where
    C: Candidate + Clone + Send + Sync,
{
    type Candidate = C;
    type Error = Infallible;

    async fn by_district(&self, district_id: i32, exclude: &[i32]) -> Result<Vec<C>, Infallible> {
        Ok(self
            .eligible(exclude)
            .filter(|c| c.serves_district(district_id))
            .cloned()
            .collect())
    }

    async fn by_province(&self, province_id: i32, exclude: &[i32]) -> Result<Vec<C>, Infallible> {
        Ok(self
            .eligible(exclude)
            .filter(|c| c.serves_province(province_id))
            .cloned()
            .collect())
    }

    async fn all(&self, exclude: &[i32]) -> Result<Vec<C>, Infallible> {
        Ok(self.eligible(exclude).cloned().collect())
    }

    async fn random_sample(&self, n: usize, exclude: &[i32]) -> Result<Vec<C>, Infallible> {
        let mut sample: Vec<C> = self.eligible(exclude).cloned().collect();
        sample.shuffle(&mut rand::rng());
        sample.truncate(n);
        Ok(sample)
    }
}

/// Fixed rating table, keyed by candidate kind and id
#[derive(Debug, Clone, Default)]
pub struct StaticRatings {
    entries: HashMap<(CandidateKind, i32), RatingSummary>,
}

impl StaticRatings {
    pub fn with(mut self, kind: CandidateKind, id: i32, summary: RatingSummary) -> Self {
        self.entries.insert((kind, id), summary);
        self
    }
}

#[async_trait]
impl RatingsSource for StaticRatings {
    type Error = Infallible;

    async fn rating_stats(
        &self,
        kind: CandidateKind,
        ids: &[i32],
    ) -> Result<HashMap<i32, RatingSummary>, Infallible> {
        Ok(ids
            .iter()
            .filter_map(|id| self.entries.get(&(kind, *id)).map(|s| (*id, *s)))
            .collect())
    }
}
