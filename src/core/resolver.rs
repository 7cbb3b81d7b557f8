use crate::core::{
    provider::CandidateProvider,
    ranking::{rank_batch, sort_by_distance, ResultSet},
};
use crate::models::{Candidate, GeoPoint, RankedResult, SearchContext};

/// One widening phase of the search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    District,
    Province,
    Nationwide,
    Random,
}

/// What a stage fetched and how much of it made it into the result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    pub fetched: usize,
    pub added: usize,
}

/// Result of the resolution process
#[derive(Debug)]
pub struct Resolution<C> {
    pub results: Vec<RankedResult<C>>,
    pub stages: Vec<StageReport>,
}

impl<C> Resolution<C> {
    /// Stages that actually ran, in order
    pub fn stages_run(&self) -> Vec<Stage> {
        self.stages.iter().map(|s| s.stage).collect()
    }
}

/// Tiered nearest-match resolver
///
/// # Stages
/// 1. Candidates serving the user's district
/// 2. Candidates serving the user's province
/// 3. Every candidate, nearest first (only with user coordinates)
/// 4. A random sample (only without user coordinates)
///
/// Each stage runs only while the quota is not yet filled, and ids collected
/// by an earlier stage never come back in a later one. Distance orders
/// results but never filters them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TieredResolver;

impl TieredResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve a ranked, deduplicated result list for the given context.
    ///
    /// A provider failure at any stage aborts the whole resolution; no
    /// partial results are returned.
    pub async fn resolve<P>(
        &self,
        context: &SearchContext,
        provider: &P,
    ) -> Result<Resolution<P::Candidate>, P::Error>
    where
        P: CandidateProvider + ?Sized,
    {
        let origin = context.origin;
        let mut set = ResultSet::new(context.limit);
        let mut stages = Vec::with_capacity(3);

        tracing::debug!(
            "Resolving {:?} candidates: geo={}, province={:?}, district={:?}, limit={}",
            <P::Candidate as Candidate>::KIND,
            context.has_geo(),
            context.province_id,
            context.district_id,
            context.limit
        );

        if let Some(district_id) = context.district_id {
            if !set.is_full() {
                let batch = provider.by_district(district_id, &set.seen_ids()).await?;
                stages.push(absorb(&mut set, Stage::District, batch, origin));
            }
        }

        // A district on its own gives no safe way to widen to a province
        if let Some(province_id) = context.province_id {
            if !set.is_full() {
                let batch = provider.by_province(province_id, &set.seen_ids()).await?;
                stages.push(absorb(&mut set, Stage::Province, batch, origin));
            }
        }

        if !set.is_full() {
            if origin.is_some() {
                let batch = provider.all(&set.seen_ids()).await?;
                stages.push(absorb(&mut set, Stage::Nationwide, batch, origin));
            } else {
                let batch = provider
                    .random_sample(set.remaining(), &set.seen_ids())
                    .await?;
                stages.push(absorb(&mut set, Stage::Random, batch, origin));
            }
        }

        // Tiers decide membership; the final order is by distance
        if origin.is_some() {
            set.sort_by_distance();
        }

        let mut results = set.into_results();
        results.truncate(context.limit);

        Ok(Resolution { results, stages })
    }
}

/// Rank a fetched batch, order it nearest first and append what fits
fn absorb<C: Candidate>(
    set: &mut ResultSet<C>,
    stage: Stage,
    batch: Vec<C>,
    origin: Option<GeoPoint>,
) -> StageReport {
    let fetched = batch.len();
    let mut ranked = rank_batch(batch, origin);
    if origin.is_some() {
        sort_by_distance(&mut ranked);
    }
    let added = set.extend(ranked);

    tracing::info!(
        "Stage {:?} ({:?}): {} fetched, {} added, total {}",
        stage,
        C::KIND,
        fetched,
        added,
        set.len()
    );

    StageReport {
        stage,
        fetched,
        added,
    }
}
