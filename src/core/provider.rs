use async_trait::async_trait;
use std::collections::HashMap;

use crate::models::{Candidate, CandidateKind, RatingSummary};

/// Source of candidates for the tiered resolver.
///
/// Every query returns only active candidates and must leave out the ids in
/// `exclude`. Implementations are free to back this with a table scan, a
/// spatial index or a fixed list.
#[async_trait]
pub trait CandidateProvider: Send + Sync {
    type Candidate: Candidate + Send;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Candidates with an operating area in the given district
    async fn by_district(
        &self,
        district_id: i32,
        exclude: &[i32],
    ) -> Result<Vec<Self::Candidate>, Self::Error>;

    /// Candidates with an operating area anywhere in the given province
    async fn by_province(
        &self,
        province_id: i32,
        exclude: &[i32],
    ) -> Result<Vec<Self::Candidate>, Self::Error>;

    /// Every active candidate
    async fn all(&self, exclude: &[i32]) -> Result<Vec<Self::Candidate>, Self::Error>;

    /// Up to `n` active candidates in random order
    async fn random_sample(
        &self,
        n: usize,
        exclude: &[i32],
    ) -> Result<Vec<Self::Candidate>, Self::Error>;
}

/// Rating statistics keyed by candidate id
#[async_trait]
pub trait RatingsSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Summaries for the given ids; ids without reviews may be omitted
    async fn rating_stats(
        &self,
        kind: CandidateKind,
        ids: &[i32],
    ) -> Result<HashMap<i32, RatingSummary>, Self::Error>;
}
