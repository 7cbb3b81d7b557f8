use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::provider::{CandidateProvider, RatingsSource};
use crate::models::{CandidateKind, Company, RatingSummary, TowTruck};
use crate::services::postgres::{PostgresClient, PostgresError, Scope};

/// Tow truck candidates backed by PostgreSQL
#[derive(Clone)]
pub struct TowTruckPool {
    db: Arc<PostgresClient>,
}

impl TowTruckPool {
    pub fn new(db: Arc<PostgresClient>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CandidateProvider for TowTruckPool {
    type Candidate = TowTruck;
    type Error = PostgresError;

    async fn by_district(&self, district_id: i32, exclude: &[i32]) -> Result<Vec<TowTruck>, PostgresError> {
        self.db.fetch_tow_trucks(Scope::District(district_id), exclude).await
    }

    async fn by_province(&self, province_id: i32, exclude: &[i32]) -> Result<Vec<TowTruck>, PostgresError> {
        self.db.fetch_tow_trucks(Scope::Province(province_id), exclude).await
    }

    async fn all(&self, exclude: &[i32]) -> Result<Vec<TowTruck>, PostgresError> {
        self.db.fetch_tow_trucks(Scope::All, exclude).await
    }

    async fn random_sample(&self, n: usize, exclude: &[i32]) -> Result<Vec<TowTruck>, PostgresError> {
        self.db.fetch_tow_trucks(Scope::Random(n), exclude).await
    }
}

/// Company candidates backed by PostgreSQL
#[derive(Clone)]
pub struct CompanyPool {
    db: Arc<PostgresClient>,
}

impl CompanyPool {
    pub fn new(db: Arc<PostgresClient>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CandidateProvider for CompanyPool {
    type Candidate = Company;
    type Error = PostgresError;

    async fn by_district(&self, district_id: i32, exclude: &[i32]) -> Result<Vec<Company>, PostgresError> {
        self.db.fetch_companies(Scope::District(district_id), exclude).await
    }

    async fn by_province(&self, province_id: i32, exclude: &[i32]) -> Result<Vec<Company>, PostgresError> {
        self.db.fetch_companies(Scope::Province(province_id), exclude).await
    }

    async fn all(&self, exclude: &[i32]) -> Result<Vec<Company>, PostgresError> {
        self.db.fetch_companies(Scope::All, exclude).await
    }

    async fn random_sample(&self, n: usize, exclude: &[i32]) -> Result<Vec<Company>, PostgresError> {
        self.db.fetch_companies(Scope::Random(n), exclude).await
    }
}

#[async_trait]
impl RatingsSource for PostgresClient {
    type Error = PostgresError;

    async fn rating_stats(
        &self,
        kind: CandidateKind,
        ids: &[i32],
    ) -> Result<HashMap<i32, RatingSummary>, PostgresError> {
        self.fetch_rating_stats(kind, ids).await
    }
}
