use actix_web::{error::ResponseError, http::StatusCode, web, HttpResponse};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::config::MatchingSettings;
use crate::core::{rank_batch, CandidateProvider, RatingsSource, ResultAssembler, TieredResolver};
use crate::models::{
    Candidate, CandidateKind, EnrichedResult, ErrorResponse, GeoPoint, HealthResponse,
    NearestQuery, ResolvedArea, SearchContext,
};
use crate::routes::AppState;
use crate::services::{GeoResolver, Scope};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the search endpoints
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{0}")]
    InvalidQuery(String),

    #[error("Candidate lookup failed: {0}")]
    Candidates(BoxError),

    #[error("Rating lookup failed: {0}")]
    Ratings(BoxError),
}

impl ResponseError for SearchError {
    fn status_code(&self) -> StatusCode {
        match self {
            SearchError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            SearchError::InvalidQuery(_) => "invalid_query",
            SearchError::Candidates(_) => "candidate_lookup_failed",
            SearchError::Ratings(_) => "rating_lookup_failed",
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error.to_string(),
            message: self.to_string(),
            status_code: self.status_code().as_u16(),
        })
    }
}

/// Configure the search routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/location", web::get().to(list_tow_trucks))
        .route("/location/nearest", web::get().to(nearest_tow_trucks))
        .route("/companies/nearest", web::get().to(nearest_companies));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Nearest tow trucks
///
/// GET /api/v1/location/nearest?latitude=..&longitude=..&limit=..&provinceId=..&districtId=..
async fn nearest_tow_trucks(
    state: web::Data<AppState>,
    query: web::Query<NearestQuery>,
) -> Result<HttpResponse, SearchError> {
    let results = search(
        &query,
        &state.matching,
        state.geo.as_ref(),
        &state.tow_trucks,
        state.postgres.as_ref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(results))
}

/// Nearest towing companies
///
/// GET /api/v1/companies/nearest?latitude=..&longitude=..&limit=..&provinceId=..&districtId=..
async fn nearest_companies(
    state: web::Data<AppState>,
    query: web::Query<NearestQuery>,
) -> Result<HttpResponse, SearchError> {
    let results = search(
        &query,
        &state.matching,
        state.geo.as_ref(),
        &state.companies,
        state.postgres.as_ref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(results))
}

/// Every active tow truck, most recently updated first
///
/// GET /api/v1/location
async fn list_tow_trucks(state: web::Data<AppState>) -> Result<HttpResponse, SearchError> {
    let trucks = state
        .postgres
        .fetch_tow_trucks(Scope::All, &[])
        .await
        .map_err(|e| SearchError::Candidates(Box::new(e)))?;

    let results = ResultAssembler::new(state.postgres.as_ref())
        .enrich(rank_batch(trucks, None))
        .await
        .map_err(|e| SearchError::Ratings(Box::new(e)))?;

    Ok(HttpResponse::Ok().json(results))
}

/// Default result count for a candidate kind
fn default_limit(kind: CandidateKind, matching: &MatchingSettings) -> usize {
    match kind {
        CandidateKind::TowTruck => matching.tow_truck_default_limit,
        CandidateKind::Company => matching.company_default_limit,
    }
}

/// Fill a missing province or district from a geocoded area
///
/// Explicit values always win. A geocoded value is only taken when the
/// geocoded pair agrees with the explicit half, so a district never ends up
/// outside the requested province.
fn merge_area(
    province_id: Option<i32>,
    district_id: Option<i32>,
    area: ResolvedArea,
) -> (Option<i32>, Option<i32>) {
    match (province_id, district_id) {
        (None, None) => (area.province_id, area.district_id),
        (Some(p), None) if area.province_id == Some(p) => (Some(p), area.district_id),
        (None, Some(d)) if area.district_id == Some(d) => (area.province_id, Some(d)),
        explicit => explicit,
    }
}

/// Run one nearest search end to end
///
/// Validates the query, fills a missing province or district from the
/// user's coordinates, resolves the tiered candidate list and attaches
/// company contact and rating data. A geocoding failure only costs the
/// area-based tiers; candidate or rating failures fail the request.
pub async fn search<P, R>(
    query: &NearestQuery,
    matching: &MatchingSettings,
    geo: &dyn GeoResolver,
    provider: &P,
    ratings: &R,
) -> Result<Vec<EnrichedResult<P::Candidate>>, SearchError>
where
    P: CandidateProvider + ?Sized,
    R: RatingsSource + ?Sized,
{
    let request_id = Uuid::new_v4();
    let kind = <P::Candidate as Candidate>::KIND;

    if let Err(errors) = query.validate() {
        tracing::info!("[{}] Rejected {:?} search: {}", request_id, kind, errors);
        return Err(SearchError::InvalidQuery(errors.to_string()));
    }

    let limit = query
        .limit_or(default_limit(kind, matching))
        .min(matching.max_limit);
    let origin = GeoPoint::from_wire(query.latitude, query.longitude);

    let mut province_id = query.province_id;
    let mut district_id = query.district_id;

    if let Some(point) = origin {
        if province_id.is_none() || district_id.is_none() {
            match geo.resolve(point).await {
                Ok(area) => {
                    (province_id, district_id) = merge_area(province_id, district_id, area);
                }
                Err(e) => {
                    tracing::warn!(
                        "[{}] Reverse geocoding failed, continuing without area: {}",
                        request_id,
                        e
                    );
                }
            }
        }
    }

    let context = SearchContext::new(origin, limit).with_area(province_id, district_id);

    tracing::info!(
        "[{}] {:?} search: geo={}, province={:?}, district={:?}, limit={}",
        request_id,
        kind,
        context.has_geo(),
        context.province_id,
        context.district_id,
        limit
    );

    let resolution = TieredResolver::new()
        .resolve(&context, provider)
        .await
        .map_err(|e| {
            tracing::error!("[{}] Candidate lookup failed: {}", request_id, e);
            SearchError::Candidates(Box::new(e))
        })?;

    let results = ResultAssembler::new(ratings)
        .enrich(resolution.results)
        .await
        .map_err(|e| {
            tracing::error!("[{}] Rating lookup failed: {}", request_id, e);
            SearchError::Ratings(Box::new(e))
        })?;

    tracing::info!(
        "[{}] Returning {} results after stages {:?}",
        request_id,
        results.len(),
        resolution.stages.iter().map(|s| s.stage).collect::<Vec<_>>()
    );

    Ok(results)
}
