// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Candidate, CandidateKind, Company, CompanyContact, District, GeoPoint, OperatingArea, Province,
    RankedResult, RatingSummary, ResolvedArea, SearchContext, TowTruck,
};
pub use requests::NearestQuery;
pub use responses::{
    DistrictsResponse, EnrichedResult, ErrorResponse, HealthResponse, ProvincesResponse,
    RatingSummaryResponse,
};
