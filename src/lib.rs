//! Nearest Tow - roadside assistance matching service
//!
//! Finds the tow trucks or towing companies best placed to help a stranded
//! driver. Candidates are gathered in widening tiers (district, province,
//! then nationwide or a random sample) and ordered by great-circle distance.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{haversine_distance, CandidateProvider, RatingsSource, ResultAssembler, TieredResolver};
pub use crate::models::{Company, EnrichedResult, GeoPoint, NearestQuery, SearchContext, TowTruck};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let origin = GeoPoint::new(41.0082, 28.9784);
        let context = SearchContext::new(origin, 5);
        assert!(context.has_geo());
        assert!(haversine_distance(41.0, 29.0, 41.0, 29.0) < 1e-9);
    }
}
