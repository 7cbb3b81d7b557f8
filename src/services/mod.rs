// Service exports
pub mod cache;
pub mod geocoder;
pub mod memory;
pub mod postgres;
pub mod providers;
pub mod reference;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use geocoder::{GeoResolver, GeocodeError, NominatimGeoResolver, NoopGeoResolver};
pub use memory::{InMemoryPool, StaticRatings};
pub use postgres::{PostgresClient, PostgresError, Scope};
pub use providers::{CompanyPool, TowTruckPool};
pub use reference::{normalize_name, ReferenceIndex};
