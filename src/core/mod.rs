// Core algorithm exports
pub mod assembler;
pub mod distance;
pub mod provider;
pub mod ranking;
pub mod resolver;

pub use assembler::ResultAssembler;
pub use distance::{distance_between, haversine_distance};
pub use provider::{CandidateProvider, RatingsSource};
pub use ranking::{compare_distance, rank_batch, sort_by_distance, ResultSet};
pub use resolver::{Resolution, Stage, StageReport, TieredResolver};
