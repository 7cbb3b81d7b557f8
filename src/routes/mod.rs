// Route exports
pub mod directory;
pub mod nearest;

use actix_web::web;
use std::sync::Arc;

use crate::config::MatchingSettings;
use crate::services::{CompanyPool, GeoResolver, PostgresClient, ReferenceIndex, TowTruckPool};

pub use nearest::{search, SearchError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub postgres: Arc<PostgresClient>,
    pub tow_trucks: TowTruckPool,
    pub companies: CompanyPool,
    pub geo: Arc<dyn GeoResolver>,
    pub reference: Arc<ReferenceIndex>,
    pub matching: MatchingSettings,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(nearest::configure)
            .configure(directory::configure),
    );
}
