use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use nearest_tow::config::{LoggingSettings, Settings};
use nearest_tow::routes::{self, AppState};
use nearest_tow::services::{
    CacheManager, CompanyPool, GeoResolver, NominatimGeoResolver, NoopGeoResolver,
    PostgresClient, ReferenceIndex, TowTruckPool,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Query error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle path parameter errors
pub fn handle_path_error(err: error::PathError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Path error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_path".to_string(),
        message: format!("Invalid path parameter: {}", err),
        status_code: 400,
    }
    .into()
}

fn init_logging(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        std::io::Error::other(e)
    })?;

    init_logging(&settings.logging);

    info!("Starting Nearest Tow service...");

    let postgres = Arc::new(
        PostgresClient::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            std::io::Error::other(e)
        })?,
    );

    info!("PostgreSQL client initialized");

    let reference = Arc::new(ReferenceIndex::load(&postgres).await.map_err(|e| {
        error!("Failed to load reference data: {}", e);
        std::io::Error::other(e)
    })?);

    // Reverse geocoding is optional; without it searches rely on explicit areas
    let geo: Arc<dyn GeoResolver> = if settings.geocoder.enabled {
        let cache = CacheManager::from_settings(
            settings.cache.redis_url.as_deref(),
            settings.cache.l1_cache_size(),
            settings.cache.ttl_secs(),
        )
        .await;

        let resolver = NominatimGeoResolver::new(
            settings.geocoder.endpoint.clone(),
            settings.geocoder.user_agent.clone(),
            Duration::from_secs(settings.geocoder.timeout_secs),
            Arc::clone(&reference),
            Some(Arc::new(cache)),
        )
        .map_err(|e| {
            error!("Failed to create geocoder: {}", e);
            std::io::Error::other(e)
        })?;

        info!("Reverse geocoding enabled ({})", settings.geocoder.endpoint);
        Arc::new(resolver)
    } else {
        info!("Reverse geocoding disabled");
        Arc::new(NoopGeoResolver)
    };

    let app_state = AppState {
        tow_trucks: TowTruckPool::new(Arc::clone(&postgres)),
        companies: CompanyPool::new(Arc::clone(&postgres)),
        postgres,
        geo,
        reference,
        matching: settings.matching.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
