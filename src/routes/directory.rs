use actix_web::{web, HttpResponse};

use crate::models::{DistrictsResponse, ErrorResponse, ProvincesResponse, RatingSummaryResponse};
use crate::routes::AppState;
use crate::services::PostgresError;

/// Configure reference data and review routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/address/cities", web::get().to(list_provinces))
        .route("/address/districts/{province_id}", web::get().to(list_districts))
        .route("/reviews/towtruck/{id}/summary", web::get().to(rating_summary));
}

/// GET /api/v1/address/cities
async fn list_provinces(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ProvincesResponse {
        status: "success".to_string(),
        data: state.reference.provinces().to_vec(),
    })
}

/// GET /api/v1/address/districts/{provinceId}
async fn list_districts(state: web::Data<AppState>, path: web::Path<i32>) -> HttpResponse {
    let province_id = path.into_inner();

    if !state
        .reference
        .provinces()
        .iter()
        .any(|p| p.province_id == province_id)
    {
        return HttpResponse::NotFound().json(ErrorResponse {
            error: "not_found".to_string(),
            message: format!("Province {} not found", province_id),
            status_code: 404,
        });
    }

    HttpResponse::Ok().json(DistrictsResponse {
        status: "success".to_string(),
        data: state.reference.districts_of(province_id).to_vec(),
    })
}

/// GET /api/v1/reviews/towtruck/{id}/summary
async fn rating_summary(state: web::Data<AppState>, path: web::Path<i32>) -> HttpResponse {
    let tow_truck_id = path.into_inner();

    match state.postgres.tow_truck_rating(tow_truck_id).await {
        Ok(summary) => HttpResponse::Ok().json(RatingSummaryResponse {
            tow_truck_id,
            summary,
        }),
        Err(PostgresError::NotFound(message)) => HttpResponse::NotFound().json(ErrorResponse {
            error: "not_found".to_string(),
            message,
            status_code: 404,
        }),
        Err(e) => {
            tracing::error!("Failed to load rating summary for {}: {}", tow_truck_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "rating_lookup_failed".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
