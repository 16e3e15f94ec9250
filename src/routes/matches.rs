use crate::core::engine::{MatchError, MatchmakingEngine};
use crate::models::{
    ClearCacheRequest, ClearCacheResponse, ErrorResponse, FindMatchesRequest, FindMatchesResponse,
    HealthResponse,
};
use crate::services::{PhotoClient, PostgresClient, TieredCache};
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

/// Engine wired to the production collaborators
pub type Engine = MatchmakingEngine<PostgresClient, PostgresClient, PhotoClient, TieredCache>;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub postgres: Arc<PostgresClient>,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches))
        .route("/matches/cache/clear", web::post().to(clear_cache));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.postgres.health_check().await.unwrap_or(false);
    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "page": 0,
///   "size": 20,
///   "filters": {"maxDistanceKm": 50.0, "skillIds": [1, 2]}
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    match state
        .engine
        .find_matches(&req.user_id, req.page, req.size, req.filters.as_ref())
        .await
    {
        Ok(matches) => {
            tracing::info!(
                "Returning {} matches for user {} (page {})",
                matches.len(),
                req.user_id,
                req.page
            );
            let total_results = matches.len();
            HttpResponse::Ok().json(FindMatchesResponse {
                matches,
                page: req.page,
                size: req.size,
                total_results,
            })
        }
        Err(err) => error_response(err),
    }
}

/// Cache invalidation endpoint for profile/skill mutation services
///
/// POST /api/v1/matches/cache/clear
async fn clear_cache(
    state: web::Data<AppState>,
    req: web::Json<ClearCacheRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    state.engine.clear_user_match_cache(&req.user_id).await;

    HttpResponse::Ok().json(ClearCacheResponse {
        success: true,
        user_id: req.user_id.clone(),
    })
}

/// Translate engine failures into response semantics
fn error_response(err: MatchError) -> HttpResponse {
    let (status, error) = match &err {
        MatchError::InvalidArgument(_) => (400, "invalid_argument"),
        MatchError::NotFound(_) => (404, "not_found"),
        MatchError::IncompleteProfile(_) => (409, "incomplete_profile"),
        MatchError::StoreUnavailable(_) => (503, "store_unavailable"),
    };

    if status >= 500 {
        tracing::error!("Matchmaking request failed: {}", err);
    } else {
        tracing::info!("Matchmaking request rejected: {}", err);
    }

    let mut builder = match status {
        400 => HttpResponse::BadRequest(),
        404 => HttpResponse::NotFound(),
        409 => HttpResponse::Conflict(),
        _ => HttpResponse::ServiceUnavailable(),
    };

    builder.json(ErrorResponse {
        error: error.to_string(),
        message: err.to_string(),
        status_code: status,
    })
}
