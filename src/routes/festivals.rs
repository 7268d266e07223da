use actix_web::{web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::{filter, summarize, Catalog, Matcher, RecommendOptions};
use crate::models::{
    ErrorResponse, FilterConstraints, FilterResponse, HealthResponse, RecommendRequest,
    RecommendResponse,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub matcher: Matcher,
    pub default_limit: u16,
    pub max_limit: u16,
}

/// Configure all festival-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/festivals", web::get().to(list_festivals))
        .route("/festivals/{id}", web::get().to(get_festival))
        .route("/recommendations", web::post().to(recommend));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let status = if state.catalog.is_empty() { "degraded" } else { "healthy" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        catalog_size: state.catalog.len(),
        timestamp: chrono::Utc::now(),
    })
}

/// Browse the catalog
///
/// GET /api/v1/festivals?categories=rock,pop&countries=Spain&months=Jul&budgetMin=100&budgetMax=300&q=sun&sort=price&order=asc
///
/// Unknown keys and unreadable values are ignored rather than rejected.
async fn list_festivals(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let constraints = FilterConstraints::from_query_string(req.query_string());
    let result = filter(state.catalog.festivals(), &constraints);

    tracing::debug!(
        "Filter {:?} matched {} of {} festivals",
        req.query_string(),
        result.total_count,
        state.catalog.len()
    );

    HttpResponse::Ok().json(FilterResponse {
        items: result.items,
        total_count: result.total_count,
        query: constraints.to_query_string(),
    })
}

/// Look up a single festival
async fn get_festival(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();

    match state.catalog.get(&id) {
        Some(festival) => HttpResponse::Ok().json(festival),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: "not_found".to_string(),
            message: format!("No festival with id {}", id),
            status_code: 404,
        }),
    }
}

/// Recommendation endpoint
///
/// POST /api/v1/recommendations
///
/// Request body:
/// ```json
/// {
///   "criteria": { "categories": ["electronic"], "budget": { "min": 100, "max": 500 } },
///   "prefilter": { "countries": ["Spain"] },
///   "includeBelowThreshold": false,
///   "limit": 20
/// }
/// ```
async fn recommend(state: web::Data<AppState>, req: web::Json<RecommendRequest>) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for recommend request: field_errors={:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let req = req.into_inner();
    // Cap limit to keep responses bounded
    let limit = req.limit.unwrap_or(state.default_limit).min(state.max_limit) as usize;

    let options = RecommendOptions {
        prefilter: req.prefilter,
        include_below_threshold: req.include_below_threshold,
        limit: Some(limit),
    };

    let found = state
        .matcher
        .find_matches(state.catalog.festivals(), &req.criteria, &options);

    tracing::debug!(
        "Recommended {} festivals from {} candidates",
        found.results.len(),
        found.total_candidates
    );

    HttpResponse::Ok().json(RecommendResponse {
        tiers: summarize(&found.results),
        results: found.results,
        total_candidates: found.total_candidates,
    })
}
