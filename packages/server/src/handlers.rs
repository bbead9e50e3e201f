//! HTTP handler functions for the bankfind API.

use actix_web::{HttpResponse, web};
use bankfind_server_models::{
    ApiHealth, ApiMessage, ApiSearchResponse, LocationQueryParams, SearchQueryParams,
};

use crate::AppState;

/// `GET /api`
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(ApiMessage::new("bankfind API v1"))
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/search?q=<query>&p=<page>`
///
/// Interprets the raw query (abbreviation matching + normalization) and
/// returns one page of ranked branch records.
pub async fn search(
    state: web::Data<AppState>,
    params: web::Query<SearchQueryParams>,
) -> HttpResponse {
    let query = params.q.as_deref().unwrap_or("");

    let page = match params.p.as_deref() {
        None | Some("") => 1,
        Some(p) => match p.parse::<usize>() {
            Ok(p) => p,
            Err(_) => {
                return HttpResponse::BadRequest().json(ApiMessage::new("Invalid page number."));
            }
        },
    };

    match state
        .context
        .search(query, page, state.config.page_size)
        .await
    {
        Ok(results) => {
            log::info!(
                "Searched for term q={query:?} - {} results generated in {:.3}ms",
                results.total_hits,
                results.elapsed_secs * 1000.0
            );
            HttpResponse::Ok().json(ApiSearchResponse::from(results))
        }
        Err(e) if e.is_validation() => {
            log::debug!("Rejected search q={query:?}: {e}");
            HttpResponse::BadRequest().json(ApiMessage::new(e.to_string()))
        }
        Err(e) => {
            log::error!("Search failed for q={query:?}: {e}");
            HttpResponse::InternalServerError()
                .json(ApiMessage::new("Something went wrong. Please report to admin."))
        }
    }
}

/// `GET /api/location?latitude=<lat>&longitude=<lng>`
///
/// Reverse-geocoding proxy: forwards the coordinates and the configured
/// API key to the upstream geocoder and relays its JSON response, so the
/// key never reaches the frontend.
pub async fn location(
    state: web::Data<AppState>,
    params: web::Query<LocationQueryParams>,
) -> HttpResponse {
    let latlng = format!("{},{}", params.latitude, params.longitude);

    let response = state
        .http
        .get(&state.config.geocode_api_uri)
        .query(&[
            ("latlng", latlng.as_str()),
            ("key", state.config.geocode_api_key.as_str()),
        ])
        .send()
        .await;

    let response = match response {
        Ok(response) => response,
        Err(e) => {
            log::error!("Geocoder request failed: {e}");
            return geocode_error();
        }
    };

    match response.json::<serde_json::Value>().await {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => {
            log::error!("Failed to parse geocoder response: {e}");
            geocode_error()
        }
    }
}

fn geocode_error() -> HttpResponse {
    HttpResponse::BadGateway().json(ApiMessage::new("Error while getting location"))
}
