use axum::extract::{Extension, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use atlas_domain::error::DomainError;
use atlas_domain::geometry::Ring;
use atlas_domain::upgrade::UpgradeRequest;

use crate::error::ApiError;
use crate::middleware::{actor_context, ActorContext};
use crate::state::AppState;
use crate::validation;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/countries/list", get(list_countries))
        .route(
            "/countries/list_with_coordinates",
            get(list_countries_with_coordinates),
        )
        .route("/countries_coordinates/list", get(list_country_coordinates))
        .route(
            "/countries_coordinates/upgrade",
            post(upgrade_country_coordinate),
        )
        .layer(middleware::from_fn(actor_context))
        .with_state(state)
}

async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct ListCountriesQuery {
    has_coordinates: Option<bool>,
}

async fn list_countries(
    State(state): State<AppState>,
    Query(query): Query<ListCountriesQuery>,
) -> Result<Json<Value>, ApiError> {
    let items = state.countries.list(query.has_coordinates).await?;
    Ok(Json(json!({ "success": true, "items": items })))
}

/// The aggregate view is expensive to serialize, so the response body is
/// cached as a ready JSON string and concurrent cold reads collapse into a
/// single computation.
async fn list_countries_with_coordinates(
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let countries = state.countries.clone();
    let payload = state
        .boundaries_payload
        .get_or_compute(|| async move {
            let entries = countries.list_with_boundaries().await?;
            serde_json::to_string(&json!({ "success": true, "items": entries }))
                .map_err(|err| DomainError::Storage(err.to_string()))
        })
        .await?;
    Ok(([(CONTENT_TYPE, "application/json")], payload).into_response())
}

#[derive(Debug, Deserialize, Validate)]
struct ListCountryCoordinatesQuery {
    #[validate(range(min = 1))]
    country_id: Option<i64>,
}

async fn list_country_coordinates(
    State(state): State<AppState>,
    Query(query): Query<ListCountryCoordinatesQuery>,
) -> Result<Json<Value>, ApiError> {
    validation::validate(&query)?;
    let country_id = query.country_id.ok_or(DomainError::NotFoundCountry)?;
    let view = state
        .country_boundaries
        .boundaries_of_country(country_id)
        .await?;
    Ok(Json(json!({
        "success": true,
        "id": view.id,
        "name": view.name,
        "center": view.center,
        "zoom": view.zoom,
        "items": view.items,
    })))
}

#[derive(Debug, Deserialize, Validate)]
struct UpgradeRequestBody {
    #[validate(range(min = 1))]
    country_id: Option<i64>,
    #[validate(range(min = 1))]
    boundary_id: Option<i64>,
    rings: Option<Vec<Ring>>,
}

async fn upgrade_country_coordinate(
    State(state): State<AppState>,
    Extension(actor): Extension<ActorContext>,
    payload: Option<Json<UpgradeRequestBody>>,
) -> Result<Json<Value>, ApiError> {
    let Json(payload) = payload.ok_or(DomainError::EmptyRequest)?;
    validation::validate(&payload)?;
    let actor = actor.require()?;

    let request = UpgradeRequest {
        country_id: payload.country_id,
        boundary_id: payload.boundary_id,
        rings: payload.rings,
    };
    let id = state.upgrades.upgrade(&request, actor).await?;

    // The aggregate payload is stale now; drop it instead of waiting out the TTL.
    state.boundaries_payload.invalidate();

    Ok(Json(json!({ "success": true, "id": id })))
}
