use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Error;
use crate::models::Venue;
use crate::AppState;

use super::normalize;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/venues", get(list_venues).post(create_venue))
        .route("/venues/{id}", put(update_venue).delete(delete_venue))
}

#[derive(Debug, Deserialize)]
struct VenuePayload {
    name: String,
    location: Option<String>,
    total_seats: i32,
}

fn validate(req: &VenuePayload) -> Result<(), Error> {
    if req.name.trim().is_empty() {
        return Err(Error::Validation("name is required".into()));
    }
    if req.total_seats <= 0 {
        return Err(Error::Validation(
            "total seats must be greater than zero".into(),
        ));
    }
    Ok(())
}

async fn list_venues(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, Error> {
    let venues = sqlx::query_as::<_, Venue>("SELECT * FROM venues ORDER BY id")
        .fetch_all(&state.db.pool)
        .await?;

    Ok(Json(venues))
}

async fn create_venue(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VenuePayload>,
) -> Result<impl IntoResponse, Error> {
    validate(&req)?;

    let venue = sqlx::query_as::<_, Venue>(
        "INSERT INTO venues (name, location, total_seats) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(req.name.trim())
    .bind(normalize(req.location))
    .bind(req.total_seats)
    .fetch_one(&state.db.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(venue)))
}

// Capacity edits never propagate to existing shows; a show keeps the
// remaining-seats it was created with.
async fn update_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<VenuePayload>,
) -> Result<impl IntoResponse, Error> {
    validate(&req)?;

    let venue = sqlx::query_as::<_, Venue>(
        "UPDATE venues SET name = $1, location = $2, total_seats = $3 WHERE id = $4 RETURNING *",
    )
    .bind(req.name.trim())
    .bind(normalize(req.location))
    .bind(req.total_seats)
    .bind(id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or(Error::NotFound("venue"))?;

    Ok(Json(venue))
}

async fn delete_venue(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    // Fails with a conflict while shows still reference the venue.
    let result = sqlx::query("DELETE FROM venues WHERE id = $1")
        .bind(id)
        .execute(&state.db.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("venue"));
    }

    Ok(Json(serde_json::json!({ "message": "Venue deleted" })))
}
