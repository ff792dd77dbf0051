use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Error;
use crate::models::Show;
use crate::AppState;

use super::normalize;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/shows", get(list_shows).post(create_show))
        .route("/shows/available", get(list_available_shows))
        .route("/shows/{id}", put(update_show).delete(delete_show))
}

#[derive(Debug, Deserialize)]
struct ShowPayload {
    title: String,
    description: Option<String>,
    genre: Option<String>,
    duration_minutes: Option<i32>,
    ticket_price: Option<f64>,
    venue_id: i64,
    date: Option<String>,
    time: Option<String>,
}

struct ShowFields {
    title: String,
    description: Option<String>,
    genre: Option<String>,
    duration_minutes: Option<i32>,
    ticket_price: f64,
    show_date: Option<NaiveDate>,
    show_time: Option<NaiveTime>,
}

// All malformed input is rejected up front, before any statement runs.
fn validate(req: ShowPayload) -> Result<ShowFields, Error> {
    let title = req.title.trim().to_string();
    if title.is_empty() {
        return Err(Error::Validation("title is required".into()));
    }

    let ticket_price = req.ticket_price.unwrap_or(0.0);
    if !ticket_price.is_finite() || ticket_price < 0.0 {
        return Err(Error::Validation("ticket price must not be negative".into()));
    }

    if let Some(duration) = req.duration_minutes {
        if duration < 0 {
            return Err(Error::Validation("duration must not be negative".into()));
        }
    }

    let show_date = match normalize(req.date) {
        Some(raw) => Some(
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| Error::Validation("date must be YYYY-MM-DD".into()))?,
        ),
        None => None,
    };

    let show_time = match normalize(req.time) {
        Some(raw) => Some(
            NaiveTime::parse_from_str(&raw, "%H:%M")
                .map_err(|_| Error::Validation("time must be HH:MM".into()))?,
        ),
        None => None,
    };

    Ok(ShowFields {
        title,
        description: normalize(req.description),
        genre: normalize(req.genre),
        duration_minutes: req.duration_minutes,
        ticket_price,
        show_date,
        show_time,
    })
}

#[derive(Debug, Serialize)]
struct ShowSummary {
    id: i64,
    title: String,
    genre: Option<String>,
    duration_minutes: Option<i32>,
    ticket_price: f64,
    venue_name: String,
    show_date: Option<NaiveDate>,
    show_time: Option<NaiveTime>,
    remaining_seats: i32,
    created_at: NaiveDateTime,
}

async fn list_shows(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, Error> {
    let rows = sqlx::query_as::<_, (
        i64,
        String,
        Option<String>,
        Option<i32>,
        f64,
        String,
        Option<NaiveDate>,
        Option<NaiveTime>,
        i32,
        NaiveDateTime,
    )>(
        r#"
        SELECT s.id, s.title, s.genre, s.duration_minutes, s.ticket_price,
               v.name AS venue_name, s.show_date, s.show_time, s.remaining_seats, s.created_at
        FROM shows s
        JOIN venues v ON s.venue_id = v.id
        ORDER BY s.id
        "#,
    )
    .fetch_all(&state.db.pool)
    .await?;

    let shows: Vec<ShowSummary> = rows
        .into_iter()
        .map(
            |(
                id,
                title,
                genre,
                duration_minutes,
                ticket_price,
                venue_name,
                show_date,
                show_time,
                remaining_seats,
                created_at,
            )| ShowSummary {
                id,
                title,
                genre,
                duration_minutes,
                ticket_price,
                venue_name,
                show_date,
                show_time,
                remaining_seats,
                created_at,
            },
        )
        .collect();

    Ok(Json(shows))
}

#[derive(Debug, Serialize)]
struct ShowOption {
    id: i64,
    title: String,
}

// Shows that can still be booked, for the booking form's selector.
async fn list_available_shows(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Error> {
    let rows = sqlx::query_as::<_, (i64, String)>(
        "SELECT id, title FROM shows WHERE remaining_seats > 0 ORDER BY title",
    )
    .fetch_all(&state.db.pool)
    .await?;

    let options: Vec<ShowOption> = rows
        .into_iter()
        .map(|(id, title)| ShowOption { id, title })
        .collect();

    Ok(Json(options))
}

async fn create_show(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ShowPayload>,
) -> Result<impl IntoResponse, Error> {
    if req.venue_id <= 0 {
        return Err(Error::Validation("venue_id must be greater than zero".into()));
    }
    let venue_id = req.venue_id;
    let fields = validate(req)?;

    // The venue's capacity is copied into remaining_seats here and never
    // re-synced afterwards.
    let show = sqlx::query_as::<_, Show>(
        r#"
        INSERT INTO shows (title, description, genre, duration_minutes, ticket_price,
                           venue_id, show_date, show_time, remaining_seats)
        SELECT $1, $2, $3, $4, $5, id, $6, $7, total_seats
        FROM venues WHERE id = $8
        RETURNING *
        "#,
    )
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&fields.genre)
    .bind(fields.duration_minutes)
    .bind(fields.ticket_price)
    .bind(fields.show_date)
    .bind(fields.show_time)
    .bind(venue_id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or(Error::NotFound("venue"))?;

    Ok((StatusCode::CREATED, Json(show)))
}

// Only descriptive fields are editable; venue and remaining_seats are
// fixed at creation (the ledger is the sole writer of the counter).
async fn update_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ShowPayload>,
) -> Result<impl IntoResponse, Error> {
    let fields = validate(req)?;

    let show = sqlx::query_as::<_, Show>(
        r#"
        UPDATE shows
        SET title = $1, description = $2, genre = $3, duration_minutes = $4,
            ticket_price = $5, show_date = $6, show_time = $7
        WHERE id = $8
        RETURNING *
        "#,
    )
    .bind(&fields.title)
    .bind(&fields.description)
    .bind(&fields.genre)
    .bind(fields.duration_minutes)
    .bind(fields.ticket_price)
    .bind(fields.show_date)
    .bind(fields.show_time)
    .bind(id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or(Error::NotFound("show"))?;

    Ok(Json(show))
}

async fn delete_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    // Fails with a conflict while bookings still reference the show.
    let result = sqlx::query("DELETE FROM shows WHERE id = $1")
        .bind(id)
        .execute(&state.db.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("show"));
    }

    Ok(Json(serde_json::json!({ "message": "Show deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> ShowPayload {
        ShowPayload {
            title: "Hamlet".into(),
            description: None,
            genre: Some("Tragedy".into()),
            duration_minutes: Some(180),
            ticket_price: Some(45.0),
            venue_id: 1,
            date: Some("2026-09-12".into()),
            time: Some("19:30".into()),
        }
    }

    #[test]
    fn valid_payload_parses_date_and_time() {
        let fields = validate(payload()).unwrap();
        assert_eq!(
            fields.show_date,
            Some(NaiveDate::from_ymd_opt(2026, 9, 12).unwrap())
        );
        assert_eq!(
            fields.show_time,
            Some(NaiveTime::from_hms_opt(19, 30, 0).unwrap())
        );
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut req = payload();
        req.title = "  ".into();
        assert!(matches!(validate(req), Err(Error::Validation(_))));
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut req = payload();
        req.ticket_price = Some(-1.0);
        assert!(matches!(validate(req), Err(Error::Validation(_))));
    }

    #[test]
    fn malformed_date_is_rejected() {
        let mut req = payload();
        req.date = Some("12/09/2026".into());
        assert!(matches!(validate(req), Err(Error::Validation(_))));
    }

    #[test]
    fn missing_price_defaults_to_zero() {
        let mut req = payload();
        req.ticket_price = None;
        assert_eq!(validate(req).unwrap().ticket_price, 0.0);
    }
}
