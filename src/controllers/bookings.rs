use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::Error;
use crate::models::BookingStatus;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/cancel", patch(cancel_booking))
}

/* ---------- BOOKINGS ---------- */

// POST /api/bookings
#[derive(Debug, Deserialize)]
struct CreateBookingRequest {
    customer_id: i64,
    show_id: i64,
    seats: i32,
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, Error> {
    if req.customer_id <= 0 || req.show_id <= 0 {
        return Err(Error::Validation(
            "customer_id and show_id must be greater than zero".into(),
        ));
    }

    let booking = state
        .ledger
        .create_booking(req.customer_id, req.show_id, req.seats)
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

// PATCH /api/bookings/cancel
#[derive(Debug, Deserialize)]
struct CancelBookingRequest {
    booking_id: i64,
}

async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CancelBookingRequest>,
) -> Result<impl IntoResponse, Error> {
    if req.booking_id <= 0 {
        return Err(Error::Validation(
            "booking_id must be greater than zero".into(),
        ));
    }

    state.ledger.cancel_booking(req.booking_id).await?;

    Ok(Json(serde_json::json!({ "message": "Booking cancelled" })))
}

// GET /api/bookings
#[derive(Debug, Serialize)]
struct BookingSummary {
    id: i64,
    customer_name: String,
    show_title: String,
    seats_booked: i32,
    total_amount: f64,
    status: BookingStatus,
    created_at: NaiveDateTime,
}

async fn list_bookings(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, Error> {
    let rows = sqlx::query_as::<_, (i64, String, String, i32, f64, BookingStatus, NaiveDateTime)>(
        r#"
        SELECT b.id, c.name AS customer_name, s.title AS show_title,
               b.seats_booked, b.total_amount, b.status, b.created_at
        FROM bookings b
        JOIN customers c ON b.customer_id = c.id
        JOIN shows s ON b.show_id = s.id
        ORDER BY b.id DESC
        "#,
    )
    .fetch_all(&state.db.pool)
    .await?;

    let bookings: Vec<BookingSummary> = rows
        .into_iter()
        .map(
            |(id, customer_name, show_title, seats_booked, total_amount, status, created_at)| {
                BookingSummary {
                    id,
                    customer_name,
                    show_title,
                    seats_booked,
                    total_amount,
                    status,
                    created_at,
                }
            },
        )
        .collect();

    Ok(Json(bookings))
}
