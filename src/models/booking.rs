use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Booking lifecycle: CONFIRMED is the initial status, CANCELLED is
/// terminal. There is no way back to CONFIRMED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "booking_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub customer_id: i64,
    pub show_id: i64,
    pub seats_booked: i32,
    pub total_amount: f64,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
}
