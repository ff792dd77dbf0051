use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A scheduled performance at a venue. `remaining_seats` starts as the
/// venue's capacity at creation time and is only ever moved by the
/// booking ledger; editing the venue afterwards does not re-sync it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Show {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub duration_minutes: Option<i32>,
    pub ticket_price: f64,
    pub venue_id: i64,
    pub show_date: Option<NaiveDate>,
    pub show_time: Option<NaiveTime>,
    pub remaining_seats: i32,
    pub created_at: NaiveDateTime,
}
