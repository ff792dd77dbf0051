use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    pub total_seats: i32,
    pub created_at: NaiveDateTime,
}
