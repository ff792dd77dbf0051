use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::error::Error;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/dashboard", get(get_dashboard))
}

// GET /api/dashboard
//
// Collection counts for the statistics panel.
#[derive(Debug, Serialize)]
struct DashboardResponse {
    customers: i64,
    venues: i64,
    shows: i64,
    bookings: i64,
}

async fn get_dashboard(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, Error> {
    let (customers, venues, shows, bookings) = sqlx::query_as::<_, (i64, i64, i64, i64)>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM customers),
            (SELECT COUNT(*) FROM venues),
            (SELECT COUNT(*) FROM shows),
            (SELECT COUNT(*) FROM bookings)
        "#,
    )
    .fetch_one(&state.db.pool)
    .await?;

    Ok(Json(DashboardResponse {
        customers,
        venues,
        shows,
        bookings,
    }))
}
