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
use crate::models::Customer;
use crate::AppState;

use super::normalize;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/{id}",
            put(update_customer).delete(delete_customer),
        )
}

#[derive(Debug, Deserialize)]
struct CustomerPayload {
    name: String,
    email: Option<String>,
    phone: Option<String>,
}

async fn list_customers(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, Error> {
    let customers = sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY id")
        .fetch_all(&state.db.pool)
        .await?;

    Ok(Json(customers))
}

async fn create_customer(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CustomerPayload>,
) -> Result<impl IntoResponse, Error> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(Error::Validation("name is required".into()));
    }

    // Duplicate emails surface as a conflict via the unique constraint.
    let customer = sqlx::query_as::<_, Customer>(
        "INSERT INTO customers (name, email, phone) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(name)
    .bind(normalize(req.email))
    .bind(normalize(req.phone))
    .fetch_one(&state.db.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

async fn update_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<CustomerPayload>,
) -> Result<impl IntoResponse, Error> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(Error::Validation("name is required".into()));
    }

    let customer = sqlx::query_as::<_, Customer>(
        "UPDATE customers SET name = $1, email = $2, phone = $3 WHERE id = $4 RETURNING *",
    )
    .bind(name)
    .bind(normalize(req.email))
    .bind(normalize(req.phone))
    .bind(id)
    .fetch_optional(&state.db.pool)
    .await?
    .ok_or(Error::NotFound("customer"))?;

    Ok(Json(customer))
}

async fn delete_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let result = sqlx::query("DELETE FROM customers WHERE id = $1")
        .bind(id)
        .execute(&state.db.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("customer"));
    }

    Ok(Json(serde_json::json!({ "message": "Customer deleted" })))
}
