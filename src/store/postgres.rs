use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::Error;
use crate::models::Booking;

use super::{InventoryStore, InventoryTx, NewBooking, ShowInventory};

/// Postgres-backed inventory store. Row locks (`SELECT ... FOR UPDATE`)
/// on the show make the ledger's read-check-write sequence atomic with
/// respect to concurrent bookings on the same show.
#[derive(Clone)]
pub struct PgInventoryStore {
    pool: PgPool,
}

impl PgInventoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn begin(&self) -> Result<Box<dyn InventoryTx>, Error> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgInventoryTx { tx }))
    }
}

struct PgInventoryTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl InventoryTx for PgInventoryTx {
    async fn lock_show(&mut self, show_id: i64) -> Result<Option<ShowInventory>, Error> {
        let row = sqlx::query_as::<_, (i32, f64)>(
            "SELECT remaining_seats, ticket_price FROM shows WHERE id = $1 FOR UPDATE",
        )
        .bind(show_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(row.map(|(remaining_seats, ticket_price)| ShowInventory {
            remaining_seats,
            ticket_price,
        }))
    }

    async fn insert_booking(&mut self, booking: &NewBooking) -> Result<Booking, Error> {
        let created = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (customer_id, show_id, seats_booked, total_amount, status)
            VALUES ($1, $2, $3, $4, 'CONFIRMED')
            RETURNING id, customer_id, show_id, seats_booked, total_amount, status, created_at
            "#,
        )
        .bind(booking.customer_id)
        .bind(booking.show_id)
        .bind(booking.seats_booked)
        .bind(booking.total_amount)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(created)
    }

    async fn adjust_remaining_seats(&mut self, show_id: i64, delta: i32) -> Result<(), Error> {
        sqlx::query("UPDATE shows SET remaining_seats = remaining_seats + $1 WHERE id = $2")
            .bind(delta)
            .bind(show_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn find_booking(&mut self, booking_id: i64) -> Result<Option<Booking>, Error> {
        let booking = sqlx::query_as::<_, Booking>(
            r#"
            SELECT id, customer_id, show_id, seats_booked, total_amount, status, created_at
            FROM bookings WHERE id = $1 FOR UPDATE
            "#,
        )
        .bind(booking_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(booking)
    }

    async fn mark_cancelled(&mut self, booking_id: i64) -> Result<(), Error> {
        sqlx::query("UPDATE bookings SET status = 'CANCELLED' WHERE id = $1")
            .bind(booking_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), Error> {
        self.tx.commit().await?;
        Ok(())
    }
}
