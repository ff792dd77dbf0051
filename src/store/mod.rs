//! Persistence boundary for the booking ledger.
//!
//! The ledger never talks to a connection pool directly; it opens an
//! [`InventoryTx`] through an [`InventoryStore`] and runs its whole
//! read-check-write sequence inside it. Dropping a transaction without
//! committing rolls it back, so an early `?` return never leaves a
//! partial write behind.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgInventoryStore;

use async_trait::async_trait;

use crate::error::Error;
use crate::models::Booking;

/// Inventory of a single show, read under a lock that holds until the
/// transaction ends.
#[derive(Debug, Clone, Copy)]
pub struct ShowInventory {
    pub remaining_seats: i32,
    pub ticket_price: f64,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub customer_id: i64,
    pub show_id: i64,
    pub seats_booked: i32,
    pub total_amount: f64,
}

#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn InventoryTx>, Error>;
}

#[async_trait]
pub trait InventoryTx: Send {
    /// Reads a show's remaining seats and ticket price, excluding other
    /// writers from the row for the rest of the transaction.
    async fn lock_show(&mut self, show_id: i64) -> Result<Option<ShowInventory>, Error>;

    /// Inserts a CONFIRMED booking and returns the stored row.
    async fn insert_booking(&mut self, booking: &NewBooking) -> Result<Booking, Error>;

    /// Moves a show's remaining-seats counter by `delta` (negative to
    /// reserve, positive to release).
    async fn adjust_remaining_seats(&mut self, show_id: i64, delta: i32) -> Result<(), Error>;

    /// Reads a booking, holding its row against concurrent cancellation.
    async fn find_booking(&mut self, booking_id: i64) -> Result<Option<Booking>, Error>;

    async fn mark_cancelled(&mut self, booking_id: i64) -> Result<(), Error>;

    async fn commit(self: Box<Self>) -> Result<(), Error>;
}
