use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::Error;
use crate::models::{Booking, BookingStatus};

use super::{InventoryStore, InventoryTx, NewBooking, ShowInventory};

#[derive(Debug, Default, Clone)]
struct MemoryData {
    shows: BTreeMap<i64, ShowInventory>,
    bookings: BTreeMap<i64, Booking>,
    next_booking_id: i64,
}

/// In-memory inventory store. A transaction takes the single data mutex
/// for its whole lifetime, so transactions fully serialize — the coarse
/// equivalent of the row lock the Postgres store takes on the show.
/// Dropping an uncommitted transaction restores the snapshot taken at
/// `begin`, mirroring rollback.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_show(&self, show_id: i64, total_seats: i32, ticket_price: f64) {
        self.inner.lock().await.shows.insert(
            show_id,
            ShowInventory {
                remaining_seats: total_seats,
                ticket_price,
            },
        );
    }

    pub async fn remaining_seats(&self, show_id: i64) -> Option<i32> {
        self.inner
            .lock()
            .await
            .shows
            .get(&show_id)
            .map(|s| s.remaining_seats)
    }

    pub async fn booking(&self, booking_id: i64) -> Option<Booking> {
        self.inner.lock().await.bookings.get(&booking_id).cloned()
    }

    pub async fn bookings(&self) -> Vec<Booking> {
        self.inner.lock().await.bookings.values().cloned().collect()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn InventoryTx>, Error> {
        let guard = self.inner.clone().lock_owned().await;
        let snapshot = Some(guard.clone());
        Ok(Box::new(MemoryTx { guard, snapshot }))
    }
}

struct MemoryTx {
    guard: OwnedMutexGuard<MemoryData>,
    // Present until commit; restored on drop.
    snapshot: Option<MemoryData>,
}

impl Drop for MemoryTx {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.guard = snapshot;
        }
    }
}

#[async_trait]
impl InventoryTx for MemoryTx {
    async fn lock_show(&mut self, show_id: i64) -> Result<Option<ShowInventory>, Error> {
        Ok(self.guard.shows.get(&show_id).copied())
    }

    async fn insert_booking(&mut self, booking: &NewBooking) -> Result<Booking, Error> {
        let id = self.guard.next_booking_id + 1;
        self.guard.next_booking_id = id;

        let stored = Booking {
            id,
            customer_id: booking.customer_id,
            show_id: booking.show_id,
            seats_booked: booking.seats_booked,
            total_amount: booking.total_amount,
            status: BookingStatus::Confirmed,
            created_at: Utc::now().naive_utc(),
        };
        self.guard.bookings.insert(id, stored.clone());
        Ok(stored)
    }

    async fn adjust_remaining_seats(&mut self, show_id: i64, delta: i32) -> Result<(), Error> {
        if let Some(show) = self.guard.shows.get_mut(&show_id) {
            show.remaining_seats += delta;
        }
        Ok(())
    }

    async fn find_booking(&mut self, booking_id: i64) -> Result<Option<Booking>, Error> {
        Ok(self.guard.bookings.get(&booking_id).cloned())
    }

    async fn mark_cancelled(&mut self, booking_id: i64) -> Result<(), Error> {
        if let Some(booking) = self.guard.bookings.get_mut(&booking_id) {
            booking.status = BookingStatus::Cancelled;
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), Error> {
        let mut tx = self;
        tx.snapshot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dropping_uncommitted_tx_rolls_back() {
        let store = MemoryStore::new();
        store.add_show(1, 50, 10.0).await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.adjust_remaining_seats(1, -20).await.unwrap();
            // dropped without commit
        }

        assert_eq!(store.remaining_seats(1).await, Some(50));
    }

    #[tokio::test]
    async fn committed_tx_persists() {
        let store = MemoryStore::new();
        store.add_show(1, 50, 10.0).await;

        let mut tx = store.begin().await.unwrap();
        tx.adjust_remaining_seats(1, -20).await.unwrap();
        tx.commit().await.unwrap();

        assert_eq!(store.remaining_seats(1).await, Some(30));
    }

    #[tokio::test]
    async fn uncommitted_booking_is_discarded() {
        let store = MemoryStore::new();
        store.add_show(1, 50, 10.0).await;

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_booking(&NewBooking {
                customer_id: 1,
                show_id: 1,
                seats_booked: 2,
                total_amount: 20.0,
            })
            .await
            .unwrap();
        }

        assert!(store.bookings().await.is_empty());
    }
}
