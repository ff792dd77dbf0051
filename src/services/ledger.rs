//! Booking ledger: the one place that moves a show's remaining-seats
//! counter. Both operations run as a single store transaction; the show
//! row stays locked from the inventory read to the commit, so two
//! concurrent bookings can never overcommit a show below zero seats.

use std::sync::Arc;

use tracing::info;

use crate::error::Error;
use crate::models::{Booking, BookingStatus};
use crate::store::{InventoryStore, NewBooking};

#[derive(Clone)]
pub struct BookingLedger {
    store: Arc<dyn InventoryStore>,
}

impl BookingLedger {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Books `seat_count` seats on a show for a customer.
    ///
    /// The booking is inserted CONFIRMED with
    /// `total_amount = seat_count * ticket_price` (price read inside the
    /// transaction). A request for more seats than remain fails with
    /// `InsufficientSeats` and writes nothing.
    pub async fn create_booking(
        &self,
        customer_id: i64,
        show_id: i64,
        seat_count: i32,
    ) -> Result<Booking, Error> {
        // Validation happens before any transaction is opened.
        if seat_count <= 0 {
            return Err(Error::Validation(
                "seat count must be greater than zero".into(),
            ));
        }

        let mut tx = self.store.begin().await?;

        let show = tx
            .lock_show(show_id)
            .await?
            .ok_or(Error::NotFound("show"))?;

        if show.remaining_seats < seat_count {
            // tx drops here: rollback, no writes
            return Err(Error::InsufficientSeats {
                requested: seat_count,
                available: show.remaining_seats,
            });
        }

        let booking = tx
            .insert_booking(&NewBooking {
                customer_id,
                show_id,
                seats_booked: seat_count,
                total_amount: f64::from(seat_count) * show.ticket_price,
            })
            .await?;
        tx.adjust_remaining_seats(show_id, -seat_count).await?;
        tx.commit().await?;

        info!(
            booking_id = booking.id,
            show_id,
            seats = seat_count,
            "booking confirmed"
        );
        Ok(booking)
    }

    /// Cancels a CONFIRMED booking and releases its seats back to the
    /// show. A booking that is absent or already CANCELLED reports
    /// NotFound — seats are never restored twice.
    pub async fn cancel_booking(&self, booking_id: i64) -> Result<(), Error> {
        let mut tx = self.store.begin().await?;

        let booking = tx
            .find_booking(booking_id)
            .await?
            .filter(|b| b.status == BookingStatus::Confirmed)
            .ok_or(Error::NotFound("booking"))?;

        tx.mark_cancelled(booking_id).await?;
        tx.adjust_remaining_seats(booking.show_id, booking.seats_booked)
            .await?;
        tx.commit().await?;

        info!(
            booking_id,
            show_id = booking.show_id,
            seats = booking.seats_booked,
            "booking cancelled"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const SHOW: i64 = 1;
    const CUSTOMER: i64 = 7;

    fn ledger_with(store: &MemoryStore) -> BookingLedger {
        BookingLedger::new(Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn booking_reserves_seats_and_prices_the_total() {
        let store = MemoryStore::new();
        store.add_show(SHOW, 100, 25.5).await;
        let ledger = ledger_with(&store);

        let booking = ledger.create_booking(CUSTOMER, SHOW, 30).await.unwrap();

        assert_eq!(booking.seats_booked, 30);
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(booking.total_amount, 30.0 * 25.5);
        assert_eq!(store.remaining_seats(SHOW).await, Some(70));
    }

    #[tokio::test]
    async fn overbooking_is_rejected_and_writes_nothing() {
        let store = MemoryStore::new();
        store.add_show(SHOW, 100, 25.5).await;
        let ledger = ledger_with(&store);

        ledger.create_booking(CUSTOMER, SHOW, 30).await.unwrap();

        let err = ledger.create_booking(CUSTOMER, SHOW, 80).await.unwrap_err();
        assert!(matches!(
            err,
            Error::InsufficientSeats {
                requested: 80,
                available: 70
            }
        ));
        assert_eq!(store.remaining_seats(SHOW).await, Some(70));
        assert_eq!(store.bookings().await.len(), 1);
    }

    #[tokio::test]
    async fn cancel_restores_exactly_the_booked_seats() {
        let store = MemoryStore::new();
        store.add_show(SHOW, 100, 10.0).await;
        let ledger = ledger_with(&store);

        let booking = ledger.create_booking(CUSTOMER, SHOW, 30).await.unwrap();
        assert_eq!(store.remaining_seats(SHOW).await, Some(70));

        ledger.cancel_booking(booking.id).await.unwrap();

        assert_eq!(store.remaining_seats(SHOW).await, Some(100));
        assert_eq!(
            store.booking(booking.id).await.unwrap().status,
            BookingStatus::Cancelled
        );
    }

    #[tokio::test]
    async fn second_cancel_is_not_found_and_does_not_double_restore() {
        let store = MemoryStore::new();
        store.add_show(SHOW, 100, 10.0).await;
        let ledger = ledger_with(&store);

        let booking = ledger.create_booking(CUSTOMER, SHOW, 30).await.unwrap();
        ledger.cancel_booking(booking.id).await.unwrap();

        let err = ledger.cancel_booking(booking.id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert_eq!(store.remaining_seats(SHOW).await, Some(100));
    }

    #[tokio::test]
    async fn cancelling_unknown_booking_is_not_found() {
        let store = MemoryStore::new();
        store.add_show(SHOW, 100, 10.0).await;
        let ledger = ledger_with(&store);

        let err = ledger.cancel_booking(999).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn non_positive_seat_count_is_rejected_before_any_transaction() {
        let store = MemoryStore::new();
        store.add_show(SHOW, 100, 10.0).await;
        let ledger = ledger_with(&store);

        for seats in [0, -5] {
            let err = ledger
                .create_booking(CUSTOMER, SHOW, seats)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }
        assert_eq!(store.remaining_seats(SHOW).await, Some(100));
    }

    #[tokio::test]
    async fn booking_unknown_show_is_not_found() {
        let store = MemoryStore::new();
        let ledger = ledger_with(&store);

        let err = ledger.create_booking(CUSTOMER, 42, 2).await.unwrap_err();
        assert!(matches!(err, Error::NotFound("show")));
    }

    #[tokio::test]
    async fn concurrent_bookings_never_overcommit() {
        let store = MemoryStore::new();
        store.add_show(SHOW, 10, 10.0).await;
        let ledger = ledger_with(&store);

        let (a, b) = tokio::join!(
            ledger.create_booking(CUSTOMER, SHOW, 6),
            ledger.create_booking(CUSTOMER + 1, SHOW, 6),
        );

        let successes = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one of two 6-seat bookings fits in 10");

        let confirmed: i32 = store
            .bookings()
            .await
            .iter()
            .filter(|b| b.status == BookingStatus::Confirmed)
            .map(|b| b.seats_booked)
            .sum();
        assert_eq!(store.remaining_seats(SHOW).await, Some(10 - confirmed));
        assert!(confirmed <= 10);
    }
}
