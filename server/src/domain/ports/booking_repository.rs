//! Port abstraction for booking persistence adapters.
//!
//! Adapters own the temporal queries of the booking engine: selection by
//! [`BookingFilter`], ordering by [`BookingFilter::order`] and windowing.
//!
//! [`BookingFilter::order`]: crate::domain::BookingFilter::order

use async_trait::async_trait;
use chrono::NaiveDateTime;
use pagination::Window;

use crate::domain::{Booking, BookingFilter, BookingId, BookingStatus, ItemId, NewBooking, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by booking repository adapters.
    pub enum BookingPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "booking repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "booking repository query failed: {message}",
    }
}

/// Port for the booking engine's writes and temporal reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Insert a booking and return it joined with item and booker.
    async fn insert(&self, booking: &NewBooking) -> Result<Booking, BookingPersistenceError>;

    /// Fetch a booking joined with item and booker.
    async fn find_by_id(&self, id: BookingId)
    -> Result<Option<Booking>, BookingPersistenceError>;

    /// Atomically move a booking from `from` to `to`.
    ///
    /// Returns `None` when the booking no longer carries `from`.
    async fn transition(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, BookingPersistenceError>;

    /// Bookings made by `booker` matching `filter`, ordered and windowed.
    async fn list_for_booker(
        &self,
        booker: UserId,
        filter: BookingFilter,
        window: Window,
    ) -> Result<Vec<Booking>, BookingPersistenceError>;

    /// Bookings on items owned by `owner` matching `filter`, ordered and windowed.
    async fn list_for_owner(
        &self,
        owner: UserId,
        filter: BookingFilter,
        window: Window,
    ) -> Result<Vec<Booking>, BookingPersistenceError>;

    /// Approved booking on `item` with the greatest `start < now`.
    async fn find_last_approved(
        &self,
        item: ItemId,
        now: NaiveDateTime,
    ) -> Result<Option<Booking>, BookingPersistenceError>;

    /// Approved booking on `item` with the least `start > now`.
    async fn find_next_approved(
        &self,
        item: ItemId,
        now: NaiveDateTime,
    ) -> Result<Option<Booking>, BookingPersistenceError>;

    /// Bookings of `item` by `booker` with `end < now`, any status.
    async fn list_finished(
        &self,
        booker: UserId,
        item: ItemId,
        now: NaiveDateTime,
    ) -> Result<Vec<Booking>, BookingPersistenceError>;
}
