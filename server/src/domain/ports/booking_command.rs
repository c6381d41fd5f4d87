//! Driving port for the booking lifecycle.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::domain::{Booking, BookingId, Error, ItemId, UserId};

/// Booking requested by `booker` for `item_id` over `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBookingRequest {
    /// Renting user.
    pub booker: UserId,
    /// Item to rent.
    pub item_id: ItemId,
    /// Requested start.
    pub start: NaiveDateTime,
    /// Requested end.
    pub end: NaiveDateTime,
}

/// Owner decision on a waiting booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecideBookingRequest {
    /// Calling user; must own the booked item.
    pub caller: UserId,
    /// Target booking.
    pub booking_id: BookingId,
    /// `true` approves, `false` rejects.
    pub approved: bool,
}

/// Driving port for creating bookings and recording owner decisions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingCommand: Send + Sync {
    /// Create a waiting booking.
    ///
    /// Checks run in a fixed order: booker exists, item exists, item is
    /// available, dates are valid, booker is not the owner.
    async fn create_booking(&self, request: CreateBookingRequest) -> Result<Booking, Error>;

    /// Approve or reject a waiting booking.
    async fn decide_booking(&self, request: DecideBookingRequest) -> Result<Booking, Error>;
}
