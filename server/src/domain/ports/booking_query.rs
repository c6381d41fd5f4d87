//! Driving port for booking reads.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Booking, BookingId, Error, UserId};

/// Whose bookings a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAudience {
    /// Bookings the caller made.
    Booker,
    /// Bookings on items the caller owns.
    Owner,
}

/// Temporal listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListBookingsRequest {
    /// Calling user; must exist.
    pub caller: UserId,
    /// Booker-side or owner-side listing.
    pub audience: BookingAudience,
    /// Raw `state` text, parsed by the service.
    pub state: String,
    /// Requested window.
    pub page: PageRequest,
}

/// Driving port for booking lookups and temporal listings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingQuery: Send + Sync {
    /// Fetch one booking visible to `caller` (its booker or the item owner).
    async fn get_booking(&self, caller: UserId, id: BookingId) -> Result<Booking, Error>;

    /// List bookings by state for the booker or owner side.
    async fn list_bookings(&self, request: ListBookingsRequest) -> Result<Vec<Booking>, Error>;
}
