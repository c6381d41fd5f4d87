//! Booking aggregate, status machine and temporal query vocabulary.
//!
//! A booking ties a renter ("booker") to an item for a half-open time window
//! `[start, end)`. Its status only moves along
//! `WAITING -> APPROVED` or `WAITING -> REJECTED`; `CANCELED` is reserved
//! and never entered by the engine.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{BookingId, Item, ItemId, User, UserId};

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Awaiting the owner's decision.
    Waiting,
    /// Accepted by the owner.
    Approved,
    /// Declined by the owner.
    Rejected,
    /// Reserved; never produced by the engine.
    Canceled,
}

impl BookingStatus {
    /// Canonical upper-case name, as stored and rendered.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "WAITING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Canceled => "CANCELED",
        }
    }

    /// Resolve the owner's decision against the current status.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] unless the booking is still waiting.
    ///
    /// # Examples
    /// ```
    /// use shareit_server::domain::{BookingStatus, TransitionError};
    ///
    /// assert_eq!(BookingStatus::Waiting.decide(true), Ok(BookingStatus::Approved));
    /// assert_eq!(BookingStatus::Waiting.decide(false), Ok(BookingStatus::Rejected));
    /// assert_eq!(
    ///     BookingStatus::Approved.decide(false),
    ///     Err(TransitionError::AlreadyApproved)
    /// );
    /// ```
    pub const fn decide(self, approved: bool) -> Result<Self, TransitionError> {
        match self {
            Self::Waiting if approved => Ok(Self::Approved),
            Self::Waiting => Ok(Self::Rejected),
            Self::Approved => Err(TransitionError::AlreadyApproved),
            Self::Rejected => Err(TransitionError::AlreadyRejected),
            Self::Canceled => Err(TransitionError::Canceled),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored status value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown booking status: {0}")]
pub struct ParseBookingStatusError(String);

impl FromStr for BookingStatus {
    type Err = ParseBookingStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(Self::Waiting),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "CANCELED" => Ok(Self::Canceled),
            other => Err(ParseBookingStatusError(other.to_owned())),
        }
    }
}

/// Rejected status transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The booking was approved earlier.
    #[error("already approved")]
    AlreadyApproved,
    /// The booking was rejected earlier.
    #[error("already rejected")]
    AlreadyRejected,
    /// The booking was canceled.
    #[error("booking canceled")]
    Canceled,
}

/// Temporal or status classification requested by `state` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingState {
    /// Every booking.
    All,
    /// Bookings in progress at `now`.
    Current,
    /// Bookings that ended before `now`.
    Past,
    /// Bookings starting after `now`.
    Future,
    /// Bookings awaiting a decision.
    Waiting,
    /// Declined bookings.
    Rejected,
}

/// Error carrying the unrecognised `state` text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown state: {0}")]
pub struct UnsupportedStateError(pub String);

impl FromStr for BookingState {
    type Err = UnsupportedStateError;

    /// Parse the exact upper-case state name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ALL" => Ok(Self::All),
            "CURRENT" => Ok(Self::Current),
            "PAST" => Ok(Self::Past),
            "FUTURE" => Ok(Self::Future),
            "WAITING" => Ok(Self::Waiting),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(UnsupportedStateError(other.to_owned())),
        }
    }
}

/// Sort direction over booking start instants.
///
/// Ties on `start` are broken by booking id in the same direction so that
/// consecutive pages never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingOrder {
    /// Earliest start first.
    StartAscending,
    /// Latest start first.
    StartDescending,
}

impl BookingOrder {
    /// Compare two bookings under this order.
    #[must_use]
    pub fn compare(self, left: &Booking, right: &Booking) -> Ordering {
        let ascending = left
            .start()
            .cmp(&right.start())
            .then_with(|| left.id().cmp(&right.id()));
        match self {
            Self::StartAscending => ascending,
            Self::StartDescending => ascending.reverse(),
        }
    }
}

/// A `state` resolved against a captured `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingFilter {
    /// No predicate.
    All,
    /// `start <= now < end`.
    Current(NaiveDateTime),
    /// `end < now`.
    Past(NaiveDateTime),
    /// `start > now`.
    Future(NaiveDateTime),
    /// Status equality.
    Status(BookingStatus),
}

impl BookingFilter {
    /// Resolve `state` against `now`.
    #[must_use]
    pub const fn resolve(state: BookingState, now: NaiveDateTime) -> Self {
        match state {
            BookingState::All => Self::All,
            BookingState::Current => Self::Current(now),
            BookingState::Past => Self::Past(now),
            BookingState::Future => Self::Future(now),
            BookingState::Waiting => Self::Status(BookingStatus::Waiting),
            BookingState::Rejected => Self::Status(BookingStatus::Rejected),
        }
    }

    /// Whether `booking` satisfies the predicate.
    #[must_use]
    pub fn matches(&self, booking: &Booking) -> bool {
        match *self {
            Self::All => true,
            Self::Current(now) => booking.start() <= now && now < booking.end(),
            Self::Past(now) => booking.end() < now,
            Self::Future(now) => booking.start() > now,
            Self::Status(status) => booking.status() == status,
        }
    }

    /// Result ordering: ascending for current bookings, descending otherwise.
    #[must_use]
    pub const fn order(&self) -> BookingOrder {
        match self {
            Self::Current(_) => BookingOrder::StartAscending,
            _ => BookingOrder::StartDescending,
        }
    }
}

/// Validation failures for booking windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BookingValidationError {
    /// `start` is not strictly before `end`, or not strictly after `now`.
    #[error("invalid dates")]
    InvalidDates,
}

/// Requested booking interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl BookingWindow {
    /// Validate a window for creation at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`BookingValidationError::InvalidDates`] unless
    /// `now < start < end`.
    pub fn for_creation(
        start: NaiveDateTime,
        end: NaiveDateTime,
        now: NaiveDateTime,
    ) -> Result<Self, BookingValidationError> {
        if start >= end || start <= now {
            return Err(BookingValidationError::InvalidDates);
        }
        Ok(Self { start, end })
    }

    /// Window start.
    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Window end.
    #[must_use]
    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }
}

/// Fields required to persist a new booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    /// Booked item.
    pub item_id: ItemId,
    /// Renting user.
    pub booker_id: UserId,
    /// Validated interval.
    pub window: BookingWindow,
    /// Initial status, always [`BookingStatus::Waiting`] from the engine.
    pub status: BookingStatus,
}

/// Booking joined with its item and booker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    id: BookingId,
    item: Item,
    booker: User,
    start: NaiveDateTime,
    end: NaiveDateTime,
    status: BookingStatus,
}

/// Loaded booking fields prior to validation.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    /// Store-assigned identity.
    pub id: BookingId,
    /// Booked item.
    pub item: Item,
    /// Renting user.
    pub booker: User,
    /// Interval start.
    pub start: NaiveDateTime,
    /// Interval end.
    pub end: NaiveDateTime,
    /// Current status.
    pub status: BookingStatus,
}

impl Booking {
    /// Build a booking from loaded fields.
    ///
    /// # Errors
    ///
    /// Returns [`BookingValidationError::InvalidDates`] when `start >= end`.
    pub fn new(draft: BookingDraft) -> Result<Self, BookingValidationError> {
        let BookingDraft {
            id,
            item,
            booker,
            start,
            end,
            status,
        } = draft;
        if start >= end {
            return Err(BookingValidationError::InvalidDates);
        }
        Ok(Self {
            id,
            item,
            booker,
            start,
            end,
            status,
        })
    }

    /// Booking identity.
    #[must_use]
    pub const fn id(&self) -> BookingId {
        self.id
    }

    /// Booked item.
    #[must_use]
    pub const fn item(&self) -> &Item {
        &self.item
    }

    /// Renting user.
    #[must_use]
    pub const fn booker(&self) -> &User {
        &self.booker
    }

    /// Interval start.
    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Interval end.
    #[must_use]
    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> BookingStatus {
        self.status
    }

    /// Whether `user` may read this booking: its booker or the item owner.
    #[must_use]
    pub fn is_visible_to(&self, user: UserId) -> bool {
        self.booker.id == user || self.item.owner_id == user
    }

    /// Copy of this booking carrying `status`.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_status(self, status: BookingStatus) -> Self {
        Self { status, ..self }
    }
}

/// Compact booking view attached to item reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSummary {
    /// Booking identity.
    pub id: BookingId,
    /// Renting user.
    pub booker_id: UserId,
    /// Interval start.
    pub start: NaiveDateTime,
    /// Interval end.
    pub end: NaiveDateTime,
}

impl From<&Booking> for BookingSummary {
    fn from(value: &Booking) -> Self {
        Self {
            id: value.id(),
            booker_id: value.booker().id,
            start: value.start(),
            end: value.end(),
        }
    }
}

#[cfg(test)]
#[path = "booking_tests.rs"]
mod tests;
