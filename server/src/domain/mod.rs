//! Domain primitives, aggregates and services.
//!
//! Purpose: define the ShareIt entities (users, items, bookings, comments and
//! item requests), the booking engine's status machine and temporal query
//! vocabulary, and the services implementing the driving ports. Types here
//! never depend on HTTP or persistence details.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifier.
//! - Booking, BookingStatus, BookingState, BookingFilter: booking engine core.
//! - UserService, ItemService, BookingService, ItemRequestService: services.

pub mod booking;
pub mod comment;
pub mod error;
pub mod ids;
pub mod item;
pub mod item_request;
pub mod ports;
pub mod trace_id;
pub mod user;

mod booking_service;
mod item_request_service;
mod item_service;
mod persistence_errors;
mod transaction;
mod user_service;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use self::booking::{
    Booking, BookingDraft, BookingFilter, BookingOrder, BookingState, BookingStatus,
    BookingSummary, BookingValidationError, BookingWindow, NewBooking, ParseBookingStatusError,
    TransitionError, UnsupportedStateError,
};
pub use self::booking_service::BookingService;
pub use self::comment::{Comment, NewComment};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{BookingId, CommentId, ItemId, RequestId, UserId};
pub use self::item::{Item, ItemDetails, ItemPatch, NewItem};
pub use self::item_request::{ItemRequest, ItemRequestDetails, NewItemRequest};
pub use self::item_request_service::ItemRequestService;
pub use self::item_service::ItemService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{NewUser, User, UserPatch};
pub use self::user_service::UserService;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use shareit_server::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::not_found("user 7 not found"))
/// }
/// assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
