//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`) are implemented by outbound persistence
//! adapters and reached through a [`UnitOfWork`] transaction. Driving ports
//! (`*Command`, `*Query`) are implemented by the domain services and consumed
//! by the HTTP layer.

use std::sync::Arc;

mod macros;
pub(crate) use macros::define_port_error;

mod booking_command;
mod booking_query;
mod booking_repository;
mod comment_repository;
mod item_command;
mod item_query;
mod item_repository;
mod item_request_command;
mod item_request_query;
mod item_request_repository;
mod unit_of_work;
mod user_command;
mod user_repository;
mod users_query;

#[cfg(test)]
pub use booking_command::MockBookingCommand;
pub use booking_command::{BookingCommand, CreateBookingRequest, DecideBookingRequest};
#[cfg(test)]
pub use booking_query::MockBookingQuery;
pub use booking_query::{BookingAudience, BookingQuery, ListBookingsRequest};
#[cfg(test)]
pub use booking_repository::MockBookingRepository;
pub use booking_repository::{BookingPersistenceError, BookingRepository};
#[cfg(test)]
pub use comment_repository::MockCommentRepository;
pub use comment_repository::{CommentPersistenceError, CommentRepository};
#[cfg(test)]
pub use item_command::MockItemCommand;
pub use item_command::{AddCommentRequest, ItemCommand, UpdateItemRequest};
#[cfg(test)]
pub use item_query::MockItemQuery;
pub use item_query::ItemQuery;
#[cfg(test)]
pub use item_repository::MockItemRepository;
pub use item_repository::{ItemPersistenceError, ItemRepository};
#[cfg(test)]
pub use item_request_command::MockItemRequestCommand;
pub use item_request_command::ItemRequestCommand;
#[cfg(test)]
pub use item_request_query::MockItemRequestQuery;
pub use item_request_query::ItemRequestQuery;
#[cfg(test)]
pub use item_request_repository::MockItemRequestRepository;
pub use item_request_repository::{ItemRequestPersistenceError, ItemRequestRepository};
#[cfg(test)]
pub use user_command::MockUserCommand;
pub use user_command::UserCommand;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
pub use unit_of_work::{Transaction, TransactionError, TransactionMode, UnitOfWork};
#[cfg(test)]
pub use users_query::MockUsersQuery;
pub use users_query::UsersQuery;

/// Repository ports bound to one transaction.
#[derive(Clone)]
pub struct Repositories {
    /// User store.
    pub users: Arc<dyn UserRepository>,
    /// Item store.
    pub items: Arc<dyn ItemRepository>,
    /// Booking store.
    pub bookings: Arc<dyn BookingRepository>,
    /// Comment store.
    pub comments: Arc<dyn CommentRepository>,
    /// Item request store.
    pub requests: Arc<dyn ItemRequestRepository>,
}
