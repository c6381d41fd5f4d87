//! Persistence adapters: Diesel/PostgreSQL and an in-process store.

mod diesel_booking_repository;
mod diesel_comment_repository;
mod diesel_error_mapping;
mod diesel_item_repository;
mod diesel_item_request_repository;
mod diesel_unit_of_work;
mod diesel_user_repository;
mod in_memory;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_booking_repository::DieselBookingRepository;
pub use diesel_comment_repository::DieselCommentRepository;
pub use diesel_item_repository::DieselItemRepository;
pub use diesel_item_request_repository::DieselItemRequestRepository;
pub use diesel_unit_of_work::DieselUnitOfWork;
pub use diesel_user_repository::DieselUserRepository;
pub use in_memory::InMemoryStore;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, OwnedConnection, PoolConfig, PoolError};

