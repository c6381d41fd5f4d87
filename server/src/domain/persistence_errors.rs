//! Translation of repository failures into API errors.
//!
//! Connection failures surface as service-unavailable, query failures as
//! internal errors.

use super::Error;
use super::ports::{
    BookingPersistenceError, CommentPersistenceError, ItemPersistenceError,
    ItemRequestPersistenceError, TransactionError, UserPersistenceError,
};

macro_rules! map_connection_and_query {
    ($error:ident, $label:literal) => {
        impl From<$error> for Error {
            fn from(error: $error) -> Self {
                match error {
                    $error::Connection { message } => Self::service_unavailable(format!(
                        concat!($label, " repository unavailable: {}"),
                        message
                    )),
                    $error::Query { message } => Self::internal(format!(
                        concat!($label, " repository error: {}"),
                        message
                    )),
                }
            }
        }
    };
}

map_connection_and_query!(ItemPersistenceError, "item");
map_connection_and_query!(BookingPersistenceError, "booking");
map_connection_and_query!(CommentPersistenceError, "comment");
map_connection_and_query!(ItemRequestPersistenceError, "request");

impl From<UserPersistenceError> for Error {
    fn from(error: UserPersistenceError) -> Self {
        match error {
            UserPersistenceError::Connection { message } => {
                Self::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Self::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::EmailConflict { email } => {
                Self::conflict(format!("Email {email} already in use"))
            }
        }
    }
}

impl From<TransactionError> for Error {
    fn from(error: TransactionError) -> Self {
        match error {
            TransactionError::Connection { message } => {
                Self::service_unavailable(format!("store unavailable: {message}"))
            }
            TransactionError::Query { message } => {
                Self::internal(format!("transaction error: {message}"))
            }
        }
    }
}
