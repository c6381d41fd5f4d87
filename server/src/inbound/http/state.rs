//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see driving ports, so
//! they stay testable with mocks.

use std::sync::Arc;

use mockable::Clock;
use pagination::PagingMode;

use crate::domain::ports::{
    BookingCommand, BookingQuery, ItemCommand, ItemQuery, ItemRequestCommand, ItemRequestQuery,
    UnitOfWork, UserCommand, UsersQuery,
};
use crate::domain::{
    BookingService, Error, ErrorCode, ItemRequestService, ItemService, UserService,
};

/// Parameter object bundling every driving port.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserCommand>,
    pub users_query: Arc<dyn UsersQuery>,
    pub items: Arc<dyn ItemCommand>,
    pub items_query: Arc<dyn ItemQuery>,
    pub bookings: Arc<dyn BookingCommand>,
    pub bookings_query: Arc<dyn BookingQuery>,
    pub requests: Arc<dyn ItemRequestCommand>,
    pub requests_query: Arc<dyn ItemRequestQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserCommand>,
    pub users_query: Arc<dyn UsersQuery>,
    pub items: Arc<dyn ItemCommand>,
    pub items_query: Arc<dyn ItemQuery>,
    pub bookings: Arc<dyn BookingCommand>,
    pub bookings_query: Arc<dyn BookingQuery>,
    pub requests: Arc<dyn ItemRequestCommand>,
    pub requests_query: Arc<dyn ItemRequestQuery>,
    unsupported_state_as_bad_request: bool,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Build state from explicit port implementations.
    #[must_use]
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            users,
            users_query,
            items,
            items_query,
            bookings,
            bookings_query,
            requests,
            requests_query,
        } = ports;
        Self {
            users,
            users_query,
            items,
            items_query,
            bookings,
            bookings_query,
            requests,
            requests_query,
            unsupported_state_as_bad_request: false,
        }
    }

    /// Wire the domain services over `store`.
    #[must_use]
    pub fn from_store(
        store: &Arc<dyn UnitOfWork>,
        clock: &Arc<dyn Clock>,
        paging: PagingMode,
    ) -> Self {
        let users = Arc::new(UserService::new(store.clone()));
        let items = Arc::new(ItemService::new(store.clone(), clock.clone(), paging));
        let bookings = Arc::new(BookingService::new(store.clone(), clock.clone(), paging));
        let requests = Arc::new(ItemRequestService::new(store.clone(), clock.clone(), paging));
        Self::new(HttpStatePorts {
            users: users.clone(),
            users_query: users,
            items: items.clone(),
            items_query: items,
            bookings: bookings.clone(),
            bookings_query: bookings,
            requests: requests.clone(),
            requests_query: requests,
        })
    }

    /// Answer unknown booking states with 400 instead of 500.
    #[must_use]
    pub const fn with_unsupported_state_as_bad_request(mut self, enabled: bool) -> Self {
        self.unsupported_state_as_bad_request = enabled;
        self
    }

    /// Re-label an unsupported-state error when the 400 mapping is enabled.
    #[must_use]
    pub fn surface(&self, error: Error) -> Error {
        if self.unsupported_state_as_bad_request && error.code() == ErrorCode::UnsupportedState {
            error.with_code(ErrorCode::InvalidRequest)
        } else {
            error
        }
    }
}
