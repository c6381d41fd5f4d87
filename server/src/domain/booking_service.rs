//! Booking engine service.
//!
//! Owns the booking lifecycle (create, approve or reject) and the temporal
//! listings by booker and by owner. Each call captures `now` from the injected
//! clock exactly once so the predicate and the result set agree.
//!
//! The item service consults the engine through [`approved_neighbours`] and
//! [`has_finished_rental`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use mockable::Clock;
use pagination::PagingMode;
use tracing::{info, warn};

use crate::domain::ports::{
    BookingAudience, BookingCommand, BookingQuery, BookingRepository, CreateBookingRequest,
    DecideBookingRequest, ListBookingsRequest, Repositories, TransactionMode, UnitOfWork,
};
use crate::domain::transaction::{finish, open};
use crate::domain::user_service::user_not_found;
use crate::domain::{
    Booking, BookingFilter, BookingId, BookingState, BookingStatus, BookingSummary,
    BookingWindow, Error, ItemId, NewBooking, UnsupportedStateError, UserId,
};

/// Booking engine implementing [`BookingCommand`] and [`BookingQuery`].
///
/// Every call runs in one transaction, so availability and ownership checks
/// see the same snapshot as the write that follows them.
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn UnitOfWork>,
    clock: Arc<dyn Clock>,
    paging: PagingMode,
}

impl BookingService {
    /// Create the engine over the shared store.
    pub fn new(store: Arc<dyn UnitOfWork>, clock: Arc<dyn Clock>, paging: PagingMode) -> Self {
        Self {
            store,
            clock,
            paging,
        }
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.local().naive_local()
    }

    async fn create(
        &self,
        repos: &Repositories,
        request: CreateBookingRequest,
    ) -> Result<Booking, Error> {
        let now = self.now();
        require_user(repos, request.booker).await?;
        let item = repos
            .items
            .find_by_id(request.item_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("item {} not found", request.item_id)))?;
        if !item.available {
            return Err(Error::invalid_request("item unavailable"));
        }
        let window = BookingWindow::for_creation(request.start, request.end, now)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if item.is_owned_by(request.booker) {
            return Err(Error::not_found(format!(
                "item {} is not available for booking by user {}",
                item.id, request.booker
            )));
        }

        let booking = repos
            .bookings
            .insert(&NewBooking {
                item_id: item.id,
                booker_id: request.booker,
                window,
                status: BookingStatus::Waiting,
            })
            .await?;
        info!(
            booking_id = %booking.id(),
            item_id = %item.id,
            booker_id = %request.booker,
            "booking created"
        );
        Ok(booking)
    }

    async fn decide(
        &self,
        repos: &Repositories,
        request: DecideBookingRequest,
    ) -> Result<Booking, Error> {
        let booking = load(repos, request.booking_id).await?;
        if !booking.item().is_owned_by(request.caller) {
            return Err(Error::not_found(format!(
                "user {} does not own item {}",
                request.caller,
                booking.item().id
            )));
        }
        let current = booking.status();
        let next = current
            .decide(request.approved)
            .map_err(|err| Error::invalid_request(err.to_string()))?;

        let Some(updated) = repos.bookings.transition(booking.id(), current, next).await? else {
            return Err(lost_race(repos, booking.id(), request.approved).await);
        };
        info!(booking_id = %updated.id(), status = %next, "booking decided");
        Ok(updated)
    }

    async fn list(
        &self,
        repos: &Repositories,
        request: ListBookingsRequest,
    ) -> Result<Vec<Booking>, Error> {
        let state: BookingState = request
            .state
            .parse()
            .map_err(|UnsupportedStateError(raw)| Error::unsupported_state(&raw))?;
        require_user(repos, request.caller).await?;

        let filter = BookingFilter::resolve(state, self.now());
        let window = request.page.window(self.paging);
        let bookings = match request.audience {
            BookingAudience::Booker => {
                repos
                    .bookings
                    .list_for_booker(request.caller, filter, window)
                    .await?
            }
            BookingAudience::Owner => {
                repos
                    .bookings
                    .list_for_owner(request.caller, filter, window)
                    .await?
            }
        };
        Ok(bookings)
    }
}

async fn require_user(repos: &Repositories, id: UserId) -> Result<(), Error> {
    repos
        .users
        .find_by_id(id)
        .await?
        .map(|_| ())
        .ok_or_else(|| user_not_found(id))
}

async fn load(repos: &Repositories, id: BookingId) -> Result<Booking, Error> {
    repos
        .bookings
        .find_by_id(id)
        .await?
        .ok_or_else(|| booking_not_found(id))
}

/// Explain why a conditional transition matched no row.
async fn lost_race(repos: &Repositories, id: BookingId, approved: bool) -> Error {
    let reloaded = match load(repos, id).await {
        Ok(booking) => booking,
        Err(error) => return error,
    };
    warn!(booking_id = %id, status = %reloaded.status(), "concurrent booking decision");
    match reloaded.status().decide(approved) {
        Err(transition) => Error::invalid_request(transition.to_string()),
        Ok(_) => Error::internal(format!("booking {id} changed during decision")),
    }
}

fn booking_not_found(id: BookingId) -> Error {
    Error::not_found(format!("booking {id} not found"))
}

/// Last and next approved bookings of `item` relative to `now`.
///
/// # Errors
///
/// Propagates repository failures.
pub(crate) async fn approved_neighbours(
    bookings: &dyn BookingRepository,
    item: ItemId,
    now: NaiveDateTime,
) -> Result<(Option<BookingSummary>, Option<BookingSummary>), Error> {
    let last = bookings.find_last_approved(item, now).await?;
    let next = bookings.find_next_approved(item, now).await?;
    Ok((
        last.as_ref().map(BookingSummary::from),
        next.as_ref().map(BookingSummary::from),
    ))
}

/// Whether `booker` holds a booking of `item` that ended before `now`.
///
/// The booking status is not inspected.
///
/// # Errors
///
/// Propagates repository failures.
pub(crate) async fn has_finished_rental(
    bookings: &dyn BookingRepository,
    booker: UserId,
    item: ItemId,
    now: NaiveDateTime,
) -> Result<bool, Error> {
    let finished = bookings.list_finished(booker, item, now).await?;
    Ok(!finished.is_empty())
}

#[async_trait]
impl BookingCommand for BookingService {
    async fn create_booking(&self, request: CreateBookingRequest) -> Result<Booking, Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadWrite).await?;
        let outcome = self.create(tx.repositories(), request).await;
        finish(tx, outcome).await
    }

    async fn decide_booking(&self, request: DecideBookingRequest) -> Result<Booking, Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadWrite).await?;
        let outcome = self.decide(tx.repositories(), request).await;
        finish(tx, outcome).await
    }
}

#[async_trait]
impl BookingQuery for BookingService {
    async fn get_booking(&self, caller: UserId, id: BookingId) -> Result<Booking, Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadOnly).await?;
        let outcome = load(tx.repositories(), id).await.and_then(|booking| {
            if booking.is_visible_to(caller) {
                Ok(booking)
            } else {
                Err(booking_not_found(id))
            }
        });
        finish(tx, outcome).await
    }

    async fn list_bookings(&self, request: ListBookingsRequest) -> Result<Vec<Booking>, Error> {
        let tx = open(self.store.as_ref(), TransactionMode::ReadOnly).await?;
        let outcome = self.list(tx.repositories(), request).await;
        finish(tx, outcome).await
    }
}

#[cfg(test)]
#[path = "booking_service_tests.rs"]
mod tests;
