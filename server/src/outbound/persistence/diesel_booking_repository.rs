//! PostgreSQL-backed `BookingRepository`.
//!
//! Every read joins the booking with its item and booker. Temporal filters and
//! ordering are pushed into SQL; ties on the start instant are broken by id so
//! that consecutive windows never overlap.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, AsyncPgConnection, RunQueryDsl};
use pagination::Window;

use crate::domain::ports::{BookingPersistenceError, BookingRepository};
use crate::domain::{
    Booking, BookingFilter, BookingId, BookingOrder, BookingStatus, ItemId, NewBooking, UserId,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    BookingRow, ItemRow, JoinedBookingRow, NewBookingRow, UserRow, joined_to_booking,
};
use super::pool::{ConnectionSource, DbPool, PoolError};
use super::schema::{bookings, items, users};

/// `bookings` joined with the booked item and the booker.
macro_rules! joined_bookings {
    () => {
        bookings::table
            .inner_join(items::table.on(items::id.eq(bookings::item_id)))
            .inner_join(users::table.on(users::id.eq(bookings::booker_id)))
            .select((
                BookingRow::as_select(),
                ItemRow::as_select(),
                UserRow::as_select(),
            ))
    };
}

/// Diesel-backed booking repository.
#[derive(Clone)]
pub struct DieselBookingRepository {
    source: ConnectionSource,
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Booker(i64),
    Owner(i64),
}

impl DieselBookingRepository {
    /// Create a repository over the shared pool.
    pub fn new(pool: DbPool) -> Self {
        Self::over(pool.into())
    }

    pub(crate) fn over(source: ConnectionSource) -> Self {
        Self { source }
    }

    async fn list(
        &self,
        side: Side,
        filter: BookingFilter,
        window: Window,
    ) -> Result<Vec<Booking>, BookingPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;

        let mut query = joined_bookings!().into_boxed();
        query = match side {
            Side::Booker(id) => query.filter(bookings::booker_id.eq(id)),
            Side::Owner(id) => query.filter(items::owner_id.eq(id)),
        };
        query = match filter {
            BookingFilter::All => query,
            BookingFilter::Current(now) => query
                .filter(bookings::start_date.le(now))
                .filter(bookings::end_date.gt(now)),
            BookingFilter::Past(now) => query.filter(bookings::end_date.lt(now)),
            BookingFilter::Future(now) => query.filter(bookings::start_date.gt(now)),
            BookingFilter::Status(status) => query.filter(bookings::status.eq(status.as_str())),
        };
        query = match filter.order() {
            BookingOrder::StartAscending => {
                query.order((bookings::start_date.asc(), bookings::id.asc()))
            }
            BookingOrder::StartDescending => {
                query.order((bookings::start_date.desc(), bookings::id.desc()))
            }
        };

        let rows: Vec<JoinedBookingRow> = query
            .offset(window.offset)
            .limit(window.limit)
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        into_bookings(rows)
    }
}

fn pool_error(error: PoolError) -> BookingPersistenceError {
    map_pool_error(error, BookingPersistenceError::connection)
}

fn diesel_error(error: diesel::result::Error) -> BookingPersistenceError {
    map_diesel_error(
        &error,
        BookingPersistenceError::query,
        BookingPersistenceError::connection,
    )
}

fn into_booking(row: JoinedBookingRow) -> Result<Booking, BookingPersistenceError> {
    joined_to_booking(row).map_err(BookingPersistenceError::query)
}

fn into_bookings(rows: Vec<JoinedBookingRow>) -> Result<Vec<Booking>, BookingPersistenceError> {
    rows.into_iter().map(into_booking).collect()
}

async fn load_joined(
    conn: &mut AsyncPgConnection,
    id: i64,
) -> QueryResult<Option<JoinedBookingRow>> {
    joined_bookings!()
        .filter(bookings::id.eq(id))
        .first::<JoinedBookingRow>(conn)
        .await
        .optional()
}

#[async_trait]
impl BookingRepository for DieselBookingRepository {
    async fn insert(&self, booking: &NewBooking) -> Result<Booking, BookingPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        let row = NewBookingRow {
            item_id: booking.item_id.get(),
            booker_id: booking.booker_id.get(),
            start_date: booking.window.start(),
            end_date: booking.window.end(),
            status: booking.status.as_str(),
        };

        let joined = conn
            .transaction(|conn| {
                async move {
                    let id: i64 = diesel::insert_into(bookings::table)
                        .values(row)
                        .returning(bookings::id)
                        .get_result(conn)
                        .await?;
                    load_joined(conn, id).await
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        joined
            .map(into_booking)
            .transpose()?
            .ok_or_else(|| BookingPersistenceError::query("inserted booking vanished"))
    }

    async fn find_by_id(
        &self,
        id: BookingId,
    ) -> Result<Option<Booking>, BookingPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        load_joined(&mut conn, id.get())
            .await
            .map_err(diesel_error)?
            .map(into_booking)
            .transpose()
    }

    async fn transition(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, BookingPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        let raw_id = id.get();

        let joined = conn
            .transaction(|conn| {
                async move {
                    let changed = diesel::update(
                        bookings::table
                            .filter(bookings::id.eq(raw_id))
                            .filter(bookings::status.eq(from.as_str())),
                    )
                    .set(bookings::status.eq(to.as_str()))
                    .execute(conn)
                    .await?;
                    if changed == 0 {
                        return Ok(None);
                    }
                    load_joined(conn, raw_id).await
                }
                .scope_boxed()
            })
            .await
            .map_err(diesel_error)?;

        joined.map(into_booking).transpose()
    }

    async fn list_for_booker(
        &self,
        booker: UserId,
        filter: BookingFilter,
        window: Window,
    ) -> Result<Vec<Booking>, BookingPersistenceError> {
        self.list(Side::Booker(booker.get()), filter, window).await
    }

    async fn list_for_owner(
        &self,
        owner: UserId,
        filter: BookingFilter,
        window: Window,
    ) -> Result<Vec<Booking>, BookingPersistenceError> {
        self.list(Side::Owner(owner.get()), filter, window).await
    }

    async fn find_last_approved(
        &self,
        item: ItemId,
        now: NaiveDateTime,
    ) -> Result<Option<Booking>, BookingPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        joined_bookings!()
            .filter(bookings::item_id.eq(item.get()))
            .filter(bookings::status.eq(BookingStatus::Approved.as_str()))
            .filter(bookings::start_date.lt(now))
            .order((bookings::start_date.desc(), bookings::id.desc()))
            .first::<JoinedBookingRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(into_booking)
            .transpose()
    }

    async fn find_next_approved(
        &self,
        item: ItemId,
        now: NaiveDateTime,
    ) -> Result<Option<Booking>, BookingPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        joined_bookings!()
            .filter(bookings::item_id.eq(item.get()))
            .filter(bookings::status.eq(BookingStatus::Approved.as_str()))
            .filter(bookings::start_date.gt(now))
            .order((bookings::start_date.asc(), bookings::id.asc()))
            .first::<JoinedBookingRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?
            .map(into_booking)
            .transpose()
    }

    async fn list_finished(
        &self,
        booker: UserId,
        item: ItemId,
        now: NaiveDateTime,
    ) -> Result<Vec<Booking>, BookingPersistenceError> {
        let mut conn = self.source.get().await.map_err(pool_error)?;
        let rows: Vec<JoinedBookingRow> = joined_bookings!()
            .filter(bookings::booker_id.eq(booker.get()))
            .filter(bookings::item_id.eq(item.get()))
            .filter(bookings::end_date.lt(now))
            .order(bookings::id.asc())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;
        into_bookings(rows)
    }
}
