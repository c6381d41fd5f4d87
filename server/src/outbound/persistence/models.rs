//! Internal Diesel row structs and their conversions to domain types.
//!
//! Rows never leave the persistence layer.

use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::{
    Booking, BookingDraft, BookingId, BookingStatus, Comment, CommentId, Item, ItemId,
    ItemRequest, RequestId, User, UserId,
};

use super::schema::{bookings, comments, items, requests, users};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserFields<'a> {
    pub name: &'a str,
    pub email: &'a str,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            name: row.name,
            email: row.email,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ItemRow {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: String,
    pub available: bool,
    pub request_id: Option<i64>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = items)]
pub(crate) struct NewItemRow<'a> {
    pub owner_id: i64,
    pub name: &'a str,
    pub description: &'a str,
    pub available: bool,
    pub request_id: Option<i64>,
}

/// Owner and request links are immutable, so only these columns change.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = items)]
pub(crate) struct ItemUpdate<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub available: bool,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            id: ItemId::new(row.id),
            owner_id: UserId::new(row.owner_id),
            name: row.name,
            description: row.description,
            available: row.available,
            request_id: row.request_id.map(RequestId::new),
        }
    }
}

/// Item and booker identities come from the joined rows.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bookings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookingRow {
    pub id: i64,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub status: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bookings)]
pub(crate) struct NewBookingRow<'a> {
    pub item_id: i64,
    pub booker_id: i64,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub status: &'a str,
}

/// A booking joined with its item and booker.
pub(crate) type JoinedBookingRow = (BookingRow, ItemRow, UserRow);

/// Rebuild a validated booking from its joined rows.
pub(crate) fn joined_to_booking(row: JoinedBookingRow) -> Result<Booking, String> {
    let (booking, item, booker) = row;
    let status = BookingStatus::from_str(&booking.status).map_err(|err| err.to_string())?;
    Booking::new(BookingDraft {
        id: BookingId::new(booking.id),
        item: item.into(),
        booker: booker.into(),
        start: booking.start_date,
        end: booking.end_date,
        status,
    })
    .map_err(|err| format!("booking {}: {err}", booking.id))
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CommentRow {
    pub id: i64,
    pub item_id: i64,
    pub author_id: i64,
    pub text: String,
    pub created: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub(crate) struct NewCommentRow<'a> {
    pub item_id: i64,
    pub author_id: i64,
    pub text: &'a str,
    pub created: NaiveDateTime,
}

impl CommentRow {
    /// Attach the author's display name read alongside the row.
    pub(crate) fn with_author(self, author_name: String) -> Comment {
        Comment {
            id: CommentId::new(self.id),
            item_id: ItemId::new(self.item_id),
            author_id: UserId::new(self.author_id),
            author_name,
            text: self.text,
            created: self.created,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RequestRow {
    pub id: i64,
    pub requestor_id: i64,
    pub description: String,
    pub created: NaiveDateTime,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = requests)]
pub(crate) struct NewRequestRow<'a> {
    pub requestor_id: i64,
    pub description: &'a str,
    pub created: NaiveDateTime,
}

impl From<RequestRow> for ItemRequest {
    fn from(row: RequestRow) -> Self {
        Self {
            id: RequestId::new(row.id),
            requestor_id: UserId::new(row.requestor_id),
            description: row.description,
            created: row.created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn instant(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, day)
            .and_then(|date| date.and_hms_opt(10, 0, 0))
            .expect("valid instant")
    }

    fn joined(status: &str, start: u32, end: u32) -> JoinedBookingRow {
        (
            BookingRow {
                id: 3,
                start_date: instant(start),
                end_date: instant(end),
                status: status.to_owned(),
            },
            ItemRow {
                id: 1,
                owner_id: 1,
                name: "Drill".into(),
                description: "Cordless".into(),
                available: true,
                request_id: Some(4),
            },
            UserRow {
                id: 2,
                name: "Bea".into(),
                email: "bea@example.com".into(),
            },
        )
    }

    #[rstest]
    fn joined_rows_become_bookings() {
        let booking = joined_to_booking(joined("APPROVED", 1, 2)).expect("valid rows");
        assert_eq!(booking.status(), BookingStatus::Approved);
        assert_eq!(booking.item().request_id, Some(RequestId::new(4)));
        assert_eq!(booking.booker().email, "bea@example.com");
    }

    #[rstest]
    #[case("PENDING", 1, 2)]
    #[case("WAITING", 2, 2)]
    fn corrupt_rows_are_rejected(#[case] status: &str, #[case] start: u32, #[case] end: u32) {
        assert!(joined_to_booking(joined(status, start, end)).is_err());
    }
}
