//! Booking endpoints: creation, owner decisions and temporal listings.
//!
//! ```text
//! POST  /bookings {"itemId":1,"start":"2024-07-01T10:00:00","end":"2024-07-02T10:00:00"}
//! PATCH /bookings/1?approved=true
//! GET   /bookings?state=CURRENT&from=0&size=10
//! GET   /bookings/owner?state=ALL
//! ```

use actix_web::{get, patch, post, web};
use chrono::NaiveDateTime;
use pagination::{DEFAULT_SIZE, PageQuery};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{
    BookingAudience, CreateBookingRequest, DecideBookingRequest, ListBookingsRequest,
};
use crate::domain::{Booking, BookingId, ItemId, UserId};

use super::error::{ApiResult, ErrorBody};
use super::items::ItemDto;
use super::page_request;
use super::sharer::Sharer;
use super::state::HttpState;
use super::timestamp;
use super::users::UserDto;

/// Booking joined with its item and booker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    pub id: i64,
    #[serde(with = "timestamp")]
    #[schema(value_type = String, example = "2024-07-01T10:00:00")]
    pub start: NaiveDateTime,
    #[serde(with = "timestamp")]
    #[schema(value_type = String, example = "2024-07-02T10:00:00")]
    pub end: NaiveDateTime,
    #[schema(example = "WAITING")]
    pub status: String,
    pub item: ItemDto,
    pub booker: UserDto,
}

impl From<Booking> for BookingDto {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id().get(),
            start: booking.start(),
            end: booking.end(),
            status: booking.status().as_str().to_owned(),
            item: booking.item().clone().into(),
            booker: booking.booker().clone().into(),
        }
    }
}

/// Body of `POST /bookings`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBookingBody {
    pub item_id: i64,
    #[serde(with = "timestamp")]
    #[schema(value_type = String)]
    pub start: NaiveDateTime,
    #[serde(with = "timestamp")]
    #[schema(value_type = String)]
    pub end: NaiveDateTime,
}

/// Query of `PATCH /bookings/{id}`.
#[derive(Debug, Deserialize)]
pub struct DecisionQuery {
    pub approved: bool,
}

/// Query of the booking listings.
#[derive(Debug, Default, Deserialize)]
pub struct StateQuery {
    pub state: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

/// Request a booking of someone else's available item.
#[utoipa::path(
    post,
    path = "/bookings",
    request_body = NewBookingBody,
    params(("X-Sharer-User-Id" = i64, Header, description = "Booking user")),
    responses(
        (status = 200, description = "Waiting booking", body = BookingDto),
        (status = 400, description = "Item unavailable or invalid dates", body = ErrorBody),
        (status = 404, description = "Unknown user or item, or own item", body = ErrorBody)
    ),
    tags = ["bookings"],
    operation_id = "createBooking"
)]
#[post("/bookings")]
pub async fn create_booking(
    state: web::Data<HttpState>,
    Sharer(booker): Sharer,
    payload: web::Json<NewBookingBody>,
) -> ApiResult<web::Json<BookingDto>> {
    let NewBookingBody {
        item_id,
        start,
        end,
    } = payload.into_inner();
    let booking = state
        .bookings
        .create_booking(CreateBookingRequest {
            booker,
            item_id: ItemId::new(item_id),
            start,
            end,
        })
        .await?;
    Ok(web::Json(booking.into()))
}

/// Approve or reject a waiting booking; only the item owner may.
#[utoipa::path(
    patch,
    path = "/bookings/{id}",
    params(
        ("id" = i64, Path, description = "Booking identifier"),
        ("approved" = bool, Query, description = "Approve when true, reject otherwise"),
        ("X-Sharer-User-Id" = i64, Header, description = "Item owner")
    ),
    responses(
        (status = 200, description = "Decided booking", body = BookingDto),
        (status = 400, description = "Booking already decided", body = ErrorBody),
        (status = 404, description = "Unknown booking or not the owner", body = ErrorBody)
    ),
    tags = ["bookings"],
    operation_id = "decideBooking"
)]
#[patch("/bookings/{id}")]
pub async fn decide_booking(
    state: web::Data<HttpState>,
    Sharer(caller): Sharer,
    path: web::Path<i64>,
    query: web::Query<DecisionQuery>,
) -> ApiResult<web::Json<BookingDto>> {
    let booking = state
        .bookings
        .decide_booking(DecideBookingRequest {
            caller,
            booking_id: BookingId::new(path.into_inner()),
            approved: query.approved,
        })
        .await?;
    Ok(web::Json(booking.into()))
}

async fn list(
    state: &HttpState,
    caller: UserId,
    audience: BookingAudience,
    query: StateQuery,
) -> ApiResult<web::Json<Vec<BookingDto>>> {
    let StateQuery {
        state: booking_state,
        from,
        size,
    } = query;
    let page = page_request(PageQuery { from, size }, DEFAULT_SIZE)?;
    let bookings = state
        .bookings_query
        .list_bookings(ListBookingsRequest {
            caller,
            audience,
            state: booking_state.unwrap_or_else(|| "ALL".to_owned()),
            page,
        })
        .await
        .map_err(|err| state.surface(err))?;
    Ok(web::Json(bookings.into_iter().map(BookingDto::from).collect()))
}

/// Bookings made by the caller, filtered by `state`.
#[utoipa::path(
    get,
    path = "/bookings",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Booking user"),
        ("state" = Option<String>, Query, description = "ALL, CURRENT, PAST, FUTURE, WAITING or REJECTED"),
        ("from" = Option<i64>, Query, description = "Row offset"),
        ("size" = Option<i64>, Query, description = "Window size")
    ),
    responses(
        (status = 200, description = "Bookings", body = [BookingDto]),
        (status = 404, description = "Unknown user", body = ErrorBody),
        (status = 500, description = "Unknown state", body = ErrorBody)
    ),
    tags = ["bookings"],
    operation_id = "listBookerBookings"
)]
#[get("/bookings")]
pub async fn list_booker_bookings(
    state: web::Data<HttpState>,
    Sharer(caller): Sharer,
    query: web::Query<StateQuery>,
) -> ApiResult<web::Json<Vec<BookingDto>>> {
    list(&state, caller, BookingAudience::Booker, query.into_inner()).await
}

/// Bookings on items owned by the caller, filtered by `state`.
#[utoipa::path(
    get,
    path = "/bookings/owner",
    params(
        ("X-Sharer-User-Id" = i64, Header, description = "Item owner"),
        ("state" = Option<String>, Query, description = "ALL, CURRENT, PAST, FUTURE, WAITING or REJECTED"),
        ("from" = Option<i64>, Query, description = "Row offset"),
        ("size" = Option<i64>, Query, description = "Window size")
    ),
    responses(
        (status = 200, description = "Bookings", body = [BookingDto]),
        (status = 404, description = "Unknown user", body = ErrorBody),
        (status = 500, description = "Unknown state", body = ErrorBody)
    ),
    tags = ["bookings"],
    operation_id = "listOwnerBookings"
)]
#[get("/bookings/owner")]
pub async fn list_owner_bookings(
    state: web::Data<HttpState>,
    Sharer(caller): Sharer,
    query: web::Query<StateQuery>,
) -> ApiResult<web::Json<Vec<BookingDto>>> {
    list(&state, caller, BookingAudience::Owner, query.into_inner()).await
}

/// Fetch a booking visible to its booker and the item owner.
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    params(
        ("id" = i64, Path, description = "Booking identifier"),
        ("X-Sharer-User-Id" = i64, Header, description = "Booker or item owner")
    ),
    responses(
        (status = 200, description = "Booking", body = BookingDto),
        (status = 404, description = "Unknown or hidden booking", body = ErrorBody)
    ),
    tags = ["bookings"],
    operation_id = "getBooking"
)]
#[get("/bookings/{id}")]
pub async fn get_booking(
    state: web::Data<HttpState>,
    Sharer(caller): Sharer,
    path: web::Path<i64>,
) -> ApiResult<web::Json<BookingDto>> {
    let booking = state
        .bookings_query
        .get_booking(caller, BookingId::new(path.into_inner()))
        .await?;
    Ok(web::Json(booking.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_fixtures::{booking, item, user};
    use crate::domain::{BookingStatus, Error};
    use crate::inbound::http::test_utils::{MockPorts, as_user, send};
    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn waiting() -> Booking {
        booking(
            1,
            &item(1, 1),
            &user(2),
            ("2024-07-01T10:00", "2024-07-02T10:00"),
            BookingStatus::Waiting,
        )
    }

    #[rstest]
    #[actix_web::test]
    async fn create_renders_nested_item_and_booker() {
        let mut ports = MockPorts::default();
        ports
            .bookings
            .expect_create_booking()
            .withf(|request| request.booker == UserId::new(2) && request.item_id == ItemId::new(1))
            .return_once(|_| Ok(waiting()));

        let res = send(
            ports.into_state(),
            as_user(TestRequest::post().uri("/bookings"), 2).set_json(json!({
                "itemId": 1,
                "start": "2024-07-01T10:00",
                "end": "2024-07-02T10:00"
            })),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "WAITING");
        assert_eq!(body["start"], "2024-07-01T10:00:00");
        assert_eq!(body["item"]["id"], 1);
        assert_eq!(body["booker"]["id"], 2);
    }

    #[rstest]
    #[actix_web::test]
    async fn decision_requires_the_approved_flag() {
        let res = send(
            MockPorts::default().into_state(),
            as_user(TestRequest::patch().uri("/bookings/1"), 1),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[rstest]
    #[actix_web::test]
    async fn decision_forwards_flag_and_caller() {
        let mut ports = MockPorts::default();
        ports
            .bookings
            .expect_decide_booking()
            .withf(|request| request.caller == UserId::new(1) && request.approved)
            .return_once(|_| Ok(waiting().with_status(BookingStatus::Approved)));

        let res = send(
            ports.into_state(),
            as_user(TestRequest::patch().uri("/bookings/1?approved=true"), 1),
        )
        .await;

        let body: BookingDto = test::read_body_json(res).await;
        assert_eq!(body.status, "APPROVED");
    }

    #[rstest]
    #[actix_web::test]
    async fn listing_defaults_to_all_and_server_window() {
        let mut ports = MockPorts::default();
        ports
            .bookings_query
            .expect_list_bookings()
            .withf(|request| {
                request.state == "ALL"
                    && request.audience == BookingAudience::Owner
                    && request.page.size() == DEFAULT_SIZE
            })
            .return_once(|_| Ok(vec![waiting()]));

        let res = send(
            ports.into_state(),
            as_user(TestRequest::get().uri("/bookings/owner"), 1),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body: Vec<BookingDto> = test::read_body_json(res).await;
        assert_eq!(body.len(), 1);
    }

    fn unsupported_ports() -> MockPorts {
        let mut ports = MockPorts::default();
        ports
            .bookings_query
            .expect_list_bookings()
            .return_once(|request| Err(Error::unsupported_state(&request.state)));
        ports
    }

    #[rstest]
    #[case(false, StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(true, StatusCode::BAD_REQUEST)]
    #[actix_web::test]
    async fn unknown_state_status_follows_the_flag(
        #[case] as_bad_request: bool,
        #[case] expected: StatusCode,
    ) {
        let state = unsupported_ports()
            .into_state()
            .with_unsupported_state_as_bad_request(as_bad_request);
        let res = send(
            state,
            as_user(TestRequest::get().uri("/bookings?state=SOMETIME"), 2),
        )
        .await;

        assert_eq!(res.status(), expected);
        let body: ErrorBody = test::read_body_json(res).await;
        assert_eq!(body.error, "Unknown state: SOMETIME");
    }
}
