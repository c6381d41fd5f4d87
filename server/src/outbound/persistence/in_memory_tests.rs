//! Behavioural tests for the in-process store.

use std::time::Duration;

use super::*;
use crate::domain::BookingWindow;
use chrono::NaiveDateTime;
use pagination::{PageRequest, PagingMode};
use rstest::{fixture, rstest};

fn at(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M").expect("timestamp")
}

fn new_user(name: &str) -> NewUser {
    NewUser {
        name: name.to_owned(),
        email: format!("{name}@example.com"),
    }
}

fn new_item(owner: UserId, name: &str, request_id: Option<RequestId>) -> NewItem {
    NewItem {
        owner_id: owner,
        name: name.to_owned(),
        description: format!("{name} for lending"),
        available: true,
        request_id,
    }
}

fn new_booking(item: ItemId, booker: UserId, start: &str, end: &str) -> NewBooking {
    NewBooking {
        item_id: item,
        booker_id: booker,
        window: BookingWindow::for_creation(at(start), at(end), at("2000-01-01T00:00"))
            .expect("valid window"),
        status: BookingStatus::Waiting,
    }
}

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new()
}

async fn session(store: &InMemoryStore) -> Box<dyn Transaction> {
    store
        .begin(TransactionMode::ReadWrite)
        .await
        .expect("transaction")
}

async fn add_user(repos: &Repositories, name: &str) -> User {
    repos.users.insert(&new_user(name)).await.expect("user")
}

async fn add_item(repos: &Repositories, owner: UserId, name: &str) -> Item {
    repos
        .items
        .insert(&new_item(owner, name, None))
        .await
        .expect("item")
}

/// Insert a booking and move it to `status`.
async fn add_booking(
    repos: &Repositories,
    item: ItemId,
    booker: UserId,
    start: &str,
    status: BookingStatus,
) -> Booking {
    let end = (at(start) + chrono::Duration::days(1))
        .format("%Y-%m-%dT%H:%M")
        .to_string();
    let booking = repos
        .bookings
        .insert(&new_booking(item, booker, start, &end))
        .await
        .expect("booking");
    if status == BookingStatus::Waiting {
        return booking;
    }
    repos
        .bookings
        .transition(booking.id(), BookingStatus::Waiting, status)
        .await
        .expect("transition")
        .expect("applied")
}

#[rstest]
#[tokio::test]
async fn duplicate_email_is_a_conflict(store: InMemoryStore) {
    let tx = session(&store).await;
    let repos = tx.repositories();
    add_user(repos, "ada").await;
    let err = repos
        .users
        .insert(&new_user("ada"))
        .await
        .expect_err("duplicate");
    assert_eq!(err, UserPersistenceError::email_conflict("ada@example.com"));
}

#[rstest]
#[tokio::test]
async fn updating_with_own_email_is_allowed(store: InMemoryStore) {
    let tx = session(&store).await;
    let repos = tx.repositories();
    let ada = add_user(repos, "ada").await;
    let renamed = User {
        name: "Ada L".to_owned(),
        ..ada
    };
    let stored = repos.users.update(&renamed).await.expect("update");
    assert_eq!(stored.name, "Ada L");
}

#[rstest]
#[tokio::test]
async fn deleting_a_user_cascades(store: InMemoryStore) {
    let tx = session(&store).await;
    let repos = tx.repositories();
    let owner = add_user(repos, "owner").await;
    let other = add_user(repos, "other").await;
    let request = repos
        .requests
        .insert(&NewItemRequest {
            requestor_id: owner.id,
            description: "need a drill".to_owned(),
            created: at("2024-01-01T00:00"),
        })
        .await
        .expect("request");
    let owned = add_item(repos, owner.id, "saw").await;
    let answer = repos
        .items
        .insert(&new_item(other.id, "drill", Some(request.id)))
        .await
        .expect("answer");
    add_booking(
        repos,
        owned.id,
        other.id,
        "2030-01-01T00:00",
        BookingStatus::Waiting,
    )
    .await;

    assert!(repos.users.delete(owner.id).await.expect("delete"));

    assert!(
        repos
            .items
            .find_by_id(owned.id)
            .await
            .expect("lookup")
            .is_none()
    );
    let kept = repos
        .items
        .find_by_id(answer.id)
        .await
        .expect("lookup")
        .expect("other user's item survives");
    assert_eq!(kept.request_id, None);
    let bookings = repos
        .bookings
        .list_for_booker(other.id, BookingFilter::All, Window::UNBOUNDED)
        .await
        .expect("list");
    assert!(bookings.is_empty());
    assert!(!repos.users.delete(owner.id).await.expect("repeat"));
}

#[rstest]
#[tokio::test]
async fn transition_applies_only_from_expected_status(store: InMemoryStore) {
    let tx = session(&store).await;
    let repos = tx.repositories();
    let owner = add_user(repos, "owner").await;
    let booker = add_user(repos, "booker").await;
    let item = add_item(repos, owner.id, "tent").await;
    let booking = add_booking(
        repos,
        item.id,
        booker.id,
        "2030-01-01T00:00",
        BookingStatus::Waiting,
    )
    .await;

    let approved = repos
        .bookings
        .transition(booking.id(), BookingStatus::Waiting, BookingStatus::Approved)
        .await
        .expect("transition")
        .expect("applied");
    assert_eq!(approved.status(), BookingStatus::Approved);

    let lost = repos
        .bookings
        .transition(booking.id(), BookingStatus::Waiting, BookingStatus::Rejected)
        .await
        .expect("transition");
    assert!(lost.is_none());
}

#[rstest]
#[tokio::test]
async fn owner_listing_orders_and_windows(store: InMemoryStore) {
    let tx = session(&store).await;
    let repos = tx.repositories();
    let owner = add_user(repos, "owner").await;
    let booker = add_user(repos, "booker").await;
    let item = add_item(repos, owner.id, "kayak").await;
    for start in ["2030-01-01T00:00", "2030-03-01T00:00", "2030-02-01T00:00"] {
        add_booking(repos, item.id, booker.id, start, BookingStatus::Waiting).await;
    }

    let page = repos
        .bookings
        .list_for_owner(
            owner.id,
            BookingFilter::Future(at("2024-01-01T00:00")),
            Window {
                offset: 1,
                limit: 1,
            },
        )
        .await
        .expect("list");
    let starts: Vec<_> = page.iter().map(Booking::start).collect();
    assert_eq!(starts, vec![at("2030-02-01T00:00")]);
}

#[rstest]
#[tokio::test]
async fn neighbours_are_the_closest_approved_bookings(store: InMemoryStore) {
    let tx = session(&store).await;
    let repos = tx.repositories();
    let owner = add_user(repos, "owner").await;
    let booker = add_user(repos, "booker").await;
    let item = add_item(repos, owner.id, "canoe").await;
    let elsewhere = add_item(repos, owner.id, "paddle").await;
    for (target, start, status) in [
        (item.id, "2024-06-10T00:00", BookingStatus::Approved),
        (item.id, "2024-04-01T00:00", BookingStatus::Approved),
        (item.id, "2024-05-20T00:00", BookingStatus::Rejected),
        (item.id, "2024-07-01T00:00", BookingStatus::Approved),
        (item.id, "2024-05-25T00:00", BookingStatus::Waiting),
        (item.id, "2024-05-01T00:00", BookingStatus::Approved),
        (item.id, "2024-06-05T00:00", BookingStatus::Rejected),
        (item.id, "2024-06-03T00:00", BookingStatus::Waiting),
        (elsewhere.id, "2024-05-30T00:00", BookingStatus::Approved),
        (elsewhere.id, "2024-06-02T00:00", BookingStatus::Approved),
    ] {
        add_booking(repos, target, booker.id, start, status).await;
    }
    let now = at("2024-06-01T00:00");

    let last = repos
        .bookings
        .find_last_approved(item.id, now)
        .await
        .expect("last")
        .expect("a past approved booking");
    let next = repos
        .bookings
        .find_next_approved(item.id, now)
        .await
        .expect("next")
        .expect("a future approved booking");

    assert_eq!(last.start(), at("2024-05-01T00:00"));
    assert_eq!(next.start(), at("2024-06-10T00:00"));
}

#[rstest]
#[case(PagingMode::Page, 1)]
#[case(PagingMode::Page, 3)]
#[case(PagingMode::Offset, 2)]
#[case(PagingMode::Offset, 4)]
#[tokio::test]
async fn consecutive_pages_reproduce_the_full_listing(
    store: InMemoryStore,
    #[case] mode: PagingMode,
    #[case] size: i64,
) {
    let tx = session(&store).await;
    let repos = tx.repositories();
    let owner = add_user(repos, "owner").await;
    let booker = add_user(repos, "booker").await;
    let item = add_item(repos, owner.id, "ladder").await;
    for start in [
        "2024-03-01T00:00",
        "2024-01-01T00:00",
        "2024-03-01T00:00",
        "2024-02-01T00:00",
        "2024-05-01T00:00",
        "2024-02-01T00:00",
        "2024-04-01T00:00",
    ] {
        add_booking(repos, item.id, booker.id, start, BookingStatus::Waiting).await;
    }
    let full: Vec<BookingId> = repos
        .bookings
        .list_for_booker(booker.id, BookingFilter::All, Window::UNBOUNDED)
        .await
        .expect("full listing")
        .iter()
        .map(Booking::id)
        .collect();

    let mut concatenated = Vec::new();
    let mut from = 0;
    loop {
        let window = PageRequest::new(from, size).expect("valid page").window(mode);
        let page = repos
            .bookings
            .list_for_booker(booker.id, BookingFilter::All, window)
            .await
            .expect("page");
        if page.is_empty() {
            break;
        }
        concatenated.extend(page.iter().map(Booking::id));
        from += size;
    }

    assert_eq!(full.len(), 7);
    assert_eq!(concatenated, full);
}

#[rstest]
#[tokio::test]
async fn search_is_case_insensitive_and_skips_unavailable(store: InMemoryStore) {
    let tx = session(&store).await;
    let repos = tx.repositories();
    let owner = add_user(repos, "owner").await;
    add_item(repos, owner.id, "Power Drill").await;
    let mut hidden = new_item(owner.id, "Hand drill", None);
    hidden.available = false;
    repos.items.insert(&hidden).await.expect("hidden");

    let found = repos
        .items
        .search_available("DrIlL", Window::UNBOUNDED)
        .await
        .expect("search");
    let names: Vec<_> = found.into_iter().map(|item| item.name).collect();
    assert_eq!(names, vec!["Power Drill".to_owned()]);
}

#[rstest]
#[tokio::test]
async fn other_requests_are_newest_first(store: InMemoryStore) {
    let tx = session(&store).await;
    let repos = tx.repositories();
    let me = add_user(repos, "me").await;
    let them = add_user(repos, "them").await;
    for (requestor, created) in [
        (them.id, "2024-01-01T00:00"),
        (me.id, "2024-02-01T00:00"),
        (them.id, "2024-03-01T00:00"),
    ] {
        repos
            .requests
            .insert(&NewItemRequest {
                requestor_id: requestor,
                description: "anything".to_owned(),
                created: at(created),
            })
            .await
            .expect("request");
    }

    let listed = repos
        .requests
        .list_by_others(me.id, Window::UNBOUNDED)
        .await
        .expect("list");
    let created: Vec<_> = listed.iter().map(|request| request.created).collect();
    assert_eq!(created, vec![at("2024-03-01T00:00"), at("2024-01-01T00:00")]);
}

#[rstest]
#[tokio::test]
async fn open_transaction_holds_off_other_callers_until_commit(store: InMemoryStore) {
    let tx = session(&store).await;
    let owner = add_user(tx.repositories(), "owner").await;
    let item = add_item(tx.repositories(), owner.id, "trailer").await.id;

    let reader = store.clone();
    let mut pending = tokio::spawn(async move {
        let tx = reader
            .begin(TransactionMode::ReadOnly)
            .await
            .expect("transaction");
        let seen = tx
            .repositories()
            .items
            .find_by_id(item)
            .await
            .expect("lookup");
        tx.commit().await.expect("commit");
        seen
    });
    assert!(
        tokio::time::timeout(Duration::from_millis(50), &mut pending)
            .await
            .is_err(),
        "second transaction ran while the first was open"
    );

    tx.commit().await.expect("commit");
    drop(tx);
    let seen = pending.await.expect("reader task");
    assert_eq!(seen.map(|found| found.id), Some(item));
}

#[rstest]
#[case(true)]
#[case(false)]
#[tokio::test]
async fn uncommitted_writes_are_discarded(store: InMemoryStore, #[case] explicit: bool) {
    let tx = session(&store).await;
    add_user(tx.repositories(), "ghost").await;
    if explicit {
        tx.rollback().await.expect("rollback");
    }
    drop(tx);

    let tx = session(&store).await;
    let users = tx.repositories().users.list_all().await.expect("list");
    assert!(users.is_empty());
    let fresh = add_user(tx.repositories(), "fresh").await;
    assert_eq!(fresh.id, UserId::new(1));
}

#[rstest]
#[tokio::test]
async fn read_only_transactions_refuse_writes(store: InMemoryStore) {
    let tx = store
        .begin(TransactionMode::ReadOnly)
        .await
        .expect("transaction");
    let err = tx
        .repositories()
        .users
        .insert(&new_user("ada"))
        .await
        .expect_err("read-only");
    assert_eq!(err, UserPersistenceError::query(READ_ONLY));
}
