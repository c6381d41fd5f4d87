//! Shared builders for domain unit tests.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use mockable::Clock;

use super::ports::{
    MockBookingRepository, MockCommentRepository, MockItemRepository, MockItemRequestRepository,
    MockUserRepository, Repositories, Transaction, TransactionError, TransactionMode, UnitOfWork,
};
use super::{Booking, BookingDraft, BookingId, BookingStatus, Item, ItemId, User, UserId};

/// Parse `YYYY-MM-DDTHH:MM` into a naive instant.
pub(crate) fn at(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M").expect("fixture timestamp")
}

/// Reference instant used across scenarios.
pub(crate) fn now() -> NaiveDateTime {
    at("2024-06-01T00:00")
}

/// Clock pinned to a local wall-clock instant.
pub(crate) struct FixtureClock {
    local: DateTime<Local>,
}

impl FixtureClock {
    pub(crate) fn at(instant: NaiveDateTime) -> Self {
        let local = Local
            .from_local_datetime(&instant)
            .earliest()
            .expect("representable local instant");
        Self { local }
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.local
    }

    fn utc(&self) -> DateTime<Utc> {
        self.local.with_timezone(&Utc)
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock::at(now()))
}

pub(crate) fn user(id: i64) -> User {
    User {
        id: UserId::new(id),
        name: format!("user-{id}"),
        email: format!("user{id}@example.com"),
    }
}

pub(crate) fn item(id: i64, owner: i64) -> Item {
    Item {
        id: ItemId::new(id),
        owner_id: UserId::new(owner),
        name: format!("item-{id}"),
        description: format!("description of item {id}"),
        available: true,
        request_id: None,
    }
}

pub(crate) fn booking(
    id: i64,
    item: &Item,
    booker: &User,
    window: (&str, &str),
    status: BookingStatus,
) -> Booking {
    Booking::new(BookingDraft {
        id: BookingId::new(id),
        item: item.clone(),
        booker: booker.clone(),
        start: at(window.0),
        end: at(window.1),
        status,
    })
    .expect("valid booking fixture")
}

/// Mock repositories to be configured per test, then frozen into a store.
#[derive(Default)]
pub(crate) struct MockRepos {
    pub(crate) users: MockUserRepository,
    pub(crate) items: MockItemRepository,
    pub(crate) bookings: MockBookingRepository,
    pub(crate) comments: MockCommentRepository,
    pub(crate) requests: MockItemRequestRepository,
}

impl MockRepos {
    fn into_repositories(self) -> Repositories {
        Repositories {
            users: Arc::new(self.users),
            items: Arc::new(self.items),
            bookings: Arc::new(self.bookings),
            comments: Arc::new(self.comments),
            requests: Arc::new(self.requests),
        }
    }

    /// Store handing the mocks to every transaction it opens.
    pub(crate) fn into_store(self) -> Arc<ScriptedStore> {
        Arc::new(ScriptedStore {
            repos: self.into_repositories(),
            journal: Journal::default(),
        })
    }
}

/// Transaction lifecycle events, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TxEvent {
    Begin(TransactionMode),
    Commit,
    Rollback,
}

#[derive(Clone, Default)]
pub(crate) struct Journal(Arc<Mutex<Vec<TxEvent>>>);

impl Journal {
    fn push(&self, event: TxEvent) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    pub(crate) fn events(&self) -> Vec<TxEvent> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Unit of work over mock repositories that records each transaction.
pub(crate) struct ScriptedStore {
    repos: Repositories,
    pub(crate) journal: Journal,
}

struct ScriptedTransaction {
    repos: Repositories,
    journal: Journal,
}

#[async_trait]
impl UnitOfWork for ScriptedStore {
    async fn begin(
        &self,
        mode: TransactionMode,
    ) -> Result<Box<dyn Transaction>, TransactionError> {
        self.journal.push(TxEvent::Begin(mode));
        Ok(Box::new(ScriptedTransaction {
            repos: self.repos.clone(),
            journal: self.journal.clone(),
        }))
    }
}

#[async_trait]
impl Transaction for ScriptedTransaction {
    fn repositories(&self) -> &Repositories {
        &self.repos
    }

    async fn commit(&self) -> Result<(), TransactionError> {
        self.journal.push(TxEvent::Commit);
        Ok(())
    }

    async fn rollback(&self) -> Result<(), TransactionError> {
        self.journal.push(TxEvent::Rollback);
        Ok(())
    }
}
