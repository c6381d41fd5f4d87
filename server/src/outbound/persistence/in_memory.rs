//! In-process store implementing the unit of work and every repository port.
//!
//! Used when no database URL is configured and by end-to-end tests. Filtering,
//! ordering and windowing follow the Diesel adapters, and user deletion
//! cascades the same way the foreign keys do.
//!
//! A transaction holds the table lock from `begin` until it is finished, so
//! transactions are serialised. Read-write transactions keep a copy of the
//! tables and restore it on rollback or when dropped uncommitted.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use pagination::Window;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::ports::{
    BookingPersistenceError, BookingRepository, CommentPersistenceError, CommentRepository,
    ItemPersistenceError, ItemRepository, ItemRequestPersistenceError, ItemRequestRepository,
    Repositories, Transaction, TransactionError, TransactionMode, UnitOfWork,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    Booking, BookingDraft, BookingFilter, BookingId, BookingOrder, BookingStatus, Comment,
    CommentId, Item, ItemId, ItemRequest, NewBooking, NewComment, NewItem, NewItemRequest,
    NewUser, RequestId, User, UserId,
};

#[derive(Debug, Clone)]
struct BookingRecord {
    item_id: ItemId,
    booker_id: UserId,
    start: NaiveDateTime,
    end: NaiveDateTime,
    status: BookingStatus,
}

#[derive(Debug, Clone)]
struct CommentRecord {
    item_id: ItemId,
    author_id: UserId,
    text: String,
    created: NaiveDateTime,
}

#[derive(Debug, Default, Clone)]
struct Sequence(i64);

impl Sequence {
    fn next(&mut self) -> i64 {
        self.0 = self.0.saturating_add(1);
        self.0
    }
}

#[derive(Debug, Default, Clone)]
struct Tables {
    users: BTreeMap<UserId, User>,
    items: BTreeMap<ItemId, Item>,
    bookings: BTreeMap<BookingId, BookingRecord>,
    comments: BTreeMap<CommentId, CommentRecord>,
    requests: BTreeMap<RequestId, ItemRequest>,
    user_ids: Sequence,
    item_ids: Sequence,
    booking_ids: Sequence,
    comment_ids: Sequence,
    request_ids: Sequence,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|user| user.email == email && Some(user.id) != except)
    }

    fn booking(&self, id: BookingId) -> Result<Option<Booking>, String> {
        self.bookings
            .get(&id)
            .map(|record| self.join_booking(id, record))
            .transpose()
    }

    fn join_booking(&self, id: BookingId, record: &BookingRecord) -> Result<Booking, String> {
        let item = self
            .items
            .get(&record.item_id)
            .ok_or_else(|| format!("booking {id} references missing item"))?;
        let booker = self
            .users
            .get(&record.booker_id)
            .ok_or_else(|| format!("booking {id} references missing booker"))?;
        Booking::new(BookingDraft {
            id,
            item: item.clone(),
            booker: booker.clone(),
            start: record.start,
            end: record.end,
            status: record.status,
        })
        .map_err(|err| format!("booking {id}: {err}"))
    }

    fn bookings_where(
        &self,
        keep: impl Fn(&Booking) -> bool,
        order: BookingOrder,
    ) -> Result<Vec<Booking>, String> {
        let mut selected = Vec::new();
        for (id, record) in &self.bookings {
            let booking = self.join_booking(*id, record)?;
            if keep(&booking) {
                selected.push(booking);
            }
        }
        selected.sort_by(|left, right| order.compare(left, right));
        Ok(selected)
    }

    fn remove_user(&mut self, id: UserId) -> bool {
        if self.users.remove(&id).is_none() {
            return false;
        }
        let owned: BTreeSet<ItemId> = self
            .items
            .values()
            .filter(|item| item.owner_id == id)
            .map(|item| item.id)
            .collect();
        let authored: BTreeSet<RequestId> = self
            .requests
            .values()
            .filter(|request| request.requestor_id == id)
            .map(|request| request.id)
            .collect();

        self.items.retain(|item_id, _| !owned.contains(item_id));
        self.bookings.retain(|_, booking| {
            booking.booker_id != id && !owned.contains(&booking.item_id)
        });
        self.comments.retain(|_, comment| {
            comment.author_id != id && !owned.contains(&comment.item_id)
        });
        self.requests
            .retain(|request_id, _| !authored.contains(request_id));
        for item in self.items.values_mut() {
            if item
                .request_id
                .is_some_and(|request_id| authored.contains(&request_id))
            {
                item.request_id = None;
            }
        }
        true
    }
}

/// Committed tables shared by every transaction.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    committed: Arc<AsyncMutex<Tables>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

const READ_ONLY: &str = "cannot write in a read-only transaction";

/// Tables locked for one transaction.
#[derive(Debug)]
struct Working {
    tables: OwnedMutexGuard<Tables>,
    undo: Option<Tables>,
    mode: TransactionMode,
}

impl Deref for Working {
    type Target = Tables;

    fn deref(&self) -> &Tables {
        &self.tables
    }
}

impl DerefMut for Working {
    fn deref_mut(&mut self) -> &mut Tables {
        &mut self.tables
    }
}

impl Working {
    fn restore(&mut self) {
        if let Some(undo) = self.undo.take() {
            *self.tables = undo;
        }
    }
}

/// Repository handle bound to one transaction.
#[derive(Debug)]
struct Scope {
    working: Mutex<Working>,
}

impl Scope {
    fn tables(&self) -> MutexGuard<'_, Working> {
        self.working.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn writable(&self) -> Result<MutexGuard<'_, Working>, &'static str> {
        let working = self.tables();
        if working.mode == TransactionMode::ReadOnly {
            return Err(READ_ONLY);
        }
        Ok(working)
    }
}

struct InMemoryTransaction {
    scope: Arc<Scope>,
    repos: Repositories,
}

#[async_trait]
impl UnitOfWork for InMemoryStore {
    async fn begin(
        &self,
        mode: TransactionMode,
    ) -> Result<Box<dyn Transaction>, TransactionError> {
        let tables = self.committed.clone().lock_owned().await;
        let undo = (mode == TransactionMode::ReadWrite).then(|| tables.clone());
        let scope = Arc::new(Scope {
            working: Mutex::new(Working { tables, undo, mode }),
        });
        let repos = Repositories {
            users: scope.clone(),
            items: scope.clone(),
            bookings: scope.clone(),
            comments: scope.clone(),
            requests: scope.clone(),
        };
        Ok(Box::new(InMemoryTransaction { scope, repos }))
    }
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    fn repositories(&self) -> &Repositories {
        &self.repos
    }

    async fn commit(&self) -> Result<(), TransactionError> {
        self.scope.tables().undo = None;
        Ok(())
    }

    async fn rollback(&self) -> Result<(), TransactionError> {
        self.scope.tables().restore();
        Ok(())
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        self.scope.tables().restore();
    }
}

#[async_trait]
impl UserRepository for Scope {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut tables = self.writable().map_err(UserPersistenceError::query)?;
        if tables.email_taken(&user.email, None) {
            return Err(UserPersistenceError::email_conflict(user.email.clone()));
        }
        let id = UserId::new(tables.user_ids.next());
        let stored = User {
            id,
            name: user.name.clone(),
            email: user.email.clone(),
        };
        tables.users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, user: &User) -> Result<User, UserPersistenceError> {
        let mut tables = self.writable().map_err(UserPersistenceError::query)?;
        if tables.email_taken(&user.email, Some(user.id)) {
            return Err(UserPersistenceError::email_conflict(user.email.clone()));
        }
        let slot = tables
            .users
            .get_mut(&user.id)
            .ok_or_else(|| UserPersistenceError::query("record not found"))?;
        *slot = user.clone();
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.tables().users.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.tables().users.values().cloned().collect())
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut tables = self.writable().map_err(UserPersistenceError::query)?;
        Ok(tables.remove_user(id))
    }
}

#[async_trait]
impl ItemRepository for Scope {
    async fn insert(&self, item: &NewItem) -> Result<Item, ItemPersistenceError> {
        let mut tables = self.writable().map_err(ItemPersistenceError::query)?;
        let id = ItemId::new(tables.item_ids.next());
        let stored = Item {
            id,
            owner_id: item.owner_id,
            name: item.name.clone(),
            description: item.description.clone(),
            available: item.available,
            request_id: item.request_id,
        };
        tables.items.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, item: &Item) -> Result<Item, ItemPersistenceError> {
        let mut tables = self.writable().map_err(ItemPersistenceError::query)?;
        let slot = tables
            .items
            .get_mut(&item.id)
            .ok_or_else(|| ItemPersistenceError::query("record not found"))?;
        slot.name.clone_from(&item.name);
        slot.description.clone_from(&item.description);
        slot.available = item.available;
        Ok(slot.clone())
    }

    async fn find_by_id(&self, id: ItemId) -> Result<Option<Item>, ItemPersistenceError> {
        Ok(self.tables().items.get(&id).cloned())
    }

    async fn list_by_owner(
        &self,
        owner: UserId,
        window: Window,
    ) -> Result<Vec<Item>, ItemPersistenceError> {
        let tables = self.tables();
        Ok(window.apply(
            tables
                .items
                .values()
                .filter(|item| item.owner_id == owner)
                .cloned(),
        ))
    }

    async fn list_by_requests(
        &self,
        request_ids: &[RequestId],
    ) -> Result<Vec<Item>, ItemPersistenceError> {
        let tables = self.tables();
        Ok(tables
            .items
            .values()
            .filter(|item| item.request_id.is_some_and(|id| request_ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn search_available(
        &self,
        text: &str,
        window: Window,
    ) -> Result<Vec<Item>, ItemPersistenceError> {
        let needle = text.to_lowercase();
        let tables = self.tables();
        Ok(window.apply(
            tables
                .items
                .values()
                .filter(|item| {
                    item.available
                        && (item.name.to_lowercase().contains(&needle)
                            || item.description.to_lowercase().contains(&needle))
                })
                .cloned(),
        ))
    }
}

#[async_trait]
impl BookingRepository for Scope {
    async fn insert(&self, booking: &NewBooking) -> Result<Booking, BookingPersistenceError> {
        let mut tables = self.writable().map_err(BookingPersistenceError::query)?;
        let id = BookingId::new(tables.booking_ids.next());
        tables.bookings.insert(
            id,
            BookingRecord {
                item_id: booking.item_id,
                booker_id: booking.booker_id,
                start: booking.window.start(),
                end: booking.window.end(),
                status: booking.status,
            },
        );
        tables
            .booking(id)
            .map_err(BookingPersistenceError::query)?
            .ok_or_else(|| BookingPersistenceError::query("inserted booking vanished"))
    }

    async fn find_by_id(
        &self,
        id: BookingId,
    ) -> Result<Option<Booking>, BookingPersistenceError> {
        self.tables()
            .booking(id)
            .map_err(BookingPersistenceError::query)
    }

    async fn transition(
        &self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<Option<Booking>, BookingPersistenceError> {
        let mut tables = self.writable().map_err(BookingPersistenceError::query)?;
        match tables.bookings.get_mut(&id) {
            Some(record) if record.status == from => record.status = to,
            _ => return Ok(None),
        }
        tables.booking(id).map_err(BookingPersistenceError::query)
    }

    async fn list_for_booker(
        &self,
        booker: UserId,
        filter: BookingFilter,
        window: Window,
    ) -> Result<Vec<Booking>, BookingPersistenceError> {
        let tables = self.tables();
        let selected = tables
            .bookings_where(
                |booking| booking.booker().id == booker && filter.matches(booking),
                filter.order(),
            )
            .map_err(BookingPersistenceError::query)?;
        Ok(window.apply(selected))
    }

    async fn list_for_owner(
        &self,
        owner: UserId,
        filter: BookingFilter,
        window: Window,
    ) -> Result<Vec<Booking>, BookingPersistenceError> {
        let tables = self.tables();
        let selected = tables
            .bookings_where(
                |booking| booking.item().is_owned_by(owner) && filter.matches(booking),
                filter.order(),
            )
            .map_err(BookingPersistenceError::query)?;
        Ok(window.apply(selected))
    }

    async fn find_last_approved(
        &self,
        item: ItemId,
        now: NaiveDateTime,
    ) -> Result<Option<Booking>, BookingPersistenceError> {
        let tables = self.tables();
        let selected = tables
            .bookings_where(
                |booking| {
                    booking.item().id == item
                        && booking.status() == BookingStatus::Approved
                        && booking.start() < now
                },
                BookingOrder::StartDescending,
            )
            .map_err(BookingPersistenceError::query)?;
        Ok(selected.into_iter().next())
    }

    async fn find_next_approved(
        &self,
        item: ItemId,
        now: NaiveDateTime,
    ) -> Result<Option<Booking>, BookingPersistenceError> {
        let tables = self.tables();
        let selected = tables
            .bookings_where(
                |booking| {
                    booking.item().id == item
                        && booking.status() == BookingStatus::Approved
                        && booking.start() > now
                },
                BookingOrder::StartAscending,
            )
            .map_err(BookingPersistenceError::query)?;
        Ok(selected.into_iter().next())
    }

    async fn list_finished(
        &self,
        booker: UserId,
        item: ItemId,
        now: NaiveDateTime,
    ) -> Result<Vec<Booking>, BookingPersistenceError> {
        let tables = self.tables();
        tables
            .bookings_where(
                |booking| {
                    booking.booker().id == booker && booking.item().id == item && booking.end() < now
                },
                BookingOrder::StartAscending,
            )
            .map_err(BookingPersistenceError::query)
    }
}

#[async_trait]
impl CommentRepository for Scope {
    async fn insert(&self, comment: &NewComment) -> Result<Comment, CommentPersistenceError> {
        let mut tables = self.writable().map_err(CommentPersistenceError::query)?;
        let author_name = tables
            .users
            .get(&comment.author_id)
            .map(|user| user.name.clone())
            .ok_or_else(|| CommentPersistenceError::query("comment author missing"))?;
        let id = CommentId::new(tables.comment_ids.next());
        tables.comments.insert(
            id,
            CommentRecord {
                item_id: comment.item_id,
                author_id: comment.author_id,
                text: comment.text.clone(),
                created: comment.created,
            },
        );
        Ok(Comment {
            id,
            item_id: comment.item_id,
            author_id: comment.author_id,
            author_name,
            text: comment.text.clone(),
            created: comment.created,
        })
    }

    async fn list_by_item(&self, item: ItemId) -> Result<Vec<Comment>, CommentPersistenceError> {
        let tables = self.tables();
        let mut listed = Vec::new();
        for (id, record) in tables.comments.iter().filter(|(_, record)| record.item_id == item) {
            let author = tables
                .users
                .get(&record.author_id)
                .ok_or_else(|| CommentPersistenceError::query("comment author missing"))?;
            listed.push(Comment {
                id: *id,
                item_id: record.item_id,
                author_id: record.author_id,
                author_name: author.name.clone(),
                text: record.text.clone(),
                created: record.created,
            });
        }
        listed.sort_by(|left, right| {
            left.created
                .cmp(&right.created)
                .then_with(|| left.id.cmp(&right.id))
        });
        Ok(listed)
    }
}

fn newest_first(requests: &mut [ItemRequest]) {
    requests.sort_by(|left, right| {
        right
            .created
            .cmp(&left.created)
            .then_with(|| right.id.cmp(&left.id))
    });
}

#[async_trait]
impl ItemRequestRepository for Scope {
    async fn insert(
        &self,
        request: &NewItemRequest,
    ) -> Result<ItemRequest, ItemRequestPersistenceError> {
        let mut tables = self.writable().map_err(ItemRequestPersistenceError::query)?;
        let id = RequestId::new(tables.request_ids.next());
        let stored = ItemRequest {
            id,
            requestor_id: request.requestor_id,
            description: request.description.clone(),
            created: request.created,
        };
        tables.requests.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(
        &self,
        id: RequestId,
    ) -> Result<Option<ItemRequest>, ItemRequestPersistenceError> {
        Ok(self.tables().requests.get(&id).cloned())
    }

    async fn list_by_requestor(
        &self,
        requestor: UserId,
    ) -> Result<Vec<ItemRequest>, ItemRequestPersistenceError> {
        let mut selected: Vec<ItemRequest> = self
            .tables()
            .requests
            .values()
            .filter(|request| request.requestor_id == requestor)
            .cloned()
            .collect();
        newest_first(&mut selected);
        Ok(selected)
    }

    async fn list_by_others(
        &self,
        requestor: UserId,
        window: Window,
    ) -> Result<Vec<ItemRequest>, ItemRequestPersistenceError> {
        let mut selected: Vec<ItemRequest> = self
            .tables()
            .requests
            .values()
            .filter(|request| request.requestor_id != requestor)
            .cloned()
            .collect();
        newest_first(&mut selected);
        Ok(window.apply(selected))
    }
}

#[cfg(test)]
#[path = "in_memory_tests.rs"]
mod tests;
