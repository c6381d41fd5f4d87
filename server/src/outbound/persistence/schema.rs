//! Diesel table definitions mirroring `migrations/`.
//!
//! Keep in step with the SQL by hand or regenerate with `diesel print-schema`.

diesel::table! {
    /// Registered users. `email` carries a unique constraint.
    users (id) {
        id -> Int8,
        name -> Varchar,
        email -> Varchar,
    }
}

diesel::table! {
    /// Item requests; `created` is stamped by the service.
    requests (id) {
        id -> Int8,
        requestor_id -> Int8,
        description -> Text,
        created -> Timestamp,
    }
}

diesel::table! {
    /// Lendable items. `request_id` is cleared when the request disappears.
    items (id) {
        id -> Int8,
        owner_id -> Int8,
        name -> Varchar,
        description -> Text,
        available -> Bool,
        request_id -> Nullable<Int8>,
    }
}

diesel::table! {
    /// Bookings over `[start_date, end_date)`; `status` is one of
    /// `WAITING`, `APPROVED`, `REJECTED`, `CANCELED`.
    bookings (id) {
        id -> Int8,
        item_id -> Int8,
        booker_id -> Int8,
        start_date -> Timestamp,
        end_date -> Timestamp,
        status -> Varchar,
    }
}

diesel::table! {
    /// Comments by past renters.
    comments (id) {
        id -> Int8,
        item_id -> Int8,
        author_id -> Int8,
        text -> Text,
        created -> Timestamp,
    }
}

diesel::joinable!(requests -> users (requestor_id));
diesel::joinable!(items -> requests (request_id));
diesel::joinable!(bookings -> items (item_id));
diesel::joinable!(comments -> items (item_id));

diesel::allow_tables_to_appear_in_same_query!(users, requests, items, bookings, comments);
