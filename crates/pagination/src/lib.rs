//! Offset and page pagination primitives shared by ShareIt endpoints.
//!
//! Clients address result windows with a `from` row offset and a `size`
//! window length. Stores that paginate by page index resolve the window as
//! page `from / size`, which only coincides with the raw offset when `from`
//! is a multiple of `size`. [`PagingMode`] selects between the two readings.
//!
//! # Examples
//! ```
//! use pagination::{PageRequest, PagingMode};
//!
//! let page = PageRequest::new(5, 2).expect("valid window");
//! assert_eq!(page.page_index(), 2);
//! assert_eq!(page.offset(PagingMode::Page), 4);
//! assert_eq!(page.offset(PagingMode::Offset), 5);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default row offset when a client omits `from`.
pub const DEFAULT_FROM: i64 = 0;

/// Default window size for item and request listings.
pub const DEFAULT_SIZE: i64 = 20;

/// Default window size applied to booking listings at the gateway.
pub const DEFAULT_BOOKING_SIZE: i64 = 10;

/// Errors raised while validating pagination parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// `from` was below zero.
    #[error("from must be zero or greater, got {from}")]
    NegativeOffset {
        /// Rejected offset value.
        from: i64,
    },
    /// `size` was below one.
    #[error("size must be at least 1, got {size}")]
    NonPositiveSize {
        /// Rejected window size.
        size: i64,
    },
}

/// How a [`PageRequest`] is translated into a row offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagingMode {
    /// Resolve the window as page `from / size`.
    #[default]
    Page,
    /// Skip exactly `from` rows.
    Offset,
}

impl fmt::Display for PagingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page => f.write_str("page"),
            Self::Offset => f.write_str("offset"),
        }
    }
}

/// Error returned when parsing an unknown [`PagingMode`] name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown paging mode: {0}")]
pub struct ParsePagingModeError(String);

impl FromStr for PagingMode {
    type Err = ParsePagingModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "page" => Ok(Self::Page),
            "offset" => Ok(Self::Offset),
            _ => Err(ParsePagingModeError(s.to_owned())),
        }
    }
}

/// Validated pagination window.
///
/// ## Invariants
/// - `from >= 0`
/// - `size >= 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    from: i64,
    size: i64,
}

impl PageRequest {
    /// Validate and build a pagination window.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError`] when `from` is negative or `size` is not
    /// positive.
    pub const fn new(from: i64, size: i64) -> Result<Self, PaginationError> {
        if from < 0 {
            return Err(PaginationError::NegativeOffset { from });
        }
        if size < 1 {
            return Err(PaginationError::NonPositiveSize { size });
        }
        Ok(Self { from, size })
    }

    /// Requested row offset.
    #[must_use]
    pub const fn from(&self) -> i64 {
        self.from
    }

    /// Requested window size.
    #[must_use]
    pub const fn size(&self) -> i64 {
        self.size
    }

    /// Maximum number of rows to return.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.size
    }

    /// Zero-based page index, `from / size` rounded down.
    #[must_use]
    pub const fn page_index(&self) -> i64 {
        match self.from.checked_div(self.size) {
            Some(index) => index,
            None => 0,
        }
    }

    /// Row offset of the page containing `from`.
    #[must_use]
    pub const fn page_offset(&self) -> i64 {
        self.page_index().saturating_mul(self.size)
    }

    /// Row offset for the given paging mode.
    #[must_use]
    pub const fn offset(&self, mode: PagingMode) -> i64 {
        match mode {
            PagingMode::Page => self.page_offset(),
            PagingMode::Offset => self.from,
        }
    }

    /// Resolve the row window for the given paging mode.
    #[must_use]
    pub const fn window(&self, mode: PagingMode) -> Window {
        Window {
            offset: self.offset(mode),
            limit: self.limit(),
        }
    }
}

/// Concrete `OFFSET`/`LIMIT` pair handed to stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    /// Rows to skip.
    pub offset: i64,
    /// Maximum rows to return.
    pub limit: i64,
}

impl Window {
    /// Window covering every row.
    pub const UNBOUNDED: Self = Self {
        offset: 0,
        limit: i64::MAX,
    };

    /// Apply the window to rows that are already filtered and ordered.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageRequest, PagingMode};
    ///
    /// let rows = [1, 2, 3, 4, 5];
    /// let page = PageRequest::new(2, 2).expect("valid window");
    /// assert_eq!(page.window(PagingMode::Page).apply(rows), vec![3, 4]);
    /// ```
    pub fn apply<T>(&self, rows: impl IntoIterator<Item = T>) -> Vec<T> {
        let skip = usize::try_from(self.offset).unwrap_or(usize::MAX);
        let take = usize::try_from(self.limit).unwrap_or(usize::MAX);
        rows.into_iter().skip(skip).take(take).collect()
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            from: DEFAULT_FROM,
            size: DEFAULT_SIZE,
        }
    }
}

/// Raw `from`/`size` query parameters before validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    /// Requested row offset.
    pub from: Option<i64>,
    /// Requested window size.
    pub size: Option<i64>,
}

impl PageQuery {
    /// Validate the parameters, filling gaps from the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PaginationError`] when the resolved window is invalid.
    pub fn into_request(self, default_size: i64) -> Result<PageRequest, PaginationError> {
        PageRequest::new(
            self.from.unwrap_or(DEFAULT_FROM),
            self.size.unwrap_or(default_size),
        )
    }
}
