//! Tank Core - Image Cache Types
//!
//! Data types and pure decision logic shared by every Tank crate:
//! the `ImageCache` entity, the ownership guard, sort and paging rules,
//! and the error hierarchy. No I/O lives here.

pub mod access;
pub mod entities;
pub mod error;
pub mod paging;
pub mod sort;

use chrono::{DateTime, Utc};

pub use access::{AccessDecision, AccessGuard};
pub use entities::{ActingUser, ImageCache, UserRole};
pub use error::{AccessError, ErrorKind, StorageError, TankError, TankResult, ValidationError};
pub use paging::{Page, Pagination, PagingSettings, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use sort::{SortDirection, SortField, SortSpec};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

