//! # sitesafe
//!
//! Versioned master-data and voucher registry for construction-site safety management: people, departments, site
//! categories, construction sites, execution projects and PPE (personal protective equipment) issue vouchers.
//!
//! The entities differ only in their fields and a handful of business rules. What they share is the interesting
//! part:
//!
//! - **Optimistic concurrency.** Every record carries a `version`. An update or delete only succeeds if the stored
//!   version still equals the one the caller last read; the check and the write are one conditional statement, so
//!   of two concurrent writers holding the same version exactly one wins and the other gets
//!   [`Error::OtherEditConflict`](error::Error::OtherEditConflict).
//! - **Soft delete.** Deletion flips a `deleted` flag and bumps the version. Deleted records disappear from lists and
//!   lookups but stay visible to the delta feed.
//! - **Delta sync.** [`Registry::get_delta`](registry::Registry::get_delta) returns what changed after a client's
//!   watermark, split into new, updated and deleted records, plus the next watermark.
//! - **Read-through cache.** Single-record reads go through a [moka](https://crates.io/crates/moka)-backed cache of
//!   row snapshots. Entries never expire; every mutation invalidates the keys it touched once the transaction has
//!   ended, whether it committed or rolled back.
//! - **Reference integrity.** A record cannot be deleted while live records of other entities still point at it.
//!   The checks are plain data ([`UsageCheck`](usage::UsageCheck)) evaluated in order, stopping at the first hit.
//! - **Cycle guard.** Site categories form a tree; reparenting that would create a loop is refused.
//! - **Batches.** Several deletes or edits run in one transaction: all of them apply or none does, and the error
//!   names the failing record.
//!
//! # Data Controller
//!
//! The generic algorithms live in [`Registry`](registry::Registry). Everything entity-specific is described by a
//! [`DataController`](traits::DataController): the sea-orm entity, its usage and duplicate-key checks, extra
//! validation and how a row is hydrated into a detail view with resolved references. The controllers are in
//! [`db::entity`].
//!
//! # Versions
//!
//! A version is a timestamp in microseconds. [`VersionClock`](clock::VersionClock) makes sure that the versions a
//! process hands out are strictly increasing even when the wall clock is not, which keeps both the compare-and-swap
//! token and the delta watermark sound.

pub mod app;
pub mod cache;
pub mod clock;
pub mod concurrency;
pub mod config;
pub mod db;
pub mod delta;
pub mod error;
pub mod hierarchy;
pub mod logging;
pub mod registry;
pub mod store;
pub mod traits;
pub mod types;
pub mod usage;

#[doc(inline)]
pub use app::SiteSafe;
#[doc(inline)]
pub use error::Error;
#[doc(inline)]
pub use registry::Registry;

pub mod prelude {
    pub use crate::app::SiteSafe;
    pub use crate::cache::CacheBackend;
    pub use crate::cache::MokaBackend;
    pub use crate::clock::Clock;
    pub use crate::clock::ManualClock;
    pub use crate::clock::SystemClock;
    pub use crate::concurrency::Expected;
    pub use crate::error::Error;
    pub use crate::error::Result;
    pub use crate::registry::Registry;
    pub use crate::registry::RegistryOps;
    pub use crate::traits::DataController;
    pub use crate::types::Delta;
    pub use crate::types::Detail;
    pub use crate::types::EntityKind;
    pub use crate::types::Reference;
}
