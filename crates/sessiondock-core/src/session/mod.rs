//! Session records and the local session cache.
//!
//! The remote service owns sessions; this module only mirrors what the
//! client has been told about them.

mod cache;
mod record;

pub use cache::{
    CacheError, DefaultSession, SessionCache, StoreKeys, DEFAULT_DEFAULT_KEY,
    DEFAULT_SESSIONS_KEY,
};
pub use record::{now_display, SessionRecord, SessionSettings};
