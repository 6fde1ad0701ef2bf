//! # sessiondock-core
//!
//! Client-side controller for a proxy-session service.
//!
//! This crate is framework-agnostic and can be driven by:
//! - the `sessiondock` CLI
//! - a web or desktop front-end subscribing to [`events::EventBus`]
//!
//! ## Key Concepts
//!
//! - **Session**: an id issued by the remote service, naming an isolated proxy context
//! - **SessionCache**: the local, advisory list of known sessions plus a default pointer
//! - **Navigator**: runs create/select/delete and the validate → edit → shuffle → redirect launch
//! - **StrShuffler**: reversible URL obfuscation keyed by a server-provided dictionary

pub mod config;
pub mod events;
pub mod logging;
pub mod paths;
pub mod remote;
pub mod session;
pub mod shuffle;
pub mod store;
pub mod workflow;

// Re-export commonly used types
pub use config::LauncherConfig;
pub use remote::{HttpSessionService, RemoteError, RemoteSessionService};
pub use session::{SessionCache, SessionRecord, SessionSettings};
pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use workflow::{LaunchRequest, LaunchTarget, Navigator, WorkflowError};
