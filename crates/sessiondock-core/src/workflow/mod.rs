//! User-facing workflows: create, select, delete, and launch sessions.

mod navigator;
mod status;

pub use navigator::{
    LaunchRequest, LaunchTarget, Navigator, WorkflowError, DEFAULT_FALLBACK_URL,
};
pub use status::StatusSlot;
