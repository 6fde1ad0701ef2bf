use std::sync::{Mutex, MutexGuard};

/// Prefix for every user-visible error.
const ERROR_PREFIX: &str = "An error occurred: ";

/// The single place user-visible errors are shown.
///
/// A new error overwrites the previous one. Each user action clears the slot
/// when it starts.
#[derive(Debug, Default)]
pub struct StatusSlot {
    message: Mutex<Option<String>>,
}

impl StatusSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `error`, replacing whatever was there. Returns the displayed text.
    pub fn set(&self, error: &impl std::fmt::Display) -> String {
        let text = format!("{ERROR_PREFIX}{error}");
        *self.slot() = Some(text.clone());
        text
    }

    /// Clear the slot. Returns whether anything was showing.
    pub fn clear(&self) -> bool {
        self.slot().take().is_some()
    }

    pub fn message(&self) -> Option<String> {
        self.slot().clone()
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.message.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        assert!(StatusSlot::new().message().is_none());
    }

    #[test]
    fn set_prefixes_message() {
        let slot = StatusSlot::new();
        let shown = slot.set(&"boom");
        assert_eq!(shown, "An error occurred: boom");
        assert_eq!(slot.message().as_deref(), Some("An error occurred: boom"));
    }

    #[test]
    fn set_overwrites_previous() {
        let slot = StatusSlot::new();
        slot.set(&"first");
        slot.set(&"second");
        assert_eq!(slot.message().as_deref(), Some("An error occurred: second"));
    }

    #[test]
    fn clear_reports_whether_anything_was_shown() {
        let slot = StatusSlot::new();
        assert!(!slot.clear());
        slot.set(&"x");
        assert!(slot.clear());
        assert!(slot.message().is_none());
    }
}
