//! Cached session records.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Format used for `createdOn`, e.g. `3/14/2026, 9:26:53 AM`.
const CREATED_ON_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// One session known to this client.
///
/// Ids are issued by the remote service; everything else is local metadata.
/// Absent fields take their defaults here, at deserialization, so callers never
/// need to special-case older payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Server-issued session identifier.
    pub id: String,

    /// Display timestamp captured when the record was created. Cosmetic only.
    #[serde(default)]
    pub created_on: String,

    /// Upstream HTTP proxy the remote session should route through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub httpproxy: Option<String>,

    /// Whether outbound URLs for this session are shuffled.
    #[serde(default = "default_enable_shuffling")]
    pub enable_shuffling: bool,
}

fn default_enable_shuffling() -> bool {
    true
}

impl SessionRecord {
    /// Create a record stamped with the current local time.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_created_on(id, now_display())
    }

    /// Create a record with an explicit `createdOn` value.
    pub fn with_created_on(id: impl Into<String>, created_on: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_on: created_on.into(),
            httpproxy: None,
            enable_shuffling: default_enable_shuffling(),
        }
    }

    /// The settings a form should be pre-filled with for this record.
    pub fn settings(&self) -> SessionSettings {
        SessionSettings {
            id: self.id.clone(),
            httpproxy: self.httpproxy.clone().unwrap_or_default(),
            enable_shuffling: self.enable_shuffling,
        }
    }
}

/// Editable settings for one session, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSettings {
    pub id: String,
    /// Empty when no proxy is configured.
    pub httpproxy: String,
    pub enable_shuffling: bool,
}

impl SessionSettings {
    /// Settings for an id with nothing else known about it.
    pub fn for_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            httpproxy: String::new(),
            enable_shuffling: default_enable_shuffling(),
        }
    }
}

/// Current local time in the `createdOn` display format.
pub fn now_display() -> String {
    Local::now().format(CREATED_ON_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    mod deserialization {
        use super::*;

        #[test]
        fn missing_enable_shuffling_defaults_to_true() {
            let record: SessionRecord =
                serde_json::from_str(r#"{"id":"abc","createdOn":"1/1/2026, 1:00:00 PM"}"#)
                    .unwrap();
            assert!(record.enable_shuffling);
            assert!(record.httpproxy.is_none());
        }

        #[test]
        fn missing_created_on_is_empty() {
            let record: SessionRecord = serde_json::from_str(r#"{"id":"abc"}"#).unwrap();
            assert_eq!(record.created_on, "");
        }

        #[test]
        fn reads_camel_case_fields() {
            let record: SessionRecord = serde_json::from_str(
                r#"{"id":"x","createdOn":"t","httpproxy":"http://p:8080","enableShuffling":false}"#,
            )
            .unwrap();
            assert_eq!(record.httpproxy.as_deref(), Some("http://p:8080"));
            assert!(!record.enable_shuffling);
        }

        #[test]
        fn unset_proxy_is_not_written() {
            let record = SessionRecord::with_created_on("x", "t");
            let json = serde_json::to_string(&record).unwrap();
            assert!(!json.contains("httpproxy"));
            assert!(json.contains("\"enableShuffling\":true"));
        }
    }

    mod settings {
        use super::*;

        #[test]
        fn settings_fill_empty_proxy() {
            let record = SessionRecord::with_created_on("x", "t");
            let settings = record.settings();
            assert_eq!(settings, SessionSettings::for_id("x"));
        }

        #[test]
        fn settings_carry_record_values() {
            let mut record = SessionRecord::with_created_on("x", "t");
            record.httpproxy = Some("http://p:8080".to_string());
            record.enable_shuffling = false;

            let settings = record.settings();
            assert_eq!(settings.httpproxy, "http://p:8080");
            assert!(!settings.enable_shuffling);
        }
    }

    #[test]
    fn now_display_is_not_empty() {
        let ts = now_display();
        assert!(ts.contains('/'));
        assert!(ts.contains(':'));
    }
}
