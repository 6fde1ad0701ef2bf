//! Navigator - sequences every user action against the cache and the remote service.

use std::sync::{Arc, Mutex};

use thiserror::Error;
use uuid::Uuid;

use super::status::StatusSlot;
use crate::events::{EventBus, LauncherEvent};
use crate::remote::{RemoteError, RemoteSessionService};
use crate::session::{CacheError, SessionCache, SessionRecord, SessionSettings};
use crate::shuffle::StrShuffler;
use crate::store::KeyValueStore;

/// Destination used when the user leaves the URL empty.
pub const DEFAULT_FALLBACK_URL: &str = "https://www.google.com/";

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("must generate a session id first")]
    MissingSessionId,

    #[error("session does not exist. try deleting or generating a new session")]
    SessionNotFound(String),

    #[error("a launch is already in progress")]
    LaunchInProgress,

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The service issued `id` but it could not be cached. The session exists
    /// remotely and nothing local refers to it.
    #[error("session {id} was created but could not be saved locally: {source}")]
    OrphanedRemoteSession {
        id: String,
        #[source]
        source: CacheError,
    },
}

/// Form values submitted to [`Navigator::launch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub session_id: String,
    /// Empty for no proxy.
    pub httpproxy: String,
    pub enable_shuffling: bool,
    /// Empty for the fallback URL.
    pub url: String,
}

impl LaunchRequest {
    pub fn new(settings: SessionSettings, url: impl Into<String>) -> Self {
        Self {
            session_id: settings.id,
            httpproxy: settings.httpproxy,
            enable_shuffling: settings.enable_shuffling,
            url: url.into(),
        }
    }
}

/// Where the client should go once a launch succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchTarget {
    pub session_id: String,
    /// Destination after optional shuffling.
    pub url: String,
    pub shuffled: bool,
}

impl LaunchTarget {
    /// `/<sessionId>/<url>`, relative to the service root.
    pub fn path(&self) -> String {
        format!("/{}/{}", self.session_id, self.url)
    }

    /// [`path`](Self::path) joined onto `base_url`.
    pub fn absolute(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path())
    }
}

/// Releases the launch slot when dropped, whatever the outcome.
struct LaunchGuard<'a> {
    slot: &'a Mutex<Option<Uuid>>,
    token: Uuid,
}

impl Drop for LaunchGuard<'_> {
    fn drop(&mut self) {
        let mut current = self.slot.lock().unwrap_or_else(|p| p.into_inner());
        if *current == Some(self.token) {
            *current = None;
        }
    }
}

/// Coordinates the local cache with the remote service.
///
/// Local state only ever trails confirmed remote state: records are added,
/// edited, and removed after the corresponding remote call succeeded.
///
/// Only one launch may run at a time. A second [`launch`](Self::launch) while
/// one is pending is rejected with [`WorkflowError::LaunchInProgress`].
pub struct Navigator<S, R> {
    cache: SessionCache<S>,
    remote: R,
    events: Arc<EventBus>,
    status: StatusSlot,
    fallback_url: String,
    launch_token: Mutex<Option<Uuid>>,
}

impl<S: KeyValueStore, R: RemoteSessionService> Navigator<S, R> {
    pub fn new(cache: SessionCache<S>, remote: R) -> Self {
        Self {
            cache,
            remote,
            events: Arc::new(EventBus::new()),
            status: StatusSlot::new(),
            fallback_url: DEFAULT_FALLBACK_URL.to_string(),
            launch_token: Mutex::new(None),
        }
    }

    /// Publish events on an existing bus.
    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = events;
        self
    }

    pub fn with_fallback_url(mut self, url: impl Into<String>) -> Self {
        self.fallback_url = url.into();
        self
    }

    pub fn cache(&self) -> &SessionCache<S> {
        &self.cache
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// The currently displayed error, if any.
    pub fn status(&self) -> Option<String> {
        self.status.message()
    }

    pub fn fallback_url(&self) -> &str {
        &self.fallback_url
    }

    pub fn sessions(&self) -> Vec<SessionRecord> {
        self.cache.list_sessions()
    }

    /// Whether a launch is currently pending.
    pub fn launch_in_flight(&self) -> bool {
        self.launch_token
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .is_some()
    }

    /// Announce the cached list and return the default session's settings.
    pub fn initial_settings(&self) -> Option<SessionSettings> {
        self.publish_sessions();
        let settings = self.cache.get_default().map(|r| r.settings())?;
        self.events.emit(LauncherEvent::SettingsLoaded {
            settings: settings.clone(),
        });
        Some(settings)
    }

    /// Ask whether the service wants a password.
    ///
    /// Failures are shown in the status slot and read as "no password".
    pub async fn password_required(&self) -> bool {
        match self.remote.needs_password().await {
            Ok(true) => {
                self.events.emit(LauncherEvent::PasswordRequired);
                true
            }
            Ok(false) => false,
            Err(e) => {
                self.report(&WorkflowError::Remote(e));
                false
            }
        }
    }

    /// Have the service issue a new session and cache it.
    ///
    /// Returns the settings to pre-fill for the new session. The new session
    /// is not made the default.
    pub async fn create_session(&self) -> Result<SessionSettings, WorkflowError> {
        self.begin_action();
        let result = self.run_create().await;
        self.finish(result)
    }

    async fn run_create(&self) -> Result<SessionSettings, WorkflowError> {
        let id = self.remote.create_session().await?;

        if let Err(source) = self.cache.create_local(&id) {
            log::warn!("Session {} exists remotely but was not cached: {}", id, source);
            return Err(WorkflowError::OrphanedRemoteSession { id, source });
        }
        log::info!("Created session {}", id);

        self.publish_sessions();
        let settings = SessionSettings::for_id(id);
        self.events.emit(LauncherEvent::SettingsLoaded {
            settings: settings.clone(),
        });
        Ok(settings)
    }

    /// Make `id` the default and return its settings.
    ///
    /// An id missing from the cache still becomes the default; its settings
    /// carry only the id.
    pub fn select_session(&self, id: &str) -> Result<SessionSettings, WorkflowError> {
        self.begin_action();
        let result = self.run_select(id);
        self.finish(result)
    }

    fn run_select(&self, id: &str) -> Result<SessionSettings, WorkflowError> {
        self.cache.set_default(id)?;

        let settings = self
            .cache
            .get_session(id)
            .map(|r| r.settings())
            .unwrap_or_else(|| SessionSettings::for_id(id));
        self.events.emit(LauncherEvent::SettingsLoaded {
            settings: settings.clone(),
        });
        Ok(settings)
    }

    /// Delete a session remotely, then drop it from the cache.
    pub async fn delete_session(&self, id: &str) -> Result<(), WorkflowError> {
        self.begin_action();
        let result = self.run_delete(id).await;
        self.finish(result)
    }

    async fn run_delete(&self, id: &str) -> Result<(), WorkflowError> {
        self.remote.delete_session(id).await?;
        if !self.cache.delete_local(id)? {
            log::debug!("Deleted session {} was not cached", id);
        }
        self.publish_sessions();
        Ok(())
    }

    /// Validate the session remotely, push its settings, and work out where to go.
    ///
    /// Steps run strictly in order and the first failure aborts the rest:
    ///
    /// 1. a session id must be present
    /// 2. the service must still know the session
    /// 3. settings are pushed remotely, then mirrored into the cache
    /// 4. the shuffle dictionary is fetched
    /// 5. the destination is shuffled if a dictionary came back
    pub async fn launch(&self, request: LaunchRequest) -> Result<LaunchTarget, WorkflowError> {
        let Some(_guard) = self.try_begin_launch() else {
            log::debug!("Rejected launch of {}: another launch is pending", request.session_id);
            return Err(WorkflowError::LaunchInProgress);
        };

        self.begin_action();
        let result = self.run_launch(request).await;
        self.finish(result)
    }

    async fn run_launch(&self, request: LaunchRequest) -> Result<LaunchTarget, WorkflowError> {
        let LaunchRequest {
            session_id: id,
            httpproxy,
            enable_shuffling,
            url,
        } = request;

        if id.is_empty() {
            return Err(WorkflowError::MissingSessionId);
        }

        if !self.remote.session_exists(&id).await? {
            return Err(WorkflowError::SessionNotFound(id));
        }

        self.remote
            .edit_session(&id, &httpproxy, enable_shuffling)
            .await?;
        self.cache.edit_local(&id, &httpproxy, enable_shuffling)?;
        self.publish_sessions();

        let url = if url.is_empty() {
            self.fallback_url.clone()
        } else {
            url
        };

        let target = match self.remote.shuffle_dictionary(&id).await? {
            None => LaunchTarget {
                session_id: id,
                url,
                shuffled: false,
            },
            Some(dictionary) => LaunchTarget {
                url: StrShuffler::new(dictionary).shuffle(&url),
                session_id: id,
                shuffled: true,
            },
        };

        log::info!("Launching session {}", target.session_id);
        self.events.emit(LauncherEvent::Navigate {
            target: target.path(),
        });
        Ok(target)
    }

    fn try_begin_launch(&self) -> Option<LaunchGuard<'_>> {
        let mut current = self.launch_token.lock().unwrap_or_else(|p| p.into_inner());
        if current.is_some() {
            return None;
        }

        let token = Uuid::new_v4();
        *current = Some(token);
        Some(LaunchGuard {
            slot: &self.launch_token,
            token,
        })
    }

    /// Every user action starts from a clean status slot.
    fn begin_action(&self) {
        if self.status.clear() {
            self.events
                .emit(LauncherEvent::StatusChanged { message: None });
        }
    }

    fn finish<T>(&self, result: Result<T, WorkflowError>) -> Result<T, WorkflowError> {
        if let Err(e) = &result {
            self.report(e);
        }
        result
    }

    fn report(&self, error: &WorkflowError) {
        log::error!("{}", error);
        let message = self.status.set(error);
        self.events.emit(LauncherEvent::StatusChanged {
            message: Some(message),
        });
    }

    fn publish_sessions(&self) {
        self.events.emit(LauncherEvent::SessionsChanged {
            sessions: self.cache.list_sessions(),
        });
    }
}
