//! HTTP implementation of [`RemoteSessionService`].
//!
//! The service speaks a small plain-text API over `GET` requests. `ureq` is
//! blocking, so each call runs on tokio's blocking pool.

use std::path::PathBuf;
use std::time::Duration;

use super::{RemoteError, RemoteSessionService};
use crate::logging::{self, log_line, LogHandle};
use crate::shuffle::ShuffleDictionary;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`HttpSessionService`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Service root, e.g. `http://127.0.0.1:8080`.
    pub base_url: String,
    /// Sent as `pwd` on every request when set.
    pub password: Option<String>,
    pub timeout: Duration,
    /// Directory for the `remote.log` request trace.
    pub request_log_dir: Option<PathBuf>,
}

impl HttpConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            password: None,
            timeout: DEFAULT_TIMEOUT,
            request_log_dir: None,
        }
    }
}

/// Talks to the remote session service over HTTP.
pub struct HttpSessionService {
    agent: ureq::Agent,
    base_url: String,
    password: Option<String>,
    trace: LogHandle,
}

impl HttpSessionService {
    pub fn new(config: HttpConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        let trace = match config.request_log_dir.as_deref() {
            Some(dir) => logging::open_log_file(Some(dir), "remote"),
            None => logging::disabled(),
        };

        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            password: config.password.filter(|p| !p.is_empty()),
            trace,
        }
    }

    /// Issue `GET {base_url}{path}` and return the body of a 200 response.
    async fn get(
        &self,
        path: &str,
        mut params: Vec<(&'static str, String)>,
    ) -> Result<String, RemoteError> {
        let agent = self.agent.clone();
        let url = format!("{}{}", self.base_url, path);
        let endpoint = path.to_string();
        let trace = self.trace.clone();

        // Trace without the password.
        let described = describe(path, &params);
        if let Some(password) = &self.password {
            params.push(("pwd", password.clone()));
        }

        log::debug!("Remote request: {}", described);
        tokio::task::spawn_blocking(move || {
            log_line(&trace, "REQUEST", &described);
            let result = fetch(&agent, &url, &endpoint, &params);
            match &result {
                Ok(body) => log_line(&trace, "RESPONSE", body),
                Err(e) => log_line(&trace, "ERROR", &e.to_string()),
            }
            result
        })
        .await
        .map_err(|e| RemoteError::Transport {
            endpoint: path.to_string(),
            message: e.to_string(),
        })?
    }
}

fn describe(path: &str, params: &[(&'static str, String)]) -> String {
    if params.is_empty() {
        return format!("GET {path}");
    }
    let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("GET {path}?{}", query.join("&"))
}

fn fetch(
    agent: &ureq::Agent,
    url: &str,
    endpoint: &str,
    params: &[(&'static str, String)],
) -> Result<String, RemoteError> {
    let mut request = agent.get(url);
    for (key, value) in params {
        request = request.query(key, value);
    }

    let transport = |message: String| RemoteError::Transport {
        endpoint: endpoint.to_string(),
        message,
    };

    match request.call() {
        Ok(response) => {
            let status = response.status();
            let body = response.into_string().map_err(|e| transport(e.to_string()))?;
            if status != 200 {
                return Err(RemoteError::Status { status, body });
            }
            Ok(body)
        }
        Err(ureq::Error::Status(status, response)) => Err(RemoteError::Status {
            status,
            body: response.into_string().unwrap_or_default(),
        }),
        Err(e) => Err(transport(e.to_string())),
    }
}

fn parse_new_session(body: String) -> Result<String, RemoteError> {
    let id = body.trim();
    if id.is_empty() {
        return Err(RemoteError::UnexpectedResponse(body));
    }
    Ok(id.to_string())
}

fn parse_exists(body: String) -> Result<bool, RemoteError> {
    match body.as_str() {
        "exists" => Ok(true),
        "not found" => Ok(false),
        _ => Err(RemoteError::UnexpectedResponse(body)),
    }
}

fn parse_edit(body: String) -> Result<(), RemoteError> {
    match body.as_str() {
        "Success" => Ok(()),
        _ => Err(RemoteError::UnexpectedResponse(body)),
    }
}

fn parse_delete(body: String) -> Result<(), RemoteError> {
    match body.as_str() {
        "Success" | "not found" => Ok(()),
        _ => Err(RemoteError::UnexpectedResponse(body)),
    }
}

fn parse_shuffle_dictionary(body: String) -> Result<Option<ShuffleDictionary>, RemoteError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<Option<ShuffleDictionary>>(&body)
        .map_err(|_| RemoteError::UnexpectedResponse(body))
}

impl RemoteSessionService for HttpSessionService {
    async fn create_session(&self) -> Result<String, RemoteError> {
        parse_new_session(self.get("/newsession", Vec::new()).await?)
    }

    async fn session_exists(&self, id: &str) -> Result<bool, RemoteError> {
        parse_exists(self.get("/sessionexists", vec![("id", id.to_string())]).await?)
    }

    async fn edit_session(
        &self,
        id: &str,
        httpproxy: &str,
        enable_shuffling: bool,
    ) -> Result<(), RemoteError> {
        let mut params = vec![("id", id.to_string())];
        if !httpproxy.is_empty() {
            params.push(("httpProxy", httpproxy.to_string()));
        }
        let flag = if enable_shuffling { "1" } else { "0" };
        params.push(("enableShuffling", flag.to_string()));

        parse_edit(self.get("/editsession", params).await?)
    }

    async fn delete_session(&self, id: &str) -> Result<(), RemoteError> {
        parse_delete(self.get("/deletesession", vec![("id", id.to_string())]).await?)
    }

    async fn needs_password(&self) -> Result<bool, RemoteError> {
        Ok(self.get("/needpassword", Vec::new()).await? == "true")
    }

    async fn shuffle_dictionary(
        &self,
        id: &str,
    ) -> Result<Option<ShuffleDictionary>, RemoteError> {
        parse_shuffle_dictionary(self.get("/api/shuffleDict", vec![("id", id.to_string())]).await?)
    }
}
