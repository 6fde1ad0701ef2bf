//! `sessiondock` - command-line front-end for sessiondock-core.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use sessiondock_core::{
    FileStore, HttpSessionService, KeyValueStore, LaunchRequest, LauncherConfig, Navigator,
    RemoteSessionService, SessionCache, SessionRecord, SessionSettings, WorkflowError,
};

use cli::{Cli, Command};

type CliNavigator = Navigator<FileStore, HttpSessionService>;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    let config = load_config(&cli)?;
    let navigator = build_navigator(&config)?;

    match cli.command {
        Command::List => {
            let default_id = navigator.cache().get_default().map(|r| r.id);
            print!("{}", render_sessions(&navigator.sessions(), default_id.as_deref()));
        }
        Command::New => {
            let settings = new_default_session(&navigator)
                .await
                .map_err(|e| failure(&navigator, e))?;
            println!("{}", settings.id);
        }
        Command::Use { id } => {
            let settings = navigator
                .select_session(&id)
                .map_err(|e| failure(&navigator, e))?;
            print!("{}", render_settings(&settings));
        }
        Command::Delete { id } => {
            navigator
                .delete_session(&id)
                .await
                .map_err(|e| failure(&navigator, e))?;
            println!("Deleted {id}");
        }
        Command::Go {
            url,
            id,
            proxy,
            shuffling,
        } => {
            let request = launch_request(&navigator, id, proxy, shuffling, url);
            let target = navigator
                .launch(request)
                .await
                .map_err(|e| failure(&navigator, e))?;
            println!("{}", target.absolute(&config.server_url));
        }
        Command::Password => {
            let required = navigator.password_required().await;
            if let Some(message) = navigator.status() {
                return Err(message);
            }
            println!("{}", if required { "required" } else { "not required" });
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<LauncherConfig, String> {
    let mut config = match &cli.config {
        Some(path) => LauncherConfig::load(path),
        None => LauncherConfig::load_default(),
    }
    .map_err(|e| e.to_string())?;

    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }
    if let Some(password) = &cli.password {
        config.password = Some(password.clone());
    }
    if let Some(store) = &cli.store {
        config.store_path = Some(store.clone());
    }

    Ok(config)
}

fn build_navigator(config: &LauncherConfig) -> Result<CliNavigator, String> {
    let store_path = config.resolved_store_path().map_err(|e| e.to_string())?;
    log::debug!("Using session store {}", store_path.display());

    let cache = SessionCache::with_keys(FileStore::new(store_path), config.store_keys());
    let remote = HttpSessionService::new(config.http_config());

    Ok(Navigator::new(cache, remote).with_fallback_url(config.fallback_url.clone()))
}

/// The status line for a failed action, falling back to the error itself.
fn failure<S, R>(navigator: &Navigator<S, R>, error: WorkflowError) -> String
where
    S: KeyValueStore,
    R: RemoteSessionService,
{
    navigator.status().unwrap_or_else(|| error.to_string())
}

/// Create a session and make it the default, so a bare `go` picks it up.
async fn new_default_session<S, R>(
    navigator: &Navigator<S, R>,
) -> Result<SessionSettings, WorkflowError>
where
    S: KeyValueStore,
    R: RemoteSessionService,
{
    let created = navigator.create_session().await?;
    navigator.select_session(&created.id)
}

/// Fill in whatever the user left out from the cached settings.
///
/// The id falls back to the default session; proxy and shuffling fall back
/// to what is cached for that id.
fn launch_request<S, R>(
    navigator: &Navigator<S, R>,
    id: Option<String>,
    proxy: Option<String>,
    shuffling: Option<bool>,
    url: Option<String>,
) -> LaunchRequest
where
    S: KeyValueStore,
    R: RemoteSessionService,
{
    let cache = navigator.cache();
    let base = match id {
        Some(id) => cache
            .get_session(&id)
            .map(|r| r.settings())
            .unwrap_or_else(|| SessionSettings::for_id(id)),
        None => cache
            .get_default()
            .map(|r| r.settings())
            .unwrap_or_else(|| SessionSettings::for_id("")),
    };

    LaunchRequest {
        session_id: base.id,
        httpproxy: proxy.unwrap_or(base.httpproxy),
        enable_shuffling: shuffling.unwrap_or(base.enable_shuffling),
        url: url.unwrap_or_default(),
    }
}

fn render_sessions(sessions: &[SessionRecord], default_id: Option<&str>) -> String {
    if sessions.is_empty() {
        return "No sessions. Create one with `sessiondock new`.\n".to_string();
    }

    let mut out = String::new();
    for record in sessions {
        let marker = if Some(record.id.as_str()) == default_id {
            '*'
        } else {
            ' '
        };
        out.push_str(&format!(
            "{} {}  {}  proxy={}  shuffling={}\n",
            marker,
            record.id,
            record.created_on,
            record.httpproxy.as_deref().unwrap_or("-"),
            if record.enable_shuffling { "on" } else { "off" },
        ));
    }
    out
}

fn render_settings(settings: &SessionSettings) -> String {
    format!(
        "id: {}\nhttpproxy: {}\nshuffling: {}\n",
        settings.id,
        if settings.httpproxy.is_empty() {
            "-"
        } else {
            &settings.httpproxy
        },
        if settings.enable_shuffling { "on" } else { "off" },
    )
}
