use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "sessiondock",
    version,
    about = "Manage proxy sessions and launch URLs through them"
)]
pub struct Cli {
    /// Config file (default: ~/.config/sessiondock/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Session service root URL, overrides `serverUrl`
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Session service password, overrides `password`
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Session cache file, overrides `storePath`
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// List cached sessions; the default one is marked with `*`
    List,

    /// Create a new session
    New,

    /// Make a session the default and show its settings
    Use { id: String },

    /// Delete a session
    Delete { id: String },

    /// Validate a session and print the URL to open
    Go {
        /// Destination URL (default: the configured fallback URL)
        url: Option<String>,

        /// Session id (default: the default session)
        #[arg(long)]
        id: Option<String>,

        /// Upstream HTTP proxy for the session
        #[arg(long)]
        proxy: Option<String>,

        /// Whether to shuffle the destination URL
        #[arg(long)]
        shuffling: Option<bool>,
    },

    /// Check whether the service requires a password
    Password,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_go_with_flags() {
        let cli = Cli::parse_from([
            "sessiondock",
            "go",
            "https://example.com/",
            "--id",
            "abc",
            "--proxy",
            "http://p:8080",
            "--shuffling",
            "false",
        ]);

        assert_eq!(
            cli.command,
            Command::Go {
                url: Some("https://example.com/".to_string()),
                id: Some("abc".to_string()),
                proxy: Some("http://p:8080".to_string()),
                shuffling: Some(false),
            }
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["sessiondock", "list", "--server", "http://host:1"]);
        assert_eq!(cli.command, Command::List);
        assert_eq!(cli.server.as_deref(), Some("http://host:1"));
    }

    #[test]
    fn use_requires_id() {
        assert!(Cli::try_parse_from(["sessiondock", "use"]).is_err());
    }
}
