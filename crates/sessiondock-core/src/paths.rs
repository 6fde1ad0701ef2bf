use std::env;
use std::path::PathBuf;

/// Directory name under `~/.config`.
const APP_DIR: &str = "sessiondock";

/// Return the user's home directory path.
///
/// Uses HOME on Unix-like systems and USERPROFILE on Windows.
pub fn get_home_dir() -> Result<PathBuf, String> {
    for var in ["HOME", "USERPROFILE"] {
        if let Ok(value) = env::var(var) {
            if !value.is_empty() {
                return Ok(PathBuf::from(value));
            }
        }
    }

    Err("Home directory not set".to_string())
}

/// `~/.config/sessiondock`
pub fn config_dir() -> Result<PathBuf, String> {
    Ok(get_home_dir()?.join(".config").join(APP_DIR))
}

/// `~/.config/sessiondock/config.json`
pub fn config_file() -> Result<PathBuf, String> {
    Ok(config_dir()?.join("config.json"))
}

/// `~/.config/sessiondock/store.json`
pub fn default_store_file() -> Result<PathBuf, String> {
    Ok(config_dir()?.join("store.json"))
}
