//! Platform-specific configuration paths.
//!
//! - **User config**: `~/.config/partials/synth.toml` (Linux),
//!   `~/Library/Application Support/partials/synth.toml` (macOS),
//!   `%APPDATA%\partials\synth.toml` (Windows)
//! - **System config**: `/etc/partials/synth.toml` (Linux),
//!   `/Library/Application Support/partials/synth.toml` (macOS)
//!
//! # Example
//!
//! ```rust,no_run
//! use partials_config::paths;
//!
//! match paths::find_config() {
//!     Some(path) => println!("using {}", path.display()),
//!     None => println!("no config file, using defaults"),
//! }
//! ```

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "partials";

/// File name of the synthesizer configuration.
pub const CONFIG_FILE: &str = "synth.toml";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the user configuration file path.
pub fn user_config_file() -> PathBuf {
    user_config_dir().join(CONFIG_FILE)
}

/// Returns the system-wide configuration file path.
pub fn system_config_file() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        PathBuf::from("/etc").join(APP_NAME).join(CONFIG_FILE)
    }
    #[cfg(target_os = "macos")]
    {
        PathBuf::from("/Library/Application Support")
            .join(APP_NAME)
            .join(CONFIG_FILE)
    }
    #[cfg(target_os = "windows")]
    {
        std::env::var("PROGRAMDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\ProgramData"))
            .join(APP_NAME)
            .join(CONFIG_FILE)
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
    {
        PathBuf::from(".").join(APP_NAME).join(CONFIG_FILE)
    }
}

/// First existing configuration file: user, then system.
pub fn find_config() -> Option<PathBuf> {
    [user_config_file(), system_config_file()]
        .into_iter()
        .find(|path| path.is_file())
}
