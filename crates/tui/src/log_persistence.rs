//! Log file used while the TUI owns the terminal.
//!
//! Tracing output written to stderr would corrupt the alternate screen, so in
//! TUI mode the CLI points the subscriber at this file instead.

use std::env;
use std::fs::{File, OpenOptions, create_dir_all};
use std::path::PathBuf;

use anyhow::Context;
use flowpanel_util::expand_tilde;

/// Environment variable used to override the TUI log file path.
pub const TUI_LOG_PATH_ENV: &str = "FLOWPANEL_TUI_LOG_PATH";

const DEFAULT_TUI_LOG_FILE_NAME: &str = "tui.log";

/// Resolve the log file path from `FLOWPANEL_TUI_LOG_PATH`, falling back to
/// the user's cache directory.
pub fn tui_log_path() -> PathBuf {
    if let Ok(path) = env::var(TUI_LOG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }
    dirs_next::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("flowpanel")
        .join(DEFAULT_TUI_LOG_FILE_NAME)
}

/// Open the TUI log file for appending, creating parent directories.
pub fn open_tui_log_file() -> anyhow::Result<(PathBuf, File)> {
    let path = tui_log_path();
    if let Some(parent) = path.parent() {
        create_dir_all(parent).with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    Ok((path, file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn environment_override_is_used() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("logs").join("panel.log");
        temp_env::with_var(TUI_LOG_PATH_ENV, Some(path.to_str().expect("utf-8 path")), || {
            assert_eq!(tui_log_path(), path);
            let (opened, _file) = open_tui_log_file().expect("open");
            assert_eq!(opened, path);
            assert!(path.exists());
        });
    }

    #[test]
    fn default_path_ends_with_file_name() {
        temp_env::with_var(TUI_LOG_PATH_ENV, None::<&str>, || {
            assert!(tui_log_path().ends_with("flowpanel/tui.log"));
        });
    }
}
