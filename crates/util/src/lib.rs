//! Utility helpers shared by the Flowpanel CLI and TUI.

pub mod path_processing;
pub mod preferences;
pub mod text_processing;

pub use path_processing::expand_tilde;
pub use preferences::{PreferencesError, PreferencesPayload, UserPreferences};
pub use text_processing::{redact_json, redact_sensitive, truncate_with_ellipsis};
