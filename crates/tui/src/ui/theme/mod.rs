//! Theme styling for the panel: semantic roles, one palette, and helper
//! builders for ratatui widgets.

pub mod dracula;
pub mod roles;
pub mod theme_helpers;

pub use dracula::DraculaTheme;
pub use roles::Theme;
