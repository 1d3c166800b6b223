//! PinGuard TUI - terminal rendering of fingerprint feedback

pub mod panel;
pub mod theme;

pub use panel::FeedbackPanel;
pub use theme::Theme;
