//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (open_snapshot, load_settings, date parsing)
//! - `detect` - Recurring payment detection
//! - `calendar` - Calendar and upcoming events
//! - `insights` - Categorization, trends and forecasts
//! - `ai` - AI backend check

pub mod ai;
pub mod calendar;
pub mod core;
pub mod detect;
pub mod insights;

// Re-export command functions for main.rs
pub use ai::*;
pub use calendar::*;
pub use core::*;
pub use detect::*;
pub use insights::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
