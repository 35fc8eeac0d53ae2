//! # Output Configuration
//!
//! Controls how plans and results look on the terminal.
//!
//! Color and emoji use follow the `--color=never|always|auto` flag. In `auto`
//! mode the usual conventions are honoured: `NO_COLOR` (https://no-color.org/),
//! `CLICOLOR=0`, `CLICOLOR_FORCE=1` and `TERM=dumb`, falling back to
//! `console`'s terminal detection.
//!
//! ```rust,ignore
//! use robot_folders::output::{OutputConfig, render_action};
//!
//! let config = OutputConfig::from_env_and_flag("auto");
//! for action in &actions {
//!     println!("{}", render_action(&config, action));
//! }
//! ```

use std::env;

use console::style;

use crate::engine::ReconciliationAction;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from the `--color` flag value and the
    /// environment. Unknown values behave like `auto`.
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // presence alone disables, even when empty
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns `emoji_str` when colors are enabled and `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// One line describing a planned or applied action.
pub fn render_action(config: &OutputConfig, action: &ReconciliationAction) -> String {
    let (marker, plain) = match action {
        ReconciliationAction::Clone { .. } => ("📥", "[CLONE]"),
        ReconciliationAction::SetRemote { .. } => ("🔗", "[REMOTE]"),
        ReconciliationAction::CheckoutVersion { .. } => ("🔀", "[CHECKOUT]"),
        ReconciliationAction::Delete { .. } => ("🗑️", "[DELETE]"),
        ReconciliationAction::Skip { .. } => ("⏭️", "[SKIP]"),
        ReconciliationAction::Warn { .. } => ("⚠️", "[WARN]"),
    };

    let text = action.to_string();
    let text = if !config.use_color {
        text
    } else {
        match action {
            ReconciliationAction::Delete { .. } => style(text).red().to_string(),
            ReconciliationAction::Skip { .. } | ReconciliationAction::Warn { .. } => {
                style(text).yellow().to_string()
            }
            _ => text,
        }
    };

    format!("{} {}", emoji(config, marker, plain), text)
}

/// Summary line for a plan, e.g. `3 actions (1 clone, 2 skip)`.
pub fn render_summary(actions: &[ReconciliationAction]) -> String {
    if actions.is_empty() {
        return "Workspace is up to date".to_string();
    }

    let mut counts: Vec<(&str, usize)> = Vec::new();
    for action in actions {
        match counts.iter_mut().find(|(kind, _)| *kind == action.kind()) {
            Some((_, count)) => *count += 1,
            None => counts.push((action.kind(), 1)),
        }
    }

    let parts: Vec<String> = counts
        .iter()
        .map(|(kind, count)| format!("{} {}", count, kind))
        .collect();
    format!(
        "{} action{} ({})",
        actions.len(),
        if actions.len() == 1 { "" } else { "s" },
        parts.join(", ")
    )
}
