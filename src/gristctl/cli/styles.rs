//! Named styles for the gristctl CLI.
//!
//! Templates only ever refer to semantic names (a role, an id, a failed row); what
//! those look like is decided here, once, in `GRIST_THEME`.

use super::theme::{rgb_to_ansi256, Theme};
use console::Style;
use once_cell::sync::Lazy;

pub mod names {
    pub const TITLE: &str = "title";
    pub const LABEL: &str = "label";
    pub const HEADER: &str = "header";
    pub const REGULAR: &str = "regular";
    pub const MUTED: &str = "muted";
    pub const ID: &str = "id";
    pub const ROLE: &str = "role";
    pub const PINNED: &str = "pinned";
    pub const FAILED: &str = "failed";
    pub const INFO: &str = "info";
    pub const SUCCESS: &str = "success";
    pub const WARNING: &str = "warning";
    pub const ERROR: &str = "error";
}

pub static GRIST_THEME: Lazy<Theme> = Lazy::new(|| {
    let gray = Style::new().color256(rgb_to_ansi256((154, 154, 154)));
    Theme::new()
        .add(names::TITLE, Style::new().bold())
        .add(names::LABEL, gray.clone())
        .add(names::HEADER, Style::new().bold().underlined())
        .add(names::REGULAR, Style::new())
        .add(names::MUTED, gray.clone().italic())
        .add(names::ID, Style::new().cyan())
        .add(names::ROLE, Style::new().green())
        .add(names::PINNED, Style::new().yellow())
        .add(names::FAILED, Style::new().red())
        .add(names::INFO, gray)
        .add(names::SUCCESS, Style::new().green())
        .add(names::WARNING, Style::new().yellow())
        .add(names::ERROR, Style::new().red().bold())
});
