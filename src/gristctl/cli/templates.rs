//! # CLI Templates
//!
//! Terminal output is rendered from stand-alone minijinja templates, included here as
//! string constants. Keeping them out of the Rust sources makes them easier to edit
//! and diff.
//!
//! Templates are rendered with `trim_blocks` and `lstrip_blocks`, so a block tag never
//! emits the newline that follows it. Where a line break is wanted right after a loop,
//! the template carries an explicit blank line.
//!
//! Layout (column widths, truncation, padding) is computed in Rust; templates only
//! pick styles.

pub const VIEW_TEMPLATE: &str = include_str!("templates/view.tmp");
pub const MESSAGES_TEMPLATE: &str = include_str!("templates/messages.tmp");
