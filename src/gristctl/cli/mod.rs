//! The gristctl binary's terminal front end: argument parsing ([`setup`]), dispatch
//! ([`commands`]) and output ([`render`], [`theme`], [`styles`], [`templates`]).

pub mod commands;
pub mod render;
pub mod setup;
pub mod styles;
pub mod templates;
pub mod theme;

pub use commands::run;
