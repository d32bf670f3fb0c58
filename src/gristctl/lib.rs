//! # gristctl Architecture
//!
//! gristctl is a **library for driving a Grist server over its REST API** that happens
//! to ship with a CLI client. The library never touches the terminal.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders tables/JSON, prompts           │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, parses user-typed ids         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Inspection fan-outs, import pipeline, mutations          │
//! │  - Returns CmdResult: structured output + messages          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Client (client.rs) over a Gateway (gateway/)               │
//! │  - Typed endpoints, status and decode errors                │
//! │  - HttpGateway (production), InMemoryGateway (testing)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//!
//! Two places fan out: document inspection (one scoped thread per table) and the
//! org/user views (one scoped thread per workspace). See [`commands::helpers::fan_out`].
//! Results are joined in input order and sorted afterwards; nothing is shared mutably
//! while threads run.
//!
//! ## Errors
//!
//! Every fallible call returns [`error::Result`]. Per-unit failures inside a fan-out are
//! tagged on the unit and shown; transport failures abort the command.
//!
//! ## Testing Strategy
//!
//! 1. **Commands**: unit tests against [`gateway::memory::InMemoryGateway`]. This is
//!    where most tests live.
//! 2. **API**: dispatch and input normalization.
//! 3. **CLI**: rendering unit tests plus `tests/cli.rs` driving the binary.
//!
//! ## Module Overview
//!
//! - [`api`]: The API facade
//! - [`commands`]: Logic for each command
//! - [`client`]: Typed REST endpoints
//! - [`gateway`]: Transport abstraction and implementations
//! - [`model`]: Wire types (`Org`, `Workspace`, `Doc`, `User`, ...)
//! - [`config`]: Connection settings from the environment and `~/.gristctl`
//! - [`error`]: Error types
//! - `cli`: Argument parsing, rendering and prompts for the binary (not part of the lib API)

pub mod api;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
