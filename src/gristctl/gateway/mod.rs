//! # Gateway Layer
//!
//! The [`Gateway`] trait is the single seam between gristctl and the network. Everything
//! above it works on typed values; everything below it speaks HTTP.
//!
//! ## Implementations
//!
//! - [`http::HttpGateway`]: production gateway, a `ureq` agent with a per-request
//!   timeout and the bearer token attached to every call.
//! - [`memory::InMemoryGateway`]: canned responses keyed by method and path, with call
//!   recording and simulated latency, for tests.
//!
//! ## Contract
//!
//! `request` returns `Ok(Response)` for **any** HTTP status, including 4xx/5xx: the
//! caller decides what a status means. `Err` is reserved for failures where no
//! response exists at all (connection refused, DNS, timeout), which are fatal for the
//! running command.
//!
//! Gateways are shared by reference across the scoped threads of a fan-out, hence the
//! `Send + Sync` bound.

use crate::error::Result;
use std::fmt;

pub mod http;
pub mod memory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Raw access to the Grist REST API. Paths are relative to `<base>/api/`.
pub trait Gateway: Send + Sync {
    fn request(&self, method: Method, path: &str, body: Option<&str>) -> Result<Response>;
}
