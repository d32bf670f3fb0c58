use super::{Gateway, Method, Response};
use crate::error::{GristError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

#[derive(Clone)]
enum Reply {
    Respond(Response),
    TransportError,
}

#[derive(Clone)]
struct Route {
    reply: Reply,
    delay: Option<Duration>,
}

/// A recorded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub method: Method,
    pub path: String,
    pub body: Option<String>,
}

/// In-memory gateway for testing.
///
/// Routes are registered up front with the builder methods; unknown routes answer
/// 404. Every request is recorded so tests can assert on what went over the "wire".
/// The call log sits behind a `Mutex` because fan-outs call in from several threads.
#[derive(Default)]
pub struct InMemoryGateway {
    routes: HashMap<(Method, String), Route>,
    calls: Mutex<Vec<Call>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method path` with `status` and a raw body.
    pub fn respond(mut self, method: Method, path: &str, status: u16, body: &str) -> Self {
        self.routes.insert(
            (method, path.to_string()),
            Route {
                reply: Reply::Respond(Response::new(status, body.as_bytes().to_vec())),
                delay: None,
            },
        );
        self
    }

    /// Answer `method path` with 200 and `value` as JSON.
    pub fn respond_json<T: Serialize>(self, method: Method, path: &str, value: &T) -> Self {
        let body = serde_json::to_string(value).unwrap_or_default();
        self.respond(method, path, 200, &body)
    }

    /// Shorthand for a 200 GET route.
    pub fn get_json<T: Serialize>(self, path: &str, value: &T) -> Self {
        self.respond_json(Method::Get, path, value)
    }

    /// Make `method path` fail as if the connection dropped.
    pub fn fail_transport(mut self, method: Method, path: &str) -> Self {
        self.routes.insert(
            (method, path.to_string()),
            Route {
                reply: Reply::TransportError,
                delay: None,
            },
        );
        self
    }

    /// Delay the reply of an already registered route.
    pub fn with_delay(mut self, method: Method, path: &str, delay: Duration) -> Self {
        if let Some(route) = self.routes.get_mut(&(method, path.to_string())) {
            route.delay = Some(delay);
        }
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock_calls().clone()
    }

    pub fn count(&self, method: Method, path: &str) -> usize {
        self.lock_calls()
            .iter()
            .filter(|c| c.method == method && c.path == path)
            .count()
    }

    pub fn count_method(&self, method: Method) -> usize {
        self.lock_calls()
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<Call>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Gateway for InMemoryGateway {
    fn request(&self, method: Method, path: &str, body: Option<&str>) -> Result<Response> {
        self.lock_calls().push(Call {
            method,
            path: path.to_string(),
            body: body.map(str::to_string),
        });

        let Some(route) = self.routes.get(&(method, path.to_string())).cloned() else {
            return Ok(Response::new(404, b"{\"error\":\"not found\"}".to_vec()));
        };

        if let Some(delay) = route.delay {
            thread::sleep(delay);
        }

        match route.reply {
            Reply::Respond(response) => Ok(response),
            Reply::TransportError => Err(GristError::Transport {
                path: path.to_string(),
                reason: "connection reset (simulated)".to_string(),
            }),
        }
    }
}
