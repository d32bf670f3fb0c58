use super::{Gateway, Method, Response};
use crate::config::GristConfig;
use crate::error::{GristError, Result};
use std::io::Read;
use tracing::debug;
use ureq::{Agent, AgentBuilder};

/// Production gateway backed by a `ureq` agent.
///
/// The agent is built once from [`GristConfig`] and reused for every call, so
/// connections are pooled across the threads of a fan-out.
pub struct HttpGateway {
    agent: Agent,
    api_url: String,
    bearer: String,
}

impl HttpGateway {
    pub fn new(config: &GristConfig) -> Result<Self> {
        let base = config.base_url()?.trim_end_matches('/');
        let token = config.token()?;
        let agent = AgentBuilder::new().timeout(config.timeout()).build();

        Ok(Self {
            agent,
            api_url: format!("{}/api", base),
            bearer: format!("Bearer {}", token),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

impl Gateway for HttpGateway {
    fn request(&self, method: Method, path: &str, body: Option<&str>) -> Result<Response> {
        let url = format!("{}/{}", self.api_url, path);
        let request = self
            .agent
            .request(method.as_str(), &url)
            .set("Authorization", &self.bearer)
            .set("Content-Type", "application/json");

        let outcome = match body {
            Some(payload) => request.send_string(payload),
            None => request.call(),
        };

        // Non-2xx statuses still carry a response the caller wants to see.
        let response = match outcome {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(transport)) => {
                debug!(%method, path, error = %transport, "transport failure");
                return Err(GristError::Transport {
                    path: path.to_string(),
                    reason: transport.to_string(),
                });
            }
        };

        let status = response.status();
        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| GristError::Transport {
                path: path.to_string(),
                reason: format!("reading response body: {}", e),
            })?;

        debug!(%method, path, status, bytes = bytes.len(), "grist request");
        Ok(Response::new(status, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_url_and_token() {
        let missing = GristConfig::default();
        assert!(matches!(
            HttpGateway::new(&missing),
            Err(GristError::Config(_))
        ));
    }

    #[test]
    fn test_api_url_is_normalized() {
        let config = GristConfig::new("https://grist.example/", "t");
        let gateway = HttpGateway::new(&config).unwrap();
        assert_eq!(gateway.api_url(), "https://grist.example/api");
    }

    #[test]
    fn test_connection_refused_is_a_transport_error() {
        // Port 9 (discard) is closed on test hosts.
        let mut config = GristConfig::new("http://127.0.0.1:9", "t");
        config.timeout_secs = 2;
        let gateway = HttpGateway::new(&config).unwrap();

        let err = gateway.request(Method::Get, "orgs", None).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.kind(), "transport");
    }
}
