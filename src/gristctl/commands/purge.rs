use crate::client::GristClient;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{GristError, Result};
use crate::gateway::Gateway;
use tracing::info;

/// Number of history states kept when none is given.
pub const DEFAULT_KEEP: u32 = 3;

/// Drop a document's history, keeping the `keep` most recent states.
pub fn run<G: Gateway>(client: &GristClient<G>, doc_id: &str, keep: u32) -> Result<CmdResult> {
    let message = match client.purge_history(doc_id, keep) {
        Ok(()) => {
            info!(doc = doc_id, keep, "history purged");
            CmdMessage::success(format!(
                "History of document {} purged, {} most recent state(s) kept",
                doc_id, keep
            ))
        }
        Err(GristError::Status { status, body, .. }) => CmdMessage::error(format!(
            "History of document {} not purged: HTTP {} {}",
            doc_id, status, body
        )),
        Err(e) => return Err(e),
    };
    Ok(CmdResult::default().with_message(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::InMemoryGateway;
    use crate::gateway::Method;

    #[test]
    fn sends_keep_count() {
        let gateway =
            InMemoryGateway::new().respond(Method::Post, "docs/abc/states/remove", 200, "");
        let client = GristClient::new(gateway);

        let result = run(&client, "abc", DEFAULT_KEEP).unwrap();
        assert!(!result.has_errors());
        let calls = client.gateway().calls();
        assert_eq!(calls[0].body.as_deref(), Some(r#"{"keep":3}"#));
    }

    #[test]
    fn unknown_document_is_an_error_message() {
        let client = GristClient::new(InMemoryGateway::new());
        let result = run(&client, "zzz", 1).unwrap();
        assert!(result.has_errors());
    }
}
