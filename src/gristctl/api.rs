//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single entry
//! point for gristctl operations, whatever the UI.
//!
//! The facade:
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs** (parsing ids typed by the user)
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no business logic, no terminal I/O and no formatting.
//!
//! ## Generic Over Gateway
//!
//! `GristApi<G: Gateway>` is generic over the transport:
//! - Production: `GristApi<HttpGateway>`
//! - Testing: `GristApi<InMemoryGateway>`

use crate::client::{ExportFormat, GristClient};
use crate::commands;
use crate::config::GristConfig;
use crate::error::{GristError, Result};
use crate::gateway::Gateway;
use std::io::BufRead;
use std::path::Path;

pub struct GristApi<G: Gateway> {
    client: GristClient<G>,
}

impl<G: Gateway> GristApi<G> {
    pub fn new(gateway: G) -> Self {
        Self {
            client: GristClient::new(gateway),
        }
    }

    pub fn client(&self) -> &GristClient<G> {
        &self.client
    }

    pub fn list_orgs(&self) -> Result<commands::CmdResult> {
        commands::orgs::list(&self.client)
    }

    pub fn describe_org(&self, org_id: &str) -> Result<commands::CmdResult> {
        commands::orgs::describe(&self.client, parse_id(org_id, "organization")?)
    }

    pub fn org_access(&self, org_id: &str) -> Result<commands::CmdResult> {
        commands::orgs::access(&self.client, parse_id(org_id, "organization")?)
    }

    pub fn describe_workspace(&self, workspace_id: &str) -> Result<commands::CmdResult> {
        commands::workspace::describe(&self.client, parse_id(workspace_id, "workspace")?)
    }

    pub fn workspace_access(&self, workspace_id: &str) -> Result<commands::CmdResult> {
        commands::workspace::access(&self.client, parse_id(workspace_id, "workspace")?)
    }

    pub fn inspect_doc(&self, doc_id: &str) -> Result<commands::CmdResult> {
        commands::doc::inspect(&self.client, doc_id)
    }

    pub fn doc_access(&self, doc_id: &str) -> Result<commands::CmdResult> {
        commands::doc::access(&self.client, doc_id)
    }

    pub fn export_doc(
        &self,
        doc_id: &str,
        format: ExportFormat,
        dir: &Path,
    ) -> Result<commands::CmdResult> {
        commands::export::run(&self.client, doc_id, format, dir)
    }

    pub fn table_csv(&self, doc_id: &str, table_id: &str) -> Result<commands::CmdResult> {
        commands::export::table_csv(&self.client, doc_id, table_id)
    }

    pub fn user_matrix(&self) -> Result<commands::CmdResult> {
        commands::users::matrix(&self.client)
    }

    pub fn import_users<R: BufRead>(&self, reader: R) -> Result<commands::CmdResult> {
        commands::import::run(&self.client, reader)
    }

    pub fn purge_doc(&self, doc_id: &str, keep: Option<u32>) -> Result<commands::CmdResult> {
        let keep = keep.unwrap_or(commands::purge::DEFAULT_KEEP);
        commands::purge::run(&self.client, doc_id, keep)
    }

    pub fn delete_doc(&self, doc_id: &str) -> Result<commands::CmdResult> {
        commands::delete::doc(&self.client, doc_id)
    }

    pub fn delete_workspace(&self, workspace_id: &str) -> Result<commands::CmdResult> {
        commands::delete::workspace(&self.client, parse_id(workspace_id, "workspace")?)
    }

    pub fn delete_user(&self, user_id: &str, name: &str) -> Result<commands::CmdResult> {
        commands::delete::user(&self.client, parse_id(user_id, "user")?, name)
    }

    pub fn config_status(&self, config: &GristConfig, path: &Path) -> commands::CmdResult {
        commands::config::show(Some(&self.client), config, path)
    }
}

/// Numeric ids typed on the command line.
fn parse_id(raw: &str, what: &str) -> Result<i64> {
    raw.trim()
        .parse()
        .map_err(|_| GristError::InvalidInput(format!("'{}' is not a valid {} id", raw, what)))
}

pub use crate::commands::{CmdMessage, CmdResult, MessageLevel, Output};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::InMemoryGateway;
    use crate::gateway::Method;

    #[test]
    fn rejects_non_numeric_ids_without_calling_out() {
        let api = GristApi::new(InMemoryGateway::new());
        let err = api.describe_org("acme").unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
        assert!(api.client().gateway().calls().is_empty());
    }

    #[test]
    fn purge_defaults_to_three_states() {
        let gateway =
            InMemoryGateway::new().respond(Method::Post, "docs/d/states/remove", 200, "");
        let api = GristApi::new(gateway);
        api.purge_doc("d", None).unwrap();

        let calls = api.client().gateway().calls();
        assert_eq!(calls[0].body.as_deref(), Some(r#"{"keep":3}"#));
    }

    #[test]
    fn delete_workspace_dispatches_by_id() {
        let gateway = InMemoryGateway::new().respond(Method::Delete, "workspaces/12", 200, "");
        let api = GristApi::new(gateway);
        api.delete_workspace(" 12 ").unwrap();
        assert_eq!(api.client().gateway().count(Method::Delete, "workspaces/12"), 1);
    }
}
