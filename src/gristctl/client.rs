//! Typed endpoints over a [`Gateway`].
//!
//! Each method maps one REST call to one typed value. Non-2xx answers become
//! [`GristError::Status`] (or [`GristError::NotFound`] for lookups of a single
//! resource), and bodies that do not decode become [`GristError::Decode`].

use crate::error::{GristError, ResourceKind, Result};
use crate::gateway::{Gateway, Method, Response};
use crate::model::{
    Column, Columns, Doc, EntityAccess, Org, Table, TableRows, Tables, UserRole, Workspace,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

/// Binary download formats offered by `docs/{id}/download`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Grist,
    Excel,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Grist => "grist",
            ExportFormat::Excel => "xlsx",
        }
    }

    fn download_path(&self, doc_id: &str) -> String {
        match self {
            ExportFormat::Grist => format!("docs/{}/download", doc_id),
            ExportFormat::Excel => format!("docs/{}/download/xlsx", doc_id),
        }
    }
}

pub struct GristClient<G: Gateway> {
    gateway: G,
}

impl<G: Gateway> GristClient<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn orgs(&self) -> Result<Vec<Org>> {
        self.get_json("orgs")
    }

    pub fn org(&self, id: i64) -> Result<Org> {
        let org: Org = found(
            self.get_json(&format!("orgs/{}", id)),
            ResourceKind::Organization,
            id,
        )?;
        if org.id == 0 {
            return Err(GristError::not_found(ResourceKind::Organization, id));
        }
        Ok(org)
    }

    pub fn org_access(&self, id: i64) -> Result<EntityAccess> {
        found(
            self.get_json(&format!("orgs/{}/access", id)),
            ResourceKind::Organization,
            id,
        )
    }

    pub fn org_workspaces(&self, id: i64) -> Result<Vec<Workspace>> {
        found(
            self.get_json(&format!("orgs/{}/workspaces", id)),
            ResourceKind::Organization,
            id,
        )
    }

    pub fn workspace(&self, id: i64) -> Result<Workspace> {
        let workspace: Workspace = found(
            self.get_json(&format!("workspaces/{}", id)),
            ResourceKind::Workspace,
            id,
        )?;
        if workspace.id == 0 {
            return Err(GristError::not_found(ResourceKind::Workspace, id));
        }
        Ok(workspace)
    }

    pub fn workspace_access(&self, id: i64) -> Result<EntityAccess> {
        found(
            self.get_json(&format!("workspaces/{}/access", id)),
            ResourceKind::Workspace,
            id,
        )
    }

    /// Fetch a document. An empty id, a 404 or a record without id are all "not found".
    pub fn doc(&self, id: &str) -> Result<Doc> {
        if id.trim().is_empty() {
            return Err(GristError::not_found(ResourceKind::Document, id));
        }
        validate_doc_id(id)?;
        let doc: Doc = found(
            self.get_json(&format!("docs/{}", id)),
            ResourceKind::Document,
            id,
        )?;
        if doc.id.is_empty() {
            return Err(GristError::not_found(ResourceKind::Document, id));
        }
        Ok(doc)
    }

    pub fn doc_access(&self, id: &str) -> Result<EntityAccess> {
        validate_doc_id(id)?;
        found(
            self.get_json(&format!("docs/{}/access", id)),
            ResourceKind::Document,
            id,
        )
    }

    pub fn doc_tables(&self, id: &str) -> Result<Vec<Table>> {
        validate_doc_id(id)?;
        let tables: Tables = self.get_json(&format!("docs/{}/tables", id))?;
        Ok(tables.tables)
    }

    pub fn table_columns(&self, doc_id: &str, table_id: &str) -> Result<Vec<Column>> {
        validate_doc_id(doc_id)?;
        validate_table_id(table_id)?;
        let columns: Columns =
            self.get_json(&format!("docs/{}/tables/{}/columns", doc_id, table_id))?;
        Ok(columns.columns)
    }

    pub fn table_rows(&self, doc_id: &str, table_id: &str) -> Result<TableRows> {
        validate_doc_id(doc_id)?;
        validate_table_id(table_id)?;
        self.get_json(&format!("docs/{}/tables/{}/data", doc_id, table_id))
    }

    pub fn download(&self, doc_id: &str, format: ExportFormat) -> Result<Vec<u8>> {
        validate_doc_id(doc_id)?;
        let path = format.download_path(doc_id);
        let response = self.call(Method::Get, &path, None)?;
        Ok(found(ensure_success(&path, response), ResourceKind::Document, doc_id)?.body)
    }

    pub fn table_csv(&self, doc_id: &str, table_id: &str) -> Result<String> {
        validate_doc_id(doc_id)?;
        validate_table_id(table_id)?;
        let path = format!("docs/{}/download/csv?tableId={}", doc_id, table_id);
        let response = self.call(Method::Get, &path, None)?;
        Ok(ensure_success(&path, response)?.text())
    }

    /// Create a workspace and return its id (the server answers with a bare integer).
    pub fn create_workspace(&self, org_id: i64, name: &str) -> Result<i64> {
        let path = format!("orgs/{}/workspaces", org_id);
        let body = json!({ "name": name });
        let response = self.call(Method::Post, &path, Some(&body))?;
        let response = ensure_success(&path, response)?;
        let id: i64 = decode(&path, &response)?;
        if id <= 0 {
            return Err(GristError::Status {
                path,
                status: response.status,
                body: format!("no usable workspace id in response: {}", response.text()),
            });
        }
        Ok(id)
    }

    /// Submit one access delta for all `users`. Later entries for the same email win.
    pub fn patch_workspace_access(&self, workspace_id: i64, users: &[UserRole]) -> Result<()> {
        let path = format!("workspaces/{}/access", workspace_id);
        let delta: BTreeMap<&str, &str> = users
            .iter()
            .map(|u| (u.email.as_str(), u.role.as_str()))
            .collect();
        let body = json!({ "delta": { "users": delta } });
        let response = self.call(Method::Patch, &path, Some(&body))?;
        ensure_success(&path, response).map(|_| ())
    }

    pub fn delete_doc(&self, id: &str) -> Result<()> {
        validate_doc_id(id)?;
        let path = format!("docs/{}", id);
        let response = self.call(Method::Delete, &path, None)?;
        ensure_success(&path, response).map(|_| ())
    }

    pub fn delete_workspace(&self, id: i64) -> Result<()> {
        let path = format!("workspaces/{}", id);
        let response = self.call(Method::Delete, &path, None)?;
        ensure_success(&path, response).map(|_| ())
    }

    /// Raw response: the caller maps 400/403/404 to distinct messages.
    pub fn delete_user(&self, id: i64, name: &str) -> Result<Response> {
        let body = json!({ "name": name });
        self.call(Method::Delete, &format!("users/{}", id), Some(&body))
    }

    pub fn purge_history(&self, doc_id: &str, keep: u32) -> Result<()> {
        validate_doc_id(doc_id)?;
        let path = format!("docs/{}/states/remove", doc_id);
        let body = json!({ "keep": keep });
        let response = self.call(Method::Post, &path, Some(&body))?;
        ensure_success(&path, response).map(|_| ())
    }

    fn call(&self, method: Method, path: &str, body: Option<&serde_json::Value>) -> Result<Response> {
        let payload = body.map(serde_json::to_string).transpose()?;
        self.gateway.request(method, path, payload.as_deref())
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.call(Method::Get, path, None)?;
        let response = ensure_success(path, response)?;
        decode(path, &response)
    }
}

fn ensure_success(path: &str, response: Response) -> Result<Response> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(GristError::Status {
            path: path.to_string(),
            status: response.status,
            body: response.text(),
        })
    }
}

fn decode<T: DeserializeOwned>(path: &str, response: &Response) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(|source| GristError::Decode {
        path: path.to_string(),
        source,
    })
}

/// Turn a 404 on a single-resource lookup into `NotFound`.
fn found<T>(result: Result<T>, kind: ResourceKind, id: impl ToString) -> Result<T> {
    match result {
        Err(GristError::Status { status: 404, .. }) => Err(GristError::not_found(kind, id)),
        other => other,
    }
}

/// Document ids are url ids (letters, digits, `-`, `_`). They become a path segment,
/// so `/`, `.` and escapes must never reach the URL.
fn validate_doc_id(doc_id: &str) -> Result<()> {
    let valid = !doc_id.is_empty()
        && doc_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(GristError::InvalidInput(format!(
            "'{}' is not a valid document id",
            doc_id
        )))
    }
}

/// Table ids are identifiers; anything else would need escaping in the query string.
fn validate_table_id(table_id: &str) -> Result<()> {
    let valid = !table_id.is_empty()
        && table_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(GristError::InvalidInput(format!(
            "'{}' is not a valid table id",
            table_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::InMemoryGateway;
    use serde_json::json;

    #[test]
    fn doc_lookup_maps_404_to_not_found() {
        let client = GristClient::new(InMemoryGateway::new());
        let err = client.doc("missingDoc123").unwrap_err();
        assert!(matches!(
            err,
            GristError::NotFound {
                kind: ResourceKind::Document,
                ..
            }
        ));
    }

    #[test]
    fn empty_doc_id_is_not_found_without_a_request() {
        let client = GristClient::new(InMemoryGateway::new());
        assert!(client.doc("").is_err());
        assert!(client.gateway().calls().is_empty());
    }

    #[test]
    fn zero_org_id_is_not_found() {
        let gateway = InMemoryGateway::new().get_json("orgs/5", &json!({"id": 0, "name": ""}));
        let client = GristClient::new(gateway);
        assert_eq!(client.org(5).unwrap_err().kind(), "not_found");
    }

    #[test]
    fn non_success_status_keeps_the_body() {
        let gateway = InMemoryGateway::new().respond(Method::Get, "orgs", 500, "boom");
        let client = GristClient::new(gateway);
        match client.orgs().unwrap_err() {
            GristError::Status { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn undecodable_body_is_a_decode_error() {
        let gateway = InMemoryGateway::new().respond(Method::Get, "docs/d/tables", 200, "<html>");
        let client = GristClient::new(gateway);
        assert_eq!(client.doc_tables("d").unwrap_err().kind(), "decode");
    }

    #[test]
    fn create_workspace_returns_the_new_id() {
        let gateway =
            InMemoryGateway::new().respond(Method::Post, "orgs/7/workspaces", 200, "42");
        let client = GristClient::new(gateway);
        assert_eq!(client.create_workspace(7, "Reporting").unwrap(), 42);

        let calls = client.gateway().calls();
        let body: serde_json::Value =
            serde_json::from_str(calls[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "Reporting"}));
    }

    #[test]
    fn patch_body_is_a_user_delta() {
        let gateway =
            InMemoryGateway::new().respond(Method::Patch, "workspaces/42/access", 200, "");
        let client = GristClient::new(gateway);
        let users = vec![
            UserRole {
                email: "a@x.org".into(),
                role: "viewers".into(),
            },
            UserRole {
                email: "a@x.org".into(),
                role: "editors".into(),
            },
        ];
        client.patch_workspace_access(42, &users).unwrap();

        let calls = client.gateway().calls();
        let body: serde_json::Value =
            serde_json::from_str(calls[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"delta": {"users": {"a@x.org": "editors"}}}));
    }

    #[test]
    fn doc_ids_cannot_escape_their_path_segment() {
        let client = GristClient::new(InMemoryGateway::new());
        for id in ["x/../../workspaces/5", "a/../b", "d1/tables", "..", "d1?x=1", "d%2F1"] {
            assert_eq!(client.delete_doc(id).unwrap_err().kind(), "invalid_input");
            assert_eq!(client.doc(id).unwrap_err().kind(), "invalid_input");
            assert_eq!(client.purge_history(id, 3).unwrap_err().kind(), "invalid_input");
            assert_eq!(
                client.download(id, ExportFormat::Grist).unwrap_err().kind(),
                "invalid_input"
            );
        }
        assert!(client.gateway().calls().is_empty());
    }

    #[test]
    fn table_csv_rejects_odd_table_ids() {
        let client = GristClient::new(InMemoryGateway::new());
        assert_eq!(
            client.table_csv("d", "Bad Name&x=1").unwrap_err().kind(),
            "invalid_input"
        );
        assert!(client.gateway().calls().is_empty());
    }

    #[test]
    fn excel_download_path() {
        let gateway =
            InMemoryGateway::new().respond(Method::Get, "docs/d/download/xlsx", 200, "PK");
        let client = GristClient::new(gateway);
        assert_eq!(client.download("d", ExportFormat::Excel).unwrap(), b"PK");
    }
}
