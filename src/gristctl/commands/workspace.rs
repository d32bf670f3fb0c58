use crate::client::GristClient;
use crate::commands::helpers::visible_users;
use crate::commands::{AccessReport, CmdMessage, CmdResult, Output};
use crate::error::Result;
use crate::gateway::Gateway;
use crate::model::{describe_inheritance, sort_key};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DocEntry {
    pub id: String,
    pub name: String,
    pub is_pinned: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceDetails {
    pub org_id: Option<i64>,
    pub org_name: Option<String>,
    pub id: i64,
    pub name: String,
    pub docs: Vec<DocEntry>,
}

pub fn describe<G: Gateway>(client: &GristClient<G>, workspace_id: i64) -> Result<CmdResult> {
    let workspace = client.workspace(workspace_id)?;

    let mut docs: Vec<DocEntry> = workspace
        .docs
        .into_iter()
        .map(|d| DocEntry {
            id: d.id,
            name: d.name,
            is_pinned: d.is_pinned,
        })
        .collect();
    docs.sort_by_key(|d| sort_key(&d.name));

    let mut result = CmdResult::default();
    if docs.is_empty() {
        result.add_message(CmdMessage::info("No documents in this workspace."));
    }

    let details = WorkspaceDetails {
        org_id: workspace.org.as_ref().map(|o| o.id),
        org_name: workspace.org.map(|o| o.name),
        id: workspace.id,
        name: workspace.name,
        docs,
    };
    Ok(result.with_output(Output::Workspace(details)))
}

/// Users with direct or inherited access, plus what the workspace inherits from its org.
pub fn access<G: Gateway>(client: &GristClient<G>, workspace_id: i64) -> Result<CmdResult> {
    let workspace = client.workspace(workspace_id)?;
    let access = client.workspace_access(workspace.id)?;

    let report = AccessReport {
        resource: "Workspace".to_string(),
        id: workspace.id.to_string(),
        name: workspace.name,
        parent: workspace.org.map(|o| o.name),
        inheritance: Some(describe_inheritance(access.max_inherited_role.as_ref())),
        max_inherited_role: access.max_inherited_role,
        users: visible_users(access.users, false),
    };
    Ok(CmdResult::default().with_output(Output::Access(report)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::InMemoryGateway;
    use crate::model::AccessLevel;
    use serde_json::json;

    fn gateway() -> InMemoryGateway {
        InMemoryGateway::new().get_json(
            "workspaces/12",
            &json!({
                "id": 12,
                "name": "Finance",
                "org": {"id": 3, "name": "Acme"},
                "docs": [
                    {"id": "b", "name": "budget", "isPinned": false},
                    {"id": "a", "name": "Accounts", "isPinned": true}
                ]
            }),
        )
    }

    #[test]
    fn describe_sorts_documents_by_name() {
        let client = GristClient::new(gateway());
        let Some(Output::Workspace(details)) = describe(&client, 12).unwrap().output else {
            panic!("expected workspace details");
        };
        assert_eq!(details.org_name.as_deref(), Some("Acme"));
        assert_eq!(details.docs[0].name, "Accounts");
        assert!(details.docs[0].is_pinned);
        assert_eq!(details.docs[1].name, "budget");
    }

    #[test]
    fn describe_unknown_workspace() {
        let client = GristClient::new(InMemoryGateway::new());
        assert_eq!(describe(&client, 5).unwrap_err().kind(), "not_found");
    }

    #[test]
    fn access_translates_inherited_role() {
        let gateway = gateway().get_json(
            "workspaces/12/access",
            &json!({
                "maxInheritedRole": "owners",
                "users": [
                    {"email": "b@x.org", "access": null, "parentAccess": "owners"},
                    {"email": "a@x.org", "access": "viewers"}
                ]
            }),
        );
        let client = GristClient::new(gateway);

        let Some(Output::Access(report)) = access(&client, 12).unwrap().output else {
            panic!("expected access report");
        };
        assert_eq!(report.max_inherited_role, Some(AccessLevel::Owners));
        assert!(report.inheritance.unwrap().starts_with("Full inheritance"));
        assert_eq!(report.users.len(), 2);
        assert_eq!(report.users[0].email, "a@x.org");
    }
}
