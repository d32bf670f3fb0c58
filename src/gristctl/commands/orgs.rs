use crate::client::GristClient;
use crate::commands::helpers::{fan_out, visible_users, Abort};
use crate::commands::{AccessReport, CmdMessage, CmdResult, Output};
use crate::error::Result;
use crate::gateway::Gateway;
use crate::model::{sort_key, Org};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceSummary {
    pub id: i64,
    pub name: String,
    pub doc_count: usize,
    /// Users with direct access; `None` when the access list could not be read.
    pub direct_users: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrgSummary {
    pub org: Org,
    pub workspaces: Vec<WorkspaceSummary>,
}

pub fn list<G: Gateway>(client: &GristClient<G>) -> Result<CmdResult> {
    let mut orgs = client.orgs()?;
    orgs.sort_by_key(|o| sort_key(&o.name));

    let mut result = CmdResult::default();
    if orgs.is_empty() {
        result.add_message(CmdMessage::info("No organizations found."));
    }
    Ok(result.with_output(Output::Orgs(orgs)))
}

/// The org and its workspaces, with per-workspace direct-user counts fetched concurrently.
pub fn describe<G: Gateway>(client: &GristClient<G>, org_id: i64) -> Result<CmdResult> {
    let org = client.org(org_id)?;
    let workspaces = client.org_workspaces(org.id)?;

    let abort = Abort::default();
    let counts = fan_out(&workspaces, |ws| {
        abort.run(|| client.workspace_access(ws.id)).map(|access| match access {
            Ok(access) => Some(access.users.iter().filter(|u| u.has_direct_access()).count()),
            Err(e) => {
                warn!(workspace = ws.id, error = %e, "could not read workspace access");
                None
            }
        })
    });
    abort.check()?;

    let mut result = CmdResult::default();
    let mut summaries: Vec<WorkspaceSummary> = workspaces
        .iter()
        .zip(counts)
        .map(|(ws, count)| {
            let direct_users = count.flatten();
            if direct_users.is_none() {
                result.add_message(CmdMessage::warning(format!(
                    "Could not read access list of workspace {} (n°{})",
                    ws.name, ws.id
                )));
            }
            WorkspaceSummary {
                id: ws.id,
                name: ws.name.clone(),
                doc_count: ws.docs.len(),
                direct_users,
            }
        })
        .collect();
    summaries.sort_by_key(|s| sort_key(&s.name));

    Ok(result.with_output(Output::Org(OrgSummary {
        org,
        workspaces: summaries,
    })))
}

pub fn access<G: Gateway>(client: &GristClient<G>, org_id: i64) -> Result<CmdResult> {
    let org = client.org(org_id)?;
    let access = client.org_access(org.id)?;

    let report = AccessReport {
        resource: "Organization".to_string(),
        id: org.id.to_string(),
        name: org.name,
        parent: None,
        max_inherited_role: None,
        inheritance: None,
        users: visible_users(access.users, false),
    };
    Ok(CmdResult::default().with_output(Output::Access(report)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::InMemoryGateway;
    use crate::gateway::Method;
    use serde_json::json;

    fn org_summary(result: CmdResult) -> (OrgSummary, Vec<CmdMessage>) {
        match result.output {
            Some(Output::Org(summary)) => (summary, result.messages),
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn list_sorts_case_insensitively() {
        let gateway = InMemoryGateway::new().get_json(
            "orgs",
            &json!([
                {"id": 1, "name": "beta"},
                {"id": 2, "name": "Alpha"},
                {"id": 3, "name": "gamma"}
            ]),
        );
        let client = GristClient::new(gateway);

        let result = list(&client).unwrap();
        let Some(Output::Orgs(orgs)) = result.output else {
            panic!("expected org list");
        };
        let names: Vec<_> = orgs.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "beta", "gamma"]);
    }

    #[test]
    fn describe_counts_direct_users_per_workspace() {
        let gateway = InMemoryGateway::new()
            .get_json("orgs/3", &json!({"id": 3, "name": "Acme"}))
            .get_json(
                "orgs/3/workspaces",
                &json!([
                    {"id": 10, "name": "Sales", "docs": [{"id": "a"}, {"id": "b"}]},
                    {"id": 11, "name": "hr", "docs": []}
                ]),
            )
            .get_json(
                "workspaces/10/access",
                &json!({"users": [
                    {"email": "a@x.org", "access": "owners"},
                    {"email": "b@x.org", "access": "", "parentAccess": "viewers"},
                    {"email": "c@x.org", "access": "editors"}
                ]}),
            )
            .respond(Method::Get, "workspaces/11/access", 403, "denied");
        let client = GristClient::new(gateway);

        let (summary, messages) = org_summary(describe(&client, 3).unwrap());
        assert_eq!(summary.org.name, "Acme");
        assert_eq!(summary.workspaces[0].name, "hr");
        assert_eq!(summary.workspaces[0].direct_users, None);
        assert_eq!(summary.workspaces[1].name, "Sales");
        assert_eq!(summary.workspaces[1].doc_count, 2);
        assert_eq!(summary.workspaces[1].direct_users, Some(2));
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn describe_unknown_org() {
        let client = GristClient::new(InMemoryGateway::new());
        assert_eq!(describe(&client, 99).unwrap_err().kind(), "not_found");
    }

    #[test]
    fn access_keeps_inherited_users() {
        let gateway = InMemoryGateway::new()
            .get_json("orgs/3", &json!({"id": 3, "name": "Acme"}))
            .get_json(
                "orgs/3/access",
                &json!({"users": [
                    {"email": "zoe@x.org", "access": "owners"},
                    {"email": "al@x.org", "access": null, "parentAccess": "members"},
                    {"email": "ghost@x.org", "access": null}
                ]}),
            );
        let client = GristClient::new(gateway);

        let Some(Output::Access(report)) = access(&client, 3).unwrap().output else {
            panic!("expected access report");
        };
        let emails: Vec<_> = report.users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(emails, vec!["al@x.org", "zoe@x.org"]);
    }
}
