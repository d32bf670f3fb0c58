use crate::client::GristClient;
use crate::commands::helpers::{fan_out, Abort};
use crate::commands::{CmdMessage, CmdResult, Output};
use crate::error::Result;
use crate::gateway::Gateway;
use crate::model::{sort_key, AccessLevel};
use serde::Serialize;
use tracing::warn;

/// One user's direct access on one workspace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRow {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub org_id: i64,
    pub org_name: String,
    pub workspace_id: i64,
    pub workspace_name: String,
    pub inherited: Option<AccessLevel>,
    pub direct: AccessLevel,
}

/// Every user holding direct access on any workspace of any visible org.
///
/// Orgs are walked one after the other; the access lists of an org's workspaces are
/// fetched concurrently.
pub fn matrix<G: Gateway>(client: &GristClient<G>) -> Result<CmdResult> {
    let orgs = client.orgs()?;
    let mut result = CmdResult::default();
    let mut rows = Vec::new();

    for org in &orgs {
        let workspaces = match client.org_workspaces(org.id) {
            Ok(workspaces) => workspaces,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(org = org.id, error = %e, "could not list workspaces");
                result.add_message(CmdMessage::warning(format!(
                    "Could not list workspaces of organization {} (n°{})",
                    org.name, org.id
                )));
                continue;
            }
        };

        let abort = Abort::default();
        let lists = fan_out(&workspaces, |ws| {
            abort.run(|| client.workspace_access(ws.id))
        });
        abort.check()?;

        for (ws, access) in workspaces.iter().zip(lists.into_iter().flatten()) {
            let access = match access {
                Ok(access) => access,
                Err(e) => {
                    warn!(workspace = ws.id, error = %e, "could not read workspace access");
                    result.add_message(CmdMessage::warning(format!(
                        "Could not read access list of workspace {} (n°{})",
                        ws.name, ws.id
                    )));
                    continue;
                }
            };
            for user in access.users {
                let Some(direct) = user.access else {
                    continue;
                };
                rows.push(UserRow {
                    user_id: user.id,
                    email: user.email,
                    name: user.name,
                    org_id: org.id,
                    org_name: org.name.clone(),
                    workspace_id: ws.id,
                    workspace_name: ws.name.clone(),
                    inherited: user.parent_access,
                    direct,
                });
            }
        }
    }

    rows.sort_by(|a, b| {
        sort_key(&a.email)
            .cmp(&sort_key(&b.email))
            .then(a.org_id.cmp(&b.org_id))
            .then_with(|| a.workspace_name.cmp(&b.workspace_name))
    });

    if rows.is_empty() {
        result.add_message(CmdMessage::info("No users with direct access found."));
    }
    Ok(result.with_output(Output::Users(rows)))
}
