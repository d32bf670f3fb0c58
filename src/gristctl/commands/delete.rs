use crate::client::GristClient;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{GristError, Result};
use crate::gateway::Gateway;
use tracing::info;

pub fn doc<G: Gateway>(client: &GristClient<G>, doc_id: &str) -> Result<CmdResult> {
    let outcome = client.delete_doc(doc_id);
    report(outcome, "Document", doc_id)
}

pub fn workspace<G: Gateway>(client: &GristClient<G>, workspace_id: i64) -> Result<CmdResult> {
    let outcome = client.delete_workspace(workspace_id);
    report(outcome, "Workspace", &workspace_id.to_string())
}

/// Deleting a user requires their exact name as a confirmation token.
pub fn user<G: Gateway>(client: &GristClient<G>, user_id: i64, name: &str) -> Result<CmdResult> {
    let response = client.delete_user(user_id, name)?;
    let message = match response.status {
        200 => {
            info!(user = user_id, "user deleted");
            CmdMessage::success(format!("User {} ({}) deleted", user_id, name))
        }
        400 => CmdMessage::error(format!(
            "User {} not deleted: the name '{}' does not match ({})",
            user_id,
            name,
            response.text()
        )),
        403 => CmdMessage::error(format!(
            "User {} not deleted: not allowed ({})",
            user_id,
            response.text()
        )),
        404 => CmdMessage::error(format!("User {} not found", user_id)),
        status => CmdMessage::error(format!(
            "User {} not deleted: HTTP {} ({})",
            user_id,
            status,
            response.text()
        )),
    };
    Ok(CmdResult::default().with_message(message))
}

fn report(outcome: Result<()>, resource: &str, id: &str) -> Result<CmdResult> {
    let message = match outcome {
        Ok(()) => {
            info!(resource, id, "deleted");
            CmdMessage::success(format!("{} {} deleted", resource, id))
        }
        Err(GristError::Status { status, body, .. }) => CmdMessage::error(format!(
            "{} {} not deleted: HTTP {} {}",
            resource, id, status, body
        )),
        Err(e) => return Err(e),
    };
    Ok(CmdResult::default().with_message(message))
}
