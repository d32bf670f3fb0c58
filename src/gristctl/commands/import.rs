//! # User Import
//!
//! Bulk access provisioning from a `;`-delimited stream, one grant per line:
//!
//! ```text
//! alice@example.com;7;Reporting;editors
//! ```
//!
//! The pipeline has four stages:
//!
//! 1. **Parse**: each line becomes an [`ImportRecord`] or exactly one
//!    [`LineDiagnostic`]. Blank lines are skipped silently.
//! 2. **Group**: accepted records are grouped by `(org id, workspace name)`. Groups are
//!    processed in that key order, each once.
//! 3. **Resolve**: the workspace is looked up by exact name in its org and created when
//!    missing. A failed creation fails the group; no patch is sent.
//! 4. **Patch**: one access delta carrying every user of the group. The group succeeds
//!    or fails as a whole with that call.
//!
//! Role names are passed through untouched; the server decides whether they are valid.

use crate::client::GristClient;
use crate::commands::{CmdMessage, CmdResult, Output};
use crate::error::Result;
use crate::gateway::Gateway;
use crate::model::UserRole;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::BufRead;
use tracing::{info, warn};

const FIELD_SEPARATOR: char = ';';
const FIELD_COUNT: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRecord {
    pub line: usize,
    pub email: String,
    pub org_id: i64,
    pub workspace: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDiagnostic {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GroupOutcome {
    Imported,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupReport {
    pub org_id: i64,
    pub workspace_name: String,
    pub workspace_id: Option<i64>,
    pub created: bool,
    pub users: Vec<UserRole>,
    #[serde(flatten)]
    pub outcome: GroupOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub groups: Vec<GroupReport>,
    pub diagnostics: Vec<LineDiagnostic>,
}

pub type GroupKey = (i64, String);

pub fn run<G: Gateway, R: BufRead>(client: &GristClient<G>, reader: R) -> Result<CmdResult> {
    let (records, diagnostics) = parse_records(reader)?;
    let mut result = CmdResult::default();

    for diagnostic in &diagnostics {
        result.add_message(CmdMessage::warning(format!(
            "Line {}: {}",
            diagnostic.line, diagnostic.message
        )));
    }

    let mut report = ImportReport {
        groups: Vec::new(),
        diagnostics,
    };

    for ((org_id, workspace_name), records) in group_records(records) {
        let group = import_group(client, org_id, &workspace_name, &records)?;
        match &group.outcome {
            GroupOutcome::Imported => result.add_message(CmdMessage::success(format!(
                "Imported {} {} in workspace n°{}",
                group.users.len(),
                if group.users.len() == 1 { "user" } else { "users" },
                group.workspace_id.unwrap_or_default()
            ))),
            GroupOutcome::Failed { reason } => result.add_message(CmdMessage::error(format!(
                "Import into workspace '{}' of organization {} failed: {}",
                group.workspace_name, group.org_id, reason
            ))),
        }
        report.groups.push(group);
    }

    if report.groups.is_empty() {
        result.add_message(CmdMessage::info("No users to import."));
    }
    Ok(result.with_output(Output::Import(report)))
}

/// Read every line; I/O errors abort, content errors become diagnostics.
pub fn parse_records<R: BufRead>(reader: R) -> Result<(Vec<ImportRecord>, Vec<LineDiagnostic>)> {
    let mut records = Vec::new();
    let mut diagnostics = Vec::new();

    for (index, raw) in reader.split(b'\n').enumerate() {
        let raw = raw?;
        let number = index + 1;
        let line = match std::str::from_utf8(&raw) {
            Ok(line) => line.trim_end_matches('\r'),
            Err(_) => {
                diagnostics.push(LineDiagnostic {
                    line: number,
                    message: "line is not valid UTF-8".to_string(),
                });
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(number, line) {
            Ok(record) => records.push(record),
            Err(message) => diagnostics.push(LineDiagnostic {
                line: number,
                message,
            }),
        }
    }

    Ok((records, diagnostics))
}

fn parse_line(number: usize, line: &str) -> std::result::Result<ImportRecord, String> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).map(str::trim).collect();
    if fields.len() != FIELD_COUNT {
        return Err(format!(
            "malformed line, expected email;orgId;workspace;role but found {} field(s)",
            fields.len()
        ));
    }
    let (email, org, workspace, role) = (fields[0], fields[1], fields[2], fields[3]);

    if !email.contains('@') {
        return Err(format!("invalid email '{}'", email));
    }
    let org_id: i64 = org
        .parse()
        .map_err(|_| format!("invalid organization id '{}'", org))?;
    if workspace.is_empty() {
        return Err("missing workspace name".to_string());
    }
    if role.is_empty() {
        return Err("missing role".to_string());
    }

    Ok(ImportRecord {
        line: number,
        email: email.to_string(),
        org_id,
        workspace: workspace.to_string(),
        role: role.to_string(),
    })
}

/// Group by `(org id, workspace name)`; iteration order is the key order.
pub fn group_records(records: Vec<ImportRecord>) -> BTreeMap<GroupKey, Vec<ImportRecord>> {
    let mut groups: BTreeMap<GroupKey, Vec<ImportRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.org_id, record.workspace.clone()))
            .or_default()
            .push(record);
    }
    groups
}

/// Resolve the workspace and send the one patch. Only fatal errors escape.
fn import_group<G: Gateway>(
    client: &GristClient<G>,
    org_id: i64,
    workspace_name: &str,
    records: &[ImportRecord],
) -> Result<GroupReport> {
    let users = dedupe_users(records);
    let mut report = GroupReport {
        org_id,
        workspace_name: workspace_name.to_string(),
        workspace_id: None,
        created: false,
        users,
        outcome: GroupOutcome::Imported,
    };

    let resolved = match resolve_workspace(client, org_id, workspace_name) {
        Ok(resolved) => resolved,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            warn!(org = org_id, workspace = workspace_name, error = %e, "workspace resolution failed");
            report.outcome = GroupOutcome::Failed {
                reason: e.to_string(),
            };
            return Ok(report);
        }
    };
    report.workspace_id = Some(resolved.0);
    report.created = resolved.1;

    match client.patch_workspace_access(resolved.0, &report.users) {
        Ok(()) => {
            info!(workspace = resolved.0, users = report.users.len(), "access granted");
        }
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            warn!(workspace = resolved.0, error = %e, "access patch failed");
            report.outcome = GroupOutcome::Failed {
                reason: e.to_string(),
            };
        }
    }
    Ok(report)
}

/// Existing workspace id by exact name, else a freshly created one. `(id, created)`.
fn resolve_workspace<G: Gateway>(
    client: &GristClient<G>,
    org_id: i64,
    name: &str,
) -> Result<(i64, bool)> {
    let existing = client
        .org_workspaces(org_id)?
        .into_iter()
        .find(|w| w.name == name);
    if let Some(workspace) = existing {
        return Ok((workspace.id, false));
    }
    let id = client.create_workspace(org_id, name)?;
    info!(org = org_id, workspace = name, id, "workspace created");
    Ok((id, true))
}

/// One entry per email, the last role given winning, in first-seen order.
fn dedupe_users(records: &[ImportRecord]) -> Vec<UserRole> {
    let mut users: Vec<UserRole> = Vec::new();
    for record in records {
        match users.iter_mut().find(|u| u.email == record.email) {
            Some(existing) => existing.role = record.role.clone(),
            None => users.push(UserRole {
                email: record.email.clone(),
                role: record.role.clone(),
            }),
        }
    }
    users
}
