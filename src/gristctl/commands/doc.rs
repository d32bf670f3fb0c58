//! Document inspection and document access.
//!
//! `inspect` fetches the document and its table list, then fans out one scoped thread
//! per table. Each thread fetches the table's columns and row ids and assembles a
//! [`TableInspection`]. Results are joined in table-list order and then sorted by table
//! id, so the output never depends on which request finished first.
//!
//! A table whose fetch fails with an HTTP status or an undecodable body is reported as
//! [`TableOutcome::Failed`] and the other tables are still shown. A transport failure
//! aborts the whole inspection.

use crate::client::GristClient;
use crate::commands::helpers::{fan_out, visible_users, Abort};
use crate::commands::{AccessReport, CmdResult, Output};
use crate::error::Result;
use crate::gateway::Gateway;
use crate::model::describe_inheritance;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TableOutcome {
    Inspected { columns: Vec<String>, row_count: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableInspection {
    pub table_id: String,
    #[serde(flatten)]
    pub outcome: TableOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocSummary {
    pub id: String,
    pub name: String,
    pub is_pinned: bool,
    pub workspace_id: Option<i64>,
    pub workspace_name: Option<String>,
    pub tables: Vec<TableInspection>,
}

pub fn inspect<G: Gateway>(client: &GristClient<G>, doc_id: &str) -> Result<CmdResult> {
    let summary = inspect_document(client, doc_id)?;
    Ok(CmdResult::default().with_output(Output::Document(summary)))
}

pub fn inspect_document<G: Gateway>(client: &GristClient<G>, doc_id: &str) -> Result<DocSummary> {
    let doc = client.doc(doc_id)?;
    let tables = client.doc_tables(&doc.id)?;
    debug!(doc = %doc.id, tables = tables.len(), "inspecting document");

    let abort = Abort::default();
    let slots = fan_out(&tables, |table| {
        inspect_table(client, &abort, &doc.id, &table.id)
    });
    abort.check()?;

    let mut inspections: Vec<TableInspection> = slots.into_iter().flatten().collect();
    inspections.sort_by(|a, b| a.table_id.cmp(&b.table_id));

    let workspace = doc.workspace.as_deref();
    Ok(DocSummary {
        id: doc.id.clone(),
        name: doc.name.clone(),
        is_pinned: doc.is_pinned,
        workspace_id: workspace.map(|w| w.id),
        workspace_name: workspace.map(|w| w.name.clone()),
        tables: inspections,
    })
}

/// `None` only when the fan-out was aborted.
fn inspect_table<G: Gateway>(
    client: &GristClient<G>,
    abort: &Abort,
    doc_id: &str,
    table_id: &str,
) -> Option<TableInspection> {
    let columns = abort.run(|| client.table_columns(doc_id, table_id))?;
    let rows = abort.run(|| client.table_rows(doc_id, table_id))?;

    let outcome = match (columns, rows) {
        (Ok(columns), Ok(rows)) => {
            let mut columns: Vec<String> = columns.into_iter().map(|c| c.id).collect();
            columns.sort();
            TableOutcome::Inspected {
                columns,
                row_count: rows.count(),
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!(doc = doc_id, table = table_id, error = %e, "table inspection failed");
            TableOutcome::Failed {
                reason: e.to_string(),
            }
        }
    };

    Some(TableInspection {
        table_id: table_id.to_string(),
        outcome,
    })
}

/// Users holding direct access on the document.
pub fn access<G: Gateway>(client: &GristClient<G>, doc_id: &str) -> Result<CmdResult> {
    let doc = client.doc(doc_id)?;
    let access = client.doc_access(&doc.id)?;

    let parent = doc
        .workspace
        .as_deref()
        .map(|w| format!("{} (n°{})", w.name, w.id));
    let report = AccessReport {
        resource: "Document".to_string(),
        id: doc.id.clone(),
        name: doc.name.clone(),
        parent,
        inheritance: Some(describe_inheritance(access.max_inherited_role.as_ref())),
        max_inherited_role: access.max_inherited_role,
        users: visible_users(access.users, true),
    };
    Ok(CmdResult::default().with_output(Output::Access(report)))
}
