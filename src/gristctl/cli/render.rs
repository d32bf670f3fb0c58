//! # Rendering
//!
//! Turns a [`CmdResult`] into terminal text, either styled tables through the template
//! system or pretty-printed JSON.
//!
//! Every table-mode view is the same shape: a title, a few labelled facts, and an
//! optional table. Widths and truncation are computed here with `unicode-width`, so
//! the template only decides styles.

use super::styles::{names, GRIST_THEME};
use super::templates::{MESSAGES_TEMPLATE, VIEW_TEMPLATE};
use super::theme::{render, render_with_color};
use chrono::{DateTime, Utc};
use gristctl::api::{CmdMessage, MessageLevel, Output};
use gristctl::commands::config::{ConfigReport, Connection};
use gristctl::commands::doc::{DocSummary, TableOutcome};
use gristctl::commands::import::{GroupOutcome, ImportReport};
use gristctl::commands::orgs::OrgSummary;
use gristctl::commands::users::UserRow;
use gristctl::commands::workspace::WorkspaceDetails;
use gristctl::commands::AccessReport;
use gristctl::error::GristError;
use gristctl::model::{AccessLevel, Org};
use serde::Serialize;
use serde_json::json;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const MAX_CELL_WIDTH: usize = 48;
pub const COLUMN_GAP: &str = "  ";
pub const PIN_MARKER: &str = "⚲";

#[derive(Serialize, Clone)]
struct Cell {
    text: String,
    style: String,
}

#[derive(Serialize)]
struct Fact {
    label: String,
    value: String,
    style: String,
}

#[derive(Serialize, Default)]
struct ViewData {
    title: String,
    facts: Vec<Fact>,
    has_table: bool,
    empty: bool,
    empty_message: String,
    header: Vec<Cell>,
    rows: Vec<Vec<Cell>>,
}

impl ViewData {
    fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    fn fact(mut self, label: &str, value: impl Into<String>, style: &str) -> Self {
        self.facts.push(Fact {
            label: label.to_string(),
            value: value.into(),
            style: style.to_string(),
        });
        self
    }

    fn table(mut self, table: TableLayout, empty_message: &str) -> Self {
        self.has_table = true;
        self.empty = table.rows.is_empty();
        self.empty_message = empty_message.to_string();
        let (header, rows) = table.layout();
        self.header = header;
        self.rows = rows;
        self
    }

    /// Pad fact labels to a common width.
    fn align_facts(mut self) -> Self {
        let width = self
            .facts
            .iter()
            .map(|f| f.label.width())
            .max()
            .unwrap_or(0);
        for fact in &mut self.facts {
            let pad = width.saturating_sub(fact.label.width());
            fact.label = format!("{}:{} ", fact.label, " ".repeat(pad));
        }
        self
    }
}

/// Columns and styled rows, laid out on render.
struct TableLayout {
    headers: Vec<&'static str>,
    rows: Vec<Vec<(String, &'static str)>>,
}

impl TableLayout {
    fn new(headers: &[&'static str]) -> Self {
        Self {
            headers: headers.to_vec(),
            rows: Vec::new(),
        }
    }

    fn row(&mut self, cells: Vec<(String, &'static str)>) {
        self.rows.push(cells);
    }

    fn layout(self) -> (Vec<Cell>, Vec<Vec<Cell>>) {
        let rows: Vec<Vec<(String, &str)>> = self
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|(text, style)| (truncate_to_width(&text, MAX_CELL_WIDTH), style))
                    .collect()
            })
            .collect();

        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &rows {
            for (i, (text, _)) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(text.width());
                }
            }
        }

        let last = widths.len().saturating_sub(1);
        let pad = |i: usize, text: &str| -> String {
            if i == last {
                text.to_string()
            } else {
                let fill = widths[i].saturating_sub(text.width());
                format!("{}{}{}", text, " ".repeat(fill), COLUMN_GAP)
            }
        };

        let header = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| Cell {
                text: pad(i, h),
                style: names::HEADER.to_string(),
            })
            .collect();
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(i, (text, style))| Cell {
                        text: pad(i, text),
                        style: style.to_string(),
                    })
                    .collect()
            })
            .collect();
        (header, rows)
    }
}

/// Table-mode text for a command output.
pub fn render_output(output: &Output) -> String {
    render_output_internal(output, None)
}

fn render_output_internal(output: &Output, use_color: Option<bool>) -> String {
    let view = match output {
        Output::Orgs(orgs) => orgs_view(orgs),
        Output::Org(summary) => org_view(summary),
        Output::Access(report) => access_view(report),
        Output::Workspace(details) => workspace_view(details),
        Output::Document(summary) => document_view(summary),
        Output::Users(rows) => users_view(rows),
        Output::Import(report) => import_view(report),
        Output::Config(report) => config_view(report),
        // The success message already names the file.
        Output::Export(_) => return String::new(),
        Output::Csv(csv) => return csv.clone(),
    };

    match use_color {
        Some(c) => render_with_color(VIEW_TEMPLATE, &view, &GRIST_THEME, c),
        None => render(VIEW_TEMPLATE, &view, &GRIST_THEME),
    }
    .unwrap_or_else(|e| format!("Render error: {}\n", e))
}

fn orgs_view(orgs: &[Org]) -> ViewData {
    let mut table = TableLayout::new(&["ID", "Name", "Domain", "Created"]);
    for org in orgs {
        table.row(vec![
            (org.id.to_string(), names::ID),
            (org.name.clone(), names::REGULAR),
            (org.domain.clone().unwrap_or_default(), names::MUTED),
            (
                org.created_at.map(format_time_ago).unwrap_or_default(),
                names::MUTED,
            ),
        ]);
    }
    ViewData::new("Organizations").table(table, "No organizations found.")
}

fn org_view(summary: &OrgSummary) -> ViewData {
    let mut table = TableLayout::new(&["ID", "Workspace", "Documents", "Direct users"]);
    for ws in &summary.workspaces {
        let (users, style) = match ws.direct_users {
            Some(n) => (n.to_string(), names::REGULAR),
            None => ("?".to_string(), names::FAILED),
        };
        table.row(vec![
            (ws.id.to_string(), names::ID),
            (ws.name.clone(), names::REGULAR),
            (ws.doc_count.to_string(), names::REGULAR),
            (users, style),
        ]);
    }
    ViewData::new(format!(
        "Organization n°{} {}",
        summary.org.id, summary.org.name
    ))
    .fact(
        "Domain",
        summary.org.domain.clone().unwrap_or_default(),
        names::REGULAR,
    )
    .fact(
        "Workspaces",
        summary.workspaces.len().to_string(),
        names::REGULAR,
    )
    .align_facts()
    .table(table, "No workspaces.")
}

fn access_view(report: &AccessReport) -> ViewData {
    let mut table = TableLayout::new(&["Email", "Name", "Direct", "Inherited"]);
    for user in &report.users {
        table.row(vec![
            (user.email.clone(), names::REGULAR),
            (user.name.clone(), names::MUTED),
            (role_text(user.access.as_ref()), names::ROLE),
            (role_text(user.parent_access.as_ref()), names::MUTED),
        ]);
    }

    let mut view = ViewData::new(format!(
        "{} {} {}: access",
        report.resource, report.id, report.name
    ));
    if let Some(parent) = &report.parent {
        view = view.fact("In", parent.clone(), names::REGULAR);
    }
    if let Some(inheritance) = &report.inheritance {
        view = view.fact("Inheritance", inheritance.clone(), names::REGULAR);
    }
    view.align_facts().table(table, "No users.")
}

fn workspace_view(details: &WorkspaceDetails) -> ViewData {
    let mut table = TableLayout::new(&["ID", "Document", "Pinned"]);
    for doc in &details.docs {
        let pin = if doc.is_pinned { PIN_MARKER } else { "" };
        table.row(vec![
            (doc.id.clone(), names::ID),
            (doc.name.clone(), names::REGULAR),
            (pin.to_string(), names::PINNED),
        ]);
    }

    let org = match (details.org_id, &details.org_name) {
        (Some(id), Some(name)) => format!("n°{} {}", id, name),
        _ => "-".to_string(),
    };
    ViewData::new(format!("Workspace n°{} {}", details.id, details.name))
        .fact("Organization", org, names::REGULAR)
        .align_facts()
        .table(table, "No documents.")
}

fn document_view(summary: &DocSummary) -> ViewData {
    let mut table = TableLayout::new(&["Table", "Rows", "Columns"]);
    for table_result in &summary.tables {
        match &table_result.outcome {
            TableOutcome::Inspected { columns, row_count } => table.row(vec![
                (table_result.table_id.clone(), names::ID),
                (row_count.to_string(), names::REGULAR),
                (columns.join(", "), names::MUTED),
            ]),
            TableOutcome::Failed { .. } => table.row(vec![
                (table_result.table_id.clone(), names::ID),
                ("?".to_string(), names::FAILED),
                (
                    format!("inspection failed for table {}", table_result.table_id),
                    names::FAILED,
                ),
            ]),
        }
    }

    let workspace = match (summary.workspace_id, &summary.workspace_name) {
        (Some(id), Some(name)) => format!("n°{} {}", id, name),
        _ => "-".to_string(),
    };
    let mut title = format!("Document {} {}", summary.id, summary.name);
    if summary.is_pinned {
        title = format!("{} {}", title, PIN_MARKER);
    }
    ViewData::new(title)
        .fact("Workspace", workspace, names::REGULAR)
        .fact("Tables", summary.tables.len().to_string(), names::REGULAR)
        .align_facts()
        .table(table, "No tables.")
}

fn users_view(rows: &[UserRow]) -> ViewData {
    let mut table = TableLayout::new(&[
        "ID",
        "Email",
        "Name",
        "Organization",
        "Workspace",
        "Inherited",
        "Direct",
    ]);
    for row in rows {
        table.row(vec![
            (row.user_id.to_string(), names::ID),
            (row.email.clone(), names::REGULAR),
            (row.name.clone(), names::MUTED),
            (format!("n°{} {}", row.org_id, row.org_name), names::REGULAR),
            (
                format!("n°{} {}", row.workspace_id, row.workspace_name),
                names::REGULAR,
            ),
            (role_text(row.inherited.as_ref()), names::MUTED),
            (row.direct.to_string(), names::ROLE),
        ]);
    }
    ViewData::new("Users with direct access").table(table, "No users.")
}

fn import_view(report: &ImportReport) -> ViewData {
    let mut table = TableLayout::new(&["Org", "Workspace", "ID", "Users", "Result"]);
    for group in &report.groups {
        let (result, style) = match &group.outcome {
            GroupOutcome::Imported if group.created => ("imported (created)".to_string(), names::SUCCESS),
            GroupOutcome::Imported => ("imported".to_string(), names::SUCCESS),
            GroupOutcome::Failed { reason } => (format!("failed: {}", reason), names::FAILED),
        };
        table.row(vec![
            (group.org_id.to_string(), names::ID),
            (group.workspace_name.clone(), names::REGULAR),
            (
                group
                    .workspace_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                names::ID,
            ),
            (group.users.len().to_string(), names::REGULAR),
            (result, style),
        ]);
    }
    ViewData::new("User import")
        .fact("Groups", report.groups.len().to_string(), names::REGULAR)
        .fact(
            "Rejected lines",
            report.diagnostics.len().to_string(),
            if report.diagnostics.is_empty() {
                names::REGULAR
            } else {
                names::WARNING
            },
        )
        .align_facts()
        .table(table, "Nothing imported.")
}

fn config_view(report: &ConfigReport) -> ViewData {
    let (connection, style) = match &report.connection {
        Connection::Connected { orgs } => {
            (format!("ok ({} organizations)", orgs), names::SUCCESS)
        }
        Connection::Failed { reason } => (format!("failed: {}", reason), names::FAILED),
        Connection::NotConfigured => ("not configured".to_string(), names::WARNING),
    };
    ViewData::new("Configuration")
        .fact("File", report.path.display().to_string(), names::MUTED)
        .fact(
            "URL",
            report.url.clone().unwrap_or_else(|| "-".to_string()),
            names::REGULAR,
        )
        .fact("Token", report.token.clone(), names::MUTED)
        .fact("Connection", connection, style)
        .align_facts()
}

fn role_text(role: Option<&AccessLevel>) -> String {
    role.map(|r| r.to_string()).unwrap_or_default()
}

#[derive(Serialize)]
struct MessageData {
    content: String,
    style: String,
}

#[derive(Serialize)]
struct MessagesData {
    messages: Vec<MessageData>,
}

pub fn render_messages(messages: &[CmdMessage]) -> String {
    render_messages_internal(messages, None)
}

fn render_messages_internal(messages: &[CmdMessage], use_color: Option<bool>) -> String {
    if messages.is_empty() {
        return String::new();
    }

    let data = MessagesData {
        messages: messages
            .iter()
            .map(|msg| {
                let style = match msg.level {
                    MessageLevel::Info => names::INFO,
                    MessageLevel::Success => names::SUCCESS,
                    MessageLevel::Warning => names::WARNING,
                    MessageLevel::Error => names::ERROR,
                };
                MessageData {
                    content: msg.content.clone(),
                    style: style.to_string(),
                }
            })
            .collect(),
    };

    match use_color {
        Some(c) => render_with_color(MESSAGES_TEMPLATE, &data, &GRIST_THEME, c),
        None => render(MESSAGES_TEMPLATE, &data, &GRIST_THEME),
    }
    .unwrap_or_else(|_| {
        messages
            .iter()
            .map(|m| format!("{}\n", m.content))
            .collect()
    })
}

pub fn print_messages(messages: &[CmdMessage]) {
    let output = render_messages(messages);
    if !output.is_empty() {
        print!("{}", output);
    }
}

/// Pretty JSON for any serializable value.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\":{{\"kind\":\"serialization\",\"message\":\"{}\"}}}}", e))
}

pub fn render_json_messages(messages: &[CmdMessage]) -> String {
    render_json(&json!({ "messages": messages }))
}

pub fn render_json_error(error: &GristError) -> String {
    render_json(&json!({
        "error": {
            "kind": error.kind(),
            "message": error.to_string(),
        }
    }))
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    timeago::Formatter::new().convert(duration.to_std().unwrap_or_default())
}
