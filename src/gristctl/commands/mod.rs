use crate::model::{AccessLevel, Org, User};
use serde::Serialize;

pub mod config;
pub mod delete;
pub mod doc;
pub mod export;
pub mod helpers;
pub mod import;
pub mod orgs;
pub mod purge;
pub mod users;
pub mod workspace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

/// What a command produced, ready for either the table renderer or JSON output.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Output {
    Orgs(Vec<Org>),
    Org(orgs::OrgSummary),
    Access(AccessReport),
    Workspace(workspace::WorkspaceDetails),
    Document(doc::DocSummary),
    Users(Vec<users::UserRow>),
    Import(import::ImportReport),
    Export(export::ExportedFile),
    Csv(String),
    Config(config::ConfigReport),
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub output: Option<Output>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn has_errors(&self) -> bool {
        self.messages
            .iter()
            .any(|m| m.level == MessageLevel::Error)
    }
}

/// Who can reach an org, workspace or document, and how.
#[derive(Debug, Clone, Serialize)]
pub struct AccessReport {
    pub resource: String,
    pub id: String,
    pub name: String,
    /// Containing workspace, for documents.
    pub parent: Option<String>,
    pub max_inherited_role: Option<AccessLevel>,
    pub inheritance: Option<String>,
    pub users: Vec<User>,
}
