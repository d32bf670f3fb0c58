use std::fmt;
use thiserror::Error;

/// The kind of resource a lookup was aimed at, used in not-found reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Organization,
    Workspace,
    Document,
    User,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Organization => "Organization",
            ResourceKind::Workspace => "Workspace",
            ResourceKind::Document => "Document",
            ResourceKind::User => "User",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum GristError {
    #[error("{kind} {id} not found")]
    NotFound { kind: ResourceKind, id: String },

    #[error("HTTP {status} from {path}: {body}")]
    Status {
        path: String,
        status: u16,
        body: String,
    },

    #[error("Request to {path} failed: {reason}")]
    Transport { path: String, reason: String },

    #[error("Unexpected response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl GristError {
    pub fn not_found(kind: ResourceKind, id: impl ToString) -> Self {
        GristError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Short machine-readable tag, used for structured JSON error output.
    pub fn kind(&self) -> &'static str {
        match self {
            GristError::NotFound { .. } => "not_found",
            GristError::Status { .. } => "remote",
            GristError::Transport { .. } => "transport",
            GristError::Decode { .. } => "decode",
            GristError::Config(_) => "config",
            GristError::Io(_) => "io",
            GristError::Serialization(_) => "serialization",
            GristError::InvalidInput(_) => "invalid_input",
        }
    }

    /// Transport failures abort a whole command, everything else can be reported per unit.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GristError::Transport { .. } | GristError::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, GristError>;
