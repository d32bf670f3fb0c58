//! Wire types for the Grist REST API.
//!
//! Every type here is deserialized from a single HTTP response and lives only for the
//! duration of a command. Field names follow the server's camelCase JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Org {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub docs: Vec<Doc>,
    #[serde(default)]
    pub org: Option<Org>,
    #[serde(default)]
    pub org_domain: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doc {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_pinned: bool,
    /// Display copy of the owning workspace, not an ownership edge.
    #[serde(default)]
    pub workspace: Option<Box<Workspace>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Tables {
    #[serde(default)]
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Columns {
    #[serde(default)]
    pub columns: Vec<Column>,
}

/// Row ids of a table. Only the cardinality is ever used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableRows {
    #[serde(default)]
    pub id: Vec<u64>,
}

impl TableRows {
    pub fn count(&self) -> usize {
        self.id.len()
    }
}

/// A role held on an org, workspace or document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessLevel {
    Owners,
    Editors,
    Viewers,
    Members,
    Guests,
    Other(String),
}

impl AccessLevel {
    pub fn as_str(&self) -> &str {
        match self {
            AccessLevel::Owners => "owners",
            AccessLevel::Editors => "editors",
            AccessLevel::Viewers => "viewers",
            AccessLevel::Members => "members",
            AccessLevel::Guests => "guests",
            AccessLevel::Other(s) => s,
        }
    }
}

impl From<&str> for AccessLevel {
    fn from(value: &str) -> Self {
        match value {
            "owners" => AccessLevel::Owners,
            "editors" => AccessLevel::Editors,
            "viewers" => AccessLevel::Viewers,
            "members" => AccessLevel::Members,
            "guests" => AccessLevel::Guests,
            other => AccessLevel::Other(other.to_string()),
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AccessLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AccessLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(AccessLevel::from(raw.as_str()))
    }
}

/// Human explanation of a `maxInheritedRole` value.
pub fn describe_inheritance(role: Option<&AccessLevel>) -> String {
    match role {
        None => "No inheritance of rights from upper level".to_string(),
        Some(AccessLevel::Owners) => "Full inheritance of rights from the next level up".to_string(),
        Some(AccessLevel::Editors) => {
            "Inherit display and edit rights from higher level".to_string()
        }
        Some(AccessLevel::Viewers) => {
            "Inheritance of consultation rights from higher level".to_string()
        }
        Some(other) => format!("Inheritance level : {}", other),
    }
}

/// One subject's access on a resource (`users[]` in `*/access` responses).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "optional_access")]
    pub access: Option<AccessLevel>,
    #[serde(default, deserialize_with = "optional_access")]
    pub parent_access: Option<AccessLevel>,
}

impl User {
    /// An entry with neither direct nor inherited access conveys nothing.
    pub fn has_any_access(&self) -> bool {
        self.access.is_some() || self.parent_access.is_some()
    }

    pub fn has_direct_access(&self) -> bool {
        self.access.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityAccess {
    #[serde(default, deserialize_with = "optional_access")]
    pub max_inherited_role: Option<AccessLevel>,
    #[serde(default)]
    pub users: Vec<User>,
}

/// An (email, role) pair submitted in an access delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRole {
    pub email: String,
    pub role: String,
}

/// Grist sends both `null` and `""` for "no access".
fn optional_access<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<AccessLevel>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.is_empty())
        .map(|s| AccessLevel::from(s.as_str())))
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }))
}

/// Case-insensitive ordering key used for names and emails in every listing.
pub fn sort_key(value: &str) -> String {
    value.to_lowercase()
}
