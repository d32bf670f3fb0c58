use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.4.2" for releases, "0.4.2@abc1234 2024-01-15 14:30" for dev builds
pub fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    #[default]
    Table,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "gristctl", bin_name = "gristctl", version = get_version())]
#[command(about = "Inspect and administer a Grist server from the command line", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputMode::Table)]
    pub output: OutputMode,

    /// Log HTTP traffic to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show organizations, workspaces, documents or users
    #[command(subcommand)]
    Get(GetCommands),

    /// Bulk-import data from stdin
    #[command(subcommand)]
    Import(ImportCommands),

    /// Remove a document's history
    Purge(PurgeArgs),

    /// Delete a document, workspace or user
    Delete(DeleteArgs),

    /// Show or set the connection settings
    Config {
        /// Grist server URL, e.g. https://docs.getgrist.com
        #[arg(long)]
        url: Option<String>,

        /// API token
        #[arg(long)]
        token: Option<String>,

        /// Prompt for the URL and token
        #[arg(short, long)]
        interactive: bool,
    },

    /// Print the version
    Version,
}

#[derive(Subcommand, Debug)]
pub enum GetCommands {
    /// List organizations, or describe one
    Org {
        /// Organization id
        id: Option<String>,

        view: Option<AccessView>,
    },

    /// Inspect a document, its access, exports or a table as CSV
    Doc {
        /// Document id
        id: String,

        view: Option<DocView>,

        /// Table id (with `table`)
        table: Option<String>,

        /// Target directory for exports
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },

    /// Describe a workspace
    Workspace {
        /// Workspace id
        id: String,

        view: Option<AccessView>,
    },

    /// Every user with direct access to a workspace
    Users,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum AccessView {
    Access,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DocView {
    Access,
    Excel,
    Grist,
    Table,
}

#[derive(Subcommand, Debug)]
pub enum ImportCommands {
    /// Grant workspace roles from `email;org_id;workspace;role` lines on stdin
    Users,
}

#[derive(Args, Debug)]
pub struct PurgeArgs {
    /// Skip the confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub target: PurgeTarget,
}

#[derive(Subcommand, Debug)]
pub enum PurgeTarget {
    /// Keep only the latest states of a document
    Doc {
        id: String,

        /// Number of states to keep (default 3)
        keep: Option<u32>,
    },
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Skip the confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub target: DeleteTarget,
}

#[derive(Subcommand, Debug)]
pub enum DeleteTarget {
    Doc {
        id: String,
    },
    Workspace {
        id: String,
    },
    User {
        id: String,

        /// The user's name, which the server checks before deleting
        #[arg(long)]
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn get_org_without_id_lists() {
        let cli = parse(&["gristctl", "get", "org"]);
        assert!(matches!(
            cli.command,
            Commands::Get(GetCommands::Org { id: None, view: None })
        ));
        assert_eq!(cli.output, OutputMode::Table);
    }

    #[test]
    fn get_org_access() {
        let cli = parse(&["gristctl", "get", "org", "7", "access"]);
        match cli.command {
            Commands::Get(GetCommands::Org { id, view }) => {
                assert_eq!(id.as_deref(), Some("7"));
                assert_eq!(view, Some(AccessView::Access));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn get_doc_table_with_global_json() {
        let cli = parse(&["gristctl", "-o", "json", "get", "doc", "abc", "table", "People"]);
        assert_eq!(cli.output, OutputMode::Json);
        match cli.command {
            Commands::Get(GetCommands::Doc { id, view, table, .. }) => {
                assert_eq!(id, "abc");
                assert_eq!(view, Some(DocView::Table));
                assert_eq!(table.as_deref(), Some("People"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn get_doc_export_dir() {
        let cli = parse(&["gristctl", "get", "doc", "abc", "excel", "--dir", "/tmp/out"]);
        match cli.command {
            Commands::Get(GetCommands::Doc { view, dir, .. }) => {
                assert_eq!(view, Some(DocView::Excel));
                assert_eq!(dir, PathBuf::from("/tmp/out"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unknown_doc_view_is_rejected() {
        assert!(Cli::try_parse_from(["gristctl", "get", "doc", "abc", "pdf"]).is_err());
    }

    #[test]
    fn purge_with_keep_and_yes() {
        let cli = parse(&["gristctl", "purge", "doc", "abc", "5", "--yes"]);
        match cli.command {
            Commands::Purge(PurgeArgs {
                yes,
                target: PurgeTarget::Doc { id, keep },
            }) => {
                assert!(yes);
                assert_eq!(id, "abc");
                assert_eq!(keep, Some(5));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn delete_user_requires_name() {
        assert!(Cli::try_parse_from(["gristctl", "delete", "user", "12"]).is_err());
        let cli = parse(&["gristctl", "delete", "-y", "user", "12", "--name", "Ada"]);
        match cli.command {
            Commands::Delete(DeleteArgs {
                yes,
                target: DeleteTarget::User { id, name },
            }) => {
                assert!(yes);
                assert_eq!(id, "12");
                assert_eq!(name, "Ada");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn verbose_is_global() {
        let cli = parse(&["gristctl", "get", "users", "-v"]);
        assert!(cli.verbose);
    }
}
