//! # CLI Layer
//!
//! This module is **one possible UI client** for gristctl. It is not the application itself.
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr, prompts)
//! - Uses `std::process::exit`
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Flow
//!
//! 1. Parse arguments with clap and install the tracing subscriber
//! 2. Load [`GristConfig`] once and build the [`HttpGateway`] from it
//! 3. Dispatch to a `GristApi` method, which returns a `CmdResult`
//! 4. Render the result as a table or JSON; exit 1 if it carries an error message
//!
//! CLI tests should **not** test business logic. That's the command layer's job.

use super::render::{
    print_messages, render_json, render_json_error, render_json_messages, render_messages,
    render_output,
};
use super::setup::{
    get_version, AccessView, Cli, Commands, DeleteArgs, DeleteTarget, DocView, GetCommands,
    ImportCommands, OutputMode, PurgeArgs, PurgeTarget,
};
use clap::Parser;
use console::Term;
use gristctl::api::{CmdMessage, CmdResult, GristApi, Output};
use gristctl::client::ExportFormat;
use gristctl::commands;
use gristctl::config::GristConfig;
use gristctl::error::{GristError, Result};
use gristctl::gateway::http::HttpGateway;
use std::path::Path;
use tracing::Level;

struct AppContext {
    api: GristApi<HttpGateway>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Version = cli.command {
        println!("gristctl {}", get_version());
        return Ok(());
    }

    let mode = cli.output;
    let result = match dispatch(cli.command) {
        Ok(result) => result,
        Err(e) if mode == OutputMode::Json => {
            println!("{}", render_json_error(&e));
            std::process::exit(1);
        }
        Err(e) => return Err(e),
    };

    emit(&result, mode);
    if result.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    // A second install only happens in tests; the first one wins.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn dispatch(command: Commands) -> Result<CmdResult> {
    match command {
        Commands::Get(cmd) => {
            let ctx = init_context()?;
            handle_get(&ctx, cmd)
        }
        Commands::Import(ImportCommands::Users) => {
            let ctx = init_context()?;
            let stdin = std::io::stdin();
            ctx.api.import_users(stdin.lock())
        }
        Commands::Purge(args) => handle_purge(args),
        Commands::Delete(args) => handle_delete(args),
        Commands::Config {
            url,
            token,
            interactive,
        } => handle_config(url, token, interactive),
        Commands::Version => Ok(CmdResult::default()),
    }
}

fn init_context() -> Result<AppContext> {
    let config = GristConfig::load(GristConfig::default_path()?)?;
    let gateway = HttpGateway::new(&config)?;
    tracing::debug!(api = gateway.api_url(), "using Grist server");
    Ok(AppContext {
        api: GristApi::new(gateway),
    })
}

fn handle_get(ctx: &AppContext, cmd: GetCommands) -> Result<CmdResult> {
    match cmd {
        GetCommands::Org { id: None, .. } => ctx.api.list_orgs(),
        GetCommands::Org {
            id: Some(id),
            view: None,
        } => ctx.api.describe_org(&id),
        GetCommands::Org {
            id: Some(id),
            view: Some(AccessView::Access),
        } => ctx.api.org_access(&id),
        GetCommands::Workspace { id, view: None } => ctx.api.describe_workspace(&id),
        GetCommands::Workspace {
            id,
            view: Some(AccessView::Access),
        } => ctx.api.workspace_access(&id),
        GetCommands::Doc {
            id,
            view,
            table,
            dir,
        } => match view {
            None => ctx.api.inspect_doc(&id),
            Some(DocView::Access) => ctx.api.doc_access(&id),
            Some(DocView::Excel) => ctx.api.export_doc(&id, ExportFormat::Excel, &dir),
            Some(DocView::Grist) => ctx.api.export_doc(&id, ExportFormat::Grist, &dir),
            Some(DocView::Table) => {
                let table = table.ok_or_else(|| {
                    GristError::InvalidInput("`get doc <id> table` needs a table id".into())
                })?;
                ctx.api.table_csv(&id, &table)
            }
        },
        GetCommands::Users => ctx.api.user_matrix(),
    }
}

fn handle_purge(args: PurgeArgs) -> Result<CmdResult> {
    let PurgeTarget::Doc { id, keep } = args.target;
    let ctx = init_context()?;
    let kept = keep.unwrap_or(commands::purge::DEFAULT_KEEP);
    if !confirm(
        &format!("Purge the history of document {}, keeping {} states?", id, kept),
        args.yes,
    )? {
        return Ok(aborted());
    }
    ctx.api.purge_doc(&id, keep)
}

fn handle_delete(args: DeleteArgs) -> Result<CmdResult> {
    let ctx = init_context()?;
    let prompt = match &args.target {
        DeleteTarget::Doc { id } => format!("Delete document {}?", id),
        DeleteTarget::Workspace { id } => format!("Delete workspace n°{} and its documents?", id),
        DeleteTarget::User { id, name } => format!("Delete user {} ({})?", id, name),
    };
    if !confirm(&prompt, args.yes)? {
        return Ok(aborted());
    }

    match args.target {
        DeleteTarget::Doc { id } => ctx.api.delete_doc(&id),
        DeleteTarget::Workspace { id } => ctx.api.delete_workspace(&id),
        DeleteTarget::User { id, name } => ctx.api.delete_user(&id, &name),
    }
}

fn handle_config(
    url: Option<String>,
    token: Option<String>,
    interactive: bool,
) -> Result<CmdResult> {
    let path = GristConfig::default_path()?;
    let current = GristConfig::load(&path)?;

    let (url, token) = if interactive {
        let term = Term::stderr();
        let url = prompt(&term, "Grist URL", current.url.as_deref())?;
        let token = prompt(&term, "API token", None)?;
        (Some(url), Some(token))
    } else {
        (url, token)
    };

    match (url, token) {
        (None, None) => Ok(config_status(&current, &path)),
        (Some(url), Some(token)) => {
            let updated = commands::config::update(&current, &url, &token, &path)?;
            let mut result = config_status(&updated, &path);
            result
                .messages
                .insert(0, CmdMessage::success(format!("Saved {}", path.display())));
            Ok(result)
        }
        _ => Err(GristError::InvalidInput(
            "--url and --token must be given together".into(),
        )),
    }
}

fn config_status(config: &GristConfig, path: &Path) -> CmdResult {
    match HttpGateway::new(config) {
        Ok(gateway) => GristApi::new(gateway).config_status(config, path),
        Err(_) => commands::config::show::<HttpGateway>(None, config, path),
    }
}

fn confirm(question: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    let term = Term::stderr();
    if !term.is_term() {
        return Err(GristError::InvalidInput(
            "not a terminal, pass --yes to confirm".into(),
        ));
    }
    term.write_str(&format!("{} [y/N] ", question))?;
    let answer = term.read_line()?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn prompt(term: &Term, label: &str, current: Option<&str>) -> Result<String> {
    match current {
        Some(value) => term.write_str(&format!("{} [{}]: ", label, value))?,
        None => term.write_str(&format!("{}: ", label))?,
    }
    let answer = term.read_line()?;
    match (answer.trim(), current) {
        ("", Some(value)) => Ok(value.to_string()),
        (answer, _) => Ok(answer.to_string()),
    }
}

fn aborted() -> CmdResult {
    CmdResult::default().with_message(CmdMessage::info("Aborted."))
}

fn emit(result: &CmdResult, mode: OutputMode) {
    match (mode, &result.output) {
        (OutputMode::Json, Some(output)) => {
            println!("{}", render_json(output));
            eprint!("{}", render_messages(&result.messages));
        }
        (OutputMode::Json, None) => println!("{}", render_json_messages(&result.messages)),
        // Keep stdout clean for piping.
        (OutputMode::Table, Some(output @ Output::Csv(_))) => {
            print!("{}", render_output(output));
            eprint!("{}", render_messages(&result.messages));
        }
        (OutputMode::Table, Some(output)) => {
            print!("{}", render_output(output));
            print_messages(&result.messages);
        }
        (OutputMode::Table, None) => print_messages(&result.messages),
    }
}
