use crate::client::{ExportFormat, GristClient};
use crate::commands::{CmdMessage, CmdResult, Output};
use crate::error::Result;
use crate::gateway::Gateway;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize)]
pub struct ExportedFile {
    pub path: PathBuf,
    pub bytes: usize,
    pub format: ExportFormat,
}

/// Download the document and write `<workspace>_<doc>.<ext>` into `dir`.
pub fn run<G: Gateway>(
    client: &GristClient<G>,
    doc_id: &str,
    format: ExportFormat,
    dir: &Path,
) -> Result<CmdResult> {
    let doc = client.doc(doc_id)?;
    let content = client.download(&doc.id, format)?;

    let workspace = doc
        .workspace
        .as_deref()
        .map(|w| w.name.as_str())
        .unwrap_or("workspace");
    let path = dir.join(export_filename(workspace, &doc.name, format));
    fs::write(&path, &content)?;
    info!(doc = %doc.id, path = %path.display(), bytes = content.len(), "document exported");

    let exported = ExportedFile {
        path,
        bytes: content.len(),
        format,
    };
    let message = CmdMessage::success(format!(
        "Document {} exported to {}",
        doc.name,
        exported.path.display()
    ));
    Ok(CmdResult::default()
        .with_output(Output::Export(exported))
        .with_message(message))
}

/// A table's content as CSV text, unmodified.
pub fn table_csv<G: Gateway>(
    client: &GristClient<G>,
    doc_id: &str,
    table_id: &str,
) -> Result<CmdResult> {
    let doc = client.doc(doc_id)?;
    let csv = client.table_csv(&doc.id, table_id)?;
    Ok(CmdResult::default().with_output(Output::Csv(csv)))
}

pub fn export_filename(workspace: &str, doc: &str, format: ExportFormat) -> String {
    format!(
        "{}_{}.{}",
        sanitize(workspace),
        sanitize(doc),
        format.extension()
    )
}

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            other => other,
        })
        .collect();
    if cleaned.trim().is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::InMemoryGateway;
    use crate::gateway::Method;
    use serde_json::json;
    use tempfile::tempdir;

    fn gateway() -> InMemoryGateway {
        InMemoryGateway::new().get_json(
            "docs/d1",
            &json!({"id": "d1", "name": "Q1/Q2 plan", "workspace": {"id": 4, "name": "Finance"}}),
        )
    }

    #[test]
    fn writes_grist_file_named_after_workspace_and_doc() {
        let dir = tempdir().unwrap();
        let client = GristClient::new(gateway().respond(
            Method::Get,
            "docs/d1/download",
            200,
            "SQLite format 3",
        ));

        let result = run(&client, "d1", ExportFormat::Grist, dir.path()).unwrap();
        let Some(Output::Export(file)) = result.output else {
            panic!("expected exported file");
        };
        assert_eq!(file.path, dir.path().join("Finance_Q1_Q2 plan.grist"));
        assert_eq!(file.bytes, 15);
        assert_eq!(fs::read_to_string(&file.path).unwrap(), "SQLite format 3");
    }

    #[test]
    fn failed_download_writes_nothing() {
        let dir = tempdir().unwrap();
        let client = GristClient::new(gateway().respond(
            Method::Get,
            "docs/d1/download/xlsx",
            500,
            "nope",
        ));

        assert!(run(&client, "d1", ExportFormat::Excel, dir.path()).is_err());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn table_csv_returns_text() {
        let client = GristClient::new(gateway().respond(
            Method::Get,
            "docs/d1/download/csv?tableId=People",
            200,
            "name,age\nAda,36\n",
        ));

        let result = table_csv(&client, "d1", "People").unwrap();
        assert!(matches!(result.output, Some(Output::Csv(ref csv)) if csv.starts_with("name,age")));
    }

    #[test]
    fn filenames_never_contain_separators() {
        assert_eq!(
            export_filename("a/b", "c\\d", ExportFormat::Excel),
            "a_b_c_d.xlsx"
        );
        assert_eq!(export_filename("", "x", ExportFormat::Grist), "untitled_x.grist");
    }
}
