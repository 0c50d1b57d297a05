//! Argument parsing.

use excaliframe_core::ToolKind;
use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "EXCALIFRAME_DATA_DIR";

pub fn usage(program: &str) -> String {
    format!(
        "Usage:\n  {program} [--data-dir <dir>] list\n  {program} [--data-dir <dir>] show <id>\n  {program} [--data-dir <dir>] new [excalidraw|mermaid]\n  {program} [--data-dir <dir>] rename <id> <title...>\n  {program} [--data-dir <dir>] delete <id>\n  {program} [--data-dir <dir>] export-preview <id> <file>\n  {program} [--data-dir <dir>] import-legacy <file>\n\nThe data directory defaults to ${DATA_DIR_ENV}, then the platform's local data directory."
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Show { id: String },
    New { tool: ToolKind },
    Rename { id: String, title: String },
    Delete { id: String },
    ExportPreview { id: String, out: PathBuf },
    ImportLegacy { file: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub data_dir: Option<PathBuf>,
    pub command: Command,
}

pub fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut data_dir = None;
    let mut rest = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => {
                if data_dir.is_some() {
                    return Err(());
                }
                data_dir = Some(PathBuf::from(args.next().ok_or(())?));
            }
            _ if arg.starts_with("--") => return Err(()),
            _ => rest.push(arg),
        }
    }

    let mut rest = rest.into_iter();
    let name = rest.next().ok_or(())?;
    let mut operands: Vec<String> = rest.collect();

    let command = match (name.as_str(), operands.len()) {
        ("list", 0) => Command::List,
        ("show", 1) => Command::Show {
            id: operands.remove(0),
        },
        ("new", 0) => Command::New {
            tool: ToolKind::default(),
        },
        ("new", 1) => Command::New {
            tool: ToolKind::resolve(Some(&operands[0])),
        },
        ("rename", n) if n >= 2 => {
            let id = operands.remove(0);
            Command::Rename {
                id,
                title: operands.join(" "),
            }
        }
        ("delete", 1) => Command::Delete {
            id: operands.remove(0),
        },
        ("export-preview", 2) => {
            let out = PathBuf::from(operands.remove(1));
            Command::ExportPreview {
                id: operands.remove(0),
                out,
            }
        }
        ("import-legacy", 1) => Command::ImportLegacy {
            file: PathBuf::from(operands.remove(0)),
        },
        _ => return Err(()),
    };

    Ok(CliOptions { data_dir, command })
}
