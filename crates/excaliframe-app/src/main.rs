//! Excaliframe command-line tool.
//!
//! Lists, creates, renames and deletes playground drawings kept in a local
//! data directory, and imports drawings saved by the single-slot playground.

mod cli;
mod commands;

use excaliframe_core::storage::FileStorage;
use std::path::PathBuf;

fn data_root(explicit: Option<PathBuf>) -> Result<PathBuf, commands::AppError> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    match std::env::var_os(cli::DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => Ok(FileStorage::default_root()?),
    }
}

fn main() {
    env_logger::init();

    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "excaliframe".to_owned());

    let options = match cli::parse_options(args) {
        Ok(options) => options,
        Err(()) => {
            eprintln!("{}", cli::usage(&program));
            std::process::exit(2);
        }
    };

    let result = data_root(options.data_dir).and_then(|root| {
        log::debug!("Using data directory {}", root.display());
        commands::run(options.command, &root, &mut std::io::stdout().lock())
    });

    if let Err(e) = result {
        eprintln!("{program}: {e}");
        std::process::exit(1);
    }
}
