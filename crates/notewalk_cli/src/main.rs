//! `notewalk` entry point.
//!
//! # Responsibility
//! - Parse arguments, start logging, open the database read-only unless
//!   `--write` is given.
//! - Run either the batch export or the interactive loop.
//!
//! # Invariants
//! - All browsing, export and edit rules live in `notewalk_core`.
//! - Batch export exits non-zero when any entity failed.

mod args;
mod output;
mod repl;

use args::Cli;
use clap::Parser;
use log::{error, info};
use notewalk_core::{
    default_log_dir, default_log_level, init_logging, open_db, AppConfig, ExportTarget,
    ExternalEditor, LocalFs, NoteStore, Session, SqliteNoteStore,
};
use std::error::Error;
use std::io::{self, Write};
use std::process::ExitCode;

/// Exit status of a batch export that finished with failures.
const EXIT_PARTIAL_EXPORT: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.to_config();

    let level = config
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    let log_dir = config.log_dir.clone().unwrap_or_else(default_log_dir);
    if let Err(err) = init_logging(&level, &log_dir) {
        eprintln!("Warning: failed to initialize logging: {err}");
    }

    match run(&cli, &config) {
        Ok(code) => code,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &AppConfig) -> Result<ExitCode, Box<dyn Error>> {
    let db_path = config.resolve_db_path()?;
    let conn = open_db(&db_path, config.access_mode())?;
    let store = SqliteNoteStore::try_new(&conn)?;
    let mut session = Session::open(&store)?;

    if cli.export_all {
        return export_all(&session, config, cli.json);
    }

    let mut stdout = io::stdout();
    writeln!(stdout, "Opened {}", db_path.display())?;
    if config.write_enabled {
        writeln!(stdout, "WARNING: write mode is enabled. Edits will be saved to the database.")?;
        writeln!(stdout, "Close the Joplin app first and keep a backup of the database.")?;
    } else {
        writeln!(stdout, "Read-only mode. Start with --write to save edits.")?;
    }

    let editor = ExternalEditor::new(config.editor_command());
    let stdin = io::stdin();
    repl::run(&mut session, config, &editor, stdin.lock(), &mut stdout)?;
    Ok(ExitCode::SUCCESS)
}

fn export_all<S: NoteStore + ?Sized>(
    session: &Session<'_, S>,
    config: &AppConfig,
    json: bool,
) -> Result<ExitCode, Box<dyn Error>> {
    let report = session.export(
        &ExportTarget::Root,
        &LocalFs,
        &config.export_dir,
        &config.render_options(),
    )?;
    info!(
        "event=batch_export module=cli status=ok notes={} failures={}",
        report.notes_written,
        report.failures.len()
    );

    let mut stdout = io::stdout();
    if json {
        writeln!(stdout, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        output::write_export_report(&mut stdout, &config.export_dir, &report)?;
    }

    if report.is_complete() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_PARTIAL_EXPORT))
    }
}
