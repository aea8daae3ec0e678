//! Interactive command loop.
//!
//! # Responsibility
//! - Map one input line to one [`Command`].
//! - Dispatch commands into the core session and print the results.
//!
//! # Invariants
//! - A recoverable core error is printed and the loop continues.
//! - The loop ends on `q`/`quit`/`exit`, end of input, or a broken sink.

use crate::output::{
    write_cat, write_edit_outcome, write_error, write_export_report, write_listing, write_note,
    write_search_results, HELP_TEXT,
};
use log::{info, warn};
use notewalk_core::{
    AppConfig, CoreError, CoreResult, Editor, ExportTarget, LocalFs, NoteStore, SearchQuery, Session,
};
use std::io::{self, BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    List,
    /// Empty target means the root.
    ChangeDir(String),
    View(String),
    Cat(String),
    Edit(String),
    Search(String),
    Export(Option<String>),
    Help,
    Quit,
    /// Known command missing its argument.
    Usage(&'static str),
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let (action, arg) = match line.split_once(char::is_whitespace) {
        Some((action, arg)) => (action, arg.trim()),
        None => (line, ""),
    };
    let required = |usage: &'static str, build: fn(String) -> Command| {
        if arg.is_empty() {
            Command::Usage(usage)
        } else {
            build(arg.to_string())
        }
    };

    match action.to_ascii_lowercase().as_str() {
        "l" | "ls" | "list" => Command::List,
        "cd" | "go" | "enter" => Command::ChangeDir(arg.to_string()),
        ".." => Command::ChangeDir("..".to_string()),
        "n" | "note" | "view" | "read" | "show" => required("n <note-id>", Command::View),
        "cat" | "content" | "body" => required("cat <note-id>", Command::Cat),
        "vim" | "vi" | "edit" => required("vim <note-id>", Command::Edit),
        "s" | "search" | "find" => required("s <search-term>", Command::Search),
        "e" | "export" => Command::Export((!arg.is_empty()).then(|| arg.to_string())),
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        _ => Command::Unknown(action.to_string()),
    }
}

/// Drives `session` from `input` until quit or end of input.
pub fn run<S, E, R, W>(
    session: &mut Session<'_, S>,
    config: &AppConfig,
    editor: &E,
    input: R,
    out: &mut W,
) -> io::Result<()>
where
    S: NoteStore + ?Sized,
    E: Editor + ?Sized,
    R: BufRead,
    W: Write,
{
    info!("event=repl_start module=cli status=ok");
    writeln!(out, "Type 'h' for help, 'q' to quit.")?;
    let mut lines = input.lines();
    loop {
        write!(out, "{} > ", session.breadcrumb())?;
        out.flush()?;
        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let command = parse_command(&line?);
        if command == Command::Quit {
            writeln!(out, "Bye!")?;
            break;
        }
        if let Err(err) = dispatch(session, config, editor, &command, out)? {
            if !err.is_recoverable() {
                warn!("event=repl_command module=cli status=error recoverable=false");
            }
            write_error(out, &err)?;
        }
    }
    info!("event=repl_stop module=cli status=ok");
    Ok(())
}

/// Outer error is the sink; inner error is the command's own failure.
fn dispatch<S, E, W>(
    session: &mut Session<'_, S>,
    config: &AppConfig,
    editor: &E,
    command: &Command,
    out: &mut W,
) -> io::Result<CoreResult<()>>
where
    S: NoteStore + ?Sized,
    E: Editor + ?Sized,
    W: Write,
{
    match command {
        Command::Empty | Command::Quit => {}
        Command::List => match session.list() {
            Ok(listing) => {
                let heading = session.current_folder().map(|folder| folder.title.as_str());
                write_listing(out, heading, &listing)?;
            }
            Err(err) => return Ok(Err(err)),
        },
        Command::ChangeDir(target) => {
            if let Err(err) = session.change_dir(target) {
                return Ok(Err(err));
            }
            match session.current_folder() {
                Some(folder) => writeln!(out, "Entered: {}", folder.title)?,
                None => writeln!(out, "At root level.")?,
            }
        }
        Command::View(token) => match session.find_note(token) {
            Ok(note) => write_note(out, note)?,
            Err(err) => return Ok(Err(err)),
        },
        Command::Cat(token) => match session.find_note(token) {
            Ok(note) => write_cat(out, note)?,
            Err(err) => return Ok(Err(err)),
        },
        Command::Edit(token) => {
            let title = match session.find_note(token) {
                Ok(note) => note.title.clone(),
                Err(err) => return Ok(Err(err)),
            };
            writeln!(out, "Opening '{title}' in the editor...")?;
            if config.write_enabled {
                writeln!(out, "EDIT MODE: changes will be saved to the database.")?;
            } else {
                writeln!(out, "READ-ONLY MODE: changes will NOT be saved to the database.")?;
            }
            out.flush()?;
            match session.edit(token, editor, config.write_enabled) {
                Ok(outcome) => write_edit_outcome(out, &title, &outcome)?,
                Err(err) => return Ok(Err(err)),
            }
        }
        Command::Search(text) => {
            writeln!(out, "Searching for: '{text}'...")?;
            let notes = match session.search(&SearchQuery::new(text.as_str())) {
                Ok(notes) => notes,
                Err(err) => return Ok(Err(err)),
            };
            let hits = notes
                .into_iter()
                .map(|note| {
                    let location = session.note_location(&note);
                    (note, location)
                })
                .collect::<Vec<_>>();
            write_search_results(out, text, &hits)?;
        }
        Command::Export(token) => {
            let target = match session.resolve_target(token.as_deref()) {
                Ok(target) => target,
                Err(err) => return Ok(Err(err)),
            };
            match &target {
                ExportTarget::Root => writeln!(out, "Exporting all folders...")?,
                ExportTarget::Folder(id) => writeln!(out, "Exporting folder {}...", id.short())?,
                ExportTarget::Note(id) => writeln!(out, "Exporting note {}...", id.short())?,
            }
            let report = match session.export(
                &target,
                &LocalFs,
                &config.export_dir,
                &config.render_options(),
            ) {
                Ok(report) => report,
                Err(err) => return Ok(Err(err)),
            };
            write_export_report(out, &config.export_dir, &report)?;
            if !report.is_complete() {
                return Ok(Err(CoreError::ExportPartialFailure(report)));
            }
        }
        Command::Help => write!(out, "\n{HELP_TEXT}\n")?,
        Command::Usage(usage) => writeln!(out, "Usage: {usage}")?,
        Command::Unknown(action) => writeln!(
            out,
            "Unknown command '{action}'. Available: l, cd <id>, n <id>, s <term>, cat <id>, vim <id>, e [id], h, q"
        )?,
    }
    Ok(Ok(()))
}
