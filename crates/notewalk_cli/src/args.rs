//! Command-line surface.
//!
//! # Responsibility
//! - Parse flags and environment into one [`AppConfig`].
//!
//! # Invariants
//! - Defaults mirror `AppConfig::default()`; clap owns no other state.

use clap::{Parser, ValueEnum};
use notewalk_core::config::DEFAULT_EXPORT_DIR;
use notewalk_core::{AppConfig, ExportFormat};
use std::path::PathBuf;

/// Interactive browser and exporter for Joplin note databases
#[derive(Parser, Debug)]
#[command(name = "notewalk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to database.sqlite (default: auto-detect the desktop app database)
    #[arg(env = "NOTEWALK_DB")]
    pub db: Option<PathBuf>,

    /// Destination root for exports
    #[arg(long, default_value = DEFAULT_EXPORT_DIR)]
    pub export_dir: PathBuf,

    /// Export file format
    #[arg(long, value_enum, default_value = "md")]
    pub export_format: FormatArg,

    /// Prefix exported notes with a metadata block and extract attachments
    #[arg(long)]
    pub include_metadata: bool,

    /// Export the whole tree to --export-dir and exit
    #[arg(long)]
    pub export_all: bool,

    /// Print the batch export report as JSON
    #[arg(long, requires = "export_all")]
    pub json: bool,

    /// Allow editor changes to be saved to the database
    #[arg(long)]
    pub write: bool,

    /// Editor command (overrides $VISUAL and $EDITOR)
    #[arg(long)]
    pub editor: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Directory for rotating log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Md,
    Txt,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Md => ExportFormat::Markdown,
            FormatArg::Txt => ExportFormat::PlainText,
        }
    }
}

impl Cli {
    pub fn to_config(&self) -> AppConfig {
        AppConfig {
            db_path: self.db.clone(),
            export_dir: self.export_dir.clone(),
            export_format: self.export_format.into(),
            include_metadata: self.include_metadata,
            write_enabled: self.write,
            editor: self.editor.clone(),
            log_level: self.log_level.clone(),
            log_dir: self.log_dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::{CommandFactory, Parser};
    use notewalk_core::ExportFormat;
    use std::path::Path;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_populate_config() {
        let cli = Cli::try_parse_from([
            "notewalk",
            "/tmp/db.sqlite",
            "--export-dir",
            "out",
            "--export-format",
            "txt",
            "--include-metadata",
            "--write",
            "--editor",
            "nano",
        ])
        .unwrap();
        let config = cli.to_config();

        assert_eq!(config.db_path.as_deref(), Some(Path::new("/tmp/db.sqlite")));
        assert_eq!(config.export_dir, Path::new("out"));
        assert_eq!(config.export_format, ExportFormat::PlainText);
        assert!(config.include_metadata);
        assert!(config.write_enabled);
        assert_eq!(config.editor.as_deref(), Some("nano"));
    }

    #[test]
    fn defaults_are_read_only_markdown() {
        let cli = Cli::try_parse_from(["notewalk", "/tmp/db.sqlite"]).unwrap();
        let config = cli.to_config();

        assert_eq!(config.export_format, ExportFormat::Markdown);
        assert!(!config.include_metadata);
        assert!(!config.write_enabled);
        assert_eq!(config.export_dir, Path::new("notewalk_export"));
    }

    #[test]
    fn json_requires_export_all() {
        assert!(Cli::try_parse_from(["notewalk", "db.sqlite", "--json"]).is_err());
        assert!(Cli::try_parse_from(["notewalk", "db.sqlite", "--export-all", "--json"]).is_ok());
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["notewalk", "db.sqlite", "--export-format", "pdf"]).is_err());
    }
}
