//! Runtime configuration shared by the CLI and core entry points.
//!
//! # Responsibility
//! - Hold every value of the command surface in one typed struct.
//! - Auto-detect the desktop database and the user's editor.
//!
//! # Invariants
//! - Detection checks a fixed candidate order; first existing file wins.
//! - Editor precedence: explicit override, `$VISUAL`, `$EDITOR`, `vim`.

use crate::db::AccessMode;
use crate::render::{ExportFormat, RenderOptions};
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_EXPORT_DIR: &str = "notewalk_export";
pub const DEFAULT_EDITOR: &str = "vim";
const DATABASE_FILE: &str = "database.sqlite";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No database path given and none of the candidate locations exist.
    DatabaseNotDetected { searched: Vec<PathBuf> },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseNotDetected { searched } => {
                write!(f, "could not find a Joplin database; pass a path. Searched:")?;
                for path in searched {
                    write!(f, "\n  {}", path.display())?;
                }
                Ok(())
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Explicit database path; `None` means auto-detect.
    pub db_path: Option<PathBuf>,
    pub export_dir: PathBuf,
    pub export_format: ExportFormat,
    pub include_metadata: bool,
    pub write_enabled: bool,
    /// Editor command overriding `$VISUAL`/`$EDITOR`.
    pub editor: Option<String>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            export_dir: PathBuf::from(".").join(DEFAULT_EXPORT_DIR),
            export_format: ExportFormat::default(),
            include_metadata: false,
            write_enabled: false,
            editor: None,
            log_level: None,
            log_dir: None,
        }
    }
}

impl AppConfig {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::new(self.export_format, self.include_metadata)
    }

    pub fn access_mode(&self) -> AccessMode {
        AccessMode::from_write_enabled(self.write_enabled)
    }

    /// Explicit path, or the first detected database.
    pub fn resolve_db_path(&self) -> ConfigResult<PathBuf> {
        match &self.db_path {
            Some(path) => Ok(path.clone()),
            None => detect_database_path(),
        }
    }

    /// Editor command after applying precedence rules.
    pub fn editor_command(&self) -> String {
        resolve_editor(
            self.editor.as_deref(),
            env::var("VISUAL").ok().as_deref(),
            env::var("EDITOR").ok().as_deref(),
        )
    }
}

/// Probes the usual desktop-app locations for a database.
pub fn detect_database_path() -> ConfigResult<PathBuf> {
    let candidates = database_candidates(dirs::home_dir().as_deref(), dirs::config_dir().as_deref());
    first_existing(candidates)
}

/// Candidate database locations in lookup order.
pub fn database_candidates(home: Option<&Path>, config_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(home) = home {
        candidates.push(home.join(".config").join("joplin-desktop").join(DATABASE_FILE));
    }
    if let Some(config_dir) = config_dir {
        candidates.push(config_dir.join("joplin-desktop").join(DATABASE_FILE));
        candidates.push(config_dir.join("Joplin").join(DATABASE_FILE));
    }
    candidates.dedup();
    candidates
}

fn first_existing(candidates: Vec<PathBuf>) -> ConfigResult<PathBuf> {
    match candidates.iter().find(|path| path.is_file()) {
        Some(path) => Ok(path.clone()),
        None => Err(ConfigError::DatabaseNotDetected {
            searched: candidates,
        }),
    }
}

/// First non-blank of `explicit`, `visual`, `editor`, else `vim`.
pub fn resolve_editor(explicit: Option<&str>, visual: Option<&str>, editor: Option<&str>) -> String {
    [explicit, visual, editor]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .unwrap_or(DEFAULT_EDITOR)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{database_candidates, first_existing, resolve_editor, AppConfig, ConfigError};
    use crate::render::ExportFormat;
    use std::path::Path;

    #[test]
    fn defaults_match_command_surface() {
        let config = AppConfig::default();
        assert_eq!(config.export_format, ExportFormat::Markdown);
        assert!(!config.include_metadata);
        assert!(!config.write_enabled);
        assert!(config.export_dir.ends_with("notewalk_export"));
    }

    #[test]
    fn candidates_follow_lookup_order() {
        let candidates = database_candidates(Some(Path::new("/home/u")), Some(Path::new("/cfg")));
        assert_eq!(
            candidates,
            vec![
                Path::new("/home/u/.config/joplin-desktop/database.sqlite").to_path_buf(),
                Path::new("/cfg/joplin-desktop/database.sqlite").to_path_buf(),
                Path::new("/cfg/Joplin/database.sqlite").to_path_buf(),
            ]
        );
    }

    #[test]
    fn first_existing_candidate_wins() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("Joplin").join("database.sqlite");
        std::fs::create_dir_all(present.parent().unwrap()).unwrap();
        std::fs::write(&present, b"").unwrap();

        let found = first_existing(database_candidates(None, Some(dir.path()))).unwrap();
        assert_eq!(found, present);
    }

    #[test]
    fn nothing_found_lists_searched_paths() {
        let dir = tempfile::tempdir().unwrap();
        let err = first_existing(database_candidates(Some(dir.path()), None)).unwrap_err();
        let ConfigError::DatabaseNotDetected { searched } = err;
        assert_eq!(searched.len(), 1);
    }

    #[test]
    fn editor_precedence() {
        assert_eq!(resolve_editor(Some("nano"), Some("code"), Some("vi")), "nano");
        assert_eq!(resolve_editor(None, Some(" "), Some("vi")), "vi");
        assert_eq!(resolve_editor(None, None, None), "vim");
    }
}
