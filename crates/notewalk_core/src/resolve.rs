//! Short/partial identifier resolution.
//!
//! # Responsibility
//! - Map a user token to exactly one entity within a caller-chosen scope
//!   (sibling folders, sibling notes, or everything).
//!
//! # Invariants
//! - An exact identifier match always wins, even if it is also a prefix of
//!   other identifiers.
//! - Prefix matching is ASCII case-insensitive.
//! - The empty token never matches.
//! - Resolution is pure: no logging, no I/O.

use crate::model::{EntityRef, Identified};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ResolveResult<T> = Result<T, ResolveError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No candidate matches the token.
    NotFound { token: String },
    /// Several candidates share the prefix; all of them are listed.
    Ambiguous {
        token: String,
        matches: Vec<EntityRef>,
    },
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { token } => write!(f, "nothing matches `{token}`"),
            Self::Ambiguous { token, matches } => {
                write!(f, "`{token}` is ambiguous ({} matches)", matches.len())
            }
        }
    }
}

impl Error for ResolveError {}

/// Resolves `token` against `candidates`.
///
/// # Errors
/// - `NotFound` when no identifier equals or starts with `token`.
/// - `Ambiguous` when more than one identifier starts with `token`.
pub fn resolve<T, I>(token: &str, candidates: I) -> ResolveResult<T>
where
    T: Identified,
    I: IntoIterator<Item = T>,
{
    let token = token.trim();
    if token.is_empty() {
        return Err(ResolveError::NotFound {
            token: token.to_string(),
        });
    }

    let mut prefixed = Vec::new();
    for candidate in candidates {
        if candidate.id().as_str() == token {
            return Ok(candidate);
        }
        if starts_with_ignore_case(candidate.id().as_str(), token) {
            prefixed.push(candidate);
        }
    }

    match prefixed.len() {
        0 => Err(ResolveError::NotFound {
            token: token.to_string(),
        }),
        1 => Ok(prefixed.remove(0)),
        _ => Err(ResolveError::Ambiguous {
            token: token.to_string(),
            matches: prefixed.iter().map(Identified::entity_ref).collect(),
        }),
    }
}

fn starts_with_ignore_case(value: &str, prefix: &str) -> bool {
    value.len() >= prefix.len()
        && value
            .as_bytes()
            .iter()
            .zip(prefix.as_bytes())
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}

#[cfg(test)]
mod tests {
    use super::{resolve, ResolveError};
    use crate::model::Folder;

    fn folders(ids: &[&str]) -> Vec<Folder> {
        ids.iter().map(|id| Folder::new(*id, format!("F {id}"))).collect()
    }

    #[test]
    fn unique_prefix_resolves() {
        let candidates = folders(&["abcdef01", "bcdef012"]);
        let hit = resolve("ab", candidates.iter()).unwrap();
        assert_eq!(hit.id.as_str(), "abcdef01");
    }

    #[test]
    fn prefix_match_ignores_case() {
        let candidates = folders(&["ABCDEF01"]);
        assert!(resolve("abcd", candidates.iter()).is_ok());
    }

    #[test]
    fn exact_match_beats_longer_prefix_siblings() {
        let candidates = folders(&["abc", "abcd"]);
        let hit = resolve("abc", candidates.iter()).unwrap();
        assert_eq!(hit.id.as_str(), "abc");
    }

    #[test]
    fn shared_prefix_is_ambiguous_and_lists_matches() {
        let candidates = folders(&["abc1", "abc2", "xyz"]);
        match resolve("abc", candidates.iter()).unwrap_err() {
            ResolveError::Ambiguous { token, matches } => {
                assert_eq!(token, "abc");
                assert_eq!(matches.len(), 2);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn no_match_and_empty_token_are_not_found() {
        let candidates = folders(&["abc"]);
        assert!(matches!(
            resolve("zz", candidates.iter()),
            Err(ResolveError::NotFound { .. })
        ));
        assert!(matches!(
            resolve("  ", candidates.iter()),
            Err(ResolveError::NotFound { .. })
        ));
    }

    #[test]
    fn match_count_decides_outcome_for_every_prefix_length() {
        let candidates = folders(&["a1b2c3d4", "a1b2ffff", "99999999"]);
        for len in 1..=8 {
            let token = &"a1b2c3d4"[..len];
            let expected = candidates
                .iter()
                .filter(|f| f.id.as_str().starts_with(token))
                .count();
            let outcome = resolve(token, candidates.iter());
            match expected {
                1 => assert!(outcome.is_ok(), "len {len}"),
                0 => assert!(matches!(outcome, Err(ResolveError::NotFound { .. }))),
                _ => assert!(matches!(outcome, Err(ResolveError::Ambiguous { .. }))),
            }
        }
    }
}
