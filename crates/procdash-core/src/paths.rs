use crate::error::{ProcError, Result};
use crate::types::DocumentKind;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const PROCDASH_DIR: &str = ".procdash";
pub const VIEWS_DIR: &str = ".procdash/views";

pub const CONFIG_FILE: &str = ".procdash/config.yaml";
pub const STORE_FILE: &str = ".procdash/store.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn procdash_dir(root: &Path) -> PathBuf {
    root.join(PROCDASH_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn store_path(root: &Path) -> PathBuf {
    root.join(STORE_FILE)
}

pub fn views_dir(root: &Path) -> PathBuf {
    root.join(VIEWS_DIR)
}

pub fn session_path(root: &Path, kind: DocumentKind) -> PathBuf {
    views_dir(root).join(format!("{}.yaml", kind.as_str()))
}

// ---------------------------------------------------------------------------
// Id validation
// ---------------------------------------------------------------------------

static ID_RE: OnceLock<Regex> = OnceLock::new();

fn id_re() -> &'static Regex {
    ID_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !id_re().is_match(id) {
        return Err(ProcError::InvalidId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ids() {
        for id in ["bq-001", "a", "rab-2024-17", "x1"] {
            validate_id(id).unwrap_or_else(|_| panic!("expected valid: {id}"));
        }
    }

    #[test]
    fn invalid_ids() {
        for id in ["", "-lead", "trail-", "has spaces", "BQ-1", "bq_1"] {
            assert!(validate_id(id).is_err(), "expected invalid: {id}");
        }
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/proj/.procdash/config.yaml")
        );
        assert_eq!(
            session_path(root, DocumentKind::Rab),
            PathBuf::from("/tmp/proj/.procdash/views/rab.yaml")
        );
    }
}
