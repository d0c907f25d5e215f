//! Per-kind list-view sessions persisted between invocations.
//!
//! A session keeps the reconciler's pending manual order and sort choice in
//! `.procdash/views/<kind>.yaml`, stamped with the revision of that kind's
//! document list it was built against.

use crate::error::Result;
use crate::paths;
use crate::record::Document;
use crate::reorder::{Reconciler, ReconcilerSnapshot};
use crate::store::Store;
use crate::types::DocumentKind;
use std::path::Path;

pub fn load_snapshot(root: &Path, kind: DocumentKind) -> Result<Option<ReconcilerSnapshot>> {
    let path = paths::session_path(root, kind);
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path)?;
    Ok(Some(serde_yaml::from_str(&text)?))
}

/// Reconciler for `kind` seeded from the store and the saved session.
pub fn load_reconciler(root: &Path, store: &Store, kind: DocumentKind) -> Result<Reconciler<Document>> {
    let canonical = store.documents(kind).to_vec();
    let Some(snapshot) = load_snapshot(root, kind)? else {
        return Ok(Reconciler::new(canonical));
    };
    let current = store.kind_revision(kind);
    let (rec, resynced) = Reconciler::restore(canonical, &snapshot, current);
    if resynced {
        tracing::warn!(
            kind = %kind,
            saved = snapshot.revision,
            current,
            "discarded pending manual order: data changed since it was made"
        );
        save_session(root, kind, &rec, current)?;
    }
    Ok(rec)
}

pub fn save_session(
    root: &Path,
    kind: DocumentKind,
    rec: &Reconciler<Document>,
    revision: u64,
) -> Result<()> {
    let snapshot = rec.snapshot(revision);
    let text = serde_yaml::to_string(&snapshot)?;
    crate::io::atomic_write(&paths::session_path(root, kind), text.as_bytes())?;
    tracing::debug!(kind = %kind, revision, dirty = rec.is_dirty(), "saved view session");
    Ok(())
}

pub fn clear_session(root: &Path, kind: DocumentKind) -> Result<bool> {
    crate::io::remove_if_exists(&paths::session_path(root, kind))
}
