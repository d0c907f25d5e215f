//! The record store: single owner of every collection.
//!
//! Mutations go through [`Store`] methods, which bump the revision and
//! notify subscribers. Callers persist with [`Store::save`].

use crate::catalog::{PriceItem, WorkItem};
use crate::error::{ProcError, Result};
use crate::paths;
use crate::record::{Document, Project};
use crate::transfer::ImportMode;
use crate::types::DocumentKind;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// StoreEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    DocumentAdded { kind: DocumentKind, id: String },
    DocumentUpdated { kind: DocumentKind, id: String },
    DocumentRemoved { kind: DocumentKind, id: String },
    OrderReplaced { kind: DocumentKind },
    ProjectChanged { id: String },
    CatalogChanged { code: String },
    Imported { kind: DocumentKind, count: usize },
}

impl StoreEvent {
    /// Document kind whose list views must resync, if any.
    pub fn document_kind(&self) -> Option<DocumentKind> {
        match self {
            StoreEvent::DocumentAdded { kind, .. }
            | StoreEvent::DocumentUpdated { kind, .. }
            | StoreEvent::DocumentRemoved { kind, .. }
            | StoreEvent::OrderReplaced { kind }
            | StoreEvent::Imported { kind, .. } => Some(*kind),
            StoreEvent::ProjectChanged { .. } | StoreEvent::CatalogChanged { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: usize,
    pub replaced: usize,
}

// ---------------------------------------------------------------------------
// StoreData (on-disk shape)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub revision: u64,
    /// Per-kind counters, bumped only by events touching that document list.
    #[serde(default)]
    pub bq_revision: u64,
    #[serde(default)]
    pub rab_revision: u64,
    #[serde(default)]
    pub bq: Vec<Document>,
    #[serde(default)]
    pub rab: Vec<Document>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub price_items: Vec<PriceItem>,
    #[serde(default)]
    pub work_items: Vec<WorkItem>,
}

fn default_version() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

type Subscriber = Box<dyn FnMut(&StoreEvent)>;

pub struct Store {
    root: PathBuf,
    data: StoreData,
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("root", &self.root)
            .field("revision", &self.data.revision)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::from_data(
            root,
            StoreData {
                version: 1,
                ..StoreData::default()
            },
        )
    }

    pub fn from_data(root: impl Into<PathBuf>, data: StoreData) -> Self {
        Self {
            root: root.into(),
            data,
            subscribers: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::store_path(root);
        if !path.exists() {
            return Err(ProcError::NotInitialized);
        }
        let text = std::fs::read_to_string(&path)?;
        let data: StoreData = serde_yaml::from_str(&text)?;
        tracing::debug!(revision = data.revision, "loaded store");
        Ok(Self::from_data(root, data))
    }

    pub fn save(&self) -> Result<()> {
        let path = paths::store_path(&self.root);
        let text = serde_yaml::to_string(&self.data)?;
        crate::io::atomic_write(&path, text.as_bytes())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }

    pub fn revision(&self) -> u64 {
        self.data.revision
    }

    /// Revision of one document list. List-view sessions are stamped with
    /// this, so edits to other collections leave a pending order intact.
    pub fn kind_revision(&self, kind: DocumentKind) -> u64 {
        match kind {
            DocumentKind::Bq => self.data.bq_revision,
            DocumentKind::Rab => self.data.rab_revision,
        }
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    pub fn subscribe(&mut self, f: impl FnMut(&StoreEvent) + 'static) {
        self.subscribers.push(Box::new(f));
    }

    fn changed(&mut self, event: StoreEvent) {
        self.data.revision += 1;
        match event.document_kind() {
            Some(DocumentKind::Bq) => self.data.bq_revision += 1,
            Some(DocumentKind::Rab) => self.data.rab_revision += 1,
            None => {}
        }
        tracing::debug!(revision = self.data.revision, ?event, "store changed");
        for sub in &mut self.subscribers {
            sub(&event);
        }
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    pub fn documents(&self, kind: DocumentKind) -> &[Document] {
        match kind {
            DocumentKind::Bq => &self.data.bq,
            DocumentKind::Rab => &self.data.rab,
        }
    }

    fn documents_mut(&mut self, kind: DocumentKind) -> &mut Vec<Document> {
        match kind {
            DocumentKind::Bq => &mut self.data.bq,
            DocumentKind::Rab => &mut self.data.rab,
        }
    }

    pub fn document(&self, kind: DocumentKind, id: &str) -> Result<&Document> {
        self.documents(kind)
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found(kind, id))
    }

    fn check_project_ref(&self, doc: &Document) -> Result<()> {
        if let Some(project) = &doc.project {
            self.project(project)?;
        }
        Ok(())
    }

    pub fn add_document(&mut self, mut doc: Document) -> Result<()> {
        doc.validate()?;
        self.check_project_ref(&doc)?;
        let kind = doc.kind;
        if self.documents(kind).iter().any(|d| d.id == doc.id) {
            return Err(ProcError::DocumentExists {
                kind: kind.to_string(),
                id: doc.id,
            });
        }
        doc.touch();
        let id = doc.id.clone();
        self.documents_mut(kind).push(doc);
        self.changed(StoreEvent::DocumentAdded { kind, id });
        Ok(())
    }

    /// Apply `f` to a document. The id and kind cannot be changed this way.
    pub fn update_document(
        &mut self,
        kind: DocumentKind,
        id: &str,
        f: impl FnOnce(&mut Document),
    ) -> Result<()> {
        let mut doc = self.document(kind, id)?.clone();
        f(&mut doc);
        doc.id = id.to_string();
        doc.kind = kind;
        doc.validate()?;
        self.check_project_ref(&doc)?;
        doc.touch();
        if let Some(slot) = self.documents_mut(kind).iter_mut().find(|d| d.id == id) {
            *slot = doc;
        }
        self.changed(StoreEvent::DocumentUpdated {
            kind,
            id: id.to_string(),
        });
        Ok(())
    }

    pub fn remove_document(&mut self, kind: DocumentKind, id: &str) -> Result<Document> {
        let docs = self.documents_mut(kind);
        let pos = docs
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| not_found(kind, id))?;
        let removed = docs.remove(pos);
        self.changed(StoreEvent::DocumentRemoved {
            kind,
            id: id.to_string(),
        });
        Ok(removed)
    }

    /// Replace the stored order of `kind`. Every existing id must appear
    /// exactly once in `ordered`.
    pub fn replace_order(&mut self, kind: DocumentKind, ordered: &[&str]) -> Result<()> {
        let mut seen = HashSet::new();
        for &id in ordered {
            if !seen.insert(id) {
                return Err(ProcError::InvalidOrder(format!(
                    "duplicate id in order list: '{id}'"
                )));
            }
        }

        let existing: HashSet<&str> = self.documents(kind).iter().map(|d| d.id.as_str()).collect();
        for &id in ordered {
            if !existing.contains(id) {
                return Err(ProcError::InvalidOrder(format!(
                    "'{id}' is not a {kind} document"
                )));
            }
        }
        for d in self.documents(kind) {
            if !seen.contains(d.id.as_str()) {
                return Err(ProcError::InvalidOrder(format!(
                    "missing id in order list: '{}'",
                    d.id
                )));
            }
        }

        let mut docs = std::mem::take(self.documents_mut(kind));
        let mut reordered = Vec::with_capacity(docs.len());
        for &id in ordered {
            if let Some(pos) = docs.iter().position(|d| d.id == id) {
                reordered.push(docs.swap_remove(pos));
            }
        }
        *self.documents_mut(kind) = reordered;
        self.changed(StoreEvent::OrderReplaced { kind });
        Ok(())
    }

    pub fn import_documents(
        &mut self,
        kind: DocumentKind,
        docs: Vec<Document>,
        mode: ImportMode,
    ) -> Result<ImportSummary> {
        for doc in &docs {
            if doc.kind != kind {
                return Err(ProcError::Import(format!(
                    "document '{}' is {}, expected {kind}",
                    doc.id, doc.kind
                )));
            }
            doc.validate()?;
            self.check_project_ref(doc)?;
        }

        let mut summary = ImportSummary::default();
        match mode {
            ImportMode::Replace => {
                summary.replaced = self.documents(kind).len();
                summary.added = docs.len();
                *self.documents_mut(kind) = docs;
            }
            ImportMode::Append => {
                let existing: HashSet<String> =
                    self.documents(kind).iter().map(|d| d.id.clone()).collect();
                for doc in docs {
                    if existing.contains(&doc.id) {
                        summary.skipped += 1;
                    } else {
                        summary.added += 1;
                        self.documents_mut(kind).push(doc);
                    }
                }
            }
        }
        self.changed(StoreEvent::Imported {
            kind,
            count: summary.added,
        });
        Ok(summary)
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub fn projects(&self) -> &[Project] {
        &self.data.projects
    }

    pub fn project(&self, id: &str) -> Result<&Project> {
        self.data
            .projects
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ProcError::ProjectNotFound(id.to_string()))
    }

    pub fn add_project(&mut self, project: Project) -> Result<()> {
        paths::validate_id(&project.id)?;
        if self.data.projects.iter().any(|p| p.id == project.id) {
            return Err(ProcError::ProjectExists(project.id));
        }
        let id = project.id.clone();
        self.data.projects.push(project);
        self.changed(StoreEvent::ProjectChanged { id });
        Ok(())
    }

    pub fn update_project(&mut self, id: &str, f: impl FnOnce(&mut Project)) -> Result<()> {
        let project = self
            .data
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ProcError::ProjectNotFound(id.to_string()))?;
        f(project);
        project.id = id.to_string();
        project.touch();
        self.changed(StoreEvent::ProjectChanged { id: id.to_string() });
        Ok(())
    }

    /// Documents (both kinds) that reference `project`.
    pub fn documents_for_project(&self, project: &str) -> Vec<&Document> {
        self.data
            .bq
            .iter()
            .chain(self.data.rab.iter())
            .filter(|d| d.project.as_deref() == Some(project))
            .collect()
    }

    pub fn remove_project(&mut self, id: &str) -> Result<Project> {
        let pos = self
            .data
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| ProcError::ProjectNotFound(id.to_string()))?;
        let count = self.documents_for_project(id).len();
        if count > 0 {
            return Err(ProcError::ProjectInUse {
                project: id.to_string(),
                count,
            });
        }
        let removed = self.data.projects.remove(pos);
        self.changed(StoreEvent::ProjectChanged { id: id.to_string() });
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Catalog
    // -----------------------------------------------------------------------

    pub fn price_items(&self) -> &[PriceItem] {
        &self.data.price_items
    }

    pub fn work_items(&self) -> &[WorkItem] {
        &self.data.work_items
    }

    pub fn work_item(&self, code: &str) -> Result<&WorkItem> {
        self.data
            .work_items
            .iter()
            .find(|w| w.code == code)
            .ok_or_else(|| ProcError::WorkItemNotFound(code.to_string()))
    }

    pub fn add_price_item(&mut self, item: PriceItem) -> Result<()> {
        paths::validate_id(&item.code)?;
        if !item.unit_price.is_finite() || item.unit_price < 0.0 {
            return Err(ProcError::InvalidValue(format!(
                "unit price must be a non-negative number, got {}",
                item.unit_price
            )));
        }
        if self.data.price_items.iter().any(|p| p.code == item.code) {
            return Err(ProcError::PriceItemExists(item.code));
        }
        let code = item.code.clone();
        self.data.price_items.push(item);
        self.changed(StoreEvent::CatalogChanged { code });
        Ok(())
    }

    pub fn remove_price_item(&mut self, code: &str) -> Result<PriceItem> {
        let pos = self
            .data
            .price_items
            .iter()
            .position(|p| p.code == code)
            .ok_or_else(|| ProcError::PriceItemNotFound(code.to_string()))?;
        if let Some(user) = self.data.work_items.iter().find(|w| w.uses_price(code)) {
            return Err(ProcError::PriceItemInUse {
                price: code.to_string(),
                work_item: user.code.clone(),
            });
        }
        let removed = self.data.price_items.remove(pos);
        self.changed(StoreEvent::CatalogChanged {
            code: code.to_string(),
        });
        Ok(removed)
    }

    pub fn add_work_item(&mut self, item: WorkItem) -> Result<()> {
        paths::validate_id(&item.code)?;
        if self.data.work_items.iter().any(|w| w.code == item.code) {
            return Err(ProcError::WorkItemExists(item.code));
        }
        for c in &item.components {
            if !self.data.price_items.iter().any(|p| p.code == c.price_code) {
                return Err(ProcError::PriceItemNotFound(c.price_code.clone()));
            }
        }
        let code = item.code.clone();
        self.data.work_items.push(item);
        self.changed(StoreEvent::CatalogChanged { code });
        Ok(())
    }

    pub fn remove_work_item(&mut self, code: &str) -> Result<WorkItem> {
        let pos = self
            .data
            .work_items
            .iter()
            .position(|w| w.code == code)
            .ok_or_else(|| ProcError::WorkItemNotFound(code.to_string()))?;
        let removed = self.data.work_items.remove(pos);
        self.changed(StoreEvent::CatalogChanged {
            code: code.to_string(),
        });
        Ok(removed)
    }
}

fn not_found(kind: DocumentKind, id: &str) -> ProcError {
    ProcError::DocumentNotFound {
        kind: kind.to_string(),
        id: id.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{parse_component, PriceCategory};
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn doc(id: &str) -> Document {
        Document::new(id, DocumentKind::Bq, format!("Doc {id}"))
    }

    fn ids(store: &Store, kind: DocumentKind) -> Vec<String> {
        store.documents(kind).iter().map(|d| d.id.clone()).collect()
    }

    #[test]
    fn store_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut store = Store::new(dir.path());
        store.add_document(doc("bq-1")).unwrap();
        store.add_project(Project::new("gedung-a", "Gedung A")).unwrap();
        store.save().unwrap();

        let loaded = Store::load(dir.path()).unwrap();
        assert_eq!(loaded.revision(), 2);
        assert_eq!(ids(&loaded, DocumentKind::Bq), vec!["bq-1"]);
        assert_eq!(loaded.projects().len(), 1);
    }

    #[test]
    fn store_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(Store::load(dir.path()), Err(ProcError::NotInitialized)));
    }

    #[test]
    fn duplicate_document_rejected() {
        let mut store = Store::new("/tmp/unused");
        store.add_document(doc("bq-1")).unwrap();
        assert!(matches!(
            store.add_document(doc("bq-1")),
            Err(ProcError::DocumentExists { .. })
        ));
        // Same id under the other kind is fine.
        store
            .add_document(Document::new("bq-1", DocumentKind::Rab, "x"))
            .unwrap();
    }

    #[test]
    fn unknown_project_reference_rejected() {
        let mut store = Store::new("/tmp/unused");
        let mut d = doc("bq-1");
        d.project = Some("ghost".into());
        assert!(matches!(store.add_document(d), Err(ProcError::ProjectNotFound(_))));
    }

    #[test]
    fn subscribers_see_every_mutation() {
        let seen: Rc<RefCell<Vec<StoreEvent>>> = Rc::default();
        let mut store = Store::new("/tmp/unused");
        let sink = Rc::clone(&seen);
        store.subscribe(move |e| sink.borrow_mut().push(e.clone()));

        store.add_document(doc("bq-1")).unwrap();
        store
            .update_document(DocumentKind::Bq, "bq-1", |d| d.title = "Renamed".into())
            .unwrap();
        store.remove_document(DocumentKind::Bq, "bq-1").unwrap();

        let events = seen.borrow();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2].document_kind(), Some(DocumentKind::Bq));
        assert_eq!(store.revision(), 3);
    }

    #[test]
    fn kind_revision_ignores_other_collections() {
        let mut store = Store::new("/tmp/unused");
        store.add_document(doc("bq-1")).unwrap();
        assert_eq!(store.kind_revision(DocumentKind::Bq), 1);

        store.add_project(Project::new("gedung-a", "Gedung A")).unwrap();
        store
            .add_price_item(PriceItem {
                code: "semen".into(),
                name: "Semen".into(),
                category: PriceCategory::Material,
                unit: "zak".into(),
                unit_price: 70_000.0,
            })
            .unwrap();
        store
            .add_document(Document::new("r1", DocumentKind::Rab, "RAB"))
            .unwrap();

        assert_eq!(store.revision(), 4);
        assert_eq!(store.kind_revision(DocumentKind::Bq), 1);
        assert_eq!(store.kind_revision(DocumentKind::Rab), 1);
    }

    #[test]
    fn update_cannot_change_identity() {
        let mut store = Store::new("/tmp/unused");
        store.add_document(doc("bq-1")).unwrap();
        store
            .update_document(DocumentKind::Bq, "bq-1", |d| {
                d.id = "other".into();
                d.kind = DocumentKind::Rab;
            })
            .unwrap();
        assert!(store.document(DocumentKind::Bq, "bq-1").is_ok());
    }

    #[test]
    fn replace_order_validates() {
        let mut store = Store::new("/tmp/unused");
        for id in ["a", "b", "c"] {
            store.add_document(doc(id)).unwrap();
        }
        assert!(store.replace_order(DocumentKind::Bq, &["a", "a", "b"]).is_err());
        assert!(store.replace_order(DocumentKind::Bq, &["a", "b"]).is_err());
        assert!(store.replace_order(DocumentKind::Bq, &["a", "b", "z"]).is_err());

        store.replace_order(DocumentKind::Bq, &["c", "a", "b"]).unwrap();
        assert_eq!(ids(&store, DocumentKind::Bq), vec!["c", "a", "b"]);
    }

    #[test]
    fn project_in_use_cannot_be_removed() {
        let mut store = Store::new("/tmp/unused");
        store.add_project(Project::new("gedung-a", "Gedung A")).unwrap();
        let mut d = doc("bq-1");
        d.project = Some("gedung-a".into());
        store.add_document(d).unwrap();

        assert!(matches!(
            store.remove_project("gedung-a"),
            Err(ProcError::ProjectInUse { count: 1, .. })
        ));
        store.remove_document(DocumentKind::Bq, "bq-1").unwrap();
        store.remove_project("gedung-a").unwrap();
    }

    #[test]
    fn import_append_skips_existing() {
        let mut store = Store::new("/tmp/unused");
        store.add_document(doc("a")).unwrap();
        let summary = store
            .import_documents(DocumentKind::Bq, vec![doc("a"), doc("b")], ImportMode::Append)
            .unwrap();
        assert_eq!(summary.added, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(ids(&store, DocumentKind::Bq), vec!["a", "b"]);
    }

    #[test]
    fn import_replace_swaps_collection() {
        let mut store = Store::new("/tmp/unused");
        store.add_document(doc("a")).unwrap();
        let summary = store
            .import_documents(DocumentKind::Bq, vec![doc("x")], ImportMode::Replace)
            .unwrap();
        assert_eq!(summary.replaced, 1);
        assert_eq!(ids(&store, DocumentKind::Bq), vec!["x"]);
    }

    #[test]
    fn import_rejects_wrong_kind() {
        let mut store = Store::new("/tmp/unused");
        let rab = Document::new("r", DocumentKind::Rab, "x");
        assert!(store
            .import_documents(DocumentKind::Bq, vec![rab], ImportMode::Append)
            .is_err());
    }

    #[test]
    fn catalog_references_are_enforced() {
        let mut store = Store::new("/tmp/unused");
        store
            .add_price_item(PriceItem {
                code: "semen".into(),
                name: "Semen".into(),
                category: PriceCategory::Material,
                unit: "zak".into(),
                unit_price: 70_000.0,
            })
            .unwrap();
        let missing = WorkItem {
            code: "plester".into(),
            name: "Plesteran".into(),
            unit: "m2".into(),
            components: vec![parse_component("pasir=0.02").unwrap()],
        };
        assert!(store.add_work_item(missing).is_err());

        let ok = WorkItem {
            code: "plester".into(),
            name: "Plesteran".into(),
            unit: "m2".into(),
            components: vec![parse_component("semen=0.1").unwrap()],
        };
        store.add_work_item(ok).unwrap();
        assert!(matches!(
            store.remove_price_item("semen"),
            Err(ProcError::PriceItemInUse { .. })
        ));
    }
}
