pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod doc;
pub mod init;
pub mod project;
pub mod sla;

use anyhow::Context;
use chrono::NaiveDate;
use procdash_core::{config::Config, session, store::Store, types::DocumentKind};
use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

/// clap value parser for `YYYY-MM-DD` arguments.
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    procdash_core::sla::parse_date(s).ok_or_else(|| format!("invalid date '{s}': expected YYYY-MM-DD"))
}

/// Config, or defaults when the directory was never initialized.
pub fn load_config_or_default(root: &Path) -> anyhow::Result<Config> {
    match Config::load(root) {
        Ok(cfg) => Ok(cfg),
        Err(procdash_core::ProcError::NotInitialized) => Ok(Config::new("procdash")),
        Err(e) => Err(e).context("failed to load config"),
    }
}

/// A loaded store plus the document kinds its mutations touched.
pub struct Tracked {
    pub store: Store,
    touched: Rc<RefCell<Vec<DocumentKind>>>,
}

impl Tracked {
    pub fn open(root: &Path) -> anyhow::Result<Self> {
        let mut store = Store::load(root).context("failed to load store")?;
        let touched: Rc<RefCell<Vec<DocumentKind>>> = Rc::default();
        let sink = Rc::clone(&touched);
        store.subscribe(move |event| {
            tracing::debug!(?event, "store event");
            if let Some(kind) = event.document_kind() {
                let mut kinds = sink.borrow_mut();
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
        });
        Ok(Self { store, touched })
    }

    /// Save the store and report list views whose pending manual order the
    /// change made stale.
    pub fn commit(self, root: &Path) -> anyhow::Result<()> {
        self.store.save().context("failed to save store")?;
        for kind in self.touched.borrow().iter() {
            let pending = session::load_snapshot(root, *kind)
                .context("failed to read view session")?
                .is_some_and(|s| s.dirty);
            if pending {
                eprintln!("note: unsaved manual {kind} order was discarded because the data changed");
            }
        }
        Ok(())
    }
}
