//! Manual order / column-sort reconciliation for list views.
//!
//! A [`Reconciler`] holds the last saved (`canonical`) order and a local
//! `working` copy. The list shown to the user is derived on read: filter, then
//! the optional column sort. Column sort and a pending manual order are
//! mutually exclusive; setting one drops the other.

use crate::types::{MoveDirection, SortDirection};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

// ---------------------------------------------------------------------------
// Orderable / SortValue
// ---------------------------------------------------------------------------

/// Items the reconciler can order: stable identity plus named sort columns.
pub trait Orderable {
    fn id(&self) -> &str;

    /// Value of column `key`, or `None` when the column is unknown or empty.
    fn sort_value(&self, key: &str) -> Option<SortValue>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Number(_) => 0,
            SortValue::Date(_) => 1,
            SortValue::Text(_) => 2,
        }
    }

    /// Total order: text compares case-insensitively, mixed variants by rank.
    pub fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl From<&str> for SortValue {
    fn from(s: &str) -> Self {
        SortValue::Text(s.to_string())
    }
}

impl From<f64> for SortValue {
    fn from(n: f64) -> Self {
        SortValue::Number(n)
    }
}

impl From<NaiveDate> for SortValue {
    fn from(d: NaiveDate) -> Self {
        SortValue::Date(d)
    }
}

// ---------------------------------------------------------------------------
// SortState / outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: String,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOutcome {
    Applied,
    /// A pending manual order was discarded in favour of the sort.
    ManualOrderReplaced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Swapped; `sort_cleared` is set when an active sort was switched off.
    Moved { sort_cleared: bool },
    OutOfRange,
    AtBoundary,
    /// The displayed items could not be located in the working order.
    Desync,
}

impl MoveOutcome {
    pub fn is_moved(self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

/// Serializable form of a reconciler, keyed by item id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcilerSnapshot {
    pub revision: u64,
    pub working_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortState>,
    pub dirty: bool,
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Reconciler<T> {
    canonical: Vec<T>,
    working: Vec<T>,
    sort: Option<SortState>,
    dirty: bool,
}

impl<T: Orderable + Clone> Reconciler<T> {
    pub fn new(canonical: Vec<T>) -> Self {
        Self {
            working: canonical.clone(),
            canonical,
            sort: None,
            dirty: false,
        }
    }

    /// Rebuild from a snapshot. Returns the reconciler and whether the
    /// pending order had to be dropped because the data moved underneath it.
    pub fn restore(canonical: Vec<T>, snapshot: &ReconcilerSnapshot, revision: u64) -> (Self, bool) {
        let mut rec = Self::new(canonical);
        rec.sort = snapshot.sort.clone();
        if !snapshot.dirty {
            return (rec, false);
        }
        if snapshot.revision != revision {
            return (rec, true);
        }
        match rec.rebuild_working(&snapshot.working_ids) {
            Some(working) => {
                rec.working = working;
                rec.dirty = true;
                (rec, false)
            }
            None => (rec, true),
        }
    }

    fn rebuild_working(&self, ids: &[String]) -> Option<Vec<T>> {
        if ids.len() != self.canonical.len() {
            return None;
        }
        let by_id: HashMap<&str, &T> = self.canonical.iter().map(|t| (t.id(), t)).collect();
        let mut seen = HashSet::new();
        let mut working = Vec::with_capacity(ids.len());
        for id in ids {
            if !seen.insert(id.as_str()) {
                return None;
            }
            working.push((*by_id.get(id.as_str())?).clone());
        }
        Some(working)
    }

    pub fn snapshot(&self, revision: u64) -> ReconcilerSnapshot {
        ReconcilerSnapshot {
            revision,
            working_ids: self.working.iter().map(|t| t.id().to_string()).collect(),
            sort: self.sort.clone(),
            dirty: self.dirty,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn canonical(&self) -> &[T] {
        &self.canonical
    }

    pub fn working(&self) -> &[T] {
        &self.working
    }

    pub fn sort(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.working.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Replace both orders with fresh upstream data. Any pending manual order
    /// is dropped; the column sort is kept.
    pub fn sync(&mut self, canonical: Vec<T>) {
        self.working = canonical.clone();
        self.canonical = canonical;
        self.dirty = false;
    }

    pub fn apply_sort(&mut self, key: impl Into<String>, direction: SortDirection) -> SortOutcome {
        self.sort = Some(SortState::new(key, direction));
        if self.dirty {
            self.working = self.canonical.clone();
            self.dirty = false;
            SortOutcome::ManualOrderReplaced
        } else {
            SortOutcome::Applied
        }
    }

    pub fn clear_sort(&mut self) -> bool {
        self.sort.take().is_some()
    }

    /// Move the item at `display_index` of the current view one step.
    pub fn move_item(
        &mut self,
        display_index: usize,
        direction: MoveDirection,
        filter: Option<&dyn Fn(&T) -> bool>,
    ) -> MoveOutcome {
        let view = self.view_refs(filter);
        if display_index >= view.len() {
            return MoveOutcome::OutOfRange;
        }
        let neighbor = match direction {
            MoveDirection::Up => display_index.checked_sub(1),
            MoveDirection::Down => Some(display_index + 1).filter(|&i| i < view.len()),
        };
        let Some(neighbor) = neighbor else {
            return MoveOutcome::AtBoundary;
        };

        let a = view[display_index].id().to_string();
        let b = view[neighbor].id().to_string();
        let pa = self.working.iter().position(|t| t.id() == a);
        let pb = self.working.iter().position(|t| t.id() == b);
        let (Some(pa), Some(pb)) = (pa, pb) else {
            return MoveOutcome::Desync;
        };

        self.working.swap(pa, pb);
        let sort_cleared = self.sort.take().is_some();
        self.dirty = true;
        MoveOutcome::Moved { sort_cleared }
    }

    /// Hand the working order to `on_save` if a manual order is pending.
    /// Returns whether anything was saved.
    pub fn persist<E>(&mut self, on_save: impl FnOnce(&[T]) -> Result<(), E>) -> Result<bool, E> {
        if !self.dirty {
            return Ok(false);
        }
        self.force_persist(on_save)?;
        Ok(true)
    }

    /// Hand the working order to `on_save` regardless of the dirty flag.
    pub fn force_persist<E>(&mut self, on_save: impl FnOnce(&[T]) -> Result<(), E>) -> Result<(), E> {
        on_save(&self.working)?;
        self.canonical = self.working.clone();
        self.dirty = false;
        Ok(())
    }

    /// Filtered and sorted copy of the working order.
    pub fn current_view(&self, filter: Option<&dyn Fn(&T) -> bool>) -> Vec<T> {
        self.view_refs(filter).into_iter().cloned().collect()
    }

    fn view_refs(&self, filter: Option<&dyn Fn(&T) -> bool>) -> Vec<&T> {
        let mut view: Vec<&T> = match filter {
            Some(f) => self.working.iter().filter(|t| f(t)).collect(),
            None => self.working.iter().collect(),
        };
        if let Some(sort) = &self.sort {
            sort_view(&mut view, sort);
        }
        view
    }
}

/// Stable sort by `state.key`; items without a value go last in both
/// directions.
pub fn sort_view<T: Orderable>(items: &mut [&T], state: &SortState) {
    items.sort_by(|a, b| {
        match (a.sort_value(&state.key), b.sort_value(&state.key)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => match state.direction {
                SortDirection::Asc => x.compare(&y),
                SortDirection::Desc => y.compare(&x),
            },
        }
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: String,
        name: String,
        amount: Option<f64>,
    }

    fn row(id: &str, name: &str, amount: Option<f64>) -> Row {
        Row {
            id: id.to_string(),
            name: name.to_string(),
            amount,
        }
    }

    impl Orderable for Row {
        fn id(&self) -> &str {
            &self.id
        }

        fn sort_value(&self, key: &str) -> Option<SortValue> {
            match key {
                "name" => Some(SortValue::from(self.name.as_str())),
                "amount" => self.amount.map(SortValue::from),
                _ => None,
            }
        }
    }

    fn abc() -> Vec<Row> {
        vec![
            row("a", "Charlie", Some(3.0)),
            row("b", "alpha", None),
            row("c", "Bravo", Some(1.0)),
        ]
    }

    fn ids(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn move_up_swaps_and_marks_dirty() {
        let mut rec = Reconciler::new(abc());
        let out = rec.move_item(1, MoveDirection::Up, None);
        assert_eq!(out, MoveOutcome::Moved { sort_cleared: false });
        assert_eq!(ids(rec.working()), vec!["b", "a", "c"]);
        assert_eq!(ids(rec.canonical()), vec!["a", "b", "c"]);
        assert!(rec.is_dirty());
    }

    #[test]
    fn boundary_moves_are_noops() {
        let mut rec = Reconciler::new(abc());
        assert_eq!(rec.move_item(0, MoveDirection::Up, None), MoveOutcome::AtBoundary);
        assert_eq!(rec.move_item(2, MoveDirection::Down, None), MoveOutcome::AtBoundary);
        assert_eq!(rec.move_item(9, MoveDirection::Down, None), MoveOutcome::OutOfRange);
        assert!(!rec.is_dirty());
        assert_eq!(ids(rec.working()), vec!["a", "b", "c"]);
    }

    #[test]
    fn move_on_sorted_view_swaps_storage_and_clears_sort() {
        let mut rec = Reconciler::new(abc());
        rec.apply_sort("name", SortDirection::Asc);
        // Displayed: alpha(b), Bravo(c), Charlie(a)
        let view = rec.current_view(None);
        assert_eq!(ids(&view), vec!["b", "c", "a"]);

        let out = rec.move_item(2, MoveDirection::Up, None);
        assert_eq!(out, MoveOutcome::Moved { sort_cleared: true });
        assert!(rec.sort().is_none());
        assert!(rec.is_dirty());
        // c and a swapped in storage: [c, b, a]
        assert_eq!(ids(rec.working()), vec!["c", "b", "a"]);
    }

    #[test]
    fn move_uses_filtered_view() {
        let mut rec = Reconciler::new(abc());
        let only_valued = |r: &Row| r.amount.is_some();
        // Filtered view: a, c. Moving c up swaps it with a across the hidden b.
        let out = rec.move_item(1, MoveDirection::Up, Some(&only_valued));
        assert!(out.is_moved());
        assert_eq!(ids(rec.working()), vec!["c", "b", "a"]);
    }

    #[test]
    fn sort_replaces_pending_manual_order() {
        let mut rec = Reconciler::new(abc());
        rec.move_item(1, MoveDirection::Up, None);
        let out = rec.apply_sort("name", SortDirection::Asc);
        assert_eq!(out, SortOutcome::ManualOrderReplaced);
        assert!(!rec.is_dirty());
        assert_eq!(rec.sort(), Some(&SortState::new("name", SortDirection::Asc)));
        assert_eq!(ids(rec.working()), vec!["a", "b", "c"]);
        assert_eq!(ids(&rec.current_view(None)), vec!["b", "c", "a"]);

        let mut saved = false;
        let wrote = rec
            .persist(|_| {
                saved = true;
                Ok::<(), ()>(())
            })
            .unwrap();
        assert!(!wrote);
        assert!(!saved);
    }

    #[test]
    fn sort_without_pending_order_is_applied() {
        let mut rec = Reconciler::new(abc());
        assert_eq!(rec.apply_sort("amount", SortDirection::Asc), SortOutcome::Applied);
    }

    #[test]
    fn nulls_sort_last_both_directions() {
        let mut rec = Reconciler::new(abc());
        rec.apply_sort("amount", SortDirection::Asc);
        assert_eq!(ids(&rec.current_view(None)), vec!["c", "a", "b"]);
        rec.apply_sort("amount", SortDirection::Desc);
        assert_eq!(ids(&rec.current_view(None)), vec!["a", "c", "b"]);
    }

    #[test]
    fn unknown_sort_key_keeps_storage_order() {
        let mut rec = Reconciler::new(abc());
        rec.apply_sort("missing", SortDirection::Desc);
        assert_eq!(ids(&rec.current_view(None)), vec!["a", "b", "c"]);
    }

    #[test]
    fn persist_hands_over_working_order() {
        let mut rec = Reconciler::new(abc());
        rec.move_item(2, MoveDirection::Up, None);
        let mut store: Vec<String> = Vec::new();
        let wrote = rec
            .persist(|order: &[Row]| {
                store = order.iter().map(|r| r.id.clone()).collect();
                Ok::<(), ()>(())
            })
            .unwrap();
        assert!(wrote);
        assert!(!rec.is_dirty());
        assert_eq!(store, vec!["a", "c", "b"]);
        assert_eq!(ids(rec.canonical()), vec!["a", "c", "b"]);
    }

    #[test]
    fn failed_save_keeps_dirty() {
        let mut rec = Reconciler::new(abc());
        rec.move_item(1, MoveDirection::Down, None);
        let result = rec.persist(|_| Err("disk full"));
        assert_eq!(result, Err("disk full"));
        assert!(rec.is_dirty());
    }

    #[test]
    fn force_persist_roundtrips_synced_list() {
        let mut rec = Reconciler::new(Vec::new());
        rec.sync(abc());
        let mut got = Vec::new();
        rec.force_persist(|order: &[Row]| {
            got = order.to_vec();
            Ok::<(), ()>(())
        })
        .unwrap();
        assert_eq!(got, abc());
    }

    #[test]
    fn sync_resets_everything_but_sort() {
        let mut rec = Reconciler::new(abc());
        rec.move_item(1, MoveDirection::Up, None);
        rec.sync(vec![row("z", "Zulu", None)]);
        assert!(!rec.is_dirty());
        assert_eq!(ids(rec.working()), vec!["z"]);
        assert_eq!(ids(rec.canonical()), vec!["z"]);
    }

    #[test]
    fn current_view_does_not_mutate() {
        let mut rec = Reconciler::new(abc());
        rec.apply_sort("name", SortDirection::Desc);
        let _ = rec.current_view(None);
        assert_eq!(ids(rec.working()), vec!["a", "b", "c"]);
    }

    #[test]
    fn snapshot_restore_keeps_pending_order() {
        let mut rec = Reconciler::new(abc());
        rec.move_item(1, MoveDirection::Up, None);
        let snap = rec.snapshot(7);

        let (restored, resynced) = Reconciler::restore(abc(), &snap, 7);
        assert!(!resynced);
        assert!(restored.is_dirty());
        assert_eq!(ids(restored.working()), vec!["b", "a", "c"]);
    }

    #[test]
    fn restore_resyncs_on_revision_change() {
        let mut rec = Reconciler::new(abc());
        rec.move_item(1, MoveDirection::Up, None);
        let snap = rec.snapshot(7);

        let (restored, resynced) = Reconciler::restore(abc(), &snap, 8);
        assert!(resynced);
        assert!(!restored.is_dirty());
        assert_eq!(ids(restored.working()), vec!["a", "b", "c"]);
    }

    #[test]
    fn restore_resyncs_on_unknown_ids() {
        let snap = ReconcilerSnapshot {
            revision: 1,
            working_ids: vec!["a".into(), "x".into(), "c".into()],
            sort: None,
            dirty: true,
        };
        let (restored, resynced) = Reconciler::restore(abc(), &snap, 1);
        assert!(resynced);
        assert_eq!(ids(restored.working()), vec!["a", "b", "c"]);
    }

    #[test]
    fn text_compare_is_case_insensitive() {
        let a = SortValue::from("alpha");
        let b = SortValue::from("Bravo");
        assert_eq!(a.compare(&b), Ordering::Less);
    }
}
