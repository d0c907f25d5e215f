//! `procdash bq ...` / `procdash rab ...`: document records and their list
//! view. Ordering commands work on the persisted view session; record
//! commands go straight to the store.

use crate::cmd::{load_config_or_default, parse_date_arg, Tracked};
use crate::output::{opt_amount, opt_text, print_json, print_table};
use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};
use procdash_core::{
    filter::{parse_sort_spec, DocumentFilter},
    record::{Document, DOCUMENT_SORT_KEYS},
    reorder::{MoveOutcome, SortOutcome},
    session,
    sla::format_sla,
    store::Store,
    transfer::{self, ExportFormat, ImportMode},
    types::{DocumentKind, DocumentStatus, MoveDirection},
};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Only documents in this status
    #[arg(long)]
    status: Option<DocumentStatus>,
    /// Only documents of this project
    #[arg(long)]
    project: Option<String>,
    /// Only documents handled by this person
    #[arg(long)]
    pic: Option<String>,
    /// Case-insensitive text search over number, title, PIC and notes
    #[arg(long, short = 'q')]
    query: Option<String>,
    /// Received on or after this date
    #[arg(long, value_parser = parse_date_arg)]
    from: Option<NaiveDate>,
    /// Received on or before this date
    #[arg(long, value_parser = parse_date_arg)]
    to: Option<NaiveDate>,
    /// Only open documents (not finished or cancelled)
    #[arg(long)]
    open: bool,
}

impl FilterArgs {
    fn to_filter(&self) -> DocumentFilter {
        DocumentFilter {
            status: self.status,
            project: self.project.clone(),
            pic: self.pic.clone(),
            query: self.query.clone(),
            received_from: self.from,
            received_to: self.to,
            open_only: self.open,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct FieldArgs {
    #[arg(long)]
    title: Option<String>,
    /// Document number, e.g. BQ/2024/017
    #[arg(long)]
    number: Option<String>,
    #[arg(long)]
    project: Option<String>,
    /// Person in charge
    #[arg(long)]
    pic: Option<String>,
    #[arg(long)]
    value: Option<f64>,
    #[arg(long, value_parser = parse_date_arg)]
    received: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date_arg)]
    finish: Option<NaiveDate>,
    #[arg(long)]
    notes: Option<String>,
}

impl FieldArgs {
    fn apply(self, doc: &mut Document) {
        if let Some(v) = self.title {
            doc.title = v;
        }
        if let Some(v) = self.number {
            doc.number = v;
        }
        if self.project.is_some() {
            doc.project = self.project;
        }
        if self.pic.is_some() {
            doc.pic = self.pic;
        }
        if self.value.is_some() {
            doc.value = self.value;
        }
        if self.received.is_some() {
            doc.received_date = self.received;
        }
        if self.finish.is_some() {
            doc.finish_date = self.finish;
        }
        if self.notes.is_some() {
            doc.notes = self.notes;
        }
    }
}

#[derive(Subcommand)]
pub enum DocSubcommand {
    /// Add a document
    Add {
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
        /// Initial status (default: draft)
        #[arg(long)]
        status: Option<DocumentStatus>,
    },
    /// List documents in the current view order
    List {
        #[command(flatten)]
        filter: FilterArgs,
        /// Maximum rows to print (overrides display.page_size)
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one document
    Show { id: String },
    /// Edit document fields
    Update {
        id: String,
        #[command(flatten)]
        fields: FieldArgs,
        /// Clear the person in charge
        #[arg(long, conflicts_with = "pic")]
        clear_pic: bool,
        /// Clear the project reference
        #[arg(long, conflicts_with = "project")]
        clear_project: bool,
    },
    /// Move a document to a new status, filling in received/finish dates
    Status {
        id: String,
        status: DocumentStatus,
        /// Date to record instead of today
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },
    /// Remove a document
    Remove { id: String },
    /// Sort the list view by a column (KEY or KEY:desc)
    Sort { spec: String },
    /// Turn off the column sort
    Unsort,
    /// Move the document at a 1-based list position one step up or down
    Move {
        position: usize,
        direction: MoveDirection,
        /// Filters the position refers to; must match the listing used
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Save the pending manual order
    SaveOrder {
        /// Save even when no manual order is pending
        #[arg(long)]
        force: bool,
    },
    /// Discard the pending manual order
    ResetOrder,
    /// Export the current view
    Export {
        /// json or yaml (default: from --out extension, else yaml)
        #[arg(long)]
        format: Option<ExportFormat>,
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Flat report rows with SLA instead of full records
        #[arg(long)]
        report: bool,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Import documents from a JSON or YAML file
    Import {
        file: PathBuf,
        #[arg(long)]
        format: Option<ExportFormat>,
        /// Replace the whole collection instead of appending
        #[arg(long)]
        replace: bool,
    },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, kind: DocumentKind, subcmd: DocSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        DocSubcommand::Add { id, fields, status } => add(root, kind, &id, fields, status, json),
        DocSubcommand::List { filter, limit } => list(root, kind, &filter, limit, json),
        DocSubcommand::Show { id } => show(root, kind, &id, json),
        DocSubcommand::Update {
            id,
            fields,
            clear_pic,
            clear_project,
        } => update(root, kind, &id, json, |d| {
            fields.apply(d);
            if clear_pic {
                d.pic = None;
            }
            if clear_project {
                d.project = None;
            }
        }),
        DocSubcommand::Status { id, status, date } => {
            let day = date.unwrap_or_else(|| Local::now().date_naive());
            update(root, kind, &id, json, |d| d.set_status(status, day))
        }
        DocSubcommand::Remove { id } => remove(root, kind, &id, json),
        DocSubcommand::Sort { spec } => sort(root, kind, &spec, json),
        DocSubcommand::Unsort => unsort(root, kind, json),
        DocSubcommand::Move {
            position,
            direction,
            filter,
        } => move_doc(root, kind, position, direction, &filter, json),
        DocSubcommand::SaveOrder { force } => save_order(root, kind, force, json),
        DocSubcommand::ResetOrder => reset_order(root, kind, json),
        DocSubcommand::Export {
            format,
            out,
            report,
            filter,
        } => export(root, kind, format, out.as_deref(), report, &filter),
        DocSubcommand::Import {
            file,
            format,
            replace,
        } => import(root, kind, &file, format, replace, json),
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

fn add(
    root: &Path,
    kind: DocumentKind,
    id: &str,
    fields: FieldArgs,
    status: Option<DocumentStatus>,
    json: bool,
) -> anyhow::Result<()> {
    let title = fields.title.clone().unwrap_or_else(|| id.to_string());
    let mut doc = Document::new(id, kind, title);
    fields.apply(&mut doc);
    if let Some(status) = status {
        let today = Local::now().date_naive();
        doc.set_status(status, doc.received_date.unwrap_or(today));
    }

    let mut tracked = Tracked::open(root)?;
    tracked
        .store
        .add_document(doc)
        .with_context(|| format!("failed to add {kind} document '{id}'"))?;
    tracked.commit(root)?;

    if json {
        print_json(&serde_json::json!({ "kind": kind, "id": id, "added": true }))?;
    } else {
        println!("Added {kind} document '{id}'");
    }
    Ok(())
}

fn show(root: &Path, kind: DocumentKind, id: &str, json: bool) -> anyhow::Result<()> {
    let store = Store::load(root).context("failed to load store")?;
    let config = load_config_or_default(root)?;
    let doc = store.document(kind, id)?;
    let sla = doc.sla(&config.sla.calculator());

    if json {
        print_json(&serde_json::json!({ "document": doc, "sla_days": sla }))?;
        return Ok(());
    }
    println!("{} {}: {}", kind.label(), doc.id, doc.title);
    let number = if doc.number.is_empty() { "-" } else { doc.number.as_str() };
    println!("Number:   {number}");
    println!("Status:   {}", doc.status);
    println!("Project:  {}", opt_text(doc.project.as_deref()));
    println!("PIC:      {}", opt_text(doc.pic.as_deref()));
    println!("Value:    {}", opt_amount(doc.value));
    println!("Received: {}", opt_text(doc.received_date));
    println!("Finish:   {}", opt_text(doc.finish_date));
    println!("SLA:      {}", format_sla(sla));
    if let Some(notes) = &doc.notes {
        println!("\n{notes}");
    }
    Ok(())
}

fn update(
    root: &Path,
    kind: DocumentKind,
    id: &str,
    json: bool,
    f: impl FnOnce(&mut Document),
) -> anyhow::Result<()> {
    let mut tracked = Tracked::open(root)?;
    tracked
        .store
        .update_document(kind, id, f)
        .with_context(|| format!("failed to update {kind} document '{id}'"))?;
    let status = tracked.store.document(kind, id)?.status;
    tracked.commit(root)?;

    if json {
        print_json(&serde_json::json!({ "kind": kind, "id": id, "status": status, "updated": true }))?;
    } else {
        println!("Updated {kind} document '{id}' ({status})");
    }
    Ok(())
}

fn remove(root: &Path, kind: DocumentKind, id: &str, json: bool) -> anyhow::Result<()> {
    let mut tracked = Tracked::open(root)?;
    tracked.store.remove_document(kind, id)?;
    tracked.commit(root)?;

    if json {
        print_json(&serde_json::json!({ "kind": kind, "id": id, "removed": true }))?;
    } else {
        println!("Removed {kind} document '{id}'");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// List view
// ---------------------------------------------------------------------------

fn list(
    root: &Path,
    kind: DocumentKind,
    filter: &FilterArgs,
    limit: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let store = Store::load(root).context("failed to load store")?;
    let config = load_config_or_default(root)?;
    let rec = session::load_reconciler(root, &store, kind)?;

    let filter = filter.to_filter();
    let matches = |d: &Document| filter.matches(d);
    let view = rec.current_view(Some(&matches));
    let calc = config.sla.calculator();
    let rows = transfer::export_rows(&view, &calc, config.sla.target_days);

    if json {
        print_json(&serde_json::json!({
            "kind": kind,
            "sort": rec.sort(),
            "manual_order_pending": rec.is_dirty(),
            "total": rows.len(),
            "documents": rows,
        }))?;
        return Ok(());
    }

    if let Some(sort) = rec.sort() {
        println!("sorted by {} {}", sort.key, sort.direction);
    }
    if rec.is_dirty() {
        println!("manual order pending: run 'procdash {kind} save-order' to keep it");
    }
    if rows.is_empty() {
        println!("No {kind} documents.");
        return Ok(());
    }

    // A zero page size is a config error; treat it as unlimited.
    let page = limit
        .or(config.display.page_size)
        .filter(|&n| n > 0)
        .unwrap_or(usize::MAX);
    let table = rows
        .iter()
        .take(page)
        .map(|r| {
            vec![
                r.no.to_string(),
                r.id.clone(),
                if r.number.is_empty() { "-".to_string() } else { r.number.clone() },
                r.title.clone(),
                opt_text(r.project.as_deref()),
                opt_text(r.pic.as_deref()),
                opt_amount(r.value),
                r.status.to_string(),
                opt_text(r.received_date),
                opt_text(r.finish_date),
                format_sla(r.sla_days),
            ]
        })
        .collect();
    print_table(
        &[
            "NO", "ID", "NUMBER", "TITLE", "PROJECT", "PIC", "VALUE", "STATUS", "RECEIVED",
            "FINISH", "SLA",
        ],
        table,
    );
    if rows.len() > page {
        println!("... {} more (use --limit)", rows.len() - page);
    }
    Ok(())
}

fn sort(root: &Path, kind: DocumentKind, spec: &str, json: bool) -> anyhow::Result<()> {
    let state = parse_sort_spec(spec, DOCUMENT_SORT_KEYS)?;
    let store = Store::load(root).context("failed to load store")?;
    let mut rec = session::load_reconciler(root, &store, kind)?;
    let outcome = rec.apply_sort(state.key.clone(), state.direction);
    session::save_session(root, kind, &rec, store.kind_revision(kind))
        .context("failed to save view session")?;

    let replaced = outcome == SortOutcome::ManualOrderReplaced;
    if json {
        print_json(&serde_json::json!({
            "kind": kind,
            "sort": state,
            "manual_order_replaced": replaced,
        }))?;
    } else {
        if replaced {
            println!("manual order replaced by sort");
        }
        println!("Sorted {kind} by {} {}", state.key, state.direction);
    }
    Ok(())
}

fn unsort(root: &Path, kind: DocumentKind, json: bool) -> anyhow::Result<()> {
    let store = Store::load(root).context("failed to load store")?;
    let mut rec = session::load_reconciler(root, &store, kind)?;
    let cleared = rec.clear_sort();
    session::save_session(root, kind, &rec, store.kind_revision(kind))
        .context("failed to save view session")?;

    if json {
        print_json(&serde_json::json!({ "kind": kind, "cleared": cleared }))?;
    } else if cleared {
        println!("Sort cleared for {kind}");
    } else {
        println!("No sort active for {kind}");
    }
    Ok(())
}

fn move_doc(
    root: &Path,
    kind: DocumentKind,
    position: usize,
    direction: MoveDirection,
    filter: &FilterArgs,
    json: bool,
) -> anyhow::Result<()> {
    let store = Store::load(root).context("failed to load store")?;
    let mut rec = session::load_reconciler(root, &store, kind)?;
    let filter = filter.to_filter();
    let matches = |d: &Document| filter.matches(d);

    let outcome = match position.checked_sub(1) {
        Some(index) => rec.move_item(index, direction, Some(&matches)),
        None => MoveOutcome::OutOfRange,
    };

    match outcome {
        MoveOutcome::OutOfRange => {
            let shown = rec.current_view(Some(&matches)).len();
            anyhow::bail!("position {position} is out of range (1..={shown})");
        }
        MoveOutcome::Desync => {
            tracing::warn!(kind = %kind, position, "list view out of sync, move ignored");
        }
        MoveOutcome::AtBoundary | MoveOutcome::Moved { .. } => {}
    }

    if outcome.is_moved() {
        session::save_session(root, kind, &rec, store.kind_revision(kind))
            .context("failed to save view session")?;
    }

    let sort_cleared = matches!(outcome, MoveOutcome::Moved { sort_cleared: true });
    if json {
        print_json(&serde_json::json!({
            "kind": kind,
            "position": position,
            "direction": direction,
            "moved": outcome.is_moved(),
            "sort_cleared": sort_cleared,
            "order": rec.working().iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
        }))?;
        return Ok(());
    }

    if sort_cleared {
        println!("sort disabled, switched to manual order");
    }
    match outcome {
        MoveOutcome::Moved { .. } => {
            println!("Moved position {position} {direction}; run 'procdash {kind} save-order' to keep it")
        }
        MoveOutcome::AtBoundary => {
            let edge = match direction {
                MoveDirection::Up => "top",
                MoveDirection::Down => "bottom",
            };
            println!("Position {position} is already at the {edge}");
        }
        _ => println!("Nothing moved"),
    }
    Ok(())
}

fn save_order(root: &Path, kind: DocumentKind, force: bool, json: bool) -> anyhow::Result<()> {
    let mut store = Store::load(root).context("failed to load store")?;
    let mut rec = session::load_reconciler(root, &store, kind)?;

    let write = |docs: &[Document]| {
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        store.replace_order(kind, &ids)
    };
    let saved = if force {
        rec.force_persist(write)?;
        true
    } else {
        rec.persist(write)?
    };

    if saved {
        store.save().context("failed to save store")?;
    }
    session::save_session(root, kind, &rec, store.kind_revision(kind))
        .context("failed to save view session")?;

    if json {
        print_json(&serde_json::json!({ "kind": kind, "saved": saved }))?;
    } else if saved {
        println!("Saved {kind} order ({} documents)", rec.len());
    } else {
        println!("No pending manual order for {kind}");
    }
    Ok(())
}

fn reset_order(root: &Path, kind: DocumentKind, json: bool) -> anyhow::Result<()> {
    let store = Store::load(root).context("failed to load store")?;
    let mut rec = session::load_reconciler(root, &store, kind)?;
    let discarded = rec.is_dirty();
    rec.sync(store.documents(kind).to_vec());

    if rec.sort().is_some() {
        session::save_session(root, kind, &rec, store.kind_revision(kind))
            .context("failed to save view session")?;
    } else {
        session::clear_session(root, kind).context("failed to clear view session")?;
    }

    if json {
        print_json(&serde_json::json!({ "kind": kind, "discarded": discarded }))?;
    } else if discarded {
        println!("Discarded pending {kind} order");
    } else {
        println!("No pending manual order for {kind}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Transfer
// ---------------------------------------------------------------------------

fn export(
    root: &Path,
    kind: DocumentKind,
    format: Option<ExportFormat>,
    out: Option<&Path>,
    report: bool,
    filter: &FilterArgs,
) -> anyhow::Result<()> {
    let store = Store::load(root).context("failed to load store")?;
    let rec = session::load_reconciler(root, &store, kind)?;
    let filter = filter.to_filter();
    let matches = |d: &Document| filter.matches(d);
    let view = rec.current_view(Some(&matches));

    let format = format
        .or_else(|| out.map(ExportFormat::from_path))
        .unwrap_or(ExportFormat::Yaml);
    let text = if report {
        let config = load_config_or_default(root)?;
        let rows = transfer::export_rows(&view, &config.sla.calculator(), config.sla.target_days);
        transfer::export_report(&rows, format)?
    } else {
        transfer::export_documents(&view, format)?
    };

    match out {
        Some(path) => {
            procdash_core::io::atomic_write(path, text.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Exported {} {kind} documents to {}", view.len(), path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn import(
    root: &Path,
    kind: DocumentKind,
    file: &Path,
    format: Option<ExportFormat>,
    replace: bool,
    json: bool,
) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let format = format.unwrap_or_else(|| ExportFormat::from_path(file));
    let docs = transfer::import_documents(&text, format)
        .with_context(|| format!("failed to parse {}", file.display()))?;

    let mode = if replace {
        ImportMode::Replace
    } else {
        ImportMode::Append
    };
    let mut tracked = Tracked::open(root)?;
    let summary = tracked.store.import_documents(kind, docs, mode)?;
    tracked.commit(root)?;

    if json {
        print_json(&serde_json::json!({ "kind": kind, "mode": mode, "summary": summary }))?;
    } else {
        println!(
            "Imported {kind}: {} added, {} skipped, {} replaced",
            summary.added, summary.skipped, summary.replaced
        );
    }
    Ok(())
}
