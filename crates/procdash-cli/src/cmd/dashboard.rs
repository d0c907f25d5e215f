use crate::cmd::load_config_or_default;
use crate::output::{format_amount, print_json, print_table};
use anyhow::Context;
use procdash_core::{dashboard::Dashboard, record::Document, store::Store, types::DocumentKind};
use std::path::Path;

pub fn run(root: &Path, kind: Option<DocumentKind>, json: bool) -> anyhow::Result<()> {
    let store = Store::load(root).context("failed to load store")?;
    let config = load_config_or_default(root)?;
    let calc = config.sla.calculator();

    let docs: Vec<Document> = match kind {
        Some(k) => store.documents(k).to_vec(),
        None => DocumentKind::all()
            .iter()
            .flat_map(|&k| store.documents(k).iter().cloned())
            .collect(),
    };
    let board = Dashboard::build(&docs, &calc, config.sla.target_days);

    if json {
        print_json(&serde_json::json!({
            "kind": kind,
            "revision": store.revision(),
            "dashboard": board,
        }))?;
        return Ok(());
    }

    let scope = kind.map_or("all documents", |k| k.label());
    println!("Dashboard: {scope} ({} total)\n", board.total);

    let rows = board
        .statuses
        .iter()
        .map(|s| vec![s.status.to_string(), s.count.to_string()])
        .collect();
    print_table(&["STATUS", "COUNT"], rows);

    let sla = &board.sla;
    println!("\nSLA (target {} workdays)", sla.target_days);
    match sla.average {
        Some(avg) => {
            println!("  measured:  {}", sla.measured);
            println!("  average:   {avg:.1}");
            println!(
                "  min / max: {} / {}",
                sla.min.unwrap_or_default(),
                sla.max.unwrap_or_default()
            );
            println!("  on target: {}  late: {}", sla.on_target, sla.late);
        }
        None => println!("  no finished documents yet"),
    }

    if !board.monthly.is_empty() {
        println!("\nReceived per month");
        let rows = board
            .monthly
            .iter()
            .map(|m| vec![m.month.clone(), m.count.to_string()])
            .collect();
        print_table(&["MONTH", "COUNT"], rows);
    }

    if !board.projects.is_empty() {
        println!("\nValue by project");
        let rows = board
            .projects
            .iter()
            .map(|p| {
                vec![
                    p.project.clone(),
                    p.documents.to_string(),
                    format_amount(p.total_value),
                ]
            })
            .collect();
        print_table(&["PROJECT", "DOCS", "VALUE"], rows);
    }

    if !board.workload.is_empty() {
        println!("\nOpen documents per PIC");
        let rows = board
            .workload
            .iter()
            .map(|w| vec![w.pic.clone(), w.open.to_string()])
            .collect();
        print_table(&["PIC", "OPEN"], rows);
    }
    Ok(())
}
