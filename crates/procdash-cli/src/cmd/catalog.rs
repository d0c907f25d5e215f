use crate::cmd::Tracked;
use crate::output::{format_amount, print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use procdash_core::{
    catalog::{cost_breakdown, parse_component, work_item_unit_cost, PriceCategory, PriceItem, WorkItem},
    store::Store,
};
use std::path::Path;

#[derive(Subcommand)]
pub enum PriceSubcommand {
    /// Add a unit price
    Add {
        code: String,
        #[arg(long)]
        name: String,
        /// material, labor or equipment
        #[arg(long)]
        category: PriceCategory,
        /// Unit of measure, e.g. m3, zak, OH
        #[arg(long)]
        unit: String,
        #[arg(long)]
        price: f64,
    },
    /// List unit prices
    List {
        #[arg(long)]
        category: Option<PriceCategory>,
    },
    /// Remove a unit price not used by any work item
    Remove { code: String },
}

#[derive(Subcommand)]
pub enum WorkItemSubcommand {
    /// Add a work item with its price analysis
    Add {
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        unit: String,
        /// Component as PRICE_CODE=COEFFICIENT; repeatable
        #[arg(long = "component", short = 'c', value_name = "CODE=COEF")]
        components: Vec<String>,
    },
    /// List work items with their unit cost
    List,
    /// Cost of a work item, optionally for a volume
    Cost {
        code: String,
        /// Quantity in the work item's unit
        #[arg(long, default_value_t = 1.0)]
        volume: f64,
    },
    /// Remove a work item
    Remove { code: String },
}

// ---------------------------------------------------------------------------
// Prices
// ---------------------------------------------------------------------------

pub fn run_price(root: &Path, subcmd: PriceSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        PriceSubcommand::Add {
            code,
            name,
            category,
            unit,
            price,
        } => {
            let mut tracked = Tracked::open(root)?;
            tracked
                .store
                .add_price_item(PriceItem {
                    code: code.clone(),
                    name,
                    category,
                    unit,
                    unit_price: price,
                })
                .with_context(|| format!("failed to add price item '{code}'"))?;
            tracked.commit(root)?;
            if json {
                print_json(&serde_json::json!({ "code": code, "added": true }))?;
            } else {
                println!("Added price item '{code}'");
            }
            Ok(())
        }
        PriceSubcommand::List { category } => {
            let store = Store::load(root).context("failed to load store")?;
            let items: Vec<&PriceItem> = store
                .price_items()
                .iter()
                .filter(|p| category.is_none_or(|c| p.category == c))
                .collect();
            if json {
                print_json(&items)?;
            } else if items.is_empty() {
                println!("No price items.");
            } else {
                let rows = items
                    .iter()
                    .map(|p| {
                        vec![
                            p.code.clone(),
                            p.name.clone(),
                            p.category.to_string(),
                            p.unit.clone(),
                            format_amount(p.unit_price),
                        ]
                    })
                    .collect();
                print_table(&["CODE", "NAME", "CATEGORY", "UNIT", "PRICE"], rows);
            }
            Ok(())
        }
        PriceSubcommand::Remove { code } => {
            let mut tracked = Tracked::open(root)?;
            tracked.store.remove_price_item(&code)?;
            tracked.commit(root)?;
            if json {
                print_json(&serde_json::json!({ "code": code, "removed": true }))?;
            } else {
                println!("Removed price item '{code}'");
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Work items
// ---------------------------------------------------------------------------

pub fn run_work_item(root: &Path, subcmd: WorkItemSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        WorkItemSubcommand::Add {
            code,
            name,
            unit,
            components,
        } => add_work_item(root, code, name, unit, &components, json),
        WorkItemSubcommand::List => list_work_items(root, json),
        WorkItemSubcommand::Cost { code, volume } => cost(root, &code, volume, json),
        WorkItemSubcommand::Remove { code } => {
            let mut tracked = Tracked::open(root)?;
            tracked.store.remove_work_item(&code)?;
            tracked.commit(root)?;
            if json {
                print_json(&serde_json::json!({ "code": code, "removed": true }))?;
            } else {
                println!("Removed work item '{code}'");
            }
            Ok(())
        }
    }
}

fn add_work_item(
    root: &Path,
    code: String,
    name: String,
    unit: String,
    components: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let components = components
        .iter()
        .map(|c| parse_component(c))
        .collect::<Result<Vec<_>, _>>()?;
    let mut tracked = Tracked::open(root)?;
    tracked
        .store
        .add_work_item(WorkItem {
            code: code.clone(),
            name,
            unit,
            components,
        })
        .with_context(|| format!("failed to add work item '{code}'"))?;
    tracked.commit(root)?;

    if json {
        print_json(&serde_json::json!({ "code": code, "added": true }))?;
    } else {
        println!("Added work item '{code}'");
    }
    Ok(())
}

fn list_work_items(root: &Path, json: bool) -> anyhow::Result<()> {
    let store = Store::load(root).context("failed to load store")?;
    let mut entries = Vec::new();
    for item in store.work_items() {
        let unit_cost = work_item_unit_cost(item, store.price_items())?;
        entries.push((item, unit_cost));
    }

    if json {
        let value: Vec<_> = entries
            .iter()
            .map(|(item, unit_cost)| serde_json::json!({ "work_item": item, "unit_cost": unit_cost }))
            .collect();
        print_json(&value)?;
        return Ok(());
    }
    if entries.is_empty() {
        println!("No work items.");
        return Ok(());
    }
    let rows = entries
        .iter()
        .map(|(item, unit_cost)| {
            vec![
                item.code.clone(),
                item.name.clone(),
                item.unit.clone(),
                item.components.len().to_string(),
                format_amount(*unit_cost),
            ]
        })
        .collect();
    print_table(&["CODE", "NAME", "UNIT", "COMPONENTS", "UNIT COST"], rows);
    Ok(())
}

fn cost(root: &Path, code: &str, volume: f64, json: bool) -> anyhow::Result<()> {
    if !volume.is_finite() || volume < 0.0 {
        anyhow::bail!("volume must be a non-negative number, got {volume}");
    }
    let store = Store::load(root).context("failed to load store")?;
    let item = store.work_item(code)?;
    let unit_cost = work_item_unit_cost(item, store.price_items())?;
    let breakdown = cost_breakdown(item, store.price_items())?;
    let total = unit_cost * volume;

    if json {
        let by_category: serde_json::Map<String, serde_json::Value> = breakdown
            .iter()
            .map(|(cat, amount)| (cat.to_string(), serde_json::json!(amount * volume)))
            .collect();
        print_json(&serde_json::json!({
            "code": code,
            "volume": volume,
            "unit_cost": unit_cost,
            "total": total,
            "by_category": by_category,
        }))?;
        return Ok(());
    }

    println!("{} ({}): {} {}", item.name, item.code, volume, item.unit);
    let rows = breakdown
        .iter()
        .filter(|(_, amount)| *amount > 0.0)
        .map(|(cat, amount)| vec![label(*cat).to_string(), format_amount(amount * volume)])
        .collect();
    print_table(&["CATEGORY", "AMOUNT"], rows);
    println!("Unit cost: {}", format_amount(unit_cost));
    println!("Total:     {}", format_amount(total));
    Ok(())
}

fn label(category: PriceCategory) -> &'static str {
    match category {
        PriceCategory::Material => "Material",
        PriceCategory::Labor => "Labor",
        PriceCategory::Equipment => "Equipment",
    }
}
