use crate::cmd::load_config_or_default;
use crate::output::{print_json, print_table};
use anyhow::Context;
use procdash_core::sla::{format_sla, parse_date, SlaBand};
use std::path::Path;

pub fn run(root: &Path, received: &str, finish: &str, json: bool) -> anyhow::Result<()> {
    let config = load_config_or_default(root)?;
    let calc = config.sla.calculator();
    let sla = calc.calculate(Some(received), Some(finish));
    let band = SlaBand::classify(sla, config.sla.target_days);

    if sla.is_none() {
        let unparsed = [received, finish]
            .into_iter()
            .filter(|s| parse_date(s).is_none())
            .collect::<Vec<_>>();
        if !unparsed.is_empty() {
            tracing::warn!(?unparsed, "unparseable date, SLA not applicable");
        }
    }

    if json {
        print_json(&serde_json::json!({
            "received": received,
            "finish": finish,
            "sla_days": sla,
            "band": band,
            "target_days": config.sla.target_days,
        }))?;
    } else {
        println!("{}", format_sla(sla));
    }
    Ok(())
}

pub fn holidays(root: &Path, year: Option<i32>, json: bool) -> anyhow::Result<()> {
    let config = load_config_or_default(root)?;
    let calendar = config.sla.calendar();

    let years = match year {
        Some(y) => vec![y],
        None => calendar.years(),
    };
    let holidays: Vec<_> = years
        .into_iter()
        .flat_map(|y| calendar.holidays_in(y))
        .collect();

    if json {
        print_json(&holidays).context("failed to render holidays")?;
        return Ok(());
    }

    if holidays.is_empty() {
        println!("No holidays in calendar '{}'.", calendar.name());
        return Ok(());
    }
    let rows = holidays
        .iter()
        .map(|h| {
            vec![
                h.date.to_string(),
                h.date.format("%a").to_string(),
                h.name.clone(),
            ]
        })
        .collect();
    print_table(&["DATE", "DAY", "NAME"], rows);
    Ok(())
}
