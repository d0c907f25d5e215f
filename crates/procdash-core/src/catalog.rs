//! Price and work-item databases backing the budget plans.

use crate::error::{ProcError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceCategory {
    Material,
    Labor,
    Equipment,
}

impl PriceCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PriceCategory::Material => "material",
            PriceCategory::Labor => "labor",
            PriceCategory::Equipment => "equipment",
        }
    }
}

impl fmt::Display for PriceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PriceCategory {
    type Err = ProcError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "material" => Ok(PriceCategory::Material),
            "labor" | "labour" => Ok(PriceCategory::Labor),
            "equipment" => Ok(PriceCategory::Equipment),
            _ => Err(ProcError::InvalidValue(format!("unknown price category '{s}'"))),
        }
    }
}

/// A unit price for a material, labour grade or piece of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceItem {
    pub code: String,
    pub name: String,
    pub category: PriceCategory,
    pub unit: String,
    pub unit_price: f64,
}

/// One line of a work-item analysis: `coefficient` units of a priced item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub price_code: String,
    pub coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub code: String,
    pub name: String,
    pub unit: String,
    #[serde(default)]
    pub components: Vec<Component>,
}

impl WorkItem {
    pub fn uses_price(&self, code: &str) -> bool {
        self.components.iter().any(|c| c.price_code == code)
    }
}

/// Parse `CODE=COEFF` pairs, e.g. `semen=9.68`.
pub fn parse_component(s: &str) -> Result<Component> {
    let (code, coeff) = s
        .split_once('=')
        .ok_or_else(|| ProcError::InvalidValue(format!("expected CODE=COEFFICIENT, got '{s}'")))?;
    let coefficient: f64 = coeff
        .trim()
        .parse()
        .map_err(|_| ProcError::InvalidValue(format!("bad coefficient in '{s}'")))?;
    if !coefficient.is_finite() || coefficient < 0.0 {
        return Err(ProcError::InvalidValue(format!("bad coefficient in '{s}'")));
    }
    Ok(Component {
        price_code: code.trim().to_string(),
        coefficient,
    })
}

/// Unit cost of a work item: sum of coefficient × unit price.
pub fn work_item_unit_cost(item: &WorkItem, prices: &[PriceItem]) -> Result<f64> {
    let by_code: HashMap<&str, &PriceItem> = prices.iter().map(|p| (p.code.as_str(), p)).collect();
    item.components.iter().try_fold(0.0, |acc, c| {
        let price = by_code
            .get(c.price_code.as_str())
            .ok_or_else(|| ProcError::PriceItemNotFound(c.price_code.clone()))?;
        Ok(acc + c.coefficient * price.unit_price)
    })
}

/// Cost split per category for a work item.
pub fn cost_breakdown(item: &WorkItem, prices: &[PriceItem]) -> Result<Vec<(PriceCategory, f64)>> {
    let mut totals = [
        (PriceCategory::Material, 0.0),
        (PriceCategory::Labor, 0.0),
        (PriceCategory::Equipment, 0.0),
    ];
    for c in &item.components {
        let price = prices
            .iter()
            .find(|p| p.code == c.price_code)
            .ok_or_else(|| ProcError::PriceItemNotFound(c.price_code.clone()))?;
        if let Some(slot) = totals.iter_mut().find(|(cat, _)| *cat == price.category) {
            slot.1 += c.coefficient * price.unit_price;
        }
    }
    Ok(totals.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices() -> Vec<PriceItem> {
        vec![
            PriceItem {
                code: "semen".into(),
                name: "Semen PC 50kg".into(),
                category: PriceCategory::Material,
                unit: "zak".into(),
                unit_price: 70_000.0,
            },
            PriceItem {
                code: "pekerja".into(),
                name: "Pekerja".into(),
                category: PriceCategory::Labor,
                unit: "OH".into(),
                unit_price: 120_000.0,
            },
        ]
    }

    fn item() -> WorkItem {
        WorkItem {
            code: "beton-k225".into(),
            name: "Beton K-225".into(),
            unit: "m3".into(),
            components: vec![
                parse_component("semen=7").unwrap(),
                parse_component("pekerja=1.5").unwrap(),
            ],
        }
    }

    #[test]
    fn unit_cost_sums_components() {
        let cost = work_item_unit_cost(&item(), &prices()).unwrap();
        assert!((cost - 670_000.0).abs() < 1e-6);
    }

    #[test]
    fn unknown_price_code_is_error() {
        let mut wi = item();
        wi.components.push(parse_component("pasir=0.5").unwrap());
        assert!(matches!(
            work_item_unit_cost(&wi, &prices()),
            Err(ProcError::PriceItemNotFound(code)) if code == "pasir"
        ));
    }

    #[test]
    fn breakdown_by_category() {
        let split = cost_breakdown(&item(), &prices()).unwrap();
        assert_eq!(split[0], (PriceCategory::Material, 490_000.0));
        assert_eq!(split[1], (PriceCategory::Labor, 180_000.0));
        assert_eq!(split[2], (PriceCategory::Equipment, 0.0));
    }

    #[test]
    fn component_parse_errors() {
        assert!(parse_component("semen").is_err());
        assert!(parse_component("semen=abc").is_err());
        assert!(parse_component("semen=-1").is_err());
    }
}
