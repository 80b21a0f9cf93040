//! Slab tables
//!
//! Progressive bracket data keyed by regime and age class. Brackets are
//! half-open `[min, max)`; the last bracket has no upper bound.

use crate::types::{AgeClass, Regime};
use serde::{Deserialize, Serialize};

/// One progressive bracket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSlab {
    pub min: f64,
    /// None for the top bracket
    pub max: Option<f64>,
    /// Percentage, e.g. 5.0 for 5%
    pub rate: f64,
}

impl TaxSlab {
    const fn new(min: f64, max: Option<f64>, rate: f64) -> Self {
        Self { min, max, rate }
    }

    /// Portion of `income` falling inside this bracket
    pub fn amount_in(&self, income: f64) -> f64 {
        let upper = match self.max {
            Some(max) => income.min(max),
            None => income,
        };
        (upper - self.min).max(0.0)
    }
}

const OLD_REGIME_SLABS: &[TaxSlab] = &[
    TaxSlab::new(0.0, Some(250_000.0), 0.0),
    TaxSlab::new(250_000.0, Some(500_000.0), 5.0),
    TaxSlab::new(500_000.0, Some(1_000_000.0), 20.0),
    TaxSlab::new(1_000_000.0, None, 30.0),
];

const SENIOR_CITIZEN_SLABS: &[TaxSlab] = &[
    TaxSlab::new(0.0, Some(300_000.0), 0.0),
    TaxSlab::new(300_000.0, Some(500_000.0), 5.0),
    TaxSlab::new(500_000.0, Some(1_000_000.0), 20.0),
    TaxSlab::new(1_000_000.0, None, 30.0),
];

const SUPER_SENIOR_CITIZEN_SLABS: &[TaxSlab] = &[
    TaxSlab::new(0.0, Some(500_000.0), 0.0),
    TaxSlab::new(500_000.0, Some(1_000_000.0), 20.0),
    TaxSlab::new(1_000_000.0, None, 30.0),
];

const NEW_REGIME_SLABS: &[TaxSlab] = &[
    TaxSlab::new(0.0, Some(300_000.0), 0.0),
    TaxSlab::new(300_000.0, Some(700_000.0), 5.0),
    TaxSlab::new(700_000.0, Some(1_000_000.0), 10.0),
    TaxSlab::new(1_000_000.0, Some(1_200_000.0), 15.0),
    TaxSlab::new(1_200_000.0, Some(1_500_000.0), 20.0),
    TaxSlab::new(1_500_000.0, None, 30.0),
];

/// Which of the statutory tables applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlabTableKind {
    OldRegular,
    OldSenior,
    OldSuperSenior,
    New,
}

impl SlabTableKind {
    /// The new regime ignores age; the old regime has one table per age class
    pub fn for_key(regime: Regime, age_class: AgeClass) -> Self {
        match (regime, age_class) {
            (Regime::New, _) => SlabTableKind::New,
            (Regime::Old, AgeClass::Regular) => SlabTableKind::OldRegular,
            (Regime::Old, AgeClass::Senior) => SlabTableKind::OldSenior,
            (Regime::Old, AgeClass::SuperSenior) => SlabTableKind::OldSuperSenior,
        }
    }

    pub fn slabs(&self) -> &'static [TaxSlab] {
        match self {
            SlabTableKind::OldRegular => OLD_REGIME_SLABS,
            SlabTableKind::OldSenior => SENIOR_CITIZEN_SLABS,
            SlabTableKind::OldSuperSenior => SUPER_SENIOR_CITIZEN_SLABS,
            SlabTableKind::New => NEW_REGIME_SLABS,
        }
    }
}

/// Tax attributable to one bracket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlabTax {
    pub min: f64,
    pub max: Option<f64>,
    pub rate: f64,
    pub taxable_amount: f64,
    pub tax: f64,
}

/// Walk the brackets until `taxable_income` is exhausted.
///
/// Returns the per-bracket slices (only those the income reaches) and their sum.
pub fn slab_tax(taxable_income: f64, slabs: &[TaxSlab]) -> (Vec<SlabTax>, f64) {
    let income = taxable_income.max(0.0);
    let mut slices = Vec::new();
    let mut total = 0.0;

    for slab in slabs {
        if income <= slab.min {
            break;
        }
        let taxable_amount = slab.amount_in(income);
        let tax = taxable_amount * slab.rate / 100.0;
        total += tax;
        slices.push(SlabTax {
            min: slab.min,
            max: slab.max,
            rate: slab.rate,
            taxable_amount,
            tax,
        });
    }

    (slices, total)
}
