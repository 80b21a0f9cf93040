//! Income Tax Calculator
//!
//! Gross income -> deductions -> slab tax -> 87A rebate -> surcharge -> cess.

use crate::deductions::{compute_deductions, DeductionBreakdown};
use crate::slabs::{slab_tax, SlabTableKind, SlabTax};
use crate::types::{Deductions, FamilyDetails, IncomeDetails, Regime};
use serde::{Deserialize, Serialize};

pub const NEW_REGIME_REBATE_LIMIT: f64 = 700_000.0;
pub const NEW_REGIME_REBATE: f64 = 25_000.0;
pub const OLD_REGIME_REBATE_LIMIT: f64 = 500_000.0;
pub const OLD_REGIME_REBATE: f64 = 12_500.0;
pub const CESS_RATE: f64 = 0.04;

/// Surcharge tiers as (taxable income above, rate), highest first
const SURCHARGE_TIERS: &[(f64, f64)] = &[
    (5_000_000.0, 0.37),
    (2_000_000.0, 0.25),
    (1_000_000.0, 0.15),
    (500_000.0, 0.10),
];

/// Full derivation of one tax computation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    pub regime: Regime,
    pub slab_table: SlabTableKind,
    pub gross_income: f64,
    /// Exempt, reported for completeness
    pub agricultural_income: f64,
    pub deductions: DeductionBreakdown,
    pub taxable_income: f64,
    pub slabs: Vec<SlabTax>,
    pub tax_before_rebate: f64,
    pub rebate: f64,
    /// Slab tax after the 87A rebate
    pub income_tax: f64,
    pub surcharge: f64,
    pub cess: f64,
    pub total_tax: f64,
    /// Total tax as a percentage of gross income
    pub effective_rate: f64,
    /// Total tax as a percentage of taxable income
    pub average_rate: f64,
}

impl TaxBreakdown {
    /// Rate of the highest bracket the taxable income reaches, as a fraction
    pub fn marginal_rate(&self) -> f64 {
        self.slabs
            .iter()
            .rev()
            .find(|s| s.taxable_amount > 0.0)
            .map(|s| s.rate / 100.0)
            .unwrap_or(0.0)
    }
}

/// Old vs new regime on identical inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegimeComparison {
    pub old_regime: TaxBreakdown,
    pub new_regime: TaxBreakdown,
    /// old total − new total; positive means the new regime is cheaper
    pub savings: f64,
    pub recommended: Regime,
    pub recommendation: String,
}

pub fn gross_income(income: &IncomeDetails) -> f64 {
    income.gross_salary()
        + income.net_business_income()
        + income.capital_gains()
        + income.other_sources()
}

/// Section 87A rebate, never more than the tax itself
pub fn rebate_87a(regime: Regime, taxable_income: f64, tax: f64) -> f64 {
    let (limit, rebate) = match regime {
        Regime::New => (NEW_REGIME_REBATE_LIMIT, NEW_REGIME_REBATE),
        Regime::Old => (OLD_REGIME_REBATE_LIMIT, OLD_REGIME_REBATE),
    };
    if taxable_income <= limit {
        rebate.min(tax.max(0.0))
    } else {
        0.0
    }
}

pub fn surcharge_rate(taxable_income: f64) -> f64 {
    SURCHARGE_TIERS
        .iter()
        .find(|(threshold, _)| taxable_income > *threshold)
        .map(|(_, rate)| *rate)
        .unwrap_or(0.0)
}

fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

pub fn compute_tax(
    income: &IncomeDetails,
    deductions: &Deductions,
    family: &FamilyDetails,
    regime: Regime,
) -> TaxBreakdown {
    let gross_income = gross_income(income);
    let deduction_breakdown = compute_deductions(income, deductions, family, regime);
    let taxable_income = (gross_income - deduction_breakdown.total).max(0.0);

    let slab_table = SlabTableKind::for_key(regime, family.age_class());
    let (slabs, tax_before_rebate) = slab_tax(taxable_income, slab_table.slabs());

    let rebate = rebate_87a(regime, taxable_income, tax_before_rebate);
    let income_tax = (tax_before_rebate - rebate).max(0.0);
    let surcharge = income_tax * surcharge_rate(taxable_income);
    let cess = (income_tax + surcharge) * CESS_RATE;
    let total_tax = income_tax + surcharge + cess;

    tracing::debug!(
        %regime,
        gross_income,
        taxable_income,
        total_tax,
        "computed income tax"
    );

    TaxBreakdown {
        regime,
        slab_table,
        gross_income,
        agricultural_income: income.agricultural_income.max(0.0),
        deductions: deduction_breakdown,
        taxable_income,
        slabs,
        tax_before_rebate,
        rebate,
        income_tax,
        surcharge,
        cess,
        total_tax,
        effective_rate: percentage(total_tax, gross_income),
        average_rate: percentage(total_tax, taxable_income),
    }
}

pub fn compare_tax_regimes(
    income: &IncomeDetails,
    deductions: &Deductions,
    family: &FamilyDetails,
) -> RegimeComparison {
    let old_regime = compute_tax(income, deductions, family, Regime::Old);
    let new_regime = compute_tax(income, deductions, family, Regime::New);
    let savings = old_regime.total_tax - new_regime.total_tax;

    let (recommended, recommendation) = if savings > 0.0 {
        (
            Regime::New,
            format!("New Regime saves ₹{:.0} compared to the Old Regime", savings),
        )
    } else if savings < 0.0 {
        (
            Regime::Old,
            format!(
                "Old Regime saves ₹{:.0} thanks to your deductions",
                savings.abs()
            ),
        )
    } else {
        (
            Regime::New,
            "Both regimes result in the same tax; the New Regime needs no deduction proofs"
                .to_string(),
        )
    };

    RegimeComparison {
        old_regime,
        new_regime,
        savings,
        recommended,
        recommendation,
    }
}
