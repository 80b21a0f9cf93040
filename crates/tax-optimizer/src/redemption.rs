//! Redemption Analysis
//!
//! Tax implications of a batch of proposed redemptions, and a greedy
//! planner that raises a target amount at the lowest tax cost.

use crate::lock_in::lock_in_status;
use crate::tax_calculator::{
    holding_period_days, CapitalGainsRules, FundCategory, GainTax, Holding, HoldingPeriod,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Proposed redemption; nothing is executed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionPlan {
    pub holding_id: String,
    pub units_to_redeem: f64,
    pub redemption_date: NaiveDate,
}

/// Tax consequence of one redemption plan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxImplication {
    /// Holding the plan redeems from
    pub holding_id: String,
    /// Fund display name
    pub fund_name: String,
    /// Fund category, drives the rate applied
    pub category: FundCategory,
    /// Units actually redeemed, clamped to the units held
    pub units_redeemed: f64,
    /// Units times current NAV
    pub redemption_value: f64,
    /// Days from purchase to the redemption date
    pub holding_period_days: i64,
    /// Held past the category's long-term threshold
    pub is_long_term: bool,
    /// Negative for a loss
    pub capital_gain: f64,
    /// Gain left after the exemption draw
    pub taxable_gain: f64,
    /// Rate applied, as a fraction
    pub tax_rate: f64,
    /// Taxable gain times rate
    pub tax_amount: f64,
    /// Share of the annual LTCG exemption this lot consumed
    pub exemption_used: f64,
    /// ELSS redeemed inside its lock-in period; advisory only
    pub lock_in_violation: bool,
}

/// Running balance of the annual LTCG exemption within one batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExemptionLedger {
    ceiling: f64,
    used: f64,
}

impl ExemptionLedger {
    pub fn new(ceiling: f64) -> Self {
        Self {
            ceiling: ceiling.max(0.0),
            used: 0.0,
        }
    }

    pub fn used(&self) -> f64 {
        self.used
    }

    pub fn remaining(&self) -> f64 {
        (self.ceiling - self.used).max(0.0)
    }

    /// Record an exemption draw, never past the ceiling
    pub fn draw(self, amount: f64) -> Self {
        Self {
            ceiling: self.ceiling,
            used: (self.used + amount.max(0.0)).min(self.ceiling),
        }
    }
}

struct ResolvedPlan<'a> {
    plan: &'a RedemptionPlan,
    holding: &'a Holding,
    days: i64,
    period: HoldingPeriod,
}

/// Analyze with the default tax-year rules
pub fn analyze_tax_implications(
    holdings: &[Holding],
    plans: &[RedemptionPlan],
) -> Vec<TaxImplication> {
    analyze_tax_implications_with_rules(holdings, plans, &CapitalGainsRules::default())
}

/// Long-term lots are processed first so they claim the exemption before
/// anything else. Each call starts from an unused exemption. Plans whose
/// holding is unknown are skipped.
pub fn analyze_tax_implications_with_rules(
    holdings: &[Holding],
    plans: &[RedemptionPlan],
    rules: &CapitalGainsRules,
) -> Vec<TaxImplication> {
    let by_id: HashMap<&str, &Holding> = holdings.iter().map(|h| (h.id.as_str(), h)).collect();

    let mut resolved: Vec<ResolvedPlan> = plans
        .iter()
        .filter_map(|plan| {
            let Some(holding) = by_id.get(plan.holding_id.as_str()).copied() else {
                tracing::warn!(
                    holding_id = %plan.holding_id,
                    "redemption plan references unknown holding, skipping"
                );
                return None;
            };
            let days = holding_period_days(holding.purchase_date, plan.redemption_date);
            Some(ResolvedPlan {
                plan,
                holding,
                days,
                period: rules.holding_period(holding.category, days),
            })
        })
        .collect();

    // Stable: input order is kept within each group
    resolved.sort_by_key(|r| r.period != HoldingPeriod::LongTerm);

    let (implications, ledger) = resolved.into_iter().fold(
        (Vec::with_capacity(plans.len()), ExemptionLedger::new(rules.annual_ltcg_exemption)),
        |(mut out, ledger), lot| {
            let (implication, ledger) = implication_for(lot, ledger, rules);
            out.push(implication);
            (out, ledger)
        },
    );

    tracing::debug!(
        lots = implications.len(),
        exemption_used = ledger.used(),
        "analyzed redemption batch"
    );

    implications
}

fn implication_for(
    lot: ResolvedPlan<'_>,
    ledger: ExemptionLedger,
    rules: &CapitalGainsRules,
) -> (TaxImplication, ExemptionLedger) {
    let holding = lot.holding;
    let units = lot.plan.units_to_redeem.clamp(0.0, holding.units.max(0.0));
    let capital_gain = holding.gain_on_units(units);

    let GainTax {
        taxable_gain,
        tax_amount,
        tax_rate,
        exemption_used,
    } = rules.tax_for_gain(holding.category, lot.period, capital_gain, ledger.remaining());

    let lock_in_violation = lock_in_status(holding, lot.plan.redemption_date, rules).is_locked();
    if lock_in_violation {
        tracing::warn!(holding_id = %holding.id, "ELSS redemption planned inside lock-in period");
    }

    let implication = TaxImplication {
        holding_id: holding.id.clone(),
        fund_name: holding.fund_name.clone(),
        category: holding.category,
        units_redeemed: units,
        redemption_value: units * holding.current_nav,
        holding_period_days: lot.days,
        is_long_term: lot.period == HoldingPeriod::LongTerm,
        capital_gain,
        taxable_gain,
        tax_rate,
        tax_amount,
        exemption_used,
        lock_in_violation,
    };

    (implication, ledger.draw(exemption_used))
}

/// Planner output for a target withdrawal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionStrategy {
    pub plans: Vec<RedemptionPlan>,
    pub target_amount: f64,
    pub total_amount: f64,
    /// Part of the target the portfolio could not cover
    pub shortfall: f64,
    pub estimated_tax: f64,
    /// ELSS holdings left out because they are still inside the lock-in
    pub locked_holdings: Vec<String>,
    pub explanation: String,
}

/// Lower is redeemed later
fn redemption_score(holding: &Holding, period: HoldingPeriod) -> u8 {
    if holding.unrealized_gain_loss() < 0.0 {
        100
    } else if period == HoldingPeriod::LongTerm && holding.category.is_equity_class() {
        80
    } else if period == HoldingPeriod::LongTerm {
        60
    } else {
        40
    }
}

fn gain_ratio(holding: &Holding) -> f64 {
    if holding.current_value > 0.0 {
        holding.unrealized_gain_loss() / holding.current_value
    } else {
        0.0
    }
}

pub fn optimize_redemption_sequence(
    holdings: &[Holding],
    target_amount: f64,
    as_of: NaiveDate,
) -> RedemptionStrategy {
    optimize_redemption_sequence_with_rules(
        holdings,
        target_amount,
        as_of,
        &CapitalGainsRules::default(),
    )
}

/// Greedy by score: losses, then equity LTCG, then other LTCG, then STCG.
/// Within a score group the lot with the smallest gain per rupee goes first.
/// Holdings still inside an ELSS lock-in are never proposed.
pub fn optimize_redemption_sequence_with_rules(
    holdings: &[Holding],
    target_amount: f64,
    as_of: NaiveDate,
    rules: &CapitalGainsRules,
) -> RedemptionStrategy {
    let target_amount = target_amount.max(0.0);

    let (locked, redeemable): (Vec<&Holding>, Vec<&Holding>) = holdings
        .iter()
        .filter(|h| h.current_value > 0.0 && h.current_nav > 0.0 && h.units > 0.0)
        .partition(|h| lock_in_status(h, as_of, rules).is_locked());

    let mut candidates: Vec<(&Holding, HoldingPeriod, u8)> = redeemable
        .into_iter()
        .map(|h| {
            let period = h.holding_period(as_of, rules);
            (h, period, redemption_score(h, period))
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.2.cmp(&a.2)
            .then(gain_ratio(a.0).partial_cmp(&gain_ratio(b.0)).unwrap_or(Ordering::Equal))
            .then_with(|| a.0.id.cmp(&b.0.id))
    });

    let mut remaining = target_amount;
    let mut plans = Vec::new();
    let mut steps = Vec::new();

    for (holding, period, _) in candidates {
        if remaining <= 0.01 {
            break;
        }
        let take = remaining.min(holding.current_value);
        let units = if take >= holding.current_value {
            holding.units
        } else {
            take / holding.current_nav
        };
        remaining -= take;

        steps.push(describe_step(holding, period, take));
        plans.push(RedemptionPlan {
            holding_id: holding.id.clone(),
            units_to_redeem: units,
            redemption_date: as_of,
        });
    }

    let total_amount = target_amount - remaining.max(0.0);
    let shortfall = remaining.max(0.0);
    let estimated_tax = analyze_tax_implications_with_rules(holdings, &plans, rules)
        .iter()
        .map(|i| i.tax_amount)
        .sum();

    let mut explanation = if plans.is_empty() {
        "No redeemable holdings available for the requested amount.".to_string()
    } else {
        format!(
            "Redeem from {} holding(s) to raise ₹{:.0} with an estimated tax of ₹{:.0}: {}.",
            plans.len(),
            total_amount,
            estimated_tax,
            steps.join("; ")
        )
    };
    if shortfall > 0.01 {
        explanation.push_str(&format!(
            " Portfolio falls ₹{:.0} short of the target.",
            shortfall
        ));
    }
    if !locked.is_empty() {
        let names: Vec<&str> = locked.iter().map(|h| h.fund_name.as_str()).collect();
        let locked_value: f64 = locked.iter().map(|h| h.current_value).sum();
        explanation.push_str(&format!(
            " Skipped {} ELSS holding(s) still in lock-in worth ₹{:.0}: {}.",
            locked.len(),
            locked_value,
            names.join(", ")
        ));
    }

    RedemptionStrategy {
        plans,
        target_amount,
        total_amount,
        shortfall,
        estimated_tax,
        locked_holdings: locked.iter().map(|h| h.id.clone()).collect(),
        explanation,
    }
}

fn describe_step(holding: &Holding, period: HoldingPeriod, amount: f64) -> String {
    let reason = if holding.unrealized_gain_loss() < 0.0 {
        "books a loss"
    } else if period == HoldingPeriod::LongTerm && holding.category.is_equity_class() {
        "long-term equity gain, uses the exemption"
    } else if period == HoldingPeriod::LongTerm {
        "long-term gain"
    } else {
        "short-term gain"
    };
    format!("₹{:.0} from {} ({})", amount, holding.fund_name, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Duration;
    use proptest::prelude::*;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn holding(
        id: &str,
        category: FundCategory,
        days_held: i64,
        units: f64,
        buy: f64,
        now: f64,
    ) -> Holding {
        Holding::new(
            id,
            format!("Fund {}", id),
            category,
            as_of() - Duration::days(days_held),
            units,
            buy,
            now,
        )
    }

    fn plan(id: &str, units: f64) -> RedemptionPlan {
        RedemptionPlan {
            holding_id: id.to_string(),
            units_to_redeem: units,
            redemption_date: as_of(),
        }
    }

    #[test]
    fn test_equity_ltcg_within_exemption() {
        let holdings = vec![holding("eq", FundCategory::Equity, 400, 1000.0, 50.0, 80.0)];
        let implications = analyze_tax_implications(&holdings, &[plan("eq", 1000.0)]);

        assert_eq!(implications.len(), 1);
        let imp = &implications[0];
        assert_relative_eq!(imp.capital_gain, 30_000.0);
        assert!(imp.is_long_term);
        assert_eq!(imp.holding_period_days, 400);
        assert_relative_eq!(imp.exemption_used, 30_000.0);
        assert_eq!(imp.taxable_gain, 0.0);
        assert_eq!(imp.tax_amount, 0.0);
    }

    #[test]
    fn test_long_term_lots_claim_exemption_first() {
        let holdings = vec![
            holding("short", FundCategory::Equity, 100, 1000.0, 10.0, 60.0),
            holding("long-a", FundCategory::Equity, 500, 1000.0, 10.0, 110.0),
            holding("long-b", FundCategory::Hybrid, 700, 1000.0, 10.0, 60.0),
        ];
        let plans = vec![plan("short", 1000.0), plan("long-a", 1000.0), plan("long-b", 1000.0)];
        let implications = analyze_tax_implications(&holdings, &plans);

        let order: Vec<_> = implications.iter().map(|i| i.holding_id.as_str()).collect();
        assert_eq!(order, vec!["long-a", "long-b", "short"]);

        // long-a: 100k gain all exempt; long-b: 25k of 50k exempt
        assert_relative_eq!(implications[0].exemption_used, 100_000.0);
        assert_relative_eq!(implications[1].exemption_used, 25_000.0);
        assert_relative_eq!(implications[1].tax_amount, 25_000.0 * 0.125);
        assert_eq!(implications[2].exemption_used, 0.0);
        assert_relative_eq!(implications[2].tax_amount, 50_000.0 * 0.20);
    }

    #[test]
    fn test_debt_short_term_uses_stand_in_rate() {
        let holdings = vec![holding("debt", FundCategory::Debt, 800, 1000.0, 10.0, 12.0)];
        let implications = analyze_tax_implications(&holdings, &[plan("debt", 1000.0)]);
        assert!(!implications[0].is_long_term);
        assert_relative_eq!(implications[0].tax_amount, 600.0);

        let rules = CapitalGainsRules::default().with_debt_slab_rate(0.10);
        let implications =
            analyze_tax_implications_with_rules(&holdings, &[plan("debt", 1000.0)], &rules);
        assert_relative_eq!(implications[0].tax_amount, 200.0);
    }

    #[test]
    fn test_unknown_holding_is_skipped() {
        let holdings = vec![holding("eq", FundCategory::Equity, 400, 10.0, 50.0, 80.0)];
        let implications =
            analyze_tax_implications(&holdings, &[plan("missing", 5.0), plan("eq", 5.0)]);
        assert_eq!(implications.len(), 1);
        assert_eq!(implications[0].holding_id, "eq");
    }

    #[test]
    fn test_units_clamped_to_holding() {
        let holdings = vec![holding("eq", FundCategory::Equity, 10, 10.0, 50.0, 60.0)];
        let implications = analyze_tax_implications(&holdings, &[plan("eq", 25.0)]);
        assert_relative_eq!(implications[0].units_redeemed, 10.0);
        assert_relative_eq!(implications[0].capital_gain, 100.0);
    }

    #[test]
    fn test_elss_lock_in_is_flagged_not_blocked() {
        let holdings = vec![holding("elss", FundCategory::Elss, 500, 100.0, 10.0, 15.0)];
        let implications = analyze_tax_implications(&holdings, &[plan("elss", 100.0)]);
        assert_eq!(implications.len(), 1);
        assert!(implications[0].lock_in_violation);
        assert!(!implications[0].is_long_term);
    }

    #[test]
    fn test_ledger_never_passes_ceiling() {
        let ledger = ExemptionLedger::new(100.0).draw(60.0).draw(60.0);
        assert_eq!(ledger.used(), 100.0);
        assert_eq!(ledger.remaining(), 0.0);
    }

    #[test]
    fn test_optimizer_prefers_losses_then_equity_ltcg() {
        let holdings = vec![
            holding("stcg", FundCategory::Equity, 30, 100.0, 100.0, 150.0),
            holding("ltcg", FundCategory::Equity, 500, 100.0, 100.0, 150.0),
            holding("loss", FundCategory::Debt, 30, 100.0, 100.0, 80.0),
        ];
        let strategy = optimize_redemption_sequence(&holdings, 20_000.0, as_of());

        let ids: Vec<_> = strategy.plans.iter().map(|p| p.holding_id.as_str()).collect();
        assert_eq!(ids, vec!["loss", "ltcg"]);
        assert_relative_eq!(strategy.plans[0].units_to_redeem, 100.0);
        // 12,000 left after the 8,000 loss lot: 80 units at 150
        assert_relative_eq!(strategy.plans[1].units_to_redeem, 80.0);
        assert_relative_eq!(strategy.total_amount, 20_000.0);
        assert_eq!(strategy.shortfall, 0.0);
        assert_eq!(strategy.estimated_tax, 0.0);
    }

    #[test]
    fn test_optimizer_reports_shortfall_and_skips_locked_elss() {
        let holdings = vec![
            holding("elss", FundCategory::Elss, 200, 100.0, 10.0, 20.0),
            holding("eq", FundCategory::Equity, 500, 100.0, 10.0, 20.0),
        ];
        let strategy = optimize_redemption_sequence(&holdings, 5_000.0, as_of());
        assert_eq!(strategy.plans.len(), 1);
        assert_eq!(strategy.plans[0].holding_id, "eq");
        assert_relative_eq!(strategy.shortfall, 3_000.0);
        assert!(strategy.explanation.contains("short of the target"));
        assert_eq!(strategy.locked_holdings, vec!["elss".to_string()]);
        assert!(strategy
            .explanation
            .contains("Skipped 1 ELSS holding(s) still in lock-in worth ₹2000: Fund elss."));
    }

    #[test]
    fn test_optimizer_explanation_silent_without_locked_holdings() {
        let holdings = vec![holding("eq", FundCategory::Equity, 500, 100.0, 10.0, 20.0)];
        let strategy = optimize_redemption_sequence(&holdings, 1_000.0, as_of());
        assert!(strategy.locked_holdings.is_empty());
        assert!(!strategy.explanation.contains("lock-in"));
    }

    proptest! {
        #[test]
        fn exemption_total_respects_ceiling_in_any_order(
            lots in prop::collection::vec(
                (1.0f64..500.0, 1.0f64..2000.0, 366i64..2000, any::<bool>()),
                1..12,
            ),
            seed in any::<u64>(),
        ) {
            let holdings: Vec<Holding> = lots
                .iter()
                .enumerate()
                .map(|(i, (gain_per_unit, units, days, long))| {
                    let days = if *long { *days } else { *days % 365 };
                    holding(
                        &format!("h{}", i),
                        FundCategory::Equity,
                        days,
                        *units,
                        100.0,
                        100.0 + gain_per_unit,
                    )
                })
                .collect();

            let mut plans: Vec<RedemptionPlan> =
                holdings.iter().map(|h| plan(&h.id, h.units)).collect();
            // Deterministic shuffle
            let len = plans.len();
            for i in 0..len {
                let j = ((seed >> (i % 64)) as usize + i * 7) % len;
                plans.swap(i, j);
            }

            let implications = analyze_tax_implications(&holdings, &plans);
            let used: f64 = implications.iter().map(|i| i.exemption_used).sum();
            let long_term_gains: f64 = implications
                .iter()
                .filter(|i| i.is_long_term)
                .map(|i| i.capital_gain)
                .sum();

            prop_assert!(used <= 125_000.0 + 1e-6);
            prop_assert!((used - long_term_gains.min(125_000.0)).abs() < 1e-6);

            let first_short = implications
                .iter()
                .position(|i| !i.is_long_term)
                .unwrap_or(implications.len());
            prop_assert!(implications[first_short..].iter().all(|i| !i.is_long_term));
        }
    }
}
