//! Portfolio-level tax summary combining redemption analysis and harvesting.

use crate::harvester::{HarvestOpportunity, HarvestSummary, HarvestingEngine};
use crate::redemption::{analyze_tax_implications_with_rules, RedemptionPlan, TaxImplication};
use crate::tax_calculator::{CapitalGainsRules, Holding, HoldingPeriod};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxOptimizationSummary {
    pub as_of: NaiveDate,
    pub total_invested: f64,
    pub total_current_value: f64,
    pub total_unrealized_gain: f64,
    pub implications: Vec<TaxImplication>,
    pub total_ltcg: f64,
    pub total_stcg: f64,
    /// Net of losses, across all planned redemptions
    pub total_capital_gain: f64,
    pub total_taxable_gain: f64,
    pub total_tax: f64,
    pub exemption_used: f64,
    pub exemption_remaining: f64,
    /// Plans whose holding id matched nothing
    pub unmatched_plans: Vec<String>,
    pub harvest_opportunities: Vec<HarvestOpportunity>,
    pub harvest_summary: HarvestSummary,
    pub recommendations: Vec<String>,
}

pub fn generate_tax_optimization_summary(
    holdings: &[Holding],
    plans: &[RedemptionPlan],
    as_of: NaiveDate,
) -> TaxOptimizationSummary {
    generate_tax_optimization_summary_with_rules(
        holdings,
        plans,
        as_of,
        &CapitalGainsRules::default(),
    )
}

pub fn generate_tax_optimization_summary_with_rules(
    holdings: &[Holding],
    plans: &[RedemptionPlan],
    as_of: NaiveDate,
    rules: &CapitalGainsRules,
) -> TaxOptimizationSummary {
    let implications = analyze_tax_implications_with_rules(holdings, plans, rules);

    let known: HashSet<&str> = holdings.iter().map(|h| h.id.as_str()).collect();
    let unmatched_plans: Vec<String> = plans
        .iter()
        .filter(|p| !known.contains(p.holding_id.as_str()))
        .map(|p| p.holding_id.clone())
        .collect();

    let total_invested: f64 = holdings.iter().map(|h| h.invested_amount).sum();
    let total_current_value: f64 = holdings.iter().map(|h| h.current_value).sum();

    let total_ltcg: f64 = implications
        .iter()
        .filter(|i| i.is_long_term && i.capital_gain > 0.0)
        .map(|i| i.capital_gain)
        .sum();
    let total_stcg: f64 = implications
        .iter()
        .filter(|i| !i.is_long_term && i.capital_gain > 0.0)
        .map(|i| i.capital_gain)
        .sum();
    let exemption_used: f64 = implications.iter().map(|i| i.exemption_used).sum();
    let exemption_remaining = (rules.annual_ltcg_exemption - exemption_used).max(0.0);

    let engine = HarvestingEngine::new(rules.clone());
    let harvest_opportunities = engine.find_opportunities(holdings, as_of);
    let harvest_summary = engine.get_summary(&harvest_opportunities);

    let mut summary = TaxOptimizationSummary {
        as_of,
        total_invested,
        total_current_value,
        total_unrealized_gain: total_current_value - total_invested,
        total_capital_gain: implications.iter().map(|i| i.capital_gain).sum(),
        total_taxable_gain: implications.iter().map(|i| i.taxable_gain).sum(),
        total_tax: implications.iter().map(|i| i.tax_amount).sum(),
        implications,
        total_ltcg,
        total_stcg,
        exemption_used,
        exemption_remaining,
        unmatched_plans,
        harvest_opportunities,
        harvest_summary,
        recommendations: Vec::new(),
    };
    summary.recommendations = build_recommendations(&summary, holdings, as_of, rules);
    summary
}

fn build_recommendations(
    summary: &TaxOptimizationSummary,
    holdings: &[Holding],
    as_of: NaiveDate,
    rules: &CapitalGainsRules,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    let bookable_ltcg: f64 = holdings
        .iter()
        .filter(|h| h.category.is_equity_class())
        .filter(|h| h.holding_period(as_of, rules) == HoldingPeriod::LongTerm)
        .map(|h| h.unrealized_gain_loss())
        .filter(|g| *g > 0.0)
        .sum();
    if summary.exemption_remaining > 0.0 && bookable_ltcg > 0.0 {
        recommendations.push(format!(
            "Book up to ₹{:.0} of long-term equity gains tax-free using the remaining exemption",
            bookable_ltcg.min(summary.exemption_remaining)
        ));
    }

    if summary.harvest_summary.total_opportunities > 0 {
        recommendations.push(format!(
            "Harvest ₹{:.0} of losses across {} holding(s) to save up to ₹{:.0}",
            summary.harvest_summary.total_harvestable_losses,
            summary.harvest_summary.total_opportunities,
            summary.harvest_summary.total_potential_savings
        ));
    }

    let short_term_equity = summary
        .implications
        .iter()
        .filter(|i| !i.is_long_term && i.capital_gain > 0.0 && i.category.is_equity_class())
        .count();
    if short_term_equity > 0 {
        recommendations.push(format!(
            "{} planned equity redemption(s) are short-term; \
             holding past {} days lowers the rate from {:.1}% to {:.1}%",
            short_term_equity,
            rules.equity_long_term_days,
            rules.equity_stcg_rate * 100.0,
            rules.equity_ltcg_rate * 100.0
        ));
    }

    let locked = summary.implications.iter().filter(|i| i.lock_in_violation).count();
    if locked > 0 {
        recommendations.push(format!(
            "{} ELSS redemption(s) fall inside the {}-day lock-in and cannot be executed yet",
            locked, rules.elss_lock_in_days
        ));
    }

    if !summary.unmatched_plans.is_empty() {
        recommendations.push(format!(
            "Ignored {} redemption plan(s) for unknown holdings: {}",
            summary.unmatched_plans.len(),
            summary.unmatched_plans.join(", ")
        ));
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax_calculator::FundCategory;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn fund(
        id: &str,
        name: &str,
        category: FundCategory,
        days_held: i64,
        units: f64,
        buy: f64,
        now: f64,
    ) -> Holding {
        Holding::new(
            id,
            name,
            category,
            as_of() - Duration::days(days_held),
            units,
            buy,
            now,
        )
    }

    fn portfolio() -> Vec<Holding> {
        vec![
            fund("eq", "Flexicap", FundCategory::Equity, 400, 1000.0, 50.0, 80.0),
            fund("st", "Midcap", FundCategory::Equity, 90, 100.0, 100.0, 150.0),
            fund("loss", "Gilt", FundCategory::Debt, 200, 1000.0, 100.0, 70.0),
        ]
    }

    fn plan(id: &str, units: f64) -> RedemptionPlan {
        RedemptionPlan {
            holding_id: id.to_string(),
            units_to_redeem: units,
            redemption_date: as_of(),
        }
    }

    #[test]
    fn test_summary_totals() {
        let summary = generate_tax_optimization_summary(
            &portfolio(),
            &[plan("eq", 1000.0), plan("st", 100.0), plan("ghost", 1.0)],
            as_of(),
        );

        assert_relative_eq!(summary.total_invested, 50_000.0 + 10_000.0 + 100_000.0);
        assert_relative_eq!(summary.total_current_value, 80_000.0 + 15_000.0 + 70_000.0);
        assert_eq!(summary.implications.len(), 2);
        assert_relative_eq!(summary.total_ltcg, 30_000.0);
        assert_relative_eq!(summary.total_stcg, 5_000.0);
        assert_relative_eq!(summary.exemption_used, 30_000.0);
        assert_relative_eq!(summary.exemption_remaining, 95_000.0);
        assert_relative_eq!(summary.total_tax, 1_000.0);
        assert_eq!(summary.unmatched_plans, vec!["ghost".to_string()]);
        assert_eq!(summary.harvest_summary.total_opportunities, 1);
    }

    #[test]
    fn test_recommendations() {
        let summary = generate_tax_optimization_summary(
            &portfolio(),
            &[plan("st", 100.0), plan("ghost", 1.0)],
            as_of(),
        );
        let text = summary.recommendations.join("\n");
        assert!(text.contains("Book up to ₹30000"));
        assert!(text.contains("Harvest ₹30000"));
        assert!(text.contains("short-term"));
        assert!(text.contains("ghost"));
    }

    #[test]
    fn test_empty_portfolio() {
        let summary = generate_tax_optimization_summary(&[], &[], as_of());
        assert_eq!(summary.total_tax, 0.0);
        assert_relative_eq!(summary.exemption_remaining, 125_000.0);
        assert!(summary.recommendations.is_empty());
    }
}
