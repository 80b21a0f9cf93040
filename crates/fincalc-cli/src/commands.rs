//! Command handlers. Each reads a JSON input, runs one calculator and
//! returns the result as JSON.

use crate::config::Config;
use anyhow::{Context, Result};
use goal_planner::{goals_from_json, plan_goal};
use income_tax::{
    compare_tax_regimes, compute_tax, Deductions, FamilyDetails, IncomeDetails, Regime,
};
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tax_optimizer::{
    analyze_tax_implications_with_rules, export, generate_tax_optimization_summary_with_rules,
    optimize_redemption_sequence_with_rules, CapitalGainsRules, HarvestingEngine, Holding,
    RedemptionPlan,
};

/// Form state for the income-tax commands
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxInput {
    #[serde(default)]
    pub income: IncomeDetails,
    #[serde(default)]
    pub deductions: Deductions,
    #[serde(default)]
    pub family: FamilyDetails,
    #[serde(default)]
    pub regime: Regime,
}

/// Portfolio state for the capital-gains commands
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioInput {
    pub holdings: Vec<Holding>,
    #[serde(default, alias = "redemptionPlans")]
    pub plans: Vec<RedemptionPlan>,
}

pub fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn parse<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let raw = read_input(path)?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn load_tax_input(path: &Path, strict: bool) -> Result<TaxInput> {
    let input: TaxInput = parse(path)?;
    if strict {
        input.income.validate()?;
        input.deductions.validate()?;
        input.family.validate()?;
    }
    Ok(input)
}

pub fn tax(path: &Path, strict: bool) -> Result<Value> {
    let input = load_tax_input(path, strict)?;
    let breakdown = compute_tax(&input.income, &input.deductions, &input.family, input.regime);
    tracing::info!(regime = %input.regime, total_tax = breakdown.total_tax, "income tax computed");
    Ok(serde_json::to_value(breakdown)?)
}

pub fn compare(path: &Path, strict: bool) -> Result<Value> {
    let input = load_tax_input(path, strict)?;
    let comparison = compare_tax_regimes(&input.income, &input.deductions, &input.family);
    tracing::info!(
        savings = comparison.savings,
        recommended = %comparison.recommended,
        "regimes compared"
    );
    Ok(serde_json::to_value(comparison)?)
}

/// Debt STCG follows the investor's marginal slab rate when a tax input is given
fn rules_for(config: &Config, tax_input: Option<&Path>) -> Result<CapitalGainsRules> {
    let slab_rate = match tax_input {
        Some(path) => {
            let input = load_tax_input(path, false)?;
            let breakdown =
                compute_tax(&input.income, &input.deductions, &input.family, input.regime);
            Some(breakdown.marginal_rate())
        }
        None => None,
    };
    Ok(config.capital_gains_rules(slab_rate))
}

pub fn capital_gains(path: &Path, config: &Config, tax_input: Option<&Path>) -> Result<Value> {
    let input: PortfolioInput = parse(path)?;
    let rules = rules_for(config, tax_input)?;
    let implications = analyze_tax_implications_with_rules(&input.holdings, &input.plans, &rules);
    Ok(serde_json::to_value(implications)?)
}

fn create_csv(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

pub fn harvest(
    path: &Path,
    config: &Config,
    tax_input: Option<&Path>,
    csv_out: Option<&Path>,
) -> Result<Value> {
    let input: PortfolioInput = parse(path)?;
    let engine = HarvestingEngine::new(rules_for(config, tax_input)?);
    let opportunities = engine.find_opportunities(&input.holdings, config.as_of);
    let summary = engine.get_summary(&opportunities);

    if let Some(csv_path) = csv_out {
        export::write_harvest_csv(create_csv(csv_path)?, &opportunities)?;
        tracing::info!(path = %csv_path.display(), "harvest opportunities exported");
    }
    Ok(serde_json::json!({
        "opportunities": opportunities,
        "summary": summary,
    }))
}

pub fn redeem(
    path: &Path,
    target: f64,
    config: &Config,
    tax_input: Option<&Path>,
) -> Result<Value> {
    let input: PortfolioInput = parse(path)?;
    let rules = rules_for(config, tax_input)?;
    let strategy =
        optimize_redemption_sequence_with_rules(&input.holdings, target, config.as_of, &rules);
    tracing::info!(
        plans = strategy.plans.len(),
        shortfall = strategy.shortfall,
        "redemption sequence planned"
    );
    Ok(serde_json::to_value(strategy)?)
}

pub fn summary(
    path: &Path,
    config: &Config,
    tax_input: Option<&Path>,
    csv_out: Option<&Path>,
) -> Result<Value> {
    let input: PortfolioInput = parse(path)?;
    let rules = rules_for(config, tax_input)?;
    let summary = generate_tax_optimization_summary_with_rules(
        &input.holdings,
        &input.plans,
        config.as_of,
        &rules,
    );

    if let Some(csv_path) = csv_out {
        export::write_summary_csv(create_csv(csv_path)?, &summary)?;
        tracing::info!(path = %csv_path.display(), "summary exported");
    }

    Ok(serde_json::to_value(summary)?)
}

pub fn goals(path: &Path) -> Result<Value> {
    let goals = goals_from_json(&read_input(path)?)?;
    let plans: Vec<_> = goals.iter().map(plan_goal).collect();
    Ok(serde_json::to_value(plans)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use tax_optimizer::{FundCategory, HoldingPeriod};

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("fincalc-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn config() -> Config {
        Config {
            as_of: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            debt_slab_rate: Some(0.2),
            json_logging: false,
        }
    }

    #[test]
    fn test_tax_input_defaults() {
        let input: TaxInput =
            serde_json::from_str(r#"{"income": {"basicSalary": 500000}}"#).unwrap();
        assert_eq!(input.regime, Regime::New);
        assert_eq!(input.income.basic_salary, 500_000.0);
    }

    #[test]
    fn test_portfolio_input_accepts_redemption_plans_alias() {
        let json = r#"{
            "holdings": [{
                "id": "h1", "fundName": "Index", "category": "Equity",
                "purchaseDate": "2023-01-01", "units": 10, "purchaseNav": 10,
                "currentNav": 12, "investedAmount": 100, "currentValue": 120
            }],
            "redemptionPlans": [{"holdingId": "h1", "unitsToRedeem": 5, "redemptionDate": "2025-01-01"}]
        }"#;
        let input: PortfolioInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.holdings.len(), 1);
        assert_eq!(input.plans[0].holding_id, "h1");
    }

    #[test]
    fn test_debt_stcg_follows_marginal_slab_rate() {
        // old regime, 1.05M salary: 1M taxable sits in the 20% band
        let tax_input = write_temp(
            "marginal.json",
            r#"{"regime": "old", "income": {"basicSalary": 1050000}}"#,
        );
        let rules = rules_for(&config(), Some(&tax_input)).unwrap();
        std::fs::remove_file(&tax_input).ok();
        assert_eq!(rules.rate_for(FundCategory::Debt, HoldingPeriod::ShortTerm), 0.20);

        let input = write_temp(
            "top.json",
            r#"{"regime": "new", "income": {"basicSalary": 2000000}}"#,
        );
        let rules = rules_for(&config(), Some(&input)).unwrap();
        std::fs::remove_file(&input).ok();
        assert_eq!(rules.rate_for(FundCategory::Debt, HoldingPeriod::ShortTerm), 0.30);
    }

    #[test]
    fn test_rules_without_tax_input_use_config() {
        let rules = rules_for(&config(), None).unwrap();
        assert_eq!(rules.rate_for(FundCategory::Debt, HoldingPeriod::ShortTerm), 0.2);
    }
}
