//! Tax-Loss Harvesting
//!
//! Finds holdings trading below cost whose loss could be booked to offset
//! gains elsewhere in the same year. Purely advisory.

use crate::lock_in::lock_in_status;
use crate::tax_calculator::{CapitalGainsRules, FundCategory, GainType, Holding, HoldingPeriod};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How comfortable booking the loss is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HarvestRisk {
    /// Large loss, clearly worth booking
    Low,
    Medium,
    /// Small loss, transaction costs may eat the benefit
    High,
}

impl HarvestRisk {
    pub fn from_loss(loss: f64) -> Self {
        if loss > 50_000.0 {
            Self::Low
        } else if loss > 20_000.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

/// A tax-loss harvesting opportunity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestOpportunity {
    /// Holding the loss sits in
    pub holding_id: String,
    /// Fund display name
    pub fund_name: String,
    /// Fund category, drives the rate applied
    pub category: FundCategory,
    /// Cost of the whole holding
    pub invested_amount: f64,
    /// Market value of the whole holding
    pub current_value: f64,
    /// Positive number
    pub unrealized_loss: f64,
    /// Loss as a percentage of the amount invested
    pub loss_percentage: f64,
    /// Short- or long-term loss at the as-of date
    pub loss_type: GainType,
    /// Days since purchase
    pub holding_period_days: i64,
    /// Rate the loss would offset, as a fraction
    pub tax_rate: f64,
    /// Loss times tax rate
    pub potential_tax_saving: f64,
    /// Loss size band
    pub risk: HarvestRisk,
    /// ELSS still inside its lock-in; cannot be redeemed yet
    pub locked_in: bool,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestingConfig {
    /// Losses at or below this are ignored
    pub min_loss_threshold: f64,
    pub max_opportunities: Option<usize>,
}

impl Default for HarvestingConfig {
    fn default() -> Self {
        Self {
            min_loss_threshold: 0.0,
            max_opportunities: None,
        }
    }
}

pub struct HarvestingEngine {
    rules: CapitalGainsRules,
    config: HarvestingConfig,
}

impl Default for HarvestingEngine {
    fn default() -> Self {
        Self::new(CapitalGainsRules::default())
    }
}

impl HarvestingEngine {
    pub fn new(rules: CapitalGainsRules) -> Self {
        Self {
            rules,
            config: HarvestingConfig::default(),
        }
    }

    pub fn with_config(rules: CapitalGainsRules, config: HarvestingConfig) -> Self {
        Self { rules, config }
    }

    /// Holdings with `current_value < invested_amount`, largest loss first
    pub fn find_opportunities(
        &self,
        holdings: &[Holding],
        as_of: NaiveDate,
    ) -> Vec<HarvestOpportunity> {
        let mut opportunities: Vec<HarvestOpportunity> = holdings
            .iter()
            .filter(|h| h.current_value < h.invested_amount)
            .filter(|h| h.invested_amount - h.current_value > self.config.min_loss_threshold)
            .map(|h| self.opportunity_for(h, as_of))
            .collect();

        opportunities.sort_by(|a, b| {
            b.unrealized_loss
                .partial_cmp(&a.unrealized_loss)
                .unwrap_or(Ordering::Equal)
        });

        if let Some(max) = self.config.max_opportunities {
            opportunities.truncate(max);
        }

        opportunities
    }

    fn opportunity_for(&self, holding: &Holding, as_of: NaiveDate) -> HarvestOpportunity {
        let unrealized_loss = holding.invested_amount - holding.current_value;
        let period = holding.holding_period(as_of, &self.rules);
        let tax_rate = self.rules.rate_for(holding.category, period);
        let potential_tax_saving = unrealized_loss * tax_rate;
        let risk = HarvestRisk::from_loss(unrealized_loss);
        let locked_in = lock_in_status(holding, as_of, &self.rules).is_locked();
        let loss_percentage = if holding.invested_amount > 0.0 {
            unrealized_loss / holding.invested_amount * 100.0
        } else {
            0.0
        };

        HarvestOpportunity {
            holding_id: holding.id.clone(),
            fund_name: holding.fund_name.clone(),
            category: holding.category,
            invested_amount: holding.invested_amount,
            current_value: holding.current_value,
            unrealized_loss,
            loss_percentage,
            loss_type: GainType::classify(-unrealized_loss, period),
            holding_period_days: holding.days_held(as_of),
            tax_rate,
            potential_tax_saving,
            risk,
            locked_in,
            recommendation: recommendation(
                holding,
                unrealized_loss,
                potential_tax_saving,
                risk,
                period,
                locked_in,
            ),
        }
    }

    pub fn get_summary(&self, opportunities: &[HarvestOpportunity]) -> HarvestSummary {
        let long_term_opportunities = opportunities
            .iter()
            .filter(|o| o.loss_type.is_long_term())
            .count();

        HarvestSummary {
            total_opportunities: opportunities.len(),
            total_harvestable_losses: opportunities.iter().map(|o| o.unrealized_loss).sum(),
            total_potential_savings: opportunities.iter().map(|o| o.potential_tax_saving).sum(),
            short_term_opportunities: opportunities.len() - long_term_opportunities,
            long_term_opportunities,
            low_risk_opportunities: opportunities
                .iter()
                .filter(|o| o.risk == HarvestRisk::Low)
                .count(),
        }
    }
}

fn recommendation(
    holding: &Holding,
    loss: f64,
    saving: f64,
    risk: HarvestRisk,
    period: HoldingPeriod,
    locked_in: bool,
) -> String {
    let term = match period {
        HoldingPeriod::LongTerm => "long-term",
        HoldingPeriod::ShortTerm => "short-term",
    };
    let mut text = match risk {
        HarvestRisk::Low => format!(
            "Low risk: redeem {} to book a ₹{:.0} {} loss and save up to ₹{:.0} in tax",
            holding.fund_name, loss, term, saving
        ),
        HarvestRisk::Medium => format!(
            "Medium risk: booking the ₹{:.0} {} loss in {} can save ₹{:.0}; \
             check exit load first",
            loss, term, holding.fund_name, saving
        ),
        HarvestRisk::High => format!(
            "High risk/small benefit: the ₹{:.0} loss in {} saves only ₹{:.0}; \
             costs may outweigh it",
            loss, holding.fund_name, saving
        ),
    };
    if locked_in {
        text.push_str(". Still in ELSS lock-in, cannot be redeemed yet");
    }
    text
}

/// Free-function form with default rules
pub fn identify_tax_loss_harvesting(
    holdings: &[Holding],
    as_of: NaiveDate,
) -> Vec<HarvestOpportunity> {
    HarvestingEngine::default().find_opportunities(holdings, as_of)
}

/// Summary of harvesting opportunities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestSummary {
    pub total_opportunities: usize,
    pub total_harvestable_losses: f64,
    pub total_potential_savings: f64,
    pub short_term_opportunities: usize,
    pub long_term_opportunities: usize,
    pub low_risk_opportunities: usize,
}
