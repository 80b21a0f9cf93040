//! Tax Calculator
//!
//! Capital-gains rules for Indian mutual-fund redemptions: holding-period
//! classification per fund category and the shared rate table.

use crate::error::OptimizerError;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Mutual-fund category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FundCategory {
    Equity,
    Debt,
    Hybrid,
    /// Equity-linked savings scheme, three-year lock-in
    #[serde(rename = "ELSS", alias = "Elss")]
    Elss,
}

impl FundCategory {
    /// Equity-class funds share the LTCG exemption and equity rates
    pub fn is_equity_class(&self) -> bool {
        matches!(
            self,
            FundCategory::Equity | FundCategory::Hybrid | FundCategory::Elss
        )
    }
}

impl std::fmt::Display for FundCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FundCategory::Equity => write!(f, "Equity"),
            FundCategory::Debt => write!(f, "Debt"),
            FundCategory::Hybrid => write!(f, "Hybrid"),
            FundCategory::Elss => write!(f, "ELSS"),
        }
    }
}

impl FromStr for FundCategory {
    type Err = OptimizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "equity" => Ok(FundCategory::Equity),
            "debt" => Ok(FundCategory::Debt),
            "hybrid" => Ok(FundCategory::Hybrid),
            "elss" => Ok(FundCategory::Elss),
            other => Err(OptimizerError::UnknownCategory(other.to_string())),
        }
    }
}

/// Holding period classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoldingPeriod {
    ShortTerm,
    LongTerm,
}

/// Type of gain/loss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GainType {
    ShortTermGain,
    ShortTermLoss,
    LongTermGain,
    LongTermLoss,
}

impl GainType {
    pub fn classify(gain_loss: f64, period: HoldingPeriod) -> Self {
        match (gain_loss >= 0.0, period) {
            (true, HoldingPeriod::LongTerm) => GainType::LongTermGain,
            (true, HoldingPeriod::ShortTerm) => GainType::ShortTermGain,
            (false, HoldingPeriod::LongTerm) => GainType::LongTermLoss,
            (false, HoldingPeriod::ShortTerm) => GainType::ShortTermLoss,
        }
    }

    pub fn is_loss(&self) -> bool {
        matches!(self, GainType::ShortTermLoss | GainType::LongTermLoss)
    }

    pub fn is_long_term(&self) -> bool {
        matches!(self, GainType::LongTermGain | GainType::LongTermLoss)
    }
}

/// Capital-gains rules for one tax year
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalGainsRules {
    /// Equity, Hybrid: long-term when held more than this many days
    pub equity_long_term_days: i64,
    /// Debt, ELSS: long-term when held more than this many days
    pub debt_long_term_days: i64,
    /// ELSS units cannot be redeemed before this many days
    pub elss_lock_in_days: i64,
    pub equity_ltcg_rate: f64,
    pub equity_stcg_rate: f64,
    pub debt_ltcg_rate: f64,
    /// Stand-in for the investor's slab rate
    pub debt_stcg_rate: f64,
    /// Annual per-person LTCG exemption for equity-class funds
    pub annual_ltcg_exemption: f64,
}

impl Default for CapitalGainsRules {
    fn default() -> Self {
        Self {
            equity_long_term_days: 365,
            debt_long_term_days: 1095,
            elss_lock_in_days: 1095,
            equity_ltcg_rate: 0.125,
            equity_stcg_rate: 0.20,
            debt_ltcg_rate: 0.125,
            debt_stcg_rate: 0.30,
            annual_ltcg_exemption: 125_000.0,
        }
    }
}

/// Tax on one realized gain
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GainTax {
    pub taxable_gain: f64,
    pub tax_amount: f64,
    pub tax_rate: f64,
    pub exemption_used: f64,
}

impl CapitalGainsRules {
    /// Replace the debt STCG stand-in with the investor's marginal slab rate
    pub fn with_debt_slab_rate(mut self, rate: f64) -> Self {
        self.debt_stcg_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn long_term_threshold_days(&self, category: FundCategory) -> i64 {
        match category {
            FundCategory::Equity | FundCategory::Hybrid => self.equity_long_term_days,
            FundCategory::Debt | FundCategory::Elss => self.debt_long_term_days,
        }
    }

    pub fn holding_period(&self, category: FundCategory, days_held: i64) -> HoldingPeriod {
        if days_held > self.long_term_threshold_days(category) {
            HoldingPeriod::LongTerm
        } else {
            HoldingPeriod::ShortTerm
        }
    }

    pub fn rate_for(&self, category: FundCategory, period: HoldingPeriod) -> f64 {
        match (category.is_equity_class(), period) {
            (true, HoldingPeriod::LongTerm) => self.equity_ltcg_rate,
            (true, HoldingPeriod::ShortTerm) => self.equity_stcg_rate,
            (false, HoldingPeriod::LongTerm) => self.debt_ltcg_rate,
            (false, HoldingPeriod::ShortTerm) => self.debt_stcg_rate,
        }
    }

    /// Tax on `gain`, drawing on at most `exemption_available` when the gain
    /// is an equity-class LTCG. Losses owe nothing and draw nothing.
    pub fn tax_for_gain(
        &self,
        category: FundCategory,
        period: HoldingPeriod,
        gain: f64,
        exemption_available: f64,
    ) -> GainTax {
        let tax_rate = self.rate_for(category, period);
        if gain <= 0.0 {
            return GainTax {
                tax_rate,
                ..Default::default()
            };
        }

        let exemption_used = if category.is_equity_class() && period == HoldingPeriod::LongTerm {
            gain.min(exemption_available.max(0.0))
        } else {
            0.0
        };
        let taxable_gain = gain - exemption_used;

        GainTax {
            taxable_gain,
            tax_amount: taxable_gain * tax_rate,
            tax_rate,
            exemption_used,
        }
    }
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Calendar days between purchase and `as_of`, zero for future purchases
pub fn holding_period_days(purchase_date: NaiveDate, as_of: NaiveDate) -> i64 {
    (as_of - purchase_date).num_days().max(0)
}

/// Default-rule classification of a lot held from `purchase_date` to `as_of`
pub fn is_long_term_capital_gain(
    category: FundCategory,
    purchase_date: NaiveDate,
    as_of: NaiveDate,
) -> bool {
    let days = holding_period_days(purchase_date, as_of);
    CapitalGainsRules::default().holding_period(category, days) == HoldingPeriod::LongTerm
}

/// A single mutual-fund lot
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    pub id: String,
    pub fund_name: String,
    pub category: FundCategory,
    pub purchase_date: NaiveDate,
    pub units: f64,
    pub purchase_nav: f64,
    pub current_nav: f64,
    pub invested_amount: f64,
    pub current_value: f64,
}

impl Holding {
    /// Create a holding, deriving invested amount and current value from NAVs
    pub fn new(
        id: impl Into<String>,
        fund_name: impl Into<String>,
        category: FundCategory,
        purchase_date: NaiveDate,
        units: f64,
        purchase_nav: f64,
        current_nav: f64,
    ) -> Self {
        Self {
            id: id.into(),
            fund_name: fund_name.into(),
            category,
            purchase_date,
            units,
            purchase_nav,
            current_nav,
            invested_amount: units * purchase_nav,
            current_value: units * current_nav,
        }
    }

    pub fn days_held(&self, as_of: NaiveDate) -> i64 {
        holding_period_days(self.purchase_date, as_of)
    }

    pub fn holding_period(&self, as_of: NaiveDate, rules: &CapitalGainsRules) -> HoldingPeriod {
        rules.holding_period(self.category, self.days_held(as_of))
    }

    /// Positive for a gain, negative for a loss
    pub fn unrealized_gain_loss(&self) -> f64 {
        self.current_value - self.invested_amount
    }

    /// Gain realized by redeeming `units` at the current NAV
    pub fn gain_on_units(&self, units: f64) -> f64 {
        (self.current_nav - self.purchase_nav) * units
    }

    pub fn gain_type(&self, as_of: NaiveDate, rules: &CapitalGainsRules) -> GainType {
        GainType::classify(self.unrealized_gain_loss(), self.holding_period(as_of, rules))
    }

    /// Days left until the lot turns long-term, None once it is
    pub fn days_until_long_term(&self, as_of: NaiveDate, rules: &CapitalGainsRules) -> Option<i64> {
        let threshold = rules.long_term_threshold_days(self.category);
        let days_held = self.days_held(as_of);
        if days_held > threshold {
            None
        } else {
            Some(threshold - days_held + 1)
        }
    }
}
