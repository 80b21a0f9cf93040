//! Environment configuration.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use tax_optimizer::{today, CapitalGainsRules};

#[derive(Debug, Clone)]
pub struct Config {
    /// Date treated as "today" for holding periods
    pub as_of: NaiveDate,
    /// Overrides the 30% debt STCG stand-in
    pub debt_slab_rate: Option<f64>,
    pub json_logging: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let as_of = match std::env::var("FINCALC_AS_OF") {
            Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .with_context(|| format!("FINCALC_AS_OF is not a YYYY-MM-DD date: {}", raw))?,
            Err(_) => today(),
        };

        let debt_slab_rate = match std::env::var("FINCALC_DEBT_SLAB_RATE") {
            Ok(raw) => Some(parse_debt_slab_rate(&raw)?),
            Err(_) => None,
        };

        let json_logging = std::env::var("RUST_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Ok(Self {
            as_of,
            debt_slab_rate,
            json_logging,
        })
    }

    /// Rules for this run; an explicit slab rate wins over the environment
    pub fn capital_gains_rules(&self, slab_rate: Option<f64>) -> CapitalGainsRules {
        match slab_rate.or(self.debt_slab_rate) {
            Some(rate) => CapitalGainsRules::default().with_debt_slab_rate(rate),
            None => CapitalGainsRules::default(),
        }
    }
}

/// A fraction such as 0.3; percentages like 30 are rejected
fn parse_debt_slab_rate(raw: &str) -> Result<f64> {
    let rate = raw
        .trim()
        .parse::<f64>()
        .with_context(|| format!("FINCALC_DEBT_SLAB_RATE is not a number: {}", raw))?;
    if !(0.0..=1.0).contains(&rate) {
        bail!(
            "FINCALC_DEBT_SLAB_RATE must be a fraction between 0 and 1 (e.g. 0.3), got {}",
            raw
        );
    }
    Ok(rate)
}
