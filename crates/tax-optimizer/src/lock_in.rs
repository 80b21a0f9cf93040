//! ELSS Lock-in Monitoring
//!
//! ELSS units cannot be redeemed until the lock-in period has elapsed,
//! whatever the gain or loss.

use crate::tax_calculator::{CapitalGainsRules, FundCategory, Holding};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Redemption eligibility of a holding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum LockInStatus {
    /// Category has no lock-in
    NotApplicable,
    /// Still inside the lock-in period
    #[serde(rename_all = "camelCase")]
    Locked {
        unlock_date: NaiveDate,
        days_remaining: i64,
    },
    /// Lock-in period has elapsed
    Unlocked,
}

impl LockInStatus {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockInStatus::Locked { .. })
    }
}

impl std::fmt::Display for LockInStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LockInStatus::NotApplicable => write!(f, "No lock-in"),
            LockInStatus::Locked { unlock_date, .. } => write!(f, "Locked until {}", unlock_date),
            LockInStatus::Unlocked => write!(f, "Unlocked"),
        }
    }
}

/// First date on which the holding may be redeemed
pub fn unlock_date(holding: &Holding, rules: &CapitalGainsRules) -> Option<NaiveDate> {
    match holding.category {
        FundCategory::Elss => Some(holding.purchase_date + Duration::days(rules.elss_lock_in_days)),
        _ => None,
    }
}

pub fn lock_in_status(
    holding: &Holding,
    as_of: NaiveDate,
    rules: &CapitalGainsRules,
) -> LockInStatus {
    match unlock_date(holding, rules) {
        None => LockInStatus::NotApplicable,
        Some(unlock) if as_of < unlock => LockInStatus::Locked {
            unlock_date: unlock,
            days_remaining: (unlock - as_of).num_days(),
        },
        Some(_) => LockInStatus::Unlocked,
    }
}

/// ELSS needs the full lock-in period behind it; other categories always pass
pub fn can_redeem_elss(holding: &Holding, as_of: NaiveDate) -> bool {
    !lock_in_status(holding, as_of, &CapitalGainsRules::default()).is_locked()
}
