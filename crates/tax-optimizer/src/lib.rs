//! Tax Optimizer
//!
//! Capital-gains analysis for mutual-fund redemptions under Indian tax rules:
//! holding-period classification, LTCG exemption allocation across a batch,
//! tax-loss harvesting, ELSS lock-in checks and low-tax redemption planning.

pub mod error;
pub mod export;
pub mod harvester;
pub mod lock_in;
pub mod redemption;
pub mod summary;
pub mod tax_calculator;

pub use error::OptimizerError;
pub use harvester::{
    identify_tax_loss_harvesting, HarvestOpportunity, HarvestRisk, HarvestSummary,
    HarvestingConfig, HarvestingEngine,
};
pub use lock_in::{can_redeem_elss, lock_in_status, unlock_date, LockInStatus};
pub use redemption::{
    analyze_tax_implications, analyze_tax_implications_with_rules, optimize_redemption_sequence,
    optimize_redemption_sequence_with_rules, ExemptionLedger, RedemptionPlan, RedemptionStrategy,
    TaxImplication,
};
pub use summary::{
    generate_tax_optimization_summary, generate_tax_optimization_summary_with_rules,
    TaxOptimizationSummary,
};
pub use tax_calculator::{
    holding_period_days, is_long_term_capital_gain, today, CapitalGainsRules, FundCategory,
    GainTax, GainType, Holding, HoldingPeriod,
};
