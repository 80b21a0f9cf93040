//! Income Tax
//!
//! Indian personal income-tax computation under the old and new regimes:
//! gross income, capped deductions, progressive slabs, Section 87A rebate,
//! surcharge and cess. Every function is total; negative inputs clamp to zero.

pub mod calculator;
pub mod deductions;
pub mod error;
pub mod slabs;
pub mod types;

pub use calculator::{
    compare_tax_regimes, compute_tax, gross_income, rebate_87a, surcharge_rate,
    RegimeComparison, TaxBreakdown,
};
pub use deductions::{compute_deductions, hra_exemption, DeductionBreakdown};
pub use error::TaxError;
pub use slabs::{slab_tax, SlabTableKind, SlabTax, TaxSlab};
pub use types::{AgeClass, CityType, Deductions, FamilyDetails, IncomeDetails, Regime};
