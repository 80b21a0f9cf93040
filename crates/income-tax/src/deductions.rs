//! Deduction computation
//!
//! Each section is capped independently. Under the new regime only the
//! standard deduction survives.

use crate::types::{Deductions, FamilyDetails, IncomeDetails, Regime};
use serde::{Deserialize, Serialize};

pub const STANDARD_DEDUCTION: f64 = 50_000.0;
pub const SECTION_80C_LIMIT: f64 = 150_000.0;
pub const SECTION_80D_LIMIT: f64 = 25_000.0;
pub const SECTION_80D_SENIOR_LIMIT: f64 = 50_000.0;
pub const PREVENTIVE_CHECKUP_LIMIT: f64 = 5_000.0;
pub const SECTION_80G_SALARY_SHARE: f64 = 0.10;
pub const SECTION_24_LIMIT: f64 = 200_000.0;
pub const SECTION_80CCD_1B_LIMIT: f64 = 50_000.0;
pub const SECTION_80U_LIMIT: f64 = 75_000.0;
pub const SECTION_80U_SEVERE_LIMIT: f64 = 125_000.0;
pub const SECTION_80TTA_LIMIT: f64 = 10_000.0;
pub const SECTION_80TTB_LIMIT: f64 = 50_000.0;

/// Allowed deduction per section, after caps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductionBreakdown {
    pub standard_deduction: f64,
    pub hra_exemption: f64,
    pub section_80c: f64,
    pub section_80d: f64,
    pub section_80e: f64,
    pub section_80g: f64,
    pub section_24: f64,
    pub section_80ccd_1b: f64,
    pub section_80u: f64,
    pub savings_interest: f64,
    pub total: f64,
}

impl DeductionBreakdown {
    fn with_total(mut self) -> Self {
        self.total = self.standard_deduction
            + self.hra_exemption
            + self.section_80c
            + self.section_80d
            + self.section_80e
            + self.section_80g
            + self.section_24
            + self.section_80ccd_1b
            + self.section_80u
            + self.savings_interest;
        self
    }
}

/// `min(HRA received, rent − 10% of basic, city share of basic)`, never negative
pub fn hra_exemption(income: &IncomeDetails) -> f64 {
    let hra = income.hra.max(0.0);
    let basic = income.basic_salary.max(0.0);
    let rent_over_basic = income.rent_paid - 0.10 * basic;
    let city_limit = income.city_type.hra_basic_share() * basic;

    hra.min(rent_over_basic).min(city_limit).max(0.0)
}

pub fn section_80d(deductions: &Deductions, family: &FamilyDetails) -> f64 {
    let self_limit = if family.is_senior() {
        SECTION_80D_SENIOR_LIMIT
    } else {
        SECTION_80D_LIMIT
    };
    let parents_limit = if family.parents_senior_citizen {
        SECTION_80D_SENIOR_LIMIT
    } else {
        SECTION_80D_LIMIT
    };

    let checkup = deductions
        .preventive_health_checkup
        .clamp(0.0, PREVENTIVE_CHECKUP_LIMIT);
    let self_bucket = (deductions.self_health_insurance.max(0.0) + checkup).min(self_limit);
    let parents_bucket = deductions
        .parents_health_insurance
        .clamp(0.0, parents_limit);

    self_bucket + parents_bucket
}

pub fn section_80u(deductions: &Deductions, family: &FamilyDetails) -> f64 {
    if !family.has_disability {
        return 0.0;
    }
    let limit = if family.severe_disability {
        SECTION_80U_SEVERE_LIMIT
    } else {
        SECTION_80U_LIMIT
    };
    deductions.disability.clamp(0.0, limit)
}

pub fn savings_interest(deductions: &Deductions, family: &FamilyDetails) -> f64 {
    let limit = if family.is_senior() {
        SECTION_80TTB_LIMIT
    } else {
        SECTION_80TTA_LIMIT
    };
    deductions.savings_interest.clamp(0.0, limit)
}

pub fn compute_deductions(
    income: &IncomeDetails,
    deductions: &Deductions,
    family: &FamilyDetails,
    regime: Regime,
) -> DeductionBreakdown {
    // Flat in both regimes, whatever the income source
    let standard_deduction = STANDARD_DEDUCTION;

    if regime == Regime::New {
        return DeductionBreakdown {
            standard_deduction,
            ..Default::default()
        }
        .with_total();
    }

    let gross_salary = income.gross_salary();

    DeductionBreakdown {
        standard_deduction,
        hra_exemption: hra_exemption(income),
        section_80c: deductions.section_80c_claimed().min(SECTION_80C_LIMIT),
        section_80d: section_80d(deductions, family),
        section_80e: deductions.education_loan_interest.max(0.0),
        section_80g: deductions
            .donations
            .clamp(0.0, SECTION_80G_SALARY_SHARE * gross_salary),
        section_24: deductions.home_loan_interest.clamp(0.0, SECTION_24_LIMIT),
        section_80ccd_1b: deductions.nps_additional.clamp(0.0, SECTION_80CCD_1B_LIMIT),
        section_80u: section_80u(deductions, family),
        savings_interest: savings_interest(deductions, family),
        total: 0.0,
    }
    .with_total()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CityType;
    use proptest::prelude::*;

    fn salaried(basic: f64, hra: f64, rent: f64, city_type: CityType) -> IncomeDetails {
        IncomeDetails {
            basic_salary: basic,
            hra,
            rent_paid: rent,
            city_type,
            ..Default::default()
        }
    }

    #[test]
    fn test_hra_exemption_rent_bound() {
        let income = salaried(600_000.0, 200_000.0, 180_000.0, CityType::Metro);
        assert_eq!(hra_exemption(&income), 120_000.0);
    }

    #[test]
    fn test_hra_exemption_city_bound() {
        // 40% of 100k = 40k is the smallest term
        let income = salaried(100_000.0, 90_000.0, 500_000.0, CityType::NonMetro);
        assert_eq!(hra_exemption(&income), 40_000.0);
    }

    #[test]
    fn test_hra_exemption_low_rent_is_zero() {
        let income = salaried(600_000.0, 200_000.0, 30_000.0, CityType::Metro);
        assert_eq!(hra_exemption(&income), 0.0);
    }

    #[test]
    fn test_80c_is_one_pool() {
        let deductions = Deductions {
            epf: 100_000.0,
            ppf: 100_000.0,
            elss: 50_000.0,
            ..Default::default()
        };
        let breakdown = compute_deductions(
            &salaried(500_000.0, 0.0, 0.0, CityType::Metro),
            &deductions,
            &FamilyDetails::default(),
            Regime::Old,
        );
        assert_eq!(breakdown.section_80c, SECTION_80C_LIMIT);
    }

    #[test]
    fn test_80d_buckets() {
        let deductions = Deductions {
            self_health_insurance: 24_000.0,
            preventive_health_checkup: 8_000.0,
            parents_health_insurance: 60_000.0,
            ..Default::default()
        };
        let mut family = FamilyDetails {
            age: 35,
            ..Default::default()
        };
        // self: min(24k + 5k, 25k); parents: 25k
        assert_eq!(section_80d(&deductions, &family), 50_000.0);

        family.parents_senior_citizen = true;
        assert_eq!(section_80d(&deductions, &family), 75_000.0);
    }

    #[test]
    fn test_new_regime_only_standard_deduction() {
        let deductions = Deductions {
            epf: 150_000.0,
            home_loan_interest: 200_000.0,
            ..Default::default()
        };
        let breakdown = compute_deductions(
            &salaried(1_000_000.0, 200_000.0, 300_000.0, CityType::Metro),
            &deductions,
            &FamilyDetails::default(),
            Regime::New,
        );
        assert_eq!(breakdown.total, STANDARD_DEDUCTION);
        assert_eq!(breakdown.hra_exemption, 0.0);
        assert_eq!(breakdown.section_80c, 0.0);
    }

    #[test]
    fn test_80g_capped_at_tenth_of_salary() {
        let deductions = Deductions {
            donations: 90_000.0,
            ..Default::default()
        };
        let breakdown = compute_deductions(
            &salaried(400_000.0, 0.0, 0.0, CityType::Metro),
            &deductions,
            &FamilyDetails::default(),
            Regime::Old,
        );
        assert_eq!(breakdown.section_80g, 40_000.0);
    }

    #[test]
    fn test_disability_requires_flag() {
        let deductions = Deductions {
            disability: 200_000.0,
            ..Default::default()
        };
        let mut family = FamilyDetails::default();
        assert_eq!(section_80u(&deductions, &family), 0.0);
        family.has_disability = true;
        assert_eq!(section_80u(&deductions, &family), SECTION_80U_LIMIT);
        family.severe_disability = true;
        assert_eq!(section_80u(&deductions, &family), SECTION_80U_SEVERE_LIMIT);
    }

    #[test]
    fn test_standard_deduction_is_flat_without_salary() {
        let income = IncomeDetails {
            business_income: 900_000.0,
            ..Default::default()
        };
        for regime in [Regime::Old, Regime::New] {
            let breakdown = compute_deductions(
                &income,
                &Deductions::default(),
                &FamilyDetails::default(),
                regime,
            );
            assert_eq!(breakdown.standard_deduction, STANDARD_DEDUCTION);
            assert_eq!(breakdown.total, STANDARD_DEDUCTION);
        }
    }

    proptest! {
        #[test]
        fn hra_exemption_within_bounds(
            basic in -100_000.0f64..5_000_000.0,
            hra in -100_000.0f64..2_000_000.0,
            rent in -100_000.0f64..3_000_000.0,
            metro in any::<bool>(),
        ) {
            let city = if metro { CityType::Metro } else { CityType::NonMetro };
            let exemption = hra_exemption(&salaried(basic, hra, rent, city));
            prop_assert!(exemption >= 0.0);
            prop_assert!(exemption <= hra.max(0.0));
        }
    }
}
