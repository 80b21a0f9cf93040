//! Input records for an income-tax calculation.
//!
//! All records are read-only inputs. Amounts are annual rupee values.

use crate::error::TaxError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Personal income-tax regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    /// Itemized deductions, age-dependent slabs
    Old,
    /// Standard deduction only, single slab table
    New,
}

impl Default for Regime {
    fn default() -> Self {
        Self::New
    }
}

impl std::fmt::Display for Regime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Regime::Old => write!(f, "Old Regime"),
            Regime::New => write!(f, "New Regime"),
        }
    }
}

impl FromStr for Regime {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "old" => Ok(Regime::Old),
            "new" => Ok(Regime::New),
            other => Err(TaxError::UnknownRegime(other.to_string())),
        }
    }
}

/// Age bracket used to pick an old-regime slab table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeClass {
    /// Below 60
    Regular,
    /// 60 to 79
    Senior,
    /// 80 and above
    SuperSenior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CityType {
    /// Delhi, Mumbai, Kolkata, Chennai
    Metro,
    NonMetro,
}

impl Default for CityType {
    fn default() -> Self {
        Self::NonMetro
    }
}

impl CityType {
    /// Share of basic salary counted by the HRA exemption
    pub fn hra_basic_share(&self) -> f64 {
        match self {
            CityType::Metro => 0.50,
            CityType::NonMetro => 0.40,
        }
    }
}

impl FromStr for CityType {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "metro" => Ok(CityType::Metro),
            "non-metro" | "nonmetro" => Ok(CityType::NonMetro),
            other => Err(TaxError::UnknownCityType(other.to_string())),
        }
    }
}

/// Income for one financial year
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IncomeDetails {
    /// Basic pay, also the base for the HRA exemption
    pub basic_salary: f64,
    /// House rent allowance received
    pub hra: f64,
    /// Leave travel allowance
    pub lta: f64,
    pub special_allowance: f64,
    pub other_allowances: f64,
    pub bonus: f64,
    /// Business or professional receipts
    pub business_income: f64,
    /// Netted against business income, never below zero overall
    pub business_expenses: f64,
    /// Added to gross income at slab rates
    pub short_term_capital_gains: f64,
    /// Added to gross income at slab rates
    pub long_term_capital_gains: f64,
    /// Bank and deposit interest
    pub interest_income: f64,
    pub rental_income: f64,
    /// Anything not covered above
    pub other_income: f64,
    /// Exempt; tracked but never taxed
    pub agricultural_income: f64,
    /// Rent actually paid, for the HRA exemption
    pub rent_paid: f64,
    pub city_type: CityType,
}

impl IncomeDetails {
    /// Sum of the salary components, each clamped at zero
    pub fn gross_salary(&self) -> f64 {
        [
            self.basic_salary,
            self.hra,
            self.lta,
            self.special_allowance,
            self.other_allowances,
            self.bonus,
        ]
        .iter()
        .map(|v| v.max(0.0))
        .sum()
    }

    pub fn net_business_income(&self) -> f64 {
        (self.business_income - self.business_expenses).max(0.0)
    }

    pub fn capital_gains(&self) -> f64 {
        self.short_term_capital_gains.max(0.0) + self.long_term_capital_gains.max(0.0)
    }

    pub fn other_sources(&self) -> f64 {
        self.interest_income.max(0.0) + self.rental_income.max(0.0) + self.other_income.max(0.0)
    }

    /// Reject negative amounts instead of clamping them
    pub fn validate(&self) -> Result<(), TaxError> {
        let fields = [
            ("basicSalary", self.basic_salary),
            ("hra", self.hra),
            ("lta", self.lta),
            ("specialAllowance", self.special_allowance),
            ("otherAllowances", self.other_allowances),
            ("bonus", self.bonus),
            ("businessIncome", self.business_income),
            ("businessExpenses", self.business_expenses),
            ("shortTermCapitalGains", self.short_term_capital_gains),
            ("longTermCapitalGains", self.long_term_capital_gains),
            ("interestIncome", self.interest_income),
            ("rentalIncome", self.rental_income),
            ("otherIncome", self.other_income),
            ("agriculturalIncome", self.agricultural_income),
            ("rentPaid", self.rent_paid),
        ];
        reject_negative(&fields)
    }
}

/// Claimed deduction amounts, before statutory caps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deductions {
    // Section 80C pool
    pub epf: f64,
    pub ppf: f64,
    pub elss: f64,
    pub life_insurance: f64,
    pub nsc: f64,
    pub tax_saver_fd: f64,
    pub home_loan_principal: f64,
    pub tuition_fees: f64,
    pub sukanya_samriddhi: f64,
    // Section 80D
    pub self_health_insurance: f64,
    pub parents_health_insurance: f64,
    pub preventive_health_checkup: f64,
    /// Section 80E
    pub education_loan_interest: f64,
    /// Section 80G
    pub donations: f64,
    /// Section 24(b)
    pub home_loan_interest: f64,
    /// Section 80CCD(1B)
    pub nps_additional: f64,
    /// Section 80U
    pub disability: f64,
    /// Section 80TTA / 80TTB
    pub savings_interest: f64,
}

impl Deductions {
    /// Raw 80C pool before the cap
    pub fn section_80c_claimed(&self) -> f64 {
        [
            self.epf,
            self.ppf,
            self.elss,
            self.life_insurance,
            self.nsc,
            self.tax_saver_fd,
            self.home_loan_principal,
            self.tuition_fees,
            self.sukanya_samriddhi,
        ]
        .iter()
        .map(|v| v.max(0.0))
        .sum()
    }

    pub fn validate(&self) -> Result<(), TaxError> {
        let fields = [
            ("epf", self.epf),
            ("ppf", self.ppf),
            ("elss", self.elss),
            ("lifeInsurance", self.life_insurance),
            ("nsc", self.nsc),
            ("taxSaverFd", self.tax_saver_fd),
            ("homeLoanPrincipal", self.home_loan_principal),
            ("tuitionFees", self.tuition_fees),
            ("sukanyaSamriddhi", self.sukanya_samriddhi),
            ("selfHealthInsurance", self.self_health_insurance),
            ("parentsHealthInsurance", self.parents_health_insurance),
            ("preventiveHealthCheckup", self.preventive_health_checkup),
            ("educationLoanInterest", self.education_loan_interest),
            ("donations", self.donations),
            ("homeLoanInterest", self.home_loan_interest),
            ("npsAdditional", self.nps_additional),
            ("disability", self.disability),
            ("savingsInterest", self.savings_interest),
        ];
        reject_negative(&fields)
    }
}

/// Household facts that select slab tables and deduction caps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FamilyDetails {
    pub age: u32,
    pub is_senior_citizen: bool,
    pub is_super_senior_citizen: bool,
    pub parents_senior_citizen: bool,
    pub has_disability: bool,
    pub severe_disability: bool,
    pub dependent_children: u32,
    pub dependent_parents: u32,
    pub is_huf: bool,
}

impl FamilyDetails {
    pub fn age_class(&self) -> AgeClass {
        if self.is_super_senior_citizen || self.age >= 80 {
            AgeClass::SuperSenior
        } else if self.is_senior_citizen || self.age >= 60 {
            AgeClass::Senior
        } else {
            AgeClass::Regular
        }
    }

    pub fn is_senior(&self) -> bool {
        self.age_class() != AgeClass::Regular
    }

    pub fn validate(&self) -> Result<(), TaxError> {
        if self.age > 130 {
            return Err(TaxError::InvalidAge(self.age));
        }
        Ok(())
    }
}

fn reject_negative(fields: &[(&'static str, f64)]) -> Result<(), TaxError> {
    match fields.iter().find(|(_, value)| *value < 0.0) {
        Some(&(field, value)) => Err(TaxError::NegativeAmount { field, value }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_class_from_flags_and_age() {
        let mut family = FamilyDetails {
            age: 30,
            ..Default::default()
        };
        assert_eq!(family.age_class(), AgeClass::Regular);

        family.age = 65;
        assert_eq!(family.age_class(), AgeClass::Senior);

        family.age = 45;
        family.is_super_senior_citizen = true;
        assert_eq!(family.age_class(), AgeClass::SuperSenior);
    }

    #[test]
    fn test_regime_and_city_parsing() {
        assert_eq!("OLD".parse::<Regime>().unwrap(), Regime::Old);
        assert_eq!(" new ".parse::<Regime>().unwrap(), Regime::New);
        assert!("flat".parse::<Regime>().is_err());

        assert_eq!("non_metro".parse::<CityType>().unwrap(), CityType::NonMetro);
        assert_eq!("metro".parse::<CityType>().unwrap(), CityType::Metro);
    }

    #[test]
    fn test_validate_reports_first_negative_field() {
        let income = IncomeDetails {
            basic_salary: 100_000.0,
            rental_income: -5.0,
            ..Default::default()
        };
        assert_eq!(
            income.validate(),
            Err(TaxError::NegativeAmount {
                field: "rentalIncome",
                value: -5.0
            })
        );
        assert!(Deductions::default().validate().is_ok());
    }

    #[test]
    fn test_camel_case_json() {
        let json = r#"{"basicSalary": 600000, "hra": 200000, "rentPaid": 180000, "cityType": "metro"}"#;
        let income: IncomeDetails = serde_json::from_str(json).unwrap();
        assert_eq!(income.basic_salary, 600_000.0);
        assert_eq!(income.city_type, CityType::Metro);
        assert_eq!(income.gross_salary(), 800_000.0);
    }
}
