//! Compounding formulas.
//!
//! Rates are annual percentages. SIP contributions are made at the start of
//! each month and compound monthly; lump sums compound annually. Negative
//! inputs clamp to zero and a zero rate degrades to a plain sum.

fn monthly_rate(annual_rate_pct: f64) -> f64 {
    annual_rate_pct.max(0.0) / 12.0 / 100.0
}

fn months(years: f64) -> i32 {
    (years.max(0.0) * 12.0).round() as i32
}

/// Future value of one rupee per month, paid at the start of each month
fn annuity_due_factor(rate: f64, n: i32) -> f64 {
    if n <= 0 {
        0.0
    } else if rate == 0.0 {
        n as f64
    } else {
        ((1.0 + rate).powi(n) - 1.0) / rate * (1.0 + rate)
    }
}

pub fn sip_future_value(monthly_investment: f64, annual_rate_pct: f64, years: f64) -> f64 {
    monthly_investment.max(0.0) * annuity_due_factor(monthly_rate(annual_rate_pct), months(years))
}

/// Monthly SIP needed to reach `target` in `years`; with no time left the
/// whole target is due now
pub fn required_monthly_sip(target: f64, annual_rate_pct: f64, years: f64) -> f64 {
    let target = target.max(0.0);
    let factor = annuity_due_factor(monthly_rate(annual_rate_pct), months(years));
    if factor <= 0.0 {
        target
    } else {
        target / factor
    }
}

pub fn lumpsum_future_value(amount: f64, annual_rate_pct: f64, years: f64) -> f64 {
    amount.max(0.0) * (1.0 + annual_rate_pct.max(0.0) / 100.0).powf(years.max(0.0))
}

/// Cost of something priced `today_cost` after `years` of inflation
pub fn inflation_adjusted_target(today_cost: f64, inflation_pct: f64, years: f64) -> f64 {
    lumpsum_future_value(today_cost, inflation_pct, years)
}

/// SIP whose monthly amount rises by `annual_step_up_pct` every twelve months
pub fn step_up_sip_future_value(
    monthly_investment: f64,
    annual_step_up_pct: f64,
    annual_rate_pct: f64,
    years: f64,
) -> f64 {
    let rate = monthly_rate(annual_rate_pct);
    let step_up = 1.0 + annual_step_up_pct.max(0.0) / 100.0;
    let mut contribution = monthly_investment.max(0.0);
    let mut balance = 0.0;

    for month in 0..months(years) {
        if month > 0 && month % 12 == 0 {
            contribution *= step_up;
        }
        balance = (balance + contribution) * (1.0 + rate);
    }

    balance
}
