//! Financial goals and their funding plans.

use crate::error::GoalError;
use crate::sip::{
    inflation_adjusted_target, lumpsum_future_value, required_monthly_sip,
    step_up_sip_future_value,
};
use serde::{Deserialize, Serialize};

/// A saved goal, priced in today's rupees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub name: String,
    pub target_amount: f64,
    pub years_to_goal: f64,
    #[serde(default)]
    pub current_savings: f64,
    #[serde(default)]
    pub monthly_sip: f64,
    #[serde(default)]
    pub annual_step_up: f64,
    /// Annual %, e.g. 12.0
    pub expected_return: f64,
    #[serde(default = "default_inflation")]
    pub inflation_rate: f64,
}

fn default_inflation() -> f64 {
    6.0
}

impl Goal {
    pub fn validate(&self) -> Result<(), GoalError> {
        let reason = if self.name.trim().is_empty() {
            Some("name is empty")
        } else if !self.target_amount.is_finite() || self.target_amount < 0.0 {
            Some("target amount must be a non-negative number")
        } else if !(0.0..=100.0).contains(&self.years_to_goal) {
            Some("years to goal must be between 0 and 100")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(GoalError::InvalidGoal {
                name: self.name.clone(),
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Projection of a goal against current savings and SIP
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPlan {
    /// Goal this plan was computed for
    pub name: String,
    /// Target inflated to the goal year
    pub future_cost: f64,
    /// Current savings compounded to the goal year
    pub projected_savings: f64,
    /// Corpus built by the monthly SIP, step-up included
    pub projected_sip_corpus: f64,
    /// Savings plus SIP corpus
    pub projected_total: f64,
    /// Future cost not covered by the projection, never negative
    pub gap: f64,
    /// Extra flat monthly SIP that closes the gap
    pub additional_monthly_sip: f64,
    pub on_track: bool,
    /// Projected total as a percentage of future cost, capped at 100
    pub progress: f64,
}

pub fn plan_goal(goal: &Goal) -> GoalPlan {
    let future_cost =
        inflation_adjusted_target(goal.target_amount, goal.inflation_rate, goal.years_to_goal);
    let projected_savings =
        lumpsum_future_value(goal.current_savings, goal.expected_return, goal.years_to_goal);
    let projected_sip_corpus = step_up_sip_future_value(
        goal.monthly_sip,
        goal.annual_step_up,
        goal.expected_return,
        goal.years_to_goal,
    );
    let projected_total = projected_savings + projected_sip_corpus;
    let gap = (future_cost - projected_total).max(0.0);
    let progress = if future_cost > 0.0 {
        (projected_total / future_cost * 100.0).min(100.0)
    } else {
        100.0
    };

    GoalPlan {
        name: goal.name.clone(),
        future_cost,
        projected_savings,
        projected_sip_corpus,
        projected_total,
        gap,
        additional_monthly_sip: required_monthly_sip(gap, goal.expected_return, goal.years_to_goal),
        on_track: gap <= 0.0,
        progress,
    }
}

pub fn goals_to_json(goals: &[Goal]) -> Result<String, GoalError> {
    Ok(serde_json::to_string_pretty(goals)?)
}

/// Parse and validate an exported goal list
pub fn goals_from_json(json: &str) -> Result<Vec<Goal>, GoalError> {
    let goals: Vec<Goal> = serde_json::from_str(json)?;
    for goal in &goals {
        goal.validate()?;
    }
    tracing::debug!(count = goals.len(), "imported goals");
    Ok(goals)
}
