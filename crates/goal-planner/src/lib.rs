//! Goal Planner
//!
//! SIP, lump-sum and inflation arithmetic for financial goals, plus JSON
//! import/export of saved goals.

pub mod error;
pub mod goal;
pub mod sip;

pub use error::GoalError;
pub use goal::{goals_from_json, goals_to_json, plan_goal, Goal, GoalPlan};
pub use sip::{
    inflation_adjusted_target, lumpsum_future_value, required_monthly_sip, sip_future_value,
    step_up_sip_future_value,
};
