//! Tracking the amounts a user is putting aside for future purchases.

mod core;
mod endpoints;

pub use core::{SavingsGoal, SavingsGoalData, create_savings_goal_table};
pub(crate) use endpoints::{
    create_savings_goal_endpoint, delete_savings_goal_endpoint, get_savings_goals_endpoint,
    update_savings_goal_endpoint,
};
