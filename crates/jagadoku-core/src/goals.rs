//! Goal progress tracker
//!
//! Contributions are plain additions. A negative delta is a withdrawal, and
//! the saved amount is allowed to overshoot the target or dip below zero. Only
//! the displayed percentage is clamped.

use crate::models::{parse_amount, SavingsGoal};

/// Completion percentage in `0..=100` for non-negative balances.
///
/// A target that is zero or negative reports 0 instead of dividing by it.
pub fn progress_percent(goal: &SavingsGoal) -> f64 {
    if goal.target_amount <= 0.0 {
        return 0.0;
    }
    (goal.current_amount / goal.target_amount * 100.0).min(100.0)
}

/// Amount still missing to reach the target, never negative
pub fn remaining(goal: &SavingsGoal) -> f64 {
    (goal.target_amount - goal.current_amount).max(0.0)
}

/// Whether the saved amount has reached the target
pub fn is_complete(goal: &SavingsGoal) -> bool {
    goal.target_amount > 0.0 && goal.current_amount >= goal.target_amount
}

/// Return the goal with `delta` added to its saved amount
pub fn contribute(goal: &SavingsGoal, delta: f64) -> SavingsGoal {
    SavingsGoal {
        current_amount: goal.current_amount + delta,
        ..goal.clone()
    }
}

/// Parse a contribution typed by the user; `None` means "do nothing"
pub fn parse_contribution(input: &str) -> Option<f64> {
    parse_amount(input)
}
