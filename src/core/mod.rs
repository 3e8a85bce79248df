mod engine;
mod error;
mod milestones;
mod report;
mod scenarios;
mod solver;
mod suggestions;
mod types;

pub use engine::{simulate, simulate_debt, summarize};
pub use error::PlanError;
pub use milestones::{DEFAULT_FRACTIONS, milestones};
pub use report::{PlanReport, build_plan_report};
pub use scenarios::{ScenarioComparison, ScenarioInput, compare, run_all};
pub use solver::{
    ABSOLUTE_TOLERANCE, DEFAULT_MAX_MONTHS, RELATIVE_TOLERANCE, ReturnSearchConfig,
    months_to_reach_goal, required_annual_return, required_annual_return_with,
    required_monthly_contribution, within_tolerance,
};
pub use suggestions::suggest;
pub use types::{
    BalancePoint, BalanceSeries, DebtParameters, DebtPoint, DebtSeries, MAX_HORIZON_MONTHS,
    Milestone, PlanParameters, ProjectionSummary, Scenario, Suggestion,
};
