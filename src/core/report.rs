use serde::Serialize;

use super::engine::{simulate, simulate_debt, summarize};
use super::error::PlanError;
use super::milestones::{DEFAULT_FRACTIONS, milestones};
use super::suggestions::suggest;
use super::types::{
    BalanceSeries, DebtParameters, DebtSeries, MAX_HORIZON_MONTHS, Milestone, PlanParameters,
    ProjectionSummary, Suggestion,
};

/// Everything one request produces, ready for the output collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub parameters: PlanParameters,
    pub series: BalanceSeries,
    pub summary: ProjectionSummary,
    pub milestones: Vec<Milestone>,
    pub suggestions: Vec<Suggestion>,
    pub debt: Option<DebtSeries>,
}

/// `debt` carries the schedule length, at most [`MAX_HORIZON_MONTHS`].
pub fn build_plan_report(
    params: &PlanParameters,
    debt: Option<(&DebtParameters, u32)>,
) -> Result<PlanReport, PlanError> {
    if debt.is_some_and(|(_, months)| months > MAX_HORIZON_MONTHS) {
        return Err(PlanError::invalid(
            "debtMonths",
            format!("must be at most {MAX_HORIZON_MONTHS}"),
        ));
    }
    let series = simulate(params);
    let summary = summarize(params, &series);
    let milestones = milestones(&series, params.target_goal(), &DEFAULT_FRACTIONS)?;
    let suggestions = suggest(params, &series, params.target_goal())?;
    let debt = debt.map(|(debt, months)| simulate_debt(debt, months));

    Ok(PlanReport {
        parameters: *params,
        series,
        summary,
        milestones,
        suggestions,
        debt,
    })
}
