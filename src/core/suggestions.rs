use tracing::debug;

use super::error::PlanError;
use super::milestones::{DEFAULT_FRACTIONS, milestones};
use super::solver::{
    DEFAULT_MAX_MONTHS, months_to_reach_goal, required_annual_return,
    required_monthly_contribution,
};
use super::types::{BalanceSeries, PlanParameters, Suggestion};

/// Action items for one projection, most actionable first.
///
/// Shortfall: `IncreaseContribution`, `ShortfallOrSurplus` (negative), then
/// `ExtendHorizon` and `RequiredReturn`. Every shortfall entry except
/// `ShortfallOrSurplus` is skipped when its solver has no answer. Surplus: only
/// `ShortfallOrSurplus` (positive). Both end with one `MilestoneReached` per
/// resolved default fraction.
pub fn suggest(
    params: &PlanParameters,
    series: &BalanceSeries,
    target_goal: f64,
) -> Result<Vec<Suggestion>, PlanError> {
    let final_balance = series
        .final_balance()
        .unwrap_or(params.starting_balance());
    let mut suggestions = Vec::new();

    if final_balance < target_goal {
        match required_monthly_contribution(params, target_goal) {
            Ok(required_monthly) => suggestions.push(Suggestion::IncreaseContribution {
                required_monthly,
                increase_by: (required_monthly - params.monthly_contribution()).max(0.0),
            }),
            Err(err) => debug!(%err, "no contribution suggestion"),
        }
        suggestions.push(Suggestion::ShortfallOrSurplus {
            amount: final_balance - target_goal,
        });

        let goal_params = params.with_target_goal(target_goal)?;
        match months_to_reach_goal(&goal_params, DEFAULT_MAX_MONTHS) {
            // A falling balance can meet the goal before the horizon and miss it at the end.
            Some(months) if months > params.horizon_months() => {
                suggestions.push(Suggestion::ExtendHorizon {
                    months,
                    extra_months: months - params.horizon_months(),
                })
            }
            Some(months) => debug!(months, "goal first met within the horizon"),
            None => debug!(target_goal, "goal not reachable within month cap"),
        }
        match required_annual_return(params, target_goal) {
            Ok(rate) => suggestions.push(Suggestion::RequiredReturn { rate }),
            Err(err) => debug!(%err, "no required return suggestion"),
        }
    } else {
        suggestions.push(Suggestion::ShortfallOrSurplus {
            amount: final_balance - target_goal,
        });
    }

    for milestone in milestones(series, target_goal, &DEFAULT_FRACTIONS)? {
        if let Some(month) = milestone.month {
            suggestions.push(Suggestion::MilestoneReached {
                fraction: milestone.fraction,
                month,
            });
        }
    }

    Ok(suggestions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::simulate;

    fn plan(start: f64, contribution: f64, rate: f64, months: u32, goal: f64) -> PlanParameters {
        PlanParameters::new(start, contribution, rate, months, goal).expect("valid plan")
    }

    #[test]
    fn shortfall_leads_with_contribution_increase() {
        let params = plan(1_000.0, 500.0, 0.05, 12, 10_000.0);
        let series = simulate(&params);
        let suggestions = suggest(&params, &series, 10_000.0).expect("suggests");

        let Suggestion::IncreaseContribution {
            required_monthly,
            increase_by,
        } = suggestions[0]
        else {
            panic!("expected IncreaseContribution first, got {:?}", suggestions[0]);
        };
        assert!(required_monthly > 500.0);
        assert!((increase_by - (required_monthly - 500.0)).abs() < 1e-9);

        let Suggestion::ShortfallOrSurplus { amount } = suggestions[1] else {
            panic!("expected ShortfallOrSurplus second");
        };
        let final_balance = series.final_balance().expect("non-empty");
        assert!((amount - (final_balance - 10_000.0)).abs() < 1e-9);
        assert!(amount < 0.0);

        assert!(suggestions.iter().any(|s| matches!(
            s,
            Suggestion::ExtendHorizon { months, extra_months } if *months > 12 && *extra_months == months - 12
        )));
        assert!(
            suggestions
                .iter()
                .any(|s| matches!(s, Suggestion::RequiredReturn { rate } if *rate > 0.05))
        );
    }

    #[test]
    fn surplus_reports_only_surplus_and_milestones() {
        let params = plan(0.0, 1_000.0, 0.0, 12, 10_000.0);
        let series = simulate(&params);
        let suggestions = suggest(&params, &series, 10_000.0).expect("suggests");

        assert_eq!(
            suggestions[0],
            Suggestion::ShortfallOrSurplus { amount: 2_000.0 }
        );
        assert!(!suggestions.iter().any(|s| matches!(
            s,
            Suggestion::IncreaseContribution { .. }
                | Suggestion::ExtendHorizon { .. }
                | Suggestion::RequiredReturn { .. }
        )));

        let milestones: Vec<(f64, u32)> = suggestions
            .iter()
            .filter_map(|s| match s {
                Suggestion::MilestoneReached { fraction, month } => Some((*fraction, *month)),
                _ => None,
            })
            .collect();
        assert_eq!(milestones, vec![(0.25, 3), (0.5, 5), (0.75, 8), (1.0, 10)]);
    }

    #[test]
    fn unresolved_milestones_are_skipped() {
        let params = plan(0.0, 100.0, 0.0, 30, 10_000.0);
        let series = simulate(&params);
        let suggestions = suggest(&params, &series, 10_000.0).expect("suggests");
        let fractions: Vec<f64> = suggestions
            .iter()
            .filter_map(|s| match s {
                Suggestion::MilestoneReached { fraction, .. } => Some(*fraction),
                _ => None,
            })
            .collect();
        assert_eq!(fractions, vec![0.25]);
    }

    #[test]
    fn stagnant_plan_skips_unreachable_horizon() {
        let params = plan(100.0, 0.0, 0.0, 12, 1_000.0);
        let series = simulate(&params);
        let suggestions = suggest(&params, &series, 1_000.0).expect("suggests");
        assert!(
            !suggestions
                .iter()
                .any(|s| matches!(s, Suggestion::ExtendHorizon { .. }))
        );
        assert!(matches!(
            suggestions[0],
            Suggestion::IncreaseContribution { .. }
        ));
    }

    #[test]
    fn falling_balance_does_not_suggest_shorter_horizon() {
        let params = plan(10_000.0, 0.0, -0.12, 12, 9_950.0);
        let series = simulate(&params);
        let final_balance = series.final_balance().expect("non-empty");
        assert!((final_balance - 8_863.85).abs() < 0.01);

        let suggestions = suggest(&params, &series, 9_950.0).expect("suggests");
        assert!(
            !suggestions
                .iter()
                .any(|s| matches!(s, Suggestion::ExtendHorizon { .. }))
        );
        assert!(matches!(
            suggestions[0],
            Suggestion::IncreaseContribution { .. }
        ));
        assert!(suggestions.iter().any(
            |s| matches!(s, Suggestion::ShortfallOrSurplus { amount } if *amount < 0.0)
        ));
    }

    #[test]
    fn overflowing_growth_skips_contribution_instead_of_failing() {
        let params = plan(0.0, 0.0, 10.0, 1_200, 1_000.0);
        let series = simulate(&params);
        let suggestions = suggest(&params, &series, 1_000.0).expect("suggests");

        assert_eq!(
            suggestions[0],
            Suggestion::ShortfallOrSurplus { amount: -1_000.0 }
        );
        assert!(
            !suggestions
                .iter()
                .any(|s| matches!(s, Suggestion::IncreaseContribution { .. }))
        );
    }
}
