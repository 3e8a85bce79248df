use super::error::PlanError;
use super::types::{BalanceSeries, Milestone};

pub const DEFAULT_FRACTIONS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];

/// First month each `target_goal * fraction` threshold is reached, in the order the
/// fractions were given. Scans the series once.
///
/// Precondition (not checked): the balance never falls from one month to the next.
/// Each fraction still gets its own first crossing on a dipping series, but the months
/// no longer read as a progression.
pub fn milestones(
    series: &BalanceSeries,
    target_goal: f64,
    fractions: &[f64],
) -> Result<Vec<Milestone>, PlanError> {
    if !target_goal.is_finite() || target_goal <= 0.0 {
        return Err(PlanError::invalid("targetGoal", "must be > 0"));
    }
    if let Some(bad) = fractions
        .iter()
        .find(|f| !f.is_finite() || **f <= 0.0 || **f > 1.0)
    {
        return Err(PlanError::invalid(
            "fractions",
            format!("{bad} is outside (0, 1]"),
        ));
    }

    let mut order: Vec<usize> = (0..fractions.len()).collect();
    order.sort_by(|a, b| fractions[*a].total_cmp(&fractions[*b]));

    let mut reached = vec![None; fractions.len()];
    let mut next = 0;
    for point in &series.points {
        while next < order.len() && point.balance >= target_goal * fractions[order[next]] {
            reached[order[next]] = Some(point.month);
            next += 1;
        }
        if next == order.len() {
            break;
        }
    }

    Ok(fractions
        .iter()
        .zip(reached)
        .map(|(&fraction, month)| Milestone { fraction, month })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::simulate;
    use crate::core::types::{BalancePoint, PlanParameters};
    use proptest::prelude::{prop_assert, proptest};

    fn series_from(balances: &[f64]) -> BalanceSeries {
        BalanceSeries {
            points: balances
                .iter()
                .enumerate()
                .map(|(idx, &balance)| BalancePoint {
                    month: idx as u32 + 1,
                    balance,
                    contributed: 0.0,
                })
                .collect(),
        }
    }

    #[test]
    fn milestones_report_first_month_at_or_above_threshold() {
        let series = series_from(&[2_000.0, 4_000.0, 6_000.0, 8_500.0, 10_500.0]);
        let hits = milestones(&series, 10_000.0, &DEFAULT_FRACTIONS).expect("valid");
        let months: Vec<Option<u32>> = hits.iter().map(|m| m.month).collect();
        assert_eq!(months, vec![Some(2), Some(3), Some(4), Some(5)]);
    }

    #[test]
    fn milestones_leave_unreached_fractions_empty() {
        let series = series_from(&[1_000.0, 2_000.0, 3_000.0]);
        let hits = milestones(&series, 10_000.0, &DEFAULT_FRACTIONS).expect("valid");
        assert_eq!(hits[0].month, Some(3));
        assert!(hits[1..].iter().all(|m| m.month.is_none()));
    }

    #[test]
    fn milestones_keep_caller_order() {
        let series = series_from(&[3_000.0, 6_000.0, 11_000.0]);
        let hits = milestones(&series, 10_000.0, &[1.0, 0.25]).expect("valid");
        assert_eq!(hits[0].fraction, 1.0);
        assert_eq!(hits[0].month, Some(3));
        assert_eq!(hits[1].fraction, 0.25);
        assert_eq!(hits[1].month, Some(1));
    }

    #[test]
    fn milestones_reject_out_of_range_fraction() {
        let series = series_from(&[1.0]);
        assert!(milestones(&series, 10.0, &[0.0]).is_err());
        assert!(milestones(&series, 10.0, &[1.5]).is_err());
        assert!(milestones(&series, 0.0, &[0.5]).is_err());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(32))]

        #[test]
        fn prop_later_fractions_never_resolve_first(
            start in 0u32..20_000,
            contribution in 0u32..2_000,
            rate_bp in 0i32..1_500,
            months in 1u32..240,
            goal in 1_000u32..200_000,
        ) {
            let params = PlanParameters::new(
                start as f64,
                contribution as f64,
                rate_bp as f64 / 10_000.0,
                months,
                goal as f64,
            ).expect("valid plan");
            let series = simulate(&params);
            let hits = milestones(&series, goal as f64, &DEFAULT_FRACTIONS).expect("valid");
            for pair in hits.windows(2) {
                match (pair[0].month, pair[1].month) {
                    (Some(a), Some(b)) => prop_assert!(a <= b),
                    (None, Some(_)) => prop_assert!(false, "later fraction resolved first"),
                    _ => {}
                }
            }
        }
    }
}
