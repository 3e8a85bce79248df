#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::engine::simulate;
use super::types::{PlanParameters, Scenario};

/// One entry to compare. Unlabelled entries are named by position.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioInput {
    pub label: Option<String>,
    pub parameters: PlanParameters,
}

impl ScenarioInput {
    pub fn new(parameters: PlanParameters) -> Self {
        Self {
            label: None,
            parameters,
        }
    }

    pub fn labelled(label: impl Into<String>, parameters: PlanParameters) -> Self {
        Self {
            label: Some(label.into()),
            parameters,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComparison {
    pub scenarios: Vec<Scenario>,
    pub best_index: Option<usize>,
    pub first_meeting_goal: Option<usize>,
}

/// Runs every input on its own; output order matches input order.
pub fn run_all(inputs: &[ScenarioInput]) -> Vec<Scenario> {
    #[cfg(feature = "parallel")]
    let scenarios: Vec<Scenario> = inputs
        .par_iter()
        .enumerate()
        .map(|(idx, input)| run_one(idx, input))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let scenarios: Vec<Scenario> = inputs
        .iter()
        .enumerate()
        .map(|(idx, input)| run_one(idx, input))
        .collect();

    scenarios
}

pub fn compare(inputs: &[ScenarioInput]) -> ScenarioComparison {
    let scenarios = run_all(inputs);
    let best_index = scenarios
        .iter()
        .enumerate()
        .rev()
        .max_by(|(_, a), (_, b)| a.final_balance.total_cmp(&b.final_balance))
        .map(|(idx, _)| idx);
    let first_meeting_goal = scenarios.iter().position(|s| s.achievement_ratio >= 1.0);

    ScenarioComparison {
        scenarios,
        best_index,
        first_meeting_goal,
    }
}

fn run_one(idx: usize, input: &ScenarioInput) -> Scenario {
    let params = input.parameters;
    let series = simulate(&params);
    let final_balance = series
        .final_balance()
        .unwrap_or(params.starting_balance());
    let label = input
        .label
        .clone()
        .unwrap_or_else(|| format!("Scenario {}", idx + 1));
    debug!(%label, final_balance, "scenario evaluated");

    Scenario {
        label,
        parameters: params,
        series,
        final_balance,
        target_goal: params.target_goal(),
        achievement_ratio: final_balance / params.target_goal(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert_eq, proptest};

    fn plan(start: f64, contribution: f64, rate: f64, months: u32, goal: f64) -> PlanParameters {
        PlanParameters::new(start, contribution, rate, months, goal).expect("valid plan")
    }

    #[test]
    fn run_all_preserves_order_and_labels() {
        let inputs = vec![
            ScenarioInput::new(plan(0.0, 100.0, 0.0, 10, 1_000.0)),
            ScenarioInput::labelled("Aggressive", plan(0.0, 300.0, 0.0, 10, 2_000.0)),
            ScenarioInput::new(plan(500.0, 0.0, 0.0, 10, 250.0)),
        ];
        let scenarios = run_all(&inputs);

        assert_eq!(scenarios.len(), 3);
        assert_eq!(scenarios[0].label, "Scenario 1");
        assert_eq!(scenarios[1].label, "Aggressive");
        assert_eq!(scenarios[2].label, "Scenario 3");

        assert_eq!(scenarios[0].final_balance, 1_000.0);
        assert_eq!(scenarios[1].final_balance, 3_000.0);
        assert_eq!(scenarios[2].final_balance, 500.0);

        assert_eq!(scenarios[0].achievement_ratio, 1.0);
        assert_eq!(scenarios[1].achievement_ratio, 1.5);
        assert_eq!(scenarios[2].achievement_ratio, 2.0);
    }

    #[test]
    fn compare_picks_highest_balance_and_first_goal_met() {
        let inputs = vec![
            ScenarioInput::new(plan(0.0, 50.0, 0.0, 10, 1_000.0)),
            ScenarioInput::new(plan(0.0, 300.0, 0.0, 10, 2_000.0)),
            ScenarioInput::new(plan(0.0, 300.0, 0.0, 10, 9_000.0)),
        ];
        let comparison = compare(&inputs);
        assert_eq!(comparison.best_index, Some(1));
        assert_eq!(comparison.first_meeting_goal, Some(1));
    }

    #[test]
    fn compare_handles_empty_input() {
        let comparison = compare(&[]);
        assert!(comparison.scenarios.is_empty());
        assert_eq!(comparison.best_index, None);
        assert_eq!(comparison.first_meeting_goal, None);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(24))]

        #[test]
        fn prop_scenario_ratio_independent_of_neighbours(
            contribution in 0u32..2_000,
            rate_bp in -1_000i32..1_500,
            months in 1u32..240,
            goal in 1_000u32..500_000,
            other_contribution in 0u32..2_000,
            other_goal in 1_000u32..500_000,
        ) {
            let subject = plan(1_000.0, contribution as f64, rate_bp as f64 / 10_000.0, months, goal as f64);
            let other = plan(0.0, other_contribution as f64, 0.07, 60, other_goal as f64);

            let alone = run_all(&[ScenarioInput::new(subject)]);
            let mixed = run_all(&[
                ScenarioInput::new(other),
                ScenarioInput::new(subject),
                ScenarioInput::new(other),
            ]);

            prop_assert_eq!(alone[0].final_balance, mixed[1].final_balance);
            prop_assert_eq!(alone[0].achievement_ratio, mixed[1].achievement_ratio);
            prop_assert_eq!(mixed[1].achievement_ratio, mixed[1].final_balance / goal as f64);
        }
    }
}
