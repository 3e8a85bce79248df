use super::types::{
    BalancePoint, BalanceSeries, DebtParameters, DebtPoint, DebtSeries, PlanParameters,
    ProjectionSummary,
};

/// One month of the savings recurrence: contribute first, then compound.
///
/// Every consumer (solver, scenarios, suggestions) must go through this step so the
/// ordering stays identical everywhere.
#[inline]
pub(crate) fn step_balance(balance: f64, contribution: f64, monthly_rate: f64) -> f64 {
    (balance + contribution) * (1.0 + monthly_rate)
}

/// Month-end balances for months `1..=horizon_months`.
pub fn simulate(params: &PlanParameters) -> BalanceSeries {
    let rate = params.monthly_rate();
    let contribution = params.monthly_contribution();
    let mut balance = params.starting_balance();
    let mut contributed = params.starting_balance();

    let mut points = Vec::with_capacity(params.horizon_months() as usize);
    for month in 1..=params.horizon_months() {
        balance = step_balance(balance, contribution, rate);
        contributed += contribution;
        points.push(BalancePoint {
            month,
            balance,
            contributed,
        });
    }
    BalanceSeries { points }
}

/// Same result as `simulate(params).final_balance()` without building the series.
pub(crate) fn final_balance(params: &PlanParameters) -> f64 {
    let rate = params.monthly_rate();
    let contribution = params.monthly_contribution();
    (0..params.horizon_months()).fold(params.starting_balance(), |balance, _| {
        step_balance(balance, contribution, rate)
    })
}

pub fn summarize(params: &PlanParameters, series: &BalanceSeries) -> ProjectionSummary {
    let final_balance = series
        .final_balance()
        .unwrap_or(params.starting_balance());
    let total_contributed = params.starting_balance()
        + params.monthly_contribution() * params.horizon_months() as f64;
    ProjectionSummary {
        final_balance,
        total_contributed,
        total_growth: final_balance - total_contributed,
        achievement_ratio: final_balance / params.target_goal(),
        shortfall: (params.target_goal() - final_balance).max(0.0),
    }
}

/// Month-by-month payoff schedule. Interest accrues on the opening balance, then the
/// combined payment is applied; a zero balance is absorbing.
pub fn simulate_debt(debt: &DebtParameters, months: u32) -> DebtSeries {
    let monthly_apr = debt.annual_apr() / 12.0;
    let payment_due = debt.total_monthly_payment();

    let mut balance = debt.principal();
    let mut payoff_month = (balance <= 0.0).then_some(0);
    let mut total_interest = 0.0;
    let mut total_paid = 0.0;
    let mut points = Vec::with_capacity(months as usize);

    for month in 1..=months {
        let mut interest = 0.0;
        let mut payment = 0.0;
        if balance > 0.0 {
            interest = balance * monthly_apr;
            let owed = balance + interest;
            payment = payment_due.min(owed);
            balance = (owed - payment).max(0.0);
        }
        if payoff_month.is_none() && balance <= 0.0 {
            payoff_month = Some(month);
        }
        total_interest += interest;
        total_paid += payment;
        points.push(DebtPoint {
            month,
            balance,
            interest,
            payment,
        });
    }

    DebtSeries {
        points,
        payoff_month,
        total_interest,
        total_paid,
    }
}
