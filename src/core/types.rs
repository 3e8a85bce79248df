use serde::Serialize;

use super::error::PlanError;

/// Longest horizon (and debt schedule) accepted: 100 years of monthly points.
pub const MAX_HORIZON_MONTHS: u32 = 1_200;

/// Inputs for one savings projection. Construct through [`PlanParameters::new`];
/// every instance that exists has already been validated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanParameters {
    starting_balance: f64,
    monthly_contribution: f64,
    annual_return_rate: f64,
    horizon_months: u32,
    target_goal: f64,
}

impl PlanParameters {
    /// `annual_return_rate` is a fraction (0.05 = 5%). Negative rates down to -1 are valid.
    pub fn new(
        starting_balance: f64,
        monthly_contribution: f64,
        annual_return_rate: f64,
        horizon_months: u32,
        target_goal: f64,
    ) -> Result<Self, PlanError> {
        if !starting_balance.is_finite() || starting_balance < 0.0 {
            return Err(PlanError::invalid("startingBalance", "must be >= 0"));
        }
        if !monthly_contribution.is_finite() || monthly_contribution < 0.0 {
            return Err(PlanError::invalid("monthlyContribution", "must be >= 0"));
        }
        if !annual_return_rate.is_finite() || annual_return_rate < -1.0 {
            return Err(PlanError::invalid("annualReturnRate", "must be >= -1"));
        }
        if horizon_months == 0 || horizon_months > MAX_HORIZON_MONTHS {
            return Err(PlanError::invalid(
                "horizonMonths",
                format!("must be between 1 and {MAX_HORIZON_MONTHS}"),
            ));
        }
        if !target_goal.is_finite() || target_goal <= 0.0 {
            return Err(PlanError::invalid("targetGoal", "must be > 0"));
        }
        Ok(Self {
            starting_balance,
            monthly_contribution,
            annual_return_rate,
            horizon_months,
            target_goal,
        })
    }

    pub fn starting_balance(&self) -> f64 {
        self.starting_balance
    }

    pub fn monthly_contribution(&self) -> f64 {
        self.monthly_contribution
    }

    pub fn annual_return_rate(&self) -> f64 {
        self.annual_return_rate
    }

    pub fn horizon_months(&self) -> u32 {
        self.horizon_months
    }

    pub fn target_goal(&self) -> f64 {
        self.target_goal
    }

    pub fn monthly_rate(&self) -> f64 {
        self.annual_return_rate / 12.0
    }

    pub fn with_monthly_contribution(self, monthly_contribution: f64) -> Result<Self, PlanError> {
        Self::new(
            self.starting_balance,
            monthly_contribution,
            self.annual_return_rate,
            self.horizon_months,
            self.target_goal,
        )
    }

    pub fn with_annual_return_rate(self, annual_return_rate: f64) -> Result<Self, PlanError> {
        Self::new(
            self.starting_balance,
            self.monthly_contribution,
            annual_return_rate,
            self.horizon_months,
            self.target_goal,
        )
    }

    pub fn with_target_goal(self, target_goal: f64) -> Result<Self, PlanError> {
        Self::new(
            self.starting_balance,
            self.monthly_contribution,
            self.annual_return_rate,
            self.horizon_months,
            target_goal,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePoint {
    pub month: u32,
    pub balance: f64,
    /// Starting balance plus every contribution made up to and including this month.
    pub contributed: f64,
}

/// Month-end balances for months `1..=horizon_months`, no gaps.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSeries {
    pub points: Vec<BalancePoint>,
}

impl BalanceSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn final_balance(&self) -> Option<f64> {
        self.points.last().map(|p| p.balance)
    }

    pub fn balances(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.balance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub final_balance: f64,
    pub total_contributed: f64,
    pub total_growth: f64,
    pub achievement_ratio: f64,
    pub shortfall: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtParameters {
    principal: f64,
    annual_apr: f64,
    minimum_monthly_payment: f64,
    extra_monthly_payment: f64,
}

impl DebtParameters {
    /// `annual_apr` is a fraction (0.18 = 18%).
    pub fn new(
        principal: f64,
        annual_apr: f64,
        minimum_monthly_payment: f64,
        extra_monthly_payment: f64,
    ) -> Result<Self, PlanError> {
        for (field, value) in [
            ("principal", principal),
            ("annualApr", annual_apr),
            ("minimumMonthlyPayment", minimum_monthly_payment),
            ("extraMonthlyPayment", extra_monthly_payment),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PlanError::invalid(field, "must be >= 0"));
            }
        }
        Ok(Self {
            principal,
            annual_apr,
            minimum_monthly_payment,
            extra_monthly_payment,
        })
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn annual_apr(&self) -> f64 {
        self.annual_apr
    }

    pub fn minimum_monthly_payment(&self) -> f64 {
        self.minimum_monthly_payment
    }

    pub fn extra_monthly_payment(&self) -> f64 {
        self.extra_monthly_payment
    }

    pub fn total_monthly_payment(&self) -> f64 {
        self.minimum_monthly_payment + self.extra_monthly_payment
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtPoint {
    pub month: u32,
    pub balance: f64,
    pub interest: f64,
    pub payment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtSeries {
    pub points: Vec<DebtPoint>,
    /// `Some(0)` when there was nothing to pay off.
    pub payoff_month: Option<u32>,
    pub total_interest: f64,
    pub total_paid: f64,
}

/// One labelled plan, run on its own and carrying its own goal and ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub label: String,
    pub parameters: PlanParameters,
    pub series: BalanceSeries,
    pub final_balance: f64,
    pub target_goal: f64,
    /// Unbounded; capping for display is up to the caller.
    pub achievement_ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub fraction: f64,
    pub month: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Suggestion {
    #[serde(rename_all = "camelCase")]
    IncreaseContribution {
        required_monthly: f64,
        increase_by: f64,
    },
    #[serde(rename_all = "camelCase")]
    ExtendHorizon { months: u32, extra_months: u32 },
    RequiredReturn { rate: f64 },
    /// Negative on shortfall, positive on surplus.
    ShortfallOrSurplus { amount: f64 },
    MilestoneReached { fraction: f64, month: u32 },
}
