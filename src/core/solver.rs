use tracing::debug;

use super::engine::{final_balance, step_balance};
use super::error::PlanError;
use super::types::PlanParameters;

/// Hard cap for the forward month search: 50 years.
pub const DEFAULT_MAX_MONTHS: u32 = 600;

/// Absolute tolerance in currency units; a solve is accepted when it is within this
/// or within [`RELATIVE_TOLERANCE`] of the target, whichever is looser.
pub const ABSOLUTE_TOLERANCE: f64 = 0.01;
pub const RELATIVE_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnSearchConfig {
    pub search_min: f64,
    pub search_max: f64,
    pub max_iterations: u32,
}

impl Default for ReturnSearchConfig {
    fn default() -> Self {
        Self {
            search_min: -0.99,
            search_max: 1.0,
            max_iterations: 200,
        }
    }
}

pub fn within_tolerance(balance: f64, target: f64) -> bool {
    let diff = (balance - target).abs();
    diff <= ABSOLUTE_TOLERANCE || diff <= RELATIVE_TOLERANCE * target.abs()
}

/// Monthly contribution that lands the plan on `target_goal` at the horizon.
///
/// Solves `B0*g + c*(g - 1)/r*(1 + r) = target` with `g = (1 + r)^n`, the closed form
/// of the contribute-then-compound recurrence. `r == 0` takes the linear branch
/// `B0 + c*n`. Returns 0 when the starting balance alone already gets there.
pub fn required_monthly_contribution(
    params: &PlanParameters,
    target_goal: f64,
) -> Result<f64, PlanError> {
    validate_target(target_goal)?;

    let months = params.horizon_months() as f64;
    let rate = params.monthly_rate();
    let (grown_start, annuity_factor) = if rate == 0.0 {
        (params.starting_balance(), months)
    } else {
        // exp_m1/ln_1p keep (1+r)^n - 1 accurate for rates close to zero.
        let growth_minus_one = (months * rate.ln_1p()).exp_m1();
        let start = params.starting_balance();
        // 0 * inf is NaN once the growth factor overflows.
        let grown_start = if start == 0.0 {
            0.0
        } else {
            start * (1.0 + growth_minus_one)
        };
        (grown_start, growth_minus_one / rate * (1.0 + rate))
    };

    if !annuity_factor.is_finite() || annuity_factor <= 0.0 || !grown_start.is_finite() {
        return Err(PlanError::DivisionDegeneracy(format!(
            "annuity factor {annuity_factor} for monthly rate {rate} over {months} months"
        )));
    }

    Ok(((target_goal - grown_start) / annuity_factor).max(0.0))
}

/// First month at which the balance reaches the plan's target, searching forward one
/// month at a time. `Some(0)` when the starting balance already meets it, `None` when
/// `max_months` pass without reaching it.
pub fn months_to_reach_goal(params: &PlanParameters, max_months: u32) -> Option<u32> {
    let target = params.target_goal();
    let rate = params.monthly_rate();
    let contribution = params.monthly_contribution();

    let mut balance = params.starting_balance();
    if balance >= target {
        return Some(0);
    }
    for month in 1..=max_months {
        balance = step_balance(balance, contribution, rate);
        if balance >= target {
            return Some(month);
        }
    }
    None
}

/// Annual return (fraction) that lands the plan on `target_goal`, via bisection over
/// the default bracket.
pub fn required_annual_return(
    params: &PlanParameters,
    target_goal: f64,
) -> Result<f64, PlanError> {
    required_annual_return_with(params, target_goal, ReturnSearchConfig::default())
}

pub fn required_annual_return_with(
    params: &PlanParameters,
    target_goal: f64,
    config: ReturnSearchConfig,
) -> Result<f64, PlanError> {
    validate_config(config)?;
    validate_target(target_goal)?;

    let evaluate = |annual_rate: f64| -> Result<f64, PlanError> {
        Ok(final_balance(&params.with_annual_return_rate(annual_rate)?))
    };

    let low = evaluate(config.search_min)?;
    if within_tolerance(low, target_goal) {
        return Ok(config.search_min);
    }
    let high = evaluate(config.search_max)?;
    if within_tolerance(high, target_goal) {
        return Ok(config.search_max);
    }
    if low > target_goal || high < target_goal {
        return Err(PlanError::NoSolution(format!(
            "target {target_goal:.2} outside reachable range {low:.2}..{high:.2} for annual returns {}..{}",
            config.search_min, config.search_max
        )));
    }

    let mut lo = config.search_min;
    let mut hi = config.search_max;
    for iteration in 1..=config.max_iterations {
        let mid = (lo + hi) * 0.5;
        let balance = evaluate(mid)?;
        debug!(iteration, lo, hi, mid, balance, "required return bisection");

        if within_tolerance(balance, target_goal) {
            return Ok(mid);
        }
        if balance < target_goal {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    Err(PlanError::NoSolution(format!(
        "required return did not converge within {} iterations",
        config.max_iterations
    )))
}

fn validate_target(target_goal: f64) -> Result<(), PlanError> {
    if !target_goal.is_finite() || target_goal <= 0.0 {
        return Err(PlanError::invalid("targetGoal", "must be > 0"));
    }
    Ok(())
}

fn validate_config(config: ReturnSearchConfig) -> Result<(), PlanError> {
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err(PlanError::invalid("searchBounds", "must be finite"));
    }
    if config.search_min < -1.0 {
        return Err(PlanError::invalid("searchMin", "must be >= -1"));
    }
    if config.search_max <= config.search_min {
        return Err(PlanError::invalid(
            "searchMax",
            "must be greater than searchMin",
        ));
    }
    if config.max_iterations == 0 {
        return Err(PlanError::invalid("maxIterations", "must be > 0"));
    }
    Ok(())
}
