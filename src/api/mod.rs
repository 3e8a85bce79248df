use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    DEFAULT_MAX_MONTHS, DebtParameters, MAX_HORIZON_MONTHS, PlanError, PlanParameters,
    ScenarioComparison, ScenarioInput, build_plan_report, compare, months_to_reach_goal, required_annual_return,
    required_monthly_contribution, simulate_debt,
};

#[derive(Parser, Debug)]
#[command(
    name = "sailo",
    about = "Savings goal projection, scenario comparison and debt payoff schedules"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the JSON HTTP API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print a full plan report as JSON.
    Project(PlanArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[arg(long, default_value_t = 1_000.0, allow_negative_numbers = true)]
    starting_balance: f64,
    #[arg(long, default_value_t = 500.0, allow_negative_numbers = true)]
    monthly_contribution: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        allow_negative_numbers = true,
        help = "Expected annual return in percent"
    )]
    annual_return: f64,
    #[arg(long, default_value_t = 120, allow_negative_numbers = true)]
    horizon_months: i64,
    #[arg(long, default_value_t = 100_000.0, allow_negative_numbers = true)]
    target_goal: f64,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Outstanding debt; enables the payoff schedule"
    )]
    debt_principal: Option<f64>,
    #[arg(
        long,
        default_value_t = 0.0,
        allow_negative_numbers = true,
        help = "Debt APR in percent"
    )]
    debt_apr: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    debt_minimum_payment: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    debt_extra_payment: f64,
    #[arg(
        long,
        allow_negative_numbers = true,
        help = "Months to schedule; defaults to the horizon"
    )]
    debt_months: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    label: Option<String>,
    starting_balance: Option<f64>,
    monthly_contribution: Option<f64>,
    annual_return: Option<f64>,
    horizon_months: Option<i64>,
    target_goal: Option<f64>,
    debt_principal: Option<f64>,
    debt_apr: Option<f64>,
    debt_minimum_payment: Option<f64>,
    debt_extra_payment: Option<f64>,
    debt_months: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ScenariosPayload {
    target_goal: Option<f64>,
    scenarios: Vec<PlanPayload>,
}

#[derive(Debug)]
struct PlanRequest {
    label: Option<String>,
    plan: PlanParameters,
    debt: Option<(DebtParameters, u32)>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveResponse {
    target_goal: f64,
    required_monthly_contribution: Option<f64>,
    months_to_reach_goal: Option<u32>,
    required_annual_return: Option<f64>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Horizon and debt schedules are both capped at [`MAX_HORIZON_MONTHS`].
fn months_from(field: &'static str, value: i64) -> Result<u32, PlanError> {
    match u32::try_from(value) {
        Ok(months) if (1..=MAX_HORIZON_MONTHS).contains(&months) => Ok(months),
        _ => Err(PlanError::InvalidParameter {
            field,
            reason: format!(
                "must be a whole number of months between 1 and {MAX_HORIZON_MONTHS}, got {value}"
            ),
        }),
    }
}

fn build_inputs(args: PlanArgs) -> Result<PlanRequest, PlanError> {
    let horizon_months = months_from("horizonMonths", args.horizon_months)?;
    let plan = PlanParameters::new(
        args.starting_balance,
        args.monthly_contribution,
        args.annual_return / 100.0,
        horizon_months,
        args.target_goal,
    )?;

    let debt = match args.debt_principal {
        Some(principal) => {
            let months = match args.debt_months {
                Some(months) => months_from("debtMonths", months)?,
                None => horizon_months,
            };
            let debt = DebtParameters::new(
                principal,
                args.debt_apr / 100.0,
                args.debt_minimum_payment,
                args.debt_extra_payment,
            )?;
            Some((debt, months))
        }
        None => None,
    };

    Ok(PlanRequest {
        label: None,
        plan,
        debt,
    })
}

/// Runs the `project` subcommand and returns the JSON it prints.
pub fn run_project(args: PlanArgs) -> Result<String, String> {
    let request = build_inputs(args).map_err(|e| e.to_string())?;
    let report = build_plan_report(
        &request.plan,
        request.debt.as_ref().map(|(debt, months)| (debt, *months)),
    )
    .map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&report).map_err(|e| format!("failed to encode report: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/scenarios", post(scenarios_handler))
        .route("/api/solve", post(solve_handler))
        .route("/api/debt", post(debt_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "sailo HTTP API listening");

    axum::serve(listener, app).await
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(payload: Result<Query<PlanPayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => project_handler_impl(payload),
        Err(rejection) => rejection_response(rejection.status(), &rejection.body_text()),
    }
}

async fn project_post_handler(payload: Result<Json<PlanPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => project_handler_impl(payload),
        Err(rejection) => json_rejection_response(rejection),
    }
}

fn project_handler_impl(payload: PlanPayload) -> Response {
    let request = match plan_request_from_payload(payload, None) {
        Ok(request) => request,
        Err(err) => return plan_error_response(err),
    };
    let debt = request.debt.as_ref().map(|(debt, months)| (debt, *months));
    match build_plan_report(&request.plan, debt) {
        Ok(report) => {
            info!(
                final_balance = report.summary.final_balance,
                achievement_ratio = report.summary.achievement_ratio,
                "plan projected"
            );
            json_response(StatusCode::OK, report)
        }
        Err(err) => plan_error_response(err),
    }
}

async fn scenarios_handler(payload: Result<Json<ScenariosPayload>, JsonRejection>) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection_response(rejection),
    };
    match scenario_comparison_from_payload(payload) {
        Ok(comparison) => json_response(StatusCode::OK, comparison),
        Err(err) => plan_error_response(err),
    }
}

async fn solve_handler(payload: Result<Json<PlanPayload>, JsonRejection>) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection_response(rejection),
    };
    match plan_request_from_payload(payload, None) {
        Ok(request) => json_response(StatusCode::OK, solve_plan(&request.plan)),
        Err(err) => plan_error_response(err),
    }
}

async fn debt_handler(payload: Result<Json<PlanPayload>, JsonRejection>) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return json_rejection_response(rejection),
    };
    if payload.debt_principal.is_none() {
        return plan_error_response(PlanError::InvalidParameter {
            field: "debtPrincipal",
            reason: "is required".to_string(),
        });
    }
    match plan_request_from_payload(payload, None) {
        Ok(PlanRequest {
            debt: Some((debt, months)),
            ..
        }) => json_response(StatusCode::OK, simulate_debt(&debt, months)),
        Ok(_) => error_response(StatusCode::BAD_REQUEST, "debtPrincipal is required"),
        Err(err) => plan_error_response(err),
    }
}

fn solve_plan(plan: &PlanParameters) -> SolveResponse {
    let target_goal = plan.target_goal();
    SolveResponse {
        target_goal,
        required_monthly_contribution: required_monthly_contribution(plan, target_goal).ok(),
        months_to_reach_goal: months_to_reach_goal(plan, DEFAULT_MAX_MONTHS),
        required_annual_return: required_annual_return(plan, target_goal).ok(),
    }
}

fn scenario_comparison_from_payload(
    payload: ScenariosPayload,
) -> Result<ScenarioComparison, PlanError> {
    if payload.scenarios.is_empty() {
        return Err(PlanError::InvalidParameter {
            field: "scenarios",
            reason: "at least one scenario is required".to_string(),
        });
    }
    let inputs = payload
        .scenarios
        .into_iter()
        .map(|scenario| {
            let request = plan_request_from_payload(scenario, payload.target_goal)?;
            Ok(ScenarioInput {
                label: request.label,
                parameters: request.plan,
            })
        })
        .collect::<Result<Vec<_>, PlanError>>()?;
    Ok(compare(&inputs))
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn plan_error_status(err: &PlanError) -> StatusCode {
    match err {
        PlanError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
        PlanError::NoSolution(_) | PlanError::DivisionDegeneracy(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn plan_error_response(err: PlanError) -> Response {
    let status = plan_error_status(&err);
    warn!(%err, status = status.as_u16(), "request rejected");
    error_response(status, &err.to_string())
}

fn json_rejection_response(rejection: JsonRejection) -> Response {
    rejection_response(rejection.status(), &rejection.body_text())
}

/// Extractor failures (bad JSON, bad query string) keep axum's status but use our body.
fn rejection_response(status: StatusCode, msg: &str) -> Response {
    warn!(error = msg, status = status.as_u16(), "malformed request");
    error_response(status, msg)
}

#[cfg(test)]
fn plan_request_from_json(json: &str) -> Result<PlanRequest, String> {
    let payload = serde_json::from_str::<PlanPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    plan_request_from_payload(payload, None).map_err(|e| e.to_string())
}

/// Overlays the payload on the CLI defaults. `fallback_goal` fills in a missing
/// `targetGoal` (used for scenario batches sharing one goal).
fn plan_request_from_payload(
    payload: PlanPayload,
    fallback_goal: Option<f64>,
) -> Result<PlanRequest, PlanError> {
    let mut args = default_args_for_api();

    if let Some(v) = payload.starting_balance {
        args.starting_balance = v;
    }
    if let Some(v) = payload.monthly_contribution {
        args.monthly_contribution = v;
    }
    if let Some(v) = payload.annual_return {
        args.annual_return = v;
    }
    if let Some(v) = payload.horizon_months {
        args.horizon_months = v;
    }
    if let Some(v) = payload.target_goal.or(fallback_goal) {
        args.target_goal = v;
    }
    args.debt_principal = payload.debt_principal;
    if let Some(v) = payload.debt_apr {
        args.debt_apr = v;
    }
    if let Some(v) = payload.debt_minimum_payment {
        args.debt_minimum_payment = v;
    }
    if let Some(v) = payload.debt_extra_payment {
        args.debt_extra_payment = v;
    }
    args.debt_months = payload.debt_months;

    let mut request = build_inputs(args)?;
    request.label = payload.label;
    Ok(request)
}

fn default_args_for_api() -> PlanArgs {
    PlanArgs {
        starting_balance: 1_000.0,
        monthly_contribution: 500.0,
        annual_return: 5.0,
        horizon_months: 120,
        target_goal: 100_000.0,
        debt_principal: None,
        debt_apr: 0.0,
        debt_minimum_payment: 0.0,
        debt_extra_payment: 0.0,
        debt_months: None,
    }
}
