mod args;
mod error;

use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub use args::{Cli, Command, RentVsBuyArgs, RetirementArgs, SolveArgs};
pub use error::{ApiError, InputError};

use args::{
    RentVsBuyPayload, RetirementPayload, SolvePayload, build_goal_config,
    build_rent_vs_buy_inputs, build_retirement_inputs, rent_vs_buy_inputs_from_payload,
    retirement_inputs_from_payload, solve_request_from_payload,
};
use crate::core::{compute_rent_vs_buy, compute_retirement, solve_goal};

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Runs one parsed command line. Analyses are written to stdout as JSON.
pub async fn run(cli: Cli) -> Result<(), ApiError> {
    match cli.command {
        Command::Serve { port } => run_http_server(port).await?,
        Command::RentVsBuy(args) => {
            let inputs = build_rent_vs_buy_inputs(&args)?;
            print_json(&compute_rent_vs_buy(&inputs))?;
        }
        Command::Retirement(args) => {
            let inputs = build_retirement_inputs(&args)?;
            print_json(&compute_retirement(&inputs))?;
        }
        Command::Solve(args) => {
            let inputs = build_retirement_inputs(&args.retirement)?;
            let result = solve_goal(&inputs, build_goal_config(&args))?;
            print_json(&result)?;
        }
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), ApiError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn router() -> Router {
    Router::new()
        .route(
            "/api/rent-vs-buy",
            get(rent_vs_buy_get_handler).post(rent_vs_buy_post_handler),
        )
        .route(
            "/api/retirement",
            get(retirement_get_handler).post(retirement_post_handler),
        )
        .route("/api/retirement/solve", post(solve_post_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "fincalc HTTP API listening");
    info!("Local access: http://127.0.0.1:{port}/api/rent-vs-buy");

    axum::serve(listener, router()).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn rent_vs_buy_get_handler(
    Query(payload): Query<RentVsBuyPayload>,
) -> Result<Response, ApiError> {
    rent_vs_buy_handler_impl(payload)
}

async fn rent_vs_buy_post_handler(
    Json(payload): Json<RentVsBuyPayload>,
) -> Result<Response, ApiError> {
    rent_vs_buy_handler_impl(payload)
}

fn rent_vs_buy_handler_impl(payload: RentVsBuyPayload) -> Result<Response, ApiError> {
    let inputs = rent_vs_buy_inputs_from_payload(payload).inspect_err(|e| {
        warn!(error = %e, "rejected rent-vs-buy request");
    })?;
    let analysis = compute_rent_vs_buy(&inputs);
    info!(
        years = analysis.assumptions.years,
        winner = ?analysis.summary.winner,
        break_even_year = ?analysis.summary.break_even_year,
        "rent-vs-buy computed"
    );
    Ok(json_response(StatusCode::OK, analysis))
}

async fn retirement_get_handler(
    Query(payload): Query<RetirementPayload>,
) -> Result<Response, ApiError> {
    retirement_handler_impl(payload)
}

async fn retirement_post_handler(
    Json(payload): Json<RetirementPayload>,
) -> Result<Response, ApiError> {
    retirement_handler_impl(payload)
}

fn retirement_handler_impl(payload: RetirementPayload) -> Result<Response, ApiError> {
    let inputs = retirement_inputs_from_payload(payload).inspect_err(|e| {
        warn!(error = %e, "rejected retirement request");
    })?;
    let analysis = compute_retirement(&inputs);
    info!(
        current_age = analysis.assumptions.current_age,
        retirement_age = analysis.assumptions.retirement_age,
        on_track = analysis.summary.on_track,
        run_out_age = ?analysis.summary.run_out_age,
        "retirement computed"
    );
    Ok(json_response(StatusCode::OK, analysis))
}

async fn solve_post_handler(Json(payload): Json<SolvePayload>) -> Result<Response, ApiError> {
    let (inputs, config) = solve_request_from_payload(payload)?;
    let result = solve_goal(&inputs, config).inspect_err(|e| {
        warn!(error = %e, "rejected goal solve request");
    })?;
    info!(
        goal = ?result.goal_type,
        feasible = result.feasible,
        solved_value = ?result.solved_value,
        iterations = result.iterations.len(),
        "goal solved"
    );
    Ok(json_response(StatusCode::OK, result))
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
