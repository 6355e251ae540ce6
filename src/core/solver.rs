use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use super::{RetirementInputs, compute_retirement};

pub const MAX_SOLVE_ITERATIONS: u32 = 1_000;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalType {
    /// Smallest starting annual contribution that puts the plan on track.
    RequiredContribution,
    /// Largest monthly spend in today's money that never depletes the portfolio.
    MaxMonthlySpend,
}

#[derive(Debug, Clone, Copy)]
pub struct GoalSolveConfig {
    pub goal_type: GoalType,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub target_gap: f64,
    pub run_out_age: Option<u32>,
    pub meets_goal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveResult {
    pub goal_type: GoalType,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub solved_value: Option<f64>,
    pub achieved_target_gap: Option<f64>,
    pub achieved_run_out_age: Option<u32>,
    pub iterations: Vec<GoalSolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("search bounds must be finite")]
    NonFiniteBounds,
    #[error("search_max must be greater than search_min")]
    EmptySearchRange,
    #[error("tolerance must be > 0")]
    InvalidTolerance,
    #[error("max_iterations must be > 0")]
    NoIterations,
    #[error("max_iterations must be <= {MAX_SOLVE_ITERATIONS}")]
    TooManyIterations,
}

#[derive(Debug, Clone, Copy)]
struct CandidateEval {
    target_gap: f64,
    run_out_age: Option<u32>,
    meets_goal: bool,
}

pub fn solve_goal(
    inputs: &RetirementInputs,
    config: GoalSolveConfig,
) -> Result<GoalSolveResult, SolveError> {
    validate_config(config)?;

    let mut iterations = Vec::with_capacity(config.max_iterations as usize);
    let low_eval = evaluate_candidate(inputs, config.goal_type, config.search_min);
    let high_eval = evaluate_candidate(inputs, config.goal_type, config.search_max);

    let mut solved_value = None;
    let mut converged = false;
    let feasible;
    let message;

    match config.goal_type {
        GoalType::RequiredContribution => {
            if low_eval.meets_goal {
                solved_value = Some(config.search_min);
                converged = true;
                feasible = true;
                message = "Already on track at the lower contribution bound.".to_string();
            } else if !high_eval.meets_goal {
                feasible = false;
                message = "No contribution within the search bounds reaches the target.".to_string();
            } else {
                let (value, did_converge) = bisect(inputs, config, true, &mut iterations);
                solved_value = Some(value);
                converged = did_converge;
                feasible = true;
                message = if converged {
                    "Solved required contribution.".to_string()
                } else {
                    "Reached max iterations before tolerance was met; returning best estimate."
                        .to_string()
                };
            }
        }
        GoalType::MaxMonthlySpend => {
            if !low_eval.meets_goal {
                feasible = false;
                message = "Even the lower spending bound depletes the portfolio.".to_string();
            } else if high_eval.meets_goal {
                solved_value = Some(config.search_max);
                converged = true;
                feasible = true;
                message =
                    "Upper spending bound is still sustainable; increase search max for higher spend."
                        .to_string();
            } else {
                let (value, did_converge) = bisect(inputs, config, false, &mut iterations);
                solved_value = Some(value);
                converged = did_converge;
                feasible = true;
                message = if converged {
                    "Solved maximum sustainable monthly spend.".to_string()
                } else {
                    "Reached max iterations before tolerance was met; returning best estimate."
                        .to_string()
                };
            }
        }
    }

    let achieved = solved_value.map(|value| evaluate_candidate(inputs, config.goal_type, value));

    Ok(GoalSolveResult {
        goal_type: config.goal_type,
        search_min: config.search_min,
        search_max: config.search_max,
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
        solved_value,
        achieved_target_gap: achieved.map(|eval| eval.target_gap),
        achieved_run_out_age: achieved.and_then(|eval| eval.run_out_age),
        iterations,
        converged,
        feasible,
        message,
    })
}

/// Narrows `[search_min, search_max]` around the goal boundary. When `goal_at_high` the
/// goal holds above the boundary and the upper bound is returned, otherwise the lower.
fn bisect(
    inputs: &RetirementInputs,
    config: GoalSolveConfig,
    goal_at_high: bool,
    iterations: &mut Vec<GoalSolveIteration>,
) -> (f64, bool) {
    let mut lo = config.search_min;
    let mut hi = config.search_max;
    let mut it = 0;
    while it < config.max_iterations {
        it += 1;
        let mid = (lo + hi) * 0.5;
        let eval = evaluate_candidate(inputs, config.goal_type, mid);
        debug!(
            iteration = it,
            lower = lo,
            upper = hi,
            candidate = mid,
            meets_goal = eval.meets_goal,
            "goal solver step"
        );
        iterations.push(GoalSolveIteration {
            iteration: it,
            lower_bound: lo,
            upper_bound: hi,
            candidate_value: mid,
            target_gap: eval.target_gap,
            run_out_age: eval.run_out_age,
            meets_goal: eval.meets_goal,
        });

        if eval.meets_goal == goal_at_high {
            hi = mid;
        } else {
            lo = mid;
        }

        if (hi - lo).abs() <= config.tolerance {
            return (if goal_at_high { hi } else { lo }, true);
        }
    }
    (if goal_at_high { hi } else { lo }, false)
}

fn evaluate_candidate(
    base_inputs: &RetirementInputs,
    goal_type: GoalType,
    candidate_value: f64,
) -> CandidateEval {
    let inputs = match goal_type {
        GoalType::RequiredContribution => RetirementInputs {
            annual_contribution: candidate_value.max(0.0),
            ..*base_inputs
        },
        GoalType::MaxMonthlySpend => with_monthly_spend(base_inputs, candidate_value),
    };

    let summary = compute_retirement(&inputs).summary;
    let meets_goal = match goal_type {
        GoalType::RequiredContribution => summary.on_track,
        GoalType::MaxMonthlySpend => summary.run_out_age.is_none(),
    };
    CandidateEval {
        target_gap: summary.target_gap,
        run_out_age: summary.run_out_age,
        meets_goal,
    }
}

/// Rescales every expense category so today's monthly total equals `monthly_spend`,
/// keeping the budget mix. An empty budget puts the whole amount under Other.
fn with_monthly_spend(inputs: &RetirementInputs, monthly_spend: f64) -> RetirementInputs {
    let monthly_spend = monthly_spend.max(0.0);
    let current_total: f64 = inputs.expense_rows().iter().map(|row| row.today).sum();

    if current_total <= 1e-12 {
        return RetirementInputs {
            monthly_housing: 0.0,
            monthly_utilities: 0.0,
            monthly_food: 0.0,
            monthly_transportation: 0.0,
            monthly_healthcare: 0.0,
            monthly_lifestyle: 0.0,
            monthly_travel: 0.0,
            monthly_other: monthly_spend,
            annual_non_monthly_expenses: 0.0,
            ..*inputs
        };
    }

    let scale = monthly_spend / current_total;
    let scaled = |amount: f64| amount.max(0.0) * scale;
    RetirementInputs {
        monthly_housing: scaled(inputs.monthly_housing),
        monthly_utilities: scaled(inputs.monthly_utilities),
        monthly_food: scaled(inputs.monthly_food),
        monthly_transportation: scaled(inputs.monthly_transportation),
        monthly_healthcare: scaled(inputs.monthly_healthcare),
        monthly_lifestyle: scaled(inputs.monthly_lifestyle),
        monthly_travel: scaled(inputs.monthly_travel),
        monthly_other: scaled(inputs.monthly_other),
        annual_non_monthly_expenses: scaled(inputs.annual_non_monthly_expenses),
        ..*inputs
    }
}

fn validate_config(config: GoalSolveConfig) -> Result<(), SolveError> {
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err(SolveError::NonFiniteBounds);
    }
    if config.search_max <= config.search_min {
        return Err(SolveError::EmptySearchRange);
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err(SolveError::InvalidTolerance);
    }
    if config.max_iterations == 0 {
        return Err(SolveError::NoIterations);
    }
    if config.max_iterations > MAX_SOLVE_ITERATIONS {
        return Err(SolveError::TooManyIterations);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn deterministic_inputs() -> RetirementInputs {
        RetirementInputs {
            current_age: 60.0,
            retirement_age: 62.0,
            life_expectancy: 65.0,
            current_savings: 0.0,
            annual_contribution: 0.0,
            employer_match_annual: 0.0,
            contribution_growth_pct: 0.0,
            pre_retirement_return_pct: 0.0,
            post_retirement_return_pct: 0.0,
            investment_drag_pct: 0.0,
            monthly_housing: 1_000.0,
            monthly_utilities: 0.0,
            monthly_food: 0.0,
            monthly_transportation: 0.0,
            monthly_healthcare: 0.0,
            monthly_lifestyle: 0.0,
            monthly_travel: 0.0,
            monthly_other: 0.0,
            annual_non_monthly_expenses: 0.0,
            social_security_annual: 0.0,
            pension_annual: 0.0,
            benefit_increase_pct: 0.0,
            inflation_pct: 0.0,
            retirement_income_tax_pct: 0.0,
            safe_withdrawal_rate_pct: 4.0,
        }
    }

    fn config(goal_type: GoalType, search_max: f64) -> GoalSolveConfig {
        GoalSolveConfig {
            goal_type,
            search_min: 0.0,
            search_max,
            tolerance: 0.5,
            max_iterations: 48,
        }
    }

    #[test]
    fn required_contribution_solver_finds_deterministic_solution() {
        // 12k/yr spend at 4% needs 300k from two contribution years.
        let inputs = deterministic_inputs();
        let config = config(GoalType::RequiredContribution, 400_000.0);

        let result = solve_goal(&inputs, config).expect("must solve");
        assert!(result.feasible);
        assert!(result.converged);
        assert_close(
            result.solved_value.expect("value expected"),
            150_000.0,
            config.tolerance + 0.5,
        );
        assert!(result.achieved_target_gap.expect("gap expected") <= 0.0);
        assert!(!result.iterations.is_empty());
    }

    #[test]
    fn max_monthly_spend_solver_finds_deterministic_solution() {
        // 120k must last four retired years without reaching zero.
        let mut inputs = deterministic_inputs();
        inputs.current_savings = 120_000.0;
        let config = config(GoalType::MaxMonthlySpend, 10_000.0);

        let result = solve_goal(&inputs, config).expect("must solve");
        assert!(result.feasible);
        assert!(result.converged);
        let solved = result.solved_value.expect("value expected");
        assert_close(solved, 2_500.0, config.tolerance + 0.5);
        assert!(solved < 2_500.0);
        assert_eq!(result.achieved_run_out_age, None);
    }

    #[test]
    fn required_contribution_solver_reports_infeasible_when_bounds_too_low() {
        let inputs = deterministic_inputs();
        let result = solve_goal(&inputs, config(GoalType::RequiredContribution, 50_000.0))
            .expect("must return result");
        assert!(!result.feasible);
        assert!(result.solved_value.is_none());
        assert!(result.achieved_target_gap.is_none());
        assert!(result.iterations.is_empty());
    }

    #[test]
    fn solver_short_circuits_when_lower_bound_already_meets_goal() {
        let mut inputs = deterministic_inputs();
        inputs.social_security_annual = 20_000.0;
        let result = solve_goal(&inputs, config(GoalType::RequiredContribution, 10_000.0))
            .expect("must solve");
        assert!(result.feasible);
        assert_eq!(result.solved_value, Some(0.0));
        assert!(result.iterations.is_empty());
    }

    #[test]
    fn max_spend_reports_upper_bound_when_never_depleted() {
        let mut inputs = deterministic_inputs();
        inputs.social_security_annual = 1_000_000.0;
        let result =
            solve_goal(&inputs, config(GoalType::MaxMonthlySpend, 5_000.0)).expect("must solve");
        assert_eq!(result.solved_value, Some(5_000.0));
        assert!(result.message.contains("increase search max"));
    }

    #[test]
    fn unconverged_search_still_returns_best_estimate() {
        let inputs = deterministic_inputs();
        let config = GoalSolveConfig {
            max_iterations: 2,
            ..config(GoalType::RequiredContribution, 400_000.0)
        };
        let result = solve_goal(&inputs, config).expect("must solve");
        assert!(result.feasible);
        assert!(!result.converged);
        assert_eq!(result.iterations.len(), 2);
        assert_eq!(result.solved_value, Some(200_000.0));
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let inputs = deterministic_inputs();
        let base = config(GoalType::RequiredContribution, 100.0);

        let err = solve_goal(&inputs, GoalSolveConfig { search_max: 0.0, ..base })
            .expect_err("empty range");
        assert_eq!(err, SolveError::EmptySearchRange);

        let err = solve_goal(&inputs, GoalSolveConfig { tolerance: 0.0, ..base })
            .expect_err("zero tolerance");
        assert_eq!(err, SolveError::InvalidTolerance);

        let err = solve_goal(
            &inputs,
            GoalSolveConfig {
                search_max: f64::INFINITY,
                ..base
            },
        )
        .expect_err("infinite bound");
        assert_eq!(err, SolveError::NonFiniteBounds);

        let err = solve_goal(
            &inputs,
            GoalSolveConfig {
                max_iterations: 0,
                ..base
            },
        )
        .expect_err("no iterations");
        assert_eq!(err, SolveError::NoIterations);
        assert_eq!(err.to_string(), "max_iterations must be > 0");
    }

    #[test]
    fn iteration_count_above_cap_is_rejected() {
        let inputs = deterministic_inputs();
        let base = config(GoalType::RequiredContribution, 200_000.0);

        let err = solve_goal(
            &inputs,
            GoalSolveConfig {
                max_iterations: u32::MAX,
                ..base
            },
        )
        .expect_err("unbounded iterations");
        assert_eq!(err, SolveError::TooManyIterations);
        assert_eq!(err.to_string(), "max_iterations must be <= 1000");

        let result = solve_goal(
            &inputs,
            GoalSolveConfig {
                max_iterations: MAX_SOLVE_ITERATIONS,
                tolerance: 1e-300,
                ..base
            },
        )
        .expect("cap itself is allowed");
        assert!(result.iterations.len() <= MAX_SOLVE_ITERATIONS as usize);
    }

    #[test]
    fn empty_budget_spend_goes_to_other() {
        let mut inputs = deterministic_inputs();
        inputs.monthly_housing = 0.0;
        let scaled = with_monthly_spend(&inputs, 1_234.0);
        assert_close(scaled.monthly_other, 1_234.0, 1e-9);
        assert_close(scaled.monthly_housing, 0.0, 1e-9);
    }

    proptest! {
        #[test]
        fn prop_rescaled_budget_keeps_mix_and_hits_total(
            housing in 0u32..5_000,
            food in 0u32..2_000,
            non_monthly in 0u32..30_000,
            target in 0u32..20_000
        ) {
            let mut inputs = deterministic_inputs();
            inputs.monthly_housing = housing as f64;
            inputs.monthly_food = food as f64;
            inputs.annual_non_monthly_expenses = non_monthly as f64;

            let scaled = with_monthly_spend(&inputs, target as f64);
            let total: f64 = scaled.expense_rows().iter().map(|row| row.today).sum();
            prop_assert!((total - target as f64).abs() < 1e-6);
            if housing > 0 && food > 0 && target > 0 {
                let ratio = scaled.monthly_housing / scaled.monthly_food;
                prop_assert!((ratio - housing as f64 / food as f64).abs() < 1e-9 * ratio.max(1.0));
            }
        }
    }
}
