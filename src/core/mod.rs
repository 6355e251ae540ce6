mod rates;
mod rent_vs_buy;
mod retirement;
mod solver;
mod types;

pub use rates::{annual_rate_multiplier, annual_to_monthly_rate, clamp, mortgage_payment};
pub use rent_vs_buy::compute_rent_vs_buy;
pub use retirement::compute_retirement;
pub use solver::{
    GoalSolveConfig, GoalSolveIteration, GoalSolveResult, GoalType, SolveError, solve_goal,
};
pub use types::{
    ExpenseRow, MonthlyBudgetRow, RentVsBuyAnalysis, RentVsBuyAssumptions, RentVsBuyInputs,
    RentVsBuyPoint, RentVsBuySummary, RetirementAnalysis, RetirementAssumptions,
    RetirementInputs, RetirementPoint, RetirementSummary, Winner,
};
