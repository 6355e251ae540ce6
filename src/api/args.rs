use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use super::error::InputError;
use crate::core::{GoalSolveConfig, GoalType, RentVsBuyInputs, RetirementInputs};

#[derive(Parser, Debug)]
#[command(
    name = "fincalc",
    about = "Deterministic rent-vs-buy and retirement projection calculators"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON HTTP API
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Compare renting against buying month by month
    RentVsBuy(RentVsBuyArgs),
    /// Project a retirement portfolio year by year
    Retirement(RetirementArgs),
    /// Solve for a contribution or spending goal over the retirement projection
    Solve(SolveArgs),
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct RentVsBuyArgs {
    #[arg(long, default_value_t = 10.0, help = "Comparison horizon in years (1-50)")]
    pub years: f64,
    #[arg(long, default_value_t = 2200.0, help = "Starting monthly rent")]
    pub monthly_rent: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual rent increase in percent")]
    pub rent_increase_pct: f64,
    #[arg(long, default_value_t = 22.0, help = "Monthly renter's insurance")]
    pub renters_insurance_monthly: f64,
    #[arg(long, default_value_t = 500000.0)]
    pub home_price: f64,
    #[arg(long, default_value_t = 20.0, help = "Down payment in percent of price")]
    pub down_payment_pct: f64,
    #[arg(long, default_value_t = 6.5, help = "Fixed mortgage rate in percent")]
    pub mortgage_rate_pct: f64,
    #[arg(long, default_value_t = 30.0, help = "Mortgage term in years (1-40)")]
    pub loan_term_years: f64,
    #[arg(long, default_value_t = 1.2, help = "Property tax in percent of home value per year")]
    pub property_tax_pct: f64,
    #[arg(long, default_value_t = 1800.0, help = "Annual home insurance")]
    pub home_insurance_annual: f64,
    #[arg(long, default_value_t = 1.0, help = "Maintenance in percent of home value per year")]
    pub maintenance_pct: f64,
    #[arg(long, default_value_t = 150.0, help = "Monthly HOA fees")]
    pub hoa_monthly: f64,
    #[arg(long, default_value_t = 3.0, help = "Closing costs in percent of price")]
    pub closing_cost_pct: f64,
    #[arg(long, default_value_t = 6.0, help = "Selling costs in percent of home value")]
    pub selling_cost_pct: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual home appreciation in percent")]
    pub home_appreciation_pct: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Annual return on the renter's invested cash in percent"
    )]
    pub investment_return_pct: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Annual inflation on insurance and HOA in percent"
    )]
    pub annual_inflation_pct: f64,
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct RetirementArgs {
    #[arg(long, default_value_t = 35.0)]
    pub current_age: f64,
    #[arg(long, default_value_t = 67.0)]
    pub retirement_age: f64,
    #[arg(long, default_value_t = 92.0)]
    pub life_expectancy: f64,
    #[arg(long, default_value_t = 120000.0, help = "Current retirement savings")]
    pub current_savings: f64,
    #[arg(long, default_value_t = 18000.0, help = "Starting annual contribution")]
    pub annual_contribution: f64,
    #[arg(long, default_value_t = 5000.0, help = "Starting annual employer match")]
    pub employer_match_annual: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Annual growth of contributions and match in percent"
    )]
    pub contribution_growth_pct: f64,
    #[arg(long, default_value_t = 7.0, help = "Annual return before retirement in percent")]
    pub pre_retirement_return_pct: f64,
    #[arg(long, default_value_t = 5.0, help = "Annual return during retirement in percent")]
    pub post_retirement_return_pct: f64,
    #[arg(long, default_value_t = 1.0, help = "Annual fees and tax drag in percent")]
    pub investment_drag_pct: f64,
    #[arg(long, default_value_t = 1800.0)]
    pub monthly_housing: f64,
    #[arg(long, default_value_t = 350.0)]
    pub monthly_utilities: f64,
    #[arg(long, default_value_t = 700.0)]
    pub monthly_food: f64,
    #[arg(long, default_value_t = 450.0)]
    pub monthly_transportation: f64,
    #[arg(long, default_value_t = 500.0)]
    pub monthly_healthcare: f64,
    #[arg(long, default_value_t = 550.0)]
    pub monthly_lifestyle: f64,
    #[arg(long, default_value_t = 300.0)]
    pub monthly_travel: f64,
    #[arg(long, default_value_t = 300.0)]
    pub monthly_other: f64,
    #[arg(
        long,
        default_value_t = 6000.0,
        help = "Annual costs that do not recur monthly"
    )]
    pub annual_non_monthly_expenses: f64,
    #[arg(long, default_value_t = 32000.0, help = "Social Security at retirement, per year")]
    pub social_security_annual: f64,
    #[arg(long, default_value_t = 0.0, help = "Pension at retirement, per year")]
    pub pension_annual: f64,
    #[arg(
        long,
        default_value_t = 2.0,
        help = "Cost-of-living adjustment on Social Security and pension in percent"
    )]
    pub benefit_increase_pct: f64,
    #[arg(long, default_value_t = 2.5, help = "Annual inflation in percent")]
    pub inflation_pct: f64,
    #[arg(
        long,
        default_value_t = 12.0,
        help = "Flat effective tax rate on retirement withdrawals in percent"
    )]
    pub retirement_income_tax_pct: f64,
    #[arg(long, default_value_t = 4.0, help = "Safe withdrawal rate in percent (0.5-15)")]
    pub safe_withdrawal_rate_pct: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliGoalType {
    RequiredContribution,
    MaxMonthlySpend,
}

impl From<CliGoalType> for GoalType {
    fn from(value: CliGoalType) -> Self {
        match value {
            CliGoalType::RequiredContribution => GoalType::RequiredContribution,
            CliGoalType::MaxMonthlySpend => GoalType::MaxMonthlySpend,
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct SolveArgs {
    #[arg(long, value_enum, default_value_t = CliGoalType::RequiredContribution)]
    pub goal: CliGoalType,
    #[arg(long, default_value_t = 0.0, help = "Lower search bound")]
    pub search_min: f64,
    #[arg(
        long,
        help = "Upper search bound; defaults to 500000 for contributions and 50000 for monthly spend"
    )]
    pub search_max: Option<f64>,
    #[arg(long, default_value_t = 1.0, help = "Stop once the search interval is this narrow")]
    pub tolerance: f64,
    #[arg(long, default_value_t = 60, help = "Bisection step limit, at most 1000")]
    pub max_iterations: u32,
    #[command(flatten)]
    pub retirement: RetirementArgs,
}

impl From<RentVsBuyInputs> for RentVsBuyArgs {
    fn from(value: RentVsBuyInputs) -> Self {
        Self {
            years: value.years,
            monthly_rent: value.monthly_rent,
            rent_increase_pct: value.rent_increase_pct,
            renters_insurance_monthly: value.renters_insurance_monthly,
            home_price: value.home_price,
            down_payment_pct: value.down_payment_pct,
            mortgage_rate_pct: value.mortgage_rate_pct,
            loan_term_years: value.loan_term_years,
            property_tax_pct: value.property_tax_pct,
            home_insurance_annual: value.home_insurance_annual,
            maintenance_pct: value.maintenance_pct,
            hoa_monthly: value.hoa_monthly,
            closing_cost_pct: value.closing_cost_pct,
            selling_cost_pct: value.selling_cost_pct,
            home_appreciation_pct: value.home_appreciation_pct,
            investment_return_pct: value.investment_return_pct,
            annual_inflation_pct: value.annual_inflation_pct,
        }
    }
}

impl From<RetirementInputs> for RetirementArgs {
    fn from(value: RetirementInputs) -> Self {
        Self {
            current_age: value.current_age,
            retirement_age: value.retirement_age,
            life_expectancy: value.life_expectancy,
            current_savings: value.current_savings,
            annual_contribution: value.annual_contribution,
            employer_match_annual: value.employer_match_annual,
            contribution_growth_pct: value.contribution_growth_pct,
            pre_retirement_return_pct: value.pre_retirement_return_pct,
            post_retirement_return_pct: value.post_retirement_return_pct,
            investment_drag_pct: value.investment_drag_pct,
            monthly_housing: value.monthly_housing,
            monthly_utilities: value.monthly_utilities,
            monthly_food: value.monthly_food,
            monthly_transportation: value.monthly_transportation,
            monthly_healthcare: value.monthly_healthcare,
            monthly_lifestyle: value.monthly_lifestyle,
            monthly_travel: value.monthly_travel,
            monthly_other: value.monthly_other,
            annual_non_monthly_expenses: value.annual_non_monthly_expenses,
            social_security_annual: value.social_security_annual,
            pension_annual: value.pension_annual,
            benefit_increase_pct: value.benefit_increase_pct,
            inflation_pct: value.inflation_pct,
            retirement_income_tax_pct: value.retirement_income_tax_pct,
            safe_withdrawal_rate_pct: value.safe_withdrawal_rate_pct,
        }
    }
}

fn finite(flag: &'static str, value: f64) -> Result<f64, InputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InputError::NotFinite { flag })
    }
}

/// Range and sign are left to the engine, which clamps; only NaN and infinities are refused.
pub fn build_rent_vs_buy_inputs(args: &RentVsBuyArgs) -> Result<RentVsBuyInputs, InputError> {
    Ok(RentVsBuyInputs {
        years: finite("--years", args.years)?,
        monthly_rent: finite("--monthly-rent", args.monthly_rent)?,
        rent_increase_pct: finite("--rent-increase-pct", args.rent_increase_pct)?,
        renters_insurance_monthly: finite(
            "--renters-insurance-monthly",
            args.renters_insurance_monthly,
        )?,
        home_price: finite("--home-price", args.home_price)?,
        down_payment_pct: finite("--down-payment-pct", args.down_payment_pct)?,
        mortgage_rate_pct: finite("--mortgage-rate-pct", args.mortgage_rate_pct)?,
        loan_term_years: finite("--loan-term-years", args.loan_term_years)?,
        property_tax_pct: finite("--property-tax-pct", args.property_tax_pct)?,
        home_insurance_annual: finite("--home-insurance-annual", args.home_insurance_annual)?,
        maintenance_pct: finite("--maintenance-pct", args.maintenance_pct)?,
        hoa_monthly: finite("--hoa-monthly", args.hoa_monthly)?,
        closing_cost_pct: finite("--closing-cost-pct", args.closing_cost_pct)?,
        selling_cost_pct: finite("--selling-cost-pct", args.selling_cost_pct)?,
        home_appreciation_pct: finite("--home-appreciation-pct", args.home_appreciation_pct)?,
        investment_return_pct: finite("--investment-return-pct", args.investment_return_pct)?,
        annual_inflation_pct: finite("--annual-inflation-pct", args.annual_inflation_pct)?,
    })
}

pub fn build_retirement_inputs(args: &RetirementArgs) -> Result<RetirementInputs, InputError> {
    Ok(RetirementInputs {
        current_age: finite("--current-age", args.current_age)?,
        retirement_age: finite("--retirement-age", args.retirement_age)?,
        life_expectancy: finite("--life-expectancy", args.life_expectancy)?,
        current_savings: finite("--current-savings", args.current_savings)?,
        annual_contribution: finite("--annual-contribution", args.annual_contribution)?,
        employer_match_annual: finite("--employer-match-annual", args.employer_match_annual)?,
        contribution_growth_pct: finite(
            "--contribution-growth-pct",
            args.contribution_growth_pct,
        )?,
        pre_retirement_return_pct: finite(
            "--pre-retirement-return-pct",
            args.pre_retirement_return_pct,
        )?,
        post_retirement_return_pct: finite(
            "--post-retirement-return-pct",
            args.post_retirement_return_pct,
        )?,
        investment_drag_pct: finite("--investment-drag-pct", args.investment_drag_pct)?,
        monthly_housing: finite("--monthly-housing", args.monthly_housing)?,
        monthly_utilities: finite("--monthly-utilities", args.monthly_utilities)?,
        monthly_food: finite("--monthly-food", args.monthly_food)?,
        monthly_transportation: finite("--monthly-transportation", args.monthly_transportation)?,
        monthly_healthcare: finite("--monthly-healthcare", args.monthly_healthcare)?,
        monthly_lifestyle: finite("--monthly-lifestyle", args.monthly_lifestyle)?,
        monthly_travel: finite("--monthly-travel", args.monthly_travel)?,
        monthly_other: finite("--monthly-other", args.monthly_other)?,
        annual_non_monthly_expenses: finite(
            "--annual-non-monthly-expenses",
            args.annual_non_monthly_expenses,
        )?,
        social_security_annual: finite("--social-security-annual", args.social_security_annual)?,
        pension_annual: finite("--pension-annual", args.pension_annual)?,
        benefit_increase_pct: finite("--benefit-increase-pct", args.benefit_increase_pct)?,
        inflation_pct: finite("--inflation-pct", args.inflation_pct)?,
        retirement_income_tax_pct: finite(
            "--retirement-income-tax-pct",
            args.retirement_income_tax_pct,
        )?,
        safe_withdrawal_rate_pct: finite(
            "--safe-withdrawal-rate-pct",
            args.safe_withdrawal_rate_pct,
        )?,
    })
}

pub fn build_goal_config(args: &SolveArgs) -> GoalSolveConfig {
    let goal_type = GoalType::from(args.goal);
    let default_max = match goal_type {
        GoalType::RequiredContribution => 500_000.0,
        GoalType::MaxMonthlySpend => 50_000.0,
    };
    GoalSolveConfig {
        goal_type,
        search_min: args.search_min,
        search_max: args.search_max.unwrap_or(default_max),
        tolerance: args.tolerance,
        max_iterations: args.max_iterations,
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RentVsBuyPayload {
    years: Option<f64>,
    monthly_rent: Option<f64>,
    rent_increase_pct: Option<f64>,
    renters_insurance_monthly: Option<f64>,
    home_price: Option<f64>,
    down_payment_pct: Option<f64>,
    mortgage_rate_pct: Option<f64>,
    loan_term_years: Option<f64>,
    property_tax_pct: Option<f64>,
    home_insurance_annual: Option<f64>,
    maintenance_pct: Option<f64>,
    hoa_monthly: Option<f64>,
    closing_cost_pct: Option<f64>,
    selling_cost_pct: Option<f64>,
    home_appreciation_pct: Option<f64>,
    investment_return_pct: Option<f64>,
    annual_inflation_pct: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetirementPayload {
    current_age: Option<f64>,
    retirement_age: Option<f64>,
    life_expectancy: Option<f64>,
    current_savings: Option<f64>,
    annual_contribution: Option<f64>,
    employer_match_annual: Option<f64>,
    contribution_growth_pct: Option<f64>,
    pre_retirement_return_pct: Option<f64>,
    post_retirement_return_pct: Option<f64>,
    investment_drag_pct: Option<f64>,
    monthly_housing: Option<f64>,
    monthly_utilities: Option<f64>,
    monthly_food: Option<f64>,
    monthly_transportation: Option<f64>,
    monthly_healthcare: Option<f64>,
    monthly_lifestyle: Option<f64>,
    monthly_travel: Option<f64>,
    monthly_other: Option<f64>,
    annual_non_monthly_expenses: Option<f64>,
    social_security_annual: Option<f64>,
    pension_annual: Option<f64>,
    benefit_increase_pct: Option<f64>,
    inflation_pct: Option<f64>,
    retirement_income_tax_pct: Option<f64>,
    safe_withdrawal_rate_pct: Option<f64>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApiGoalType {
    #[serde(alias = "requiredContribution", alias = "required_contribution")]
    RequiredContribution,
    #[serde(alias = "maxMonthlySpend", alias = "max_monthly_spend")]
    MaxMonthlySpend,
}

impl From<ApiGoalType> for CliGoalType {
    fn from(value: ApiGoalType) -> Self {
        match value {
            ApiGoalType::RequiredContribution => CliGoalType::RequiredContribution,
            ApiGoalType::MaxMonthlySpend => CliGoalType::MaxMonthlySpend,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SolvePayload {
    goal: Option<ApiGoalType>,
    search_min: Option<f64>,
    search_max: Option<f64>,
    tolerance: Option<f64>,
    max_iterations: Option<u32>,
    #[serde(flatten)]
    inputs: RetirementPayload,
}

pub fn rent_vs_buy_inputs_from_payload(
    payload: RentVsBuyPayload,
) -> Result<RentVsBuyInputs, InputError> {
    let mut args = RentVsBuyArgs::from(RentVsBuyInputs::default());

    if let Some(v) = payload.years {
        args.years = v;
    }
    if let Some(v) = payload.monthly_rent {
        args.monthly_rent = v;
    }
    if let Some(v) = payload.rent_increase_pct {
        args.rent_increase_pct = v;
    }
    if let Some(v) = payload.renters_insurance_monthly {
        args.renters_insurance_monthly = v;
    }
    if let Some(v) = payload.home_price {
        args.home_price = v;
    }
    if let Some(v) = payload.down_payment_pct {
        args.down_payment_pct = v;
    }
    if let Some(v) = payload.mortgage_rate_pct {
        args.mortgage_rate_pct = v;
    }
    if let Some(v) = payload.loan_term_years {
        args.loan_term_years = v;
    }
    if let Some(v) = payload.property_tax_pct {
        args.property_tax_pct = v;
    }
    if let Some(v) = payload.home_insurance_annual {
        args.home_insurance_annual = v;
    }
    if let Some(v) = payload.maintenance_pct {
        args.maintenance_pct = v;
    }
    if let Some(v) = payload.hoa_monthly {
        args.hoa_monthly = v;
    }
    if let Some(v) = payload.closing_cost_pct {
        args.closing_cost_pct = v;
    }
    if let Some(v) = payload.selling_cost_pct {
        args.selling_cost_pct = v;
    }
    if let Some(v) = payload.home_appreciation_pct {
        args.home_appreciation_pct = v;
    }
    if let Some(v) = payload.investment_return_pct {
        args.investment_return_pct = v;
    }
    if let Some(v) = payload.annual_inflation_pct {
        args.annual_inflation_pct = v;
    }

    build_rent_vs_buy_inputs(&args)
}

fn retirement_args_from_payload(payload: RetirementPayload) -> RetirementArgs {
    let mut args = RetirementArgs::from(RetirementInputs::default());

    if let Some(v) = payload.current_age {
        args.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        args.retirement_age = v;
    }
    if let Some(v) = payload.life_expectancy {
        args.life_expectancy = v;
    }
    if let Some(v) = payload.current_savings {
        args.current_savings = v;
    }
    if let Some(v) = payload.annual_contribution {
        args.annual_contribution = v;
    }
    if let Some(v) = payload.employer_match_annual {
        args.employer_match_annual = v;
    }
    if let Some(v) = payload.contribution_growth_pct {
        args.contribution_growth_pct = v;
    }
    if let Some(v) = payload.pre_retirement_return_pct {
        args.pre_retirement_return_pct = v;
    }
    if let Some(v) = payload.post_retirement_return_pct {
        args.post_retirement_return_pct = v;
    }
    if let Some(v) = payload.investment_drag_pct {
        args.investment_drag_pct = v;
    }
    if let Some(v) = payload.monthly_housing {
        args.monthly_housing = v;
    }
    if let Some(v) = payload.monthly_utilities {
        args.monthly_utilities = v;
    }
    if let Some(v) = payload.monthly_food {
        args.monthly_food = v;
    }
    if let Some(v) = payload.monthly_transportation {
        args.monthly_transportation = v;
    }
    if let Some(v) = payload.monthly_healthcare {
        args.monthly_healthcare = v;
    }
    if let Some(v) = payload.monthly_lifestyle {
        args.monthly_lifestyle = v;
    }
    if let Some(v) = payload.monthly_travel {
        args.monthly_travel = v;
    }
    if let Some(v) = payload.monthly_other {
        args.monthly_other = v;
    }
    if let Some(v) = payload.annual_non_monthly_expenses {
        args.annual_non_monthly_expenses = v;
    }
    if let Some(v) = payload.social_security_annual {
        args.social_security_annual = v;
    }
    if let Some(v) = payload.pension_annual {
        args.pension_annual = v;
    }
    if let Some(v) = payload.benefit_increase_pct {
        args.benefit_increase_pct = v;
    }
    if let Some(v) = payload.inflation_pct {
        args.inflation_pct = v;
    }
    if let Some(v) = payload.retirement_income_tax_pct {
        args.retirement_income_tax_pct = v;
    }
    if let Some(v) = payload.safe_withdrawal_rate_pct {
        args.safe_withdrawal_rate_pct = v;
    }

    args
}

pub fn retirement_inputs_from_payload(
    payload: RetirementPayload,
) -> Result<RetirementInputs, InputError> {
    build_retirement_inputs(&retirement_args_from_payload(payload))
}

pub fn solve_request_from_payload(
    payload: SolvePayload,
) -> Result<(RetirementInputs, GoalSolveConfig), InputError> {
    let mut args = SolveArgs {
        goal: CliGoalType::RequiredContribution,
        search_min: 0.0,
        search_max: None,
        tolerance: 1.0,
        max_iterations: 60,
        retirement: retirement_args_from_payload(payload.inputs),
    };

    if let Some(v) = payload.goal {
        args.goal = v.into();
    }
    if let Some(v) = payload.search_min {
        args.search_min = v;
    }
    if let Some(v) = payload.search_max {
        args.search_max = Some(v);
    }
    if let Some(v) = payload.tolerance {
        args.tolerance = v;
    }
    if let Some(v) = payload.max_iterations {
        args.max_iterations = v;
    }

    let inputs = build_retirement_inputs(&args.retirement)?;
    Ok((inputs, build_goal_config(&args)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(args).expect("arguments should parse").command
    }

    #[test]
    fn cli_defaults_match_engine_defaults() {
        let Command::RentVsBuy(args) = parse(&["fincalc", "rent-vs-buy"]) else {
            panic!("expected rent-vs-buy");
        };
        let inputs = build_rent_vs_buy_inputs(&args).expect("valid inputs");
        assert_eq!(inputs, RentVsBuyInputs::default());

        let Command::Retirement(args) = parse(&["fincalc", "retirement"]) else {
            panic!("expected retirement");
        };
        let inputs = build_retirement_inputs(&args).expect("valid inputs");
        assert_eq!(inputs, RetirementInputs::default());
    }

    #[test]
    fn cli_flags_override_defaults() {
        let Command::Retirement(args) = parse(&[
            "fincalc",
            "retirement",
            "--current-age",
            "40",
            "--safe-withdrawal-rate-pct",
            "3.5",
            "--monthly-travel",
            "0",
        ]) else {
            panic!("expected retirement");
        };
        let inputs = build_retirement_inputs(&args).expect("valid inputs");
        assert_approx(inputs.current_age, 40.0);
        assert_approx(inputs.safe_withdrawal_rate_pct, 3.5);
        assert_approx(inputs.monthly_travel, 0.0);
        assert_approx(inputs.retirement_age, 67.0);
    }

    #[test]
    fn solve_command_uses_goal_specific_search_max() {
        let Command::Solve(args) = parse(&["fincalc", "solve", "--goal", "max-monthly-spend"])
        else {
            panic!("expected solve");
        };
        let config = build_goal_config(&args);
        assert_eq!(config.goal_type, GoalType::MaxMonthlySpend);
        assert_approx(config.search_max, 50_000.0);

        let Command::Solve(args) = parse(&["fincalc", "solve", "--search-max", "90000"]) else {
            panic!("expected solve");
        };
        let config = build_goal_config(&args);
        assert_eq!(config.goal_type, GoalType::RequiredContribution);
        assert_approx(config.search_max, 90_000.0);
    }

    #[test]
    fn serve_command_defaults_port() {
        let Command::Serve { port } = parse(&["fincalc", "serve"]) else {
            panic!("expected serve");
        };
        assert_eq!(port, 8080);
    }

    #[test]
    fn build_inputs_rejects_non_finite_values() {
        let mut args = RentVsBuyArgs::from(RentVsBuyInputs::default());
        args.monthly_rent = f64::NAN;
        let err = build_rent_vs_buy_inputs(&args).expect_err("must reject NaN");
        assert!(err.to_string().contains("--monthly-rent"));

        let mut args = RetirementArgs::from(RetirementInputs::default());
        args.inflation_pct = f64::INFINITY;
        let err = build_retirement_inputs(&args).expect_err("must reject infinity");
        assert!(err.to_string().contains("--inflation-pct"));
    }

    #[test]
    fn build_inputs_passes_out_of_range_values_through_for_clamping() {
        let mut args = RentVsBuyArgs::from(RentVsBuyInputs::default());
        args.down_payment_pct = 250.0;
        args.years = -3.0;
        let inputs = build_rent_vs_buy_inputs(&args).expect("clamped later, not rejected");
        assert_approx(inputs.down_payment_pct, 250.0);
        assert_approx(inputs.years, -3.0);
    }

    #[test]
    fn rent_vs_buy_payload_overlays_defaults() {
        let json = r#"{
          "years": 15,
          "monthlyRent": 1800,
          "homePrice": 350000,
          "annualInflationPct": 3.1
        }"#;
        let payload: RentVsBuyPayload = serde_json::from_str(json).expect("json should parse");
        let inputs = rent_vs_buy_inputs_from_payload(payload).expect("valid inputs");

        assert_approx(inputs.years, 15.0);
        assert_approx(inputs.monthly_rent, 1_800.0);
        assert_approx(inputs.home_price, 350_000.0);
        assert_approx(inputs.annual_inflation_pct, 3.1);
        assert_approx(inputs.mortgage_rate_pct, 6.5);
        assert_approx(inputs.selling_cost_pct, 6.0);
    }

    #[test]
    fn empty_payloads_resolve_to_defaults() {
        let inputs =
            rent_vs_buy_inputs_from_payload(RentVsBuyPayload::default()).expect("valid inputs");
        assert_eq!(inputs, RentVsBuyInputs::default());

        let inputs =
            retirement_inputs_from_payload(RetirementPayload::default()).expect("valid inputs");
        assert_eq!(inputs, RetirementInputs::default());
    }

    #[test]
    fn solve_payload_parses_goal_and_flattened_inputs() {
        let json = r#"{
          "goal": "maxMonthlySpend",
          "searchMax": 12000,
          "tolerance": 0.25,
          "currentAge": 45,
          "monthlyHousing": 2400
        }"#;
        let payload: SolvePayload = serde_json::from_str(json).expect("json should parse");
        let (inputs, config) = solve_request_from_payload(payload).expect("valid request");

        assert_eq!(config.goal_type, GoalType::MaxMonthlySpend);
        assert_approx(config.search_max, 12_000.0);
        assert_approx(config.tolerance, 0.25);
        assert_eq!(config.max_iterations, 60);
        assert_approx(inputs.current_age, 45.0);
        assert_approx(inputs.monthly_housing, 2_400.0);
        assert_approx(inputs.life_expectancy, 92.0);
    }
}
