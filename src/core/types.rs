use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RentVsBuyInputs {
    pub years: f64,
    pub monthly_rent: f64,
    pub rent_increase_pct: f64,
    pub renters_insurance_monthly: f64,
    pub home_price: f64,
    pub down_payment_pct: f64,
    pub mortgage_rate_pct: f64,
    pub loan_term_years: f64,
    pub property_tax_pct: f64,
    pub home_insurance_annual: f64,
    pub maintenance_pct: f64,
    pub hoa_monthly: f64,
    pub closing_cost_pct: f64,
    pub selling_cost_pct: f64,
    pub home_appreciation_pct: f64,
    pub investment_return_pct: f64,
    pub annual_inflation_pct: f64,
}

impl Default for RentVsBuyInputs {
    fn default() -> Self {
        Self {
            years: 10.0,
            monthly_rent: 2_200.0,
            rent_increase_pct: 3.0,
            renters_insurance_monthly: 22.0,
            home_price: 500_000.0,
            down_payment_pct: 20.0,
            mortgage_rate_pct: 6.5,
            loan_term_years: 30.0,
            property_tax_pct: 1.2,
            home_insurance_annual: 1_800.0,
            maintenance_pct: 1.0,
            hoa_monthly: 150.0,
            closing_cost_pct: 3.0,
            selling_cost_pct: 6.0,
            home_appreciation_pct: 3.0,
            investment_return_pct: 5.0,
            annual_inflation_pct: 2.0,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Buy,
    Rent,
    Tie,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentVsBuyAssumptions {
    pub years: u32,
    pub monthly_mortgage_payment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentVsBuyPoint {
    pub year: u32,
    pub owner_net_cost: f64,
    pub renter_net_cost: f64,
    pub owner_outflow: f64,
    pub renter_outflow: f64,
    pub owner_equity: f64,
    pub renter_investment: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentVsBuySummary {
    pub winner: Winner,
    /// Fractional year of the first month owning was no more expensive than renting.
    pub break_even_year: Option<f64>,
    /// Renter net cost minus owner net cost; positive favours buying.
    pub cost_difference: f64,
    pub owner_net_cost: f64,
    pub renter_net_cost: f64,
    pub owner_outflow: f64,
    pub renter_outflow: f64,
    pub owner_equity: f64,
    pub renter_investment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentVsBuyAnalysis {
    pub assumptions: RentVsBuyAssumptions,
    pub timeline: Vec<RentVsBuyPoint>,
    pub summary: RentVsBuySummary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetirementInputs {
    pub current_age: f64,
    pub retirement_age: f64,
    pub life_expectancy: f64,
    pub current_savings: f64,
    pub annual_contribution: f64,
    pub employer_match_annual: f64,
    pub contribution_growth_pct: f64,
    pub pre_retirement_return_pct: f64,
    pub post_retirement_return_pct: f64,
    pub investment_drag_pct: f64,
    pub monthly_housing: f64,
    pub monthly_utilities: f64,
    pub monthly_food: f64,
    pub monthly_transportation: f64,
    pub monthly_healthcare: f64,
    pub monthly_lifestyle: f64,
    pub monthly_travel: f64,
    pub monthly_other: f64,
    pub annual_non_monthly_expenses: f64,
    pub social_security_annual: f64,
    pub pension_annual: f64,
    pub benefit_increase_pct: f64,
    pub inflation_pct: f64,
    pub retirement_income_tax_pct: f64,
    pub safe_withdrawal_rate_pct: f64,
}

impl Default for RetirementInputs {
    fn default() -> Self {
        Self {
            current_age: 35.0,
            retirement_age: 67.0,
            life_expectancy: 92.0,
            current_savings: 120_000.0,
            annual_contribution: 18_000.0,
            employer_match_annual: 5_000.0,
            contribution_growth_pct: 2.0,
            pre_retirement_return_pct: 7.0,
            post_retirement_return_pct: 5.0,
            investment_drag_pct: 1.0,
            monthly_housing: 1_800.0,
            monthly_utilities: 350.0,
            monthly_food: 700.0,
            monthly_transportation: 450.0,
            monthly_healthcare: 500.0,
            monthly_lifestyle: 550.0,
            monthly_travel: 300.0,
            monthly_other: 300.0,
            annual_non_monthly_expenses: 6_000.0,
            social_security_annual: 32_000.0,
            pension_annual: 0.0,
            benefit_increase_pct: 2.0,
            inflation_pct: 2.5,
            retirement_income_tax_pct: 12.0,
            safe_withdrawal_rate_pct: 4.0,
        }
    }
}

/// One budget category with its monthly amount in today's money.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpenseRow {
    pub label: &'static str,
    pub today: f64,
}

impl RetirementInputs {
    /// Expense categories in display order, negative amounts floored at zero.
    pub fn expense_rows(&self) -> [ExpenseRow; 9] {
        let row = |label, amount: f64| ExpenseRow {
            label,
            today: amount.max(0.0),
        };
        [
            row("Housing", self.monthly_housing),
            row("Utilities", self.monthly_utilities),
            row("Food & Groceries", self.monthly_food),
            row("Transportation", self.monthly_transportation),
            row("Healthcare", self.monthly_healthcare),
            row("Lifestyle", self.monthly_lifestyle),
            row("Travel", self.monthly_travel),
            row("Other", self.monthly_other),
            row(
                "Non-Monthly Costs (Avg)",
                self.annual_non_monthly_expenses.max(0.0) / 12.0,
            ),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementAssumptions {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub years_to_retirement: u32,
    pub safe_withdrawal_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementPoint {
    pub age: u32,
    pub is_retired: bool,
    pub balance: f64,
    pub contribution: f64,
    pub withdrawal: f64,
    pub retirement_income: f64,
    pub retirement_spending: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBudgetRow {
    pub label: String,
    pub today: f64,
    pub at_retirement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementSummary {
    pub balance_at_retirement: f64,
    pub required_nest_egg: f64,
    pub final_balance: f64,
    /// Required nest egg minus balance at retirement; on track when <= 0.
    pub target_gap: f64,
    pub on_track: bool,
    pub run_out_age: Option<u32>,
    pub cumulative_contributions: f64,
    pub cumulative_withdrawals: f64,
    pub monthly_gap_at_retirement: f64,
    pub first_year_gap: f64,
    pub planned_monthly_spend_today: f64,
    pub planned_monthly_spend_at_retirement: f64,
    pub sustainable_monthly_spend: f64,
    pub sustainable_annual_spend: f64,
    pub monthly_budget_delta: f64,
    pub monthly_budget_rows: Vec<MonthlyBudgetRow>,
    pub annual_spending_today: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementAnalysis {
    pub assumptions: RetirementAssumptions,
    pub timeline: Vec<RetirementPoint>,
    pub summary: RetirementSummary,
}
