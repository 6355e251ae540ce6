use super::rates::{annual_rate_multiplier, clamp};
use super::types::{
    MonthlyBudgetRow, RetirementAnalysis, RetirementAssumptions, RetirementInputs,
    RetirementPoint, RetirementSummary,
};

const MIN_TAX_DIVISOR: f64 = 0.01;

#[derive(Debug, Clone, Copy)]
struct ResolvedAges {
    current: u32,
    retirement: u32,
    life_expectancy: u32,
}

impl ResolvedAges {
    fn from_inputs(inputs: &RetirementInputs) -> Self {
        let current = clamp(inputs.current_age.round(), 18.0, 90.0) as u32;
        let retirement =
            (clamp(inputs.retirement_age.round(), 40.0, 95.0) as u32).max(current + 1);
        let life_expectancy =
            (clamp(inputs.life_expectancy.round(), 55.0, 110.0) as u32).max(retirement + 1);
        Self {
            current,
            retirement,
            life_expectancy,
        }
    }

    fn years_to_retirement(self) -> u32 {
        self.retirement - self.current
    }
}

/// Pre-tax amount that must be withdrawn to net `amount` after the flat retirement tax.
fn gross_up(amount: f64, tax_rate: f64) -> f64 {
    amount / (1.0 - tax_rate).max(MIN_TAX_DIVISOR)
}

#[derive(Debug)]
struct Portfolio {
    balance: f64,
    annual_contribution: f64,
    annual_match: f64,
    social_security: f64,
    pension: f64,
    retirement_spending: f64,
    cumulative_contributions: f64,
    cumulative_withdrawals: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct YearFlows {
    contribution: f64,
    withdrawal: f64,
    income: f64,
    spending: f64,
}

#[derive(Debug, Clone, Copy)]
struct Growth {
    contribution: f64,
    inflation: f64,
    benefits: f64,
}

impl Portfolio {
    fn accumulate(&mut self, growth: Growth) -> YearFlows {
        let contribution = self.annual_contribution + self.annual_match;
        self.balance += contribution;
        self.cumulative_contributions += contribution;

        self.annual_contribution *= growth.contribution;
        self.annual_match *= growth.contribution;

        YearFlows {
            contribution,
            ..YearFlows::default()
        }
    }

    fn decumulate(&mut self, growth: Growth, tax_rate: f64) -> YearFlows {
        let mut flows = YearFlows {
            spending: self.retirement_spending,
            income: self.social_security + self.pension,
            ..YearFlows::default()
        };

        let shortfall = flows.spending - flows.income;
        if shortfall > 0.0 {
            flows.withdrawal = gross_up(shortfall, tax_rate);
            self.balance -= flows.withdrawal;
            self.cumulative_withdrawals += flows.withdrawal;
        } else if shortfall < 0.0 {
            // Surplus guaranteed income is reinvested untaxed and counted as a contribution.
            flows.contribution = -shortfall;
            self.balance += flows.contribution;
            self.cumulative_contributions += flows.contribution;
        }

        self.retirement_spending *= growth.inflation;
        self.social_security *= growth.benefits;
        self.pension *= growth.benefits;

        flows
    }
}

pub fn compute_retirement(inputs: &RetirementInputs) -> RetirementAnalysis {
    let ages = ResolvedAges::from_inputs(inputs);

    let current_savings = inputs.current_savings.max(0.0);
    let social_security_start = inputs.social_security_annual.max(0.0);
    let pension_start = inputs.pension_annual.max(0.0);
    let investment_drag_pct = inputs.investment_drag_pct.max(0.0);
    let tax_rate = clamp(inputs.retirement_income_tax_pct, 0.0, 95.0) / 100.0;
    let safe_withdrawal_rate = clamp(inputs.safe_withdrawal_rate_pct, 0.5, 15.0) / 100.0;

    let growth = Growth {
        contribution: annual_rate_multiplier(inputs.contribution_growth_pct),
        inflation: annual_rate_multiplier(inputs.inflation_pct),
        benefits: annual_rate_multiplier(inputs.benefit_increase_pct),
    };
    let inflation_to_retirement = growth.inflation.powi(ages.years_to_retirement() as i32);

    let expense_rows = inputs.expense_rows();
    let planned_monthly_spend_today: f64 = expense_rows.iter().map(|row| row.today).sum();
    let annual_spending_today = planned_monthly_spend_today * 12.0;
    let first_year_retirement_spending = annual_spending_today * inflation_to_retirement;

    let first_year_gap =
        (first_year_retirement_spending - social_security_start - pension_start).max(0.0);
    let required_nest_egg = gross_up(first_year_gap, tax_rate) / safe_withdrawal_rate;

    let mut portfolio = Portfolio {
        balance: current_savings,
        annual_contribution: inputs.annual_contribution.max(0.0),
        annual_match: inputs.employer_match_annual.max(0.0),
        social_security: social_security_start,
        pension: pension_start,
        retirement_spending: first_year_retirement_spending,
        cumulative_contributions: 0.0,
        cumulative_withdrawals: 0.0,
    };

    let mut timeline = Vec::with_capacity((ages.life_expectancy - ages.current + 1) as usize);
    let mut balance_at_retirement = current_savings;
    let mut run_out_age = None;

    for age in ages.current..=ages.life_expectancy {
        let is_retired = age >= ages.retirement;
        let gross_return_pct = if is_retired {
            inputs.post_retirement_return_pct
        } else {
            inputs.pre_retirement_return_pct
        };
        portfolio.balance *= annual_rate_multiplier(gross_return_pct - investment_drag_pct);

        let flows = if is_retired {
            let flows = portfolio.decumulate(growth, tax_rate);
            if run_out_age.is_none() && portfolio.balance <= 0.0 {
                run_out_age = Some(age);
            }
            flows
        } else {
            let flows = portfolio.accumulate(growth);
            if age + 1 == ages.retirement {
                balance_at_retirement = portfolio.balance;
            }
            flows
        };

        timeline.push(RetirementPoint {
            age,
            is_retired,
            balance: portfolio.balance,
            contribution: flows.contribution,
            withdrawal: flows.withdrawal,
            retirement_income: flows.income,
            retirement_spending: flows.spending,
        });
    }

    let final_balance = timeline.last().map_or(0.0, |point| point.balance);
    let target_gap = required_nest_egg - balance_at_retirement;

    let planned_monthly_spend_at_retirement = first_year_retirement_spending / 12.0;
    let sustainable_net_portfolio_spend =
        balance_at_retirement * safe_withdrawal_rate * (1.0 - tax_rate);
    let sustainable_annual_spend =
        social_security_start + pension_start + sustainable_net_portfolio_spend;
    let sustainable_monthly_spend = sustainable_annual_spend / 12.0;

    let monthly_budget_rows = expense_rows
        .iter()
        .map(|row| MonthlyBudgetRow {
            label: row.label.to_string(),
            today: row.today,
            at_retirement: row.today * inflation_to_retirement,
        })
        .collect();

    RetirementAnalysis {
        assumptions: RetirementAssumptions {
            current_age: ages.current,
            retirement_age: ages.retirement,
            life_expectancy: ages.life_expectancy,
            years_to_retirement: ages.years_to_retirement(),
            safe_withdrawal_rate,
        },
        timeline,
        summary: RetirementSummary {
            balance_at_retirement,
            required_nest_egg,
            final_balance,
            target_gap,
            on_track: target_gap <= 0.0,
            run_out_age,
            cumulative_contributions: portfolio.cumulative_contributions,
            cumulative_withdrawals: portfolio.cumulative_withdrawals,
            monthly_gap_at_retirement: first_year_gap / 12.0,
            first_year_gap,
            planned_monthly_spend_today,
            planned_monthly_spend_at_retirement,
            sustainable_monthly_spend,
            sustainable_annual_spend,
            monthly_budget_delta: sustainable_monthly_spend - planned_monthly_spend_at_retirement,
            monthly_budget_rows,
            annual_spending_today,
        },
    }
}
