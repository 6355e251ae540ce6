use super::rates::{annual_to_monthly_rate, clamp, mortgage_payment};
use super::types::{
    RentVsBuyAnalysis, RentVsBuyAssumptions, RentVsBuyInputs, RentVsBuyPoint, RentVsBuySummary,
    Winner,
};

const MIN_OUTSTANDING_BALANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy)]
struct Resolved {
    years: u32,
    monthly_rent: f64,
    renters_insurance_monthly: f64,
    home_price: f64,
    down_payment_rate: f64,
    mortgage_rate_pct: f64,
    loan_term_years: u32,
    property_tax_rate: f64,
    home_insurance_annual: f64,
    maintenance_rate: f64,
    hoa_monthly: f64,
    closing_cost_rate: f64,
    selling_cost_rate: f64,
}

impl Resolved {
    fn from_inputs(inputs: &RentVsBuyInputs) -> Self {
        Self {
            years: clamp(inputs.years.round(), 1.0, 50.0) as u32,
            monthly_rent: inputs.monthly_rent.max(0.0),
            renters_insurance_monthly: inputs.renters_insurance_monthly.max(0.0),
            home_price: inputs.home_price.max(0.0),
            down_payment_rate: clamp(inputs.down_payment_pct, 0.0, 100.0) / 100.0,
            mortgage_rate_pct: inputs.mortgage_rate_pct.max(0.0),
            loan_term_years: clamp(inputs.loan_term_years.round(), 1.0, 40.0) as u32,
            property_tax_rate: inputs.property_tax_pct.max(0.0) / 100.0,
            home_insurance_annual: inputs.home_insurance_annual.max(0.0),
            maintenance_rate: inputs.maintenance_pct.max(0.0) / 100.0,
            hoa_monthly: inputs.hoa_monthly.max(0.0),
            closing_cost_rate: inputs.closing_cost_pct.max(0.0) / 100.0,
            selling_cost_rate: clamp(inputs.selling_cost_pct, 0.0, 100.0) / 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct MonthlyGrowth {
    rent: f64,
    home_value: f64,
    investment: f64,
    inflation: f64,
}

#[derive(Debug)]
struct Mortgage {
    balance: f64,
    payment: f64,
    monthly_rate: f64,
    months: u32,
}

impl Mortgage {
    /// Cash paid this month. Principal never exceeds the outstanding balance.
    fn pay(&mut self, month: u32) -> f64 {
        if month > self.months || self.balance <= MIN_OUTSTANDING_BALANCE {
            return 0.0;
        }
        let interest = self.balance * self.monthly_rate;
        let principal = (self.payment - interest).max(0.0).min(self.balance);
        self.balance -= principal;
        interest + principal
    }
}

#[derive(Debug)]
struct Household {
    rent: f64,
    renters_insurance: f64,
    home_insurance: f64,
    hoa: f64,
    home_value: f64,
    owner_outflow: f64,
    renter_outflow: f64,
    renter_investment: f64,
}

impl Household {
    fn grow_costs(&mut self, growth: MonthlyGrowth) {
        self.rent *= 1.0 + growth.rent;
        self.renters_insurance *= 1.0 + growth.inflation;
        self.home_insurance *= 1.0 + growth.inflation;
        self.hoa *= 1.0 + growth.inflation;
        self.home_value *= 1.0 + growth.home_value;
    }
}

pub fn compute_rent_vs_buy(inputs: &RentVsBuyInputs) -> RentVsBuyAnalysis {
    let resolved = Resolved::from_inputs(inputs);

    let down_payment = resolved.home_price * resolved.down_payment_rate;
    let closing_costs = resolved.home_price * resolved.closing_cost_rate;
    let principal = resolved.home_price - down_payment;
    let monthly_mortgage_payment = mortgage_payment(
        principal,
        resolved.mortgage_rate_pct,
        resolved.loan_term_years,
    );

    let growth = MonthlyGrowth {
        rent: annual_to_monthly_rate(inputs.rent_increase_pct),
        home_value: annual_to_monthly_rate(inputs.home_appreciation_pct),
        investment: annual_to_monthly_rate(inputs.investment_return_pct),
        inflation: annual_to_monthly_rate(inputs.annual_inflation_pct),
    };

    let mut mortgage = Mortgage {
        balance: principal,
        payment: monthly_mortgage_payment,
        monthly_rate: resolved.mortgage_rate_pct / 100.0 / 12.0,
        months: resolved.loan_term_years * 12,
    };

    // The renter keeps the upfront purchase cash invested.
    let mut household = Household {
        rent: resolved.monthly_rent,
        renters_insurance: resolved.renters_insurance_monthly,
        home_insurance: resolved.home_insurance_annual / 12.0,
        hoa: resolved.hoa_monthly,
        home_value: resolved.home_price,
        owner_outflow: down_payment + closing_costs,
        renter_outflow: 0.0,
        renter_investment: down_payment + closing_costs,
    };

    let mut timeline = Vec::with_capacity(resolved.years as usize);
    let mut break_even_year = None;

    for month in 1..=resolved.years * 12 {
        if month > 1 {
            household.grow_costs(growth);
        }
        household.renter_investment *= 1.0 + growth.investment;

        let mortgage_paid = mortgage.pay(month);
        let property_tax = household.home_value * resolved.property_tax_rate / 12.0;
        let maintenance = household.home_value * resolved.maintenance_rate / 12.0;

        let owner_cost =
            mortgage_paid + property_tax + maintenance + household.home_insurance + household.hoa;
        let renter_cost = household.rent + household.renters_insurance;

        household.owner_outflow += owner_cost;
        household.renter_outflow += renter_cost;
        // Whichever side is cheaper invests the difference; negative when renting costs more.
        household.renter_investment += owner_cost - renter_cost;

        let owner_equity =
            household.home_value * (1.0 - resolved.selling_cost_rate) - mortgage.balance;
        let owner_net_cost = household.owner_outflow - owner_equity;
        let renter_net_cost = household.renter_outflow - household.renter_investment;

        if break_even_year.is_none() && owner_net_cost <= renter_net_cost {
            break_even_year = Some(month as f64 / 12.0);
        }

        if month % 12 == 0 {
            timeline.push(RentVsBuyPoint {
                year: month / 12,
                owner_net_cost,
                renter_net_cost,
                owner_outflow: household.owner_outflow,
                renter_outflow: household.renter_outflow,
                owner_equity,
                renter_investment: household.renter_investment,
            });
        }
    }

    let final_year = timeline.last().copied().unwrap_or(RentVsBuyPoint {
        year: resolved.years,
        owner_net_cost: 0.0,
        renter_net_cost: 0.0,
        owner_outflow: 0.0,
        renter_outflow: 0.0,
        owner_equity: 0.0,
        renter_investment: 0.0,
    });

    let cost_difference = final_year.renter_net_cost - final_year.owner_net_cost;
    let winner = if cost_difference > 0.0 {
        Winner::Buy
    } else if cost_difference < 0.0 {
        Winner::Rent
    } else {
        Winner::Tie
    };

    RentVsBuyAnalysis {
        assumptions: RentVsBuyAssumptions {
            years: resolved.years,
            monthly_mortgage_payment,
        },
        timeline,
        summary: RentVsBuySummary {
            winner,
            break_even_year,
            cost_difference,
            owner_net_cost: final_year.owner_net_cost,
            renter_net_cost: final_year.renter_net_cost,
            owner_outflow: final_year.owner_outflow,
            renter_outflow: final_year.renter_outflow,
            owner_equity: final_year.owner_equity,
            renter_investment: final_year.renter_investment,
        },
    }
}
