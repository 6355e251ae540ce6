pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    // NaN resolves to the lower bound.
    value.max(min).min(max)
}

/// Monthly rate `r_m` with `(1 + r_m)^12 = 1 + annual`, annual bounded to [-99%, 1000%].
pub fn annual_to_monthly_rate(annual_pct: f64) -> f64 {
    let bounded = clamp(annual_pct, -99.0, 1000.0) / 100.0;
    (1.0 + bounded).powf(1.0 / 12.0) - 1.0
}

pub fn annual_rate_multiplier(annual_pct: f64) -> f64 {
    1.0 + annual_pct / 100.0
}

/// Level monthly payment for a fixed-rate loan. Zero-rate loans repay straight-line.
pub fn mortgage_payment(principal: f64, annual_rate_pct: f64, term_years: u32) -> f64 {
    let months = term_years.saturating_mul(12).max(1);
    let monthly_rate = annual_rate_pct / 100.0 / 12.0;

    if principal <= 0.0 {
        return 0.0;
    }
    if monthly_rate == 0.0 {
        return principal / months as f64;
    }

    principal * monthly_rate / (1.0 - (1.0 + monthly_rate).powi(-i32::try_from(months).unwrap_or(i32::MAX)))
}
