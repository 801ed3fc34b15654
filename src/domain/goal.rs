//! Goal-based investment projections: how much to invest, as a lump sum or
//! monthly, to reach a target at a fixed annual growth rate.

use chrono::NaiveDate;

use super::contract::DAYS_PER_YEAR;

/// Annual growth assumed by the goal planner.
pub const DEFAULT_CAGR: f64 = 0.0816;

/// Longest horizon the planner will tabulate month by month.
pub const MAX_HORIZON_YEARS: f64 = 100.0;

const MIN_RECOMMENDED_LUMP_SUM: f64 = 100.0;
const MIN_RECOMMENDED_MONTHLY: f64 = 50.0;
const MIN_YEARS_TO_GOAL: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionPoint {
    pub month: u32,
    pub year: f64,
    pub value: f64,
    pub contributions: f64,
    pub gains: f64,
}

/// Monthly rate equivalent to an annual `cagr`.
pub fn monthly_rate(cagr: f64) -> f64 {
    (1.0 + cagr).powf(1.0 / 12.0) - 1.0
}

/// Lump sum that grows to `target` in `years`.
pub fn required_lump_sum(target: f64, years: f64, cagr: f64) -> f64 {
    target / (1.0 + cagr).powf(years)
}

/// Monthly contribution (from zero) that grows to `target` in `years`.
pub fn monthly_contribution(target: f64, years: f64, cagr: f64) -> f64 {
    let months = years * 12.0;
    if months == 0.0 {
        return target;
    }
    let rate = monthly_rate(cagr);
    if rate == 0.0 {
        return target / months;
    }
    let annuity_factor = ((1.0 + rate).powf(months) - 1.0) / rate;
    target / annuity_factor
}

fn horizon_months(years: f64) -> u32 {
    (years.min(MAX_HORIZON_YEARS) * 12.0).ceil().max(0.0) as u32
}

pub fn lump_sum_projection(initial: f64, years: f64, cagr: f64) -> Vec<ProjectionPoint> {
    let rate = monthly_rate(cagr);
    (0..=horizon_months(years))
        .map(|month| {
            let value = initial * (1.0 + rate).powf(f64::from(month));
            ProjectionPoint {
                month,
                year: f64::from(month) / 12.0,
                value,
                contributions: initial,
                gains: value - initial,
            }
        })
        .collect()
}

/// Contributions are added at the start of each month, then the month's
/// growth is applied.
pub fn monthly_projection(contribution: f64, years: f64, cagr: f64) -> Vec<ProjectionPoint> {
    let rate = monthly_rate(cagr);
    let mut value = 0.0;
    let mut contributions = 0.0;
    let mut points = Vec::new();

    for month in 0..=horizon_months(years) {
        if month > 0 {
            value = (value + contribution) * (1.0 + rate);
            contributions += contribution;
        }
        points.push(ProjectionPoint {
            month,
            year: f64::from(month) / 12.0,
            value,
            contributions,
            gains: value - contributions,
        });
    }
    points
}

#[derive(Debug, Clone, PartialEq)]
pub struct GoalProjection {
    pub target_amount: f64,
    pub years_to_goal: f64,
    pub required_lump_sum: f64,
    pub lump_sum_gains: f64,
    pub monthly_contribution: f64,
    pub total_contributions: f64,
    pub total_gains: f64,
    pub recommended_lump_sum: f64,
    pub recommended_monthly: f64,
}

impl GoalProjection {
    pub fn compute(target: f64, years: f64, cagr: f64) -> Self {
        let lump = required_lump_sum(target, years, cagr);
        let monthly = monthly_contribution(target, years, cagr);
        let total_contributions = monthly * years * 12.0;

        GoalProjection {
            target_amount: target,
            years_to_goal: years,
            required_lump_sum: lump,
            lump_sum_gains: target - lump,
            monthly_contribution: monthly,
            total_contributions,
            total_gains: target - total_contributions,
            recommended_lump_sum: (lump * 0.1).round().max(MIN_RECOMMENDED_LUMP_SUM),
            recommended_monthly: (monthly * 0.5).round().max(MIN_RECOMMENDED_MONTHLY),
        }
    }
}

/// Years from `today` until `target`, never less than half a year.
pub fn years_until(today: NaiveDate, target: NaiveDate) -> f64 {
    let days = (target - today).num_days() as f64;
    (days / DAYS_PER_YEAR).max(MIN_YEARS_TO_GOAL)
}
