//! Single-period calculator.
//!
//! Each [`PeriodState`] is derived from the previous period's state and the
//! same [`ParameterSet`]. Period 1 is seeded from the initial capital and
//! the spot quote instead, and is the only period that carries a markup.

use log::trace;

use super::error::AccrueError;
use super::parameters::ParameterSet;
use super::policy::ProjectionPolicy;

/// Financial state of one projection period.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodState {
    pub period_index: u32,
    pub duration_days: u32,
    pub beginning_balance: f64,
    pub markup: f64,
    pub balance_net_of_markup: f64,
    pub brokerage_cost: f64,
    pub investable_after_brokerage: f64,
    pub unit_sourcing_cost_beginning: f64,
    pub units_acquired: f64,
    pub gross_margin: f64,
    pub operating_expense: f64,
    pub net_gain: f64,
    pub unit_sourcing_cost_end: f64,
    pub additional_units_from_gain: f64,
    pub units_total_end: f64,
    pub market_price_end: f64,
    pub gross_asset_value: f64,
    pub storage_cost: f64,
    pub insurance_cost: f64,
    pub total_holding_cost: f64,
    pub realizable_gain: f64,
    pub tax_amount: f64,
    pub net_of_tax_gain: f64,
    pub ending_units_after_tax: f64,
    pub ending_total_value: f64,
    pub cumulative_return: f64,
}

/// Compute one period using the default [`ProjectionPolicy`].
pub fn compute_single_period(
    period_index: u32,
    previous: Option<&PeriodState>,
    initial_capital: f64,
    unit_spot_price: f64,
    parameters: &ParameterSet,
) -> Result<PeriodState, AccrueError> {
    compute_single_period_with(
        period_index,
        previous,
        initial_capital,
        unit_spot_price,
        parameters,
        &ProjectionPolicy::default(),
    )
}

/// Where a period starts: its balance, markup, cost basis and market price.
struct Opening {
    beginning_balance: f64,
    markup: f64,
    unit_sourcing_cost_beginning: f64,
    market_price_end: f64,
}

fn opening(
    period_index: u32,
    previous: Option<&PeriodState>,
    initial_capital: f64,
    unit_spot_price: f64,
    parameters: &ParameterSet,
    policy: &ProjectionPolicy,
) -> Result<Opening, AccrueError> {
    match (period_index, previous) {
        (0, _) => Err(AccrueError::InvalidSequence {
            period_index,
            reason: "period index must be at least 1".into(),
        }),
        (1, Some(_)) => Err(AccrueError::InvalidSequence {
            period_index,
            reason: "the first period cannot have a previous period state".into(),
        }),
        (1, None) => {
            require_positive(1, "initial_capital", initial_capital)?;
            require_positive(1, "unit_spot_price", unit_spot_price)?;
            let markup = policy
                .markup
                .markup(initial_capital, unit_spot_price, parameters)?;
            Ok(Opening {
                beginning_balance: initial_capital,
                markup,
                unit_sourcing_cost_beginning: parameters
                    .spot_conversion
                    .sourcing_cost(unit_spot_price),
                market_price_end: parameters.market_price(unit_spot_price),
            })
        }
        (_, None) => Err(AccrueError::InvalidSequence {
            period_index,
            reason: "previous period state is required".into(),
        }),
        (_, Some(prev)) => {
            if prev.period_index + 1 != period_index {
                return Err(AccrueError::InvalidSequence {
                    period_index,
                    reason: format!(
                        "previous state is period {}, expected {}",
                        prev.period_index,
                        period_index - 1
                    ),
                });
            }
            Ok(Opening {
                beginning_balance: prev.ending_total_value,
                markup: 0.0,
                unit_sourcing_cost_beginning: prev.unit_sourcing_cost_end,
                market_price_end: prev.market_price_end
                    * (1.0 + parameters.periodic_cost_growth_rate),
            })
        }
    }
}

fn require_positive(period_index: u32, quantity: &str, value: f64) -> Result<(), AccrueError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(AccrueError::domain(
            period_index,
            quantity,
            value,
            "must be positive and finite",
        ))
    }
}

/// Compute one period under an explicit policy.
pub fn compute_single_period_with(
    period_index: u32,
    previous: Option<&PeriodState>,
    initial_capital: f64,
    unit_spot_price: f64,
    parameters: &ParameterSet,
    policy: &ProjectionPolicy,
) -> Result<PeriodState, AccrueError> {
    let open = opening(
        period_index,
        previous,
        initial_capital,
        unit_spot_price,
        parameters,
        policy,
    )?;
    let duration_days = policy.schedule.days_for(period_index);
    let days = f64::from(duration_days);

    let balance_net_of_markup = open.beginning_balance - open.markup;
    let brokerage_cost = balance_net_of_markup * parameters.brokerage_rate;
    let investable_after_brokerage = balance_net_of_markup - brokerage_cost;

    let cost_begin = open.unit_sourcing_cost_beginning;
    require_positive(period_index, "unit_sourcing_cost_beginning", cost_begin)?;
    let units_acquired = investable_after_brokerage / cost_begin;

    let gross_margin = units_acquired * days * parameters.margin_per_unit;
    let operating_expense = gross_margin * parameters.operating_expense_ratio;
    let net_gain = gross_margin - operating_expense;

    let cost_end = cost_begin * (1.0 + parameters.periodic_cost_growth_rate);
    require_positive(period_index, "unit_sourcing_cost_end", cost_end)?;
    let additional_units_from_gain = net_gain / cost_end;
    let units_total_end = units_acquired + additional_units_from_gain;

    let market_price_end = open.market_price_end;
    let gross_asset_value = units_total_end * market_price_end;
    let storage_cost = gross_asset_value * parameters.storage_cost_ratio;
    let insurance_cost = gross_asset_value * parameters.insurance_cost_ratio;
    let total_holding_cost = storage_cost + insurance_cost;
    let realizable_gain = net_gain - total_holding_cost;

    let tax_amount = realizable_gain * parameters.effective_tax_rate;
    let net_of_tax_gain = realizable_gain - tax_amount;

    let ending_units_after_tax = units_acquired + net_of_tax_gain / cost_end;
    // Valued at the lower of market price and replacement cost.
    let ending_total_value = market_price_end.min(cost_end) * ending_units_after_tax;
    let cumulative_return = ending_total_value - initial_capital;

    trace!(
        "period {period_index}: balance={:.2} units={:.4} realizable={:.2} ending={:.2}",
        open.beginning_balance,
        units_acquired,
        realizable_gain,
        ending_total_value
    );

    Ok(PeriodState {
        period_index,
        duration_days,
        beginning_balance: open.beginning_balance,
        markup: open.markup,
        balance_net_of_markup,
        brokerage_cost,
        investable_after_brokerage,
        unit_sourcing_cost_beginning: cost_begin,
        units_acquired,
        gross_margin,
        operating_expense,
        net_gain,
        unit_sourcing_cost_end: cost_end,
        additional_units_from_gain,
        units_total_end,
        market_price_end,
        gross_asset_value,
        storage_cost,
        insurance_cost,
        total_holding_cost,
        realizable_gain,
        tax_amount,
        net_of_tax_gain,
        ending_units_after_tax,
        ending_total_value,
        cumulative_return,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parameters::GRAMS_PER_TROY_OUNCE;
    use crate::domain::policy::{DurationSchedule, MarkupPolicy};
    use approx::assert_relative_eq;

    /// Spot quote giving an opening sourcing cost of exactly `cost`.
    fn spot_for_cost(cost: f64) -> f64 {
        (cost - 2.0) * GRAMS_PER_TROY_OUNCE
    }

    fn no_markup() -> ProjectionPolicy {
        ProjectionPolicy {
            markup: MarkupPolicy::None,
            schedule: DurationSchedule::Uniform { days: 65 },
        }
    }

    fn first(policy: &ProjectionPolicy) -> PeriodState {
        compute_single_period_with(
            1,
            None,
            3_375_000_000.0,
            spot_for_cost(117.29),
            &ParameterSet::default(),
            policy,
        )
        .unwrap()
    }

    #[test]
    fn first_period_matches_reference_row() {
        let q1 = first(&no_markup());
        assert_eq!(q1.period_index, 1);
        assert_eq!(q1.duration_days, 65);
        assert_relative_eq!(q1.brokerage_cost, 3_375_000.0, max_relative = 1e-9);
        assert_relative_eq!(q1.unit_sourcing_cost_beginning, 117.29, max_relative = 1e-9);
        assert_relative_eq!(q1.units_acquired, 28_746_738.0, max_relative = 1e-2);
        assert_relative_eq!(q1.gross_margin, 1_868_537_999.0, max_relative = 1e-2);
        assert_relative_eq!(q1.operating_expense, 467_134_500.0, max_relative = 1e-2);
        assert_relative_eq!(q1.units_total_end, 40_463_572.0, max_relative = 1e-2);
        assert_relative_eq!(q1.market_price_end, 130.29, max_relative = 1e-9);
        assert_relative_eq!(q1.gross_asset_value, 5_271_886_318.0, max_relative = 1e-2);
        assert_relative_eq!(q1.realizable_gain, 1_397_449_584.0, max_relative = 1e-2);
    }

    #[test]
    fn first_period_applies_default_markup() {
        let with = first(&ProjectionPolicy::default());
        let without = first(&no_markup());
        assert!(with.markup > 0.0);
        assert_relative_eq!(
            with.balance_net_of_markup,
            with.beginning_balance - with.markup,
            max_relative = 1e-12
        );
        assert!(with.units_acquired < without.units_acquired);
    }

    #[test]
    fn arithmetic_chain_is_consistent() {
        let p = first(&no_markup());
        let params = ParameterSet::default();
        assert_relative_eq!(p.net_gain, p.gross_margin - p.operating_expense);
        assert_relative_eq!(
            p.unit_sourcing_cost_end,
            p.unit_sourcing_cost_beginning * (1.0 + params.periodic_cost_growth_rate)
        );
        assert_relative_eq!(p.total_holding_cost, p.storage_cost + p.insurance_cost);
        assert_relative_eq!(p.net_of_tax_gain, p.realizable_gain - p.tax_amount);
        assert_relative_eq!(
            p.ending_total_value,
            p.unit_sourcing_cost_end * p.ending_units_after_tax,
            max_relative = 1e-12
        );
        assert_relative_eq!(p.cumulative_return, p.ending_total_value - 3_375_000_000.0);
    }

    #[test]
    fn second_period_carries_previous_state() {
        let policy = no_markup();
        let params = ParameterSet::default();
        let q1 = first(&policy);
        let q2 = compute_single_period_with(2, Some(&q1), 3_375_000_000.0, 0.0, &params, &policy)
            .unwrap();
        assert_eq!(q2.beginning_balance, q1.ending_total_value);
        assert_eq!(q2.markup, 0.0);
        assert_eq!(q2.unit_sourcing_cost_beginning, q1.unit_sourcing_cost_end);
        assert_eq!(
            q2.market_price_end,
            q1.market_price_end * (1.0 + params.periodic_cost_growth_rate)
        );
        assert_relative_eq!(q2.cumulative_return, q2.ending_total_value - 3_375_000_000.0);
    }

    #[test]
    fn later_period_without_previous_fails() {
        let err = compute_single_period(2, None, 1_000.0, 3500.0, &ParameterSet::default())
            .unwrap_err();
        assert!(matches!(err, AccrueError::InvalidSequence { period_index: 2, .. }));
    }

    #[test]
    fn period_zero_fails() {
        let err = compute_single_period(0, None, 1_000.0, 3500.0, &ParameterSet::default())
            .unwrap_err();
        assert!(matches!(err, AccrueError::InvalidSequence { period_index: 0, .. }));
    }

    #[test]
    fn first_period_with_previous_fails() {
        let q1 = first(&no_markup());
        let err = compute_single_period(1, Some(&q1), 1_000.0, 3500.0, &ParameterSet::default())
            .unwrap_err();
        assert!(matches!(err, AccrueError::InvalidSequence { period_index: 1, .. }));
    }

    #[test]
    fn out_of_order_previous_fails() {
        let q1 = first(&no_markup());
        let err = compute_single_period(3, Some(&q1), 1_000.0, 3500.0, &ParameterSet::default())
            .unwrap_err();
        assert!(matches!(err, AccrueError::InvalidSequence { period_index: 3, .. }));
    }

    #[test]
    fn non_positive_capital_fails() {
        for capital in [0.0, -5.0, f64::NAN] {
            let err = compute_single_period(1, None, capital, 3500.0, &ParameterSet::default())
                .unwrap_err();
            assert!(matches!(err, AccrueError::ArithmeticDomain { quantity, .. } if quantity == "initial_capital"));
        }
    }

    #[test]
    fn non_positive_sourcing_cost_fails() {
        let params = ParameterSet {
            spot_conversion: crate::domain::parameters::SpotConversion {
                units_per_quote: GRAMS_PER_TROY_OUNCE,
                sourcing_offset: -200.0,
            },
            ..ParameterSet::default()
        };
        let err = compute_single_period_with(1, None, 1_000.0, 3500.0, &params, &no_markup())
            .unwrap_err();
        assert!(matches!(
            err,
            AccrueError::ArithmeticDomain { quantity, .. } if quantity == "unit_sourcing_cost_beginning"
        ));
    }

    #[test]
    fn schedule_controls_duration() {
        let policy = ProjectionPolicy {
            markup: MarkupPolicy::None,
            schedule: DurationSchedule::Uniform { days: 30 },
        };
        let p = first(&policy);
        assert_eq!(p.duration_days, 30);
        assert_relative_eq!(p.gross_margin, p.units_acquired * 30.0, max_relative = 1e-12);
    }
}
