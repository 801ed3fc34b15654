//! Period-level policies: the one-time opening markup and the
//! per-period duration schedule.

use std::collections::BTreeMap;

use super::error::AccrueError;
use super::parameters::ParameterSet;

pub const DEFAULT_PERIOD_DAYS: u32 = 65;
pub const DEFAULT_FINAL_PERIOD: u32 = 25;
pub const DEFAULT_FINAL_PERIOD_DAYS: u32 = 53;
pub const DEFAULT_MARKUP_FEE_PER_UNIT: f64 = 13.0;

/// Deduction taken from the initial capital before the first purchase.
/// Later periods never carry a markup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkupPolicy {
    None,
    /// A flat fee per unit purchasable at the grossed-up opening price.
    PerUnitFee { fee_per_unit: f64 },
}

impl Default for MarkupPolicy {
    fn default() -> Self {
        MarkupPolicy::PerUnitFee {
            fee_per_unit: DEFAULT_MARKUP_FEE_PER_UNIT,
        }
    }
}

impl MarkupPolicy {
    /// Markup owed on `initial_capital` at the given spot quote.
    pub fn markup(
        &self,
        initial_capital: f64,
        unit_spot_price: f64,
        parameters: &ParameterSet,
    ) -> Result<f64, AccrueError> {
        match *self {
            MarkupPolicy::None => Ok(0.0),
            MarkupPolicy::PerUnitFee { fee_per_unit } => {
                let net_of_brokerage = 1.0 - parameters.brokerage_rate;
                if net_of_brokerage <= 0.0 {
                    return Err(AccrueError::domain(
                        1,
                        "brokerage_rate",
                        parameters.brokerage_rate,
                        "markup requires a brokerage rate below 1",
                    ));
                }
                let price_per_unit = parameters.market_price(unit_spot_price) / net_of_brokerage;
                if !(price_per_unit > 0.0) {
                    return Err(AccrueError::domain(
                        1,
                        "price_per_unit",
                        price_per_unit,
                        "opening unit price must be positive",
                    ));
                }
                let units = initial_capital / price_per_unit;
                Ok(units * fee_per_unit / net_of_brokerage)
            }
        }
    }
}

/// Length in days of each period.
#[derive(Debug, Clone, PartialEq)]
pub enum DurationSchedule {
    Uniform {
        days: u32,
    },
    /// Every period has `days`, except `final_period` which has `final_days`.
    ShortFinalPeriod {
        days: u32,
        final_period: u32,
        final_days: u32,
    },
    /// Per-index overrides; unlisted periods use `default_days`.
    Explicit {
        days: BTreeMap<u32, u32>,
        default_days: u32,
    },
}

impl Default for DurationSchedule {
    fn default() -> Self {
        DurationSchedule::ShortFinalPeriod {
            days: DEFAULT_PERIOD_DAYS,
            final_period: DEFAULT_FINAL_PERIOD,
            final_days: DEFAULT_FINAL_PERIOD_DAYS,
        }
    }
}

impl DurationSchedule {
    pub fn days_for(&self, period_index: u32) -> u32 {
        match self {
            DurationSchedule::Uniform { days } => *days,
            DurationSchedule::ShortFinalPeriod {
                days,
                final_period,
                final_days,
            } => {
                if period_index == *final_period {
                    *final_days
                } else {
                    *days
                }
            }
            DurationSchedule::Explicit { days, default_days } => {
                days.get(&period_index).copied().unwrap_or(*default_days)
            }
        }
    }

    /// Sum of period lengths for periods `1..=period_count`.
    pub fn total_days(&self, period_count: u32) -> u64 {
        (1..=period_count).map(|i| u64::from(self.days_for(i))).sum()
    }
}

/// The policies applied on top of a [`ParameterSet`] for a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionPolicy {
    pub markup: MarkupPolicy,
    pub schedule: DurationSchedule,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parameters::GRAMS_PER_TROY_OUNCE;
    use approx::assert_relative_eq;

    #[test]
    fn no_markup_is_zero() {
        let m = MarkupPolicy::None
            .markup(1_000_000.0, 3500.0, &ParameterSet::default())
            .unwrap();
        assert_eq!(m, 0.0);
    }

    #[test]
    fn per_unit_fee_markup() {
        let params = ParameterSet::default();
        let spot = 115.0 * GRAMS_PER_TROY_OUNCE;
        let markup = MarkupPolicy::default()
            .markup(1_000_000.0, spot, &params)
            .unwrap();
        // price per unit = (115 + 15) / 0.999; units = capital / price
        let units = 1_000_000.0 / (130.0 / 0.999);
        assert_relative_eq!(markup, units * 13.0 / 0.999, epsilon = 1e-6);
    }

    #[test]
    fn markup_rejects_full_brokerage() {
        let params = ParameterSet {
            brokerage_rate: 1.0,
            ..ParameterSet::default()
        };
        let err = MarkupPolicy::default()
            .markup(1_000.0, 3500.0, &params)
            .unwrap_err();
        assert!(matches!(err, AccrueError::ArithmeticDomain { quantity, .. } if quantity == "brokerage_rate"));
    }

    #[test]
    fn default_schedule_shortens_period_25() {
        let s = DurationSchedule::default();
        assert_eq!(s.days_for(1), 65);
        assert_eq!(s.days_for(24), 65);
        assert_eq!(s.days_for(25), 53);
        assert_eq!(s.days_for(26), 65);
    }

    #[test]
    fn explicit_schedule_falls_back_to_default() {
        let s = DurationSchedule::Explicit {
            days: BTreeMap::from([(1, 30), (3, 10)]),
            default_days: 90,
        };
        assert_eq!(s.days_for(1), 30);
        assert_eq!(s.days_for(2), 90);
        assert_eq!(s.days_for(3), 10);
    }

    #[test]
    fn total_days_sums_schedule() {
        assert_eq!(DurationSchedule::default().total_days(25), 24 * 65 + 53);
        assert_eq!(DurationSchedule::Uniform { days: 90 }.total_days(4), 360);
        assert_eq!(DurationSchedule::Uniform { days: 90 }.total_days(0), 0);
    }
}
