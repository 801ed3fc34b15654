//! Sequence generator: runs the single-period calculator across a horizon.

use log::{debug, warn};

use super::error::AccrueError;
use super::parameters::{ParameterSet, SpotQuote};
use super::period::{PeriodState, compute_single_period_with};
use super::policy::ProjectionPolicy;

pub const DEFAULT_PERIOD_COUNT: u32 = 25;

/// Project `period_count` periods with the default policy. `None` parameters
/// means [`ParameterSet::default`].
pub fn compute_projection(
    initial_capital: f64,
    unit_spot_price: f64,
    period_count: u32,
    parameters: Option<&ParameterSet>,
) -> Result<Vec<PeriodState>, AccrueError> {
    let defaults = ParameterSet::default();
    compute_projection_with(
        initial_capital,
        unit_spot_price,
        period_count,
        parameters.unwrap_or(&defaults),
        &ProjectionPolicy::default(),
    )
}

/// Project `period_count` periods under an explicit policy.
///
/// Either every period is produced or the first failure is returned wrapped
/// in [`AccrueError::PropagatedCalculation`]; no partial sequence escapes.
pub fn compute_projection_with(
    initial_capital: f64,
    unit_spot_price: f64,
    period_count: u32,
    parameters: &ParameterSet,
    policy: &ProjectionPolicy,
) -> Result<Vec<PeriodState>, AccrueError> {
    debug!(
        "projecting {period_count} periods: capital={initial_capital} spot={unit_spot_price}"
    );
    let mut states: Vec<PeriodState> = Vec::new();

    for period_index in 1..=period_count {
        let state = compute_single_period_with(
            period_index,
            states.last(),
            initial_capital,
            unit_spot_price,
            parameters,
            policy,
        )
        .map_err(|e| AccrueError::PropagatedCalculation {
            period_index,
            source: Box::new(e),
        })?;

        if state.realizable_gain < 0.0 {
            warn!(
                "period {period_index}: holding costs exceed net gain ({:.2})",
                state.realizable_gain
            );
        }
        states.push(state);
    }

    Ok(states)
}

/// Everything needed to run one projection.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    pub initial_capital: f64,
    pub spot: SpotQuote,
    pub period_count: u32,
    pub parameters: ParameterSet,
    pub policy: ProjectionPolicy,
    pub unit_subscription: Option<f64>,
}

impl ProjectionConfig {
    pub fn run(&self) -> Result<Vec<PeriodState>, AccrueError> {
        let spot = self.spot.in_eur()?;
        compute_projection_with(
            self.initial_capital,
            spot,
            self.period_count,
            &self.parameters,
            &self.policy,
        )
    }
}

/// Headline figures for a completed projection.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionSummary {
    pub period_count: usize,
    pub total_days: u64,
    pub initial_balance: f64,
    pub final_value: f64,
    pub cumulative_return: f64,
    /// Cumulative return over the first period's beginning balance.
    pub roi_on_initial: f64,
    /// Cumulative return over the total unit subscription, when supplied.
    pub roi_on_subscription: Option<f64>,
    pub final_units: f64,
}

impl ProjectionSummary {
    pub fn from_states(states: &[PeriodState], unit_subscription: Option<f64>) -> Option<Self> {
        let first = states.first()?;
        let last = states.last()?;

        let roi_on_initial = if first.beginning_balance > 0.0 {
            last.cumulative_return / first.beginning_balance
        } else {
            0.0
        };
        let roi_on_subscription = unit_subscription
            .filter(|s| *s > 0.0)
            .map(|s| last.cumulative_return / s);

        Some(ProjectionSummary {
            period_count: states.len(),
            total_days: states.iter().map(|s| u64::from(s.duration_days)).sum(),
            initial_balance: first.beginning_balance,
            final_value: last.ending_total_value,
            cumulative_return: last.cumulative_return,
            roi_on_initial,
            roi_on_subscription,
            final_units: last.ending_units_after_tax,
        })
    }
}
