//! Gold futures contract metrics: margin, exit value, ROI and CAGR for a
//! block of contracts held to expiry while spot compounds.

use chrono::NaiveDate;

use super::error::AccrueError;

pub const DAYS_PER_YEAR: f64 = 365.25;

/// Default contract expiry (26 December 2031).
pub fn default_expiry() -> NaiveDate {
    NaiveDate::from_ymd_opt(2031, 12, 26).unwrap_or(NaiveDate::MAX)
}

/// Years from `today` to `expiry`, counting today as a full day.
pub fn contract_period_years(today: NaiveDate, expiry: NaiveDate) -> f64 {
    let days = (expiry - today).num_days() + 1;
    days as f64 / DAYS_PER_YEAR
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractParameters {
    pub spot_price_usd: f64,
    pub eur_usd_rate: f64,
    pub contract_price_eur: f64,
    pub total_contracts: u32,
    /// Ounces per contract.
    pub contract_size: f64,
    pub compounding_rate: f64,
    pub period_years: f64,
    pub margin_requirement: f64,
}

impl ContractParameters {
    /// Defaults with the holding period measured from `today`.
    pub fn defaults_as_of(today: NaiveDate) -> Self {
        Self {
            spot_price_usd: 3924.0,
            eur_usd_rate: 1.2,
            contract_price_eur: 3945.0,
            total_contracts: 316,
            contract_size: 100.0,
            compounding_rate: 0.0816,
            period_years: contract_period_years(today, default_expiry()),
            margin_requirement: 0.08,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractMetrics {
    pub spot_price_eur: f64,
    pub contract_price_usd: f64,
    pub total_ounces: f64,
    pub exit_price_eur: f64,
    pub exit_price_usd: f64,
    pub initial_margin_per_contract: f64,
    pub total_initial_margin: f64,
    pub contract_value: f64,
    pub exit_value: f64,
    pub total_gain: f64,
    pub roi: f64,
    pub cagr: f64,
}

impl ContractMetrics {
    pub fn compute(p: &ContractParameters) -> Result<Self, AccrueError> {
        if !(p.eur_usd_rate > 0.0) {
            return Err(AccrueError::domain(0, "eur_usd_rate", p.eur_usd_rate, "must be positive"));
        }
        if !(p.period_years > 0.0) {
            return Err(AccrueError::domain(
                0,
                "period_years",
                p.period_years,
                "contract must not have expired",
            ));
        }

        let spot_price_eur = p.spot_price_usd / p.eur_usd_rate;
        let contract_price_usd = p.contract_price_eur * p.eur_usd_rate;
        let total_ounces = f64::from(p.total_contracts) * p.contract_size;
        let exit_price_eur = spot_price_eur * (1.0 + p.compounding_rate).powf(p.period_years);
        let exit_price_usd = exit_price_eur * p.eur_usd_rate;

        let initial_margin_per_contract =
            p.margin_requirement * p.contract_size * p.contract_price_eur;
        let total_initial_margin = initial_margin_per_contract * f64::from(p.total_contracts);
        if !(total_initial_margin > 0.0) {
            return Err(AccrueError::domain(
                0,
                "total_initial_margin",
                total_initial_margin,
                "ROI needs a positive margin",
            ));
        }

        let contract_value = p.contract_price_eur * total_ounces;
        let exit_value = exit_price_eur * total_ounces;
        let total_gain = exit_value - contract_value;
        let roi = total_gain / total_initial_margin;
        let cagr = (1.0 + roi).powf(1.0 / p.period_years) - 1.0;

        Ok(ContractMetrics {
            spot_price_eur,
            contract_price_usd,
            total_ounces,
            exit_price_eur,
            exit_price_usd,
            initial_margin_per_contract,
            total_initial_margin,
            contract_value,
            exit_value,
            total_gain,
            roi,
            cagr,
        })
    }
}
