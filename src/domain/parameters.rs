//! Projection parameter sets and spot price conversion.

use std::fmt;
use std::str::FromStr;

use super::error::AccrueError;

/// Troy ounce to gram conversion used for spot quotes.
pub const GRAMS_PER_TROY_OUNCE: f64 = 31.1034768;

/// Fallback EUR/USD rate when no live rate is configured.
pub const DEFAULT_EUR_USD_RATE: f64 = 1.2;

/// How a spot quote maps onto a per-unit sourcing cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotConversion {
    /// Mass units per quoted spot unit (grams per troy ounce).
    pub units_per_quote: f64,
    /// Fixed amount added to the per-unit spot price to get sourcing cost.
    pub sourcing_offset: f64,
}

impl Default for SpotConversion {
    fn default() -> Self {
        Self {
            units_per_quote: GRAMS_PER_TROY_OUNCE,
            sourcing_offset: 2.0,
        }
    }
}

impl SpotConversion {
    pub fn spot_per_unit(&self, unit_spot_price: f64) -> f64 {
        unit_spot_price / self.units_per_quote
    }

    pub fn sourcing_cost(&self, unit_spot_price: f64) -> f64 {
        self.spot_per_unit(unit_spot_price) + self.sourcing_offset
    }
}

/// Financial model constants driving a projection run.
///
/// The engine never clamps these; range checks live in
/// [`crate::domain::config_validation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSet {
    pub margin_per_unit: f64,
    pub operating_expense_ratio: f64,
    pub brokerage_rate: f64,
    pub storage_cost_ratio: f64,
    pub insurance_cost_ratio: f64,
    pub effective_tax_rate: f64,
    pub periodic_cost_growth_rate: f64,
    pub market_premium: f64,
    pub spot_conversion: SpotConversion,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            margin_per_unit: 1.00,
            operating_expense_ratio: 0.25,
            brokerage_rate: 0.001,
            storage_cost_ratio: 0.0005,
            insurance_cost_ratio: 0.00025,
            effective_tax_rate: 0.21,
            periodic_cost_growth_rate: 0.01977,
            market_premium: 15.0,
            spot_conversion: SpotConversion::default(),
        }
    }
}

impl ParameterSet {
    /// Market price per unit implied by a spot quote.
    pub fn market_price(&self, unit_spot_price: f64) -> f64 {
        self.spot_conversion.spot_per_unit(unit_spot_price) + self.market_premium
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Eur,
    Usd,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Eur => write!(f, "EUR"),
            Currency::Usd => write!(f, "USD"),
        }
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            other => Err(format!("unsupported currency '{other}'")),
        }
    }
}

/// A spot price quote per troy ounce, in either USD or EUR.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotQuote {
    pub price: f64,
    pub currency: Currency,
    pub eur_usd_rate: f64,
}

impl SpotQuote {
    pub fn eur(price: f64) -> Self {
        Self {
            price,
            currency: Currency::Eur,
            eur_usd_rate: DEFAULT_EUR_USD_RATE,
        }
    }

    pub fn usd(price: f64, eur_usd_rate: f64) -> Self {
        Self {
            price,
            currency: Currency::Usd,
            eur_usd_rate,
        }
    }

    /// Price in the engine currency (EUR).
    pub fn in_eur(&self) -> Result<f64, AccrueError> {
        match self.currency {
            Currency::Eur => Ok(self.price),
            Currency::Usd => {
                if !(self.eur_usd_rate > 0.0) || !self.eur_usd_rate.is_finite() {
                    return Err(AccrueError::domain(
                        0,
                        "eur_usd_rate",
                        self.eur_usd_rate,
                        "exchange rate must be positive",
                    ));
                }
                Ok(self.price / self.eur_usd_rate)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_matches_moderate_bundle() {
        let p = ParameterSet::default();
        assert_relative_eq!(p.margin_per_unit, 1.0);
        assert_relative_eq!(p.operating_expense_ratio, 0.25);
        assert_relative_eq!(p.brokerage_rate, 0.001);
        assert_relative_eq!(p.periodic_cost_growth_rate, 0.01977);
        assert_relative_eq!(p.market_premium, 15.0);
    }

    #[test]
    fn sourcing_cost_from_spot() {
        let conv = SpotConversion::default();
        // 3434.67 / 31.1034768 + 2
        assert_relative_eq!(conv.sourcing_cost(3434.67), 112.427, epsilon = 1e-3);
    }

    #[test]
    fn market_price_is_spot_plus_premium() {
        let p = ParameterSet::default();
        let spot = 115.29 * GRAMS_PER_TROY_OUNCE;
        assert_relative_eq!(p.market_price(spot), 130.29, epsilon = 1e-9);
        assert_relative_eq!(
            p.market_price(spot),
            p.spot_conversion.sourcing_cost(spot) - 2.0 + 15.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn usd_quote_converts_with_rate() {
        let q = SpotQuote::usd(4121.6, 1.2);
        assert_relative_eq!(q.in_eur().unwrap(), 3434.666_666, epsilon = 1e-3);
    }

    #[test]
    fn eur_quote_passes_through() {
        assert_relative_eq!(SpotQuote::eur(3500.0).in_eur().unwrap(), 3500.0);
    }

    #[test]
    fn zero_rate_is_rejected() {
        let err = SpotQuote::usd(4000.0, 0.0).in_eur().unwrap_err();
        assert!(matches!(err, AccrueError::ArithmeticDomain { .. }));
    }

    #[test]
    fn currency_parses_case_insensitively() {
        assert_eq!("usd".parse::<Currency>().unwrap(), Currency::Usd);
        assert_eq!(" EUR ".parse::<Currency>().unwrap(), Currency::Eur);
        assert!("GBP".parse::<Currency>().is_err());
    }
}
