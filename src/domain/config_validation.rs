//! Configuration validation.
//!
//! Validates all config fields before a projection runs. The engine itself
//! never clamps inputs, so out-of-range values are rejected here.

use crate::domain::error::AccrueError;
use crate::domain::parameters::Currency;
use crate::domain::presets::Preset;
use crate::ports::config_port::ConfigPort;

pub const RATIO_KEYS: [&str; 5] = [
    "operating_expense_ratio",
    "brokerage_rate",
    "storage_cost_ratio",
    "insurance_cost_ratio",
    "effective_tax_rate",
];

pub fn validate_projection_config(config: &dyn ConfigPort) -> Result<(), AccrueError> {
    validate_initial_capital(config)?;
    validate_periods(config)?;
    validate_preset(config)?;
    validate_markup(config)?;
    validate_unit_subscription(config)?;
    validate_market(config)?;
    validate_parameters(config)?;
    validate_schedule(config)?;
    Ok(())
}

pub fn validate_contract_config(config: &dyn ConfigPort) -> Result<(), AccrueError> {
    positive_if_present(config, "contract", "spot_price_usd")?;
    positive_if_present(config, "contract", "eur_usd_rate")?;
    positive_if_present(config, "contract", "contract_price_eur")?;
    positive_if_present(config, "contract", "contract_size")?;
    if let Some(count) = config.get_integer("contract", "total_contracts")? {
        if count <= 0 || count > i64::from(u32::MAX) {
            return Err(invalid("contract", "total_contracts", "total_contracts must be positive"));
        }
    }
    if let Some(margin) = config.get_number("contract", "margin_requirement")? {
        if margin <= 0.0 || margin > 1.0 {
            return Err(invalid(
                "contract",
                "margin_requirement",
                "margin_requirement must be in (0, 1]",
            ));
        }
    }
    if let Some(rate) = config.get_number("contract", "compounding_rate")? {
        if rate <= -1.0 {
            return Err(invalid(
                "contract",
                "compounding_rate",
                "compounding_rate must be greater than -1",
            ));
        }
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> AccrueError {
    AccrueError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn require_number(config: &dyn ConfigPort, section: &str, key: &str) -> Result<f64, AccrueError> {
    config
        .get_number(section, key)?
        .ok_or_else(|| AccrueError::ConfigMissing {
            section: section.to_string(),
            key: key.to_string(),
        })
}

fn positive_if_present(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), AccrueError> {
    match config.get_number(section, key)? {
        Some(value) if value <= 0.0 => Err(invalid(section, key, &format!("{key} must be positive"))),
        _ => Ok(()),
    }
}

fn non_negative_if_present(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), AccrueError> {
    match config.get_number(section, key)? {
        Some(value) if value < 0.0 => Err(invalid(
            section,
            key,
            &format!("{key} must be non-negative"),
        )),
        _ => Ok(()),
    }
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), AccrueError> {
    if require_number(config, "projection", "initial_capital")? <= 0.0 {
        return Err(invalid(
            "projection",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }
    Ok(())
}

fn validate_periods(config: &dyn ConfigPort) -> Result<(), AccrueError> {
    if let Some(value) = config.get_integer("projection", "periods")? {
        if value < 0 || value > i64::from(u32::MAX) {
            return Err(invalid(
                "projection",
                "periods",
                "periods must be a non-negative integer",
            ));
        }
    }
    Ok(())
}

fn validate_preset(config: &dyn ConfigPort) -> Result<(), AccrueError> {
    match config.get_string("projection", "preset") {
        Some(name) if !name.trim().is_empty() => name.parse::<Preset>().map(|_| ()),
        _ => Ok(()),
    }
}

fn validate_markup(config: &dyn ConfigPort) -> Result<(), AccrueError> {
    if let Some(policy) = config.get_string("projection", "markup") {
        match policy.trim().to_lowercase().as_str() {
            "none" | "per_unit_fee" => {}
            _ => {
                return Err(invalid(
                    "projection",
                    "markup",
                    "markup must be 'none' or 'per_unit_fee'",
                ));
            }
        }
    }
    non_negative_if_present(config, "projection", "markup_fee_per_unit")
}

fn validate_unit_subscription(config: &dyn ConfigPort) -> Result<(), AccrueError> {
    positive_if_present(config, "projection", "unit_subscription")
}

fn validate_market(config: &dyn ConfigPort) -> Result<(), AccrueError> {
    if require_number(config, "market", "spot_price")? <= 0.0 {
        return Err(invalid("market", "spot_price", "spot_price must be positive"));
    }
    if let Some(currency) = config.get_string("market", "spot_currency") {
        currency
            .parse::<Currency>()
            .map_err(|reason| invalid("market", "spot_currency", &reason))?;
    }
    positive_if_present(config, "market", "eur_usd_rate")
}

fn validate_parameters(config: &dyn ConfigPort) -> Result<(), AccrueError> {
    for key in RATIO_KEYS {
        if let Some(value) = config.get_number("parameters", key)? {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(
                    "parameters",
                    key,
                    &format!("{key} must be between 0 and 1"),
                ));
            }
        }
    }
    for key in [
        "margin_per_unit",
        "periodic_cost_growth_rate",
        "market_premium",
        "sourcing_offset",
    ] {
        non_negative_if_present(config, "parameters", key)?;
    }
    positive_if_present(config, "parameters", "units_per_quote")
}

fn validate_schedule(config: &dyn ConfigPort) -> Result<(), AccrueError> {
    for key in ["days", "final_days"] {
        if let Some(value) = config.get_integer("schedule", key)? {
            if value <= 0 || value > i64::from(u32::MAX) {
                return Err(invalid("schedule", key, &format!("{key} must be positive")));
            }
        }
    }
    if let Some(value) = config.get_integer("schedule", "final_period")? {
        if value < 0 || value > i64::from(u32::MAX) {
            return Err(invalid(
                "schedule",
                "final_period",
                "final_period must be non-negative (0 disables the short final period)",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    const VALID: &str = r#"
[projection]
initial_capital = 3375000000
periods = 25
preset = moderate
markup = per_unit_fee

[market]
spot_price = 3434.67
spot_currency = EUR
"#;

    fn with(extra: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(&format!("{VALID}{extra}")).unwrap()
    }

    /// `VALID` with extra keys spliced into `[projection]`.
    fn with_projection(extra: &str) -> FileConfigAdapter {
        let content = VALID.replacen("[market]", &format!("{extra}\n[market]"), 1);
        FileConfigAdapter::from_string(&content).unwrap()
    }

    #[test]
    fn valid_config_passes() {
        assert!(validate_projection_config(&with("")).is_ok());
    }

    #[test]
    fn missing_initial_capital() {
        let adapter = FileConfigAdapter::from_string("[market]\nspot_price = 3000\n").unwrap();
        let err = validate_projection_config(&adapter).unwrap_err();
        assert!(matches!(err, AccrueError::ConfigMissing { key, .. } if key == "initial_capital"));
    }

    #[test]
    fn non_numeric_capital() {
        let adapter = FileConfigAdapter::from_string(
            "[projection]\ninitial_capital = lots\n[market]\nspot_price = 3000\n",
        )
        .unwrap();
        let err = validate_projection_config(&adapter).unwrap_err();
        assert!(matches!(err, AccrueError::ConfigInvalid { key, .. } if key == "initial_capital"));
    }

    #[test]
    fn negative_capital() {
        let adapter = FileConfigAdapter::from_string(
            "[projection]\ninitial_capital = -5\n[market]\nspot_price = 3000\n",
        )
        .unwrap();
        let err = validate_projection_config(&adapter).unwrap_err();
        assert!(matches!(err, AccrueError::ConfigInvalid { key, .. } if key == "initial_capital"));
    }

    #[test]
    fn missing_spot_price() {
        let adapter =
            FileConfigAdapter::from_string("[projection]\ninitial_capital = 1000\n").unwrap();
        let err = validate_projection_config(&adapter).unwrap_err();
        assert!(matches!(err, AccrueError::ConfigMissing { key, .. } if key == "spot_price"));
    }

    #[test]
    fn negative_periods() {
        let adapter = FileConfigAdapter::from_string(
            "[projection]\ninitial_capital = 1000\nperiods = -1\n[market]\nspot_price = 3000\n",
        )
        .unwrap();
        let err = validate_projection_config(&adapter).unwrap_err();
        assert!(matches!(err, AccrueError::ConfigInvalid { key, .. } if key == "periods"));
    }

    #[test]
    fn unknown_preset() {
        let adapter = FileConfigAdapter::from_string(
            "[projection]\ninitial_capital = 1000\npreset = reckless\n[market]\nspot_price = 3000\n",
        )
        .unwrap();
        let err = validate_projection_config(&adapter).unwrap_err();
        assert!(matches!(err, AccrueError::UnknownPreset { .. }));
    }

    #[test]
    fn unknown_markup_policy() {
        let adapter = FileConfigAdapter::from_string(
            "[projection]\ninitial_capital = 1000\nmarkup = percent\n[market]\nspot_price = 3000\n",
        )
        .unwrap();
        let err = validate_projection_config(&adapter).unwrap_err();
        assert!(matches!(err, AccrueError::ConfigInvalid { key, .. } if key == "markup"));
    }

    #[test]
    fn unsupported_currency() {
        let adapter = FileConfigAdapter::from_string(
            "[projection]\ninitial_capital = 1000\n[market]\nspot_price = 3000\nspot_currency = GBP\n",
        )
        .unwrap();
        let err = validate_projection_config(&adapter).unwrap_err();
        assert!(matches!(err, AccrueError::ConfigInvalid { key, .. } if key == "spot_currency"));
    }

    #[test]
    fn ratio_out_of_range() {
        for key in RATIO_KEYS {
            let err = validate_projection_config(&with(&format!("[parameters]\n{key} = 1.5\n")))
                .unwrap_err();
            assert!(matches!(err, AccrueError::ConfigInvalid { key: k, .. } if k == key));
        }
    }

    #[test]
    fn ratio_bounds_inclusive() {
        let cfg = with("[parameters]\nbrokerage_rate = 0\neffective_tax_rate = 1\n");
        assert!(validate_projection_config(&cfg).is_ok());
    }

    #[test]
    fn negative_growth_rejected() {
        let err = validate_projection_config(&with("[parameters]\nperiodic_cost_growth_rate = -0.1\n"))
            .unwrap_err();
        assert!(matches!(err, AccrueError::ConfigInvalid { key, .. } if key == "periodic_cost_growth_rate"));
    }

    #[test]
    fn zero_schedule_days_rejected() {
        let err = validate_projection_config(&with("[schedule]\ndays = 0\n")).unwrap_err();
        assert!(matches!(err, AccrueError::ConfigInvalid { key, .. } if key == "days"));
    }

    fn assert_invalid_key(result: Result<(), AccrueError>, expected: &str) {
        match result {
            Err(AccrueError::ConfigInvalid { key, .. }) => assert_eq!(key, expected),
            other => panic!("expected ConfigInvalid for {expected}, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_periods_rejected() {
        let adapter = FileConfigAdapter::from_string(
            "[projection]\ninitial_capital = 1000\nperiods = lots\n[market]\nspot_price = 3000\n",
        )
        .unwrap();
        assert_invalid_key(validate_projection_config(&adapter), "periods");
    }

    #[test]
    fn fractional_periods_rejected() {
        let adapter = FileConfigAdapter::from_string(
            "[projection]\ninitial_capital = 1000\nperiods = 12.5\n[market]\nspot_price = 3000\n",
        )
        .unwrap();
        assert_invalid_key(validate_projection_config(&adapter), "periods");
    }

    #[test]
    fn non_numeric_markup_fee_rejected() {
        assert_invalid_key(
            validate_projection_config(&with_projection("markup_fee_per_unit = thirteen\n")),
            "markup_fee_per_unit",
        );
    }

    #[test]
    fn non_numeric_exchange_rate_rejected() {
        let adapter = FileConfigAdapter::from_string(
            "[projection]\ninitial_capital = 1000\n[market]\nspot_price = 3000\neur_usd_rate = par\n",
        )
        .unwrap();
        assert_invalid_key(validate_projection_config(&adapter), "eur_usd_rate");
    }

    #[test]
    fn non_numeric_parameters_rejected() {
        for (key, value) in [
            ("effective_tax_rate", "21%"),
            ("margin_per_unit", "one"),
            ("periodic_cost_growth_rate", "nan"),
            ("units_per_quote", "troy"),
        ] {
            assert_invalid_key(
                validate_projection_config(&with(&format!("[parameters]\n{key} = {value}\n"))),
                key,
            );
        }
    }

    #[test]
    fn non_numeric_schedule_rejected() {
        for key in ["days", "final_period", "final_days"] {
            assert_invalid_key(
                validate_projection_config(&with(&format!("[schedule]\n{key} = ninety\n"))),
                key,
            );
        }
    }

    #[test]
    fn non_numeric_contract_values_rejected() {
        for (key, value) in [
            ("total_contracts", "many"),
            ("margin_requirement", "8%"),
            ("compounding_rate", "fast"),
            ("contract_size", "big"),
        ] {
            let adapter =
                FileConfigAdapter::from_string(&format!("[contract]\n{key} = {value}\n")).unwrap();
            assert_invalid_key(validate_contract_config(&adapter), key);
        }
    }

    #[test]
    fn contract_defaults_are_valid() {
        let adapter = FileConfigAdapter::from_string("[contract]\n").unwrap();
        assert!(validate_contract_config(&adapter).is_ok());
    }

    #[test]
    fn contract_margin_out_of_range() {
        let adapter =
            FileConfigAdapter::from_string("[contract]\nmargin_requirement = 1.5\n").unwrap();
        let err = validate_contract_config(&adapter).unwrap_err();
        assert!(matches!(err, AccrueError::ConfigInvalid { key, .. } if key == "margin_requirement"));
    }
}
