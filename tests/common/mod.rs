#![allow(dead_code)]

use accrue::domain::parameters::GRAMS_PER_TROY_OUNCE;
use std::io::Write;

/// A minimal valid projection config.
pub const VALID_INI: &str = r#"
[projection]
initial_capital = 3375000000
periods = 25
preset = moderate
markup = per_unit_fee
unit_subscription = 500000000

[market]
spot_price = 3434.67
spot_currency = EUR

[schedule]
days = 65
final_period = 25
final_days = 53
"#;

pub fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Spot price (per troy ounce) that yields the given per-gram sourcing cost.
pub fn spot_for_cost(cost: f64) -> f64 {
    (cost - 2.0) * GRAMS_PER_TROY_OUNCE
}
