//! Table formatting for reports.
//!
//! Provides functions to generate Typst markup for:
//! - Run inputs and model parameters
//! - Headline summary figures
//! - The per-period projection table

use crate::domain::period::PeriodState;
use crate::domain::presets::Preset;
use crate::domain::projection::ProjectionSummary;
use crate::ports::report_port::ProjectionReport;

/// Group the integer part of `value` in thousands, keeping `decimals` places.
pub fn format_number(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Euro amount with a B/M/K suffix for large values.
pub fn format_compact_currency(value: f64) -> String {
    let abs = value.abs();
    let sign = if value < 0.0 { "-" } else { "" };
    if abs >= 1e9 {
        format!("{sign}€{:.2}B", abs / 1e9)
    } else if abs >= 1e6 {
        format!("{sign}€{:.2}M", abs / 1e6)
    } else if abs >= 1e3 {
        format!("{sign}€{:.2}K", abs / 1e3)
    } else {
        format!("{sign}€{:.2}", abs)
    }
}

pub fn format_pct(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

pub fn render_parameter_table(report: &ProjectionReport<'_>) -> String {
    let config = report.config;
    let p = &config.parameters;
    let preset = report
        .preset
        .map(|pr: Preset| pr.name().to_string())
        .unwrap_or_else(|| "Custom".to_string());

    let rows: Vec<(&str, String)> = vec![
        ("Model", preset),
        ("Initial capital", format!("€{}", format_number(config.initial_capital, 2))),
        (
            "Spot price",
            format!(
                "{} {} (€{}/oz)",
                format_number(config.spot.price, 2),
                config.spot.currency,
                format_number(report.spot_price_eur, 2)
            ),
        ),
        ("Periods", config.period_count.to_string()),
        ("Margin per unit", format!("€{:.2}", p.margin_per_unit)),
        ("Operating expenses", format_pct(p.operating_expense_ratio, 2)),
        ("Transaction brokerage", format_pct(p.brokerage_rate, 3)),
        ("Storage cost", format_pct(p.storage_cost_ratio, 3)),
        ("Insurance cost", format_pct(p.insurance_cost_ratio, 3)),
        ("Effective tax rate", format_pct(p.effective_tax_rate, 2)),
        ("Sourcing cost growth", format_pct(p.periodic_cost_growth_rate, 3)),
        ("Market premium", format!("€{:.2}", p.market_premium)),
    ];

    let mut out = String::from("#table(\n  columns: 2,\n  align: (left, right),\n");
    out.push_str("  [*Parameter*], [*Value*],\n");
    for (name, value) in rows {
        out.push_str(&format!("  [{}], [{}],\n", name, value));
    }
    out.push_str(")\n");
    out
}

pub fn render_summary_table(summary: Option<&ProjectionSummary>) -> String {
    let Some(s) = summary else {
        return "_No periods projected._\n".to_string();
    };

    let mut out = String::from("#table(\n  columns: 2,\n  align: (left, right),\n");
    out.push_str("  [*Metric*], [*Value*],\n");
    out.push_str(&format!("  [Periods], [{}],\n", s.period_count));
    out.push_str(&format!("  [Total days], [{}],\n", s.total_days));
    out.push_str(&format!(
        "  [Final value], [{}],\n",
        format_compact_currency(s.final_value)
    ));
    out.push_str(&format!(
        "  [Cumulative return], [{}],\n",
        format_compact_currency(s.cumulative_return)
    ));
    out.push_str(&format!(
        "  [ROI on initial balance], [{}],\n",
        format_pct(s.roi_on_initial, 2)
    ));
    if let Some(roi) = s.roi_on_subscription {
        out.push_str(&format!(
            "  [ROI on unit subscription], [{}],\n",
            format_pct(roi, 2)
        ));
    }
    out.push_str(&format!(
        "  [Final units], [{}],\n",
        format_number(s.final_units, 0)
    ));
    out.push_str(")\n");
    out
}

pub fn render_period_table(states: &[PeriodState], initial_capital: f64) -> String {
    if states.is_empty() {
        return "// No periods projected\n".to_string();
    }

    let mut out = String::new();
    out.push_str("#table(\n");
    out.push_str("  columns: 10,\n");
    out.push_str("  align: (left, right, right, right, right, right, right, right, right, right),\n");
    out.push_str("  [*Q*], [*Days*], [*Balance*], [*Cost/g*], [*Units*], [*Net Gain*], ");
    out.push_str("[*Realizable*], [*End Value*], [*Cum. Return*], [*ROI*],\n");

    for s in states {
        let roi = if initial_capital > 0.0 {
            s.cumulative_return / initial_capital
        } else {
            0.0
        };
        let color = if s.cumulative_return >= 0.0 { "green" } else { "red" };
        out.push_str(&format!(
            "  [{}], [{}], [{}], [{:.2}], [{}], [{}], [{}], [{}], text(fill: {}, [{}]), [{}],\n",
            s.period_index,
            s.duration_days,
            format_compact_currency(s.beginning_balance),
            s.unit_sourcing_cost_beginning,
            format_number(s.units_acquired, 0),
            format_compact_currency(s.net_gain),
            format_compact_currency(s.realizable_gain),
            format_compact_currency(s.ending_total_value),
            color,
            format_compact_currency(s.cumulative_return),
            format_pct(roi, 2),
        ));
    }

    out.push_str(")\n");
    out
}
