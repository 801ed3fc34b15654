//! CSV period-table report adapter.
//!
//! Writes one row per period at full precision; rounding is left to
//! whatever consumes the file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::error::AccrueError;
use crate::domain::period::PeriodState;
use crate::ports::report_port::{ProjectionReport, ReportPort};

pub const HEADER: [&str; 26] = [
    "period",
    "days",
    "beginning_balance",
    "markup",
    "balance_net_of_markup",
    "brokerage_cost",
    "investable_after_brokerage",
    "unit_sourcing_cost_beginning",
    "units_acquired",
    "gross_margin",
    "operating_expense",
    "net_gain",
    "unit_sourcing_cost_end",
    "additional_units_from_gain",
    "units_total_end",
    "market_price_end",
    "gross_asset_value",
    "storage_cost",
    "insurance_cost",
    "total_holding_cost",
    "realizable_gain",
    "tax_amount",
    "net_of_tax_gain",
    "ending_units_after_tax",
    "ending_total_value",
    "cumulative_return",
];

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Write the period table to any writer.
    pub fn write_states<W: Write>(&self, writer: W, states: &[PeriodState]) -> Result<(), AccrueError> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(HEADER).map_err(csv_error)?;

        for s in states {
            let numbers = [
                s.beginning_balance,
                s.markup,
                s.balance_net_of_markup,
                s.brokerage_cost,
                s.investable_after_brokerage,
                s.unit_sourcing_cost_beginning,
                s.units_acquired,
                s.gross_margin,
                s.operating_expense,
                s.net_gain,
                s.unit_sourcing_cost_end,
                s.additional_units_from_gain,
                s.units_total_end,
                s.market_price_end,
                s.gross_asset_value,
                s.storage_cost,
                s.insurance_cost,
                s.total_holding_cost,
                s.realizable_gain,
                s.tax_amount,
                s.net_of_tax_gain,
                s.ending_units_after_tax,
                s.ending_total_value,
                s.cumulative_return,
            ];
            let mut record = Vec::with_capacity(HEADER.len());
            record.push(s.period_index.to_string());
            record.push(s.duration_days.to_string());
            record.extend(numbers.iter().map(|v| v.to_string()));
            wtr.write_record(&record).map_err(csv_error)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

fn csv_error(e: csv::Error) -> AccrueError {
    AccrueError::Report {
        reason: format!("CSV write error: {e}"),
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &ProjectionReport<'_>, output_path: &Path) -> Result<(), AccrueError> {
        let file = File::create(output_path).map_err(|e| AccrueError::Report {
            reason: format!("failed to create {}: {}", output_path.display(), e),
        })?;
        self.write_states(file, report.states)
    }
}
