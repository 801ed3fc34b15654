//! Report generation port trait.

use std::path::Path;

use crate::domain::error::AccrueError;
use crate::domain::period::PeriodState;
use crate::domain::presets::Preset;
use crate::domain::projection::{ProjectionConfig, ProjectionSummary};

/// A completed projection, ready to be rendered.
pub struct ProjectionReport<'a> {
    pub config: &'a ProjectionConfig,
    pub preset: Option<Preset>,
    pub spot_price_eur: f64,
    pub states: &'a [PeriodState],
    pub summary: Option<&'a ProjectionSummary>,
}

/// Port for writing projection reports.
pub trait ReportPort {
    fn write(&self, report: &ProjectionReport<'_>, output_path: &Path) -> Result<(), AccrueError>;
}
