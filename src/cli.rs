//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::typst_report::TypstReportAdapter;
use crate::domain::config_validation::{validate_contract_config, validate_projection_config};
use crate::domain::contract::{ContractMetrics, ContractParameters, contract_period_years};
use crate::domain::error::AccrueError;
use crate::domain::goal::{self, DEFAULT_CAGR, GoalProjection, MAX_HORIZON_YEARS};
use crate::domain::parameters::{Currency, DEFAULT_EUR_USD_RATE, ParameterSet, SpotQuote};
use crate::domain::policy::{
    DEFAULT_FINAL_PERIOD, DEFAULT_FINAL_PERIOD_DAYS, DEFAULT_MARKUP_FEE_PER_UNIT,
    DEFAULT_PERIOD_DAYS, DurationSchedule, MarkupPolicy, ProjectionPolicy,
};
use crate::domain::presets::Preset;
use crate::domain::projection::{DEFAULT_PERIOD_COUNT, ProjectionConfig, ProjectionSummary};
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::{ProjectionReport, ReportPort};

#[derive(Parser, Debug)]
#[command(name = "accrue", about = "Quarterly gold accumulation projections")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a projection from an INI config
    Project(ProjectArgs),
    /// List the parameter presets
    Presets,
    /// Validate a projection config without running it
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Futures contract margin, ROI and CAGR
    Contract {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Spot price in USD per ounce
        #[arg(long)]
        spot: Option<f64>,
    },
    /// Lump sum or monthly contribution needed to reach a target
    Goal {
        #[arg(long)]
        target: f64,
        #[arg(long, required_unless_present = "by", conflicts_with = "by")]
        years: Option<f64>,
        /// Target date (YYYY-MM-DD) instead of --years
        #[arg(long)]
        by: Option<NaiveDate>,
        #[arg(long, default_value_t = DEFAULT_CAGR)]
        cagr: f64,
    },
}

#[derive(Args, Debug, Default, Clone)]
pub struct ProjectArgs {
    #[arg(short, long)]
    pub config: PathBuf,
    /// Overrides [projection] preset
    #[arg(long)]
    pub preset: Option<String>,
    #[arg(long)]
    pub periods: Option<u32>,
    #[arg(long)]
    pub capital: Option<f64>,
    /// Spot price in the configured currency
    #[arg(long)]
    pub spot: Option<f64>,
    #[arg(long)]
    pub no_markup: bool,
    /// Write the period table as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,
    /// Write a Typst report
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Project(args) => run_project(&args),
        Command::Presets => run_presets(),
        Command::Validate { config } => run_validate(&config),
        Command::Contract { config, spot } => run_contract(config.as_deref(), spot),
        Command::Goal {
            target,
            years,
            by,
            cagr,
        } => run_goal(target, years, by, cagr),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = AccrueError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn missing(section: &str, key: &str) -> AccrueError {
    AccrueError::ConfigMissing {
        section: section.into(),
        key: key.into(),
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> AccrueError {
    AccrueError::ConfigInvalid {
        section: section.into(),
        key: key.into(),
        reason: reason.into(),
    }
}

fn count(adapter: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<u32>, AccrueError> {
    adapter
        .get_integer(section, key)?
        .map(u32::try_from)
        .transpose()
        .map_err(|_| invalid(section, key, "must be a non-negative integer"))
}

/// Apply `[parameters]` overrides on top of `base`.
pub fn build_parameters(
    adapter: &dyn ConfigPort,
    base: ParameterSet,
) -> Result<ParameterSet, AccrueError> {
    let get = |key: &str, default: f64| -> Result<f64, AccrueError> {
        Ok(adapter.get_number("parameters", key)?.unwrap_or(default))
    };
    let mut p = base;
    p.margin_per_unit = get("margin_per_unit", p.margin_per_unit)?;
    p.operating_expense_ratio = get("operating_expense_ratio", p.operating_expense_ratio)?;
    p.brokerage_rate = get("brokerage_rate", p.brokerage_rate)?;
    p.storage_cost_ratio = get("storage_cost_ratio", p.storage_cost_ratio)?;
    p.insurance_cost_ratio = get("insurance_cost_ratio", p.insurance_cost_ratio)?;
    p.effective_tax_rate = get("effective_tax_rate", p.effective_tax_rate)?;
    p.periodic_cost_growth_rate = get("periodic_cost_growth_rate", p.periodic_cost_growth_rate)?;
    p.market_premium = get("market_premium", p.market_premium)?;
    p.spot_conversion.units_per_quote = get("units_per_quote", p.spot_conversion.units_per_quote)?;
    p.spot_conversion.sourcing_offset = get("sourcing_offset", p.spot_conversion.sourcing_offset)?;
    Ok(p)
}

/// `final_period = 0` turns the short final period off.
pub fn build_schedule(adapter: &dyn ConfigPort) -> Result<DurationSchedule, AccrueError> {
    let read = |key: &str, default: u32| -> Result<u32, AccrueError> {
        Ok(count(adapter, "schedule", key)?.unwrap_or(default))
    };
    let days = read("days", DEFAULT_PERIOD_DAYS)?;
    let final_period = read("final_period", DEFAULT_FINAL_PERIOD)?;
    let final_days = read("final_days", DEFAULT_FINAL_PERIOD_DAYS)?;

    Ok(if final_period == 0 {
        DurationSchedule::Uniform { days }
    } else {
        DurationSchedule::ShortFinalPeriod {
            days,
            final_period,
            final_days,
        }
    })
}

pub fn build_markup(adapter: &dyn ConfigPort) -> Result<MarkupPolicy, AccrueError> {
    let kind = adapter
        .get_string("projection", "markup")
        .unwrap_or_else(|| "per_unit_fee".to_string());
    match kind.trim().to_lowercase().as_str() {
        "none" => Ok(MarkupPolicy::None),
        "per_unit_fee" => Ok(MarkupPolicy::PerUnitFee {
            fee_per_unit: adapter.get_number("projection", "markup_fee_per_unit")?
                .unwrap_or(DEFAULT_MARKUP_FEE_PER_UNIT),
        }),
        _ => Err(invalid(
            "projection",
            "markup",
            "markup must be 'none' or 'per_unit_fee'",
        )),
    }
}

/// Build a [`ProjectionConfig`] from the INI sections. `preset_override`
/// takes precedence over `[projection] preset`; `[parameters]` keys are
/// applied on top of whichever preset wins.
pub fn build_projection_config(
    adapter: &dyn ConfigPort,
    preset_override: Option<Preset>,
) -> Result<(ProjectionConfig, Option<Preset>), AccrueError> {
    let initial_capital = adapter.get_number("projection", "initial_capital")?
        .ok_or_else(|| missing("projection", "initial_capital"))?;

    let preset = match preset_override {
        Some(p) => Some(p),
        None => adapter
            .get_string("projection", "preset")
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<Preset>())
            .transpose()?,
    };
    let base = preset.map(|p| p.parameters()).unwrap_or_default();
    let parameters = build_parameters(adapter, base)?;

    let period_count = count(adapter, "projection", "periods")?.unwrap_or(DEFAULT_PERIOD_COUNT);

    let price = adapter.get_number("market", "spot_price")?
        .ok_or_else(|| missing("market", "spot_price"))?;
    let currency = match adapter.get_string("market", "spot_currency") {
        Some(c) => c
            .parse::<Currency>()
            .map_err(|reason| invalid("market", "spot_currency", &reason))?,
        None => Currency::Eur,
    };
    let spot = SpotQuote {
        price,
        currency,
        eur_usd_rate: adapter.get_number("market", "eur_usd_rate")?.unwrap_or(DEFAULT_EUR_USD_RATE),
    };

    let policy = ProjectionPolicy {
        markup: build_markup(adapter)?,
        schedule: build_schedule(adapter)?,
    };

    Ok((
        ProjectionConfig {
            initial_capital,
            spot,
            period_count,
            parameters,
            policy,
            unit_subscription: adapter.get_number("projection", "unit_subscription")?,
        },
        preset,
    ))
}

/// Apply command-line overrides that don't depend on the preset.
pub fn apply_overrides(config: &mut ProjectionConfig, args: &ProjectArgs) {
    if let Some(capital) = args.capital {
        config.initial_capital = capital;
    }
    if let Some(spot) = args.spot {
        config.spot.price = spot;
    }
    if let Some(periods) = args.periods {
        config.period_count = periods;
    }
    if args.no_markup {
        config.policy.markup = MarkupPolicy::None;
    }
}

pub fn run_project(args: &ProjectArgs) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", args.config.display());
    let adapter = match load_config(&args.config) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_projection_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 2: Build ProjectionConfig
    let preset_override = match args.preset.as_deref().map(str::parse::<Preset>).transpose() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let (mut config, preset) = match build_projection_config(&adapter, preset_override) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    apply_overrides(&mut config, args);

    // Stage 3: Run
    let spot_price_eur = match config.spot.in_eur() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!(
        "Projecting {} periods from €{:.2} at spot €{:.2}/oz ({})",
        config.period_count,
        config.initial_capital,
        spot_price_eur,
        preset.map(|p| p.name()).unwrap_or("Custom"),
    );
    let states = match config.run() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            if let AccrueError::PropagatedCalculation { .. } = e {
                eprintln!("  caused by: {}", e.root_cause());
            }
            return (&e).into();
        }
    };
    let summary = ProjectionSummary::from_states(&states, config.unit_subscription);

    // Stage 4: Console summary
    match &summary {
        Some(s) => print_summary(s),
        None => eprintln!("\nNo periods projected."),
    }

    // Stage 5: Reports
    let report = ProjectionReport {
        config: &config,
        preset,
        spot_price_eur,
        states: &states,
        summary: summary.as_ref(),
    };
    if let Some(path) = &args.csv {
        if let Err(e) = CsvReportAdapter::new().write(&report, path) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        info!("wrote {} CSV rows", states.len());
        eprintln!("CSV written to: {}", path.display());
    }
    if let Some(path) = &args.output {
        let template_path = adapter
            .get_string("report", "template_path")
            .map(PathBuf::from);
        if let Err(e) = TypstReportAdapter::new(template_path).write(&report, path) {
            eprintln!("error: {e}");
            return (&e).into();
        }
        eprintln!("Report written to: {}", path.display());
    }

    ExitCode::SUCCESS
}

fn print_summary(s: &ProjectionSummary) {
    eprintln!("\n=== Projection Summary ===");
    eprintln!("Periods:          {} ({} days)", s.period_count, s.total_days);
    eprintln!("Initial balance:  €{:.2}", s.initial_balance);
    eprintln!("Final value:      €{:.2}", s.final_value);
    eprintln!("Cumulative:       €{:.2}", s.cumulative_return);
    eprintln!("ROI (initial):    {:.2}%", s.roi_on_initial * 100.0);
    if let Some(roi) = s.roi_on_subscription {
        eprintln!("ROI (units):      {:.2}%", roi * 100.0);
    }
    eprintln!("Final units:      {:.0}", s.final_units);
}

fn run_presets() -> ExitCode {
    println!(
        "{:<14} {:>7} {:>7} {:>9} {:>9} {:>9} {:>7}  description",
        "preset", "margin", "opex", "brokerage", "storage", "insurance", "tax"
    );
    for preset in Preset::ALL {
        let p = preset.parameters();
        println!(
            "{:<14} {:>7.2} {:>7.4} {:>9.4} {:>9.5} {:>9.5} {:>7.4}  {}",
            preset.to_string(),
            p.margin_per_unit,
            p.operating_expense_ratio,
            p.brokerage_rate,
            p.storage_cost_ratio,
            p.insurance_cost_ratio,
            p.effective_tax_rate,
            preset.description(),
        );
    }
    ExitCode::SUCCESS
}

pub fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_projection_config(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    match build_projection_config(&adapter, None) {
        Ok((config, preset)) => {
            eprintln!("  preset:   {}", preset.map(|p| p.name()).unwrap_or("Custom"));
            eprintln!("  periods:  {}", config.period_count);
            eprintln!(
                "  days:     {}",
                config.policy.schedule.total_days(config.period_count)
            );
            eprintln!("  markup:   {:?}", config.policy.markup);
            eprintln!("\nConfiguration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Contract parameters from `[contract]`, falling back to the defaults as
/// of `today`. `expiry` is `YYYY-MM-DD`.
pub fn build_contract_parameters(
    adapter: Option<&dyn ConfigPort>,
    today: NaiveDate,
) -> Result<ContractParameters, AccrueError> {
    let defaults = ContractParameters::defaults_as_of(today);
    let Some(adapter) = adapter else {
        return Ok(defaults);
    };

    let period_years = match adapter.get_string("contract", "expiry") {
        Some(raw) => {
            let expiry = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                invalid(
                    "contract",
                    "expiry",
                    "invalid date format (expected YYYY-MM-DD)",
                )
            })?;
            contract_period_years(today, expiry)
        }
        None => defaults.period_years,
    };
    let total_contracts =
        count(adapter, "contract", "total_contracts")?.unwrap_or(defaults.total_contracts);

    let get = |key: &str, default: f64| -> Result<f64, AccrueError> {
        Ok(adapter.get_number("contract", key)?.unwrap_or(default))
    };
    Ok(ContractParameters {
        spot_price_usd: get("spot_price_usd", defaults.spot_price_usd)?,
        eur_usd_rate: get("eur_usd_rate", defaults.eur_usd_rate)?,
        contract_price_eur: get("contract_price_eur", defaults.contract_price_eur)?,
        total_contracts,
        contract_size: get("contract_size", defaults.contract_size)?,
        compounding_rate: get("compounding_rate", defaults.compounding_rate)?,
        period_years,
        margin_requirement: get("margin_requirement", defaults.margin_requirement)?,
    })
}

fn run_contract(config_path: Option<&Path>, spot_override: Option<f64>) -> ExitCode {
    let adapter = match config_path {
        Some(path) => {
            eprintln!("Loading config from {}", path.display());
            match load_config(path) {
                Ok(a) => Some(a),
                Err(code) => return code,
            }
        }
        None => None,
    };
    if let Some(a) = &adapter {
        if let Err(e) = validate_contract_config(a) {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    let today = chrono::Local::now().date_naive();
    let mut params = match build_contract_parameters(
        adapter.as_ref().map(|a| a as &dyn ConfigPort),
        today,
    ) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Some(spot) = spot_override {
        params.spot_price_usd = spot;
    }

    let m = match ContractMetrics::compute(&params) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    println!("=== Futures Contract ({} contracts) ===", params.total_contracts);
    println!("Period:             {:.2} years", params.period_years);
    println!("Spot:               ${:.2} / €{:.2}", params.spot_price_usd, m.spot_price_eur);
    println!("Contract price:     €{:.2} / ${:.2}", params.contract_price_eur, m.contract_price_usd);
    println!("Exit price:         €{:.2} / ${:.2}", m.exit_price_eur, m.exit_price_usd);
    println!("Total ounces:       {:.0}", m.total_ounces);
    println!("Margin/contract:    €{:.2}", m.initial_margin_per_contract);
    println!("Total margin:       €{:.2}", m.total_initial_margin);
    println!("Contract value:     €{:.2}", m.contract_value);
    println!("Exit value:         €{:.2}", m.exit_value);
    println!("Total gain:         €{:.2}", m.total_gain);
    println!("ROI:                {:.2}%", m.roi * 100.0);
    println!("CAGR:               {:.2}%", m.cagr * 100.0);
    ExitCode::SUCCESS
}

/// Goal horizon in years, from `--years` or a `--by` date measured from
/// `today`. Horizons beyond [`MAX_HORIZON_YEARS`] are rejected.
pub fn goal_horizon(
    years: Option<f64>,
    by: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<f64, AccrueError> {
    let years = match (years, by) {
        (_, Some(date)) => goal::years_until(today, date),
        (Some(years), None) => years,
        (None, None) => return Err(missing("goal", "years")),
    };
    if !(years > 0.0) {
        return Err(invalid("goal", "years", "years must be positive"));
    }
    if years > MAX_HORIZON_YEARS {
        return Err(invalid(
            "goal",
            "years",
            &format!("horizon must not exceed {MAX_HORIZON_YEARS} years"),
        ));
    }
    Ok(years)
}

fn run_goal(target: f64, years: Option<f64>, by: Option<NaiveDate>, cagr: f64) -> ExitCode {
    let today = chrono::Local::now().date_naive();
    let check = if !(target > 0.0) {
        Err(invalid("goal", "target", "target must be positive"))
    } else if !(cagr > -1.0) {
        Err(invalid("goal", "cagr", "cagr must be greater than -1"))
    } else {
        goal_horizon(years, by, today)
    };
    let years = match check {
        Ok(y) => y,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let g = GoalProjection::compute(target, years, cagr);
    println!("=== Goal: €{:.2} in {:.1} years at {:.2}% ===", target, years, cagr * 100.0);
    println!("Lump sum today:        €{:.2} (gains €{:.2})", g.required_lump_sum, g.lump_sum_gains);
    println!(
        "Monthly contribution:  €{:.2} (contributed €{:.2}, gains €{:.2})",
        g.monthly_contribution, g.total_contributions, g.total_gains
    );
    println!(
        "Suggested start:       €{:.0} lump sum or €{:.0}/month",
        g.recommended_lump_sum, g.recommended_monthly
    );

    println!("\n{:>5} {:>16} {:>16}", "year", "lump sum", "monthly");
    let lump = goal::lump_sum_projection(g.required_lump_sum, years, cagr);
    let monthly = goal::monthly_projection(g.monthly_contribution, years, cagr);
    for (l, m) in lump.iter().zip(&monthly).filter(|(l, _)| l.month % 12 == 0) {
        println!("{:>5.0} {:>16.2} {:>16.2}", l.year, l.value, m.value);
    }
    ExitCode::SUCCESS
}
