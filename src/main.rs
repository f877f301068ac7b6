#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use brutto_netto::plot::{plot_net_heatmap, plot_overview};
use brutto_netto::search::{BreakEven, bisect, scan};
use brutto_netto::{SalaryBreakdown, Schedule, Settings, TaxCalculator};
use clap::Parser;
use log::{debug, info, warn};
use serde::Serialize;
use std::path::PathBuf;

/// Gross/net salary calculator for Austria (14 salaries per year).
///
/// Prints yearly figures over a range of full-time salaries, searches the full-time salary
/// reaching a target net income at part-time hours, and plots both.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Schedule file in JSON; defaults to the embedded 2021 schedule
    #[arg(long)]
    schedule: Option<PathBuf>,

    /// Weekly hours of a full-time position
    #[arg(long, default_value_t = 38.5)]
    full_time_hours: f64,

    /// Tax-free benefits paid with each of the 12 regular salaries
    #[arg(long, default_value_t = 0.0)]
    monthly_benefits: f64,

    /// Upper end of the full-time monthly gross range
    #[arg(long, default_value_t = 4000.0)]
    max_salary: f64,

    /// Number of salaries sampled over the range
    #[arg(long, default_value_t = 100)]
    samples: usize,

    /// Weekly hours for the break-even search
    #[arg(long, default_value_t = 16.0)]
    part_time_hours: f64,

    /// Net monthly income to reach, benefits included
    #[arg(long, default_value_t = 1200.0)]
    target_net: f64,

    /// Specific full-time monthly gross salaries to print
    #[arg(long = "salary")]
    salaries: Vec<f64>,

    /// Print breakdowns as JSON lines
    #[arg(long)]
    json: bool,

    /// Directory of the generated charts
    #[arg(long, default_value = "plots")]
    plots_dir: PathBuf,

    /// Skip chart generation
    #[arg(long)]
    no_plots: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    debug!("Arguments: {args:?}");

    let schedule = match &args.schedule {
        Some(path) => Schedule::from_path(path)?,
        None => Schedule::austria_2021()?,
    };
    let settings = Settings {
        full_time_hours: args.full_time_hours,
        monthly_benefits: args.monthly_benefits,
        ..Settings::default()
    };
    info!("Using schedule {} with {settings:?}", schedule.year);
    let calculator = TaxCalculator::new(schedule, settings);

    let salaries = if args.salaries.is_empty() {
        let last = args.samples.saturating_sub(1).max(1) as f64;
        (0..args.samples)
            .map(|i| args.max_salary * i as f64 / last)
            .collect()
    } else {
        args.salaries.clone()
    };
    print_breakdowns(&calculator, &salaries, args.json)?;

    let break_even = find_break_even(&calculator, &args);

    if !args.no_plots {
        let overview = plot_overview(&calculator, &args.plots_dir, args.max_salary, args.samples)
            .context("Failed to plot overview")?;
        info!("Wrote {}", overview.display());
        if let Err(e) = plot_net_heatmap(
            &calculator,
            &args.plots_dir,
            args.max_salary,
            args.target_net,
            args.part_time_hours,
            break_even,
        ) {
            warn!("Failed to plot heatmap: {e:?}");
        }
    }

    Ok(())
}

fn find_break_even(calculator: &TaxCalculator, args: &Args) -> Option<BreakEven> {
    let scanned = scan(
        calculator,
        args.target_net,
        args.part_time_hours,
        args.max_salary,
        args.samples,
    );
    let bisected = bisect(
        calculator,
        args.target_net,
        args.part_time_hours,
        args.max_salary,
        0.01,
    );

    let (message, break_even) = describe_break_even(args, scanned, bisected);
    println!("{message}");
    break_even
}

fn describe_break_even(
    args: &Args,
    scanned: Option<BreakEven>,
    bisected: Option<BreakEven>,
) -> (String, Option<BreakEven>) {
    match (scanned, bisected) {
        (Some(scanned), Some(bisected)) => (
            format!(
                "Gross salary for {} net with {} hours: {:.02} (grid), {:.02} (bisection)",
                args.target_net,
                args.part_time_hours,
                scanned.gross_monthly_full_time,
                bisected.gross_monthly_full_time
            ),
            Some(bisected),
        ),
        (Some(found), None) | (None, Some(found)) => {
            let method = if scanned.is_some() { "grid" } else { "bisection" };
            (
                format!(
                    "Gross salary for {} net with {} hours: {:.02} ({method} only)",
                    args.target_net, args.part_time_hours, found.gross_monthly_full_time
                ),
                Some(found),
            )
        }
        (None, None) => (
            format!(
                "No gross salary up to {} yields {} net with {} hours",
                args.max_salary, args.target_net, args.part_time_hours
            ),
            None,
        ),
    }
}

#[derive(Serialize)]
struct JsonRow {
    gross_monthly: f64,
    #[serde(flatten)]
    breakdown: SalaryBreakdown,
}

fn print_breakdowns(calculator: &TaxCalculator, salaries: &[f64], json: bool) -> Result<()> {
    if json {
        for &salary in salaries {
            let row = JsonRow {
                gross_monthly: salary,
                breakdown: calculator.full_time_breakdown(salary),
            };
            println!("{}", serde_json::to_string(&row)?);
        }
        return Ok(());
    }

    println!("| gross/month | gross/year | income tax | insurance | net/year | net/month | net/hour |");
    for &salary in salaries {
        print_row(salary, &calculator.full_time_breakdown(salary));
    }
    Ok(())
}

fn print_row(salary: f64, breakdown: &SalaryBreakdown) {
    println!(
        "| {:>11.02} | {:>10.02} | {:>10.02} | {:>9.02} | {:>8.02} | {:>9.02} | {:>8.02} |",
        salary,
        breakdown.gross_yearly,
        breakdown.income_tax_yearly,
        breakdown.insurance_tax_yearly,
        breakdown.net_yearly,
        breakdown.net_monthly,
        breakdown.net_hourly,
    );
}
