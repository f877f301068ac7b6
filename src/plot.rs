use crate::calculator::{SalaryBreakdown, TaxCalculator};
use crate::search::BreakEven;
use anyhow::{Result, anyhow};
use log::{debug, info};
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Yearly figures and net hourly income over full-time monthly salaries in `[0, max_salary]`.
pub fn plot_overview(
    calculator: &TaxCalculator,
    dir: &Path,
    max_salary: f64,
    samples: usize,
) -> Result<PathBuf> {
    if samples < 2 || max_salary <= 0.0 {
        return Err(anyhow!(
            "Need at least 2 samples over a positive range, got {samples} up to {max_salary}"
        ));
    }
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("overview-{}.png", calculator.schedule().year));
    info!("Creating overview plot in {}", path.display());

    let points: Vec<(f64, SalaryBreakdown)> = (0..samples)
        .map(|i| max_salary * i as f64 / (samples - 1) as f64)
        .map(|salary| (salary, calculator.full_time_breakdown(salary)))
        .collect();
    let max_yearly = points
        .iter()
        .map(|(_, b)| b.gross_yearly)
        .fold(1.0, f64::max);
    let max_hourly = points
        .iter()
        .map(|(_, b)| b.net_hourly)
        .fold(1.0, f64::max);
    debug!("Ranges: yearly up to {max_yearly}, hourly up to {max_hourly}");

    draw_overview(
        &path,
        calculator.schedule().year,
        &points,
        max_salary,
        max_yearly,
        max_hourly,
    )?;
    Ok(path)
}

fn draw_overview(
    path: &Path,
    year: u32,
    points: &[(f64, SalaryBreakdown)],
    max_salary: f64,
    max_yearly: f64,
    max_hourly: f64,
) -> Result<()> {
    let root = BitMapBackend::new(path, (1200, 1400)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(
        &format!("Austria {year} gross/net salary overview (14 salaries)"),
        ("sans-serif", 30),
    )?;
    let (yearly_area, hourly_area) = root.split_vertically(800);

    let mut chart = ChartBuilder::on(&yearly_area)
        .margin(30)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(0.0..max_salary, 0.0..max_yearly * 1.05)?;
    chart
        .configure_mesh()
        .label_style(("sans-serif", 18))
        .x_desc("Monthly gross income full-time [EUR/month]")
        .y_desc("Yearly salary [EUR/year]")
        .axis_desc_style(("sans-serif", 22))
        .draw()?;

    let series: [(&str, RGBColor, fn(&SalaryBreakdown) -> f64); 4] = [
        ("Annual gross salary", RED, |b| b.gross_yearly),
        ("Annual income tax", CYAN, |b| b.income_tax_yearly),
        ("Annual insurance tax", BLUE, |b| b.insurance_tax_yearly),
        ("Annual net salary", GREEN, |b| b.net_yearly),
    ];
    for (label, color, value) in series {
        chart
            .draw_series(LineSeries::new(
                points.iter().map(|(salary, b)| (*salary, value(b))),
                color.stroke_width(2),
            ))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(("sans-serif", 18))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    let mut chart = ChartBuilder::on(&hourly_area)
        .margin(30)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(0.0..max_salary, 0.0..max_hourly * 1.05)?;
    chart
        .configure_mesh()
        .label_style(("sans-serif", 18))
        .x_desc("Monthly gross income full-time [EUR/month]")
        .y_desc("Net income/hour [EUR/h]")
        .axis_desc_style(("sans-serif", 22))
        .draw()?;
    chart.draw_series(LineSeries::new(
        points.iter().map(|(salary, b)| (*salary, b.net_hourly)),
        GREEN.stroke_width(2),
    ))?;

    root.present()?;
    Ok(())
}

/// Net monthly income over full-time salaries and weekly hours, up to 1.5 times full time.
/// Pixels where the net income crosses `target_net_monthly` are drawn black.
pub fn plot_net_heatmap(
    calculator: &TaxCalculator,
    dir: &Path,
    max_salary: f64,
    target_net_monthly: f64,
    part_time_hours: f64,
    break_even: Option<BreakEven>,
) -> Result<PathBuf> {
    if max_salary <= 0.0 {
        return Err(anyhow!("Non-positive salary range: {max_salary}"));
    }
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("net-heatmap-{}.png", calculator.schedule().year));
    info!(
        "Creating heatmap in {} (target={target_net_monthly}, hours={part_time_hours})",
        path.display()
    );

    draw_net_heatmap(
        calculator,
        &path,
        max_salary,
        target_net_monthly,
        part_time_hours,
        break_even,
    )?;
    Ok(path)
}

fn draw_net_heatmap(
    calculator: &TaxCalculator,
    path: &Path,
    max_salary: f64,
    target_net_monthly: f64,
    part_time_hours: f64,
    break_even: Option<BreakEven>,
) -> Result<()> {
    let max_hours = calculator.settings().full_time_hours * 1.5;
    let max_net = calculator
        .annual_breakdown(max_salary, max_hours)
        .net_monthly
        .max(1.0);

    let root = BitMapBackend::new(path, (1100, 900)).into_drawing_area();
    root.fill(&WHITE)?;

    let (chart_area, legend_area) = root.split_horizontally(950);

    let mut chart = ChartBuilder::on(&chart_area)
        .caption("Monthly net income [EUR/month]", ("sans-serif", 26))
        .margin(50)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..max_salary, 0.0..max_hours)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .label_style(("sans-serif", 22))
        .x_labels(6)
        .y_labels(6)
        .x_desc("Monthly gross income full-time [EUR/month]")
        .y_desc("Working hours [h]")
        .axis_desc_style(("sans-serif", 26))
        .draw()?;

    let plotting_area = chart.plotting_area().strip_coord_spec();

    let (range_x, range_y) = plotting_area.get_pixel_range();
    let x_len = range_x.end - range_x.start;
    let y_len = range_y.end - range_y.start;

    let mut min: f64 = 0.0;
    let mut max: f64 = max_net;
    for i in 0..x_len {
        let salary = (max_salary * i as f64) / x_len as f64;
        let mut below_target = true;
        for j in 0..y_len {
            let hours = (max_hours * (j + 1) as f64) / y_len as f64;

            let net = calculator.annual_breakdown(salary, hours).net_monthly;
            if net.is_nan() {
                return Err(anyhow!("NaN net income for {salary} at {hours}h"));
            }
            min = min.min(net);
            max = max.max(net);

            let color = if below_target && net >= target_net_monthly {
                BLACK
            } else {
                colorize(net, max_net)
            };
            below_target = net < target_net_monthly;
            plotting_area.draw_pixel((i, y_len - j - 1), &color)?;
        }
    }

    chart.draw_series(LineSeries::new(
        [(0.0, part_time_hours), (max_salary, part_time_hours)],
        WHITE.stroke_width(1),
    ))?;
    if let Some(break_even) = break_even {
        chart.draw_series(std::iter::once(Circle::new(
            (break_even.gross_monthly_full_time, part_time_hours),
            6,
            WHITE.filled(),
        )))?;
    }

    let mut legend = ChartBuilder::on(&legend_area)
        .caption("EUR", ("sans-serif", 26))
        .margin_right(25)
        .margin_top(200)
        .margin_bottom(200)
        .y_label_area_size(60)
        .x_label_area_size(25)
        .build_cartesian_2d(0..100, min.round() as i32..max.round() as i32)?;
    legend
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .label_style(("sans-serif", 22))
        .draw()?;
    let plotting_area = legend.plotting_area().strip_coord_spec();

    let (range_x, range_y) = plotting_area.get_pixel_range();
    let x_len = range_x.end - range_x.start;
    let y_len = range_y.end - range_y.start;

    for j in 0..y_len {
        let net = (max - min) * j as f64 / y_len as f64 + min;
        for i in 0..x_len {
            plotting_area.draw_pixel((i, y_len - j - 1), &colorize(net, max_net))?;
        }
    }

    root.present()?;
    Ok(())
}

fn colorize(net: f64, max_net: f64) -> RGBColor {
    let x = net / max_net;
    if x <= 0.5 {
        interpolate(
            RGBColor(0x20, 0x10, 0x40),
            RGBColor(0xb0, 0x30, 0x50),
            0.0,
            0.5,
            x,
        )
    } else {
        interpolate(
            RGBColor(0xb0, 0x30, 0x50),
            RGBColor(0xf0, 0xe0, 0x40),
            0.5,
            1.0,
            x,
        )
    }
}

/// Linear blend from `from` at `start` to `to` at `end`, clamped outside the range.
fn interpolate(from: RGBColor, to: RGBColor, start: f64, end: f64, value: f64) -> RGBColor {
    let weight = ((value - start) / (end - start)).clamp(0.0, 1.0);
    let blend = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * weight) as u8;
    RGBColor(blend(from.0, to.0), blend(from.1, to.1), blend(from.2, to.2))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::calculator::Settings;
    use crate::load::Schedule;
    use crate::search::scan;

    fn calculator() -> TaxCalculator {
        TaxCalculator::new(Schedule::austria_2021().unwrap(), Settings::default())
    }

    fn plots_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("brutto-netto-{name}-{}", std::process::id()))
    }

    #[test]
    fn render_overview() {
        let dir = plots_dir("overview");
        let path = plot_overview(&calculator(), &dir, 4000.0, 100).unwrap();
        assert_eq!(path, dir.join("overview-2021.png"));
        assert!(fs::metadata(&path).unwrap().len() > 0);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn render_net_heatmap() {
        let calculator = calculator();
        let dir = plots_dir("heatmap");
        let break_even = scan(&calculator, 1200.0, 16.0, 4000.0, 100);
        let path =
            plot_net_heatmap(&calculator, &dir, 4000.0, 1200.0, 16.0, break_even).unwrap();
        assert_eq!(path, dir.join("net-heatmap-2021.png"));
        assert!(fs::metadata(&path).unwrap().len() > 0);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn reject_empty_ranges() {
        let calculator = calculator();
        let dir = plots_dir("empty");
        assert!(plot_overview(&calculator, &dir, 4000.0, 1).is_err());
        assert!(plot_overview(&calculator, &dir, 0.0, 100).is_err());
        assert!(plot_net_heatmap(&calculator, &dir, 0.0, 1200.0, 16.0, None).is_err());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn interpolate_clamps() {
        let black = RGBColor(0, 0, 0);
        let white = RGBColor(200, 100, 50);
        assert_eq!(interpolate(black, white, 0.0, 1.0, -1.0), black);
        assert_eq!(interpolate(black, white, 0.0, 1.0, 2.0), white);
        assert_eq!(
            interpolate(black, white, 0.0, 1.0, 0.5),
            RGBColor(100, 50, 25)
        );
    }

    #[test]
    fn colorize_covers_range() {
        assert_eq!(colorize(0.0, 1000.0), RGBColor(0x20, 0x10, 0x40));
        assert_eq!(colorize(500.0, 1000.0), RGBColor(0xb0, 0x30, 0x50));
        assert_eq!(colorize(1000.0, 1000.0), RGBColor(0xf0, 0xe0, 0x40));
        assert_eq!(colorize(5000.0, 1000.0), RGBColor(0xf0, 0xe0, 0x40));
    }
}
