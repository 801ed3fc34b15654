//! Growth chart rendering for reports.

use crate::domain::period::PeriodState;

const WIDTH: f64 = 500.0;
const HEIGHT: f64 = 200.0;
const PADDING: f64 = 40.0;

/// Typst figure plotting each period's ending total value.
pub fn format_growth_chart(states: &[PeriodState]) -> String {
    if states.is_empty() {
        return "No projection data available.".to_string();
    }

    let values: Vec<f64> = states.iter().map(|s| s.ending_total_value).collect();
    let min_value = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;

    let range = max_value - min_value;
    let scale_y = if range > 0.0 { plot_height / range } else { 1.0 };
    let scale_x = if values.len() > 1 {
        plot_width / (values.len() - 1) as f64
    } else {
        0.0
    };

    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x = i as f64 * scale_x;
            let y = (max_value - v) * scale_y;
            format!("({:.1}pt, {:.1}pt)", x, y)
        })
        .collect();

    format!(
        r#"#figure(
  box(
    width: {w:.0}pt,
    height: {h:.0}pt,
    fill: white,
    {{
      place(dx: {p:.0}pt, dy: {p:.0}pt, line(start: (0pt, 0pt), end: (0pt, {ph:.0}pt)))
      place(dx: {p:.0}pt, dy: {bottom:.0}pt, line(start: (0pt, 0pt), end: ({pw:.0}pt, 0pt)))
      place(dx: {p:.0}pt, dy: {p:.0}pt, path(
        fill: none,
        stroke: blue + 1pt,
        {points}
      ))
    }}
  ),
  caption: [Period-end total value]
)
"#,
        w = WIDTH,
        h = HEIGHT,
        p = PADDING,
        ph = plot_height,
        pw = plot_width,
        bottom = HEIGHT - PADDING,
        points = points.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::projection::compute_projection;

    #[test]
    fn empty_projection() {
        assert_eq!(format_growth_chart(&[]), "No projection data available.");
    }

    #[test]
    fn single_period_chart() {
        let states = compute_projection(1_000_000.0, 3434.67, 1, None).unwrap();
        let chart = format_growth_chart(&states);
        assert!(chart.contains("#figure"));
        assert!(chart.contains("Period-end total value"));
        assert!(chart.contains("(0.0pt, 0.0pt)"));
    }

    #[test]
    fn chart_spans_plot_area() {
        let states = compute_projection(1_000_000.0, 3434.67, 5, None).unwrap();
        let chart = format_growth_chart(&states);
        assert!(chart.contains("width: 500pt"));
        assert!(chart.contains("height: 200pt"));
        // Growing values: first point at the bottom-left, last at the top-right.
        assert!(chart.contains("(0.0pt, 120.0pt)"));
        assert!(chart.contains("(420.0pt, 0.0pt)"));
    }
}
