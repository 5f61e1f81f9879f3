//! Dual-axis line chart: cost on the left y-axis, handled count on the right,
//! both against elapsed seconds.

use crate::model::TimeSeries;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::ops::Range;

/// Matplotlib "tab:blue" / "tab:red".
pub const COOL: RGBColor = RGBColor(31, 119, 180);
pub const WARM: RGBColor = RGBColor(214, 39, 40);

#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub left_label: String,
    pub right_label: String,
    /// Render left tick labels as thousands-grouped integers.
    pub left_integer_ticks: bool,
    pub right_integer_ticks: bool,
    pub width: u32,
    pub height: u32,
    pub left_color: RGBColor,
    pub right_color: RGBColor,
    pub legend: bool,
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self {
            title: "Cost and Handled Incidents Count Over Time".into(),
            x_label: "Elapsed Time (seconds)".into(),
            left_label: "Cost".into(),
            right_label: "Handled Incidents Count".into(),
            left_integer_ticks: true,
            right_integer_ticks: false,
            width: 1280,
            height: 720,
            left_color: COOL,
            right_color: WARM,
            legend: true,
        }
    }
}

/// "2520055.7" -> "2,520,055". Truncates toward zero.
pub fn group_thousands(value: f64) -> String {
    let n = value.trunc() as i64;
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn grouped_tick(v: &f64) -> String {
    group_thousands(*v)
}

/// Data span padded by 5% per side. Empty input gets 0..1, a constant value
/// gets a unit-wide window around it.
pub fn axis_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return 0.0..1.0;
    }
    if lo == hi {
        return (lo - 0.5)..(hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad)..(hi + pad)
}

/// Draw the chart onto any plotters drawing area.
pub fn draw_chart<DB>(
    root: &DrawingArea<DB, Shift>,
    series: &TimeSeries,
    spec: &ChartSpec,
) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let x_range = axis_range(series.elapsed().iter().copied());
    let left_range = axis_range(series.cost().iter().map(|&c| c as f64));
    let right_range = axis_range(series.handled().iter().map(|&h| h as f64));

    let left_color = spec.left_color;
    let right_color = spec.right_color;
    let neutral = ("sans-serif", 16).into_font().color(&BLACK);
    let left_text = ("sans-serif", 16).into_font().color(&left_color);
    let right_text = ("sans-serif", 16).into_font().color(&right_color);
    let tick_fmt: &dyn Fn(&f64) -> String = &grouped_tick;

    let mut chart = ChartBuilder::on(root)
        .caption(&spec.title, ("sans-serif", 24).into_font())
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .right_y_label_area_size(100)
        .build_cartesian_2d(x_range.clone(), left_range)?
        .set_secondary_coord(x_range, right_range);

    // Cost ticks and title carry the cost color; x ticks stay neutral.
    let mut mesh = chart.configure_mesh();
    mesh.disable_mesh()
        .x_label_style(neutral.clone())
        .y_label_style(left_text.clone())
        .y_desc(spec.left_label.as_str())
        .axis_desc_style(left_text);
    if spec.left_integer_ticks {
        mesh.y_label_formatter(tick_fmt);
    }
    mesh.draw()?;

    let mut right = chart.configure_secondary_axes();
    right
        .y_desc(spec.right_label.as_str())
        .label_style(right_text.clone())
        .axis_desc_style(right_text);
    if spec.right_integer_ticks {
        right.y_label_formatter(tick_fmt);
    }
    right.draw()?;

    // The shared x title is drawn by hand so it does not pick up an axis color.
    let (w, h) = root.dim_in_pixel();
    root.draw(&Text::new(
        spec.x_label.clone(),
        (w as i32 / 2, h as i32 - 6),
        neutral.pos(Pos::new(HPos::Center, VPos::Bottom)),
    ))?;

    if !series.is_empty() {
        chart
            .draw_series(LineSeries::new(series.cost_points(), left_color.stroke_width(2)))?
            .label(spec.left_label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], left_color));

        chart
            .draw_secondary_series(LineSeries::new(
                series.handled_points(),
                right_color.stroke_width(2),
            ))?
            .label(spec.right_label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], right_color));

        if spec.legend {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font(("sans-serif", 14).into_font().color(&BLACK))
                .draw()?;
        }
    }

    root.present()?;
    Ok(())
}

/// Render to a standalone SVG document.
pub fn render_svg(series: &TimeSeries, spec: &ChartSpec) -> anyhow::Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (spec.width, spec.height)).into_drawing_area();
        draw_chart(&root, series, spec)?;
    }
    Ok(svg)
}
