//! Rendering: dual-axis chart (SVG via plotters) and the HTML report wrapper.

pub mod chart;
pub mod html;

pub use chart::{ChartSpec, draw_chart, render_svg};
pub use html::render_html_report;
