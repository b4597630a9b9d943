//! Bar chart of the regular tier amounts
//!
//! The dashboard talks to a [`ChartRenderer`]. It creates the chart once and
//! afterwards only swaps the series. Two renderers are provided: plotly HTML
//! written to a file, and plain text for the terminal.

use dhunjam_core::{Error, Result};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bar colour (`#f0c3f1`)
pub const BAR_COLOR: (u8, u8, u8) = (240, 195, 241);

/// Dataset label shown in the legend
pub const DATASET_LABEL: &str = "Regular Song Request Amount";

/// Horizontal axis title
pub const X_AXIS_TITLE: &str = "Category";

/// Vertical axis title
pub const Y_AXIS_TITLE: &str = "Amount";

const TEXT_BAR_WIDTH: usize = 40;

/// Opaque reference to a chart created by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChartHandle(u64);

impl ChartHandle {
    /// Handle with a renderer-chosen id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Numeric id of the chart
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Something that can draw a labelled bar chart and redraw it with new values
pub trait ChartRenderer {
    /// Create a chart; `series` must have one value per label
    ///
    /// # Errors
    ///
    /// Returns [`Error::Chart`] if the series does not match the labels or
    /// the chart cannot be drawn.
    fn create(&mut self, labels: &[String], series: &[f64]) -> Result<ChartHandle>;

    /// Replace the series of an existing chart
    ///
    /// # Errors
    ///
    /// Returns [`Error::Chart`] for an unknown handle or a series of the
    /// wrong length.
    fn update(&mut self, handle: ChartHandle, series: &[f64]) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
struct ChartData {
    labels: Vec<String>,
    series: Vec<f64>,
}

/// Handle allocation and bookkeeping shared by the renderers
#[derive(Debug, Clone, Default)]
struct ChartRegistry {
    next_id: u64,
    charts: BTreeMap<u64, ChartData>,
}

impl ChartRegistry {
    fn create(&mut self, labels: &[String], series: &[f64]) -> Result<ChartHandle> {
        check_len(labels.len(), series.len())?;

        self.next_id += 1;
        let handle = ChartHandle(self.next_id);
        self.charts.insert(
            handle.0,
            ChartData {
                labels: labels.to_vec(),
                series: series.to_vec(),
            },
        );
        Ok(handle)
    }

    fn update(&mut self, handle: ChartHandle, series: &[f64]) -> Result<&ChartData> {
        let chart = self
            .charts
            .get_mut(&handle.0)
            .ok_or_else(|| Error::Chart(format!("Unknown chart handle {}", handle.0)))?;

        check_len(chart.labels.len(), series.len())?;
        chart.series = series.to_vec();
        Ok(chart)
    }

    fn get(&self, handle: ChartHandle) -> Option<&ChartData> {
        self.charts.get(&handle.0)
    }
}

fn check_len(labels: usize, series: usize) -> Result<()> {
    if labels == series {
        Ok(())
    } else {
        Err(Error::Chart(format!(
            "Series has {series} values for {labels} labels"
        )))
    }
}

/// Build the plotly page for a pricing bar chart
#[must_use]
pub fn pricing_chart_html(labels: &[String], series: &[f64]) -> String {
    let (r, g, b) = BAR_COLOR;

    let mut plot = plotly::Plot::new();
    let layout = plot
        .layout()
        .clone()
        .x_axis(plotly::layout::Axis::new().title(X_AXIS_TITLE))
        .y_axis(
            plotly::layout::Axis::new()
                .title(Y_AXIS_TITLE)
                .hover_format(".0f"),
        );
    plot.set_layout(layout);

    let trace = plotly::Bar::new(labels.to_vec(), series.to_vec())
        .name(DATASET_LABEL)
        .marker(plotly::common::Marker::default().color(plotly::color::Rgba::new(r, g, b, 1.0)));
    plot.add_trace(trace);

    plot.to_html()
}

/// Renderer that keeps an HTML page on disk in sync with the chart
///
/// Only the most recently drawn chart is in the file.
#[derive(Debug, Clone)]
pub struct PlotlyChartRenderer {
    output: PathBuf,
    registry: ChartRegistry,
}

impl PlotlyChartRenderer {
    /// Write charts to `output`
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            registry: ChartRegistry::default(),
        }
    }

    /// File the chart is written to
    #[must_use]
    pub fn output(&self) -> &Path {
        &self.output
    }

    fn write(&self, chart: &ChartData) -> Result<()> {
        let html = pricing_chart_html(&chart.labels, &chart.series);
        fs::write(&self.output, html).map_err(|e| {
            Error::Chart(format!(
                "Failed to write chart to {}: {e}",
                self.output.display()
            ))
        })?;
        info!(path = %self.output.display(), "Chart written");
        Ok(())
    }
}

impl ChartRenderer for PlotlyChartRenderer {
    fn create(&mut self, labels: &[String], series: &[f64]) -> Result<ChartHandle> {
        let handle = self.registry.create(labels, series)?;
        if let Some(chart) = self.registry.get(handle) {
            self.write(chart)?;
        }
        Ok(handle)
    }

    fn update(&mut self, handle: ChartHandle, series: &[f64]) -> Result<()> {
        let chart = self.registry.update(handle, series)?.clone();
        self.write(&chart)
    }
}

/// Renderer that draws horizontal bars with characters
#[derive(Debug, Clone, Default)]
pub struct TextChartRenderer {
    registry: ChartRegistry,
}

impl TextChartRenderer {
    /// Create an empty renderer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current picture of a chart, `None` for an unknown handle
    ///
    /// Bars are scaled so the largest value spans the full width; values at
    /// or below zero get an empty bar.
    #[must_use]
    pub fn render(&self, handle: ChartHandle) -> Option<String> {
        let chart = self.registry.get(handle)?;

        let label_width = chart.labels.iter().map(String::len).max().unwrap_or(0);
        let max = chart.series.iter().copied().fold(0.0_f64, f64::max);

        let mut out = format!("{DATASET_LABEL}\n");
        for (label, value) in chart.labels.iter().zip(&chart.series) {
            let bar = "#".repeat(bar_width(*value, max));
            let _ = writeln!(out, "{label:<label_width$} | {bar} {value}");
        }
        Some(out)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn bar_width(value: f64, max: f64) -> usize {
    if max <= 0.0 || value <= 0.0 || !value.is_finite() {
        return 0;
    }
    ((value / max) * TEXT_BAR_WIDTH as f64).round() as usize
}

impl ChartRenderer for TextChartRenderer {
    fn create(&mut self, labels: &[String], series: &[f64]) -> Result<ChartHandle> {
        let handle = self.registry.create(labels, series)?;
        debug!(chart = handle.id(), "Text chart created");
        Ok(handle)
    }

    fn update(&mut self, handle: ChartHandle, series: &[f64]) -> Result<()> {
        self.registry.update(handle, series)?;
        debug!(chart = handle.id(), "Text chart updated");
        Ok(())
    }
}
