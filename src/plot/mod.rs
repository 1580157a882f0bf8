//! Plot artifacts
//!
//! Plots are PNG files written to a single directory and addressed by URL. File names
//! are derived from the dataset name and plot kind, so re-plotting the same dataset the
//! same way replaces the previous image.

use plotters::prelude::*;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

pub const PLOT_WIDTH: u32 = 600;
pub const PLOT_HEIGHT: u32 = 400;
pub const HISTOGRAM_BINS: usize = 20;

const MARGIN: u32 = 20;
const POINT_RADIUS: i32 = 3;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("Failed to access plot directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render plot: {0}")]
    Render(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    Scatter,
    Histogram,
}

impl PlotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlotKind::Scatter => "scatter",
            PlotKind::Histogram => "histogram",
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scatter" => Ok(PlotKind::Scatter),
            "histogram" | "hist" => Ok(PlotKind::Histogram),
            other => Err(format!("Unknown plot kind '{}'", other)),
        }
    }
}

/// Where artifacts are written and how they are addressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotSettings {
    pub dir: PathBuf,
    pub url_prefix: String,
}

impl PlotSettings {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into(),
        }
    }

    pub fn artifact_name(dataset_key: &str, kind: PlotKind) -> String {
        let stem = Path::new(dataset_key)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("dataset");
        format!("{}_{}.png", stem, kind)
    }

    pub fn artifact_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub fn url_for(&self, file_name: &str) -> String {
        format!("{}/{}", self.url_prefix.trim_end_matches('/'), file_name)
    }

    pub fn ensure_dir(&self) -> Result<(), PlotError> {
        fs::create_dir_all(&self.dir).map_err(|source| PlotError::Io {
            path: self.dir.clone(),
            source,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Splits the value range into `bins` equal-width bins; the last bin is closed on the right
pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let (mut lo, mut hi) = bounds(values.iter().copied());
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for value in values {
        let index = (((value - lo) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: lo + width * i as f64,
            end: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

pub fn render_scatter(path: &Path, points: &[(f64, f64)]) -> Result<(), PlotError> {
    let x_range = padded(bounds(points.iter().map(|p| p.0)));
    let y_range = padded(bounds(points.iter().map(|p| p.1)));

    let root = BitMapBackend::new(path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(MARGIN)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
        .map_err(render_error)?;

    frame(&chart, x_range, y_range)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), POINT_RADIUS, BLUE.mix(0.7).filled())),
        )
        .map_err(render_error)?;

    root.present().map_err(render_error)?;
    debug!(path = %path.display(), points = points.len(), "Rendered scatter plot");
    Ok(())
}

pub fn render_histogram(path: &Path, values: &[f64]) -> Result<(), PlotError> {
    let bins = histogram_bins(values, HISTOGRAM_BINS);
    let x_range = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.start, last.end),
        _ => (0.0, 1.0),
    };
    let tallest = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let y_range = (0.0, tallest as f64 * 1.05);

    let root = BitMapBackend::new(path, (PLOT_WIDTH, PLOT_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(render_error)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(MARGIN)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
        .map_err(render_error)?;

    frame(&chart, x_range, y_range)?;
    chart
        .draw_series(bins.iter().filter(|b| b.count > 0).map(|b| {
            Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], BLUE.mix(0.7).filled())
        }))
        .map_err(render_error)?;

    root.present().map_err(render_error)?;
    debug!(path = %path.display(), values = values.len(), "Rendered histogram");
    Ok(())
}

/// URLs of every PNG artifact in the plot directory, sorted by file name
pub fn list_plots(settings: &PlotSettings) -> Result<Vec<String>, PlotError> {
    if !settings.dir.exists() {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(&settings.dir).map_err(|source| PlotError::Io {
        path: settings.dir.clone(),
        source,
    })?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.to_lowercase().ends_with(".png"))
        .collect();
    names.sort();

    Ok(names.iter().map(|name| settings.url_for(name)).collect())
}

type Chart<'a, 'b> = ChartContext<
    'a,
    BitMapBackend<'b>,
    Cartesian2d<plotters::coord::types::RangedCoordf64, plotters::coord::types::RangedCoordf64>,
>;

fn frame(chart: &Chart<'_, '_>, x: (f64, f64), y: (f64, f64)) -> Result<(), PlotError> {
    chart
        .plotting_area()
        .draw(&Rectangle::new([(x.0, y.0), (x.1, y.1)], BLACK.stroke_width(1)))
        .map_err(render_error)
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Widens a range by 5% on each side; empty or degenerate ranges get a unit span
fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if lo == hi {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

fn render_error(e: impl std::fmt::Display) -> PlotError {
    PlotError::Render(e.to_string())
}
