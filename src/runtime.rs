// Application state: loaded data plus the charts rendered from it

use crate::dashboard::{Dashboard, DashboardStatus};
use crate::data::Dataset;
use crate::graph::Canvas;
use crate::{OutputFormat, RenderOptions};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// A chart produced by the renderer, owned by a [`ChartRegistry`]
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub slot: usize,
    pub heading: String,
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
    pub path: Option<PathBuf>,
}

impl RenderedChart {
    pub fn file_name(slot: usize, format: OutputFormat) -> String {
        format!("chart-{}.{}", slot + 1, format.extension())
    }
}

/// Owns the charts currently on display.
/// Previous charts must be released before new ones are registered.
#[derive(Debug, Default)]
pub struct ChartRegistry {
    charts: Vec<RenderedChart>,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn charts(&self) -> &[RenderedChart] {
        &self.charts
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    /// Destroy every registered chart, deleting any file written for it.
    /// Charts whose file could not be removed stay registered, and the
    /// first such failure is returned once every chart has been tried.
    pub fn release(&mut self) -> Result<()> {
        let mut first_error = None;
        for chart in std::mem::take(&mut self.charts) {
            let Some(path) = &chart.path else {
                continue;
            };
            match fs::remove_file(path) {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!("Chart file {} already gone", path.display())
                }
                Err(e) => {
                    warn!("Could not remove {}: {}", path.display(), e);
                    if first_error.is_none() {
                        first_error = Some(anyhow::Error::new(e).context(format!(
                            "Failed to remove chart file '{}'",
                            path.display()
                        )));
                    }
                    self.charts.push(chart);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn register(&mut self, chart: RenderedChart) {
        self.charts.push(chart);
    }
}

/// Explicit session state: the loaded dataset and the charts derived from it
#[derive(Debug, Default)]
pub struct DashboardState {
    dataset: Option<Dataset>,
    charts: ChartRegistry,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the loaded dataset; returns the load summary
    pub fn load(&mut self, dataset: Dataset) -> String {
        let summary = dataset.summary();
        info!("{}", summary);
        self.dataset = Some(dataset);
        summary
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    pub fn charts(&self) -> &ChartRegistry {
        &self.charts
    }

    /// Rebuild the dashboard. Charts from the previous run are always
    /// released first. When `out_dir` is given each chart is also written
    /// there as `chart-<slot>.<ext>`.
    pub fn generate(
        &mut self,
        dashboard: &Dashboard,
        options: &RenderOptions,
        out_dir: Option<&Path>,
    ) -> Result<DashboardStatus> {
        self.charts.release()?;

        let dataset = match &self.dataset {
            Some(d) if !d.is_empty() => d,
            _ => {
                info!("Nothing to chart: no data loaded");
                return Ok(DashboardStatus::NoData);
            }
        };

        let planned = dashboard.plan(&dataset.rows);
        if planned.is_empty() {
            return Ok(DashboardStatus::NoChartsConfigured);
        }

        let canvas = Canvas::new(options)?;
        if let Some(dir) = out_dir {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory '{}'", dir.display()))?;
        }

        for chart in &planned {
            info!(
                "Rendering {} ({} chart, {} categories)",
                chart.heading,
                chart.series.kind,
                chart.series.len()
            );
            let bytes = canvas
                .render(chart)
                .with_context(|| format!("Failed to render {}", chart.heading))?;

            let path = match out_dir {
                Some(dir) => {
                    let path = dir.join(RenderedChart::file_name(chart.slot, canvas.format()));
                    fs::write(&path, &bytes)
                        .with_context(|| format!("Failed to write '{}'", path.display()))?;
                    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
                    Some(path)
                }
                None => None,
            };

            self.charts.register(RenderedChart {
                slot: chart.slot,
                heading: chart.heading.clone(),
                format: canvas.format(),
                bytes,
                path,
            });
        }

        Ok(DashboardStatus::Rendered(self.charts.len()))
    }
}
