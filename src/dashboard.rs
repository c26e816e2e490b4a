// Multi-slot orchestration: up to four chart requests over one row set

use crate::aggregate::{aggregate, ChartRequest, Series};
use crate::data::Row;
use log::{debug, warn};
use std::fmt;

/// Number of chart slots a dashboard offers
pub const MAX_CHART_SLOTS: usize = 4;

/// Ordered chart slots. Slot position drives default headings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    slots: Vec<ChartRequest>,
}

impl Dashboard {
    /// Keep the first [`MAX_CHART_SLOTS`] requests
    pub fn new(mut slots: Vec<ChartRequest>) -> Self {
        if slots.len() > MAX_CHART_SLOTS {
            warn!(
                "{} chart slots given, keeping the first {}",
                slots.len(),
                MAX_CHART_SLOTS
            );
            slots.truncate(MAX_CHART_SLOTS);
        }
        Self { slots }
    }

    pub fn slots(&self) -> &[ChartRequest] {
        &self.slots
    }

    /// Aggregate every configured slot, in slot order.
    /// Unused slots (no category column) are left out.
    pub fn plan(&self, rows: &[Row]) -> Vec<PlannedChart> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, request)| {
                let Some(series) = aggregate(rows, request) else {
                    debug!("Chart slot {} has no category column, skipping", slot + 1);
                    return None;
                };
                Some(PlannedChart {
                    slot,
                    heading: request
                        .title()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("Chart {}", slot + 1)),
                    legend: request
                        .title()
                        .map(str::to_string)
                        .unwrap_or_else(|| request.default_label()),
                    series,
                })
            })
            .collect()
    }
}

/// A configured slot's series plus the text the renderer shows with it
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChart {
    /// Zero-based slot index
    pub slot: usize,
    pub heading: String,
    pub legend: String,
    pub series: Series,
}

/// Outcome of generating a dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardStatus {
    NoData,
    NoChartsConfigured,
    Rendered(usize),
}

impl fmt::Display for DashboardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DashboardStatus::NoData => write!(f, "No data loaded. Please load data first."),
            DashboardStatus::NoChartsConfigured => {
                write!(f, "No charts configured. Choose X columns and try again.")
            }
            DashboardStatus::Rendered(n) => write!(f, "Rendered {} chart(s).", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::ChartKind;
    use pretty_assertions::assert_eq;

    fn rows() -> Vec<Row> {
        vec![
            Row::from_pairs([("region", "West"), ("sales", "10")]),
            Row::from_pairs([("region", "East"), ("sales", "5")]),
            Row::from_pairs([("region", "West"), ("sales", "2.5")]),
        ]
    }

    #[test]
    fn test_plan_skips_unused_slots() {
        let dashboard = Dashboard::new(vec![
            ChartRequest::default(),
            ChartRequest::new("region"),
            ChartRequest::new(""),
            ChartRequest::new("region").with_measure("sales").with_kind(ChartKind::Pie),
        ]);
        let planned = dashboard.plan(&rows());
        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].slot, 1);
        assert_eq!(planned[0].heading, "Chart 2");
        assert_eq!(planned[0].legend, "Count by region");
        assert_eq!(planned[0].series.values, vec![2.0, 1.0]);
        assert_eq!(planned[1].slot, 3);
        assert_eq!(planned[1].legend, "sales by region");
        assert_eq!(planned[1].series.values, vec![12.5, 5.0]);
        assert_eq!(planned[1].series.kind, ChartKind::Pie);
    }

    #[test]
    fn test_plan_uses_title() {
        let dashboard = Dashboard::new(vec![ChartRequest::new("region").with_title("Regions")]);
        let planned = dashboard.plan(&rows());
        assert_eq!(planned[0].heading, "Regions");
        assert_eq!(planned[0].legend, "Regions");
    }

    #[test]
    fn test_plan_empty_title_falls_back() {
        let dashboard = Dashboard::new(vec![ChartRequest::new("region").with_title("")]);
        let planned = dashboard.plan(&rows());
        assert_eq!(planned[0].heading, "Chart 1");
        assert_eq!(planned[0].legend, "Count by region");
        assert_eq!(planned[0].series.title, None);
    }

    #[test]
    fn test_slots_truncated_to_four() {
        let dashboard = Dashboard::new(
            (0..6).map(|i| ChartRequest::new(format!("c{}", i))).collect(),
        );
        assert_eq!(dashboard.slots().len(), MAX_CHART_SLOTS);
        assert_eq!(dashboard.slots()[3].category, "c3");
    }

    #[test]
    fn test_plan_with_no_slots() {
        assert!(Dashboard::default().plan(&rows()).is_empty());
    }

    #[test]
    fn test_plan_is_repeatable() {
        let dashboard = Dashboard::new(vec![ChartRequest::new("region").with_measure("sales")]);
        assert_eq!(dashboard.plan(&rows()), dashboard.plan(&rows()));
    }

    #[test]
    fn test_status_text() {
        assert_eq!(
            DashboardStatus::NoData.to_string(),
            "No data loaded. Please load data first."
        );
        assert_eq!(
            DashboardStatus::NoChartsConfigured.to_string(),
            "No charts configured. Choose X columns and try again."
        );
        assert_eq!(DashboardStatus::Rendered(3).to_string(), "Rendered 3 chart(s).");
    }
}
