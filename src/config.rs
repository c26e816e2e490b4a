// Dashboard definition file: chart slots plus render options

use crate::aggregate::ChartRequest;
use crate::RenderOptions;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// `{ "charts": [ {"x": .., "y": .., "type": .., "title": ..} ], "render": {..} }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub charts: Vec<ChartRequest>,
    #[serde(default)]
    pub render: RenderOptions,
}

impl DashboardConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("Invalid dashboard configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config '{}'", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Failed to load config '{}'", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::ChartKind;
    use crate::OutputFormat;
    use std::io::Write;

    #[test]
    fn test_full_config() {
        let config = DashboardConfig::from_json_str(
            r#"{
                "charts": [
                    {"x": "region", "y": "sales", "type": "pie", "title": "Sales"},
                    {"x": "", "y": "sales"},
                    {"x": "month", "type": "Line"}
                ],
                "render": {"width": 400, "type": "svg"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.charts.len(), 3);
        assert_eq!(config.charts[0].kind, ChartKind::Pie);
        assert!(!config.charts[1].is_configured());
        assert_eq!(config.charts[2].kind, ChartKind::Line);
        assert_eq!(config.render.width, 400);
        assert_eq!(config.render.height, 600);
        assert_eq!(config.render.format, OutputFormat::Svg);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DashboardConfig::from_json_str("{}").unwrap();
        assert!(config.charts.is_empty());
        assert_eq!(config.render.width, 800);
        assert_eq!(config.render.format, OutputFormat::Png);
    }

    #[test]
    fn test_invalid_config() {
        assert!(DashboardConfig::from_json_str("{\"charts\": 3}").is_err());
        assert!(DashboardConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"charts": [{{"x": "region"}}]}}"#).unwrap();
        let config = DashboardConfig::load(file.path()).unwrap();
        assert_eq!(config.charts[0].category, "region");
    }

    #[test]
    fn test_load_missing_file() {
        assert!(DashboardConfig::load(Path::new("/nonexistent/dashboard.json")).is_err());
    }
}
