// Dashboard DSL parser module

pub mod chart;
pub mod lexer;
pub mod pipeline;

use crate::aggregate::ChartRequest;
use anyhow::{anyhow, Result};

pub use chart::parse_chart;
pub use pipeline::parse_dashboard;

/// Parse a complete DSL string into chart slots, reporting leftover input
pub fn parse_slots(input: &str) -> Result<Vec<ChartRequest>> {
    match parse_dashboard(input) {
        Ok((_, slots)) => Ok(slots),
        Err(e) => Err(anyhow!("Parse error in '{}': {:?}", input, e)),
    }
}
