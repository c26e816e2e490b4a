// Pipeline parser: chart slots separated by "|"

use super::chart::parse_chart;
use super::lexer::ws;
use crate::aggregate::ChartRequest;
use nom::{
    bytes::complete::tag,
    combinator::eof,
    multi::separated_list1,
    IResult,
};

/// Parse a dashboard definition
/// Format: chart(...) | chart(...) | ...
pub fn parse_dashboard(input: &str) -> IResult<&str, Vec<ChartRequest>> {
    let (input, slots) = separated_list1(ws(tag("|")), parse_chart)(input)?;
    let (input, _) = ws(eof)(input)?;
    Ok((input, slots))
}
