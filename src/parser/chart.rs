// Parser for a single chart slot

use super::lexer::{column_name, identifier, string_literal, ws};
use crate::aggregate::{ChartKind, ChartRequest};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::map,
    multi::separated_list0,
    sequence::{preceded, terminated},
    IResult,
};

#[derive(Debug)]
enum ChartArg {
    X(String),
    Y(String),
    Kind(String),
    Title(String),
}

/// Argument key followed by `:`, whitespace allowed on either side of the colon
fn key<'a>(name: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    terminated(ws(tag(name)), char(':'))
}

fn parse_chart_arg(input: &str) -> IResult<&str, ChartArg> {
    alt((
        map(preceded(key("x"), ws(column_name)), ChartArg::X),
        map(preceded(key("y"), ws(column_name)), ChartArg::Y),
        map(preceded(key("type"), ws(identifier)), ChartArg::Kind),
        map(preceded(key("title"), ws(string_literal)), ChartArg::Title),
    ))(input)
}

/// Parse a chart slot
/// Format: chart(x: col, y: col, type: pie, title: "...") in any argument order.
/// `chart()` declares an unused slot.
pub fn parse_chart(input: &str) -> IResult<&str, ChartRequest> {
    let (input, _) = ws(tag("chart"))(input)?;
    let (input, _) = ws(char('('))(input)?;
    let (input, args) = separated_list0(ws(char(',')), parse_chart_arg)(input)?;
    let (input, _) = ws(char(')'))(input)?;

    let mut request = ChartRequest::default();
    for arg in args {
        match arg {
            ChartArg::X(col) => request.category = col,
            ChartArg::Y(col) => request.measure = Some(col),
            ChartArg::Kind(name) => request.kind = ChartKind::from_name(&name),
            ChartArg::Title(title) => request.title = Some(title),
        }
    }

    Ok((input, request))
}
