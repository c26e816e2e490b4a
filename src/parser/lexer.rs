// Lexical helpers for the dashboard DSL

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till},
    character::complete::{alpha1, alphanumeric1, char, multispace0},
    combinator::{map, recognize},
    multi::many0_count,
    sequence::{delimited, pair},
    IResult,
};

/// Wrap a parser so it ignores surrounding whitespace
pub fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O>,
{
    delimited(multispace0, inner, multispace0)
}

/// Bare column/keyword name: letter or `_`, then letters, digits, `_`, `-`, `.`
pub fn identifier(input: &str) -> IResult<&str, String> {
    map(
        recognize(pair(
            alt((alpha1, tag("_"))),
            many0_count(alt((alphanumeric1, tag("_"), tag("-"), tag(".")))),
        )),
        String::from,
    )(input)
}

/// Double-quoted string without escapes: "Order Date"
pub fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('"'), take_till(|c| c == '"'), char('"')),
        String::from,
    )(input)
}

/// Column reference: quoted (for names with spaces) or bare
pub fn column_name(input: &str) -> IResult<&str, String> {
    alt((string_literal, identifier))(input)
}
