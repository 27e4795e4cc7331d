/*
 * Copyright © 2025 Volodymyr Kadzhaia
 * Copyright © 2025 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

use nom::branch::alt;
use nom::bytes::complete::{tag, take_until, take_while1};
use nom::character::complete::{char, digit1, multispace0, multispace1};
use nom::combinator::{map, map_res, opt, recognize};
use nom::error::Error as NomError;
use nom::multi::separated_list1;
use nom::sequence::{delimited, preceded, tuple};
use nom::IResult;

use shared::terms::{RawCondition, RawTerm, RawValue};

use crate::error::ValkError;

fn symbol_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || c == ':'
}

/// Parse something like "?person"
fn parse_variable(input: &str) -> IResult<&str, RawTerm> {
    map(preceded(tag("?"), take_while1(symbol_char)), |name: &str| {
        RawTerm::Var(name.to_string())
    })(input)
}

/// Parse a quoted string literal
fn parse_string(input: &str) -> IResult<&str, RawTerm> {
    map(
        delimited(tag("\""), take_until("\""), tag("\"")),
        |s: &str| RawTerm::Value(RawValue::Str(s.to_string())),
    )(input)
}

fn parse_float(input: &str) -> IResult<&str, RawTerm> {
    map_res(
        recognize(tuple((opt(char('-')), digit1, char('.'), digit1))),
        |s: &str| {
            s.parse::<f64>()
                .map(|f| RawTerm::Value(RawValue::Float(f)))
        },
    )(input)
}

fn parse_int(input: &str) -> IResult<&str, RawTerm> {
    map_res(recognize(tuple((opt(char('-')), digit1))), |s: &str| {
        s.parse::<i64>().map(|i| RawTerm::Value(RawValue::Int(i)))
    })(input)
}

/// Bare words are symbols, except the boolean keywords
fn parse_word(input: &str) -> IResult<&str, RawTerm> {
    map(take_while1(symbol_char), |word: &str| match word {
        "true" => RawTerm::Value(RawValue::Bool(true)),
        "false" => RawTerm::Value(RawValue::Bool(false)),
        _ => RawTerm::Value(RawValue::Symbol(word.to_string())),
    })(input)
}

fn parse_term(input: &str) -> IResult<&str, RawTerm> {
    alt((parse_variable, parse_string, parse_float, parse_int, parse_word))(input)
}

/// Parse one `identifier attribute value` pattern
fn parse_condition(input: &str) -> IResult<&str, RawCondition> {
    let (input, _) = multispace0(input)?;
    let (input, identifier) = parse_term(input)?;
    let (input, _) = multispace1(input)?;
    let (input, attribute) = parse_term(input)?;
    let (input, _) = multispace1(input)?;
    let (input, value) = parse_term(input)?;
    Ok((input, (identifier, attribute, value)))
}

fn conditions_block(input: &str) -> IResult<&str, Vec<RawCondition>> {
    let (input, conditions) = separated_list1(
        delimited(multispace0, char('.'), multispace0),
        parse_condition,
    )(input)?;
    let (input, _) = opt(delimited(multispace0, char('.'), multispace0))(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, conditions))
}

/// Parse a `.`-separated list of conditions in the surface syntax, with
/// `?`-prefixed variables: `"?p name ?n . ?p age ?a . legal min-age 18"`.
pub fn parse_conditions(input: &str) -> Result<Vec<RawCondition>, ValkError> {
    match conditions_block(input) {
        Ok((rest, conditions)) if rest.trim().is_empty() => Ok(conditions),
        Ok((rest, _)) => Err(ValkError::Parse(format!(
            "trailing input after conditions: {:?}",
            rest.trim()
        ))),
        Err(err) => Err(ValkError::Parse(format_parse_error(input, err))),
    }
}

fn format_parse_error(input: &str, err: nom::Err<NomError<&str>>) -> String {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            let offset = input.len() - e.input.len();
            let mut line_no = 1;
            let mut col_no: usize = 1;

            for (i, c) in input.char_indices() {
                if i >= offset {
                    break;
                }
                if c == '\n' {
                    line_no += 1;
                    col_no = 1;
                } else {
                    col_no += 1;
                }
            }

            let lines: Vec<&str> = input.lines().collect();
            let error_line = if line_no <= lines.len() {
                lines[line_no - 1]
            } else {
                "[end of input]"
            };

            format!(
                "syntax error at line {}, column {}:\n{}\n{}^ Here",
                line_no,
                col_no,
                error_line,
                " ".repeat(col_no.saturating_sub(1))
            )
        }
        nom::Err::Incomplete(_) => {
            "incomplete input: the parser needs more input to complete parsing".to_string()
        }
    }
}
