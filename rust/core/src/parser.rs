// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! STEP record tokenizer using nom
//!
//! Zero-copy tokenization of a single `#id=TYPE(...);` record.

use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{map, map_res, opt, recognize, value},
    multi::separated_list0,
    sequence::{delimited, pair, preceded, terminated, tuple},
    IResult,
};

use crate::error::{Error, Result};

/// STEP parameter token
#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    /// Entity reference: #123
    EntityRef(u32),
    /// String literal with escapes left in place: 'it''s'
    String(&'a str),
    /// Integer: 42
    Integer(i64),
    /// Real: 3.14, 0., 1.5E-10
    Float(f64),
    /// Enumeration: .T., .ELEMENT.
    Enum(&'a str),
    /// Aggregate: (1, 2, 3)
    List(Vec<Token<'a>>),
    /// Typed value: IFCLENGTHMEASURE(2.5)
    TypedValue(&'a str, Vec<Token<'a>>),
    /// Unset value: $
    Null,
    /// Derived value: *
    Derived,
}

fn ws(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_whitespace())(input)
}

fn keyword(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn step_id(input: &str) -> IResult<&str, u32> {
    preceded(char('#'), map_res(digit1, |s: &str| s.parse::<u32>()))(input)
}

fn entity_ref(input: &str) -> IResult<&str, Token> {
    map(step_id, Token::EntityRef)(input)
}

/// Body of a quoted string; a doubled quote is an escaped quote.
fn quoted_body(input: &str, quote: u8) -> IResult<&str, &str> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == quote {
            if bytes.get(i + 1) == Some(&quote) {
                i += 2;
                continue;
            }
            return Ok((&input[i..], &input[..i]));
        }
        i += 1;
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}

fn string_literal(input: &str) -> IResult<&str, Token> {
    alt((
        map(
            delimited(char('\''), |i| quoted_body(i, b'\''), char('\'')),
            Token::String,
        ),
        map(
            delimited(char('"'), |i| quoted_body(i, b'"'), char('"')),
            Token::String,
        ),
    ))(input)
}

/// Reals always carry a '.', which is what separates them from integers.
/// STEP allows "0." with no fractional digits.
fn real(input: &str) -> IResult<&str, Token> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            digit1,
            char('.'),
            opt(digit1),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |s: &str| s.parse::<f64>().map(Token::Float),
    )(input)
}

fn integer(input: &str) -> IResult<&str, Token> {
    map_res(recognize(pair(opt(one_of("+-")), digit1)), |s: &str| {
        s.parse::<i64>().map(Token::Integer)
    })(input)
}

fn enumeration(input: &str) -> IResult<&str, Token> {
    map(delimited(char('.'), keyword, char('.')), Token::Enum)(input)
}

fn typed_value(input: &str) -> IResult<&str, Token> {
    map(pair(keyword, parameter_list), |(name, args)| {
        Token::TypedValue(name, args)
    })(input)
}

fn list(input: &str) -> IResult<&str, Token> {
    map(parameter_list, Token::List)(input)
}

fn parameter(input: &str) -> IResult<&str, Token> {
    delimited(
        ws,
        alt((
            real,
            integer,
            entity_ref,
            string_literal,
            enumeration,
            list,
            typed_value,
            value(Token::Null, char('$')),
            value(Token::Derived, char('*')),
        )),
        ws,
    )(input)
}

fn parameter_list(input: &str) -> IResult<&str, Vec<Token>> {
    delimited(
        char('('),
        separated_list0(char(','), parameter),
        preceded(ws, char(')')),
    )(input)
}

/// Parse a complete record line
///
/// `#42=IFCPOLYLOOP((#1,#2,#3));` yields `(42, "IFCPOLYLOOP", [List([..])])`.
/// The type keyword is returned exactly as written.
pub fn parse_entity(input: &str) -> Result<(u32, &str, Vec<Token<'_>>)> {
    let mut record = tuple((
        delimited(ws, step_id, ws),
        preceded(char('='), delimited(ws, keyword, ws)),
        terminated(parameter_list, pair(ws, char(';'))),
    ));

    match record(input) {
        Ok((_, (id, type_name, params))) => Ok((id, type_name, params)),
        Err(e) => {
            let id = preceded(ws, step_id)(input).map(|(_, id)| id).unwrap_or(0);
            let snippet = input.char_indices().nth(80).map_or(input, |(i, _)| &input[..i]);
            Err(Error::parse(id, format!("{:?} in {:?}", e, snippet)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_poly_loop() {
        let (id, name, params) = parse_entity("#42=IFCPOLYLOOP((#1,#2,#3));").unwrap();
        assert_eq!(id, 42);
        assert_eq!(name, "IFCPOLYLOOP");
        assert_eq!(
            params,
            vec![Token::List(vec![
                Token::EntityRef(1),
                Token::EntityRef(2),
                Token::EntityRef(3),
            ])]
        );
    }

    #[test]
    fn test_parse_with_whitespace() {
        let (id, name, params) =
            parse_entity("  #7 = IFCORIENTEDEDGE( * , * , #6 , .F. ) ;").unwrap();
        assert_eq!(id, 7);
        assert_eq!(name, "IFCORIENTEDEDGE");
        assert_eq!(
            params,
            vec![
                Token::Derived,
                Token::Derived,
                Token::EntityRef(6),
                Token::Enum("F"),
            ]
        );
    }

    #[test]
    fn test_parse_numbers() {
        let (_, _, params) = parse_entity("#1=IFCCARTESIANPOINT((0.,-1.5E-3,12));").unwrap();
        assert_eq!(
            params,
            vec![Token::List(vec![
                Token::Float(0.0),
                Token::Float(-0.0015),
                Token::Integer(12),
            ])]
        );
    }

    #[test]
    fn test_parse_strings_and_typed_values() {
        let (_, _, params) =
            parse_entity("#3=IFCPROPERTYSINGLEVALUE('it''s',$,IFCLENGTHMEASURE(2.5),$);")
                .unwrap();
        assert_eq!(params[0], Token::String("it''s"));
        assert_eq!(params[1], Token::Null);
        assert_eq!(
            params[2],
            Token::TypedValue("IFCLENGTHMEASURE", vec![Token::Float(2.5)])
        );
    }

    #[test]
    fn test_parse_empty_list() {
        let (_, _, params) = parse_entity("#9=IFCEDGELOOP(( ));").unwrap();
        assert_eq!(params, vec![Token::List(vec![])]);
    }

    #[test]
    fn test_parse_error_reports_step_id() {
        let err = parse_entity("#15=IFCPOLYLOOP((#1,#2);").unwrap_err();
        assert!(matches!(err, Error::Parse { step_id: 15, .. }));
    }

    #[test]
    fn test_parse_error_near_multibyte_char() {
        // 'é' straddles the snippet cut at byte 80
        let line = format!("#5=IFCPOLYLOOP(('{}é'),;", "a".repeat(62));
        assert_eq!(line.find('é'), Some(79));
        let err = parse_entity(&line).unwrap_err();
        assert!(matches!(err, Error::Parse { step_id: 5, .. }));

        let wide = format!("#6=IFCPOLYLOOP(('{}'),;", "é".repeat(60));
        let err = parse_entity(&wide).unwrap_err();
        assert!(matches!(err, Error::Parse { step_id: 6, .. }));
    }
}
