// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HEADER section reading
//!
//! Only FILE_SCHEMA matters here: it selects the schema version that gates
//! subtype dispatch.

use memchr::memmem;
use nom::{
    bytes::complete::{take_until, take_while},
    character::complete::char,
    sequence::{delimited, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::schema::IfcSchemaVersion;

fn ws(input: &str) -> IResult<&str, &str> {
    take_while(|c: char| c.is_whitespace())(input)
}

/// `(('IFC2X3'))` -> `IFC2X3`
fn schema_list(input: &str) -> IResult<&str, &str> {
    let (rest, (_, _, _, _, _, name)) = tuple((
        ws,
        char('('),
        ws,
        char('('),
        ws,
        delimited(char('\''), take_until("'"), char('\'')),
    ))(input)?;
    Ok((rest, name))
}

/// Locate the first schema identifier of FILE_SCHEMA.
///
/// The search stops at the DATA section so record payloads are never read.
pub fn parse_file_schema(content: &str) -> Option<&str> {
    let bytes = content.as_bytes();
    let header_end = memmem::find(bytes, b"DATA;").unwrap_or(bytes.len());
    let pos = memmem::find(&bytes[..header_end], b"FILE_SCHEMA")?;
    let rest = &content[pos + "FILE_SCHEMA".len()..header_end];
    schema_list(rest).ok().map(|(_, name)| name)
}

/// Read FILE_SCHEMA and map it to a known release.
pub fn detect_schema_version(content: &str) -> Result<IfcSchemaVersion> {
    let identifier = parse_file_schema(content)
        .ok_or_else(|| Error::InvalidHeader("missing FILE_SCHEMA".to_string()))?;
    IfcSchemaVersion::from_identifier(identifier)
}
