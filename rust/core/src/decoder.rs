// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Entity Decoder - On-demand entity parsing
//!
//! Lazily decode IFC records from byte offsets without tokenizing the whole
//! DATA section up front.

use crate::attribute::{AttributeValue, DecodedEntity};
use crate::error::{Error, Result};
use crate::handle::IfcAnyHandle;
use crate::parser::parse_entity;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Pre-built entity index type
pub type EntityIndex = FxHashMap<u32, (usize, usize)>;

/// Build entity index from content - O(n) scan using SIMD-accelerated search
/// Returns index mapping entity IDs to byte offsets
///
/// The end of a record is the first ';' outside a string literal, so
/// strings containing ';' do not truncate the record.
pub fn build_entity_index(content: &str) -> EntityIndex {
    let bytes = content.as_bytes();
    let len = bytes.len();

    // Pre-allocate with estimated capacity (roughly 1 entity per 50 bytes)
    let mut index = FxHashMap::with_capacity_and_hasher(len / 50, Default::default());

    let mut pos = 0;

    while pos < len {
        let hash_offset = match memchr::memchr(b'#', &bytes[pos..]) {
            Some(offset) => offset,
            None => break,
        };

        let start = pos + hash_offset;
        pos = start + 1;

        let id_start = pos;
        while pos < len && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        let id_end = pos;

        // Handles both `#45=` and `#45 = `
        while pos < len && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        if id_end == id_start || pos >= len || bytes[pos] != b'=' {
            continue;
        }

        let id = parse_u32_inline(&bytes[id_start..id_end]);
        match find_record_end(&bytes[pos..]) {
            Some(end_offset) => {
                pos += end_offset + 1;
                index.insert(id, (start, pos));
            }
            None => break, // No terminator, malformed tail
        }
    }

    index
}

/// Offset of the terminating ';' of a record, skipping quoted text.
#[inline]
fn find_record_end(bytes: &[u8]) -> Option<usize> {
    let mut in_string = false;
    let mut pos = 0;
    while let Some(offset) = memchr::memchr2(b'\'', b';', &bytes[pos..]) {
        let at = pos + offset;
        if bytes[at] == b'\'' {
            in_string = !in_string;
        } else if !in_string {
            return Some(at);
        }
        pos = at + 1;
    }
    None
}

/// Fast u32 parsing without string allocation
#[inline]
fn parse_u32_inline(digits: &[u8]) -> u32 {
    digits.iter().fold(0u32, |acc, &byte| {
        acc.wrapping_mul(10).wrapping_add(byte.wrapping_sub(b'0') as u32)
    })
}

/// Entity decoder for lazy parsing - uses Arc for efficient cache sharing
pub struct EntityDecoder<'a> {
    content: &'a str,
    /// Decoded records by step id; handles share these allocations
    cache: FxHashMap<u32, Arc<DecodedEntity>>,
    /// Step id -> (start, end) byte range, built on first use
    entity_index: Option<Arc<EntityIndex>>,
    /// Coordinates of cartesian points read through the fast path
    point_cache: FxHashMap<u32, (f64, f64, f64)>,
}

impl<'a> EntityDecoder<'a> {
    /// Create new decoder
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            cache: FxHashMap::default(),
            entity_index: None,
            point_cache: FxHashMap::default(),
        }
    }

    fn index(&mut self) -> &EntityIndex {
        self.entity_index
            .get_or_insert_with(|| Arc::new(build_entity_index(self.content)))
    }

    /// Number of records in the DATA section
    pub fn entity_count(&mut self) -> usize {
        self.index().len()
    }

    /// True when a record with this step id exists
    pub fn contains(&mut self, entity_id: u32) -> bool {
        self.index().contains_key(&entity_id)
    }

    /// All step ids in ascending order
    pub fn entity_ids(&mut self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.index().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Decode entity by ID - O(1) lookup using entity index
    pub fn decode_by_id(&mut self, entity_id: u32) -> Result<Arc<DecodedEntity>> {
        if let Some(entity) = self.cache.get(&entity_id) {
            return Ok(Arc::clone(entity));
        }

        let (start, end) = self
            .index()
            .get(&entity_id)
            .copied()
            .ok_or(Error::EntityNotFound(entity_id))?;

        let line = &self.content[start..end];
        let (id, type_name, tokens) = parse_entity(line)?;
        if id != entity_id {
            return Err(Error::parse(
                entity_id,
                format!("index points at record #{}", id),
            ));
        }

        let attributes = tokens.iter().map(AttributeValue::from_token).collect();
        let entity = Arc::new(DecodedEntity::new(id, type_name, attributes));
        self.cache.insert(id, Arc::clone(&entity));
        Ok(entity)
    }

    /// Handle for a step id
    pub fn handle(&mut self, entity_id: u32) -> Result<IfcAnyHandle> {
        self.decode_by_id(entity_id).map(IfcAnyHandle::new)
    }

    /// Handle for a reference attribute; `$`, `*` and non-references give a
    /// null handle, a dangling `#n` gives `EntityNotFound`.
    pub fn handle_for(&mut self, attr: &AttributeValue) -> Result<IfcAnyHandle> {
        match attr.as_entity_ref() {
            Some(id) => self.handle(id),
            None => Ok(IfcAnyHandle::null()),
        }
    }

    /// Get cache size
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    /// Get raw content string for an entity
    pub fn get_raw_content(&mut self, entity_id: u32) -> Option<&'a str> {
        let content = self.content;
        let (start, end) = self.index().get(&entity_id).copied()?;
        Some(&content[start..end])
    }

    /// Coordinates of an IfcCartesianPoint read straight from raw bytes
    ///
    /// Bypasses full decoding; 2D points get z = 0. Returns None when the
    /// record is missing, is not a cartesian point, or its coordinate list
    /// does not parse.
    pub fn cartesian_point(&mut self, entity_id: u32) -> Option<(f64, f64, f64)> {
        if let Some(&coords) = self.point_cache.get(&entity_id) {
            return Some(coords);
        }

        let raw = self.get_raw_content(entity_id)?;
        let coords = parse_cartesian_point_inline(raw.as_bytes())?;
        self.point_cache.insert(entity_id, coords);
        Some(coords)
    }
}

/// Parse `#n=IFCCARTESIANPOINT((x,y[,z]));` from raw bytes
#[inline]
fn parse_cartesian_point_inline(bytes: &[u8]) -> Option<(f64, f64, f64)> {
    let eq = memchr::memchr(b'=', bytes)?;
    let open = eq + memchr::memchr(b'(', &bytes[eq..])?;
    let keyword = std::str::from_utf8(&bytes[eq + 1..open]).ok()?.trim();
    if !keyword.eq_ignore_ascii_case("IFCCARTESIANPOINT") {
        return None;
    }

    // Second '(' opens the coordinate list
    let mut i = open + 1;
    i += memchr::memchr(b'(', &bytes[i..])? + 1;

    let x = parse_next_float(bytes, &mut i)?;
    let y = parse_next_float(bytes, &mut i)?;
    let z = parse_next_float(bytes, &mut i).unwrap_or(0.0);

    // Anything but a closing ')' after two or three numbers is left to the
    // full parser
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if bytes.get(i) != Some(&b')') {
        return None;
    }
    Some((x, y, z))
}

/// Parse next float from bytes, advancing position past it
#[inline]
fn parse_next_float(bytes: &[u8], pos: &mut usize) -> Option<f64> {
    let mut i = *pos;
    while i < bytes.len() && (bytes[i] == b',' || bytes[i].is_ascii_whitespace()) {
        i += 1;
    }
    if i >= bytes.len() || bytes[i] == b')' {
        return None;
    }

    match fast_float::parse_partial::<f64, _>(&bytes[i..]) {
        Ok((value, consumed)) if consumed > 0 => {
            *pos = i + consumed;
            Some(value)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IfcType;

    const CONTENT: &str = r#"
#1=IFCCARTESIANPOINT((0.,0.,0.));
#2=IFCCARTESIANPOINT((1.,0.));
#3 = IFCCARTESIANPOINT((1.,1.,2.5E-1));
#10=IFCPOLYLOOP((#1,#2,#3));
#11=IFCFACE('a;b',(#12));
#12=IFCFACEOUTERBOUND(#10,.T.);
"#;

    #[test]
    fn test_index_skips_quoted_terminators() {
        let index = build_entity_index(CONTENT);
        assert_eq!(index.len(), 6);
        let (start, end) = index[&11];
        assert_eq!(&CONTENT[start..end], "#11=IFCFACE('a;b',(#12));");
    }

    #[test]
    fn test_decode_by_id() {
        let mut decoder = EntityDecoder::new(CONTENT);

        let entity = decoder.decode_by_id(10).unwrap();
        assert_eq!(entity.id, 10);
        assert_eq!(entity.ifc_type, IfcType::IfcPolyLoop);
        assert_eq!(entity.get_list(0).map(|l| l.len()), Some(3));

        // Should be cached now
        assert_eq!(decoder.cache_size(), 1);
        let again = decoder.decode_by_id(10).unwrap();
        assert!(Arc::ptr_eq(&entity, &again));
    }

    #[test]
    fn test_missing_entity() {
        let mut decoder = EntityDecoder::new(CONTENT);
        assert_eq!(
            decoder.decode_by_id(99).unwrap_err(),
            Error::EntityNotFound(99)
        );
        assert!(!decoder.contains(99));
        assert_eq!(decoder.entity_ids(), vec![1, 2, 3, 10, 11, 12]);
    }

    #[test]
    fn test_handle_for() {
        let mut decoder = EntityDecoder::new(CONTENT);
        let bound = decoder.decode_by_id(12).unwrap();

        let loop_handle = decoder.handle_for(bound.get(0).unwrap()).unwrap();
        assert_eq!(loop_handle.step_id(), Some(10));

        let null = decoder.handle_for(&AttributeValue::Null).unwrap();
        assert!(null.is_null_or_empty());

        assert!(decoder.handle_for(&AttributeValue::EntityRef(404)).is_err());
    }

    #[test]
    fn test_cartesian_point_fast_path() {
        let mut decoder = EntityDecoder::new(CONTENT);
        assert_eq!(decoder.cartesian_point(1), Some((0.0, 0.0, 0.0)));
        assert_eq!(decoder.cartesian_point(2), Some((1.0, 0.0, 0.0)));
        assert_eq!(decoder.cartesian_point(3), Some((1.0, 1.0, 0.25)));
        // Not a point
        assert_eq!(decoder.cartesian_point(10), None);
        assert_eq!(decoder.cartesian_point(404), None);
    }

    #[test]
    fn test_fast_path_rejects_irregular_coordinates() {
        let content = "#4=IFCCARTESIANPOINT((1.,2.,$));\n\
                       #5=IFCCARTESIANPOINT((1.,2.,3.,4.));\n\
                       #6=IFCCARTESIANPOINT((1.,2.,3.) );\n";
        let mut decoder = EntityDecoder::new(content);
        assert_eq!(decoder.cartesian_point(4), None);
        assert_eq!(decoder.cartesian_point(5), None);
        assert_eq!(decoder.cartesian_point(6), Some((1.0, 2.0, 3.0)));
        assert_eq!(
            parse_cartesian_point_inline(b"#7=IFCCARTESIANPOINT((1.,2. ));"),
            Some((1.0, 2.0, 0.0))
        );
    }
}
